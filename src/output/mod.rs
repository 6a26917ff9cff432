//! Output encoders.

mod svg;

pub use svg::SvgEncoder;
