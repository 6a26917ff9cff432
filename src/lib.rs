//! # gogviz
//!
//! Grammar-of-graphics plot assembly: statistical transforms, scales and
//! mappers, geoms, position adjustments, legends and tooltip hit-testing,
//! rendered to a scene graph and encoded as SVG.
//!
//! A plot is described either programmatically with a
//! [`grammar::PlotAssembler`] or as a JSON document read by
//! [`config::parse_plot_spec`]. Assembly runs the whole pipeline per layer
//! (stat, sampling, scales, mappers, positions, geoms) and returns a
//! [`grammar::BuiltPlot`] holding the scene, legends and tooltip targets.
//!
//! ## Quick Start
//!
//! ```rust
//! use gogviz::prelude::*;
//!
//! let data = DataFrame::builder()
//!     .put_numeric(Variable::origin("x"), vec![Some(1.0), Some(2.0), Some(3.0)])
//!     .put(Variable::origin("g"), vec!["a".into(), "b".into(), "a".into()])
//!     .build()
//!     .unwrap();
//!
//! let plot = PlotAssembler::new()
//!     .data(data)
//!     .mapping(Mapping::new().x("g").y("x"))
//!     .layer(Layer::new(GeomKind::Bar).stat(stat::from_name("identity").unwrap()))
//!     .build()
//!     .unwrap();
//!
//! let svg = plot.to_svg();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! ## Academic References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of Computational
//!   and Graphical Statistics.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and color space conversions.
pub mod color;

/// Geometric primitives (points, spans, rectangles).
pub mod geometry;

/// Continuous and discrete transforms.
pub mod transform;

/// Scales, breaks and mapper providers.
pub mod scale;

// ============================================================================
// Visualization Modules
// ============================================================================

/// Grammar of Graphics implementation.
pub mod grammar;

/// Legends and colorbars.
pub mod legend;

/// Tooltip lines, targets and hit-testing.
pub mod tooltip;

/// Plot specification documents.
pub mod config;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Scene graph and text measurement.
pub mod render;

/// Output encoders (SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for gogviz operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use gogviz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::{Hsla, Rgba};
    pub use crate::config::{parse_plot_spec, PlotSpec};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect, Span};
    pub use crate::grammar::stat;
    pub use crate::grammar::{
        Aes, AesValue, BuiltPlot, Coord, DataFrame, DataValue, Facet, GeomKind, Layer, LegendPosition,
        Mapping, PlotAssembler, PositionAdjustment, Sampling, Theme, Variable,
    };
    pub use crate::legend::{ColorBarOptions, Guide, LegendOptions};
    pub use crate::output::SvgEncoder;
    pub use crate::scale::{AesMapperProvider, Scale};
    pub use crate::transform::{ContinuousTransform, DiscreteTransform};
}
