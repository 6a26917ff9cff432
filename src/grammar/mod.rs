//! Grammar of Graphics implementation.
//!
//! Provides the declarative layer model and the assembly pipeline based on
//! Wilkinson's Grammar of Graphics [Wilkinson 2005].
//!
//! # Components
//!
//! - **Data**: columnar frames of typed variables
//! - **Aesthetics**: channels (x, y, color, size, shape) that data is mapped onto
//! - **Statistics**: data transformations (identity, count, bin, summary, smooth, correlation)
//! - **Positions**: identity, stack, dodge, jitter
//! - **Geometries**: point, path, bar, area and the range family
//! - **Coordinates**: cartesian, optionally flipped
//! - **Facets**: grid and wrap panels
//! - **Assembly**: [`PlotAssembler`] runs the pipeline and returns a [`BuiltPlot`]
//!
//! # Example
//!
//! ```rust
//! use gogviz::grammar::*;
//!
//! let data = DataFrame::builder()
//!     .put_numeric(Variable::origin("x"), vec![Some(1.0), Some(2.0), Some(3.0)])
//!     .put_numeric(Variable::origin("y"), vec![Some(4.0), Some(5.0), Some(6.0)])
//!     .build()
//!     .unwrap();
//!
//! let plot = PlotAssembler::new()
//!     .data(data)
//!     .mapping(Mapping::new().x("x").y("y"))
//!     .layer(Layer::new(GeomKind::Point))
//!     .build()
//!     .unwrap();
//! assert_eq!(plot.layer_count(), 1);
//! ```
//!
//! # References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of Computational
//!   and Graphical Statistics.

mod aes;
mod aesthetics;
mod coord;
mod data;
mod facet;
pub mod geom;
mod layer;
mod panel;
mod plot;
mod position;
mod sampling;
pub mod stat;
mod theme;

pub use aes::{Aes, AesKind, AesValue, LineType, Mapping, PointShape};
pub use aesthetics::{Aesthetics, AestheticsDefaults, DataPoint};
pub use coord::{BogusCoordinateSystem, CartesianCoordinates, Coord, CoordinateSystem};
pub use data::{Builder, DataFrame, DataValue, VarSource, Variable};
pub use facet::{Facet, FacetLayout, FacetTile};
pub use geom::{Geom, GeomContext, GeomKind};
pub use layer::{GeomLayer, Layer, LayerInfo, StitchedPlotLayer};
pub use plot::{BuiltPlot, PlotAssembler, Tooltip};
pub use position::PositionAdjustment;
pub use sampling::Sampling;
pub use stat::{Stat, StatContext};
pub use theme::{LegendDirection, LegendPosition, LegendTheme, Theme};
