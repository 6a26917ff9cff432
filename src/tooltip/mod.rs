//! Interactive tooltips.
//!
//! Geoms register [`GeomTarget`]s while rendering. A [`TargetLocator`]
//! resolves a pointer position back to a data row, and a
//! [`ContextualMapping`] turns that row into tooltip lines.
//! [`PathLocator`] and [`PointLocator`] hit-test map-like entities drawn
//! with a [`RenderHelper`].

mod lines;
mod locator;
mod mapping;
mod target;

pub use lines::{FieldFormat, LineDataPoint, LinePattern, TooltipLine, ValueSource};
pub use locator::{
    EntityGeometry, HoverObject, Locator, LocatorKind, LookupResult, MapEntity, PathLocator, PointLocator,
    RenderHelper, TargetLocator, ZoomRenderHelper,
};
pub use mapping::{ContextualMapping, MappedDataAccess};
pub use target::{GeomTarget, GeomTargetCollector, HitShape, PathPoint, TipKind, TipLayoutHint, TooltipParams};
