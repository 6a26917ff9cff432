//! Plot layers: the declarative [`Layer`], the per-panel [`GeomLayer`] the
//! pipeline builds from it, and the [`StitchedPlotLayer`] joining one layer's
//! panels for shared range and legend computation.

use super::aes::{Aes, AesValue, Mapping};
use super::aesthetics::{Aesthetics, AestheticsDefaults};
use super::data::{DataFrame, Variable};
use super::geom::{Geom, GeomKind, LegendKeyFactory};
use super::position::PositionAdjustment;
use super::sampling::Sampling;
use super::stat::Stat;
use crate::error::{Error, Result};
use crate::geometry::Span;
use crate::tooltip::TooltipLine;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A layer in the plot.
#[derive(Clone)]
pub struct Layer {
    pub(crate) kind: GeomKind,
    pub(crate) stat: Option<Arc<dyn Stat>>,
    pub(crate) mapping: Mapping,
    pub(crate) constants: BTreeMap<Aes, AesValue>,
    pub(crate) position: Option<PositionAdjustment>,
    pub(crate) sampling: Sampling,
    pub(crate) data: Option<DataFrame>,
    pub(crate) show_legend: bool,
    pub(crate) horizontal: Option<bool>,
    pub(crate) tooltip_lines: Option<Vec<TooltipLine>>,
    pub(crate) tooltip_title: Option<TooltipLine>,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("kind", &self.kind)
            .field("stat", &self.stat.as_ref().map(|s| s.name()))
            .field("mapping", &self.mapping)
            .field("constants", &self.constants)
            .field("position", &self.position)
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Layer of a geom with its default stat and position.
    #[must_use]
    pub fn new(kind: GeomKind) -> Self {
        Self {
            kind,
            stat: None,
            mapping: Mapping::new(),
            constants: BTreeMap::new(),
            position: None,
            sampling: Sampling::None,
            data: None,
            show_legend: true,
            horizontal: None,
            tooltip_lines: None,
            tooltip_title: None,
        }
    }

    /// Set the statistical transformation.
    #[must_use]
    pub fn stat(mut self, stat: Arc<dyn Stat>) -> Self {
        self.stat = Some(stat);
        self
    }

    /// Set layer aesthetics; they take precedence over the plot mapping.
    #[must_use]
    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Set an aesthetic to a constant value for every row.
    #[must_use]
    pub fn constant(mut self, aes: Aes, value: impl Into<AesValue>) -> Self {
        self.constants.insert(aes, value.into());
        self
    }

    /// Set the position adjustment.
    #[must_use]
    pub fn position(mut self, position: PositionAdjustment) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the sampling applied to the post-stat data.
    #[must_use]
    pub fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set layer-specific data.
    #[must_use]
    pub fn data(mut self, data: DataFrame) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether the layer contributes to legends.
    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Draw range geoms horizontally (`true`) or vertically (`false`).
    ///
    /// Unset, a range geom is horizontal when it maps `xmin`/`xmax` but
    /// neither `ymin` nor `ymax`.
    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = Some(horizontal);
        self
    }

    /// Replace the default tooltip lines.
    #[must_use]
    pub fn tooltip_lines(mut self, lines: Vec<TooltipLine>) -> Self {
        self.tooltip_lines = Some(lines);
        self
    }

    /// Set a tooltip title line.
    #[must_use]
    pub fn tooltip_title(mut self, title: TooltipLine) -> Self {
        self.tooltip_title = Some(title);
        self
    }

    /// Geom kind.
    #[must_use]
    pub fn kind(&self) -> GeomKind {
        self.kind
    }
}

/// Summary of an assembled layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// Geom kind.
    pub geom: GeomKind,
    /// Stat name.
    pub stat: String,
    /// Position adjustment name.
    pub position: String,
    /// Variable name behind each mapped aesthetic.
    pub bindings: BTreeMap<Aes, String>,
    /// Aesthetics set to constants.
    pub constants: Vec<Aes>,
    /// Rows drawn, summed over panels.
    pub row_count: usize,
}

/// One layer on one panel: post-stat data with its bindings.
#[derive(Clone)]
pub struct GeomLayer {
    pub(crate) kind: GeomKind,
    pub(crate) geom: Arc<dyn Geom>,
    pub(crate) tile: usize,
    pub(crate) data: DataFrame,
    pub(crate) values: BTreeMap<Aes, Variable>,
    pub(crate) sources: BTreeMap<Aes, Variable>,
    pub(crate) constants: BTreeMap<Aes, AesValue>,
    pub(crate) position: PositionAdjustment,
    pub(crate) show_legend: bool,
    pub(crate) is_vertical: bool,
    pub(crate) aesthetics: Aesthetics,
}

impl fmt::Debug for GeomLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeomLayer")
            .field("kind", &self.kind)
            .field("tile", &self.tile)
            .field("rows", &self.data.row_count())
            .field("bindings", &self.values.keys().collect::<Vec<_>>())
            .field("constants", &self.constants)
            .finish_non_exhaustive()
    }
}

impl GeomLayer {
    /// Geom kind.
    #[must_use]
    pub fn kind(&self) -> GeomKind {
        self.kind
    }

    /// Panel index.
    #[must_use]
    pub fn tile(&self) -> usize {
        self.tile
    }

    /// Post-stat, post-sampling data.
    #[must_use]
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Whether `aes` is mapped.
    #[must_use]
    pub fn has_binding(&self, aes: Aes) -> bool {
        self.values.contains_key(&aes)
    }

    /// Variable holding the transformed values of a mapped aesthetic.
    #[must_use]
    pub fn binding(&self, aes: Aes) -> Option<&Variable> {
        self.values.get(&aes)
    }

    /// Whether `aes` is set to a constant.
    #[must_use]
    pub fn has_constant(&self, aes: Aes) -> bool {
        self.constants.contains_key(&aes)
    }

    /// Constant value of `aes`.
    #[must_use]
    pub fn constant(&self, aes: Aes) -> Option<&AesValue> {
        self.constants.get(&aes)
    }

    /// Resolved, position-adjusted aesthetics.
    #[must_use]
    pub fn aesthetics(&self) -> &Aesthetics {
        &self.aesthetics
    }

    /// Whether range geoms are drawn vertically.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.is_vertical
    }
}

/// The panels of one layer, stitched for shared ranges and legends.
#[derive(Debug, Clone)]
pub struct StitchedPlotLayer {
    layers: Vec<GeomLayer>,
}

impl StitchedPlotLayer {
    /// Stitch the panels of one layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentLayers`] when `layers` is empty or the
    /// panels disagree on geom, orientation, bindings or constants.
    pub fn new(layers: Vec<GeomLayer>) -> Result<Self> {
        let Some(first) = layers.first() else {
            return Err(Error::InconsistentLayers("no layers to stitch".to_string()));
        };
        for (i, layer) in layers.iter().enumerate().skip(1) {
            if layer.kind != first.kind {
                return Err(Error::InconsistentLayers(format!(
                    "panel {i} draws geom_{}, expected geom_{}",
                    layer.kind, first.kind
                )));
            }
            if layer.is_vertical != first.is_vertical {
                return Err(Error::InconsistentLayers(format!("panel {i} of geom_{} changes orientation", first.kind)));
            }
            let bound: Vec<Aes> = layer.values.keys().copied().collect();
            let expected: Vec<Aes> = first.values.keys().copied().collect();
            if bound != expected {
                return Err(Error::InconsistentLayers(format!(
                    "panel {i} of geom_{} binds {bound:?}, expected {expected:?}",
                    first.kind
                )));
            }
            if layer.constants != first.constants {
                return Err(Error::InconsistentLayers(format!("panel {i} of geom_{} changes constants", first.kind)));
            }
        }
        Ok(Self { layers })
    }

    fn first(&self) -> &GeomLayer {
        &self.layers[0]
    }

    /// Stitched panels.
    #[must_use]
    pub fn layers(&self) -> &[GeomLayer] {
        &self.layers
    }

    /// Geom kind.
    #[must_use]
    pub fn kind(&self) -> GeomKind {
        self.first().kind
    }

    /// Whether range geoms are drawn vertically.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.first().is_vertical
    }

    /// Legend key glyph of the geom.
    #[must_use]
    pub fn legend_key(&self) -> LegendKeyFactory {
        self.first().geom.legend_key()
    }

    /// Geom defaults.
    #[must_use]
    pub fn defaults(&self) -> AestheticsDefaults {
        self.first().geom.defaults()
    }

    /// Whether the layer contributes to legends.
    #[must_use]
    pub fn show_legend(&self) -> bool {
        self.first().show_legend
    }

    /// Whether `aes` is mapped.
    #[must_use]
    pub fn has_binding(&self, aes: Aes) -> bool {
        self.first().has_binding(aes)
    }

    /// Mapped aesthetics.
    #[must_use]
    pub fn bound_aes(&self) -> Vec<Aes> {
        self.first().values.keys().copied().collect()
    }

    /// Whether `aes` is set to a constant.
    #[must_use]
    pub fn has_constant(&self, aes: Aes) -> bool {
        self.first().has_constant(aes)
    }

    /// Constants of the layer.
    #[must_use]
    pub fn constants(&self) -> &BTreeMap<Aes, AesValue> {
        &self.first().constants
    }

    /// Span of a variable over every panel; `None` unless numeric in all.
    #[must_use]
    pub fn data_range(&self, var: &Variable) -> Option<Span> {
        if !self.layers.iter().all(|l| l.data.is_numeric(var)) {
            return None;
        }
        self.layers
            .iter()
            .filter_map(|l| l.data.range(var))
            .reduce(Span::union)
    }

    /// Span of a resolved numeric channel over every panel.
    #[must_use]
    pub fn aesthetics_range(&self, aes: Aes) -> Option<Span> {
        self.layers
            .iter()
            .filter_map(|l| l.aesthetics.range(aes))
            .reduce(Span::union)
    }

    /// Rows drawn, summed over panels.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.layers.iter().map(|l| l.data.row_count()).sum()
    }
}
