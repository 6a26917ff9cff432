//! Plot assembly.
//!
//! [`PlotAssembler`] takes data, a plot mapping and layers, and runs each
//! layer through the pipeline:
//!
//! 1. resolve mapped columns to variables, create scales from the data
//! 2. transform mapped values into scale space
//! 3. split the data into facet panels
//! 4. apply the stat per group
//! 5. sample, fit scale domains, create mappers
//! 6. resolve aesthetics and apply the position adjustment
//!
//! The resulting [`BuiltPlot`] owns the stitched layers, legends, tooltip
//! mappings and the laid-out scene.

use super::aes::{Aes, AesValue, Mapping};
use super::aesthetics::{Aesthetics, DataPoint};
use super::coord::Coord;
use super::data::{Builder, DataFrame, DataValue, Variable};
use super::facet::{Facet, FacetLayout};
use super::geom::GeomKind;
use super::layer::{GeomLayer, Layer, LayerInfo, StitchedPlotLayer};
use super::panel::{PlotFrame, Rendered};
use super::position::PositionAdjustment;
use super::stat::{self, vars, Stat, StatContext};
use super::theme::{LegendPosition, Theme};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Span};
use crate::legend::{ColorBarAssembler, ColorBarOptions, Guide, LegendAssembler, LegendInfo, LegendScaleContext};
use crate::output::SvgEncoder;
use crate::render::{HeuristicTextMeasurer, SceneNode, TextMeasurer};
use crate::scale::{format_significant, AesMapperProvider, GuideMapper, Scale};
use crate::tooltip::{ContextualMapping, GeomTarget, LineDataPoint, MappedDataAccess, TargetLocator};
use crate::transform::DiscreteTransform;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Group index of each post-stat row.
pub(crate) const GROUP: Variable = Variable::stat("..group..", "group");

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// Builder and pipeline of a plot.
#[derive(Debug, Clone)]
pub struct PlotAssembler {
    data: DataFrame,
    mapping: Mapping,
    layers: Vec<Layer>,
    scales: BTreeMap<Aes, Scale>,
    providers: BTreeMap<Aes, AesMapperProvider>,
    guides: BTreeMap<Aes, Guide>,
    coord: Coord,
    facet: Facet,
    theme: Theme,
    title: Option<String>,
    measurer: Arc<dyn TextMeasurer>,
    width: u32,
    height: u32,
}

impl Default for PlotAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotAssembler {
    /// Empty plot, 800x600.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DataFrame::new(),
            mapping: Mapping::new(),
            layers: Vec::new(),
            scales: BTreeMap::new(),
            providers: BTreeMap::new(),
            guides: BTreeMap::new(),
            coord: Coord::default(),
            facet: Facet::None,
            theme: Theme::default(),
            title: None,
            measurer: Arc::new(HeuristicTextMeasurer),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Set the plot data, used by layers without their own.
    #[must_use]
    pub fn data(mut self, data: DataFrame) -> Self {
        self.data = data;
        self
    }

    /// Set the plot mapping, inherited by every layer.
    #[must_use]
    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Add a layer.
    #[must_use]
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Declare a scale. Scales of the x family are keyed under X, those of
    /// the y family under Y.
    #[must_use]
    pub fn scale(mut self, scale: Scale) -> Self {
        self.scales.insert(scale_aes(scale.aes()), scale);
        self
    }

    /// Replace the default mapper provider of an aesthetic.
    #[must_use]
    pub fn mapper_provider(mut self, aes: Aes, provider: AesMapperProvider) -> Self {
        self.providers.insert(aes, provider);
        self
    }

    /// Choose the guide of an aesthetic.
    #[must_use]
    pub fn guide(mut self, aes: Aes, guide: Guide) -> Self {
        self.guides.insert(aes, guide);
        self
    }

    /// Set the coordinate system.
    #[must_use]
    pub fn coord(mut self, coord: Coord) -> Self {
        self.coord = coord;
        self
    }

    /// Set faceting.
    #[must_use]
    pub fn facet(mut self, facet: Facet) -> Self {
        self.facet = facet;
        self
    }

    /// Set the theme.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the plot title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the output size in pixels.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Replace the text measurer used for layout.
    #[must_use]
    pub fn measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for a plot without layers, a mapping to
    /// an unknown column, or discrete data on a continuous scale. Mapper,
    /// legend and stat configuration errors propagate unchanged.
    pub fn build(self) -> Result<BuiltPlot> {
        if self.layers.is_empty() {
            return Err(Error::InvalidSpec("No geometry layers specified".into()));
        }
        let inputs = self.layers.iter().map(|l| self.resolve_layer(l)).collect::<Result<Vec<_>>>()?;

        let mut scales = BTreeMap::new();
        for input in &inputs {
            for (&aes, var) in &input.origin {
                if !aes.is_unscaled() {
                    self.register_scale(&mut scales, aes, input.data, var)?;
                }
            }
        }
        let frames = inputs.iter().map(|i| i.transformed(&scales)).collect::<Result<Vec<_>>>()?;
        let facet = self.facet.layout(&frames.iter().collect::<Vec<_>>())?;
        log::debug!("facet: {}x{} panels", facet.rows, facet.cols);

        let x_range = frames.iter().filter_map(|f| f.range(&Variable::transform(Aes::X))).reduce(Span::union);
        let y_range = frames.iter().filter_map(|f| f.range(&Variable::transform(Aes::Y))).reduce(Span::union);
        let mut messages = Vec::new();
        let mut panels: Vec<Vec<GeomLayer>> = Vec::with_capacity(inputs.len());
        for (input, frame) in inputs.iter().zip(&frames) {
            let ctx = StatContext::new(x_range, y_range)
                .with_mapped_stat_variables(input.stat_vars.values().cloned().collect());
            let mut layer_panels = Vec::with_capacity(facet.tiles.len());
            for (t, tile) in facet.tiles.iter().enumerate() {
                let out = input.apply_stat(&tile.select(frame), &scales, &ctx, &mut messages)?;
                layer_panels.push(GeomLayer {
                    kind: input.layer.kind,
                    geom: Arc::from(input.layer.kind.create(input.is_vertical)),
                    tile: t,
                    data: out.data,
                    values: out.values,
                    sources: out.sources,
                    constants: input.layer.constants.clone(),
                    position: input.position(),
                    show_legend: input.layer.show_legend,
                    is_vertical: input.is_vertical,
                    aesthetics: Aesthetics::new(Vec::new()),
                });
            }
            log::debug!("geom_{}: stat_{} applied on {} panels", input.layer.kind, input.stat.name(), layer_panels.len());
            panels.push(layer_panels);
        }

        self.stat_scales(&mut panels, &mut scales)?;
        for (input, layer_panels) in inputs.iter().zip(panels.iter_mut()) {
            for panel in layer_panels.iter_mut() {
                panel.data = input.layer.sampling.apply(&panel.data);
            }
        }
        fit_continuous_domains(&panels, &mut scales);
        let mappers = self.mappers(&scales)?;

        let mut resolutions = Vec::with_capacity(panels.len());
        for layer_panels in &mut panels {
            for panel in layer_panels.iter_mut() {
                panel.aesthetics = resolve_aesthetics(panel, &mappers);
            }
            let x_res = layer_resolution(layer_panels, Aes::X, &scales);
            let y_res = layer_resolution(layer_panels, Aes::Y, &scales);
            for panel in layer_panels.iter_mut() {
                panel.aesthetics = panel.position.apply(&panel.aesthetics, x_res);
            }
            resolutions.push((x_res, y_res));
        }

        let layers = panels.into_iter().map(StitchedPlotLayer::new).collect::<Result<Vec<_>>>()?;
        let (x_domain, x_scale) = self.positional_domain(Aes::X, &layers, &resolutions, scales.remove(&Aes::X));
        let (y_domain, y_scale) = self.positional_domain(Aes::Y, &layers, &resolutions, scales.remove(&Aes::Y));
        scales.insert(Aes::X, x_scale);
        scales.insert(Aes::Y, y_scale);
        log::debug!("positional domains: x {x_domain}, y {y_domain}");

        let legends = self.legends(&layers, &scales, &mappers)?;
        log::debug!("{} legends assembled", legends.len());

        let tooltips = inputs
            .iter()
            .zip(&layers)
            .map(|(input, layer)| layer.layers().iter().map(|p| tooltip_mapping(input.layer, p, &scales)).collect())
            .collect();
        let infos = inputs
            .iter()
            .zip(&layers)
            .map(|(input, layer)| layer_info(input, layer))
            .collect();

        let mut plot = BuiltPlot {
            layers,
            infos,
            tooltips,
            resolutions,
            scales,
            x_domain,
            y_domain,
            legends,
            facet,
            coord: self.coord,
            theme: self.theme,
            title: self.title,
            messages,
            measurer: self.measurer,
            width: self.width,
            height: self.height,
            rendered: Rendered { scene: SceneNode::group(Vec::new()), targets: Vec::new(), panels: Vec::new() },
        };
        plot.render();
        Ok(plot)
    }

    fn resolve_layer<'a>(&'a self, layer: &'a Layer) -> Result<LayerInput<'a>> {
        let data = layer.data.as_ref().unwrap_or(&self.data);
        let stat = match &layer.stat {
            Some(s) => Arc::clone(s),
            None => stat::from_name(layer.kind.default_stat())?,
        };
        let mut origin = BTreeMap::new();
        let mut stat_vars = BTreeMap::new();
        for (aes, column) in self.mapping.clone().merge(&layer.mapping).iter() {
            if layer.constants.contains_key(&aes) {
                continue;
            }
            if let Some(var) = vars::by_name(column) {
                stat_vars.insert(aes, var);
                continue;
            }
            let var = data.variable(column).ok_or_else(|| {
                Error::InvalidSpec(format!("undefined variable '{column}' mapped to {aes} in geom_{}", layer.kind))
            })?;
            origin.insert(aes, var.clone());
        }
        let bound = |a: Aes| origin.contains_key(&a) || stat_vars.contains_key(&a);
        let is_vertical = match layer.horizontal {
            Some(horizontal) => !horizontal,
            None => {
                !layer.kind.is_flippable()
                    || !((bound(Aes::XMin) || bound(Aes::XMax)) && !(bound(Aes::YMin) || bound(Aes::YMax)))
            }
        };
        Ok(LayerInput { layer, data, stat, origin, stat_vars, is_vertical })
    }

    /// Scale a user declared, or a new one named after `var`.
    fn base_scale(&self, key: Aes, var: &Variable, discrete: bool) -> Scale {
        match self.scales.get(&key) {
            Some(s) if s.name() == key.name() => s.with().name(var.label()).build(),
            Some(s) => s.clone(),
            None if discrete => Scale::discrete(key, DiscreteTransform::new(Vec::new())).name(var.label()).build(),
            None => Scale::continuous(key).name(var.label()).build(),
        }
    }

    /// Create or extend the scale of `aes` with the values of `var`.
    fn register_scale(&self, scales: &mut BTreeMap<Aes, Scale>, aes: Aes, data: &DataFrame, var: &Variable) -> Result<()> {
        let key = scale_aes(aes);
        let discrete = !data.is_numeric(var) || matches!(key, Aes::Shape | Aes::LineType);
        let scale = match scales.remove(&key) {
            Some(s) => s,
            None => self.base_scale(key, var, discrete),
        };
        let scale = if scale.is_continuous_domain() {
            if discrete {
                return Err(Error::InvalidSpec(format!(
                    "discrete variable '{}' mapped to the continuous {key} scale",
                    var.name()
                )));
            }
            scale
        } else {
            scale.with_more_levels(data.distinct_values(var))
        };
        scales.insert(key, scale);
        Ok(())
    }

    /// Scales for stat-only bindings; text stat values move to scale space.
    fn stat_scales(&self, panels: &mut [Vec<GeomLayer>], scales: &mut BTreeMap<Aes, Scale>) -> Result<()> {
        for panel in panels.iter().flatten() {
            for (&aes, var) in &panel.values {
                if aes.is_unscaled() || !var.is_stat() {
                    continue;
                }
                if !panel.data.is_numeric(var) {
                    self.register_scale(scales, aes, &panel.data, var)?;
                } else if !scales.contains_key(&scale_aes(aes)) {
                    scales.insert(scale_aes(aes), self.base_scale(scale_aes(aes), var, false));
                }
            }
        }
        for panel in panels.iter_mut().flatten() {
            let text: Vec<(Aes, Variable)> = panel
                .values
                .iter()
                .filter(|(aes, var)| !aes.is_unscaled() && !panel.data.is_numeric(var))
                .map(|(aes, var)| (*aes, var.clone()))
                .collect();
            for (aes, var) in text {
                let Some(scale) = scales.get(&scale_aes(aes)) else { continue };
                let values = scale.transform_values(&panel.data.values(&var).unwrap_or_default());
                panel.data = panel.data.put_numeric(Variable::transform(aes), values)?;
                panel.values.insert(aes, Variable::transform(aes));
            }
        }
        Ok(())
    }

    fn mappers(&self, scales: &BTreeMap<Aes, Scale>) -> Result<BTreeMap<Aes, GuideMapper<AesValue>>> {
        scales
            .iter()
            .filter(|(aes, _)| !aes.is_positional())
            .map(|(&aes, scale)| {
                let provider = self.providers.get(&aes).cloned().unwrap_or_else(|| AesMapperProvider::default_for(aes));
                Ok((aes, provider.create_mapper(scale)?))
            })
            .collect()
    }

    /// Expanded domain of a positional axis and its scale with breaks.
    fn positional_domain(
        &self,
        axis: Aes,
        layers: &[StitchedPlotLayer],
        resolutions: &[(f64, f64)],
        scale: Option<Scale>,
    ) -> (Span, Scale) {
        let scale = scale.unwrap_or_else(|| Scale::continuous(axis).build());
        let mut range: Option<Span> = None;
        for (layer, &(x_res, y_res)) in layers.iter().zip(resolutions) {
            let kind = layer.kind();
            let (width_axis, width_aes, res) = if layer.is_vertical() {
                (Aes::X, Aes::Width, x_res)
            } else {
                (Aes::Y, Aes::Height, y_res)
            };
            let padded = axis == width_axis && matches!(kind, GeomKind::Bar | GeomKind::CrossBar | GeomKind::ErrorBar);
            for p in layer.layers().iter().flat_map(|l| l.aesthetics().points()) {
                for aes in Aes::ALL.into_iter().filter(|a| on_axis(*a, axis)) {
                    include(&mut range, p.number(aes));
                }
                if padded {
                    if let (Some(c), Some(w)) = (p.number(axis), p.number(width_aes)) {
                        include(&mut range, Some(c - w * res / 2.0));
                        include(&mut range, Some(c + w * res / 2.0));
                    }
                }
            }
            let has_rows = layer.layers().iter().any(|l| !l.aesthetics().is_empty());
            if axis == Aes::Y && has_rows && matches!(kind, GeomKind::Bar | GeomKind::Area) {
                include(&mut range, Some(0.0));
            }
        }
        if let Some(levels) = scale.discrete_transform().and_then(DiscreteTransform::transformed_span) {
            range = Some(range.map_or(levels, |r| r.union(levels)));
        }

        let limits = if axis == Aes::X { self.coord.x_limits() } else { self.coord.y_limits() };
        let mut range = limits.or(range).unwrap_or_else(|| Span::new(0.0, 1.0));
        if let Some(t) = scale.continuous_transform() {
            let (lower, upper) = t.defined_limits();
            let lower = lower.and_then(|v| t.apply(v)).unwrap_or(range.lower());
            let upper = upper.and_then(|v| t.apply(v)).unwrap_or(range.upper());
            range = Span::new(lower, upper);
        }
        if range.is_degenerate() {
            range = range.expanded(0.5);
        }
        let scale = if scale.is_continuous_domain() {
            scale.with_domain(data_space(&scale, range))
        } else {
            scale
        };
        let domain = if limits.is_some() { range } else { scale.expand(range) };
        (domain, scale)
    }

    fn legends(
        &self,
        layers: &[StitchedPlotLayer],
        scales: &BTreeMap<Aes, Scale>,
        mappers: &BTreeMap<Aes, GuideMapper<AesValue>>,
    ) -> Result<Vec<LegendInfo>> {
        if self.theme.legend.position == LegendPosition::None {
            return Ok(Vec::new());
        }
        let transformed_domains: BTreeMap<Aes, Span> = scales
            .iter()
            .filter_map(|(aes, s)| s.transformed_domain().map(|d| (*aes, d)))
            .collect();
        let ctx = LegendScaleContext { scales, mappers, transformed_domains: &transformed_domains };

        let mut by_title: IndexMap<String, Vec<(Aes, &Scale)>> = IndexMap::new();
        for (&aes, scale) in scales {
            if aes.is_positional()
                || !mappers.contains_key(&aes)
                || !scale.has_breaks()
                || matches!(self.guides.get(&aes), Some(Guide::None))
                || !layers.iter().any(|l| l.show_legend() && l.has_binding(aes))
            {
                continue;
            }
            by_title.entry(scale.name().to_string()).or_default().push((aes, scale));
        }

        let measurer = self.measurer.as_ref();
        let mut out = Vec::new();
        for (title, members) in by_title {
            let (bars, keys): (Vec<_>, Vec<_>) = members.into_iter().partition(|(aes, scale)| {
                aes.is_color() && scale.is_continuous_domain() && !matches!(self.guides.get(aes), Some(Guide::Legend(_)))
            });
            for (aes, scale) in bars {
                let (Some(domain), Some(mapper)) = (transformed_domains.get(&aes), mappers.get(&aes)) else {
                    continue;
                };
                let options = match self.guides.get(&aes) {
                    Some(Guide::ColorBar(o)) => *o,
                    _ => ColorBarOptions::default(),
                };
                let bar = ColorBarAssembler::new(&title, *domain, scale.clone(), mapper.clone(), self.theme.legend.clone())
                    .options(options)
                    .create_color_bar(measurer)?;
                out.extend(bar.map(LegendInfo::ColorBar));
            }
            if keys.is_empty() {
                continue;
            }
            let mut assembler = LegendAssembler::new(&title, self.theme.legend.clone());
            for (aes, _) in &keys {
                if let Some(Guide::Legend(options)) = self.guides.get(aes) {
                    assembler.add_options(*options);
                }
            }
            for layer in layers.iter().filter(|l| l.show_legend()) {
                let aes_list: Vec<Aes> = keys.iter().map(|(a, _)| *a).filter(|a| layer.has_binding(*a)).collect();
                if !aes_list.is_empty() {
                    assembler.add_layer(layer.legend_key(), &aes_list, layer.constants(), &layer.defaults(), &ctx)?;
                }
            }
            out.extend(assembler.create_legend(measurer).map(LegendInfo::Legend));
        }
        Ok(out)
    }
}

/// A layer with its variables resolved against its data.
struct LayerInput<'a> {
    layer: &'a Layer,
    data: &'a DataFrame,
    stat: Arc<dyn Stat>,
    origin: BTreeMap<Aes, Variable>,
    stat_vars: BTreeMap<Aes, Variable>,
    is_vertical: bool,
}

struct StatOutput {
    data: DataFrame,
    values: BTreeMap<Aes, Variable>,
    sources: BTreeMap<Aes, Variable>,
}

impl LayerInput<'_> {
    fn position(&self) -> PositionAdjustment {
        self.layer.position.clone().unwrap_or_else(|| self.layer.kind.default_position())
    }

    /// The layer data plus a transform column per scaled or numeric binding.
    fn transformed(&self, scales: &BTreeMap<Aes, Scale>) -> Result<DataFrame> {
        let mut builder = Builder::from(self.data);
        for (&aes, var) in &self.origin {
            if matches!(aes, Aes::Label | Aes::Group) {
                continue;
            }
            let values = self.data.values(var).unwrap_or_default();
            let transformed = match scales.get(&scale_aes(aes)) {
                Some(scale) if !aes.is_unscaled() => scale.transform_values(&values),
                _ => values.iter().map(DataValue::as_f64).collect(),
            };
            builder = builder.put_numeric(Variable::transform(aes), transformed);
        }
        builder.build()
    }

    /// Discrete non-positional bindings, plus `group`, split rows into groups.
    fn group_vars(&self, scales: &BTreeMap<Aes, Scale>) -> Vec<(Aes, &Variable)> {
        self.origin
            .iter()
            .filter(|&(&aes, _)| {
                aes == Aes::Group
                    || (!aes.is_positional()
                        && !aes.is_unscaled()
                        && scales.get(&aes).is_some_and(|s| !s.is_continuous_domain()))
            })
            .map(|(aes, var)| (*aes, var))
            .collect()
    }

    fn apply_stat(
        &self,
        frame: &DataFrame,
        scales: &BTreeMap<Aes, Scale>,
        ctx: &StatContext,
        messages: &mut Vec<String>,
    ) -> Result<StatOutput> {
        let group_vars = self.group_vars(scales);
        let mut distinct: Vec<Vec<DataValue>> = Vec::new();
        let ids: Vec<usize> = (0..frame.row_count())
            .map(|i| {
                let key: Vec<DataValue> = group_vars
                    .iter()
                    .map(|(_, var)| frame.value(var, i).unwrap_or(DataValue::Null))
                    .collect();
                match distinct.iter().position(|d| *d == key) {
                    Some(id) => id,
                    None => {
                        distinct.push(key);
                        distinct.len() - 1
                    }
                }
            })
            .collect();

        let mut values = BTreeMap::new();
        let mut sources = BTreeMap::new();
        if self.stat.is_identity() {
            let data = frame.put_numeric(GROUP, ids.iter().map(|&g| Some(g as f64)).collect())?;
            for (&aes, var) in &self.origin {
                let value = if matches!(aes, Aes::Label | Aes::Group) { var.clone() } else { Variable::transform(aes) };
                values.insert(aes, value);
                sources.insert(aes, var.clone());
            }
            for (aes, var) in &self.stat_vars {
                log::warn!("geom_{}: {aes} mapped to {var} but the layer has no stat", self.layer.kind);
            }
            return Ok(StatOutput { data, values, sources });
        }

        if distinct.is_empty() {
            distinct.push(Vec::new());
        }
        let mut out: Option<DataFrame> = None;
        for (g, key) in distinct.iter().enumerate() {
            let rows: Vec<usize> = ids.iter().enumerate().filter(|(_, id)| **id == g).map(|(i, _)| i).collect();
            let part = self.stat.apply(&frame.select_indices(&rows), ctx, &mut |m: String| {
                log::info!("{m}");
                messages.push(m);
            })?;
            let n = part.row_count();
            let mut builder = Builder::from(&part);
            for ((aes, var), value) in group_vars.iter().zip(key) {
                if *aes != Aes::Group {
                    let transformed = rows.first().and_then(|&r| {
                        frame.numeric(&Variable::transform(*aes)).and_then(|s| s.get(r).copied().flatten())
                    });
                    builder = builder.put_numeric(Variable::transform(*aes), vec![transformed; n]);
                }
                builder = builder.put((*var).clone(), vec![value.clone(); n]);
            }
            let part = builder.put_numeric(GROUP, vec![Some(g as f64); n]).build()?;
            out = Some(match out {
                Some(acc) => acc.concat(&part)?,
                None => part,
            });
        }
        let data = out.unwrap_or_else(DataFrame::new);
        if data.row_count() == 0 && frame.row_count() > 0 {
            log::warn!("stat_{} produced no rows for geom_{}", self.stat.name(), self.layer.kind);
        }

        for (aes, var) in self.stat.default_mapping() {
            if data.has(&var) {
                values.insert(aes, var.clone());
                sources.insert(aes, var);
            }
        }
        for (aes, var) in &group_vars {
            let value = if *aes == Aes::Group { (*var).clone() } else { Variable::transform(*aes) };
            values.insert(*aes, value);
            sources.insert(*aes, (*var).clone());
        }
        for (&aes, var) in &self.stat_vars {
            if data.has(var) {
                values.insert(aes, var.clone());
                sources.insert(aes, var.clone());
            } else {
                log::warn!("stat_{} does not compute {var}, dropping {aes}", self.stat.name());
            }
        }
        let consumed = self.stat.consumes();
        for (aes, var) in &self.origin {
            if !values.contains_key(aes) && !consumed.contains(aes) {
                log::warn!("stat_{}: {aes} mapped to '{}' is dropped", self.stat.name(), var.name());
            }
        }
        Ok(StatOutput { data, values, sources })
    }
}

/// Scale key: the x family shares X, the y family shares Y.
fn scale_aes(aes: Aes) -> Aes {
    if aes.is_positional_x() {
        Aes::X
    } else if aes.is_positional_y() {
        Aes::Y
    } else {
        aes
    }
}

fn on_axis(aes: Aes, axis: Aes) -> bool {
    if axis == Aes::X {
        aes.is_positional_x()
    } else {
        aes.is_positional_y()
    }
}

fn include(range: &mut Option<Span>, v: Option<f64>) {
    if let Some(v) = v.filter(|v| v.is_finite()) {
        *range = Some(range.map_or(Span::singleton(v), |r| r.include(v)));
    }
}

/// A transformed span mapped back to data space.
fn data_space(scale: &Scale, transformed: Span) -> Span {
    match scale.continuous_transform() {
        Some(t) => Span::new(t.apply_inverse(transformed.lower()), t.apply_inverse(transformed.upper())),
        None => transformed,
    }
}

/// Fit the domains of continuous non-positional scales to the post-stat data.
fn fit_continuous_domains(panels: &[Vec<GeomLayer>], scales: &mut BTreeMap<Aes, Scale>) {
    for (&key, scale) in scales.iter_mut() {
        if key.is_positional() || !scale.is_continuous_domain() {
            continue;
        }
        let range = panels
            .iter()
            .flatten()
            .filter_map(|p| p.values.get(&key).and_then(|var| p.data.range(var)))
            .reduce(Span::union);
        if let Some(range) = range {
            *scale = scale.with_domain(data_space(scale, range));
            log::debug!("scale {key}: domain {range}");
        }
    }
}

/// Smallest data step of a layer along `aes`, 1 on discrete scales.
fn layer_resolution(panels: &[GeomLayer], aes: Aes, scales: &BTreeMap<Aes, Scale>) -> f64 {
    if scales.get(&aes).is_some_and(|s| !s.is_continuous_domain()) {
        return 1.0;
    }
    let res = panels
        .iter()
        .map(|p| p.aesthetics.resolution(aes, f64::INFINITY))
        .fold(f64::INFINITY, f64::min);
    if res.is_finite() { res } else { 1.0 }
}

fn resolve_aesthetics(panel: &GeomLayer, mappers: &BTreeMap<Aes, GuideMapper<AesValue>>) -> Aesthetics {
    let defaults = panel.geom.defaults();
    let groups = panel.data.numeric(&GROUP);
    let points = (0..panel.data.row_count())
        .map(|i| {
            let group = groups.and_then(|g| g.get(i).copied().flatten()).map_or(0, |g| g as usize);
            let mut p = DataPoint::new(i).with_group(group);
            for (aes, v) in defaults.iter() {
                p.set(aes, v.clone());
            }
            for (&aes, var) in &panel.values {
                match aes {
                    Aes::Group => {}
                    Aes::Label => {
                        let text = match panel.data.value(var, i) {
                            Some(DataValue::Number(n)) => Some(format_significant(n)),
                            Some(DataValue::Text(s)) => Some(s),
                            _ => None,
                        };
                        if let Some(text) = text {
                            p.set(aes, AesValue::Text(text));
                        }
                    }
                    _ => {
                        let n = panel.data.numeric(var).and_then(|s| s.get(i).copied().flatten());
                        let value = match mappers.get(&aes) {
                            Some(mapper) if !aes.is_positional() => mapper.map(n),
                            _ => AesValue::Number(n.unwrap_or(f64::NAN)),
                        };
                        p.set(aes, value);
                    }
                }
            }
            for (aes, v) in &panel.constants {
                p.set(*aes, v.clone());
            }
            p
        })
        .collect();
    Aesthetics::new(points)
}

fn tooltip_mapping(layer: &Layer, panel: &GeomLayer, scales: &BTreeMap<Aes, Scale>) -> ContextualMapping {
    let by_aes = panel
        .sources
        .keys()
        .filter_map(|aes| scales.get(&scale_aes(*aes)).map(|s| (*aes, s.clone())))
        .collect();
    let access = MappedDataAccess::new(panel.data.clone(), panel.sources.clone(), by_aes);
    match (&layer.tooltip_lines, &layer.tooltip_title) {
        (Some(lines), title) => ContextualMapping::new(lines.clone(), title.clone(), access),
        (None, Some(title)) => {
            let default = ContextualMapping::default_for(access);
            ContextualMapping::new(default.lines().to_vec(), Some(title.clone()), default.access().clone())
        }
        (None, None) => ContextualMapping::default_for(access),
    }
}

fn layer_info(input: &LayerInput<'_>, layer: &StitchedPlotLayer) -> LayerInfo {
    let bindings = layer
        .layers()
        .first()
        .map(|p| p.sources.iter().map(|(aes, var)| (*aes, var.name().to_string())).collect())
        .unwrap_or_default();
    LayerInfo {
        geom: input.layer.kind,
        stat: input.stat.name().to_string(),
        position: input.position().name().to_string(),
        bindings,
        constants: input.layer.constants.keys().copied().collect(),
        row_count: layer.row_count(),
    }
}

/// Data behind the tooltip at a client point.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Layer index.
    pub layer: usize,
    /// Panel index.
    pub tile: usize,
    /// Row of the panel's post-stat data.
    pub index: usize,
    /// Distance from the pointer to the target in pixels.
    pub distance: f64,
    /// Title line.
    pub title: Option<String>,
    /// Formatted lines.
    pub lines: Vec<LineDataPoint>,
}

/// An assembled, laid-out plot.
#[derive(Debug, Clone)]
pub struct BuiltPlot {
    layers: Vec<StitchedPlotLayer>,
    infos: Vec<LayerInfo>,
    tooltips: Vec<Vec<ContextualMapping>>,
    resolutions: Vec<(f64, f64)>,
    scales: BTreeMap<Aes, Scale>,
    x_domain: Span,
    y_domain: Span,
    legends: Vec<LegendInfo>,
    facet: FacetLayout,
    coord: Coord,
    theme: Theme,
    title: Option<String>,
    messages: Vec<String>,
    measurer: Arc<dyn TextMeasurer>,
    width: u32,
    height: u32,
    rendered: Rendered,
}

impl BuiltPlot {
    fn render(&mut self) {
        let (Some(x_scale), Some(y_scale)) = (self.scales.get(&Aes::X), self.scales.get(&Aes::Y)) else {
            return;
        };
        let frame = PlotFrame {
            layers: &self.layers,
            resolutions: &self.resolutions,
            facet: &self.facet,
            coord: &self.coord,
            theme: &self.theme,
            title: self.title.as_deref(),
            x_scale,
            y_scale,
            x_domain: self.x_domain,
            y_domain: self.y_domain,
            legends: &self.legends,
            measurer: self.measurer.as_ref(),
        };
        let rendered = frame.render(f64::from(self.width), f64::from(self.height));
        let target_count: usize = rendered.targets.iter().flatten().map(Vec::len).sum();
        log::debug!("rendered {}x{}: {target_count} tooltip targets", self.width, self.height);
        self.rendered = rendered;
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Stitched layers in drawing order.
    #[must_use]
    pub fn layers(&self) -> &[StitchedPlotLayer] {
        &self.layers
    }

    /// Summaries of the layers.
    #[must_use]
    pub fn layer_infos(&self) -> &[LayerInfo] {
        &self.infos
    }

    /// Final scale of an aesthetic; x and y family scales sit under X and Y.
    #[must_use]
    pub fn scale(&self, aes: Aes) -> Option<&Scale> {
        self.scales.get(&scale_aes(aes))
    }

    /// Expanded transformed domain of the X aesthetic.
    #[must_use]
    pub fn x_domain(&self) -> Span {
        self.x_domain
    }

    /// Expanded transformed domain of the Y aesthetic.
    #[must_use]
    pub fn y_domain(&self) -> Span {
        self.y_domain
    }

    /// Facet panels.
    #[must_use]
    pub fn facet(&self) -> &FacetLayout {
        &self.facet
    }

    /// Legends and colorbars in layout order.
    #[must_use]
    pub fn legends(&self) -> &[LegendInfo] {
        &self.legends
    }

    /// Messages reported by stats.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Laid-out scene.
    #[must_use]
    pub fn scene(&self) -> &SceneNode {
        &self.rendered.scene
    }

    /// Tooltip targets of a layer on a panel.
    #[must_use]
    pub fn targets(&self, layer: usize, tile: usize) -> &[GeomTarget] {
        self.rendered
            .targets
            .get(layer)
            .and_then(|l| l.get(tile))
            .map_or(&[], Vec::as_slice)
    }

    /// Client rectangle of each panel.
    #[must_use]
    pub fn panels(&self) -> &[Rect] {
        &self.rendered.panels
    }

    /// Output width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tooltip under a client point; upper layers win.
    #[must_use]
    pub fn tooltip(&self, p: Point) -> Option<Tooltip> {
        for (layer, per_tile) in self.rendered.targets.iter().enumerate().rev() {
            for (tile, targets) in per_tile.iter().enumerate() {
                let Some(hit) = TargetLocator::new(targets).search(p) else { continue };
                let mapping = self.tooltips.get(layer).and_then(|t| t.get(tile))?;
                return Some(Tooltip {
                    layer,
                    tile,
                    index: hit.index,
                    distance: hit.distance,
                    title: mapping.title(hit.index),
                    lines: mapping.data_points(hit.index),
                });
            }
        }
        None
    }

    fn encoder(&self) -> SvgEncoder {
        SvgEncoder::new(self.width, self.height)
            .background(Some(self.theme.background))
            .node(self.rendered.scene.clone())
    }

    /// Render to an SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.encoder().render()
    }

    /// Write the SVG document to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be written.
    pub fn write_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.encoder().write_to_file(path)
    }
}

impl batuta_common::display::WithDimensions for BuiltPlot {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.render();
    }
}
