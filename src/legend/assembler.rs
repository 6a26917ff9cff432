//! Discrete legends: one key per distinct break label across layers.

use super::layout::{grid_placements, GridShape, KeyPlacement, LegendBoxLayout};
use super::wrap_label;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Span};
use crate::grammar::geom::LegendKeyFactory;
use crate::grammar::{Aes, AesValue, AestheticsDefaults, DataPoint, LegendTheme};
use crate::render::{SceneNode, Style, TextMeasurer, TextNode};
use crate::scale::{GuideMapper, Scale};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Breaks generated for a legend whose scale has none.
const AUTO_BREAK_COUNT: usize = 5;

/// Gap between key columns.
const COLUMN_GAP: f64 = 10.0;

/// Row and column preferences of a legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegendOptions {
    /// Requested rows.
    pub row_count: Option<usize>,
    /// Requested columns.
    pub col_count: Option<usize>,
    /// Fill rows before columns.
    pub by_row: bool,
}

impl LegendOptions {
    /// Options with nothing requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `n` rows.
    #[must_use]
    pub fn rows(mut self, n: usize) -> Self {
        self.row_count = Some(n.max(1));
        self
    }

    /// Request `n` columns.
    #[must_use]
    pub fn cols(mut self, n: usize) -> Self {
        self.col_count = Some(n.max(1));
        self
    }

    /// Fill rows first.
    #[must_use]
    pub fn by_row(mut self, by_row: bool) -> Self {
        self.by_row = by_row;
        self
    }

    /// Merge options of several aesthetics; later settings win.
    #[must_use]
    pub fn combine<'a>(all: impl IntoIterator<Item = &'a LegendOptions>) -> Self {
        all.into_iter().fold(Self::default(), |acc, o| Self {
            row_count: o.row_count.or(acc.row_count),
            col_count: o.col_count.or(acc.col_count),
            by_row: o.by_row || acc.by_row,
        })
    }

    /// Grid shape for `n` breaks.
    ///
    /// Explicit counts win; otherwise horizontal legends are one row and
    /// vertical legends one column.
    #[must_use]
    pub fn grid_shape(&self, n: usize, horizontal: bool) -> GridShape {
        let n = n.max(1);
        if self.by_row {
            let cols = match (self.col_count, self.row_count) {
                (Some(col), _) => col.min(n),
                (None, Some(row)) => n.div_ceil(row),
                (None, None) if horizontal => n,
                (None, None) => 1,
            };
            GridShape { rows: n.div_ceil(cols), cols, by_row: true }
        } else {
            let rows = match (self.row_count, self.col_count) {
                (Some(row), _) => row.min(n),
                (None, Some(col)) => n.div_ceil(col),
                (None, None) if !horizontal => n,
                (None, None) => 1,
            };
            GridShape { rows, cols: n.div_ceil(rows), by_row: false }
        }
    }
}

/// Scales, mappers and overall domains a legend reads from.
#[derive(Debug, Clone, Copy)]
pub struct LegendScaleContext<'a> {
    /// Scale per aesthetic.
    pub scales: &'a BTreeMap<Aes, Scale>,
    /// Mapper per aesthetic.
    pub mappers: &'a BTreeMap<Aes, GuideMapper<AesValue>>,
    /// Transformed domain per aesthetic, used when a scale lacks breaks.
    pub transformed_domains: &'a BTreeMap<Aes, Span>,
}

impl LegendScaleContext<'_> {
    /// Breaks of `aes` as (label, visual value) pairs.
    pub(crate) fn break_values(&self, aes: Aes) -> Result<Vec<(String, AesValue)>> {
        let missing = || Error::MissingBreaks(aes.name().to_string());
        let scale = self.scales.get(&aes).ok_or_else(missing)?;
        let scale = with_breaks(scale, self.transformed_domains.get(&aes).copied());
        if !scale.has_breaks() {
            return Err(missing());
        }
        let mapper = self
            .mappers
            .get(&aes)
            .ok_or_else(|| Error::InvalidSpec(format!("no mapper for legend aesthetic {aes}")))?;
        let breaks = scale.scale_breaks();
        Ok(breaks
            .labels()
            .iter()
            .zip(breaks.transformed_values())
            .map(|(label, v)| (label.clone(), mapper.map(Some(*v))))
            .collect())
    }
}

/// `scale`, or a copy with a domain covering `transformed` when it has no breaks.
pub(crate) fn with_breaks(scale: &Scale, transformed: Option<Span>) -> Scale {
    if scale.has_breaks() {
        return scale.clone();
    }
    match (scale.continuous_transform(), transformed) {
        (Some(t), Some(span)) => {
            let domain = Span::new(t.apply_inverse(span.lower()), t.apply_inverse(span.upper()));
            scale.with().break_count(AUTO_BREAK_COUNT).build().with_domain(domain)
        }
        _ => scale.clone(),
    }
}

/// One key of a legend: the label and the key data of every layer showing it.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendBreak {
    label: String,
    layers: Vec<(DataPoint, LegendKeyFactory)>,
}

impl LegendBreak {
    /// Break without contributing layers.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), layers: Vec::new() }
    }

    /// Add a layer's key.
    pub fn add_layer(&mut self, point: DataPoint, factory: LegendKeyFactory) {
        self.layers.push((point, factory));
    }

    /// Label text, possibly wrapped.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether no layer contributes to the break.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Contributing layers in order.
    #[must_use]
    pub fn layers(&self) -> &[(DataPoint, LegendKeyFactory)] {
        &self.layers
    }

    /// Smallest key box fitting every layer's key.
    #[must_use]
    pub fn minimum_key_size(&self) -> Point {
        self.layers.iter().fold(Point::ORIGIN, |acc, (p, f)| {
            let size = f.minimum_key_size(p);
            Point::new(acc.x.max(size.x), acc.y.max(size.y))
        })
    }

    /// Key elements of every layer stacked in a `size` box.
    #[must_use]
    pub fn create_key(&self, size: Point) -> Vec<SceneNode> {
        self.layers.iter().map(|(p, f)| f.create(p, size)).collect()
    }
}

#[derive(Debug, Clone)]
struct LegendLayer {
    labels: Vec<String>,
    keys: Vec<DataPoint>,
    factory: LegendKeyFactory,
}

/// Collects the layers sharing one legend title and lays out their keys.
#[derive(Debug, Clone)]
pub struct LegendAssembler {
    title: String,
    theme: LegendTheme,
    options: Vec<LegendOptions>,
    layers: Vec<LegendLayer>,
}

impl LegendAssembler {
    /// Assembler for a legend titled `title`.
    #[must_use]
    pub fn new(title: impl Into<String>, theme: LegendTheme) -> Self {
        Self { title: title.into(), theme, options: Vec::new(), layers: Vec::new() }
    }

    /// Add the row/column preferences of one aesthetic.
    pub fn add_options(&mut self, options: LegendOptions) {
        self.options.push(options);
    }

    /// Number of contributing layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Add a layer showing `aes_list` through the scales in `ctx`.
    ///
    /// The key data of each label starts from the geom `defaults`, then the
    /// layer's `constants`, then the mapped break values.
    pub fn add_layer(
        &mut self,
        factory: LegendKeyFactory,
        aes_list: &[Aes],
        constants: &BTreeMap<Aes, AesValue>,
        defaults: &AestheticsDefaults,
        ctx: &LegendScaleContext<'_>,
    ) -> Result<()> {
        let mut values_by_label: IndexMap<String, BTreeMap<Aes, AesValue>> = IndexMap::new();
        for &aes in aes_list {
            for (label, value) in ctx.break_values(aes)? {
                values_by_label.entry(label).or_default().insert(aes, value);
            }
        }

        let keys = values_by_label
            .values()
            .enumerate()
            .map(|(i, values)| {
                let mut p = DataPoint::new(i);
                for (aes, v) in defaults.iter() {
                    p.set(aes, v.clone());
                }
                for (aes, v) in constants.iter().chain(values) {
                    p.set(*aes, v.clone());
                }
                p
            })
            .collect();
        self.layers.push(LegendLayer { labels: values_by_label.into_keys().collect(), keys, factory });
        Ok(())
    }

    /// Lay out the legend, `None` when no break survives.
    #[must_use]
    pub fn create_legend(&self, measurer: &dyn TextMeasurer) -> Option<LegendSpec> {
        let mut by_label: IndexMap<&str, LegendBreak> = IndexMap::new();
        for layer in &self.layers {
            for (label, key) in layer.labels.iter().zip(&layer.keys) {
                by_label
                    .entry(label.as_str())
                    .or_insert_with(|| {
                        LegendBreak::new(wrap_label(label, self.theme.label_max_length, self.theme.label_max_lines))
                    })
                    .add_layer(key.clone(), layer.factory);
            }
        }
        let breaks: Vec<LegendBreak> = by_label.into_values().filter(|b| !b.is_empty()).collect();
        if breaks.is_empty() {
            log::debug!("legend '{}': no breaks", self.title);
            return None;
        }
        log::debug!("legend '{}': {} breaks from {} layers", self.title, breaks.len(), self.layers.len());
        Some(LegendSpec::new(&self.title, breaks, &self.theme, LegendOptions::combine(&self.options), measurer))
    }
}

fn pretty(v: Point) -> Point {
    let margin = 1.0;
    Point::new((v.x / 2.0).floor() * 2.0 + 1.0 + margin, (v.y / 2.0).floor() * 2.0 + 1.0 + margin)
}

/// Key cell sizes: at least the theme key size, widened to each break's
/// minimum, then equalised across the legend's cross axis.
#[must_use]
pub fn key_sizes(breaks: &[LegendBreak], theme_key_size: f64, horizontal: bool) -> Vec<Point> {
    let sizes: Vec<Point> = breaks
        .iter()
        .map(|b| {
            let p = pretty(b.minimum_key_size());
            Point::new(theme_key_size.max(p.x), theme_key_size.max(p.y))
        })
        .collect();
    if horizontal {
        let max_height = sizes.iter().map(|s| s.y).fold(0.0, f64::max);
        sizes.into_iter().map(|s| Point::new(s.x, max_height)).collect()
    } else {
        let max_width = sizes.iter().map(|s| s.x).fold(0.0, f64::max);
        sizes.into_iter().map(|s| Point::new(max_width, s.y)).collect()
    }
}

/// A laid-out legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendSpec {
    title: String,
    breaks: Vec<LegendBreak>,
    shape: GridShape,
    placements: Vec<KeyPlacement>,
    layout: LegendBoxLayout,
    theme: LegendTheme,
}

impl LegendSpec {
    /// Lay out `breaks` under `title`.
    #[must_use]
    pub fn new(
        title: &str,
        breaks: Vec<LegendBreak>,
        theme: &LegendTheme,
        options: LegendOptions,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let horizontal = theme.is_horizontal();
        let keys = key_sizes(&breaks, theme.key_size, horizontal);
        let labels: Vec<Point> = breaks.iter().map(|b| measurer.measure(b.label(), theme.text_font_size)).collect();
        let shape = options.grid_shape(breaks.len(), horizontal);
        let (placements, graph_size) = grid_placements(shape, &keys, &labels, theme.label_padding, COLUMN_GAP);
        let title_size = title_size(title, theme, measurer);
        Self {
            title: title.to_string(),
            breaks,
            shape,
            placements,
            layout: LegendBoxLayout::new(title_size, graph_size, horizontal, theme.title_font_size),
            theme: theme.clone(),
        }
    }

    /// Legend title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Breaks in display order.
    #[must_use]
    pub fn breaks(&self) -> &[LegendBreak] {
        &self.breaks
    }

    /// Rows and columns of the key grid.
    #[must_use]
    pub fn grid_shape(&self) -> GridShape {
        self.shape
    }

    /// Key and label positions, relative to the graph origin.
    #[must_use]
    pub fn placements(&self) -> &[KeyPlacement] {
        &self.placements
    }

    /// Title and graph placement.
    #[must_use]
    pub fn layout(&self) -> &LegendBoxLayout {
        &self.layout
    }

    /// Size of the legend box.
    #[must_use]
    pub fn size(&self) -> Point {
        self.layout.size()
    }

    /// Scene of the legend with its top-left corner at `origin`.
    #[must_use]
    pub fn to_scene(&self, origin: Point) -> SceneNode {
        let mut children = legend_frame(&self.title, &self.layout, &self.theme);
        let graph = self.layout.graph_origin();
        for (b, placement) in self.breaks.iter().zip(&self.placements) {
            let key = placement.key.translate(graph);
            children.push(SceneNode::named_group("legend-key", key.origin(), b.create_key(key.size())));
            let label = placement.label.add(graph);
            let lines = b.label().split('\n').count() as f64;
            let top = label.y - lines * self.theme.text_font_size / 2.0;
            children.push(SceneNode::text(TextNode::new(
                Point::new(label.x, top + baseline(self.theme.text_font_size)),
                b.label(),
                self.theme.text_font_size,
                self.theme.text_color,
            )));
        }
        SceneNode::named_group("legend", origin, children)
    }
}

/// Measured title, zero when hidden or blank.
pub(crate) fn title_size(title: &str, theme: &LegendTheme, measurer: &dyn TextMeasurer) -> Point {
    if title.trim().is_empty() || !theme.show_title {
        Point::ORIGIN
    } else {
        measurer.measure(title, theme.title_font_size)
    }
}

/// Background and title nodes of a legend box.
pub(crate) fn legend_frame(title: &str, layout: &LegendBoxLayout, theme: &LegendTheme) -> Vec<SceneNode> {
    let mut nodes = Vec::new();
    if theme.background.a > 0 {
        let size = layout.size();
        nodes.push(SceneNode::rect(Rect::new(0.0, 0.0, size.x, size.y), Style::filled(theme.background)));
    }
    if layout.title_size().y > 0.0 {
        nodes.push(SceneNode::text(TextNode::new(
            Point::new(0.0, baseline(theme.title_font_size)),
            title,
            theme.title_font_size,
            theme.text_color,
        )));
    }
    nodes
}

/// Baseline offset of the first text line below its top.
pub(crate) fn baseline(font_size: f64) -> f64 {
    font_size * 0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::grammar::{DataValue, LegendDirection, LegendPosition};
    use crate::render::HeuristicTextMeasurer;
    use crate::scale::AesMapperProvider;
    use crate::transform::DiscreteTransform;

    struct Fixture {
        scales: BTreeMap<Aes, Scale>,
        mappers: BTreeMap<Aes, GuideMapper<AesValue>>,
        domains: BTreeMap<Aes, Span>,
    }

    impl Fixture {
        fn discrete(aes: Aes, levels: &[&str]) -> Self {
            let levels = DiscreteTransform::new(levels.iter().map(|l| DataValue::from(*l)).collect());
            let scale = Scale::discrete(aes, levels).build();
            let mapper = AesMapperProvider::default_for(aes).create_mapper(&scale).unwrap();
            Self {
                scales: BTreeMap::from([(aes, scale)]),
                mappers: BTreeMap::from([(aes, mapper)]),
                domains: BTreeMap::new(),
            }
        }

        fn ctx(&self) -> LegendScaleContext<'_> {
            LegendScaleContext { scales: &self.scales, mappers: &self.mappers, transformed_domains: &self.domains }
        }
    }

    fn break_with(factory: LegendKeyFactory, p: DataPoint) -> LegendBreak {
        let mut b = LegendBreak::new("b");
        b.add_layer(p, factory);
        b
    }

    #[test]
    fn test_grid_shape_by_column() {
        let o = LegendOptions::new();
        assert_eq!(o.grid_shape(5, false), GridShape { rows: 5, cols: 1, by_row: false });
        assert_eq!(o.grid_shape(5, true), GridShape { rows: 1, cols: 5, by_row: false });
        assert_eq!(o.rows(2).grid_shape(5, false), GridShape { rows: 2, cols: 3, by_row: false });
        assert_eq!(o.rows(9).grid_shape(5, false), GridShape { rows: 5, cols: 1, by_row: false });
        assert_eq!(o.cols(2).grid_shape(5, false), GridShape { rows: 3, cols: 2, by_row: false });
    }

    #[test]
    fn test_grid_shape_by_row() {
        let o = LegendOptions::new().by_row(true);
        assert_eq!(o.grid_shape(5, true), GridShape { rows: 1, cols: 5, by_row: true });
        assert_eq!(o.grid_shape(5, false), GridShape { rows: 5, cols: 1, by_row: true });
        assert_eq!(o.cols(3).grid_shape(5, false), GridShape { rows: 2, cols: 3, by_row: true });
        assert_eq!(o.rows(2).grid_shape(5, false), GridShape { rows: 2, cols: 3, by_row: true });
        // explicit columns win over explicit rows
        assert_eq!(o.rows(5).cols(2).grid_shape(5, false), GridShape { rows: 3, cols: 2, by_row: true });
    }

    #[test]
    fn test_combine_options() {
        let a = LegendOptions::new().rows(2);
        let b = LegendOptions::new().cols(3).by_row(true);
        let c = LegendOptions::new().rows(4);
        assert_eq!(
            LegendOptions::combine([&a, &b, &c]),
            LegendOptions { row_count: Some(4), col_count: Some(3), by_row: true }
        );
    }

    #[test]
    fn test_pretty_key_size() {
        assert_eq!(pretty(Point::new(5.0, 6.0)), Point::new(6.0, 8.0));
        assert_eq!(pretty(Point::new(0.0, 0.0)), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_key_sizes_vertical_share_width() {
        let small = break_with(LegendKeyFactory::Rect, DataPoint::new(0).with(Aes::Size, 0.5));
        let big = break_with(LegendKeyFactory::Point { fatten: 1.0 }, DataPoint::new(0).with(Aes::Size, 12.0));
        let sizes = key_sizes(&[small, big], 23.0, false);
        // 12 * 2.2 = 26.4 glyph + 2 padding -> 28.4 -> pretty 30
        assert_eq!(sizes[0], Point::new(30.0, 23.0));
        assert_eq!(sizes[1], Point::new(30.0, 30.0));
    }

    #[test]
    fn test_key_sizes_horizontal_share_height() {
        let small = break_with(LegendKeyFactory::Rect, DataPoint::new(0).with(Aes::Size, 0.5));
        let big = break_with(LegendKeyFactory::Point { fatten: 1.0 }, DataPoint::new(0).with(Aes::Size, 12.0));
        let sizes = key_sizes(&[small, big], 23.0, true);
        assert_eq!(sizes[0], Point::new(23.0, 30.0));
        assert_eq!(sizes[1], Point::new(30.0, 30.0));
    }

    #[test]
    fn test_breaks_grouped_by_label_across_layers() {
        let color = Fixture::discrete(Aes::Color, &["a", "b"]);
        let more = Fixture::discrete(Aes::Color, &["b", "c"]);
        let mut assembler = LegendAssembler::new("kind", LegendTheme::default());
        let defaults = AestheticsDefaults::point();
        assembler
            .add_layer(LegendKeyFactory::Point { fatten: 1.0 }, &[Aes::Color], &BTreeMap::new(), &defaults, &color.ctx())
            .unwrap();
        assembler
            .add_layer(LegendKeyFactory::HLine, &[Aes::Color], &BTreeMap::new(), &defaults, &more.ctx())
            .unwrap();

        let legend = assembler.create_legend(&HeuristicTextMeasurer).unwrap();
        let labels: Vec<&str> = legend.breaks().iter().map(LegendBreak::label).collect();
        assert_eq!(labels, ["a", "b", "c"]);
        assert_eq!(legend.breaks()[1].layers().len(), 2);
        assert_eq!(legend.breaks()[0].layers()[0].0.color(), color.mappers[&Aes::Color].map(Some(0.0)).as_color().unwrap());
        assert_eq!(legend.grid_shape(), GridShape { rows: 3, cols: 1, by_row: false });
    }

    #[test]
    fn test_constants_override_defaults() {
        let color = Fixture::discrete(Aes::Color, &["a"]);
        let mut assembler = LegendAssembler::new("", LegendTheme::default());
        let constants = BTreeMap::from([(Aes::Size, AesValue::Number(4.0))]);
        assembler
            .add_layer(LegendKeyFactory::Rect, &[Aes::Color], &constants, &AestheticsDefaults::bar(), &color.ctx())
            .unwrap();
        let legend = assembler.create_legend(&HeuristicTextMeasurer).unwrap();
        let key = &legend.breaks()[0].layers()[0].0;
        assert_eq!(key.size(), 4.0);
        assert_eq!(key.fill(), Rgba::rgb(118, 118, 118));
        // no title
        assert_eq!(legend.layout().title_size(), Point::ORIGIN);
    }

    #[test]
    fn test_missing_scale_is_an_error() {
        let empty = Fixture { scales: BTreeMap::new(), mappers: BTreeMap::new(), domains: BTreeMap::new() };
        let mut assembler = LegendAssembler::new("t", LegendTheme::default());
        let err = assembler
            .add_layer(LegendKeyFactory::Rect, &[Aes::Fill], &BTreeMap::new(), &AestheticsDefaults::bar(), &empty.ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "No breaks were defined for scale fill");
    }

    #[test]
    fn test_continuous_scale_without_domain_uses_transformed_domain() {
        let scale = Scale::continuous(Aes::Size).build();
        let mut fixture = Fixture { scales: BTreeMap::new(), mappers: BTreeMap::new(), domains: BTreeMap::new() };
        let mapper = AesMapperProvider::default_for(Aes::Size)
            .create_mapper(&scale.with_domain(Span::new(0.0, 10.0)))
            .unwrap();
        fixture.scales.insert(Aes::Size, scale);
        fixture.mappers.insert(Aes::Size, mapper);
        fixture.domains.insert(Aes::Size, Span::new(0.0, 10.0));

        let values = fixture.ctx().break_values(Aes::Size).unwrap();
        assert!(values.len() >= 3);
        assert_eq!(values[0].0, "0");
    }

    #[test]
    fn test_empty_assembler_has_no_legend() {
        let assembler = LegendAssembler::new("t", LegendTheme::default());
        assert!(assembler.create_legend(&HeuristicTextMeasurer).is_none());
    }

    #[test]
    fn test_long_labels_are_wrapped() {
        let long = "a very long category label that will not fit on a single legend line at all";
        let color = Fixture::discrete(Aes::Color, &[long]);
        let mut assembler = LegendAssembler::new("t", LegendTheme::default());
        assembler
            .add_layer(LegendKeyFactory::Rect, &[Aes::Color], &BTreeMap::new(), &AestheticsDefaults::bar(), &color.ctx())
            .unwrap();
        let legend = assembler.create_legend(&HeuristicTextMeasurer).unwrap();
        assert!(legend.breaks()[0].label().contains('\n'));
    }

    #[test]
    fn test_scene_has_one_key_group_per_break() {
        let color = Fixture::discrete(Aes::Color, &["a", "b", "c"]);
        let theme = LegendTheme::default().position(LegendPosition::Bottom).direction(LegendDirection::Horizontal);
        let mut assembler = LegendAssembler::new("kind", theme);
        assembler
            .add_layer(LegendKeyFactory::Rect, &[Aes::Color], &BTreeMap::new(), &AestheticsDefaults::bar(), &color.ctx())
            .unwrap();
        let legend = assembler.create_legend(&HeuristicTextMeasurer).unwrap();
        assert_eq!(legend.grid_shape(), GridShape { rows: 1, cols: 3, by_row: false });

        let scene = legend.to_scene(Point::new(10.0, 20.0));
        let keys = scene.descendants().into_iter().filter(|n| n.id() == Some("legend-key")).count();
        assert_eq!(keys, 3);
        let texts = scene.descendants().into_iter().filter(|n| matches!(n, SceneNode::Text(_))).count();
        // title plus three labels
        assert_eq!(texts, 4);
        // title is left of the keys
        assert!(legend.placements()[0].key.translate(legend.layout().graph_origin()).x > 0.0);
    }
}
