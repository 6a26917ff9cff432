//! Plot specification documents.
//!
//! A [`PlotSpec`] is the declarative, serializable form of a plot: columnar
//! data, aesthetic mappings, layers, scales, guides, theme, coordinates and
//! facets. It is read from JSON with [`parse_plot_spec`] or
//! [`PlotSpec::from_json_value`] and turned into a [`PlotAssembler`] with
//! [`PlotSpec::assembler`].
//!
//! ```rust
//! use gogviz::config::parse_plot_spec;
//!
//! let spec = parse_plot_spec(
//!     "{'kind': 'plot',
//!       'data': {'x': [1, 2, 3], 'y': [3, 1, 2]},
//!       'mapping': {'x': 'x', 'y': 'y'},
//!       'layers': [{'geom': 'point', 'color': 'red'}]}",
//! )
//! .unwrap();
//! let plot = spec.assembler().unwrap().build().unwrap();
//! assert_eq!(plot.layer_count(), 1);
//! ```

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::grammar::stat::{
    self, AggregateFunction, BinStat, CorrelationMethod, CorrelationStat, MatrixType, SmoothStat, Stat,
    SummaryStat,
};
use crate::grammar::{
    Aes, AesKind, AesValue, Coord, DataFrame, DataValue, Facet, GeomKind, Layer, LegendDirection, LegendPosition,
    LineType, Mapping, PlotAssembler, PointShape, PositionAdjustment, Sampling, Theme, Variable,
};
use crate::legend::{ColorBarOptions, Guide, LegendOptions};
use crate::scale::{
    AesMapperProvider, ColorGradientMapperProvider, ColorHueMapperProvider, ColorMapperProvider, LabelFormatter,
    Scale, DEF_GRADIENT_HIGH, DEF_GRADIENT_LOW, DEF_NA_COLOR,
};
use crate::tooltip::TooltipLine;
use crate::transform::{ContinuousTransform, DiscreteTransform, TransformKind};
use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Column name to cell values, in document order.
pub type DataColumns = IndexMap<String, Vec<Value>>;

/// Aesthetic name to column name.
pub type MappingSpec = IndexMap<String, String>;

/// Layer options read by stats rather than turned into constants.
const STAT_OPTIONS: [&str; 14] = [
    "bins", "binwidth", "center", "boundary", "method", "type", "diag", "fun", "fun_min", "fun_max",
    "quantiles", "se", "level", "n",
];

/// Parse a JSON plot specification.
///
/// Single quotes are replaced by double quotes first, so the compact
/// `{'kind': 'plot'}` form is accepted. Apostrophes inside string values
/// are replaced too.
///
/// # Errors
///
/// Returns [`Error::Json`] for malformed documents and [`Error::InvalidSpec`]
/// for an unsupported `kind`.
pub fn parse_plot_spec(text: &str) -> Result<PlotSpec> {
    let value: Value = serde_json::from_str(&text.replace('\'', "\""))?;
    PlotSpec::from_json_value(value)
}

/// A complete plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotSpec {
    /// Document kind; only `plot` is supported.
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Plot data shared by every layer without its own.
    #[serde(default)]
    pub data: DataColumns,

    /// Plot-level aesthetic mapping.
    #[serde(default)]
    pub mapping: MappingSpec,

    /// Semantic annotations of columns and mappings.
    #[serde(default)]
    pub data_meta: DataMeta,

    /// Geometry layers, bottom to top.
    #[serde(default)]
    pub layers: Vec<LayerSpec>,

    /// Explicit scales.
    #[serde(default)]
    pub scales: Vec<ScaleSpec>,

    /// Theme.
    #[serde(default)]
    pub theme: Option<ThemeSpec>,

    /// Coordinate system.
    #[serde(default)]
    pub coord: Option<CoordSpec>,

    /// Guides keyed by aesthetic name.
    #[serde(default)]
    pub guides: IndexMap<String, GuideSpec>,

    /// Faceting.
    #[serde(default)]
    pub facet: Option<FacetSpec>,

    /// Plot title.
    #[serde(default)]
    pub title: Option<String>,

    /// Output size in pixels.
    #[serde(default)]
    pub size: Option<SizeSpec>,
}

fn default_kind() -> String {
    "plot".to_string()
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            data: DataColumns::new(),
            mapping: MappingSpec::new(),
            data_meta: DataMeta::default(),
            layers: Vec::new(),
            scales: Vec::new(),
            theme: None,
            coord: None,
            guides: IndexMap::new(),
            facet: None,
            title: None,
            size: None,
        }
    }
}

impl PlotSpec {
    /// Read a plot from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the document does not match the plot
    /// schema and [`Error::InvalidSpec`] for an unsupported `kind`.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let spec: Self = serde_json::from_value(value)?;
        if spec.kind != "plot" {
            return Err(Error::InvalidSpec(format!("unsupported plot kind '{}'", spec.kind)));
        }
        Ok(spec)
    }

    /// Assembler configured with everything in this specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for unknown names (geoms, stats,
    /// aesthetics, transforms, themes) and malformed option values,
    /// [`Error::InvalidColor`] for bad colors, and
    /// [`Error::DataLengthMismatch`] for ragged data columns.
    pub fn assembler(&self) -> Result<PlotAssembler> {
        let mut plot = PlotAssembler::new()
            .data(self.data_meta.frame(&self.data)?)
            .mapping(parse_mapping(&self.mapping)?);
        for layer in &self.layers {
            plot = plot.layer(layer.to_layer(&self.data_meta)?);
        }

        let mut scaled = Vec::new();
        for spec in &self.scales {
            let aes = parse_aes(&spec.aesthetic)?;
            let discrete = spec.discrete || self.is_discrete(aes);
            let formatter = (!discrete && self.is_datetime(aes)).then(datetime_formatter);
            plot = plot.scale(spec.to_scale(aes, discrete, formatter)?);
            if let Some(provider) = spec.mapper_provider(aes)? {
                plot = plot.mapper_provider(aes, provider);
            }
            if let Some(guide) = &spec.guide {
                plot = plot.guide(aes, guide.to_guide()?);
            }
            scaled.push(aes);
        }
        for aes in Aes::ALL.into_iter().filter(|a| !a.is_unscaled() && !scaled.contains(a)) {
            if let Some(scale) = self.implicit_scale(aes) {
                plot = plot.scale(scale);
            }
        }

        for (name, guide) in &self.guides {
            plot = plot.guide(parse_aes(name)?, guide.to_guide()?);
        }
        if let Some(theme) = &self.theme {
            plot = plot.theme(theme.to_theme()?);
        }
        if let Some(coord) = &self.coord {
            plot = plot.coord(coord.to_coord()?);
        }
        if let Some(facet) = &self.facet {
            plot = plot.facet(facet.to_facet()?);
        }
        if let Some(title) = &self.title {
            plot = plot.title(title.clone());
        }
        if let Some(size) = self.size {
            plot = plot.dimensions(size.width, size.height);
        }
        Ok(plot)
    }

    /// Scale for an aesthetic whose data asks for one without a scale entry.
    fn implicit_scale(&self, aes: Aes) -> Option<Scale> {
        if let Some(annotation) = self.data_meta.discrete_annotation(aes) {
            let mut builder = Scale::discrete(aes, DiscreteTransform::new(Vec::new()));
            if let Some(label) = annotation.parameters.label.as_deref() {
                builder = builder.name(label);
            }
            return Some(builder.build());
        }
        self.is_datetime(aes)
            .then(|| Scale::continuous(aes).label_formatter(datetime_formatter()).build())
    }

    /// Data columns bound to `aes` by the plot or any layer.
    fn bindings(&self, aes: Aes) -> Vec<(&DataColumns, &str)> {
        let mut out = Vec::new();
        if let Some(col) = mapped_column(&self.mapping, aes) {
            out.push((&self.data, col));
            out.extend(self.layers.iter().filter_map(|l| l.data.as_ref()).map(|d| (d, col)));
        }
        for layer in &self.layers {
            if let Some(col) = mapped_column(&layer.mapping, aes) {
                out.push((layer.data.as_ref().unwrap_or(&self.data), col));
            }
        }
        out
    }

    fn is_discrete(&self, aes: Aes) -> bool {
        matches!(aes, Aes::Shape | Aes::LineType)
            || self.data_meta.discrete_annotation(aes).is_some()
            || self.bindings(aes).into_iter().any(|(data, col)| {
                self.data_meta.series_type(col) == SeriesType::Discrete
                    || data.get(col).is_some_and(|cells| cells.iter().any(Value::is_string))
            })
    }

    fn is_datetime(&self, aes: Aes) -> bool {
        self.bindings(aes)
            .into_iter()
            .any(|(_, col)| self.data_meta.series_type(col) == SeriesType::Datetime)
    }
}

/// Output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

// ============================================================================
// Data
// ============================================================================

/// Semantic annotations of the plot data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataMeta {
    /// Column types.
    #[serde(default)]
    pub series_annotations: Vec<SeriesAnnotation>,

    /// Per-aesthetic annotations such as `as_discrete`.
    #[serde(default)]
    pub mapping_annotations: Vec<MappingAnnotation>,
}

/// Declared type of one data column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesAnnotation {
    /// Column name.
    pub column: String,
    /// Declared type.
    #[serde(rename = "type", default)]
    pub kind: SeriesType,
}

/// Semantic type of a data column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    /// Integer numbers.
    Int,
    /// Floating point numbers.
    Float,
    /// Text.
    Str,
    /// Booleans.
    Bool,
    /// Milliseconds since the Unix epoch, labelled as dates.
    Datetime,
    /// Categories, even when the cells are numbers.
    Discrete,
    /// Anything else.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Annotation attached to an aesthetic mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingAnnotation {
    /// Aesthetic name.
    pub aes: String,
    /// Annotation name; `as_discrete` is the one acted on.
    pub annotation: String,
    /// Annotation parameters.
    #[serde(default)]
    pub parameters: AnnotationParameters,
}

/// Parameters of a [`MappingAnnotation`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationParameters {
    /// Scale name replacing the column name.
    #[serde(default)]
    pub label: Option<String>,
}

impl DataMeta {
    /// Declared type of `column`.
    #[must_use]
    pub fn series_type(&self, column: &str) -> SeriesType {
        self.series_annotations
            .iter()
            .find(|a| a.column == column)
            .map_or(SeriesType::Unknown, |a| a.kind)
    }

    fn discrete_annotation(&self, aes: Aes) -> Option<&MappingAnnotation> {
        self.mapping_annotations
            .iter()
            .find(|a| a.annotation == "as_discrete" && Aes::from_name(&a.aes) == Some(aes))
    }

    /// Data frame of `columns`; columns annotated discrete stay categorical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] for ragged columns.
    pub fn frame(&self, columns: &DataColumns) -> Result<DataFrame> {
        let mut builder = DataFrame::builder();
        for (name, cells) in columns {
            let values = cells.iter().map(data_value).collect();
            let var = Variable::origin(name.clone());
            builder = match self.series_type(name) {
                SeriesType::Discrete => builder.put_discrete(var, values),
                _ => builder.put(var, values),
            };
        }
        builder.build()
    }
}

fn data_value(cell: &Value) -> DataValue {
    match cell {
        Value::Null => DataValue::Null,
        Value::Number(n) => n.as_f64().map_or(DataValue::Null, DataValue::Number),
        Value::String(s) => DataValue::Text(s.clone()),
        other => DataValue::Text(other.to_string()),
    }
}

fn parse_aes(name: &str) -> Result<Aes> {
    Aes::from_name(name).ok_or_else(|| Error::InvalidSpec(format!("unknown aesthetic '{name}'")))
}

fn mapped_column(mapping: &MappingSpec, aes: Aes) -> Option<&str> {
    mapping
        .iter()
        .find(|(name, _)| Aes::from_name(name) == Some(aes))
        .map(|(_, column)| column.as_str())
}

fn parse_mapping(spec: &MappingSpec) -> Result<Mapping> {
    spec.iter()
        .try_fold(Mapping::new(), |mapping, (aes, column)| -> Result<Mapping> {
            Ok(mapping.map(parse_aes(aes)?, column))
        })
}

/// `YYYY-MM-DD`, with `HH:MM` appended off midnight, for epoch milliseconds.
fn datetime_formatter() -> LabelFormatter {
    Arc::new(datetime_label)
}

fn datetime_label(millis: f64) -> String {
    let Some(at) = DateTime::<Utc>::from_timestamp_millis(millis.floor() as i64) else {
        return millis.to_string();
    };
    if at.num_seconds_from_midnight() == 0 {
        at.format("%Y-%m-%d").to_string()
    } else {
        at.format("%Y-%m-%d %H:%M").to_string()
    }
}

// ============================================================================
// Layers
// ============================================================================

/// One geometry layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Geom name.
    pub geom: String,

    /// Stat name; the geom's default when absent.
    #[serde(default)]
    pub stat: Option<String>,

    /// Layer mapping, merged over the plot mapping.
    #[serde(default)]
    pub mapping: MappingSpec,

    /// Position adjustment name.
    #[serde(default)]
    pub position: Option<String>,

    /// Sampling applied after the stat.
    #[serde(default)]
    pub sampling: Option<SamplingSpec>,

    /// Layer data replacing the plot data.
    #[serde(default)]
    pub data: Option<DataColumns>,

    /// Tooltip content.
    #[serde(default)]
    pub tooltips: Option<TooltipsSpec>,

    /// Whether the layer contributes to legends.
    #[serde(default)]
    pub show_legend: Option<bool>,

    /// `y` lays a flippable geom out horizontally, `x` vertically.
    #[serde(default)]
    pub orientation: Option<String>,

    /// Aesthetic constants (`"color": "red"`) and stat options (`"bins": 20`).
    #[serde(flatten)]
    pub options: IndexMap<String, Value>,
}

impl LayerSpec {
    /// Layer described by this entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for unknown names and malformed option
    /// values.
    pub fn to_layer(&self, meta: &DataMeta) -> Result<Layer> {
        let kind = GeomKind::from_name(&self.geom)?;
        let stat_name = match (self.stat.as_deref(), self.geom.as_str()) {
            (Some(name), _) => name,
            (None, "histogram") => "bin",
            (None, _) => kind.default_stat(),
        };
        let mut layer = Layer::new(kind)
            .mapping(parse_mapping(&self.mapping)?)
            .stat(build_stat(stat_name, &self.options)?);

        for (key, value) in &self.options {
            if let Some(aes) = Aes::from_name(key) {
                layer = layer.constant(aes, constant(aes, value)?);
            } else if !STAT_OPTIONS.contains(&key.as_str()) {
                log::warn!("layer {}: option '{key}' ignored", self.geom);
            }
        }

        if let Some(name) = &self.position {
            let position = PositionAdjustment::from_name(name)
                .ok_or_else(|| Error::InvalidSpec(format!("unknown position '{name}'")))?;
            layer = layer.position(position);
        }
        if let Some(sampling) = &self.sampling {
            layer = layer.sampling(sampling.to_sampling()?);
        }
        if let Some(columns) = &self.data {
            layer = layer.data(meta.frame(columns)?);
        }
        if let Some(tooltips) = &self.tooltips {
            layer = tooltips.apply(layer)?;
        }
        if let Some(show) = self.show_legend {
            layer = layer.show_legend(show);
        }
        match self.orientation.as_deref() {
            Some("y") => layer = layer.horizontal(true),
            Some("x") => layer = layer.horizontal(false),
            Some(other) => return Err(Error::InvalidSpec(format!("unknown orientation '{other}'"))),
            None => {}
        }
        Ok(layer)
    }
}

fn constant(aes: Aes, value: &Value) -> Result<AesValue> {
    let invalid = || Error::InvalidSpec(format!("invalid {aes} value {value}"));
    match aes.kind() {
        AesKind::Color => Ok(AesValue::Color(Rgba::parse(value.as_str().ok_or_else(invalid)?)?)),
        AesKind::Shape => value
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(PointShape::from_code)
            .map(AesValue::Shape)
            .ok_or_else(invalid),
        AesKind::LineType => {
            let name = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            LineType::from_name(&name).map(AesValue::LineType).ok_or_else(invalid)
        }
        AesKind::Text => Ok(AesValue::Text(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        AesKind::Numeric => value.as_f64().map(AesValue::Number).ok_or_else(invalid),
    }
}

fn build_stat(name: &str, options: &IndexMap<String, Value>) -> Result<Arc<dyn Stat>> {
    let number = |key: &str| options.get(key).and_then(Value::as_f64);
    let count = |key: &str| options.get(key).and_then(Value::as_u64).map(|n| n as usize);
    let text = |key: &str| options.get(key).and_then(Value::as_str);
    let flag = |key: &str| options.get(key).and_then(Value::as_bool);

    Ok(match name.trim().to_ascii_lowercase().as_str() {
        "bin" => {
            let mut s = BinStat::new();
            if let Some(n) = count("bins") {
                s = s.bins(n);
            }
            if let Some(w) = number("binwidth") {
                s = s.bin_width(w);
            }
            if let Some(c) = number("center") {
                s = s.center(c);
            }
            if let Some(b) = number("boundary") {
                s = s.boundary(b);
            }
            Arc::new(s)
        }
        "smooth" => {
            let mut s = SmoothStat::new();
            if let Some(n) = count("n") {
                s = s.points(n);
            }
            if let Some(se) = flag("se") {
                s = s.se(se);
            }
            if let Some(level) = number("level") {
                s = s.level(level);
            }
            Arc::new(s)
        }
        "summary" => {
            let function = |key: &str, default| match text(key) {
                Some(f) => AggregateFunction::from_name(f)
                    .ok_or_else(|| Error::InvalidSpec(format!("unknown aggregate function '{f}'"))),
                None => Ok(default),
            };
            let mut s = SummaryStat::new().with_functions(
                function("fun", AggregateFunction::Mean)?,
                function("fun_min", AggregateFunction::Min)?,
                function("fun_max", AggregateFunction::Max)?,
            );
            if let Some(q) = options.get("quantiles").and_then(Value::as_array) {
                match q.iter().map(Value::as_f64).collect::<Option<Vec<_>>>().as_deref() {
                    Some(&[l, m, u]) => s = s.with_quantiles(l, m, u),
                    _ => return Err(Error::InvalidSpec("quantiles needs three numbers".to_string())),
                }
            }
            Arc::new(s)
        }
        "corr" => {
            let mut s = CorrelationStat::new();
            if let Some(m) = text("method") {
                let method =
                    CorrelationMethod::from_name(m).ok_or_else(|| Error::UnsupportedCorrelationMethod(m.to_string()))?;
                s = s.method(method);
            }
            if let Some(t) = text("type") {
                let matrix =
                    MatrixType::from_name(t).ok_or_else(|| Error::InvalidSpec(format!("unknown matrix type '{t}'")))?;
                s = s.matrix_type(matrix);
            }
            if let Some(diag) = flag("diag") {
                s = s.fill_diagonal(diag);
            }
            Arc::new(s)
        }
        other => stat::from_name(other)?,
    })
}

/// Sampling by name, or with explicit parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SamplingSpec {
    /// `"none"`, or a sampling with the default size.
    Named(String),
    /// Sampling with parameters.
    Options(SamplingOptions),
}

/// Parameters of a [`SamplingSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// `pick`, `systematic`, `random` or `none`.
    pub name: String,
    /// Rows kept.
    #[serde(default = "default_sample_size")]
    pub n: usize,
    /// Seed of random sampling.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_size() -> usize {
    1000
}

impl SamplingSpec {
    fn to_sampling(&self) -> Result<Sampling> {
        let (name, n, seed) = match self {
            Self::Named(name) => (name.as_str(), default_sample_size(), None),
            Self::Options(o) => (o.name.as_str(), o.n, o.seed),
        };
        Sampling::from_name(name, n, seed).ok_or_else(|| Error::InvalidSpec(format!("unknown sampling '{name}'")))
    }
}

/// Tooltip content of a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TooltipsSpec {
    /// `"none"` hides tooltips.
    Named(String),
    /// Explicit lines in the `label|pattern` form with `@name` references.
    Lines {
        /// One entry per tooltip line.
        #[serde(default)]
        lines: Vec<String>,
        /// Title line.
        #[serde(default)]
        title: Option<String>,
    },
}

impl TooltipsSpec {
    fn apply(&self, layer: Layer) -> Result<Layer> {
        match self {
            Self::Named(name) if name == "none" => Ok(layer.tooltip_lines(Vec::new())),
            Self::Named(name) => Err(Error::InvalidSpec(format!("unknown tooltips '{name}'"))),
            Self::Lines { lines, title } => {
                let parsed = lines.iter().map(|l| TooltipLine::parse_inline(l)).collect::<Result<Vec<_>>>()?;
                let layer = layer.tooltip_lines(parsed);
                match title {
                    Some(t) => Ok(layer.tooltip_title(TooltipLine::parse_inline(t)?)),
                    None => Ok(layer),
                }
            }
        }
    }
}

// ============================================================================
// Scales and guides
// ============================================================================

/// One explicit scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleSpec {
    /// Aesthetic name.
    pub aesthetic: String,

    /// Axis or legend title.
    #[serde(default)]
    pub name: Option<String>,

    /// Continuous transform name (`identity`, `log10`, `sqrt`, `reverse`).
    #[serde(default)]
    pub trans: Option<String>,

    /// Break values in data space.
    #[serde(default)]
    pub breaks: Option<Vec<Value>>,

    /// Labels of the breaks.
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    /// `[lower, upper]` of a continuous scale (either may be null), or the
    /// ordered levels of a discrete one.
    #[serde(default)]
    pub limits: Option<Vec<Value>>,

    /// Force a discrete scale.
    #[serde(default)]
    pub discrete: bool,

    /// `[multiplicative]` or `[multiplicative, additive]` expansion.
    #[serde(default)]
    pub expand: Option<Vec<f64>>,

    /// `color_gradient` or `color_hue`.
    #[serde(default)]
    pub scale_mapper_kind: Option<String>,

    /// Gradient start color.
    #[serde(default)]
    pub low: Option<String>,

    /// Gradient end color.
    #[serde(default)]
    pub high: Option<String>,

    /// Color of missing values.
    #[serde(default)]
    pub na_value: Option<String>,

    /// Guide of this scale.
    #[serde(default)]
    pub guide: Option<GuideSpec>,
}

impl ScaleSpec {
    fn to_scale(&self, aes: Aes, discrete: bool, formatter: Option<LabelFormatter>) -> Result<Scale> {
        let mut builder = if discrete {
            let levels = self.limits.iter().flatten().map(data_value).collect();
            Scale::discrete(aes, DiscreteTransform::new(levels))
        } else {
            let kind = match &self.trans {
                Some(t) => TransformKind::from_name(t)
                    .ok_or_else(|| Error::InvalidSpec(format!("unknown transform '{t}'")))?,
                None => TransformKind::Identity,
            };
            let (lower, upper) = match self.limits.as_deref() {
                Some([lower, upper]) => (lower.as_f64(), upper.as_f64()),
                Some(_) => return Err(Error::InvalidSpec(format!("{aes} limits need two values"))),
                None => (None, None),
            };
            Scale::continuous(aes).continuous_transform(ContinuousTransform::new(kind).with_limits(lower, upper))
        };
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(breaks) = &self.breaks {
            builder = builder.breaks(breaks.iter().map(data_value).collect());
        }
        if let Some(labels) = &self.labels {
            builder = builder.labels(labels.clone());
        }
        if let Some(f) = formatter {
            builder = builder.label_formatter(f);
        }
        match self.expand.as_deref() {
            Some([mult]) => builder = builder.multiplicative_expand(*mult),
            Some([mult, add]) => builder = builder.multiplicative_expand(*mult).additive_expand(*add),
            Some(_) => return Err(Error::InvalidSpec(format!("{aes} expand needs one or two values"))),
            None => {}
        }
        Ok(builder.build())
    }

    fn mapper_provider(&self, aes: Aes) -> Result<Option<AesMapperProvider>> {
        let customised = self.low.is_some() || self.high.is_some() || self.na_value.is_some();
        if !aes.is_color() || (!customised && self.scale_mapper_kind.is_none()) {
            return Ok(None);
        }
        let parse = |c: &Option<String>| c.as_deref().map(Rgba::parse).transpose();
        let na = parse(&self.na_value)?.unwrap_or(DEF_NA_COLOR);
        let gradient = ColorGradientMapperProvider::new(
            parse(&self.low)?.unwrap_or(DEF_GRADIENT_LOW),
            parse(&self.high)?.unwrap_or(DEF_GRADIENT_HIGH),
            na,
        );
        let hue = match self.scale_mapper_kind.as_deref() {
            None | Some("color_gradient") => ColorHueMapperProvider::default(),
            Some("color_hue") => ColorHueMapperProvider::new((15.0, 375.0), 100.0, 65.0, 0.0, false, na),
            Some(other) => return Err(Error::InvalidSpec(format!("unknown scale mapper kind '{other}'"))),
        };
        let provider = ColorMapperProvider::new(gradient, hue);
        Ok(Some(AesMapperProvider::Color(Arc::new(provider))))
    }
}

/// Guide by name, or with options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuideSpec {
    /// `none`, `legend` or `colorbar` with default options.
    Named(String),
    /// A guide with options.
    Options(GuideOptions),
}

/// Options of a [`GuideSpec`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideOptions {
    /// `legend` or `colorbar`.
    pub name: String,
    /// Legend rows.
    #[serde(default)]
    pub nrow: Option<usize>,
    /// Legend columns.
    #[serde(default)]
    pub ncol: Option<usize>,
    /// Fill legend keys row by row.
    #[serde(default)]
    pub byrow: bool,
    /// Colorbar width.
    #[serde(default)]
    pub barwidth: Option<f64>,
    /// Colorbar height.
    #[serde(default)]
    pub barheight: Option<f64>,
    /// Colorbar bin count.
    #[serde(default)]
    pub nbin: Option<usize>,
}

impl GuideSpec {
    /// Guide described by this entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for an unknown guide name.
    pub fn to_guide(&self) -> Result<Guide> {
        let options = match self {
            Self::Named(name) => GuideOptions { name: name.clone(), ..GuideOptions::default() },
            Self::Options(o) => o.clone(),
        };
        match options.name.as_str() {
            "none" => Ok(Guide::None),
            "legend" => {
                let mut legend = LegendOptions::new().by_row(options.byrow);
                if let Some(n) = options.nrow {
                    legend = legend.rows(n);
                }
                if let Some(n) = options.ncol {
                    legend = legend.cols(n);
                }
                Ok(Guide::Legend(legend))
            }
            "colorbar" => Ok(Guide::ColorBar(ColorBarOptions {
                width: options.barwidth,
                height: options.barheight,
                bin_count: options.nbin,
            })),
            other => Err(Error::InvalidSpec(format!("unknown guide '{other}'"))),
        }
    }
}

// ============================================================================
// Theme, coordinates and facets
// ============================================================================

/// Named theme with overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSpec {
    /// Base theme (`grey`, `minimal`, `bw`, `classic`, `dark`, `void`).
    #[serde(default = "default_theme_name")]
    pub name: String,

    /// Legend placement.
    #[serde(default)]
    pub legend_position: Option<LegendPosition>,

    /// Legend key layout.
    #[serde(default)]
    pub legend_direction: Option<LegendDirection>,

    /// Legend key size.
    #[serde(default)]
    pub legend_key_size: Option<f64>,

    /// Show legend titles.
    #[serde(default)]
    pub legend_title: Option<bool>,

    /// Characters per wrapped legend label line.
    #[serde(default)]
    pub legend_label_max_length: Option<usize>,

    /// Lines per wrapped legend label.
    #[serde(default)]
    pub legend_label_max_lines: Option<usize>,

    /// Show grid lines.
    #[serde(default)]
    pub grid: Option<bool>,

    /// Show axis lines.
    #[serde(default)]
    pub axis: Option<bool>,

    /// Plot background color.
    #[serde(default)]
    pub background: Option<String>,

    /// Panel background color.
    #[serde(default)]
    pub panel_background: Option<String>,

    /// Outer margin.
    #[serde(default)]
    pub margin: Option<f64>,
}

fn default_theme_name() -> String {
    "grey".to_string()
}

impl Default for ThemeSpec {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            legend_position: None,
            legend_direction: None,
            legend_key_size: None,
            legend_title: None,
            legend_label_max_length: None,
            legend_label_max_lines: None,
            grid: None,
            axis: None,
            background: None,
            panel_background: None,
            margin: None,
        }
    }
}

impl ThemeSpec {
    /// Theme with the overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for an unknown theme name and
    /// [`Error::InvalidColor`] for bad colors.
    pub fn to_theme(&self) -> Result<Theme> {
        let mut theme =
            Theme::by_name(&self.name).ok_or_else(|| Error::InvalidSpec(format!("unknown theme '{}'", self.name)))?;
        if let Some(c) = &self.background {
            theme = theme.background(Rgba::parse(c)?);
        }
        if let Some(c) = &self.panel_background {
            theme = theme.panel_background(Rgba::parse(c)?);
        }
        if let Some(m) = self.margin {
            theme = theme.margin(m);
        }
        if let Some(show) = self.grid {
            theme = theme.grid(show);
        }
        if let Some(show) = self.axis {
            theme = theme.axis(show);
        }
        let legend = &mut theme.legend;
        if let Some(p) = self.legend_position {
            legend.position = p;
        }
        if let Some(d) = self.legend_direction {
            legend.direction = d;
        }
        if let Some(s) = self.legend_key_size {
            legend.key_size = s;
        }
        if let Some(show) = self.legend_title {
            legend.show_title = show;
        }
        if let Some(n) = self.legend_label_max_length {
            legend.label_max_length = n;
        }
        if let Some(n) = self.legend_label_max_lines {
            legend.label_max_lines = n;
        }
        Ok(theme)
    }
}

/// Coordinate system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordSpec {
    /// `cartesian`, `flip` or `fixed`.
    #[serde(default = "default_coord_name")]
    pub name: String,
    /// Horizontal limits.
    #[serde(default)]
    pub xlim: Option<[f64; 2]>,
    /// Vertical limits.
    #[serde(default)]
    pub ylim: Option<[f64; 2]>,
    /// Aspect ratio of `fixed`.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
}

fn default_coord_name() -> String {
    "cartesian".to_string()
}
fn default_ratio() -> f64 {
    1.0
}

impl Default for CoordSpec {
    fn default() -> Self {
        Self { name: default_coord_name(), xlim: None, ylim: None, ratio: default_ratio() }
    }
}

impl CoordSpec {
    /// Coordinate system described by this entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for an unknown name.
    pub fn to_coord(&self) -> Result<Coord> {
        let mut coord = match self.name.as_str() {
            "cartesian" => Coord::cartesian(),
            "flip" => Coord::cartesian().flip(),
            "fixed" => Coord::fixed(self.ratio),
            other => return Err(Error::InvalidSpec(format!("unknown coordinate system '{other}'"))),
        };
        if let Some([a, b]) = self.xlim {
            coord = coord.xlim(a, b);
        }
        if let Some([a, b]) = self.ylim {
            coord = coord.ylim(a, b);
        }
        Ok(coord)
    }
}

/// Faceting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetSpec {
    /// `grid` or `wrap`.
    pub name: String,
    /// Grid: variable splitting columns.
    #[serde(default)]
    pub x: Option<String>,
    /// Grid: variable splitting rows.
    #[serde(default)]
    pub y: Option<String>,
    /// Wrap: variable to facet by.
    #[serde(default)]
    pub facets: Option<String>,
    /// Wrap: number of columns.
    #[serde(default)]
    pub ncol: Option<usize>,
}

impl FacetSpec {
    /// Facet described by this entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for an unknown name or a wrap without
    /// a variable.
    pub fn to_facet(&self) -> Result<Facet> {
        match self.name.as_str() {
            "grid" => Ok(Facet::Grid { row: self.y.clone(), col: self.x.clone() }),
            "wrap" => {
                let var = self
                    .facets
                    .as_deref()
                    .ok_or_else(|| Error::InvalidSpec("facet wrap needs 'facets'".to_string()))?;
                Ok(Facet::wrap(var, self.ncol))
            }
            other => Err(Error::InvalidSpec(format!("unknown facet '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::LegendInfo;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn spec(value: Value) -> PlotSpec {
        PlotSpec::from_json_value(value).unwrap()
    }

    #[test]
    fn test_single_quotes_are_normalised() {
        let spec = parse_plot_spec("{'kind': 'plot', 'data': {'a': [1, 2]}, 'mapping': {'x': 'a'}}").unwrap();
        assert_eq!(spec.kind, "plot");
        assert_eq!(spec.mapping.get("x").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_defaults_and_kind() {
        let spec = spec(json!({}));
        assert_eq!(spec.kind, "plot");
        assert!(spec.layers.is_empty());
        assert!(matches!(
            PlotSpec::from_json_value(json!({"kind": "subplots"})),
            Err(Error::InvalidSpec(_))
        ));
        assert!(matches!(parse_plot_spec("{'kind': "), Err(Error::Json(_))));
    }

    #[test]
    fn test_data_keeps_column_order_and_annotations() {
        let spec = spec(json!({
            "data": {"z": [1, 2], "a": ["u", null], "k": [3, 3]},
            "data_meta": {"series_annotations": [{"column": "k", "type": "discrete"}, {"column": "z", "type": "int"}]}
        }));
        let df = spec.data_meta.frame(&spec.data).unwrap();
        let names: Vec<_> = df.variables().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["z", "a", "k"]);
        assert!(df.is_numeric(df.variable("z").unwrap()));
        assert!(!df.is_numeric(df.variable("k").unwrap()));
        assert_eq!(df.value(df.variable("a").unwrap(), 1), Some(DataValue::Null));
        assert_eq!(spec.data_meta.series_type("z"), SeriesType::Int);
        assert_eq!(spec.data_meta.series_type("missing"), SeriesType::Unknown);
    }

    #[test]
    fn test_ragged_data_is_an_error() {
        let spec = spec(json!({"data": {"a": [1, 2], "b": [1]}}));
        assert!(matches!(spec.assembler(), Err(Error::DataLengthMismatch { .. })));
    }

    #[test]
    fn test_layer_constants_and_stat_options() {
        let layer: LayerSpec = serde_json::from_value(json!({
            "geom": "histogram", "bins": 4, "fill": "#336699", "alpha": 0.5, "shape": 21, "linetype": "dashed",
            "position": "stack", "sampling": {"name": "random", "n": 10, "seed": 3}
        }))
        .unwrap();
        assert_eq!(layer.options.len(), 5);
        let built = layer.to_layer(&DataMeta::default()).unwrap();
        assert_eq!(built.constants.get(&Aes::Fill), Some(&AesValue::Color(Rgba::rgb(0x33, 0x66, 0x99))));
        assert_eq!(built.constants.get(&Aes::Alpha), Some(&AesValue::Number(0.5)));
        assert_eq!(built.constants.get(&Aes::Shape), Some(&AesValue::Shape(PointShape::CircleFilled)));
        assert_eq!(built.constants.get(&Aes::LineType), Some(&AesValue::LineType(LineType::Dashed)));
        assert_eq!(built.stat.as_ref().map(|s| s.name()), Some("bin"));
        assert_eq!(built.sampling, Sampling::Random { n: 10, seed: 3 });
    }

    #[test]
    fn test_layer_errors() {
        let meta = DataMeta::default();
        let bad_color: LayerSpec = serde_json::from_value(json!({"geom": "point", "color": "nope"})).unwrap();
        assert!(matches!(bad_color.to_layer(&meta), Err(Error::InvalidColor(_))));
        let bad_geom: LayerSpec = serde_json::from_value(json!({"geom": "violin"})).unwrap();
        assert!(matches!(bad_geom.to_layer(&meta), Err(Error::InvalidSpec(_))));
        let bad_size: LayerSpec = serde_json::from_value(json!({"geom": "point", "size": "big"})).unwrap();
        assert!(matches!(bad_size.to_layer(&meta), Err(Error::InvalidSpec(_))));
        let bad_fun: LayerSpec =
            serde_json::from_value(json!({"geom": "point", "stat": "summary", "fun": "mode"})).unwrap();
        assert!(matches!(bad_fun.to_layer(&meta), Err(Error::InvalidSpec(_))));
        let bad_method: LayerSpec =
            serde_json::from_value(json!({"geom": "point", "stat": "corr", "method": "cosine"})).unwrap();
        assert!(matches!(bad_method.to_layer(&meta), Err(Error::UnsupportedCorrelationMethod(_))));
    }

    #[test]
    fn test_plot_from_spec_builds() {
        let spec = spec(json!({
            "data": {"x": [1, 2, 3, 4], "y": [2, 4, 1, 3], "g": ["a", "b", "a", "b"]},
            "mapping": {"x": "x", "y": "y"},
            "layers": [{"geom": "point", "mapping": {"color": "g"}, "size": 3}],
            "title": "Points",
            "size": {"width": 400, "height": 300}
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        assert_eq!((plot.width(), plot.height()), (400, 300));
        assert!(!plot.scale(Aes::Color).unwrap().is_continuous_domain());
        assert_eq!(plot.legends().len(), 1);
        assert_eq!(plot.legends()[0].title(), "g");
    }

    #[test]
    fn test_scale_spec_limits_breaks_and_transform() {
        let spec = spec(json!({
            "data": {"x": [1, 10, 100], "y": [1, 2, 3]},
            "mapping": {"x": "x", "y": "y"},
            "layers": [{"geom": "point"}],
            "scales": [
                {"aesthetic": "x", "trans": "log10", "name": "dose"},
                {"aesthetic": "y", "limits": [0, 10], "breaks": [0, 5, 10], "labels": ["lo", "mid", "hi"]}
            ]
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        let x = plot.scale(Aes::X).unwrap();
        assert_eq!(x.name(), "dose");
        assert_eq!(x.continuous_transform().map(ContinuousTransform::kind), Some(TransformKind::Log10));
        let y = plot.scale(Aes::Y).unwrap();
        assert_eq!(y.scale_breaks().labels(), ["lo", "mid", "hi"]);
        assert_relative_eq!(plot.y_domain().lower(), -0.5, epsilon = 1e-9);
        assert_relative_eq!(plot.y_domain().upper(), 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_discrete_limits_declare_level_order() {
        let spec = spec(json!({
            "data": {"x": ["b", "a", "c"], "y": [1, 2, 3]},
            "mapping": {"x": "x", "y": "y"},
            "layers": [{"geom": "bar", "stat": "identity"}],
            "scales": [{"aesthetic": "x", "limits": ["c", "b"]}]
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        let levels = plot.scale(Aes::X).unwrap().discrete_transform().unwrap().levels().to_vec();
        assert_eq!(levels, vec![DataValue::from("c"), "b".into(), "a".into()]);
    }

    #[test]
    fn test_as_discrete_annotation_on_numeric_column() {
        let spec = spec(json!({
            "data": {"x": [1, 2, 3], "y": [1, 2, 3], "k": [1, 2, 1]},
            "data_meta": {"mapping_annotations": [{"aes": "color", "annotation": "as_discrete", "parameters": {"label": "cyl"}}]},
            "mapping": {"x": "x", "y": "y", "color": "k"},
            "layers": [{"geom": "point"}]
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        let color = plot.scale(Aes::Color).unwrap();
        assert!(!color.is_continuous_domain());
        assert_eq!(color.name(), "cyl");
        assert!(matches!(plot.legends()[0], LegendInfo::Legend(_)));
    }

    #[test]
    fn test_gradient_colors_and_guides() {
        let spec = spec(json!({
            "data": {"x": [1, 2, 3], "y": [1, 2, 3], "v": [0.5, 1.0, 2.0]},
            "mapping": {"x": "x", "y": "y", "color": "v"},
            "layers": [{"geom": "point"}],
            "scales": [{"aesthetic": "color", "low": "white", "high": "black"}],
            "guides": {"color": {"name": "colorbar", "nbin": 5, "barheight": 80}}
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        assert!(matches!(plot.legends()[0], LegendInfo::ColorBar(_)));

        let hidden = PlotSpec {
            guides: IndexMap::from([("color".to_string(), GuideSpec::Named("none".to_string()))]),
            ..spec
        };
        assert!(hidden.assembler().unwrap().build().unwrap().legends().is_empty());
    }

    #[test]
    fn test_guide_spec_parsing() {
        let legend: GuideSpec = serde_json::from_value(json!({"name": "legend", "nrow": 2, "byrow": true})).unwrap();
        assert_eq!(legend.to_guide().unwrap(), Guide::Legend(LegendOptions::new().rows(2).by_row(true)));
        let bar = GuideSpec::Named("colorbar".to_string());
        assert_eq!(bar.to_guide().unwrap(), Guide::ColorBar(ColorBarOptions::default()));
        assert!(GuideSpec::Named("key".to_string()).to_guide().is_err());
    }

    #[test]
    fn test_theme_spec_overrides() {
        let spec: ThemeSpec = serde_json::from_value(json!({
            "name": "minimal", "legend_position": "bottom", "legend_key_size": 30, "grid": false, "background": "#fafafa"
        }))
        .unwrap();
        let theme = spec.to_theme().unwrap();
        assert_eq!(theme.legend.position, LegendPosition::Bottom);
        assert!(theme.legend.is_horizontal());
        assert_relative_eq!(theme.legend.key_size, 30.0);
        assert!(!theme.show_grid);
        assert_eq!(theme.background, Rgba::rgb(0xfa, 0xfa, 0xfa));
        let unknown = ThemeSpec { name: "neon".to_string(), ..ThemeSpec::default() };
        assert!(matches!(unknown.to_theme(), Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn test_coord_and_facet_specs() {
        let coord: CoordSpec = serde_json::from_value(json!({"name": "flip", "xlim": [0, 5]})).unwrap();
        let coord = coord.to_coord().unwrap();
        assert!(coord.is_flipped());
        assert_eq!(coord.x_limits().map(|s| (s.lower(), s.upper())), Some((0.0, 5.0)));
        assert!(CoordSpec { name: "polar".to_string(), ..CoordSpec::default() }.to_coord().is_err());

        let grid: FacetSpec = serde_json::from_value(json!({"name": "grid", "x": "g"})).unwrap();
        assert_eq!(grid.to_facet().unwrap(), Facet::cols("g"));
        let wrap: FacetSpec = serde_json::from_value(json!({"name": "wrap", "facets": "g", "ncol": 2})).unwrap();
        assert_eq!(wrap.to_facet().unwrap(), Facet::wrap("g", Some(2)));
        let broken: FacetSpec = serde_json::from_value(json!({"name": "wrap"})).unwrap();
        assert!(broken.to_facet().is_err());
    }

    #[test]
    fn test_tooltips_spec() {
        let layer: LayerSpec = serde_json::from_value(json!({
            "geom": "point", "tooltips": {"lines": ["value|@y"], "title": "@x"}
        }))
        .unwrap();
        let built = layer.to_layer(&DataMeta::default()).unwrap();
        assert_eq!(built.tooltip_lines.as_ref().map(Vec::len), Some(1));
        assert!(built.tooltip_title.is_some());

        let hidden: LayerSpec = serde_json::from_value(json!({"geom": "point", "tooltips": "none"})).unwrap();
        let built = hidden.to_layer(&DataMeta::default()).unwrap();
        assert_eq!(built.tooltip_lines.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_datetime_labels() {
        assert_eq!(datetime_label(0.0), "1970-01-01");
        assert_eq!(datetime_label(31.0 * 86_400_000.0), "1970-02-01");
        assert_eq!(datetime_label(1_700_000_000_000.0), "2023-11-14 22:13");
        assert_eq!(datetime_label(-86_400_000.0), "1969-12-31");
        assert_eq!(datetime_label(11_016.0 * 86_400_000.0), "2000-02-29");
        assert_eq!(datetime_label(f64::MAX), f64::MAX.to_string());
    }

    #[test]
    fn test_datetime_column_gets_date_labels() {
        let spec = spec(json!({
            "data": {"t": [0, 86_400_000, 172_800_000], "y": [1, 2, 3]},
            "data_meta": {"series_annotations": [{"column": "t", "type": "datetime"}]},
            "mapping": {"x": "t", "y": "y"},
            "layers": [{"geom": "line"}]
        }));
        let plot = spec.assembler().unwrap().build().unwrap();
        let x = plot.scale(Aes::X).unwrap();
        assert_eq!(x.name(), "t");
        assert!(x.scale_breaks().labels().iter().all(|l| l.starts_with("1970-01-0")));
    }
}
