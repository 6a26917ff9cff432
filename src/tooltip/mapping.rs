//! Per-layer access to the data behind a tooltip.

use super::lines::{LineDataPoint, TooltipLine, ValueSource};
use crate::grammar::{Aes, DataFrame, DataValue, Variable};
use crate::scale::Scale;
use std::collections::{BTreeMap, HashSet};

/// Layer data with its aesthetic bindings and scales.
#[derive(Debug, Clone)]
pub struct MappedDataAccess {
    data: DataFrame,
    bindings: BTreeMap<Aes, Variable>,
    scales: BTreeMap<Aes, Scale>,
}

impl MappedDataAccess {
    /// Access over `data` (post-stat) where `bindings` name the variable
    /// behind each mapped aesthetic.
    #[must_use]
    pub fn new(data: DataFrame, bindings: BTreeMap<Aes, Variable>, scales: BTreeMap<Aes, Scale>) -> Self {
        Self { data, bindings, scales }
    }

    /// Layer data.
    #[must_use]
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Whether `aes` is bound to a variable.
    #[must_use]
    pub fn is_mapped(&self, aes: Aes) -> bool {
        self.bindings.contains_key(&aes)
    }

    /// Mapped aesthetics in declaration order.
    pub fn mapped_aes(&self) -> impl Iterator<Item = Aes> + '_ {
        self.bindings.keys().copied()
    }

    /// Variable bound to `aes`.
    #[must_use]
    pub fn variable(&self, aes: Aes) -> Option<&Variable> {
        self.bindings.get(&aes)
    }

    /// Value of a column by name; `None` for nulls and unknown columns.
    #[must_use]
    pub fn data_value(&self, name: &str, index: usize) -> Option<DataValue> {
        let var = self.data.variable(name)?;
        self.data.value(var, index).filter(|v| !v.is_null())
    }

    /// Data-space value behind a mapped aesthetic.
    ///
    /// Stat variables live in transformed space and are mapped back through
    /// the scale's transform.
    #[must_use]
    pub fn original_value(&self, aes: Aes, index: usize) -> Option<DataValue> {
        let var = self.bindings.get(&aes)?;
        let value = self.data.value(var, index).filter(|v| !v.is_null())?;
        let transform = self.scales.get(&aes).and_then(Scale::continuous_transform);
        match (value, transform) {
            (DataValue::Number(n), Some(t)) if var.is_stat() && !t.is_identity() => {
                Some(DataValue::Number(t.apply_inverse(n)))
            }
            (DataValue::Number(n), _) if !n.is_finite() => None,
            (v, _) => Some(v),
        }
    }

    /// Display text of a mapped value, formatted by its scale.
    #[must_use]
    pub fn mapped_text(&self, aes: Aes, index: usize) -> Option<String> {
        let value = self.original_value(aes, index)?;
        Some(match self.scales.get(&aes) {
            Some(scale) => scale.format(&value),
            None => value.to_string(),
        })
    }

    /// Label of a mapped aesthetic: the scale name when set explicitly,
    /// otherwise the variable label.
    #[must_use]
    pub fn label(&self, aes: Aes) -> Option<String> {
        let var = self.bindings.get(&aes)?;
        match self.scales.get(&aes) {
            Some(scale) if scale.name() != aes.name() && !scale.name().is_empty() => Some(scale.name().to_string()),
            _ => Some(var.label().to_string()),
        }
    }
}

/// Tooltip content of a layer.
#[derive(Debug, Clone)]
pub struct ContextualMapping {
    lines: Vec<TooltipLine>,
    title: Option<TooltipLine>,
    access: MappedDataAccess,
}

impl ContextualMapping {
    /// Mapping with explicit lines. Lines reading an unmapped aesthetic are
    /// dropped.
    #[must_use]
    pub fn new(lines: Vec<TooltipLine>, title: Option<TooltipLine>, access: MappedDataAccess) -> Self {
        let lines = lines
            .into_iter()
            .filter(|l| l.mapped_aes().all(|aes| access.is_mapped(aes)))
            .collect();
        Self { lines, title, access }
    }

    /// One line per mapped aesthetic, skipping aesthetics bound to a
    /// variable already shown and grouping-only channels.
    #[must_use]
    pub fn default_for(access: MappedDataAccess) -> Self {
        let mut seen = HashSet::new();
        let lines = access
            .mapped_aes()
            .filter(|aes| *aes != Aes::Group)
            .filter(|aes| access.variable(*aes).is_some_and(|v| seen.insert(v.clone())))
            .map(|aes| TooltipLine::for_source(ValueSource::Mapping(aes)))
            .collect();
        Self { lines, title: None, access }
    }

    /// Lines rendered for a data row; lines with a missing field are skipped.
    #[must_use]
    pub fn data_points(&self, index: usize) -> Vec<LineDataPoint> {
        self.lines
            .iter()
            .filter_map(|l| l.data_point(&self.access, index))
            .collect()
    }

    /// Title rendered for a data row.
    #[must_use]
    pub fn title(&self, index: usize) -> Option<String> {
        self.title
            .as_ref()
            .and_then(|t| t.data_point(&self.access, index))
            .map(|dp| dp.value)
    }

    /// Configured lines.
    #[must_use]
    pub fn lines(&self) -> &[TooltipLine] {
        &self.lines
    }

    /// Data access.
    #[must_use]
    pub fn access(&self) -> &MappedDataAccess {
        &self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ContinuousTransform;
    use crate::grammar::stat::vars;

    fn frame() -> DataFrame {
        DataFrame::builder()
            .put_numeric(Variable::origin("x"), vec![Some(1.0), Some(2.0)])
            .put(Variable::origin("g"), vec![DataValue::from("a"), DataValue::Null])
            .put_numeric(vars::COUNT.clone(), vec![Some(2.0), Some(3.0)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_lines_deduplicate_variables() {
        let bindings = BTreeMap::from([
            (Aes::X, Variable::origin("x")),
            (Aes::Color, Variable::origin("g")),
            (Aes::Fill, Variable::origin("g")),
            (Aes::Group, Variable::origin("g")),
        ]);
        let cm = ContextualMapping::default_for(MappedDataAccess::new(frame(), bindings, BTreeMap::new()));
        assert_eq!(cm.lines().len(), 2);

        let row0 = cm.data_points(0);
        assert_eq!(row0.len(), 2);
        assert_eq!(row0[0].label.as_deref(), Some("x"));
        assert_eq!(row0[1].value, "a");
        // g is null on row 1
        assert_eq!(cm.data_points(1).len(), 1);
    }

    #[test]
    fn test_lines_with_unmapped_aes_are_dropped() {
        let bindings = BTreeMap::from([(Aes::X, Variable::origin("x"))]);
        let access = MappedDataAccess::new(frame(), bindings, BTreeMap::new());
        let lines = vec![
            TooltipLine::for_source(ValueSource::Mapping(Aes::X)),
            TooltipLine::for_source(ValueSource::Mapping(Aes::Size)),
        ];
        let title = TooltipLine::parse_inline("Row @x").ok();
        let cm = ContextualMapping::new(lines, title, access);
        assert_eq!(cm.lines().len(), 1);
        assert_eq!(cm.title(1).as_deref(), Some("Row 2"));
    }

    #[test]
    fn test_stat_values_are_untransformed() {
        let scale = Scale::continuous(Aes::Y)
            .continuous_transform(ContinuousTransform::LOG10)
            .name("Count")
            .build();
        let bindings = BTreeMap::from([(Aes::Y, vars::COUNT.clone())]);
        let access = MappedDataAccess::new(frame(), bindings, BTreeMap::from([(Aes::Y, scale)]));
        assert_eq!(access.original_value(Aes::Y, 0), Some(DataValue::Number(100.0)));
        assert_eq!(access.mapped_text(Aes::Y, 1).as_deref(), Some("1000"));
        assert_eq!(access.label(Aes::Y).as_deref(), Some("Count"));
    }
}
