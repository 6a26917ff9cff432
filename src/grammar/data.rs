//! Columnar data frame for the plot pipeline.
//!
//! A [`DataFrame`] is an ordered set of [`Variable`]s, each bound to a series
//! of equal length. Frames are immutable: every "mutation" returns a new
//! frame that shares the untouched series.

use super::aes::Aes;
use crate::error::{Error, Result};
use crate::geometry::Span;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value in a data frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A missing value.
    Null,
}

impl DataValue {
    /// Get as f64, or None if not a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Missing value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            DataValue::Number(n) => write!(f, "{n}"),
            DataValue::Text(s) => f.write_str(s),
            DataValue::Null => f.write_str("NA"),
        }
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Number(v)
    }
}

impl From<Option<f64>> for DataValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(DataValue::Null, DataValue::Number)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

/// Where a variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarSource {
    /// A column of the input data.
    Origin,
    /// An aesthetic's values after the scale transform.
    Transform,
    /// Output of a statistical transform.
    Stat,
}

/// A named column. Identity is the name plus the source; the label is only
/// used for display.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Cow<'static, str>,
    label: Cow<'static, str>,
    source: VarSource,
}

impl Variable {
    /// A stat output variable.
    #[must_use]
    pub const fn stat(name: &'static str, label: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            label: Cow::Borrowed(label),
            source: VarSource::Stat,
        }
    }

    /// A column of the input data.
    #[must_use]
    pub fn origin(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            label: Cow::Owned(name.clone()),
            name: Cow::Owned(name),
            source: VarSource::Origin,
        }
    }

    /// The transformed-values variable of an aesthetic.
    #[must_use]
    pub fn transform(aes: Aes) -> Self {
        Self {
            name: Cow::Owned(format!("transform.{}", aes.name())),
            label: Cow::Borrowed(aes.name()),
            source: VarSource::Transform,
        }
    }

    /// Same variable with another display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Cow::Owned(label.into());
        self
    }

    /// Name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source.
    #[must_use]
    pub fn source(&self) -> VarSource {
        self.source
    }

    /// Output of a stat.
    #[must_use]
    pub fn is_stat(&self) -> bool {
        self.source == VarSource::Stat
    }

    /// Column of the input data.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.source == VarSource::Origin
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
enum Series {
    Numeric(Arc<Vec<Option<f64>>>),
    Values(Arc<Vec<DataValue>>),
}

impl Series {
    fn len(&self) -> usize {
        match self {
            Series::Numeric(v) => v.len(),
            Series::Values(v) => v.len(),
        }
    }

    fn value(&self, row: usize) -> Option<DataValue> {
        match self {
            Series::Numeric(v) => v.get(row).map(|n| DataValue::from(*n)),
            Series::Values(v) => v.get(row).cloned(),
        }
    }

    fn select(&self, rows: &[usize]) -> Series {
        match self {
            Series::Numeric(v) => {
                Series::Numeric(Arc::new(rows.iter().filter_map(|&i| v.get(i).copied()).collect()))
            }
            Series::Values(v) => {
                Series::Values(Arc::new(rows.iter().filter_map(|&i| v.get(i).cloned()).collect()))
            }
        }
    }

    fn from_values(values: Vec<DataValue>) -> Series {
        let all_numeric = values.iter().all(|v| matches!(v, DataValue::Number(_) | DataValue::Null));
        if all_numeric {
            Series::Numeric(Arc::new(values.iter().map(DataValue::as_f64).collect()))
        } else {
            Series::Values(Arc::new(values))
        }
    }
}

/// Immutable columnar table.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    columns: IndexMap<Variable, Series>,
    row_count: usize,
}

impl DataFrame {
    /// An empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a frame.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// No rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.columns.keys()
    }

    /// Whether the variable is present.
    #[must_use]
    pub fn has(&self, var: &Variable) -> bool {
        self.columns.contains_key(var)
    }

    /// Whether the variable is absent or has no rows.
    #[must_use]
    pub fn has_no_or_empty(&self, var: &Variable) -> bool {
        !self.has(var) || self.row_count == 0
    }

    /// Look up a variable by name (any source).
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.columns.keys().find(|v| v.name() == name)
    }

    /// Whether the variable holds numbers (or missing values) only.
    #[must_use]
    pub fn is_numeric(&self, var: &Variable) -> bool {
        matches!(self.columns.get(var), Some(Series::Numeric(_)))
    }

    /// Numeric series of a variable; `None` if absent or not numeric.
    #[must_use]
    pub fn numeric(&self, var: &Variable) -> Option<&[Option<f64>]> {
        match self.columns.get(var)? {
            Series::Numeric(v) => Some(v.as_slice()),
            Series::Values(_) => None,
        }
    }

    /// All values of a variable.
    #[must_use]
    pub fn values(&self, var: &Variable) -> Option<Vec<DataValue>> {
        match self.columns.get(var)? {
            Series::Numeric(v) => Some(v.iter().map(|n| DataValue::from(*n)).collect()),
            Series::Values(v) => Some(v.as_ref().clone()),
        }
    }

    /// One cell.
    #[must_use]
    pub fn value(&self, var: &Variable, row: usize) -> Option<DataValue> {
        self.columns.get(var)?.value(row)
    }

    /// Distinct non-missing values in first-encounter order.
    #[must_use]
    pub fn distinct_values(&self, var: &Variable) -> Vec<DataValue> {
        let mut out: Vec<DataValue> = Vec::new();
        for v in self.values(var).unwrap_or_default() {
            if v.is_null() || matches!(v, DataValue::Number(n) if !n.is_finite()) {
                continue;
            }
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    /// Span of the finite values of a numeric variable.
    #[must_use]
    pub fn range(&self, var: &Variable) -> Option<Span> {
        Span::encloses(self.numeric(var)?.iter().flatten().copied())
    }

    /// Keep only the given rows, in the given order.
    #[must_use]
    pub fn select_indices(&self, rows: &[usize]) -> DataFrame {
        let rows: Vec<usize> = rows.iter().copied().filter(|&i| i < self.row_count).collect();
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|(var, s)| (var.clone(), s.select(&rows)))
                .collect(),
            row_count: rows.len(),
        }
    }

    /// Remove the given rows. An empty set returns a frame sharing every series.
    #[must_use]
    pub fn drop_indices(&self, rows: &HashSet<usize>) -> DataFrame {
        if rows.is_empty() {
            return self.clone();
        }
        let keep: Vec<usize> = (0..self.row_count).filter(|i| !rows.contains(i)).collect();
        self.select_indices(&keep)
    }

    /// Rows `start..end` (clamped to the frame).
    #[must_use]
    pub fn slice_by_rows(&self, start: usize, end: usize) -> DataFrame {
        let end = end.min(self.row_count);
        let rows: Vec<usize> = (start.min(end)..end).collect();
        self.select_indices(&rows)
    }

    /// Rows of `self` followed by rows of `other`.
    ///
    /// A variable missing from one side is padded with missing values; a
    /// variable numeric on one side only becomes categorical.
    pub fn concat(&self, other: &DataFrame) -> Result<DataFrame> {
        if self.columns.is_empty() {
            return Ok(other.clone());
        }
        if other.columns.is_empty() {
            return Ok(self.clone());
        }
        let mut vars: Vec<&Variable> = self.columns.keys().collect();
        vars.extend(other.columns.keys().filter(|v| !self.columns.contains_key(*v)));

        let mut builder = Builder::new();
        for var in vars {
            builder = match (self.columns.get(var), other.columns.get(var)) {
                (Some(Series::Numeric(a)), Some(Series::Numeric(b))) => {
                    builder.put_numeric(var.clone(), a.iter().chain(b.iter()).copied().collect())
                }
                (Some(Series::Numeric(a)), None) => builder.put_numeric(
                    var.clone(),
                    a.iter().copied().chain(std::iter::repeat(None).take(other.row_count)).collect(),
                ),
                (None, Some(Series::Numeric(b))) => builder.put_numeric(
                    var.clone(),
                    std::iter::repeat(None).take(self.row_count).chain(b.iter().copied()).collect(),
                ),
                (a, b) => {
                    let head = (0..self.row_count).map(|i| a.and_then(|s| s.value(i)).unwrap_or(DataValue::Null));
                    let tail = (0..other.row_count).map(|i| b.and_then(|s| s.value(i)).unwrap_or(DataValue::Null));
                    builder.put_discrete(var.clone(), head.chain(tail).collect())
                }
            };
        }
        builder.build()
    }

    /// New frame with `var` replaced (or added) by a numeric series.
    pub fn put_numeric(&self, var: Variable, values: Vec<Option<f64>>) -> Result<DataFrame> {
        Builder::from(self).put_numeric(var, values).build()
    }

    /// New frame with `var` removed.
    #[must_use]
    pub fn remove(&self, var: &Variable) -> DataFrame {
        let mut columns = self.columns.clone();
        columns.shift_remove(var);
        let row_count = if columns.is_empty() { 0 } else { self.row_count };
        DataFrame { columns, row_count }
    }
}

/// Builder for [`DataFrame`]; checks that every series has the same length.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    columns: IndexMap<Variable, Series>,
}

impl Builder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated with every series of `df` (shared, not copied).
    #[must_use]
    pub fn from(df: &DataFrame) -> Self {
        Self {
            columns: df.columns.clone(),
        }
    }

    /// Add or replace a numeric series.
    #[must_use]
    pub fn put_numeric(mut self, var: Variable, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(var, Series::Numeric(Arc::new(values)));
        self
    }

    /// Add or replace a series; stored numerically when every cell is a number or missing.
    #[must_use]
    pub fn put(mut self, var: Variable, values: Vec<DataValue>) -> Self {
        self.columns.insert(var, Series::from_values(values));
        self
    }

    /// Add or replace a series that is always treated as categorical.
    #[must_use]
    pub fn put_discrete(mut self, var: Variable, values: Vec<DataValue>) -> Self {
        self.columns.insert(var, Series::Values(Arc::new(values)));
        self
    }

    /// Remove a series.
    #[must_use]
    pub fn remove(mut self, var: &Variable) -> Self {
        self.columns.shift_remove(var);
        self
    }

    /// Build the frame.
    pub fn build(self) -> Result<DataFrame> {
        let mut row_count = None;
        for (var, series) in &self.columns {
            let len = series.len();
            match row_count {
                None => row_count = Some(len),
                Some(expected) if expected != len => {
                    return Err(Error::DataLengthMismatch {
                        variable: var.name().to_string(),
                        expected,
                        actual: len,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(DataFrame {
            columns: self.columns,
            row_count: row_count.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Variable {
        Variable::origin(name)
    }

    fn sample(n: usize) -> DataFrame {
        DataFrame::builder()
            .put_numeric(var("a"), (0..n).map(|i| Some(i as f64)).collect())
            .put(var("b"), (0..n).map(|i| DataValue::from(format!("row{i}"))).collect())
            .build()
            .expect("equal lengths")
    }

    #[test]
    fn test_builder_detects_numeric() {
        let df = DataFrame::builder()
            .put(var("n"), vec![1.0.into(), DataValue::Null, 3.0.into()])
            .put(var("t"), vec!["x".into(), 2.0.into(), DataValue::Null])
            .build()
            .unwrap();
        assert!(df.is_numeric(&var("n")));
        assert!(!df.is_numeric(&var("t")));
        assert_eq!(df.numeric(&var("n")).unwrap(), &[Some(1.0), None, Some(3.0)]);
        assert!(df.numeric(&var("t")).is_none());
    }

    #[test]
    fn test_builder_rejects_ragged() {
        let err = DataFrame::builder()
            .put_numeric(var("a"), vec![Some(1.0)])
            .put_numeric(var("b"), vec![Some(1.0), Some(2.0)])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_variable_identity_ignores_label() {
        let a = Variable::origin("x").with_label("Label A");
        let b = Variable::origin("x");
        assert_eq!(a, b);
        assert_ne!(Variable::origin("..x.."), Variable::stat("..x..", "x"));
        assert_eq!(Variable::transform(Aes::X).name(), "transform.x");
    }

    #[test]
    fn test_select_indices_keeps_alignment() {
        let df = sample(10);
        let sel = df.select_indices(&[2, 5, 8]);
        assert_eq!(sel.row_count(), 3);
        assert_eq!(sel.numeric(&var("a")).unwrap(), &[Some(2.0), Some(5.0), Some(8.0)]);
        assert_eq!(
            sel.values(&var("b")).unwrap(),
            vec![DataValue::from("row2"), "row5".into(), "row8".into()]
        );
    }

    #[test]
    fn test_drop_indices() {
        let df = sample(10);
        let dropped = df.drop_indices(&[2, 5, 8].into_iter().collect());
        assert_eq!(dropped.row_count(), 7);
        assert_eq!(dropped.value(&var("b"), 2), Some("row3".into()));
        assert_eq!(dropped.numeric(&var("a")).unwrap()[2], Some(3.0));
    }

    #[test]
    fn test_drop_nothing_shares_series() {
        let df = sample(4);
        let same = df.drop_indices(&HashSet::new());
        for (v, s) in &df.columns {
            match (s, &same.columns[v]) {
                (Series::Numeric(a), Series::Numeric(b)) => assert!(Arc::ptr_eq(a, b)),
                (Series::Values(a), Series::Values(b)) => assert!(Arc::ptr_eq(a, b)),
                _ => panic!("series kind changed"),
            }
        }
    }

    #[test]
    fn test_put_numeric_shares_other_series() {
        let df = sample(3);
        let out = df.put_numeric(var("a"), vec![Some(9.0); 3]).unwrap();
        assert_eq!(out.numeric(&var("a")).unwrap(), &[Some(9.0); 3]);
        assert_eq!(df.numeric(&var("a")).unwrap()[0], Some(0.0));
        match (&df.columns[&var("b")], &out.columns[&var("b")]) {
            (Series::Values(a), Series::Values(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected categorical series"),
        }
        assert!(df.put_numeric(var("c"), vec![Some(1.0)]).is_err());
    }

    #[test]
    fn test_distinct_values_and_range() {
        let df = DataFrame::builder()
            .put(var("c"), vec!["b".into(), "a".into(), "b".into(), DataValue::Null])
            .put_numeric(var("n"), vec![Some(3.0), Some(f64::NAN), None, Some(-1.0)])
            .build()
            .unwrap();
        assert_eq!(df.distinct_values(&var("c")), vec![DataValue::from("b"), "a".into()]);
        assert_eq!(df.range(&var("n")), Some(Span::new(-1.0, 3.0)));
        assert_eq!(df.range(&var("c")), None);
        assert_eq!(df.variable("n"), Some(&var("n")));
    }

    #[test]
    fn test_remove_keeps_order() {
        let df = sample(2).remove(&var("a"));
        let names: Vec<&str> = df.variables().map(Variable::name).collect();
        assert_eq!(names, vec!["b"]);
        assert_eq!(df.row_count(), 2);
    }

    #[test]
    fn test_concat_pads_missing_variables() {
        let a = sample(2);
        let b = DataFrame::builder()
            .put_numeric(var("a"), vec![Some(7.0)])
            .put_numeric(var("c"), vec![Some(1.0)])
            .build()
            .unwrap();
        let out = a.concat(&b).unwrap();
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.numeric(&var("a")).unwrap(), &[Some(0.0), Some(1.0), Some(7.0)]);
        assert_eq!(out.numeric(&var("c")).unwrap(), &[None, None, Some(1.0)]);
        assert_eq!(out.value(&var("b"), 2), Some(DataValue::Null));
        assert_eq!(DataFrame::new().concat(&a).unwrap().row_count(), 2);
    }

    #[test]
    fn test_slice_by_rows() {
        let df = sample(5);
        assert_eq!(df.slice_by_rows(1, 3).numeric(&var("a")).unwrap(), &[Some(1.0), Some(2.0)]);
        assert_eq!(df.slice_by_rows(4, 10).row_count(), 1);
        assert_eq!(df.slice_by_rows(6, 10).row_count(), 0);
    }

    #[test]
    fn test_data_value_display() {
        assert_eq!(DataValue::from(3.0).to_string(), "3");
        assert_eq!(DataValue::from(2.5).to_string(), "2.5");
        assert_eq!(DataValue::Null.to_string(), "NA");
        assert_eq!(DataValue::from("x").to_string(), "x");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn select_and_drop_preserve_alignment(
                n in 1usize..60,
                picks in proptest::collection::vec(0usize..60, 0..30),
            ) {
                let df = sample(n);
                let rows: Vec<usize> = picks.into_iter().filter(|&i| i < n).collect();
                let sel = df.select_indices(&rows);
                prop_assert_eq!(sel.row_count(), rows.len());
                let a = sel.numeric(&var("a")).expect("numeric");
                let b = sel.values(&var("b")).expect("values");
                prop_assert_eq!(a.len(), b.len());
                for (i, row) in rows.iter().enumerate() {
                    prop_assert_eq!(a[i], Some(*row as f64));
                    prop_assert_eq!(&b[i], &DataValue::from(format!("row{row}")));
                }

                let dropped_set: HashSet<usize> = rows.iter().copied().collect();
                let dropped = df.drop_indices(&dropped_set);
                prop_assert_eq!(dropped.row_count(), n - dropped_set.len());
                let a = dropped.numeric(&var("a")).expect("numeric");
                let b = dropped.values(&var("b")).expect("values");
                for (x, label) in a.iter().zip(b.iter()) {
                    let row = x.expect("no nulls") as usize;
                    prop_assert!(!dropped_set.contains(&row));
                    prop_assert_eq!(label, &DataValue::from(format!("row{row}")));
                }
            }
        }
    }
}
