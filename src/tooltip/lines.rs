//! Tooltip lines: a format pattern bound to value sources.
//!
//! A pattern is literal text with `{}` placeholders, one per field:
//!
//! - `{}` the field's display text (scale-formatted for mapped aesthetics)
//! - `{.Nf}` fixed-point number with `N` decimals
//! - `{d}` integer
//! - `{e}` scientific notation
//!
//! `{{` and `}}` escape literal braces. If any field of a line has no value
//! for a row, the whole line is dropped for that row.

use super::mapping::MappedDataAccess;
use crate::error::{Error, Result};
use crate::grammar::{Aes, DataValue};
use crate::scale::format_significant;

/// Where a tooltip field takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// The data variable bound to an aesthetic.
    Mapping(Aes),
    /// A column of the layer data, by name.
    Data(String),
    /// Fixed text.
    Constant(String),
}

impl ValueSource {
    /// Parse `@name` (data column), `^aes` (mapped aesthetic) or plain text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(aes) = text.strip_prefix('^').and_then(Aes::from_name) {
            Self::Mapping(aes)
        } else if let Some(name) = text.strip_prefix('@') {
            Self::Data(name.trim_matches(|c| c == '{' || c == '}').to_string())
        } else {
            Self::Constant(text.to_string())
        }
    }

    fn value(&self, access: &MappedDataAccess, index: usize) -> Option<DataValue> {
        match self {
            Self::Mapping(aes) => access.original_value(*aes, index),
            Self::Data(name) => access.data_value(name, index),
            Self::Constant(text) => Some(DataValue::Text(text.clone())),
        }
    }

    fn text(&self, access: &MappedDataAccess, index: usize) -> Option<String> {
        match self {
            Self::Mapping(aes) => access.mapped_text(*aes, index),
            Self::Data(name) => access.data_value(name, index).map(|v| match v {
                DataValue::Number(n) => format_significant(n),
                other => other.to_string(),
            }),
            Self::Constant(text) => Some(text.clone()),
        }
    }

    /// Default label for this source.
    fn label(&self, access: &MappedDataAccess) -> Option<String> {
        match self {
            Self::Mapping(aes) => access.label(*aes),
            Self::Data(name) => Some(name.clone()),
            Self::Constant(_) => None,
        }
    }
}

/// How one placeholder formats its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// `{}`
    Plain,
    /// `{.Nf}`
    Fixed(usize),
    /// `{d}`
    Integer,
    /// `{e}`
    Exponent,
}

impl FieldFormat {
    fn parse(spec: &str) -> Option<Self> {
        match spec {
            "" => Some(Self::Plain),
            "d" => Some(Self::Integer),
            "e" => Some(Self::Exponent),
            _ => spec
                .strip_prefix('.')
                .and_then(|s| s.strip_suffix('f'))
                .and_then(|n| n.parse().ok())
                .map(Self::Fixed),
        }
    }

    fn apply(self, n: f64) -> String {
        match self {
            Self::Plain => format_significant(n),
            Self::Fixed(decimals) => format!("{n:.decimals$}"),
            Self::Integer => format!("{}", n.round() as i64),
            Self::Exponent => format!("{n:e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Field(FieldFormat),
}

/// A parsed line pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePattern {
    source: String,
    tokens: Vec<Token>,
}

impl LinePattern {
    /// Parse a pattern that must hold exactly `field_count` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for unbalanced braces, an unknown
    /// placeholder format or a placeholder count different from `field_count`.
    pub fn parse(pattern: &str, field_count: usize) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut text = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut spec = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => spec.push(ch),
                            None => return Err(Error::InvalidSpec(format!("unclosed placeholder in '{pattern}'"))),
                        }
                    }
                    let format = FieldFormat::parse(&spec)
                        .ok_or_else(|| Error::InvalidSpec(format!("unknown format '{{{spec}}}' in '{pattern}'")))?;
                    if !text.is_empty() {
                        tokens.push(Token::Text(std::mem::take(&mut text)));
                    }
                    tokens.push(Token::Field(format));
                }
                '}' => return Err(Error::InvalidSpec(format!("unmatched '}}' in '{pattern}'"))),
                _ => text.push(c),
            }
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }

        let placeholders = tokens.iter().filter(|t| matches!(t, Token::Field(_))).count();
        if placeholders != field_count {
            return Err(Error::InvalidSpec(format!(
                "pattern '{pattern}' has {placeholders} placeholders for {field_count} fields"
            )));
        }
        Ok(Self { source: pattern.to_string(), tokens })
    }

    /// Pattern text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of placeholders.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.tokens.iter().filter(|t| matches!(t, Token::Field(_))).count()
    }

    fn formats(&self) -> impl Iterator<Item = FieldFormat> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Field(f) => Some(*f),
            Token::Text(_) => None,
        })
    }

    /// Substitute already formatted field texts.
    fn render(&self, fields: &[String]) -> String {
        let mut out = String::new();
        let mut values = fields.iter();
        for token in &self.tokens {
            match token {
                Token::Text(t) => out.push_str(t),
                Token::Field(_) => {
                    if let Some(v) = values.next() {
                        out.push_str(v);
                    }
                }
            }
        }
        out
    }
}

/// One rendered tooltip line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDataPoint {
    /// Label shown before the value.
    pub label: Option<String>,
    /// Formatted value.
    pub value: String,
    /// Aesthetic of a single mapped field, if the line has one.
    pub aes: Option<Aes>,
}

/// A labelled pattern over value sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipLine {
    label: Option<String>,
    pattern: LinePattern,
    fields: Vec<ValueSource>,
}

impl TooltipLine {
    /// Line from a pattern and its fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] if the pattern does not match the fields.
    pub fn new(label: Option<String>, pattern: &str, fields: Vec<ValueSource>) -> Result<Self> {
        let pattern = LinePattern::parse(pattern, fields.len())?;
        Ok(Self { label, pattern, fields })
    }

    /// Single-field line `{}` with the source's default label.
    #[must_use]
    pub fn for_source(source: ValueSource) -> Self {
        Self {
            label: None,
            pattern: LinePattern {
                source: "{}".to_string(),
                tokens: vec![Token::Field(FieldFormat::Plain)],
            },
            fields: vec![source],
        }
    }

    /// Parse the compact form used in plot specs: `label|pattern` where
    /// the pattern refers to fields inline as `^aes` or `@column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for a malformed pattern.
    pub fn parse_inline(text: &str) -> Result<Self> {
        let (label, body) = match text.split_once('|') {
            Some((l, b)) => (Some(l.trim().to_string()).filter(|l| !l.is_empty()), b),
            None => (None, text),
        };

        let mut pattern = String::new();
        let mut fields = Vec::new();
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '^' || c == '@' {
                let mut name = String::new();
                if c == '@' && chars.peek() == Some(&'{') {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch == '}' {
                            break;
                        }
                        name.push(ch);
                    }
                } else {
                    while let Some(ch) = chars.peek().copied().filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '.') {
                        name.push(ch);
                        chars.next();
                    }
                }
                if name.is_empty() {
                    pattern.push(c);
                    continue;
                }
                let source = ValueSource::parse(&format!("{c}{name}"));
                if matches!(source, ValueSource::Constant(_)) {
                    return Err(Error::InvalidSpec(format!("unknown aesthetic '{name}' in '{text}'")));
                }
                fields.push(source);
                pattern.push_str("{}");
                if chars.peek() == Some(&'{') {
                    // format suffix: ^y{.2f}
                    pattern.pop();
                    chars.next();
                    for ch in chars.by_ref() {
                        pattern.push(ch);
                        if ch == '}' {
                            break;
                        }
                    }
                }
            } else {
                pattern.push(c);
            }
        }
        Self::new(label, &pattern, fields)
    }

    /// Label override.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Fields in placeholder order.
    #[must_use]
    pub fn fields(&self) -> &[ValueSource] {
        &self.fields
    }

    /// Pattern.
    #[must_use]
    pub fn pattern(&self) -> &LinePattern {
        &self.pattern
    }

    /// Aesthetics this line reads.
    pub fn mapped_aes(&self) -> impl Iterator<Item = Aes> + '_ {
        self.fields.iter().filter_map(|f| match f {
            ValueSource::Mapping(aes) => Some(*aes),
            _ => None,
        })
    }

    /// Render the line for a data row; `None` if any field has no value.
    #[must_use]
    pub fn data_point(&self, access: &MappedDataAccess, index: usize) -> Option<LineDataPoint> {
        let mut texts = Vec::with_capacity(self.fields.len());
        for (field, format) in self.fields.iter().zip(self.pattern.formats()) {
            let text = match format {
                FieldFormat::Plain => field.text(access, index)?,
                numeric => match field.value(access, index)? {
                    DataValue::Number(n) => numeric.apply(n),
                    _ => return None,
                },
            };
            texts.push(text);
        }

        let single = match self.fields.as_slice() {
            [only] => Some(only),
            _ => None,
        };
        let label = self
            .label
            .clone()
            .or_else(|| single.and_then(|f| f.label(access)));
        let aes = single.and_then(|f| match f {
            ValueSource::Mapping(aes) => Some(*aes),
            _ => None,
        });
        Some(LineDataPoint { label, value: self.pattern.render(&texts), aes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{DataFrame, Variable};
    use crate::scale::Scale;
    use std::collections::BTreeMap;

    fn access() -> MappedDataAccess {
        let df = DataFrame::builder()
            .put_numeric(Variable::origin("price"), vec![Some(1234.5678), None])
            .put(
                Variable::origin("name"),
                vec![DataValue::from("alpha"), DataValue::from("beta")],
            )
            .build()
            .unwrap();
        let bindings = BTreeMap::from([(Aes::Y, Variable::origin("price"))]);
        let scales = BTreeMap::from([(Aes::Y, Scale::continuous(Aes::Y).build())]);
        MappedDataAccess::new(df, bindings, scales)
    }

    #[test]
    fn test_parse_placeholders() {
        let p = LinePattern::parse("{} costs {.2f} ({d}, {e}) {{x}}", 4).unwrap();
        assert_eq!(p.field_count(), 4);
        assert_eq!(p.render(&["a".into(), "b".into(), "c".into(), "d".into()]), "a costs b (c, d) {x}");
    }

    #[test]
    fn test_parse_rejects_count_mismatch() {
        assert!(matches!(LinePattern::parse("{} {}", 1), Err(Error::InvalidSpec(_))));
        assert!(LinePattern::parse("{.2q}", 1).is_err());
        assert!(LinePattern::parse("{", 1).is_err());
        assert!(LinePattern::parse("}", 0).is_err());
    }

    #[test]
    fn test_formats() {
        let a = access();
        let line = TooltipLine::new(
            Some("p".into()),
            "{.1f} / {d} / {e}",
            vec![ValueSource::Mapping(Aes::Y), ValueSource::Data("price".into()), ValueSource::Mapping(Aes::Y)],
        )
        .unwrap();
        let dp = line.data_point(&a, 0).unwrap();
        assert_eq!(dp.value, "1234.6 / 1235 / 1.2345678e3");
        assert_eq!(dp.label.as_deref(), Some("p"));
    }

    #[test]
    fn test_missing_value_suppresses_line() {
        let a = access();
        let line = TooltipLine::new(
            None,
            "{} at {}",
            vec![ValueSource::Data("name".into()), ValueSource::Mapping(Aes::Y)],
        )
        .unwrap();
        assert!(line.data_point(&a, 0).is_some());
        assert_eq!(line.data_point(&a, 1), None);
    }

    #[test]
    fn test_numeric_format_on_text_suppresses_line() {
        let a = access();
        let line = TooltipLine::new(None, "{.2f}", vec![ValueSource::Data("name".into())]).unwrap();
        assert_eq!(line.data_point(&a, 0), None);
    }

    #[test]
    fn test_default_label_from_variable() {
        let a = access();
        let dp = TooltipLine::for_source(ValueSource::Mapping(Aes::Y)).data_point(&a, 0).unwrap();
        assert_eq!(dp.label.as_deref(), Some("price"));
        assert_eq!(dp.aes, Some(Aes::Y));
        assert_eq!(dp.value, "1235");
    }

    #[test]
    fn test_parse_inline() {
        let line = TooltipLine::parse_inline("Price|^y{.2f} for @{name}").unwrap();
        assert_eq!(line.label(), Some("Price"));
        assert_eq!(line.pattern().source(), "{.2f} for {}");
        assert_eq!(
            line.fields(),
            &[ValueSource::Mapping(Aes::Y), ValueSource::Data("name".into())]
        );
        let dp = line.data_point(&access(), 0).unwrap();
        assert_eq!(dp.value, "1234.57 for alpha");
    }

    #[test]
    fn test_parse_inline_unknown_aes() {
        assert!(TooltipLine::parse_inline("^nope").is_err());
    }

    #[test]
    fn test_value_source_parse() {
        assert_eq!(ValueSource::parse("^color"), ValueSource::Mapping(Aes::Color));
        assert_eq!(ValueSource::parse("@{a b}"), ValueSource::Data("a b".into()));
        assert_eq!(ValueSource::parse("hi"), ValueSource::Constant("hi".into()));
    }
}
