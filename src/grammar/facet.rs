//! Faceting for Grammar of Graphics.
//!
//! Creates small multiples by splitting data on one or two variables. Each
//! panel ("tile") holds the rows matching its facet levels; layers whose
//! data lacks a facet variable appear in every tile.

use super::data::{DataFrame, DataValue};
use crate::error::{Error, Result};

/// Faceting specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Facet {
    /// No faceting.
    #[default]
    None,
    /// Panels on a grid of row and column levels.
    Grid {
        /// Variable splitting panels into rows.
        row: Option<String>,
        /// Variable splitting panels into columns.
        col: Option<String>,
    },
    /// Panels of one variable, wrapped into rows.
    Wrap {
        /// Variable to facet by.
        var: String,
        /// Number of columns; about the square root of the panel count when unset.
        ncol: Option<usize>,
    },
}

impl Facet {
    /// No faceting.
    #[must_use]
    pub fn none() -> Self {
        Facet::None
    }

    /// One row of panels per level of `var`.
    #[must_use]
    pub fn rows(var: &str) -> Self {
        Facet::Grid { row: Some(var.to_string()), col: None }
    }

    /// One column of panels per level of `var`.
    #[must_use]
    pub fn cols(var: &str) -> Self {
        Facet::Grid { row: None, col: Some(var.to_string()) }
    }

    /// Facet into a grid.
    #[must_use]
    pub fn grid(row: &str, col: &str) -> Self {
        Facet::Grid { row: Some(row.to_string()), col: Some(col.to_string()) }
    }

    /// Facet with wrapping.
    #[must_use]
    pub fn wrap(var: &str, ncol: Option<usize>) -> Self {
        Facet::Wrap { var: var.to_string(), ncol: ncol.map(|n| n.max(1)) }
    }

    /// Whether the plot is split at all.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Facet::None | Facet::Grid { row: None, col: None })
    }

    /// Lay out the tiles for the given layer frames.
    ///
    /// Levels are collected across every frame holding the facet variable,
    /// in first-encounter order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] when no frame holds a facet variable.
    pub fn layout(&self, frames: &[&DataFrame]) -> Result<FacetLayout> {
        match self {
            Facet::Grid { row, col } if !self.is_none() => {
                let rows = match row {
                    Some(var) => Some((var.as_str(), levels(var, frames)?)),
                    None => None,
                };
                let cols = match col {
                    Some(var) => Some((var.as_str(), levels(var, frames)?)),
                    None => None,
                };
                let row_count = rows.as_ref().map_or(1, |(_, l)| l.len().max(1));
                let col_count = cols.as_ref().map_or(1, |(_, l)| l.len().max(1));
                let mut tiles = Vec::with_capacity(row_count * col_count);
                for r in 0..row_count {
                    for c in 0..col_count {
                        let mut keys = Vec::new();
                        if let Some((var, l)) = &rows {
                            keys.extend(l.get(r).map(|v| (var.to_string(), v.clone())));
                        }
                        if let Some((var, l)) = &cols {
                            keys.extend(l.get(c).map(|v| (var.to_string(), v.clone())));
                        }
                        tiles.push(FacetTile { row: r, col: c, keys });
                    }
                }
                Ok(FacetLayout { rows: row_count, cols: col_count, tiles })
            }
            Facet::Wrap { var, ncol } => {
                let l = levels(var, frames)?;
                let n = l.len().max(1);
                let cols = ncol.unwrap_or_else(|| (n as f64).sqrt().ceil() as usize).clamp(1, n);
                let tiles = l
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| FacetTile { row: i / cols, col: i % cols, keys: vec![(var.clone(), v)] })
                    .collect();
                Ok(FacetLayout { rows: n.div_ceil(cols), cols, tiles })
            }
            _ => Ok(FacetLayout { rows: 1, cols: 1, tiles: vec![FacetTile::default()] }),
        }
    }
}

fn levels(var: &str, frames: &[&DataFrame]) -> Result<Vec<DataValue>> {
    let mut found = false;
    let mut out: Vec<DataValue> = Vec::new();
    for df in frames {
        let Some(v) = df.variable(var) else { continue };
        found = true;
        for level in df.distinct_values(v) {
            if !out.contains(&level) {
                out.push(level);
            }
        }
    }
    if found {
        Ok(out)
    } else {
        Err(Error::InvalidSpec(format!("facet variable '{var}' not found")))
    }
}

/// Panels of a faceted plot.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetLayout {
    /// Panel rows.
    pub rows: usize,
    /// Panel columns.
    pub cols: usize,
    /// Panels, row-major.
    pub tiles: Vec<FacetTile>,
}

/// One panel with the facet levels it shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetTile {
    /// Panel row.
    pub row: usize,
    /// Panel column.
    pub col: usize,
    /// Facet variable names and the level shown.
    pub keys: Vec<(String, DataValue)>,
}

impl FacetTile {
    /// Strip text, empty for an unfaceted plot.
    #[must_use]
    pub fn label(&self) -> String {
        self.keys.iter().map(|(_, v)| v.to_string()).collect::<Vec<_>>().join(", ")
    }

    /// Rows of `df` matching every facet level `df` has a variable for.
    #[must_use]
    pub fn select(&self, df: &DataFrame) -> DataFrame {
        let keys: Vec<_> = self
            .keys
            .iter()
            .filter_map(|(name, level)| df.variable(name).map(|v| (v, level)))
            .collect();
        if keys.is_empty() {
            return df.clone();
        }
        let rows: Vec<usize> = (0..df.row_count())
            .filter(|&i| keys.iter().all(|(v, level)| df.value(v, i).as_ref() == Some(*level)))
            .collect();
        df.select_indices(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::data::Variable;

    fn frame() -> DataFrame {
        DataFrame::builder()
            .put_numeric(Variable::origin("v"), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .put(Variable::origin("g"), vec!["a".into(), "b".into(), "a".into(), "c".into()])
            .put(Variable::origin("h"), vec!["x".into(), "x".into(), "y".into(), "y".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_facet_single_tile() {
        let df = frame();
        let layout = Facet::none().layout(&[&df]).unwrap();
        assert_eq!((layout.rows, layout.cols), (1, 1));
        assert_eq!(layout.tiles[0].select(&df).row_count(), 4);
        assert_eq!(layout.tiles[0].label(), "");
    }

    #[test]
    fn test_facet_grid() {
        let df = frame();
        let layout = Facet::grid("h", "g").layout(&[&df]).unwrap();
        assert_eq!((layout.rows, layout.cols), (2, 3));
        assert_eq!(layout.tiles.len(), 6);
        let tile = &layout.tiles[3];
        assert_eq!((tile.row, tile.col), (1, 0));
        assert_eq!(tile.label(), "y, a");
        assert_eq!(tile.select(&df).row_count(), 1);
    }

    #[test]
    fn test_facet_wrap() {
        let df = frame();
        let layout = Facet::wrap("g", None).layout(&[&df]).unwrap();
        assert_eq!((layout.rows, layout.cols), (2, 2));
        assert_eq!((layout.tiles[2].row, layout.tiles[2].col), (1, 0));
        assert_eq!(layout.tiles[0].select(&df).row_count(), 2);

        let one_row = Facet::wrap("g", Some(5)).layout(&[&df]).unwrap();
        assert_eq!((one_row.rows, one_row.cols), (1, 3));
    }

    #[test]
    fn test_frame_without_facet_variable_shows_everywhere() {
        let df = frame();
        let other = DataFrame::builder()
            .put_numeric(Variable::origin("v"), vec![Some(9.0)])
            .build()
            .unwrap();
        let layout = Facet::cols("g").layout(&[&df, &other]).unwrap();
        assert!(layout.tiles.iter().all(|t| t.select(&other).row_count() == 1));
    }

    #[test]
    fn test_unknown_facet_variable() {
        let df = frame();
        assert!(matches!(Facet::wrap("nope", None).layout(&[&df]), Err(Error::InvalidSpec(_))));
    }
}
