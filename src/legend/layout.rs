//! Legend box geometry: title placement and the key grid.

use crate::geometry::{Point, Rect};

/// Title and graph placement shared by legends and colorbars.
///
/// Horizontal boxes put the title left of the graph, vertically centred
/// when the title is taller. Vertical boxes put the graph below the title
/// with half a title line of spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBoxLayout {
    title_size: Point,
    graph_size: Point,
    horizontal: bool,
    title_font_size: f64,
}

impl LegendBoxLayout {
    /// Layout of a box with a measured title (zero when hidden) and graph.
    #[must_use]
    pub fn new(title_size: Point, graph_size: Point, horizontal: bool, title_font_size: f64) -> Self {
        Self { title_size, graph_size, horizontal, title_font_size }
    }

    /// Whether the title sits left of the graph.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    /// Measured title.
    #[must_use]
    pub fn title_size(&self) -> Point {
        self.title_size
    }

    /// Keys (or bar) and labels.
    #[must_use]
    pub fn graph_size(&self) -> Point {
        self.graph_size
    }

    /// Top-left corner of the graph inside the box.
    #[must_use]
    pub fn graph_origin(&self) -> Point {
        if self.horizontal {
            let dy = if self.title_size.y > self.graph_size.y {
                (self.title_size.y - self.graph_size.y) / 2.0
            } else {
                0.0
            };
            Point::new(self.title_size.x, dy)
        } else if self.title_size.y > 0.0 {
            Point::new(0.0, self.title_size.y + self.title_font_size / 2.0)
        } else {
            Point::ORIGIN
        }
    }

    /// Size of the whole box.
    #[must_use]
    pub fn size(&self) -> Point {
        let title = Rect::new(0.0, 0.0, self.title_size.x, self.title_size.y);
        let origin = self.graph_origin();
        let graph = Rect::new(origin.x, origin.y, self.graph_size.x, self.graph_size.y);
        let both = title.union(&graph);
        Point::new(both.right(), both.bottom())
    }
}

/// Row and column counts of a key grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Rows.
    pub rows: usize,
    /// Columns.
    pub cols: usize,
    /// Whether breaks fill rows first.
    pub by_row: bool,
}

impl GridShape {
    /// Row and column of break `index`.
    #[must_use]
    pub fn cell(&self, index: usize) -> (usize, usize) {
        if self.by_row {
            (index / self.cols.max(1), index % self.cols.max(1))
        } else {
            (index % self.rows.max(1), index / self.rows.max(1))
        }
    }
}

/// Placement of one break: its key box and its label anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPlacement {
    /// Key box, relative to the graph origin.
    pub key: Rect,
    /// Left-middle point of the label.
    pub label: Point,
}

/// Lay breaks out on a grid.
///
/// Each column is as wide as its widest key plus label, each row as tall as
/// its tallest key or label. Keys are centred vertically in their row.
#[must_use]
pub fn grid_placements(
    shape: GridShape,
    key_sizes: &[Point],
    label_sizes: &[Point],
    label_padding: f64,
    column_gap: f64,
) -> (Vec<KeyPlacement>, Point) {
    let mut col_widths = vec![0.0f64; shape.cols];
    let mut row_heights = vec![0.0f64; shape.rows];
    for (i, (key, label)) in key_sizes.iter().zip(label_sizes).enumerate() {
        let (row, col) = shape.cell(i);
        if row >= shape.rows || col >= shape.cols {
            continue;
        }
        col_widths[col] = col_widths[col].max(key.x + label_padding + label.x);
        row_heights[row] = row_heights[row].max(key.y.max(label.y));
    }

    let col_x = offsets(&col_widths, column_gap);
    let row_y = offsets(&row_heights, 0.0);

    let placements = key_sizes
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let (row, col) = shape.cell(i);
            let x = col_x.get(col).copied().unwrap_or(0.0);
            let y = row_y.get(row).copied().unwrap_or(0.0);
            let h = row_heights.get(row).copied().unwrap_or(key.y);
            let key_rect = Rect::new(x, y + (h - key.y) / 2.0, key.x, key.y);
            KeyPlacement { key: key_rect, label: Point::new(x + key.x + label_padding, y + h / 2.0) }
        })
        .collect();

    let width = col_widths.iter().sum::<f64>() + column_gap * shape.cols.saturating_sub(1) as f64;
    let height = row_heights.iter().sum::<f64>();
    (placements, Point::new(width, height))
}

fn offsets(sizes: &[f64], gap: f64) -> Vec<f64> {
    sizes
        .iter()
        .scan(0.0, |acc, size| {
            let start = *acc;
            *acc += size + gap;
            Some(start)
        })
        .collect()
}
