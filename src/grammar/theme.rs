//! Theme system for Grammar of Graphics.
//!
//! Controls the non-data visual appearance of plots and legends.

use crate::color::Rgba;
use crate::legend::{DEF_LABEL_MAX_LENGTH, DEF_LABEL_MAX_LINES};
use serde::{Deserialize, Serialize};

/// Legend layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendDirection {
    /// Decide from the legend position (side legends stack vertically).
    #[default]
    Auto,
    /// Keys laid out in a row.
    Horizontal,
    /// Keys laid out in a column.
    Vertical,
}

/// Where legends are placed relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    /// Right of the panel.
    #[default]
    Right,
    /// Left of the panel.
    Left,
    /// Above the panel.
    Top,
    /// Below the panel.
    Bottom,
    /// No legend.
    None,
}

impl LegendPosition {
    /// Whether legends sit above or below the panel.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Legend and colorbar appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendTheme {
    /// Minimum side of a key cell.
    pub key_size: f64,
    /// Legend title font size.
    pub title_font_size: f64,
    /// Break label font size.
    pub text_font_size: f64,
    /// Whether titles are drawn.
    pub show_title: bool,
    /// Gap between a key and its label.
    pub label_padding: f64,
    /// Space around the legend box.
    pub margin: f64,
    /// Key layout direction.
    pub direction: LegendDirection,
    /// Placement relative to the panel.
    pub position: LegendPosition,
    /// Longest label line before wrapping.
    pub label_max_length: usize,
    /// Most label lines after wrapping.
    pub label_max_lines: usize,
    /// Colorbar width along its gradient.
    pub colorbar_length: f64,
    /// Colorbar thickness.
    pub colorbar_thickness: f64,
    /// Text color.
    pub text_color: Rgba,
    /// Legend box background.
    pub background: Rgba,
}

impl Default for LegendTheme {
    fn default() -> Self {
        Self {
            key_size: 23.0,
            title_font_size: 13.0,
            text_font_size: 11.0,
            show_title: true,
            label_padding: 5.0,
            margin: 5.0,
            direction: LegendDirection::Auto,
            position: LegendPosition::Right,
            label_max_length: DEF_LABEL_MAX_LENGTH,
            label_max_lines: DEF_LABEL_MAX_LINES,
            colorbar_length: 150.0,
            colorbar_thickness: 20.0,
            text_color: Rgba::rgb(50, 50, 50),
            background: Rgba::TRANSPARENT,
        }
    }
}

impl LegendTheme {
    /// Resolve [`LegendDirection::Auto`] against the position.
    #[must_use]
    pub fn effective_direction(&self) -> LegendDirection {
        match self.direction {
            LegendDirection::Auto if self.position.is_horizontal() => LegendDirection::Horizontal,
            LegendDirection::Auto => LegendDirection::Vertical,
            d => d,
        }
    }

    /// Whether keys are laid out in a row.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.effective_direction() == LegendDirection::Horizontal
    }

    /// Set the key size.
    #[must_use]
    pub fn key_size(mut self, size: f64) -> Self {
        self.key_size = size;
        self
    }

    /// Set the direction.
    #[must_use]
    pub fn direction(mut self, direction: LegendDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn position(mut self, position: LegendPosition) -> Self {
        self.position = position;
        self
    }
}

/// Theme specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Background color.
    pub background: Rgba,
    /// Panel background color.
    pub panel_background: Rgba,
    /// Grid line color.
    pub grid_color: Rgba,
    /// Axis line color.
    pub axis_color: Rgba,
    /// Text color.
    pub text_color: Rgba,
    /// Show grid lines.
    pub show_grid: bool,
    /// Show axis lines.
    pub show_axis: bool,
    /// Show panel border.
    pub show_panel_border: bool,
    /// Grid line width.
    pub grid_width: f64,
    /// Axis line width.
    pub axis_width: f64,
    /// Tick mark length.
    pub tick_length: f64,
    /// Axis label font size.
    pub axis_font_size: f64,
    /// Plot title font size.
    pub title_font_size: f64,
    /// Margin around the plot.
    pub margin: f64,
    /// Legend appearance.
    pub legend: LegendTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::grey()
    }
}

impl Theme {
    /// Grey theme (ggplot2 default-like).
    #[must_use]
    pub fn grey() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::rgb(235, 235, 235),
            grid_color: Rgba::WHITE,
            axis_color: Rgba::rgb(50, 50, 50),
            text_color: Rgba::rgb(50, 50, 50),
            show_grid: true,
            show_axis: true,
            show_panel_border: false,
            grid_width: 1.0,
            axis_width: 1.0,
            tick_length: 4.0,
            axis_font_size: 11.0,
            title_font_size: 16.0,
            margin: 10.0,
            legend: LegendTheme::default(),
        }
    }

    /// Minimal theme with white background.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            panel_background: Rgba::WHITE,
            grid_color: Rgba::rgb(220, 220, 220),
            axis_color: Rgba::rgb(100, 100, 100),
            text_color: Rgba::BLACK,
            grid_width: 0.5,
            axis_width: 0.5,
            ..Self::grey()
        }
    }

    /// Black and white theme.
    #[must_use]
    pub fn bw() -> Self {
        Self {
            panel_background: Rgba::WHITE,
            grid_color: Rgba::rgb(200, 200, 200),
            axis_color: Rgba::BLACK,
            text_color: Rgba::BLACK,
            show_panel_border: true,
            grid_width: 0.5,
            ..Self::grey()
        }
    }

    /// Classic theme with no grid.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            panel_background: Rgba::WHITE,
            axis_color: Rgba::BLACK,
            text_color: Rgba::BLACK,
            show_grid: false,
            grid_width: 0.0,
            ..Self::grey()
        }
    }

    /// Dark theme.
    #[must_use]
    pub fn dark() -> Self {
        let text = Rgba::rgb(220, 220, 220);
        Self {
            background: Rgba::rgb(30, 30, 30),
            panel_background: Rgba::rgb(40, 40, 40),
            grid_color: Rgba::rgb(60, 60, 60),
            axis_color: Rgba::rgb(180, 180, 180),
            text_color: text,
            grid_width: 0.5,
            axis_width: 0.5,
            legend: LegendTheme { text_color: text, ..LegendTheme::default() },
            ..Self::grey()
        }
    }

    /// Void theme (nothing but data).
    #[must_use]
    pub fn void() -> Self {
        Self {
            panel_background: Rgba::WHITE,
            grid_color: Rgba::WHITE,
            axis_color: Rgba::WHITE,
            show_grid: false,
            show_axis: false,
            grid_width: 0.0,
            axis_width: 0.0,
            ..Self::grey()
        }
    }

    /// Preset by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "grey" | "gray" => Some(Self::grey()),
            "minimal" => Some(Self::minimal()),
            "bw" => Some(Self::bw()),
            "classic" => Some(Self::classic()),
            "dark" => Some(Self::dark()),
            "void" => Some(Self::void()),
            _ => None,
        }
    }

    /// Set background color.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Set panel background color.
    #[must_use]
    pub fn panel_background(mut self, color: Rgba) -> Self {
        self.panel_background = color;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Enable or disable grid lines.
    #[must_use]
    pub fn grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Enable or disable axis lines.
    #[must_use]
    pub fn axis(mut self, show: bool) -> Self {
        self.show_axis = show;
        self
    }

    /// Replace the legend theme.
    #[must_use]
    pub fn legend(mut self, legend: LegendTheme) -> Self {
        self.legend = legend;
        self
    }
}
