//! Plot layout: title, legend placement, the facet panel grid, strips and axes.
//!
//! Space is taken from the outside in. The title band comes off the top, the
//! legend column or row off its side, axis labels and titles off the left and
//! bottom. What remains is split into equal facet cells.

use super::coord::{CartesianCoordinates, Coord};
use super::facet::FacetLayout;
use super::geom::GeomContext;
use super::layer::StitchedPlotLayer;
use super::theme::{LegendPosition, Theme};
use crate::geometry::{Point, Rect, Span};
use crate::legend::LegendInfo;
use crate::render::{SceneNode, Style, TextAnchor, TextMeasurer, TextNode};
use crate::scale::Scale;
use crate::tooltip::{GeomTarget, GeomTargetCollector};

const PANEL_SPACING: f64 = 8.0;
const STRIP_PADDING: f64 = 6.0;
const LABEL_GAP: f64 = 3.0;

/// Scene and hit targets of one layout pass.
#[derive(Debug, Clone)]
pub(crate) struct Rendered {
    pub(crate) scene: SceneNode,
    /// Targets per layer, then per panel.
    pub(crate) targets: Vec<Vec<Vec<GeomTarget>>>,
    /// Client rectangle per panel.
    pub(crate) panels: Vec<Rect>,
}

/// Everything a layout pass reads.
pub(crate) struct PlotFrame<'a> {
    pub(crate) layers: &'a [StitchedPlotLayer],
    pub(crate) resolutions: &'a [(f64, f64)],
    pub(crate) facet: &'a FacetLayout,
    pub(crate) coord: &'a Coord,
    pub(crate) theme: &'a Theme,
    pub(crate) title: Option<&'a str>,
    pub(crate) x_scale: &'a Scale,
    pub(crate) y_scale: &'a Scale,
    pub(crate) x_domain: Span,
    pub(crate) y_domain: Span,
    pub(crate) legends: &'a [LegendInfo],
    pub(crate) measurer: &'a dyn TextMeasurer,
}

impl PlotFrame<'_> {
    pub(crate) fn render(&self, width: f64, height: f64) -> Rendered {
        let theme = self.theme;
        let m = theme.margin;
        let mut area = Rect::new(m, m, (width - 2.0 * m).max(0.0), (height - 2.0 * m).max(0.0));
        let mut children = Vec::new();

        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            let size = self.measurer.measure(title, theme.title_font_size);
            let text = TextNode::new(
                Point::new(area.x, area.y + theme.title_font_size),
                title,
                theme.title_font_size,
                theme.text_color,
            );
            children.push(SceneNode::named_group("title", Point::ORIGIN, vec![SceneNode::text(text)]));
            area = Rect::new(area.x, area.y + size.y + m, area.width, (area.height - size.y - m).max(0.0));
        }

        let (area, legends) = self.place_legends(area);
        children.extend(legends);

        let flipped = self.coord.is_flipped();
        let x_domain = self.coord.x_limits().unwrap_or(self.x_domain);
        let y_domain = self.coord.y_limits().unwrap_or(self.y_domain);
        let (h_scale, v_scale, v_domain) = if flipped {
            (self.y_scale, self.x_scale, x_domain)
        } else {
            (self.x_scale, self.y_scale, y_domain)
        };

        let font = theme.axis_font_size;
        let tick_space = if theme.show_axis { theme.tick_length + LABEL_GAP } else { 0.0 };
        let title_space = |scale: &Scale| if scale.name().is_empty() { 0.0 } else { font + LABEL_GAP };
        let v_label_width = if theme.show_axis {
            axis_breaks(v_scale, v_domain)
                .iter()
                .map(|(_, label)| self.measurer.measure(label, font).x)
                .fold(0.0, f64::max)
        } else {
            0.0
        };
        let left = v_label_width + tick_space + title_space(v_scale);
        let h_label_height = if theme.show_axis { font } else { 0.0 };
        let bottom = h_label_height + tick_space + title_space(h_scale);

        let strip = if self.facet.tiles.iter().any(|t| !t.keys.is_empty()) {
            font + STRIP_PADDING
        } else {
            0.0
        };
        let grid = Rect::new(
            area.x + left,
            area.y,
            (area.width - left).max(0.0),
            (area.height - bottom).max(0.0),
        );
        let cols = self.facet.cols.max(1) as f64;
        let rows = self.facet.rows.max(1) as f64;
        let cell_w = ((grid.width - PANEL_SPACING * (cols - 1.0)) / cols).max(0.0);
        let cell_h = ((grid.height - PANEL_SPACING * (rows - 1.0)) / rows).max(0.0);

        let mut targets = vec![vec![Vec::new(); self.facet.tiles.len()]; self.layers.len()];
        let mut panels = Vec::with_capacity(self.facet.tiles.len());
        for (t, tile) in self.facet.tiles.iter().enumerate() {
            let cell = Rect::new(
                grid.x + tile.col as f64 * (cell_w + PANEL_SPACING),
                grid.y + tile.row as f64 * (cell_h + PANEL_SPACING),
                cell_w,
                cell_h,
            );
            let client = Rect::new(cell.x, cell.y + strip, cell.width, (cell.height - strip).max(0.0));
            let coords = self.coord.build(self.x_domain, self.y_domain, client);
            let client = coords.client();

            let mut nodes = vec![SceneNode::rect(client, Style::filled(theme.panel_background))];
            if theme.show_grid {
                nodes.push(self.grid(&coords, h_scale, v_scale));
            }
            for (li, layer) in self.layers.iter().enumerate() {
                let Some(panel) = layer.layers().get(t) else { continue };
                let (x_res, y_res) = self.resolutions.get(li).copied().unwrap_or((1.0, 1.0));
                let ctx = GeomContext::new(flipped).with_resolution(x_res, y_res);
                let mut collector = GeomTargetCollector::new();
                let shapes = panel.geom.build(panel.aesthetics(), &coords, &ctx, &mut collector);
                nodes.push(SceneNode::named_group(format!("layer-{li}"), Point::ORIGIN, shapes));
                if let Some(slot) = targets.get_mut(li).and_then(|l| l.get_mut(t)) {
                    *slot = collector.into_targets();
                }
            }
            if theme.show_panel_border {
                nodes.push(SceneNode::rect(client, Style::stroked(theme.axis_color, theme.axis_width)));
            }
            if strip > 0.0 {
                let band = Rect::new(cell.x, cell.y, cell.width, strip - 2.0);
                let text = TextNode::new(
                    Point::new(band.center().x, band.y + font + STRIP_PADDING / 2.0 - 2.0),
                    tile.label(),
                    font,
                    theme.text_color,
                )
                .anchor(TextAnchor::Middle);
                nodes.push(SceneNode::named_group(
                    "strip",
                    Point::ORIGIN,
                    vec![SceneNode::rect(band, Style::filled(theme.panel_background.darker())), SceneNode::text(text)],
                ));
            }

            let bottom_of_column = !self
                .facet
                .tiles
                .iter()
                .any(|o| o.col == tile.col && o.row == tile.row + 1);
            if theme.show_axis && bottom_of_column {
                nodes.push(self.horizontal_axis(&coords, h_scale));
            }
            if theme.show_axis && tile.col == 0 {
                nodes.push(self.vertical_axis(&coords, v_scale));
            }
            children.push(SceneNode::named_group(format!("panel-{t}"), Point::ORIGIN, nodes));
            panels.push(client);
        }

        if !h_scale.name().is_empty() {
            let text = TextNode::new(
                Point::new(grid.center().x, area.bottom()),
                h_scale.name(),
                font,
                theme.text_color,
            )
            .anchor(TextAnchor::Middle);
            children.push(SceneNode::named_group("axis-title-bottom", Point::ORIGIN, vec![SceneNode::text(text)]));
        }
        if !v_scale.name().is_empty() {
            let text = TextNode::new(Point::new(area.x + font, grid.center().y), v_scale.name(), font, theme.text_color)
                .anchor(TextAnchor::Middle)
                .rotation(-90.0);
            children.push(SceneNode::named_group("axis-title-left", Point::ORIGIN, vec![SceneNode::text(text)]));
        }

        Rendered { scene: SceneNode::named_group("plot", Point::ORIGIN, children), targets, panels }
    }

    /// Legends stacked beside the plot; returns the area left over.
    fn place_legends(&self, area: Rect) -> (Rect, Option<SceneNode>) {
        let position = self.theme.legend.position;
        if self.legends.is_empty() || position == LegendPosition::None {
            return (area, None);
        }
        let gap = self.theme.margin;
        let mut nodes = Vec::with_capacity(self.legends.len());
        let rest = if position.is_horizontal() {
            let h = self.legends.iter().map(|l| l.size().y).fold(0.0, f64::max);
            let y = if position == LegendPosition::Top { area.y } else { area.bottom() - h };
            let mut x = area.x;
            for legend in self.legends {
                nodes.push(legend.to_scene(Point::new(x, y)));
                x += legend.size().x + gap;
            }
            let top = if position == LegendPosition::Top { area.y + h + gap } else { area.y };
            Rect::new(area.x, top, area.width, (area.height - h - gap).max(0.0))
        } else {
            let w = self.legends.iter().map(|l| l.size().x).fold(0.0, f64::max);
            let x = if position == LegendPosition::Left { area.x } else { area.right() - w };
            let mut y = area.y;
            for legend in self.legends {
                nodes.push(legend.to_scene(Point::new(x, y)));
                y += legend.size().y + gap;
            }
            let left = if position == LegendPosition::Left { area.x + w + gap } else { area.x };
            Rect::new(left, area.y, (area.width - w - gap).max(0.0), area.height)
        };
        (rest, Some(SceneNode::named_group("legends", Point::ORIGIN, nodes)))
    }

    fn grid(&self, coords: &CartesianCoordinates, h_scale: &Scale, v_scale: &Scale) -> SceneNode {
        let (h_domain, v_domain) = coords.display_domains();
        let client = coords.client();
        let style = Style::stroked(self.theme.grid_color, self.theme.grid_width);
        let mut nodes = Vec::new();
        for (v, _) in axis_breaks(h_scale, h_domain) {
            let x = coords.horizontal_to_client(v);
            nodes.push(SceneNode::line(Point::new(x, client.top()), Point::new(x, client.bottom()), style.clone()));
        }
        for (v, _) in axis_breaks(v_scale, v_domain) {
            let y = coords.vertical_to_client(v);
            nodes.push(SceneNode::line(Point::new(client.left(), y), Point::new(client.right(), y), style.clone()));
        }
        SceneNode::named_group("grid", Point::ORIGIN, nodes)
    }

    fn horizontal_axis(&self, coords: &CartesianCoordinates, scale: &Scale) -> SceneNode {
        let theme = self.theme;
        let (domain, _) = coords.display_domains();
        let client = coords.client();
        let style = Style::stroked(theme.axis_color, theme.axis_width);
        let mut nodes = vec![SceneNode::line(
            Point::new(client.left(), client.bottom()),
            Point::new(client.right(), client.bottom()),
            style.clone(),
        )];
        for (v, label) in axis_breaks(scale, domain) {
            let x = coords.horizontal_to_client(v);
            let tick_end = client.bottom() + theme.tick_length;
            nodes.push(SceneNode::line(Point::new(x, client.bottom()), Point::new(x, tick_end), style.clone()));
            let text = TextNode::new(
                Point::new(x, tick_end + LABEL_GAP + theme.axis_font_size),
                label,
                theme.axis_font_size,
                theme.text_color,
            )
            .anchor(TextAnchor::Middle);
            nodes.push(SceneNode::text(text));
        }
        SceneNode::named_group("axis-bottom", Point::ORIGIN, nodes)
    }

    fn vertical_axis(&self, coords: &CartesianCoordinates, scale: &Scale) -> SceneNode {
        let theme = self.theme;
        let (_, domain) = coords.display_domains();
        let client = coords.client();
        let style = Style::stroked(theme.axis_color, theme.axis_width);
        let mut nodes = vec![SceneNode::line(
            Point::new(client.left(), client.top()),
            Point::new(client.left(), client.bottom()),
            style.clone(),
        )];
        for (v, label) in axis_breaks(scale, domain) {
            let y = coords.vertical_to_client(v);
            let tick_end = client.left() - theme.tick_length;
            nodes.push(SceneNode::line(Point::new(tick_end, y), Point::new(client.left(), y), style.clone()));
            let text = TextNode::new(
                Point::new(tick_end - LABEL_GAP, y + theme.axis_font_size / 3.0),
                label,
                theme.axis_font_size,
                theme.text_color,
            )
            .anchor(TextAnchor::End);
            nodes.push(SceneNode::text(text));
        }
        SceneNode::named_group("axis-left", Point::ORIGIN, nodes)
    }
}

/// Breaks of `scale` inside `domain`, as (transformed value, label).
fn axis_breaks(scale: &Scale, domain: Span) -> Vec<(f64, String)> {
    if !scale.has_breaks() {
        return Vec::new();
    }
    scale
        .scale_breaks()
        .iter()
        .filter(|(_, v, _)| domain.contains(*v))
        .map(|(_, v, label)| (v, label.to_string()))
        .collect()
}
