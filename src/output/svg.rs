//! SVG output encoder.
//!
//! Serializes a [`SceneNode`] tree into a standalone SVG document.
//! Image nodes are embedded as base64 `data:` URIs.

use crate::color::Rgba;
use crate::error::Result;
use crate::render::{SceneNode, Style, TextAnchor, TextNode};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG encoder for scene graphs.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// SVG width
    width: u32,
    /// SVG height
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    /// Top-level nodes
    nodes: Vec<SceneNode>,
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), nodes: Vec::new() }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a node.
    #[must_use]
    pub fn node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a node in place.
    pub fn add_node(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, rgba_to_css(bg));
        }

        for node in &self.nodes {
            write_node(&mut svg, node, 1);
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!("rgba({},{},{},{:.3})", color.r, color.g, color.b, f64::from(color.a) / 255.0)
    }
}

/// Coordinates rounded to three decimals.
fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{r}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = String::new();
    let fill = style.fill.map_or_else(|| "none".to_string(), rgba_to_css);
    let _ = write!(attrs, r#" fill="{fill}""#);
    if let Some(stroke) = style.stroke {
        let _ = write!(attrs, r#" stroke="{}" stroke-width="{}""#, rgba_to_css(stroke), num(style.stroke_width));
        if let Some(dash) = &style.dash {
            let pattern: Vec<String> = dash.iter().map(|d| num(*d)).collect();
            let _ = write!(attrs, r#" stroke-dasharray="{}""#, pattern.join(","));
        }
    }
    attrs
}

fn write_node(svg: &mut String, node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        SceneNode::Group { id, offset, children } => {
            let class = id.as_ref().map(|id| format!(r#" class="{}""#, escape(id))).unwrap_or_default();
            let transform = if offset.x == 0.0 && offset.y == 0.0 {
                String::new()
            } else {
                format!(r#" transform="translate({},{})""#, num(offset.x), num(offset.y))
            };
            let _ = writeln!(svg, "{indent}<g{class}{transform}>");
            for child in children {
                write_node(svg, child, depth + 1);
            }
            let _ = writeln!(svg, "{indent}</g>");
        }
        SceneNode::Line { segment, style } => {
            let _ = writeln!(
                svg,
                r#"{indent}<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                num(segment.start.x),
                num(segment.start.y),
                num(segment.end.x),
                num(segment.end.y),
                style_attrs(style)
            );
        }
        SceneNode::Rect { rect, style } => {
            let _ = writeln!(
                svg,
                r#"{indent}<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                num(rect.x),
                num(rect.y),
                num(rect.width),
                num(rect.height),
                style_attrs(style)
            );
        }
        SceneNode::Circle { center, radius, style } => {
            let _ = writeln!(
                svg,
                r#"{indent}<circle cx="{}" cy="{}" r="{}"{}/>"#,
                num(center.x),
                num(center.y),
                num(*radius),
                style_attrs(style)
            );
        }
        SceneNode::Path { points, closed, style } => {
            let points_str: Vec<String> = points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))).collect();
            let tag = if *closed { "polygon" } else { "polyline" };
            let _ = writeln!(
                svg,
                r#"{indent}<{tag} points="{}"{}/>"#,
                points_str.join(" "),
                style_attrs(style)
            );
        }
        SceneNode::Text(text) => write_text(svg, text, &indent),
        SceneNode::Image { rect, mime, bytes } => {
            let data = STANDARD.encode(bytes);
            let _ = writeln!(
                svg,
                r#"{indent}<image x="{}" y="{}" width="{}" height="{}" xlink:href="data:{mime};base64,{data}"/>"#,
                num(rect.x),
                num(rect.y),
                num(rect.width),
                num(rect.height)
            );
        }
    }
}

fn write_text(svg: &mut String, text: &TextNode, indent: &str) {
    let anchor = match text.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let (x, y) = (num(text.position.x), num(text.position.y));
    let rotate = if text.rotation == 0.0 {
        String::new()
    } else {
        format!(r#" transform="rotate({} {x} {y})""#, num(text.rotation))
    };
    let _ = write!(
        svg,
        r#"{indent}<text x="{x}" y="{y}" font-size="{}" fill="{}" text-anchor="{anchor}" font-family="sans-serif"{rotate}>"#,
        num(text.font_size),
        rgba_to_css(text.color)
    );
    let mut lines = text.text.split('\n');
    if let Some(first) = lines.next() {
        svg.push_str(&escape(first));
    }
    for line in lines {
        let _ = write!(svg, r#"<tspan x="{x}" dy="1em">{}</tspan>"#, escape(line));
    }
    svg.push_str("</text>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(800, 600).render();
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_svg_rect() {
        let svg = SvgEncoder::new(100, 100)
            .node(SceneNode::rect(Rect::new(10.0, 20.0, 30.0, 40.0), Style::filled(Rgba::RED)))
            .render();
        assert!(svg.contains(r#"<rect x="10" y="20" width="30" height="40" fill="rgb(255,0,0)"/>"#));
    }

    #[test]
    fn test_svg_line_dashed() {
        let style = Style::stroked(Rgba::BLACK, 2.0).dash(Some(vec![4.0, 4.0]));
        let svg = SvgEncoder::new(100, 100)
            .node(SceneNode::line(Point::ORIGIN, Point::new(100.0, 100.0), style))
            .render();
        assert!(svg.contains(r#"x2="100" y2="100""#));
        assert!(svg.contains(r#"stroke-width="2""#));
        assert!(svg.contains(r#"stroke-dasharray="4,4""#));
    }

    #[test]
    fn test_svg_polyline_and_polygon() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(50.0, 100.0), Point::new(100.0, 0.0)];
        let svg = SvgEncoder::new(100, 100)
            .node(SceneNode::polyline(pts.clone(), Style::stroked(Rgba::GREEN, 1.5)))
            .node(SceneNode::polygon(pts, Style::filled(Rgba::GREEN)))
            .render();
        assert!(svg.contains(r#"<polyline points="0,0 50,100 100,0" fill="none""#));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_svg_group_translate() {
        let svg = SvgEncoder::new(100, 100)
            .node(SceneNode::named_group("legend", Point::new(5.5, 2.0), vec![]))
            .render();
        assert!(svg.contains(r#"<g class="legend" transform="translate(5.5,2)">"#));
    }

    #[test]
    fn test_svg_text_escaping_and_lines() {
        let text = TextNode::new(Point::new(10.0, 50.0), "<b> & \"q\"\nsecond", 12.0, Rgba::BLACK)
            .anchor(TextAnchor::Middle)
            .rotation(-90.0);
        let svg = SvgEncoder::new(100, 100).node(SceneNode::text(text)).render();
        assert!(svg.contains("&lt;b&gt; &amp; &quot;q&quot;"));
        assert!(svg.contains(r#"<tspan x="10" dy="1em">second</tspan>"#));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"transform="rotate(-90 10 50)""#));
    }

    #[test]
    fn test_svg_image_base64() {
        let node = SceneNode::Image {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let svg = SvgEncoder::new(10, 10).node(node).render();
        assert!(svg.contains("data:image/png;base64,AQID"));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_svg_rgba_alpha() {
        let css = rgba_to_css(Rgba::new(255, 0, 0, 128));
        assert!(css.contains("rgba"));
        assert!(css.contains("0.502"));
    }

    #[test]
    fn test_num_rounding() {
        assert_eq!(num(1.234_56), "1.235");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(42.0), "42");
    }

    #[test]
    fn test_svg_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        SvgEncoder::new(100, 100)
            .node(SceneNode::circle(Point::new(5.0, 5.0), 2.0, Style::filled(Rgba::BLUE)))
            .write_to_file(&path)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<circle"));
        assert!(content.contains("</svg>"));
    }
}
