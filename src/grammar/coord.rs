//! Coordinate systems for Grammar of Graphics.
//!
//! Defines how positions in transformed data space are mapped to client
//! pixels inside a panel.

use crate::geometry::{Point, Rect, Span};
use std::fmt::Debug;

/// Maps transformed data positions onto client pixels.
///
/// Points are given in aesthetic space: `x` holds the value of the X
/// aesthetic, `y` the value of Y. A flipped system draws X vertically.
pub trait CoordinateSystem: Debug {
    /// Client position of a data point, `None` when a coordinate is not finite.
    fn to_client(&self, p: Point) -> Option<Point>;

    /// Client rectangle spanned by two opposite data corners.
    fn to_client_rect(&self, r: Rect) -> Option<Rect> {
        let a = self.to_client(r.origin())?;
        let b = self.to_client(r.origin().add(r.size()))?;
        Some(Rect::span_points(a, b))
    }

    /// Client pixels per data unit along X and Y (aesthetic space).
    fn unit_size(&self) -> Point;

    /// Whether X is drawn vertically.
    fn is_flipped(&self) -> bool;
}

/// Linear cartesian mapping of two domains onto a client rectangle.
///
/// The vertical axis grows upward: the lower end of the vertical domain sits
/// at the bottom of the client rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianCoordinates {
    x_domain: Span,
    y_domain: Span,
    client: Rect,
    flipped: bool,
}

impl CartesianCoordinates {
    /// Map `x_domain` and `y_domain` onto `client`.
    #[must_use]
    pub fn new(x_domain: Span, y_domain: Span, client: Rect) -> Self {
        Self { x_domain, y_domain, client, flipped: false }
    }

    /// Draw X vertically and Y horizontally.
    #[must_use]
    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Domain of the X aesthetic.
    #[must_use]
    pub fn x_domain(&self) -> Span {
        self.x_domain
    }

    /// Domain of the Y aesthetic.
    #[must_use]
    pub fn y_domain(&self) -> Span {
        self.y_domain
    }

    /// Client rectangle.
    #[must_use]
    pub fn client(&self) -> Rect {
        self.client
    }

    /// Domains drawn along the horizontal and vertical client axes.
    #[must_use]
    pub fn display_domains(&self) -> (Span, Span) {
        if self.flipped {
            (self.y_domain, self.x_domain)
        } else {
            (self.x_domain, self.y_domain)
        }
    }

    /// Client x of a value on the horizontal axis.
    #[must_use]
    pub fn horizontal_to_client(&self, v: f64) -> f64 {
        let (h, _) = self.display_domains();
        self.client.left() + normalize(h, v) * self.client.size().x
    }

    /// Client y of a value on the vertical axis.
    #[must_use]
    pub fn vertical_to_client(&self, v: f64) -> f64 {
        let (_, vd) = self.display_domains();
        self.client.bottom() - normalize(vd, v) * self.client.size().y
    }
}

fn normalize(domain: Span, v: f64) -> f64 {
    if domain.is_degenerate() {
        0.5
    } else {
        (v - domain.lower()) / domain.length()
    }
}

impl CoordinateSystem for CartesianCoordinates {
    fn to_client(&self, p: Point) -> Option<Point> {
        if !p.is_finite() {
            return None;
        }
        let p = if self.flipped { p.flip() } else { p };
        Some(Point::new(self.horizontal_to_client(p.x), self.vertical_to_client(p.y)))
    }

    fn unit_size(&self) -> Point {
        let per_unit = |d: Span, px: f64| if d.is_degenerate() { px } else { px / d.length() };
        let (h, v) = self.display_domains();
        let size = Point::new(per_unit(h, self.client.size().x), per_unit(v, self.client.size().y));
        if self.flipped { size.flip() } else { size }
    }

    fn is_flipped(&self) -> bool {
        self.flipped
    }
}

/// Placeholder for layers whose coordinates have not been assigned yet.
///
/// Every method panics: reaching one means an earlier stage failed to wire
/// the real coordinate system.
#[derive(Debug, Clone, Copy, Default)]
pub struct BogusCoordinateSystem;

const BOGUS: &str = "Bogus coordinate system is not supposed to be used.";

impl CoordinateSystem for BogusCoordinateSystem {
    fn to_client(&self, _: Point) -> Option<Point> {
        panic!("{BOGUS}")
    }

    fn unit_size(&self) -> Point {
        panic!("{BOGUS}")
    }

    fn is_flipped(&self) -> bool {
        panic!("{BOGUS}")
    }
}

/// Coordinate system specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Coord {
    /// Cartesian coordinates (x, y).
    Cartesian {
        /// X axis limits.
        xlim: Option<(f64, f64)>,
        /// Y axis limits.
        ylim: Option<(f64, f64)>,
        /// Whether to flip x and y.
        flip: bool,
    },
    /// Cartesian coordinates with a fixed aspect ratio.
    Fixed {
        /// Aspect ratio (y unit / x unit).
        ratio: f64,
        /// Whether to flip x and y.
        flip: bool,
    },
}

impl Default for Coord {
    fn default() -> Self {
        Coord::cartesian()
    }
}

impl Coord {
    /// Create a Cartesian coordinate system.
    #[must_use]
    pub fn cartesian() -> Self {
        Coord::Cartesian { xlim: None, ylim: None, flip: false }
    }

    /// Create a fixed aspect ratio coordinate system.
    #[must_use]
    pub fn fixed(ratio: f64) -> Self {
        Coord::Fixed { ratio, flip: false }
    }

    /// Set x-axis limits.
    #[must_use]
    pub fn xlim(mut self, min: f64, max: f64) -> Self {
        if let Coord::Cartesian { ref mut xlim, .. } = self {
            *xlim = Some((min, max));
        }
        self
    }

    /// Set y-axis limits.
    #[must_use]
    pub fn ylim(mut self, min: f64, max: f64) -> Self {
        if let Coord::Cartesian { ref mut ylim, .. } = self {
            *ylim = Some((min, max));
        }
        self
    }

    /// Flip x and y axes.
    #[must_use]
    pub fn flip(mut self) -> Self {
        match self {
            Coord::Cartesian { ref mut flip, .. } | Coord::Fixed { ref mut flip, .. } => *flip = true,
        }
        self
    }

    /// Whether x and y are flipped.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        match self {
            Coord::Cartesian { flip, .. } | Coord::Fixed { flip, .. } => *flip,
        }
    }

    /// Explicit x limits.
    #[must_use]
    pub fn x_limits(&self) -> Option<Span> {
        match self {
            Coord::Cartesian { xlim: Some((a, b)), .. } => Some(Span::new(*a, *b)),
            _ => None,
        }
    }

    /// Explicit y limits.
    #[must_use]
    pub fn y_limits(&self) -> Option<Span> {
        match self {
            Coord::Cartesian { ylim: Some((a, b)), .. } => Some(Span::new(*a, *b)),
            _ => None,
        }
    }

    /// Coordinates for a panel of `client` size.
    ///
    /// Fixed ratios shrink one side of the panel and center it.
    #[must_use]
    pub fn build(&self, x_domain: Span, y_domain: Span, client: Rect) -> CartesianCoordinates {
        let x_domain = self.x_limits().unwrap_or(x_domain);
        let y_domain = self.y_limits().unwrap_or(y_domain);
        let client = match self {
            Coord::Fixed { ratio, flip } if *ratio > 0.0 => {
                let (h, v) = if *flip { (y_domain, x_domain) } else { (x_domain, y_domain) };
                fit_ratio(client, h.length(), v.length() * ratio)
            }
            _ => client,
        };
        CartesianCoordinates::new(x_domain, y_domain, client).flipped(self.is_flipped())
    }
}

fn fit_ratio(client: Rect, h_units: f64, v_units: f64) -> Rect {
    if h_units <= 0.0 || v_units <= 0.0 {
        return client;
    }
    let size = client.size();
    let scale = (size.x / h_units).min(size.y / v_units);
    let fitted = Point::new(h_units * scale, v_units * scale);
    let offset = Point::new((size.x - fitted.x) / 2.0, (size.y - fitted.y) / 2.0);
    Rect::from_origin_size(client.origin().add(offset), fitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> CartesianCoordinates {
        CartesianCoordinates::new(Span::new(0.0, 10.0), Span::new(0.0, 100.0), Rect::new(0.0, 0.0, 200.0, 100.0))
    }

    #[test]
    fn test_to_client() {
        let c = coords();
        assert_eq!(c.to_client(Point::new(0.0, 0.0)), Some(Point::new(0.0, 100.0)));
        assert_eq!(c.to_client(Point::new(10.0, 100.0)), Some(Point::new(200.0, 0.0)));
        assert_eq!(c.to_client(Point::new(5.0, 50.0)), Some(Point::new(100.0, 50.0)));
        assert_eq!(c.to_client(Point::new(f64::NAN, 1.0)), None);
    }

    #[test]
    fn test_flipped_draws_x_vertically() {
        let c = coords().flipped(true);
        // x = 10 is the top of the panel, y = 0 the left edge
        assert_eq!(c.to_client(Point::new(10.0, 0.0)), Some(Point::new(0.0, 0.0)));
        assert!(c.is_flipped());
        let unit = c.unit_size();
        assert_eq!(unit.x, 10.0);
        assert_eq!(unit.y, 2.0);
    }

    #[test]
    fn test_to_client_rect() {
        let r = coords().to_client_rect(Rect::new(0.0, 0.0, 5.0, 50.0)).unwrap();
        assert_eq!(r, Rect::new(0.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn test_degenerate_domain_centers() {
        let c = CartesianCoordinates::new(Span::singleton(3.0), Span::new(0.0, 1.0), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(c.to_client(Point::new(3.0, 0.0)).unwrap().x, 50.0);
    }

    #[test]
    #[should_panic(expected = "Bogus coordinate system is not supposed to be used.")]
    fn test_bogus_panics() {
        let _ = BogusCoordinateSystem.to_client(Point::ORIGIN);
    }

    #[test]
    fn test_coord_cartesian_limits() {
        let c = Coord::cartesian().xlim(0.0, 10.0).ylim(-5.0, 5.0);
        assert_eq!(c.x_limits(), Some(Span::new(0.0, 10.0)));
        let built = c.build(Span::new(1.0, 2.0), Span::new(1.0, 2.0), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(built.y_domain(), Span::new(-5.0, 5.0));
        assert!(!built.is_flipped());
    }

    #[test]
    fn test_coord_flip() {
        assert!(Coord::cartesian().flip().is_flipped());
        assert!(Coord::fixed(1.0).flip().is_flipped());
        assert!(!Coord::default().is_flipped());
    }

    #[test]
    fn test_fixed_ratio_centers_panel() {
        let c = Coord::fixed(1.0).build(Span::new(0.0, 10.0), Span::new(0.0, 5.0), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(c.client(), Rect::new(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn test_xlim_on_fixed() {
        // Limits only apply to plain cartesian coordinates
        let c = Coord::fixed(1.0).xlim(0.0, 10.0);
        assert!(c.x_limits().is_none());
    }
}
