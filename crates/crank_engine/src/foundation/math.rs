//! Math utilities and types
//!
//! Screen-space rectangles, colors and the small interpolation helpers used
//! by gameplay code. Screen space has its origin at the top-left corner with
//! y growing downwards.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Floating point rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (may be negative, which makes the rect empty)
    pub w: f32,
    /// Height (may be negative, which makes the rect empty)
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle from its position and size vectors
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Top-left corner
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Right edge (`x + w`)
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (`y + h`)
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// A rect with no area never intersects or contains anything
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Check whether two rects overlap on both axes.
    ///
    /// Edges are exclusive: rects that only touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Half-open containment test: `x <= px < x + w`, same for y
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Smallest rect covering both rects
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Integer rectangle, used for texture source regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    /// Left edge in texels
    pub x: i32,
    /// Top edge in texels
    pub y: i32,
    /// Width in texels
    pub w: i32,
    /// Height in texels
    pub h: i32,
}

impl IRect {
    /// Create a new integer rectangle
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Opaque black
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Create a color from all four channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + b * t
}

/// Inverse of [`lerp`], clamped to `[0, 1]`. An empty range maps to 0.
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if b == a {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rect_intersection_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right_neighbour = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below_neighbour = Rect::new(0.0, 10.0, 10.0, 10.0);

        assert!(!a.intersects(&right_neighbour));
        assert!(!a.intersects(&below_neighbour));
    }

    #[test]
    fn test_empty_rects_never_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let flat = Rect::new(2.0, 2.0, 0.0, 5.0);
        let negative = Rect::new(5.0, 5.0, -3.0, 4.0);

        assert!(!a.intersects(&flat));
        assert!(!a.intersects(&negative));
        assert!(negative.is_empty());
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);

        assert!(rect.contains_point(Vec2::new(10.0, 10.0)));
        assert!(rect.contains_point(Vec2::new(29.9, 29.9)));
        assert!(!rect.contains_point(Vec2::new(30.0, 15.0)));
        assert!(!rect.contains_point(Vec2::new(15.0, 30.0)));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(-5.0, 5.0, 10.0, 20.0);
        let u = a.union(&b);

        assert_eq!(u, Rect::new(-5.0, 0.0, 15.0, 25.0));
    }

    #[test]
    fn test_lerp_and_inverse() {
        assert_relative_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_relative_eq!(inverse_lerp(0.0, 10.0, 2.5), 0.25);
        assert_relative_eq!(inverse_lerp(0.0, 10.0, 20.0), 1.0);
        assert_relative_eq!(inverse_lerp(0.0, 10.0, -4.0), 0.0);
    }

    #[test]
    fn test_inverse_lerp_of_empty_range_is_zero() {
        let t = inverse_lerp(3.0, 3.0, 3.0);
        assert!(!t.is_nan());
        assert_relative_eq!(t, 0.0);
        assert_relative_eq!(inverse_lerp(3.0, 3.0, 8.0), 0.0);
    }
}
