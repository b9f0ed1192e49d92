//! Axis-aligned rectangles.

use std::fmt;

use crate::resolution::AspectRatio;

/// An axis-aligned rectangle with `f32` coordinates.
///
/// Rectangles are allowed to have zero width and/or height, and may extend outside of the image
/// they refer to (image accessors treat pixels outside the image as absent).
#[derive(Clone, Copy, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    /// Creates a rectangle extending outwards from a center point.
    pub fn from_center(x_center: f32, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            x: x_center - width / 2.0,
            y: y_center - height / 2.0,
            w: width,
            h: height,
        }
    }

    /// Creates a rectangle extending downwards and right from a point.
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            w: width,
            h: height,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.w
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.h
    }

    #[inline]
    pub fn x_center(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn y_center(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        (self.x_center(), self.y_center())
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Moves the rectangle by an offset, keeping its size.
    #[must_use]
    pub fn move_by(&self, x_offset: f32, y_offset: f32) -> Self {
        Self {
            x: self.x + x_offset,
            y: self.y + y_offset,
            ..*self
        }
    }

    /// Scales width and height by `factor`, keeping the center fixed.
    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        Self::from_center(
            self.x_center(),
            self.y_center(),
            self.w * factor,
            self.h * factor,
        )
    }

    /// Grows each side of the rectangle by `amount`, relative to the rectangle's size.
    ///
    /// An `amount` of 0.1 adds 10% of the rectangle's height to its top and bottom, and 10% of its
    /// width to its left and right sides.
    #[must_use]
    pub fn grow_rel(&self, amount: f32) -> Self {
        Self {
            x: self.x - self.w * amount,
            y: self.y - self.h * amount,
            w: self.w * (1.0 + amount * 2.0),
            h: self.h * (1.0 + amount * 2.0),
        }
    }

    /// Grows the rectangle symmetrically until it matches `aspect`, keeping the center fixed.
    ///
    /// Only ever enlarges the rectangle, so the returned [`Rect`] always contains `self`.
    #[must_use]
    pub fn grow_to_fit_aspect(&self, aspect: AspectRatio) -> Self {
        let target = aspect.as_f32();
        let current = self.w / self.h;
        if current < target {
            // Too tall, grow the width.
            Self::from_center(self.x_center(), self.y_center(), self.h * target, self.h)
        } else {
            // Too wide (or matching), grow the height.
            Self::from_center(self.x_center(), self.y_center(), self.w, self.w / target)
        }
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns `None` if the rectangles do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x_max = (self.x + self.w).min(other.x + other.w);
        let y_max = (self.y + self.h).min(other.y + other.h);
        if x_max <= x || y_max <= y {
            return None;
        }

        Some(Rect {
            x,
            y,
            w: x_max - x,
            h: y_max - y,
        })
    }

    /// Computes the intersection-over-union of two rectangles.
    ///
    /// Returns 0.0 when the rectangles do not overlap.
    pub fn iou(&self, other: &Rect) -> f32 {
        let intersection = match self.intersection(other) {
            Some(rect) => rect.area(),
            None => return 0.0,
        };

        intersection / (self.area() + other.area() - intersection)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({},{}), size {}x{}",
            self.x, self.y, self.w, self.h
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection() {
        let a = Rect::from_top_left(0.0, 0.0, 2.0, 2.0);
        let b = Rect::from_top_left(1.0, 1.0, 2.0, 2.0);
        let c = a.intersection(&b).unwrap();
        assert_eq!(c, Rect::from_top_left(1.0, 1.0, 1.0, 1.0));

        let far = Rect::from_top_left(10.0, 10.0, 1.0, 1.0);
        assert!(a.intersection(&far).is_none());
        assert_eq!(a.iou(&far), 0.0);
    }

    #[test]
    fn iou_identical() {
        let a = Rect::from_center(3.0, -2.0, 4.0, 4.0);
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn grow_to_fit_aspect() {
        let tall = Rect::from_center(0.0, 0.0, 1.0, 4.0);
        let square = tall.grow_to_fit_aspect(AspectRatio::SQUARE);
        assert_eq!(square.width(), 4.0);
        assert_eq!(square.height(), 4.0);
        assert_eq!(square.center(), (0.0, 0.0));

        let wide = Rect::from_center(1.0, 1.0, 6.0, 2.0);
        let square = wide.grow_to_fit_aspect(AspectRatio::SQUARE);
        assert_eq!(square.width(), 6.0);
        assert_eq!(square.height(), 6.0);
        assert_eq!(square.center(), (1.0, 1.0));
    }

    #[test]
    fn grow_rel() {
        let rect = Rect::from_top_left(0.0, 0.0, 10.0, 20.0).grow_rel(0.1);
        assert_eq!(rect.x(), -1.0);
        assert_eq!(rect.y(), -2.0);
        assert_eq!(rect.width(), 12.0);
        assert_eq!(rect.height(), 24.0);
    }
}
