//! Drawing primitives for overlay rendering.
//!
//! All draw functions return a guard object that performs the actual drawing when dropped and
//! allows customization (colors, stroke widths, …) before that.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::image::{Color, Image};

/// Guard returned by [`line`][line()]; draws the line when dropped and allows customization.
pub struct DrawLine<'a> {
    image: &'a mut Image,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
    color: Color,
    stroke_width: u32,
}

impl<'a> DrawLine<'a> {
    /// Sets the line's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the line's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl<'a> Drop for DrawLine<'a> {
    fn drop(&mut self) {
        match Line::new(
            Point::new(self.start_x, self.start_y),
            Point::new(self.end_x, self.end_y),
        )
        .into_styled(PrimitiveStyle::with_stroke(self.color, self.stroke_width))
        .draw(&mut Target(self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`circle`]; draws the circle when dropped and allows customization.
pub struct DrawCircle<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    radius: u32,
    stroke_width: u32,
    stroke: Color,
    fill: Option<Color>,
}

impl<'a> DrawCircle<'a> {
    /// Sets the circle's outline color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.stroke = color;
        self
    }

    /// Sets the circle's outline stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    /// Fills the inside of the circle with `color`.
    ///
    /// By default, only the outline is drawn.
    pub fn fill(&mut self, color: Color) -> &mut Self {
        self.fill = Some(color);
        self
    }
}

impl<'a> Drop for DrawCircle<'a> {
    fn drop(&mut self) {
        let top_left = Point::new(self.x - self.radius as i32, self.y - self.radius as i32);
        let mut style = PrimitiveStyleBuilder::new()
            .stroke_color(self.stroke)
            .stroke_width(self.stroke_width);
        if let Some(fill) = self.fill {
            style = style.fill_color(fill);
        }

        match Circle::new(top_left, self.radius * 2 + 1)
            .into_styled(style.build())
            .draw(&mut Target(self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`rect`]; draws the rectangle when dropped and allows customization.
pub struct DrawRect<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    stroke: Color,
    stroke_width: u32,
    fill: Option<Color>,
}

impl<'a> DrawRect<'a> {
    /// Sets the rectangle's outline color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.stroke = color;
        self
    }

    /// Sets the rectangle's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    /// Fills the inside of the rectangle with `color`.
    ///
    /// By default, only the outline is drawn.
    pub fn fill(&mut self, color: Color) -> &mut Self {
        self.fill = Some(color);
        self
    }
}

impl<'a> Drop for DrawRect<'a> {
    fn drop(&mut self) {
        let mut style = PrimitiveStyleBuilder::new()
            .stroke_color(self.stroke)
            .stroke_width(self.stroke_width);
        if let Some(fill) = self.fill {
            style = style.fill_color(fill);
        }

        match Rectangle::new(Point::new(self.x, self.y), Size::new(self.width, self.height))
            .into_styled(style.build())
            .draw(&mut Target(self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`text`]; draws the text when dropped and allows customization.
pub struct DrawText<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    text: &'a str,
    color: Color,
    scale: u32,
    alignment: Alignment,
    baseline: Baseline,
}

impl<'a> DrawText<'a> {
    /// Sets the text color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Magnifies the glyphs by an integer factor.
    ///
    /// The built-in font is 10x20 pixels per glyph; a scale of `n` renders every font pixel as an
    /// `n`x`n` block.
    pub fn scale(&mut self, scale: u32) -> &mut Self {
        assert!(scale != 0, "text scale must be greater than zero");
        self.scale = scale;
        self
    }

    /// Aligns the top of the text with the `y` coordinate.
    pub fn align_top(&mut self) -> &mut Self {
        self.baseline = Baseline::Top;
        self
    }

    /// Aligns the left side of the text with the `x` coordinate.
    pub fn align_left(&mut self) -> &mut Self {
        self.alignment = Alignment::Left;
        self
    }
}

impl<'a> Drop for DrawText<'a> {
    fn drop(&mut self) {
        let character_style = MonoTextStyle::new(&ascii::FONT_10X20, self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(self.baseline)
            .build();

        let scale = self.scale as i32;
        let text = Text::with_text_style(
            self.text,
            Point::new(self.x / scale, self.y / scale),
            character_style,
            text_style,
        );

        match text.draw(&mut Scaled {
            image: self.image,
            factor: self.scale,
        }) {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws a line onto an image.
pub fn line(
    image: &mut Image,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
) -> DrawLine<'_> {
    DrawLine {
        image,
        start_x,
        start_y,
        end_x,
        end_y,
        color: Color::GREEN,
        stroke_width: 1,
    }
}

/// Draws a circle of the given radius around a center point.
pub fn circle(image: &mut Image, x: i32, y: i32, radius: u32) -> DrawCircle<'_> {
    DrawCircle {
        image,
        x,
        y,
        radius,
        stroke_width: 1,
        stroke: Color::GREEN,
        fill: None,
    }
}

/// Draws a rectangle onto an image.
pub fn rect(image: &mut Image, x: i32, y: i32, width: u32, height: u32) -> DrawRect<'_> {
    DrawRect {
        image,
        x,
        y,
        width,
        height,
        stroke: Color::RED,
        stroke_width: 1,
        fill: None,
    }
}

/// Draws a text string onto an image.
///
/// By default, the text is drawn centered horizontally and vertically around `x` and `y`.
pub fn text<'a>(image: &'a mut Image, x: i32, y: i32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image,
        x,
        y,
        text,
        color: Color::RED,
        scale: 1,
        alignment: Alignment::Center,
        baseline: Baseline::Middle,
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            if pixel.0.x >= 0
                && (pixel.0.x as u32) < self.0.width()
                && pixel.0.y >= 0
                && (pixel.0.y as u32) < self.0.height()
            {
                self.0.set(pixel.0.x as _, pixel.0.y as _, pixel.1);
            }
        }

        Ok(())
    }
}

/// A draw target that magnifies every drawn pixel to a `factor`x`factor` block.
struct Scaled<'a> {
    image: &'a mut Image,
    factor: u32,
}

impl Dimensions for Scaled<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size {
                width: self.image.width() / self.factor,
                height: self.image.height() / self.factor,
            },
        }
    }
}

impl DrawTarget for Scaled<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            if pixel.0.x < 0 || pixel.0.y < 0 {
                continue;
            }

            let (base_x, base_y) = (
                pixel.0.x as u32 * self.factor,
                pixel.0.y as u32 * self.factor,
            );
            for y in base_y..(base_y + self.factor).min(self.image.height()) {
                for x in base_x..(base_x + self.factor).min(self.image.width()) {
                    self.image.set(x, y, pixel.1);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_circle_with_outline() {
        let mut image = Image::new(9, 9);
        circle(&mut image, 4, 4, 3)
            .fill(Color::GREEN)
            .color(Color::BLACK);

        assert_eq!(image.get(4, 4), Color::GREEN);
        assert_eq!(image.get(4, 1), Color::BLACK);
        assert_eq!(image.get(0, 0), Color::NULL);
    }

    #[test]
    fn filled_rect() {
        let mut image = Image::new(8, 8);
        rect(&mut image, 1, 1, 4, 4).fill(Color::RED).color(Color::RED);

        assert_eq!(image.get(1, 1), Color::RED);
        assert_eq!(image.get(4, 4), Color::RED);
        assert_eq!(image.get(5, 5), Color::NULL);
        assert_eq!(image.get(0, 0), Color::NULL);
    }

    #[test]
    fn drawing_is_clipped_to_image() {
        let mut image = Image::new(4, 4);
        line(&mut image, -10, 2, 10, 2).color(Color::WHITE);
        assert_eq!(image.get(0, 2), Color::WHITE);
        assert_eq!(image.get(3, 2), Color::WHITE);
    }
}
