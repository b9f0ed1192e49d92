//! Overlay rendering.
//!
//! Draws the hand skeleton, the landmark dots, and the count badge onto the mirrored display
//! frame. No classification happens here.

use crate::hand::CONNECTIVITY;
use crate::image::{draw, Color, Image};
use crate::landmark::{Landmark, Landmarks};

/// Smallest landmark dot radius, in pixels.
pub const MIN_DOT_RADIUS: u32 = 3;

/// Largest landmark dot radius, in pixels.
pub const MAX_DOT_RADIUS: u32 = 15;

/// Dot radius per unit of hand scale, relative to the display width.
const DOT_RADIUS_FACTOR: f32 = 0.08;

const DOT_COLOR: Color = Color::GREEN;
const DOT_OUTLINE_COLOR: Color = Color::BLACK;
const SKELETON_COLOR: Color = Color::GREEN;
const BADGE_COLOR: Color = Color::GREEN;
const BADGE_TEXT_COLOR: Color = Color::BLUE;

/// Computes the landmark dot radius for a hand of the given scale.
///
/// The radius grows with the hand's apparent size (so dots stay proportionate as the hand moves
/// towards or away from the camera), but is clamped to
/// [`MIN_DOT_RADIUS`]..=[`MAX_DOT_RADIUS`] to stay legible.
pub fn dot_radius(hand_scale: f32, display_width: u32) -> u32 {
    let radius = (hand_scale * display_width as f32 * DOT_RADIUS_FACTOR) as u32;
    radius.clamp(MIN_DOT_RADIUS, MAX_DOT_RADIUS)
}

/// Draws one hand's skeleton and landmark dots onto the mirrored display frame.
///
/// `landmarks` are normalized to `[0, 1]` in *unmirrored* frame coordinates; the X axis is
/// flipped here to match the selfie-view display frame.
pub fn draw_hand(image: &mut Image, landmarks: &Landmarks, dot_radius: u32) {
    for &(a, b) in CONNECTIVITY {
        let (ax, ay) = mirrored(landmarks.get(a as usize), image);
        let (bx, by) = mirrored(landmarks.get(b as usize), image);
        draw::line(image, ax, ay, bx, by).color(SKELETON_COLOR);
    }

    for landmark in landmarks.iter() {
        let (x, y) = mirrored(landmark, image);
        draw::circle(image, x, y, dot_radius)
            .fill(DOT_COLOR)
            .color(DOT_OUTLINE_COLOR);
    }
}

/// Draws the count badge into the top-left corner of the display frame.
pub fn draw_count_badge(image: &mut Image, total: u32) {
    draw::rect(image, 30, 30, 170, 170)
        .fill(BADGE_COLOR)
        .color(BADGE_COLOR);
    draw::text(image, 115, 115, &total.to_string())
        .color(BADGE_TEXT_COLOR)
        .scale(7);
}

fn mirrored(landmark: Landmark, image: &Image) -> (i32, i32) {
    let x = ((1.0 - landmark.x()) * image.width() as f32) as i32;
    let y = (landmark.y() * image.height() as f32) as i32;
    (x, y)
}

#[cfg(test)]
mod tests {
    use crate::hand::NUM_LANDMARKS;

    use super::*;

    #[test]
    fn dot_radius_clamps() {
        assert_eq!(dot_radius(0.0, 1280), MIN_DOT_RADIUS);
        assert_eq!(dot_radius(10.0, 1280), MAX_DOT_RADIUS);
    }

    #[test]
    fn dot_radius_monotonic() {
        let mut last = 0;
        for step in 0..100 {
            let scale = step as f32 / 100.0;
            let radius = dot_radius(scale, 1280);
            assert!(radius >= last, "radius shrank at scale {scale}");
            assert!((MIN_DOT_RADIUS..=MAX_DOT_RADIUS).contains(&radius));
            last = radius;
        }
    }

    #[test]
    fn dot_radius_matches_display_scaling() {
        // 0.1 * 1000 * 0.08 = 8 px, inside the clamp range.
        assert_eq!(dot_radius(0.1, 1000), 8);
    }

    #[test]
    fn dots_are_mirrored() {
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        // Put every landmark in the left quarter of the frame so all dots land in one spot.
        landmarks.map_positions(|_| [0.25, 0.5, 0.0]);

        let mut image = Image::new(100, 100);
        draw_hand(&mut image, &landmarks, 3);

        // Selfie view: the dot shows up on the *right* side of the display frame.
        assert_eq!(image.get(75, 50), DOT_COLOR);
        assert_eq!(image.get(25, 50), Color::NULL);
    }

    #[test]
    fn badge_is_filled() {
        let mut image = Image::new(300, 300);
        draw_count_badge(&mut image, 3);

        assert_eq!(image.get(35, 35), BADGE_COLOR);
        assert_eq!(image.get(199, 199), BADGE_COLOR);
        assert_eq!(image.get(210, 210), Color::NULL);
        // The digit is drawn in a contrasting color somewhere inside the badge.
        let mut text_pixels = 0;
        for y in 30..200 {
            for x in 30..200 {
                if image.get(x, y) == BADGE_TEXT_COLOR {
                    text_pixels += 1;
                }
            }
        }
        assert!(text_pixels > 0);
    }
}
