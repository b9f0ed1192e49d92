//! End-to-end fixtures: synthetic landmark sets driven through the detector boundary, the finger
//! classifier, and the overlay renderer, without a camera or model files.

use std::collections::VecDeque;

use yubi::counting::{self, CountChange};
use yubi::hand::{Hand, HandDetector, NUM_LANDMARKS};
use yubi::image::{Color, Image};
use yubi::landmark::{Landmark, Landmarks};
use yubi::overlay;

fn hand_from(positions: [[f32; 2]; NUM_LANDMARKS]) -> Hand {
    let mut landmarks = Landmarks::new(NUM_LANDMARKS);
    for (i, [x, y]) in positions.into_iter().enumerate() {
        landmarks.set(i, Landmark::new([x, y, 0.0]));
    }
    Hand::new(landmarks)
}

/// An upright open right hand, fingers pointing up, roughly centered in the frame.
fn open_hand() -> Hand {
    hand_from([
        [0.50, 0.90], // wrist
        [0.44, 0.82], // thumb cmc
        [0.39, 0.74], // thumb mcp
        [0.36, 0.66], // thumb ip
        [0.33, 0.60], // thumb tip
        [0.44, 0.60], // index mcp
        [0.43, 0.48], // index pip
        [0.43, 0.40], // index dip
        [0.43, 0.33], // index tip
        [0.50, 0.58], // middle mcp
        [0.50, 0.45], // middle pip
        [0.50, 0.36], // middle dip
        [0.50, 0.28], // middle tip
        [0.56, 0.60], // ring mcp
        [0.56, 0.48], // ring pip
        [0.56, 0.40], // ring dip
        [0.56, 0.32], // ring tip
        [0.62, 0.63], // pinky mcp
        [0.63, 0.54], // pinky pip
        [0.63, 0.48], // pinky dip
        [0.63, 0.42], // pinky tip
    ])
}

/// The same hand closed into a fist: every tip at or below its PIP joint, thumb tucked in.
fn fist() -> Hand {
    hand_from([
        [0.50, 0.90],
        [0.44, 0.82],
        [0.40, 0.76],
        [0.42, 0.70],
        [0.46, 0.68],
        [0.44, 0.62],
        [0.44, 0.55],
        [0.45, 0.62],
        [0.45, 0.68],
        [0.50, 0.60],
        [0.50, 0.53],
        [0.50, 0.61],
        [0.50, 0.68],
        [0.56, 0.61],
        [0.56, 0.55],
        [0.56, 0.62],
        [0.56, 0.68],
        [0.62, 0.63],
        [0.62, 0.57],
        [0.62, 0.63],
        [0.62, 0.67],
    ])
}

/// A [`HandDetector`] that replays a prerecorded sequence of per-frame hand sets.
struct FixtureDetector {
    frames: VecDeque<Vec<Hand>>,
}

impl FixtureDetector {
    fn new<I: IntoIterator<Item = Vec<Hand>>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl HandDetector for FixtureDetector {
    fn detect(&mut self, _image: &Image) -> anyhow::Result<Vec<Hand>> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

fn total_for(hands: &[Hand]) -> u32 {
    hands
        .iter()
        .map(|hand| counting::classify(hand.landmarks()).count())
        .sum()
}

#[test]
fn open_hand_counts_five() {
    let hand = open_hand();
    let fingers = counting::classify(hand.landmarks());
    assert_eq!(fingers.states(), [true; 5]);
    assert_eq!(fingers.count(), 5);
}

#[test]
fn fist_counts_zero() {
    let hand = fist();
    let fingers = counting::classify(hand.landmarks());
    assert_eq!(fingers.states(), [false; 5]);
    assert_eq!(fingers.count(), 0);
}

#[test]
fn totals_sum_across_hands() {
    assert_eq!(total_for(&[open_hand(), fist()]), 5);
    assert_eq!(total_for(&[open_hand(), open_hand()]), 10);
    assert_eq!(total_for(&[]), 0);
}

#[test]
fn detector_boundary_drives_edge_triggered_logging() {
    let mut detector = FixtureDetector::new([
        vec![open_hand()],
        vec![open_hand()],
        vec![],
        vec![open_hand(), open_hand()],
    ]);

    let frame = Image::new(64, 36);
    let mut change = CountChange::new();
    let mut reported = Vec::new();
    for _ in 0..4 {
        let hands = detector.detect(&frame).unwrap();
        if let Some(total) = change.update(total_for(&hands)) {
            reported.push(total);
        }
    }

    // 5, 5, 0, 10 -> only the changes are reported, including the very first frame.
    assert_eq!(reported, [5, 0, 10]);
}

#[test]
fn overlay_marks_landmarks_on_the_mirrored_frame() {
    let hand = open_hand();
    let mut display = Image::new(640, 360);

    let scale = counting::hand_scale(hand.landmarks());
    let radius = overlay::dot_radius(scale, display.width());
    overlay::draw_hand(&mut display, hand.landmarks(), radius);
    overlay::draw_count_badge(&mut display, 5);

    // The index fingertip sits at (0.43, 0.33) and must show up mirrored.
    let x = ((1.0 - 0.43) * 640.0) as u32;
    let y = (0.33 * 360.0) as u32;
    assert_eq!(display.get(x, y), Color::GREEN);

    // The un-mirrored position stays untouched.
    assert_eq!(display.get((0.33 * 640.0) as u32, 200), Color::NULL);

    // Badge in the top-left corner.
    assert_eq!(display.get(35, 35), Color::GREEN);
}
