//! Finger classification.
//!
//! Decides, from a single frame's hand landmarks, which fingers are extended. The rules are
//! deliberately simple geometric heuristics on the 2D landmark positions:
//!
//! - The thumb counts as raised when its tip is farther away from the pinky MCP (the far side of
//!   the palm) than the joint below the tip is. This is unreliable when the hand is rotated or
//!   the thumb is occluded.
//! - Every other finger counts as raised when its tip is strictly *above* its PIP joint. Since Y
//!   grows downward, "above" means a smaller Y value. This assumes an upright hand facing the
//!   camera and breaks when the hand is rotated by ~90°.
//!
//! Both limitations are accepted; the rules are kept as-is on purpose.

use nalgebra::Vector2;

use crate::hand::LandmarkIdx;
use crate::landmark::{Landmark, Landmarks};

/// The five fingers of a hand, in landmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

/// A list of all [`Finger`]s, in [`RaisedFingers`] order.
pub const ALL_FINGERS: [Finger; 5] = [
    Finger::Thumb,
    Finger::Index,
    Finger::Middle,
    Finger::Ring,
    Finger::Pinky,
];

/// Per-finger extension state of one hand, in [thumb, index, middle, ring, pinky] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaisedFingers([bool; 5]);

impl RaisedFingers {
    /// Returns whether `finger` is classified as raised.
    #[inline]
    pub fn is_raised(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    /// Returns the number of raised fingers.
    pub fn count(&self) -> u32 {
        self.0.iter().filter(|&&raised| raised).count() as u32
    }

    /// Returns the raw raised/folded states, in [thumb, index, middle, ring, pinky] order.
    #[inline]
    pub fn states(&self) -> [bool; 5] {
        self.0
    }
}

/// Classifies each finger of a hand as raised or folded.
///
/// `landmarks` must be a hand's 21 landmarks as produced by a
/// [`HandDetector`][crate::hand::HandDetector]; anything else yields meaningless results.
pub fn classify(landmarks: &Landmarks) -> RaisedFingers {
    use LandmarkIdx::*;

    let anchor = landmarks.get(PinkyMcp as usize);

    // Thumb: extended when the tip sticks out past the joint below it, measured from the far side
    // of the palm.
    let dist_tip = distance(landmarks.get(ThumbTip as usize), anchor);
    let dist_ip = distance(landmarks.get(ThumbIp as usize), anchor);
    let thumb = dist_tip > dist_ip;

    let mut fingers = [thumb, false, false, false, false];
    for (out, tip) in fingers[1..].iter_mut().zip([
        IndexFingerTip,
        MiddleFingerTip,
        RingFingerTip,
        PinkyTip,
    ]) {
        // The landmark two below the tip is the finger's PIP joint.
        let pip = tip as usize - 2;
        *out = landmarks.get(tip as usize).y() < landmarks.get(pip).y();
    }

    RaisedFingers(fingers)
}

/// Computes the hand's overall scale: the distance from the wrist to the middle finger MCP, in
/// landmark coordinate units.
///
/// Only used to scale the rendered overlay, not for classification.
pub fn hand_scale(landmarks: &Landmarks) -> f32 {
    distance(
        landmarks.get(LandmarkIdx::Wrist as usize),
        landmarks.get(LandmarkIdx::MiddleFingerMcp as usize),
    )
}

fn distance(a: Landmark, b: Landmark) -> f32 {
    Vector2::new(a.x() - b.x(), a.y() - b.y()).norm()
}

/// Edge-triggered count state owned by the frame loop.
///
/// [`CountChange::update`] reports a value exactly when it differs from the previously reported
/// one. The initial state differs from every real count, so the first observed value is always
/// reported.
#[derive(Debug, Default)]
pub struct CountChange {
    last: Option<u32>,
}

impl CountChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the current frame's total count.
    ///
    /// Returns `Some(total)` if it differs from the last observed total (or if this is the first
    /// observation), `None` otherwise.
    pub fn update(&mut self, total: u32) -> Option<u32> {
        if self.last == Some(total) {
            return None;
        }

        self.last = Some(total);
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use crate::hand::NUM_LANDMARKS;

    use super::*;

    fn landmarks(positions: &[(usize, [f32; 2])]) -> Landmarks {
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        for &(index, [x, y]) in positions {
            landmarks.set(index, Landmark::new([x, y, 0.0]));
        }
        landmarks
    }

    /// An upright open right hand in front of the camera, fingers pointing up.
    fn open_hand() -> Landmarks {
        landmarks(&[
            (LandmarkIdx::Wrist as usize, [0.5, 0.9]),
            (LandmarkIdx::ThumbIp as usize, [0.38, 0.6]),
            (LandmarkIdx::ThumbTip as usize, [0.33, 0.55]),
            (LandmarkIdx::IndexFingerMcp as usize, [0.45, 0.55]),
            (LandmarkIdx::IndexFingerPip as usize, [0.45, 0.45]),
            (LandmarkIdx::IndexFingerTip as usize, [0.45, 0.3]),
            (LandmarkIdx::MiddleFingerMcp as usize, [0.5, 0.55]),
            (LandmarkIdx::MiddleFingerPip as usize, [0.5, 0.42]),
            (LandmarkIdx::MiddleFingerTip as usize, [0.5, 0.25]),
            (LandmarkIdx::RingFingerPip as usize, [0.55, 0.45]),
            (LandmarkIdx::RingFingerTip as usize, [0.55, 0.3]),
            (LandmarkIdx::PinkyMcp as usize, [0.6, 0.58]),
            (LandmarkIdx::PinkyPip as usize, [0.6, 0.5]),
            (LandmarkIdx::PinkyTip as usize, [0.6, 0.38]),
        ])
    }

    /// The same hand closed into a fist: all tips at or below their PIP joints, thumb tucked in
    /// towards the pinky MCP.
    fn fist() -> Landmarks {
        landmarks(&[
            (LandmarkIdx::Wrist as usize, [0.5, 0.9]),
            (LandmarkIdx::ThumbIp as usize, [0.4, 0.65]),
            (LandmarkIdx::ThumbTip as usize, [0.45, 0.62]),
            (LandmarkIdx::IndexFingerPip as usize, [0.45, 0.5]),
            (LandmarkIdx::IndexFingerTip as usize, [0.45, 0.62]),
            (LandmarkIdx::MiddleFingerPip as usize, [0.5, 0.5]),
            (LandmarkIdx::MiddleFingerTip as usize, [0.5, 0.63]),
            (LandmarkIdx::RingFingerPip as usize, [0.55, 0.5]),
            (LandmarkIdx::RingFingerTip as usize, [0.55, 0.62]),
            (LandmarkIdx::PinkyMcp as usize, [0.6, 0.58]),
            (LandmarkIdx::PinkyPip as usize, [0.6, 0.52]),
            (LandmarkIdx::PinkyTip as usize, [0.6, 0.6]),
        ])
    }

    #[test]
    fn open_hand_counts_five() {
        let fingers = classify(&open_hand());
        assert_eq!(fingers.states(), [true; 5]);
        assert_eq!(fingers.count(), 5);
    }

    #[test]
    fn fist_counts_zero() {
        let fingers = classify(&fist());
        assert_eq!(fingers.states(), [false; 5]);
        assert_eq!(fingers.count(), 0);
    }

    #[test]
    fn thumb_uses_pinky_mcp_distance() {
        // Thumb tip farther from the pinky MCP than the IP joint: raised.
        let hand = landmarks(&[
            (LandmarkIdx::ThumbIp as usize, [0.4, 0.5]),
            (LandmarkIdx::ThumbTip as usize, [0.3, 0.5]),
            (LandmarkIdx::PinkyMcp as usize, [0.6, 0.5]),
        ]);
        assert!(classify(&hand).is_raised(Finger::Thumb));

        // Swapping tip and joint folds it.
        let hand = landmarks(&[
            (LandmarkIdx::ThumbIp as usize, [0.3, 0.5]),
            (LandmarkIdx::ThumbTip as usize, [0.4, 0.5]),
            (LandmarkIdx::PinkyMcp as usize, [0.6, 0.5]),
        ]);
        assert!(!classify(&hand).is_raised(Finger::Thumb));
    }

    #[test]
    fn finger_comparison_is_strict() {
        // A tip at exactly the PIP's height does not count as raised.
        let hand = landmarks(&[
            (LandmarkIdx::IndexFingerPip as usize, [0.45, 0.5]),
            (LandmarkIdx::IndexFingerTip as usize, [0.45, 0.5]),
        ]);
        assert!(!classify(&hand).is_raised(Finger::Index));

        let hand = landmarks(&[
            (LandmarkIdx::IndexFingerPip as usize, [0.45, 0.5]),
            (LandmarkIdx::IndexFingerTip as usize, [0.45, 0.4999]),
        ]);
        assert!(classify(&hand).is_raised(Finger::Index));
    }

    #[test]
    fn count_matches_vector() {
        let hand = open_hand();
        let fingers = classify(&hand);
        let manual = ALL_FINGERS
            .iter()
            .filter(|&&finger| fingers.is_raised(finger))
            .count() as u32;
        assert_eq!(fingers.count(), manual);
    }

    #[test]
    fn hand_scale_is_wrist_to_middle_mcp() {
        let hand = landmarks(&[
            (LandmarkIdx::Wrist as usize, [0.5, 0.9]),
            (LandmarkIdx::MiddleFingerMcp as usize, [0.5, 0.5]),
        ]);
        approx::assert_relative_eq!(hand_scale(&hand), 0.4);
    }

    #[test]
    fn count_change_is_edge_triggered() {
        let mut change = CountChange::new();
        let reported: Vec<_> = [0, 0, 3, 3, 5, 0]
            .into_iter()
            .filter_map(|total| change.update(total))
            .collect();
        assert_eq!(reported, [0, 3, 5, 0]);
    }

    #[test]
    fn count_change_reports_first_observation() {
        // Even a total of 0 on the very first frame is a change from the unset state.
        let mut change = CountChange::new();
        assert_eq!(change.update(0), Some(0));
        assert_eq!(change.update(0), None);
    }
}
