//! Hand detection and landmark estimation.
//!
//! Hands are located in two stages, the way MediaPipe's hand tracking works: a palm detection
//! network proposes regions that contain a palm, and a landmark estimation network computes the
//! 21 hand landmarks inside each region. Both stages run on every frame; no state is carried
//! across frames.

pub mod detection;
pub mod landmark;

use std::cmp::Reverse;
use std::path::PathBuf;

use crate::image::Image;
use crate::landmark::{Confidence, Estimator, Landmarks};
use crate::num::TotalF32;
use crate::timer::Timer;

use self::detection::PalmNetwork;
use self::landmark::{LandmarkNetwork, LandmarkResult};

pub use self::landmark::{LandmarkIdx, CONNECTIVITY, NUM_LANDMARKS};

/// Default filesystem location of the palm detection model.
pub const PALM_MODEL_PATH: &str = "models/palm_detection_lite.onnx";

/// Default filesystem location of the hand landmark model.
pub const LANDMARK_MODEL_PATH: &str = "models/hand_landmark_lite.onnx";

/// Relative padding applied to a palm detection before landmark estimation.
///
/// The palm box only covers the palm itself, so it has to be enlarged considerably to contain the
/// fingers of an open hand.
const ROI_PADDING: f32 = 1.0;

/// A detected hand: 21 landmarks normalized to the frame they were detected in.
#[derive(Clone)]
pub struct Hand {
    landmarks: Landmarks,
    confidence: f32,
}

impl Hand {
    /// Creates a [`Hand`] from a preexisting set of normalized landmarks.
    ///
    /// Mostly useful for exercising downstream consumers with synthetic landmark data.
    pub fn new(landmarks: Landmarks) -> Self {
        assert_eq!(landmarks.len(), NUM_LANDMARKS);
        Self {
            landmarks,
            confidence: 1.0,
        }
    }

    /// Returns the hand's landmarks, with X and Y coordinates normalized to `[0, 1]` relative to
    /// the frame width and height.
    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// Returns the presence confidence reported by the landmark network.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// The detector boundary: anything that can turn a camera frame into a list of hands.
///
/// The finger counter only interacts with hand detection through this trait, so the surrounding
/// application logic can be driven with synthetic landmark fixtures instead of a camera and model
/// files.
pub trait HandDetector {
    /// Detects hands in `image`.
    ///
    /// Returns zero or more [`Hand`]s, freshly computed from `image` alone.
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<Hand>>;
}

/// Configuration for [`HandLandmarker`].
pub struct LandmarkerOptions {
    num_hands: usize,
    min_detection_confidence: f32,
    min_presence_confidence: f32,
    palm_model: PathBuf,
    landmark_model: PathBuf,
}

impl Default for LandmarkerOptions {
    fn default() -> Self {
        Self {
            num_hands: 2,
            min_detection_confidence: 0.5,
            min_presence_confidence: 0.5,
            palm_model: PALM_MODEL_PATH.into(),
            landmark_model: LANDMARK_MODEL_PATH.into(),
        }
    }
}

impl LandmarkerOptions {
    /// Sets the maximum number of hands reported per frame.
    pub fn num_hands(mut self, num_hands: usize) -> Self {
        self.num_hands = num_hands;
        self
    }

    /// Sets the confidence threshold below which palm detections are discarded.
    pub fn min_detection_confidence(mut self, confidence: f32) -> Self {
        self.min_detection_confidence = confidence;
        self
    }

    /// Sets the presence threshold below which landmark estimations are discarded.
    pub fn min_presence_confidence(mut self, confidence: f32) -> Self {
        self.min_presence_confidence = confidence;
        self
    }

    /// Uses a different palm detection model file.
    pub fn palm_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.palm_model = path.into();
        self
    }

    /// Uses a different hand landmark model file.
    pub fn landmark_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.landmark_model = path.into();
        self
    }
}

/// The production [`HandDetector`]: palm detection followed by per-palm landmark estimation.
pub struct HandLandmarker {
    detector: crate::detection::Detector,
    estimator: Estimator<LandmarkResult>,
    num_hands: usize,
    min_presence_confidence: f32,
    t_total: Timer,
}

impl HandLandmarker {
    /// Loads both models and prepares the pipeline.
    ///
    /// Returns an error if either model file is missing or malformed. There is no fallback; the
    /// caller is expected to treat this as fatal.
    pub fn load(options: LandmarkerOptions) -> anyhow::Result<Self> {
        let palm = PalmNetwork::load(&options.palm_model)?;
        let landmark = LandmarkNetwork::load(&options.landmark_model)?;

        let mut detector = crate::detection::Detector::new(palm);
        detector.set_threshold(options.min_detection_confidence);

        Ok(Self {
            detector,
            estimator: Estimator::new(landmark),
            num_hands: options.num_hands,
            min_presence_confidence: options.min_presence_confidence,
            t_total: Timer::new("hands"),
        })
    }

    /// Returns profiling timers of the detection and estimation stages.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_total]
            .into_iter()
            .chain(self.detector.timers())
            .chain(self.estimator.timers())
    }
}

impl HandDetector for HandLandmarker {
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<Hand>> {
        let guard = self.t_total.start();

        let mut palms = self.detector.detect(image)?.to_vec();
        palms.sort_unstable_by_key(|det| Reverse(TotalF32(det.confidence())));
        palms.truncate(self.num_hands);

        let (frame_w, frame_h) = (image.width() as f32, image.height() as f32);
        let mut hands = Vec::with_capacity(palms.len());
        for palm in &palms {
            let roi = palm.bounding_rect().grow_rel(ROI_PADDING);
            let result = self.estimator.estimate(image, roi)?;
            if result.confidence() < self.min_presence_confidence {
                log::trace!(
                    "discarding landmark estimate (presence {} below threshold {})",
                    result.confidence(),
                    self.min_presence_confidence,
                );
                continue;
            }

            let mut landmarks = result.landmarks().clone();
            landmarks.map_positions(|[x, y, z]| [x / frame_w, y / frame_h, z / frame_w]);
            hands.push(Hand {
                landmarks,
                confidence: result.confidence(),
            });
        }

        drop(guard);
        Ok(hands)
    }
}
