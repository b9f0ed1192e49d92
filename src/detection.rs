//! Common functionality for object detection.
//!
//! The functionality defined in this module (and submodules) is meant to be reusable across
//! different single-class detectors.

pub mod nms;
pub mod ssd;

use crate::image::Image;
use crate::nn::{Cnn, Outputs};
use crate::rect::Rect;
use crate::resolution::Resolution;
use crate::timer::Timer;

use self::nms::NonMaxSuppression;

/// Trait implemented by neural networks that detect objects in an input image.
pub trait Network: Send + Sync + 'static {
    /// Returns the [`Cnn`] to use for detection.
    fn cnn(&self) -> &Cnn;

    /// Extracts all detections with confidence above `threshold` from the network's output.
    ///
    /// Keypoint and detection positions are expected to be in the coordinate system of the
    /// network's input.
    fn extract(&self, outputs: &Outputs, threshold: f32, detections: &mut Vec<Detection>);
}

/// A generic object detector.
///
/// This type wraps a [`Network`] for object detection and takes care of aspect-ratio adjustment,
/// non-maximum suppression, and mapping the detections back into the input image's coordinate
/// system.
pub struct Detector {
    network: Box<dyn Network>,
    detections: Vec<Detection>,
    t_infer: Timer,
    t_extract: Timer,
    t_nms: Timer,
    thresh: f32,
    nms: NonMaxSuppression,
}

impl Detector {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    pub fn new<N: Network>(network: N) -> Self {
        Self {
            network: Box::new(network),
            detections: Vec::new(),
            t_infer: Timer::new("infer"),
            t_extract: Timer::new("extract"),
            t_nms: Timer::new("nms"),
            thresh: Self::DEFAULT_THRESHOLD,
            nms: NonMaxSuppression::new(),
        }
    }

    /// Returns the expected input resolution of the internal neural network.
    pub fn input_resolution(&self) -> Resolution {
        self.network.cnn().input_resolution()
    }

    /// Sets the confidence threshold below which detections are discarded.
    #[inline]
    pub fn set_threshold(&mut self, thresh: f32) {
        self.thresh = thresh;
    }

    pub fn nms_mut(&mut self) -> &mut NonMaxSuppression {
        &mut self.nms
    }

    /// Runs detection on `image`, returning the detected objects.
    ///
    /// Detection coordinates are in `image`'s coordinate system.
    pub fn detect(&mut self, image: &Image) -> anyhow::Result<&[Detection]> {
        self.detections.clear();

        let cnn = self.network.cnn();
        let input_res = cnn.input_resolution();

        // If the input image's aspect ratio doesn't match the CNN's input, create an oversized
        // view that does.
        let rect = image
            .rect()
            .grow_to_fit_aspect(input_res.aspect_ratio().unwrap());
        let view = image.view(rect);
        let outputs = self.t_infer.time(|| cnn.estimate(&view))?;
        log::trace!("inference result: {:?}", outputs);

        self.t_extract.time(|| {
            self.network
                .extract(&outputs, self.thresh, &mut self.detections)
        });

        self.t_nms.time(|| {
            let filtered = self.nms.process(&mut self.detections).collect::<Vec<_>>();
            self.detections = filtered;
        });

        // Map all coordinates back into the input image.
        let scale = rect.width() / input_res.width() as f32;
        for det in &mut self.detections {
            // Map all coordinates from the network's input coordinate system to `rect`'s system,
            // then remove the offset added by the oversized rectangle.
            let (xc, yc) = det.rect.center();
            let [w, h] = [det.rect.width(), det.rect.height()];
            det.rect = Rect::from_center(xc * scale, yc * scale, w * scale, h * scale)
                .move_by(rect.x(), rect.y());
            for kp in &mut det.keypoints {
                kp.x = kp.x * scale + rect.x();
                kp.y = kp.y * scale + rect.y();
            }
        }

        Ok(&self.detections)
    }

    /// Returns profiling timers for this detector.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_infer, &self.t_extract, &self.t_nms].into_iter()
    }
}

/// A detected object.
///
/// A [`Detection`] consists of a [`Rect`] enclosing the detected object, a confidence value, and a
/// possibly empty set of located keypoints.
///
/// Per convention, the confidence value lies between 0.0 and 1.0, which can be achieved by passing
/// the raw network output through [`crate::num::sigmoid`] (but the network documentation should be
/// consulted). The confidence value is used when performing non-maximum suppression with
/// [`nms::SuppressionMode::Average`], so it has to have the expected range when making use of
/// that.
#[derive(Debug, Clone)]
pub struct Detection {
    confidence: f32,
    rect: Rect,
    keypoints: Vec<Keypoint>,
}

impl Detection {
    pub fn new(confidence: f32, rect: Rect) -> Self {
        Self {
            confidence,
            rect,
            keypoints: Vec::new(),
        }
    }

    pub fn with_keypoints(confidence: f32, rect: Rect, keypoints: Vec<Keypoint>) -> Self {
        Self {
            confidence,
            rect,
            keypoints,
        }
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = confidence;
    }

    /// Returns the axis-aligned bounding rectangle containing the detected object.
    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn set_bounding_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn keypoints_mut(&mut self) -> &mut Vec<Keypoint> {
        &mut self.keypoints
    }
}

/// A 2D keypoint produced as part of a [`Detection`].
///
/// Keypoints are often, but not always, inside the detection bounding box and indicate the
/// approximate location of some object landmark.
///
/// The meaning of a keypoint depends on the specific detector and on its index in the keypoint
/// list. Not all detectors output keypoints.
#[derive(Debug, Clone, Copy)]
pub struct Keypoint {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}
