//! Common code for visual landmark estimation.

use crate::image::Image;
use crate::nn::{Cnn, Outputs};
use crate::rect::Rect;
use crate::resolution::Resolution;
use crate::timer::Timer;

type Position = [f32; 3];

/// A set of landmark positions.
///
/// Landmarks carry X and Y coordinates plus a depth channel. Which coordinate system the values
/// are in depends on where the set came from: an [`Estimator`] produces positions in the
/// coordinate system of the estimated image, while landmarks crossing the
/// [`crate::hand::HandDetector`] boundary are normalized to `[0, 1]`.
#[derive(Clone)]
pub struct Landmarks {
    positions: Box<[Position]>,
}

impl Landmarks {
    /// Creates a new [`Landmarks`] collection containing `len` preallocated landmarks.
    ///
    /// All landmarks will start with all coordinates at `0.0`.
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![[0.0, 0.0, 0.0]; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Landmark> + Clone + '_ {
        (0..self.positions.len()).map(|i| self.get(i))
    }

    pub fn get(&self, index: usize) -> Landmark {
        Landmark {
            pos: self.positions[index],
        }
    }

    pub fn set(&mut self, index: usize, landmark: Landmark) {
        self.positions[index] = landmark.pos;
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Position] {
        &mut self.positions
    }

    pub fn map_positions(&mut self, mut f: impl FnMut(Position) -> Position) {
        for pos in self.positions_mut() {
            *pos = f(*pos);
        }
    }
}

/// A single landmark.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Landmark {
    pos: Position,
}

impl Landmark {
    pub fn new(position: Position) -> Self {
        Self { pos: position }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }
}

/// Trait for landmark estimation results returned by [`Estimator::estimate`].
pub trait Estimate: Send + Sync + 'static {
    /// Returns the predicted [`Landmarks`].
    fn landmarks_mut(&mut self) -> &mut Landmarks;
}

/// Trait for network inference results that contain a confidence value.
///
/// The confidence value can be used to detect when the object becomes obscured or leaves the
/// camera's field of view.
pub trait Confidence {
    /// Confidence value indicating whether the estimated object is in view.
    ///
    /// By convention, this is in range 0.0 to 1.0, with anything above 0.5 indicating that the
    /// object is probably in view.
    fn confidence(&self) -> f32;
}

/// Trait implemented by wrapper types around neural networks that estimate landmarks.
pub trait Network: Send + Sync + 'static {
    /// Type representing the predicted landmarks.
    type Output: Estimate;

    /// Returns the [`Cnn`] to use for landmark estimation.
    fn cnn(&self) -> &Cnn;

    /// Extracts the network outputs and writes them to `estimate`.
    ///
    /// The landmark positions are expected to be in the coordinate system of the network's input.
    fn extract(&self, outputs: &Outputs, estimate: &mut Self::Output);
}

/// Neural-network based landmark estimator.
///
/// This estimator processes a region of an input image and yields an [`Estimate`] of type `E`,
/// containing the derived [`Landmarks`] and other data (depending on the network).
pub struct Estimator<E: Estimate> {
    network: Box<dyn Network<Output = E>>,
    estimate: E,
    t_infer: Timer,
    t_extract: Timer,
}

impl<E: Estimate + Default> Estimator<E> {
    pub fn new<N: Network<Output = E>>(network: N) -> Self {
        Self {
            network: Box::new(network),
            estimate: E::default(),
            t_infer: Timer::new("infer"),
            t_extract: Timer::new("extract"),
        }
    }
}

impl<E: Estimate> Estimator<E> {
    /// Returns the expected input resolution of the internal neural network.
    pub fn input_resolution(&self) -> Resolution {
        self.network.cnn().input_resolution()
    }

    /// Returns profiling timers for this landmark estimator.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_infer, &self.t_extract].into_iter()
    }

    /// Performs landmark estimation on a region of `image`, returning the [`Estimate`].
    ///
    /// If the aspect ratio of `roi` does not match the aspect ratio of the network's input, the
    /// region is enlarged to match first. Parts of the region that fall outside of `image` are
    /// read as black. The returned landmark positions are in `image`'s coordinate system.
    pub fn estimate(&mut self, image: &Image, roi: Rect) -> anyhow::Result<&mut E> {
        let cnn = self.network.cnn();
        let input_res = cnn.input_resolution();

        let rect = roi.grow_to_fit_aspect(input_res.aspect_ratio().unwrap());
        let view = image.view(rect);
        let outputs = self.t_infer.time(|| cnn.estimate(&view))?;
        log::trace!("inference result: {:?}", outputs);

        self.t_extract
            .time(|| self.network.extract(&outputs, &mut self.estimate));

        // Map landmark coordinates back into the input image.
        let scale = rect.width() / input_res.width() as f32;
        for pos in self.estimate.landmarks_mut().positions_mut() {
            // Map all coordinates from the network's input coordinate system to `rect`'s system,
            // then remove the offset added by the enlarged rectangle.
            *pos = pos.map(|t| t * scale);
            pos[0] += rect.x();
            pos[1] += rect.y();
        }

        Ok(&mut self.estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_roundtrip() {
        let mut landmarks = Landmarks::new(3);
        landmarks.set(1, Landmark::new([1.0, 2.0, 3.0]));
        assert_eq!(landmarks.get(0).position(), [0.0, 0.0, 0.0]);
        assert_eq!(landmarks.get(1).x(), 1.0);
        assert_eq!(landmarks.get(1).y(), 2.0);
        assert_eq!(landmarks.get(1).z(), 3.0);

        landmarks.map_positions(|[x, y, z]| [x * 2.0, y, z]);
        assert_eq!(landmarks.get(1).x(), 2.0);
    }
}
