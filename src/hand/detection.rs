//! Palm detection.

use std::path::Path;

use once_cell::sync::Lazy;

use crate::detection::{
    ssd::{Anchor, AnchorParams, Anchors, LayerInfo},
    Detection, Keypoint, Network,
};
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork, Outputs};
use crate::num::sigmoid;
use crate::rect::Rect;
use crate::resolution::Resolution;

/// A keypoint of a palm [`Detection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalmKeypoint {
    Wrist = 0,
    IndexFingerMcp = 1,
    MiddleFingerMcp = 2,
    RingFingerMcp = 3,
    PinkyMcp = 4,
    ThumbCmc = 5,
    ThumbMcp = 6,
}

/// The palm detection network.
///
/// **Note**: This network is *extremely* heavy compared to other "light" detection networks. CPU
/// inference seems to take around 10 times as long as for a short-range face detection network,
/// for example.
pub struct PalmNetwork {
    cnn: Cnn,
}

impl PalmNetwork {
    /// Loads the palm detection model from an ONNX file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let nn = NeuralNetwork::from_path(path)?.load()?;
        let cnn = Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(0.0..=1.0))?;
        Ok(Self { cnn })
    }
}

impl Network for PalmNetwork {
    fn cnn(&self) -> &Cnn {
        &self.cnn
    }

    fn extract(&self, outputs: &Outputs, threshold: f32, detections: &mut Vec<Detection>) {
        extract_outputs(
            self.cnn.input_resolution(),
            outputs,
            threshold,
            detections,
        );
    }
}

fn extract_outputs(
    input_res: Resolution,
    outputs: &Outputs,
    thresh: f32,
    detections: &mut Vec<Detection>,
) {
    static ANCHORS: Lazy<Anchors> = Lazy::new(|| {
        Anchors::calculate(&AnchorParams {
            layers: &[LayerInfo::new(2, 24, 24), LayerInfo::new(6, 12, 12)],
        })
    });

    let num_anchors = ANCHORS.anchor_count();
    let boxes = &outputs[0];
    let confidences = &outputs[1];

    assert_eq!(boxes.shape(), &[1, num_anchors, 18]);
    assert_eq!(confidences.shape(), &[1, num_anchors, 1]);

    for (index, view) in confidences.index([0]).iter().enumerate() {
        let conf = sigmoid(view.as_slice()[0]);

        if conf < thresh {
            continue;
        }

        let tensor_view = boxes.index([0, index]);
        let box_params = tensor_view.as_slice();
        detections.push(extract_detection(
            &ANCHORS[index],
            input_res,
            box_params,
            conf,
        ));
    }
}

fn extract_detection(
    anchor: &Anchor,
    input_res: Resolution,
    box_params: &[f32],
    confidence: f32,
) -> Detection {
    assert_eq!(box_params.len(), 18);

    let input_w = input_res.width() as f32;
    let input_h = input_res.height() as f32;

    let xc = box_params[0] + anchor.x_center() * input_w;
    let yc = box_params[1] + anchor.y_center() * input_h;
    let w = box_params[2];
    let h = box_params[3];
    let kp = |x, y| {
        Keypoint::new(
            x + anchor.x_center() * input_w,
            y + anchor.y_center() * input_h,
        )
    };

    Detection::with_keypoints(
        confidence,
        Rect::from_center(xc, yc, w, h),
        vec![
            kp(box_params[4], box_params[5]),
            kp(box_params[6], box_params[7]),
            kp(box_params[8], box_params[9]),
            kp(box_params[10], box_params[11]),
            kp(box_params[12], box_params[13]),
            kp(box_params[14], box_params[15]),
            kp(box_params[16], box_params[17]),
        ],
    )
}
