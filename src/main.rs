//! The finger counter application.
//!
//! Capture a frame, find hands in it, classify each finger as raised or folded, and present the
//! mirrored frame with the hand skeleton and the total count drawn on top. One log line is emitted
//! whenever the total changes.

use yubi::counting::{self, CountChange};
use yubi::gui::{self, WindowOptions};
use yubi::hand::{HandDetector, HandLandmarker, LandmarkerOptions};
use yubi::overlay;
use yubi::resolution::Resolution;
use yubi::timer::FpsCounter;
use yubi::webcam::{Webcam, WebcamOptions};

const WINDOW_TITLE: &str = "Finger Counter";
const WINDOW_SIZE: (u32, u32) = (2880, 1620);
const WINDOW_POSITION: (i32, i32) = (50, 20);

fn main() {
    yubi::init_logger!();

    gui::run(
        WindowOptions::default()
            .inner_size(WINDOW_SIZE.0, WINDOW_SIZE.1)
            .position(WINDOW_POSITION.0, WINDOW_POSITION.1),
        finger_counter,
    );
}

fn finger_counter() -> anyhow::Result<()> {
    // Model loading failures are fatal; there is nothing sensible to do without the networks.
    let mut hands = HandLandmarker::load(LandmarkerOptions::default())?;
    let mut webcam = Webcam::open(WebcamOptions::default().resolution(Resolution::RES_720P))?;

    log::info!("finger counter started, press 'q' or close the window to quit");
    log::info!(
        "target window size: {}x{} at ({}, {})",
        WINDOW_SIZE.0,
        WINDOW_SIZE.1,
        WINDOW_POSITION.0,
        WINDOW_POSITION.1,
    );

    let mut count_change = CountChange::new();
    let mut fps = FpsCounter::new("finger counter");
    loop {
        let image = match webcam.read() {
            Ok(image) => image,
            Err(e) => {
                // Cameras produce the occasional corrupted frame; skip it and try the next one.
                log::debug!("failed to read frame: {e}");
                continue;
            }
        };

        let detected = hands.detect(&image)?;

        // Flip for selfie view.
        let mut display = image.flip_horizontal();

        let mut total = 0;
        for hand in &detected {
            let fingers = counting::classify(hand.landmarks());
            total += fingers.count();

            let radius =
                overlay::dot_radius(counting::hand_scale(hand.landmarks()), display.width());
            overlay::draw_hand(&mut display, hand.landmarks(), radius);
        }
        overlay::draw_count_badge(&mut display, total);

        gui::show_image(WINDOW_TITLE, &display);

        if let Some(count) = count_change.update(total) {
            log::info!("fingers detected: {count}");
        }

        if gui::quit_requested() {
            break;
        }
        match gui::window_visible(WINDOW_TITLE) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                log::warn!("stopping, display state unavailable: {e}");
                break;
            }
        }

        fps.tick_with(webcam.timers().chain(hands.timers()));
    }

    Ok(())
}
