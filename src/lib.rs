//! Finger counting from live webcam footage.
//!
//! The crate is split into a small machine-perception library (image handling,
//! neural network inference, palm detection, hand landmark estimation, GUI
//! output) and the finger counter application built on top of it (`main.rs`).
//!
//! # Coordinates
//!
//! Image and landmark coordinates have X pointing right and Y pointing *down*,
//! matching the usual image convention. Hand landmarks crossing the
//! [`hand::HandDetector`] boundary are normalized to `[0, 1]` relative to the
//! frame they were detected in.

use log::LevelFilter;

pub mod counting;
pub mod detection;
pub mod filter;
pub mod gui;
pub mod hand;
pub mod image;
pub mod iter;
pub mod landmark;
pub mod nn;
pub mod num;
pub mod overlay;
pub mod rect;
pub mod resolution;
pub mod termination;
pub mod timer;
pub mod webcam;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("wgpu"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library log at *debug* level, `wgpu` at *warn*
/// level. If a global logger is already registered, this macro does nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
