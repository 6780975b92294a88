//! Gesture recognition core
//!
//! Consumes one hand observation per video frame and emits rate-limited map
//! control events (zoom, pan, pitch, bearing).
//!
//! 1. [`observation`] - Detector boundary types (landmarks, palm center)
//! 2. [`classifier`] - Stateful classifier, the only part with memory
//! 3. [`event`] - Gesture kinds and emitted events
//!
//! # Architecture
//!
//! ```text
//! FrameObservation ──► GestureClassifier ──► Option<GestureEvent>
//!                       │  sliding windows
//!                       │  activation zone
//!                       └─ per-kind cooldown
//! ```
//!
//! The classifier is synchronous and owns all of its state; one instance per
//! session, called from one task.

pub mod angles;
pub mod classifier;
pub mod cooldown;
pub mod error;
pub mod event;
pub mod observation;
pub mod settings;
pub mod window;

pub use classifier::GestureClassifier;
pub use error::GestureError;
pub use event::{ClassifierState, GestureEvent, GestureKind, MagnitudeField};
pub use observation::{
    FrameObservation, HandLandmarks, HandObservation, Handedness, Point2, Point3,
};
pub use settings::{ActivationZone, ClassifierSettings, CooldownSettings};
