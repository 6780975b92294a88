//! Bridge subsystem between the detector side and transport clients
//!
//! Implements the per-frame pipeline around the classifier:
//!
//! 1. [`processor`] - Frame handling state machine (classifier, link state)
//! 2. [`bridge_handle`] - Unified API and lifecycle management
//! 3. [`message`] - Client message format
//! 4. [`link_state`] - Heartbeat, FPS and hand-timeout bookkeeping
//!
//! # Architecture
//!
//! ```text
//! Detector ──► FrameInput ──► Processor ──► BridgeMessage ──► Transports
//!                              (gesture, heartbeat, status)
//! ```

pub mod bridge_handle;
pub mod link_state;
pub mod message;
pub mod processor;

pub use bridge_handle::{BridgeHandle, BridgeSettings};
pub use message::{BridgeMessage, CameraStatus};
pub use processor::{FrameInput, ManualCommand};

use crate::gesture::GestureError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Gesture error: {0}")]
    Gesture(#[from] GestureError),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Encode error: {0}")]
    EncodeError(String),

    #[error("Task error: {0}")]
    TaskError(String),
}
