//! Messages pushed to transport clients
//!
//! Serialized as JSON objects tagged by `"type"`:
//!
//! ```text
//! {"type":"gesture","gesture":"zoom_in","intensity":0.2,"velocity":0.0,"timestamp":...}
//! {"type":"heartbeat","hand_detected":true,"fps":29.8,"active_gesture":"idle","timestamp":...}
//! {"type":"status","timestamp":...,"hand_timeout":true}
//! ```

use serde::{Deserialize, Serialize};

use super::BridgeError;
use crate::gesture::{GestureEvent, GestureKind, MagnitudeField};

/// Camera state reported in status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    Gesture {
        gesture: GestureKind,
        intensity: f32,
        velocity: f32,
        timestamp: i64,
    },
    Heartbeat {
        hand_detected: bool,
        fps: f32,
        active_gesture: String,
        timestamp: i64,
    },
    Status {
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        camera: Option<CameraStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hand_timeout: Option<bool>,
    },
}

fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Local::now().timestamp_millis()
}

impl BridgeMessage {
    /// Gesture message; the magnitude goes to `intensity` or `velocity`
    /// depending on the kind, the other field is 0
    pub fn gesture(event: &GestureEvent, timestamp: i64) -> Self {
        let magnitude = round_to(event.magnitude, 3);
        let (intensity, velocity) = match event.kind.magnitude_field() {
            MagnitudeField::Intensity => (magnitude, 0.0),
            MagnitudeField::Velocity => (0.0, magnitude),
        };
        Self::Gesture {
            gesture: event.kind,
            intensity,
            velocity,
            timestamp,
        }
    }

    pub fn heartbeat(
        hand_detected: bool,
        fps: f32,
        active_gesture: &str,
        timestamp: i64,
    ) -> Self {
        Self::Heartbeat {
            hand_detected,
            fps: round_to(fps, 1),
            active_gesture: active_gesture.to_string(),
            timestamp,
        }
    }

    pub fn hand_timeout(timestamp: i64) -> Self {
        Self::Status {
            timestamp,
            camera: None,
            hand_timeout: Some(true),
        }
    }

    pub fn camera_disconnected(timestamp: i64) -> Self {
        Self::Status {
            timestamp,
            camera: Some(CameraStatus::Disconnected),
            hand_timeout: None,
        }
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|e| BridgeError::EncodeError(e.to_string()))
    }
}
