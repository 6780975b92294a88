//! Classifier output: gesture kinds, events and the advisory state.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Map control a gesture drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Hands moving together
    ZoomIn,
    /// Hands moving apart
    ZoomOut,
    PanLeft,
    PanRight,
    /// Both hands tilting up together
    PitchUp,
    PitchDown,
    /// In-place hand rotation, clockwise on screen
    BearingCw,
    BearingCcw,
}

/// How the transport labels a gesture's magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnitudeField {
    Intensity,
    Velocity,
}

impl GestureKind {
    pub const COUNT: usize = 8;

    pub const ALL: [GestureKind; Self::COUNT] = [
        GestureKind::ZoomIn,
        GestureKind::ZoomOut,
        GestureKind::PanLeft,
        GestureKind::PanRight,
        GestureKind::PitchUp,
        GestureKind::PitchDown,
        GestureKind::BearingCw,
        GestureKind::BearingCcw,
    ];

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::PanLeft => "pan_left",
            Self::PanRight => "pan_right",
            Self::PitchUp => "pitch_up",
            Self::PitchDown => "pitch_down",
            Self::BearingCw => "bearing_cw",
            Self::BearingCcw => "bearing_ccw",
        }
    }

    /// Dense index for per-kind tables
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Pan magnitudes are palm velocities, everything else is an intensity
    pub fn magnitude_field(&self) -> MagnitudeField {
        match self {
            Self::PanLeft | Self::PanRight => MagnitudeField::Velocity,
            _ => MagnitudeField::Intensity,
        }
    }

    /// State the classifier reports after recognizing this kind
    pub fn state(&self) -> ClassifierState {
        match self {
            Self::ZoomIn | Self::ZoomOut => ClassifierState::Zoom,
            Self::PanLeft => ClassifierState::SwipeLeft,
            Self::PanRight => ClassifierState::SwipeRight,
            Self::PitchUp => ClassifierState::PitchUp,
            Self::PitchDown => ClassifierState::PitchDown,
            Self::BearingCw => ClassifierState::BearingCw,
            Self::BearingCcw => ClassifierState::BearingCcw,
        }
    }
}

impl Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized gesture. `magnitude` is in `[0, 1]` for intensity kinds;
/// pan velocities are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub magnitude: f32,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, magnitude: f32) -> Self {
        Self { kind, magnitude }
    }
}

/// Last classification the signal indicated. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierState {
    #[default]
    Idle,
    Zoom,
    SwipeLeft,
    SwipeRight,
    PitchUp,
    PitchDown,
    BearingCw,
    BearingCcw,
}

impl ClassifierState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Zoom => "zoom",
            Self::SwipeLeft => "swipe_left",
            Self::SwipeRight => "swipe_right",
            Self::PitchUp => "pitch_up",
            Self::PitchDown => "pitch_down",
            Self::BearingCw => "bearing_cw",
            Self::BearingCcw => "bearing_ccw",
        }
    }
}

impl Display for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
