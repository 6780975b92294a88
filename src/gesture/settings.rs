//! Tunable thresholds for the gesture classifier

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::GestureError;
use super::event::GestureKind;
use super::observation::Point2;

/// Rectangle in normalized image coordinates where gestures are recognized.
/// Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationZone {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for ActivationZone {
    /// Central part of the frame, keeps hands near the edges from triggering
    fn default() -> Self {
        Self {
            x_min: 0.2,
            x_max: 0.8,
            y_min: 0.15,
            y_max: 0.85,
        }
    }
}

impl ActivationZone {
    pub fn contains(&self, p: Point2) -> bool {
        self.x_min <= p.x && p.x <= self.x_max && self.y_min <= p.y && p.y <= self.y_max
    }

    fn validate(&self) -> Result<(), GestureError> {
        let bounds = [self.x_min, self.x_max, self.y_min, self.y_max];
        if bounds.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(GestureError::invalid(
                "activation_zone",
                format!("bounds must lie in [0, 1], got {:?}", bounds),
            ));
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(GestureError::invalid(
                "activation_zone",
                "x_min < x_max and y_min < y_max required",
            ));
        }
        Ok(())
    }
}

/// Minimum time between two emissions of the same gesture kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    /// Zoom and pan
    pub gesture_ms: u64,
    /// Pitch, tighter so tilt steps accumulate quickly
    pub pitch_ms: u64,
    pub bearing_ms: u64,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            gesture_ms: 80,
            pitch_ms: 50,
            bearing_ms: 50,
        }
    }
}

impl CooldownSettings {
    /// Interval that applies to `kind`
    pub fn interval_for(&self, kind: GestureKind) -> Duration {
        let ms = match kind {
            GestureKind::PitchUp | GestureKind::PitchDown => self.pitch_ms,
            GestureKind::BearingCw | GestureKind::BearingCcw => self.bearing_ms,
            _ => self.gesture_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Classifier configuration. Read-only once a classifier is built.
///
/// # Tuning
///
/// - `smoothing_window`: rates are measured across the whole window, so a
///   larger window reacts slower but rejects more jitter
/// - `*_rate_min`: minimum change across the window before a gesture fires
/// - `swipe_min_frames`: consecutive fast frames required to confirm a pan
///
/// # Examples
///
/// ```rust
/// use gesturecontrol::gesture::ClassifierSettings;
///
/// let relaxed = ClassifierSettings {
///     smoothing_window: 8,
///     swipe_min_frames: 4,
///     ..ClassifierSettings::default()
/// };
/// assert!(relaxed.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Capacity of each sliding buffer (>= 2)
    pub smoothing_window: usize,

    pub activation_zone: ActivationZone,

    /// Inter-hand distance change across the window that counts as zoom
    pub zoom_dist_rate_min: f32,

    /// Change of the averaged normalized tilt across the window for pitch
    pub pitch_tilt_rate_min: f32,

    /// Net rotation in radians across the window for bearing
    pub bearing_angle_rate_min: f32,

    /// Palm x displacement across the window that counts as a swipe frame
    pub swipe_velocity_threshold: f32,

    /// Consecutive swipe frames before a pan is confirmed (>= 1)
    pub swipe_min_frames: u32,

    pub cooldowns: CooldownSettings,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            activation_zone: ActivationZone::default(),
            zoom_dist_rate_min: 0.015,    // Filters jitter of the two palm centers
            pitch_tilt_rate_min: 0.03,
            bearing_angle_rate_min: 0.06, // Radians
            swipe_velocity_threshold: 0.04,
            swipe_min_frames: 3,
            cooldowns: CooldownSettings::default(),
        }
    }
}

impl ClassifierSettings {
    /// Checks every option against its allowed range
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.smoothing_window < 2 {
            return Err(GestureError::invalid(
                "smoothing_window",
                format!("must be at least 2, got {}", self.smoothing_window),
            ));
        }

        self.activation_zone.validate()?;

        let positive = [
            ("zoom_dist_rate_min", self.zoom_dist_rate_min),
            ("pitch_tilt_rate_min", self.pitch_tilt_rate_min),
            ("bearing_angle_rate_min", self.bearing_angle_rate_min),
            ("swipe_velocity_threshold", self.swipe_velocity_threshold),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GestureError::invalid(
                    field,
                    format!("must be a positive number, got {}", value),
                ));
            }
        }

        if self.swipe_min_frames < 1 {
            return Err(GestureError::invalid("swipe_min_frames", "must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ClassifierSettings::default().validate().is_ok());
    }

    #[test]
    fn test_zone_bounds_are_inclusive() {
        let zone = ActivationZone::default();
        assert!(zone.contains(Point2::new(0.2, 0.15)));
        assert!(zone.contains(Point2::new(0.8, 0.85)));
        assert!(!zone.contains(Point2::new(0.19, 0.5)));
        assert!(!zone.contains(Point2::new(0.5, 0.86)));
    }

    #[test]
    fn test_cooldown_categories() {
        let c = CooldownSettings::default();
        assert_eq!(c.interval_for(GestureKind::ZoomIn), Duration::from_millis(80));
        assert_eq!(c.interval_for(GestureKind::PanRight), Duration::from_millis(80));
        assert_eq!(c.interval_for(GestureKind::PitchDown), Duration::from_millis(50));
        assert_eq!(c.interval_for(GestureKind::BearingCw), Duration::from_millis(50));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let s = ClassifierSettings {
            smoothing_window: 1,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(GestureError::InvalidSetting { field: "smoothing_window", .. })
        ));

        let s = ClassifierSettings {
            activation_zone: ActivationZone {
                x_min: 0.8,
                x_max: 0.2,
                y_min: 0.1,
                y_max: 0.9,
            },
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = ClassifierSettings {
            bearing_angle_rate_min: 0.0,
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = ClassifierSettings {
            swipe_min_frames: 0,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let s: ClassifierSettings = toml::from_str(
            r#"
            smoothing_window = 7

            [cooldowns]
            pitch_ms = 30
            "#,
        )
        .expect("parse");
        assert_eq!(s.smoothing_window, 7);
        assert_eq!(s.swipe_min_frames, 3);
        assert_eq!(s.cooldowns.pitch_ms, 30);
        assert_eq!(s.cooldowns.gesture_ms, 80);
    }
}
