//! Stateful gesture classifier
//!
//! Turns one [`FrameObservation`] per video frame into at most one
//! [`GestureEvent`]. All temporal logic lives here: sliding windows,
//! activation-zone gating, priority between gesture families and the
//! per-kind cooldown.
//!
//! # Routing
//!
//! ```text
//! 0 hands ──► reset, Idle
//! 2 hands ──► distance changing ──► zoom_in / zoom_out
//!             distance stable   ──► shared tilt ──► pitch_up / pitch_down
//! 1 hand  ──► lateral velocity  ──► pan_left / pan_right
//!             rotation in place ──► bearing_cw / bearing_ccw
//! ```
//!
//! The classifier mutates its buffers in place and is not meant to be shared
//! between threads without external serialization.

use std::f32::consts::FRAC_PI_3;
use std::time::Instant;
use tracing::{debug, warn};

use super::angles::{hand_angle, net_rotation, normalized_tilt};
use super::cooldown::CooldownTable;
use super::error::GestureError;
use super::event::{ClassifierState, GestureEvent, GestureKind};
use super::observation::{FrameObservation, HandObservation};
use super::settings::ClassifierSettings;
use super::window::SlidingWindow;

/// Window change that maps to full zoom/pitch intensity
const FULL_SCALE_RATE: f32 = 0.3;

/// Smallest buffer that yields a rate
const MIN_WINDOW: usize = 2;

/// Net rotation that maps to full bearing intensity
const FULL_SCALE_ROTATION: f32 = FRAC_PI_3;

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    settings: ClassifierSettings,
    state: ClassifierState,

    // two-hand family
    distance_window: SlidingWindow<f32>,
    tilt_window: SlidingWindow<f32>,

    // single-hand family
    palm_x_window: SlidingWindow<f32>,
    angle_window: SlidingWindow<f32>,
    swipe_frames_left: u32,
    swipe_frames_right: u32,

    cooldowns: CooldownTable,
}

impl GestureClassifier {
    /// Builds a classifier from settings that were already validated.
    /// A smoothing window below 2 is raised to 2, rates need two samples.
    pub fn new(settings: ClassifierSettings) -> Self {
        if settings.smoothing_window < MIN_WINDOW {
            warn!(
                "smoothing_window {} too small, using {}",
                settings.smoothing_window, MIN_WINDOW
            );
        }
        let window = settings.smoothing_window.max(MIN_WINDOW);
        Self {
            state: ClassifierState::Idle,
            distance_window: SlidingWindow::new(window),
            tilt_window: SlidingWindow::new(window),
            palm_x_window: SlidingWindow::new(window),
            angle_window: SlidingWindow::new(window),
            swipe_frames_left: 0,
            swipe_frames_right: 0,
            cooldowns: CooldownTable::new(settings.cooldowns),
            settings,
        }
    }

    pub fn try_new(settings: ClassifierSettings) -> Result<Self, GestureError> {
        settings.validate()?;
        Ok(Self::new(settings))
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Processes one frame using the current time for cooldowns
    pub fn update(&mut self, frame: &FrameObservation) -> Option<GestureEvent> {
        self.update_at(frame, Instant::now())
    }

    /// Processes one frame. Must be called once per frame, in frame order.
    ///
    /// # Panics
    ///
    /// If the observation is inconsistent (`detected` without hands, or
    /// `hand_count` not matching `hands`). That is a detector integration
    /// bug; run [`FrameObservation::validate`] on untrusted input first.
    pub fn update_at(&mut self, frame: &FrameObservation, now: Instant) -> Option<GestureEvent> {
        assert!(
            frame.is_consistent(),
            "malformed frame observation: detected={} hand_count={} hands={}",
            frame.detected,
            frame.hand_count,
            frame.hands.len()
        );

        match frame.hands.as_slice() {
            [] => {
                self.reset();
                None
            }
            [hand] => self.eval_single_hand(hand, now),
            // more than two hands is not a defined input, the first two drive it
            [hand_a, hand_b, ..] => self.eval_two_hand(hand_a, hand_b, now),
        }
    }

    /// Clears all buffers and swipe counters and returns to Idle.
    /// Cooldowns survive a reset.
    pub fn reset(&mut self) {
        self.clear_two_hand();
        self.clear_single_hand();
        if self.state != ClassifierState::Idle {
            debug!("Classifier reset: {} -> idle", self.state);
        }
        self.state = ClassifierState::Idle;
    }

    fn clear_two_hand(&mut self) {
        self.distance_window.clear();
        self.tilt_window.clear();
    }

    fn clear_single_hand(&mut self) {
        self.palm_x_window.clear();
        self.angle_window.clear();
        self.swipe_frames_left = 0;
        self.swipe_frames_right = 0;
    }

    // ── Two hands: zoom or pitch ───────────────────────────

    fn eval_two_hand(
        &mut self,
        hand_a: &HandObservation,
        hand_b: &HandObservation,
        now: Instant,
    ) -> Option<GestureEvent> {
        self.clear_single_hand();

        let zone = self.settings.activation_zone;
        if !zone.contains(hand_a.palm_center) && !zone.contains(hand_b.palm_center) {
            self.clear_two_hand();
            return None;
        }

        self.distance_window
            .push(hand_a.palm_center.distance(&hand_b.palm_center));

        if let (Some(tilt_a), Some(tilt_b)) = (normalized_tilt(hand_a), normalized_tilt(hand_b)) {
            self.tilt_window.push((tilt_a + tilt_b) / 2.0);
        }

        let distance_rate = self.distance_window.delta()?;

        // zoom wins whenever the distance is actively changing
        if distance_rate.abs() >= self.settings.zoom_dist_rate_min {
            let kind = if distance_rate > 0.0 {
                GestureKind::ZoomOut
            } else {
                GestureKind::ZoomIn
            };
            let intensity = (distance_rate.abs() / FULL_SCALE_RATE).min(1.0);
            return self.emit(kind, intensity, now);
        }

        self.eval_pitch(now)
    }

    fn eval_pitch(&mut self, now: Instant) -> Option<GestureEvent> {
        let tilt_rate = self.tilt_window.delta()?;

        if tilt_rate.abs() < self.settings.pitch_tilt_rate_min {
            return None;
        }

        // image Y grows downward: a shrinking dy means the fingers rise
        let kind = if tilt_rate < 0.0 {
            GestureKind::PitchUp
        } else {
            GestureKind::PitchDown
        };
        let intensity = (tilt_rate.abs() / FULL_SCALE_RATE).min(1.0);
        self.emit(kind, intensity, now)
    }

    // ── One hand: swipe or bearing ─────────────────────────

    fn eval_single_hand(&mut self, hand: &HandObservation, now: Instant) -> Option<GestureEvent> {
        self.clear_two_hand();

        if !self.settings.activation_zone.contains(hand.palm_center) {
            self.reset();
            return None;
        }

        self.palm_x_window.push(hand.palm_center.x);
        let velocity = self.palm_x_window.delta()?;

        if let Some(kind) = self.track_swipe(velocity) {
            // no bearing accumulation while the hand is translating
            self.angle_window.clear();
            return self.emit(kind, velocity.abs(), now);
        }

        self.eval_bearing(hand, now)
    }

    /// Updates the consecutive-frame counters and returns the confirmed
    /// direction, if any
    fn track_swipe(&mut self, velocity: f32) -> Option<GestureKind> {
        let threshold = self.settings.swipe_velocity_threshold;

        if velocity < -threshold {
            self.swipe_frames_left += 1;
            self.swipe_frames_right = 0;
        } else if velocity > threshold {
            self.swipe_frames_right += 1;
            self.swipe_frames_left = 0;
        } else {
            self.swipe_frames_left = 0;
            self.swipe_frames_right = 0;
            return None;
        }

        let min_frames = self.settings.swipe_min_frames;
        if self.swipe_frames_left >= min_frames {
            Some(GestureKind::PanLeft)
        } else if self.swipe_frames_right >= min_frames {
            Some(GestureKind::PanRight)
        } else {
            None
        }
    }

    fn eval_bearing(&mut self, hand: &HandObservation, now: Instant) -> Option<GestureEvent> {
        let angle = hand_angle(hand)?;
        self.angle_window.push(angle);

        if self.angle_window.len() < 2 {
            return None;
        }

        let total_delta = net_rotation(self.angle_window.iter());
        if total_delta.abs() < self.settings.bearing_angle_rate_min {
            return None;
        }

        let kind = if total_delta > 0.0 {
            GestureKind::BearingCw
        } else {
            GestureKind::BearingCcw
        };
        let intensity = (total_delta.abs() / FULL_SCALE_ROTATION).min(1.0);
        self.emit(kind, intensity, now)
    }

    /// Records the state the signal indicates, then applies the cooldown gate
    fn emit(&mut self, kind: GestureKind, magnitude: f32, now: Instant) -> Option<GestureEvent> {
        let next = kind.state();
        if next != self.state {
            debug!("Classifier state {} -> {}", self.state, next);
            self.state = next;
        }

        if !self.cooldowns.try_emit(kind, now) {
            debug!("{} suppressed by cooldown", kind);
            return None;
        }

        Some(GestureEvent::new(kind, magnitude))
    }
}

#[cfg(test)]
fn test_hand(palm: (f32, f32), axis_angle: f32) -> HandObservation {
    use super::observation::{HandLandmarks, Handedness, Point2, Point3};

    let wrist = Point3::new(palm.0, palm.1 + 0.05, 0.0);
    let middle_mcp = Point3::new(
        wrist.x + 0.1 * axis_angle.cos(),
        wrist.y + 0.1 * axis_angle.sin(),
        0.0,
    );
    HandObservation {
        landmarks: HandLandmarks {
            wrist,
            middle_mcp,
            ..HandLandmarks::default()
        },
        palm_center: Point2::new(palm.0, palm.1),
        handedness: Handedness::Right,
    }
}
