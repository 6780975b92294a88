//! Bookkeeping behind heartbeats and status messages

use std::time::{Duration, Instant};

use crate::gesture::GestureKind;

/// Frame rate measured over windows of at least one second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Counts a frame. Returns the new rate when a window closed.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// What clients see in heartbeats, plus the hand-timeout latch
#[derive(Debug, Clone)]
pub struct LinkState {
    hand_detected: bool,
    fps: FpsCounter,
    active_gesture: Option<GestureKind>,
    last_gesture_at: Option<Instant>,
    last_hand_at: Instant,
    hand_timeout_sent: bool,
    hand_timeout: Duration,
    active_gesture_hold: Duration,
}

impl LinkState {
    pub fn new(now: Instant, hand_timeout: Duration, active_gesture_hold: Duration) -> Self {
        Self {
            hand_detected: false,
            fps: FpsCounter::new(now),
            active_gesture: None,
            last_gesture_at: None,
            last_hand_at: now,
            hand_timeout_sent: false,
            hand_timeout,
            active_gesture_hold,
        }
    }

    /// Records a processed frame. Returns `true` exactly once per hand-loss
    /// period, when the timeout elapses without a detected hand.
    pub fn record_frame(&mut self, detected: bool, now: Instant) -> bool {
        self.hand_detected = detected;
        self.fps.tick(now);

        if detected {
            self.last_hand_at = now;
            self.hand_timeout_sent = false;
            return false;
        }

        if !self.hand_timeout_sent
            && now.saturating_duration_since(self.last_hand_at) > self.hand_timeout
        {
            self.hand_timeout_sent = true;
            return true;
        }
        false
    }

    pub fn record_gesture(&mut self, kind: GestureKind, now: Instant) {
        self.active_gesture = Some(kind);
        self.last_gesture_at = Some(now);
    }

    pub fn clear_active_gesture(&mut self) {
        self.active_gesture = None;
    }

    /// Active gesture label for a heartbeat at `now`; falls back to `idle`
    /// once no gesture was sent for the hold period
    pub fn active_gesture(&mut self, now: Instant) -> &'static str {
        let expired = self
            .last_gesture_at
            .map_or(true, |t| now.saturating_duration_since(t) > self.active_gesture_hold);
        if expired {
            self.active_gesture = None;
        }
        self.active_gesture.map_or("idle", |k| k.as_str())
    }

    pub fn hand_detected(&self) -> bool {
        self.hand_detected
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    pub fn hand_timeout(&self) -> Duration {
        self.hand_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(now: Instant) -> LinkState {
        LinkState::new(now, Duration::from_secs(5), Duration::from_secs(1))
    }

    #[test]
    fn test_fps_counter() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        for i in 1..30u64 {
            assert_eq!(fps.tick(t0 + Duration::from_millis(i * 33)), None);
        }
        let rate = fps.tick(t0 + Duration::from_millis(1000)).expect("window closed");
        assert!((rate - 30.0).abs() < 0.01);
        assert_eq!(fps.fps(), rate);
    }

    #[test]
    fn test_hand_timeout_fires_once() {
        let t0 = Instant::now();
        let mut link = state(t0);
        assert!(!link.record_frame(false, t0 + Duration::from_secs(4)));
        assert!(link.record_frame(false, t0 + Duration::from_millis(5001)));
        assert!(!link.record_frame(false, t0 + Duration::from_secs(8)));

        // re-armed by a detected hand
        assert!(!link.record_frame(true, t0 + Duration::from_secs(9)));
        assert!(link.hand_detected());
        assert!(link.record_frame(false, t0 + Duration::from_millis(14_001)));
    }

    #[test]
    fn test_active_gesture_reverts_to_idle() {
        let t0 = Instant::now();
        let mut link = state(t0);
        assert_eq!(link.active_gesture(t0), "idle");

        link.record_gesture(GestureKind::PanLeft, t0);
        assert_eq!(link.active_gesture(t0 + Duration::from_millis(500)), "pan_left");
        assert_eq!(link.active_gesture(t0 + Duration::from_millis(1001)), "idle");
    }

    #[test]
    fn test_clear_active_gesture() {
        let t0 = Instant::now();
        let mut link = state(t0);
        link.record_gesture(GestureKind::ZoomOut, t0);
        link.clear_active_gesture();
        assert_eq!(link.active_gesture(t0), "idle");
    }
}
