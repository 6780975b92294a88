//! Per-kind emission cooldown

use std::time::Instant;

use super::event::GestureKind;
use super::settings::CooldownSettings;

/// Last emission time of every gesture kind. `None` means never emitted.
#[derive(Debug, Clone)]
pub struct CooldownTable {
    settings: CooldownSettings,
    last_emit: [Option<Instant>; GestureKind::COUNT],
}

impl CooldownTable {
    pub fn new(settings: CooldownSettings) -> Self {
        Self {
            settings,
            last_emit: [None; GestureKind::COUNT],
        }
    }

    /// Whether `kind` may be emitted at `now`
    pub fn is_ready(&self, kind: GestureKind, now: Instant) -> bool {
        match self.last_emit[kind.index()] {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.settings.interval_for(kind),
        }
    }

    /// Checks the gate and records the emission when it passes.
    /// Rejected candidates leave the table untouched.
    pub fn try_emit(&mut self, kind: GestureKind, now: Instant) -> bool {
        if !self.is_ready(kind, now) {
            return false;
        }
        let slot = &mut self.last_emit[kind.index()];
        // entries never move backwards in time
        *slot = Some(slot.map_or(now, |last| last.max(now)));
        true
    }

    pub fn last_emit(&self, kind: GestureKind) -> Option<Instant> {
        self.last_emit[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_emission_always_passes() {
        let mut table = CooldownTable::new(CooldownSettings::default());
        let now = Instant::now();
        for kind in GestureKind::ALL {
            assert!(table.try_emit(kind, now));
        }
    }

    #[test]
    fn test_suppresses_within_interval() {
        let mut table = CooldownTable::new(CooldownSettings::default());
        let t0 = Instant::now();
        assert!(table.try_emit(GestureKind::ZoomIn, t0));
        assert!(!table.try_emit(GestureKind::ZoomIn, t0 + Duration::from_millis(79)));
        // suppression does not move the reference point
        assert_eq!(table.last_emit(GestureKind::ZoomIn), Some(t0));
        assert!(table.try_emit(GestureKind::ZoomIn, t0 + Duration::from_millis(80)));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut table = CooldownTable::new(CooldownSettings::default());
        let t0 = Instant::now();
        assert!(table.try_emit(GestureKind::ZoomIn, t0));
        assert!(table.try_emit(GestureKind::ZoomOut, t0));
        assert!(table.last_emit(GestureKind::PanLeft).is_none());
    }

    #[test]
    fn test_pitch_uses_tighter_interval() {
        let mut table = CooldownTable::new(CooldownSettings::default());
        let t0 = Instant::now();
        assert!(table.try_emit(GestureKind::PitchUp, t0));
        assert!(table.try_emit(GestureKind::PitchUp, t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let mut table = CooldownTable::new(CooldownSettings {
            gesture_ms: 0,
            pitch_ms: 0,
            bearing_ms: 0,
        });
        let t0 = Instant::now();
        assert!(table.try_emit(GestureKind::PanLeft, t0));
        assert!(table.try_emit(GestureKind::PanLeft, t0));
    }
}
