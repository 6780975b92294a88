//! Hand orientation geometry
//!
//! Both pitch and bearing read the wrist → middle-finger-knuckle segment.
//! Pitch uses its normalized vertical component, bearing its atan2 angle.

use std::f32::consts::{PI, TAU};

use super::observation::HandObservation;

/// Segments shorter than this (normalized units) give no usable direction
pub const MIN_SEGMENT_LENGTH: f32 = 0.01;

/// (dx, dy) from wrist to middle MCP, or `None` if the segment is degenerate
fn hand_axis(hand: &HandObservation) -> Option<(f32, f32)> {
    let wrist = hand.landmarks.wrist;
    let middle_mcp = hand.landmarks.middle_mcp;
    let dx = middle_mcp.x - wrist.x;
    let dy = middle_mcp.y - wrist.y;
    if dx.hypot(dy) < MIN_SEGMENT_LENGTH {
        return None;
    }
    Some((dx, dy))
}

/// dy / |segment|, in `[-1, 1]`. With Y pointing down, fingers straight up
/// give -1.
pub fn normalized_tilt(hand: &HandObservation) -> Option<f32> {
    hand_axis(hand).map(|(dx, dy)| dy / dx.hypot(dy))
}

/// atan2(dy, dx) of the hand axis in radians, `(-π, π]`
pub fn hand_angle(hand: &HandObservation) -> Option<f32> {
    hand_axis(hand).map(|(dx, dy)| dy.atan2(dx))
}

/// Brings a raw angle difference back into `[-π, π]` so that crossing the
/// atan2 seam does not look like a near-full turn
pub fn wrap_delta(delta: f32) -> f32 {
    if delta > PI {
        delta - TAU
    } else if delta < -PI {
        delta + TAU
    } else {
        delta
    }
}

/// Sum of wrapped frame-to-frame deltas over a chronological angle sequence.
/// Positive is clockwise on screen.
pub fn net_rotation<'a>(angles: impl IntoIterator<Item = &'a f32>) -> f32 {
    let mut iter = angles.into_iter();
    let Some(mut prev) = iter.next().copied() else {
        return 0.0;
    };
    let mut total = 0.0;
    for &angle in iter {
        total += wrap_delta(angle - prev);
        prev = angle;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::observation::{Handedness, HandLandmarks, Point3};

    fn hand_with_axis(dx: f32, dy: f32) -> HandObservation {
        let landmarks = HandLandmarks {
            wrist: Point3::new(0.5, 0.5, 0.0),
            middle_mcp: Point3::new(0.5 + dx, 0.5 + dy, 0.0),
            ..HandLandmarks::default()
        };
        HandObservation::from_landmarks(landmarks, Handedness::Right)
    }

    #[test]
    fn test_unwrap_across_seam() {
        let angles = [3.0f32, 3.1, -3.1, -3.0];
        let total = net_rotation(angles.iter());
        let expected = 3.1 - 3.0 + (TAU - 6.2) + 0.1;
        assert!((total - expected).abs() < 1e-4, "got {}", total);
        assert!(total.abs() < 0.5);
    }

    #[test]
    fn test_unwrap_reverse_direction() {
        let angles = [-3.0f32, -3.1, 3.1, 3.0];
        let total = net_rotation(angles.iter());
        assert!(total < 0.0);
        assert!(total.abs() < 0.5);
    }

    #[test]
    fn test_net_rotation_short_input() {
        let empty: [f32; 0] = [];
        assert_eq!(net_rotation(empty.iter()), 0.0);
        assert_eq!(net_rotation([1.0f32].iter()), 0.0);
    }

    #[test]
    fn test_tilt_of_upright_hand() {
        let hand = hand_with_axis(0.0, -0.1);
        let tilt = normalized_tilt(&hand).expect("long enough");
        assert!((tilt + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_axis() {
        let hand = hand_with_axis(0.005, 0.005);
        assert!(normalized_tilt(&hand).is_none());
        assert!(hand_angle(&hand).is_none());
    }

    #[test]
    fn test_hand_angle() {
        let hand = hand_with_axis(0.1, 0.0);
        assert!(hand_angle(&hand).expect("angle").abs() < 1e-6);
        let hand = hand_with_axis(0.0, 0.1);
        assert!((hand_angle(&hand).expect("angle") - PI / 2.0).abs() < 1e-6);
    }
}
