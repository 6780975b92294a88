//! Per-frame hand observations as delivered by the landmark detector.
//!
//! All coordinates are normalized image coordinates in `[0, 1]` with Y
//! increasing downward. The detector itself lives outside this crate; these
//! types are the boundary it has to fill in once per frame.

use serde::{Deserialize, Serialize};

use super::error::GestureError;

/// 2D point in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in the image plane
    pub fn distance(&self, other: &Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// 3D landmark as reported by the detector. `z` is carried but not used
/// by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Which hand the detector believes it is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// The ten named landmarks the classifier works with.
///
/// Every field is required. A detector adapter that cannot fill all of them
/// must not produce a `HandObservation` at all.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub wrist: Point3,
    pub thumb_tip: Point3,
    pub index_mcp: Point3,
    pub index_tip: Point3,
    pub middle_mcp: Point3,
    pub middle_tip: Point3,
    pub ring_mcp: Point3,
    pub ring_tip: Point3,
    pub pinky_mcp: Point3,
    pub pinky_tip: Point3,
}

impl HandLandmarks {
    /// Mean of wrist and the four MCP knuckles
    pub fn palm_center(&self) -> Point2 {
        let palm = [
            self.wrist,
            self.index_mcp,
            self.middle_mcp,
            self.ring_mcp,
            self.pinky_mcp,
        ];
        let n = palm.len() as f32;
        let x = palm.iter().map(|p| p.x).sum::<f32>() / n;
        let y = palm.iter().map(|p| p.y).sum::<f32>() / n;
        Point2::new(x, y)
    }

    fn all(&self) -> [Point3; 10] {
        [
            self.wrist,
            self.thumb_tip,
            self.index_mcp,
            self.index_tip,
            self.middle_mcp,
            self.middle_tip,
            self.ring_mcp,
            self.ring_tip,
            self.pinky_mcp,
            self.pinky_tip,
        ]
    }
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: HandLandmarks,
    /// Computed upstream from the landmarks, see [`HandLandmarks::palm_center`]
    pub palm_center: Point2,
    pub handedness: Handedness,
}

impl HandObservation {
    /// Builds an observation and derives the palm center the same way the
    /// detector does.
    pub fn from_landmarks(landmarks: HandLandmarks, handedness: Handedness) -> Self {
        Self {
            palm_center: landmarks.palm_center(),
            landmarks,
            handedness,
        }
    }
}

/// Everything the detector saw in one video frame.
///
/// `hands` is in detection order; the index is not a stable identity across
/// frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameObservation {
    pub detected: bool,
    pub hand_count: usize,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl FrameObservation {
    /// Frame without any hand
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frame built from a list of hands, keeping `detected` and
    /// `hand_count` consistent with it.
    pub fn with_hands(hands: Vec<HandObservation>) -> Self {
        Self {
            detected: !hands.is_empty(),
            hand_count: hands.len(),
            hands,
        }
    }

    /// Whether the shape invariants hold: `detected` iff at least one hand,
    /// `hand_count == hands.len()`.
    pub fn is_consistent(&self) -> bool {
        self.hand_count == self.hands.len() && self.detected == (self.hand_count > 0)
    }

    /// Boundary check for observations coming from untrusted sources
    /// (recordings, foreign adapters). The classifier treats a failure here
    /// as a contract violation, so callers should run this first.
    pub fn validate(&self) -> Result<(), GestureError> {
        if !self.is_consistent() {
            return Err(GestureError::MalformedObservation(format!(
                "detected={} hand_count={} but {} hands supplied",
                self.detected,
                self.hand_count,
                self.hands.len()
            )));
        }

        for (i, hand) in self.hands.iter().enumerate() {
            let finite = hand
                .landmarks
                .all()
                .iter()
                .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
                && hand.palm_center.x.is_finite()
                && hand.palm_center.y.is_finite();
            if !finite {
                return Err(GestureError::MalformedObservation(format!(
                    "hand {} contains non-finite coordinates",
                    i
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand(x: f32, y: f32) -> HandLandmarks {
        let p = Point3::new(x, y, 0.0);
        HandLandmarks {
            wrist: p,
            thumb_tip: p,
            index_mcp: p,
            index_tip: p,
            middle_mcp: p,
            middle_tip: p,
            ring_mcp: p,
            ring_tip: p,
            pinky_mcp: p,
            pinky_tip: p,
        }
    }

    #[test]
    fn test_palm_center_is_mean_of_wrist_and_knuckles() {
        let mut lm = flat_hand(0.0, 0.0);
        lm.wrist = Point3::new(0.5, 0.5, 0.0);
        lm.index_mcp = Point3::new(0.4, 0.4, 0.0);
        lm.middle_mcp = Point3::new(0.5, 0.4, 0.0);
        lm.ring_mcp = Point3::new(0.6, 0.4, 0.0);
        lm.pinky_mcp = Point3::new(0.5, 0.3, 0.0);
        // fingertips must not influence the palm center
        lm.index_tip = Point3::new(0.9, 0.9, 0.0);

        let pc = lm.palm_center();
        assert!((pc.x - 0.5).abs() < 1e-6);
        assert!((pc.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_with_hands_is_consistent() {
        let hand = HandObservation::from_landmarks(flat_hand(0.5, 0.5), Handedness::Left);
        let frame = FrameObservation::with_hands(vec![hand.clone(), hand]);
        assert!(frame.detected);
        assert_eq!(frame.hand_count, 2);
        assert!(frame.validate().is_ok());
        assert!(FrameObservation::empty().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_count_mismatch() {
        let frame = FrameObservation {
            detected: true,
            hand_count: 2,
            hands: vec![],
        };
        assert!(matches!(
            frame.validate(),
            Err(GestureError::MalformedObservation(_))
        ));

        let frame = FrameObservation {
            detected: false,
            hand_count: 1,
            hands: vec![HandObservation::from_landmarks(
                flat_hand(0.5, 0.5),
                Handedness::Right,
            )],
        };
        assert!(frame.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut lm = flat_hand(0.5, 0.5);
        lm.middle_mcp.y = f32::NAN;
        let frame = FrameObservation::with_hands(vec![HandObservation::from_landmarks(
            lm,
            Handedness::Right,
        )]);
        assert!(frame.validate().is_err());
    }

    #[test]
    fn test_deserialize_detector_json() {
        let json = r#"{
            "detected": true,
            "hand_count": 1,
            "hands": [{
                "landmarks": {
                    "wrist": {"x": 0.5, "y": 0.6},
                    "thumb_tip": {"x": 0.45, "y": 0.5, "z": -0.01},
                    "index_mcp": {"x": 0.48, "y": 0.5},
                    "index_tip": {"x": 0.48, "y": 0.4},
                    "middle_mcp": {"x": 0.5, "y": 0.5},
                    "middle_tip": {"x": 0.5, "y": 0.4},
                    "ring_mcp": {"x": 0.52, "y": 0.5},
                    "ring_tip": {"x": 0.52, "y": 0.4},
                    "pinky_mcp": {"x": 0.54, "y": 0.52},
                    "pinky_tip": {"x": 0.54, "y": 0.44}
                },
                "palm_center": {"x": 0.508, "y": 0.524},
                "handedness": "Right"
            }]
        }"#;
        let frame: FrameObservation = serde_json::from_str(json).expect("valid json");
        assert!(frame.validate().is_ok());
        assert_eq!(frame.hands[0].handedness, Handedness::Right);
        assert_eq!(frame.hands[0].landmarks.wrist.z, 0.0);
    }

    #[test]
    fn test_deserialize_rejects_missing_landmark() {
        let json = r#"{
            "detected": true,
            "hand_count": 1,
            "hands": [{
                "landmarks": {"wrist": {"x": 0.5, "y": 0.6}},
                "palm_center": {"x": 0.5, "y": 0.5},
                "handedness": "Left"
            }]
        }"#;
        assert!(serde_json::from_str::<FrameObservation>(json).is_err());
    }
}
