use protocol::Point;

use crate::Error;
use crate::Finger;
use crate::LANDMARK_COUNT;

/// Source of a finger's joint x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JointMode {
    /// Only the joint's y is recorded, x stays at 0.0, so the thumb is
    /// compared against the left image edge.
    #[default]
    Legacy,
    /// Joint x is taken from the landmark like the tip.
    Measured,
}

impl core::str::FromStr for JointMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(JointMode::Legacy),
            "measured" => Ok(JointMode::Measured),
            _ => Err(Error::UnknownJointMode),
        }
    }
}

/// Tip and proximal joint of one finger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FingerLandmarks {
    pub tip: Point,
    pub joint: Point,
}

/// Per-finger landmarks of a single hand in a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandSnapshot {
    fingers: [FingerLandmarks; 5],
}

impl HandSnapshot {
    pub fn from_landmarks(points: &[Point], mode: JointMode) -> Result<Self, Error> {
        if points.len() < LANDMARK_COUNT {
            return Err(Error::InvalidLandmarkCount {
                found: points.len(),
                expected: LANDMARK_COUNT,
            });
        }

        let mut snapshot = HandSnapshot::default();
        for finger in Finger::ALL {
            let joint = points[finger.joint_landmark()];
            snapshot.fingers[finger.slot()] = FingerLandmarks {
                tip: points[finger.tip_landmark()],
                joint: match mode {
                    JointMode::Legacy => Point::new(0.0, joint.y),
                    JointMode::Measured => joint,
                },
            };
        }
        Ok(snapshot)
    }

    pub fn get(&self, finger: Finger) -> &FingerLandmarks {
        &self.fingers[finger.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, &FingerLandmarks)> {
        Finger::ALL.into_iter().zip(self.fingers.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand() -> Vec<Point> {
        (0..LANDMARK_COUNT)
            .map(|i| Point::new(i as f32 / 100.0, 1.0 - i as f32 / 100.0))
            .collect()
    }

    #[test]
    fn test_snapshot_measured() {
        let points = hand();
        let snapshot = HandSnapshot::from_landmarks(&points, JointMode::Measured).unwrap();
        let index = snapshot.get(Finger::Index);
        assert_eq!(index.tip, points[8]);
        assert_eq!(index.joint, points[5]);

        let thumb = snapshot.get(Finger::Thumb);
        assert_eq!(thumb.tip, points[4]);
        assert_eq!(thumb.joint, points[3]);

        let pinky = snapshot.get(Finger::Pinky);
        assert_eq!(pinky.tip, points[20]);
        assert_eq!(pinky.joint, points[17]);
    }

    #[test]
    fn test_snapshot_legacy_drops_joint_x() {
        let snapshot = HandSnapshot::from_landmarks(&hand(), JointMode::Legacy).unwrap();
        for (finger, landmarks) in snapshot.iter() {
            assert_eq!(landmarks.joint.x, 0.0, "{finger:?}");
            assert_eq!(landmarks.tip, hand()[finger.tip_landmark()]);
            assert_eq!(landmarks.joint.y, hand()[finger.joint_landmark()].y);
        }
    }

    #[test]
    fn test_snapshot_too_few_landmarks() {
        let points = hand();
        assert_eq!(
            HandSnapshot::from_landmarks(&points[..20], JointMode::Legacy),
            Err(Error::InvalidLandmarkCount {
                found: 20,
                expected: 21
            })
        );
        assert!(HandSnapshot::from_landmarks(&[], JointMode::Measured).is_err());
    }

    #[test]
    fn test_snapshot_ignores_extra_landmarks() {
        let mut points = hand();
        points.push(Point::new(9.0, 9.0));
        let snapshot = HandSnapshot::from_landmarks(&points, JointMode::Measured).unwrap();
        assert_eq!(
            snapshot,
            HandSnapshot::from_landmarks(&hand(), JointMode::Measured).unwrap()
        );
    }

    #[test]
    fn test_joint_mode_from_str() {
        assert_eq!("legacy".parse::<JointMode>(), Ok(JointMode::Legacy));
        assert_eq!("measured".parse::<JointMode>(), Ok(JointMode::Measured));
        assert_eq!("x".parse::<JointMode>(), Err(Error::UnknownJointMode));
    }
}
