#![cfg_attr(not(test), no_std)]

use core::cmp::Ordering;

use protocol::{Channel, Command, Point, Position};

mod snapshot;

pub use snapshot::{FingerLandmarks, HandSnapshot, JointMode};

/// Landmarks per hand reported by the pose estimator.
pub const LANDMARK_COUNT: usize = 21;

/// Commands produced for one hand, at most one per finger.
pub type Commands = heapless::Vec<Command, 5>;

#[derive(thiserror_no_std::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("hand has {found} landmarks, expected {expected}")]
    InvalidLandmarkCount { found: usize, expected: usize },

    #[error("unknown joint mode, expected `legacy` or `measured`")]
    UnknownJointMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Order in which a hand's commands are emitted.
    pub const EMISSION_ORDER: [Finger; 5] = [
        Finger::Thumb,
        Finger::Ring,
        Finger::Pinky,
        Finger::Index,
        Finger::Middle,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn channel(self) -> Channel {
        match self {
            Finger::Thumb => Channel::Thumb,
            Finger::Index => Channel::Index,
            Finger::Middle => Channel::Middle,
            Finger::Ring => Channel::Ring,
            Finger::Pinky => Channel::Pinky,
        }
    }

    pub fn tip_landmark(self) -> usize {
        match self {
            Finger::Thumb => 4,
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }

    /// Joint the tip is compared against. For the thumb this is the IP
    /// joint, for the other fingers the MCP knuckle.
    pub fn joint_landmark(self) -> usize {
        match self {
            Finger::Thumb => 3,
            Finger::Index => 5,
            Finger::Middle => 9,
            Finger::Ring => 13,
            Finger::Pinky => 17,
        }
    }

    /// Servo position for the finger, or `None` when tip and joint are level.
    ///
    /// The thumb moves sideways and is compared on x, the other fingers on y
    /// (image coordinates, y grows downwards). Index and middle servos are
    /// mounted reversed, so their mapping is inverted.
    pub fn position(self, landmarks: &FingerLandmarks) -> Option<Position> {
        let (tip, joint) = match self {
            Finger::Thumb => (landmarks.tip.x, landmarks.joint.x),
            _ => (landmarks.tip.y, landmarks.joint.y),
        };

        let position = match tip.partial_cmp(&joint)? {
            Ordering::Greater => Position::Max,
            Ordering::Less => Position::Min,
            Ordering::Equal => return None,
        };

        match self {
            Finger::Index | Finger::Middle => Some(invert(position)),
            _ => Some(position),
        }
    }
}

fn invert(position: Position) -> Position {
    match position {
        Position::Min => Position::Max,
        Position::Max => Position::Min,
    }
}

/// Turns a hand's landmarks into servo commands.
#[derive(Clone, Copy, Debug)]
pub struct Classifier {
    joint_mode: JointMode,
    move_time_ms: u16,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(JointMode::default(), protocol::DEFAULT_MOVE_TIME_MS)
    }
}

impl Classifier {
    pub fn new(joint_mode: JointMode, move_time_ms: u16) -> Self {
        Classifier {
            joint_mode,
            move_time_ms,
        }
    }

    pub fn snapshot(&self, points: &[Point]) -> Result<HandSnapshot, Error> {
        HandSnapshot::from_landmarks(points, self.joint_mode)
    }

    /// Commands for a snapshot, in [`Finger::EMISSION_ORDER`].
    pub fn commands(&self, snapshot: &HandSnapshot) -> Commands {
        let mut commands = Commands::new();
        for finger in Finger::EMISSION_ORDER {
            if let Some(position) = finger.position(snapshot.get(finger)) {
                let cmd = Command::new(finger.channel(), position).with_time(self.move_time_ms);
                // capacity equals the number of fingers
                let _ = commands.push(cmd);
            }
        }
        commands
    }

    /// Classifies one hand. A hand with too few landmarks yields an error
    /// and no commands at all.
    pub fn classify(&self, points: &[Point]) -> Result<Commands, Error> {
        let snapshot = self.snapshot(points)?;
        Ok(self.commands(&snapshot))
    }
}
