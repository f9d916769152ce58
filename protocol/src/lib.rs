#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use minicbor::{Decode, Encode};

/// Default servo move time sent with every command.
pub const DEFAULT_MOVE_TIME_MS: u16 = 2000;

/// Servo channel on the hand controller, addressed by digit 1..5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Thumb = 1,
    Index = 2,
    Middle = 3,
    Ring = 4,
    Pinky = 5,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Thumb,
        Channel::Index,
        Channel::Middle,
        Channel::Ring,
        Channel::Pinky,
    ];

    pub fn digit(self) -> u8 {
        self as u8
    }

    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.digit() == digit)
    }
}

/// One of the two servo end positions, named by pulse width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    // 500us
    Min,
    // 2500us
    Max,
}

impl Position {
    pub fn pulse_us(self) -> u16 {
        match self {
            Position::Min => 500,
            Position::Max => 2500,
        }
    }

    pub fn from_pulse(pulse_us: u16) -> Option<Self> {
        match pulse_us {
            500 => Some(Position::Min),
            2500 => Some(Position::Max),
            _ => None,
        }
    }
}

/// A servo command as sent over the link, e.g. `#002P0500T2000!`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub channel: Channel,
    pub position: Position,
    pub time_ms: u16,
}

impl Command {
    pub fn new(channel: Channel, position: Position) -> Self {
        Command {
            channel,
            position,
            time_ms: DEFAULT_MOVE_TIME_MS,
        }
    }

    pub fn with_time(mut self, time_ms: u16) -> Self {
        self.time_ms = time_ms;
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#00{}P{:04}T{}!",
            self.channel.digit(),
            self.position.pulse_us(),
            self.time_ms
        )
    }
}

#[derive(thiserror_no_std::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Missing `#00` prefix, `P`/`T` separators or `!` terminator.
    #[error("malformed command framing")]
    Framing,

    #[error("invalid channel digit")]
    InvalidChannel,

    #[error("invalid servo position")]
    InvalidPosition,

    #[error("invalid move time")]
    InvalidTime,
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("#00")
            .and_then(|s| s.strip_suffix('!'))
            .ok_or(ParseError::Framing)?;

        let digit = body.as_bytes().first().ok_or(ParseError::Framing)?;
        let channel = digit
            .checked_sub(b'0')
            .and_then(Channel::from_digit)
            .ok_or(ParseError::InvalidChannel)?;

        let rest = body
            .get(1..)
            .and_then(|s| s.strip_prefix('P'))
            .ok_or(ParseError::Framing)?;
        let (pulse, time) = rest.split_once('T').ok_or(ParseError::Framing)?;

        if pulse.len() != 4 || !all_digits(pulse) {
            return Err(ParseError::InvalidPosition);
        }
        let position = pulse
            .parse::<u16>()
            .ok()
            .and_then(Position::from_pulse)
            .ok_or(ParseError::InvalidPosition)?;

        if !all_digits(time) {
            return Err(ParseError::InvalidTime);
        }
        let time_ms = time.parse::<u16>().map_err(|_| ParseError::InvalidTime)?;

        Ok(Command {
            channel,
            position,
            time_ms,
        })
    }
}

/// Normalized landmark coordinate, [0..1] relative to the frame size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Encode, Decode)]
pub struct Point {
    #[n(0)]
    pub x: f32,
    #[n(1)]
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Landmarks of one detected hand, in estimator index order (0 = wrist).
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct HandLandmarks {
    #[n(0)]
    pub points: Vec<Point>,
}

/// Output of the pose estimator for one captured frame.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct LandmarkFrame {
    // capture time in microseconds since the estimator started
    #[n(0)]
    pub timestamp_us: u64,
    // None: the estimator yielded nothing for this frame
    #[n(1)]
    pub hands: Option<Vec<HandLandmarks>>,
}
