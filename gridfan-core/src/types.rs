//! Common types used across the GridFan system

use crate::board::GridPlusV2;
use crate::error::{GridFanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical fan port on the controller, 1 through 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Channel(u8);

impl Channel {
    /// Validate a channel number
    pub fn new(channel: u8) -> Result<Self> {
        if !(1..=GridPlusV2::CHANNEL_COUNT).contains(&channel) {
            return Err(GridFanError::InvalidArgument(format!(
                "Fan channel must be between 1 and {}, got {}.",
                GridPlusV2::CHANNEL_COUNT,
                channel
            )));
        }
        Ok(Self(channel))
    }

    /// All channels in ascending order
    pub fn all() -> impl Iterator<Item = Channel> {
        (1..=GridPlusV2::CHANNEL_COUNT).map(Channel)
    }

    /// Channel number
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Payload form of the channel: two zero-padded decimal digits
    pub fn payload_hex(self) -> String {
        format!("{:02}", self.0)
    }
}

impl TryFrom<i64> for Channel {
    type Error = GridFanError;

    fn try_from(value: i64) -> Result<Self> {
        let channel = u8::try_from(value).map_err(|_| {
            GridFanError::InvalidArgument(format!(
                "Fan channel must be between 1 and {}, got {}.",
                GridPlusV2::CHANNEL_COUNT,
                value
            ))
        })?;
        Channel::new(channel)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested fan speed in percent: 0 (off) or up to 100
///
/// Values between 1 and 19 are accepted; the codec clamps them to the 20%
/// voltage floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u8")]
pub struct Speed(u8);

impl Speed {
    /// Channel off
    pub const OFF: Speed = Speed(0);

    /// Full voltage
    pub const FULL: Speed = Speed(GridPlusV2::MAX_SPEED);

    /// Validate a speed percentage
    pub fn new(percent: u8) -> Result<Self> {
        if percent > GridPlusV2::MAX_SPEED {
            return Err(GridFanError::InvalidArgument(format!(
                "Invalid speed: {}. Speed must be within 0-100.",
                percent
            )));
        }
        Ok(Self(percent))
    }

    /// Percentage value
    #[inline]
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl TryFrom<f64> for Speed {
    type Error = GridFanError;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(GridFanError::InvalidArgument(format!(
                "Invalid speed type: {}. Speed must be a whole percentage.",
                value
            )));
        }
        if value < 0.0 {
            return Err(GridFanError::InvalidArgument(format!(
                "Invalid speed: {}. Speed must be a non-negative number.",
                value
            )));
        }
        if value > f64::from(GridPlusV2::MAX_SPEED) {
            return Err(GridFanError::InvalidArgument(format!(
                "Invalid speed: {}. Speed must be within 0-100.",
                value
            )));
        }
        Ok(Self(value as u8))
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// One pass of telemetry for a single channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    /// Channel the values were read from
    pub channel: Channel,
    /// Fan speed in RPM
    pub rpm: u16,
    /// Applied voltage
    pub voltage: f64,
    /// Power draw in watts
    pub wattage: f64,
    /// Applied voltage as a speed percentage
    pub percent: u8,
}
