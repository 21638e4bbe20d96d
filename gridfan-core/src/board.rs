//! Board definition for the NZXT Grid+ v2
//!
//! The Grid+ v2 is the only controller this driver speaks to, so its
//! characteristics are plain associated constants rather than a trait.

/// NZXT Grid+ v2 fan controller
///
/// - 6 voltage-controlled fan channels, numbered 1 through 6
/// - 4800 baud serial link
/// - Output voltage 4.0V-12.0V in 0.5V steps, or fully off
///
/// # Example
///
/// ```
/// use gridfan_core::board::GridPlusV2;
///
/// assert_eq!(GridPlusV2::CHANNEL_COUNT, 6);
/// assert_eq!(GridPlusV2::BAUD_RATE, 4800);
/// ```
pub struct GridPlusV2;

impl GridPlusV2 {
    /// Human-readable board name
    pub const NAME: &'static str = "NZXT Grid+ v2";

    /// Number of fan channels
    pub const CHANNEL_COUNT: u8 = 6;

    /// Serial communication baud rate
    pub const BAUD_RATE: u32 = 4800;

    /// Default read timeout in milliseconds
    pub const READ_TIMEOUT_MS: u64 = 2000;

    /// Default write timeout in milliseconds
    pub const WRITE_TIMEOUT_MS: u64 = 4000;

    /// Default device node (a udev rule usually creates this symlink)
    pub const DEFAULT_DEVICE: &'static str = "/dev/GridPlus0";

    /// Lowest non-zero speed percentage; maps to the voltage floor
    pub const MIN_SPEED: u8 = 20;

    /// Highest speed percentage
    pub const MAX_SPEED: u8 = 100;

    /// Voltage applied at `MIN_SPEED`
    pub const MIN_VOLTAGE: f64 = 4.0;

    /// Voltage applied at `MAX_SPEED`
    pub const MAX_VOLTAGE: f64 = 12.0;

    /// Acknowledgment header that prefixes every telemetry response
    pub const ACK_HEADER: [u8; 3] = [0xC0, 0x00, 0x00];
}
