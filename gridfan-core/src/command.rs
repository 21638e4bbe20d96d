//! Command table for the Grid+ v2 serial protocol
//!
//! Every request is an opcode byte followed by a fixed-size payload, and
//! every response has a fixed size. Both sizes are known before any I/O.

use crate::error::GridFanError;
use std::fmt;

/// Commands supported by the fan controller
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Liveness probe (0xC0)
    Ping = 0xC0,
    /// Read channel RPM (0x8A)
    GetRpm = 0x8A,
    /// Read channel voltage (0x84)
    GetVoltage = 0x84,
    /// Read channel wattage (0x85)
    GetWattage = 0x85,
    /// Set channel voltage (0x44)
    SetFan = 0x44,
}

impl Command {
    /// Every command, in table order
    pub const ALL: [Command; 5] = [
        Command::Ping,
        Command::GetRpm,
        Command::GetVoltage,
        Command::GetWattage,
        Command::SetFan,
    ];

    /// Opcode byte that prefixes the request
    #[inline]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Total request length in bytes, opcode included
    pub const fn input_len(self) -> usize {
        match self {
            Command::Ping => 1,
            Command::GetRpm | Command::GetVoltage | Command::GetWattage => 2,
            Command::SetFan => 7,
        }
    }

    /// Response length in bytes
    pub const fn output_len(self) -> usize {
        match self {
            Command::Ping | Command::SetFan => 1,
            Command::GetRpm | Command::GetVoltage | Command::GetWattage => 5,
        }
    }

    /// Operation name as used in the command table
    pub const fn name(self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::GetRpm => "GET_RPM",
            Command::GetVoltage => "GET_VOLTAGE",
            Command::GetWattage => "GET_WATTAGE",
            Command::SetFan => "SET_FAN",
        }
    }

    /// Look up a command by its table name
    pub fn lookup(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Command {
    type Err = GridFanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::lookup(s)
            .ok_or_else(|| GridFanError::InvalidArgument(format!("Unknown command: '{}'", s)))
    }
}
