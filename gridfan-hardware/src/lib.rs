//! gridfan-hardware
//!
//! Hardware crate that contains the serial transport, the request/response
//! protocol engine and the high-level controller for the NZXT Grid+ v2.
//!
//! Public API:
//! - `fan_controller::GridController`: per-channel fan operations
//! - `protocol::ProtocolEngine`: one command exchange per call
//! - `serial_driver::SerialDriver`: tokio-serial transport
//! - `mock::MockConnector`: scripted transport (feature `mock`)

pub mod fan_controller;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod protocol;
pub mod serial_driver;

pub use fan_controller::GridController;
pub use protocol::ProtocolEngine;
pub use serial_driver::{SerialConnector, SerialDriver, SerialLink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_present() {
        let _ = std::any::TypeId::of::<GridController>();
        let _ = std::any::TypeId::of::<SerialDriver>();
        let _ = std::any::TypeId::of::<ProtocolEngine<SerialDriver>>();
    }
}
