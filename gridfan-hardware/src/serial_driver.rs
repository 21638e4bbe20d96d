//! Serial driver for low-level hardware communication
//!
//! The controller is flaky enough that no connection is held between
//! commands: every exchange opens a fresh link and drops it afterwards.

use async_trait::async_trait;
use gridfan_core::{GridFanError, Result, SerialSettings};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout, Instant};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, warn};

/// An open byte link to the controller
///
/// The link is released when dropped.
#[async_trait]
pub trait SerialLink: Send {
    /// Write the whole buffer, returning the number of bytes written
    async fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Read up to `len` bytes
    ///
    /// Returns fewer bytes (possibly none) if the read timeout expires first.
    async fn read(&mut self, len: usize) -> Result<Vec<u8>>;
}

/// Trait for serial transport abstraction
///
/// This trait enables testing of `ProtocolEngine` and `GridController`
/// without real hardware by allowing mock implementations.
#[async_trait]
pub trait SerialConnector: Send + Sync {
    /// Open a link to the device described by `settings`
    async fn open(&self, settings: &SerialSettings) -> Result<Box<dyn SerialLink>>;
}

/// Serial driver for hardware communication
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialDriver;

#[async_trait]
impl SerialConnector for SerialDriver {
    async fn open(&self, settings: &SerialSettings) -> Result<Box<dyn SerialLink>> {
        debug!("Opening serial port: {}", settings.device);

        let port = tokio_serial::new(&settings.device, settings.baud_rate)
            .timeout(settings.read_timeout())
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Failed to open serial port {}: {}", settings.device, e);
                GridFanError::CommunicationFailure(format!(
                    "Failed to initialise a connection with the controller. \
                     Check the controller exists at {}. \
                     If it exists, make sure you have sufficient permissions. ({})",
                    settings.device, e
                ))
            })?;

        Ok(Box::new(SerialPortLink {
            port,
            read_timeout: settings.read_timeout(),
            write_timeout: settings.write_timeout(),
        }))
    }
}

/// A tokio-serial port opened for a single exchange
pub struct SerialPortLink {
    port: SerialStream,
    read_timeout: Duration,
    write_timeout: Duration,
}

#[async_trait]
impl SerialLink for SerialPortLink {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        timeout(self.write_timeout, self.port.write_all(bytes))
            .await
            .map_err(|_| {
                error!("Write timeout");
                GridFanError::CommunicationFailure("Write operation timed out".to_string())
            })?
            .map_err(|e| {
                error!("Write failed: {}", e);
                GridFanError::CommunicationFailure(format!("Write failed: {}", e))
            })?;

        // Flush to ensure data is sent
        timeout(self.write_timeout, self.port.flush())
            .await
            .map_err(|_| {
                GridFanError::CommunicationFailure("Flush operation timed out".to_string())
            })?
            .map_err(|e| GridFanError::CommunicationFailure(format!("Flush failed: {}", e)))?;

        Ok(bytes.len())
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut response = Vec::with_capacity(len);
        let mut chunk = vec![0u8; len];

        while response.len() < len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let wanted = len - response.len();
            match timeout(remaining, self.port.read(&mut chunk[..wanted])).await {
                // Timed out: hand back whatever arrived
                Err(_) => break,
                Ok(Ok(0)) => {
                    warn!("Serial port returned EOF - device may have been disconnected");
                    break;
                }
                Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => {
                    error!("Read error: {}", e);
                    return Err(GridFanError::CommunicationFailure(format!(
                        "Read error: {}",
                        e
                    )));
                }
            }
        }

        Ok(response)
    }
}
