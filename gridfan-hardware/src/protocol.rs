//! Protocol engine: one command, one exchange
//!
//! Frames a command and its payload, sends it over a freshly opened link and
//! checks that exactly the expected number of bytes came back. It does not
//! interpret the response.

use crate::serial_driver::SerialConnector;
use gridfan_core::{Command, GridFanError, Result, SerialSettings};
use tracing::{debug, error};

/// Assemble the request frame: opcode followed by the hex payload
///
/// A payload that is not hex is engine misuse; a frame of the wrong length
/// for the command is an invalid argument.
pub fn encode_frame(command: Command, payload_hex: &str) -> Result<Vec<u8>> {
    let payload = hex::decode(payload_hex).map_err(|e| {
        GridFanError::Internal(format!(
            "Payload for {} is not a hex byte string ({}): {:?}",
            command, e, payload_hex
        ))
    })?;

    let mut frame = Vec::with_capacity(1 + payload.len());
    frame.push(command.opcode());
    frame.extend_from_slice(&payload);

    if frame.len() != command.input_len() {
        return Err(GridFanError::InvalidArgument(format!(
            "Invalid input size. Expected: {}. Received: {}.",
            command.input_len(),
            frame.len()
        )));
    }

    Ok(frame)
}

/// Sends commands to the controller, one transport link per exchange
pub struct ProtocolEngine<C: SerialConnector> {
    connector: C,
    settings: SerialSettings,
}

impl<C: SerialConnector> ProtocolEngine<C> {
    /// Create an engine talking to the device described by `settings`
    pub fn new(connector: C, settings: SerialSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    /// Execute one command and return the raw response bytes
    ///
    /// Fails with `InvalidArgument` before any I/O if the frame has the wrong
    /// size, `CommunicationFailure` if the port cannot be opened or written,
    /// and `UnexpectedResponse` unless exactly `output_len` bytes come back.
    pub async fn execute(&self, command: Command, payload_hex: &str) -> Result<Vec<u8>> {
        let frame = encode_frame(command, payload_hex)?;

        // Dropped on every return path below, which closes the port
        let mut link = self.connector.open(&self.settings).await?;

        debug!("TX {}: {}", command, hex::encode(&frame));
        let written = link.write(&frame).await?;
        debug!("Wrote {} bytes", written);

        if written != frame.len() {
            error!("Short write: {} of {} bytes", written, frame.len());
            return Err(GridFanError::CommunicationFailure(format!(
                "Short write: {} of {} bytes",
                written,
                frame.len()
            )));
        }

        let response = link.read(command.output_len()).await?;
        debug!("RX {}: {}", command, hex::encode(&response));

        if response.len() != command.output_len() {
            return Err(GridFanError::UnexpectedResponse(format!(
                "{} expected {} bytes, got [{}]",
                command,
                command.output_len(),
                hex::encode(&response)
            )));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConnector, Reply};
    use gridfan_core::ErrorKind;

    fn engine(mock: &MockConnector) -> ProtocolEngine<MockConnector> {
        ProtocolEngine::new(mock.clone(), SerialSettings::default())
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(encode_frame(Command::Ping, "").unwrap(), vec![0xC0]);
        assert_eq!(
            encode_frame(Command::GetRpm, "01").unwrap(),
            vec![0x8A, 0x01]
        );
        assert_eq!(
            encode_frame(Command::SetFan, "01c000000750").unwrap(),
            vec![0x44, 0x01, 0xC0, 0x00, 0x00, 0x07, 0x50]
        );
    }

    #[test]
    fn test_encode_frame_wrong_size() {
        let err = encode_frame(Command::GetRpm, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("Invalid input size."));

        let err = encode_frame(Command::Ping, "00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_encode_frame_bad_hex() {
        assert_eq!(
            encode_frame(Command::GetRpm, "zz").unwrap_err().kind(),
            ErrorKind::InternalError
        );
        assert_eq!(
            encode_frame(Command::GetRpm, "1").unwrap_err().kind(),
            ErrorKind::InternalError
        );
        assert_eq!(
            encode_frame(Command::GetRpm, "é").unwrap_err().kind(),
            ErrorKind::InternalError
        );
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mock = MockConnector::new();
        mock.push_bytes(&[0xC0, 0x00, 0x00, 0x01, 0xC2]);

        let response = engine(&mock).execute(Command::GetRpm, "01").await.unwrap();

        assert_eq!(response, vec![0xC0, 0x00, 0x00, 0x01, 0xC2]);
        assert_eq!(mock.frames(), vec![vec![0x8A, 0x01]]);
        assert_eq!(mock.opened(), 1);
        assert_eq!(mock.released(), 1);
    }

    #[tokio::test]
    async fn test_execute_wrong_size_does_no_io() {
        let mock = MockConnector::new();

        let err = engine(&mock).execute(Command::GetRpm, "").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(mock.opened(), 0);
        assert!(mock.frames().is_empty());
    }

    #[tokio::test]
    async fn test_execute_error_response() {
        let mock = MockConnector::new();
        mock.push_bytes(&[0x02]);

        let err = engine(&mock).execute(Command::GetRpm, "01").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
        assert_eq!(mock.released(), 1);
    }

    #[tokio::test]
    async fn test_execute_no_response() {
        let mock = MockConnector::new();

        let err = engine(&mock).execute(Command::GetRpm, "01").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
        assert_eq!(mock.released(), 1);
    }

    #[tokio::test]
    async fn test_execute_open_failure() {
        let mock = MockConnector::new();
        mock.push(Reply::OpenError);

        let err = engine(&mock).execute(Command::Ping, "").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CommunicationFailure);
        assert!(mock.frames().is_empty());
    }

    #[tokio::test]
    async fn test_execute_write_failure_releases_link() {
        let mock = MockConnector::new();
        mock.push(Reply::WriteError);

        let err = engine(&mock).execute(Command::GetRpm, "01").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CommunicationFailure);
        assert!(err.to_string().contains("Write failed"));
        assert_eq!(mock.opened(), 1);
        assert_eq!(mock.released(), 1);
    }

    #[tokio::test]
    async fn test_execute_read_failure() {
        let mock = MockConnector::new();
        mock.push(Reply::ReadError);

        let err = engine(&mock).execute(Command::Ping, "").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CommunicationFailure);
        assert_eq!(mock.released(), 1);
    }

    #[tokio::test]
    async fn test_each_exchange_opens_fresh_link() {
        let mock = MockConnector::new();
        mock.respond_to(Command::Ping, &[0x21]);
        let engine = engine(&mock);

        for _ in 0..3 {
            engine.execute(Command::Ping, "").await.unwrap();
        }

        assert_eq!(mock.opened(), 3);
        assert_eq!(mock.released(), 3);
    }

    #[test]
    fn test_encode_frame_accepts_upper_case() {
        assert_eq!(
            encode_frame(Command::SetFan, "01C000000C00").unwrap(),
            vec![0x44, 0x01, 0xC0, 0x00, 0x00, 0x0C, 0x00]
        );
    }
}
