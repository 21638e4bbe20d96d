//! Scripted in-memory transport
//!
//! `MockConnector` replays a queue of [`Reply`] values, one per exchange,
//! and records every frame written so tests can assert on exactly what the
//! controller was sent. When the script runs dry it falls back to per-opcode
//! canned responses, and finally to silence (an empty read).

use crate::serial_driver::{SerialConnector, SerialLink};
use async_trait::async_trait;
use gridfan_core::{Command, GridFanError, Result, SerialSettings};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of one scripted exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Device answers with these bytes
    Bytes(Vec<u8>),
    /// Opening the port fails
    OpenError,
    /// Writing the frame fails
    WriteError,
    /// Reading the response fails
    ReadError,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Reply>,
    canned: HashMap<u8, Vec<u8>>,
    frames: Vec<Vec<u8>>,
    opened: usize,
    released: usize,
}

/// Mock transport for testing without hardware
///
/// Cloning shares the underlying script and recordings.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    /// Create an empty mock; every exchange reads back nothing
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the outcome of the next unscripted exchange
    pub fn push(&self, reply: Reply) -> &Self {
        self.state().script.push_back(reply);
        self
    }

    /// Queue a response
    pub fn push_bytes(&self, bytes: &[u8]) -> &Self {
        self.push(Reply::Bytes(bytes.to_vec()))
    }

    /// Answer `command` with `bytes` whenever the script is empty
    pub fn respond_to(&self, command: Command, bytes: &[u8]) -> &Self {
        self.state().canned.insert(command.opcode(), bytes.to_vec());
        self
    }

    /// Every frame written, in order
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state().frames.clone()
    }

    /// Frames written for one command
    pub fn frames_for(&self, command: Command) -> Vec<Vec<u8>> {
        self.state()
            .frames
            .iter()
            .filter(|frame| frame.first() == Some(&command.opcode()))
            .cloned()
            .collect()
    }

    /// Number of frames written for one command
    pub fn count(&self, command: Command) -> usize {
        self.frames_for(command).len()
    }

    /// Links opened so far
    pub fn opened(&self) -> usize {
        self.state().opened
    }

    /// Links dropped so far
    pub fn released(&self) -> usize {
        self.state().released
    }

    /// Scripted replies not consumed yet
    pub fn pending(&self) -> usize {
        self.state().script.len()
    }
}

#[async_trait]
impl SerialConnector for MockConnector {
    async fn open(&self, _settings: &SerialSettings) -> Result<Box<dyn SerialLink>> {
        let mut state = self.state();
        if state.script.front() == Some(&Reply::OpenError) {
            state.script.pop_front();
            return Err(GridFanError::CommunicationFailure(
                "Failed to initialise a connection with the controller.".to_string(),
            ));
        }

        state.opened += 1;
        Ok(Box::new(MockLink {
            state: Arc::clone(&self.state),
            opcode: None,
        }))
    }
}

struct MockLink {
    state: Arc<Mutex<MockState>>,
    opcode: Option<u8>,
}

impl MockLink {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SerialLink for MockLink {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.opcode = bytes.first().copied();

        let mut state = self.state();
        state.frames.push(bytes.to_vec());
        if state.script.front() == Some(&Reply::WriteError) {
            state.script.pop_front();
            return Err(GridFanError::CommunicationFailure(
                "Write failed: mock write error".to_string(),
            ));
        }
        Ok(bytes.len())
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        let opcode = self.opcode;
        let mut state = self.state();

        let next = state.script.pop_front();
        let mut response = match next {
            Some(Reply::Bytes(bytes)) => bytes,
            Some(Reply::ReadError) => {
                return Err(GridFanError::CommunicationFailure(
                    "Read error: mock read error".to_string(),
                ))
            }
            // Open/write failures belong to a later exchange
            Some(other) => {
                state.script.push_front(other);
                Vec::new()
            }
            None => opcode
                .and_then(|op| state.canned.get(&op).cloned())
                .unwrap_or_default(),
        };

        response.truncate(len);
        Ok(response)
    }
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.state().released += 1;
    }
}
