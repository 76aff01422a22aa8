//! Hands per-tick snapshots to whatever renders or records the run.
//!
//! A [`Serializer`] turns a [`Snapshot`] into one line of text and a
//! [`Sender`] delivers that line. The [`TransportController`] pairs the two
//! and decides which ticks are published.

use log::{debug, info};
use pollinate_config::{SenderType, SerializerType, TransportConfig};
use pollinate_core::{Simulation, Snapshot};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

// --- Traits ---

/// Serializes a snapshot into a single line of text.
pub trait Serializer: Send + Sync {
    fn serialize(&self, snapshot: &Snapshot) -> Result<String, TransportError>;
}

/// Sends serialized data to a destination.
pub trait Sender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flushes buffered output. A no-op for unbuffered senders.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

// --- Serializers ---

pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, snapshot: &Snapshot) -> Result<String, TransportError> {
        Ok(serde_json::to_string(snapshot)?)
    }
}

/// Encodes snapshots with bincode, then base64 so every snapshot stays one
/// printable line.
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn serialize(&self, snapshot: &Snapshot) -> Result<String, TransportError> {
        let buffer = bincode::serialize(snapshot)?;
        Ok(base64::encode(&buffer))
    }
}

// --- Senders ---

/// Writes each payload as a line on standard output.
pub struct StdioSender {
    stdout: io::Stdout,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender { stdout: io::stdout() }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut handle = self.stdout.lock();
        handle.write_all(data)?;
        handle.write_all(b"\n")?;
        handle.flush()?;
        Ok(())
    }
}

/// Appends each payload as a line to a file.
pub struct FileSender {
    writer: BufWriter<File>,
}

impl FileSender {
    pub fn create(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSender {
            writer: BufWriter::new(file),
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards everything. Used for headless runs that only want the summary.
#[derive(Default)]
pub struct NullSender;

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }
}

// --- Controller ---

pub struct TransportController {
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
    every_n_ticks: u64,
    published: u64,
}

impl TransportController {
    pub fn new(serializer: Box<dyn Serializer>, sender: Box<dyn Sender>, every_n_ticks: u64) -> Self {
        Self {
            serializer,
            sender,
            every_n_ticks: every_n_ticks.max(1),
            published: 0,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let serializer: Box<dyn Serializer> = match config.serializer.serializer_type {
            SerializerType::Json => Box::new(JsonSerializer),
            SerializerType::Binary => Box::new(BinarySerializer),
        };

        let sender: Box<dyn Sender> = match config.sender.sender_type {
            SenderType::Stdio => Box::new(StdioSender::new()),
            SenderType::Null => Box::new(NullSender),
            SenderType::File => {
                let path = config.sender.path.as_deref().ok_or_else(|| {
                    TransportError::Configuration("file sender needs a path".to_string())
                })?;
                info!("Writing snapshots to {}", path.display());
                Box::new(FileSender::create(path)?)
            }
        };

        debug!(
            "Transport: {:?} over {:?}, every {} ticks",
            config.serializer.serializer_type, config.sender.sender_type, config.every_n_ticks
        );
        Ok(Self::new(serializer, sender, u64::from(config.every_n_ticks)))
    }

    /// Sends a snapshot of `simulation` if its current tick is due. Returns
    /// whether anything was sent.
    pub fn publish(&mut self, simulation: &Simulation) -> Result<bool, TransportError> {
        if simulation.tick() % self.every_n_ticks != 0 {
            return Ok(false);
        }
        let payload = self.serializer.serialize(&simulation.snapshot())?;
        self.sender.send(payload.as_bytes())?;
        self.published += 1;
        Ok(true)
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.sender.flush()
    }
}
