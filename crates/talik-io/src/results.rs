//! Results serialization for periodic field output.
//!
//! Each accepted output step appends one [`FieldFrame`] per
//! output-enabled subdomain, serialized with `bincode` as
//! length-prefixed records so a partially written file still yields its
//! complete frames.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use talik_types::{TalikError, TalikResult};

/// A complete solution-field snapshot at one output step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFrame {
    /// Accepted outer step index this frame was written at.
    pub step: u32,
    /// Simulation time (seconds).
    pub time: f64,
    /// Solution field (temperature or displacement).
    pub solution: Vec<f64>,
    /// First time derivative.
    pub rate: Vec<f64>,
    /// Second time derivative; `None` for thermal subdomains.
    pub acceleration: Option<Vec<f64>>,
}

/// Appends frames to a results file.
pub struct ResultsWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    frames_written: u32,
}

impl ResultsWriter {
    /// Creates (truncating) the results file.
    pub fn create(path: &Path) -> TalikResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    /// Appends one frame and flushes it to disk.
    pub fn append(&mut self, frame: &FieldFrame) -> TalikResult<()> {
        let bytes = bincode::serialize(frame)
            .map_err(|e| TalikError::Serialization(format!("Frame serialization failed: {e}")))?;
        self.writer.write_all(&(bytes.len() as u64).to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Path of the results file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads all frames from a results file.
pub fn read_frames(path: &Path) -> TalikResult<Vec<FieldFrame>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut frames = Vec::new();
    loop {
        let mut len_bytes = [0u8; 8];
        match reader.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let len = u64::from_le_bytes(len_bytes) as usize;
        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        let frame = bincode::deserialize(&bytes)
            .map_err(|e| TalikError::Serialization(format!("Frame deserialization failed: {e}")))?;
        frames.push(frame);
    }

    Ok(frames)
}
