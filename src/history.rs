//! Local record of past single-point calculations, stored as JSON Lines.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::material_db::Material;

/// One stored run. Units are those of the calculator form (mm, N·mm, °, MPa).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    pub material: Material,
    pub length: f64,
    pub diameter: f64,
    pub torque: f64,
    pub angle: f64,
    pub effective_modulus: Option<f64>,
    pub timestamp: DateTime<Local>,
}

/// A record before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub material: Material,
    pub length: f64,
    pub diameter: f64,
    pub torque: f64,
    pub angle: f64,
    pub effective_modulus: Option<f64>,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed history record on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("history serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record, stamping it with the next id and the current time.
    pub fn append(&self, record: NewRecord) -> Result<HistoryRecord, HistoryError> {
        let next_id = self.read_records()?.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let stored = HistoryRecord {
            id: next_id,
            material: record.material,
            length: record.length,
            diameter: record.diameter,
            torque: record.torque,
            angle: record.angle,
            effective_modulus: record.effective_modulus,
            timestamp: Local::now(),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&stored)?)?;
        log::debug!("history record {} written to {}", stored.id, self.path.display());
        Ok(stored)
    }

    /// All records, newest first.
    pub fn load_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let mut records = self.read_records()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_records(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| HistoryError::Malformed {
                line: idx + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
