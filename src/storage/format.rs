//! Binary snapshot format for trained lattices.
//!
//! ## Format Layout
//!
//! ```text
//! +------------------+
//! | Header (8 bytes) |
//! +------------------+
//! | Lattice (bincode)|
//! | (variable)       |
//! +------------------+
//! ```
//!
//! ### Header (8 bytes)
//! - Magic number (4 bytes): "KSOM"
//! - Version (2 bytes, little endian)
//! - Reserved (2 bytes)
//!
//! ### Lattice
//! - Configuration, weight matrix, winner histogram, quantization-error
//!   history, trajectory, calibration labels and RNG state.

use crate::error::{KohonenError, Result};
use crate::som::{Grid, Som, Strategy};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for Kohonen snapshot files.
const MAGIC: &[u8; 4] = b"KSOM";

/// Current format version.
const VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 8;

/// Reader and writer for lattice snapshots.
pub struct SnapshotFormat;

impl SnapshotFormat {
    /// Writes a lattice snapshot to `path`.
    pub fn write<L: Serialize, P: AsRef<Path>>(path: P, som: &Som<L>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        let mut header = [0u8; HEADER_SIZE];
        header[..4].copy_from_slice(MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_le_bytes());
        writer.write_all(&header)?;

        bincode::serialize_into(&mut writer, som)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a lattice snapshot from `path`.
    pub fn read<L: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Som<L>> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(|_| {
            KohonenError::InvalidSnapshot("File too short for header".to_string())
        })?;

        if &header[..4] != MAGIC {
            return Err(KohonenError::InvalidSnapshot("Bad magic number".to_string()));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(KohonenError::InvalidSnapshot(format!(
                "Unsupported version {} (expected {})",
                version, VERSION
            )));
        }

        let som: Som<L> = bincode::deserialize_from(&mut reader)?;
        som.check_consistency()?;
        Ok(som)
    }
}

impl<L> Som<L> {
    /// Verifies that the stored state agrees with the stored configuration.
    fn check_consistency(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| KohonenError::InvalidSnapshot(e.to_string()))?;

        let n_units = self.config.total_units();
        if self.weights.dim() != (n_units, self.config.dw)
            || self.winner_histogram.len() != n_units
            || self.grid.len() != n_units
        {
            return Err(KohonenError::InvalidSnapshot(format!(
                "State does not match {}x{}x{} lattice",
                self.config.dx, self.config.dy, self.config.dw
            )));
        }

        let expected_grid = if self.config.toroidal {
            Grid::toroidal(self.config.dx, self.config.dy)
        } else {
            Grid::new(self.config.dx, self.config.dy)
        };
        if self.grid != expected_grid {
            return Err(KohonenError::InvalidSnapshot(format!(
                "Grid {}x{} (toroidal: {}) does not match configuration",
                self.grid.dx(),
                self.grid.dy(),
                self.grid.is_toroidal()
            )));
        }

        if self.strategy != Strategy::for_variant(self.config.variant, self.config.metric) {
            return Err(KohonenError::InvalidSnapshot(format!(
                "Strategy {:?} does not match {} variant with {} metric",
                self.strategy, self.config.variant, self.config.metric
            )));
        }

        if let Some(labels) = &self.calibration {
            if labels.len() != n_units {
                return Err(KohonenError::InvalidSnapshot(format!(
                    "Calibration has {} labels for {} units",
                    labels.len(),
                    n_units
                )));
            }
        }
        Ok(())
    }
}

impl<L: Serialize> Som<L> {
    /// Saves the lattice to a binary snapshot.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        SnapshotFormat::write(path, self)
    }
}

impl<L: DeserializeOwned> Som<L> {
    /// Loads a lattice from a binary snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        SnapshotFormat::read(path)
    }
}
