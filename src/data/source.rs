//! Where raw snapshots come from.

use std::path::PathBuf;

use crate::data::raw::RawSnapshot;
use crate::error::AppError;
use crate::io::ingest::load_snapshot_dir;

/// Produces a fresh, complete raw snapshot on each call.
pub trait SnapshotSource {
    fn fetch(&self) -> Result<RawSnapshot, AppError>;

    /// Short description for logs and report headers.
    fn describe(&self) -> String;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Box<T> {
    fn fetch(&self) -> Result<RawSnapshot, AppError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A caller-supplied snapshot directory holding the feed files.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    dir: PathBuf,
}

impl LocalDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotSource for LocalDirSource {
    fn fetch(&self) -> Result<RawSnapshot, AppError> {
        load_snapshot_dir(&self.dir)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Pick the source for a run: an explicit directory, `LEVITT_DATA_DIR`, or the network.
pub fn source_for(data_dir: Option<PathBuf>) -> Box<dyn SnapshotSource + Send + Sync> {
    dotenvy::dotenv().ok();
    let dir = data_dir.or_else(|| std::env::var_os("LEVITT_DATA_DIR").map(PathBuf::from));
    match dir {
        Some(dir) => Box::new(LocalDirSource::new(dir)),
        None => Box::new(crate::data::covid19india::Covid19IndiaClient::from_env()),
    }
}
