//! Progress-file persistence (added, §5, §6, §8). A thin,
//! external-collaborator-shaped module: `{sid}_list`, `{sid}_status` and
//! `{sid}_data` under a configured running directory, one UTF-8 JSON
//! document per line, guarded by an exclusive advisory lock held for the
//! whole read-modify-write window (the teacher's `cr-web::storage`
//! idiom, built here on `fs2` rather than a database).

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tg_core::{AnalysisError, Finding, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStatus {
    pub state: ScanState,
    pub completed_rules: usize,
    pub total_rules: usize,
}

pub struct Session {
    dir: PathBuf,
    sid: String,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>, sid: impl Into<String>) -> Self {
        Self { dir: dir.into(), sid: sid.into() }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}", self.sid, suffix))
    }

    /// Seed the rule-id list a scan will walk, so a poller can compute
    /// percent-complete against `_status` without re-deriving it.
    pub fn init_list(&self, rule_ids: &[String]) -> Result<()> {
        write_locked(&self.path("list"), rule_ids)
    }

    pub fn write_status(&self, status: &ScanStatus) -> Result<()> {
        write_locked(&self.path("status"), status)
    }

    pub fn read_status(&self) -> Result<ScanStatus> {
        read_locked(&self.path("status"))
    }

    pub fn write_data(&self, findings: &[Finding]) -> Result<()> {
        write_locked(&self.path("data"), findings)
    }

    pub fn read_data(&self) -> Result<Vec<Finding>> {
        read_locked(&self.path("data"))
    }
}

/// Open for read-write, take an exclusive lock for the entire
/// truncate-then-replace window, and drop the lock only once the new
/// content is durable on disk.
fn write_locked<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(AnalysisError::from)?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .map_err(AnalysisError::from)?;

    file.lock_exclusive().map_err(|e| AnalysisError::progress_io_error(format!("{}: {}", path.display(), e)))?;

    let json = serde_json::to_string(value).map_err(AnalysisError::from)?;
    file.set_len(0).map_err(AnalysisError::from)?;
    file.seek(SeekFrom::Start(0)).map_err(AnalysisError::from)?;
    file.write_all(json.as_bytes()).map_err(AnalysisError::from)?;
    file.sync_all().map_err(AnalysisError::from)?;

    FileExt::unlock(&file).map_err(|e| AnalysisError::progress_io_error(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

fn read_locked<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let mut file = OpenOptions::new().read(true).open(path).map_err(AnalysisError::from)?;
    file.lock_shared().map_err(|e| AnalysisError::progress_io_error(format!("{}: {}", path.display(), e)))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(AnalysisError::from)?;
    FileExt::unlock(&file).map_err(|e| AnalysisError::progress_io_error(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&contents).map_err(AnalysisError::from)
}
