//! Raw generator replies, kept on disk for a month.
//!
//! Each reply lands in `{data_dir}/_audit/` under a name that starts with
//! its UTC date, so pruning reads the age from the name and never from file
//! metadata. Files without a date prefix are left alone.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::util::atomic_write_str;

pub const KEEP_DAYS: i64 = 30;

const DATE_PREFIX: &str = "%Y-%m-%d";

pub struct PlanArchive {
    dir: PathBuf,
}

impl PlanArchive {
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("_audit"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store one raw reply and return its path.
    pub fn save(&self, raw: &str, at: DateTime<Utc>) -> io::Result<PathBuf> {
        let name = format!("{}_plan.txt", at.format("%Y-%m-%d_%H%M%S%.3f"));
        let path = self.dir.join(name);
        atomic_write_str(&path, raw)?;
        Ok(path)
    }

    /// Remove replies dated more than [`KEEP_DAYS`] before `today`.
    pub fn prune(&self, today: NaiveDate) -> io::Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let cutoff = today - Duration::days(KEEP_DAYS);

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(date) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(archived_on)
            else {
                continue;
            };
            if date < cutoff && path.is_file() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn archived_on(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..10)?;
    NaiveDate::parse_from_str(prefix, DATE_PREFIX).ok()
}
