//! Dated output directory next to the sales CSV.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EmitError, EmitResult};

/// `<prefix><YYYY-MM-DD>`, e.g. `Orders_2024-03-01`.
pub fn orders_dir_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}{}", prefix, date.format("%Y-%m-%d"))
}

/// Directory that will hold the artifacts for `source` on `date`.
///
/// Placed under `root` when given, otherwise beside `source`.
pub fn orders_dir(source: &Path, root: Option<&Path>, prefix: &str, date: NaiveDate) -> PathBuf {
    let parent = root
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    parent.join(orders_dir_name(prefix, date))
}

/// Create `dir` and any missing parents. An existing directory is fine.
pub fn ensure_dir(dir: &Path) -> EmitResult<()> {
    fs::create_dir_all(dir).map_err(|source| EmitError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
