use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Returns the newest file in `search_dir` whose name contains `pattern`
/// (case-sensitive substring, non-recursive). Ties keep the first match in
/// directory order so repeated runs pick the same file.
pub fn find_latest_spreadsheet(search_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(search_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if !name.contains(pattern) {
            debug!(file = name, pattern, "pattern not in file name");
            continue;
        }
        if !entry.file_type()?.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        match &newest {
            Some((best, _)) if modified <= *best => {}
            _ => {
                debug!(file = name, "new latest candidate");
                newest = Some((modified, entry.path()));
            }
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| Error::SourceNotFound {
            dir: search_dir.to_path_buf(),
            pattern: pattern.to_string(),
        })
}
