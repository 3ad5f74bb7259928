use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// Where finished documents go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Submit to the default printer.
    Print,
    /// Open with the default viewer.
    Preview,
}

/// Production prints from auto-cleaned transient storage; debug previews
/// from a retained local folder so the output can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Production,
    Debug,
}

impl RunMode {
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) if value == "True" || value == "true" || value == "1" => RunMode::Debug,
            _ => RunMode::Production,
        }
    }

    pub fn destination(self) -> DispatchMode {
        match self {
            RunMode::Production => DispatchMode::Print,
            RunMode::Debug => DispatchMode::Preview,
        }
    }

    pub fn transient_storage(self) -> bool {
        matches!(self, RunMode::Production)
    }

    pub fn default_log_filter(self) -> &'static str {
        match self {
            RunMode::Production => "info",
            RunMode::Debug => "debug",
        }
    }
}

/// Debug runs keep their output here for inspection.
const PREVIEW_DIR: &str = ".preview";

/// How long to leave transient files on disk after the last submission.
/// The spooler/viewer reads the file after we return; deleting too early
/// loses the job. A fixed delay is a crude heuristic, not a guarantee.
const SPOOLER_GRACE: Duration = Duration::from_secs(10);

enum WorkDir {
    /// Auto-removed when the dispatcher is finished.
    Transient(TempDir),
    /// Operator-owned; files accumulate across runs.
    Named(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Transient(dir) => dir.path(),
            WorkDir::Named(path) => path,
        }
    }
}

/// Writes rendered documents into a working directory and hands them to
/// the printer or viewer, then tears the directory down (when transient)
/// after a spooler grace period.
pub struct Dispatcher {
    mode: DispatchMode,
    workdir: WorkDir,
    grace: Duration,
}

impl Dispatcher {
    /// `named_dir` (the configured `work-dir`) wins over both defaults; it
    /// is created if needed and never cleaned up. Otherwise production uses
    /// a temp dir and debug uses the local preview folder.
    pub fn new(run_mode: RunMode, named_dir: Option<PathBuf>) -> Result<Self> {
        let workdir = match named_dir {
            Some(dir) => {
                fs::create_dir_all(&dir)?;
                WorkDir::Named(dir)
            }
            None if run_mode.transient_storage() => WorkDir::Transient(TempDir::new()?),
            None => {
                let dir = PathBuf::from(PREVIEW_DIR);
                fs::create_dir_all(&dir)?;
                WorkDir::Named(dir)
            }
        };
        let grace = match workdir {
            WorkDir::Transient(_) => SPOOLER_GRACE,
            // nothing gets deleted, so there is no race to wait out
            WorkDir::Named(_) => Duration::ZERO,
        };
        Ok(Dispatcher {
            mode: run_mode.destination(),
            workdir,
            grace,
        })
    }

    /// Override the spooler grace period (tests use zero).
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Write `document` as `<sanitized title>.pdf` into the working
    /// directory without submitting it.
    pub fn write_document(&self, document: &[u8], title: &str) -> Result<PathBuf> {
        let file_name = format!("{}.pdf", sanitize_title(title));
        let path = self.workdir.path().join(file_name);
        fs::write(&path, document)?;
        debug!(path = %path.display(), "wrote document");
        Ok(path)
    }

    /// Write and submit one document.
    pub fn dispatch(&self, document: &[u8], title: &str) -> Result<PathBuf> {
        let path = self.write_document(document, title)?;
        match self.mode {
            DispatchMode::Print => {
                info!("printing {}", path.display());
                send_to_printer(&path)?;
            }
            DispatchMode::Preview => {
                info!("opening {}", path.display());
                open::that(&path)?;
            }
        }
        Ok(path)
    }

    /// Wait out the grace period, then release the working directory.
    /// Transient storage is removed here; named directories are left alone.
    pub fn finish(self) -> Result<()> {
        if !self.grace.is_zero() {
            info!(
                "waiting {}s for the spooler to pick up the files",
                self.grace.as_secs()
            );
            std::thread::sleep(self.grace);
        }
        if let WorkDir::Transient(dir) = self.workdir {
            dir.close()?;
        }
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
fn send_to_printer(path: &Path) -> Result<()> {
    let status = Command::new("lp").arg(path).status()?;
    if !status.success() {
        return Err(Error::PrintFailed(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn send_to_printer(path: &Path) -> Result<()> {
    let status = Command::new("powershell")
        .args(["-NoProfile", "-Command"])
        .arg(format!(
            "Start-Process -FilePath '{}' -Verb Print",
            path.display()
        ))
        .status()?;
    if !status.success() {
        return Err(Error::PrintFailed(path.to_path_buf()));
    }
    Ok(())
}

/// Session keys come straight from roster cells, so titles can carry
/// characters the filesystem rejects. Replace rather than reject: the
/// printed header still shows the original title.
pub fn sanitize_title(title: &str) -> String {
    let mut out: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    while out.ends_with(['.', ' ']) {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("roster");
    }
    out
}
