use super::{fmt_layer, FmtLayer};
use crate::logging::config::{LoggingConfig, STATE_DIR};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use dirs_next::home_dir;
use std::fs::{create_dir_all, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::registry::LookupSpan;

/// File name of the log sink inside the log directory.
pub const LOG_FILE_NAME: &str = "ctm-promote.log";

/// Resolve `<log_dir>/ctm-promote.log`.
///
/// Relative directories are anchored at the workspace (or `$HOME` without one)
/// and may not escape it; absolute directories are taken as given.
pub fn log_file_path(config: &LoggingConfig, workspace_root: Option<&Path>) -> Result<PathBuf> {
    let (anchor, anchor_kind) = match workspace_root {
        Some(workspace) => (workspace.to_path_buf(), "workspace"),
        None => (
            home_dir().ok_or_else(|| anyhow!("$HOME directory unavailable"))?,
            "home",
        ),
    };

    let directory = match &config.log_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => {
            let anchor = normalize(&anchor);
            let resolved = normalize(&anchor.join(dir));
            if !resolved.starts_with(&anchor) {
                bail!(
                    "logging.log_dir resolves outside {} {}",
                    anchor_kind,
                    anchor.display()
                );
            }
            resolved
        }
        None => anchor.join(STATE_DIR).join("logs"),
    };
    Ok(directory.join(LOG_FILE_NAME))
}

/// Build the file sink. When disabled the layer discards every event.
pub fn file_layer<S>(log_file: &Path, enabled: bool) -> Result<(FmtLayer<S>, Option<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !enabled {
        return Ok((fmt_layer(BoxMakeWriter::new(io::sink)), None));
    }

    let directory = log_file
        .parent()
        .ok_or_else(|| anyhow!("log file path {} has no parent directory", log_file.display()))?;
    create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    Ok((fmt_layer(BoxMakeWriter::new(writer)), Some(guard)))
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| normalize_lexically(path))
}

/// Resolve `.` and `..` without touching the filesystem, for directories not created yet.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
