//! Live-reload file watcher.
//!
//! Watches the parent directory of the target file (non-recursively) so
//! that editors which save by replacing the file keep triggering events.
//! Every content or metadata modification of the target turns into one
//! reload broadcast; renames, creations and removals do not.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RelayError;
use crate::service::RelayService;

/// Running watcher. Dropping it stops the watch and ends the forwarding
/// task.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    target: PathBuf,
    task: JoinHandle<()>,
}

impl FileWatcher {
    /// Absolute path of the watched file.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns `true` once the forwarding task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Starts watching `path` and broadcasting a reload on each change.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`RelayError::Watch`] if the path has no file name or the
/// watcher cannot be installed on its directory.
pub fn spawn_file_watcher(path: &Path, service: RelayService) -> Result<FileWatcher, RelayError> {
    let target = std::path::absolute(path)?;
    let file_name = target
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| RelayError::Watch {
            path: target.clone(),
            source: notify::Error::path_not_found().add_path(target.clone()),
        })?;
    let dir = target
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })
    .map_err(|source| RelayError::Watch {
        path: target.clone(),
        source,
    })?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|source| RelayError::Watch {
            path: target.clone(),
            source,
        })?;

    tracing::info!(path = %target.display(), "watching file for changes");

    let task = tokio::spawn(async move {
        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) if is_change_of(&event, &file_name) => {
                    service.file_changed().await;
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "file watch error"),
            }
        }
        tracing::debug!("file watcher stopped");
    });

    Ok(FileWatcher {
        _watcher: watcher,
        target,
        task,
    })
}

/// Returns `true` if `event` is a modification of a file named `file_name`.
#[must_use]
pub fn is_change_of(event: &Event, file_name: &OsStr) -> bool {
    let modified = matches!(
        &event.kind,
        EventKind::Modify(kind) if !matches!(kind, ModifyKind::Name(_))
    );
    modified
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}
