//! Append-only interaction log.
//!
//! Events are persisted as CSV rows (`user_id,activity_id,event,rating`) and
//! mirrored in memory. The in-memory side answers two questions:
//! which activities a user has seen, and what the full event history is
//! (the training input for the latent factor store).

use crate::error::{DataLoadError, Result};
use crate::parser::{self, format_field};
use crate::types::{ActivityId, InteractionEvent, UserId};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER: &str = "user_id,activity_id,event,rating";

#[derive(Debug, Default)]
struct LogState {
    events: Vec<InteractionEvent>,
    seen: HashMap<UserId, HashSet<ActivityId>>,
}

impl LogState {
    fn push(&mut self, event: InteractionEvent) {
        self.seen
            .entry(event.user_id.clone())
            .or_default()
            .insert(event.activity_id.clone());
        self.events.push(event);
    }
}

/// File-backed, append-only record of user-activity events.
#[derive(Debug)]
pub struct InteractionLog {
    path: Option<PathBuf>,
    state: RwLock<LogState>,
    /// Serializes file appends so rows never interleave
    writer: Mutex<()>,
}

impl InteractionLog {
    /// Open the log at `path`, loading any existing events.
    ///
    /// A missing file is an empty log; it is created on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let events = if path.exists() {
            parser::parse_interactions(&path)?
        } else {
            Vec::new()
        };
        info!("Opened interaction log {:?} ({} events)", path, events.len());
        Ok(Self::with_events(Some(path), events))
    }

    /// Log that lives only in memory (tests, evaluation splits)
    pub fn in_memory(events: Vec<InteractionEvent>) -> Self {
        Self::with_events(None, events)
    }

    fn with_events(path: Option<PathBuf>, events: Vec<InteractionEvent>) -> Self {
        let mut state = LogState::default();
        for event in events {
            state.push(event);
        }
        Self {
            path,
            state: RwLock::new(state),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Validate and append one event.
    ///
    /// The row is written to disk before the in-memory view changes, so a
    /// failed write leaves both sides untouched.
    pub fn append(&self, event: InteractionEvent) -> Result<()> {
        event.validate()?;

        let _guard = self.writer.lock();
        if let Some(path) = &self.path {
            append_row(path, &event)?;
        }
        debug!(
            user_id = %event.user_id,
            activity_id = %event.activity_id,
            event = %event.event,
            "Interaction logged"
        );
        self.state.write().push(event);
        Ok(())
    }

    /// Point-in-time copy of the activities a user has any event against
    pub fn seen_by(&self, user_id: &str) -> HashSet<ActivityId> {
        self.state.read().seen.get(user_id).cloned().unwrap_or_default()
    }

    /// Snapshot of the full event history, in log order
    pub fn events(&self) -> Vec<InteractionEvent> {
        self.state.read().events.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether the file's last byte is something other than a newline.
/// Empty and missing files count as terminated.
fn has_unterminated_line(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let mut file = File::open(path)?;
    if file.seek(SeekFrom::End(0))? == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn append_row(path: &Path, event: &InteractionEvent) -> Result<()> {
    let needs_header = !path.exists() || path.metadata().map(|m| m.len() == 0).unwrap_or(true);
    let needs_newline = has_unterminated_line(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => DataLoadError::IoError(e),
        })?;

    let mut row = String::new();
    if needs_newline {
        row.push('\n');
    }
    if needs_header {
        row.push_str(HEADER);
        row.push('\n');
    }
    row.push_str(&format!(
        "{},{},{},{}\n",
        format_field(&event.user_id),
        format_field(&event.activity_id),
        event.event,
        event.rating.map(|r| r.to_string()).unwrap_or_default()
    ));
    file.write_all(row.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.csv");

        let log = InteractionLog::open(&path).unwrap();
        assert!(log.is_empty());

        log.append(InteractionEvent::new("u1", "a1", EventKind::View))
            .unwrap();
        log.append(InteractionEvent::new("u1", "a2", EventKind::Rate).with_rating(4))
            .unwrap();

        let reopened = InteractionLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.events()[1].rating, Some(4));
        assert!(reopened.seen_by("u1").contains("a2"));
    }

    #[test]
    fn test_append_after_unterminated_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.csv");
        std::fs::write(&path, "user_id,activity_id,event,rating\nu1,a1,view,").unwrap();

        let log = InteractionLog::open(&path).unwrap();
        log.append(InteractionEvent::new("u2", "a2", EventKind::View))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "user_id,activity_id,event,rating\nu1,a1,view,\nu2,a2,view,\n"
        );
        let reopened = InteractionLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.seen_by("u2").contains("a2"));
    }

    #[test]
    fn test_rate_without_rating_rejected() {
        let log = InteractionLog::in_memory(Vec::new());
        let err = log
            .append(InteractionEvent::new("u1", "a1", EventKind::Rate))
            .unwrap_err();
        assert!(err.to_string().contains("Rating must be provided"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_seen_set_any_event_kind() {
        let log = InteractionLog::in_memory(vec![
            InteractionEvent::new("u1", "a1", EventKind::Click),
            InteractionEvent::new("u1", "a3", EventKind::Like),
            InteractionEvent::new("u2", "a2", EventKind::View),
        ]);

        let seen = log.seen_by("u1");
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("a1") && seen.contains("a3"));
        assert!(log.seen_by("unknown").is_empty());
    }

    #[test]
    fn test_ids_with_commas_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.csv");
        let log = InteractionLog::open(&path).unwrap();
        log.append(InteractionEvent::new("user, one", "a1", EventKind::Like))
            .unwrap();

        let reopened = InteractionLog::open(&path).unwrap();
        assert_eq!(reopened.events()[0].user_id, "user, one");
    }
}
