//! Append-only results journal with undo.
//!
//! Result events are appended to a JSONL (JSON Lines) file with file
//! locking for safe concurrent access. The journal is the single owner of
//! recorded history; the engine only ever sees the [`ResultsMap`] produced
//! by folding the events in order. Undo removes the newest event and
//! rewrites the file atomically, after which the caller reprojects the
//! whole program - the engine's replay property makes that correct by
//! construction.

use crate::{Error, Result, ResultEvent, ResultsMap};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSONL-backed results journal with file locking
pub struct ResultJournal {
    path: PathBuf,
}

impl ResultJournal {
    /// Create a journal handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one event to the journal
    pub fn append(&self, event: &ResultEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended result event {} to journal", event.id);
        Ok(())
    }

    /// Read all events from the journal in logged order.
    ///
    /// Lines that fail to parse are skipped with a warning rather than
    /// failing the read; an uninterpretable event degrades to "absent".
    pub fn read_events(&self) -> Result<Vec<ResultEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut events = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<ResultEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("Failed to parse event at line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} events from journal", events.len());
        Ok(events)
    }

    /// Fold the journal into the sparse results map the engine consumes
    pub fn results(&self) -> Result<ResultsMap> {
        Ok(fold_events(&self.read_events()?))
    }

    /// Remove the newest event, returning it.
    ///
    /// Rewrites the journal atomically: the remaining events go to a temp
    /// file in the same directory which then replaces the original.
    pub fn undo(&self) -> Result<Option<ResultEvent>> {
        let mut events = self.read_events()?;
        let removed = match events.pop() {
            Some(event) => event,
            None => return Ok(None),
        };

        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Journal("journal path has no parent directory".into()))?;
        let temp = NamedTempFile::new_in(parent)?;

        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for event in &events {
                let line = serde_json::to_string(event)?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(
            "Undid result event {} ({} @ workout {})",
            removed.id,
            removed.slot_id,
            removed.workout
        );
        Ok(Some(removed))
    }
}

/// Fold events in logged order into a results map.
///
/// Later events win per `(workout, slot)`; an event with no entry clears
/// the result.
pub fn fold_events(events: &[ResultEvent]) -> ResultsMap {
    let mut results = ResultsMap::default();
    for event in events {
        match &event.entry {
            Some(entry) => results.set(event.workout, &event.slot_id, entry.clone()),
            None => results.clear(event.workout, &event.slot_id),
        }
    }
    results
}
