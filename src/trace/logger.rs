use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::trace::trace::TraceEvent;

/// Appends one JSON line per resolved submission. A trace file that cannot
/// be opened turns the logger off; it never fails the page.
pub struct TraceLogger {
    sink: Option<Mutex<LineWriter<File>>>,
}

impl TraceLogger {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .inspect_err(|e| warn!("submission trace disabled, cannot open '{}': {}", path.display(), e))
            .ok()
            .map(|file| Mutex::new(LineWriter::new(file)));

        Self { sink }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Write `event` as a single line. Concurrent submissions never
    /// interleave within a line.
    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);

        let written = serde_json::to_writer(&mut *sink, event)
            .map_err(io::Error::from)
            .and_then(|()| sink.write_all(b"\n"));

        if let Err(e) = written {
            warn!(
                form_id = %event.form_id,
                outcome = %event.outcome,
                "failed to record submission trace: {}",
                e
            );
        }
    }
}
