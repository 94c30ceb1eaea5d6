// src/writer/close.rs
use super::degrade::{self, fatal};
use super::session::{CloseReport, SessionState, WriteSession};
use crate::error::{Fbh5Error, Result};
use crate::store::{Array, ArrayStore, Artifact};
use crate::AXIS_LABELS;
use log::{log, warn};

impl<S: ArrayStore> WriteSession<S> {
    /// Close the session.
    ///
    /// The session is [`Closed`](SessionState::Closed) from the first step on,
    /// whatever the outcome. Storage size and axis labels are best-effort; a
    /// failure releasing the view, the array or the artifact stops the close
    /// there and the remaining handles are dropped without an explicit close.
    pub fn close(&mut self) -> Result<CloseReport> {
        if self.state == SessionState::Closed {
            return Err(Fbh5Error::SessionClosed);
        }
        self.state = SessionState::Closed;
        let level = self.progress_level();

        let view = self.view.take();
        let mut array = self.array.take();
        let artifact = self.artifact.take();

        let mut stored_bytes = 0;
        if let Some(array) = array.as_mut() {
            match array.storage_size() {
                Ok(size) => stored_bytes = size,
                Err(err) => warn!("close: storage size unavailable: {}", err),
            }
            for (axis, label) in AXIS_LABELS.iter().enumerate() {
                degrade::set_axis_label(array, axis, label)?;
            }
        }
        let report = CloseReport {
            dumps: self.dump_count,
            integrations: self.offset[0],
            logical_bytes: self.tint_size as u64 * self.extent[0],
            stored_bytes,
        };

        if let (Some(view), Some(array)) = (view, array.as_mut()) {
            array.release(view).map_err(|e| fatal("release view", e))?;
        }
        self.memspace = None;
        if let Some(array) = array {
            array.close().map_err(|e| fatal("close array", e))?;
        }
        if let Some(artifact) = artifact {
            artifact.close().map_err(|e| fatal("close artifact", e))?;
        }

        log!(
            level,
            "close: {} dumps, {} integrations, {} logical bytes, {} stored bytes",
            report.dumps,
            report.integrations,
            report.logical_bytes,
            report.stored_bytes
        );
        if let Some(ratio) = report.compression_ratio() {
            log!(level, "close: compression ratio {:.2}", ratio);
        }
        self.log_context("close", level);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ramp_u8, small_header};
    use crate::writer::SessionOptions;
    use tempfile::TempDir;

    #[test]
    fn test_close_reports_and_locks_session() {
        let dir = TempDir::new().unwrap();
        let header = small_header(16, 1, 8);
        let mut session =
            WriteSession::create(dir.path().join("close.h5"), &header, &SessionOptions::default()).unwrap();
        let tint = session.tint_size();
        session.append(&ramp_u8(0, 5, tint)).unwrap();

        let report = session.close().unwrap();
        assert_eq!(report.dumps, 1);
        assert_eq!(report.integrations, 5);
        assert_eq!(report.logical_bytes, 5 * tint as u64);
        assert!(report.stored_bytes > 0);
        assert_eq!(session.state(), SessionState::Closed);

        assert!(matches!(session.close(), Err(Fbh5Error::SessionClosed)));
        assert!(matches!(session.append(&ramp_u8(0, 1, tint)), Err(Fbh5Error::SessionClosed)));
    }

    #[test]
    fn test_close_without_appends() {
        let dir = TempDir::new().unwrap();
        let header = small_header(32, 1, 4);
        let mut session =
            WriteSession::create(dir.path().join("empty.h5"), &header, &SessionOptions::default()).unwrap();
        let report = session.close().unwrap();
        assert_eq!(report.dumps, 0);
        assert_eq!(report.integrations, 0);
        // The row reserved at open still counts toward the logical size.
        assert_eq!(report.logical_bytes, 16);
    }
}
