// src/writer/append.rs
use super::degrade::fatal;
use super::session::{SessionState, WriteSession};
use crate::error::{Fbh5Error, Result};
use crate::store::{Array, ArrayStore, Selection};
use crate::types::Extent;
use bytemuck::Pod;
use log::{error, log};
use std::time::Instant;

impl<S: ArrayStore> WriteSession<S> {
    /// Append one or more time integrations.
    ///
    /// `buffer` must hold a whole, non-zero number of integrations laid out as
    /// `[time][ifs][chans]` in the element type fixed at open. Any failure
    /// leaves the session [`Faulted`](SessionState::Faulted).
    pub fn append(&mut self, buffer: &[u8]) -> Result<()> {
        match self.state {
            SessionState::Open => {}
            SessionState::Faulted => return Err(Fbh5Error::SessionUnusable),
            SessionState::Closed => return Err(Fbh5Error::SessionClosed),
        }
        let started = Instant::now();

        if buffer.is_empty() || buffer.len() % self.tint_size != 0 {
            let err = Fbh5Error::InvalidBufferSize { len: buffer.len(), tint_size: self.tint_size };
            error!("append: {}", err);
            return Err(self.poison(err));
        }
        let count = (buffer.len() / self.tint_size) as u64;

        // The extent reserved at open already holds the first integration.
        let delta = if self.offset[0] == 0 { count - 1 } else { count };
        let mut extent = self.extent;
        extent[0] += delta;

        if let Err(err) = self.write_block(buffer, count, extent) {
            return Err(self.poison(err));
        }

        self.byte_count += buffer.len() as u64;
        self.dump_count += 1;

        let level = self.progress_level();
        log!(
            level,
            "append: dump {} of {} integrations, offset now {}, {:.3} ms",
            self.dump_count,
            count,
            self.offset[0],
            started.elapsed().as_secs_f64() * 1e3
        );
        Ok(())
    }

    /// [`append`](Self::append) for a typed sample slice. A sample width that
    /// differs from the element size fixed at open faults the session like any
    /// other rejected buffer.
    pub fn append_samples<T: Pod>(&mut self, samples: &[T]) -> Result<()> {
        match self.state {
            SessionState::Open => {}
            SessionState::Faulted => return Err(Fbh5Error::SessionUnusable),
            SessionState::Closed => return Err(Fbh5Error::SessionClosed),
        }
        let sample_size = std::mem::size_of::<T>();
        if sample_size != self.elem_size {
            let err = Fbh5Error::SampleWidthMismatch { sample_size, elem_size: self.elem_size };
            error!("append: {} ({})", err, self.element.name());
            return Err(self.poison(err));
        }
        self.append(bytemuck::cast_slice(samples))
    }

    fn write_block(&mut self, buffer: &[u8], count: u64, extent: Extent) -> Result<()> {
        let array = self.array.as_mut().ok_or(Fbh5Error::SessionClosed)?;
        let memspace = self.memspace.as_mut().ok_or(Fbh5Error::SessionClosed)?;

        array.set_extent(extent).map_err(|e| fatal("extend array", e))?;
        self.extent = extent;

        let shape = [count, extent[1], extent[2]];
        memspace.reshape(shape, extent).map_err(|e| fatal("reshape memory space", e))?;

        let selection = Selection::new([self.offset[0], 0, 0], shape);
        log!(
            if self.verbose { log::Level::Info } else { log::Level::Debug },
            "append: selection offset={:?} shape={:?} extent={:?}",
            selection.offset,
            selection.shape,
            extent
        );
        let view = array.select(selection).map_err(|e| fatal("select view", e))?;

        if let Err(err) = array.write(&view, memspace, self.element, buffer) {
            self.view = Some(view);
            return Err(fatal("write block", err));
        }
        self.offset[0] += count;

        array.release(view).map_err(|e| fatal("release view", e))
    }

    fn poison(&mut self, err: Fbh5Error) -> Fbh5Error {
        self.state = SessionState::Faulted;
        self.log_context("append", log::Level::Info);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ramp_u8, small_header};
    use crate::writer::SessionOptions;
    use tempfile::TempDir;

    fn open_u8(dir: &TempDir) -> WriteSession {
        let header = small_header(8, 2, 16);
        WriteSession::create(dir.path().join("append.h5"), &header, &SessionOptions::default()).unwrap()
    }

    #[test]
    fn test_first_append_reuses_reserved_row() {
        let dir = TempDir::new().unwrap();
        let mut session = open_u8(&dir);
        let tint = session.tint_size();
        assert_eq!(tint, 32);

        session.append(&ramp_u8(0, 1, tint)).unwrap();
        assert_eq!(session.extent(), [1, 2, 16]);
        assert_eq!(session.offset(), [1, 0, 0]);

        session.append(&ramp_u8(1, 3, tint)).unwrap();
        assert_eq!(session.extent()[0], 4);
        assert_eq!(session.offset()[0], 4);
        assert_eq!(session.byte_count(), 4 * tint as u64);
        assert_eq!(session.dump_count(), 2);
    }

    #[test]
    fn test_bad_length_poisons_session() {
        let dir = TempDir::new().unwrap();
        let mut session = open_u8(&dir);

        let err = session.append(&[0u8; 33]).unwrap_err();
        assert!(matches!(err, Fbh5Error::InvalidBufferSize { len: 33, tint_size: 32 }));
        assert_eq!(session.state(), SessionState::Faulted);
        assert_eq!(session.offset()[0], 0);

        let err = session.append(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, Fbh5Error::SessionUnusable));
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let dir = TempDir::new().unwrap();
        let mut session = open_u8(&dir);
        assert!(matches!(session.append(&[]), Err(Fbh5Error::InvalidBufferSize { len: 0, .. })));
        assert!(!session.is_usable());
    }

    #[test]
    fn test_append_samples_width_mismatch_faults_session() {
        let dir = TempDir::new().unwrap();
        let mut session = open_u8(&dir);
        session.append_samples(&[7u8; 64]).unwrap();

        let err = session.append_samples(&[0.0f32; 32]).unwrap_err();
        assert!(matches!(err, Fbh5Error::SampleWidthMismatch { sample_size: 4, elem_size: 1 }));
        assert_eq!(session.state(), SessionState::Faulted);
        assert_eq!(session.offset()[0], 2);
        assert_eq!(session.dump_count(), 1);

        assert!(matches!(session.append_samples(&[7u8; 32]), Err(Fbh5Error::SessionUnusable)));
        assert!(matches!(session.append(&[7u8; 32]), Err(Fbh5Error::SessionUnusable)));
    }
}
