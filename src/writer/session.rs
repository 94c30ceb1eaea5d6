// src/writer/session.rs
use crate::header::Header;
use crate::store::{Array, ArrayStore, Artifact, Hdf5Store, MemorySpace};
use crate::types::{ChunkShape, ElementType, Extent};
use log::{log, Level};

pub(super) type ArrayOf<S> = <<S as ArrayStore>::Artifact as Artifact>::Array;
pub(super) type ViewOf<S> = <ArrayOf<S> as Array>::View;

/// Lifecycle of a [`WriteSession`]. A session that failed to open never exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting appends
    Open,
    /// An append failed; only close is allowed
    Faulted,
    Closed,
}

/// Summary returned by [`WriteSession::close`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseReport {
    pub dumps: u64,
    pub integrations: u64,
    /// Integration size times the final axis-0 extent
    pub logical_bytes: u64,
    /// Physical bytes reported by the store, 0 if it could not tell
    pub stored_bytes: u64,
}

impl CloseReport {
    /// Logical over stored bytes, `None` when nothing was stored
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.stored_bytes == 0 {
            None
        } else {
            Some(self.logical_bytes as f64 / self.stored_bytes as f64)
        }
    }
}

/// Single-writer session streaming spectra into one `data` array.
///
/// The session exclusively owns the artifact and array handles of its store.
/// Any failed append poisons it; [`close`](Self::close) is always allowed once
/// and releases the handles in view, array, artifact order. Dropping a session
/// that was not closed closes it on a best-effort basis.
pub struct WriteSession<S: ArrayStore = Hdf5Store> {
    pub(super) header: Header,
    pub(super) element: ElementType,
    pub(super) elem_size: usize,
    pub(super) tint_size: usize,
    pub(super) chunk_shape: ChunkShape,
    pub(super) compressed: bool,
    pub(super) offset: Extent,
    pub(super) extent: Extent,
    pub(super) byte_count: u64,
    pub(super) dump_count: u64,
    pub(super) state: SessionState,
    pub(super) verbose: bool,
    pub(super) memspace: Option<MemorySpace>,
    pub(super) view: Option<ViewOf<S>>,
    pub(super) array: Option<ArrayOf<S>>,
    pub(super) artifact: Option<S::Artifact>,
}

impl<S: ArrayStore> WriteSession<S> {
    /// Header snapshot taken at open
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn element_type(&self) -> ElementType {
        self.element
    }

    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Bytes in one time integration: `nifs * nchans * elem_size`
    pub fn tint_size(&self) -> usize {
        self.tint_size
    }

    pub fn chunk_shape(&self) -> ChunkShape {
        self.chunk_shape
    }

    /// Whether the block compression filter is on for the array
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Next write position; only axis 0 ever moves
    pub fn offset(&self) -> Extent {
        self.offset
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn dump_count(&self) -> u64 {
        self.dump_count
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_usable(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Progress level for diagnostics
    pub(super) fn progress_level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }

    pub(super) fn log_context(&self, caller: &str, level: Level) {
        log!(level, "{}: state={:?} usable={}", caller, self.state, self.is_usable());
        log!(
            level,
            "{}: elem_size={} tint_size={} element={} chunk={} compressed={}",
            caller,
            self.elem_size,
            self.tint_size,
            self.element.name(),
            self.chunk_shape,
            self.compressed
        );
        log!(
            level,
            "{}: offset={:?} extent={:?} byte_count={} dump_count={}",
            caller,
            self.offset,
            self.extent,
            self.byte_count,
            self.dump_count
        );
    }
}

impl<S: ArrayStore> Drop for WriteSession<S> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            let _ = self.close();
        }
    }
}

impl<S: ArrayStore> std::fmt::Debug for WriteSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSession")
            .field("element", &self.element)
            .field("tint_size", &self.tint_size)
            .field("chunk_shape", &self.chunk_shape)
            .field("offset", &self.offset)
            .field("extent", &self.extent)
            .field("byte_count", &self.byte_count)
            .field("dump_count", &self.dump_count)
            .field("state", &self.state)
            .finish()
    }
}
