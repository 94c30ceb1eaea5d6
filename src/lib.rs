// src/lib.rs
//! # fbh5-rs
//!
//! Streaming writer for filterbank recordings: radio-astronomy spectra indexed
//! by time, feed (IF) and frequency channel, stored in HDF5 as one chunked,
//! optionally compressed, 3-D dataset named `data` with the recording header
//! mirrored as scalar attributes.
//!
//! ## Features
//!
//! - **Chunk advice**: chunk shapes derived from channel width and sample interval
//! - **Append-only sessions**: one writer per artifact, axis 0 grows with every append
//! - **Degrade, don't fail**: missing compression or rejected cache tuning only warns
//! - **Pluggable store**: the session talks to [`store::ArrayStore`] traits;
//!   [`store::Hdf5Store`] is the bundled HDF5 implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fbh5_rs::*;
//!
//! fn main() -> Result<()> {
//!     let header = Header {
//!         nbits: 32,
//!         nifs: 1,
//!         nchans: 1024,
//!         fch1: 8421.38671875,
//!         foff: -2.7939677238464355e-06,
//!         tsamp: 18.253611008,
//!         source_name: "Voyager1".into(),
//!         ..Default::default()
//!     };
//!
//!     let mut session = WriteSession::create("voyager.h5", &header, &SessionOptions::default())?;
//!     let spectrum = vec![0.0f32; 1024];
//!     for _ in 0..16 {
//!         session.append_samples(&spectrum)?;
//!     }
//!     let report = session.close()?;
//!     println!("{} integrations, ratio {:?}", report.integrations, report.compression_ratio());
//!
//!     let reader = ArtifactReader::open("voyager.h5")?;
//!     let samples: Vec<f32> = reader.read_array_as(DATASET_NAME)?;
//!     assert_eq!(samples.len(), 16 * 1024);
//!     Ok(())
//! }
//! ```

// Modules
pub mod chunking;
pub mod error;
pub mod header;
pub mod reader;
pub mod store;
pub mod types;
pub mod writer;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{Fbh5Error, Result};

pub use types::{AttrValue, Attribute, CacheTuning, ChunkShape, ElementType, Extent, UNLIMITED};

pub use header::Header;

pub use chunking::{advise, advise_for};

pub use writer::{CloseReport, SessionOptions, SessionState, WriteSession};

pub use reader::{ArrayInfo, ArtifactReader};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use fbh5_rs::prelude::*;
    //! ```

    pub use crate::error::{Fbh5Error, Result};
    pub use crate::header::Header;
    pub use crate::reader::ArtifactReader;
    pub use crate::types::{CacheTuning, ChunkShape, ElementType};
    pub use crate::writer::{SessionOptions, WriteSession};
}

/// Format class recorded on every artifact
pub const FORMAT_CLASS: &str = "FILTERBANK";

/// Format version recorded on every artifact
pub const FORMAT_VERSION: &str = "2.0";

/// Name of the spectra array
pub const DATASET_NAME: &str = "data";

/// Labels of axes 0, 1 and 2 of the spectra array
pub const AXIS_LABELS: [&str; 3] = ["time", "feed_id", "frequency"];

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_constants() {
        assert_eq!(FORMAT_CLASS, "FILTERBANK");
        assert_eq!(FORMAT_VERSION, "2.0");
        assert_eq!(DATASET_NAME, "data");
        assert_eq!(AXIS_LABELS, ["time", "feed_id", "frequency"]);
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_element_type_follows_nbits() {
        assert_eq!(ElementType::from_nbits(8), Some(ElementType::B8));
        assert_eq!(ElementType::from_nbits(16), Some(ElementType::B16));
        assert_eq!(ElementType::from_nbits(32), Some(ElementType::F32Le));
        assert_eq!(ElementType::from_nbits(64), Some(ElementType::F64Le));
        assert_eq!(ElementType::from_nbits(12), None);
    }

    #[test]
    fn test_tint_size() {
        let header = Header { nbits: 16, nifs: 2, nchans: 64, ..Default::default() };
        assert_eq!(header.tint_size(), 2 * 64 * 2);
    }
}
