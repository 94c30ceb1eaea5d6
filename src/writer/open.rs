// src/writer/open.rs
use super::degrade::{self, fatal};
use super::options::SessionOptions;
use super::session::{SessionState, WriteSession};
use crate::chunking;
use crate::error::{Fbh5Error, Result};
use crate::header::Header;
use crate::store::{ArrayLayout, ArrayStore, Artifact, Hdf5Store, MemorySpace};
use crate::types::{AttrValue, UNLIMITED};
use crate::{DATASET_NAME, FORMAT_CLASS, FORMAT_VERSION, LIBRARY_VERSION};
use log::{error, log, warn};
use std::path::Path;

impl WriteSession<Hdf5Store> {
    /// Open a session on an HDF5 file using the default [`Hdf5Store`].
    pub fn create(path: impl AsRef<Path>, header: &Header, options: &SessionOptions) -> Result<Self> {
        Self::open(&Hdf5Store::new(), path, header, options)
    }
}

impl<S: ArrayStore> WriteSession<S> {
    /// Create the artifact at `path` (overwriting it) and its `data` array.
    ///
    /// Header problems and failures to create the artifact or the array abort
    /// the open. Missing compression, rejected cache tuning and attribute write
    /// failures are logged as warnings and the session opens anyway.
    pub fn open(store: &S, path: impl AsRef<Path>, header: &Header, options: &SessionOptions) -> Result<Self> {
        let path = path.as_ref();
        let verbose = options.verbose;
        let level = if verbose { log::Level::Info } else { log::Level::Debug };

        if let Err(err) = header.validate() {
            error!("open: {}", err);
            return Err(err);
        }
        if let Some(shape) = options.chunk_shape {
            if !shape.is_positive() {
                let err = Fbh5Error::validation("chunk_shape", format!("{} has a zero dimension", shape));
                error!("open: {}", err);
                return Err(err);
            }
        }
        let element = header
            .element_type()
            .ok_or_else(|| Fbh5Error::validation("nbits", format!("{} has no element type", header.nbits)))?;
        let elem_size = element.size();
        let tint_size = header.tint_size();
        let nifs = header.nifs as u64;
        let nchans = header.nchans as u64;

        let mut artifact = store.create(path).map_err(|e| fatal("create artifact", e))?;
        log!(level, "open: created {}", path.display());

        let compressed = store.compression_available();
        if !compressed {
            warn!("open: block compression filter unavailable, data will be stored uncompressed");
        }

        let identification: [(&str, AttrValue); 5] = [
            ("CLASS", FORMAT_CLASS.into()),
            ("VERSION", FORMAT_VERSION.into()),
            ("LIBFBH5", LIBRARY_VERSION.into()),
            ("LIBSTORE", store.version().into()),
            ("COMPRESSION", (if compressed { "ENABLED" } else { "DISABLED" }).into()),
        ];
        for (name, value) in identification {
            degrade::set_attr(&mut artifact, name, value, verbose)?;
        }

        let extent = [1, nifs, nchans];
        let chunk_shape = options.chunk_shape.unwrap_or_else(|| chunking::advise_for(header));
        log!(level, "open: chunk shape {}", chunk_shape);

        let layout = ArrayLayout {
            element,
            extent,
            max_extent: [UNLIMITED, nifs, nchans],
            chunk: chunk_shape,
            compression: compressed,
        };
        let mut array = artifact
            .create_array(DATASET_NAME, &layout)
            .map_err(|e| fatal("create array", e))?;
        log!(level, "open: array {} stores {} elements", DATASET_NAME, element.name());

        match &options.cache {
            Some(tuning) => {
                if let Err(err) = artifact.set_cache(tuning) {
                    warn!("open: cache tuning {:?} rejected, default caching remains: {}", tuning, err);
                }
            }
            None => log!(level, "open: default chunk caching"),
        }

        for attr in header.attributes() {
            degrade::set_attr(&mut array, &attr.name, attr.value, verbose)?;
        }

        let memspace = MemorySpace::new(extent, extent).map_err(|e| fatal("create memory space", e))?;

        let session = WriteSession {
            header: header.clone(),
            element,
            elem_size,
            tint_size,
            chunk_shape,
            compressed,
            offset: [0, 0, 0],
            extent,
            byte_count: 0,
            dump_count: 0,
            state: SessionState::Open,
            verbose,
            memspace: Some(memspace),
            view: None,
            array: Some(array),
            artifact: Some(artifact),
        };
        session.log_context("open", level);
        Ok(session)
    }
}
