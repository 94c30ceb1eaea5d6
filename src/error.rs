// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Fbh5Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("Invalid header field {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{operation} failed: {source}")]
    Resource {
        operation: &'static str,
        #[source]
        source: Box<Fbh5Error>,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Corrupted artifact: {0}")]
    Corrupted(String),

    #[error("Array not found: {0}")]
    ArrayNotFound(String),

    #[error("Buffer of {len} bytes is not a positive multiple of the integration size {tint_size}")]
    InvalidBufferSize { len: usize, tint_size: usize },

    #[error("{sample_size}-byte samples do not match the {elem_size}-byte element type of the session")]
    SampleWidthMismatch { sample_size: usize, elem_size: usize },

    #[error("Session is unusable after an earlier failure")]
    SessionUnusable,

    #[error("Session closed")]
    SessionClosed,
}

impl Fbh5Error {
    /// Wrap a store failure with the name of the session step that hit it.
    pub fn resource(operation: &'static str, source: Fbh5Error) -> Self {
        Fbh5Error::Resource {
            operation,
            source: Box::new(source),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Fbh5Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Fbh5Error::Validation { .. })
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Fbh5Error::Resource { .. })
    }
}

pub type Result<T> = std::result::Result<T, Fbh5Error>;
