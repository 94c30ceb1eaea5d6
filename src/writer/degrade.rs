// src/writer/degrade.rs
//! Degraded-mode handling: store failures on optional steps are logged and
//! absorbed, everything else still propagates.

use crate::error::{Fbh5Error, Result};
use crate::store::{Array, AttributeSink};
use crate::types::AttrValue;
use log::{debug, error, warn};

/// Run an optional store step. A store, HDF5 or I/O failure becomes a warning.
pub(super) fn degrade<T>(what: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ (Fbh5Error::Store(_) | Fbh5Error::Hdf5(_) | Fbh5Error::Io(_))) => {
            warn!("{}: {}", what, err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub(super) fn set_attr<S: AttributeSink + ?Sized>(
    sink: &mut S,
    name: &str,
    value: AttrValue,
    verbose: bool,
) -> Result<()> {
    if verbose {
        debug!("attribute {} = {}", name, value);
    }
    let what = format!("attribute {}", name);
    degrade(&what, sink.set_attr(name, value)).map(|_| ())
}

pub(super) fn set_axis_label<A: Array>(array: &mut A, axis: usize, label: &str) -> Result<()> {
    let what = format!("axis {} label {}", axis, label);
    degrade(&what, array.set_axis_label(axis, label)).map(|_| ())
}

/// Tag a store failure with the session step that hit it and report it.
pub(super) fn fatal(operation: &'static str, source: Fbh5Error) -> Fbh5Error {
    let err = Fbh5Error::resource(operation, source);
    error!("{}", err);
    err
}
