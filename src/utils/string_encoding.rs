use crate::error::{Fbh5Error, Result};
use hdf5::types::{VarLenAscii, VarLenUnicode};

/// Trim a fixed-width, NUL-padded text field down to its content
pub fn trim_nul(s: &str) -> &str {
    s.trim_end_matches('\0')
}

/// Text attribute value as a variable-length UTF-8 string
pub fn to_varlen_unicode(s: &str) -> Result<VarLenUnicode> {
    trim_nul(s)
        .parse::<VarLenUnicode>()
        .map_err(|e| Fbh5Error::Store(format!("string {:?} cannot be stored: {}", s, e)))
}

/// Axis label as a variable-length ASCII string
pub fn to_varlen_ascii(s: &str) -> Result<VarLenAscii> {
    VarLenAscii::from_ascii(s).map_err(|e| Fbh5Error::Store(format!("label {:?} is not ASCII: {}", s, e)))
}
