// src/chunking.rs
//! Chunk shape selection from the signal characteristics of a recording.
//!
//! The thresholds mirror the product classes produced by the GBT/BL
//! pipelines: high frequency resolution (`.0000.`), high time resolution
//! (`.0001.`) and intermediate resolution (`.0002.`). Anything else gets a
//! single-band chunk.

use crate::header::Header;
use crate::types::ChunkShape;

/// Channels in one coarse channel of a high frequency resolution product
pub const HFR_CHANS: u64 = 1_048_576;
/// Channels per band for high time resolution products
pub const HTR_CHANS: u64 = 512;
/// Spectra stacked per chunk for high time resolution products
pub const HTR_TIME: u64 = 2048;
/// Channels per band for intermediate resolution products
pub const MID_CHANS: u64 = 65_536;
/// Spectra stacked per chunk for intermediate resolution products
pub const MID_TIME: u64 = 10;

/// Pick a chunk shape. The first matching rule wins and the channel
/// dimension never exceeds `nchans`.
pub fn advise(foff: f64, tsamp: f64, nchans: u64) -> ChunkShape {
    let df = foff.abs();

    if df < 1.0e-5 {
        return ChunkShape::new(1, 1, nchans.min(HFR_CHANS));
    }
    if tsamp < 1.0e-3 {
        return ChunkShape::new(HTR_TIME, 1, nchans.min(HTR_CHANS));
    }
    if df < 1.0e-2 {
        return ChunkShape::new(MID_TIME, 1, nchans.min(MID_CHANS));
    }
    ChunkShape::new(1, 1, nchans.min(HTR_CHANS))
}

/// [`advise`] driven by a recording header
pub fn advise_for(header: &Header) -> ChunkShape {
    advise(header.foff, header.tsamp, header.nchans.max(0) as u64)
}
