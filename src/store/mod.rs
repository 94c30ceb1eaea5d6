//! Array and attribute store used by a write session.
//!
//! A session talks to its store only through the traits in this module:
//!
//! - [`ArrayStore`] creates (truncating) an artifact at a path
//! - [`Artifact`] holds artifact-level attributes, cache tuning and arrays
//! - [`Array`] is one extensible 3-D typed array: extend, select, write
//! - [`AttributeSink`] attaches named scalar attributes
//!
//! [`Hdf5Store`] is the bundled implementation: one HDF5 file per artifact and
//! one chunked dataset per array.
//!
//! ```no_run
//! use fbh5_rs::store::{Array, ArrayLayout, ArrayStore, Artifact, Hdf5Store, MemorySpace, Selection};
//! use fbh5_rs::{ChunkShape, ElementType, UNLIMITED};
//! use std::path::Path;
//!
//! # fn main() -> fbh5_rs::Result<()> {
//! let store = Hdf5Store::new();
//! let mut artifact = store.create(Path::new("scratch.h5"))?;
//! let layout = ArrayLayout {
//!     element: ElementType::F32Le,
//!     extent: [1, 1, 4],
//!     max_extent: [UNLIMITED, 1, 4],
//!     chunk: ChunkShape::new(1, 1, 4),
//!     compression: store.compression_available(),
//! };
//! let mut array = artifact.create_array("data", &layout)?;
//! let view = array.select(Selection::new([0, 0, 0], [1, 1, 4]))?;
//! let memory = MemorySpace::new([1, 1, 4], [1, 1, 4])?;
//! array.write(&view, &memory, ElementType::F32Le, &[0u8; 16])?;
//! array.release(view)?;
//! array.close()?;
//! artifact.close()?;
//! # Ok(())
//! # }
//! ```

mod hdf5_store;

pub use hdf5_store::{element_of, type_descriptor, Hdf5Array, Hdf5Artifact, Hdf5Store, DIMENSION_LABELS};

use crate::error::{Fbh5Error, Result};
use crate::types::{AttrValue, CacheTuning, ChunkShape, ElementType, Extent, UNLIMITED};
use std::path::Path;

/// Rank of every array handled here
pub const RANK: usize = 3;

/// Attach named scalar attributes
pub trait AttributeSink {
    fn set_attr(&mut self, name: &str, value: AttrValue) -> Result<()>;
}

/// Creates artifacts
pub trait ArrayStore {
    type Artifact: Artifact;

    /// Create the artifact, overwriting anything already at `path`.
    fn create(&self, path: &Path) -> Result<Self::Artifact>;

    /// Whether the block compression filter can be used
    fn compression_available(&self) -> bool;

    /// Version string recorded in the artifact attributes
    fn version(&self) -> String;
}

/// An open artifact
pub trait Artifact: AttributeSink {
    type Array: Array;

    /// Apply chunk cache parameters; validation is up to the store.
    fn set_cache(&mut self, tuning: &CacheTuning) -> Result<()>;

    fn create_array(&mut self, name: &str, layout: &ArrayLayout) -> Result<Self::Array>;

    fn close(self) -> Result<()>;
}

/// An open, extensible array
pub trait Array: AttributeSink {
    /// Transient selection handle produced by [`Array::select`]
    type View;

    fn extent(&self) -> Extent;

    /// Grow the array to `extent`. Shrinking is not supported.
    fn set_extent(&mut self, extent: Extent) -> Result<()>;

    /// Select a rectangular region of the current extent, replacing any prior selection.
    fn select(&mut self, selection: Selection) -> Result<Self::View>;

    /// Write `data`, laid out as `memory` in row-major order, into the selected region.
    fn write(&mut self, view: &Self::View, memory: &MemorySpace, element: ElementType, data: &[u8]) -> Result<()>;

    fn release(&mut self, view: Self::View) -> Result<()>;

    /// Bytes of physical storage used by the array so far
    fn storage_size(&mut self) -> Result<u64>;

    fn set_axis_label(&mut self, axis: usize, label: &str) -> Result<()>;

    fn close(self) -> Result<()>;
}

/// Creation parameters for an array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLayout {
    pub element: ElementType,
    pub extent: Extent,
    pub max_extent: Extent,
    pub chunk: ChunkShape,
    pub compression: bool,
}

impl ArrayLayout {
    pub fn validate(&self) -> Result<()> {
        if !self.chunk.is_positive() {
            return Err(Fbh5Error::Store(format!("chunk shape {} has a zero dimension", self.chunk)));
        }
        for axis in 0..RANK {
            if self.extent[axis] > self.max_extent[axis] {
                return Err(Fbh5Error::Store(format!(
                    "axis {} extent {} exceeds maximum {}",
                    axis, self.extent[axis], self.max_extent[axis]
                )));
            }
        }
        Ok(())
    }
}

/// Rectangular region of an array: offset and shape per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub offset: Extent,
    pub shape: Extent,
}

impl Selection {
    pub fn new(offset: Extent, shape: Extent) -> Self {
        Selection { offset, shape }
    }

    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }

    pub fn end(&self, axis: usize) -> u64 {
        self.offset[axis] + self.shape[axis]
    }

    /// True when the selection is non-empty and inside `extent`
    pub fn fits_within(&self, extent: &Extent) -> bool {
        (0..RANK).all(|axis| self.shape[axis] > 0 && self.end(axis) <= extent[axis])
    }
}

/// Shape of the caller's buffer, bounded by a maximum extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySpace {
    shape: Extent,
    max: Extent,
}

impl MemorySpace {
    pub fn new(shape: Extent, max: Extent) -> Result<Self> {
        Self::check(&shape, &max)?;
        Ok(MemorySpace { shape, max })
    }

    /// Re-express the buffer shape, bounded by `max`.
    pub fn reshape(&mut self, shape: Extent, max: Extent) -> Result<()> {
        Self::check(&shape, &max)?;
        self.shape = shape;
        self.max = max;
        Ok(())
    }

    fn check(shape: &Extent, max: &Extent) -> Result<()> {
        for axis in 0..RANK {
            if shape[axis] == 0 || (max[axis] != UNLIMITED && shape[axis] > max[axis]) {
                return Err(Fbh5Error::Store(format!(
                    "memory shape {:?} does not fit bound {:?}",
                    shape, max
                )));
            }
        }
        Ok(())
    }

    pub fn shape(&self) -> Extent {
        self.shape
    }

    pub fn max(&self) -> Extent {
        self.max
    }

    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }
}
