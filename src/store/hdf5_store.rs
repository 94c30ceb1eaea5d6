// src/store/hdf5_store.rs
//! [`ArrayStore`] backed by HDF5 through the `hdf5` crate.
//!
//! One artifact is one HDF5 file. Arrays are chunked datasets, compressed with
//! byte shuffle followed by LZF when the filter is registered. Axis labels go
//! into the `DIMENSION_LABELS` attribute the HDF5 dimension-scale API reads.

use crate::error::{Fbh5Error, Result};
use crate::store::{Array, ArrayLayout, ArrayStore, Artifact, AttributeSink, MemorySpace, Selection, RANK};
use crate::types::{AttrValue, CacheTuning, ElementType, Extent, UNLIMITED};
use crate::utils::{to_varlen_ascii, to_varlen_unicode};
use bytemuck::Pod;
use hdf5::plist::FileAccess;
use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, H5Type, Location};
use log::debug;
use ndarray::{s, ArrayView3};
use std::path::{Path, PathBuf};

/// Per-axis label attribute
pub const DIMENSION_LABELS: &str = "DIMENSION_LABELS";

/// Storage type of each element type
pub fn type_descriptor(element: ElementType) -> TypeDescriptor {
    match element {
        ElementType::B8 => TypeDescriptor::Unsigned(IntSize::U1),
        ElementType::B16 => TypeDescriptor::Unsigned(IntSize::U2),
        ElementType::F32Le => TypeDescriptor::Float(FloatSize::U4),
        ElementType::F64Le => TypeDescriptor::Float(FloatSize::U8),
    }
}

/// Element type of a stored dataset, if it is one this crate writes
pub fn element_of(descriptor: &TypeDescriptor) -> Option<ElementType> {
    match descriptor {
        TypeDescriptor::Unsigned(IntSize::U1) => Some(ElementType::B8),
        TypeDescriptor::Unsigned(IntSize::U2) => Some(ElementType::B16),
        TypeDescriptor::Float(FloatSize::U4) => Some(ElementType::F32Le),
        TypeDescriptor::Float(FloatSize::U8) => Some(ElementType::F64Le),
        _ => None,
    }
}

#[cfg(feature = "lzf")]
fn lzf_available() -> bool {
    hdf5::filters::lzf_available()
}

#[cfg(not(feature = "lzf"))]
fn lzf_available() -> bool {
    false
}

fn dims(extent: &Extent) -> (usize, usize, usize) {
    (extent[0] as usize, extent[1] as usize, extent[2] as usize)
}

/// Write one scalar attribute on a file or a dataset.
fn write_attr(location: &Location, name: &str, value: &AttrValue) -> Result<()> {
    match value {
        AttrValue::Int(v) => location.new_attr::<i32>().shape(()).create(name)?.write_scalar(v)?,
        AttrValue::Double(v) => location.new_attr::<f64>().shape(()).create(name)?.write_scalar(v)?,
        AttrValue::String(s) => {
            let text = to_varlen_unicode(s)?;
            location
                .new_attr::<VarLenUnicode>()
                .shape(())
                .create(name)?
                .write_scalar(&text)?
        }
    }
    Ok(())
}

/// HDF5 file store
#[derive(Debug, Clone)]
pub struct Hdf5Store {
    compression: bool,
}

impl Hdf5Store {
    /// Store that compresses whenever the LZF filter is registered
    pub fn new() -> Self {
        Hdf5Store { compression: true }
    }

    /// Store that never compresses
    pub fn without_compression() -> Self {
        Hdf5Store { compression: false }
    }
}

impl Default for Hdf5Store {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayStore for Hdf5Store {
    type Artifact = Hdf5Artifact;

    fn create(&self, path: &Path) -> Result<Hdf5Artifact> {
        let file = File::create(path)?;
        debug!("{}: created", path.display());
        Ok(Hdf5Artifact {
            file,
            path: path.to_path_buf(),
            cache: None,
        })
    }

    fn compression_available(&self) -> bool {
        self.compression && lzf_available()
    }

    fn version(&self) -> String {
        let (major, minor, release) = hdf5::library_version();
        format!("{}.{}.{}", major, minor, release)
    }
}

/// Open HDF5 file
pub struct Hdf5Artifact {
    file: File,
    path: PathBuf,
    cache: Option<CacheTuning>,
}

impl Hdf5Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cache parameters accepted by [`Artifact::set_cache`], if any
    pub fn cache(&self) -> Option<CacheTuning> {
        self.cache
    }
}

impl std::fmt::Debug for Hdf5Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdf5Artifact")
            .field("path", &self.path)
            .field("cache", &self.cache)
            .finish()
    }
}

impl AttributeSink for Hdf5Artifact {
    fn set_attr(&mut self, name: &str, value: AttrValue) -> Result<()> {
        write_attr(&self.file, name, &value)
    }
}

impl Artifact for Hdf5Artifact {
    type Array = Hdf5Array;

    /// Check the parameters against libhdf5 by building a file access list and
    /// keep them as the raw-data cache of arrays this artifact creates from now
    /// on. An array that is already open keeps its cache.
    fn set_cache(&mut self, tuning: &CacheTuning) -> Result<()> {
        FileAccess::build()
            .chunk_cache(tuning.slots, tuning.bytes, tuning.policy)
            .finish()?;
        self.cache = Some(*tuning);
        Ok(())
    }

    fn create_array(&mut self, name: &str, layout: &ArrayLayout) -> Result<Hdf5Array> {
        layout.validate()?;

        let shape: Vec<hdf5::Extent> = (0..RANK)
            .map(|axis| {
                let max = layout.max_extent[axis];
                hdf5::Extent::new(layout.extent[axis] as usize, (max != UNLIMITED).then_some(max as usize))
            })
            .collect();

        let mut builder = self.file.new_dataset_builder().chunk(dims(&layout.chunk.as_extent()));
        if let Some(tuning) = self.cache {
            builder = builder.chunk_cache(tuning.slots, tuning.bytes, tuning.policy);
        }
        if layout.compression {
            #[cfg(feature = "lzf")]
            {
                builder = builder.shuffle().lzf();
            }
            #[cfg(not(feature = "lzf"))]
            return Err(Fbh5Error::Store("built without a compression filter".into()));
        }
        let dataset = builder
            .empty_as(&type_descriptor(layout.element))
            .shape(shape)
            .create(name)?;
        debug!(
            "{}: dataset {} chunk {} compression {}",
            self.path.display(),
            name,
            layout.chunk,
            layout.compression
        );

        Ok(Hdf5Array {
            dataset,
            element: layout.element,
            extent: layout.extent,
            max_extent: layout.max_extent,
            labels: Default::default(),
        })
    }

    fn close(self) -> Result<()> {
        self.file.flush()?;
        debug!("{}: closed", self.path.display());
        Ok(())
    }
}

/// Open chunked dataset
pub struct Hdf5Array {
    dataset: Dataset,
    element: ElementType,
    extent: Extent,
    max_extent: Extent,
    labels: [String; RANK],
}

impl Hdf5Array {
    pub fn element_type(&self) -> ElementType {
        self.element
    }

    fn write_block<T: H5Type + Pod>(&self, view: &Selection, data: &[u8]) -> Result<()> {
        // Copy out of the byte buffer: it need not be aligned for T.
        let mut samples = vec![T::zeroed(); data.len() / std::mem::size_of::<T>()];
        bytemuck::cast_slice_mut::<T, u8>(&mut samples).copy_from_slice(data);

        let (t, i, f) = dims(&view.offset);
        let (nt, ni, nf) = dims(&view.shape);
        let block = ArrayView3::from_shape((nt, ni, nf), &samples).map_err(|e| Fbh5Error::Store(e.to_string()))?;
        self.dataset.write_slice(block, s![t..t + nt, i..i + ni, f..f + nf])?;
        Ok(())
    }
}

impl std::fmt::Debug for Hdf5Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdf5Array")
            .field("name", &self.dataset.name())
            .field("element", &self.element)
            .field("extent", &self.extent)
            .finish()
    }
}

impl AttributeSink for Hdf5Array {
    fn set_attr(&mut self, name: &str, value: AttrValue) -> Result<()> {
        write_attr(&self.dataset, name, &value)
    }
}

impl Array for Hdf5Array {
    type View = Selection;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn set_extent(&mut self, extent: Extent) -> Result<()> {
        for axis in 0..RANK {
            if extent[axis] < self.extent[axis] || extent[axis] > self.max_extent[axis] {
                return Err(Fbh5Error::Store(format!(
                    "cannot resize axis {} from {} to {} (max {})",
                    axis, self.extent[axis], extent[axis], self.max_extent[axis]
                )));
            }
        }
        self.dataset.resize(dims(&extent))?;
        self.extent = extent;
        Ok(())
    }

    fn select(&mut self, selection: Selection) -> Result<Selection> {
        if !selection.fits_within(&self.extent) {
            return Err(Fbh5Error::Store(format!(
                "selection at {:?} of {:?} is outside extent {:?}",
                selection.offset, selection.shape, self.extent
            )));
        }
        Ok(selection)
    }

    fn write(&mut self, view: &Selection, memory: &MemorySpace, element: ElementType, data: &[u8]) -> Result<()> {
        if element != self.element {
            return Err(Fbh5Error::Store(format!(
                "{} data written to a {} array",
                element.name(),
                self.element.name()
            )));
        }
        if memory.shape() != view.shape {
            return Err(Fbh5Error::Store(format!(
                "memory shape {:?} does not match selection {:?}",
                memory.shape(),
                view.shape
            )));
        }
        let expected = view.element_count() as usize * element.size();
        if data.len() != expected {
            return Err(Fbh5Error::Store(format!("{} bytes for a {}-byte selection", data.len(), expected)));
        }

        match element {
            ElementType::B8 => self.write_block::<u8>(view, data),
            ElementType::B16 => self.write_block::<u16>(view, data),
            ElementType::F32Le => self.write_block::<f32>(view, data),
            ElementType::F64Le => self.write_block::<f64>(view, data),
        }
    }

    fn release(&mut self, _view: Selection) -> Result<()> {
        Ok(())
    }

    fn storage_size(&mut self) -> Result<u64> {
        Ok(self.dataset.storage_size())
    }

    fn set_axis_label(&mut self, axis: usize, label: &str) -> Result<()> {
        if axis >= RANK {
            return Err(Fbh5Error::Store(format!("axis {} out of range", axis)));
        }
        to_varlen_ascii(label)?;
        self.labels[axis] = label.to_string();

        let labels = self
            .labels
            .iter()
            .map(|l| to_varlen_ascii(l))
            .collect::<Result<Vec<VarLenAscii>>>()?;
        let attr = if self.dataset.attr_names()?.iter().any(|n| n == DIMENSION_LABELS) {
            self.dataset.attr(DIMENSION_LABELS)?
        } else {
            self.dataset
                .new_attr::<VarLenAscii>()
                .shape([RANK])
                .create(DIMENSION_LABELS)?
        };
        attr.write_raw(&labels[..])?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        debug!("{}: dataset closed at extent {:?}", self.dataset.name(), self.extent);
        Ok(())
    }
}
