// src/reader/artifact_reader.rs
use crate::error::{Fbh5Error, Result};
use crate::header::Header;
use crate::store::{element_of, DIMENSION_LABELS};
use crate::types::{AttrValue, Attribute, ChunkShape, ElementType, Extent, UNLIMITED};
use crate::DATASET_NAME;
use hdf5::types::{TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, H5Type, Location};
use std::path::Path;

/// Shape and storage of one array in a closed artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInfo {
    pub name: String,
    pub element: ElementType,
    pub extent: Extent,
    /// [`UNLIMITED`] on unbounded axes
    pub max_extent: Extent,
    pub chunk: Option<ChunkShape>,
    pub compressed: bool,
    /// Axis labels, empty strings where none was written
    pub labels: Vec<String>,
}

/// Reader for a closed artifact
pub struct ArtifactReader {
    file: File,
}

impl ArtifactReader {
    /// Open an artifact read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(ArtifactReader { file: File::open(path)? })
    }

    /// Artifact-level attributes
    pub fn attributes(&self) -> Result<Vec<Attribute>> {
        read_attributes(&self.file)
    }

    pub fn attribute(&self, name: &str) -> Result<Option<AttrValue>> {
        Ok(self.attributes()?.into_iter().find(|a| a.name == name).map(|a| a.value))
    }

    /// Whether the `data` array went through a compression filter
    pub fn is_compressed(&self) -> Result<bool> {
        Ok(self.array(DATASET_NAME)?.compressed)
    }

    /// Names of the arrays at the root of the artifact
    pub fn arrays(&self) -> Result<Vec<String>> {
        Ok(self
            .file
            .datasets()?
            .iter()
            .map(|ds| ds.name().trim_start_matches('/').to_string())
            .collect())
    }

    pub fn array(&self, name: &str) -> Result<ArrayInfo> {
        let dataset = self.dataset(name)?;
        let element = dataset_element(&dataset, name)?;
        let shape: Vec<u64> = dataset.shape().iter().map(|&d| d as u64).collect();
        let maxdims: Vec<u64> = dataset
            .space()?
            .maxdims()
            .iter()
            .map(|m| m.map_or(UNLIMITED, |d| d as u64))
            .collect();
        let chunk = match dataset.chunk() {
            Some(dims) => {
                let dims: Vec<u64> = dims.iter().map(|&d| d as u64).collect();
                Some(ChunkShape::from_extent(to_extent(&dims, name)?))
            }
            None => None,
        };

        Ok(ArrayInfo {
            name: name.to_string(),
            element,
            extent: to_extent(&shape, name)?,
            max_extent: to_extent(&maxdims, name)?,
            chunk,
            compressed: !dataset.filters().is_empty(),
            labels: read_labels(&dataset)?,
        })
    }

    /// Attributes attached to an array
    pub fn array_attributes(&self, name: &str) -> Result<Vec<Attribute>> {
        let dataset = self.dataset(name)?;
        read_attributes(&dataset)
    }

    /// Recording header mirrored on the `data` array
    pub fn header(&self) -> Result<Header> {
        Header::from_attributes(&self.array_attributes(DATASET_NAME)?)
    }

    /// Read a whole array as row-major bytes in its stored element type.
    pub fn read_array(&self, name: &str) -> Result<Vec<u8>> {
        let dataset = self.dataset(name)?;
        let bytes = match dataset_element(&dataset, name)? {
            ElementType::B8 => dataset.read_raw::<u8>()?,
            ElementType::B16 => bytemuck::cast_slice(&dataset.read_raw::<u16>()?[..]).to_vec(),
            ElementType::F32Le => bytemuck::cast_slice(&dataset.read_raw::<f32>()?[..]).to_vec(),
            ElementType::F64Le => bytemuck::cast_slice(&dataset.read_raw::<f64>()?[..]).to_vec(),
        };
        Ok(bytes)
    }

    /// Read a whole array as samples of `T`, which must be the stored element type.
    pub fn read_array_as<T: H5Type>(&self, name: &str) -> Result<Vec<T>> {
        let dataset = self.dataset(name)?;
        let element = dataset_element(&dataset, name)?;
        if element_of(&T::type_descriptor()) != Some(element) {
            return Err(Fbh5Error::Corrupted(format!(
                "array '{}' holds {} elements, not {:?}",
                name,
                element.name(),
                T::type_descriptor()
            )));
        }
        Ok(dataset.read_raw::<T>()?)
    }

    fn dataset(&self, name: &str) -> Result<Dataset> {
        if !self.file.link_exists(name) {
            return Err(Fbh5Error::ArrayNotFound(name.to_string()));
        }
        Ok(self.file.dataset(name)?)
    }
}

fn dataset_element(dataset: &Dataset, name: &str) -> Result<ElementType> {
    let descriptor = dataset.dtype()?.to_descriptor()?;
    element_of(&descriptor)
        .ok_or_else(|| Fbh5Error::Corrupted(format!("array '{}' has unsupported type {:?}", name, descriptor)))
}

fn to_extent(dims: &[u64], name: &str) -> Result<Extent> {
    match dims {
        [t, i, f] => Ok([*t, *i, *f]),
        _ => Err(Fbh5Error::Corrupted(format!("array '{}' has rank {}, expected 3", name, dims.len()))),
    }
}

/// Scalar int, float and string attributes of an object, in name order.
/// Anything else (label arrays included) is skipped.
fn read_attributes(location: &Location) -> Result<Vec<Attribute>> {
    let mut attrs = Vec::new();
    for name in location.attr_names()? {
        let attr = location.attr(&name)?;
        if attr.ndim() != 0 {
            continue;
        }
        let value = match attr.dtype()?.to_descriptor()? {
            TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => AttrValue::Int(attr.read_scalar()?),
            TypeDescriptor::Float(_) => AttrValue::Double(attr.read_scalar()?),
            TypeDescriptor::VarLenUnicode => {
                AttrValue::String(attr.read_scalar::<VarLenUnicode>()?.as_str().to_string())
            }
            TypeDescriptor::VarLenAscii => AttrValue::String(attr.read_scalar::<VarLenAscii>()?.as_str().to_string()),
            _ => continue,
        };
        attrs.push(Attribute { name, value });
    }
    Ok(attrs)
}

fn read_labels(dataset: &Dataset) -> Result<Vec<String>> {
    if !dataset.attr_names()?.iter().any(|n| n == DIMENSION_LABELS) {
        return Ok(Vec::new());
    }
    let labels = dataset.attr(DIMENSION_LABELS)?.read_raw::<VarLenAscii>()?;
    Ok(labels.iter().map(|l| l.as_str().to_string()).collect())
}
