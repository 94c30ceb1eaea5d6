// tests/common/mod.rs
//! In-memory store that journals every call and fails the ones it is told to.
#![allow(dead_code)]

use fbh5_rs::store::{Array, ArrayLayout, ArrayStore, Artifact, AttributeSink, MemorySpace, Selection};
use fbh5_rs::{AttrValue, CacheTuning, ElementType, Extent, Fbh5Error, Header, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    ArtifactAttr,
    SetCache,
    CreateArray,
    ArrayAttr,
    SetExtent,
    Select,
    Write,
    Release,
    StorageSize,
    AxisLabel,
    CloseArray,
    CloseArtifact,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Vec<Op>,
    pub artifact_attrs: Vec<(String, AttrValue)>,
    pub array_attrs: Vec<(String, AttrValue)>,
    pub labels: Vec<(usize, String)>,
    pub layout: Option<ArrayLayout>,
    pub cache: Option<CacheTuning>,
    pub extent: Extent,
    pub data: Vec<u8>,
    /// op -> 1-based call number to fail on (0 fails every call)
    failures: HashMap<Op, usize>,
    seen: HashMap<Op, usize>,
}

impl Journal {
    fn enter(&mut self, op: Op) -> Result<()> {
        self.calls.push(op);
        let seen = self.seen.entry(op).or_insert(0);
        *seen += 1;
        match self.failures.get(&op) {
            Some(0) => Err(Fbh5Error::Store(format!("injected {:?} failure", op))),
            Some(n) if *n == *seen => Err(Fbh5Error::Store(format!("injected {:?} failure", op))),
            _ => Ok(()),
        }
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.iter().filter(|c| **c == op).count()
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.artifact_attrs.iter().chain(&self.array_attrs).find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub struct MemStore {
    pub journal: Arc<Mutex<Journal>>,
    pub compression: bool,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore { journal: Arc::new(Mutex::new(Journal::default())), compression: true }
    }

    pub fn without_compression() -> Self {
        MemStore { compression: false, ..Self::new() }
    }

    /// Fail every call of `op`
    pub fn fail(self, op: Op) -> Self {
        self.journal.lock().failures.insert(op, 0);
        self
    }

    /// Fail only the `n`th call of `op` (1-based)
    pub fn fail_nth(self, op: Op, n: usize) -> Self {
        self.journal.lock().failures.insert(op, n);
        self
    }

    pub fn calls(&self) -> Vec<Op> {
        self.journal.lock().calls.clone()
    }
}

impl ArrayStore for MemStore {
    type Artifact = MemArtifact;

    fn create(&self, _path: &Path) -> Result<MemArtifact> {
        self.journal.lock().enter(Op::Create)?;
        Ok(MemArtifact { journal: self.journal.clone() })
    }

    fn compression_available(&self) -> bool {
        self.compression
    }

    fn version(&self) -> String {
        "memstore 0".to_string()
    }
}

pub struct MemArtifact {
    journal: Arc<Mutex<Journal>>,
}

impl AttributeSink for MemArtifact {
    fn set_attr(&mut self, name: &str, value: AttrValue) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::ArtifactAttr)?;
        journal.artifact_attrs.push((name.to_string(), value));
        Ok(())
    }
}

impl Artifact for MemArtifact {
    type Array = MemArray;

    fn set_cache(&mut self, tuning: &CacheTuning) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::SetCache)?;
        journal.cache = Some(*tuning);
        Ok(())
    }

    fn create_array(&mut self, _name: &str, layout: &ArrayLayout) -> Result<MemArray> {
        let mut journal = self.journal.lock();
        journal.enter(Op::CreateArray)?;
        journal.layout = Some(layout.clone());
        journal.extent = layout.extent;
        Ok(MemArray { journal: self.journal.clone(), element: layout.element })
    }

    fn close(self) -> Result<()> {
        self.journal.lock().enter(Op::CloseArtifact)
    }
}

pub struct MemArray {
    journal: Arc<Mutex<Journal>>,
    element: ElementType,
}

impl AttributeSink for MemArray {
    fn set_attr(&mut self, name: &str, value: AttrValue) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::ArrayAttr)?;
        journal.array_attrs.push((name.to_string(), value));
        Ok(())
    }
}

impl Array for MemArray {
    type View = Selection;

    fn extent(&self) -> Extent {
        self.journal.lock().extent
    }

    fn set_extent(&mut self, extent: Extent) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::SetExtent)?;
        journal.extent = extent;
        Ok(())
    }

    fn select(&mut self, selection: Selection) -> Result<Selection> {
        let mut journal = self.journal.lock();
        journal.enter(Op::Select)?;
        if !selection.fits_within(&journal.extent) {
            return Err(Fbh5Error::Store("selection outside extent".into()));
        }
        Ok(selection)
    }

    fn write(&mut self, view: &Selection, memory: &MemorySpace, element: ElementType, data: &[u8]) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::Write)?;
        assert_eq!(element, self.element);
        assert_eq!(memory.shape(), view.shape);
        let row = (view.shape[1] * view.shape[2]) as usize * element.size();
        let start = view.offset[0] as usize * row;
        let end = start + data.len();
        if journal.data.len() < end {
            journal.data.resize(end, 0);
        }
        journal.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn release(&mut self, _view: Selection) -> Result<()> {
        self.journal.lock().enter(Op::Release)
    }

    fn storage_size(&mut self) -> Result<u64> {
        let mut journal = self.journal.lock();
        journal.enter(Op::StorageSize)?;
        Ok(journal.data.len() as u64 / 2)
    }

    fn set_axis_label(&mut self, axis: usize, label: &str) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.enter(Op::AxisLabel)?;
        journal.labels.push((axis, label.to_string()));
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.journal.lock().enter(Op::CloseArray)
    }
}

/// Valid header for a small recording
pub fn header(nbits: i32, nifs: i32, nchans: i32) -> Header {
    Header {
        machine_id: 20,
        telescope_id: 6,
        data_type: 1,
        src_raj: 171010.0,
        src_dej: 123017.6,
        fch1: 8421.38671875,
        foff: -2.7939677238464355e-06,
        nchans,
        nbeams: 1,
        ibeam: 1,
        nbits,
        tstart: 57650.78209490741,
        tsamp: 18.253611008,
        nifs,
        source_name: "Voyager1".into(),
        rawdatafile: "guppi_57650_67573_Voyager1_0038.0000.raw".into(),
        ..Default::default()
    }
}

/// `count` integrations of `tint_size` bytes, distinct per integration index
pub fn integrations(first: usize, count: usize, tint_size: usize) -> Vec<u8> {
    (first * tint_size..(first + count) * tint_size)
        .map(|i| (i.wrapping_mul(31) % 253) as u8)
        .collect()
}
