// src/types.rs
use std::fmt;

/// Array extent, one entry per axis: (time, ifs, channel)
pub type Extent = [u64; 3];

/// Marker for an unbounded axis in a maximum extent
pub const UNLIMITED: u64 = u64::MAX;

/// Storage element type, resolved once from `nbits` when a session opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// 8-bit byte, stored as an unsigned integer
    B8 = 1,
    /// 16-bit word, stored as an unsigned integer
    B16 = 2,
    /// IEEE-754 single precision, little-endian
    F32Le = 3,
    /// IEEE-754 double precision, little-endian
    F64Le = 4,
}

impl ElementType {
    /// Pick the element type for a bit depth. Only 8, 16, 32 and 64 are valid.
    pub fn from_nbits(nbits: i32) -> Option<Self> {
        match nbits {
            8 => Some(ElementType::B8),
            16 => Some(ElementType::B16),
            32 => Some(ElementType::F32Le),
            64 => Some(ElementType::F64Le),
            _ => None,
        }
    }

    /// Size of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            ElementType::B8 => 1,
            ElementType::B16 => 2,
            ElementType::F32Le => 4,
            ElementType::F64Le => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::F32Le | ElementType::F64Le)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::B8 => "b8",
            ElementType::B16 => "b16",
            ElementType::F32Le => "f32le",
            ElementType::F64Le => "f64le",
        }
    }
}

/// Chunk shape along (time, ifs, channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkShape {
    pub time: u64,
    pub ifs: u64,
    pub chans: u64,
}

impl ChunkShape {
    pub fn new(time: u64, ifs: u64, chans: u64) -> Self {
        ChunkShape { time, ifs, chans }
    }

    pub fn as_extent(&self) -> Extent {
        [self.time, self.ifs, self.chans]
    }

    pub fn from_extent(extent: Extent) -> Self {
        ChunkShape::new(extent[0], extent[1], extent[2])
    }

    pub fn is_positive(&self) -> bool {
        self.time > 0 && self.ifs > 0 && self.chans > 0
    }

    /// Number of elements held by one chunk
    pub fn element_count(&self) -> u64 {
        self.time * self.ifs * self.chans
    }
}

impl fmt::Display for ChunkShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.time, self.ifs, self.chans)
    }
}

/// Chunk cache tuning, handed to the store as-is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheTuning {
    /// Hash table slot count (upper bound on resident chunks)
    pub slots: usize,
    /// Cache size in bytes
    pub bytes: usize,
    /// Preemption policy in [0, 1]
    pub policy: f64,
}

impl CacheTuning {
    pub const DEFAULT_SLOTS: usize = 521;
    pub const DEFAULT_BYTES: usize = 1024 * 1024;
    pub const DEFAULT_POLICY: f64 = 0.75;

    pub fn new(slots: usize, bytes: usize, policy: f64) -> Self {
        CacheTuning { slots, bytes, policy }
    }
}

impl Default for CacheTuning {
    fn default() -> Self {
        CacheTuning::new(Self::DEFAULT_SLOTS, Self::DEFAULT_BYTES, Self::DEFAULT_POLICY)
    }
}

/// Scalar attribute value attached to an artifact or an array
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i32),
    Double(f64),
    String(String),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            AttrValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Double(v) => write!(f, "{}", v),
            AttrValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Double(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

/// Named attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}
