use serde::{Deserialize, Serialize};

/// Kind of data stored in a heap region.
///
/// `Unknown` is recorded when the size of an allocation is known but the
/// width of its elements is not, as for `malloc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Unknown,
}

impl ElementType {
    /// Width in bytes of one element. Byte-typed and untyped regions count bytes.
    pub fn width(&self) -> u64 {
        match self {
            Self::Int8 | Self::String | Self::Unknown => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8,
        }
    }
}

/// Metadata recorded for every address handed out by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub element_type: ElementType,
    pub byte_length: usize,
}

impl RegionDescriptor {
    pub fn new(element_type: ElementType, byte_length: usize) -> Self {
        Self {
            element_type,
            byte_length,
        }
    }

    /// Number of whole elements the region holds.
    pub fn element_count(&self) -> u64 {
        self.byte_length as u64 / self.element_type.width()
    }
}
