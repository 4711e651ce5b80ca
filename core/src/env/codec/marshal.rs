use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::errors::EnvError;
use crate::env::memory::Heap;

/// Parameter list exchanged as JSON: `{"params":[{"type":"int","val":"1"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamList {
    pub params: Vec<ParamDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub val: String,
}

/// Single value produced by `JsonMashal`: `{"type":"int","val":"1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub val: String,
}

/// Type tags understood by the marshaling functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Int64,
    IntArray,
    Int64Array,
    Text,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::IntArray => "int_array",
            Self::Int64Array => "int64_array",
            Self::Text => "string",
        }
    }

    /// Bytes the parameter occupies once encoded. Arrays and strings are stored
    /// elsewhere on the heap and encoded as their address.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Int | Self::IntArray | Self::Text => 4,
            Self::Int64 | Self::Int64Array => 8,
        }
    }
}

impl FromStr for ParamKind {
    type Err = EnvError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_lowercase().as_str() {
            "int" => Ok(Self::Int),
            "int64" => Ok(Self::Int64),
            "int_array" => Ok(Self::IntArray),
            "int64_array" => Ok(Self::Int64Array),
            "string" => Ok(Self::Text),
            _ => Err(EnvError::UnsupportedType(tag.to_owned())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter with its value parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i32),
    Int64(i64),
    IntArray(Vec<i32>),
    Int64Array(Vec<i64>),
    Text(String),
}

impl Param {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Int(_) => ParamKind::Int,
            Self::Int64(_) => ParamKind::Int64,
            Self::IntArray(_) => ParamKind::IntArray,
            Self::Int64Array(_) => ParamKind::Int64Array,
            Self::Text(_) => ParamKind::Text,
        }
    }

    /// Appends the encoded parameter to `out`, storing arrays and strings on the heap.
    pub fn encode(&self, heap: &mut Heap, out: &mut Vec<u8>) -> Result<(), EnvError> {
        match self {
            Self::Int(value) => out.extend_from_slice(&value.to_le_bytes()),
            Self::Int64(value) => out.extend_from_slice(&value.to_le_bytes()),
            Self::IntArray(values) => {
                let address = heap.store_i32s(values)?;
                out.extend_from_slice(&narrow_address(address)?.to_le_bytes());
            }
            Self::Int64Array(values) => {
                let address = heap.store_i64s(values)?;
                out.extend_from_slice(&address.to_le_bytes());
            }
            Self::Text(text) => {
                let address = heap.store_str(text)?;
                out.extend_from_slice(&narrow_address(address)?.to_le_bytes());
            }
        }
        Ok(())
    }
}

impl TryFrom<&ParamDescriptor> for Param {
    type Error = EnvError;

    fn try_from(descriptor: &ParamDescriptor) -> Result<Self, Self::Error> {
        let value = descriptor.val.as_str();
        Ok(match descriptor.kind.parse::<ParamKind>()? {
            ParamKind::Int => Self::Int(parse_number(value)?),
            ParamKind::Int64 => Self::Int64(parse_number(value)?),
            ParamKind::IntArray => Self::IntArray(parse_list(value)?),
            ParamKind::Int64Array => Self::Int64Array(parse_list(value)?),
            ParamKind::Text => Self::Text(value.to_owned()),
        })
    }
}

pub fn parse_param_list(json: &[u8]) -> Result<Vec<Param>, EnvError> {
    let list: ParamList = serde_json::from_slice(json)?;
    list.params.iter().map(Param::try_from).collect()
}

/// Renders `value` as the result descriptor of type `kind`. Scalars are the
/// operand itself; strings and arrays are read from the heap at `value`.
pub fn render_result(heap: &Heap, value: u64, kind: ParamKind) -> Result<ResultDescriptor, EnvError> {
    let val = match kind {
        ParamKind::Int => (value as u32 as i32).to_string(),
        ParamKind::Int64 => (value as i64).to_string(),
        ParamKind::Text => String::from_utf8_lossy(heap.fetch_c_str(value)?).into_owned(),
        ParamKind::IntArray => heap
            .fetch_region(value)?
            .chunks_exact(4)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]).to_string())
            .collect::<Vec<_>>()
            .join(","),
        ParamKind::Int64Array => heap
            .fetch_region(value)?
            .chunks_exact(8)
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                i64::from_le_bytes(raw).to_string()
            })
            .collect::<Vec<_>>()
            .join(","),
    };
    Ok(ResultDescriptor {
        kind: kind.as_str().to_owned(),
        val,
    })
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, EnvError> {
    value
        .parse::<T>()
        .map_err(|_| EnvError::MalformedEncoding(format!("invalid number \"{}\"", value)))
}

fn parse_list<T: FromStr>(value: &str) -> Result<Vec<T>, EnvError> {
    value.split(',').map(parse_number::<T>).collect()
}

fn narrow_address(address: u64) -> Result<u32, EnvError> {
    u32::try_from(address).map_err(|_| EnvError::OutOfBounds {
        address,
        length: 4,
        limit: u32::MAX as u64,
    })
}
