use std::collections::BTreeMap;
use std::ops::Range;

use log::trace;

use crate::commons::config::HeapSettings;
use crate::env::errors::EnvError;

use super::{ElementType, RegionDescriptor};

const LOG_TARGET: &str = "VM_ENV_HEAP";
/// Heap ceiling when no limit is configured. Addresses must fit the 32-bit
/// fields used by the marshaling functions.
const ADDRESS_SPACE: usize = u32::MAX as usize;

/// Guest-addressable linear memory.
///
/// Allocation is a bump over a growable byte buffer; every returned address gets
/// a [RegionDescriptor] that is never removed. All bounds checks of the native
/// functions go through this type.
#[derive(Debug)]
pub struct Heap {
    memory: Vec<u8>,
    regions: BTreeMap<u64, RegionDescriptor>,
    limit: usize,
}

impl Heap {
    pub fn new(settings: &HeapSettings) -> Self {
        let mut memory = Vec::with_capacity(settings.capacity.max(settings.reserved));
        memory.resize(settings.reserved, 0);
        Self {
            memory,
            regions: BTreeMap::new(),
            limit: match settings.limit {
                0 => ADDRESS_SPACE,
                limit => limit,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Maximum length the heap may grow to.
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Reserves `size` bytes at the end of the heap and tracks them as a region of
    /// `element_type`. The new bytes are zeroed.
    pub fn allocate(&mut self, size: i64, element_type: ElementType) -> Result<u64, EnvError> {
        if size <= 0 {
            return Err(EnvError::InvalidSize(size));
        }
        let size = size as usize;
        let base = self.memory.len();
        match base.checked_add(size) {
            Some(end) if end <= self.limit => {}
            _ => {
                return Err(EnvError::HeapExhausted {
                    requested: size as u64,
                    limit: self.limit as u64,
                })
            }
        }
        self.memory.resize(base + size, 0);
        self.regions
            .insert(base as u64, RegionDescriptor::new(element_type, size));
        trace!(
            "{}: Allocated {} bytes of {:?} at {}",
            LOG_TARGET,
            size,
            element_type,
            base
        );
        Ok(base as u64)
    }

    pub fn region(&self, address: u64) -> Option<&RegionDescriptor> {
        self.regions.get(&address)
    }

    pub fn regions(&self) -> impl Iterator<Item = (&u64, &RegionDescriptor)> {
        self.regions.iter()
    }

    /// Tracks an already existing range of the heap as a region, replacing any
    /// descriptor previously recorded for `address`.
    pub fn record_region(
        &mut self,
        address: u64,
        descriptor: RegionDescriptor,
    ) -> Result<(), EnvError> {
        self.check_range(address, descriptor.byte_length as u64)?;
        self.regions.insert(address, descriptor);
        Ok(())
    }

    /// Bytes of the tracked region containing `address`, from `address` to the
    /// end of that region. Regions recorded inside a larger one shadow it only
    /// over their own range.
    pub fn fetch_region(&self, address: u64) -> Result<&[u8], EnvError> {
        if address >= self.memory.len() as u64 {
            return Err(self.untracked(address));
        }
        let end = self
            .regions
            .range(..=address)
            .rev()
            .map(|(base, descriptor)| (*base, base + descriptor.byte_length as u64))
            .find(|(base, end)| address < *end || (address == *base && base == end))
            .map(|(_, end)| end)
            .ok_or_else(|| self.untracked(address))?;
        self.read(address, end - address)
    }

    /// Bytes of the region at `address` up to the first zero byte.
    pub fn fetch_c_str(&self, address: u64) -> Result<&[u8], EnvError> {
        Ok(trim_at_nul(self.fetch_region(address)?))
    }

    pub fn read(&self, address: u64, length: u64) -> Result<&[u8], EnvError> {
        let range = self.check_range(address, length)?;
        Ok(&self.memory[range])
    }

    pub fn write(&mut self, address: u64, bytes: &[u8]) -> Result<(), EnvError> {
        let range = self.check_range(address, bytes.len() as u64)?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Copies `length` bytes from `src` to `dest`. Both ranges must lie in the heap.
    pub fn copy_within(&mut self, dest: u64, src: u64, length: u64) -> Result<(), EnvError> {
        let source = self.check_range(src, length)?;
        let target = self.check_range(dest, length)?;
        self.memory.copy_within(source, target.start);
        Ok(())
    }

    pub fn store_bytes(&mut self, bytes: &[u8], element_type: ElementType) -> Result<u64, EnvError> {
        let address = self.allocate(bytes.len() as i64, element_type)?;
        self.write(address, bytes)?;
        Ok(address)
    }

    /// Stores `text` followed by a zero terminator as a `String` region.
    pub fn store_str(&mut self, text: &str) -> Result<u64, EnvError> {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        self.store_bytes(&bytes, ElementType::String)
    }

    pub fn store_i32s(&mut self, values: &[i32]) -> Result<u64, EnvError> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.store_bytes(&bytes, ElementType::Int32)
    }

    pub fn store_i64s(&mut self, values: &[i64]) -> Result<u64, EnvError> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.store_bytes(&bytes, ElementType::Int64)
    }

    fn check_range(&self, address: u64, length: u64) -> Result<Range<usize>, EnvError> {
        let limit = self.memory.len() as u64;
        match address.checked_add(length) {
            Some(end) if end <= limit => Ok(address as usize..end as usize),
            _ => Err(EnvError::OutOfBounds {
                address,
                length,
                limit,
            }),
        }
    }

    fn untracked(&self, address: u64) -> EnvError {
        EnvError::OutOfBounds {
            address,
            length: 0,
            limit: self.memory.len() as u64,
        }
    }
}

fn trim_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
