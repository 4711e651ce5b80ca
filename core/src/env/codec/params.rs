use crate::env::errors::EnvError;

use super::varbytes;

/// Sequential reader over a flat parameter stream.
pub struct ParamReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ParamReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::at(buffer, 0)
    }

    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn read_u32(&mut self) -> Result<u32, EnvError> {
        let bytes = self.take(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw))
    }

    pub fn read_u64(&mut self) -> Result<u64, EnvError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Reads a length-prefixed byte string and skips the terminator byte that
    /// follows its content. Only the content is returned.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], EnvError> {
        let (length, prefix) = varbytes::decode_len(self.buffer, self.offset)?;
        let start = self.offset + prefix;
        let available = (self.buffer.len() - start) as u64;
        if length >= available {
            return Err(EnvError::OutOfBounds {
                address: start as u64,
                length: length.saturating_add(1),
                limit: self.buffer.len() as u64,
            });
        }
        let end = start + length as usize;
        let content = &self.buffer[start..end];
        self.offset = end + 1;
        Ok(content)
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8], EnvError> {
        let end = self.offset + width;
        if end > self.buffer.len() {
            return Err(EnvError::OutOfBounds {
                address: self.offset as u64,
                length: width as u64,
                limit: self.buffer.len() as u64,
            });
        }
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }
}

/// Builds parameter streams in the layout [ParamReader] consumes.
#[derive(Debug, Default, Clone)]
pub struct ParamWriter {
    buffer: Vec<u8>,
}

impl ParamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(mut self, value: u32) -> Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u64(mut self, value: u64) -> Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(mut self, bytes: &[u8]) -> Self {
        varbytes::encode_len(bytes.len() as u64, &mut self.buffer);
        self.buffer.extend_from_slice(bytes);
        self.buffer.push(0);
        self
    }

    pub fn write_str(self, text: &str) -> Self {
        self.write_bytes(text.as_bytes())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
