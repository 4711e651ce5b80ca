use crate::env::codec::ParamReader;
use crate::env::errors::EnvError;
use crate::env::memory::ElementType;
use crate::env::registry::NativeContext;

/// `ReadInt32Param(address)`: next little-endian `u32` of the stream at `address`.
pub fn read_int32_param(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [address] = ctx.frame.expect_args::<1>()?;
    let stream = ctx.heap.fetch_region(address)?;
    let mut reader = ParamReader::at(stream, ctx.frame.param_cursor.position(address));
    let value = reader.read_u32()?;
    ctx.frame.param_cursor.advance_to(address, reader.offset());
    Ok(Some(value as u64))
}

/// `ReadInt64Param(address)`: next little-endian `u64` of the stream at `address`.
pub fn read_int64_param(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [address] = ctx.frame.expect_args::<1>()?;
    let stream = ctx.heap.fetch_region(address)?;
    let mut reader = ParamReader::at(stream, ctx.frame.param_cursor.position(address));
    let value = reader.read_u64()?;
    ctx.frame.param_cursor.advance_to(address, reader.offset());
    Ok(Some(value))
}

/// `ReadStringParam(address)`: copies the next length-prefixed string of the
/// stream to a new zero-terminated region and returns its address.
pub fn read_string_param(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [address] = ctx.frame.expect_args::<1>()?;
    let stream = ctx.heap.fetch_region(address)?;
    let mut reader = ParamReader::at(stream, ctx.frame.param_cursor.position(address));
    let mut content = reader.read_bytes()?.to_vec();
    let offset = reader.offset();
    content.push(0);
    let string = ctx.heap.store_bytes(&content, ElementType::Unknown)?;
    ctx.frame.param_cursor.advance_to(address, offset);
    Ok(Some(string))
}
