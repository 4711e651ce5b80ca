use crate::env::errors::EnvError;
use crate::env::memory::{ElementType, RegionDescriptor};
use crate::env::registry::NativeContext;

/// `memcpy(dest, src, length)`: always yields 1 on success.
pub fn memcpy(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [dest, src, length] = ctx.frame.expect_args::<3>()?;
    if ctx.settings.memcpy.overlap.overlaps(dest, src, length) {
        return Err(EnvError::OverlapViolation { dest, src, length });
    }
    ctx.heap.copy_within(dest, src, length)?;
    Ok(Some(1))
}

/// `strcmp(a, b)`: 0 when the zero-terminated strings at both addresses are
/// equal, 1 otherwise. Identical addresses compare equal without reading memory.
pub fn strcmp(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [first, second] = ctx.frame.expect_args::<2>()?;
    if first == second {
        return Ok(Some(0));
    }
    let equal = ctx.heap.fetch_c_str(first)? == ctx.heap.fetch_c_str(second)?;
    Ok(Some(if equal { 0 } else { 1 }))
}

/// `ReadMessage(address, length)`: copies the message supplied by the host to
/// `address` and tracks it as an untyped region.
pub fn read_message(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [address, length] = ctx.frame.expect_args::<2>()?;
    let message = ctx
        .message
        .ok_or_else(|| EnvError::MalformedEncoding("no message available".to_owned()))?;
    if message.len() as u64 != length {
        return Err(EnvError::MalformedEncoding(format!(
            "message is {} bytes long, {} requested",
            message.len(),
            length
        )));
    }
    ctx.heap.write(address, message)?;
    ctx.heap.record_region(
        address,
        RegionDescriptor::new(ElementType::Unknown, message.len()),
    )?;
    Ok(Some(length))
}
