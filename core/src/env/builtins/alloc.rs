use log::warn;

use crate::env::errors::EnvError;
use crate::env::memory::ElementType;
use crate::env::registry::NativeContext;

const LOG_TARGET: &str = "VM_ENV_ALLOC";

/// `calloc(count, length)`: allocates `count * length` untyped bytes. Both
/// operands are unsigned; a product past `i64::MAX` is `HeapExhausted`.
pub fn calloc(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [count, length] = ctx.frame.expect_args::<2>()?;
    let size = count
        .checked_mul(length)
        .and_then(|size| i64::try_from(size).ok())
        .ok_or_else(|| EnvError::HeapExhausted {
            requested: count.saturating_mul(length),
            limit: ctx.heap.limit() as u64,
        })?;
    let address = ctx.heap.allocate(size, ElementType::Unknown)?;
    Ok(Some(address))
}

/// `malloc(size)`
pub fn malloc(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [size] = ctx.frame.expect_args::<1>()?;
    let address = ctx.heap.allocate(size as i64, ElementType::Unknown)?;
    Ok(Some(address))
}

/// `arrayLen(address)`: element count of the region allocated at `address`,
/// zero for addresses the allocator never returned.
pub fn array_len(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [address] = ctx.frame.expect_args::<1>()?;
    let count = match ctx.heap.region(address) {
        Some(descriptor) => descriptor.element_count(),
        None => {
            warn!("{}: arrayLen of untracked address {}", LOG_TARGET, address);
            0
        }
    };
    Ok(Some(count))
}
