use log::warn;

use crate::env::codec::{parse_param_list, render_result, ParamKind};
use crate::env::errors::EnvError;
use crate::env::registry::NativeContext;

const LOG_TARGET: &str = "VM_ENV_MARSHAL";

/// `RawUnmashal(dest, _, src)`: copies the region at `src` verbatim to `dest`.
pub fn raw_unmarshal(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [dest, _, src] = ctx.frame.expect_args::<3>()?;
    let bytes = ctx.heap.fetch_region(src)?.to_vec();
    ctx.heap.write(dest, &bytes)?;
    Ok(None)
}

/// `JsonUnmashal(dest, size, schema)`: encodes the JSON parameter list found at
/// `schema` and writes the result to `dest`. `size` is only compared against the
/// encoded length for diagnostics.
pub fn json_unmarshal(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [dest, size, schema] = ctx.frame.expect_args::<3>()?;
    let params = parse_param_list(ctx.heap.fetch_c_str(schema)?)?;
    let encoded_len: usize = params.iter().map(|param| param.kind().encoded_len()).sum();
    // The destination must already exist before arrays and strings are stored.
    ctx.heap.read(dest, encoded_len as u64)?;
    let mut encoded = Vec::with_capacity(encoded_len);
    for param in params.iter() {
        param.encode(ctx.heap, &mut encoded)?;
    }
    if encoded.len() as u64 != size {
        warn!(
            "{}: JsonUnmashal encoded {} bytes, {} expected",
            LOG_TARGET,
            encoded.len(),
            size
        );
    }
    ctx.heap.write(dest, &encoded)?;
    Ok(None)
}

/// `JsonMashal(value, type)`: renders `value` according to the type tag stored at
/// `type` and returns the address of the resulting JSON text.
pub fn json_marshal(ctx: &mut NativeContext<'_>) -> Result<Option<u64>, EnvError> {
    let [value, tag] = ctx.frame.expect_args::<2>()?;
    let kind: ParamKind = String::from_utf8_lossy(ctx.heap.fetch_c_str(tag)?).parse()?;
    let descriptor = render_result(ctx.heap, value, kind)?;
    let json = serde_json::to_string(&descriptor)?;
    let address = ctx.heap.store_str(&json)?;
    Ok(Some(address))
}
