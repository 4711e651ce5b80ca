//! Native functions available to every guest program.
mod alloc;
mod marshal;
mod memory_ops;
mod params;

pub use alloc::{array_len, calloc, malloc};
pub use marshal::{json_marshal, json_unmarshal, raw_unmarshal};
pub use memory_ops::{memcpy, read_message, strcmp};
pub use params::{read_int32_param, read_int64_param, read_string_param};

use super::registry::RegistryBuilder;

/// Import names the guest binds to.
pub mod names {
    pub const CALLOC: &str = "calloc";
    pub const MALLOC: &str = "malloc";
    pub const ARRAY_LEN: &str = "arrayLen";
    pub const MEMCPY: &str = "memcpy";
    pub const STRCMP: &str = "strcmp";
    pub const READ_INT32_PARAM: &str = "ReadInt32Param";
    pub const READ_INT64_PARAM: &str = "ReadInt64Param";
    pub const READ_STRING_PARAM: &str = "ReadStringParam";
    pub const READ_MESSAGE: &str = "ReadMessage";
    pub const RAW_UNMARSHAL: &str = "RawUnmashal";
    pub const JSON_UNMARSHAL: &str = "JsonUnmashal";
    pub const JSON_MARSHAL: &str = "JsonMashal";
    pub const RAW_UNMARSHAL_ALIAS: &str = "RawUnmarshal";
    pub const JSON_UNMARSHAL_ALIAS: &str = "JsonUnmarshal";
    pub const JSON_MARSHAL_ALIAS: &str = "JsonMarshal";
}

pub(crate) fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(names::CALLOC, calloc)
        .register(names::MALLOC, malloc)
        .register(names::ARRAY_LEN, array_len)
        .register(names::MEMCPY, memcpy)
        .register(names::STRCMP, strcmp)
        .register(names::READ_INT32_PARAM, read_int32_param)
        .register(names::READ_INT64_PARAM, read_int64_param)
        .register(names::READ_STRING_PARAM, read_string_param)
        .register(names::READ_MESSAGE, read_message)
        .register(names::RAW_UNMARSHAL, raw_unmarshal)
        .register(names::JSON_UNMARSHAL, json_unmarshal)
        .register(names::JSON_MARSHAL, json_marshal)
        .register(names::RAW_UNMARSHAL_ALIAS, raw_unmarshal)
        .register(names::JSON_UNMARSHAL_ALIAS, json_unmarshal)
        .register(names::JSON_MARSHAL_ALIAS, json_marshal)
}
