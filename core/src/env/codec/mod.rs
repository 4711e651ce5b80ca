mod marshal;
mod params;
pub mod varbytes;

pub use marshal::{
    parse_param_list, render_result, Param, ParamDescriptor, ParamKind, ParamList,
    ResultDescriptor,
};
pub use params::{ParamReader, ParamWriter};
