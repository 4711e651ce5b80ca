use thiserror::Error;

/// Failures a native function can report to the interpreter.
///
/// Every variant is fatal to the current guest call: the interpreter is expected
/// to stop executing the guest program and surface the error to its own caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Native function \"{0}\" is not registered")]
    UnknownFunction(String),
    #[error("Invalid allocation size {0}")]
    InvalidSize(i64),
    #[error("Access of {length} bytes at address {address} exceeds limit {limit}")]
    OutOfBounds {
        address: u64,
        length: u64,
        limit: u64,
    },
    #[error("memcpy of {length} bytes from {src} to {dest} overlaps")]
    OverlapViolation { dest: u64, src: u64, length: u64 },
    #[error("Unsupported marshal type \"{0}\"")]
    UnsupportedType(String),
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
    #[error("Function \"{function}\" expects {expected} parameters, {found} given")]
    InvalidParameterCount {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("Heap exhausted: {requested} bytes requested, limit is {limit}")]
    HeapExhausted { requested: u64, limit: u64 },
    #[error("Native function \"{0}\" dispatched while another call is in flight")]
    ReentrantCall(String),
}

impl From<serde_json::Error> for EnvError {
    fn from(error: serde_json::Error) -> Self {
        EnvError::MalformedEncoding(error.to_string())
    }
}
