use log::trace;

use super::errors::EnvError;

const LOG_TARGET: &str = "VM_ENV_FRAME";

/// Read position inside a parameter stream.
///
/// A sequence of `Read*Param` calls shares one cursor as long as they read the
/// same address. Reading a different address starts a new sequence at offset 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamCursor {
    address: Option<u64>,
    offset: usize,
}

impl ParamCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next read from the stream at `address`.
    pub fn position(&self, address: u64) -> usize {
        match self.address {
            Some(current) if current == address => self.offset,
            _ => 0,
        }
    }

    pub fn advance_to(&mut self, address: u64, offset: usize) {
        trace!(
            "{}: Param cursor of {} moved to {}",
            LOG_TARGET,
            address,
            offset
        );
        self.address = Some(address);
        self.offset = offset;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn address(&self) -> Option<u64> {
        self.address
    }
}

/// Scratch state of the native call being executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    function: String,
    arguments: Vec<u64>,
    expects_return: bool,
    pub param_cursor: ParamCursor,
}

impl CallFrame {
    pub fn new(
        function: &str,
        arguments: Vec<u64>,
        expects_return: bool,
        param_cursor: ParamCursor,
    ) -> Self {
        Self {
            function: function.to_owned(),
            arguments,
            expects_return,
            param_cursor,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn arguments(&self) -> &[u64] {
        &self.arguments
    }

    pub fn expects_return(&self) -> bool {
        self.expects_return
    }

    /// Arguments of the call, checked to be exactly `N`.
    pub fn expect_args<const N: usize>(&self) -> Result<[u64; N], EnvError> {
        <[u64; N]>::try_from(self.arguments.as_slice()).map_err(|_| {
            EnvError::InvalidParameterCount {
                function: self.function.clone(),
                expected: N,
                found: self.arguments.len(),
            }
        })
    }
}

/// A call frame together with the interpreter state saved when the call was
/// dispatched. The continuation is given back to the interpreter once the
/// native function returns.
#[derive(Debug)]
pub struct Invocation<C> {
    pub frame: CallFrame,
    pub continuation: C,
}
