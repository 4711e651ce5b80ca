use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::commons::config::EnvSettings;

use super::builtins;
use super::errors::EnvError;
use super::frame::CallFrame;
use super::memory::Heap;

const LOG_TARGET: &str = "VM_ENV_REGISTRY";

/// Everything a native function may touch while it runs: the heap, the frame of
/// the current call, the host message and the environment settings.
pub struct NativeContext<'a> {
    pub heap: &'a mut Heap,
    pub frame: &'a mut CallFrame,
    pub message: Option<&'a [u8]>,
    pub settings: &'a EnvSettings,
}

/// Signature shared by every native function. `Ok(Some(value))` is the value
/// pushed to the operand stack when the call site expects one.
pub type NativeFn = fn(&mut NativeContext<'_>) -> Result<Option<u64>, EnvError>;

/// Collects native functions before freezing them in a [NativeRegistry].
#[derive(Default)]
pub struct RegistryBuilder {
    functions: HashMap<String, NativeFn>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name` unless a function with that name is
    /// already registered, in which case the first registration is kept.
    pub fn register(mut self, name: &str, handler: NativeFn) -> Self {
        if self.functions.contains_key(name) {
            warn!(
                "{}: Function {} already registered, ignoring",
                LOG_TARGET, name
            );
        } else {
            self.functions.insert(name.to_owned(), handler);
        }
        self
    }

    pub fn with_builtins(self) -> Self {
        builtins::register_builtins(self)
    }

    pub fn build(self) -> NativeRegistry {
        NativeRegistry {
            functions: self.functions,
        }
    }
}

/// Immutable mapping from import name to native function.
#[derive(Clone)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    /// Registry holding every builtin native function.
    pub fn with_builtins() -> Self {
        RegistryBuilder::new().with_builtins().build()
    }

    pub fn invoke(
        &self,
        name: &str,
        context: &mut NativeContext<'_>,
    ) -> Result<Option<u64>, EnvError> {
        let handler = self
            .functions
            .get(name)
            .ok_or_else(|| EnvError::UnknownFunction(name.to_owned()))?;
        debug!(
            "{}: Invoking {} with {} arguments",
            LOG_TARGET,
            name,
            context.frame.arguments().len()
        );
        handler(context)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    /// Full name to function mapping, for binding the interpreter's import table.
    pub fn functions(&self) -> &HashMap<String, NativeFn> {
        &self.functions
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("NativeRegistry")
            .field("functions", &names)
            .finish()
    }
}
