use log::{debug, error};

use crate::commons::config::EnvSettings;

pub mod builtins;
pub mod codec;
mod errors;
mod frame;
mod memory;
mod registry;

pub use codec::{Param, ParamKind, ParamReader, ParamWriter};
pub use errors::EnvError;
pub use frame::{CallFrame, Invocation, ParamCursor};
pub use memory::{ElementType, Heap, RegionDescriptor};
pub use registry::{NativeContext, NativeFn, NativeRegistry, RegistryBuilder};

const LOG_TARGET: &str = "VM_ENV";

/// Interpreter side of a native call.
///
/// The interpreter saves its execution state before control enters a native
/// function and gets it back once the function returns.
pub trait VirtualMachine {
    type Continuation;

    fn save_continuation(&mut self) -> Self::Continuation;
    fn restore_continuation(&mut self, continuation: Self::Continuation);
    /// Pushes a value onto the operand stack.
    fn push_u64(&mut self, value: u64);
}

/// Native function environment of one VM instance.
///
/// Owns the guest heap, the native functions the guest may import and the
/// parameter cursor shared by successive `Read*Param` calls. Calls are executed
/// one at a time.
#[derive(Debug)]
pub struct Environment {
    settings: EnvSettings,
    heap: Heap,
    registry: NativeRegistry,
    param_cursor: ParamCursor,
    message: Option<Vec<u8>>,
    in_flight: Option<String>,
}

impl Environment {
    /// Environment with every builtin native function.
    pub fn new(settings: EnvSettings) -> Self {
        Self::with_registry(settings, NativeRegistry::with_builtins())
    }

    pub fn with_registry(settings: EnvSettings, registry: NativeRegistry) -> Self {
        Self {
            heap: Heap::new(&settings.heap),
            settings,
            registry,
            param_cursor: ParamCursor::new(),
            message: None,
            in_flight: None,
        }
    }

    pub fn settings(&self) -> &EnvSettings {
        &self.settings
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn registry(&self) -> &NativeRegistry {
        &self.registry
    }

    pub fn param_cursor(&self) -> ParamCursor {
        self.param_cursor
    }

    /// Starts a new parameter reading sequence.
    pub fn reset_param_cursor(&mut self) {
        self.param_cursor.reset();
    }

    /// Message handed to the guest by `ReadMessage`.
    pub fn set_message(&mut self, message: Vec<u8>) {
        self.message = Some(message);
    }

    pub fn take_message(&mut self) -> Option<Vec<u8>> {
        self.message.take()
    }

    /// Runs the native function imported as `name`.
    ///
    /// On success the continuation saved from `vm` is restored and, when the call
    /// site `expects_return`, the value produced by the function is pushed onto
    /// the operand stack. The produced value is also returned. On failure the
    /// error is fatal to the guest call: nothing is pushed, the continuation is
    /// dropped and the parameter cursor keeps its previous position.
    ///
    /// A call dispatched while another one has not completed is rejected with
    /// [EnvError::ReentrantCall]. This also holds after a native function panicked.
    pub fn call_import<V: VirtualMachine>(
        &mut self,
        vm: &mut V,
        name: &str,
        arguments: Vec<u64>,
        expects_return: bool,
    ) -> Result<Option<u64>, EnvError> {
        if let Some(current) = &self.in_flight {
            error!(
                "{}: {} dispatched while {} is in flight",
                LOG_TARGET, name, current
            );
            return Err(EnvError::ReentrantCall(name.to_owned()));
        }
        let mut invocation = Invocation {
            frame: CallFrame::new(name, arguments, expects_return, self.param_cursor),
            continuation: vm.save_continuation(),
        };
        self.in_flight = Some(name.to_owned());
        let mut context = NativeContext {
            heap: &mut self.heap,
            frame: &mut invocation.frame,
            message: self.message.as_deref(),
            settings: &self.settings,
        };
        let result = self.registry.invoke(name, &mut context);
        self.in_flight = None;
        let value = match result {
            Ok(value) => value,
            Err(error) => {
                error!("{}: Native call {} failed: {}", LOG_TARGET, name, error);
                return Err(error);
            }
        };
        self.param_cursor = invocation.frame.param_cursor;
        vm.restore_continuation(invocation.continuation);
        if let (true, Some(value)) = (expects_return, value) {
            debug!("{}: {} returned {}", LOG_TARGET, name, value);
            vm.push_u64(value);
        }
        Ok(value)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(EnvSettings::default())
    }
}
