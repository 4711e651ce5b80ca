//! Native host-function environment of a stack-based bytecode VM.
//!
//! Guest programs executed by the VM run against a simulated linear memory and
//! cannot allocate, format strings or exchange structured data with the host on
//! their own. They import a small set of native functions (`malloc`, `memcpy`,
//! parameter readers, JSON marshalers...) that this crate implements on top of
//! the guest heap.
//!
//! The interpreter keeps one [Environment] per VM instance. When it reaches a
//! call to an imported function it hands the popped arguments to
//! [Environment::call_import], which runs the native function and, if the call
//! site expects a value, pushes the result back through the [VirtualMachine]
//! trait.
//!
//! # Basic usage
//! ```
//! use vm_env::{get_default_settings, Environment, VirtualMachine};
//!
//! struct Machine {
//!     stack: Vec<u64>,
//!     pc: usize,
//! }
//!
//! impl VirtualMachine for Machine {
//!     type Continuation = usize;
//!
//!     fn save_continuation(&mut self) -> usize {
//!         self.pc
//!     }
//!
//!     fn restore_continuation(&mut self, pc: usize) {
//!         self.pc = pc;
//!     }
//!
//!     fn push_u64(&mut self, value: u64) {
//!         self.stack.push(value);
//!     }
//! }
//!
//! let mut env = Environment::new(get_default_settings());
//! let mut vm = Machine { stack: vec![], pc: 0 };
//!
//! // The guest asks for 16 bytes and then for their element count
//! env.call_import(&mut vm, "malloc", vec![16], true).unwrap();
//! let address = vm.stack.pop().unwrap();
//! env.call_import(&mut vm, "arrayLen", vec![address], true).unwrap();
//! assert_eq!(vm.stack.pop(), Some(16));
//! ```
//!
pub(crate) mod commons;
pub mod env;
pub mod error;

pub use commons::config::{
    get_default_settings, EnvSettings, HeapSettings, MemcpySettings, OverlapPolicy,
};
pub use env::{
    builtins::names, CallFrame, ElementType, EnvError, Environment, Heap, NativeContext,
    NativeFn, NativeRegistry, ParamCursor, ParamKind, ParamReader, ParamWriter,
    RegionDescriptor, RegistryBuilder, VirtualMachine,
};
pub use error::Error;
