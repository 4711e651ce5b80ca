use vm_env::{get_default_settings, EnvError, Environment, OverlapPolicy, VirtualMachine};

/// Minimal operand stack standing in for the interpreter.
#[derive(Debug, Default)]
pub struct OperandStack {
    pub values: Vec<u64>,
    pub pc: usize,
}

impl VirtualMachine for OperandStack {
    type Continuation = usize;

    fn save_continuation(&mut self) -> usize {
        self.pc
    }

    fn restore_continuation(&mut self, pc: usize) {
        self.pc = pc + 1;
    }

    fn push_u64(&mut self, value: u64) {
        self.values.push(value);
    }
}

pub struct MachineBuilder {
    reserved: Option<usize>,
    limit: Option<usize>,
    overlap: Option<OverlapPolicy>,
    message: Option<Vec<u8>>,
}

#[allow(dead_code)]
impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            reserved: None,
            limit: None,
            overlap: None,
            message: None,
        }
    }

    pub fn build(self) -> TestMachine {
        let mut settings = get_default_settings();
        settings.heap.reserved = self.reserved.unwrap_or(settings.heap.reserved);
        settings.heap.limit = self.limit.unwrap_or(settings.heap.limit);
        settings.memcpy.overlap = self.overlap.unwrap_or(settings.memcpy.overlap);
        let mut env = Environment::new(settings);
        if let Some(message) = self.message {
            env.set_message(message);
        }
        TestMachine {
            env,
            stack: OperandStack::default(),
        }
    }

    pub fn with_reserved(mut self, reserved: usize) -> Self {
        self.reserved = Some(reserved);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = Some(overlap);
        self
    }

    pub fn with_message(mut self, message: &[u8]) -> Self {
        self.message = Some(message.to_vec());
        self
    }
}

pub struct TestMachine {
    pub env: Environment,
    pub stack: OperandStack,
}

#[allow(dead_code)]
impl TestMachine {
    /// Calls `name` expecting a value and pops it from the operand stack.
    pub fn call(&mut self, name: &str, arguments: &[u64]) -> Result<u64, EnvError> {
        let depth = self.stack.values.len();
        self.env
            .call_import(&mut self.stack, name, arguments.to_vec(), true)?;
        assert_eq!(self.stack.values.len(), depth + 1, "{} pushed no value", name);
        Ok(self.stack.values.pop().unwrap())
    }

    /// Calls `name` from a call site that discards the result.
    pub fn call_void(&mut self, name: &str, arguments: &[u64]) -> Result<(), EnvError> {
        let depth = self.stack.values.len();
        self.env
            .call_import(&mut self.stack, name, arguments.to_vec(), false)?;
        assert_eq!(self.stack.values.len(), depth);
        Ok(())
    }

    pub fn store_str(&mut self, text: &str) -> u64 {
        self.env.heap_mut().store_str(text).unwrap()
    }

    pub fn c_str(&self, address: u64) -> String {
        String::from_utf8(self.env.heap().fetch_c_str(address).unwrap().to_vec()).unwrap()
    }
}
