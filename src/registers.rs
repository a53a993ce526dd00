use crate::{
    error::{Result, VmError},
    memory::{TypeAddr, PROGRAM_START},
    timer::Timer,
};

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const FLAG: u8 = 0xF;

/// V0-VF, I, PC, the call stack and both timers. Everything the machine keeps
/// outside of memory, display and keypad.
pub struct Registers {
    registers: [u8; REGISTER_COUNT],
    pub index: IndexRegister,
    pub pc: ProgramCounter,
    pub stack: Stack,
    pub delay: Timer,
    pub sound: Timer,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            index: IndexRegister(0),
            pc: ProgramCounter(PROGRAM_START),
            stack: Stack::new(),
            delay: Timer::default(),
            sound: Timer::default(),
        }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[reg_num as usize] = value;
    }

    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let reg = &mut self.registers[reg_num as usize];
        *reg = reg.wrapping_add(value);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[reg_num as usize]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.set_register(FLAG, set as u8);
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG)
    }

    pub fn all(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn advance(&mut self, n: TypeAddr) {
        self.0 = self.0.wrapping_add(n);
    }

    pub fn increment(&mut self) {
        self.advance(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    pub fn get(&self) -> TypeAddr {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    pub fn get(&self) -> TypeAddr {
        self.0
    }
}

/// Return addresses, bounded at `STACK_DEPTH` entries.
pub struct Stack {
    addresses: Vec<TypeAddr>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: Vec::with_capacity(STACK_DEPTH),
        }
    }

    /// `at` is the address of the instruction doing the push, for diagnostics.
    pub fn push(&mut self, addr: TypeAddr, at: TypeAddr) -> Result<()> {
        if self.addresses.len() >= STACK_DEPTH {
            return Err(VmError::StackOverflow { addr: at });
        }
        self.addresses.push(addr);
        Ok(())
    }

    pub fn pop(&mut self, at: TypeAddr) -> Result<TypeAddr> {
        self.addresses
            .pop()
            .ok_or(VmError::StackUnderflow { addr: at })
    }

    /// Current stack pointer.
    pub fn depth(&self) -> usize {
        self.addresses.len()
    }

    pub fn peek(&self) -> Option<TypeAddr> {
        self.addresses.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_without_touching_flag() {
        let mut regs = Registers::new();
        regs.set_register(0x3, 0xF0);
        regs.set_register(FLAG, 0x7);
        regs.add_to_register(0x3, 0x20);
        assert_eq!(regs.get(0x3), 0x10);
        assert_eq!(regs.flag(), 0x7);
    }

    #[test]
    fn starts_at_program_region() {
        let regs = Registers::new();
        assert_eq!(regs.pc.get(), 0x200);
        assert_eq!(regs.index.get(), 0);
        assert_eq!(regs.all(), &[0; 16]);
        assert_eq!(regs.stack.depth(), 0);
    }

    #[test]
    fn stack_is_bounded() {
        let mut stack = Stack::new();
        for i in 0..STACK_DEPTH as u16 {
            stack.push(0x200 + i * 2, 0x300).unwrap();
        }
        assert_eq!(stack.depth(), 16);
        assert_eq!(
            stack.push(0x400, 0x300),
            Err(VmError::StackOverflow { addr: 0x300 })
        );
        assert_eq!(stack.depth(), 16);
        assert_eq!(stack.peek(), Some(0x21E));
    }

    #[test]
    fn pop_on_empty_stack_fails() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(0x208), Err(VmError::StackUnderflow { addr: 0x208 }));
        stack.push(0x222, 0x200).unwrap();
        assert_eq!(stack.pop(0x300), Ok(0x222));
        assert_eq!(stack.depth(), 0);
    }
}
