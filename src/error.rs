use thiserror::Error;

use crate::memory::TypeAddr;

pub type Result<T> = std::result::Result<T, VmError>;

/// Conditions that stop the machine. None of them are recoverable by retrying:
/// a step either runs to completion or leaves the machine at the faulting
/// instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Program does not fit in the region starting at 0x200.
    #[error("program of {len} bytes exceeds the {capacity} byte program region")]
    CapacityExceeded { len: usize, capacity: usize },
    #[error("unrecognized instruction {opcode:#06x} at {addr:#05x}")]
    UnrecognizedInstruction { opcode: u16, addr: TypeAddr },
    #[error("call stack overflow at {addr:#05x}")]
    StackOverflow { addr: TypeAddr },
    #[error("return with empty call stack at {addr:#05x}")]
    StackUnderflow { addr: TypeAddr },
    #[error("memory access out of bounds at {addr:#06x}")]
    OutOfBounds { addr: usize },
    /// A program asked for a key outside 0x0..=0xF.
    #[error("key {key:#04x} is not on the keypad")]
    InvalidKey { key: u8 },
}
