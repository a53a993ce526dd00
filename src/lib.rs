// 16 8-bit data registers named V0 to VF
// I -> address register (12 bits)
//
// Stack of return addresses, 16 deep
//
// Delay timer & Sound timer: count down once per executed instruction until 0
// Beep when the sound timer runs out
//
// Display res: 64 width, 32 height
//
// Opcodes are 2 bytes (big-endian)
//      NNN: address
//      NN: 8-bit constant
//      N: 4-bit constant
//      X and Y: 4-bit register identifier

pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timer;

pub use emulator::{Buzzer, Emulator, Silent};
pub use error::{Result, VmError};
