use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    decode::OpCodes,
    display::FrameBuffer,
    error::{Result, VmError},
    keyboard::Keyboard,
    memory::{glyph_offset, Memory, TypeAddr},
    registers::Registers,
};

/// Receives the one-shot beep raised when the sound timer runs out.
pub trait Buzzer {
    fn beep(&mut self);
}

/// Drops every beep.
pub struct Silent;

impl Buzzer for Silent {
    fn beep(&mut self) {}
}

/// What the program counter does once an instruction has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PcUpdate {
    Next,
    Skip,
    Jump(TypeAddr),
    // re-run the same instruction next step
    Hold,
}

impl PcUpdate {
    fn skip_if(cond: bool) -> Self {
        if cond {
            Self::Skip
        } else {
            Self::Next
        }
    }
}

pub struct Emulator {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    keyboard: Keyboard,
    rng: StdRng,
    buzzer: Box<dyn Buzzer>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same machine, but CXNN draws from a reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            keyboard: Keyboard::new(),
            rng,
            buzzer: Box::new(Silent),
        }
    }

    pub fn set_buzzer(&mut self, buzzer: Box<dyn Buzzer>) {
        self.buzzer = buzzer;
    }

    /// Resets the whole machine and places `rom` at 0x200. An oversized rom is
    /// rejected before anything is reset.
    pub fn load(&mut self, rom: &[u8]) -> Result<()> {
        self.mem.load_rom(rom)?;
        self.regs = Registers::new();
        self.fb = FrameBuffer::new();
        // blank screen still needs presenting
        self.fb.clear_buffer();
        self.keyboard.reset();
        debug!("machine reset, {} byte program loaded", rom.len());
        Ok(())
    }

    pub fn fetch_decode(&self) -> Result<OpCodes> {
        let pc = self.regs.pc.get();
        let ins = self.mem.read16(pc)?;
        OpCodes::decode_raw(ins).ok_or(VmError::UnrecognizedInstruction {
            opcode: ins,
            addr: pc,
        })
    }

    /// Runs exactly one instruction, then ticks both timers. On error the
    /// program counter still points at the faulting instruction.
    pub fn tick(&mut self) -> Result<()> {
        let pc = self.regs.pc.get();
        let operation = self.fetch_decode()?;
        trace!("{pc:#05x}: {operation:?}");

        match self.execute_ins(operation, pc)? {
            PcUpdate::Next => self.regs.pc.increment(),
            PcUpdate::Skip => self.regs.pc.advance(4),
            PcUpdate::Jump(addr) => self.regs.pc.set_addr(addr),
            PcUpdate::Hold => {}
        }

        self.sync_timers();
        Ok(())
    }

    /// Alias of [`Emulator::tick`].
    pub fn step(&mut self) -> Result<()> {
        self.tick()
    }

    fn execute_ins(&mut self, ins: OpCodes, at: TypeAddr) -> Result<PcUpdate> {
        let update = match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
                PcUpdate::Next
            }
            OpCodes::PopSubroutine => {
                let addr = self.regs.stack.pop(at)?;
                // return lands after the call instruction
                self.regs.pc.set_addr(addr);
                PcUpdate::Next
            }
            OpCodes::Jump(addr) => PcUpdate::Jump(addr),
            OpCodes::PushSubroutine(addr) => {
                self.regs.stack.push(at, at)?;
                PcUpdate::Jump(addr)
            }
            OpCodes::SkipEqualConstant(vx, nn) => PcUpdate::skip_if(self.regs.get(vx) == nn),
            OpCodes::SkipNotEqualConstant(vx, nn) => PcUpdate::skip_if(self.regs.get(vx) != nn),
            OpCodes::SkipEqualRegister(vx, vy) => {
                PcUpdate::skip_if(self.regs.get(vx) == self.regs.get(vy))
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                PcUpdate::skip_if(self.regs.get(vx) != self.regs.get(vy))
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
                PcUpdate::Next
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
                PcUpdate::Next
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
                PcUpdate::Next
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
                PcUpdate::Next
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
                PcUpdate::Next
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
                PcUpdate::Next
            }
            // carry lands after the sum, so it wins when X is F
            OpCodes::Add(vx, vy) => {
                let (sum, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_register(vx, sum);
                self.regs.set_flag(carry);
                PcUpdate::Next
            }
            // the rest of the group writes VF first, so the result wins when X is F
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(y <= x); // no borrow
                self.regs.set_register(vx, x.wrapping_sub(y));
                PcUpdate::Next
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(x <= y);
                self.regs.set_register(vx, y.wrapping_sub(x));
                PcUpdate::Next
            }
            OpCodes::RightShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(0xF, vx_value & 1);
                self.regs.set_register(vx, vx_value >> 1);
                PcUpdate::Next
            }
            OpCodes::LeftShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(0xF, vx_value >> 7);
                self.regs.set_register(vx, vx_value << 1);
                PcUpdate::Next
            }
            OpCodes::SetIndexRegister(addr) => {
                self.regs.index.set_addr(addr);
                PcUpdate::Next
            }
            OpCodes::JumpWithOffset(addr) => PcUpdate::Jump(addr + self.regs.get(0) as u16),
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
                PcUpdate::Next
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // From I to I + N, one byte (8 pixels) per row
                let sprite = self
                    .mem
                    .slice(self.regs.index.get() as usize, height as usize)?;
                let vf = self.fb.paint(x, y, sprite);
                self.regs.set_flag(vf);
                PcUpdate::Next
            }
            OpCodes::SkipIfPressed(vx) => {
                PcUpdate::skip_if(self.keyboard.is_down(self.regs.get(vx))?)
            }
            OpCodes::SkipIfNotPressed(vx) => {
                PcUpdate::skip_if(!self.keyboard.is_down(self.regs.get(vx))?)
            }
            OpCodes::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.regs.delay.get());
                PcUpdate::Next
            }
            OpCodes::GetKey(vx) => match self.keyboard.first_down() {
                Some(key) => {
                    self.regs.set_register(vx, key);
                    PcUpdate::Next
                }
                None => PcUpdate::Hold,
            },
            OpCodes::CopyRegisterToDelay(vx) => {
                self.regs.delay.set(self.regs.get(vx));
                PcUpdate::Next
            }
            OpCodes::CopyRegisterToSound(vx) => {
                self.regs.sound.set(self.regs.get(vx));
                PcUpdate::Next
            }
            OpCodes::AddToIndex(vx) => {
                let sum = self.regs.index.get().wrapping_add(self.regs.get(vx) as u16);
                self.regs.index.set_addr(sum);
                self.regs.set_flag(sum > 0xFFF);
                PcUpdate::Next
            }
            OpCodes::PointChar(vx) => {
                self.regs.index.set_addr(glyph_offset(self.regs.get(vx)));
                PcUpdate::Next
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let base = self.regs.index.get() as usize;
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.write8(base + i, digit)?;
                }
                PcUpdate::Next
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let base = self.regs.index.get() as usize;
                for reg in 0..=vx {
                    self.mem.write8(base + reg as usize, self.regs.get(reg))?;
                }
                self.regs.index.set_addr(base as u16 + vx as u16 + 1);
                PcUpdate::Next
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let base = self.regs.index.get() as usize;
                for reg in 0..=vx {
                    let reg_val = self.mem.read8(base + reg as usize)?;
                    self.regs.set_register(reg, reg_val);
                }
                self.regs.index.set_addr(base as u16 + vx as u16 + 1);
                PcUpdate::Next
            }
        };
        Ok(update)
    }

    pub fn sync_timers(&mut self) {
        self.regs.delay.tick();
        if self.regs.sound.tick() {
            debug!("sound timer expired, beeping");
            self.buzzer.beep();
        }
    }

    pub fn pc(&self) -> TypeAddr {
        self.regs.pc.get()
    }

    pub fn index(&self) -> TypeAddr {
        self.regs.index.get()
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn display(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn display_mut(&mut self) -> &mut FrameBuffer {
        &mut self.fb
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }
}
