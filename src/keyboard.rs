use log::warn;

use crate::error::{Result, VmError};

pub const KEY_COUNT: usize = 16;

/// The hex keypad. Written by the host between steps, only read by the machine.
#[derive(Default)]
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    /// Host-side write. Keys outside the pad are dropped.
    pub fn set_down(&mut self, key: u8, down: bool) {
        match self.keys.get_mut(key as usize) {
            Some(state) => *state = down,
            None => warn!("ignoring state change for unknown key {key:#04x}"),
        }
    }

    pub fn is_down(&self, key: u8) -> Result<bool> {
        self.keys
            .get(key as usize)
            .copied()
            .ok_or(VmError::InvalidKey { key })
    }

    /// Lowest-numbered key currently held.
    pub fn first_down(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|k| k as u8)
    }
}
