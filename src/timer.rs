/// 8-bit countdown, decremented once per executed step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    count: u8,
}

impl Timer {
    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    pub fn get(&self) -> u8 {
        self.count
    }

    /// Saturating decrement. Returns true when the count was exactly 1, i.e.
    /// this tick is the one that runs the timer out.
    pub fn tick(&mut self) -> bool {
        let expiring = self.count == 1;
        self.count = self.count.saturating_sub(1);
        expiring
    }
}
