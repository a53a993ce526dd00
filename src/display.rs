pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// 64x32 monochrome screen, row-major. `dirty` is raised by every mutation and
/// lowered by whoever presents the buffer.
pub struct FrameBuffer {
    bit_buffer: Vec<bool>,
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![false; WIDTH * HEIGHT],
            dirty: false,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer.fill(false);
        self.dirty = true;
    }

    /// Toggles the cell at (x, y), wrapping both coordinates. Returns whether
    /// the cell was lit before the toggle.
    pub fn xor_pixel(&mut self, x: usize, y: usize) -> bool {
        let index = (y % HEIGHT) * WIDTH + (x % WIDTH);
        let previous = self.bit_buffer[index];
        self.bit_buffer[index] = !previous;
        self.dirty = true;
        previous
    }

    /// XORs an 8-pixel-wide sprite in at (x, y). Returns true if any lit cell
    /// was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collided = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 1 {
                    collided |= self.xor_pixel(x as usize + j, y as usize + i);
                }
            }
        }
        // an all-zero sprite still counts as a draw
        self.dirty = true;
        collided
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.bit_buffer[(y % HEIGHT) * WIDTH + (x % WIDTH)]
    }

    pub fn cells(&self) -> &[bool] {
        &self.bit_buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_pixel_reports_previous_state() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.is_dirty());
        assert!(!fb.xor_pixel(3, 4));
        assert!(fb.pixel(3, 4));
        assert!(fb.is_dirty());
        fb.clear_dirty();
        assert!(fb.xor_pixel(3, 4));
        assert!(!fb.pixel(3, 4));
        assert!(fb.is_dirty());
    }

    #[test]
    fn coordinates_wrap() {
        let mut fb = FrameBuffer::new();
        fb.xor_pixel(64 + 2, 32 + 1);
        assert!(fb.pixel(2, 1));
        assert!(fb.cells()[WIDTH + 2]);
    }

    #[test]
    fn paint_wraps_across_the_right_edge() {
        let mut fb = FrameBuffer::new();
        let collided = fb.paint(60, 31, &[0xFF, 0x80]);
        assert!(!collided);
        for x in 60..64 {
            assert!(fb.pixel(x, 31));
        }
        for x in 0..4 {
            assert!(fb.pixel(x, 31));
        }
        // second row wraps to the top
        assert!(fb.pixel(60, 0));
        assert_eq!(fb.cells().iter().filter(|&&c| c).count(), 9);
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xFF; 5]);
        fb.clear_dirty();
        fb.clear_buffer();
        assert!(fb.cells().iter().all(|c| !c));
        assert!(fb.is_dirty());
    }
}
