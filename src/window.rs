use std::time::Duration;

use anyhow::anyhow;
use chipvm::display::{FrameBuffer, HEIGHT, WIDTH};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

pub struct Screen {
    pixel_buffer: Vec<u32>,
    pub window: Window,
}

fn from_u16_rgb(r: u16, g: u16, b: u16) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

pub fn scale_from(factor: u8) -> Option<Scale> {
    match factor {
        1 => Some(Scale::X1),
        2 => Some(Scale::X2),
        4 => Some(Scale::X4),
        8 => Some(Scale::X8),
        16 => Some(Scale::X16),
        32 => Some(Scale::X32),
        _ => None,
    }
}

impl Screen {
    pub fn new(title: &str, scale: Scale) -> anyhow::Result<Self> {
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("failed to open window: {e}"))?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(Duration::from_micros(16600)));
        Ok(Self {
            pixel_buffer: vec![0; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn reload_requested(&self) -> bool {
        self.window.is_key_pressed(Key::F1, KeyRepeat::No)
    }

    pub fn present(&mut self, fb: &FrameBuffer) -> anyhow::Result<()> {
        let (on, off) = (from_u16_rgb(0, 127, 255), from_u16_rgb(0, 0, 0));
        for (pixel, &lit) in self.pixel_buffer.iter_mut().zip(fb.cells()) {
            *pixel = if lit { on } else { off };
        }
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
            .map_err(|e| anyhow!("failed to present frame: {e}"))
    }

    /// Pumps window events without redrawing.
    pub fn idle(&mut self) {
        self.window.update();
    }
}
