use anyhow::{Context, Result};
use minifb::{Key, Window, WindowOptions};

use crate::types::Frame;

/// minifb surface the render loop presents frames to. minifb wants packed
/// 0RGB u32 pixels, so presentation converts from the pipeline's RGBA.
pub struct GameWindow {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl GameWindow {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .context("failed to open game window")?;

        Ok(GameWindow {
            window,
            buffer: vec![0u32; (width * height) as usize],
            width: width as usize,
            height: height as usize,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        let pixels = (frame.width * frame.height) as usize;
        for (dst, src) in self
            .buffer
            .iter_mut()
            .zip(frame.rgba.chunks_exact(4).take(pixels))
        {
            *dst = (u32::from(src[0]) << 16) | (u32::from(src[1]) << 8) | u32::from(src[2]);
        }
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .context("failed to present frame")?;
        Ok(())
    }
}
