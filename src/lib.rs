pub mod error;
pub mod gameboy;
pub mod joypad;
pub mod lr35902;
pub mod memory;
pub mod video;

#[cfg(test)]
mod tests;

pub use crate::error::DotError;
pub use crate::gameboy::{GameBoy, RunOptions};
pub use crate::joypad::Button;
