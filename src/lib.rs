pub mod apu;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod ppu;
pub mod state;

pub use cartridge::{Cartridge, CartridgeError, Mirror};
pub use console::{Config, Console};
pub use controller::Controller;
pub use state::SaveState;

/// NTSC CPU frequency in Hz.
pub const CPU_FREQUENCY: f64 = 1_789_773.0;

#[cfg(test)]
pub(crate) mod test_utils;
