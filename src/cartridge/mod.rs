mod axrom;
mod bnrom;
mod camerica;
mod cnrom;
mod color_dreams;
mod cprom;
mod gxrom;
mod jaleco;
mod mmc1;
mod mmc2;
mod mmc3;
mod nina;
mod nrom;
mod uxrom;
mod vrc;

pub mod serialize;

use std::cell::RefCell;
use std::rc::Rc;

use axrom::Axrom;
use bnrom::Bnrom;
use camerica::Camerica;
use cnrom::Cnrom;
use color_dreams::ColorDreams;
use cprom::Cprom;
use gxrom::Gxrom;
use jaleco::Jaleco;
use mmc1::Mmc1;
use mmc2::Mmc2;
use mmc3::Mmc3;
use nina::Nina;
use nrom::Nrom;
use uxrom::Uxrom;
use vrc::Vrc;

use serialize::MapperData;

pub const PRG_CHUNK_SIZE: usize = 1 << 14; // 16 KiB
pub const CHR_CHUNK_SIZE: usize = 1 << 13; // 8 KiB

/// Render state the console feeds a mapper once per PPU cycle.
/// Scanline-counting mappers key their IRQ timing off this instead of
/// reaching into the PPU.
#[derive(Clone, Copy)]
pub struct MapperStepInput {
    pub ppu_cycle: usize,
    pub scanline: usize,
    pub show_background: bool,
    pub show_sprites: bool,
}

impl MapperStepInput {
    pub fn rendering(&self) -> bool {
        self.show_background || self.show_sprites
    }
}

pub trait Mapper {
    fn read(&mut self, address: usize) -> u8;
    fn write(&mut self, address: usize, value: u8);
    /// Called once per PPU cycle. Returns true when the mapper wants a CPU IRQ.
    /// Mappers never raise NMI.
    fn step(&mut self, input: MapperStepInput) -> bool {
        let _ = input;
        false
    }
    fn mirroring(&self) -> Mirror;
    fn save_state(&self) -> MapperData;
    fn load_state(&mut self, data: MapperData);
}

#[derive(Copy, Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Mirror {
    Horizontal,
    Vertical,
    Single0,
    Single1,
    FourScreen,
}

#[derive(Debug, PartialEq)]
pub enum CartridgeError {
    /// First four bytes were not "NES\x1A".
    BadMagic,
    /// File shorter than the 16-byte header.
    Truncated,
    /// Header-declared sizes don't add up to the actual file length.
    LengthMismatch { expected: usize, actual: usize },
    /// Header declares zero PRG-ROM chunks; there is nothing to execute.
    NoPrgRom,
    Io(String),
}

impl std::fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CartridgeError::BadMagic => write!(f, "signature mismatch, not an iNES file"),
            CartridgeError::Truncated => write!(f, "file too short to hold an iNES header"),
            CartridgeError::LengthMismatch { expected, actual } => write!(
                f,
                "file length {} does not match header-declared length {}",
                actual, expected
            ),
            CartridgeError::NoPrgRom => write!(f, "header declares no PRG-ROM"),
            CartridgeError::Io(e) => write!(f, "could not read ROM file: {}", e),
        }
    }
}

impl std::error::Error for CartridgeError {}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Cartridge {
    pub prg_rom: Vec<Vec<u8>>, // 16 KiB chunks for the CPU
    pub chr_rom: Vec<Vec<u8>>, // 8 KiB chunks for the PPU; empty means CHR-RAM
    pub trainer: Option<Vec<u8>>,
    pub mapper_num: u8,
    pub mirroring: Mirror,
    pub battery_backed: bool,
    pub four_screen: bool,
}

impl Cartridge {
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < 0x10 {
            return Err(CartridgeError::Truncated);
        }
        if data[0..4] != [0x4E, 0x45, 0x53, 0x1A] {
            return Err(CartridgeError::BadMagic);
        }
        let prg_chunks = data[4] as usize;
        let chr_chunks = data[5] as usize;
        if prg_chunks == 0 {
            return Err(CartridgeError::NoPrgRom);
        }
        let trainer_present = data[6] & (1 << 2) != 0;
        // The total must be exactly header + trainer + PRG + CHR. Anything
        // else is rejected outright rather than partially loaded.
        let expected = 0x10
            + if trainer_present { 0x200 } else { 0 }
            + prg_chunks * PRG_CHUNK_SIZE
            + chr_chunks * CHR_CHUNK_SIZE;
        if data.len() != expected {
            return Err(CartridgeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        let trainer = if trainer_present {
            Some(data[0x10..0x210].to_vec())
        } else {
            None
        };
        let prg_offset = 0x10 + if trainer_present { 0x200 } else { 0 };
        let chr_offset = prg_offset + prg_chunks * PRG_CHUNK_SIZE;
        let mut prg_rom = Vec::with_capacity(prg_chunks);
        for i in 0..prg_chunks {
            let start = prg_offset + i * PRG_CHUNK_SIZE;
            prg_rom.push(data[start..start + PRG_CHUNK_SIZE].to_vec());
        }
        let mut chr_rom = Vec::with_capacity(chr_chunks);
        for i in 0..chr_chunks {
            let start = chr_offset + i * CHR_CHUNK_SIZE;
            chr_rom.push(data[start..start + CHR_CHUNK_SIZE].to_vec());
        }
        let four_screen = data[6] & (1 << 3) != 0;
        let mirroring = if four_screen {
            Mirror::FourScreen
        } else if data[6] & (1 << 0) == 0 {
            Mirror::Horizontal
        } else {
            Mirror::Vertical
        };
        Ok(Cartridge {
            prg_rom,
            chr_rom,
            trainer,
            mapper_num: (data[7] & 0xF0) | (data[6] >> 4),
            mirroring,
            battery_backed: data[6] & (1 << 1) != 0,
            four_screen,
        })
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = std::fs::read(path).map_err(|e| CartridgeError::Io(e.to_string()))?;
        Cartridge::from_bytes(&data)
    }
}

/// Placeholder for mapper numbers we don't implement: reads 0, ignores
/// writes. The console still runs, it just won't produce anything meaningful.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct UnknownMapper {
    mirroring: Mirror,
}

impl Mapper for UnknownMapper {
    fn read(&mut self, _address: usize) -> u8 {
        0
    }

    fn write(&mut self, _address: usize, _value: u8) {}

    fn mirroring(&self) -> Mirror {
        self.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Unknown(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Unknown(d) = data {
            *self = d;
        }
    }
}

pub fn new_mapper(cart: Cartridge) -> Rc<RefCell<dyn Mapper>> {
    match cart.mapper_num {
        0 => Rc::new(RefCell::new(Nrom::new(cart))),
        1 => Rc::new(RefCell::new(Mmc1::new(cart))),
        2 => Rc::new(RefCell::new(Uxrom::new(cart))),
        3 => Rc::new(RefCell::new(Cnrom::new(cart))),
        // 206 is the MMC3's predecessor (Namco 118); games for it don't touch
        // the MMC3-only registers, so the superset serves both.
        4 | 206 => Rc::new(RefCell::new(Mmc3::new(cart))),
        7 => Rc::new(RefCell::new(Axrom::new(cart))),
        9 => Rc::new(RefCell::new(Mmc2::new(cart, false))),
        10 => Rc::new(RefCell::new(Mmc2::new(cart, true))),
        11 => Rc::new(RefCell::new(ColorDreams::new(cart))),
        13 => Rc::new(RefCell::new(Cprom::new(cart))),
        21 | 22 | 23 | 25 => {
            let n = cart.mapper_num;
            Rc::new(RefCell::new(Vrc::new(cart, n)))
        }
        34 => Rc::new(RefCell::new(Bnrom::new(cart))),
        66 => Rc::new(RefCell::new(Gxrom::new(cart))),
        71 => Rc::new(RefCell::new(Camerica::new(cart))),
        79 | 113 => {
            let n = cart.mapper_num;
            Rc::new(RefCell::new(Nina::new(cart, n)))
        }
        140 => Rc::new(RefCell::new(Jaleco::new(cart))),
        n => {
            // degraded mode, not a hard failure
            eprintln!("unimplemented mapper {}, running with placeholder", n);
            Rc::new(RefCell::new(UnknownMapper {
                mirroring: cart.mirroring,
            }))
        }
    }
}
