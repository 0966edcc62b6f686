use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 66: 32 KiB PRG banks in the high nibble, 8 KiB CHR banks in the low.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Gxrom {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    prg_bank: usize,
    chr_bank: usize,
}

impl Gxrom {
    pub fn new(cart: Cartridge) -> Self {
        Gxrom {
            cart,
            chr_ram: vec![0; 0x2000],
            prg_bank: 0,
            chr_bank: 0,
        }
    }
}

impl Mapper for Gxrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address]
                } else {
                    self.cart.chr_rom[self.chr_bank % self.cart.chr_rom.len()][address]
                }
            }
            0x8000..=0xFFFF => {
                let chunk = (2 * self.prg_bank + (address - 0x8000) / 0x4000)
                    % self.cart.prg_rom.len();
                self.cart.prg_rom[chunk][address % 0x4000]
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address] = value;
                }
            }
            0x8000..=0xFFFF => {
                self.prg_bank = ((value >> 4) & 0b11) as usize;
                self.chr_bank = (value & 0b11) as usize;
            }
            _ => (),
        }
    }

    fn step(&mut self, _input: MapperStepInput) -> bool {
        false
    }

    fn mirroring(&self) -> Mirror {
        self.cart.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Gxrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Gxrom(d) = data {
            *self = d;
        }
    }
}
