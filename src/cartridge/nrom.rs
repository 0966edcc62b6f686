use super::serialize::MapperData;
use super::{Cartridge, Mapper, Mirror};

// Mapper 0. No switching at all.
// CPU $8000-$BFFF: first 16 KiB of ROM.
// CPU $C000-$FFFF: last 16 KiB of ROM (NROM-256) or mirror of $8000-$BFFF (NROM-128).
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Nrom {
    cart: Cartridge,
    chr_ram: Vec<u8>, // used when the cartridge carries no CHR-ROM
    prg_ram: Vec<u8>, // Family BASIC shipped NROM boards with PRG-RAM at $6000
}

impl Nrom {
    pub fn new(cart: Cartridge) -> Self {
        Nrom {
            cart,
            chr_ram: vec![0; 0x2000],
            prg_ram: vec![0; 0x2000],
        }
    }
}

impl Mapper for Nrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address]
                } else {
                    self.cart.chr_rom[0][address]
                }
            }
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000],
            0x8000..=0xBFFF => self.cart.prg_rom[0][address % 0x4000],
            0xC000..=0xFFFF => {
                let last = self.cart.prg_rom.len() - 1;
                self.cart.prg_rom[last][address % 0x4000]
            }
            _ => 0, // open bus
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address] = value;
                }
            }
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000] = value,
            _ => (), // PRG-ROM, not -RAM
        }
    }

    fn mirroring(&self) -> Mirror {
        self.cart.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Nrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Nrom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn single_chunk_prg_is_mirrored() {
        let mut cart = test_cartridge(1, 1);
        cart.prg_rom[0][0x0123] = 0x42;
        let mut m = Nrom::new(cart);
        assert_eq!(m.read(0x8123), 0x42);
        assert_eq!(m.read(0xC123), 0x42);
    }

    #[test]
    fn two_chunk_prg_maps_low_and_high() {
        let mut cart = test_cartridge(2, 1);
        cart.prg_rom[0][0] = 0x11;
        cart.prg_rom[1][0] = 0x22;
        let mut m = Nrom::new(cart);
        assert_eq!(m.read(0x8000), 0x11);
        assert_eq!(m.read(0xC000), 0x22);
    }

    #[test]
    fn chr_ram_is_writable_only_without_chr_rom() {
        let mut m = Nrom::new(test_cartridge(1, 0));
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x55);

        let mut m = Nrom::new(test_cartridge(1, 1));
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x00);
    }
}
