use super::serialize::MapperData;
use super::{Cartridge, Mapper, Mirror};

// Mapper 3. PRG fixed like NROM; 8 KiB CHR banks selected by writes to $8000-$FFFF.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Cnrom {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    chr_bank_select: usize,
}

impl Cnrom {
    pub fn new(cart: Cartridge) -> Self {
        Cnrom {
            cart,
            chr_ram: vec![0; 0x2000],
            chr_bank_select: 0,
        }
    }
}

impl Mapper for Cnrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address]
                } else {
                    self.cart.chr_rom[self.chr_bank_select][address]
                }
            }
            0x8000..=0xBFFF => self.cart.prg_rom[0][address % 0x4000],
            0xC000..=0xFFFF => {
                let last = self.cart.prg_rom.len() - 1;
                self.cart.prg_rom[last][address % 0x4000]
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
                if !self.cart.chr_rom.is_empty() {
                    self.chr_bank_select = value as usize % self.cart.chr_rom.len();
                }
            }
            _ => (),
        }
    }

    fn mirroring(&self) -> Mirror {
        self.cart.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Cnrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Cnrom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn chr_banks_switch_and_wrap() {
        let mut cart = test_cartridge(1, 4);
        for (i, chunk) in cart.chr_rom.iter_mut().enumerate() {
            chunk[0] = 0x10 + i as u8;
        }
        let mut m = Cnrom::new(cart);
        assert_eq!(m.read(0x0000), 0x10);
        m.write(0x8000, 3);
        assert_eq!(m.read(0x0000), 0x13);
        // out-of-range selects wrap instead of indexing out of bounds
        m.write(0x8000, 5);
        assert_eq!(m.read(0x0000), 0x11);
    }

    #[test]
    fn chr_ram_board_reads_and_writes_patterns() {
        let mut m = Cnrom::new(test_cartridge(1, 0));
        assert_eq!(m.read(0x0000), 0);
        m.write(0x8000, 3); // bank selects are harmless without CHR-ROM
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x55);
    }
}
