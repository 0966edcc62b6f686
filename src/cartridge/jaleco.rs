use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 140 (Jaleco JF-11/JF-14): a single register in the $6000-$7FFF
// range, 32 KiB PRG banks in the high nibble and 8 KiB CHR banks in the low.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Jaleco {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    prg_bank: usize,
    chr_bank: usize,
}

impl Jaleco {
    pub fn new(cart: Cartridge) -> Self {
        Jaleco {
            cart,
            chr_ram: vec![0; 0x2000],
            prg_bank: 0,
            chr_bank: 0,
        }
    }
}

impl Mapper for Jaleco {
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
            0x6000..=0x7FFF => {
                self.prg_bank = ((value >> 4) & 0b11) as usize;
                self.chr_bank = (value & 0b1111) as usize;
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
        MapperData::Jaleco(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Jaleco(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn register_lives_under_prg_ram_range() {
        let mut cart = test_cartridge(4, 4);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        for (i, chunk) in cart.chr_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        let mut m = Jaleco::new(cart);
        m.write(0x6000, 0b0001_0010);
        assert_eq!(m.read(0x8000), 2);
        assert_eq!(m.read(0x0000), 2);
        // writes to the ROM range are ignored
        m.write(0x8000, 0);
        assert_eq!(m.read(0x8000), 2);
    }

    #[test]
    fn chr_ram_board_reads_and_writes_patterns() {
        let mut m = Jaleco::new(test_cartridge(2, 0));
        assert_eq!(m.read(0x0000), 0);
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x55);
    }
}
