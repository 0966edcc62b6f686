use super::serialize::MapperData;
use super::{Cartridge, Mapper, Mirror};

// Mapper 2. One switchable 16 KiB PRG window at $8000, last bank fixed at $C000.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Uxrom {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    bank_select: usize,
}

impl Uxrom {
    pub fn new(cart: Cartridge) -> Self {
        Uxrom {
            cart,
            chr_ram: vec![0; 0x2000],
            bank_select: 0,
        }
    }
}

impl Mapper for Uxrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address]
                } else {
                    self.cart.chr_rom[0][address]
                }
            }
            0x8000..=0xBFFF => self.cart.prg_rom[self.bank_select][address % 0x4000],
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
                self.bank_select = value as usize % self.cart.prg_rom.len();
            }
            _ => (),
        }
    }

    fn mirroring(&self) -> Mirror {
        self.cart.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Uxrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Uxrom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn switches_low_window_and_fixes_last() {
        let mut cart = test_cartridge(4, 0);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        let mut m = Uxrom::new(cart);
        assert_eq!(m.read(0x8000), 0);
        m.write(0x8000, 2);
        assert_eq!(m.read(0x8000), 2);
        // last bank stays fixed regardless
        assert_eq!(m.read(0xC000), 3);
    }
}
