use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 7: 32 KiB PRG banks and mapper-controlled single-screen mirroring.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Axrom {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    prg_bank: usize, // selects a pair of 16 KiB chunks
    nametable_high: bool,
}

impl Axrom {
    pub fn new(cart: Cartridge) -> Self {
        Axrom {
            cart,
            chr_ram: vec![0; 0x2000],
            prg_bank: 0,
            nametable_high: false,
        }
    }
}

impl Mapper for Axrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr_ram[address],
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
            0x0000..=0x1FFF => self.chr_ram[address] = value,
            0x8000..=0xFFFF => {
                self.prg_bank = (value & 0b111) as usize;
                self.nametable_high = value & (1 << 4) != 0;
            }
            _ => (),
        }
    }

    fn step(&mut self, _input: MapperStepInput) -> bool {
        false
    }

    fn mirroring(&self) -> Mirror {
        if self.nametable_high {
            Mirror::Single1
        } else {
            Mirror::Single0
        }
    }

    fn save_state(&self) -> MapperData {
        MapperData::Axrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Axrom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn bank_select_and_mirroring() {
        let mut cart = test_cartridge(4, 0);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        let mut m = Axrom::new(cart);
        assert_eq!(m.mirroring(), Mirror::Single0);
        assert_eq!(m.read(0x8000), 0);
        assert_eq!(m.read(0xC000), 1);
        m.write(0x8000, 0b0001_0001); // bank 1, second nametable
        assert_eq!(m.read(0x8000), 2);
        assert_eq!(m.read(0xC000), 3);
        assert_eq!(m.mirroring(), Mirror::Single1);
    }
}
