use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 13 (Videomation): 16 KiB of CHR-RAM split into a fixed low 4 KiB
// and a switchable high 4 KiB. PRG is a single unbanked 32 KiB.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Cprom {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    chr_bank: usize,
}

impl Cprom {
    pub fn new(cart: Cartridge) -> Self {
        Cprom {
            cart,
            chr_ram: vec![0; 0x4000],
            chr_bank: 0,
        }
    }

    fn chr_offset(&self, address: usize) -> usize {
        match address {
            0x0000..=0x0FFF => address,
            _ => self.chr_bank * 0x1000 + address % 0x1000,
        }
    }
}

impl Mapper for Cprom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr_ram[self.chr_offset(address)],
            0x8000..=0xFFFF => {
                let chunk = (address - 0x8000) / 0x4000 % self.cart.prg_rom.len();
                self.cart.prg_rom[chunk][address % 0x4000]
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                let offset = self.chr_offset(address);
                self.chr_ram[offset] = value;
            }
            0x8000..=0xFFFF => self.chr_bank = (value & 0b11) as usize,
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
        MapperData::Cprom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Cprom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn low_window_fixed_high_window_banked() {
        let mut m = Cprom::new(test_cartridge(2, 0));
        m.write(0x0000, 1); // fixed page
        m.write(0x8000, 2);
        m.write(0x1000, 2); // page 2
        m.write(0x8000, 3);
        m.write(0x1000, 3); // page 3
        assert_eq!(m.read(0x0000), 1);
        assert_eq!(m.read(0x1000), 3);
        m.write(0x8000, 2);
        assert_eq!(m.read(0x1000), 2);
        // page 0 is reachable through the high window too
        m.write(0x8000, 0);
        assert_eq!(m.read(0x1000), 1);
    }
}
