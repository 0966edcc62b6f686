use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 34 covers two unrelated boards that share a number. BNROM is plain
// 32 KiB PRG banking with CHR-RAM; NINA-001 adds 4 KiB CHR banking through
// registers overlaid on the top of PRG-RAM. Having more than one CHR chunk
// in the image is what marks a NINA-001 cart.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Bnrom {
    cart: Cartridge,
    is_nina: bool,
    chr_ram: Vec<u8>,
    prg_ram: Vec<u8>,
    prg_bank: usize,
    chr_banks: [usize; 2],
}

impl Bnrom {
    pub fn new(cart: Cartridge) -> Self {
        let is_nina = cart.chr_rom.len() > 1;
        Bnrom {
            cart,
            is_nina,
            chr_ram: vec![0; 0x2000],
            prg_ram: vec![0; 0x2000],
            prg_bank: 0,
            chr_banks: [0, 1],
        }
    }
}

impl Mapper for Bnrom {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF if self.is_nina => {
                let bank = self.chr_banks[address / 0x1000] % (2 * self.cart.chr_rom.len());
                self.cart.chr_rom[bank / 2][(bank % 2) * 0x1000 + address % 0x1000]
            }
            0x0000..=0x1FFF => self.chr_ram[address],
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000],
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
                if !self.is_nina {
                    self.chr_ram[address] = value;
                }
            }
            0x6000..=0x7FFF => {
                self.prg_ram[address % 0x2000] = value;
                if self.is_nina {
                    match address {
                        0x7FFD => self.prg_bank = (value & 1) as usize,
                        0x7FFE => self.chr_banks[0] = (value & 0b1111) as usize,
                        0x7FFF => self.chr_banks[1] = (value & 0b1111) as usize,
                        _ => (),
                    }
                }
            }
            0x8000..=0xFFFF => {
                if !self.is_nina {
                    self.prg_bank = (value & 0b11) as usize;
                }
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
        MapperData::Bnrom(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Bnrom(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    fn marked(prg: usize, chr: usize) -> Cartridge {
        let mut cart = test_cartridge(prg, chr);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        for (i, chunk) in cart.chr_rom.iter_mut().enumerate() {
            chunk[0] = (2 * i) as u8;
            chunk[0x1000] = (2 * i + 1) as u8;
        }
        cart
    }

    #[test]
    fn bnrom_switches_32k_banks_and_exposes_chr_ram() {
        let mut m = Bnrom::new(marked(4, 0));
        assert!(!m.is_nina);
        m.write(0x8000, 1);
        assert_eq!(m.read(0x8000), 2);
        assert_eq!(m.read(0xC000), 3);
        m.write(0x0000, 0xAB);
        assert_eq!(m.read(0x0000), 0xAB);
    }

    #[test]
    fn nina_banks_chr_through_prg_ram_top() {
        let mut m = Bnrom::new(marked(2, 2));
        assert!(m.is_nina);
        m.write(0x7FFE, 2);
        m.write(0x7FFF, 3);
        assert_eq!(m.read(0x0000), 2);
        assert_eq!(m.read(0x1000), 3);
        // the register write still lands in PRG-RAM
        assert_eq!(m.read(0x7FFE), 2);
        // CHR is ROM on this board
        m.write(0x0000, 0xAB);
        assert_eq!(m.read(0x0000), 2);
    }
}
