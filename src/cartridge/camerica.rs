use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 71 (Camerica/Codemasters): UxROM-style 16 KiB PRG banking with the
// bank register at $C000-$FFFF. Fire Hawk's board also latches single-screen
// mirroring from $9000-$9FFF writes.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Camerica {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    prg_bank: usize,
    mirroring: Mirror,
}

impl Camerica {
    pub fn new(cart: Cartridge) -> Self {
        let mirroring = cart.mirroring;
        Camerica {
            cart,
            chr_ram: vec![0; 0x2000],
            prg_bank: 0,
            mirroring,
        }
    }
}

impl Mapper for Camerica {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr_ram[address],
            0x8000..=0xBFFF => {
                self.cart.prg_rom[self.prg_bank % self.cart.prg_rom.len()][address % 0x4000]
            }
            0xC000..=0xFFFF => {
                self.cart.prg_rom[self.cart.prg_rom.len() - 1][address % 0x4000]
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => self.chr_ram[address] = value,
            0x9000..=0x9FFF => {
                self.mirroring = if value & (1 << 4) == 0 {
                    Mirror::Single0
                } else {
                    Mirror::Single1
                }
            }
            0xC000..=0xFFFF => self.prg_bank = (value & 0b1111) as usize,
            _ => (),
        }
    }

    fn step(&mut self, _input: MapperStepInput) -> bool {
        false
    }

    fn mirroring(&self) -> Mirror {
        self.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Camerica(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Camerica(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    #[test]
    fn banked_low_window_fixed_high_window() {
        let mut cart = test_cartridge(4, 0);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        let mut m = Camerica::new(cart);
        m.write(0xC000, 2);
        assert_eq!(m.read(0x8000), 2);
        assert_eq!(m.read(0xC000), 3);
        // writes to $8000-$BFFF do not select banks on this board
        m.write(0x8000, 1);
        assert_eq!(m.read(0x8000), 2);
    }

    #[test]
    fn fire_hawk_mirroring_latch() {
        let mut m = Camerica::new(test_cartridge(2, 0));
        m.write(0x9000, 1 << 4);
        assert_eq!(m.mirroring(), Mirror::Single1);
        m.write(0x9000, 0);
        assert_eq!(m.mirroring(), Mirror::Single0);
    }
}
