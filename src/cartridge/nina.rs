use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mappers 79 and 113 (NINA-003/006 and the multicart extension). One
// register decoded from the $41xx range of the expansion area. Mapper 113
// widens both bank fields and adds a mirroring bit.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Nina {
    cart: Cartridge,
    chr_ram: Vec<u8>,
    is_113: bool,
    prg_bank: usize,
    chr_bank: usize,
    mirroring: Mirror,
}

impl Nina {
    pub fn new(cart: Cartridge, mapper_num: u8) -> Self {
        let mirroring = cart.mirroring;
        Nina {
            cart,
            chr_ram: vec![0; 0x2000],
            is_113: mapper_num == 113,
            prg_bank: 0,
            chr_bank: 0,
            mirroring,
        }
    }
}

impl Mapper for Nina {
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
        if let 0x0000..=0x1FFF = address {
            if self.cart.chr_rom.is_empty() {
                self.chr_ram[address] = value;
            }
            return;
        }
        // the register responds when A8 and A14..A13 decode to $41xx, which
        // repeats through $4100-$5FFF
        if !(0x4100..=0x5FFF).contains(&address) || address & 0x4100 != 0x4100 {
            return;
        }
        if self.is_113 {
            self.prg_bank = ((value >> 3) & 0b111) as usize;
            self.chr_bank = ((value & 0b111) | (value >> 3) & 0b1000) as usize;
            self.mirroring = if value & 0x80 == 0 {
                Mirror::Horizontal
            } else {
                Mirror::Vertical
            };
        } else {
            self.prg_bank = ((value >> 3) & 1) as usize;
            self.chr_bank = (value & 0b111) as usize;
        }
    }

    fn step(&mut self, _input: MapperStepInput) -> bool {
        false
    }

    fn mirroring(&self) -> Mirror {
        self.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Nina(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Nina(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    fn marked() -> Cartridge {
        let mut cart = test_cartridge(4, 8);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        for (i, chunk) in cart.chr_rom.iter_mut().enumerate() {
            chunk[0] = i as u8;
        }
        cart
    }

    #[test]
    fn mapper79_register_decodes_in_expansion_area() {
        let mut m = Nina::new(marked(), 79);
        m.write(0x4100, 0b0000_1010);
        assert_eq!(m.read(0x8000), 2);
        assert_eq!(m.read(0x0000), 2);
        // $4200 lacks A8 and is ignored
        m.write(0x4200, 0);
        assert_eq!(m.read(0x8000), 2);
        // the mirror at $5100 works too
        m.write(0x5100, 0);
        assert_eq!(m.read(0x8000), 0);
    }

    #[test]
    fn mapper113_widens_fields_and_controls_mirroring() {
        let mut m = Nina::new(marked(), 113);
        m.write(0x4100, 0b1101_0011);
        assert_eq!(m.prg_bank, 0b010);
        assert_eq!(m.chr_bank, 0b1011);
        assert_eq!(m.mirroring(), Mirror::Vertical);
    }

    #[test]
    fn chr_ram_board_reads_and_writes_patterns() {
        let mut m = Nina::new(test_cartridge(2, 0), 79);
        assert_eq!(m.read(0x0000), 0);
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x55);
    }
}
