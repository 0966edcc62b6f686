use crate::cartridge::Mirror;

impl super::Ppu {
    pub fn read(&mut self, address: usize) -> u8 {
        let address = address % 0x4000;
        match address {
            0x0000..=0x1FFF => self.mapper.borrow_mut().read(address),
            0x2000..=0x3EFF => self.read_nametable(address),
            0x3F00..=0x3FFF => self.palette_ram[Self::palette_index(address)],
            _ => 0,
        }
    }

    pub fn write(&mut self, address: usize, value: u8) {
        let address = address % 0x4000;
        match address {
            0x0000..=0x1FFF => self.mapper.borrow_mut().write(address, value),
            0x2000..=0x3EFF => self.write_nametable(address, value),
            0x3F00..=0x3FFF => self.palette_ram[Self::palette_index(address)] = value,
            _ => (),
        }
    }

    fn read_nametable(&self, address: usize) -> u8 {
        let offset = address % 0x0400;
        match self.nametable_slot(address) {
            0 => self.nametable_a[offset],
            1 => self.nametable_b[offset],
            2 => self.nametable_c[offset],
            _ => self.nametable_d[offset],
        }
    }

    fn write_nametable(&mut self, address: usize, value: u8) {
        let offset = address % 0x0400;
        match self.nametable_slot(address) {
            0 => self.nametable_a[offset] = value,
            1 => self.nametable_b[offset] = value,
            2 => self.nametable_c[offset] = value,
            _ => self.nametable_d[offset] = value,
        }
    }

    // Maps a $2000-$3EFF address onto one of the four physical nametables
    // according to the mapper's current mirroring.
    fn nametable_slot(&self, address: usize) -> usize {
        let logical = ((address - 0x2000) % 0x1000) / 0x0400; // 0..=3
        match self.mapper.borrow().mirroring() {
            Mirror::Horizontal => match logical {
                0 | 1 => 0,
                _ => 1,
            },
            Mirror::Vertical => logical % 2,
            Mirror::Single0 => 0,
            Mirror::Single1 => 1,
            Mirror::FourScreen => logical,
        }
    }

    // $3F10/$3F14/$3F18/$3F1C mirror their background counterparts, for
    // reads and writes both.
    pub(super) fn palette_index(address: usize) -> usize {
        let index = address % 0x20;
        match index {
            0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
            _ => index,
        }
    }
}
