impl super::Ppu {
    // cpu writes to $2000, PPUCTRL
    pub fn write_controller(&mut self, byte: u8) {
        // t: ...BA.. ........ = d: ......BA
        set_bit(&mut self.t, 10, byte as u16, 0);
        set_bit(&mut self.t, 11, byte as u16, 1);
        self.address_increment = if byte & (1 << 2) == 0 { 1 } else { 32 };
        self.sprite_pattern_table_base = if byte & (1 << 3) == 0 { 0x0 } else { 0x1000 };
        self.background_pattern_table_base = if byte & (1 << 4) == 0 { 0x0 } else { 0x1000 };
        self.sprite_size = if byte & (1 << 5) == 0 { 8 } else { 16 };
        self.should_generate_nmi = byte & (1 << 7) != 0;
        self.nmi_change();
    }

    // cpu writes to $2001, PPUMASK
    pub fn write_mask(&mut self, byte: u8) {
        self.grayscale = byte & 1 != 0;
        self.show_background_left = byte & (1 << 1) != 0;
        self.show_sprites_left = byte & (1 << 2) != 0;
        self.show_background = byte & (1 << 3) != 0;
        self.show_sprites = byte & (1 << 4) != 0;
        self.emphasize_red = byte & (1 << 5) != 0;
        self.emphasize_green = byte & (1 << 6) != 0;
        self.emphasize_blue = byte & (1 << 7) != 0;
    }

    // cpu reads $2002, PPUSTATUS
    pub fn read_status(&mut self) -> u8 {
        // bottom 5 bits are whatever was last on the bus
        let mut byte = self.recent_bits & 0b0001_1111;
        byte |= (self.sprite_overflow as u8) << 5;
        byte |= (self.sprite_zero_hit as u8) << 6;
        byte |= (self.vertical_blank as u8) << 7;
        // reading clears the vblank flag and the write toggle
        self.vertical_blank = false;
        self.nmi_change();
        self.w = 0;
        byte
    }

    // cpu writes to $2003, OAMADDR
    pub fn write_oam_address(&mut self, addr: usize) {
        self.oam_address = addr;
    }

    // cpu reads $2004, OAMDATA
    pub fn read_oam_data(&mut self) -> u8 {
        self.primary_oam[self.oam_address]
    }

    // cpu writes to $2004, OAMDATA
    pub fn write_oam_data(&mut self, byte: u8) {
        self.primary_oam[self.oam_address] = byte;
        self.oam_address = (self.oam_address + 1) % 0x100;
    }

    // cpu writes to $2005, PPUSCROLL
    pub fn write_scroll(&mut self, byte: u8) {
        if self.w == 0 {
            // first write
            // t: ....... ...HGFED = d: HGFED...
            // x:              CBA = d: .....CBA
            set_bit(&mut self.t, 0, byte as u16, 3);
            set_bit(&mut self.t, 1, byte as u16, 4);
            set_bit(&mut self.t, 2, byte as u16, 5);
            set_bit(&mut self.t, 3, byte as u16, 6);
            set_bit(&mut self.t, 4, byte as u16, 7);
            self.x = byte & 0b0000_0111;
            self.w = 1;
        } else {
            // second write
            // t: CBA..HG FED..... = d: HGFEDCBA
            set_bit(&mut self.t, 12, byte as u16, 0);
            set_bit(&mut self.t, 13, byte as u16, 1);
            set_bit(&mut self.t, 14, byte as u16, 2);
            set_bit(&mut self.t, 5, byte as u16, 3);
            set_bit(&mut self.t, 6, byte as u16, 4);
            set_bit(&mut self.t, 7, byte as u16, 5);
            set_bit(&mut self.t, 8, byte as u16, 6);
            set_bit(&mut self.t, 9, byte as u16, 7);
            self.w = 0;
        }
    }

    // cpu writes to $2006, PPUADDR
    pub fn write_address(&mut self, byte: u8) {
        if self.w == 0 {
            // first write
            // t: .FEDCBA ........ = d: ..FEDCBA
            // t: X...... ........ = 0
            set_bit(&mut self.t, 8, byte as u16, 0);
            set_bit(&mut self.t, 9, byte as u16, 1);
            set_bit(&mut self.t, 10, byte as u16, 2);
            set_bit(&mut self.t, 11, byte as u16, 3);
            set_bit(&mut self.t, 12, byte as u16, 4);
            set_bit(&mut self.t, 13, byte as u16, 5);
            self.t &= !(1 << 14);
            self.w = 1;
        } else {
            // second write
            // t: ....... HGFEDCBA = d: HGFEDCBA
            // v                   = t
            self.t &= 0xFF00;
            self.t |= byte as u16;
            self.v = self.t;
            self.w = 0;
        }
    }

    // cpu reads $2007, PPUDATA
    pub fn read_data(&mut self) -> u8 {
        let address = (self.v % 0x4000) as usize;
        let value = if address < 0x3F00 {
            // non-palette reads go through the internal buffer, one fetch late
            let buffered = self.read_buffer;
            self.read_buffer = self.read(address);
            buffered
        } else {
            // palette reads are immediate, but the buffer still picks up the
            // nametable byte underneath
            self.read_buffer = self.read(address - 0x1000);
            self.read(address)
        };
        if self.rendering() && (self.scanline < 240 || self.scanline == 261) {
            // accessing PPUDATA while rendering performs the scroll glitch
            self.inc_coarse_x();
            self.inc_y();
        } else {
            self.v = self.v.wrapping_add(self.address_increment) & 0x3FFF;
        }
        value
    }

    // cpu writes to $2007, PPUDATA
    pub fn write_data(&mut self, byte: u8) {
        let address = (self.v % 0x4000) as usize;
        self.write(address, byte);
        if self.rendering() && (self.scanline < 240 || self.scanline == 261) {
            self.inc_coarse_x();
            self.inc_y();
        } else {
            self.v = self.v.wrapping_add(self.address_increment) & 0x3FFF;
        }
    }

    // cpu writes to $4014, OAMDMA: a whole page copied into OAM, starting
    // at the current OAM address
    pub fn write_oam_dma(&mut self, data: Vec<u8>) {
        for byte in data {
            self.primary_oam[self.oam_address] = byte;
            self.oam_address = (self.oam_address + 1) % 0x100;
        }
    }
}

// set bit dest_pos of dest to bit src_pos of src
pub(super) fn set_bit(dest: &mut u16, dest_pos: u16, src: u16, src_pos: u16) {
    *dest = (*dest & !(1 << dest_pos)) | (((src >> src_pos) & 1) << dest_pos);
}

#[cfg(test)]
mod tests {
    use super::super::Ppu;
    use crate::cartridge::new_mapper;
    use crate::test_utils::test_cartridge;

    fn ppu() -> Ppu {
        Ppu::new(new_mapper(test_cartridge(1, 1)))
    }

    #[test]
    fn address_writes_set_v_on_second_write() {
        let mut p = ppu();
        p.write_address(0x23);
        assert_eq!(p.v, 0); // v untouched until the second write
        p.write_address(0xC0);
        assert_eq!(p.v, 0x23C0);
        assert_eq!(p.t, 0x23C0);
    }

    #[test]
    fn status_read_resets_the_write_toggle() {
        let mut p = ppu();
        p.write_address(0x23);
        p.read_status();
        // with w back to 0, this is a high-byte write again
        p.write_address(0x21);
        p.write_address(0x08);
        assert_eq!(p.v, 0x2108);
    }

    #[test]
    fn scroll_writes_update_t_and_fine_x() {
        let mut p = ppu();
        p.write_scroll(0x7D); // coarse X = 15, fine x = 5
        assert_eq!(p.t & 0b1_1111, 0b0_1111);
        assert_eq!(p.x, 0b101);
        p.write_scroll(0x5E); // coarse Y = 11, fine y = 6
        assert_eq!((p.t >> 5) & 0b1_1111, 0b0_1011);
        assert_eq!((p.t >> 12) & 0b111, 0b110);
    }

    #[test]
    fn data_reads_are_buffered_except_palette() {
        let mut p = ppu();
        // write two bytes into nametable space
        p.write_address(0x20);
        p.write_address(0x00);
        p.write_data(0xAB);
        p.write_data(0xCD);
        // point back to the start and read
        p.write_address(0x20);
        p.write_address(0x00);
        let stale = p.read_data(); // buffer contents, not $2000
        assert_eq!(stale, 0x00);
        assert_eq!(p.read_data(), 0xAB);
        assert_eq!(p.read_data(), 0xCD);

        // palette reads come back immediately
        p.write_address(0x3F);
        p.write_address(0x01);
        p.write_data(0x2A);
        p.write_address(0x3F);
        p.write_address(0x01);
        assert_eq!(p.read_data(), 0x2A);
    }

    #[test]
    fn address_increment_follows_controller_bit() {
        let mut p = ppu();
        p.write_controller(0b0000_0100);
        p.write_address(0x20);
        p.write_address(0x00);
        p.write_data(0x11);
        assert_eq!(p.v, 0x2020);
    }

    #[test]
    fn oam_data_writes_advance_the_address() {
        let mut p = ppu();
        p.write_oam_address(0xFE);
        p.write_oam_data(0x12);
        p.write_oam_data(0x34);
        p.write_oam_data(0x56); // wraps to 0
        assert_eq!(p.primary_oam[0xFE], 0x12);
        assert_eq!(p.primary_oam[0xFF], 0x34);
        assert_eq!(p.primary_oam[0x00], 0x56);
        assert_eq!(p.oam_address, 1);
    }
}
