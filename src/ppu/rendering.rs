use super::cpu_registers::set_bit;
use super::{PALETTE_TABLE, SCREEN_WIDTH};

impl super::Ppu {
    pub fn perform_memory_fetch(&mut self) {
        match self.line_cycle % 8 {
            0 => self.inc_coarse_x(),
            1 => self.fetch_nametable_byte(),
            3 => self.fetch_attribute_table_byte(),
            5 => self.fetch_low_pattern_table_byte(),
            7 => self.fetch_high_pattern_table_byte(),
            _ => (),
        };
    }

    pub fn shift_registers(&mut self) {
        self.background_pattern_sr_low <<= 1;
        self.background_pattern_sr_high <<= 1;
        self.background_palette_sr_low <<= 1;
        self.background_palette_sr_high <<= 1;
        // feed bits 0 and 1 of the palette attribute latch into the bottom of
        // the low and high palette shift registers
        self.background_palette_sr_low |= (self.background_palette_latch & 1 != 0) as u8;
        self.background_palette_sr_high |= (self.background_palette_latch & 2 != 0) as u8;
    }

    pub fn load_data_into_registers(&mut self) {
        // the shifters are reloaded during ticks 9, 17, 25, ..., 257
        if self.line_cycle % 8 == 1 {
            self.background_pattern_sr_low |= self.low_pattern_table_byte as u16;
            self.background_pattern_sr_high |= self.high_pattern_table_byte as u16;
            self.background_palette_latch = self.attribute_table_byte;
        }
    }

    pub fn fetch_nametable_byte(&mut self) {
        // nametable address is the bottom 12 bits of v in the 0x2000 range
        self.nametable_byte = self.read(0x2000 | (self.v & 0x0FFF) as usize);
    }

    pub fn fetch_attribute_table_byte(&mut self) {
        let address = 0x23C0 | (self.v & 0x0C00) | ((self.v >> 4) & 0x38) | ((self.v >> 2) & 0x07);
        let byte = self.read(address as usize);
        // each attribute byte covers a 4x4 tile area; pick the quadrant
        let coarse_x = self.v & 0b0001_1111;
        let coarse_y = (self.v >> 5) & 0b0001_1111;
        let left_or_right = (coarse_x / 2) % 2; // 0 == left, 1 == right
        let top_or_bottom = (coarse_y / 2) % 2; // 0 == top, 1 == bottom
        let shift = (top_or_bottom << 2 | left_or_right << 1) as u8;
        self.attribute_table_byte = (byte >> shift) & 0b11;
    }

    pub fn fetch_low_pattern_table_byte(&mut self) {
        // pattern table base, plus the nametable byte as a tile index (16
        // bytes per tile), plus the fine Y scroll
        let mut address = self.background_pattern_table_base;
        address += (self.nametable_byte as usize) << 4;
        address += (self.v as usize >> 12) & 7;
        self.low_pattern_table_byte = self.read(address);
    }

    pub fn fetch_high_pattern_table_byte(&mut self) {
        // the high-order sliver lives 8 bytes after the low one
        let mut address = self.background_pattern_table_base;
        address += (self.nametable_byte as usize) << 4;
        address += (self.v as usize >> 12) & 7;
        self.high_pattern_table_byte = self.read(address + 8);
    }

    pub fn render_pixel(&mut self) {
        let (x, y) = (self.line_cycle - 1, self.scanline);
        let mut background_pixel = self.select_background_pixel();
        let (mut sprite_pixel, current_sprite) = self.select_sprite_pixel();

        // extract low and high bits from palette shift registers according to fine x
        let low_palette_bit = (self.background_palette_sr_low & (1 << (7 - self.x)) != 0) as u8;
        let high_palette_bit = (self.background_palette_sr_high & (1 << (7 - self.x)) != 0) as u8;
        let palette_offset = (high_palette_bit << 1) | low_palette_bit;

        if x < 8 && !self.show_background_left {
            background_pixel = 0;
        }
        if x < 8 && !self.show_sprites_left {
            sprite_pixel = 0;
        }
        let mut palette_address = 0;
        if background_pixel == 0 && sprite_pixel != 0 {
            // sprite wins by default over a transparent background
            palette_address += 0x10;
            palette_address += (self.sprite_attribute_latches[current_sprite] & 0b11) << 2;
            palette_address += sprite_pixel;
        } else if background_pixel != 0 && sprite_pixel == 0 {
            palette_address += palette_offset << 2;
            palette_address += background_pixel;
        } else if background_pixel != 0 && sprite_pixel != 0 {
            // both opaque: this is where sprite zero hit happens, and the
            // priority bit picks the winner
            if self.sprite_indexes[current_sprite] == 0 && x != 255 {
                self.sprite_zero_hit = true;
            }
            if self.sprite_attribute_latches[current_sprite] & (1 << 5) == 0 {
                palette_address += 0x10;
                palette_address += (self.sprite_attribute_latches[current_sprite] & 0b11) << 2;
                palette_address += sprite_pixel;
            } else {
                palette_address += palette_offset << 2;
                palette_address += background_pixel;
            }
        }
        let pixel = self.palette_ram[Self::palette_index(palette_address as usize)] as usize;
        let (r, g, b) = PALETTE_TABLE[pixel];
        let offset = (y * SCREEN_WIDTH + x) * 4;
        self.screen[offset] = r;
        self.screen[offset + 1] = g;
        self.screen[offset + 2] = b;
        self.screen[offset + 3] = 0xFF;
    }

    pub fn select_background_pixel(&mut self) -> u8 {
        if self.show_background {
            let low_bit = (self.background_pattern_sr_low & (1 << (15 - self.x)) != 0) as u8;
            let high_bit = (self.background_pattern_sr_high & (1 << (15 - self.x)) != 0) as u8;
            (high_bit << 1) | low_bit
        } else {
            0
        }
    }

    pub fn select_sprite_pixel(&mut self) -> (u8, usize) {
        // returns (sprite_pixel, index of sprite within the shift registers)
        if self.show_sprites {
            let mut low_bit = 0;
            let mut high_bit = 0;
            let mut secondary_index = 0;
            for i in 0..self.num_sprites {
                // a sprite becomes active when its X counter hits zero; the
                // first active sprite with a non-transparent pixel wins
                if self.sprite_counters[i] == 0 {
                    secondary_index = i;
                    low_bit = (self.sprite_pattern_table_srs[i].0 & 1 << 7 != 0) as u8;
                    high_bit = (self.sprite_pattern_table_srs[i].1 & 1 << 7 != 0) as u8;
                    if !(low_bit == 0 && high_bit == 0) {
                        break;
                    }
                }
            }
            // all active sprites shift every cycle, whether selected or not
            for i in 0..self.num_sprites {
                if self.sprite_counters[i] == 0 {
                    self.sprite_pattern_table_srs[i].0 <<= 1;
                    self.sprite_pattern_table_srs[i].1 <<= 1;
                }
            }
            for i in 0..self.num_sprites {
                if self.sprite_counters[i] > 0 {
                    self.sprite_counters[i] -= 1;
                }
            }
            ((high_bit << 1) | low_bit, secondary_index)
        } else {
            (0, 0)
        }
    }

    pub fn evaluate_sprites(&mut self) {
        let mut sprite_count = 0;
        for n in 0..64 {
            let y_coord = self.primary_oam[n * 4];
            if self.y_in_range(y_coord) {
                if sprite_count == 8 {
                    // a ninth in-range sprite only sets the overflow flag
                    self.sprite_overflow = true;
                    break;
                }
                for i in 0..4 {
                    self.secondary_oam[(sprite_count * 4) + i] = self.primary_oam[(n * 4) + i];
                }
                self.sprite_indexes[sprite_count] = n as u8;
                sprite_count += 1;
            }
        }
        self.num_sprites = sprite_count;
    }

    pub fn fetch_sprites(&mut self) {
        for i in 0..self.num_sprites {
            let mut address: usize;
            let sprite_y_position = self.secondary_oam[4 * i] as usize;
            let sprite_tile_index = self.secondary_oam[(4 * i) + 1] as usize;
            let sprite_attributes = self.secondary_oam[(4 * i) + 2];
            let sprite_x_position = self.secondary_oam[(4 * i) + 3];
            let mut fine_y = if sprite_attributes & (1 << 7) == 0 {
                self.scanline - sprite_y_position
            } else {
                // flipped vertically
                self.sprite_size as usize - 1 - (self.scanline - sprite_y_position)
            };
            if self.sprite_size == 8 {
                // the tile number indexes the pattern table selected in PPUCTRL
                address = self.sprite_pattern_table_base;
                address += sprite_tile_index * 16;
            } else {
                // 8x16 sprites take their pattern table from bit 0 of the tile
                // number; the bottom half is the next tile over
                address = if sprite_tile_index & 1 == 0 { 0x0 } else { 0x1000 };
                address += (sprite_tile_index & !1) * 16;
                if fine_y > 7 {
                    fine_y += 8;
                }
            }
            address += fine_y;
            let low_pattern_table_byte = self.read(address);
            let high_pattern_table_byte = self.read(address + 8);
            let mut shift_reg_vals = (0, 0);
            for j in 0..8 {
                let current_bits = (
                    low_pattern_table_byte & (1 << j),
                    high_pattern_table_byte & (1 << j),
                );
                if sprite_attributes & (1 << 6) == 0 {
                    shift_reg_vals.0 |= current_bits.0;
                    shift_reg_vals.1 |= current_bits.1;
                } else {
                    // flipped horizontally
                    shift_reg_vals.0 |= ((current_bits.0 != 0) as u8) << (7 - j);
                    shift_reg_vals.1 |= ((current_bits.1 != 0) as u8) << (7 - j);
                }
            }
            self.sprite_pattern_table_srs[i] = shift_reg_vals;
            self.sprite_attribute_latches[i] = sprite_attributes;
            self.sprite_counters[i] = sprite_x_position;
        }
    }

    pub fn inc_coarse_x(&mut self) {
        if self.v & 0x001F == 0x001F {
            // coarse X wraps to 0 and the horizontal nametable switches
            self.v &= !0x001F;
            self.v ^= 1 << 10;
        } else {
            self.v += 1;
        }
    }

    pub fn inc_y(&mut self) {
        // fine Y overflows into coarse Y, which wraps among the nametables
        let mut fine_y = (self.v >> 12) & 0b111;
        let mut coarse_y = (self.v >> 5) & 0b1_1111;
        if fine_y < 7 {
            fine_y += 1;
        } else {
            fine_y = 0;
            if coarse_y == 29 {
                // row 29 is the last row of tiles; switch the vertical
                // nametable and wrap to row 0
                self.v ^= 1 << 11;
                coarse_y = 0;
            } else if coarse_y == 31 {
                // coarse Y set out of bounds through v wraps without
                // switching the nametable
                coarse_y = 0;
            } else {
                coarse_y += 1;
            }
        }
        set_bit(&mut self.v, 0x5, coarse_y, 0x0);
        set_bit(&mut self.v, 0x6, coarse_y, 0x1);
        set_bit(&mut self.v, 0x7, coarse_y, 0x2);
        set_bit(&mut self.v, 0x8, coarse_y, 0x3);
        set_bit(&mut self.v, 0x9, coarse_y, 0x4);
        set_bit(&mut self.v, 0xC, fine_y, 0x0);
        set_bit(&mut self.v, 0xD, fine_y, 0x1);
        set_bit(&mut self.v, 0xE, fine_y, 0x2);
    }

    pub fn copy_horizontal(&mut self) {
        // v: ....F.. ...EDCBA = t: ....F.. ...EDCBA
        let mask = 0b00000100_00011111;
        let t_vals = self.t & mask;
        self.v &= !mask;
        self.v |= t_vals;
    }

    pub fn copy_vertical(&mut self) {
        // v: IHGF.ED CBA..... = t: IHGF.ED CBA.....
        let mask = 0b01111011_11100000;
        let t_vals = self.t & mask;
        self.v &= !mask;
        self.v |= t_vals;
    }

    pub fn rendering(&self) -> bool {
        self.show_background || self.show_sprites
    }

    pub fn y_in_range(&self, y_coord: u8) -> bool {
        self.scanline >= (y_coord as usize)
            && self.scanline - (y_coord as usize) < self.sprite_size as usize
    }

    pub fn nmi_change(&mut self) {
        let nmi = self.should_generate_nmi && self.vertical_blank;
        if nmi && !self.previous_nmi {
            self.nmi_delay = 15;
        }
        self.previous_nmi = nmi;
    }
}
