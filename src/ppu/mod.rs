mod cpu_registers;
mod memory;
mod rendering;
pub mod serialize;

use std::cell::RefCell;
use std::rc::Rc;

use crate::cartridge::{Mapper, MapperStepInput};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

pub struct Ppu {
    line_cycle: usize, // x coordinate
    scanline: usize,   // y coordinate
    frame: u64,

    // Internal registers
    v: u16,
    t: u16,
    x: u8, // Fine X scroll (3 bits)
    w: u8, // First or second write toggle (1 bit)

    pub mapper: Rc<RefCell<dyn Mapper>>,

    // Four physical 1 KiB nametables; which the address lines actually hit
    // depends on the mapper's current mirroring.
    nametable_a: Vec<u8>,
    nametable_b: Vec<u8>,
    nametable_c: Vec<u8>,
    nametable_d: Vec<u8>,

    // 32 bytes of palette indexes, first half background, second half sprites.
    palette_ram: Vec<u8>,

    // Background pattern shift registers and latches. Every 8 cycles the data
    // for the next tile is loaded into the upper 8 bits; the pixel to render
    // is fetched from one of the lower 8 bits.
    background_pattern_sr_low: u16,
    background_pattern_sr_high: u16,
    nametable_byte: u8,
    attribute_table_byte: u8,
    low_pattern_table_byte: u8,
    high_pattern_table_byte: u8,

    // Background palette shift registers and latch. The latch holds the
    // palette attribute for the next tile, which is why each run of 8 pixels
    // shares one palette.
    background_palette_sr_low: u8,
    background_palette_sr_high: u8,
    background_palette_latch: u8,

    // Sprite memory, shift registers, and latches
    pub primary_oam: Vec<u8>, // 64 sprites for the frame
    secondary_oam: Vec<u8>,   // 8 sprites for the current scanline
    sprite_attribute_latches: Vec<u8>,
    sprite_counters: Vec<u8>, // X positions, decremented until the sprite activates
    sprite_indexes: Vec<u8>,  // positions within primary OAM, for sprite zero detection
    sprite_pattern_table_srs: Vec<(u8, u8)>,
    num_sprites: usize,

    // Various flags set by registers
    address_increment: u16,
    sprite_pattern_table_base: usize,
    background_pattern_table_base: usize,
    oam_address: usize,
    sprite_size: u8,
    grayscale: bool,
    show_background_left: bool,
    show_sprites_left: bool,
    show_background: bool,
    show_sprites: bool,
    emphasize_red: bool,
    emphasize_green: bool,
    emphasize_blue: bool,
    sprite_overflow: bool,
    sprite_zero_hit: bool,
    should_generate_nmi: bool,
    vertical_blank: bool,

    // NMI edge detection. The CPU sees the interrupt a handful of PPU cycles
    // after the status bit goes up, which games like Battletoads depend on.
    pub trigger_nmi: bool,
    previous_nmi: bool,
    nmi_delay: usize,

    read_buffer: u8,     // used with PPUDATA register
    pub recent_bits: u8, // least significant bits previously written into any PPU register

    // RGBA output, top-down row-major
    screen: Vec<u8>,
}

impl Ppu {
    pub fn new(mapper: Rc<RefCell<dyn Mapper>>) -> Self {
        Ppu {
            line_cycle: 0,
            scanline: 0,
            frame: 0,
            v: 0,
            t: 0,
            x: 0,
            w: 0,
            mapper,
            nametable_a: vec![0u8; 0x0400],
            nametable_b: vec![0u8; 0x0400],
            nametable_c: vec![0u8; 0x0400],
            nametable_d: vec![0u8; 0x0400],
            palette_ram: vec![0u8; 0x0020],
            background_pattern_sr_low: 0,
            background_pattern_sr_high: 0,
            nametable_byte: 0,
            attribute_table_byte: 0,
            low_pattern_table_byte: 0,
            high_pattern_table_byte: 0,
            background_palette_sr_low: 0,
            background_palette_sr_high: 0,
            background_palette_latch: 0,
            primary_oam: vec![0u8; 0x0100],
            secondary_oam: vec![0u8; 0x0020],
            sprite_attribute_latches: vec![0u8; 8],
            sprite_counters: vec![0u8; 8],
            sprite_indexes: vec![0u8; 8],
            sprite_pattern_table_srs: vec![(0u8, 0u8); 8],
            num_sprites: 0,
            address_increment: 1,
            sprite_pattern_table_base: 0,
            background_pattern_table_base: 0,
            oam_address: 0,
            sprite_size: 8,
            grayscale: false,
            show_background_left: false,
            show_sprites_left: false,
            show_background: false,
            show_sprites: false,
            emphasize_red: false,
            emphasize_green: false,
            emphasize_blue: false,
            sprite_overflow: false,
            sprite_zero_hit: false,
            should_generate_nmi: false,
            vertical_blank: false,
            trigger_nmi: false,
            previous_nmi: false,
            nmi_delay: 0,
            read_buffer: 0,
            recent_bits: 0,
            screen: vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 4],
        }
    }

    /// Advances one PPU cycle. Returns true at the end of the visible frame,
    /// when the framebuffer is complete.
    pub fn clock(&mut self) -> bool {
        if self.nmi_delay > 0 {
            self.nmi_delay -= 1;
            if self.nmi_delay == 0 && self.should_generate_nmi && self.vertical_blank {
                self.trigger_nmi = true;
            }
        }

        let rendering = self.rendering();

        // background-related things, on visible scanlines and the pre-render line
        if rendering && (self.scanline < 240 || self.scanline == 261) {
            match self.line_cycle {
                0 => (), // idle cycle
                1..=256 => {
                    if self.scanline != 261 {
                        self.render_pixel();
                    }
                    self.load_data_into_registers();
                    self.shift_registers();
                    self.perform_memory_fetch();
                }
                // at dot 257, the PPU copies all bits related to horizontal position from t to v
                257 => self.copy_horizontal(),
                321..=336 => {
                    self.load_data_into_registers();
                    self.shift_registers();
                    self.perform_memory_fetch();
                }
                x if x > 340 => panic!("cycle beyond 340"),
                _ => (),
            }
        }

        // sprite-related things
        if rendering && self.scanline < 240 {
            match self.line_cycle {
                1 => self.secondary_oam = vec![0xFF; 0x20],
                257 => {
                    self.evaluate_sprites(); // ignoring all timing details
                    self.fetch_sprites();
                }
                _ => (),
            }
        }

        // shortly after the horizontal bits are copied from t to v at dot 257,
        // the PPU repeatedly copies the vertical bits from t to v from dots
        // 280 to 304, completing the full initialization of v
        if rendering && self.scanline == 261 && self.line_cycle >= 280 && self.line_cycle <= 304 {
            self.copy_vertical();
        }
        // at dot 256 of each scanline, the PPU increments the vertical position in v
        if rendering && self.line_cycle == 256 && (self.scanline < 240 || self.scanline == 261) {
            self.inc_y();
        }

        // v blank
        if self.scanline == 241 && self.line_cycle == 1 {
            self.vertical_blank = true;
            self.nmi_change();
        }
        if self.scanline == 261 && self.line_cycle == 1 {
            self.vertical_blank = false;
            self.nmi_change();
            self.sprite_zero_hit = false;
            self.sprite_overflow = false;
        }

        // signal that the visible frame is complete
        let end_of_frame = self.line_cycle == 256 && self.scanline == 240;

        // advance clock; on odd frames with rendering on, the last cycle of
        // the pre-render scanline is skipped
        if rendering && self.line_cycle == 339 && self.scanline == 261 && self.frame % 2 != 0 {
            self.line_cycle = 0;
            self.scanline = 0;
            self.frame = self.frame.wrapping_add(1);
        } else if self.line_cycle == 340 && self.scanline == 261 {
            self.line_cycle = 0;
            self.scanline = 0;
            self.frame = self.frame.wrapping_add(1);
        } else if self.line_cycle == 340 {
            self.line_cycle = 0;
            self.scanline += 1;
        } else {
            self.line_cycle += 1;
        }

        end_of_frame
    }

    /// Snapshot of the render state the mapper sees this cycle, taken before
    /// `clock` advances it.
    pub fn mapper_input(&self) -> MapperStepInput {
        MapperStepInput {
            ppu_cycle: self.line_cycle,
            scanline: self.scanline,
            show_background: self.show_background,
            show_sprites: self.show_sprites,
        }
    }

    pub fn screen(&self) -> &[u8] {
        &self.screen
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn reset(&mut self) {
        self.write_controller(0);
        self.write_mask(0);
        self.t = 0;
        self.x = 0;
        self.w = 0;
        self.read_buffer = 0;
        self.scanline = 0;
        self.line_cycle = 0;
        self.frame = 0;
        self.trigger_nmi = false;
        self.previous_nmi = false;
        self.nmi_delay = 0;
        self.vertical_blank = false;
    }
}

// 2C02 palette
const PALETTE_TABLE: [(u8, u8, u8); 64] = [
    (84, 84, 84),
    (0, 30, 116),
    (8, 16, 144),
    (48, 0, 136),
    (68, 0, 100),
    (92, 0, 48),
    (84, 4, 0),
    (60, 24, 0),
    (32, 42, 0),
    (8, 58, 0),
    (0, 64, 0),
    (0, 60, 0),
    (0, 50, 60),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (152, 150, 152),
    (8, 76, 196),
    (48, 50, 236),
    (92, 30, 228),
    (136, 20, 176),
    (160, 20, 100),
    (152, 34, 32),
    (120, 60, 0),
    (84, 90, 0),
    (40, 114, 0),
    (8, 124, 0),
    (0, 118, 40),
    (0, 102, 120),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (236, 238, 236),
    (76, 154, 236),
    (120, 124, 236),
    (176, 98, 236),
    (228, 84, 236),
    (236, 88, 180),
    (236, 106, 100),
    (212, 136, 32),
    (160, 170, 0),
    (116, 196, 0),
    (76, 208, 32),
    (56, 204, 108),
    (56, 180, 204),
    (60, 60, 60),
    (0, 0, 0),
    (0, 0, 0),
    (236, 238, 236),
    (168, 204, 236),
    (188, 188, 236),
    (212, 178, 236),
    (236, 174, 236),
    (236, 174, 212),
    (236, 180, 176),
    (228, 196, 144),
    (204, 210, 120),
    (180, 222, 120),
    (168, 226, 144),
    (152, 226, 180),
    (160, 214, 228),
    (160, 162, 160),
    (0, 0, 0),
    (0, 0, 0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::new_mapper;
    use crate::test_utils::test_cartridge;

    fn ppu() -> Ppu {
        Ppu::new(new_mapper(test_cartridge(1, 1)))
    }

    // cycles per frame with rendering off (or even frames): 341 * 262
    const FRAME_CYCLES: u64 = 341 * 262;

    #[test]
    fn frame_timing_without_rendering() {
        let mut p = ppu();
        let mut frame_ends = 0;
        for _ in 0..FRAME_CYCLES * 2 {
            if p.clock() {
                frame_ends += 1;
            }
        }
        assert_eq!(frame_ends, 2);
        assert_eq!(p.frame_count(), 2);
    }

    #[test]
    fn odd_frames_skip_a_cycle_only_while_rendering() {
        // rendering off: two frames take exactly 2 * FRAME_CYCLES
        let mut p = ppu();
        for _ in 0..FRAME_CYCLES * 2 {
            p.clock();
        }
        assert_eq!((p.scanline, p.line_cycle), (0, 0));

        // rendering on: the second (odd) frame is one cycle shorter
        let mut p = ppu();
        p.write_mask(0b0000_1000);
        for _ in 0..FRAME_CYCLES * 2 - 1 {
            p.clock();
        }
        assert_eq!((p.scanline, p.line_cycle), (0, 0));
        assert_eq!(p.frame_count(), 2);
    }

    #[test]
    fn vblank_flag_sets_and_clears() {
        let mut p = ppu();
        // run to scanline 241, cycle 2
        for _ in 0..(341 * 241 + 2) {
            p.clock();
        }
        assert!(p.vertical_blank);
        let status = p.read_status();
        assert_eq!(status & 0x80, 0x80);
        // reading clears it
        assert_eq!(p.read_status() & 0x80, 0);
    }

    #[test]
    fn nmi_fires_once_per_vblank_when_enabled() {
        let mut p = ppu();
        p.write_controller(0b1000_0000);
        let mut nmis = 0;
        for _ in 0..FRAME_CYCLES * 2 {
            p.clock();
            if p.trigger_nmi {
                p.trigger_nmi = false;
                nmis += 1;
            }
        }
        assert_eq!(nmis, 2);
    }

    #[test]
    fn nmi_is_delayed_from_vblank_start() {
        let mut p = ppu();
        p.write_controller(0b1000_0000);
        for _ in 0..(341 * 241 + 2) {
            p.clock();
        }
        assert!(p.vertical_blank);
        assert!(!p.trigger_nmi, "NMI should lag the vblank flag");
        for _ in 0..15 {
            p.clock();
        }
        assert!(p.trigger_nmi);
    }

    #[test]
    fn enabling_nmi_during_vblank_triggers_it() {
        let mut p = ppu();
        for _ in 0..(341 * 241 + 2) {
            p.clock();
        }
        assert!(p.vertical_blank);
        p.write_controller(0b1000_0000);
        for _ in 0..20 {
            p.clock();
        }
        assert!(p.trigger_nmi);
    }
}
