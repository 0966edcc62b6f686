use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Konami VRC2/VRC4 boards, mappers 21, 22, 23 and 25. The chips are all the
// same register file behind differently wired address lines, so everything
// funnels through one struct plus a per-mapper (A1, A0) normalization.
// VRC2 is treated as the VRC4 subset it is; the one real difference is
// mapper 22 (VRC2a), whose CHR registers are wired one line over and so
// select banks at half value.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Vrc {
    cart: Cartridge,
    mapper_num: u8,
    prg_ram: Vec<u8>,
    chr_ram: Vec<u8>,
    prg_banks: [usize; 2],
    prg_swap_mode: bool,
    chr_banks: [usize; 8], // 1 KiB windows, 9-bit registers
    mirroring: Mirror,

    irq_latch: u8,
    irq_counter: u8,
    irq_enable: bool,
    irq_enable_after_ack: bool,
    irq_cycle_mode: bool,
    irq_pending: bool,
    prescaler: i16, // PPU cycles until the next counter clock
}

impl Vrc {
    pub fn new(cart: Cartridge, mapper_num: u8) -> Self {
        let mirroring = cart.mirroring;
        Vrc {
            cart,
            mapper_num,
            prg_ram: vec![0; 0x2000],
            chr_ram: vec![0; 0x2000],
            prg_banks: [0; 2],
            prg_swap_mode: false,
            chr_banks: [0; 8],
            mirroring,
            irq_latch: 0,
            irq_counter: 0,
            irq_enable: false,
            irq_enable_after_ack: false,
            irq_cycle_mode: false,
            irq_pending: false,
            prescaler: 0,
        }
    }

    // Collapse each board's register-select wiring down to (A1, A0).
    fn select_lines(&self, address: usize) -> usize {
        let b = |n: usize| (address >> n) & 1;
        let (a1, a0) = match self.mapper_num {
            22 => (b(0), b(1)),
            23 => (b(1) | b(3), b(0) | b(2)),
            25 => (b(0) | b(2), b(1) | b(3)),
            _ => (b(2) | b(7), b(1) | b(6)), // 21
        };
        a1 << 1 | a0
    }

    fn prg_read(&self, address: usize) -> u8 {
        let banks = 2 * self.cart.prg_rom.len();
        let bank = match (address - 0x8000) / 0x2000 {
            0 if self.prg_swap_mode => banks - 2,
            0 => self.prg_banks[0] % banks,
            1 => self.prg_banks[1] % banks,
            2 if self.prg_swap_mode => self.prg_banks[0] % banks,
            2 => banks - 2,
            _ => banks - 1,
        };
        self.cart.prg_rom[bank / 2][(bank % 2) * 0x2000 + address % 0x2000]
    }

    fn chr_bank(&self, window: usize) -> usize {
        let bank = if self.mapper_num == 22 {
            self.chr_banks[window] >> 1
        } else {
            self.chr_banks[window]
        };
        bank % (8 * self.cart.chr_rom.len())
    }

    fn write_register(&mut self, address: usize, value: u8) {
        let sel = self.select_lines(address);
        match address & 0xF000 {
            0x8000 => self.prg_banks[0] = (value & 0b1_1111) as usize,
            0xA000 => self.prg_banks[1] = (value & 0b1_1111) as usize,
            0x9000 => match sel {
                0 | 1 => {
                    self.mirroring = match value & 0b11 {
                        0 => Mirror::Vertical,
                        1 => Mirror::Horizontal,
                        2 => Mirror::Single0,
                        _ => Mirror::Single1,
                    }
                }
                _ => self.prg_swap_mode = value & 0b10 != 0,
            },
            0xB000..=0xE000 => {
                let reg = ((address & 0xF000) - 0xB000) / 0x1000 * 2 + (sel >> 1);
                // each register is written a nibble at a time
                self.chr_banks[reg] = if sel & 1 == 0 {
                    (self.chr_banks[reg] & !0x0F) | (value & 0x0F) as usize
                } else {
                    (self.chr_banks[reg] & 0x0F) | ((value & 0x1F) as usize) << 4
                };
            }
            0xF000 => match sel {
                0 => self.irq_latch = (self.irq_latch & 0xF0) | (value & 0x0F),
                1 => self.irq_latch = (self.irq_latch & 0x0F) | (value & 0x0F) << 4,
                2 => {
                    self.irq_enable_after_ack = value & 0b001 != 0;
                    self.irq_enable = value & 0b010 != 0;
                    self.irq_cycle_mode = value & 0b100 != 0;
                    self.irq_pending = false;
                    if self.irq_enable {
                        self.irq_counter = self.irq_latch;
                        self.prescaler = if self.irq_cycle_mode { 3 } else { 341 };
                    }
                }
                _ => {
                    self.irq_pending = false;
                    self.irq_enable = self.irq_enable_after_ack;
                }
            },
            _ => (),
        }
    }

    fn clock_irq_counter(&mut self) {
        // counts up, reloading from the latch on overflow
        if self.irq_counter == 0xFF {
            self.irq_counter = self.irq_latch;
            self.irq_pending = true;
        } else {
            self.irq_counter += 1;
        }
    }
}

impl Mapper for Vrc {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => {
                if self.cart.chr_rom.is_empty() {
                    self.chr_ram[address]
                } else {
                    let bank = self.chr_bank(address / 0x400);
                    self.cart.chr_rom[bank / 8][(bank % 8) * 0x400 + address % 0x400]
                }
            }
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000],
            0x8000..=0xFFFF => self.prg_read(address),
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
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000] = value,
            0x8000..=0xFFFF => self.write_register(address, value),
            _ => (),
        }
    }

    // The IRQ counter runs off the CPU clock. In cycle mode it advances every
    // CPU cycle; in scanline mode every 113+2/3 CPU cycles. Both divide evenly
    // into the PPU clock this runs on: 3 and 341 dots respectively.
    fn step(&mut self, _input: MapperStepInput) -> bool {
        if !self.irq_enable {
            return false;
        }
        self.prescaler -= 1;
        if self.prescaler <= 0 {
            self.prescaler += if self.irq_cycle_mode { 3 } else { 341 };
            self.clock_irq_counter();
        }
        let fired = self.irq_pending;
        self.irq_pending = false;
        fired
    }

    fn mirroring(&self) -> Mirror {
        self.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Vrc(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Vrc(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    fn any_step() -> MapperStepInput {
        MapperStepInput {
            ppu_cycle: 0,
            scanline: 0,
            show_background: false,
            show_sprites: false,
        }
    }

    #[test]
    fn prg_swap_mode_moves_first_bank_to_c000() {
        let mut cart = test_cartridge(4, 1);
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = (2 * i) as u8;
            chunk[0x2000] = (2 * i + 1) as u8;
        }
        let mut m = Vrc::new(cart, 23);
        m.write(0x8000, 3);
        assert_eq!(m.read(0x8000), 3);
        assert_eq!(m.read(0xC000), 6);
        m.write(0x9002, 0b10); // mapper 23: $9002 is the swap-mode register
        assert_eq!(m.read(0x8000), 6);
        assert_eq!(m.read(0xC000), 3);
        assert_eq!(m.read(0xE000), 7);
    }

    #[test]
    fn chr_registers_assemble_from_nibbles() {
        let mut m = Vrc::new(test_cartridge(1, 4), 23);
        m.write(0xB000, 0x05); // window 0 low nibble
        m.write(0xB001, 0x01); // window 0 high bits
        assert_eq!(m.chr_banks[0], 0x15);
        assert_eq!(m.chr_bank(0), 0x15 % 32);
    }

    #[test]
    fn vrc2a_halves_chr_bank_values() {
        let mut m = Vrc::new(test_cartridge(1, 4), 22);
        m.write(0xB000, 0x06);
        assert_eq!(m.chr_bank(0), 3);
    }

    #[test]
    fn mapper25_line_swap() {
        let mut m = Vrc::new(test_cartridge(1, 4), 25);
        // on VRC4b the high-nibble write sits at A0, which is wired to bit 1
        m.write(0xB000, 0x05);
        m.write(0xB002, 0x01);
        assert_eq!(m.chr_banks[0], 0x15);
    }

    #[test]
    fn irq_counts_up_and_fires_on_overflow() {
        let mut m = Vrc::new(test_cartridge(1, 1), 23);
        m.write(0xF000, 0x0C); // latch = 0xFC
        m.write(0xF001, 0x0F);
        m.write(0xF002, 0b110); // enable, cycle mode
        let mut fires = Vec::new();
        for cpu_cycle in 0..10 {
            for dot in 0..3 {
                if m.step(any_step()) {
                    fires.push((cpu_cycle, dot));
                }
            }
        }
        // 0xFC..0xFF is 4 clocks to the overflow that fires, and the reload
        // from the latch makes every later period the same length
        assert_eq!(fires, vec![(3, 2), (7, 2)]);
    }

    #[test]
    fn chr_ram_board_reads_and_writes_patterns() {
        let mut m = Vrc::new(test_cartridge(1, 0), 23);
        assert_eq!(m.read(0x0000), 0);
        m.write(0x1ABC, 0x55);
        assert_eq!(m.read(0x1ABC), 0x55);
    }

    #[test]
    fn ack_clears_and_optionally_reenables() {
        let mut m = Vrc::new(test_cartridge(1, 1), 23);
        m.write(0xF000, 0x0F);
        m.write(0xF001, 0x0F);
        m.write(0xF002, 0b111); // enable, cycle mode, enable-after-ack
        m.write(0xF003, 0);
        assert!(m.irq_enable);
        m.write(0xF002, 0b100); // disabled
        assert!(!m.step(any_step()));
    }
}
