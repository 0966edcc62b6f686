use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mapper 4 (and 206, which is its register subset). Eight bank-data registers
// selected through an even/odd address-pair protocol, plus a scanline IRQ
// counter clocked by the mapper step while the PPU is rendering.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Mmc3 {
    prg: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>, // $6000-$7FFF
    mirroring: Mirror,
    four_screen: bool,

    bank_registers: [usize; 8],
    next_bank: u8,
    // false: $8000 swappable, $C000 fixed to second-last bank; true: swapped
    prg_rom_bank_mode: bool,
    // false: two 2 KiB banks at $0000, four 1 KiB banks at $1000; true: swapped
    chr_rom_bank_mode: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_enable: bool,
    reload_pending: bool,

    // recomputed in full on every bank-affecting write
    prg_offsets: [usize; 4], // four 8 KiB windows from $8000
    chr_offsets: [usize; 8], // eight 1 KiB windows from $0000
}

impl Mmc3 {
    pub fn new(cart: Cartridge) -> Self {
        let prg: Vec<u8> = cart.prg_rom.concat();
        let (chr, chr_is_ram) = if cart.chr_rom.is_empty() {
            (vec![0; 0x2000], true)
        } else {
            (cart.chr_rom.concat(), false)
        };
        let mut m = Mmc3 {
            prg,
            chr,
            chr_is_ram,
            prg_ram: vec![0; 0x2000],
            mirroring: cart.mirroring,
            four_screen: cart.four_screen,
            bank_registers: [0; 8],
            next_bank: 0,
            prg_rom_bank_mode: false,
            chr_rom_bank_mode: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_enable: false,
            reload_pending: false,
            prg_offsets: [0; 4],
            chr_offsets: [0; 8],
        };
        m.update_offsets();
        m
    }

    // $8000 even
    fn bank_select(&mut self, value: u8) {
        self.next_bank = value & 0b111;
        self.prg_rom_bank_mode = value & (1 << 6) != 0;
        self.chr_rom_bank_mode = value & (1 << 7) != 0;
        self.update_offsets();
    }

    // $8001 odd
    fn bank_data(&mut self, value: u8) {
        // R6/R7 ignore the top two bits (only 6 PRG address lines); R0/R1
        // ignore the bottom bit because they count in 2 KiB units
        self.bank_registers[self.next_bank as usize] = match self.next_bank {
            0 | 1 => value & 0b1111_1110,
            6 | 7 => value & 0b0011_1111,
            _ => value,
        } as usize;
        self.update_offsets();
    }

    fn update_offsets(&mut self) {
        let prg_banks = self.prg.len() / 0x2000;
        let r6 = self.bank_registers[6] % prg_banks;
        let r7 = self.bank_registers[7] % prg_banks;
        self.prg_offsets = if self.prg_rom_bank_mode {
            [prg_banks - 2, r7, r6, prg_banks - 1]
        } else {
            [r6, r7, prg_banks - 2, prg_banks - 1]
        };
        for o in self.prg_offsets.iter_mut() {
            *o *= 0x2000;
        }

        let chr_banks = self.chr.len() / 0x400;
        let r = &self.bank_registers;
        let banks_1k = [
            r[0], r[0] + 1, r[1], r[1] + 1, r[2], r[3], r[4], r[5],
        ];
        for (i, bank) in banks_1k.iter().enumerate() {
            // the two 2 KiB pairs sit at $0000 or $1000 depending on the mode
            let window = if self.chr_rom_bank_mode { (i + 4) % 8 } else { i };
            self.chr_offsets[window] = (bank % chr_banks) * 0x400;
        }
    }

    fn clock_irq_counter(&mut self) -> bool {
        if self.reload_pending || self.irq_counter == 0 {
            self.irq_counter = self.irq_latch;
            self.reload_pending = false;
            false
        } else {
            self.irq_counter -= 1;
            self.irq_counter == 0 && self.irq_enable
        }
    }
}

impl Mapper for Mmc3 {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr[self.chr_offsets[address / 0x400] + address % 0x400],
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000],
            0x8000..=0xFFFF => {
                let a = address - 0x8000;
                self.prg[self.prg_offsets[a / 0x2000] + a % 0x2000]
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                if self.chr_is_ram {
                    let offset = self.chr_offsets[address / 0x400] + address % 0x400;
                    self.chr[offset] = value;
                }
            }
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000] = value,
            0x8000..=0x9FFF => match address % 2 {
                0 => self.bank_select(value),
                _ => self.bank_data(value),
            },
            0xA000..=0xBFFF => match address % 2 {
                0 => {
                    self.mirroring = if value & 1 == 0 {
                        Mirror::Vertical
                    } else {
                        Mirror::Horizontal
                    }
                }
                _ => (), // PRG-RAM protect, not worth emulating
            },
            0xC000..=0xDFFF => match address % 2 {
                0 => self.irq_latch = value,
                // reload at the counter's next clock
                _ => self.reload_pending = true,
            },
            0xE000..=0xFFFF => match address % 2 {
                // any write disables interrupts and acknowledges a pending one
                0 => self.irq_enable = false,
                _ => self.irq_enable = true,
            },
            _ => (),
        }
    }

    // Clocked once per scanline at PPU cycle 260 (the A12 rising edge with the
    // standard $0000 background / $1000 sprite layout), skipping vblank and
    // counting only while rendering is on.
    fn step(&mut self, input: MapperStepInput) -> bool {
        if input.ppu_cycle != 260 {
            return false;
        }
        if input.scanline > 239 && input.scanline != 261 {
            return false;
        }
        if !input.rendering() {
            return false;
        }
        self.clock_irq_counter()
    }

    fn mirroring(&self) -> Mirror {
        if self.four_screen {
            Mirror::FourScreen
        } else {
            self.mirroring
        }
    }

    fn save_state(&self) -> MapperData {
        MapperData::Mmc3(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Mmc3(d) = data {
            *self = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_cartridge;

    fn qualifying_step() -> MapperStepInput {
        MapperStepInput {
            ppu_cycle: 260,
            scanline: 100,
            show_background: true,
            show_sprites: false,
        }
    }

    fn mmc3() -> Mmc3 {
        Mmc3::new(test_cartridge(4, 2))
    }

    #[test]
    fn irq_fires_after_n_plus_one_qualifying_steps_then_repeats() {
        let mut m = mmc3();
        let n = 4u8;
        m.write(0xC000, n); // latch
        m.write(0xE001, 0); // enable
        for period in 0..3 {
            let mut fired = 0;
            for i in 0..(n as usize + 1) {
                if m.step(qualifying_step()) {
                    fired += 1;
                    assert_eq!(i, n as usize, "IRQ fired early in period {}", period);
                }
            }
            assert_eq!(fired, 1);
        }
    }

    #[test]
    fn irq_ignores_vblank_disabled_rendering_and_other_cycles() {
        let mut m = mmc3();
        m.write(0xC000, 0);
        m.write(0xE001, 0);
        let mut input = qualifying_step();
        input.ppu_cycle = 100;
        assert!(!m.step(input));
        let mut input = qualifying_step();
        input.scanline = 241;
        assert!(!m.step(input));
        let mut input = qualifying_step();
        input.show_background = false;
        assert!(!m.step(input));
    }

    #[test]
    fn disabling_acknowledges_pending_irq() {
        let mut m = mmc3();
        m.write(0xC000, 0);
        m.write(0xE000, 0); // disabled
        // counter still clocks, but no IRQ is signaled
        for _ in 0..5 {
            assert!(!m.step(qualifying_step()));
        }
    }

    #[test]
    fn prg_mode_swaps_fixed_and_switchable_windows() {
        let mut cart = test_cartridge(4, 2);
        let banks = cart.prg_rom.len() * 2; // 8 KiB banks
        for (i, chunk) in cart.prg_rom.iter_mut().enumerate() {
            chunk[0] = (2 * i) as u8;
            chunk[0x2000] = (2 * i + 1) as u8;
        }
        let mut m = Mmc3::new(cart);
        m.write(0x8000, 6); // select R6
        m.write(0x8001, 1); // R6 = bank 1
        assert_eq!(m.read(0x8000), 1);
        assert_eq!(m.read(0xC000), (banks - 2) as u8);
        m.write(0x8000, 6 | (1 << 6)); // flip PRG bank mode
        assert_eq!(m.read(0x8000), (banks - 2) as u8);
        assert_eq!(m.read(0xC000), 1);
        // last bank is always fixed
        assert_eq!(m.read(0xE000), (banks - 1) as u8);
    }

    #[test]
    fn chr_2k_registers_ignore_low_bit() {
        let mut m = mmc3();
        m.write(0x8000, 0);
        m.write(0x8001, 0b0000_0101); // R0 = 5, low bit dropped -> 4
        assert_eq!(m.chr_offsets[0], 4 * 0x400);
        assert_eq!(m.chr_offsets[1], 5 * 0x400);
    }
}
