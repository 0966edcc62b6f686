use super::serialize::MapperData;
use super::{Cartridge, Mapper, Mirror};

// Mapper 1. All registers are loaded one bit at a time through a 5-bit shift
// register; the fifth write commits to the register selected by the address.
// PRG modes: 0/1 switch 32 KiB at once, 2 fixes the first bank and switches
// $C000, 3 switches $8000 and fixes the last bank. CHR modes: one 8 KiB bank
// or two independent 4 KiB banks.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Mmc1 {
    prg: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>, // $6000-$7FFF, battery-backed on SNROM boards

    shift_register: u8,
    prg_mode: u8,
    chr_mode: u8,
    prg_bank: usize,
    chr_bank_0: usize,
    chr_bank_1: usize,
    mirroring: Mirror,

    // bank-relative base addresses, recomputed in full on every register
    // write, never patched incrementally
    prg_offsets: [usize; 2], // two 16 KiB windows at $8000/$C000
    chr_offsets: [usize; 2], // two 4 KiB windows at $0000/$1000
}

impl Mmc1 {
    pub fn new(cart: Cartridge) -> Self {
        let prg: Vec<u8> = cart.prg_rom.concat();
        let (chr, chr_is_ram) = if cart.chr_rom.is_empty() {
            (vec![0; 0x2000], true)
        } else {
            (cart.chr_rom.concat(), false)
        };
        let mut m = Mmc1 {
            prg,
            chr,
            chr_is_ram,
            prg_ram: vec![0; 0x2000],
            shift_register: 0x10,
            prg_mode: 3, // power-on: $C000 fixed to the last bank
            chr_mode: 0,
            prg_bank: 0,
            chr_bank_0: 0,
            chr_bank_1: 0,
            mirroring: cart.mirroring,
            prg_offsets: [0; 2],
            chr_offsets: [0; 2],
        };
        m.update_offsets();
        m
    }

    fn load_register(&mut self, address: usize, value: u8) {
        if value & 0x80 != 0 {
            // reset: clear the shift register and lock $C000 to the last bank
            self.shift_register = 0x10;
            self.prg_mode = 3;
            self.update_offsets();
            return;
        }
        let complete = self.shift_register & 1 == 1;
        self.shift_register >>= 1;
        self.shift_register |= (value & 1) << 4;
        if complete {
            self.write_register(address, self.shift_register);
            self.shift_register = 0x10;
        }
    }

    fn write_register(&mut self, address: usize, value: u8) {
        match address {
            0x8000..=0x9FFF => {
                // control: mirroring, PRG mode, CHR mode
                self.mirroring = match value & 0b11 {
                    0 => Mirror::Single0,
                    1 => Mirror::Single1,
                    2 => Mirror::Vertical,
                    _ => Mirror::Horizontal,
                };
                self.prg_mode = (value >> 2) & 0b11;
                self.chr_mode = (value >> 4) & 1;
            }
            0xA000..=0xBFFF => self.chr_bank_0 = value as usize & 0x1F,
            0xC000..=0xDFFF => self.chr_bank_1 = value as usize & 0x1F,
            0xE000..=0xFFFF => self.prg_bank = value as usize & 0x0F,
            _ => (),
        }
        self.update_offsets();
    }

    fn update_offsets(&mut self) {
        let prg_banks = self.prg.len() / 0x4000;
        match self.prg_mode {
            0 | 1 => {
                // 32 KiB at once, ignoring the low bank bit
                let bank = (self.prg_bank & !1) % prg_banks;
                self.prg_offsets = [bank * 0x4000, (bank + 1) % prg_banks * 0x4000];
            }
            2 => {
                self.prg_offsets = [0, (self.prg_bank % prg_banks) * 0x4000];
            }
            _ => {
                self.prg_offsets = [
                    (self.prg_bank % prg_banks) * 0x4000,
                    (prg_banks - 1) * 0x4000,
                ];
            }
        }
        let chr_banks = self.chr.len() / 0x1000;
        if self.chr_mode == 0 {
            let bank = (self.chr_bank_0 & !1) % chr_banks;
            self.chr_offsets = [bank * 0x1000, (bank + 1) * 0x1000];
        } else {
            self.chr_offsets = [
                (self.chr_bank_0 % chr_banks) * 0x1000,
                (self.chr_bank_1 % chr_banks) * 0x1000,
            ];
        }
    }
}

impl Mapper for Mmc1 {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr[self.chr_offsets[address / 0x1000] + address % 0x1000],
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000],
            0x8000..=0xFFFF => {
                let a = address - 0x8000;
                self.prg[self.prg_offsets[a / 0x4000] + a % 0x4000]
            }
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                if self.chr_is_ram {
                    let offset = self.chr_offsets[address / 0x1000] + address % 0x1000;
                    self.chr[offset] = value;
                }
            }
            0x6000..=0x7FFF => self.prg_ram[address % 0x2000] = value,
            0x8000..=0xFFFF => self.load_register(address, value),
            _ => (),
        }
    }

    fn mirroring(&self) -> Mirror {
        self.mirroring
    }

    fn save_state(&self) -> MapperData {
        MapperData::Mmc1(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Mmc1(d) = data {
            *self = d;
        }
    }
}
