use super::serialize::MapperData;
use super::{Cartridge, Mapper, MapperStepInput, Mirror};

// Mappers 9 (MMC2) and 10 (MMC4). Both pair two 4 KiB CHR windows with
// FD/FE latches that flip as the PPU fetches specific tiles, which is how
// Punch-Out!! swaps pattern data mid-frame without CPU involvement.
// MMC4 widens the PRG window to 16 KiB, adds PRG-RAM, and matches the
// latch trigger on a full 8-byte tile row instead of a single address.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Mmc2 {
    cart: Cartridge,
    is_mmc4: bool,
    prg_ram: Vec<u8>,
    prg_bank: usize,
    // CHR bank registers, one per (window, latch state)
    chr_banks: [[usize; 2]; 2], // [window][0=FD, 1=FE]
    latches: [usize; 2],
    mirroring: Mirror,
}

impl Mmc2 {
    pub fn new(cart: Cartridge, is_mmc4: bool) -> Self {
        let mirroring = cart.mirroring;
        Mmc2 {
            cart,
            is_mmc4,
            prg_ram: vec![0; 0x2000],
            prg_bank: 0,
            chr_banks: [[0; 2]; 2],
            latches: [1; 2],
            mirroring,
        }
    }

    fn chr_read(&mut self, address: usize) -> u8 {
        let window = address / 0x1000;
        let bank = self.chr_banks[window][self.latches[window]]
            % (2 * self.cart.chr_rom.len());
        let value = self.cart.chr_rom[bank / 2][(bank % 2) * 0x1000 + address % 0x1000];
        // the latch flips after the fetch completes
        match (address, self.is_mmc4) {
            (0x0FD8, false) => self.latches[0] = 0,
            (0x0FE8, false) => self.latches[0] = 1,
            (0x0FD8..=0x0FDF, true) => self.latches[0] = 0,
            (0x0FE8..=0x0FEF, true) => self.latches[0] = 1,
            (0x1FD8..=0x1FDF, _) => self.latches[1] = 0,
            (0x1FE8..=0x1FEF, _) => self.latches[1] = 1,
            _ => (),
        }
        value
    }

    fn prg_read(&self, address: usize) -> u8 {
        let a = address - 0x8000;
        if self.is_mmc4 {
            // 16 KiB switchable at $8000, last chunk fixed at $C000
            let chunk = match a / 0x4000 {
                0 => self.prg_bank % self.cart.prg_rom.len(),
                _ => self.cart.prg_rom.len() - 1,
            };
            self.cart.prg_rom[chunk][a % 0x4000]
        } else {
            // 8 KiB switchable at $8000, last three 8 KiB banks fixed
            let banks = 2 * self.cart.prg_rom.len();
            let bank = match a / 0x2000 {
                0 => self.prg_bank % banks,
                n => banks - 4 + n,
            };
            self.cart.prg_rom[bank / 2][(bank % 2) * 0x2000 + a % 0x2000]
        }
    }
}

impl Mapper for Mmc2 {
    fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.chr_read(address),
            0x6000..=0x7FFF if self.is_mmc4 => self.prg_ram[address % 0x2000],
            0x8000..=0xFFFF => self.prg_read(address),
            _ => 0,
        }
    }

    fn write(&mut self, address: usize, value: u8) {
        let v = (value & 0b1_1111) as usize;
        match address {
            0x6000..=0x7FFF if self.is_mmc4 => self.prg_ram[address % 0x2000] = value,
            0xA000..=0xAFFF => self.prg_bank = (value & 0b1111) as usize,
            0xB000..=0xBFFF => self.chr_banks[0][0] = v,
            0xC000..=0xCFFF => self.chr_banks[0][1] = v,
            0xD000..=0xDFFF => self.chr_banks[1][0] = v,
            0xE000..=0xEFFF => self.chr_banks[1][1] = v,
            0xF000..=0xFFFF => {
                self.mirroring = if value & 1 == 0 {
                    Mirror::Vertical
                } else {
                    Mirror::Horizontal
                }
            }
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
        MapperData::Mmc2(self.clone())
    }

    fn load_state(&mut self, data: MapperData) {
        if let MapperData::Mmc2(d) = data {
            *self = d;
        }
    }
}
