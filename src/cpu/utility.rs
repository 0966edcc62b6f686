use super::{Mode, CARRY_FLAG, NEGATIVE_FLAG, STACK_OFFSET, ZERO_FLAG};

impl super::Cpu {
    pub fn advance_pc(&mut self, mode: Mode) {
        self.pc += match mode {
            Mode::ABS => 3,
            Mode::ABX => 3,
            Mode::ABY => 3,
            Mode::ACC => 1,
            Mode::IMM => 2,
            Mode::IMP => 1,
            Mode::IDX => 2,
            Mode::IND => 3,
            Mode::INX => 2,
            Mode::REL => 2,
            Mode::ZPG => 2,
            Mode::ZPX => 2,
            Mode::ZPY => 2,
        }
    }

    pub fn add_offset_to_pc(&mut self, offset: i8) {
        if offset >= 0 {
            self.pc += offset as usize;
        } else {
            self.pc -= (-(offset as isize)) as usize;
        }
    }

    pub fn address_page_cross(&mut self, old_address: usize, new_address: usize) {
        if old_address / 0x100 != new_address / 0x100 {
            self.clock += 1;
        }
    }

    pub fn branch(&mut self, unsigned_offset: u8) {
        // a taken branch costs one extra cycle, two if it changes page
        self.clock += 1;
        let old_addr = self.pc;
        self.add_offset_to_pc(unsigned_offset as i8);
        self.address_page_cross(old_addr, self.pc);
    }

    pub fn compare(&mut self, reg: u8, byte: u8) {
        if reg >= byte {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        let diff = reg.wrapping_sub(byte);
        self.set_zero_flag(diff);
        self.set_negative_flag(diff);
    }

    pub fn pop(&mut self) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.read(STACK_OFFSET + self.s as usize)
    }

    pub fn push(&mut self, byte: u8) {
        self.write(STACK_OFFSET + self.s as usize, byte);
        self.s = self.s.wrapping_sub(1);
    }

    pub fn set_negative_flag(&mut self, num: u8) {
        if num & 0x80 == 0x80 {
            self.p |= NEGATIVE_FLAG;
        } else {
            self.p &= !NEGATIVE_FLAG;
        }
    }

    pub fn set_zero_flag(&mut self, num: u8) {
        if num == 0 {
            self.p |= ZERO_FLAG;
        } else {
            self.p &= !ZERO_FLAG;
        }
    }
}
