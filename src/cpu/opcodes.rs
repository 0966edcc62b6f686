use super::{
    Mode, CARRY_FLAG, DECIMAL_FLAG, INTERRUPT_DISABLE_FLAG, IRQ_VECTOR, NEGATIVE_FLAG, NMI_VECTOR,
    OVERFLOW_FLAG, ZERO_FLAG,
};

impl super::Cpu {
    pub fn adc(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        let carry_bit = (self.p & CARRY_FLAG) as u16;
        let sum = self.a as u16 + byte as u16 + carry_bit;
        let new_val = sum as u8;
        if sum > 0xFF {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        self.set_zero_flag(new_val);
        self.set_negative_flag(new_val);
        // signed overflow happens when both operands share a sign the result lacks,
        // see http://www.righto.com/2012/12/the-6502-overflow-flag-explained.html
        if (byte ^ new_val) & (self.a ^ new_val) & 0x80 != 0 {
            self.p |= OVERFLOW_FLAG;
        } else {
            self.p &= !OVERFLOW_FLAG;
        }
        self.a = new_val;
    }

    pub fn and(&mut self, _address: usize, _mode: Mode) {
        self.a &= self.read(_address);
        self.set_zero_flag(self.a);
        self.set_negative_flag(self.a);
    }

    pub fn asl(&mut self, _address: usize, _mode: Mode) {
        let mut val = match _mode {
            Mode::ACC => self.a,
            _ => {
                self.clock += 2;
                self.read(_address)
            }
        };
        // put top bit in carry flag
        if val & (1 << 7) != 0 {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        val <<= 1;
        match _mode {
            Mode::ACC => self.a = val,
            _ => self.write(_address, val),
        };
        self.set_zero_flag(val);
        self.set_negative_flag(val);
    }

    pub fn bcc(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & CARRY_FLAG == 0 {
            self.branch(byte);
        }
    }

    pub fn bcs(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & CARRY_FLAG != 0 {
            self.branch(byte);
        }
    }

    pub fn beq(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & ZERO_FLAG != 0 {
            self.branch(byte);
        }
    }

    pub fn bit(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.set_zero_flag(byte & self.a);
        if byte & (1 << 6) != 0 {
            self.p |= OVERFLOW_FLAG;
        } else {
            self.p &= !OVERFLOW_FLAG;
        }
        self.set_negative_flag(byte);
    }

    pub fn bmi(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & NEGATIVE_FLAG != 0 {
            self.branch(byte);
        }
    }

    pub fn bne(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & ZERO_FLAG == 0 {
            self.branch(byte);
        }
    }

    pub fn bpl(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & NEGATIVE_FLAG == 0 {
            self.branch(byte);
        }
    }

    pub fn brk(&mut self, _address: usize, _mode: Mode) {
        // BRK is a 2-byte opcode, #$00 plus a padding byte, which is why
        // interrupt routines invoked by it return 2 bytes after the opcode.
        self.push(((self.pc + 1) >> 8) as u8); // push high byte
        self.push(((self.pc + 1) & 0xFF) as u8); // push low byte
        self.push(self.p | 0b0011_0000); // push status register with break bits set
        self.p |= INTERRUPT_DISABLE_FLAG;
        self.pc = ((self.read(IRQ_VECTOR + 1) as usize) << 8) + self.read(IRQ_VECTOR) as usize;
        self.clock += 5; // total of 7 cycles, 2 come from implied()
    }

    pub fn bvc(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & OVERFLOW_FLAG == 0 {
            self.branch(byte);
        }
    }

    pub fn bvs(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        if self.p & OVERFLOW_FLAG != 0 {
            self.branch(byte);
        }
    }

    pub fn clc(&mut self, _address: usize, _mode: Mode) {
        self.p &= !CARRY_FLAG;
    }

    pub fn cld(&mut self, _address: usize, _mode: Mode) {
        self.p &= !DECIMAL_FLAG;
    }

    pub fn cli(&mut self, _address: usize, _mode: Mode) {
        self.p &= !INTERRUPT_DISABLE_FLAG;
    }

    pub fn clv(&mut self, _address: usize, _mode: Mode) {
        self.p &= !OVERFLOW_FLAG;
    }

    pub fn cmp(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.compare(self.a, byte);
    }

    pub fn cpx(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.compare(self.x, byte);
    }

    pub fn cpy(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.compare(self.y, byte);
    }

    // unofficial: DEC then CMP
    pub fn dcp(&mut self, _address: usize, _mode: Mode) {
        let val = self.read(_address).wrapping_sub(1);
        self.write(_address, val);
        self.compare(self.a, val);
        self.clock += 2;
    }

    pub fn dec(&mut self, _address: usize, _mode: Mode) {
        let val = self.read(_address).wrapping_sub(1);
        self.write(_address, val);
        self.set_zero_flag(val);
        self.set_negative_flag(val);
        self.clock += 2; // extra cycles for all addressing modes of this instruction
    }

    pub fn dex(&mut self, _address: usize, _mode: Mode) {
        self.x = self.x.wrapping_sub(1);
        self.set_zero_flag(self.x);
        self.set_negative_flag(self.x);
    }

    pub fn dey(&mut self, _address: usize, _mode: Mode) {
        self.y = self.y.wrapping_sub(1);
        self.set_zero_flag(self.y);
        self.set_negative_flag(self.y);
    }

    pub fn eor(&mut self, _address: usize, _mode: Mode) {
        self.a ^= self.read(_address);
        self.set_negative_flag(self.a);
        self.set_zero_flag(self.a);
    }

    pub fn inc(&mut self, _address: usize, _mode: Mode) {
        let val = self.read(_address).wrapping_add(1);
        self.write(_address, val);
        self.set_zero_flag(val);
        self.set_negative_flag(val);
        self.clock += 2; // extra cycles for all addressing modes of this instruction
    }

    // unofficial: INC then SBC
    pub fn isc(&mut self, _address: usize, _mode: Mode) {
        self.inc(_address, _mode);
        self.sbc(_address, _mode);
    }

    pub fn inx(&mut self, _address: usize, _mode: Mode) {
        self.x = self.x.wrapping_add(1);
        self.set_zero_flag(self.x);
        self.set_negative_flag(self.x);
    }

    pub fn iny(&mut self, _address: usize, _mode: Mode) {
        self.y = self.y.wrapping_add(1);
        self.set_zero_flag(self.y);
        self.set_negative_flag(self.y);
    }

    pub fn jmp(&mut self, _address: usize, _mode: Mode) {
        // the one absolute-mode instruction that takes 3 cycles, not 4
        if let Mode::ABS = _mode {
            self.clock -= 1;
        }
        self.pc = _address;
    }

    pub fn jsr(&mut self, _address: usize, _mode: Mode) {
        // absolute() already advanced the program counter by 3, so minus one
        // is the last byte of the jsr instruction
        let minus1 = self.pc - 1;
        self.push((minus1 >> 8) as u8);
        self.push((minus1 & 0xFF) as u8);
        self.pc = _address;
        self.clock += 2;
    }

    // unofficial: loads both the accumulator and X
    pub fn lax(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.a = byte;
        self.x = byte;
        self.set_zero_flag(byte);
        self.set_negative_flag(byte);
    }

    pub fn lda(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.a = byte;
        self.set_zero_flag(byte);
        self.set_negative_flag(byte);
    }

    pub fn ldx(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.x = byte;
        self.set_zero_flag(byte);
        self.set_negative_flag(byte);
    }

    pub fn ldy(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        self.y = byte;
        self.set_zero_flag(byte);
        self.set_negative_flag(byte);
    }

    pub fn lsr(&mut self, _address: usize, _mode: Mode) {
        let mut val = match _mode {
            Mode::ACC => self.a,
            _ => {
                self.clock += 2;
                self.read(_address)
            }
        };
        if val & 0x1 == 0x1 {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        val >>= 1;
        match _mode {
            Mode::ACC => self.a = val,
            _ => self.write(_address, val),
        };
        self.set_zero_flag(val);
        self.set_negative_flag(val);
    }

    pub fn nop(&mut self, _address: usize, _mode: Mode) {}

    pub fn ora(&mut self, _address: usize, _mode: Mode) {
        self.a |= self.read(_address);
        self.set_zero_flag(self.a);
        self.set_negative_flag(self.a);
    }

    pub fn pha(&mut self, _address: usize, _mode: Mode) {
        self.clock += 1;
        self.push(self.a);
    }

    pub fn php(&mut self, _address: usize, _mode: Mode) {
        self.clock += 1;
        self.push(self.p | 0b0011_0000);
    }

    pub fn pla(&mut self, _address: usize, _mode: Mode) {
        self.clock += 2;
        self.a = self.pop();
        self.set_zero_flag(self.a);
        self.set_negative_flag(self.a);
    }

    pub fn plp(&mut self, _address: usize, _mode: Mode) {
        self.clock += 2;
        // the break bits don't exist in the register proper: bit 4 reads as 0,
        // bit 5 as 1, whatever was pushed
        self.p = (self.pop() & 0xEF) | 0x20;
    }

    // unofficial: ROL then AND
    pub fn rla(&mut self, _address: usize, _mode: Mode) {
        self.rol(_address, _mode);
        self.and(_address, _mode);
    }

    pub fn rol(&mut self, _address: usize, _mode: Mode) {
        let mut val = match _mode {
            Mode::ACC => self.a,
            _ => {
                self.clock += 2;
                self.read(_address)
            }
        };
        let carry_flag_bit = self.p & CARRY_FLAG;
        let new_cfb = val & 0x80;
        val <<= 1;
        val |= carry_flag_bit;
        match _mode {
            Mode::ACC => self.a = val,
            _ => self.write(_address, val),
        };
        if new_cfb != 0 {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        self.set_zero_flag(val);
        self.set_negative_flag(val);
    }

    pub fn ror(&mut self, _address: usize, _mode: Mode) {
        let mut val = match _mode {
            Mode::ACC => self.a,
            _ => {
                self.clock += 2;
                self.read(_address)
            }
        };
        let cfb = self.p & CARRY_FLAG;
        let new_cfb = val & 0x1;
        val >>= 1;
        val |= cfb << 7;
        if new_cfb != 0 {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        match _mode {
            Mode::ACC => self.a = val,
            _ => self.write(_address, val),
        };
        self.set_zero_flag(val);
        self.set_negative_flag(val);
    }

    // unofficial: ROR then ADC
    pub fn rra(&mut self, _address: usize, _mode: Mode) {
        self.ror(_address, _mode);
        self.adc(_address, _mode);
    }

    pub fn rti(&mut self, _address: usize, _mode: Mode) {
        self.plp(_address, _mode); // pull and set status reg (2 clock cycles)
        self.pc = self.pop() as usize; // low byte
        self.pc += (self.pop() as usize) << 8; // high byte
        self.clock += 2;
    }

    pub fn rts(&mut self, _address: usize, _mode: Mode) {
        self.pc = self.pop() as usize;
        self.pc += ((self.pop() as usize) << 8) + 1;
        self.clock += 4;
    }

    // unofficial combo of stx and sta
    pub fn sax(&mut self, _address: usize, _mode: Mode) {
        self.write(_address, self.a & self.x);
    }

    pub fn sbc(&mut self, _address: usize, _mode: Mode) {
        let byte = self.read(_address);
        let borrow = (1 - (self.p & CARRY_FLAG)) as u16;
        let new_val = self.a.wrapping_sub(byte).wrapping_sub(borrow as u8);
        // carry means no borrow occurred
        if (self.a as u16) >= byte as u16 + borrow {
            self.p |= CARRY_FLAG;
        } else {
            self.p &= !CARRY_FLAG;
        }
        self.set_zero_flag(new_val);
        self.set_negative_flag(new_val);
        // subtraction overflows when the operands' signs differ and the
        // result's sign doesn't match the accumulator's
        if (self.a ^ byte) & (self.a ^ new_val) & 0x80 != 0 {
            self.p |= OVERFLOW_FLAG;
        } else {
            self.p &= !OVERFLOW_FLAG;
        }
        self.a = new_val;
    }

    pub fn sec(&mut self, _address: usize, _mode: Mode) {
        self.p |= CARRY_FLAG;
    }

    pub fn sed(&mut self, _address: usize, _mode: Mode) {
        // no decimal mode on the 2A03, but the flag itself still works
        self.p |= DECIMAL_FLAG;
    }

    pub fn sei(&mut self, _address: usize, _mode: Mode) {
        self.p |= INTERRUPT_DISABLE_FLAG;
    }

    // unofficial: ASL then ORA
    pub fn slo(&mut self, _address: usize, _mode: Mode) {
        self.asl(_address, _mode);
        self.ora(_address, _mode);
    }

    // unofficial: LSR then EOR
    pub fn sre(&mut self, _address: usize, _mode: Mode) {
        self.lsr(_address, _mode);
        self.eor(_address, _mode);
    }

    pub fn sta(&mut self, _address: usize, _mode: Mode) {
        self.write(_address, self.a);
    }

    pub fn stx(&mut self, _address: usize, _mode: Mode) {
        self.write(_address, self.x);
    }

    pub fn sty(&mut self, _address: usize, _mode: Mode) {
        self.write(_address, self.y);
    }

    pub fn tax(&mut self, _address: usize, _mode: Mode) {
        self.x = self.a;
        self.set_zero_flag(self.x);
        self.set_negative_flag(self.x);
    }

    pub fn tay(&mut self, _address: usize, _mode: Mode) {
        self.y = self.a;
        self.set_zero_flag(self.y);
        self.set_negative_flag(self.y);
    }

    pub fn tsx(&mut self, _address: usize, _mode: Mode) {
        self.x = self.s;
        self.set_zero_flag(self.x);
        self.set_negative_flag(self.x);
    }

    pub fn txa(&mut self, _address: usize, _mode: Mode) {
        self.a = self.x;
        self.set_zero_flag(self.a);
        self.set_negative_flag(self.a);
    }

    pub fn txs(&mut self, _address: usize, _mode: Mode) {
        self.s = self.x;
    }

    pub fn tya(&mut self, _address: usize, _mode: Mode) {
        self.a = self.y;
        self.set_zero_flag(self.a);
        self.set_negative_flag(self.a);
    }

    // the KIL/JAM opcodes halt a real 6502; treat them as NOPs so a stray
    // jump into data doesn't wedge the whole console
    pub fn jam(&mut self, _address: usize, _mode: Mode) {}

    // Interrupts
    pub fn nmi(&mut self) {
        self.push((self.pc >> 8) as u8); // push high byte
        self.push((self.pc & 0xFF) as u8); // push low byte
        self.push(self.p | 0b0011_0000); // push status register with break bits set
        self.p |= INTERRUPT_DISABLE_FLAG;
        self.pc = ((self.read(NMI_VECTOR + 1) as usize) << 8) + self.read(NMI_VECTOR) as usize;
        self.clock += 7;
    }

    pub fn irq(&mut self) {
        self.push((self.pc >> 8) as u8); // push high byte
        self.push((self.pc & 0xFF) as u8); // push low byte
        self.push(self.p | 0b0011_0000); // push status register with break bits set
        self.p |= INTERRUPT_DISABLE_FLAG;
        self.pc = ((self.read(IRQ_VECTOR + 1) as usize) << 8) + self.read(IRQ_VECTOR) as usize;
        self.clock += 7;
    }
}
