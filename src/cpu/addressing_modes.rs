impl super::Cpu {
    pub fn absolute(&mut self) -> usize {
        self.clock += 4;
        ((self.read(self.pc + 2) as usize) << 8) + // high byte, little endian
            self.read(self.pc + 1) as usize // low byte
    }

    pub fn absolute_x(&mut self) -> usize {
        let opcode = self.read(self.pc);
        let old_address = self.absolute() as u16;
        let new_address = old_address.wrapping_add(self.x as u16) as usize;
        let old_address = old_address as usize;
        match opcode {
            // stores and read-modify-writes always take the extra cycle
            0x1E | 0x1F | 0x3E | 0x3F | 0x5E | 0x5F | 0x7E | 0x7F | 0x9C | 0x9D | 0xDE | 0xDF
            | 0xFE | 0xFF => self.clock += 1,
            _ => self.address_page_cross(old_address, new_address),
        }
        new_address
    }

    pub fn absolute_y(&mut self) -> usize {
        let opcode = self.read(self.pc);
        let old_address = self.absolute() as u16;
        let new_address = old_address.wrapping_add(self.y as u16) as usize;
        let old_address = old_address as usize;
        match opcode {
            0x1B | 0x3B | 0x5B | 0x7B | 0x99 | 0x9B | 0x9E | 0x9F | 0xDB | 0xFB => self.clock += 1,
            _ => self.address_page_cross(old_address, new_address),
        }
        new_address
    }

    pub fn accumulator(&mut self) -> usize {
        self.clock += 2;
        0
    }

    pub fn immediate(&mut self) -> usize {
        self.clock += 2;
        self.pc + 1
    }

    pub fn implied(&mut self) -> usize {
        self.clock += 2;
        0
    }

    pub fn indexed_indirect(&mut self) -> usize {
        self.clock += 6;
        let operand = self.read(self.pc + 1);
        let zp_low_addr = operand.wrapping_add(self.x);
        let zp_high_addr = zp_low_addr.wrapping_add(1); // take account of zero page wraparound
        let zp_low_byte = self.read(zp_low_addr as usize);
        let zp_high_byte = self.read(zp_high_addr as usize);
        ((zp_high_byte as usize) << 8) + zp_low_byte as usize
    }

    pub fn indirect(&mut self) -> usize {
        let operand_address =
            ((self.read(self.pc + 2) as usize) << 8) + (self.read(self.pc + 1) as usize);
        let low_byte = self.read(operand_address) as usize;
        // JMP indirect does not advance pages: when the pointer's low byte is
        // $FF, the high byte comes from $xx00 of the same page, 255 bytes
        // earlier, instead of the following byte.
        let high_byte = if operand_address & 0xFF == 0xFF {
            (self.read(operand_address - 0xFF) as usize) << 8
        } else {
            (self.read(operand_address + 1) as usize) << 8
        };
        self.clock += 5;
        high_byte + low_byte
    }

    pub fn indirect_indexed(&mut self) -> usize {
        let opcode = self.read(self.pc);
        let operand = self.read(self.pc + 1);
        let zp_low_addr = operand;
        let zp_high_addr = operand.wrapping_add(1);
        let zp_low_byte = self.read(zp_low_addr as usize);
        let zp_high_byte = self.read(zp_high_addr as usize);
        let old_address = ((zp_high_byte as u16) << 8) + zp_low_byte as u16;
        let new_address = old_address.wrapping_add(self.y as u16);
        match opcode {
            0x13 | 0x33 | 0x53 | 0x73 | 0x91 | 0x93 | 0xD3 | 0xF3 => self.clock += 1,
            _ => self.address_page_cross(old_address as usize, new_address as usize),
        }
        self.clock += 5;
        new_address as usize
    }

    pub fn relative(&mut self) -> usize {
        self.clock += 2;
        self.pc + 1
    }

    pub fn zero_page(&mut self) -> usize {
        let operand = self.read(self.pc + 1);
        self.clock += 3;
        operand as usize
    }

    pub fn zero_page_x(&mut self) -> usize {
        let operand = self.read(self.pc + 1);
        self.clock += 4;
        operand.wrapping_add(self.x) as usize
    }

    pub fn zero_page_y(&mut self) -> usize {
        let operand = self.read(self.pc + 1);
        self.clock += 4;
        operand.wrapping_add(self.y) as usize
    }
}
