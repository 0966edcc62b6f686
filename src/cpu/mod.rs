mod addressing_modes;
mod opcodes;
pub mod serialize;
mod utility;

use std::cell::RefCell;
use std::rc::Rc;

use crate::apu::Apu;
use crate::cartridge::Mapper;
use crate::controller::Controller;
use crate::ppu::Ppu;

// RAM locations
const STACK_OFFSET: usize = 0x100;
const NMI_VECTOR: usize = 0xFFFA;
const RESET_VECTOR: usize = 0xFFFC;
const IRQ_VECTOR: usize = 0xFFFE;

// status register flags
const CARRY_FLAG: u8             = 1 << 0;
const ZERO_FLAG: u8              = 1 << 1;
const INTERRUPT_DISABLE_FLAG: u8 = 1 << 2;
const DECIMAL_FLAG: u8           = 1 << 3;
// bits 4 and 5 only exist in copies of the status register pushed to the stack
const OVERFLOW_FLAG: u8          = 1 << 6;
const NEGATIVE_FLAG: u8          = 1 << 7;

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Mode {
    ABS, ABX, ABY, ACC,
    IMM, IMP, IDX, IND,
    INX, REL, ZPG, ZPX,
    ZPY,
}

type AddressingFunction = fn(&mut Cpu) -> usize;

impl Mode {
    fn get(&self) -> AddressingFunction {
        match self {
            Mode::ABS => Cpu::absolute,
            Mode::ABX => Cpu::absolute_x,
            Mode::ABY => Cpu::absolute_y,
            Mode::ACC => Cpu::accumulator,
            Mode::IMM => Cpu::immediate,
            Mode::IMP => Cpu::implied,
            Mode::IDX => Cpu::indexed_indirect,
            Mode::IND => Cpu::indirect,
            Mode::INX => Cpu::indirect_indexed,
            Mode::REL => Cpu::relative,
            Mode::ZPG => Cpu::zero_page,
            Mode::ZPX => Cpu::zero_page_x,
            Mode::ZPY => Cpu::zero_page_y,
        }
    }
}

pub struct Cpu {
    mem: Vec<u8>,
    a: u8,     // accumulator
    x: u8,     // general purpose
    y: u8,     // general purpose
    pc: usize, // 16-bit program counter
    s: u8,     // stack pointer
    p: u8,     // status

    // total cycles elapsed
    clock: u64,

    // cycles to burn doing nothing, for OAM DMA and DMC fetch stalls
    delay: usize,

    // level-style IRQ request from the mapper; stays pending until the
    // interrupt disable flag allows service
    pending_irq: bool,

    // function table
    opcode_table: Vec<fn(&mut Self, usize, Mode)>,

    // address mode table
    mode_table: Vec<Mode>,

    pub mapper: Rc<RefCell<dyn Mapper>>,
    pub ppu: Ppu,
    pub apu: Apu,
    pub controllers: [Controller; 2],
}

impl Cpu {
    pub fn new(mapper: Rc<RefCell<dyn Mapper>>, ppu: Ppu, apu: Apu) -> Self {
        let mut cpu = Cpu {
            mem: vec![0; 0x800],
            a: 0, x: 0, y: 0,
            pc: 0,
            s: 0xFD,
            p: 0x24,
            clock: 0,
            delay: 0,
            pending_irq: false,
            mapper,
            ppu,
            apu,
            controllers: [Controller::new(), Controller::new()],
            opcode_table: vec![
        //         00        01        02        03        04        05        06        07        08        09        0A        0B        0C        0D        0E        0F
        /*00*/  Cpu::brk, Cpu::ora, Cpu::jam, Cpu::slo, Cpu::nop, Cpu::ora, Cpu::asl, Cpu::slo, Cpu::php, Cpu::ora, Cpu::asl, Cpu::nop, Cpu::nop, Cpu::ora, Cpu::asl, Cpu::slo,  /*00*/
        /*10*/  Cpu::bpl, Cpu::ora, Cpu::jam, Cpu::slo, Cpu::nop, Cpu::ora, Cpu::asl, Cpu::slo, Cpu::clc, Cpu::ora, Cpu::nop, Cpu::slo, Cpu::nop, Cpu::ora, Cpu::asl, Cpu::slo,  /*10*/
        /*20*/  Cpu::jsr, Cpu::and, Cpu::jam, Cpu::rla, Cpu::bit, Cpu::and, Cpu::rol, Cpu::rla, Cpu::plp, Cpu::and, Cpu::rol, Cpu::nop, Cpu::bit, Cpu::and, Cpu::rol, Cpu::rla,  /*20*/
        /*30*/  Cpu::bmi, Cpu::and, Cpu::jam, Cpu::rla, Cpu::nop, Cpu::and, Cpu::rol, Cpu::rla, Cpu::sec, Cpu::and, Cpu::nop, Cpu::rla, Cpu::nop, Cpu::and, Cpu::rol, Cpu::rla,  /*30*/
        /*40*/  Cpu::rti, Cpu::eor, Cpu::jam, Cpu::sre, Cpu::nop, Cpu::eor, Cpu::lsr, Cpu::sre, Cpu::pha, Cpu::eor, Cpu::lsr, Cpu::nop, Cpu::jmp, Cpu::eor, Cpu::lsr, Cpu::sre,  /*40*/
        /*50*/  Cpu::bvc, Cpu::eor, Cpu::jam, Cpu::sre, Cpu::nop, Cpu::eor, Cpu::lsr, Cpu::sre, Cpu::cli, Cpu::eor, Cpu::nop, Cpu::sre, Cpu::nop, Cpu::eor, Cpu::lsr, Cpu::sre,  /*50*/
        /*60*/  Cpu::rts, Cpu::adc, Cpu::jam, Cpu::rra, Cpu::nop, Cpu::adc, Cpu::ror, Cpu::rra, Cpu::pla, Cpu::adc, Cpu::ror, Cpu::nop, Cpu::jmp, Cpu::adc, Cpu::ror, Cpu::rra,  /*60*/
        /*70*/  Cpu::bvs, Cpu::adc, Cpu::jam, Cpu::rra, Cpu::nop, Cpu::adc, Cpu::ror, Cpu::rra, Cpu::sei, Cpu::adc, Cpu::nop, Cpu::rra, Cpu::nop, Cpu::adc, Cpu::ror, Cpu::rra,  /*70*/
        /*80*/  Cpu::nop, Cpu::sta, Cpu::nop, Cpu::sax, Cpu::sty, Cpu::sta, Cpu::stx, Cpu::sax, Cpu::dey, Cpu::nop, Cpu::txa, Cpu::nop, Cpu::sty, Cpu::sta, Cpu::stx, Cpu::sax,  /*80*/
        /*90*/  Cpu::bcc, Cpu::sta, Cpu::jam, Cpu::nop, Cpu::sty, Cpu::sta, Cpu::stx, Cpu::sax, Cpu::tya, Cpu::sta, Cpu::txs, Cpu::nop, Cpu::nop, Cpu::sta, Cpu::nop, Cpu::nop,  /*90*/
        /*A0*/  Cpu::ldy, Cpu::lda, Cpu::ldx, Cpu::lax, Cpu::ldy, Cpu::lda, Cpu::ldx, Cpu::lax, Cpu::tay, Cpu::lda, Cpu::tax, Cpu::nop, Cpu::ldy, Cpu::lda, Cpu::ldx, Cpu::lax,  /*A0*/
        /*B0*/  Cpu::bcs, Cpu::lda, Cpu::jam, Cpu::lax, Cpu::ldy, Cpu::lda, Cpu::ldx, Cpu::lax, Cpu::clv, Cpu::lda, Cpu::tsx, Cpu::nop, Cpu::ldy, Cpu::lda, Cpu::ldx, Cpu::lax,  /*B0*/
        /*C0*/  Cpu::cpy, Cpu::cmp, Cpu::nop, Cpu::dcp, Cpu::cpy, Cpu::cmp, Cpu::dec, Cpu::dcp, Cpu::iny, Cpu::cmp, Cpu::dex, Cpu::nop, Cpu::cpy, Cpu::cmp, Cpu::dec, Cpu::dcp,  /*C0*/
        /*D0*/  Cpu::bne, Cpu::cmp, Cpu::jam, Cpu::dcp, Cpu::nop, Cpu::cmp, Cpu::dec, Cpu::dcp, Cpu::cld, Cpu::cmp, Cpu::nop, Cpu::dcp, Cpu::nop, Cpu::cmp, Cpu::dec, Cpu::dcp,  /*D0*/
        /*E0*/  Cpu::cpx, Cpu::sbc, Cpu::nop, Cpu::isc, Cpu::cpx, Cpu::sbc, Cpu::inc, Cpu::isc, Cpu::inx, Cpu::sbc, Cpu::nop, Cpu::sbc, Cpu::cpx, Cpu::sbc, Cpu::inc, Cpu::isc,  /*E0*/
        /*F0*/  Cpu::beq, Cpu::sbc, Cpu::jam, Cpu::isc, Cpu::nop, Cpu::sbc, Cpu::inc, Cpu::isc, Cpu::sed, Cpu::sbc, Cpu::nop, Cpu::isc, Cpu::nop, Cpu::sbc, Cpu::inc, Cpu::isc,  /*F0*/
            ],
            mode_table: vec![
        //          00         01         02         03         04         05         06         07         08         09         0A         0B         0C         0D         0E         0F
        /*00*/  Mode::IMP, Mode::IDX, Mode::IMP, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::ACC, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*00*/
        /*10*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*10*/
        /*20*/  Mode::ABS, Mode::IDX, Mode::IMP, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::ACC, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*20*/
        /*30*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*30*/
        /*40*/  Mode::IMP, Mode::IDX, Mode::IMP, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::ACC, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*40*/
        /*50*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*50*/
        /*60*/  Mode::IMP, Mode::IDX, Mode::IMP, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::ACC, Mode::IMM, Mode::IND, Mode::ABS, Mode::ABS, Mode::ABS,  /*60*/
        /*70*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*70*/
        /*80*/  Mode::IMM, Mode::IDX, Mode::IMM, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::IMP, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*80*/
        /*90*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPY, Mode::ZPY, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABY, Mode::ABY,  /*90*/
        /*A0*/  Mode::IMM, Mode::IDX, Mode::IMM, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::IMP, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*A0*/
        /*B0*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPY, Mode::ZPY, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABY, Mode::ABY,  /*B0*/
        /*C0*/  Mode::IMM, Mode::IDX, Mode::IMM, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::IMP, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*C0*/
        /*D0*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*D0*/
        /*E0*/  Mode::IMM, Mode::IDX, Mode::IMM, Mode::IDX, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::ZPG, Mode::IMP, Mode::IMM, Mode::IMP, Mode::IMM, Mode::ABS, Mode::ABS, Mode::ABS, Mode::ABS,  /*E0*/
        /*F0*/  Mode::REL, Mode::INX, Mode::IMP, Mode::INX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::ZPX, Mode::IMP, Mode::ABY, Mode::IMP, Mode::ABY, Mode::ABX, Mode::ABX, Mode::ABX, Mode::ABX,  /*F0*/
            ],
        };
        cpu.pc = ((cpu.read(RESET_VECTOR + 1) as usize) << 8) + cpu.read(RESET_VECTOR) as usize;
        cpu
    }

    /// Executes one instruction (or burns one stall cycle) and returns how
    /// many CPU cycles it consumed.
    pub fn step(&mut self) -> u64 {
        // skip cycles from OAM DMA or a DMC fetch if necessary
        if self.delay > 0 {
            self.delay -= 1;
            self.clock += 1;
            return 1;
        }

        // handle interrupts
        if self.ppu.trigger_nmi {
            self.ppu.trigger_nmi = false;
            self.nmi();
        }
        if self.apu.trigger_irq {
            self.apu.trigger_irq = false;
            if self.p & INTERRUPT_DISABLE_FLAG == 0 {
                self.irq();
            }
        }
        if self.pending_irq && self.p & INTERRUPT_DISABLE_FLAG == 0 {
            self.pending_irq = false;
            self.irq();
        }

        // back up clock so we know how many cycles we complete
        let clock = self.clock;
        let opcode = self.read(self.pc) as usize;

        // get addressing mode
        let mode = self.mode_table[opcode];
        let address = mode.get()(self);

        // advance program counter according to how many bytes that instruction operated on
        self.advance_pc(mode);
        // look up instruction in table and execute
        self.opcode_table[opcode](self, address, mode);

        self.clock - clock
    }

    /// Behaves like the console's reset button: memory survives, the stack
    /// pointer and flags go back to their power-on values, and execution
    /// restarts at the reset vector.
    pub fn reset(&mut self) {
        self.s = 0xFD;
        self.p = 0x24;
        self.delay = 0;
        self.pending_irq = false;
        self.pc = ((self.read(RESET_VECTOR + 1) as usize) << 8) + self.read(RESET_VECTOR) as usize;
    }

    /// Raised by the mapper. Stays pending until the interrupt disable flag
    /// permits service.
    pub fn trigger_irq(&mut self) {
        self.pending_irq = true;
    }

    /// Adds stall cycles, used for the DMC's sample fetch.
    pub fn stall(&mut self, cycles: usize) {
        self.delay += cycles;
    }

    // memory interface
    pub fn read(&mut self, address: usize) -> u8 {
        match address {
            0x0000..=0x1FFF => self.mem[address % 0x0800],
            0x2000..=0x3FFF => self.read_ppu_reg(address % 8),
            0x4014          => 0,
            0x4015          => self.apu.read_status(),
            0x4016          => self.controllers[0].read(),
            0x4017          => self.controllers[1].read(),
            0x4000..=0x401F => 0, // write-only APU registers and disabled test-mode I/O
            0x4020..=0xFFFF => self.mapper.borrow_mut().read(address),
            _ => panic!("invalid read from 0x{:04x}", address),
        }
    }

    // memory interface
    pub fn write(&mut self, address: usize, val: u8) {
        match address {
            0x0000..=0x1FFF => self.mem[address % 0x0800] = val,
            0x2000..=0x3FFF => self.write_ppu_reg(address % 8, val),
            0x4014          => self.write_ppu_reg(8, val),
            0x4016          => {
                // one strobe line feeds both controller ports
                self.controllers[0].write(val);
                self.controllers[1].write(val);
            }
            0x4000..=0x4017 => self.apu.write_reg(address, val),
            0x4018..=0x401F => (),
            0x4020..=0xFFFF => self.mapper.borrow_mut().write(address, val),
            _ => panic!("invalid write to 0x{:04x}", address),
        }
    }

    fn read_ppu_reg(&mut self, reg_num: usize) -> u8 {
        match reg_num {
            2 => self.ppu.read_status(),
            4 => self.ppu.read_oam_data(),
            7 => self.ppu.read_data(),
            _ => 0,
        }
    }

    fn write_ppu_reg(&mut self, reg_num: usize, val: u8) {
        self.ppu.recent_bits = val;
        match reg_num {
            0 => self.ppu.write_controller(val),
            1 => self.ppu.write_mask(val),
            3 => self.ppu.write_oam_address(val as usize),
            4 => self.ppu.write_oam_data(val),
            5 => self.ppu.write_scroll(val),
            6 => self.ppu.write_address(val),
            7 => self.ppu.write_data(val),
            8 => {
                let page = (val as usize) << 8;
                let mut data = vec![];
                for i in 0..=255 {
                    data.push(self.read(page + i));
                }
                self.ppu.write_oam_dma(data);
                // 513 cycles, plus one more when the DMA starts on an odd cycle
                let is_odd = self.clock % 2 != 0;
                self.delay = 513 + if is_odd { 1 } else { 0 };
            }
            _ => panic!("wrote to bad ppu reg: {}", reg_num),
        }
    }
}

/*
Address range 	Size 	Device
$0000-$07FF 	$0800 	2KB internal RAM
$0800-$1FFF 	$1800 	Mirrors of $0000-$07FF
$2000-$2007 	$0008 	NES PPU registers
$2008-$3FFF 	$1FF8 	Mirrors of $2000-2007 (repeats every 8 bytes)
$4000-$4017 	$0018 	NES APU and I/O registers
$4018-$401F 	$0008 	APU and I/O functionality that is normally disabled
$4020-$FFFF 	$BFE0 	Cartridge space: PRG ROM, PRG RAM, and mapper registers
*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::Apu;
    use crate::cartridge::{new_mapper, Cartridge};
    use crate::ppu::Ppu;
    use crate::test_utils::looping_rom;

    fn cpu_with_prg(prg: &[u8]) -> Cpu {
        let mut rom = looping_rom();
        // overwrite the JMP at $8000 with the provided program, and point the
        // NMI and IRQ vectors at recognizable addresses
        rom[0x10..0x10 + prg.len()].copy_from_slice(prg);
        rom[0x10 + 0x3FFA] = 0x00; // NMI -> $9000
        rom[0x10 + 0x3FFB] = 0x90;
        rom[0x10 + 0x3FFE] = 0x00; // IRQ -> $A000
        rom[0x10 + 0x3FFF] = 0xA0;
        let cart = Cartridge::from_bytes(&rom).unwrap();
        let mapper = new_mapper(cart);
        Cpu::new(mapper.clone(), Ppu::new(mapper.clone()), Apu::new(44_100.0, true))
    }

    #[test]
    fn reset_vector_initializes_pc() {
        let mut cpu = cpu_with_prg(&[0xEA]);
        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.s, 0xFD);
        // NOP: 2 cycles, one byte
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.pc, 0x8001);
    }

    #[test]
    fn reset_restores_power_on_stack_and_flags() {
        let mut cpu = cpu_with_prg(&[0xEA]);
        cpu.s = 0x10;
        cpu.p = 0xFF;
        cpu.reset();
        assert_eq!(cpu.s, 0xFD);
        assert_eq!(cpu.p, 0x24);
        assert_eq!(cpu.pc, 0x8000);
    }

    #[test]
    fn interrupts_push_status_with_break_bits_set() {
        // CLI, then take a mapper IRQ
        let mut cpu = cpu_with_prg(&[0x58, 0xEA]);
        cpu.write_ppu_reg(0, 0); // leave NMI off
        cpu.step(); // CLI
        let flags = cpu.p;
        cpu.trigger_irq();
        cpu.step();
        assert_eq!(cpu.pc, 0xA001);
        let pushed = cpu.read(0x100 + cpu.s as usize + 1);
        assert_eq!(pushed, flags | 0b0011_0000);
    }

    #[test]
    fn lda_imm_sets_flags() {
        let mut cpu = cpu_with_prg(&[0xA9, 0x00, 0xA9, 0x80]);
        cpu.step();
        assert_eq!(cpu.a, 0);
        assert_eq!(cpu.p & ZERO_FLAG, ZERO_FLAG);
        cpu.step();
        assert_eq!(cpu.a, 0x80);
        assert_eq!(cpu.p & NEGATIVE_FLAG, NEGATIVE_FLAG);
        assert_eq!(cpu.p & ZERO_FLAG, 0);
    }

    #[test]
    fn adc_carry_and_overflow() {
        // LDA #$7F; ADC #$01 -> 0x80, overflow set, carry clear
        let mut cpu = cpu_with_prg(&[0xA9, 0x7F, 0x69, 0x01]);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.a, 0x80);
        assert_eq!(cpu.p & OVERFLOW_FLAG, OVERFLOW_FLAG);
        assert_eq!(cpu.p & CARRY_FLAG, 0);

        // LDA #$FF; ADC #$01 -> 0x00, carry set, overflow clear
        let mut cpu = cpu_with_prg(&[0xA9, 0xFF, 0x69, 0x01]);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.a, 0x00);
        assert_eq!(cpu.p & CARRY_FLAG, CARRY_FLAG);
        assert_eq!(cpu.p & OVERFLOW_FLAG, 0);
        assert_eq!(cpu.p & ZERO_FLAG, ZERO_FLAG);
    }

    #[test]
    fn sbc_borrow_semantics() {
        // SEC; LDA #$10; SBC #$20 -> 0xF0, carry cleared (borrow)
        let mut cpu = cpu_with_prg(&[0x38, 0xA9, 0x10, 0xE9, 0x20]);
        cpu.step();
        cpu.step();
        cpu.step();
        assert_eq!(cpu.a, 0xF0);
        assert_eq!(cpu.p & CARRY_FLAG, 0);
        assert_eq!(cpu.p & NEGATIVE_FLAG, NEGATIVE_FLAG);
    }

    #[test]
    fn branch_cycle_accounting() {
        // BNE taken, no page cross: 3 cycles
        let mut cpu = cpu_with_prg(&[0xA9, 0x01, 0xD0, 0x02]);
        cpu.step();
        assert_eq!(cpu.step(), 3);
        assert_eq!(cpu.pc, 0x8006);

        // BEQ not taken: 2 cycles
        let mut cpu = cpu_with_prg(&[0xA9, 0x01, 0xF0, 0x02]);
        cpu.step();
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.pc, 0x8004);
    }

    #[test]
    fn branch_page_cross_adds_cycle() {
        // place a taken branch so its target lands in the previous page:
        // BNE -6 at $8002 jumps to $7FFE
        let mut cpu = cpu_with_prg(&[0xA9, 0x01, 0xD0, 0xFA]);
        cpu.step();
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.pc, 0x7FFE);
    }

    #[test]
    fn absolute_x_page_cross() {
        // LDX #$01; LDA $80FF,X crosses into $8100: 2 + 5 cycles
        let mut cpu = cpu_with_prg(&[0xA2, 0x01, 0xBD, 0xFF, 0x80]);
        cpu.step();
        assert_eq!(cpu.step(), 5);
        // STA never gets the discount: STA $80FF,X is always 5
        let mut cpu = cpu_with_prg(&[0xA2, 0x01, 0x9D, 0x00, 0x01]);
        cpu.step();
        assert_eq!(cpu.step(), 5);
    }

    #[test]
    fn jmp_indirect_page_wrap_bug() {
        // pointer at $02FF: low byte from $02FF, high byte from $0200 (not $0300)
        let mut cpu = cpu_with_prg(&[0x6C, 0xFF, 0x02]);
        cpu.write(0x02FF, 0x34);
        cpu.write(0x0200, 0x12);
        cpu.write(0x0300, 0x56);
        cpu.step();
        assert_eq!(cpu.pc, 0x1234);
    }

    #[test]
    fn plp_ignores_break_bits() {
        // LDA #$FF; PHA; PLP
        let mut cpu = cpu_with_prg(&[0xA9, 0xFF, 0x48, 0x28]);
        cpu.step();
        cpu.step();
        cpu.step();
        assert_eq!(cpu.p & 0b0011_0000, 0b0010_0000);
    }

    #[test]
    fn stack_wraps_within_page_one() {
        let mut cpu = cpu_with_prg(&[0xEA]);
        cpu.s = 0x00;
        cpu.push(0xAA);
        assert_eq!(cpu.s, 0xFF);
        assert_eq!(cpu.pop(), 0xAA);
        assert_eq!(cpu.s, 0x00);
    }

    #[test]
    fn oam_dma_stalls_cpu() {
        let mut cpu = cpu_with_prg(&[0xEA]);
        cpu.clock = 2; // even
        cpu.write(0x4014, 0x02);
        assert_eq!(cpu.delay, 513);
        cpu.clock = 3; // odd
        cpu.write(0x4014, 0x02);
        assert_eq!(cpu.delay, 514);
        // a stalled step consumes exactly one cycle and leaves pc alone
        let pc = cpu.pc;
        assert_eq!(cpu.step(), 1);
        assert_eq!(cpu.pc, pc);
    }

    #[test]
    fn irq_respects_interrupt_disable() {
        // CLI; NOP
        let mut cpu = cpu_with_prg(&[0x58, 0xEA, 0xEA]);
        cpu.write_ppu_reg(0, 0); // leave NMI off
        cpu.step(); // CLI
        cpu.trigger_irq();
        cpu.step();
        assert_eq!(cpu.pc, 0xA001, "IRQ vector, then one NOP executed");
        // and with the flag set, the IRQ waits
        let mut cpu = cpu_with_prg(&[0x78, 0xEA, 0xEA]);
        cpu.step(); // SEI
        cpu.trigger_irq();
        cpu.step();
        assert_eq!(cpu.pc, 0x8002);
        assert!(cpu.pending_irq);
    }

    #[test]
    fn nmi_fires_regardless_of_interrupt_disable() {
        let mut cpu = cpu_with_prg(&[0x78, 0xEA]);
        cpu.step(); // SEI
        cpu.ppu.trigger_nmi = true;
        cpu.step();
        assert_eq!(cpu.pc, 0x9001, "NMI vector, then one NOP executed");
        assert!(!cpu.ppu.trigger_nmi);
    }
}
