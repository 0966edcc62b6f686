use serde::{Deserialize, Serialize};

// number of CPU cycles between sample output level being adjusted
const SAMPLE_RATES: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Dmc {
    pub sample: u16, // output level that goes to the mixer
    pub enabled: bool,
    irq_enabled: bool,
    pub interrupt: bool,
    loop_flag: bool,
    pub cpu_stall: bool,
    rate_index: usize,
    cpu_cycles_left: u16,

    // Memory reader. The actual fetch goes through the CPU bus, so the byte
    // at current_address is handed in by the caller each clock.
    sample_buffer: Option<u8>,
    pub sample_address: usize,
    pub sample_length: usize,
    pub current_address: usize, // address of the next byte of the sample to play
    pub bytes_remaining: usize,

    // Output unit
    shift_register: u8,
    bits_remaining: usize,
    silence: bool,
}

impl Dmc {
    pub fn new() -> Self {
        Dmc {
            sample: 0,
            enabled: false,
            irq_enabled: false,
            interrupt: false,
            loop_flag: false,
            cpu_stall: false,
            rate_index: 0,
            cpu_cycles_left: 0,
            sample_buffer: None,
            sample_address: 0,
            sample_length: 0,
            current_address: 0,
            bytes_remaining: 0,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
        }
    }

    pub fn clock(&mut self, sample_byte: u8) {
        self.clock_memory_reader(sample_byte);
        self.clock_output_unit();
    }

    fn clock_memory_reader(&mut self, sample_byte: u8) {
        // Any time the sample buffer is empty and bytes remaining is not zero
        // (including just after a write to $4015 that enables the channel),
        // the next sample byte is fetched into the buffer.
        if self.sample_buffer.is_none() && self.bytes_remaining != 0 {
            // The CPU is stalled for up to 4 cycles to let the fetch happen.
            self.cpu_stall = true;
            self.sample_buffer = Some(sample_byte);
            // The address is incremented; past $FFFF it wraps to $8000.
            if self.current_address == 0xFFFF {
                self.current_address = 0x8000;
            } else {
                self.current_address += 1;
            }
            self.bytes_remaining -= 1;
            if self.bytes_remaining == 0 {
                if self.loop_flag {
                    self.restart();
                } else if self.irq_enabled {
                    self.interrupt = true;
                }
            }
        }
    }

    fn clock_output_unit(&mut self) {
        // An APU clock is two CPU cycles.
        if self.cpu_cycles_left < 2 {
            self.cpu_cycles_left = SAMPLE_RATES[self.rate_index];
            // The output level moves by 2 per shifted-in bit, saturating at
            // the edges of the 0-127 range.
            if !self.silence {
                if self.shift_register & 1 == 1 {
                    if self.sample <= 125 {
                        self.sample += 2;
                    }
                } else if self.sample >= 2 {
                    self.sample -= 2;
                }
            }
            self.shift_register >>= 1;
            self.bits_remaining -= 1;
            // When an output cycle of 8 bits ends, the next begins from the
            // sample buffer, or as silence if the buffer is empty.
            if self.bits_remaining == 0 {
                self.bits_remaining = 8;
                match self.sample_buffer.take() {
                    Some(s) => {
                        self.silence = false;
                        self.shift_register = s;
                    }
                    None => self.silence = true,
                }
            }
        } else {
            self.cpu_cycles_left -= 2;
        }
    }

    pub fn restart(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    // $4010 	IL--.RRRR 	Flags and Rate (write)
    pub fn write_control(&mut self, value: u8) {
        self.irq_enabled = value & 0b1000_0000 != 0;
        if !self.irq_enabled {
            self.interrupt = false;
        }
        self.loop_flag = value & 0b0100_0000 != 0;
        self.rate_index = value as usize & 0b0000_1111;
    }

    // $4011 	-DDD.DDDD 	Direct load (write)
    pub fn direct_load(&mut self, value: u8) {
        self.sample = value as u16 & 0b0111_1111;
    }

    // $4012 	AAAA.AAAA 	Sample address = %11AAAAAA.AA000000 = $C000 + (A * 64)
    pub fn write_sample_address(&mut self, value: u8) {
        self.sample_address = ((value as usize) << 6) + 0xC000;
    }

    // $4013 	LLLL.LLLL 	Sample length = %LLLL.LLLL0001 = (L * 16) + 1 bytes
    pub fn write_sample_length(&mut self, value: u8) {
        self.sample_length = ((value as usize) << 4) + 1;
    }
}
