use serde::{Deserialize, Serialize};

use super::LENGTH_COUNTER_TABLE;

// The output steps down 15..0 then back up 0..15, 32 steps per cycle.
const SEQUENCE: [u16; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub sample: u16,
    pub enabled: bool,
    pub length_counter: u8,

    timer: u16,
    timer_period: u16,
    sequence_counter: usize,

    control_flag: bool, // halts the length counter and makes the linear counter loop
    linear_counter: u8,
    linear_counter_period: u8,
    linear_counter_reload: bool,
}

impl Triangle {
    pub fn new() -> Self {
        Triangle {
            sample: 0,
            enabled: false,
            length_counter: 0,
            timer: 0,
            timer_period: 0,
            sequence_counter: 0,
            control_flag: false,
            linear_counter: 0,
            linear_counter_period: 0,
            linear_counter_reload: false,
        }
    }

    // Unlike the other channels this timer runs at CPU speed, so the caller
    // clocks it twice per APU cycle.
    pub fn clock(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            // The sequencer only advances while both counters are non-zero.
            if self.length_counter != 0 && self.linear_counter != 0 {
                self.sequence_counter = (self.sequence_counter + 1) % 32;
            }
        } else {
            self.timer -= 1;
        }
        // At very short periods the sequencer runs ultrasonic; emitting
        // silence there avoids aliasing artifacts in the downsampled output.
        self.sample = if self.length_counter == 0 || self.linear_counter == 0 || self.timer_period < 2 {
            0
        } else {
            SEQUENCE[self.sequence_counter]
        };
    }

    pub fn clock_linear_counter(&mut self) {
        // If the reload flag is set, the linear counter is reloaded with the
        // counter reload value, otherwise if it is non-zero it is decremented.
        if self.linear_counter_reload {
            self.linear_counter = self.linear_counter_period;
        } else if self.linear_counter != 0 {
            self.linear_counter -= 1;
        }
        // If the control flag is clear, the reload flag is cleared.
        if !self.control_flag {
            self.linear_counter_reload = false;
        }
    }

    pub fn clock_length_counter(&mut self) {
        if !(self.length_counter == 0 || self.control_flag) {
            self.length_counter -= 1;
        }
    }

    // $4008
    pub fn write_counter(&mut self, value: u8) {
        self.control_flag = value & 0b1000_0000 != 0;
        self.linear_counter_period = value & 0b0111_1111;
    }

    // $400A
    pub fn write_timer_low(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0b0111_0000_0000) | value as u16;
    }

    // $400B
    pub fn write_timer_high(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0b1111_1111) | (((value as u16) & 0b111) << 8);
        if self.enabled {
            self.length_counter = LENGTH_COUNTER_TABLE[(value >> 3) as usize];
        }
        // Side effect: sets the linear counter reload flag.
        self.linear_counter_reload = true;
    }
}
