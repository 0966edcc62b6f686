use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::LENGTH_COUNTER_TABLE;

const NOISE_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Noise {
    pub sample: u16, // output value that gets sent to the mixer
    pub enabled: bool,
    pub length_counter: u8,
    pub envelope: Envelope,

    constant_volume_flag: bool,
    mode: bool, // bit 7 of $400E
    timer: u16,
    timer_period: u16,
    linear_feedback_sr: u16,
}

impl Noise {
    pub fn new() -> Self {
        Noise {
            sample: 0,
            enabled: false,
            length_counter: 0,
            envelope: Envelope::new(),
            constant_volume_flag: false,
            mode: false,
            timer: 0,
            timer_period: 0,
            // On power-up, the shift register is loaded with the value 1.
            linear_feedback_sr: 1,
        }
    }

    pub fn clock(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            self.clock_shift_register();
        } else {
            self.timer -= 1;
        }
        // The mixer receives the current envelope volume except when
        // bit 0 of the shift register is set, or the length counter is zero
        self.sample = if self.linear_feedback_sr & 1 == 1 || self.length_counter == 0 {
            0
        } else if self.constant_volume_flag {
            self.envelope.period
        } else {
            self.envelope.decay_counter
        };
    }

    fn clock_shift_register(&mut self) {
        // Feedback is the exclusive-OR of bit 0 and one other bit: bit 6 if
        // the mode flag is set, otherwise bit 1. This gives a pseudo-random
        // sequence 32767 steps long in mode 0, and 93 or 31 steps otherwise.
        let bit0 = self.linear_feedback_sr & 1;
        let bit_num = if self.mode { 6 } else { 1 };
        let other_bit = (self.linear_feedback_sr >> bit_num) & 1;
        let feedback = bit0 ^ other_bit;
        self.linear_feedback_sr >>= 1;
        self.linear_feedback_sr |= feedback << 14;
    }

    pub fn clock_length_counter(&mut self) {
        if !(self.length_counter == 0 || self.envelope.length_counter_halt) {
            self.length_counter -= 1;
        }
    }

    // $400C
    pub fn write_envelope(&mut self, value: u8) {
        self.envelope.length_counter_halt = (value >> 5) & 1 == 1;
        self.constant_volume_flag = (value >> 4) & 1 == 1;
        self.envelope.period = value as u16 & 0b1111;
    }

    // $400E
    pub fn write_loop_noise(&mut self, value: u8) {
        self.mode = value >> 7 == 1;
        self.timer_period = NOISE_TABLE[(value & 0b1111) as usize];
    }

    // $400F
    pub fn write_length_counter(&mut self, value: u8) {
        if self.enabled {
            self.length_counter = LENGTH_COUNTER_TABLE[(value >> 3) as usize];
        }
        self.envelope.start = true;
    }
}

#[cfg(test)]
mod tests {
    use super::Noise;

    #[test]
    fn shift_register_never_locks_up() {
        let mut n = Noise::new();
        for _ in 0..0x8000 {
            n.clock_shift_register();
            assert_ne!(n.linear_feedback_sr, 0);
        }
    }

    #[test]
    fn mode_one_produces_a_short_sequence() {
        let mut n = Noise::new();
        n.mode = true;
        let initial = n.linear_feedback_sr;
        let mut period = 0;
        for i in 1..=128 {
            n.clock_shift_register();
            if n.linear_feedback_sr == initial {
                period = i;
                break;
            }
        }
        assert!(period == 31 || period == 93);
    }
}
