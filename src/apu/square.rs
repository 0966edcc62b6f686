use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::LENGTH_COUNTER_TABLE;

const DUTY_CYCLE_SEQUENCES: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Square {
    pub sample: u16, // output value that gets sent to the mixer
    pub enabled: bool,
    pub length_counter: u8,
    pub envelope: Envelope,

    duty_cycle: usize,
    duty_counter: usize,
    constant_volume_flag: bool, // (0: use volume from envelope; 1: use constant volume)
    timer: u16,
    timer_period: u16,

    // Sweep unit. The two squares differ only in how the negate flag
    // computes the change amount: square 1 uses ones' complement, square 2
    // uses two's complement.
    second_channel: bool,
    sweep_enabled: bool,
    sweep_period: u16,
    sweep_negate: bool,
    sweep_shift: u8,
    sweep_divider: u16,
    sweep_reload: bool,
}

impl Square {
    pub fn new(second_channel: bool) -> Self {
        Square {
            sample: 0,
            enabled: false,
            length_counter: 0,
            envelope: Envelope::new(),
            duty_cycle: 0,
            duty_counter: 0,
            constant_volume_flag: false,
            timer: 0,
            timer_period: 0,
            second_channel,
            sweep_enabled: false,
            sweep_period: 0,
            sweep_negate: false,
            sweep_shift: 0,
            sweep_divider: 0,
            sweep_reload: false,
        }
    }

    pub fn clock(&mut self) {
        // The timer steps the 8-position duty sequencer every period + 1 APU cycles.
        if self.timer == 0 {
            self.timer = self.timer_period;
            self.duty_counter = (self.duty_counter + 1) % 8;
        } else {
            self.timer -= 1;
        }
        // The mixer receives the envelope volume except when the sequencer
        // output is low, the length counter is zero, or the sweep unit is
        // muting the channel.
        self.sample = if DUTY_CYCLE_SEQUENCES[self.duty_cycle][self.duty_counter] == 0
            || self.length_counter == 0
            || self.muted_by_sweep()
        {
            0
        } else if self.constant_volume_flag {
            self.envelope.period
        } else {
            self.envelope.decay_counter
        };
    }

    // The channel is silenced when the current period is below 8 or the
    // sweep target period overflows 11 bits, whether or not the sweep unit
    // is enabled.
    fn muted_by_sweep(&self) -> bool {
        self.timer_period < 8 || self.target_period() > 0x7FF
    }

    fn target_period(&self) -> u16 {
        let change = self.timer_period >> self.sweep_shift;
        if self.sweep_negate {
            if self.second_channel {
                self.timer_period.wrapping_sub(change) & 0x7FF
            } else {
                // ones' complement: subtracts change + 1
                self.timer_period.wrapping_sub(change + 1) & 0x7FF
            }
        } else {
            self.timer_period + change
        }
    }

    pub fn clock_sweep(&mut self) {
        // When the divider outputs a clock with the sweep enabled and not
        // muting, the period is set to the target period.
        if self.sweep_divider == 0
            && self.sweep_enabled
            && self.sweep_shift != 0
            && !self.muted_by_sweep()
        {
            self.timer_period = self.target_period();
        }
        if self.sweep_divider == 0 || self.sweep_reload {
            self.sweep_divider = self.sweep_period;
            self.sweep_reload = false;
        } else {
            self.sweep_divider -= 1;
        }
    }

    pub fn clock_length_counter(&mut self) {
        if !(self.length_counter == 0 || self.envelope.length_counter_halt) {
            self.length_counter -= 1;
        }
    }

    // $4000/$4004
    pub fn write_duty(&mut self, value: u8) {
        self.duty_cycle = (value >> 6) as usize;
        self.envelope.length_counter_halt = (value >> 5) & 1 == 1;
        self.constant_volume_flag = (value >> 4) & 1 == 1;
        self.envelope.period = value as u16 & 0b1111;
    }

    // $4001/$4005
    pub fn write_sweep(&mut self, value: u8) {
        self.sweep_enabled = value & 0b1000_0000 != 0;
        self.sweep_period = ((value as u16) >> 4) & 0b111;
        self.sweep_negate = value & 0b0000_1000 != 0;
        self.sweep_shift = value & 0b0000_0111;
        // Side effect: sets the reload flag.
        self.sweep_reload = true;
    }

    // $4002/$4006
    pub fn write_timer_low(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0b0111_0000_0000) | value as u16;
    }

    // $4003/$4007
    pub fn write_timer_high(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0b1111_1111) | (((value as u16) & 0b111) << 8);
        if self.enabled {
            self.length_counter = LENGTH_COUNTER_TABLE[(value >> 3) as usize];
        }
        // Side effects: the sequencer is restarted and the envelope is restarted.
        self.duty_counter = 0;
        self.envelope.start = true;
    }
}

#[cfg(test)]
mod tests {
    use super::Square;

    fn audible_square() -> Square {
        let mut sq = Square::new(false);
        sq.enabled = true;
        sq.write_duty(0b1011_1111); // duty 2, constant volume 15, halt
        sq.write_timer_low(0x40);
        sq.write_timer_high(0x01); // period 0x140, loads length counter
        sq
    }

    #[test]
    fn produces_a_waveform_at_the_programmed_duty() {
        let mut sq = audible_square();
        let period = 0x140 + 1;
        let mut highs = 0;
        for _ in 0..period * 8 {
            sq.clock();
            if sq.sample != 0 {
                highs += 1;
            }
        }
        // duty 2 is high for 4 of 8 sequencer steps
        assert!(highs > period * 3 && highs < period * 5);
    }

    #[test]
    fn short_periods_are_muted() {
        let mut sq = audible_square();
        sq.write_timer_low(0x05);
        sq.write_timer_high(0x00);
        for _ in 0..64 {
            sq.clock();
            assert_eq!(sq.sample, 0);
        }
    }

    #[test]
    fn sweep_negate_differs_between_channels() {
        let mut sq1 = Square::new(false);
        let mut sq2 = Square::new(true);
        for sq in [&mut sq1, &mut sq2].iter_mut() {
            sq.write_timer_low(0x00);
            sq.write_timer_high(0x01); // period 0x100
            sq.write_sweep(0b1000_1001); // enabled, negate, shift 1
        }
        assert_eq!(sq1.target_period(), 0x100 - 0x80 - 1);
        assert_eq!(sq2.target_period(), 0x100 - 0x80);
    }

    #[test]
    fn sweep_updates_the_period_when_its_divider_fires() {
        let mut sq = Square::new(true);
        sq.enabled = true;
        sq.write_timer_low(0x00);
        sq.write_timer_high(0x01);
        sq.write_sweep(0b1000_0001); // enabled, divider period 0, shift 1, positive
        sq.clock_sweep(); // divider period 0 fires on every half-frame clock
        assert_eq!(sq.timer_period, 0x100 + 0x80);
    }
}
