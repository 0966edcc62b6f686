mod dmc;
mod envelope;
mod filters;
mod noise;
pub mod serialize;
mod square;
mod triangle;

use serde::{Deserialize, Serialize};

use dmc::Dmc;
use filters::FilterChain;
use noise::Noise;
use square::Square;
use triangle::Triangle;

use crate::CPU_FREQUENCY;

// The APU ticks every other CPU cycle. The frame counter divides that
// further into quarter- and half-frame signals in audio frames of 4 or 5.
const FRAME_COUNTER_STEPS: [usize; 5] = [3728, 7456, 11185, 14914, 18640];
const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20,  2, 40,  4, 80,  6, 160,  8, 60, 10, 14, 12, 26, 14,
    12,  16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Apu {
    square1: Square,
    square2: Square,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,

    square_table: Vec<f32>,
    tnd_table: Vec<f32>,

    frame_sequence: u8, // 4- or 5-step mode
    interrupt_inhibit: bool,
    frame_interrupt: bool,
    cycle: usize,
    pub trigger_irq: bool,

    // Downsampling from the APU rate to the host sample rate
    sample_rate: f64,
    sample_clock: f64,
    filters_enabled: bool,
    filters: FilterChain,
}

impl Apu {
    pub fn new(sample_rate: f64, filters_enabled: bool) -> Self {
        // Lookup tables for the nonlinear mixer.
        let square_table = (0..31)
            .map(|x| 95.52 / ((8128.0 / x as f32) + 100.0))
            .collect();
        let tnd_table = (0..203)
            .map(|x| 163.67 / ((24329.0 / x as f32) + 100.0))
            .collect();
        Apu {
            square1: Square::new(false),
            square2: Square::new(true),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dmc: Dmc::new(),
            square_table,
            tnd_table,
            frame_sequence: 4,
            interrupt_inhibit: false,
            frame_interrupt: false,
            cycle: 0,
            trigger_irq: false,
            sample_rate,
            sample_clock: 0.0,
            filters_enabled,
            filters: FilterChain::new(sample_rate as f32),
        }
    }

    /// Advances one APU cycle (two CPU cycles). `dmc_sample_byte` is the
    /// byte at the DMC's current address, read off the CPU bus by the
    /// caller. Returns a sample when one is due at the host sample rate.
    pub fn clock(&mut self, dmc_sample_byte: u8) -> Option<f32> {
        self.square1.clock();
        self.square2.clock();
        // the triangle timer runs at CPU speed
        self.triangle.clock();
        self.triangle.clock();
        self.noise.clock();
        self.dmc.clock(dmc_sample_byte);
        // The DMC interrupt is level-held: it keeps pulling the IRQ line
        // until a $4015 write (or clearing bit 7 of $4010) acknowledges it.
        if self.dmc.interrupt {
            self.trigger_irq = true;
        }

        if let Some(step) = FRAME_COUNTER_STEPS.iter().position(|&s| s == self.cycle) {
            self.clock_frame_counter(step);
        }
        self.cycle += 1;
        if (self.frame_sequence == 4 && self.cycle == 14915) || self.cycle == 18641 {
            self.cycle = 0;
        }

        // emit a sample whenever the fractional downsample counter rolls over
        self.sample_clock += 1.0;
        let apu_ticks_per_sample = (CPU_FREQUENCY / 2.0) / self.sample_rate;
        if self.sample_clock >= apu_ticks_per_sample {
            self.sample_clock -= apu_ticks_per_sample;
            let mixed = self.mix();
            Some(if self.filters_enabled {
                self.filters.step(mixed)
            } else {
                mixed
            })
        } else {
            None
        }
    }

    fn mix(&self) -> f32 {
        let square_out = self.square_table[(self.square1.sample + self.square2.sample) as usize];
        let tnd_out = self.tnd_table
            [(3 * self.triangle.sample + 2 * self.noise.sample + self.dmc.sample) as usize];
        square_out + tnd_out
    }

    /// True when the DMC just fetched a byte; the CPU owes it a 4-cycle stall.
    pub fn dmc_stall(&mut self) -> bool {
        let stall = self.dmc.cpu_stall;
        self.dmc.cpu_stall = false;
        stall
    }

    /// Address the DMC wants read off the CPU bus next.
    pub fn dmc_address(&self) -> usize {
        self.dmc.current_address
    }

    pub fn write_reg(&mut self, address: usize, value: u8) {
        match address {
            0x4000 => self.square1.write_duty(value),
            0x4001 => self.square1.write_sweep(value),
            0x4002 => self.square1.write_timer_low(value),
            0x4003 => self.square1.write_timer_high(value),
            0x4004 => self.square2.write_duty(value),
            0x4005 => self.square2.write_sweep(value),
            0x4006 => self.square2.write_timer_low(value),
            0x4007 => self.square2.write_timer_high(value),
            0x4008 => self.triangle.write_counter(value),
            0x400A => self.triangle.write_timer_low(value),
            0x400B => self.triangle.write_timer_high(value),
            0x400C => self.noise.write_envelope(value),
            0x400E => self.noise.write_loop_noise(value),
            0x400F => self.noise.write_length_counter(value),
            0x4010 => self.dmc.write_control(value),
            0x4011 => self.dmc.direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),
            0x4015 => self.write_control(value),
            0x4017 => self.write_frame_counter(value),
            _ => (),
        }
    }

    //   mode 0:    mode 1:       function
    // ---------  -----------  -----------------------------
    // - - - f    - - - - -    IRQ (if bit 6 is clear)
    // - l - l    - l - - l    Length counter and sweep
    // e e e e    e e e - e    Envelope and linear counter
    fn clock_frame_counter(&mut self, step: usize) {
        let five_step = self.frame_sequence == 5;
        if five_step && step == 3 {
            // step 14914 does nothing in 5-step mode
            return;
        }
        self.clock_quarter_frame();
        if step == 1 || (!five_step && step == 3) || (five_step && step == 4) {
            self.clock_half_frame();
        }
        if !five_step && step == 3 && !self.interrupt_inhibit {
            self.frame_interrupt = true;
            self.trigger_irq = true;
        }
    }

    fn clock_quarter_frame(&mut self) {
        self.square1.envelope.clock();
        self.square2.envelope.clock();
        self.triangle.clock_linear_counter();
        self.noise.envelope.clock();
    }

    fn clock_half_frame(&mut self) {
        self.square1.clock_sweep();
        self.square2.clock_sweep();
        self.square1.clock_length_counter();
        self.square2.clock_length_counter();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
    }

    // CPU writes to $4015. A zero in any channel enable bit silences the
    // channel and zeroes its length counter.
    fn write_control(&mut self, value: u8) {
        // Writing to this register clears the DMC interrupt flag.
        self.dmc.interrupt = false;
        self.square1.enabled = value & (1 << 0) != 0;
        if !self.square1.enabled {
            self.square1.length_counter = 0;
        }
        self.square2.enabled = value & (1 << 1) != 0;
        if !self.square2.enabled {
            self.square2.length_counter = 0;
        }
        self.triangle.enabled = value & (1 << 2) != 0;
        if !self.triangle.enabled {
            self.triangle.length_counter = 0;
        }
        self.noise.enabled = value & (1 << 3) != 0;
        if !self.noise.enabled {
            self.noise.length_counter = 0;
        }
        if value & (1 << 4) != 0 {
            self.dmc.enabled = true;
            // The sample restarts only if its bytes remaining is 0; any
            // bits left in the buffer finish playing first.
            if self.dmc.bytes_remaining == 0 {
                self.dmc.restart();
            }
        } else {
            self.dmc.enabled = false;
            self.dmc.bytes_remaining = 0;
        }
    }

    // CPU reads from $4015
    // IF-D NT21: DMC interrupt, frame interrupt, DMC active, length counters > 0
    pub fn read_status(&mut self) -> u8 {
        let mut val = 0;
        if self.square1.length_counter != 0 {
            val |= 1 << 0;
        }
        if self.square2.length_counter != 0 {
            val |= 1 << 1;
        }
        if self.triangle.length_counter != 0 {
            val |= 1 << 2;
        }
        if self.noise.length_counter != 0 {
            val |= 1 << 3;
        }
        if self.dmc.bytes_remaining != 0 {
            val |= 1 << 4;
        }
        if self.frame_interrupt {
            val |= 1 << 6;
        }
        if self.dmc.interrupt {
            val |= 1 << 7;
        }
        // Reading clears the frame interrupt flag (but not the DMC's).
        self.frame_interrupt = false;
        val
    }

    // $4017
    fn write_frame_counter(&mut self, value: u8) {
        // 0 selects the 4-step sequence, 1 the 5-step sequence
        self.frame_sequence = if value & (1 << 7) == 0 { 4 } else { 5 };
        self.interrupt_inhibit = value & (1 << 6) != 0;
        if self.interrupt_inhibit {
            self.frame_interrupt = false;
        }
        self.cycle = 0;
        // Selecting the 5-step sequence immediately generates the
        // quarter- and half-frame signals.
        if self.frame_sequence == 5 {
            self.clock_quarter_frame();
            self.clock_half_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apu() -> Apu {
        Apu::new(44_100.0, false)
    }

    #[test]
    fn mixer_tables_match_the_closed_forms() {
        let a = apu();
        assert_eq!(a.square_table[0], 0.0);
        for i in [15usize, 30].iter() {
            let expected = 95.52 / ((8128.0 / *i as f32) + 100.0);
            assert!((a.square_table[*i] - expected).abs() < 1e-6);
        }
        for i in [100usize, 202].iter() {
            let expected = 163.67 / ((24329.0 / *i as f32) + 100.0);
            assert!((a.tnd_table[*i] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn mixer_output_is_monotonic_in_channel_volume() {
        let a = apu();
        for i in 1..31 {
            assert!(a.square_table[i] > a.square_table[i - 1]);
        }
        for i in 1..203 {
            assert!(a.tnd_table[i] > a.tnd_table[i - 1]);
        }
    }

    #[test]
    fn frame_irq_fires_in_four_step_mode_only() {
        let mut a = apu();
        for _ in 0..15_000 {
            a.clock(0);
        }
        assert!(a.trigger_irq);
        assert_eq!(a.read_status() & (1 << 6), 1 << 6);
        // the read cleared the frame interrupt flag
        assert_eq!(a.read_status() & (1 << 6), 0);

        let mut a = apu();
        a.write_reg(0x4017, 0b1000_0000); // 5-step mode
        for _ in 0..19_000 {
            a.clock(0);
        }
        assert!(!a.trigger_irq);
    }

    #[test]
    fn dmc_interrupt_holds_the_irq_line_until_acknowledged() {
        let mut a = apu();
        a.write_reg(0x4010, 0b1000_0000); // IRQ enabled
        a.write_reg(0x4013, 0x00); // 1-byte sample
        a.write_reg(0x4015, 0b0001_0000); // enable DMC, restarting the sample
        a.clock(0xAA); // the fetch consumes the only byte
        assert!(a.trigger_irq);
        assert_eq!(a.read_status() & (1 << 7), 1 << 7);
        // the line stays pulled even after the CPU services the IRQ
        a.trigger_irq = false;
        a.clock(0xAA);
        assert!(a.trigger_irq);
        // a $4015 write acknowledges it
        a.write_reg(0x4015, 0);
        a.trigger_irq = false;
        a.clock(0xAA);
        assert!(!a.trigger_irq);
    }

    #[test]
    fn interrupt_inhibit_suppresses_the_frame_irq() {
        let mut a = apu();
        a.write_reg(0x4017, 0b0100_0000);
        for _ in 0..15_000 {
            a.clock(0);
        }
        assert!(!a.trigger_irq);
    }

    #[test]
    fn length_counters_load_and_report_through_status() {
        let mut a = apu();
        a.write_reg(0x4015, 0b0000_1111); // enable the four length channels
        a.write_reg(0x4003, 0b0000_1000); // square 1 length index 1 == 254
        assert_eq!(a.read_status() & 1, 1);
        // disabling the channel zeroes its counter immediately
        a.write_reg(0x4015, 0b0000_1110);
        assert_eq!(a.read_status() & 1, 0);
    }

    #[test]
    fn length_counter_writes_ignored_while_disabled() {
        let mut a = apu();
        a.write_reg(0x4003, 0b0000_1000);
        assert_eq!(a.read_status() & 1, 0);
    }

    #[test]
    fn samples_come_out_near_the_requested_rate() {
        let mut a = apu();
        let mut produced = 0;
        let apu_cycles_per_second = (CPU_FREQUENCY / 2.0) as usize;
        for _ in 0..apu_cycles_per_second {
            if a.clock(0).is_some() {
                produced += 1;
            }
        }
        assert!((produced as i64 - 44_100).abs() < 10);
    }
}
