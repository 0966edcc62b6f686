use serde::{Deserialize, Serialize};

use std::f32::consts::PI;

// First-order filters applied to the downsampled output, modeling the
// RC networks between the 2A03 pins and the TV: two high-passes at 90 Hz
// and 440 Hz, then a low-pass at 14 kHz.
#[derive(Clone, Serialize, Deserialize)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new(sample_rate: f32) -> Self {
        FilterChain {
            filters: vec![
                Filter::high_pass(sample_rate, 90.0),
                Filter::high_pass(sample_rate, 440.0),
                Filter::low_pass(sample_rate, 14_000.0),
            ],
        }
    }

    pub fn step(&mut self, sample: f32) -> f32 {
        self.filters
            .iter_mut()
            .fold(sample, |acc, filter| filter.step(acc))
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct Filter {
    b0: f32,
    b1: f32,
    a1: f32,
    prev_input: f32,
    prev_output: f32,
}

impl Filter {
    fn high_pass(sample_rate: f32, cutoff: f32) -> Self {
        let c = sample_rate / PI / cutoff;
        let a0i = 1.0 / (1.0 + c);
        Filter {
            b0: c * a0i,
            b1: -c * a0i,
            a1: (1.0 - c) * a0i,
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    fn low_pass(sample_rate: f32, cutoff: f32) -> Self {
        let c = sample_rate / PI / cutoff;
        let a0i = 1.0 / (1.0 + c);
        Filter {
            b0: a0i,
            b1: a0i,
            a1: (1.0 - c) * a0i,
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    fn step(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.prev_input - self.a1 * self.prev_output;
        self.prev_input = input;
        self.prev_output = output;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_pass_rejects_dc() {
        let mut f = Filter::high_pass(44_100.0, 440.0);
        let mut out = 0.0;
        for _ in 0..44_100 {
            out = f.step(1.0);
        }
        assert!(out.abs() < 0.01);
    }

    #[test]
    fn low_pass_passes_dc() {
        let mut f = Filter::low_pass(44_100.0, 14_000.0);
        let mut out = 0.0;
        for _ in 0..44_100 {
            out = f.step(1.0);
        }
        assert!((out - 1.0).abs() < 0.01);
    }
}
