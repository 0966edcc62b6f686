// Standard NES controller: an 8-bit shift register behind $4016/$4017.
// Button order as the CPU reads it out: A, B, Select, Start, Up, Down, Left, Right.

#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Controller {
    // current button states as reported by the host, bit set = pressed
    button_states: u8,
    strobe: u8,
    // which button the next read returns (0-7, wrapping)
    button_number: u8,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            button_states: 0,
            strobe: 0,
            button_number: 0,
        }
    }

    /// Host-side input: replace the live button bitmask.
    pub fn set_buttons(&mut self, states: u8) {
        self.button_states = states;
    }

    // CPU write to $4016. While bit 0 is set the shift register keeps
    // re-latching, so reads always return button 0 (A).
    pub fn write(&mut self, value: u8) {
        self.strobe = value;
        if self.strobe & 1 != 0 {
            self.button_number = 0;
        }
    }

    // CPU read from $4016/$4017: one button bit per read, advancing while
    // the strobe is low. Past the 8th read the index wraps back to A.
    pub fn read(&mut self) -> u8 {
        let bit = (self.button_states & (1 << self.button_number) != 0) as u8;
        if self.strobe & 1 != 0 {
            self.button_number = 0;
        } else {
            self.button_number = (self.button_number + 1) & 7;
        }
        bit
    }
}

#[cfg(test)]
mod tests {
    use super::Controller;

    #[test]
    fn strobe_high_always_returns_a() {
        let mut c = Controller::new();
        c.set_buttons(0b0000_0101); // A and Select held
        c.write(1);
        for _ in 0..4 {
            assert_eq!(c.read(), 1);
        }
    }

    #[test]
    fn strobe_low_shifts_out_all_eight_buttons() {
        let mut c = Controller::new();
        c.set_buttons(0b1010_0110); // B, Select, Down, Right
        c.write(1);
        c.write(0);
        let bits: Vec<u8> = (0..8).map(|_| c.read()).collect();
        assert_eq!(bits, vec![0, 1, 1, 0, 0, 1, 0, 1]);
        // the index wraps, so the ninth read starts over at A
        assert_eq!(c.read(), 0);
        assert_eq!(c.read(), 1);
    }
}
