use crate::apu::Apu;
use crate::cartridge::{new_mapper, Cartridge};
use crate::cpu::Cpu;
use crate::ppu::Ppu;
use crate::state::SaveState;
use crate::CPU_FREQUENCY;

/// Host-facing knobs. The defaults suit a 44.1 kHz audio device.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub sample_rate: f64,
    pub audio_filters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sample_rate: 44_100.0,
            audio_filters: true,
        }
    }
}

/// The wired-together machine. The host drives it by stepping, then reads
/// the framebuffer and drains the audio buffer at its own pace.
pub struct Console {
    pub cpu: Cpu,
    audio_buffer: Vec<f32>,
    // the APU ticks every other CPU cycle; an instruction with an odd cycle
    // count leaves half an APU cycle to carry into the next step
    half_cycle: bool,
}

impl Console {
    pub fn new(cart: Cartridge, config: Config) -> Self {
        let mapper = new_mapper(cart);
        let ppu = Ppu::new(mapper.clone());
        let apu = Apu::new(config.sample_rate, config.audio_filters);
        Console {
            cpu: Cpu::new(mapper, ppu, apu),
            audio_buffer: Vec::new(),
            half_cycle: false,
        }
    }

    /// Executes one CPU instruction and catches the PPU and APU up to it.
    /// Returns the number of CPU cycles consumed.
    pub fn step(&mut self) -> u64 {
        let cpu_cycles = self.cpu.step();

        // clock the APU every other CPU cycle
        let mut apu_cycles = cpu_cycles / 2;
        if cpu_cycles & 1 == 1 {
            if self.half_cycle {
                apu_cycles += 1;
                self.half_cycle = false;
            } else {
                self.half_cycle = true;
            }
        }
        for _ in 0..apu_cycles {
            // the DMC reads its sample bytes off the CPU bus
            let dmc_address = self.cpu.apu.dmc_address();
            let dmc_byte = self.cpu.read(dmc_address);
            if let Some(sample) = self.cpu.apu.clock(dmc_byte) {
                self.audio_buffer.push(sample);
            }
            if self.cpu.apu.dmc_stall() {
                self.cpu.stall(4);
            }
        }

        // clock the PPU three times per CPU cycle, feeding the mapper the
        // render state so boards like the MMC3 can count scanlines
        for _ in 0..cpu_cycles * 3 {
            let input = self.cpu.ppu.mapper_input();
            self.cpu.ppu.clock();
            if self.cpu.mapper.borrow_mut().step(input) {
                self.cpu.trigger_irq();
            }
        }

        cpu_cycles
    }

    /// Runs until the PPU's frame counter advances. Returns the number of
    /// CPU cycles consumed.
    pub fn step_frame(&mut self) -> u64 {
        let mut cycles = 0;
        let frame = self.cpu.ppu.frame_count();
        while self.cpu.ppu.frame_count() == frame {
            cycles += self.step();
        }
        cycles
    }

    /// Runs for the given amount of emulated time.
    pub fn step_seconds(&mut self, seconds: f64) {
        let mut budget = (CPU_FREQUENCY * seconds) as i64;
        while budget > 0 {
            budget -= self.step() as i64;
        }
    }

    /// Reset button. Cartridge and memory contents survive.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.ppu.reset();
    }

    /// RGBA pixels, 256x240, top row first.
    pub fn framebuffer(&self) -> &[u8] {
        self.cpu.ppu.screen()
    }

    pub fn frame_count(&self) -> u64 {
        self.cpu.ppu.frame_count()
    }

    /// Drains the audio samples accumulated since the last call.
    pub fn take_audio_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.audio_buffer)
    }

    /// Host-side input for controller 0 or 1, bit set = pressed, in the
    /// order A, B, Select, Start, Up, Down, Left, Right.
    pub fn set_controller(&mut self, port: usize, buttons: u8) {
        self.cpu.controllers[port].set_buttons(buttons);
    }

    pub fn save_state(&self) -> SaveState {
        SaveState {
            cpu: self.cpu.save_state(),
            ppu: self.cpu.ppu.save_state(),
            apu: self.cpu.apu.save_state(),
            mapper: self.cpu.mapper.borrow().save_state(),
        }
    }

    /// Restores a snapshot taken by `save_state`. The snapshot must come
    /// from the same cartridge; a snapshot of a different mapper family is
    /// ignored by the mapper and everything else still loads.
    pub fn load_state(&mut self, state: SaveState) {
        self.cpu.load_state(state.cpu);
        self.cpu.ppu.load_state(state.ppu);
        self.cpu.apu.load_state(state.apu);
        self.cpu.mapper.borrow_mut().load_state(state.mapper);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::looping_rom;

    fn console() -> Console {
        let cart = Cartridge::from_bytes(&looping_rom()).unwrap();
        Console::new(cart, Config::default())
    }

    #[test]
    fn step_frame_advances_the_frame_counter_by_one() {
        let mut c = console();
        let cycles = c.step_frame();
        assert_eq!(c.frame_count(), 1);
        // a frame is 341*262 PPU dots, a third as many CPU cycles, overshot
        // by at most the last instruction
        assert!((29_000..30_500).contains(&cycles), "got {} cycles", cycles);
        for _ in 0..59 {
            c.step_frame();
        }
        assert_eq!(c.frame_count(), 60);
    }

    #[test]
    fn one_second_produces_sixty_frames_of_audio_and_video() {
        let mut c = console();
        c.step_seconds(1.0);
        let frames = c.frame_count();
        assert!((59..=61).contains(&frames), "got {} frames", frames);
        let samples = c.take_audio_samples();
        assert!((samples.len() as i64 - 44_100).abs() < 150);
        // draining leaves the buffer empty
        assert!(c.take_audio_samples().is_empty());
    }

    #[test]
    fn framebuffer_has_rgba_dimensions() {
        let mut c = console();
        c.step_frame();
        assert_eq!(c.framebuffer().len(), 256 * 240 * 4);
    }
}
