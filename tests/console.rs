use famicore::{Cartridge, Config, Console, SaveState};

// Builds a headered NROM image whose program paints the backdrop color and
// turns rendering on:
//   LDA #$3F / STA $2006 / LDA #$00 / STA $2006   point v at $3F00
//   LDA #$21 / STA $2007                          backdrop palette entry
//   LDA #$08 / STA $2001                          show background
//   JMP *                                         spin
fn backdrop_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x10 + 0x4000 + 0x2000];
    rom[0..4].copy_from_slice(b"NES\x1a");
    rom[4] = 1; // one 16 KiB PRG chunk
    rom[5] = 1; // one 8 KiB CHR chunk
    let prg = 0x10;
    let program: [u8; 23] = [
        0xA9, 0x3F, 0x8D, 0x06, 0x20, // LDA #$3F; STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        0xA9, 0x21, 0x8D, 0x07, 0x20, // LDA #$21; STA $2007
        0xA9, 0x08, 0x8D, 0x01, 0x20, // LDA #$08; STA $2001
        0x4C, 0x14, 0x80, // JMP $8014
    ];
    rom[prg..prg + program.len()].copy_from_slice(&program);
    // reset vector -> $8000 (the 16 KiB chunk is mirrored at $C000)
    rom[prg + 0x3FFC] = 0x00;
    rom[prg + 0x3FFD] = 0x80;
    rom
}

fn console() -> Console {
    let cart = Cartridge::from_bytes(&backdrop_rom()).unwrap();
    Console::new(cart, Config::default())
}

#[test]
fn runs_sixty_frames() {
    let mut c = console();
    let mut cycles = 0;
    for _ in 0..60 {
        cycles += c.step_frame();
    }
    assert_eq!(c.frame_count(), 60);
    // a second of NTSC video is just shy of 1.79 million CPU cycles
    assert!((1_780_000..1_800_000).contains(&cycles), "got {} cycles", cycles);
}

#[test]
fn backdrop_color_fills_the_framebuffer() {
    let mut c = console();
    // give the program time to run, then render a full frame
    for _ in 0..5 {
        c.step_frame();
    }
    let fb = c.framebuffer();
    // palette entry $21 is a light blue
    assert_eq!(&fb[0..4], &[76, 154, 236, 255]);
    let mid = (120 * 256 + 128) * 4;
    assert_eq!(&fb[mid..mid + 4], &[76, 154, 236, 255]);
}

#[test]
fn save_state_round_trips_through_json() {
    let mut c = console();
    for _ in 0..10 {
        c.step_frame();
    }
    let state = c.save_state();
    let json = state.to_json().unwrap();
    let restored = SaveState::from_json(&json).unwrap();

    // run the original forward, then a restored copy, and compare output
    for _ in 0..30 {
        c.step_frame();
    }
    let reference: Vec<u8> = c.framebuffer().to_vec();

    let mut replay = console();
    replay.load_state(restored);
    for _ in 0..30 {
        replay.step_frame();
    }
    assert_eq!(replay.framebuffer(), reference.as_slice());
}

#[test]
fn save_state_files_replace_atomically() {
    let mut c = console();
    c.step_frame();
    let dir = std::env::temp_dir();
    let path = dir.join("famicore-state-test.json");
    c.save_state().to_file(&path).unwrap();
    // overwriting an existing save goes through the same rename path
    c.step_frame();
    c.save_state().to_file(&path).unwrap();
    let loaded = SaveState::from_file(&path).unwrap();
    let mut replay = console();
    replay.load_state(loaded);
    assert_eq!(replay.frame_count(), c.frame_count());
    std::fs::remove_file(&path).ok();
}

#[test]
fn controller_input_reaches_the_cpu_bus() {
    let mut c = console();
    c.set_controller(0, 0b0000_0001); // A held
    // strobe then read through the bus like a game would
    c.cpu.write(0x4016, 1);
    c.cpu.write(0x4016, 0);
    assert_eq!(c.cpu.read(0x4016) & 1, 1);
    for _ in 0..7 {
        c.cpu.read(0x4016);
    }
    // past the eighth bit the index wraps back to A
    assert_eq!(c.cpu.read(0x4016) & 1, 1);
    assert_eq!(c.cpu.read(0x4016) & 1, 0); // B is not held
}
