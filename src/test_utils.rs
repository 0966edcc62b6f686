use crate::cartridge::{Cartridge, CHR_CHUNK_SIZE, PRG_CHUNK_SIZE};

/// Builds a syntactically valid iNES image from whole cloth.
pub fn build_ines(prg_chunks: usize, chr_chunks: usize, mapper_num: u8, flags6: u8) -> Vec<u8> {
    let mut rom = vec![
        0x4E,
        0x45,
        0x53,
        0x1A,
        prg_chunks as u8,
        chr_chunks as u8,
        flags6 | (mapper_num << 4),
        mapper_num & 0xF0,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
    ];
    if flags6 & (1 << 2) != 0 {
        rom.extend(std::iter::repeat(0).take(0x200));
    }
    rom.extend(std::iter::repeat(0).take(prg_chunks * PRG_CHUNK_SIZE));
    rom.extend(std::iter::repeat(0).take(chr_chunks * CHR_CHUNK_SIZE));
    rom
}

/// A parsed cartridge with zeroed contents, mapper 0, horizontal mirroring.
pub fn test_cartridge(prg_chunks: usize, chr_chunks: usize) -> Cartridge {
    Cartridge::from_bytes(&build_ines(prg_chunks, chr_chunks, 0, 0)).unwrap()
}

/// A minimal runnable image: the reset vector points at an infinite JMP and
/// everything else is NOPs ($EA would loop off into open bus, so the vector
/// target jumps to itself).
pub fn looping_rom() -> Vec<u8> {
    let mut rom = build_ines(1, 1, 0, 0);
    let prg = 0x10;
    for b in rom[prg..prg + PRG_CHUNK_SIZE].iter_mut() {
        *b = 0xEA; // NOP
    }
    // JMP $8000 at $8000
    rom[prg] = 0x4C;
    rom[prg + 1] = 0x00;
    rom[prg + 2] = 0x80;
    // reset vector at $FFFC (mirrored into the single 16 KiB chunk)
    rom[prg + PRG_CHUNK_SIZE - 4] = 0x00;
    rom[prg + PRG_CHUNK_SIZE - 3] = 0x80;
    rom
}
