use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::apu::serialize::ApuData;
use crate::cartridge::serialize::MapperData;
use crate::cpu::serialize::CpuData;
use crate::ppu::serialize::PpuData;

/// A complete machine snapshot. Everything needed to resume is here except
/// the ROM itself, so a state only makes sense with the cartridge it came
/// from.
#[derive(Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub cpu: CpuData,
    pub ppu: PpuData,
    pub apu: ApuData,
    pub mapper: MapperData,
}

impl SaveState {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }

    pub fn from_json(serialized: &str) -> Result<Self, String> {
        serde_json::from_str(serialized).map_err(|e| e.to_string())
    }

    /// Writes the state next to the given path, going through a temporary
    /// file and a rename so a crash mid-write can't truncate an existing
    /// save.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let serialized = self.to_json()?;
        let mut tmp = path.to_path_buf();
        let mut file_name = tmp
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| format!("bad save state path: {:?}", path))?;
        file_name.push(".tmp");
        tmp.set_file_name(file_name);
        {
            let mut f = File::create(&tmp).map_err(|e| e.to_string())?;
            f.write_all(serialized.as_bytes())
                .map_err(|e| e.to_string())?;
            f.sync_all().map_err(|e| e.to_string())?;
        }
        std::fs::rename(&tmp, path).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(format!("no save state file at {:?}", path));
        }
        let mut f = File::open(path).map_err(|e| e.to_string())?;
        let mut serialized = String::new();
        f.read_to_string(&mut serialized)
            .map_err(|e| e.to_string())?;
        SaveState::from_json(&serialized)
    }
}
