use binrw::binrw;
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::section::{decode_exact, encode_le, expect_count, SectionKind};

pub const SOUND_COUNT: usize = 512;
pub const FORCE_COUNT: usize = 4;
pub const FORCE_PLAYER_COUNT: usize = 8;

/// `VER `: the format revision.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSection {
  pub version: u16,
}

impl VersionSection {
  pub const ORIGINAL: u16 = 59;
  pub const EXPANSION: u16 = 63;

  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::Version, payload, 2)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    encode_le(SectionKind::Version, self)
  }

  pub fn is_expansion(&self) -> bool {
    self.version >= Self::EXPANSION
  }
}

/// `WAV `: string ids of every sound file packaged with the map.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundsSection {
  #[br(count = SOUND_COUNT)]
  pub sounds: Vec<u32>,
}

impl SoundsSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::Sounds, payload, SOUND_COUNT * 4)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    expect_count(SectionKind::Sounds, "sounds", self.sounds.len(), SOUND_COUNT)?;
    encode_le(SectionKind::Sounds, self)
  }
}

/// `SPRP`: scenario name and description string ids.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPropertiesSection {
  pub name: u16,
  pub description: u16,
}

impl ScenarioPropertiesSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::ScenarioProperties, payload, 4)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    encode_le(SectionKind::ScenarioProperties, self)
  }
}

#[bitfield]
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ForceFlags {
  pub random_start_location: bool,
  pub allies: bool,
  pub allied_victory: bool,
  pub shared_vision: bool,
  #[skip]
  __: B4,
}

/// `FORC`: which force each player starts in, plus the force names and flags.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcesSection {
  pub player_forces: [u8; FORCE_PLAYER_COUNT],
  pub names: [u16; FORCE_COUNT],
  pub flags: [u8; FORCE_COUNT],
}

impl ForcesSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::Forces, payload, 20)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    encode_le(SectionKind::Forces, self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_round_trips() {
    let section = VersionSection::decode(&[205, 0]).unwrap();
    assert_eq!(section.version, 205);
    assert!(section.is_expansion());
    assert_eq!(section.encode().unwrap(), vec![205, 0]);
    assert!(VersionSection::decode(&[205]).is_err());
  }

  #[test]
  fn forces_round_trip() {
    let payload = [
      0, 0, 1, 1, 2, 2, 3, 3, // players
      1, 0, 2, 0, 3, 0, 4, 0, // names
      0b1111, 0b0010, 0, 0, // flags
    ];
    let forces = ForcesSection::decode(&payload).unwrap();
    assert_eq!(forces.names, [1, 2, 3, 4]);
    let flags = ForceFlags::from(forces.flags[0]);
    assert!(flags.random_start_location() && flags.shared_vision());
    assert!(ForceFlags::from(forces.flags[1]).allies());
    assert_eq!(forces.encode().unwrap(), payload);
  }

  #[test]
  fn sounds_and_properties_round_trip() {
    let mut payload = vec![0u8; SOUND_COUNT * 4];
    payload[8] = 5;
    let sounds = SoundsSection::decode(&payload).unwrap();
    assert_eq!(sounds.sounds[2], 5);
    assert_eq!(sounds.encode().unwrap(), payload);

    let properties = ScenarioPropertiesSection::decode(&[1, 0, 2, 0]).unwrap();
    assert_eq!((properties.name, properties.description), (1, 2));
    assert_eq!(properties.encode().unwrap(), vec![1, 0, 2, 0]);
  }
}
