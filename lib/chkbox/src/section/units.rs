use std::io::Cursor;

use binrw::{binrw, BinRead};
use serde::{Deserialize, Serialize};

use crate::error::{ChkError, Result};
use crate::section::{encode_le, expect_count, SectionKind};

pub const UNIT_COUNT: usize = 228;
pub const ORIGINAL_WEAPON_COUNT: usize = 100;
pub const EXPANSION_WEAPON_COUNT: usize = 130;

const fn unit_settings_size(weapons: usize) -> usize {
  UNIT_COUNT * (1 + 4 + 2 + 1 + 2 + 2 + 2 + 2) + weapons * (2 + 2)
}

/// `UNIS` / `UNIx`: per-unit overrides stored as parallel arrays. Hitpoints carry 8 fractional
/// bits.
#[binrw]
#[brw(little)]
#[br(import(weapons: usize))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSettingsSection {
  #[br(count = UNIT_COUNT)]
  pub use_defaults: Vec<u8>,
  #[br(count = UNIT_COUNT)]
  pub hitpoints: Vec<u32>,
  #[br(count = UNIT_COUNT)]
  pub shields: Vec<u16>,
  #[br(count = UNIT_COUNT)]
  pub armor: Vec<u8>,
  #[br(count = UNIT_COUNT)]
  pub build_time: Vec<u16>,
  #[br(count = UNIT_COUNT)]
  pub minerals: Vec<u16>,
  #[br(count = UNIT_COUNT)]
  pub gas: Vec<u16>,
  #[br(count = UNIT_COUNT)]
  pub names: Vec<u16>,
  #[br(count = weapons)]
  pub base_damage: Vec<u16>,
  #[br(count = weapons)]
  pub upgrade_damage: Vec<u16>,
}

impl UnitSettingsSection {
  pub fn is_expansion(&self) -> bool {
    self.base_damage.len() == EXPANSION_WEAPON_COUNT
  }

  pub fn kind(&self) -> SectionKind {
    if self.is_expansion() {
      SectionKind::ExpansionUnitSettings
    } else {
      SectionKind::UnitSettings
    }
  }

  pub fn decode(payload: &[u8], expansion: bool) -> Result<Self> {
    let (kind, weapons) = if expansion {
      (SectionKind::ExpansionUnitSettings, EXPANSION_WEAPON_COUNT)
    } else {
      (SectionKind::UnitSettings, ORIGINAL_WEAPON_COUNT)
    };

    let expected = unit_settings_size(weapons);
    if payload.len() != expected {
      return Err(ChkError::malformed(
        kind,
        format!("expected {expected} bytes, found {}", payload.len()),
      ));
    }

    Self::read_le_args(&mut Cursor::new(payload), (weapons,))
      .map_err(|err| ChkError::malformed(kind, err.to_string()))
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    let kind = self.kind();
    let weapons = if self.is_expansion() {
      EXPANSION_WEAPON_COUNT
    } else {
      ORIGINAL_WEAPON_COUNT
    };

    for (field, len) in [
      ("use_defaults", self.use_defaults.len()),
      ("hitpoints", self.hitpoints.len()),
      ("shields", self.shields.len()),
      ("armor", self.armor.len()),
      ("build_time", self.build_time.len()),
      ("minerals", self.minerals.len()),
      ("gas", self.gas.len()),
      ("names", self.names.len()),
    ] {
      expect_count(kind, field, len, UNIT_COUNT)?;
    }
    expect_count(kind, "base_damage", self.base_damage.len(), weapons)?;
    expect_count(kind, "upgrade_damage", self.upgrade_damage.len(), weapons)?;

    encode_le(kind, self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sizes_match_the_format() {
    assert_eq!(unit_settings_size(ORIGINAL_WEAPON_COUNT), 4048);
    assert_eq!(unit_settings_size(EXPANSION_WEAPON_COUNT), 4168);
  }

  #[test]
  fn round_trips_both_variants() {
    for expansion in [false, true] {
      let weapons = if expansion { 130 } else { 100 };
      let mut payload = vec![0u8; unit_settings_size(weapons)];
      // first unit: 40 hitpoints, second unit uses defaults
      payload[UNIT_COUNT..UNIT_COUNT + 4].copy_from_slice(&(40u32 << 8).to_le_bytes());
      payload[1] = 1;
      let last = payload.len() - 1;
      payload[last] = 2;

      let section = UnitSettingsSection::decode(&payload, expansion).unwrap();
      assert_eq!(section.is_expansion(), expansion);
      assert_eq!(section.hitpoints[0], 40 * 256);
      assert_eq!(section.use_defaults[1], 1);
      assert_eq!(section.upgrade_damage[weapons - 1], 512);
      assert_eq!(section.encode().unwrap(), payload);
    }
  }

  #[test]
  fn rejects_the_wrong_variant_size() {
    let payload = vec![0u8; unit_settings_size(ORIGINAL_WEAPON_COUNT)];
    assert!(UnitSettingsSection::decode(&payload, true).is_err());
  }
}
