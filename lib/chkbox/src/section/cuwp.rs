use binrw::binrw;
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::section::{decode_exact, encode_le, expect_count, SectionKind};

pub const CUWP_SLOT_COUNT: usize = 64;
pub const CUWP_RECORD_SIZE: usize = 20;

/// Unit state toggles; the same layout is used for "which toggles are valid".
#[bitfield]
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CuwpStateFlags {
  pub cloaked: bool,
  pub burrowed: bool,
  pub in_transit: bool,
  pub hallucinated: bool,
  pub invincible: bool,
  #[skip]
  __: B11,
}

#[bitfield]
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CuwpPropertyFlags {
  pub owner: bool,
  pub hitpoints: bool,
  pub shields: bool,
  pub energy: bool,
  pub resource_amount: bool,
  pub hangar: bool,
  #[skip]
  __: B10,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuwpRecord {
  pub valid_state: u16,
  pub valid_properties: u16,
  pub owner: u8,
  pub hitpoints: u8,
  pub shields: u8,
  pub energy: u8,
  pub resource_amount: u32,
  pub hangar: u16,
  pub state: u16,
  pub unused: u32,
}

/// `UPRP`: the create-unit-with-properties templates.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuwpSlotsSection {
  #[br(count = CUWP_SLOT_COUNT)]
  pub slots: Vec<CuwpRecord>,
}

impl Default for CuwpSlotsSection {
  fn default() -> Self {
    Self {
      slots: vec![CuwpRecord::default(); CUWP_SLOT_COUNT],
    }
  }
}

impl CuwpSlotsSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(
      SectionKind::CuwpSlots,
      payload,
      CUWP_SLOT_COUNT * CUWP_RECORD_SIZE,
    )
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    expect_count(SectionKind::CuwpSlots, "slots", self.slots.len(), CUWP_SLOT_COUNT)?;
    encode_le(SectionKind::CuwpSlots, self)
  }
}

/// `UPUS`: non-zero marks the matching `UPRP` slot as in use.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuwpUsageSection {
  #[br(count = CUWP_SLOT_COUNT)]
  pub used: Vec<u8>,
}

impl Default for CuwpUsageSection {
  fn default() -> Self {
    Self {
      used: vec![0; CUWP_SLOT_COUNT],
    }
  }
}

impl CuwpUsageSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::CuwpUsage, payload, CUWP_SLOT_COUNT)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    expect_count(SectionKind::CuwpUsage, "used", self.used.len(), CUWP_SLOT_COUNT)?;
    encode_le(SectionKind::CuwpUsage, self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_slots() {
    let mut payload = vec![0u8; CUWP_SLOT_COUNT * CUWP_RECORD_SIZE];
    // slot 1: hitpoints valid, 50% hitpoints, invincible
    payload[2] = 0b10;
    payload[5] = 50;
    payload[14] = 0b1_0000;

    let section = CuwpSlotsSection::decode(&payload).unwrap();
    let slot = &section.slots[0];
    assert!(CuwpPropertyFlags::from(slot.valid_properties).hitpoints());
    assert_eq!(slot.hitpoints, 50);
    assert!(CuwpStateFlags::from(slot.state).invincible());
    assert_eq!(section.encode().unwrap(), payload);
  }

  #[test]
  fn round_trips_usage() {
    let mut payload = vec![0u8; CUWP_SLOT_COUNT];
    payload[63] = 1;
    let section = CuwpUsageSection::decode(&payload).unwrap();
    assert_eq!(section.used[63], 1);
    assert_eq!(section.encode().unwrap(), payload);
    assert!(CuwpUsageSection::decode(&payload[1..]).is_err());
  }
}
