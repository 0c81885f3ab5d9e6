use binrw::binrw;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::section::{decode_exact, encode_le, expect_count, SectionKind};

pub const SWITCH_COUNT: usize = 256;

/// `SWNM`: one string id per switch, 0 for switches without a custom name.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchNamesSection {
  #[br(count = SWITCH_COUNT)]
  pub names: Vec<u32>,
}

impl Default for SwitchNamesSection {
  fn default() -> Self {
    Self {
      names: vec![0; SWITCH_COUNT],
    }
  }
}

impl SwitchNamesSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    decode_exact(SectionKind::SwitchNames, payload, SWITCH_COUNT * 4)
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    expect_count(SectionKind::SwitchNames, "names", self.names.len(), SWITCH_COUNT)?;
    encode_le(SectionKind::SwitchNames, self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips() {
    let mut payload = vec![0u8; SWITCH_COUNT * 4];
    payload[4] = 7;
    let section = SwitchNamesSection::decode(&payload).unwrap();
    assert_eq!(section.names[1], 7);
    assert_eq!(section.encode().unwrap(), payload);
  }

  #[test]
  fn every_slot_is_always_written() {
    let mut section = SwitchNamesSection::default();
    assert_eq!(section.encode().unwrap().len(), SWITCH_COUNT * 4);

    section.names.pop();
    assert!(section.encode().is_err());
    assert!(SwitchNamesSection::decode(&[0u8; 8]).is_err());
  }
}
