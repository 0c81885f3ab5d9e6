use binrw::binrw;
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::section::{decode_records, encode_le, SectionKind};

pub const LOCATION_RECORD_SIZE: usize = 20;
pub const ORIGINAL_LOCATION_CAPACITY: usize = 64;
pub const EXPANSION_LOCATION_CAPACITY: usize = 255;
/// 1-based id of the location that always covers the whole map.
pub const ANYWHERE_LOCATION: u32 = 64;

#[bitfield]
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ElevationFlags {
  pub low_ground_disabled: bool,
  pub medium_ground_disabled: bool,
  pub high_ground_disabled: bool,
  pub low_air_disabled: bool,
  pub medium_air_disabled: bool,
  pub high_air_disabled: bool,
  #[skip]
  __: B10,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
  pub left: u32,
  pub top: u32,
  pub right: u32,
  pub bottom: u32,
  pub name: u16,
  pub elevation_flags: u16,
}

impl LocationRecord {
  pub fn is_unused(&self) -> bool {
    *self == LocationRecord::default()
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsSection {
  pub locations: Vec<LocationRecord>,
}

impl LocationsSection {
  pub fn decode(payload: &[u8]) -> Result<Self> {
    Ok(Self {
      locations: decode_records(SectionKind::Locations, payload, LOCATION_RECORD_SIZE)?,
    })
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    encode_le(SectionKind::Locations, &self.locations)
  }

  /// 1-based lookup.
  pub fn get(&self, id: u32) -> Option<&LocationRecord> {
    self.locations.get((id as usize).checked_sub(1)?)
  }
}
