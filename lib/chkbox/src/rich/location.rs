use crate::rich::RichString;
use crate::section::{ElevationFlags, LocationRecord};
use crate::xref::slots::Slotted;

/// Which terrain levels a location reaches. A cleared bit on the wire means "enabled".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Elevation {
  pub low_ground: bool,
  pub medium_ground: bool,
  pub high_ground: bool,
  pub low_air: bool,
  pub medium_air: bool,
  pub high_air: bool,
}

impl Default for Elevation {
  fn default() -> Self {
    Self::from_flags(0)
  }
}

impl Elevation {
  pub fn from_flags(flags: u16) -> Self {
    let flags = ElevationFlags::from(flags);
    Self {
      low_ground: !flags.low_ground_disabled(),
      medium_ground: !flags.medium_ground_disabled(),
      high_ground: !flags.high_ground_disabled(),
      low_air: !flags.low_air_disabled(),
      medium_air: !flags.medium_air_disabled(),
      high_air: !flags.high_air_disabled(),
    }
  }

  pub fn to_flags(self) -> u16 {
    ElevationFlags::new()
      .with_low_ground_disabled(!self.low_ground)
      .with_medium_ground_disabled(!self.medium_ground)
      .with_high_ground_disabled(!self.high_ground)
      .with_low_air_disabled(!self.low_air)
      .with_medium_air_disabled(!self.medium_air)
      .with_high_air_disabled(!self.high_air)
      .into()
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
  pub left: u32,
  pub top: u32,
  pub right: u32,
  pub bottom: u32,
  pub name: RichString,
  pub elevation: Elevation,
  /// 1-based; `None` until the location is allocated a slot.
  pub index: Option<u32>,
}

impl Location {
  pub fn new(left: u32, top: u32, right: u32, bottom: u32, name: impl Into<RichString>) -> Self {
    Self {
      left,
      top,
      right,
      bottom,
      name: name.into(),
      ..Self::default()
    }
  }

  pub(crate) fn from_record(record: &LocationRecord, name: RichString, index: u32) -> Self {
    Self {
      left: record.left,
      top: record.top,
      right: record.right,
      bottom: record.bottom,
      name,
      elevation: Elevation::from_flags(record.elevation_flags),
      index: Some(index),
    }
  }

  pub(crate) fn to_record(&self, name: u16) -> LocationRecord {
    LocationRecord {
      left: self.left,
      top: self.top,
      right: self.right,
      bottom: self.bottom,
      name,
      elevation_flags: self.elevation.to_flags(),
    }
  }

  /// The location with its index dropped: what two locations must share to be the same place.
  pub fn unindexed(&self) -> Self {
    Self {
      index: None,
      ..self.clone()
    }
  }

  /// An all-zero record on the wire.
  pub fn is_unused(&self) -> bool {
    self.left == 0
      && self.top == 0
      && self.right == 0
      && self.bottom == 0
      && self.name.is_null()
      && self.elevation == Elevation::default()
  }
}

impl Slotted for Location {
  type Key = Location;

  fn index(&self) -> Option<u32> {
    self.index
  }

  fn with_index(&self, index: u32) -> Self {
    Self {
      index: Some(index),
      ..self.clone()
    }
  }

  fn dedup_key(&self) -> Option<Location> {
    Some(self.unindexed())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn elevation_flags_invert_exactly() {
    let elevation = Elevation::from_flags(21);
    assert_eq!(
      elevation,
      Elevation {
        low_ground: false,
        medium_ground: true,
        high_ground: false,
        low_air: true,
        medium_air: false,
        high_air: true,
      }
    );
    assert_eq!(elevation.to_flags(), 21);
    assert_eq!(Elevation::default().to_flags(), 0);
  }

  #[test]
  fn dedup_ignores_the_index() {
    let a = Location::new(0, 0, 32, 32, "Base").with_index(3);
    let b = Location::new(0, 0, 32, 32, "Base");
    assert_ne!(a, b);
    assert_eq!(a.dedup_key(), b.dedup_key());
  }
}
