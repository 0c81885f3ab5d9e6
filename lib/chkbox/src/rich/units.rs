use crate::rich::RichString;

/// Per-unit overrides, hitpoints in whole points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitSetting {
  pub use_defaults: bool,
  pub hitpoints: f64,
  pub shields: u16,
  pub armor: u8,
  /// In game frames.
  pub build_time: u16,
  pub minerals: u16,
  pub gas: u16,
  pub name: RichString,
}

impl UnitSetting {
  pub(crate) fn hitpoints_from_wire(raw: u32) -> f64 {
    f64::from(raw) / 256.0
  }

  /// Rounds to the nearest 1/256 point and saturates at the wire range.
  pub(crate) fn hitpoints_to_wire(&self) -> u32 {
    (self.hitpoints * 256.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Weapon {
  pub base_damage: u16,
  pub upgrade_damage: u16,
}
