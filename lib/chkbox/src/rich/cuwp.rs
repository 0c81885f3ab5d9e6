use crate::section::{CuwpPropertyFlags, CuwpRecord, CuwpStateFlags};
use crate::xref::slots::Slotted;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitState {
  pub cloaked: bool,
  pub burrowed: bool,
  pub in_transit: bool,
  pub hallucinated: bool,
  pub invincible: bool,
}

impl UnitState {
  fn from_bits(bits: u16) -> Self {
    let flags = CuwpStateFlags::from(bits);
    Self {
      cloaked: flags.cloaked(),
      burrowed: flags.burrowed(),
      in_transit: flags.in_transit(),
      hallucinated: flags.hallucinated(),
      invincible: flags.invincible(),
    }
  }

  fn to_bits(self) -> u16 {
    CuwpStateFlags::new()
      .with_cloaked(self.cloaked)
      .with_burrowed(self.burrowed)
      .with_in_transit(self.in_transit)
      .with_hallucinated(self.hallucinated)
      .with_invincible(self.invincible)
      .into()
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValidProperties {
  pub owner: bool,
  pub hitpoints: bool,
  pub shields: bool,
  pub energy: bool,
  pub resource_amount: bool,
  pub hangar: bool,
}

impl ValidProperties {
  fn from_bits(bits: u16) -> Self {
    let flags = CuwpPropertyFlags::from(bits);
    Self {
      owner: flags.owner(),
      hitpoints: flags.hitpoints(),
      shields: flags.shields(),
      energy: flags.energy(),
      resource_amount: flags.resource_amount(),
      hangar: flags.hangar(),
    }
  }

  fn to_bits(self) -> u16 {
    CuwpPropertyFlags::new()
      .with_owner(self.owner)
      .with_hitpoints(self.hitpoints)
      .with_shields(self.shields)
      .with_energy(self.energy)
      .with_resource_amount(self.resource_amount)
      .with_hangar(self.hangar)
      .into()
  }
}

/// A create-unit-with-properties template. Structural equality includes `index`; use
/// [`CuwpSlot::template`] to compare templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CuwpSlot {
  /// Percentages, 0-100.
  pub hitpoints: u8,
  pub shields: u8,
  pub energy: u8,
  pub resource_amount: u32,
  pub hangar: u16,
  pub state: UnitState,
  /// Which of the `state` toggles apply.
  pub valid_state: UnitState,
  /// Which of the numeric properties apply.
  pub valid_properties: ValidProperties,
  /// 1-based; `None` until the template is allocated a slot.
  pub index: Option<u32>,
}

impl CuwpSlot {
  pub fn template(&self) -> CuwpSlot {
    Self {
      index: None,
      ..self.clone()
    }
  }

  pub(crate) fn from_record(record: &CuwpRecord, index: u32) -> Self {
    Self {
      hitpoints: record.hitpoints,
      shields: record.shields,
      energy: record.energy,
      resource_amount: record.resource_amount,
      hangar: record.hangar,
      state: UnitState::from_bits(record.state),
      valid_state: UnitState::from_bits(record.valid_state),
      valid_properties: ValidProperties::from_bits(record.valid_properties),
      index: Some(index),
    }
  }

  /// The owner byte and the trailing padding are always written as zero.
  pub(crate) fn to_record(&self) -> CuwpRecord {
    CuwpRecord {
      valid_state: self.valid_state.to_bits(),
      valid_properties: self.valid_properties.to_bits(),
      owner: 0,
      hitpoints: self.hitpoints,
      shields: self.shields,
      energy: self.energy,
      resource_amount: self.resource_amount,
      hangar: self.hangar,
      state: self.state.to_bits(),
      unused: 0,
    }
  }

  pub fn is_blank(&self) -> bool {
    self.template() == CuwpSlot::default()
  }
}

impl Slotted for CuwpSlot {
  type Key = CuwpSlot;

  fn index(&self) -> Option<u32> {
    self.index
  }

  fn with_index(&self, index: u32) -> Self {
    Self {
      index: Some(index),
      ..self.clone()
    }
  }

  fn dedup_key(&self) -> Option<CuwpSlot> {
    Some(self.template())
  }
}
