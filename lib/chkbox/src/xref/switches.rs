use crate::error::{ChkError, Entity, Result};
use crate::rich::Switch;
use crate::section::{SwitchNamesSection, SWITCH_COUNT};
use crate::xref::slots::{Allocation, SlotTable};
use crate::xref::StringLookup;

#[derive(Clone, Debug)]
pub struct SwitchLookup {
  table: SlotTable<Switch>,
}

impl SwitchLookup {
  pub fn empty() -> Self {
    Self {
      table: SlotTable::new(Entity::Switch, 0, SWITCH_COUNT),
    }
  }

  /// All 256 switches, named from `section` when there is one.
  pub fn build(section: Option<&SwitchNamesSection>, strings: &StringLookup) -> Result<Self> {
    let mut switches = Vec::with_capacity(SWITCH_COUNT);
    for index in 0..SWITCH_COUNT as u32 {
      let id = section.map_or(0, |section| section.names[index as usize]);
      let name = strings
        .get(id)
        .ok_or_else(|| ChkError::unresolved(Entity::String, id))?;
      switches.push(Switch {
        name: name.clone(),
        index: Some(index),
      });
    }

    Self::rebuild(switches)
  }

  /// A fresh table holding `switches`, in order. Pre-indexed switches keep their slot when it
  /// is free; the others take the lowest free one.
  pub fn rebuild(switches: impl IntoIterator<Item = Switch>) -> Result<Self> {
    Ok(Self::empty().add(switches).finish()?.into())
  }

  pub fn get(&self, index: u32) -> Option<&Switch> {
    self.table.get(index)
  }

  pub fn id_of(&self, switch: &Switch) -> Option<u32> {
    self.table.id_of(switch)
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, &Switch)> {
    self.table.iter()
  }

  pub fn add(&self, candidates: impl IntoIterator<Item = Switch>) -> Allocation<Switch> {
    self.table.add(candidates)
  }

  /// Whether any switch carries a non-empty name, i.e. whether a names section is worth
  /// writing.
  pub fn has_names(&self) -> bool {
    self.iter().any(|(_, switch)| switch.has_custom_name())
  }

  pub fn to_section(&self, strings: &StringLookup) -> Result<SwitchNamesSection> {
    let mut section = SwitchNamesSection::default();
    for (index, switch) in self.iter() {
      if !switch.has_custom_name() {
        continue;
      }
      section.names[index as usize] = strings
        .id_of(&switch.name)
        .ok_or_else(|| ChkError::unresolved(Entity::String, &switch.name))?;
    }
    Ok(section)
  }
}

impl From<SlotTable<Switch>> for SwitchLookup {
  fn from(table: SlotTable<Switch>) -> Self {
    Self { table }
  }
}
