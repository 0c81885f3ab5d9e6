use indexmap::IndexSet;

use crate::rich::{CuwpSlot, Location, RichString, Switch};

/// Anything that can name strings, locations, switches or unit property slots.
pub trait References {
  fn references(&self, refs: &mut ReferenceSet);
}

/// Everything a rich model refers to, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceSet {
  pub strings: IndexSet<RichString>,
  pub locations: IndexSet<Location>,
  pub switches: IndexSet<Switch>,
  pub cuwp_slots: IndexSet<CuwpSlot>,
}

impl ReferenceSet {
  pub fn of(value: &impl References) -> Self {
    let mut refs = Self::default();
    value.references(&mut refs);
    refs
  }

  /// `Null` is never stored in a string table, so it is never collected.
  pub fn string(&mut self, value: &RichString) {
    if !value.is_null() {
      self.strings.insert(value.clone());
    }
  }

  pub fn location(&mut self, location: &Location) {
    self.string(&location.name);
    self.locations.insert(location.clone());
  }

  pub fn switch(&mut self, switch: &Switch) {
    self.string(&switch.name);
    self.switches.insert(switch.clone());
  }

  pub fn cuwp_slot(&mut self, slot: &CuwpSlot) {
    self.cuwp_slots.insert(slot.clone());
  }
}

impl<T: References> References for [T] {
  fn references(&self, refs: &mut ReferenceSet) {
    for item in self {
      item.references(refs);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collects_names_and_skips_null() {
    let mut refs = ReferenceSet::default();
    refs.location(&Location::new(0, 0, 32, 32, "Base"));
    refs.switch(&Switch::at(3));
    refs.switch(&Switch::named("Gate"));
    refs.string(&RichString::Null);
    refs.string(&RichString::from("Base"));

    assert_eq!(
      refs.strings.iter().cloned().collect::<Vec<_>>(),
      vec![RichString::from("Base"), RichString::from("Gate")]
    );
    assert_eq!(refs.locations.len(), 1);
    assert_eq!(refs.switches.len(), 2);
  }
}
