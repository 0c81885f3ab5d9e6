use crate::rich::RichString;
use crate::xref::slots::Slotted;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Switch {
  pub name: RichString,
  /// 0-based; `None` until the switch is allocated a slot.
  pub index: Option<u32>,
}

impl Switch {
  pub fn named(name: impl Into<RichString>) -> Self {
    Self {
      name: name.into(),
      index: None,
    }
  }

  /// Only a switch with a non-empty name needs a names section entry.
  pub fn has_custom_name(&self) -> bool {
    self.name.is_custom()
  }

  pub fn at(index: u32) -> Self {
    Self {
      name: RichString::Null,
      index: Some(index),
    }
  }
}

impl Slotted for Switch {
  type Key = Vec<u8>;

  fn index(&self) -> Option<u32> {
    self.index
  }

  fn with_index(&self, index: u32) -> Self {
    Self {
      name: self.name.clone(),
      index: Some(index),
    }
  }

  /// Unnamed switches are only ever told apart by index.
  fn dedup_key(&self) -> Option<Vec<u8>> {
    self.name.to_bytes()
  }
}
