use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;

use crate::error::Result;
use crate::rich::RichString;
use crate::section::StringTable;

/// Both directions between string ids and their text, over one string table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringLookup {
  table: StringTable,
  /// Indexed by `id - 1`. `None` where the offset points outside the string data.
  strings: Vec<Option<RichString>>,
  /// Keyed by the stored bytes, so runs that only read alike stay apart.
  ids: HashMap<Vec<u8>, u32>,
}

impl StringLookup {
  pub fn build(table: &StringTable) -> Self {
    let mut strings = Vec::with_capacity(table.count());
    let mut ids = HashMap::new();

    for (position, offset) in table.offsets.iter().enumerate() {
      let id = position as u32 + 1;
      let value = table.resolve(*offset).map(RichString::from_bytes);
      if let Some(bytes) = value.as_ref().and_then(RichString::to_bytes) {
        ids.entry(bytes).or_insert(id);
      }
      strings.push(value);
    }

    Self {
      table: table.clone(),
      strings,
      ids,
    }
  }

  pub fn table(&self) -> &StringTable {
    &self.table
  }

  pub fn len(&self) -> usize {
    self.strings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.strings.is_empty()
  }

  /// Id 0 is always `Null`.
  pub fn get(&self, id: u32) -> Option<&RichString> {
    match id {
      0 => Some(&RichString::Null),
      id => self.strings.get(id as usize - 1)?.as_ref(),
    }
  }

  /// The lowest id holding `value`. `Null` is always id 0.
  pub fn id_of(&self, value: &RichString) -> Option<u32> {
    match value.to_bytes() {
      None => Some(0),
      Some(bytes) => self.ids.get(&bytes).copied(),
    }
  }

  /// Appends every distinct text in `strings` that the table does not hold yet, in first-seen
  /// order. When nothing is new the lookup comes back unchanged.
  pub fn rebuild<'a>(&self, strings: impl IntoIterator<Item = &'a RichString>) -> Result<Self> {
    let new = strings
      .into_iter()
      .filter(|value| self.id_of(value).is_none())
      .filter_map(RichString::to_bytes)
      .collect::<IndexSet<_>>();

    if new.is_empty() {
      return Ok(self.clone());
    }

    debug!("appending {} strings to a table of {}", new.len(), self.len());
    let new = new.into_iter().collect::<Vec<_>>();
    Ok(Self::build(&self.table.with_appended(&new)?))
  }
}
