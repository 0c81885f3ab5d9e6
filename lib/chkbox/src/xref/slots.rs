use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{trace, warn};

use crate::error::{ChkError, Entity, Result};

/// A value that lives in a numbered slot of one of the map's fixed-size tables.
pub trait Slotted: Clone + Debug + Eq + Hash {
  type Key: Clone + Debug + Eq + Hash;

  fn index(&self) -> Option<u32>;

  fn with_index(&self, index: u32) -> Self;

  /// Two values with the same key name the same entry. `None` matches nothing.
  fn dedup_key(&self) -> Option<Self::Key>;
}

/// Slots numbered `first..first + capacity`, some of which may be reserved so that allocation
/// never hands them out.
#[derive(Clone, Debug)]
pub struct SlotTable<T: Slotted> {
  what: Entity,
  first: u32,
  slots: Vec<Option<T>>,
  reserved: Vec<u32>,
  aliases: HashMap<T, u32>,
  keys: HashMap<T::Key, u32>,
}

/// The result of offering candidates to a [`SlotTable`]. The original table is untouched.
#[derive(Clone, Debug)]
pub struct Allocation<T: Slotted> {
  pub table: SlotTable<T>,
  /// Every accepted candidate, as offered, with the id it resolved to.
  pub assigned: Vec<(T, u32)>,
  /// Pre-indexed candidates whose slot was out of range or held something else.
  pub rejected: Vec<T>,
  /// Candidates left over once every free slot was taken.
  pub overflow: Vec<T>,
}

impl<T: Slotted> Allocation<T> {
  pub fn finish(self) -> Result<SlotTable<T>> {
    if !self.overflow.is_empty() {
      return Err(ChkError::capacity(self.table.what, self.table.capacity()));
    }
    Ok(self.table)
  }
}

impl<T: Slotted> SlotTable<T> {
  pub fn new(what: Entity, first: u32, capacity: usize) -> Self {
    Self {
      what,
      first,
      slots: vec![None; capacity],
      reserved: Vec::new(),
      aliases: HashMap::new(),
      keys: HashMap::new(),
    }
  }

  /// Keeps `id` out of allocation. Values may still be placed there explicitly.
  pub fn reserving(mut self, id: u32) -> Self {
    if self.position(id).is_some() && !self.reserved.contains(&id) {
      self.reserved.push(id);
    }
    self
  }

  pub fn what(&self) -> Entity {
    self.what
  }

  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  pub fn first(&self) -> u32 {
    self.first
  }

  /// Number of occupied slots.
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.iter().all(Option::is_none)
  }

  pub fn get(&self, id: u32) -> Option<&T> {
    self.slots.get(self.position(id)?)?.as_ref()
  }

  pub fn is_occupied(&self, id: u32) -> bool {
    self.get(id).is_some()
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
    self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(position, slot)| Some((self.first + position as u32, slot.as_ref()?)))
  }

  /// Finds the id a value was stored under: the exact value first, then its key, and finally
  /// whatever now occupies the value's own index.
  pub fn id_of(&self, value: &T) -> Option<u32> {
    if let Some(id) = self.aliases.get(value) {
      return Some(*id);
    }
    if let Some(id) = value.dedup_key().and_then(|key| self.keys.get(&key)) {
      return Some(*id);
    }
    value.index().filter(|id| self.is_occupied(*id))
  }

  /// Offers every candidate. Pre-indexed candidates go first, each to its own slot if that is
  /// free; the rest then reuse a matching entry or take the lowest free, unreserved slot.
  pub fn add(&self, candidates: impl IntoIterator<Item = T>) -> Allocation<T> {
    let mut allocation = Allocation {
      table: self.clone(),
      assigned: Vec::new(),
      rejected: Vec::new(),
      overflow: Vec::new(),
    };

    let (indexed, unindexed): (Vec<_>, Vec<_>) = candidates
      .into_iter()
      .partition(|candidate| candidate.index().is_some());

    for candidate in indexed.into_iter().chain(unindexed) {
      let outcome = match candidate.index() {
        Some(id) => allocation.table.place(&candidate, id),
        None => allocation.table.allocate(&candidate),
      };

      match outcome {
        Outcome::Assigned(id) => allocation.assigned.push((candidate, id)),
        Outcome::Rejected => allocation.rejected.push(candidate),
        Outcome::Full => allocation.overflow.push(candidate),
      }
    }

    allocation
  }

  fn position(&self, id: u32) -> Option<usize> {
    let position = id.checked_sub(self.first)? as usize;
    (position < self.slots.len()).then_some(position)
  }

  fn place(&mut self, value: &T, id: u32) -> Outcome {
    let Some(position) = self.position(id) else {
      warn!(
        "{} {id} is outside the table ({} slots from {}), dropping it",
        self.what,
        self.capacity(),
        self.first
      );
      return Outcome::Rejected;
    };

    match &self.slots[position] {
      Some(existing) if existing == value => Outcome::Assigned(id),
      Some(existing) => {
        warn!(
          "{} {id} is already taken by {existing:?}, dropping {value:?}",
          self.what
        );
        Outcome::Rejected
      }
      None => {
        self.insert(id, position, value.clone(), value);
        Outcome::Assigned(id)
      }
    }
  }

  fn allocate(&mut self, value: &T) -> Outcome {
    if let Some(id) = self.aliases.get(value) {
      return Outcome::Assigned(*id);
    }

    if let Some(id) = value.dedup_key().and_then(|key| self.keys.get(&key).copied()) {
      self.aliases.insert(value.clone(), id);
      return Outcome::Assigned(id);
    }

    let free = (0..self.slots.len()).find(|position| {
      self.slots[*position].is_none() && !self.reserved.contains(&(self.first + *position as u32))
    });

    match free {
      Some(position) => {
        let id = self.first + position as u32;
        self.insert(id, position, value.with_index(id), value);
        Outcome::Assigned(id)
      }
      None => Outcome::Full,
    }
  }

  fn insert(&mut self, id: u32, position: usize, stored: T, offered: &T) {
    trace!("{} {id} <- {stored:?}", self.what);
    if let Some(key) = stored.dedup_key() {
      self.keys.entry(key).or_insert(id);
    }
    self.aliases.insert(offered.clone(), id);
    self.aliases.insert(stored.clone(), id);
    self.slots[position] = Some(stored);
  }
}

enum Outcome {
  Assigned(u32),
  Rejected,
  Full,
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_log::test;

  #[derive(Clone, Debug, PartialEq, Eq, Hash)]
  struct Entry {
    value: u32,
    index: Option<u32>,
  }

  fn entry(value: u32, index: Option<u32>) -> Entry {
    Entry { value, index }
  }

  impl Slotted for Entry {
    type Key = u32;

    fn index(&self) -> Option<u32> {
      self.index
    }

    fn with_index(&self, index: u32) -> Self {
      entry(self.value, Some(index))
    }

    fn dedup_key(&self) -> Option<u32> {
      Some(self.value)
    }
  }

  #[test]
  fn allocates_lowest_free_and_skips_reserved() {
    let table = SlotTable::new(Entity::Location, 1, 4).reserving(2);
    let allocation = table.add([entry(10, None), entry(20, None), entry(30, None)]);

    assert_eq!(
      allocation.assigned.iter().map(|(_, id)| *id).collect::<Vec<_>>(),
      vec![1, 3, 4]
    );
    assert!(allocation.overflow.is_empty());
    assert!(table.is_empty());

    let table = allocation.finish().unwrap();
    assert_eq!(table.get(3), Some(&entry(20, Some(3))));
    assert_eq!(table.get(2), None);
    assert_eq!(table.id_of(&entry(30, None)), Some(4));
  }

  #[test]
  fn equal_candidates_share_a_slot() {
    let table = SlotTable::new(Entity::CuwpSlot, 1, 4);
    let allocation = table.add([entry(7, None), entry(7, None), entry(7, Some(9))]);

    // the last one is pre-indexed out of range
    assert_eq!(allocation.assigned.len(), 2);
    assert_eq!(allocation.rejected, vec![entry(7, Some(9))]);
    assert_eq!(allocation.table.len(), 1);
  }

  #[test]
  fn indexed_collisions_keep_the_existing_entry() {
    let table = SlotTable::new(Entity::Switch, 0, 8)
      .add([entry(1, Some(3))])
      .finish()
      .unwrap();

    let allocation = table.add([entry(2, Some(3)), entry(1, Some(3)), entry(3, Some(0))]);
    assert_eq!(allocation.rejected, vec![entry(2, Some(3))]);
    assert_eq!(allocation.table.get(3), Some(&entry(1, Some(3))));
    assert_eq!(allocation.table.get(0), Some(&entry(3, Some(0))));

    // a stale copy of index 3 still resolves to whatever holds it
    assert_eq!(allocation.table.id_of(&entry(2, Some(3))), Some(3));
  }

  #[test]
  fn overflow_is_a_capacity_error() {
    let table = SlotTable::new(Entity::CuwpSlot, 1, 2);
    let allocation = table.add((0..3).map(|value| entry(value, None)));
    assert_eq!(allocation.overflow, vec![entry(2, None)]);
    assert_eq!(allocation.table.len(), 2);
    assert!(matches!(
      allocation.finish(),
      Err(ChkError::CapacityExceeded {
        what: Entity::CuwpSlot,
        capacity: 2
      })
    ));
  }
}
