use crate::error::{ChkError, Entity, Result};
use crate::rich::Location;
use crate::section::{LocationRecord, LocationsSection, ANYWHERE_LOCATION};
use crate::xref::slots::{Allocation, SlotTable};
use crate::xref::StringLookup;

#[derive(Clone, Debug)]
pub struct LocationLookup {
  table: SlotTable<Location>,
}

impl LocationLookup {
  /// An empty table of `capacity` slots. Tables large enough to hold it keep the anywhere
  /// location out of allocation.
  pub fn empty(capacity: usize) -> Self {
    let table = SlotTable::new(Entity::Location, 1, capacity);
    let table = if capacity >= ANYWHERE_LOCATION as usize {
      table.reserving(ANYWHERE_LOCATION)
    } else {
      table
    };
    Self { table }
  }

  /// Every record becomes a location, unused ones included, so any id the section holds
  /// resolves.
  pub fn build(section: Option<&LocationsSection>, strings: &StringLookup) -> Result<Self> {
    let Some(section) = section else {
      return Ok(Self::empty(0));
    };

    let mut locations = Vec::with_capacity(section.locations.len());
    for (position, record) in section.locations.iter().enumerate() {
      let id = position as u32 + 1;
      let name = strings
        .get(u32::from(record.name))
        .ok_or_else(|| ChkError::unresolved(Entity::String, record.name))?;
      locations.push(Location::from_record(record, name.clone(), id));
    }

    let table = Self::empty(section.locations.len()).add(locations).finish()?;
    Ok(table.into())
  }

  /// A fresh table of `capacity` slots filled with `locations`, in order.
  pub fn rebuild(capacity: usize, locations: impl IntoIterator<Item = Location>) -> Result<Self> {
    Ok(Self::empty(capacity).add(locations).finish()?.into())
  }

  pub fn capacity(&self) -> usize {
    self.table.capacity()
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }

  pub fn get(&self, id: u32) -> Option<&Location> {
    self.table.get(id)
  }

  pub fn id_of(&self, location: &Location) -> Option<u32> {
    self.table.id_of(location)
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, &Location)> {
    self.table.iter()
  }

  pub fn add(&self, candidates: impl IntoIterator<Item = Location>) -> Allocation<Location> {
    self.table.add(candidates)
  }

  pub fn to_section(&self, strings: &StringLookup) -> Result<LocationsSection> {
    let mut locations = vec![LocationRecord::default(); self.capacity()];
    for (id, location) in self.iter() {
      let name = strings
        .id_of(&location.name)
        .ok_or_else(|| ChkError::unresolved(Entity::String, &location.name))?;
      let name =
        u16::try_from(name).map_err(|_| ChkError::capacity(Entity::String, u16::MAX as usize))?;
      locations[id as usize - 1] = location.to_record(name);
    }
    Ok(LocationsSection { locations })
  }
}

impl From<SlotTable<Location>> for LocationLookup {
  fn from(table: SlotTable<Location>) -> Self {
    Self { table }
  }
}
