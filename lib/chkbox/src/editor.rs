//! Copy-on-write editing. Every editor leaves its receiver alone and returns the edited copy.

use crate::error::{ChkError, Entity, Result};
use crate::rich::{
  Location, Locations, RichChk, RichSection, RichString, Sounds, Switch, Switches, Triggers,
};
use crate::section::{SectionKind, SOUND_COUNT};
use crate::trigger::Trigger;

fn no_such(what: Entity, position: usize) -> ChkError {
  ChkError::NoSuchEntry { what, position }
}

/// Clones `items` and replaces the entry at `position`.
fn replaced<T: Clone>(items: &[T], what: Entity, position: usize, item: T) -> Result<Vec<T>> {
  let mut items = items.to_vec();
  let slot = items.get_mut(position).ok_or_else(|| no_such(what, position))?;
  *slot = item;
  Ok(items)
}

/// Clones `items` without the entry at `position`.
fn removed<T: Clone>(items: &[T], what: Entity, position: usize) -> Result<Vec<T>> {
  if position >= items.len() {
    return Err(no_such(what, position));
  }
  let mut items = items.to_vec();
  items.remove(position);
  Ok(items)
}

impl Triggers {
  pub fn with_trigger(&self, trigger: Trigger) -> Self {
    let mut triggers = self.triggers.clone();
    triggers.push(trigger);
    Self { triggers }
  }

  pub fn with_trigger_replaced(&self, position: usize, trigger: Trigger) -> Result<Self> {
    Ok(Self {
      triggers: replaced(&self.triggers, Entity::Trigger, position, trigger)?,
    })
  }

  pub fn without_trigger(&self, position: usize) -> Result<Self> {
    Ok(Self {
      triggers: removed(&self.triggers, Entity::Trigger, position)?,
    })
  }
}

impl Locations {
  /// Appends `location`. Without an index it is given one when the map is encoded.
  pub fn with_location(&self, location: Location) -> Self {
    let mut locations = self.locations.clone();
    locations.push(location);
    Self {
      capacity: self.capacity,
      locations,
    }
  }

  /// Replaces the location at `position`. An unindexed replacement takes over the old slot.
  pub fn with_location_replaced(&self, position: usize, location: Location) -> Result<Self> {
    let previous = self
      .locations
      .get(position)
      .ok_or_else(|| no_such(Entity::Location, position))?;
    let location = Location {
      index: location.index.or(previous.index),
      ..location
    };

    Ok(Self {
      capacity: self.capacity,
      locations: replaced(&self.locations, Entity::Location, position, location)?,
    })
  }

  pub fn without_location(&self, position: usize) -> Result<Self> {
    Ok(Self {
      capacity: self.capacity,
      locations: removed(&self.locations, Entity::Location, position)?,
    })
  }
}

impl Switches {
  pub fn with_switch(&self, switch: Switch) -> Self {
    let mut switches = self.switches.clone();
    switches.push(switch);
    Self { switches }
  }

  pub fn without_switch(&self, position: usize) -> Result<Self> {
    Ok(Self {
      switches: removed(&self.switches, Entity::Switch, position)?,
    })
  }
}

impl Sounds {
  /// Puts `sound` in the first free slot.
  pub fn with_sound(&self, sound: impl Into<RichString>) -> Result<Self> {
    let mut sounds = self.sounds.clone();
    let slot = sounds
      .iter_mut()
      .find(|slot| slot.is_null())
      .ok_or_else(|| ChkError::capacity(Entity::Sound, SOUND_COUNT))?;
    *slot = sound.into();
    Ok(Self { sounds })
  }

  /// Frees the slot at `position`; later sounds keep their slots.
  pub fn without_sound(&self, position: usize) -> Result<Self> {
    Ok(Self {
      sounds: replaced(&self.sounds, Entity::Sound, position, RichString::Null)?,
    })
  }
}

impl RichChk {
  pub fn with_section(&self, section: RichSection) -> Self {
    let mut sections = self.sections.clone();
    sections.push(section);
    Self { sections }
  }

  pub fn with_section_replaced(&self, position: usize, section: RichSection) -> Result<Self> {
    Ok(Self {
      sections: replaced(&self.sections, Entity::Section, position, section)?,
    })
  }

  /// Drops every section of `kind`. Dropping a kind the map does not have is a no-op.
  pub fn without_sections(&self, kind: SectionKind) -> Self {
    Self {
      sections: self
        .sections
        .iter()
        .filter(|section| section.kind() != kind)
        .cloned()
        .collect(),
    }
  }
}
