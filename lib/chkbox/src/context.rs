//! The lookups the rich model is decoded against and encoded through.

use std::sync::Arc;

use log::warn;

use crate::error::{ChkError, Entity, Result};
use crate::rich::{CuwpSlot, Location, RichString, Switch};
use crate::xref::{CuwpLookup, LocationLookup, StringLookup, SwitchLookup};

/// Knows how long the sound files packaged with a map play for.
pub trait AudioMetadata: Send + Sync {
  /// `None` when the file is unknown or unreadable.
  fn duration_ms(&self, path: &str) -> Option<u32>;
}

/// Read-only snapshot of the four lookups, built once per decoded file.
#[derive(Clone, Debug)]
pub struct DecodeContext {
  pub strings: StringLookup,
  pub locations: LocationLookup,
  pub switches: SwitchLookup,
  pub cuwp: CuwpLookup,
}

impl DecodeContext {
  pub fn string(&self, id: u32) -> Result<RichString> {
    self
      .strings
      .get(id)
      .cloned()
      .ok_or_else(|| ChkError::unresolved(Entity::String, id))
  }

  pub fn location(&self, id: u32) -> Result<Location> {
    self
      .locations
      .get(id)
      .cloned()
      .ok_or_else(|| ChkError::unresolved(Entity::Location, id))
  }

  /// Location 0 is "no location".
  pub fn optional_location(&self, id: u32) -> Result<Option<Location>> {
    match id {
      0 => Ok(None),
      id => self.location(id).map(Some),
    }
  }

  pub fn switch(&self, index: u32) -> Result<Switch> {
    self
      .switches
      .get(index)
      .cloned()
      .ok_or_else(|| ChkError::unresolved(Entity::Switch, index))
  }

  pub fn cuwp_slot(&self, id: u32) -> Result<CuwpSlot> {
    self
      .cuwp
      .get(id)
      .cloned()
      .ok_or_else(|| ChkError::unresolved(Entity::CuwpSlot, id))
  }
}

/// The rebuilt lookups, which hold an id for every value the rich model refers to.
#[derive(Clone)]
pub struct EncodeContext {
  pub strings: StringLookup,
  pub locations: LocationLookup,
  pub switches: SwitchLookup,
  pub cuwp: CuwpLookup,
  pub audio: Option<Arc<dyn AudioMetadata>>,
}

impl EncodeContext {
  pub fn string_id(&self, value: &RichString) -> Result<u32> {
    self
      .strings
      .id_of(value)
      .ok_or_else(|| ChkError::unresolved(Entity::String, value))
  }

  /// For the 16-bit string fields.
  pub fn short_string_id(&self, value: &RichString) -> Result<u16> {
    let id = self.string_id(value)?;
    u16::try_from(id).map_err(|_| ChkError::capacity(Entity::String, u16::MAX as usize))
  }

  pub fn location_id(&self, location: &Location) -> Result<u32> {
    self
      .locations
      .id_of(location)
      .ok_or_else(|| ChkError::unresolved(Entity::Location, format_args!("{location:?}")))
  }

  pub fn optional_location_id(&self, location: Option<&Location>) -> Result<u32> {
    location.map_or(Ok(0), |location| self.location_id(location))
  }

  pub fn switch_id(&self, switch: &Switch) -> Result<u32> {
    self
      .switches
      .id_of(switch)
      .ok_or_else(|| ChkError::unresolved(Entity::Switch, format_args!("{switch:?}")))
  }

  pub fn cuwp_id(&self, slot: &CuwpSlot) -> Result<u32> {
    self
      .cuwp
      .id_of(slot)
      .ok_or_else(|| ChkError::unresolved(Entity::CuwpSlot, format_args!("{slot:?}")))
  }

  /// How long `sound` plays for, according to the audio collaborator. Falls back to 0.
  pub fn sound_duration_ms(&self, sound: &RichString) -> u32 {
    let duration = sound.to_text().and_then(|path| {
      self
        .audio
        .as_ref()
        .and_then(|audio| audio.duration_ms(&path))
    });

    duration.unwrap_or_else(|| {
      warn!("no duration known for sound {sound}, writing 0");
      0
    })
  }
}
