//! Rich triggers. Every condition and action kind is one variant of a closed enum; each
//! variant fills only the record fields it gives meaning to and leaves the rest zero.

use crate::context::{DecodeContext, EncodeContext};
use crate::error::{ChkError, Entity, Result};
use crate::rich::{ReferenceSet, References};
use crate::section::{
  ActionFlags, ConditionFlags, ExecutionFlags, ExecutionRecord, TriggerRecord, ACTION_SLOTS,
  CONDITION_SLOTS, PLAYER_GROUP_SLOTS,
};

/// A wire value with a set of named meanings. Values without a name survive as `Other`.
macro_rules! wire_enum {
  (
    $(#[$meta:meta])*
    $vis:vis enum $name:ident: $repr:ty {
      $($variant:ident = $value:literal),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    $vis enum $name {
      $($variant,)+
      Other($repr),
    }

    impl From<$repr> for $name {
      fn from(value: $repr) -> Self {
        match value {
          $($value => $name::$variant,)+
          other => $name::Other(other),
        }
      }
    }

    impl From<$name> for $repr {
      fn from(value: $name) -> Self {
        match value {
          $($name::$variant => $value,)+
          $name::Other(other) => other,
        }
      }
    }
  };
}

/// The closed set of registered condition or action kinds. Anything else is unregistered.
macro_rules! kind_enum {
  (
    $(#[$meta:meta])*
    $vis:vis enum $name:ident for $what:ident {
      $($variant:ident = $value:literal),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(u8)]
    $vis enum $name {
      $($variant = $value,)+
    }

    impl $name {
      pub const ALL: &'static [$name] = &[$($name::$variant),+];
    }

    impl TryFrom<u8> for $name {
      type Error = $crate::error::ChkError;

      fn try_from(value: u8) -> $crate::error::Result<Self> {
        match value {
          $($value => Ok($name::$variant),)+
          kind => Err($crate::error::ChkError::UnregisteredVariant {
            what: $crate::error::Entity::$what,
            kind: u32::from(kind),
          }),
        }
      }
    }
  };
}

pub use self::action::*;
pub use self::condition::*;
pub use self::types::*;

mod action;
mod condition;
mod types;

#[cfg(test)]
pub(crate) mod fixtures {
  use crate::context::{DecodeContext, EncodeContext};
  use crate::section::{LocationRecord, LocationsSection, OffsetWidth, StringTable};
  use crate::xref::{CuwpLookup, LocationLookup, StringLookup, SwitchLookup};

  /// String 1 is "Label" and string 2 a sound path. Locations 1 and 2 are both named
  /// "Label"; every switch and CUWP slot is blank.
  pub(crate) fn contexts() -> (DecodeContext, EncodeContext) {
    let table = StringTable::new(OffsetWidth::Narrow)
      .with_appended(&[b"Label".to_vec(), b"sound\\a.wav".to_vec()])
      .unwrap();
    let strings = StringLookup::build(&table);
    let record = |left: u32| LocationRecord {
      left,
      top: 0,
      right: left + 32,
      bottom: 32,
      name: 1,
      elevation_flags: 0,
    };
    let section = LocationsSection {
      locations: vec![record(0), record(64)],
    };

    let decode = DecodeContext {
      locations: LocationLookup::build(Some(&section), &strings).unwrap(),
      switches: SwitchLookup::build(None, &strings).unwrap(),
      cuwp: CuwpLookup::build(None).unwrap(),
      strings,
    };
    let encode = EncodeContext {
      strings: decode.strings.clone(),
      locations: decode.locations.clone(),
      switches: decode.switches.clone(),
      cuwp: decode.cuwp.clone(),
      audio: None,
    };
    (decode, encode)
  }
}

/// The per-slot condition flags that are not implied by the condition itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConditionSettings {
  pub disabled: bool,
  pub unit_type_used: bool,
}

impl ConditionSettings {
  fn from_bits(bits: u8) -> Self {
    let flags = ConditionFlags::from(bits);
    Self {
      disabled: flags.disabled(),
      unit_type_used: flags.unit_type_used(),
    }
  }

  fn to_bits(self) -> u8 {
    ConditionFlags::new()
      .with_disabled(self.disabled)
      .with_unit_type_used(self.unit_type_used)
      .into()
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionSettings {
  pub ignore_once: bool,
  pub disabled: bool,
  pub always_display: bool,
  pub unit_properties_used: bool,
  pub unit_type_used: bool,
}

impl ActionSettings {
  fn from_bits(bits: u8) -> Self {
    let flags = ActionFlags::from(bits);
    Self {
      ignore_once: flags.ignore_once(),
      disabled: flags.disabled(),
      always_display: flags.always_display(),
      unit_properties_used: flags.unit_properties_used(),
      unit_type_used: flags.unit_type_used(),
    }
  }

  fn to_bits(self) -> u8 {
    ActionFlags::new()
      .with_ignore_once(self.ignore_once)
      .with_disabled(self.disabled)
      .with_always_display(self.always_display)
      .with_unit_properties_used(self.unit_properties_used)
      .with_unit_type_used(self.unit_type_used)
      .into()
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriggerCondition {
  pub condition: Condition,
  pub settings: ConditionSettings,
}

impl From<Condition> for TriggerCondition {
  fn from(condition: Condition) -> Self {
    Self {
      condition,
      settings: ConditionSettings::default(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriggerAction {
  pub action: Action,
  pub settings: ActionSettings,
}

impl From<Action> for TriggerAction {
  fn from(action: Action) -> Self {
    Self {
      action,
      settings: ActionSettings::default(),
    }
  }
}

/// Which players run a trigger, and the state the game keeps for it between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Execution {
  pub actions_executing: bool,
  pub ignore_defeat_draw: bool,
  pub preserve: bool,
  pub ignore_execution: bool,
  pub ignore_misc_actions: bool,
  pub game_paused: bool,
  pub wait_skipping_disabled: bool,
  /// Indexed by the wire value of a [`Group`].
  pub players: [bool; PLAYER_GROUP_SLOTS],
  pub current_action: u8,
}

impl Execution {
  pub fn applies_to(&self, group: Group) -> bool {
    let index = u32::from(group) as usize;
    self.players.get(index).copied().unwrap_or(false)
  }

  fn from_record(record: &ExecutionRecord) -> Self {
    let flags = ExecutionFlags::from(record.flags);
    Self {
      actions_executing: flags.actions_executing(),
      ignore_defeat_draw: flags.ignore_defeat_draw(),
      preserve: flags.preserve(),
      ignore_execution: flags.ignore_execution(),
      ignore_misc_actions: flags.ignore_misc_actions(),
      game_paused: flags.game_paused(),
      wait_skipping_disabled: flags.wait_skipping_disabled(),
      players: record.players.map(|player| player != 0),
      current_action: record.current_action,
    }
  }

  fn to_record(&self) -> ExecutionRecord {
    ExecutionRecord {
      flags: ExecutionFlags::new()
        .with_actions_executing(self.actions_executing)
        .with_ignore_defeat_draw(self.ignore_defeat_draw)
        .with_preserve(self.preserve)
        .with_ignore_execution(self.ignore_execution)
        .with_ignore_misc_actions(self.ignore_misc_actions)
        .with_game_paused(self.game_paused)
        .with_wait_skipping_disabled(self.wait_skipping_disabled)
        .into(),
      players: self.players.map(u8::from),
      current_action: self.current_action,
    }
  }
}

/// Sixteen condition slots, sixty-four action slots and the execution state. `None` is an
/// empty slot, written as kind 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Trigger {
  pub conditions: Vec<Option<TriggerCondition>>,
  pub actions: Vec<Option<TriggerAction>>,
  pub execution: Execution,
}

impl Default for Trigger {
  fn default() -> Self {
    Self {
      conditions: vec![None; CONDITION_SLOTS],
      actions: vec![None; ACTION_SLOTS],
      execution: Execution::default(),
    }
  }
}

impl Trigger {
  /// An empty trigger run by `players`.
  pub fn for_players(players: impl IntoIterator<Item = Group>) -> Self {
    let mut trigger = Self::default();
    for group in players {
      if let Some(slot) = trigger.execution.players.get_mut(u32::from(group) as usize) {
        *slot = true;
      }
    }
    trigger
  }

  /// A copy with `condition` in the first empty slot.
  pub fn with_condition(&self, condition: impl Into<TriggerCondition>) -> Result<Self> {
    let mut trigger = self.clone();
    let slot = trigger
      .conditions
      .iter_mut()
      .find(|slot| slot.is_none())
      .ok_or_else(|| ChkError::capacity(Entity::Condition, CONDITION_SLOTS))?;
    *slot = Some(condition.into());
    Ok(trigger)
  }

  /// A copy with `action` in the first empty slot.
  pub fn with_action(&self, action: impl Into<TriggerAction>) -> Result<Self> {
    let mut trigger = self.clone();
    let slot = trigger
      .actions
      .iter_mut()
      .find(|slot| slot.is_none())
      .ok_or_else(|| ChkError::capacity(Entity::Action, ACTION_SLOTS))?;
    *slot = Some(action.into());
    Ok(trigger)
  }

  pub fn decode(record: &TriggerRecord, context: &DecodeContext) -> Result<Self> {
    let mut conditions = Vec::with_capacity(CONDITION_SLOTS);
    for condition in &record.conditions {
      conditions.push(match Condition::decode(condition, context)? {
        Some(decoded) => Some(TriggerCondition {
          condition: decoded,
          settings: ConditionSettings::from_bits(condition.flags),
        }),
        None => None,
      });
    }

    let mut actions = Vec::with_capacity(ACTION_SLOTS);
    for action in &record.actions {
      actions.push(match Action::decode(action, context)? {
        Some(decoded) => Some(TriggerAction {
          action: decoded,
          settings: ActionSettings::from_bits(action.flags),
        }),
        None => None,
      });
    }

    Ok(Self {
      conditions,
      actions,
      execution: Execution::from_record(&record.execution),
    })
  }

  pub fn encode(&self, context: &EncodeContext) -> Result<TriggerRecord> {
    if self.conditions.len() > CONDITION_SLOTS {
      return Err(ChkError::capacity(Entity::Condition, CONDITION_SLOTS));
    }
    if self.actions.len() > ACTION_SLOTS {
      return Err(ChkError::capacity(Entity::Action, ACTION_SLOTS));
    }

    let mut record = TriggerRecord::default();
    for (slot, condition) in record.conditions.iter_mut().zip(&self.conditions) {
      if let Some(condition) = condition {
        *slot = condition.condition.encode(context)?;
        slot.flags = condition.settings.to_bits();
      }
    }
    for (slot, action) in record.actions.iter_mut().zip(&self.actions) {
      if let Some(action) = action {
        *slot = action.action.encode(context)?;
        slot.flags = action.settings.to_bits();
      }
    }
    record.execution = self.execution.to_record();

    Ok(record)
  }
}

impl References for Trigger {
  fn references(&self, refs: &mut ReferenceSet) {
    for condition in self.conditions.iter().flatten() {
      condition.condition.references(refs);
    }
    for action in self.actions.iter().flatten() {
      action.action.references(refs);
    }
  }
}
