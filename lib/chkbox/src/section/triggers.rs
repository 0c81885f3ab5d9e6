use binrw::binrw;
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::section::{decode_records, encode_le, expect_count, SectionKind};

pub const CONDITION_SLOTS: usize = 16;
pub const ACTION_SLOTS: usize = 64;
pub const PLAYER_GROUP_SLOTS: usize = 27;
pub const CONDITION_RECORD_SIZE: usize = 20;
pub const ACTION_RECORD_SIZE: usize = 32;
pub const EXECUTION_RECORD_SIZE: usize = 32;
pub const TRIGGER_RECORD_SIZE: usize =
  CONDITION_SLOTS * CONDITION_RECORD_SIZE + ACTION_SLOTS * ACTION_RECORD_SIZE + EXECUTION_RECORD_SIZE;

/// Marks a condition or action whose location field carries a death-counter bit mask.
pub const MASK_FLAG: u16 = 0x4353;

#[bitfield]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionFlags {
  #[skip]
  __: B1,
  pub disabled: bool,
  #[skip]
  __: B2,
  pub unit_type_used: bool,
  #[skip]
  __: B3,
}

#[bitfield]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionFlags {
  pub ignore_once: bool,
  pub disabled: bool,
  pub always_display: bool,
  pub unit_properties_used: bool,
  pub unit_type_used: bool,
  #[skip]
  __: B3,
}

#[bitfield]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionFlags {
  pub actions_executing: bool,
  pub ignore_defeat_draw: bool,
  pub preserve: bool,
  pub ignore_execution: bool,
  pub ignore_misc_actions: bool,
  pub game_paused: bool,
  pub wait_skipping_disabled: bool,
  #[skip]
  __: B25,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
  pub location: u32,
  pub group: u32,
  pub quantity: u32,
  pub unit: u16,
  pub comparison: u8,
  pub kind: u8,
  pub resource: u8,
  pub flags: u8,
  pub mask_flag: u16,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
  pub location: u32,
  pub text: u32,
  pub sound: u32,
  pub time: u32,
  pub first_group: u32,
  pub second_group: u32,
  pub argument: u16,
  pub kind: u8,
  pub quantifier: u8,
  pub flags: u8,
  pub padding: u8,
  pub mask_flag: u16,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
  pub flags: u32,
  pub players: [u8; PLAYER_GROUP_SLOTS],
  pub current_action: u8,
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
  #[br(count = CONDITION_SLOTS)]
  pub conditions: Vec<ConditionRecord>,
  #[br(count = ACTION_SLOTS)]
  pub actions: Vec<ActionRecord>,
  pub execution: ExecutionRecord,
}

impl Default for TriggerRecord {
  fn default() -> Self {
    Self {
      conditions: vec![ConditionRecord::default(); CONDITION_SLOTS],
      actions: vec![ActionRecord::default(); ACTION_SLOTS],
      execution: ExecutionRecord::default(),
    }
  }
}

/// `TRIG` and `MBRF`: a flat run of fixed-size trigger records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerTable {
  pub triggers: Vec<TriggerRecord>,
}

impl TriggerTable {
  pub fn decode(kind: SectionKind, payload: &[u8]) -> Result<Self> {
    Ok(Self {
      triggers: decode_records(kind, payload, TRIGGER_RECORD_SIZE)?,
    })
  }

  pub fn encode(&self, kind: SectionKind) -> Result<Vec<u8>> {
    for trigger in &self.triggers {
      expect_count(kind, "conditions", trigger.conditions.len(), CONDITION_SLOTS)?;
      expect_count(kind, "actions", trigger.actions.len(), ACTION_SLOTS)?;
    }
    encode_le(kind, &self.triggers)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_payload() -> Vec<u8> {
    let mut payload = vec![0u8; TRIGGER_RECORD_SIZE * 2];
    // second trigger, first condition: always (22)
    payload[TRIGGER_RECORD_SIZE + 15] = 22;
    // second trigger, first action: wait 1000ms
    let action = TRIGGER_RECORD_SIZE + CONDITION_SLOTS * CONDITION_RECORD_SIZE;
    payload[action + 12..action + 16].copy_from_slice(&1000u32.to_le_bytes());
    payload[action + 26] = 4;
    // second trigger applies to all players and is preserved
    let execution = TRIGGER_RECORD_SIZE * 2 - EXECUTION_RECORD_SIZE;
    payload[execution] = 0b100;
    payload[execution + 4 + 17] = 1;
    payload
  }

  #[test]
  fn record_sizes_add_up() {
    assert_eq!(TRIGGER_RECORD_SIZE, 2400);
  }

  #[test]
  fn round_trips_records() {
    let payload = sample_payload();
    let table = TriggerTable::decode(SectionKind::Triggers, &payload).unwrap();

    assert_eq!(table.triggers.len(), 2);
    assert_eq!(table.triggers[0], TriggerRecord::default());

    let trigger = &table.triggers[1];
    assert_eq!(trigger.conditions[0].kind, 22);
    assert_eq!(trigger.actions[0].kind, 4);
    assert_eq!(trigger.actions[0].time, 1000);
    assert!(ExecutionFlags::from(trigger.execution.flags).preserve());
    assert_eq!(trigger.execution.players[17], 1);

    assert_eq!(table.encode(SectionKind::Triggers).unwrap(), payload);
  }

  #[test]
  fn rejects_trailing_partial_trigger() {
    let mut payload = sample_payload();
    payload.push(0);
    assert!(TriggerTable::decode(SectionKind::Triggers, &payload).is_err());
  }

  #[test]
  fn flag_bits() {
    let flags = ConditionFlags::from(0b1_0010u8);
    assert!(flags.disabled() && flags.unit_type_used());

    let flags = ActionFlags::new()
      .with_always_display(true)
      .with_unit_properties_used(true);
    assert_eq!(u8::from(flags), 0b1100);
  }
}
