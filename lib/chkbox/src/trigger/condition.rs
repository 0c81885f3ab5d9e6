use std::time::Duration;

use crate::context::{DecodeContext, EncodeContext};
use crate::error::Result;
use crate::rich::{Location, ReferenceSet, References, Switch};
use crate::section::{ConditionRecord, MASK_FLAG};
use crate::trigger::types::{seconds, to_byte, to_seconds};
use crate::trigger::{Comparison, Group, ResourceType, ScoreType, SwitchState, UnitId};

kind_enum! {
  pub enum ConditionKind for Condition {
    CountdownTimer = 1,
    Command = 2,
    Bring = 3,
    Accumulate = 4,
    Kill = 5,
    CommandTheMost = 6,
    CommandsTheMostAt = 7,
    MostKills = 8,
    HighestScore = 9,
    MostResources = 10,
    Switch = 11,
    ElapsedTime = 12,
    MissionBriefing = 13,
    Opponents = 14,
    Deaths = 15,
    CommandTheLeast = 16,
    CommandTheLeastAt = 17,
    LeastKills = 18,
    LowestScore = 19,
    LeastResources = 20,
    Score = 21,
    Always = 22,
    Never = 23,
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
  CountdownTimer {
    comparison: Comparison,
    time: Duration,
  },
  Command {
    group: Group,
    comparison: Comparison,
    quantity: u32,
    unit: UnitId,
  },
  Bring {
    group: Group,
    comparison: Comparison,
    quantity: u32,
    unit: UnitId,
    location: Location,
  },
  Accumulate {
    group: Group,
    comparison: Comparison,
    quantity: u32,
    resource: ResourceType,
  },
  Kill {
    group: Group,
    comparison: Comparison,
    quantity: u32,
    unit: UnitId,
  },
  CommandTheMost {
    unit: UnitId,
  },
  CommandsTheMostAt {
    unit: UnitId,
    location: Location,
  },
  MostKills {
    unit: UnitId,
  },
  HighestScore {
    score: ScoreType,
  },
  MostResources {
    resource: ResourceType,
  },
  Switch {
    switch: Switch,
    state: SwitchState,
  },
  ElapsedTime {
    comparison: Comparison,
    time: Duration,
  },
  MissionBriefing,
  Opponents {
    group: Group,
    comparison: Comparison,
    quantity: u32,
  },
  /// With a `mask`, the death counter is read through that bit mask.
  Deaths {
    group: Group,
    comparison: Comparison,
    quantity: u32,
    unit: UnitId,
    mask: Option<u32>,
  },
  CommandTheLeast {
    unit: UnitId,
  },
  CommandTheLeastAt {
    unit: UnitId,
    location: Location,
  },
  LeastKills {
    unit: UnitId,
  },
  LowestScore {
    score: ScoreType,
  },
  LeastResources {
    resource: ResourceType,
  },
  Score {
    group: Group,
    comparison: Comparison,
    score: ScoreType,
    quantity: u32,
  },
  Always,
  Never,
}

impl Condition {
  pub fn kind(&self) -> ConditionKind {
    match self {
      Condition::CountdownTimer { .. } => ConditionKind::CountdownTimer,
      Condition::Command { .. } => ConditionKind::Command,
      Condition::Bring { .. } => ConditionKind::Bring,
      Condition::Accumulate { .. } => ConditionKind::Accumulate,
      Condition::Kill { .. } => ConditionKind::Kill,
      Condition::CommandTheMost { .. } => ConditionKind::CommandTheMost,
      Condition::CommandsTheMostAt { .. } => ConditionKind::CommandsTheMostAt,
      Condition::MostKills { .. } => ConditionKind::MostKills,
      Condition::HighestScore { .. } => ConditionKind::HighestScore,
      Condition::MostResources { .. } => ConditionKind::MostResources,
      Condition::Switch { .. } => ConditionKind::Switch,
      Condition::ElapsedTime { .. } => ConditionKind::ElapsedTime,
      Condition::MissionBriefing => ConditionKind::MissionBriefing,
      Condition::Opponents { .. } => ConditionKind::Opponents,
      Condition::Deaths { .. } => ConditionKind::Deaths,
      Condition::CommandTheLeast { .. } => ConditionKind::CommandTheLeast,
      Condition::CommandTheLeastAt { .. } => ConditionKind::CommandTheLeastAt,
      Condition::LeastKills { .. } => ConditionKind::LeastKills,
      Condition::LowestScore { .. } => ConditionKind::LowestScore,
      Condition::LeastResources { .. } => ConditionKind::LeastResources,
      Condition::Score { .. } => ConditionKind::Score,
      Condition::Always => ConditionKind::Always,
      Condition::Never => ConditionKind::Never,
    }
  }

  /// Kind 0 is an empty slot and decodes to `None`.
  pub fn decode(record: &ConditionRecord, context: &DecodeContext) -> Result<Option<Self>> {
    if record.kind == 0 {
      return Ok(None);
    }

    let group = Group::from(record.group);
    let comparison = Comparison::from(record.comparison);
    let quantity = record.quantity;
    let unit = UnitId(record.unit);
    let resource = ResourceType::from(u16::from(record.resource));
    let score = ScoreType::from(u16::from(record.resource));

    let condition = match ConditionKind::try_from(record.kind)? {
      ConditionKind::CountdownTimer => Condition::CountdownTimer {
        comparison,
        time: seconds(quantity),
      },
      ConditionKind::Command => Condition::Command {
        group,
        comparison,
        quantity,
        unit,
      },
      ConditionKind::Bring => Condition::Bring {
        group,
        comparison,
        quantity,
        unit,
        location: context.location(record.location)?,
      },
      ConditionKind::Accumulate => Condition::Accumulate {
        group,
        comparison,
        quantity,
        resource,
      },
      ConditionKind::Kill => Condition::Kill {
        group,
        comparison,
        quantity,
        unit,
      },
      ConditionKind::CommandTheMost => Condition::CommandTheMost { unit },
      ConditionKind::CommandsTheMostAt => Condition::CommandsTheMostAt {
        unit,
        location: context.location(record.location)?,
      },
      ConditionKind::MostKills => Condition::MostKills { unit },
      ConditionKind::HighestScore => Condition::HighestScore { score },
      ConditionKind::MostResources => Condition::MostResources { resource },
      ConditionKind::Switch => Condition::Switch {
        switch: context.switch(u32::from(record.resource))?,
        state: SwitchState::from(record.comparison),
      },
      ConditionKind::ElapsedTime => Condition::ElapsedTime {
        comparison,
        time: seconds(quantity),
      },
      ConditionKind::MissionBriefing => Condition::MissionBriefing,
      ConditionKind::Opponents => Condition::Opponents {
        group,
        comparison,
        quantity,
      },
      ConditionKind::Deaths => Condition::Deaths {
        group,
        comparison,
        quantity,
        unit,
        mask: (record.mask_flag == MASK_FLAG).then_some(record.location),
      },
      ConditionKind::CommandTheLeast => Condition::CommandTheLeast { unit },
      ConditionKind::CommandTheLeastAt => Condition::CommandTheLeastAt {
        unit,
        location: context.location(record.location)?,
      },
      ConditionKind::LeastKills => Condition::LeastKills { unit },
      ConditionKind::LowestScore => Condition::LowestScore { score },
      ConditionKind::LeastResources => Condition::LeastResources { resource },
      ConditionKind::Score => Condition::Score {
        group,
        comparison,
        score,
        quantity,
      },
      ConditionKind::Always => Condition::Always,
      ConditionKind::Never => Condition::Never,
    };

    Ok(Some(condition))
  }

  /// The record for this condition, with its flags left clear.
  pub fn encode(&self, context: &EncodeContext) -> Result<ConditionRecord> {
    let mut record = ConditionRecord {
      kind: self.kind() as u8,
      ..ConditionRecord::default()
    };

    match self {
      Condition::CountdownTimer { comparison, time }
      | Condition::ElapsedTime { comparison, time } => {
        record.comparison = u8::from(*comparison);
        record.quantity = to_seconds(*time)?;
      }
      Condition::Command {
        group,
        comparison,
        quantity,
        unit,
      }
      | Condition::Kill {
        group,
        comparison,
        quantity,
        unit,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.quantity = *quantity;
        record.unit = unit.0;
      }
      Condition::Bring {
        group,
        comparison,
        quantity,
        unit,
        location,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.quantity = *quantity;
        record.unit = unit.0;
        record.location = context.location_id(location)?;
      }
      Condition::Accumulate {
        group,
        comparison,
        quantity,
        resource,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.quantity = *quantity;
        record.resource = to_byte("resource type", u16::from(*resource))?;
      }
      Condition::CommandTheMost { unit }
      | Condition::MostKills { unit }
      | Condition::CommandTheLeast { unit }
      | Condition::LeastKills { unit } => {
        record.unit = unit.0;
      }
      Condition::CommandsTheMostAt { unit, location }
      | Condition::CommandTheLeastAt { unit, location } => {
        record.unit = unit.0;
        record.location = context.location_id(location)?;
      }
      Condition::HighestScore { score } | Condition::LowestScore { score } => {
        record.resource = to_byte("score type", u16::from(*score))?;
      }
      Condition::MostResources { resource } | Condition::LeastResources { resource } => {
        record.resource = to_byte("resource type", u16::from(*resource))?;
      }
      Condition::Switch { switch, state } => {
        let index = context.switch_id(switch)?;
        record.resource = to_byte("switch", index as u16)?;
        record.comparison = u8::from(*state);
      }
      Condition::Opponents {
        group,
        comparison,
        quantity,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.quantity = *quantity;
      }
      Condition::Deaths {
        group,
        comparison,
        quantity,
        unit,
        mask,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.quantity = *quantity;
        record.unit = unit.0;
        if let Some(mask) = mask {
          record.location = *mask;
          record.mask_flag = MASK_FLAG;
        }
      }
      Condition::Score {
        group,
        comparison,
        score,
        quantity,
      } => {
        record.group = u32::from(*group);
        record.comparison = u8::from(*comparison);
        record.resource = to_byte("score type", u16::from(*score))?;
        record.quantity = *quantity;
      }
      Condition::MissionBriefing | Condition::Always | Condition::Never => {}
    }

    Ok(record)
  }
}

impl References for Condition {
  fn references(&self, refs: &mut ReferenceSet) {
    match self {
      Condition::Bring { location, .. }
      | Condition::CommandsTheMostAt { location, .. }
      | Condition::CommandTheLeastAt { location, .. } => refs.location(location),
      Condition::Switch { switch, .. } => refs.switch(switch),
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trigger::fixtures::contexts;

  /// Every field set, so each kind has to pick out its own.
  fn full_record(kind: ConditionKind) -> ConditionRecord {
    ConditionRecord {
      location: 1,
      group: 17,
      quantity: 30,
      unit: 3,
      comparison: 10,
      kind: kind as u8,
      resource: 1,
      flags: 0b0000_0010,
      mask_flag: 0,
    }
  }

  #[test]
  fn every_kind_keeps_only_its_own_fields() {
    let (decode, encode) = contexts();
    for kind in ConditionKind::ALL {
      let condition = Condition::decode(&full_record(*kind), &decode).unwrap().unwrap();
      assert_eq!(condition.kind(), *kind);

      let record = condition.encode(&encode).unwrap();
      assert_eq!(record.kind, *kind as u8);
      assert_eq!((record.flags, record.mask_flag), (0, 0), "{kind:?}");

      let again = Condition::decode(&record, &decode).unwrap().unwrap();
      assert_eq!(again, condition, "{kind:?}");
      assert_eq!(again.encode(&encode).unwrap(), record, "{kind:?}");
    }
  }

  #[test]
  fn kinds_without_fields_encode_bare() {
    let (decode, encode) = contexts();
    for kind in [ConditionKind::Always, ConditionKind::Never, ConditionKind::MissionBriefing] {
      let condition = Condition::decode(&full_record(kind), &decode).unwrap().unwrap();
      assert_eq!(
        condition.encode(&encode).unwrap(),
        ConditionRecord {
          kind: kind as u8,
          ..ConditionRecord::default()
        }
      );
    }
  }

  #[test]
  fn switches_are_read_from_the_resource_byte() {
    let (decode, encode) = contexts();
    let record = ConditionRecord {
      kind: ConditionKind::Switch as u8,
      resource: 9,
      comparison: 3,
      ..ConditionRecord::default()
    };

    let condition = Condition::decode(&record, &decode).unwrap().unwrap();
    let Condition::Switch { switch, state } = &condition else {
      panic!("not a switch: {condition:?}");
    };
    assert_eq!(switch.index, Some(9));
    assert_eq!(*state, SwitchState::Cleared);
    assert_eq!(condition.encode(&encode).unwrap(), record);
  }

  #[test]
  fn masked_deaths_keep_the_mask_in_the_location_field() {
    let (decode, encode) = contexts();
    let masked = ConditionRecord {
      location: 0x0000_FF00,
      group: 13,
      quantity: 2,
      unit: 3,
      comparison: 0,
      kind: ConditionKind::Deaths as u8,
      mask_flag: MASK_FLAG,
      ..ConditionRecord::default()
    };

    let condition = Condition::decode(&masked, &decode).unwrap().unwrap();
    assert!(matches!(
      condition,
      Condition::Deaths {
        mask: Some(0x0000_FF00),
        quantity: 2,
        ..
      }
    ));
    assert_eq!(condition.encode(&encode).unwrap(), masked);

    let unmasked = ConditionRecord {
      location: 1,
      mask_flag: 0,
      ..masked
    };
    let condition = Condition::decode(&unmasked, &decode).unwrap().unwrap();
    assert!(matches!(condition, Condition::Deaths { mask: None, .. }));
    assert_eq!(
      condition.encode(&encode).unwrap(),
      ConditionRecord {
        location: 0,
        ..unmasked
      }
    );
  }

  #[test]
  fn every_kind_is_registered_once() {
    assert_eq!(ConditionKind::ALL.len(), 23);
    for (position, kind) in ConditionKind::ALL.iter().enumerate() {
      assert_eq!(*kind as u8, position as u8 + 1);
      assert_eq!(ConditionKind::try_from(*kind as u8).unwrap(), *kind);
    }
  }

  #[test]
  fn unknown_kinds_are_unregistered() {
    assert!(matches!(
      ConditionKind::try_from(24u8),
      Err(crate::error::ChkError::UnregisteredVariant {
        what: crate::error::Entity::Condition,
        kind: 24
      })
    ));
  }
}
