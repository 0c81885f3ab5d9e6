use std::sync::Arc;
use std::time::Duration;

use test_log::test;

use crate::rich::{
  CuwpSlot, Location, RichChk, RichSection, RichString, Switch, Triggers, ValidProperties,
};
use crate::section::{
  ActionRecord, CuwpSlotsSection, CuwpUsageSection, OffsetWidth, Section, SectionKind,
  StringTable, TriggerRecord, TriggerTable, VersionSection,
};
use crate::trigger::{Action, Condition, Group, SwitchAction, SwitchState, Trigger, UnitId};
use crate::{
  load_scenario, store_scenario, AudioMetadata, ChkError, CodecOptions, DecodeContext,
  DecodedChk, EncodeContext, Entity, MapArchive, MapCodec, MemoryArchive,
};

fn blob(sections: Vec<Section>) -> Vec<u8> {
  DecodedChk::new(sections).encode().unwrap()
}

fn bare_map(triggers: Vec<TriggerRecord>) -> Vec<u8> {
  blob(vec![
    Section::Version(VersionSection {
      version: VersionSection::EXPANSION,
    }),
    Section::Strings(StringTable::new(OffsetWidth::Narrow)),
    Section::Triggers(TriggerTable { triggers }),
  ])
}

fn with_triggers(chk: &RichChk, triggers: Vec<Trigger>) -> RichChk {
  chk
    .without_sections(SectionKind::Triggers)
    .with_section(RichSection::Triggers(Triggers { triggers }))
}

fn template(hitpoints: u8) -> CuwpSlot {
  CuwpSlot {
    hitpoints,
    valid_properties: ValidProperties {
      hitpoints: true,
      ..ValidProperties::default()
    },
    ..CuwpSlot::default()
  }
}

fn create_with_properties(properties: CuwpSlot) -> Action {
  Action::CreateUnitWithProperties {
    group: Group::Player(0),
    unit: UnitId(0),
    count: 1,
    location: Location::new(0, 0, 32, 32, "Spawn"),
    properties,
  }
}

#[test]
fn single_string_table_round_trips() {
  let payload = [1, 0, 4, 0, b'a', 0, 0];
  let data = blob(vec![Section::decode(*b"STR ", &payload).unwrap()]);

  let codec = MapCodec::default();
  let decoded = DecodedChk::decode(&data).unwrap();
  let context = codec.decode_context(&decoded).unwrap();
  assert_eq!(context.strings.len(), 1);
  assert_eq!(context.strings.get(1), Some(&RichString::from("a")));

  let rich = codec.enrich(&decoded).unwrap();
  let flat = codec.flatten(&rich).unwrap();
  assert_eq!(flat.sections().len(), 1);
  assert_eq!(flat.sections()[0].encode(false).unwrap(), payload);
  assert_eq!(codec.encode(&rich).unwrap(), data);
}

#[test]
fn lookalike_strings_keep_their_ids_through_the_codec() {
  // "café" as UTF-8, then as a single Latin-1 byte
  let payload = [
    2, 0, 6, 0, 12, 0, b'c', b'a', b'f', 0xc3, 0xa9, 0, b'c', b'a', b'f', 0xe9, 0,
  ];
  let mut trigger = TriggerRecord::default();
  trigger.actions[0] = ActionRecord {
    kind: 9,
    text: 2,
    ..ActionRecord::default()
  };
  let data = blob(vec![
    Section::Version(VersionSection {
      version: VersionSection::EXPANSION,
    }),
    Section::decode(*b"STR ", &payload).unwrap(),
    Section::Triggers(TriggerTable {
      triggers: vec![trigger],
    }),
  ]);

  let codec = MapCodec::default();
  let rich = codec.decode(&data).unwrap();
  assert_eq!(codec.encode(&rich).unwrap(), data);
}

#[test]
fn named_switches_gain_a_names_section() {
  let codec = MapCodec::default();
  let rich = codec.decode(&bare_map(Vec::new())).unwrap();
  assert!(!rich.has(SectionKind::SwitchNames));

  let trigger = Trigger::for_players([Group::Player(0)])
    .with_condition(Condition::Switch {
      switch: Switch::named("Alpha"),
      state: SwitchState::Set,
    })
    .unwrap()
    .with_action(Action::SetSwitch {
      switch: Switch::named("Beta"),
      action: SwitchAction::Set,
    })
    .unwrap();

  let encoded = codec.encode(&with_triggers(&rich, vec![trigger])).unwrap();
  let decoded = DecodedChk::decode(&encoded).unwrap();
  assert!(decoded.single(SectionKind::SwitchNames).unwrap().is_some());

  let reread = codec.enrich(&decoded).unwrap();
  let trigger = reread.triggers().next().unwrap();
  assert_eq!(
    trigger.conditions[0].as_ref().map(|c| &c.condition),
    Some(&Condition::Switch {
      switch: Switch {
        name: RichString::from("Alpha"),
        index: Some(0),
      },
      state: SwitchState::Set,
    })
  );
  assert_eq!(
    trigger.actions[0].as_ref().map(|a| &a.action),
    Some(&Action::SetSwitch {
      switch: Switch {
        name: RichString::from("Beta"),
        index: Some(1),
      },
      action: SwitchAction::Set,
    })
  );
  assert!(trigger.execution.applies_to(Group::Player(0)));

  // a second pass has nothing left to add
  assert_eq!(codec.encode(&reread).unwrap(), encoded);
}

#[test]
fn identical_templates_share_one_slot() {
  let codec = MapCodec::default();
  let rich = codec.decode(&bare_map(Vec::new())).unwrap();

  let trigger = Trigger::default()
    .with_action(create_with_properties(template(50)))
    .unwrap()
    .with_action(create_with_properties(template(50)))
    .unwrap();
  let encoded = codec.encode(&with_triggers(&rich, vec![trigger])).unwrap();

  let decoded = DecodedChk::decode(&encoded).unwrap();
  let Some(Section::CuwpUsage(usage)) = decoded.single(SectionKind::CuwpUsage).unwrap() else {
    panic!("no usage section was appended");
  };
  assert_eq!(usage.used.iter().filter(|used| **used != 0).count(), 1);
  assert_eq!(usage.used[0], 1);

  let Some(Section::Triggers(table)) = decoded.single(SectionKind::Triggers).unwrap() else {
    panic!("no triggers");
  };
  assert_eq!(table.triggers[0].actions[0].second_group, 1);
  assert_eq!(table.triggers[0].actions[1].second_group, 1);

  let reread = codec.enrich(&decoded).unwrap();
  let Some(Action::CreateUnitWithProperties {
    location,
    properties,
    ..
  }) = reread.triggers().next().unwrap().actions[0].as_ref().map(|a| &a.action)
  else {
    panic!("wrong action");
  };
  assert_eq!(properties.template(), template(50));
  assert_eq!(properties.index, Some(1));
  assert_eq!(location.name, RichString::from("Spawn"));
  assert_eq!(location.index, Some(1));
  assert_eq!(reread.locations().map(|l| l.capacity), Some(255));

  assert_eq!(codec.encode(&reread).unwrap(), encoded);
}

#[test]
fn too_many_templates_exceed_the_slot_table() {
  let mut slots = CuwpSlotsSection::default();
  slots.slots[0].hitpoints = 10;
  let mut usage = CuwpUsageSection::default();
  usage.used[0] = 1;

  let data = blob(vec![
    Section::Version(VersionSection {
      version: VersionSection::EXPANSION,
    }),
    Section::Strings(StringTable::new(OffsetWidth::Narrow)),
    Section::CuwpSlots(slots),
    Section::CuwpUsage(usage),
  ]);
  let codec = MapCodec::default();
  let rich = codec.decode(&data).unwrap();

  let mut triggers = Vec::new();
  for half in 0..2u8 {
    let mut trigger = Trigger::default();
    for n in 0..35u8 {
      trigger = trigger
        .with_action(create_with_properties(template(20 + half * 35 + n)))
        .unwrap();
    }
    triggers.push(trigger);
  }

  assert!(matches!(
    codec.encode(&with_triggers(&rich, triggers)),
    Err(ChkError::CapacityExceeded {
      what: Entity::CuwpSlot,
      capacity: 64
    })
  ));
}

#[test]
fn unknown_location_ids_fail_to_decode() {
  let mut trigger = TriggerRecord::default();
  trigger.actions[0] = ActionRecord {
    kind: 10,
    location: 9,
    ..ActionRecord::default()
  };

  assert!(matches!(
    MapCodec::default().decode(&bare_map(vec![trigger])),
    Err(ChkError::UnresolvedReference {
      what: Entity::Location,
      ..
    })
  ));
}

#[test]
fn unknown_action_kinds_fail_to_decode() {
  let mut trigger = TriggerRecord::default();
  trigger.actions[3].kind = 60;

  assert!(matches!(
    MapCodec::default().decode(&bare_map(vec![trigger])),
    Err(ChkError::UnregisteredVariant {
      what: Entity::Action,
      kind: 60
    })
  ));
}

#[test]
fn duplicate_versions_fail_to_decode() {
  let data = blob(vec![
    Section::Version(VersionSection { version: 59 }),
    Section::Strings(StringTable::new(OffsetWidth::Narrow)),
    Section::Version(VersionSection { version: 63 }),
  ]);

  assert!(matches!(
    MapCodec::default().decode(&data),
    Err(ChkError::DuplicateSingletonSection(SectionKind::Version, 2))
  ));
}

struct FixedDurations;

impl AudioMetadata for FixedDurations {
  fn duration_ms(&self, path: &str) -> Option<u32> {
    (path == "sound\\intro.wav").then_some(1500)
  }
}

#[test]
fn sound_durations_come_from_the_audio_collaborator() {
  let codec = MapCodec::new(CodecOptions::default(), Some(Arc::new(FixedDurations)));
  let rich = codec.decode(&bare_map(Vec::new())).unwrap();

  let trigger = Trigger::default()
    .with_action(Action::PlayWav {
      sound: RichString::from("sound\\intro.wav"),
      duration: None,
    })
    .unwrap()
    .with_action(Action::PlayWav {
      sound: RichString::from("sound\\intro.wav"),
      duration: Some(Duration::from_millis(200)),
    })
    .unwrap()
    .with_action(Action::PlayWav {
      sound: RichString::from("sound\\other.wav"),
      duration: None,
    })
    .unwrap();

  let flat = codec.flatten(&with_triggers(&rich, vec![trigger])).unwrap();
  let Some(Section::Triggers(table)) = flat.single(SectionKind::Triggers).unwrap() else {
    panic!("no triggers");
  };
  let actions = &table.triggers[0].actions;
  assert_eq!(actions[0].time, 1500);
  assert_eq!(actions[1].time, 200);
  assert_eq!(actions[2].time, 0);
  assert_eq!(actions[0].sound, actions[1].sound);
  assert_ne!(actions[0].sound, actions[2].sound);
}

#[test]
fn needed_sections_fail_without_append() {
  let codec = MapCodec::new(
    CodecOptions {
      append_missing_sections: false,
    },
    None,
  );
  let rich = codec.decode(&bare_map(Vec::new())).unwrap();
  let trigger = Trigger::default()
    .with_action(Action::CenterView {
      location: Location::new(0, 0, 32, 32, "Here"),
    })
    .unwrap();

  assert!(matches!(
    codec.flatten(&with_triggers(&rich, vec![trigger])),
    Err(ChkError::MissingRequiredSection(SectionKind::Locations))
  ));

  let flat = codec.flatten(&rich).unwrap();
  assert!(flat.single(SectionKind::Locations).unwrap().is_none());
  assert_eq!(flat.sections().len(), 3);
}

#[test]
fn scenarios_round_trip_through_an_archive() {
  let codec = MapCodec::default();
  let mut archive = MemoryArchive::new();
  archive
    .inject("staredit\\scenario.chk", &bare_map(Vec::new()), false)
    .unwrap();

  let rich = load_scenario(&archive, &codec).unwrap();
  let trigger = Trigger::for_players([Group::AllPlayers])
    .with_condition(Condition::Always)
    .unwrap()
    .with_action(Action::DisplayText {
      text: RichString::from("Hello"),
    })
    .unwrap();
  store_scenario(&mut archive, &codec, &with_triggers(&rich, vec![trigger.clone()])).unwrap();

  let reread = load_scenario(&archive, &codec).unwrap();
  assert_eq!(reread.triggers().collect::<Vec<_>>(), vec![&trigger]);
  assert_eq!(archive.paths().count(), 1);
}

fn shareable<T: Send + Sync>() {}

#[test]
fn models_can_cross_threads() {
  shareable::<DecodedChk>();
  shareable::<RichChk>();
  shareable::<DecodeContext>();
  shareable::<EncodeContext>();
  shareable::<MapCodec>();
}
