use log::{debug, trace};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::{ChkError, Result};
use crate::rich::{
  CuwpSlot, Location, ReferenceSet, References, RichString, Switch, UnitSetting, Weapon,
};
use crate::section::{
  expect_count, ForceFlags, ForcesSection, ScenarioPropertiesSection, Section, SectionKind,
  SoundsSection, StringTable, TriggerTable, UnitSettingsSection, UnknownSection, VersionSection,
  EXPANSION_WEAPON_COUNT, FORCE_COUNT, FORCE_PLAYER_COUNT, ORIGINAL_WEAPON_COUNT, SOUND_COUNT,
  UNIT_COUNT,
};
use crate::trigger::Trigger;

/// `MRGN`: the locations in use. Free records are not kept; they come back zeroed on encode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locations {
  /// How many records the section holds on the wire.
  pub capacity: usize,
  pub locations: Vec<Location>,
}

/// `SWNM`: the switches with a non-empty custom name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Switches {
  pub switches: Vec<Switch>,
}

/// `UPRP`: all 64 slots, blank ones included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CuwpSlots {
  pub slots: Vec<CuwpSlot>,
}

/// `UPUS`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CuwpUsage {
  pub used: Vec<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitSettings {
  /// `UNIx` rather than `UNIS`.
  pub expansion: bool,
  pub units: Vec<UnitSetting>,
  pub weapons: Vec<Weapon>,
}

/// `WAV `: the sound files packaged with the map. `Null` marks a free slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sounds {
  pub sounds: Vec<RichString>,
}

impl Default for Sounds {
  fn default() -> Self {
    Self {
      sounds: vec![RichString::Null; SOUND_COUNT],
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triggers {
  pub triggers: Vec<Trigger>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioProperties {
  pub name: RichString,
  pub description: RichString,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Force {
  pub name: RichString,
  pub random_start_location: bool,
  pub allies: bool,
  pub allied_victory: bool,
  pub shared_vision: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forces {
  /// The force each of the first eight players belongs to.
  pub player_forces: [u8; FORCE_PLAYER_COUNT],
  pub forces: Vec<Force>,
}

/// One section of a map, enriched.
#[derive(Clone, Debug, PartialEq)]
pub enum RichSection {
  Version(VersionSection),
  /// The table as it was read. Encoding writes the rebuilt table instead.
  Strings(StringTable),
  Locations(Locations),
  SwitchNames(Switches),
  CuwpSlots(CuwpSlots),
  CuwpUsage(CuwpUsage),
  UnitSettings(UnitSettings),
  Sounds(Sounds),
  Triggers(Triggers),
  /// Briefing triggers pass through untouched.
  Briefing(TriggerTable),
  ScenarioProperties(ScenarioProperties),
  Forces(Forces),
  Unknown(UnknownSection),
}

impl RichSection {
  pub fn kind(&self) -> SectionKind {
    match self {
      RichSection::Version(_) => SectionKind::Version,
      RichSection::Strings(table) => table.kind(),
      RichSection::Locations(_) => SectionKind::Locations,
      RichSection::SwitchNames(_) => SectionKind::SwitchNames,
      RichSection::CuwpSlots(_) => SectionKind::CuwpSlots,
      RichSection::CuwpUsage(_) => SectionKind::CuwpUsage,
      RichSection::UnitSettings(settings) if settings.expansion => {
        SectionKind::ExpansionUnitSettings
      }
      RichSection::UnitSettings(_) => SectionKind::UnitSettings,
      RichSection::Sounds(_) => SectionKind::Sounds,
      RichSection::Triggers(_) => SectionKind::Triggers,
      RichSection::Briefing(_) => SectionKind::Briefing,
      RichSection::ScenarioProperties(_) => SectionKind::ScenarioProperties,
      RichSection::Forces(_) => SectionKind::Forces,
      RichSection::Unknown(unknown) => SectionKind::Unknown(unknown.tag),
    }
  }

  pub fn decode(section: &Section, context: &DecodeContext) -> Result<Self> {
    trace!("enriching `{}`", section.kind());

    Ok(match section {
      Section::Version(version) => RichSection::Version(*version),
      Section::Strings(table) => RichSection::Strings(table.clone()),
      Section::Locations(section) => {
        let mut locations = Vec::new();
        for (position, record) in section.locations.iter().enumerate() {
          if record.is_unused() {
            continue;
          }
          let name = context.string(u32::from(record.name))?;
          locations.push(Location::from_record(record, name, position as u32 + 1));
        }
        RichSection::Locations(Locations {
          capacity: section.locations.len(),
          locations,
        })
      }
      Section::SwitchNames(section) => {
        let mut switches = Vec::new();
        for (index, name) in section.names.iter().enumerate() {
          if *name == 0 {
            continue;
          }
          let switch = Switch {
            name: context.string(*name)?,
            index: Some(index as u32),
          };
          if switch.has_custom_name() {
            switches.push(switch);
          }
        }
        RichSection::SwitchNames(Switches { switches })
      }
      Section::CuwpSlots(section) => RichSection::CuwpSlots(CuwpSlots {
        slots: section
          .slots
          .iter()
          .enumerate()
          .map(|(position, record)| CuwpSlot::from_record(record, position as u32 + 1))
          .collect(),
      }),
      Section::CuwpUsage(section) => RichSection::CuwpUsage(CuwpUsage {
        used: section.used.iter().map(|used| *used != 0).collect(),
      }),
      Section::UnitSettings(section) => RichSection::UnitSettings(decode_unit_settings(section, context)?),
      Section::Sounds(section) => RichSection::Sounds(Sounds {
        sounds: section
          .sounds
          .iter()
          .map(|id| context.string(*id))
          .collect::<Result<_>>()?,
      }),
      Section::Triggers(table) => {
        let triggers = table
          .triggers
          .iter()
          .map(|record| Trigger::decode(record, context))
          .collect::<Result<Vec<_>>>()?;
        debug!("decoded {} triggers", triggers.len());
        RichSection::Triggers(Triggers { triggers })
      }
      Section::Briefing(table) => RichSection::Briefing(table.clone()),
      Section::ScenarioProperties(section) => RichSection::ScenarioProperties(ScenarioProperties {
        name: context.string(u32::from(section.name))?,
        description: context.string(u32::from(section.description))?,
      }),
      Section::Forces(section) => {
        let mut forces = Vec::with_capacity(FORCE_COUNT);
        for (name, flags) in section.names.iter().zip(section.flags) {
          let flags = ForceFlags::from(flags);
          forces.push(Force {
            name: context.string(u32::from(*name))?,
            random_start_location: flags.random_start_location(),
            allies: flags.allies(),
            allied_victory: flags.allied_victory(),
            shared_vision: flags.shared_vision(),
          });
        }
        RichSection::Forces(Forces {
          player_forces: section.player_forces,
          forces,
        })
      }
      Section::Unknown(unknown) => RichSection::Unknown(unknown.clone()),
    })
  }

  /// Every id is looked up in `context`, which must already hold all of this section's
  /// references.
  pub fn encode(&self, context: &EncodeContext) -> Result<Section> {
    trace!("flattening `{}`", self.kind());

    Ok(match self {
      RichSection::Version(version) => Section::Version(*version),
      RichSection::Strings(_) => Section::Strings(context.strings.table().clone()),
      RichSection::Locations(_) => Section::Locations(context.locations.to_section(&context.strings)?),
      RichSection::SwitchNames(_) => {
        Section::SwitchNames(context.switches.to_section(&context.strings)?)
      }
      RichSection::CuwpSlots(slots) => Section::CuwpSlots(context.cuwp.to_sections(&slots.slots).0),
      RichSection::CuwpUsage(_) => Section::CuwpUsage(context.cuwp.to_sections(&[]).1),
      RichSection::UnitSettings(settings) => {
        Section::UnitSettings(encode_unit_settings(settings, context)?)
      }
      RichSection::Sounds(sounds) => Section::Sounds(SoundsSection {
        sounds: sounds
          .sounds
          .iter()
          .map(|sound| context.string_id(sound))
          .collect::<Result<_>>()?,
      }),
      RichSection::Triggers(triggers) => Section::Triggers(TriggerTable {
        triggers: triggers
          .triggers
          .iter()
          .map(|trigger| trigger.encode(context))
          .collect::<Result<_>>()?,
      }),
      RichSection::Briefing(table) => Section::Briefing(table.clone()),
      RichSection::ScenarioProperties(properties) => {
        Section::ScenarioProperties(ScenarioPropertiesSection {
          name: context.short_string_id(&properties.name)?,
          description: context.short_string_id(&properties.description)?,
        })
      }
      RichSection::Forces(forces) => {
        expect_count(SectionKind::Forces, "forces", forces.forces.len(), FORCE_COUNT)?;
        let mut section = ForcesSection {
          player_forces: forces.player_forces,
          names: [0; FORCE_COUNT],
          flags: [0; FORCE_COUNT],
        };
        for (position, force) in forces.forces.iter().enumerate() {
          section.names[position] = context.short_string_id(&force.name)?;
          section.flags[position] = ForceFlags::new()
            .with_random_start_location(force.random_start_location)
            .with_allies(force.allies)
            .with_allied_victory(force.allied_victory)
            .with_shared_vision(force.shared_vision)
            .into();
        }
        Section::Forces(section)
      }
      RichSection::Unknown(unknown) => Section::Unknown(unknown.clone()),
    })
  }
}

fn decode_unit_settings(section: &UnitSettingsSection, context: &DecodeContext) -> Result<UnitSettings> {
  let mut units = Vec::with_capacity(UNIT_COUNT);
  for unit in 0..section.use_defaults.len() {
    units.push(UnitSetting {
      use_defaults: section.use_defaults[unit] != 0,
      hitpoints: UnitSetting::hitpoints_from_wire(section.hitpoints[unit]),
      shields: section.shields[unit],
      armor: section.armor[unit],
      build_time: section.build_time[unit],
      minerals: section.minerals[unit],
      gas: section.gas[unit],
      name: context.string(u32::from(section.names[unit]))?,
    });
  }

  let weapons = section
    .base_damage
    .iter()
    .zip(&section.upgrade_damage)
    .map(|(base_damage, upgrade_damage)| Weapon {
      base_damage: *base_damage,
      upgrade_damage: *upgrade_damage,
    })
    .collect();

  Ok(UnitSettings {
    expansion: section.is_expansion(),
    units,
    weapons,
  })
}

fn encode_unit_settings(settings: &UnitSettings, context: &EncodeContext) -> Result<UnitSettingsSection> {
  let (kind, weapons) = if settings.expansion {
    (SectionKind::ExpansionUnitSettings, EXPANSION_WEAPON_COUNT)
  } else {
    (SectionKind::UnitSettings, ORIGINAL_WEAPON_COUNT)
  };
  expect_count(kind, "units", settings.units.len(), UNIT_COUNT)?;
  expect_count(kind, "weapons", settings.weapons.len(), weapons)?;

  let mut section = UnitSettingsSection {
    use_defaults: Vec::with_capacity(UNIT_COUNT),
    hitpoints: Vec::with_capacity(UNIT_COUNT),
    shields: Vec::with_capacity(UNIT_COUNT),
    armor: Vec::with_capacity(UNIT_COUNT),
    build_time: Vec::with_capacity(UNIT_COUNT),
    minerals: Vec::with_capacity(UNIT_COUNT),
    gas: Vec::with_capacity(UNIT_COUNT),
    names: Vec::with_capacity(UNIT_COUNT),
    base_damage: settings.weapons.iter().map(|weapon| weapon.base_damage).collect(),
    upgrade_damage: settings.weapons.iter().map(|weapon| weapon.upgrade_damage).collect(),
  };

  for unit in &settings.units {
    section.use_defaults.push(u8::from(unit.use_defaults));
    section.hitpoints.push(unit.hitpoints_to_wire());
    section.shields.push(unit.shields);
    section.armor.push(unit.armor);
    section.build_time.push(unit.build_time);
    section.minerals.push(unit.minerals);
    section.gas.push(unit.gas);
    section.names.push(context.short_string_id(&unit.name)?);
  }

  Ok(section)
}

impl References for RichSection {
  fn references(&self, refs: &mut ReferenceSet) {
    match self {
      RichSection::Locations(locations) => {
        for location in &locations.locations {
          refs.string(&location.name);
        }
      }
      RichSection::SwitchNames(switches) => {
        for switch in &switches.switches {
          refs.string(&switch.name);
        }
      }
      RichSection::UnitSettings(settings) => {
        for unit in &settings.units {
          refs.string(&unit.name);
        }
      }
      RichSection::Sounds(sounds) => {
        for sound in &sounds.sounds {
          refs.string(sound);
        }
      }
      RichSection::Triggers(triggers) => triggers.triggers.references(refs),
      RichSection::ScenarioProperties(properties) => {
        refs.string(&properties.name);
        refs.string(&properties.description);
      }
      RichSection::Forces(forces) => {
        for force in &forces.forces {
          refs.string(&force.name);
        }
      }
      RichSection::Version(_)
      | RichSection::Strings(_)
      | RichSection::CuwpSlots(_)
      | RichSection::CuwpUsage(_)
      | RichSection::Briefing(_)
      | RichSection::Unknown(_) => {}
    }
  }
}

/// A whole map, enriched, with its sections in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichChk {
  pub sections: Vec<RichSection>,
}

impl RichChk {
  pub fn new(sections: Vec<RichSection>) -> Self {
    Self { sections }
  }

  pub fn sections(&self) -> &[RichSection] {
    &self.sections
  }

  pub fn of_kind(&self, kind: SectionKind) -> impl Iterator<Item = &RichSection> {
    self.sections.iter().filter(move |section| section.kind() == kind)
  }

  pub fn has(&self, kind: SectionKind) -> bool {
    self.of_kind(kind).next().is_some()
  }

  /// The first version section, if any.
  pub fn version(&self) -> Option<&VersionSection> {
    self.sections.iter().find_map(|section| match section {
      RichSection::Version(version) => Some(version),
      _ => None,
    })
  }

  /// The string table the map was read with.
  pub fn strings(&self) -> Result<&StringTable> {
    self
      .sections
      .iter()
      .find_map(|section| match section {
        RichSection::Strings(table) => Some(table),
        _ => None,
      })
      .ok_or(ChkError::MissingRequiredSection(SectionKind::Strings))
  }

  pub fn locations(&self) -> Option<&Locations> {
    self.sections.iter().find_map(|section| match section {
      RichSection::Locations(locations) => Some(locations),
      _ => None,
    })
  }

  pub fn switches(&self) -> Option<&Switches> {
    self.sections.iter().find_map(|section| match section {
      RichSection::SwitchNames(switches) => Some(switches),
      _ => None,
    })
  }

  pub fn cuwp_slots(&self) -> Option<&CuwpSlots> {
    self.sections.iter().find_map(|section| match section {
      RichSection::CuwpSlots(slots) => Some(slots),
      _ => None,
    })
  }

  pub fn cuwp_usage(&self) -> Option<&CuwpUsage> {
    self.sections.iter().find_map(|section| match section {
      RichSection::CuwpUsage(usage) => Some(usage),
      _ => None,
    })
  }

  /// Every trigger of every `TRIG` section, in order.
  pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
    self.sections.iter().flat_map(|section| match section {
      RichSection::Triggers(triggers) => triggers.triggers.as_slice(),
      _ => &[][..],
    })
  }
}

impl References for RichChk {
  fn references(&self, refs: &mut ReferenceSet) {
    self.sections.references(refs);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::section::{LocationRecord, LocationsSection, OffsetWidth, SwitchNamesSection};
  use crate::xref::{CuwpLookup, LocationLookup, StringLookup, SwitchLookup};

  fn table(strings: &[&str]) -> StringTable {
    let new = strings.iter().map(|s| s.as_bytes().to_vec()).collect::<Vec<_>>();
    StringTable::new(OffsetWidth::Narrow).with_appended(&new).unwrap()
  }

  fn decode_context(strings: &StringTable, locations: Option<&LocationsSection>) -> DecodeContext {
    let strings = StringLookup::build(strings);
    DecodeContext {
      locations: LocationLookup::build(locations, &strings).unwrap(),
      switches: SwitchLookup::empty(),
      cuwp: CuwpLookup::build(None).unwrap(),
      strings,
    }
  }

  #[test]
  fn locations_keep_only_used_records() {
    let strings = table(&["Base"]);
    let mut section = LocationsSection {
      locations: vec![LocationRecord::default(); 64],
    };
    section.locations[2] = LocationRecord {
      left: 32,
      top: 32,
      right: 64,
      bottom: 64,
      name: 1,
      elevation_flags: 0,
    };
    let context = decode_context(&strings, Some(&section));

    let RichSection::Locations(locations) =
      RichSection::decode(&Section::Locations(section.clone()), &context).unwrap()
    else {
      panic!("not a locations section");
    };
    assert_eq!(locations.capacity, 64);
    assert_eq!(locations.locations.len(), 1);
    assert_eq!(locations.locations[0].name, RichString::from("Base"));
    assert_eq!(locations.locations[0].index, Some(3));
  }

  #[test]
  fn switch_names_skip_unnamed_switches() {
    let strings = table(&["Gate", ""]);
    let mut section = SwitchNamesSection::default();
    section.names[7] = 1;
    // an empty name is no custom name
    section.names[9] = 2;
    let context = decode_context(&strings, None);

    let decoded = RichSection::decode(&Section::SwitchNames(section), &context).unwrap();
    assert_eq!(
      decoded,
      RichSection::SwitchNames(Switches {
        switches: vec![Switch {
          name: RichString::from("Gate"),
          index: Some(7),
        }],
      })
    );
  }

  #[test]
  fn unresolved_string_ids_fail() {
    let strings = table(&["only"]);
    let context = decode_context(&strings, None);
    let section = Section::ScenarioProperties(ScenarioPropertiesSection {
      name: 1,
      description: 9,
    });

    assert!(matches!(
      RichSection::decode(&section, &context),
      Err(ChkError::UnresolvedReference { .. })
    ));
  }

  #[test]
  fn section_references_are_strings_only() {
    let section = RichSection::Locations(Locations {
      capacity: 64,
      locations: vec![Location::new(0, 0, 1, 1, "Base")],
    });
    let refs = ReferenceSet::of(&section);
    assert_eq!(refs.strings.len(), 1);
    assert!(refs.locations.is_empty());
  }
}
