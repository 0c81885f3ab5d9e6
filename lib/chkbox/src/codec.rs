//! Whole-map decoding and encoding: bytes to the rich model and back.

use std::sync::Arc;

use log::debug;

use crate::chk::DecodedChk;
use crate::context::{AudioMetadata, DecodeContext, EncodeContext};
use crate::error::{ChkError, Result};
use crate::rich::{CuwpSlot, ReferenceSet, RichChk, RichSection, Switch};
use crate::section::{
  Section, SectionKind, EXPANSION_LOCATION_CAPACITY, ORIGINAL_LOCATION_CAPACITY,
};
use crate::xref::{CuwpLookup, LocationLookup, StringLookup, SwitchLookup};

/// Sections that may appear at most once.
const SINGLETONS: [SectionKind; 5] = [
  SectionKind::Version,
  SectionKind::Locations,
  SectionKind::SwitchNames,
  SectionKind::CuwpSlots,
  SectionKind::CuwpUsage,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecOptions {
  /// Append `SWNM`, `MRGN`, `UPRP` and `UPUS` when the map lacks them but now needs them.
  /// Without this, encoding such a map fails with `MissingRequiredSection`.
  pub append_missing_sections: bool,
}

impl Default for CodecOptions {
  fn default() -> Self {
    Self {
      append_missing_sections: true,
    }
  }
}

#[derive(Clone, Default)]
pub struct MapCodec {
  options: CodecOptions,
  audio: Option<Arc<dyn AudioMetadata>>,
}

impl MapCodec {
  pub fn new(options: CodecOptions, audio: Option<Arc<dyn AudioMetadata>>) -> Self {
    Self { options, audio }
  }

  pub fn options(&self) -> CodecOptions {
    self.options
  }

  pub fn decode(&self, data: &[u8]) -> Result<RichChk> {
    self.enrich(&DecodedChk::decode(data)?)
  }

  pub fn encode(&self, chk: &RichChk) -> Result<Vec<u8>> {
    self.flatten(chk)?.encode()
  }

  /// The lookups a decoded map's ids resolve against. Every record is kept, so any id the
  /// map's own sections hold resolves.
  pub fn decode_context(&self, chk: &DecodedChk) -> Result<DecodeContext> {
    let strings = StringLookup::build(chk.strings()?);
    for kind in SINGLETONS {
      chk.single(kind)?;
    }

    let locations = match chk.single(SectionKind::Locations)? {
      Some(Section::Locations(section)) => Some(section),
      _ => None,
    };
    let switches = match chk.single(SectionKind::SwitchNames)? {
      Some(Section::SwitchNames(section)) => Some(section),
      _ => None,
    };
    let cuwp = match chk.single(SectionKind::CuwpSlots)? {
      Some(Section::CuwpSlots(section)) => Some(section),
      _ => None,
    };

    Ok(DecodeContext {
      locations: LocationLookup::build(locations, &strings)?,
      switches: SwitchLookup::build(switches, &strings)?,
      cuwp: CuwpLookup::build(cuwp)?,
      strings,
    })
  }

  pub fn enrich(&self, chk: &DecodedChk) -> Result<RichChk> {
    let context = self.decode_context(chk)?;
    let sections = chk
      .sections()
      .iter()
      .map(|section| RichSection::decode(section, &context))
      .collect::<Result<Vec<_>>>()?;

    debug!("enriched {} sections", sections.len());
    Ok(RichChk::new(sections))
  }

  /// Rebuilds every lookup around what `chk` refers to: strings first, so location and switch
  /// names have ids, then locations, switches and unit property slots.
  pub fn encode_context(&self, chk: &RichChk) -> Result<EncodeContext> {
    check_singletons(chk)?;
    let refs = ReferenceSet::of(chk);
    debug!(
      "{} strings, {} locations, {} switches, {} unit property slots referenced",
      refs.strings.len(),
      refs.locations.len(),
      refs.switches.len(),
      refs.cuwp_slots.len()
    );

    let strings = StringLookup::build(chk.strings()?).rebuild(&refs.strings)?;

    let capacity = match (chk.locations(), chk.version()) {
      (Some(locations), _) => locations.capacity,
      (None, Some(version)) if version.is_expansion() => EXPANSION_LOCATION_CAPACITY,
      (None, _) => ORIGINAL_LOCATION_CAPACITY,
    };
    let existing = chk.locations().map(|section| section.locations.clone()).unwrap_or_default();
    let locations =
      LocationLookup::rebuild(capacity, existing.into_iter().chain(refs.locations.iter().cloned()))?;

    let named = chk
      .switches()
      .map(|section| section.switches.clone())
      .unwrap_or_default()
      .into_iter()
      .filter(Switch::has_custom_name);
    let switches = SwitchLookup::rebuild(named.chain(refs.switches.iter().cloned()))?;

    let cuwp =
      CuwpLookup::rebuild(occupied_slots(chk).into_iter().chain(refs.cuwp_slots.iter().cloned()))?;

    Ok(EncodeContext {
      strings,
      locations,
      switches,
      cuwp,
      audio: self.audio.clone(),
    })
  }

  pub fn flatten(&self, chk: &RichChk) -> Result<DecodedChk> {
    let context = self.encode_context(chk)?;
    let mut sections = chk
      .sections()
      .iter()
      .map(|section| section.encode(&context))
      .collect::<Result<Vec<_>>>()?;

    let mut missing = Vec::new();
    if !chk.has(SectionKind::SwitchNames) && context.switches.has_names() {
      missing.push(Section::SwitchNames(context.switches.to_section(&context.strings)?));
    }
    if !chk.has(SectionKind::Locations) && !context.locations.is_empty() {
      missing.push(Section::Locations(context.locations.to_section(&context.strings)?));
    }
    if !context.cuwp.is_empty() {
      let (slots, usage) = context.cuwp.to_sections(&[]);
      if !chk.has(SectionKind::CuwpSlots) {
        missing.push(Section::CuwpSlots(slots));
      }
      if !chk.has(SectionKind::CuwpUsage) {
        missing.push(Section::CuwpUsage(usage));
      }
    }

    for section in missing {
      if !self.options.append_missing_sections {
        return Err(ChkError::MissingRequiredSection(section.kind()));
      }
      debug!("appending a `{}` section", section.kind());
      sections.push(section);
    }

    Ok(DecodedChk::new(sections))
  }
}

fn check_singletons(chk: &RichChk) -> Result<()> {
  let strings = chk.of_kind(SectionKind::Strings).count()
    + chk.of_kind(SectionKind::ExtendedStrings).count();
  match strings {
    0 => return Err(ChkError::MissingRequiredSection(SectionKind::Strings)),
    1 => {}
    count => return Err(ChkError::DuplicateSingletonSection(SectionKind::Strings, count)),
  }

  for kind in SINGLETONS {
    let count = chk.of_kind(kind).count();
    if count > 1 {
      return Err(ChkError::DuplicateSingletonSection(kind, count));
    }
  }
  Ok(())
}

/// The slots the map already uses: those `UPUS` marks, or every non-blank one without it.
fn occupied_slots(chk: &RichChk) -> Vec<CuwpSlot> {
  let Some(slots) = chk.cuwp_slots() else {
    return Vec::new();
  };
  let usage = chk.cuwp_usage();

  slots
    .slots
    .iter()
    .enumerate()
    .filter(|(position, slot)| match usage {
      Some(usage) => usage.used.get(*position).copied().unwrap_or(false),
      None => !slot.is_blank(),
    })
    .map(|(_, slot)| slot.clone())
    .collect()
}
