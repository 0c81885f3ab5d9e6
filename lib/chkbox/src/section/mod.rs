//! Faithful, wire-exact codecs for every recognized CHK section.
//!
//! Each section kind decodes from its payload alone and encodes back to the identical bytes.
//! Nothing in here knows about other sections; cross-references are resolved later by
//! [`crate::context`].

use std::fmt::{Display, Formatter};
use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};
use serde::{Deserialize, Serialize};

use crate::error::{ChkError, Result};

pub use self::cuwp::*;
pub use self::locations::*;
pub use self::scenario::*;
pub use self::strings::*;
pub use self::switches::*;
pub use self::triggers::*;
pub use self::units::*;

pub(crate) mod bytes;
mod cuwp;
mod locations;
mod scenario;
mod strings;
mod switches;
mod triggers;
mod units;

pub const SECTION_HEADER_SIZE: usize = 8;

#[binrw]
#[brw(little)]
#[derive(Debug)]
pub(crate) struct SectionHeader {
  pub(crate) tag: [u8; 4],
  pub(crate) size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
  Version,
  Strings,
  ExtendedStrings,
  Locations,
  SwitchNames,
  CuwpSlots,
  CuwpUsage,
  UnitSettings,
  ExpansionUnitSettings,
  Sounds,
  Triggers,
  Briefing,
  ScenarioProperties,
  Forces,
  Unknown([u8; 4]),
}

impl SectionKind {
  pub const fn tag(&self) -> [u8; 4] {
    match self {
      SectionKind::Version => *b"VER ",
      SectionKind::Strings => *b"STR ",
      SectionKind::ExtendedStrings => *b"STRx",
      SectionKind::Locations => *b"MRGN",
      SectionKind::SwitchNames => *b"SWNM",
      SectionKind::CuwpSlots => *b"UPRP",
      SectionKind::CuwpUsage => *b"UPUS",
      SectionKind::UnitSettings => *b"UNIS",
      SectionKind::ExpansionUnitSettings => *b"UNIx",
      SectionKind::Sounds => *b"WAV ",
      SectionKind::Triggers => *b"TRIG",
      SectionKind::Briefing => *b"MBRF",
      SectionKind::ScenarioProperties => *b"SPRP",
      SectionKind::Forces => *b"FORC",
      SectionKind::Unknown(tag) => *tag,
    }
  }

  pub fn from_tag(tag: [u8; 4]) -> Self {
    match &tag {
      b"VER " => SectionKind::Version,
      b"STR " => SectionKind::Strings,
      b"STRx" => SectionKind::ExtendedStrings,
      b"MRGN" => SectionKind::Locations,
      b"SWNM" => SectionKind::SwitchNames,
      b"UPRP" => SectionKind::CuwpSlots,
      b"UPUS" => SectionKind::CuwpUsage,
      b"UNIS" => SectionKind::UnitSettings,
      b"UNIx" => SectionKind::ExpansionUnitSettings,
      b"WAV " => SectionKind::Sounds,
      b"TRIG" => SectionKind::Triggers,
      b"MBRF" => SectionKind::Briefing,
      b"SPRP" => SectionKind::ScenarioProperties,
      b"FORC" => SectionKind::Forces,
      _ => SectionKind::Unknown(tag),
    }
  }
}

impl Display for SectionKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let tag = self.tag();
    for byte in tag {
      if byte.is_ascii_graphic() || byte == b' ' {
        write!(f, "{}", byte as char)?;
      } else {
        write!(f, "\\x{byte:02x}")?;
      }
    }
    Ok(())
  }
}

/// A section whose tag this crate does not interpret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownSection {
  pub tag: [u8; 4],
  #[serde(with = "bytes::base64")]
  pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
  Version(VersionSection),
  Strings(StringTable),
  Locations(LocationsSection),
  SwitchNames(SwitchNamesSection),
  CuwpSlots(CuwpSlotsSection),
  CuwpUsage(CuwpUsageSection),
  UnitSettings(UnitSettingsSection),
  Sounds(SoundsSection),
  Triggers(TriggerTable),
  Briefing(TriggerTable),
  ScenarioProperties(ScenarioPropertiesSection),
  Forces(ForcesSection),
  Unknown(UnknownSection),
}

impl Section {
  pub fn kind(&self) -> SectionKind {
    match self {
      Section::Version(_) => SectionKind::Version,
      Section::Strings(table) => table.kind(),
      Section::Locations(_) => SectionKind::Locations,
      Section::SwitchNames(_) => SectionKind::SwitchNames,
      Section::CuwpSlots(_) => SectionKind::CuwpSlots,
      Section::CuwpUsage(_) => SectionKind::CuwpUsage,
      Section::UnitSettings(settings) => settings.kind(),
      Section::Sounds(_) => SectionKind::Sounds,
      Section::Triggers(_) => SectionKind::Triggers,
      Section::Briefing(_) => SectionKind::Briefing,
      Section::ScenarioProperties(_) => SectionKind::ScenarioProperties,
      Section::Forces(_) => SectionKind::Forces,
      Section::Unknown(unknown) => SectionKind::Unknown(unknown.tag),
    }
  }

  pub fn decode(tag: [u8; 4], payload: &[u8]) -> Result<Self> {
    let kind = SectionKind::from_tag(tag);
    log::trace!("decoding `{kind}` ({} bytes)", payload.len());

    Ok(match kind {
      SectionKind::Version => Section::Version(VersionSection::decode(payload)?),
      SectionKind::Strings => Section::Strings(StringTable::decode(payload, OffsetWidth::Narrow)?),
      SectionKind::ExtendedStrings => {
        Section::Strings(StringTable::decode(payload, OffsetWidth::Wide)?)
      }
      SectionKind::Locations => Section::Locations(LocationsSection::decode(payload)?),
      SectionKind::SwitchNames => Section::SwitchNames(SwitchNamesSection::decode(payload)?),
      SectionKind::CuwpSlots => Section::CuwpSlots(CuwpSlotsSection::decode(payload)?),
      SectionKind::CuwpUsage => Section::CuwpUsage(CuwpUsageSection::decode(payload)?),
      SectionKind::UnitSettings => {
        Section::UnitSettings(UnitSettingsSection::decode(payload, false)?)
      }
      SectionKind::ExpansionUnitSettings => {
        Section::UnitSettings(UnitSettingsSection::decode(payload, true)?)
      }
      SectionKind::Sounds => Section::Sounds(SoundsSection::decode(payload)?),
      SectionKind::Triggers => Section::Triggers(TriggerTable::decode(kind, payload)?),
      SectionKind::Briefing => Section::Briefing(TriggerTable::decode(kind, payload)?),
      SectionKind::ScenarioProperties => {
        Section::ScenarioProperties(ScenarioPropertiesSection::decode(payload)?)
      }
      SectionKind::Forces => Section::Forces(ForcesSection::decode(payload)?),
      SectionKind::Unknown(tag) => Section::Unknown(UnknownSection {
        tag,
        data: payload.to_vec(),
      }),
    })
  }

  pub fn encode(&self, include_header: bool) -> Result<Vec<u8>> {
    let payload = match self {
      Section::Version(version) => version.encode()?,
      Section::Strings(table) => table.encode()?,
      Section::Locations(locations) => locations.encode()?,
      Section::SwitchNames(names) => names.encode()?,
      Section::CuwpSlots(slots) => slots.encode()?,
      Section::CuwpUsage(usage) => usage.encode()?,
      Section::UnitSettings(settings) => settings.encode()?,
      Section::Sounds(sounds) => sounds.encode()?,
      Section::Triggers(table) | Section::Briefing(table) => table.encode(self.kind())?,
      Section::ScenarioProperties(properties) => properties.encode()?,
      Section::Forces(forces) => forces.encode()?,
      Section::Unknown(unknown) => unknown.data.clone(),
    };

    if !include_header {
      return Ok(payload);
    }

    let kind = self.kind();
    let size = u32::try_from(payload.len())
      .map_err(|_| ChkError::malformed(kind, "payload does not fit a u32 length"))?;

    let mut writer = Cursor::new(Vec::with_capacity(SECTION_HEADER_SIZE + payload.len()));
    SectionHeader {
      tag: kind.tag(),
      size,
    }
    .write_le(&mut writer)
    .map_err(|err| ChkError::malformed(kind, err.to_string()))?;

    let mut bytes = writer.into_inner();
    bytes.extend_from_slice(&payload);
    Ok(bytes)
  }
}

/// Splits a CHK blob into its `(tag, payload)` records, in file order.
pub fn split_records(data: &[u8]) -> Result<Vec<([u8; 4], &[u8])>> {
  let mut records = Vec::new();
  let mut reader = Cursor::new(data);

  while (reader.position() as usize) < data.len() {
    let start = reader.position() as usize;
    if data.len() - start < SECTION_HEADER_SIZE {
      let kind = SectionKind::from_tag(partial_tag(&data[start..]));
      return Err(ChkError::malformed(
        kind,
        format!("section header at byte {start} is cut short"),
      ));
    }

    let header = SectionHeader::read_le(&mut reader).map_err(|err| {
      ChkError::malformed(SectionKind::from_tag(partial_tag(&data[start..])), err.to_string())
    })?;

    let payload_start = start + SECTION_HEADER_SIZE;
    let payload_end = payload_start + header.size as usize;
    if payload_end > data.len() {
      return Err(ChkError::malformed(
        SectionKind::from_tag(header.tag),
        format!(
          "declares {} bytes but only {} remain",
          header.size,
          data.len() - payload_start
        ),
      ));
    }

    records.push((header.tag, &data[payload_start..payload_end]));
    reader.set_position(payload_end as u64);
  }

  Ok(records)
}

fn partial_tag(bytes: &[u8]) -> [u8; 4] {
  let mut tag = [0u8; 4];
  let len = bytes.len().min(4);
  tag[..len].copy_from_slice(&bytes[..len]);
  tag
}

pub(crate) fn decode_exact<T>(kind: SectionKind, payload: &[u8], expected: usize) -> Result<T>
where
  T: for<'a> BinRead<Args<'a> = ()>,
{
  if payload.len() != expected {
    return Err(ChkError::malformed(
      kind,
      format!("expected {expected} bytes, found {}", payload.len()),
    ));
  }

  T::read_le(&mut Cursor::new(payload)).map_err(|err| ChkError::malformed(kind, err.to_string()))
}

pub(crate) fn decode_records<T>(kind: SectionKind, payload: &[u8], record_size: usize) -> Result<Vec<T>>
where
  T: for<'a> BinRead<Args<'a> = ()>,
{
  if payload.len() % record_size != 0 {
    return Err(ChkError::malformed(
      kind,
      format!(
        "{} bytes is not a whole number of {record_size}-byte records",
        payload.len()
      ),
    ));
  }

  let count = payload.len() / record_size;
  let mut reader = Cursor::new(payload);
  let mut records = Vec::with_capacity(count);
  for _ in 0..count {
    records.push(T::read_le(&mut reader).map_err(|err| ChkError::malformed(kind, err.to_string()))?);
  }

  Ok(records)
}

pub(crate) fn encode_le<T>(kind: SectionKind, value: &T) -> Result<Vec<u8>>
where
  T: for<'a> BinWrite<Args<'a> = ()>,
{
  let mut writer = Cursor::new(Vec::new());
  value
    .write_le(&mut writer)
    .map_err(|err| ChkError::malformed(kind, err.to_string()))?;
  Ok(writer.into_inner())
}

/// Checks that a fixed-count table holds exactly `expected` entries before it is written.
pub(crate) fn expect_count(kind: SectionKind, field: &str, actual: usize, expected: usize) -> Result<()> {
  if actual != expected {
    return Err(ChkError::malformed(
      kind,
      format!("`{field}` holds {actual} entries, expected {expected}"),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_tags_pass_through() {
    let section = Section::decode(*b"ISOM", &[1, 2, 3]).unwrap();
    assert_eq!(section.kind(), SectionKind::Unknown(*b"ISOM"));
    assert_eq!(section.encode(false).unwrap(), vec![1, 2, 3]);
    assert_eq!(
      section.encode(true).unwrap(),
      vec![b'I', b'S', b'O', b'M', 3, 0, 0, 0, 1, 2, 3]
    );
  }

  #[test]
  fn split_records_keeps_duplicates_in_order() {
    let data = [
      b'A', b'B', b'C', b'D', 1, 0, 0, 0, 9, //
      b'A', b'B', b'C', b'D', 0, 0, 0, 0, //
      b'V', b'E', b'R', b' ', 2, 0, 0, 0, 206, 0,
    ];

    let records = split_records(&data).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], (*b"ABCD", &[9u8][..]));
    assert_eq!(records[1], (*b"ABCD", &[][..]));
    assert_eq!(records[2], (*b"VER ", &[206u8, 0][..]));
  }

  #[test]
  fn split_records_rejects_truncation() {
    assert!(matches!(
      split_records(b"VER \x02\x00"),
      Err(ChkError::Malformed { .. })
    ));
    assert!(matches!(
      split_records(b"VER \x04\x00\x00\x00\xce\x00"),
      Err(ChkError::Malformed { .. })
    ));
  }

  #[test]
  fn kind_display_escapes_binary_tags() {
    assert_eq!(SectionKind::Version.to_string(), "VER ");
    assert_eq!(SectionKind::Unknown([b'A', 0, 0xff, b'Z']).to_string(), "A\\x00\\xffZ");
  }
}
