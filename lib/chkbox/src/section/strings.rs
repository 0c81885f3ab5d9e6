use std::io::Cursor;

use binrw::{BinRead, BinWrite, NullString};
use serde::{Deserialize, Serialize};

use crate::error::{ChkError, Entity, Result};
use crate::section::{bytes, SectionKind};

/// Integer width of the count and offsets: `STR ` uses 2 bytes, `STRx` uses 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetWidth {
  Narrow,
  Wide,
}

impl OffsetWidth {
  pub const fn bytes(self) -> usize {
    match self {
      OffsetWidth::Narrow => 2,
      OffsetWidth::Wide => 4,
    }
  }

  pub const fn max(self) -> u64 {
    match self {
      OffsetWidth::Narrow => u16::MAX as u64,
      OffsetWidth::Wide => u32::MAX as u64,
    }
  }

  pub const fn kind(self) -> SectionKind {
    match self {
      OffsetWidth::Narrow => SectionKind::Strings,
      OffsetWidth::Wide => SectionKind::ExtendedStrings,
    }
  }
}

/// The string table. String ids are 1-based indexes into `offsets`; the offsets are byte
/// positions from the start of the section and may alias each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTable {
  pub width: OffsetWidth,
  pub offsets: Vec<u32>,
  /// Every NUL-terminated run after the offset table, terminators stripped.
  #[serde(with = "bytes::runs")]
  pub strings: Vec<Vec<u8>>,
}

impl StringTable {
  pub fn new(width: OffsetWidth) -> Self {
    Self {
      width,
      offsets: Vec::new(),
      strings: Vec::new(),
    }
  }

  pub fn kind(&self) -> SectionKind {
    self.width.kind()
  }

  pub fn count(&self) -> usize {
    self.offsets.len()
  }

  pub fn header_size(&self) -> usize {
    self.width.bytes() * (1 + self.offsets.len())
  }

  pub fn data_size(&self) -> usize {
    self.strings.iter().map(|run| run.len() + 1).sum()
  }

  pub fn decode(payload: &[u8], width: OffsetWidth) -> Result<Self> {
    let kind = width.kind();
    let mut reader = Cursor::new(payload);
    let malformed = |err: binrw::Error| ChkError::malformed(kind, err.to_string());

    let count = read_width(&mut reader, width).map_err(malformed)? as usize;
    let header_size = width.bytes() * (1 + count);
    if header_size > payload.len() {
      return Err(ChkError::malformed(
        kind,
        format!(
          "declares {count} strings but the section holds only {} bytes",
          payload.len()
        ),
      ));
    }

    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
      offsets.push(read_width(&mut reader, width).map_err(malformed)?);
    }

    let mut strings = Vec::new();
    while (reader.position() as usize) < payload.len() {
      let start = reader.position();
      let run = NullString::read_le(&mut reader).map_err(|_| {
        ChkError::malformed(kind, format!("string at byte {start} has no terminator"))
      })?;
      strings.push(run.0);
    }

    Ok(Self {
      width,
      offsets,
      strings,
    })
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    let kind = self.kind();
    let count = self.offsets.len() as u64;
    if count > self.width.max() {
      return Err(ChkError::capacity(Entity::String, self.width.max() as usize));
    }

    let mut writer = Cursor::new(Vec::with_capacity(self.header_size() + self.data_size()));
    let malformed = |err: binrw::Error| ChkError::malformed(kind, err.to_string());

    write_width(&mut writer, self.width, count as u32).map_err(malformed)?;
    for offset in &self.offsets {
      if u64::from(*offset) > self.width.max() {
        return Err(ChkError::capacity(
          Entity::StringOffset,
          self.width.max() as usize,
        ));
      }
      write_width(&mut writer, self.width, *offset).map_err(malformed)?;
    }

    for run in &self.strings {
      if run.contains(&0) {
        return Err(ChkError::malformed(kind, "a string contains an embedded NUL"));
      }
      NullString(run.clone()).write_le(&mut writer).map_err(malformed)?;
    }

    Ok(writer.into_inner())
  }

  /// Reads the string starting at `offset`, which may land inside a longer run.
  pub fn resolve(&self, offset: u32) -> Option<&[u8]> {
    let offset = offset as usize;
    let mut start = self.header_size();

    for run in &self.strings {
      let end = start + run.len();
      if (start..=end).contains(&offset) {
        return Some(&run[offset - start..]);
      }
      start = end + 1;
    }

    None
  }

  /// Looks up a 1-based string id. Id 0 is "no string" and never resolves.
  pub fn get(&self, id: u32) -> Option<&[u8]> {
    let index = (id as usize).checked_sub(1)?;
    self.resolve(*self.offsets.get(index)?)
  }

  /// Appends `new` strings, growing the offset table and shifting every existing offset by the
  /// size of the added offset slots.
  pub fn with_appended(&self, new: &[Vec<u8>]) -> Result<Self> {
    if new.is_empty() {
      return Ok(self.clone());
    }

    let count = self.offsets.len() + new.len();
    if count as u64 > self.width.max() {
      return Err(ChkError::capacity(Entity::String, self.width.max() as usize));
    }

    let shift = (new.len() * self.width.bytes()) as u64;
    let mut offsets = Vec::with_capacity(count);
    for offset in &self.offsets {
      offsets.push(self.checked_offset(u64::from(*offset) + shift)?);
    }

    let mut next = (self.header_size() + self.data_size()) as u64 + shift;
    for run in new {
      offsets.push(self.checked_offset(next)?);
      next += run.len() as u64 + 1;
    }

    let mut strings = self.strings.clone();
    strings.extend(new.iter().cloned());

    Ok(Self {
      width: self.width,
      offsets,
      strings,
    })
  }

  fn checked_offset(&self, offset: u64) -> Result<u32> {
    if offset > self.width.max() {
      return Err(ChkError::capacity(
        Entity::StringOffset,
        self.width.max() as usize,
      ));
    }
    Ok(offset as u32)
  }
}

fn read_width(reader: &mut Cursor<&[u8]>, width: OffsetWidth) -> binrw::BinResult<u32> {
  match width {
    OffsetWidth::Narrow => u16::read_le(reader).map(u32::from),
    OffsetWidth::Wide => u32::read_le(reader),
  }
}

fn write_width(writer: &mut Cursor<Vec<u8>>, width: OffsetWidth, value: u32) -> binrw::BinResult<()> {
  match width {
    OffsetWidth::Narrow => (value as u16).write_le(writer),
    OffsetWidth::Wide => value.write_le(writer),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SINGLE: [u8; 7] = [1, 0, 4, 0, b'a', 0, 0];

  #[test]
  fn decodes_single_string() {
    let bytes = &SINGLE[..6];
    let table = StringTable::decode(bytes, OffsetWidth::Narrow).unwrap();
    assert_eq!(table.offsets, vec![4]);
    assert_eq!(table.strings, vec![b"a".to_vec()]);
    assert_eq!(table.get(1), Some(&b"a"[..]));
    assert_eq!(table.get(0), None);
    assert_eq!(table.encode().unwrap(), bytes);
  }

  #[test]
  fn trailing_empty_runs_survive() {
    let table = StringTable::decode(&SINGLE, OffsetWidth::Narrow).unwrap();
    assert_eq!(table.strings, vec![b"a".to_vec(), Vec::new()]);
    assert_eq!(table.encode().unwrap(), SINGLE);
  }

  #[test]
  fn aliased_and_suffix_offsets() {
    // header: count 3 + three offsets = 8 bytes; "ab" at 8, "c" at 11
    let bytes = [3, 0, 8, 0, 8, 0, 11, 0, b'a', b'b', 0, b'c', 0];
    let table = StringTable::decode(&bytes, OffsetWidth::Narrow).unwrap();

    assert_eq!(table.strings.len(), 2);
    assert_eq!(table.get(1), Some(&b"ab"[..]));
    assert_eq!(table.get(2), Some(&b"ab"[..]));
    assert_eq!(table.get(3), Some(&b"c"[..]));
    assert_eq!(table.resolve(9), Some(&b"b"[..]));
    assert_eq!(table.resolve(10), Some(&b""[..]));
    assert_eq!(table.resolve(13), None);
    assert_eq!(table.get(4), None);
    assert_eq!(table.encode().unwrap(), bytes);
  }

  #[test]
  fn wide_tables_round_trip() {
    let bytes = [
      2, 0, 0, 0, 12, 0, 0, 0, 15, 0, 0, 0, b'h', b'i', 0, b'y', b'o', 0,
    ];
    let table = StringTable::decode(&bytes, OffsetWidth::Wide).unwrap();
    assert_eq!(table.kind(), SectionKind::ExtendedStrings);
    assert_eq!(table.get(2), Some(&b"yo"[..]));
    assert_eq!(table.encode().unwrap(), bytes);
  }

  #[test]
  fn rejects_missing_terminator() {
    let bytes = [1, 0, 4, 0, b'a', b'b'];
    assert!(matches!(
      StringTable::decode(&bytes, OffsetWidth::Narrow),
      Err(ChkError::Malformed { .. })
    ));
  }

  #[test]
  fn rejects_count_past_end() {
    let bytes = [9, 0, 4, 0, 0];
    assert!(matches!(
      StringTable::decode(&bytes, OffsetWidth::Narrow),
      Err(ChkError::Malformed { .. })
    ));
    assert!(StringTable::decode(&[], OffsetWidth::Wide).is_err());
  }

  #[test]
  fn appending_shifts_existing_offsets() {
    let table = StringTable::decode(&SINGLE[..6], OffsetWidth::Narrow).unwrap();
    let grown = table
      .with_appended(&[b"xy".to_vec(), b"z".to_vec()])
      .unwrap();

    assert_eq!(grown.count(), 3);
    // two new offset slots of two bytes each
    assert_eq!(grown.offsets, vec![8, 10, 13]);
    assert_eq!(grown.get(1), Some(&b"a"[..]));
    assert_eq!(grown.get(2), Some(&b"xy"[..]));
    assert_eq!(grown.get(3), Some(&b"z"[..]));

    let reparsed = StringTable::decode(&grown.encode().unwrap(), OffsetWidth::Narrow).unwrap();
    assert_eq!(reparsed, grown);
  }

  #[test]
  fn appending_nothing_is_identity() {
    let table = StringTable::decode(&SINGLE, OffsetWidth::Narrow).unwrap();
    assert_eq!(table.with_appended(&[]).unwrap(), table);
  }

  #[test]
  fn narrow_offsets_overflow() {
    let mut table = StringTable::new(OffsetWidth::Narrow);
    table.offsets.push(4);
    table.strings.push(vec![b'x'; u16::MAX as usize]);

    assert!(matches!(
      table.with_appended(&[b"late".to_vec()]),
      Err(ChkError::CapacityExceeded {
        what: Entity::StringOffset,
        ..
      })
    ));
  }
}
