use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ChkError, Result};
use crate::section::{split_records, Section, SectionKind, StringTable};

/// Every section of a CHK blob in file order, each decoded to its faithful form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Section>", into = "Vec<Section>")]
pub struct DecodedChk {
  sections: Vec<Section>,
  index: IndexMap<SectionKind, Vec<usize>>,
}

impl From<Vec<Section>> for DecodedChk {
  fn from(sections: Vec<Section>) -> Self {
    Self::new(sections)
  }
}

impl From<DecodedChk> for Vec<Section> {
  fn from(chk: DecodedChk) -> Self {
    chk.sections
  }
}

impl DecodedChk {
  pub fn new(sections: Vec<Section>) -> Self {
    let mut index: IndexMap<SectionKind, Vec<usize>> = IndexMap::new();
    for (position, section) in sections.iter().enumerate() {
      index.entry(section.kind()).or_default().push(position);
    }
    Self { sections, index }
  }

  pub fn decode(data: &[u8]) -> Result<Self> {
    let records = split_records(data)?;
    debug!("decoding {} sections", records.len());

    let sections = records
      .into_iter()
      .map(|(tag, payload)| Section::decode(tag, payload))
      .collect::<Result<Vec<_>>>()?;

    Ok(Self::new(sections))
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for section in &self.sections {
      data.extend(section.encode(true)?);
    }
    debug!("encoded {} sections into {} bytes", self.sections.len(), data.len());
    Ok(data)
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  pub fn into_sections(self) -> Vec<Section> {
    self.sections
  }

  /// Section kinds in the order they first appear.
  pub fn kinds(&self) -> impl Iterator<Item = SectionKind> + '_ {
    self.index.keys().copied()
  }

  pub fn of_kind(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
    self
      .index
      .get(&kind)
      .into_iter()
      .flatten()
      .map(|position| &self.sections[*position])
  }

  /// The one section of `kind`, if any. More than one is an error.
  pub fn single(&self, kind: SectionKind) -> Result<Option<&Section>> {
    match self.index.get(&kind).map(Vec::as_slice) {
      None | Some([]) => Ok(None),
      Some([position]) => Ok(Some(&self.sections[*position])),
      Some(positions) => Err(ChkError::DuplicateSingletonSection(kind, positions.len())),
    }
  }

  /// The string table: exactly one `STR ` or `STRx` must be present.
  pub fn strings(&self) -> Result<&StringTable> {
    let narrow = self.index.get(&SectionKind::Strings).map_or(0, Vec::len);
    let wide = self.index.get(&SectionKind::ExtendedStrings).map_or(0, Vec::len);

    match (narrow, wide) {
      (0, 0) => Err(ChkError::MissingRequiredSection(SectionKind::Strings)),
      (1, 0) | (0, 1) => {
        let kind = if narrow == 1 {
          SectionKind::Strings
        } else {
          SectionKind::ExtendedStrings
        };
        match self.single(kind)? {
          Some(Section::Strings(table)) => Ok(table),
          _ => Err(ChkError::MissingRequiredSection(kind)),
        }
      }
      (narrow, 0) => Err(ChkError::DuplicateSingletonSection(SectionKind::Strings, narrow)),
      (0, wide) => Err(ChkError::DuplicateSingletonSection(
        SectionKind::ExtendedStrings,
        wide,
      )),
      (narrow, wide) => Err(ChkError::DuplicateSingletonSection(
        SectionKind::Strings,
        narrow + wide,
      )),
    }
  }
}
