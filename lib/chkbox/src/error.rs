use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::section::SectionKind;

pub type Result<T, E = ChkError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ChkError {
  #[error("section `{kind}` is malformed: {reason}")]
  Malformed { kind: SectionKind, reason: String },
  #[error("the required section `{0}` is missing")]
  MissingRequiredSection(SectionKind),
  #[error("the section `{0}` may only appear once but was found {1} times")]
  DuplicateSingletonSection(SectionKind, usize),
  #[error("the {what} table is full (capacity {capacity})")]
  CapacityExceeded { what: Entity, capacity: usize },
  #[error("{what} {detail} has no id in this map")]
  UnresolvedReference { what: Entity, detail: String },
  #[error("no {what} is registered for kind {kind}")]
  UnregisteredVariant { what: Entity, kind: u32 },
  #[error("there is no {what} at position {position}")]
  NoSuchEntry { what: Entity, position: usize },
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// What a capacity or reference error talks about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
  String,
  StringOffset,
  Location,
  Switch,
  CuwpSlot,
  Trigger,
  Condition,
  Action,
  Sound,
  Section,
}

impl Display for Entity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Entity::String => "string",
      Entity::StringOffset => "string offset",
      Entity::Location => "location",
      Entity::Switch => "switch",
      Entity::CuwpSlot => "unit property slot",
      Entity::Trigger => "trigger",
      Entity::Condition => "condition",
      Entity::Action => "action",
      Entity::Sound => "sound",
      Entity::Section => "section",
    })
  }
}

impl ChkError {
  pub(crate) fn malformed(kind: SectionKind, reason: impl Into<String>) -> Self {
    ChkError::Malformed {
      kind,
      reason: reason.into(),
    }
  }

  pub(crate) fn unresolved(what: Entity, detail: impl Display) -> Self {
    ChkError::UnresolvedReference {
      what,
      detail: detail.to_string(),
    }
  }

  pub(crate) fn capacity(what: Entity, capacity: usize) -> Self {
    ChkError::CapacityExceeded { what, capacity }
  }
}
