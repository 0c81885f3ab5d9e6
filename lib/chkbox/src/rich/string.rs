use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// A string-table reference. `Null` is "no custom string" and is never written to the table;
/// it is distinct from an empty `Text`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RichString {
  #[default]
  Null,
  Text(String),
  /// Table bytes that are not valid UTF-8, kept exactly as read.
  Raw(Vec<u8>),
}

impl RichString {
  pub fn text(value: impl Into<String>) -> Self {
    RichString::Text(value.into())
  }

  /// Interprets raw table bytes: `Text` when they are valid UTF-8, `Raw` otherwise.
  pub fn from_bytes(bytes: &[u8]) -> Self {
    match std::str::from_utf8(bytes) {
      Ok(text) => RichString::Text(text.to_owned()),
      Err(_) => RichString::Raw(bytes.to_vec()),
    }
  }

  /// Only `Text` is borrowed as-is.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      RichString::Text(text) => Some(text),
      RichString::Null | RichString::Raw(_) => None,
    }
  }

  /// Readable text, with `Raw` bytes read as Latin-1.
  pub fn to_text(&self) -> Option<Cow<'_, str>> {
    match self {
      RichString::Null => None,
      RichString::Text(text) => Some(Cow::Borrowed(text)),
      RichString::Raw(bytes) => Some(Cow::Owned(bytes.iter().map(|byte| *byte as char).collect())),
    }
  }

  /// Whether this names a string that holds at least one byte.
  pub fn is_custom(&self) -> bool {
    match self {
      RichString::Null => false,
      RichString::Text(text) => !text.is_empty(),
      RichString::Raw(bytes) => !bytes.is_empty(),
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, RichString::Null)
  }

  /// The bytes this string is stored as in the table.
  pub fn to_bytes(&self) -> Option<Vec<u8>> {
    match self {
      RichString::Null => None,
      RichString::Text(text) => Some(text.as_bytes().to_vec()),
      RichString::Raw(bytes) => Some(bytes.clone()),
    }
  }
}

impl From<&str> for RichString {
  fn from(value: &str) -> Self {
    RichString::text(value)
  }
}

impl From<String> for RichString {
  fn from(value: String) -> Self {
    RichString::Text(value)
  }
}

impl Display for RichString {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      RichString::Null => f.write_str("<null>"),
      RichString::Text(text) => write!(f, "{text:?}"),
      RichString::Raw(_) => write!(f, "{:?}", self.to_text().unwrap_or_default()),
    }
  }
}
