//! Serde adapters for raw byte payloads.

const BASE64_PREFIX: &str = "base64:";

pub(crate) mod base64 {
  use base64::{engine::general_purpose, Engine as _};
  use serde::{Deserialize, Serialize};
  use serde::{Deserializer, Serializer};

  use super::BASE64_PREFIX;

  pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
    String::serialize(&super::to_base64(v), s)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let base64 = String::deserialize(d)?;
    match base64.strip_prefix(BASE64_PREFIX) {
      None => Err(serde::de::Error::custom("missing \"base64:\" prefix")),
      Some(base64) => general_purpose::STANDARD_NO_PAD
        .decode(base64.as_bytes())
        .map_err(serde::de::Error::custom),
    }
  }
}

/// String table runs: plain text when they are valid UTF-8, `base64:` otherwise.
pub(crate) mod runs {
  use base64::{engine::general_purpose, Engine as _};
  use serde::{Deserialize, Deserializer, Serializer};

  use super::BASE64_PREFIX;

  pub fn serialize<S: Serializer>(runs: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(runs.iter().map(|run| match std::str::from_utf8(run) {
      Ok(text) if !text.starts_with(BASE64_PREFIX) => text.to_string(),
      _ => super::to_base64(run),
    }))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
    Vec::<String>::deserialize(d)?
      .into_iter()
      .map(|run| match run.strip_prefix(BASE64_PREFIX) {
        Some(base64) => general_purpose::STANDARD_NO_PAD
          .decode(base64.as_bytes())
          .map_err(serde::de::Error::custom),
        None => Ok(run.into_bytes()),
      })
      .collect()
  }
}

fn to_base64(data: &[u8]) -> String {
  use ::base64::{engine::general_purpose, Engine as _};
  format!(
    "{BASE64_PREFIX}{}",
    general_purpose::STANDARD_NO_PAD.encode(data)
  )
}
