//! The map archive a scenario lives in, reached only through bytes in and bytes out.

use std::io::{Error, ErrorKind, Result as IoResult};

use indexmap::IndexMap;
use log::debug;

use crate::codec::MapCodec;
use crate::error::Result;
use crate::rich::RichChk;

/// Where the scenario sits inside a map archive.
pub const SCENARIO_PATH: &str = "staredit\\scenario.chk";

pub trait MapArchive {
  fn extract(&self, path: &str) -> IoResult<Vec<u8>>;

  /// Returns `false` when `path` exists and `overwrite` is not set.
  fn inject(&mut self, path: &str, data: &[u8], overwrite: bool) -> IoResult<bool>;

  /// Reclaims the space left by replaced files.
  fn compact(&mut self) -> IoResult<()>;
}

/// Decodes the scenario of `archive`.
pub fn load_scenario(archive: &impl MapArchive, codec: &MapCodec) -> Result<RichChk> {
  let data = archive.extract(SCENARIO_PATH)?;
  debug!("read {} byte scenario", data.len());
  codec.decode(&data)
}

/// Encodes `chk` over the scenario of `archive` and compacts it.
pub fn store_scenario(archive: &mut impl MapArchive, codec: &MapCodec, chk: &RichChk) -> Result<()> {
  let data = codec.encode(chk)?;
  if !archive.inject(SCENARIO_PATH, &data, true)? {
    return Err(Error::new(ErrorKind::AlreadyExists, "the archive refused the scenario").into());
  }
  archive.compact()?;
  debug!("wrote {} byte scenario", data.len());
  Ok(())
}

/// An archive held entirely in memory. Paths compare case-insensitively, like the real thing.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
  files: IndexMap<String, Vec<u8>>,
}

impl MemoryArchive {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn paths(&self) -> impl Iterator<Item = &str> {
    self.files.keys().map(String::as_str)
  }

  fn key(path: &str) -> String {
    path.to_ascii_lowercase()
  }
}

impl MapArchive for MemoryArchive {
  fn extract(&self, path: &str) -> IoResult<Vec<u8>> {
    self
      .files
      .get(&Self::key(path))
      .cloned()
      .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("{path} is not in the archive")))
  }

  fn inject(&mut self, path: &str, data: &[u8], overwrite: bool) -> IoResult<bool> {
    let key = Self::key(path);
    if !overwrite && self.files.contains_key(&key) {
      return Ok(false);
    }
    self.files.insert(key, data.to_vec());
    Ok(true)
  }

  fn compact(&mut self) -> IoResult<()> {
    self.files.shrink_to_fit();
    Ok(())
  }
}
