use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use chkbox::{CodecOptions, MapCodec};

use crate::sections::SectionsModule;
use crate::strings::StringsModule;
use crate::triggers::TriggersModule;

mod sections;
mod strings;
mod triggers;

#[derive(Parser)]
#[clap(version)]
pub struct Chktool {
  #[clap(subcommand)]
  module: Module,
}

#[derive(Subcommand)]
enum Module {
  Sections(SectionsModule),
  Strings(StringsModule),
  Triggers(TriggersModule),
  /// Decodes a map to the rich model and encodes it again, rebuilding every cross-reference.
  Rebuild {
    in_file: PathBuf,
    out_file: PathBuf,
    /// Fail instead of adding sections the input lacks but the rebuilt map needs.
    #[clap(long)]
    no_append: bool,
  },
}

#[derive(Clone, ValueEnum)]
pub enum Format {
  Json,
  Yaml,
}

impl Display for Format {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Format::Json => f.write_str("json"),
      Format::Yaml => f.write_str("yaml"),
    }
  }
}

impl Chktool {
  pub fn execute(self) -> anyhow::Result<()> {
    match self.module {
      Module::Sections(module) => module.execute(),
      Module::Strings(module) => module.execute(),
      Module::Triggers(module) => module.execute(),
      Module::Rebuild {
        in_file,
        out_file,
        no_append,
      } => {
        let codec = MapCodec::new(
          CodecOptions {
            append_missing_sections: !no_append,
          },
          None,
        );

        let data = read(&in_file)?;
        let chk = codec.decode(&data)?;
        let rebuilt = codec.encode(&chk)?;
        fs::write(&out_file, &rebuilt)?;
        info!(
          "rebuilt {} ({} bytes) into {} ({} bytes)",
          in_file.display(),
          data.len(),
          out_file.display(),
          rebuilt.len()
        );
        Ok(())
      }
    }
  }
}

pub(crate) fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
  let data = fs::read(path)?;
  info!("read {} bytes from {}", data.len(), path.display());
  Ok(data)
}

fn main() -> anyhow::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  Chktool::parse().execute()
}
