use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;

use chkbox::DecodedChk;

use crate::{read, Format};

#[derive(Parser)]
pub(super) struct SectionsModule {
  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Lists every section in file order.
  Ls { in_file: PathBuf },
  /// Dumps every section to JSON or YAML.
  Decode {
    in_file: PathBuf,
    out_file: PathBuf,
    #[clap(short, long, default_value_t = Format::Json)]
    format: Format,
  },
  /// Turns a dump back into a CHK blob.
  Encode {
    in_file: PathBuf,
    out_file: PathBuf,
    #[clap(short, long, default_value_t = Format::Json)]
    format: Format,
  },
}

impl SectionsModule {
  pub(super) fn execute(self) -> anyhow::Result<()> {
    match self.command {
      Command::Ls { in_file } => {
        let chk = DecodedChk::decode(&read(&in_file)?)?;

        println!();
        println!("{:<6} | {:<24} | {}", "Tag", "Kind", "Size");
        println!("{:-<6}-|-{:-<24}-|-{:-<10}", "", "", "");
        for section in chk.sections() {
          let kind = section.kind();
          let size = section.encode(false)?.len();
          let tag = format!("{:<6}", format!("`{kind}`"));
          let name = format!("{kind:?}");
          let tag = if name.starts_with("Unknown") {
            tag.yellow()
          } else {
            tag.green()
          };
          println!("{tag} | {name:<24} | {size}");
        }
      }
      Command::Decode {
        in_file,
        out_file,
        format,
      } => {
        let chk = DecodedChk::decode(&read(&in_file)?)?;
        let mut file = BufWriter::new(File::create(&out_file)?);

        match format {
          Format::Json => serde_json::to_writer_pretty(&mut file, &chk)?,
          Format::Yaml => serde_yaml::to_writer(&mut file, &chk)?,
        }
        info!("wrote {} sections to {}", chk.sections().len(), out_file.display());
      }
      Command::Encode {
        in_file,
        out_file,
        format,
      } => {
        let file = BufReader::new(File::open(&in_file)?);
        let chk: DecodedChk = match format {
          Format::Json => serde_json::from_reader(file)?,
          Format::Yaml => serde_yaml::from_reader(file)?,
        };

        let data = chk.encode()?;
        std::fs::write(&out_file, &data)?;
        info!("wrote {} bytes to {}", data.len(), out_file.display());
      }
    }

    Ok(())
  }
}
