use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use chkbox::rich::RichString;
use chkbox::xref::StringLookup;
use chkbox::DecodedChk;

use crate::read;

#[derive(Parser)]
pub(super) struct StringsModule {
  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Lists every string id and what it reads as.
  Ls { in_file: PathBuf },
}

impl StringsModule {
  pub(super) fn execute(self) -> anyhow::Result<()> {
    match self.command {
      Command::Ls { in_file } => {
        let chk = DecodedChk::decode(&read(&in_file)?)?;
        let table = chk.strings()?;
        let lookup = StringLookup::build(table);

        println!();
        println!("`{}`: {} strings", table.kind(), table.count());
        for id in 1..=table.count() as u32 {
          match lookup.get(id) {
            Some(RichString::Text(text)) => println!("{:>5} | {}", id, text.escape_debug()),
            Some(RichString::Null) => println!("{:>5} | {}", id, "<null>".dimmed()),
            Some(raw @ RichString::Raw(_)) => println!("{:>5} | {} {}", id, raw, "(raw)".dimmed()),
            None => println!("{:>5} | {}", id, "<dangling>".red()),
          }
        }
      }
    }

    Ok(())
  }
}
