use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use chkbox::trigger::{Group, Trigger};
use chkbox::MapCodec;

use crate::read;

#[derive(Parser)]
pub(super) struct TriggersModule {
  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Lists every trigger with its conditions and actions resolved.
  Ls {
    in_file: PathBuf,
    /// Show only the triggers run by this player group, by wire value.
    #[clap(short, long)]
    group: Option<u32>,
  },
}

impl TriggersModule {
  pub(super) fn execute(self) -> anyhow::Result<()> {
    match self.command {
      Command::Ls { in_file, group } => {
        let chk = MapCodec::default().decode(&read(&in_file)?)?;
        let group = group.map(Group::from);

        for (position, trigger) in chk.triggers().enumerate() {
          if group.is_some_and(|group| !trigger.execution.applies_to(group)) {
            continue;
          }
          print_trigger(position, trigger);
        }
      }
    }

    Ok(())
  }
}

fn print_trigger(position: usize, trigger: &Trigger) {
  let players = trigger
    .execution
    .players
    .iter()
    .enumerate()
    .filter(|(_, runs)| **runs)
    .map(|(group, _)| Group::from(group as u32).to_string())
    .collect::<Vec<_>>();

  println!();
  println!("{} {}", format!("#{position}").bold(), players.join(", ").cyan());

  for (slot, condition) in trigger.conditions.iter().enumerate() {
    if let Some(condition) = condition {
      let line = format!("  if   {slot:>2} {:?}", condition.condition);
      if condition.settings.disabled {
        println!("{}", line.dimmed());
      } else {
        println!("{}", line.green());
      }
    }
  }

  for (slot, action) in trigger.actions.iter().enumerate() {
    if let Some(action) = action {
      let line = format!("  then {slot:>2} {:?}", action.action);
      if action.settings.disabled {
        println!("{}", line.dimmed());
      } else {
        println!("{}", line.yellow());
      }
    }
  }
}
