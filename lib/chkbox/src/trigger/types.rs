use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::error::{ChkError, Result};
use crate::section::SectionKind;

wire_enum! {
  /// How a condition compares a counter.
  pub enum Comparison: u8 {
    AtLeast = 0,
    AtMost = 1,
    Exactly = 10,
  }
}

wire_enum! {
  pub enum NumericModifier: u8 {
    SetTo = 7,
    Add = 8,
    Subtract = 9,
  }
}

wire_enum! {
  /// The switch state a condition checks for.
  pub enum SwitchState: u8 {
    Set = 2,
    Cleared = 3,
  }
}

wire_enum! {
  pub enum SwitchAction: u8 {
    Set = 4,
    Clear = 5,
    Toggle = 6,
    Randomize = 11,
  }
}

wire_enum! {
  pub enum ToggleState: u8 {
    Enable = 4,
    Disable = 5,
    Toggle = 6,
  }
}

wire_enum! {
  pub enum ResourceType: u16 {
    Ore = 0,
    Gas = 1,
    OreAndGas = 2,
  }
}

wire_enum! {
  pub enum ScoreType: u16 {
    Total = 0,
    Units = 1,
    Buildings = 2,
    UnitsAndBuildings = 3,
    Kills = 4,
    Razings = 5,
    KillsAndRazings = 6,
    Custom = 7,
  }
}

wire_enum! {
  pub enum AllianceStatus: u16 {
    Enemy = 0,
    Ally = 1,
    AlliedVictory = 2,
  }
}

wire_enum! {
  pub enum UnitOrder: u8 {
    Move = 0,
    Patrol = 1,
    Attack = 2,
  }
}

/// A player or group of players a trigger, condition or action applies to.
///
/// `Player` and `Force` only hold their wire ranges; build them with [`Group::player`] and
/// [`Group::force`] to stay inside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
  /// 0-based, 0 to 11: `Player(0)` is player 1.
  Player(u8),
  CurrentPlayer,
  Foes,
  Allies,
  NeutralPlayers,
  AllPlayers,
  /// 0-based, 0 to 3: `Force(0)` is force 1.
  Force(u8),
  NonAlliedVictoryPlayers,
  Other(u32),
}

impl Group {
  pub const PLAYERS: u8 = 12;
  pub const FORCES: u8 = 4;

  pub fn player(player: u8) -> Option<Group> {
    (player < Self::PLAYERS).then_some(Group::Player(player))
  }

  pub fn force(force: u8) -> Option<Group> {
    (force < Self::FORCES).then_some(Group::Force(force))
  }
}

impl From<u32> for Group {
  fn from(value: u32) -> Self {
    match value {
      0..=11 => Group::Player(value as u8),
      13 => Group::CurrentPlayer,
      14 => Group::Foes,
      15 => Group::Allies,
      16 => Group::NeutralPlayers,
      17 => Group::AllPlayers,
      18..=21 => Group::Force((value - 18) as u8),
      26 => Group::NonAlliedVictoryPlayers,
      other => Group::Other(other),
    }
  }
}

impl From<Group> for u32 {
  fn from(value: Group) -> Self {
    match value {
      Group::Player(player) => u32::from(player),
      Group::CurrentPlayer => 13,
      Group::Foes => 14,
      Group::Allies => 15,
      Group::NeutralPlayers => 16,
      Group::AllPlayers => 17,
      Group::Force(force) => 18 + u32::from(force),
      Group::NonAlliedVictoryPlayers => 26,
      Group::Other(other) => other,
    }
  }
}

impl Display for Group {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Group::Player(player) => write!(f, "Player {}", u32::from(*player) + 1),
      Group::CurrentPlayer => f.write_str("Current Player"),
      Group::Foes => f.write_str("Foes"),
      Group::Allies => f.write_str("Allies"),
      Group::NeutralPlayers => f.write_str("Neutral Players"),
      Group::AllPlayers => f.write_str("All Players"),
      Group::Force(force) => write!(f, "Force {}", u32::from(*force) + 1),
      Group::NonAlliedVictoryPlayers => f.write_str("Non Allied Victory Players"),
      Group::Other(other) => write!(f, "Group {other}"),
    }
  }
}

/// A unit type id. Ids past the last real unit name unit classes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u16);

impl UnitId {
  pub const NONE: UnitId = UnitId(228);
  pub const ANY: UnitId = UnitId(229);
  pub const MEN: UnitId = UnitId(230);
  pub const BUILDINGS: UnitId = UnitId(231);
  pub const FACTORIES: UnitId = UnitId(232);
}

/// How many units an action touches. Stored as 0 for "all".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitCount {
  All,
  /// Never 0, which is the wire value of `All`. See [`UnitCount::exactly`].
  Exactly(u8),
}

impl UnitCount {
  pub fn exactly(count: u8) -> Option<UnitCount> {
    (count > 0).then_some(UnitCount::Exactly(count))
  }
}

impl From<u8> for UnitCount {
  fn from(value: u8) -> Self {
    match value {
      0 => UnitCount::All,
      count => UnitCount::Exactly(count),
    }
  }
}

impl From<UnitCount> for u8 {
  fn from(value: UnitCount) -> Self {
    match value {
      UnitCount::All => 0,
      UnitCount::Exactly(count) => count,
    }
  }
}

/// A four-character AI script code, stored little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AiScript(pub u32);

impl AiScript {
  pub fn from_code(code: [u8; 4]) -> Self {
    AiScript(u32::from_le_bytes(code))
  }

  pub fn code(&self) -> [u8; 4] {
    self.0.to_le_bytes()
  }
}

impl Display for AiScript {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(&String::from_utf8_lossy(&self.code()))
  }
}

pub(crate) fn millis(value: u32) -> Duration {
  Duration::from_millis(u64::from(value))
}

pub(crate) fn seconds(value: u32) -> Duration {
  Duration::from_secs(u64::from(value))
}

pub(crate) fn to_millis(value: Duration) -> Result<u32> {
  u32::try_from(value.as_millis()).map_err(|_| too_large("duration", value))
}

/// Whole seconds; any fraction is dropped.
pub(crate) fn to_seconds(value: Duration) -> Result<u32> {
  u32::try_from(value.as_secs()).map_err(|_| too_large("duration", value))
}

/// Score and resource types live in a single byte on conditions.
pub(crate) fn to_byte(field: &str, value: u16) -> Result<u8> {
  u8::try_from(value).map_err(|_| too_large(field, value))
}

fn too_large(field: &str, value: impl std::fmt::Debug) -> ChkError {
  ChkError::malformed(
    SectionKind::Triggers,
    format!("{field} {value:?} does not fit its field"),
  )
}
