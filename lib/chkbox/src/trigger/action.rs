use std::time::Duration;

use log::trace;

use crate::context::{DecodeContext, EncodeContext};
use crate::error::Result;
use crate::rich::{CuwpSlot, Location, ReferenceSet, References, RichString, Switch};
use crate::section::{ActionRecord, MASK_FLAG};
use crate::trigger::types::{millis, seconds, to_millis, to_seconds};
use crate::trigger::{
  AiScript, AllianceStatus, Group, NumericModifier, ResourceType, ScoreType, SwitchAction,
  ToggleState, UnitCount, UnitId, UnitOrder,
};

kind_enum! {
  pub enum ActionKind for Action {
    Victory = 1,
    Defeat = 2,
    PreserveTrigger = 3,
    Wait = 4,
    PauseGame = 5,
    UnpauseGame = 6,
    Transmission = 7,
    PlayWav = 8,
    DisplayText = 9,
    CenterView = 10,
    CreateUnitWithProperties = 11,
    SetMissionObjectives = 12,
    SetSwitch = 13,
    SetCountdownTimer = 14,
    RunAiScript = 15,
    RunAiScriptAt = 16,
    LeaderboardControl = 17,
    LeaderboardControlAt = 18,
    LeaderboardResources = 19,
    LeaderboardKills = 20,
    LeaderboardPoints = 21,
    KillUnit = 22,
    KillUnitAt = 23,
    RemoveUnit = 24,
    RemoveUnitAt = 25,
    SetResources = 26,
    SetScore = 27,
    MinimapPing = 28,
    TalkingPortrait = 29,
    MuteUnitSpeech = 30,
    UnmuteUnitSpeech = 31,
    LeaderboardComputerPlayers = 32,
    LeaderboardGoalControl = 33,
    LeaderboardGoalControlAt = 34,
    LeaderboardGoalResources = 35,
    LeaderboardGoalKills = 36,
    LeaderboardGoalPoints = 37,
    MoveLocation = 38,
    MoveUnit = 39,
    LeaderboardGreed = 40,
    SetNextScenario = 41,
    SetDoodadState = 42,
    SetInvincibility = 43,
    CreateUnit = 44,
    SetDeaths = 45,
    Order = 46,
    Comment = 47,
    GiveUnits = 48,
    ModifyHitPoints = 49,
    ModifyEnergy = 50,
    ModifyShields = 51,
    ModifyResourceAmount = 52,
    ModifyHangarCount = 53,
    PauseTimer = 54,
    UnpauseTimer = 55,
    Draw = 56,
    SetAllianceStatus = 57,
    DisableDebugMode = 58,
    EnableDebugMode = 59,
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
  Victory,
  Defeat,
  PreserveTrigger,
  Wait {
    time: Duration,
  },
  PauseGame,
  UnpauseGame,
  /// `duration` is applied to the transmission's display time through `modifier`.
  Transmission {
    text: RichString,
    unit: UnitId,
    location: Location,
    sound: RichString,
    sound_time: Duration,
    modifier: NumericModifier,
    duration: Duration,
  },
  /// Without a `duration`, the audio collaborator is asked for one on encode.
  PlayWav {
    sound: RichString,
    duration: Option<Duration>,
  },
  DisplayText {
    text: RichString,
  },
  CenterView {
    location: Location,
  },
  CreateUnitWithProperties {
    group: Group,
    unit: UnitId,
    count: u8,
    location: Location,
    properties: CuwpSlot,
  },
  SetMissionObjectives {
    text: RichString,
  },
  SetSwitch {
    switch: Switch,
    action: SwitchAction,
  },
  SetCountdownTimer {
    modifier: NumericModifier,
    time: Duration,
  },
  RunAiScript {
    script: AiScript,
  },
  RunAiScriptAt {
    script: AiScript,
    location: Location,
  },
  LeaderboardControl {
    label: RichString,
    unit: UnitId,
  },
  LeaderboardControlAt {
    label: RichString,
    unit: UnitId,
    location: Location,
  },
  LeaderboardResources {
    label: RichString,
    resource: ResourceType,
  },
  LeaderboardKills {
    label: RichString,
    unit: UnitId,
  },
  LeaderboardPoints {
    label: RichString,
    score: ScoreType,
  },
  KillUnit {
    group: Group,
    unit: UnitId,
  },
  KillUnitAt {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
  },
  RemoveUnit {
    group: Group,
    unit: UnitId,
  },
  RemoveUnitAt {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
  },
  SetResources {
    group: Group,
    modifier: NumericModifier,
    amount: u32,
    resource: ResourceType,
  },
  SetScore {
    group: Group,
    modifier: NumericModifier,
    amount: u32,
    score: ScoreType,
  },
  MinimapPing {
    location: Location,
  },
  TalkingPortrait {
    unit: UnitId,
    time: Duration,
  },
  MuteUnitSpeech,
  UnmuteUnitSpeech,
  LeaderboardComputerPlayers {
    state: ToggleState,
  },
  LeaderboardGoalControl {
    label: RichString,
    unit: UnitId,
    goal: u32,
  },
  LeaderboardGoalControlAt {
    label: RichString,
    unit: UnitId,
    goal: u32,
    location: Location,
  },
  LeaderboardGoalResources {
    label: RichString,
    resource: ResourceType,
    goal: u32,
  },
  LeaderboardGoalKills {
    label: RichString,
    unit: UnitId,
    goal: u32,
  },
  LeaderboardGoalPoints {
    label: RichString,
    score: ScoreType,
    goal: u32,
  },
  /// Centers `destination` on a unit found at `source`.
  MoveLocation {
    group: Group,
    unit: UnitId,
    source: Location,
    destination: Location,
  },
  MoveUnit {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    source: Location,
    destination: Location,
  },
  LeaderboardGreed {
    goal: u32,
  },
  SetNextScenario {
    name: RichString,
  },
  SetDoodadState {
    group: Group,
    unit: UnitId,
    location: Location,
    state: ToggleState,
  },
  SetInvincibility {
    group: Group,
    unit: UnitId,
    location: Location,
    state: ToggleState,
  },
  CreateUnit {
    group: Group,
    unit: UnitId,
    count: u8,
    location: Location,
  },
  /// With a `mask`, only the masked bits of the death counter are modified.
  SetDeaths {
    group: Group,
    unit: UnitId,
    modifier: NumericModifier,
    amount: u32,
    mask: Option<u32>,
  },
  Order {
    group: Group,
    unit: UnitId,
    source: Location,
    destination: Location,
    order: UnitOrder,
  },
  Comment {
    text: RichString,
  },
  GiveUnits {
    group: Group,
    target: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
  },
  ModifyHitPoints {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
    percent: u32,
  },
  ModifyEnergy {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
    percent: u32,
  },
  ModifyShields {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
    percent: u32,
  },
  ModifyResourceAmount {
    group: Group,
    count: UnitCount,
    location: Location,
    amount: u32,
  },
  ModifyHangarCount {
    group: Group,
    unit: UnitId,
    count: UnitCount,
    location: Location,
    amount: u32,
  },
  PauseTimer,
  UnpauseTimer,
  Draw,
  SetAllianceStatus {
    group: Group,
    status: AllianceStatus,
  },
  DisableDebugMode,
  EnableDebugMode,
}

impl Action {
  pub fn kind(&self) -> ActionKind {
    match self {
      Action::Victory => ActionKind::Victory,
      Action::Defeat => ActionKind::Defeat,
      Action::PreserveTrigger => ActionKind::PreserveTrigger,
      Action::Wait { .. } => ActionKind::Wait,
      Action::PauseGame => ActionKind::PauseGame,
      Action::UnpauseGame => ActionKind::UnpauseGame,
      Action::Transmission { .. } => ActionKind::Transmission,
      Action::PlayWav { .. } => ActionKind::PlayWav,
      Action::DisplayText { .. } => ActionKind::DisplayText,
      Action::CenterView { .. } => ActionKind::CenterView,
      Action::CreateUnitWithProperties { .. } => ActionKind::CreateUnitWithProperties,
      Action::SetMissionObjectives { .. } => ActionKind::SetMissionObjectives,
      Action::SetSwitch { .. } => ActionKind::SetSwitch,
      Action::SetCountdownTimer { .. } => ActionKind::SetCountdownTimer,
      Action::RunAiScript { .. } => ActionKind::RunAiScript,
      Action::RunAiScriptAt { .. } => ActionKind::RunAiScriptAt,
      Action::LeaderboardControl { .. } => ActionKind::LeaderboardControl,
      Action::LeaderboardControlAt { .. } => ActionKind::LeaderboardControlAt,
      Action::LeaderboardResources { .. } => ActionKind::LeaderboardResources,
      Action::LeaderboardKills { .. } => ActionKind::LeaderboardKills,
      Action::LeaderboardPoints { .. } => ActionKind::LeaderboardPoints,
      Action::KillUnit { .. } => ActionKind::KillUnit,
      Action::KillUnitAt { .. } => ActionKind::KillUnitAt,
      Action::RemoveUnit { .. } => ActionKind::RemoveUnit,
      Action::RemoveUnitAt { .. } => ActionKind::RemoveUnitAt,
      Action::SetResources { .. } => ActionKind::SetResources,
      Action::SetScore { .. } => ActionKind::SetScore,
      Action::MinimapPing { .. } => ActionKind::MinimapPing,
      Action::TalkingPortrait { .. } => ActionKind::TalkingPortrait,
      Action::MuteUnitSpeech => ActionKind::MuteUnitSpeech,
      Action::UnmuteUnitSpeech => ActionKind::UnmuteUnitSpeech,
      Action::LeaderboardComputerPlayers { .. } => ActionKind::LeaderboardComputerPlayers,
      Action::LeaderboardGoalControl { .. } => ActionKind::LeaderboardGoalControl,
      Action::LeaderboardGoalControlAt { .. } => ActionKind::LeaderboardGoalControlAt,
      Action::LeaderboardGoalResources { .. } => ActionKind::LeaderboardGoalResources,
      Action::LeaderboardGoalKills { .. } => ActionKind::LeaderboardGoalKills,
      Action::LeaderboardGoalPoints { .. } => ActionKind::LeaderboardGoalPoints,
      Action::MoveLocation { .. } => ActionKind::MoveLocation,
      Action::MoveUnit { .. } => ActionKind::MoveUnit,
      Action::LeaderboardGreed { .. } => ActionKind::LeaderboardGreed,
      Action::SetNextScenario { .. } => ActionKind::SetNextScenario,
      Action::SetDoodadState { .. } => ActionKind::SetDoodadState,
      Action::SetInvincibility { .. } => ActionKind::SetInvincibility,
      Action::CreateUnit { .. } => ActionKind::CreateUnit,
      Action::SetDeaths { .. } => ActionKind::SetDeaths,
      Action::Order { .. } => ActionKind::Order,
      Action::Comment { .. } => ActionKind::Comment,
      Action::GiveUnits { .. } => ActionKind::GiveUnits,
      Action::ModifyHitPoints { .. } => ActionKind::ModifyHitPoints,
      Action::ModifyEnergy { .. } => ActionKind::ModifyEnergy,
      Action::ModifyShields { .. } => ActionKind::ModifyShields,
      Action::ModifyResourceAmount { .. } => ActionKind::ModifyResourceAmount,
      Action::ModifyHangarCount { .. } => ActionKind::ModifyHangarCount,
      Action::PauseTimer => ActionKind::PauseTimer,
      Action::UnpauseTimer => ActionKind::UnpauseTimer,
      Action::Draw => ActionKind::Draw,
      Action::SetAllianceStatus { .. } => ActionKind::SetAllianceStatus,
      Action::DisableDebugMode => ActionKind::DisableDebugMode,
      Action::EnableDebugMode => ActionKind::EnableDebugMode,
    }
  }

  /// Kind 0 is an empty slot and decodes to `None`.
  pub fn decode(record: &ActionRecord, context: &DecodeContext) -> Result<Option<Self>> {
    if record.kind == 0 {
      return Ok(None);
    }

    let kind = ActionKind::try_from(record.kind)?;
    trace!("decoding {kind:?}");

    let group = Group::from(record.first_group);
    let unit = UnitId(record.argument);
    let count = UnitCount::from(record.quantifier);
    let modifier = NumericModifier::from(record.quantifier);
    let state = ToggleState::from(record.quantifier);
    let amount = record.second_group;
    let location = || context.location(record.location);
    let text = || context.string(record.text);

    let action = match kind {
      ActionKind::Victory => Action::Victory,
      ActionKind::Defeat => Action::Defeat,
      ActionKind::PreserveTrigger => Action::PreserveTrigger,
      ActionKind::Wait => Action::Wait {
        time: millis(record.time),
      },
      ActionKind::PauseGame => Action::PauseGame,
      ActionKind::UnpauseGame => Action::UnpauseGame,
      ActionKind::Transmission => Action::Transmission {
        text: text()?,
        unit,
        location: location()?,
        sound: context.string(record.sound)?,
        sound_time: millis(record.time),
        modifier,
        duration: millis(amount),
      },
      ActionKind::PlayWav => Action::PlayWav {
        sound: context.string(record.sound)?,
        duration: Some(millis(record.time)),
      },
      ActionKind::DisplayText => Action::DisplayText { text: text()? },
      ActionKind::CenterView => Action::CenterView {
        location: location()?,
      },
      ActionKind::CreateUnitWithProperties => Action::CreateUnitWithProperties {
        group,
        unit,
        count: record.quantifier,
        location: location()?,
        properties: context.cuwp_slot(amount)?,
      },
      ActionKind::SetMissionObjectives => Action::SetMissionObjectives { text: text()? },
      ActionKind::SetSwitch => Action::SetSwitch {
        switch: context.switch(amount)?,
        action: SwitchAction::from(record.quantifier),
      },
      ActionKind::SetCountdownTimer => Action::SetCountdownTimer {
        modifier,
        time: seconds(record.time),
      },
      ActionKind::RunAiScript => Action::RunAiScript {
        script: AiScript(amount),
      },
      ActionKind::RunAiScriptAt => Action::RunAiScriptAt {
        script: AiScript(amount),
        location: location()?,
      },
      ActionKind::LeaderboardControl => Action::LeaderboardControl {
        label: text()?,
        unit,
      },
      ActionKind::LeaderboardControlAt => Action::LeaderboardControlAt {
        label: text()?,
        unit,
        location: location()?,
      },
      ActionKind::LeaderboardResources => Action::LeaderboardResources {
        label: text()?,
        resource: ResourceType::from(record.argument),
      },
      ActionKind::LeaderboardKills => Action::LeaderboardKills {
        label: text()?,
        unit,
      },
      ActionKind::LeaderboardPoints => Action::LeaderboardPoints {
        label: text()?,
        score: ScoreType::from(record.argument),
      },
      ActionKind::KillUnit => Action::KillUnit { group, unit },
      ActionKind::KillUnitAt => Action::KillUnitAt {
        group,
        unit,
        count,
        location: location()?,
      },
      ActionKind::RemoveUnit => Action::RemoveUnit { group, unit },
      ActionKind::RemoveUnitAt => Action::RemoveUnitAt {
        group,
        unit,
        count,
        location: location()?,
      },
      ActionKind::SetResources => Action::SetResources {
        group,
        modifier,
        amount,
        resource: ResourceType::from(record.argument),
      },
      ActionKind::SetScore => Action::SetScore {
        group,
        modifier,
        amount,
        score: ScoreType::from(record.argument),
      },
      ActionKind::MinimapPing => Action::MinimapPing {
        location: location()?,
      },
      ActionKind::TalkingPortrait => Action::TalkingPortrait {
        unit,
        time: millis(record.time),
      },
      ActionKind::MuteUnitSpeech => Action::MuteUnitSpeech,
      ActionKind::UnmuteUnitSpeech => Action::UnmuteUnitSpeech,
      ActionKind::LeaderboardComputerPlayers => Action::LeaderboardComputerPlayers { state },
      ActionKind::LeaderboardGoalControl => Action::LeaderboardGoalControl {
        label: text()?,
        unit,
        goal: amount,
      },
      ActionKind::LeaderboardGoalControlAt => Action::LeaderboardGoalControlAt {
        label: text()?,
        unit,
        goal: amount,
        location: location()?,
      },
      ActionKind::LeaderboardGoalResources => Action::LeaderboardGoalResources {
        label: text()?,
        resource: ResourceType::from(record.argument),
        goal: amount,
      },
      ActionKind::LeaderboardGoalKills => Action::LeaderboardGoalKills {
        label: text()?,
        unit,
        goal: amount,
      },
      ActionKind::LeaderboardGoalPoints => Action::LeaderboardGoalPoints {
        label: text()?,
        score: ScoreType::from(record.argument),
        goal: amount,
      },
      ActionKind::MoveLocation => Action::MoveLocation {
        group,
        unit,
        source: location()?,
        destination: context.location(amount)?,
      },
      ActionKind::MoveUnit => Action::MoveUnit {
        group,
        unit,
        count,
        source: location()?,
        destination: context.location(amount)?,
      },
      ActionKind::LeaderboardGreed => Action::LeaderboardGreed { goal: amount },
      ActionKind::SetNextScenario => Action::SetNextScenario { name: text()? },
      ActionKind::SetDoodadState => Action::SetDoodadState {
        group,
        unit,
        location: location()?,
        state,
      },
      ActionKind::SetInvincibility => Action::SetInvincibility {
        group,
        unit,
        location: location()?,
        state,
      },
      ActionKind::CreateUnit => Action::CreateUnit {
        group,
        unit,
        count: record.quantifier,
        location: location()?,
      },
      ActionKind::SetDeaths => Action::SetDeaths {
        group,
        unit,
        modifier,
        amount,
        mask: (record.mask_flag == MASK_FLAG).then_some(record.location),
      },
      ActionKind::Order => Action::Order {
        group,
        unit,
        source: location()?,
        destination: context.location(amount)?,
        order: UnitOrder::from(record.quantifier),
      },
      ActionKind::Comment => Action::Comment { text: text()? },
      ActionKind::GiveUnits => Action::GiveUnits {
        group,
        target: Group::from(amount),
        unit,
        count,
        location: location()?,
      },
      ActionKind::ModifyHitPoints => Action::ModifyHitPoints {
        group,
        unit,
        count,
        location: location()?,
        percent: amount,
      },
      ActionKind::ModifyEnergy => Action::ModifyEnergy {
        group,
        unit,
        count,
        location: location()?,
        percent: amount,
      },
      ActionKind::ModifyShields => Action::ModifyShields {
        group,
        unit,
        count,
        location: location()?,
        percent: amount,
      },
      ActionKind::ModifyResourceAmount => Action::ModifyResourceAmount {
        group,
        count,
        location: location()?,
        amount,
      },
      ActionKind::ModifyHangarCount => Action::ModifyHangarCount {
        group,
        unit,
        count,
        location: location()?,
        amount,
      },
      ActionKind::PauseTimer => Action::PauseTimer,
      ActionKind::UnpauseTimer => Action::UnpauseTimer,
      ActionKind::Draw => Action::Draw,
      ActionKind::SetAllianceStatus => Action::SetAllianceStatus {
        group,
        status: AllianceStatus::from(record.argument),
      },
      ActionKind::DisableDebugMode => Action::DisableDebugMode,
      ActionKind::EnableDebugMode => Action::EnableDebugMode,
    };

    Ok(Some(action))
  }

  /// The record for this action, with its flags left clear.
  pub fn encode(&self, context: &EncodeContext) -> Result<ActionRecord> {
    let mut record = ActionRecord {
      kind: self.kind() as u8,
      ..ActionRecord::default()
    };

    match self {
      Action::Victory
      | Action::Defeat
      | Action::PreserveTrigger
      | Action::PauseGame
      | Action::UnpauseGame
      | Action::MuteUnitSpeech
      | Action::UnmuteUnitSpeech
      | Action::PauseTimer
      | Action::UnpauseTimer
      | Action::Draw
      | Action::DisableDebugMode
      | Action::EnableDebugMode => {}
      Action::Wait { time } => {
        record.time = to_millis(*time)?;
      }
      Action::Transmission {
        text,
        unit,
        location,
        sound,
        sound_time,
        modifier,
        duration,
      } => {
        record.text = context.string_id(text)?;
        record.argument = unit.0;
        record.location = context.location_id(location)?;
        record.sound = context.string_id(sound)?;
        record.time = to_millis(*sound_time)?;
        record.quantifier = u8::from(*modifier);
        record.second_group = to_millis(*duration)?;
      }
      Action::PlayWav { sound, duration } => {
        record.sound = context.string_id(sound)?;
        record.time = match duration {
          Some(duration) => to_millis(*duration)?,
          None => context.sound_duration_ms(sound),
        };
      }
      Action::DisplayText { text }
      | Action::SetMissionObjectives { text }
      | Action::Comment { text }
      | Action::SetNextScenario { name: text } => {
        record.text = context.string_id(text)?;
      }
      Action::CenterView { location } | Action::MinimapPing { location } => {
        record.location = context.location_id(location)?;
      }
      Action::CreateUnitWithProperties {
        group,
        unit,
        count,
        location,
        properties,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = *count;
        record.location = context.location_id(location)?;
        record.second_group = context.cuwp_id(properties)?;
      }
      Action::SetSwitch { switch, action } => {
        record.second_group = context.switch_id(switch)?;
        record.quantifier = u8::from(*action);
      }
      Action::SetCountdownTimer { modifier, time } => {
        record.quantifier = u8::from(*modifier);
        record.time = to_seconds(*time)?;
      }
      Action::RunAiScript { script } => {
        record.second_group = script.0;
      }
      Action::RunAiScriptAt { script, location } => {
        record.second_group = script.0;
        record.location = context.location_id(location)?;
      }
      Action::LeaderboardControl { label, unit } | Action::LeaderboardKills { label, unit } => {
        record.text = context.string_id(label)?;
        record.argument = unit.0;
      }
      Action::LeaderboardControlAt {
        label,
        unit,
        location,
      } => {
        record.text = context.string_id(label)?;
        record.argument = unit.0;
        record.location = context.location_id(location)?;
      }
      Action::LeaderboardResources { label, resource } => {
        record.text = context.string_id(label)?;
        record.argument = u16::from(*resource);
      }
      Action::LeaderboardPoints { label, score } => {
        record.text = context.string_id(label)?;
        record.argument = u16::from(*score);
      }
      Action::KillUnit { group, unit } | Action::RemoveUnit { group, unit } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
      }
      Action::KillUnitAt {
        group,
        unit,
        count,
        location,
      }
      | Action::RemoveUnitAt {
        group,
        unit,
        count,
        location,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = u8::from(*count);
        record.location = context.location_id(location)?;
      }
      Action::SetResources {
        group,
        modifier,
        amount,
        resource,
      } => {
        record.first_group = u32::from(*group);
        record.quantifier = u8::from(*modifier);
        record.second_group = *amount;
        record.argument = u16::from(*resource);
      }
      Action::SetScore {
        group,
        modifier,
        amount,
        score,
      } => {
        record.first_group = u32::from(*group);
        record.quantifier = u8::from(*modifier);
        record.second_group = *amount;
        record.argument = u16::from(*score);
      }
      Action::TalkingPortrait { unit, time } => {
        record.argument = unit.0;
        record.time = to_millis(*time)?;
      }
      Action::LeaderboardComputerPlayers { state } => {
        record.quantifier = u8::from(*state);
      }
      Action::LeaderboardGoalControl { label, unit, goal }
      | Action::LeaderboardGoalKills { label, unit, goal } => {
        record.text = context.string_id(label)?;
        record.argument = unit.0;
        record.second_group = *goal;
      }
      Action::LeaderboardGoalControlAt {
        label,
        unit,
        goal,
        location,
      } => {
        record.text = context.string_id(label)?;
        record.argument = unit.0;
        record.second_group = *goal;
        record.location = context.location_id(location)?;
      }
      Action::LeaderboardGoalResources {
        label,
        resource,
        goal,
      } => {
        record.text = context.string_id(label)?;
        record.argument = u16::from(*resource);
        record.second_group = *goal;
      }
      Action::LeaderboardGoalPoints { label, score, goal } => {
        record.text = context.string_id(label)?;
        record.argument = u16::from(*score);
        record.second_group = *goal;
      }
      Action::MoveLocation {
        group,
        unit,
        source,
        destination,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.location = context.location_id(source)?;
        record.second_group = context.location_id(destination)?;
      }
      Action::MoveUnit {
        group,
        unit,
        count,
        source,
        destination,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = u8::from(*count);
        record.location = context.location_id(source)?;
        record.second_group = context.location_id(destination)?;
      }
      Action::LeaderboardGreed { goal } => {
        record.second_group = *goal;
      }
      Action::SetDoodadState {
        group,
        unit,
        location,
        state,
      }
      | Action::SetInvincibility {
        group,
        unit,
        location,
        state,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.location = context.location_id(location)?;
        record.quantifier = u8::from(*state);
      }
      Action::CreateUnit {
        group,
        unit,
        count,
        location,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = *count;
        record.location = context.location_id(location)?;
      }
      Action::SetDeaths {
        group,
        unit,
        modifier,
        amount,
        mask,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = u8::from(*modifier);
        record.second_group = *amount;
        if let Some(mask) = mask {
          record.location = *mask;
          record.mask_flag = MASK_FLAG;
        }
      }
      Action::Order {
        group,
        unit,
        source,
        destination,
        order,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.location = context.location_id(source)?;
        record.second_group = context.location_id(destination)?;
        record.quantifier = u8::from(*order);
      }
      Action::GiveUnits {
        group,
        target,
        unit,
        count,
        location,
      } => {
        record.first_group = u32::from(*group);
        record.second_group = u32::from(*target);
        record.argument = unit.0;
        record.quantifier = u8::from(*count);
        record.location = context.location_id(location)?;
      }
      Action::ModifyHitPoints {
        group,
        unit,
        count,
        location,
        percent: amount,
      }
      | Action::ModifyEnergy {
        group,
        unit,
        count,
        location,
        percent: amount,
      }
      | Action::ModifyShields {
        group,
        unit,
        count,
        location,
        percent: amount,
      }
      | Action::ModifyHangarCount {
        group,
        unit,
        count,
        location,
        amount,
      } => {
        record.first_group = u32::from(*group);
        record.argument = unit.0;
        record.quantifier = u8::from(*count);
        record.location = context.location_id(location)?;
        record.second_group = *amount;
      }
      Action::ModifyResourceAmount {
        group,
        count,
        location,
        amount,
      } => {
        record.first_group = u32::from(*group);
        record.quantifier = u8::from(*count);
        record.location = context.location_id(location)?;
        record.second_group = *amount;
      }
      Action::SetAllianceStatus { group, status } => {
        record.first_group = u32::from(*group);
        record.argument = u16::from(*status);
      }
    }

    Ok(record)
  }
}

impl References for Action {
  fn references(&self, refs: &mut ReferenceSet) {
    match self {
      Action::Transmission {
        text,
        location,
        sound,
        ..
      } => {
        refs.string(text);
        refs.location(location);
        refs.string(sound);
      }
      Action::PlayWav { sound, .. } => refs.string(sound),
      Action::DisplayText { text }
      | Action::SetMissionObjectives { text }
      | Action::Comment { text }
      | Action::SetNextScenario { name: text }
      | Action::LeaderboardControl { label: text, .. }
      | Action::LeaderboardResources { label: text, .. }
      | Action::LeaderboardKills { label: text, .. }
      | Action::LeaderboardPoints { label: text, .. }
      | Action::LeaderboardGoalControl { label: text, .. }
      | Action::LeaderboardGoalResources { label: text, .. }
      | Action::LeaderboardGoalKills { label: text, .. }
      | Action::LeaderboardGoalPoints { label: text, .. } => refs.string(text),
      Action::LeaderboardControlAt {
        label, location, ..
      }
      | Action::LeaderboardGoalControlAt {
        label, location, ..
      } => {
        refs.string(label);
        refs.location(location);
      }
      Action::CreateUnitWithProperties {
        location,
        properties,
        ..
      } => {
        refs.location(location);
        refs.cuwp_slot(properties);
      }
      Action::SetSwitch { switch, .. } => refs.switch(switch),
      Action::MoveLocation {
        source,
        destination,
        ..
      }
      | Action::MoveUnit {
        source,
        destination,
        ..
      }
      | Action::Order {
        source,
        destination,
        ..
      } => {
        refs.location(source);
        refs.location(destination);
      }
      Action::CenterView { location }
      | Action::MinimapPing { location }
      | Action::RunAiScriptAt { location, .. }
      | Action::KillUnitAt { location, .. }
      | Action::RemoveUnitAt { location, .. }
      | Action::SetDoodadState { location, .. }
      | Action::SetInvincibility { location, .. }
      | Action::CreateUnit { location, .. }
      | Action::GiveUnits { location, .. }
      | Action::ModifyHitPoints { location, .. }
      | Action::ModifyEnergy { location, .. }
      | Action::ModifyShields { location, .. }
      | Action::ModifyResourceAmount { location, .. }
      | Action::ModifyHangarCount { location, .. } => refs.location(location),
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trigger::fixtures::contexts;

  /// Every field set, so each kind has to pick out its own.
  fn full_record(kind: ActionKind) -> ActionRecord {
    ActionRecord {
      location: 1,
      text: 1,
      sound: 2,
      time: 1000,
      first_group: 17,
      second_group: 2,
      argument: 3,
      kind: kind as u8,
      quantifier: 7,
      flags: 0b0000_0110,
      padding: 0xAA,
      mask_flag: 0,
    }
  }

  #[test]
  fn every_kind_keeps_only_its_own_fields() {
    let (decode, encode) = contexts();
    for kind in ActionKind::ALL {
      let action = Action::decode(&full_record(*kind), &decode).unwrap().unwrap();
      assert_eq!(action.kind(), *kind);

      let record = action.encode(&encode).unwrap();
      assert_eq!(record.kind, *kind as u8);
      assert_eq!((record.flags, record.padding, record.mask_flag), (0, 0, 0), "{kind:?}");

      let again = Action::decode(&record, &decode).unwrap().unwrap();
      assert_eq!(again, action, "{kind:?}");
      assert_eq!(again.encode(&encode).unwrap(), record, "{kind:?}");
    }
  }

  #[test]
  fn kinds_without_fields_encode_bare() {
    let (decode, encode) = contexts();
    let action = Action::decode(&full_record(ActionKind::Victory), &decode).unwrap().unwrap();
    assert_eq!(action, Action::Victory);
    assert_eq!(
      action.encode(&encode).unwrap(),
      ActionRecord {
        kind: ActionKind::Victory as u8,
        ..ActionRecord::default()
      }
    );
  }

  #[test]
  fn transmissions_split_sound_time_from_duration() {
    let (decode, encode) = contexts();
    let record = ActionRecord {
      location: 1,
      text: 1,
      sound: 2,
      time: 1500,
      second_group: 4000,
      argument: 3,
      kind: ActionKind::Transmission as u8,
      quantifier: 8,
      ..ActionRecord::default()
    };

    let action = Action::decode(&record, &decode).unwrap().unwrap();
    let Action::Transmission {
      sound_time,
      duration,
      modifier,
      unit,
      ..
    } = &action
    else {
      panic!("not a transmission: {action:?}");
    };
    assert_eq!(*sound_time, Duration::from_millis(1500));
    assert_eq!(*duration, Duration::from_millis(4000));
    assert_eq!(*modifier, NumericModifier::from(8));
    assert_eq!(*unit, UnitId(3));
    assert_eq!(action.encode(&encode).unwrap(), record);
  }

  #[test]
  fn destinations_come_from_the_second_group() {
    let (decode, encode) = contexts();
    for (kind, quantifier) in [
      (ActionKind::MoveLocation, 0),
      (ActionKind::MoveUnit, 4),
      (ActionKind::Order, 1),
    ] {
      let record = ActionRecord {
        location: 1,
        first_group: 17,
        second_group: 2,
        argument: 3,
        kind: kind as u8,
        quantifier,
        ..ActionRecord::default()
      };

      let action = Action::decode(&record, &decode).unwrap().unwrap();
      let (Action::MoveLocation {
        source,
        destination,
        ..
      }
      | Action::MoveUnit {
        source,
        destination,
        ..
      }
      | Action::Order {
        source,
        destination,
        ..
      }) = &action
      else {
        panic!("no destination: {action:?}");
      };
      assert_eq!(source.index, Some(1));
      assert_eq!(destination.index, Some(2));
      assert_eq!(*destination, decode.location(2).unwrap());
      assert_eq!(action.encode(&encode).unwrap(), record, "{kind:?}");
    }

    let order = ActionRecord {
      location: 1,
      second_group: 2,
      kind: ActionKind::Order as u8,
      quantifier: 2,
      ..ActionRecord::default()
    };
    assert!(matches!(
      Action::decode(&order, &decode).unwrap(),
      Some(Action::Order {
        order: UnitOrder::Attack,
        ..
      })
    ));
  }

  #[test]
  fn masked_deaths_keep_the_mask_in_the_location_field() {
    let (decode, encode) = contexts();
    let masked = ActionRecord {
      location: 0xFF00_0000,
      first_group: 13,
      second_group: 5,
      argument: 3,
      kind: ActionKind::SetDeaths as u8,
      quantifier: 7,
      mask_flag: MASK_FLAG,
      ..ActionRecord::default()
    };

    let action = Action::decode(&masked, &decode).unwrap().unwrap();
    assert!(matches!(
      action,
      Action::SetDeaths {
        mask: Some(0xFF00_0000),
        amount: 5,
        ..
      }
    ));
    assert_eq!(action.encode(&encode).unwrap(), masked);

    let unmasked = ActionRecord {
      location: 1,
      mask_flag: 0,
      ..masked
    };
    let action = Action::decode(&unmasked, &decode).unwrap().unwrap();
    assert!(matches!(action, Action::SetDeaths { mask: None, .. }));
    assert_eq!(
      action.encode(&encode).unwrap(),
      ActionRecord {
        location: 0,
        ..unmasked
      }
    );
  }

  #[test]
  fn given_units_go_to_the_second_group() {
    let (decode, encode) = contexts();
    let record = ActionRecord {
      location: 1,
      first_group: 0,
      second_group: 15,
      argument: 3,
      kind: ActionKind::GiveUnits as u8,
      quantifier: 0,
      ..ActionRecord::default()
    };

    let action = Action::decode(&record, &decode).unwrap().unwrap();
    assert!(matches!(
      action,
      Action::GiveUnits {
        group: Group::Player(0),
        target: Group::Allies,
        count: UnitCount::All,
        ..
      }
    ));
    assert_eq!(action.encode(&encode).unwrap(), record);
  }
  use crate::error::{ChkError, Entity};

  #[test]
  fn every_kind_is_registered_once() {
    assert_eq!(ActionKind::ALL.len(), 59);
    for (position, kind) in ActionKind::ALL.iter().enumerate() {
      assert_eq!(*kind as u8, position as u8 + 1);
      assert_eq!(ActionKind::try_from(*kind as u8).unwrap(), *kind);
    }
  }

  #[test]
  fn unknown_kinds_are_unregistered() {
    for kind in [60u8, 200, 255] {
      assert!(matches!(
        ActionKind::try_from(kind),
        Err(ChkError::UnregisteredVariant {
          what: Entity::Action,
          ..
        })
      ));
    }
  }
}
