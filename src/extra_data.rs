use serde::{Serialize, Deserialize};

use crate::math::Vector;
use crate::property::Property;
use crate::save::ObjectReference;

pub const GAME_STATE_PATH: &str = "/Game/FactoryGame/-Shared/Blueprint/BP_GameState.BP_GameState_C";
pub const GAME_MODE_PATH: &str = "/Game/FactoryGame/-Shared/Blueprint/BP_GameMode.BP_GameMode_C";
pub const PLAYER_STATE_PATH: &str = "/Game/FactoryGame/Character/Player/BP_PlayerState.BP_PlayerState_C";
pub const DRONE_TRANSPORT_PATH: &str = "/Game/FactoryGame/Buildable/Factory/DroneStation/BP_DroneTransport.BP_DroneTransport_C";
pub const CIRCUIT_SUBSYSTEM_PATH: &str = "/Game/FactoryGame/-Shared/Blueprint/BP_CircuitSubsystem.BP_CircuitSubsystem_C";
pub const BLUEPRINT_SUBSYSTEM_PATH: &str = "/Game/FactoryGame/-Shared/Blueprint/BP_BlueprintSubsystem.BP_BlueprintSubsystem_C";

/// Objects under this namespace carry an 8-byte trailer in double precision saves
pub const SCRIPT_NAMESPACE_PREFIX: &str = "/Script/FactoryGame.FG";

pub const CONVEYOR_BELT_PATHS: [&str; 6] = [
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk1/Build_ConveyorBeltMk1.Build_ConveyorBeltMk1_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk2/Build_ConveyorBeltMk2.Build_ConveyorBeltMk2_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk3/Build_ConveyorBeltMk3.Build_ConveyorBeltMk3_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk4/Build_ConveyorBeltMk4.Build_ConveyorBeltMk4_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk5/Build_ConveyorBeltMk5.Build_ConveyorBeltMk5_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorBeltMk6/Build_ConveyorBeltMk6.Build_ConveyorBeltMk6_C",
];
pub const CONVEYOR_LIFT_PATHS: [&str; 6] = [
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk1/Build_ConveyorLiftMk1.Build_ConveyorLiftMk1_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk2/Build_ConveyorLiftMk2.Build_ConveyorLiftMk2_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk3/Build_ConveyorLiftMk3.Build_ConveyorLiftMk3_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk4/Build_ConveyorLiftMk4.Build_ConveyorLiftMk4_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk5/Build_ConveyorLiftMk5.Build_ConveyorLiftMk5_C",
  "/Game/FactoryGame/Buildable/Factory/ConveyorLiftMk6/Build_ConveyorLiftMk6.Build_ConveyorLiftMk6_C",
];
pub const POWER_LINE_PATHS: [&str; 2] = [
  "/Game/FactoryGame/Buildable/Factory/PowerLine/Build_PowerLine.Build_PowerLine_C",
  "/Game/FactoryGame/Events/Christmas/Buildings/PowerLineLights/Build_XmassLightsLine.Build_XmassLightsLine_C",
];
pub const VEHICLE_PATHS: [&str; 6] = [
  "/Game/FactoryGame/Buildable/Vehicle/Tractor/BP_Tractor.BP_Tractor_C",
  "/Game/FactoryGame/Buildable/Vehicle/Truck/BP_Truck.BP_Truck_C",
  "/Game/FactoryGame/Buildable/Vehicle/Explorer/BP_Explorer.BP_Explorer_C",
  "/Game/FactoryGame/Buildable/Vehicle/Cyberwagon/Testa_BP_WB.Testa_BP_WB_C",
  "/Game/FactoryGame/Buildable/Vehicle/Golfcart/BP_Golfcart.BP_Golfcart_C",
  "/Game/FactoryGame/Buildable/Vehicle/Golfcart/BP_GolfcartGold.BP_GolfcartGold_C",
];
pub const TRAIN_PATHS: [&str; 2] = [
  "/Game/FactoryGame/Buildable/Vehicle/Train/Locomotive/BP_Locomotive.BP_Locomotive_C",
  "/Game/FactoryGame/Buildable/Vehicle/Train/Wagon/BP_FreightWagon.BP_FreightWagon_C",
];

/// Object classes whose bodies carry trailing data after their properties
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraDataClass {
  Conveyor,
  PowerLine,
  Vehicle,
  Train,
  Game,
  PlayerState,
  DroneTransport,
  Circuit,
  Blueprint,
}

impl ExtraDataClass {
  /// Matches a type path against the known class tables, in dispatch order
  pub fn from_type_path(type_path: &str) -> Option<ExtraDataClass> {
    if CONVEYOR_BELT_PATHS.contains(&type_path) || CONVEYOR_LIFT_PATHS.contains(&type_path) {
      return Some(ExtraDataClass::Conveyor);
    } else if POWER_LINE_PATHS.contains(&type_path) {
      return Some(ExtraDataClass::PowerLine);
    } else if VEHICLE_PATHS.contains(&type_path) {
      return Some(ExtraDataClass::Vehicle);
    } else if TRAIN_PATHS.contains(&type_path) {
      return Some(ExtraDataClass::Train);
    }

    match type_path {
      GAME_STATE_PATH | GAME_MODE_PATH => Some(ExtraDataClass::Game),
      PLAYER_STATE_PATH => Some(ExtraDataClass::PlayerState),
      DRONE_TRANSPORT_PATH => Some(ExtraDataClass::DroneTransport),
      CIRCUIT_SUBSYSTEM_PATH => Some(ExtraDataClass::Circuit),
      BLUEPRINT_SUBSYSTEM_PATH => Some(ExtraDataClass::Blueprint),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum ExtraData {
  Conveyor(Vec<ConveyorItem>),
  PowerLine(PowerLine),
  Vehicle(Vec<VehicleCargo>),
  Train(Train),
  Game(Vec<ObjectReference>),
  PlayerState(PlayerState),
  DroneTransport(DroneTransport),
  Circuit(Vec<Circuit>),
  Blueprint(Vec<ObjectReference>),
  /// Trailing bytes of an unrecognized class, captured as hex
  Unknown(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConveyorItem {
  pub length: i32,
  pub item_name: String,
  pub position: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PowerLine {
  pub source: ObjectReference,
  pub target: ObjectReference,
  pub source_translation: Option<Vector<f32>>,
  pub target_translation: Option<Vector<f32>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VehicleCargo {
  pub name: String,
  pub unknown: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Train {
  pub cargo: Vec<VehicleCargo>,
  pub previous: ObjectReference,
  pub next: ObjectReference,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlayerState {
  pub mode: Option<u8>,
  pub platform_name: Option<String>,
  pub eos_id: Option<String>,
  pub steam_id: Option<String>,
  pub platform_id: Option<String>,
  /// Identity blob of an unrecognized mode
  pub raw: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DroneTransportAction {
  pub name: String,
  pub properties: Vec<Property>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DroneTransport {
  pub unk_int_1: i32,
  pub unk_int_2: i32,
  pub active_actions: Vec<DroneTransportAction>,
  pub action_queue: Vec<DroneTransportAction>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Circuit {
  pub id: i32,
  pub reference: ObjectReference,
}
