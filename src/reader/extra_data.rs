use std::io::{Read, Seek};

use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::{debug, warn};

use super::SaveReader;
use crate::extra_data::*;
use crate::save::ObjectReference;
use crate::versions::*;
use crate::{ReadSaveFileBytes, Result};

impl<R: Read + Seek> SaveReader<'_, R> {
  /// Reads the data some object classes store after their properties. The
  /// shape is picked from the object's type path since the stream carries no
  /// discriminant of its own
  pub fn read_extra_data(&mut self, type_path: &str, end_byte: u64) -> Result<Option<ExtraData>> {
    let class = match ExtraDataClass::from_type_path(type_path) {
      Some(class) => class,
      None => return self.read_unknown_extra_data(type_path, end_byte),
    };

    // Marker
    self.seek_relative(4)?;

    let extra = match class {
      ExtraDataClass::Conveyor => {
        let num_items = self.read_i32::<LE>()?;
        let mut items: Vec<ConveyorItem> = vec![];
        for _ in 0..num_items {
          items.push(ConveyorItem {
            length: self.read_i32::<LE>()?,
            item_name: self.read_length_prefixed_string::<LE>()?,
            position: self.read_f32::<LE>()?,
          });
        }
        ExtraData::Conveyor(items)
      },
      ExtraDataClass::PowerLine => {
        let mut power_line = PowerLine {
          source: self.read_object_reference::<LE>()?,
          target: self.read_object_reference::<LE>()?,
          ..Default::default()
        };
        let version = self.save_version();
        if (SAVE_VERSION_POWER_LINE_TRANSLATION..SAVE_VERSION_DOUBLE_PRECISION).contains(&version) {
          power_line.source_translation = Some(self.read_vector::<LE>()?);
          power_line.target_translation = Some(self.read_vector::<LE>()?);
        }
        ExtraData::PowerLine(power_line)
      },
      ExtraDataClass::Vehicle => ExtraData::Vehicle(self.read_vehicle_cargo()?),
      ExtraDataClass::Train => ExtraData::Train(Train {
        cargo: self.read_vehicle_cargo()?,
        previous: self.read_object_reference::<LE>()?,
        next: self.read_object_reference::<LE>()?,
      }),
      ExtraDataClass::Game => ExtraData::Game(self.read_reference_list()?),
      ExtraDataClass::Blueprint => ExtraData::Blueprint(self.read_reference_list()?),
      ExtraDataClass::Circuit => {
        let num_circuits = self.read_i32::<LE>()?;
        let mut circuits: Vec<Circuit> = vec![];
        for _ in 0..num_circuits {
          circuits.push(Circuit {
            id: self.read_i32::<LE>()?,
            reference: self.read_object_reference::<LE>()?,
          });
        }
        ExtraData::Circuit(circuits)
      },
      ExtraDataClass::DroneTransport => ExtraData::DroneTransport(DroneTransport {
        unk_int_1: self.read_i32::<LE>()?,
        unk_int_2: self.read_i32::<LE>()?,
        active_actions: self.read_drone_actions(type_path)?,
        action_queue: self.read_drone_actions(type_path)?,
      }),
      ExtraDataClass::PlayerState => ExtraData::PlayerState(self.read_player_state(end_byte)?),
    };

    Ok(Some(extra))
  }

  fn read_reference_list(&mut self) -> Result<Vec<ObjectReference>> {
    let num_references = self.read_i32::<LE>()?;
    let mut references: Vec<ObjectReference> = vec![];
    for _ in 0..num_references {
      references.push(self.read_object_reference::<LE>()?);
    }
    Ok(references)
  }

  fn read_vehicle_cargo(&mut self) -> Result<Vec<VehicleCargo>> {
    let blob_size = if self.is_double_precision() { 105 } else { 53 };

    let num_cargo = self.read_i32::<LE>()?;
    let mut cargo: Vec<VehicleCargo> = vec![];
    for _ in 0..num_cargo {
      cargo.push(VehicleCargo {
        name: self.read_length_prefixed_string::<LE>()?,
        unknown: self.read_hex(blob_size)?,
      });
    }
    Ok(cargo)
  }

  fn read_drone_actions(&mut self, type_path: &str) -> Result<Vec<DroneTransportAction>> {
    let num_actions = self.read_i32::<LE>()?;
    let mut actions: Vec<DroneTransportAction> = vec![];
    for _ in 0..num_actions {
      actions.push(DroneTransportAction {
        name: self.read_length_prefixed_string::<LE>()?,
        properties: self.read_properties(type_path)?,
      });
    }
    Ok(actions)
  }

  /// Reads the online identity of a player. The mode byte selects which
  /// platform the identity belongs to and how it is stored
  fn read_player_state(&mut self, end_byte: u64) -> Result<PlayerState> {
    let mut state = PlayerState::default();
    if self.stream_position()? >= end_byte {
      return Ok(state);
    }

    let mode = self.read_u8()?;
    state.mode = Some(mode);

    match mode {
      // Epic Online Services
      241 | 17 => {
        let len = self.read_u8()?;
        state.eos_id = Some(self.read_hex(len as usize)?);
      },
      248 => {
        state.platform_name = Some(self.read_length_prefixed_string::<LE>()?);
        let ids = self.read_length_prefixed_string::<LE>()?;
        let mut ids = ids.splitn(2, '|');
        state.eos_id = ids.next().map(str::to_string);
        state.steam_id = ids.next().map(str::to_string);
      },
      249 => {
        state.platform_name = Some(self.read_length_prefixed_string::<LE>()?);
        state.platform_id = Some(self.read_length_prefixed_string::<LE>()?);
      },
      // Steam
      25 | 29 => {
        let len = self.read_u8()?;
        state.steam_id = Some(self.read_hex(len as usize)?);
      },
      8 => {
        let len = self.read_i32::<LE>()?;
        state.platform_id = Some(self.read_hex(len.max(0) as usize)?);
      },
      _ => {
        // Back to the marker so the whole blob is kept
        self.seek_relative(-5)?;
        let remaining = self.remaining_until(end_byte)?.max(0);
        let raw = self.read_hex(remaining as usize)?;
        warn!("Unknown player state mode {mode}, kept {remaining} bytes as is");
        state.raw = Some(raw);
      },
    }

    Ok(state)
  }

  fn read_unknown_extra_data(&mut self, type_path: &str, end_byte: u64) -> Result<Option<ExtraData>> {
    let remaining = self.remaining_until(end_byte)?;
    if remaining <= 0 {
      return Ok(None);
    }

    if remaining <= 4 {
      // Marker
      self.seek_relative(4)?;
      return Ok(None);
    }

    if self.is_double_precision() && type_path.starts_with(SCRIPT_NAMESPACE_PREFIX) {
      debug!("Skipping 8 trailing bytes of {type_path}");
      self.seek_relative(8)?;
      return Ok(None);
    }

    let hex = self.read_hex(remaining as usize)?;
    warn!("Unrecognized extra data at {type_path}: {remaining} bytes");
    Ok(Some(ExtraData::Unknown(hex)))
  }
}

#[cfg(test)]
mod tests {
  use std::io::Seek;

  use super::*;
  use crate::test_utils::{header, reader, Bytes};

  fn read(type_path: &str, bytes: Bytes, save_version: i32) -> Option<ExtraData> {
    let h = header(save_version);
    let len = bytes.len() as u64;
    let mut r = reader(bytes, &h);
    let extra = r.read_extra_data(type_path, len).unwrap();
    assert_eq!(r.stream_position().unwrap(), len, "{type_path} left bytes unread");
    extra
  }

  #[test]
  fn conveyor_items() {
    let bytes = Bytes::new()
      .i32(0)
      .i32(2)
      .i32(0).string("/Game/FactoryGame/Resource/Parts/IronPlate/Desc_IronPlate.Desc_IronPlate_C").f32(0.5)
      .i32(0).string("/Game/FactoryGame/Resource/Parts/Wire/Desc_Wire.Desc_Wire_C").f32(1.25);
    let Some(ExtraData::Conveyor(items)) = read(CONVEYOR_LIFT_PATHS[5], bytes, 46) else {
      panic!("expected conveyor items");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].position, 1.25);
    assert!(items[0].item_name.ends_with("Desc_IronPlate_C"));
  }

  #[test]
  fn power_line_translation_is_version_gated() {
    let bytes = Bytes::new()
      .i32(0)
      .reference("L", "Source").reference("L", "Target")
      .f32(1.0).f32(2.0).f32(3.0)
      .f32(4.0).f32(5.0).f32(6.0);
    let Some(ExtraData::PowerLine(line)) = read(POWER_LINE_PATHS[0], bytes, 33) else {
      panic!("expected a power line");
    };
    assert_eq!(line.target.path_name, "Target");
    assert_eq!(line.target_translation.map(|v| v.z), Some(6.0));

    let bytes = Bytes::new().i32(0).reference("L", "Source").reference("L", "Target");
    let Some(ExtraData::PowerLine(line)) = read(POWER_LINE_PATHS[1], bytes, 41) else {
      panic!("expected a power line");
    };
    assert!(line.source_translation.is_none());
  }

  #[test]
  fn train_cargo_and_neighbours() {
    let bytes = Bytes::new()
      .i32(0)
      .i32(1).string("FreightCargo").bytes(&[0; 105])
      .reference("L", "Previous").reference("", "");
    let Some(ExtraData::Train(train)) = read(TRAIN_PATHS[1], bytes, 46) else {
      panic!("expected a train");
    };
    assert_eq!(train.cargo[0].unknown.chars().count(), 105);
    assert_eq!(train.previous.path_name, "Previous");
    assert_eq!(train.next.path_name, "");
  }

  #[test]
  fn vehicle_blob_is_smaller_in_single_precision_saves() {
    let bytes = Bytes::new().i32(0).i32(1).string("Cargo").bytes(&[1; 53]);
    let Some(ExtraData::Vehicle(cargo)) = read(VEHICLE_PATHS[1], bytes, 40) else {
      panic!("expected vehicle cargo");
    };
    assert_eq!(cargo[0].unknown.len(), 53);
  }

  #[test]
  fn circuits_and_drones() {
    let bytes = Bytes::new().i32(0).i32(1).i32(17).reference("L", "Circuit_17");
    let Some(ExtraData::Circuit(circuits)) = read(CIRCUIT_SUBSYSTEM_PATH, bytes, 46) else {
      panic!("expected circuits");
    };
    assert_eq!(circuits[0].id, 17);

    let bytes = Bytes::new()
      .i32(0)
      .i32(1).i32(2)
      .i32(1).string("Dock").property("mTarget", "IntProperty", 4, Bytes::new().u8(0).i32(3)).none()
      .i32(0);
    let Some(ExtraData::DroneTransport(drone)) = read(DRONE_TRANSPORT_PATH, bytes, 46) else {
      panic!("expected a drone transport");
    };
    assert_eq!(drone.active_actions[0].name, "Dock");
    assert_eq!(drone.active_actions[0].properties.len(), 1);
    assert!(drone.action_queue.is_empty());
  }

  #[test]
  fn player_state_modes() {
    let bytes = Bytes::new().i32(0).u8(241).u8(3).bytes(b"eos");
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, bytes, 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.mode, Some(241));
    assert_eq!(state.eos_id.as_deref(), Some("eos"));

    let bytes = Bytes::new().i32(0).u8(248).string("Epic").string("eos123|7656119");
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, bytes, 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.platform_name.as_deref(), Some("Epic"));
    assert_eq!(state.eos_id.as_deref(), Some("eos123"));
    assert_eq!(state.steam_id.as_deref(), Some("7656119"));

    let bytes = Bytes::new().i32(0).u8(25).u8(2).bytes(&[0x11, 0x01]);
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, bytes, 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.steam_id.as_deref(), Some("\u{11}\u{1}"));

    let bytes = Bytes::new().i32(0).u8(8).i32(4).bytes(b"psn!");
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, bytes, 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.platform_id.as_deref(), Some("psn!"));
  }

  #[test]
  fn player_state_unknown_mode_keeps_everything() {
    let bytes = Bytes::new().i32(0).u8(99).bytes(b"xyz");
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, bytes, 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.mode, Some(99));
    assert_eq!(state.raw.map(|raw| raw.chars().count()), Some(8));
  }

  #[test]
  fn player_state_without_identity() {
    let Some(ExtraData::PlayerState(state)) = read(PLAYER_STATE_PATH, Bytes::new().i32(0), 46) else {
      panic!("expected a player state");
    };
    assert_eq!(state.mode, None);
  }

  #[test]
  fn unknown_class_fallbacks() {
    let path = "/Game/FactoryGame/Buildable/Factory/Mystery/Build_Mystery.Build_Mystery_C";
    assert!(read(path, Bytes::new().i32(0), 46).is_none());
    assert!(read(path, Bytes::new(), 46).is_none());

    let Some(ExtraData::Unknown(hex)) = read(path, Bytes::new().bytes(b"0123456789"), 46) else {
      panic!("expected an unknown capture");
    };
    assert_eq!(hex, "0123456789");

    assert!(read("/Script/FactoryGame.FGLightweightBuildableSubsystem", Bytes::new().i64(0), 46).is_none());
  }
}
