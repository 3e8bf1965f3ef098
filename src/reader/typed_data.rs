use std::io::{Read, Seek};
use std::str::FromStr;

use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::trace;

use super::SaveReader;
use crate::errors::ParseError;
use crate::math::BoxBounds;
use crate::property::Property;
use crate::typed_data::*;
use crate::versions::*;
use crate::{ReadSaveFileBytes, Result};

/// Rotators inside this struct are stored in double precision regardless of
/// the save version
const SPAWN_DATA_TYPE: &str = "SpawnData";

impl<R: Read + Seek> SaveReader<'_, R> {
  /// Reads the payload of a struct. Struct types without a fixed shape are
  /// read as a bag of properties that stops at the "None" terminator or at
  /// `end_byte`, whichever comes first
  pub fn read_typed_data(&mut self, type_name: &str, parent_type: &str, end_byte: u64) -> Result<TypedData> {
    let data_type = match TypedDataType::from_str(type_name) {
      Ok(t) => t,
      Err(_) => {
        trace!("Reading {type_name} as a property bag");
        return Ok(TypedData::ArrayProperties {
          type_name: type_name.to_string(),
          properties: self.read_property_bag(type_name, end_byte)?,
        });
      },
    };

    let double = self.is_double_precision();
    let value = match data_type {
      TypedDataType::Box => {
        if double {
          TypedData::BoxD(BoxBounds {
            min: self.read_vector_double::<LE>()?,
            max: self.read_vector_double::<LE>()?,
            is_valid: self.read_u8()? != 0,
          })
        } else {
          TypedData::Box(BoxBounds {
            min: self.read_vector::<LE>()?,
            max: self.read_vector::<LE>()?,
            is_valid: self.read_u8()? != 0,
          })
        }
      },
      TypedDataType::Color => TypedData::Color(self.read_color_byte()?),
      TypedDataType::LinearColor => TypedData::LinearColor(self.read_linear_color::<LE>()?),
      TypedDataType::Vector => {
        if double {
          TypedData::VectorD(self.read_vector_double::<LE>()?)
        } else {
          TypedData::Vector(self.read_vector::<LE>()?)
        }
      },
      TypedDataType::Vector2D => {
        if double {
          TypedData::Vector2DD(self.read_vector2d_double::<LE>()?)
        } else {
          TypedData::Vector2D(self.read_vector2d::<LE>()?)
        }
      },
      TypedDataType::Vector4 => {
        if double {
          TypedData::Vector4D(self.read_vector4_double::<LE>()?)
        } else {
          TypedData::Vector4(self.read_vector4::<LE>()?)
        }
      },
      TypedDataType::Quat => {
        if double {
          TypedData::QuatD(self.read_quaternion_double::<LE>()?)
        } else {
          TypedData::Quat(self.read_quaternion::<LE>()?)
        }
      },
      TypedDataType::Rotator => {
        if double || parent_type == SPAWN_DATA_TYPE {
          TypedData::RotatorD(self.read_rotator_double::<LE>()?)
        } else {
          TypedData::Rotator(self.read_rotator::<LE>()?)
        }
      },
      TypedDataType::IntPoint => TypedData::IntPoint(self.read_vector2d_int::<LE>()?),
      TypedDataType::IntVector => TypedData::IntVector(self.read_vector_int::<LE>()?),
      TypedDataType::IntVector4 => TypedData::IntVector4(self.read_vector4_int::<LE>()?),
      TypedDataType::Guid => TypedData::Guid(self.read_hex(16)?),
      TypedDataType::DateTime => TypedData::DateTime(self.read_i64::<LE>()?),
      TypedDataType::Timespan => TypedData::Timespan(self.read_i64::<LE>()?),
      TypedDataType::TimerHandle => TypedData::TimerHandle(self.read_length_prefixed_string::<LE>()?),
      TypedDataType::SlateBrush => TypedData::SlateBrush(self.read_length_prefixed_string::<LE>()?),
      TypedDataType::FluidBox => TypedData::FluidBox(self.read_f32::<LE>()?),
      TypedDataType::RailroadTrackPosition => TypedData::RailroadTrackPosition(RailroadTrackPosition {
        track: self.read_object_reference::<LE>()?,
        offset: self.read_f32::<LE>()?,
        forward: self.read_f32::<LE>()?,
      }),
      TypedDataType::InventoryItem => TypedData::InventoryItem(self.read_inventory_item()?),
      TypedDataType::InventoryStack => TypedData::InventoryStack(self.read_inventory_stack(parent_type)?),
      TypedDataType::FrameRange => TypedData::FrameRange(FrameRange {
        begin: self.read_i64::<LE>()?,
        end: self.read_i64::<LE>()?,
      }),
      TypedDataType::ClientIdentityInfo => TypedData::ClientIdentityInfo(self.read_client_identity_info()?),
      TypedDataType::SoftObjectPath => TypedData::SoftObjectPath(self.read_soft_object_reference::<LE>()?),
      TypedDataType::LBBalancerIndexing => TypedData::LBBalancerIndexing(BalancerIndexing {
        normal_index: self.read_i32::<LE>()?,
        overflow_index: self.read_i32::<LE>()?,
        filter_index: self.read_i32::<LE>()?,
      }),
      TypedDataType::FINNetworkTrace => TypedData::FINNetworkTrace(self.read_fin_network_trace()?),
      TypedDataType::FINGPUT1BufferPixel => TypedData::FINGPUT1BufferPixel(self.read_fingput1_buffer_pixel()?),
      TypedDataType::FINLuaProcessorStateStorage => {
        TypedData::FINLuaProcessorStateStorage(self.read_fin_lua_processor_state_storage(parent_type, end_byte)?)
      },
    };

    Ok(value)
  }

  /// Reads properties until the "None" terminator or until the cursor reaches
  /// `end_byte`
  pub fn read_property_bag(&mut self, parent_type: &str, end_byte: u64) -> Result<Vec<Property>> {
    let mut properties: Vec<Property> = vec![];
    while self.stream_position()? < end_byte {
      match self.read_property(parent_type)? {
        Some(property) => properties.push(property),
        None => break,
      }
    }
    Ok(properties)
  }

  fn read_inventory_item(&mut self) -> Result<InventoryItem> {
    let mut item = InventoryItem {
      unk_int_1: self.read_i32::<LE>()?,
      item_name: self.read_length_prefixed_string::<LE>()?,
      ..Default::default()
    };

    if self.save_version() >= SAVE_VERSION_INVENTORY_ITEM_STATE {
      item.state_name = Some(self.read_length_prefixed_string::<LE>()?);
    } else {
      item.state = Some(self.read_object_reference::<LE>()?);
    }

    Ok(item)
  }

  fn read_inventory_stack(&mut self, parent_type: &str) -> Result<InventoryStack> {
    if self.save_version() < SAVE_VERSION_INVENTORY_STACK_V1 {
      return Ok(InventoryStack::V0 {
        unk_int_1: self.read_i32::<LE>()?,
        item_name: self.read_length_prefixed_string::<LE>()?,
        unk_int_2: self.read_i32::<LE>()?,
        unk_int_3: self.read_i32::<LE>()?,
        unk_int_4: self.read_i32::<LE>()?,
      });
    }

    let unk_str_1 = self.read_length_prefixed_string::<LE>()?;
    let unk_str_2 = self.read_length_prefixed_string::<LE>()?;
    let unk_int_1 = self.read_i32::<LE>()?;
    let unk_int_2 = self.read_i32::<LE>()?;
    let property = self.read_property(parent_type)?.map(Box::new);
    let properties = if self.save_version() >= SAVE_VERSION_PERSISTENT_COLLECTABLES {
      self.read_properties(parent_type)?
    } else {
      vec![]
    };
    let unk_str_3 = self.read_length_prefixed_string::<LE>()?;

    Ok(InventoryStack::V1 {
      unk_str_1,
      unk_str_2,
      unk_int_1,
      unk_int_2,
      property,
      properties,
      unk_str_3,
    })
  }

  fn read_client_identity_info(&mut self) -> Result<ClientIdentityInfo> {
    let offline_id = self.read_length_prefixed_string::<LE>()?;

    let num_account_ids = self.read_i32::<LE>()?;
    let mut account_ids: Vec<(u8, String)> = vec![];
    for _ in 0..num_account_ids {
      let platform = self.read_u8()?;
      let len = self.read_i32::<LE>()?;
      account_ids.push((platform, self.read_hex(len.max(0) as usize)?));
    }

    Ok(ClientIdentityInfo { offline_id, account_ids })
  }

  /// Reads a [FicsIt-Network Network trace](https://docs.ficsit.app/ficsit-networks/latest/NetworkTrace.html)
  fn read_fin_network_trace(&mut self) -> Result<FINNetworkTrace> {
    let mut trace = FINNetworkTrace {
      reference: self.read_object_reference::<LE>()?,
      ..Default::default()
    };

    let has_prev = self.read_i32::<LE>()?;
    if has_prev == 1 {
      trace.prev = Some(Box::new(self.read_fin_network_trace()?));
    }

    let has_step = self.read_i32::<LE>()?;
    if has_step == 1 {
      trace.step = Some(self.read_length_prefixed_string::<LE>()?);
    }

    Ok(trace)
  }

  /// Reads a [FicsIt-Network GPUT buffer pixel](https://github.com/Panakotta00/FicsIt-Networks/blob/master/Source/FicsItNetworks/Public/Computer/FINComputerGPUT1.h)
  fn read_fingput1_buffer_pixel(&mut self) -> Result<FINGPUT1BufferPixel> {
    let character = self.read_u16::<LE>()?;
    Ok(FINGPUT1BufferPixel {
      character: String::from_utf16_lossy(&[character]),
      foreground_color: self.read_linear_color::<LE>()?,
      background_color: self.read_linear_color::<LE>()?,
    })
  }

  /// Reads a [FicsIt-Network Lua processor state storage](https://github.com/Panakotta00/FicsIt-Networks/blob/master/Source/FicsItNetworksLua/Private/FINLuaProcessorStateStorage.cpp)
  fn read_fin_lua_processor_state_storage(&mut self, parent_type: &str, end_byte: u64) -> Result<FINLuaProcessorStateStorage> {
    let mut data = FINLuaProcessorStateStorage::default();

    let num_traces = self.read_i32::<LE>()?;
    for _ in 0..num_traces {
      data.traces.push(self.read_fin_network_trace()?);
    }

    let num_references = self.read_i32::<LE>()?;
    for _ in 0..num_references {
      data.references.push(self.read_object_reference::<LE>()?);
    }

    data.thread = self.read_length_prefixed_string::<LE>()?;
    data.globals = self.read_length_prefixed_string::<LE>()?;

    let num_structs = self.read_i32::<LE>()?;
    for _ in 0..num_structs {
      let unk_int_1 = self.read_i32::<LE>()?;
      let class_name = self.read_length_prefixed_string::<LE>()?;

      let value = match class_name.as_str() {
        "/Script/FactoryGame.PrefabSignData"
        | "/Script/FicsItNetworks.FINInternetCardHttpRequestFuture"
        | "/Script/FactoryGame.InventoryItem" => FINLuaStorageValue::Skipped,
        "/Script/CoreUObject.Vector" => FINLuaStorageValue::Vector(self.read_vector::<LE>()?),
        "/Script/CoreUObject.LinearColor" => FINLuaStorageValue::LinearColor(self.read_linear_color::<LE>()?),
        "/Script/FactoryGame.InventoryStack" => {
          let unk_str_1 = self.read_length_prefixed_string::<LE>()?;
          let unk_str_2 = self.read_length_prefixed_string::<LE>()?;
          let unk_int_1 = self.read_i32::<LE>()?;
          let unk_int_2 = self.read_i32::<LE>()?;

          let struct_type = self.read_length_prefixed_string::<LE>()?;
          self.seek_relative(17)?;
          let item = Box::new(self.read_typed_data(&struct_type, parent_type, end_byte)?);

          FINLuaStorageValue::InventoryStack {
            unk_str_1,
            unk_str_2,
            unk_int_1,
            unk_int_2,
            item,
            unk_str_3: self.read_length_prefixed_string::<LE>()?,
          }
        },
        "/Script/FactoryGame.ItemAmount" => FINLuaStorageValue::ItemAmount(ItemAmount {
          unk_int_1: self.read_i32::<LE>()?,
          item_name: self.read_length_prefixed_string::<LE>()?,
          amount: self.read_i32::<LE>()?,
        }),
        "/Script/FicsItNetworks.FINTrackGraph" => {
          FINLuaStorageValue::TrackGraph(self.read_fin_network_trace()?, self.read_i32::<LE>()?)
        },
        "/Script/FicsItNetworks.FINGPUT1Buffer" => {
          let x = self.read_i32::<LE>()?;
          let y = self.read_i32::<LE>()?;
          let size = self.read_i32::<LE>()?;
          let name = self.read_length_prefixed_string::<LE>()?;
          let r#type = self.read_length_prefixed_string::<LE>()?;
          let length = self.read_i32::<LE>()?;
          let mut buffer: Vec<FINGPUT1BufferPixel> = vec![];
          for _ in 0..size {
            buffer.push(self.read_fingput1_buffer_pixel()?);
          }
          let unk_str_1 = self.read_hex(45)?;
          FINLuaStorageValue::GPUT1Buffer(FINGPUT1Buffer {
            x,
            y,
            size,
            name,
            r#type,
            length,
            buffer,
            unk_str_1,
          })
        },
        _ => return Err(ParseError::UnknownLuaStorageStructType(class_name)),
      };

      data.structs.push(FINLuaStorageStruct { unk_int_1, class_name, value });
    }

    Ok(data)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Seek;

  use super::*;
  use crate::property::PropertyValue;
  use crate::test_utils::{header, reader, Bytes};

  fn read(type_name: &str, parent_type: &str, bytes: Bytes, save_version: i32) -> TypedData {
    let h = header(save_version);
    let len = bytes.len() as u64;
    let mut r = reader(bytes, &h);
    let data = r.read_typed_data(type_name, parent_type, len).unwrap();
    assert_eq!(r.stream_position().unwrap(), len, "{type_name} left bytes unread");
    data
  }

  #[test]
  fn unknown_struct_falls_back_to_property_bag() {
    let bytes = Bytes::new()
      .property("mEnabled", "BoolProperty", 0, Bytes::new().u8(1).u8(0))
      .property("mRate", "FloatProperty", 4, Bytes::new().u8(0).f32(2.5))
      .none();
    let TypedData::ArrayProperties { type_name, properties } = read("MyModStruct", "", bytes, 46) else {
      panic!("expected a property bag");
    };
    assert_eq!(type_name, "MyModStruct");
    assert_eq!(properties.len(), 2);
    assert!(matches!(properties[1].value, PropertyValue::Float(v) if v == 2.5));
  }

  #[test]
  fn property_bag_stops_at_end_byte() {
    let h = header(46);
    let bytes = Bytes::new().property("mCount", "IntProperty", 4, Bytes::new().u8(0).i32(1));
    let end = bytes.len() as u64;
    let mut r = reader(bytes.none(), &h);
    let properties = r.read_property_bag("Thing", end).unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(r.stream_position().unwrap(), end);
  }

  #[test]
  fn precision_follows_save_version() {
    let single = read("Vector", "", Bytes::new().f32(1.0).f32(2.0).f32(3.0), 40);
    assert!(matches!(single, TypedData::Vector(ref v) if v.y == 2.0));

    let double = read("Vector_NetQuantize", "", Bytes::new().f64(1.0).f64(2.0).f64(3.0), 41);
    assert!(matches!(double, TypedData::VectorD(ref v) if v.y == 2.0));

    let quat = read("Quat", "", Bytes::new().f32(0.0).f32(0.0).f32(0.0).f32(1.0), 33);
    assert!(matches!(quat, TypedData::Quat(ref q) if q.w == 1.0));

    let bounds = Bytes::new()
      .f64(-1.0).f64(-1.0).f64(-1.0)
      .f64(1.0).f64(1.0).f64(1.0)
      .u8(1);
    assert!(matches!(read("Box", "", bounds, 46), TypedData::BoxD(ref b) if b.is_valid && b.max.x == 1.0));
  }

  #[test]
  fn rotator_in_spawn_data_is_always_double() {
    let bytes = Bytes::new().f64(10.0).f64(20.0).f64(30.0);
    assert!(matches!(read("Rotator", "SpawnData", bytes, 30), TypedData::RotatorD(ref r) if r.yaw == 20.0));

    let bytes = Bytes::new().f32(10.0).f32(20.0).f32(30.0);
    assert!(matches!(read("Rotator", "Other", bytes, 30), TypedData::Rotator(ref r) if r.roll == 30.0));
  }

  #[test]
  fn color_is_stored_blue_first() {
    let TypedData::Color(color) = read("Color", "", Bytes::new().bytes(&[1, 2, 3, 4]), 46) else {
      panic!("expected a color");
    };
    assert_eq!((color.red, color.green, color.blue, color.alpha), (3, 2, 1, 4));
  }

  #[test]
  fn inventory_item_state_changes_shape() {
    let old = Bytes::new().i32(0).string("Desc_Wire_C").reference("Persistent_Level", "State");
    let TypedData::InventoryItem(item) = read("InventoryItem", "", old, 43) else {
      panic!("expected an inventory item");
    };
    assert_eq!(item.item_name, "Desc_Wire_C");
    assert_eq!(item.state.map(|s| s.path_name).as_deref(), Some("State"));
    assert_eq!(item.state_name, None);

    let new = Bytes::new().i32(0).string("Desc_Wire_C").string("");
    let TypedData::InventoryItem(item) = read("InventoryItem", "", new, 44) else {
      panic!("expected an inventory item");
    };
    assert_eq!(item.state, None);
    assert_eq!(item.state_name.as_deref(), Some(""));
  }

  #[test]
  fn inventory_stack_versions() {
    let v0 = Bytes::new().i32(0).string("Desc_Coal_C").i32(50).i32(0).i32(0);
    assert!(matches!(
      read("InventoryStack", "", v0, 41),
      TypedData::InventoryStack(InventoryStack::V0 { unk_int_2: 50, .. })
    ));

    let v1 = Bytes::new()
      .string("a").string("b").i32(1).i32(2)
      .property("NumItems", "IntProperty", 4, Bytes::new().u8(0).i32(50))
      .none()
      .string("c");
    let TypedData::InventoryStack(InventoryStack::V1 { property, properties, unk_str_3, .. }) =
      read("InventoryStack", "", v1, 46)
    else {
      panic!("expected a v1 stack");
    };
    assert_eq!(property.map(|p| p.name).as_deref(), Some("NumItems"));
    assert!(properties.is_empty());
    assert_eq!(unk_str_3, "c");
  }

  #[test]
  fn network_trace_recurses() {
    let bytes = Bytes::new()
      .reference("L", "Outer")
      .i32(1)
      .reference("L", "Inner").i32(0).i32(0)
      .i32(1).string("step");
    let TypedData::FINNetworkTrace(trace) = read("FINNetworkTrace", "", bytes, 46) else {
      panic!("expected a trace");
    };
    assert_eq!(trace.step.as_deref(), Some("step"));
    assert_eq!(trace.prev.unwrap().reference.path_name, "Inner");
  }

  #[test]
  fn lua_storage_rejects_unknown_structs() {
    let h = header(46);
    let bytes = Bytes::new().i32(0).i32(0).string("").string("").i32(1).i32(0).string("/Script/Unknown.Thing");
    let mut r = reader(bytes, &h);
    assert!(matches!(
      r.read_typed_data("FINLuaProcessorStateStorage", "", 1000),
      Err(ParseError::UnknownLuaStorageStructType(_))
    ));
  }

  #[test]
  fn client_identity_info() {
    let bytes = Bytes::new().string("offline").i32(1).u8(6).i32(3).bytes(b"abc");
    let TypedData::ClientIdentityInfo(info) = read("ClientIdentityInfo", "", bytes, 46) else {
      panic!("expected client identity info");
    };
    assert_eq!(info.offline_id, "offline");
    assert_eq!(info.account_ids, vec![(6, "abc".to_string())]);
  }
}
