use std::io::{Read, Seek};
use std::str::FromStr;

use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::{trace, warn};

use super::SaveReader;
use crate::errors::ParseError;
use crate::property::*;
use crate::{ReadSaveFileBytes, Result};

const FOLIAGE_REMOVAL_TYPE: &str = "/Script/FactoryGame.FGFoliageRemoval";
const BUILD_GUN_UTILITIES_TYPE: &str = "/BuildGunUtilities/BGU_Subsystem.BGU_Subsystem_C";
const BALANCER_DATA_TYPE: &str = "LBBalancerData";
const STORAGE_STATS_ROOM_TYPE: &str = "/StorageStatsRoom/Sub_SR.Sub_SR_C";

impl<R: Read + Seek> SaveReader<'_, R> {
  /// Reads a single property, or `None` once the terminating "None" name is
  /// reached. `parent_type` is the type path of the object or the struct type
  /// enclosing the property; a few layouts depend on it
  pub fn read_property(&mut self, parent_type: &str) -> Result<Option<Property>> {
    let name = self.read_length_prefixed_string::<LE>()?;
    if name == NONE {
      return Ok(None);
    }

    let type_name = self.read_length_prefixed_string::<LE>()?;
    let property_type = PropertyType::from_str(&type_name)
      .map_err(|_| ParseError::UnknownPropertyType(type_name.clone()))?;

    let size = self.read_i32::<LE>()?;
    let index = self.read_i32::<LE>()?;
    trace!("Reading property '{name}' ({type_name}, {size} bytes)");

    let value = match property_type {
      PropertyType::Bool => {
        let value = self.read_u8()? != 0;
        // Padding
        self.seek_relative(1)?;
        PropertyValue::Bool(value)
      },
      PropertyType::Byte => {
        let enum_type = self.read_length_prefixed_string::<LE>()?;
        self.seek_relative(1)?;
        let value = if enum_type == NONE {
          ByteValueKind::Byte(self.read_u8()?)
        } else {
          ByteValueKind::Name(self.read_length_prefixed_string::<LE>()?)
        };
        PropertyValue::Byte(ByteValue { enum_type, value })
      },
      PropertyType::Enum => {
        let enum_type = self.read_length_prefixed_string::<LE>()?;
        self.seek_relative(1)?;
        let value = self.read_length_prefixed_string::<LE>()?;
        PropertyValue::Enum(EnumValue { enum_type, value })
      },
      PropertyType::Float => {
        self.seek_relative(1)?;
        PropertyValue::Float(self.read_f32::<LE>()?)
      },
      PropertyType::Int => {
        self.seek_relative(1)?;
        PropertyValue::Int(self.read_i32::<LE>()?)
      },
      PropertyType::Int64 => {
        self.seek_relative(1)?;
        PropertyValue::Int64(self.read_i64::<LE>()?)
      },
      PropertyType::UInt32 => {
        self.seek_relative(1)?;
        PropertyValue::UInt32(self.read_u32::<LE>()?)
      },
      PropertyType::Name => {
        self.seek_relative(1)?;
        PropertyValue::Name(self.read_length_prefixed_string::<LE>()?)
      },
      PropertyType::Str => {
        self.seek_relative(1)?;
        PropertyValue::Str(self.read_length_prefixed_string::<LE>()?)
      },
      PropertyType::Object => {
        self.seek_relative(1)?;
        PropertyValue::Object(self.read_object_reference::<LE>()?)
      },
      PropertyType::Text => {
        self.seek_relative(1)?;
        PropertyValue::Text(self.read_text()?)
      },
      PropertyType::Array => PropertyValue::Array(self.read_array_property(size, parent_type)?),
      PropertyType::Set => PropertyValue::Set(self.read_set_property(parent_type)?),
      PropertyType::Map => PropertyValue::Map(self.read_map_property(&name, parent_type)?),
      PropertyType::Struct => PropertyValue::Struct(self.read_struct_property(size, parent_type)?),
    };

    Ok(Some(Property { name, index, size, value }))
  }

  /// Reads properties until the terminating "None"
  pub fn read_properties(&mut self, parent_type: &str) -> Result<Vec<Property>> {
    let mut properties: Vec<Property> = vec![];
    while let Some(property) = self.read_property(parent_type)? {
      properties.push(property);
    }
    Ok(properties)
  }

  /// Reads a localized text value, which nests recursively for formatted and
  /// transformed text
  fn read_text(&mut self) -> Result<TextProperty> {
    let flags = self.read_i32::<LE>()?;
    let history_type = self.read_u8()?;

    let history = match history_type {
      0 => TextHistory::Base {
        namespace: self.read_length_prefixed_string::<LE>()?,
        key: self.read_length_prefixed_string::<LE>()?,
        value: self.read_length_prefixed_string::<LE>()?,
      },
      1 | 3 => {
        let source_format = Box::new(self.read_text()?);
        let num_arguments = self.read_i32::<LE>()?;
        let mut arguments: Vec<TextArgument> = vec![];
        for _ in 0..num_arguments {
          let name = self.read_length_prefixed_string::<LE>()?;
          let value_type = self.read_u8()?;
          let value = match value_type {
            0 => TextArgumentValue::Int(self.read_i64::<LE>()?),
            1 => TextArgumentValue::UInt(self.read_u64::<LE>()?),
            2 => TextArgumentValue::Float(self.read_f32::<LE>()?),
            3 => TextArgumentValue::Double(self.read_f64::<LE>()?),
            4 => TextArgumentValue::Text(self.read_text()?),
            _ => return Err(ParseError::UnknownTextArgumentType(value_type)),
          };
          arguments.push(TextArgument { name, value });
        }
        TextHistory::ArgumentFormat { source_format, arguments }
      },
      10 => TextHistory::Transform {
        source_text: Box::new(self.read_text()?),
        transform_type: self.read_u8()?,
      },
      11 => TextHistory::StringTableEntry {
        table_id: self.read_length_prefixed_string::<LE>()?,
        text_key: self.read_length_prefixed_string::<LE>()?,
      },
      255 => {
        let has_culture_invariant_string = self.read_i32::<LE>()?;
        let culture_invariant_string = if has_culture_invariant_string != 0 {
          Some(self.read_length_prefixed_string::<LE>()?)
        } else {
          None
        };
        TextHistory::None { culture_invariant_string }
      },
      _ => return Err(ParseError::UnknownTextHistoryType(history_type)),
    };

    Ok(TextProperty { flags, history })
  }

  fn read_array_property(&mut self, size: i32, parent_type: &str) -> Result<ArrayProperty> {
    let element_type = self.read_length_prefixed_string::<LE>()?;

    // Padding
    self.seek_relative(1)?;

    let end_byte = self.stream_position()? + size.max(0) as u64;
    let num_elements = self.read_i32::<LE>()?;
    trace!("Reading {num_elements} array elements of type {element_type}");

    let mut struct_meta = None;
    let elements = match element_type.as_str() {
      "StructProperty" => {
        // Mirrors the property name
        let name = self.read_length_prefixed_string::<LE>()?;

        // Always `StructProperty`
        self.read_length_prefixed_string::<LE>()?;

        let size_bytes = self.read_i32::<LE>()?;

        // Index
        self.seek_relative(4)?;

        let meta = ArrayStructMeta {
          name,
          size_bytes,
          struct_type: self.read_length_prefixed_string::<LE>()?,
          guid: self.read_hex(16)?,
        };
        self.seek_relative(1)?;

        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_typed_data(&meta.struct_type, parent_type, end_byte)?);
        }
        struct_meta = Some(meta);
        ArrayValues::Struct(values)
      },
      "BoolProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_u8()? != 0);
        }
        ArrayValues::Bool(values)
      },
      "ByteProperty" => ArrayValues::Byte(self.read_bytes(num_elements.max(0) as usize)?),
      "EnumProperty" | "StrProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_length_prefixed_string::<LE>()?);
        }
        if element_type == "EnumProperty" {
          ArrayValues::Enum(values)
        } else {
          ArrayValues::Str(values)
        }
      },
      "FloatProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_f32::<LE>()?);
        }
        ArrayValues::Float(values)
      },
      "IntProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_i32::<LE>()?);
        }
        ArrayValues::Int(values)
      },
      "Int64Property" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_i64::<LE>()?);
        }
        ArrayValues::Int64(values)
      },
      "ObjectProperty" | "InterfaceProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_object_reference::<LE>()?);
        }
        ArrayValues::Object(values)
      },
      "TextProperty" => {
        let mut values = vec![];
        for _ in 0..num_elements {
          values.push(self.read_text()?);
        }
        ArrayValues::Text(values)
      },
      "ArrayProperty" | "MapProperty" | "SetProperty" | "NameProperty" => {
        return Err(ParseError::UnsupportedArrayElementType(element_type));
      },
      _ => return Err(ParseError::UnknownArrayElementType(element_type)),
    };

    Ok(ArrayProperty { element_type, struct_meta, elements })
  }

  fn read_set_property(&mut self, parent_type: &str) -> Result<SetProperty> {
    let element_type = self.read_length_prefixed_string::<LE>()?;

    // Padding
    self.seek_relative(1)?;

    let removed_count = self.read_i32::<LE>()?;
    let num_elements = self.read_i32::<LE>()?;

    let mut values: Vec<SetValue> = vec![];
    for _ in 0..num_elements {
      let value = match element_type.as_str() {
        "IntProperty" => SetValue::Int(self.read_i32::<LE>()?),
        "UInt32Property" => SetValue::UInt32(self.read_u32::<LE>()?),
        "NameProperty" | "StrProperty" => SetValue::String(self.read_length_prefixed_string::<LE>()?),
        "ObjectProperty" => SetValue::Object(self.read_object_reference::<LE>()?),
        "StructProperty" => {
          if parent_type == FOLIAGE_REMOVAL_TYPE {
            if self.is_double_precision() {
              SetValue::VectorD(self.read_vector_double::<LE>()?)
            } else {
              SetValue::Vector(self.read_vector::<LE>()?)
            }
          } else {
            SetValue::Properties(self.read_properties(parent_type)?)
          }
        },
        _ => return Err(ParseError::UnknownSetType(element_type)),
      };
      values.push(value);
    }

    Ok(SetProperty { element_type, removed_count, values })
  }

  fn read_map_property(&mut self, property_name: &str, parent_type: &str) -> Result<MapProperty> {
    let key_type = self.read_length_prefixed_string::<LE>()?;
    let value_type = self.read_length_prefixed_string::<LE>()?;

    // Padding
    self.seek_relative(1)?;

    let mode = self.read_i32::<LE>()?;
    let mut mode_hex = None;
    let mut mode_strings = None;
    if mode == 2 {
      mode_strings = Some((
        self.read_length_prefixed_string::<LE>()?,
        self.read_length_prefixed_string::<LE>()?,
      ));
    } else if mode == 3 {
      mode_hex = Some(self.read_hex(9)?);
      mode_strings = Some((
        self.read_length_prefixed_string::<LE>()?,
        self.read_length_prefixed_string::<LE>()?,
      ));
    }

    let num_entries = self.read_i32::<LE>()?;
    trace!("Reading {num_entries} map entries ({key_type} -> {value_type})");

    let mut entries: Vec<(MapKey, MapValue)> = vec![];
    for _ in 0..num_entries {
      let key = match key_type.as_str() {
        "IntProperty" => MapKey::Int(self.read_i32::<LE>()?),
        "Int64Property" => MapKey::Int64(self.read_i64::<LE>()?),
        "ByteProperty" => MapKey::Byte(self.read_u8()?),
        "NameProperty" | "StrProperty" | "EnumProperty" => MapKey::String(self.read_length_prefixed_string::<LE>()?),
        "ObjectProperty" => MapKey::Object(self.read_object_reference::<LE>()?),
        "StructProperty" => {
          if property_name == "Destroyed_Foliage_Transform" {
            if self.is_double_precision() {
              MapKey::VectorD(self.read_vector_double::<LE>()?)
            } else {
              MapKey::Vector(self.read_vector::<LE>()?)
            }
          } else if parent_type == BUILD_GUN_UTILITIES_TYPE {
            MapKey::Vector(self.read_vector::<LE>()?)
          } else if property_name == "mSaveData" || property_name == "mUnresolvedSaveData" {
            MapKey::IntVector(self.read_vector_int::<LE>()?)
          } else {
            MapKey::Properties(self.read_properties(parent_type)?)
          }
        },
        _ => return Err(ParseError::UnknownMapKeyType(key_type)),
      };

      let value = match value_type.as_str() {
        "ByteProperty" => {
          if key_type == "StrProperty" {
            MapValue::String(self.read_length_prefixed_string::<LE>()?)
          } else {
            MapValue::Byte(self.read_u8()?)
          }
        },
        "BoolProperty" => MapValue::Bool(self.read_u8()? != 0),
        "IntProperty" => MapValue::Int(self.read_i32::<LE>()?),
        "Int64Property" => MapValue::Int64(self.read_i64::<LE>()?),
        "FloatProperty" => MapValue::Float(self.read_f32::<LE>()?),
        "DoubleProperty" => MapValue::Double(self.read_f64::<LE>()?),
        "StrProperty" | "NameProperty" | "EnumProperty" => MapValue::String(self.read_length_prefixed_string::<LE>()?),
        "ObjectProperty" => MapValue::Object(self.read_object_reference::<LE>()?),
        "TextProperty" => MapValue::Text(self.read_text()?),
        "StructProperty" => {
          if parent_type == BALANCER_DATA_TYPE {
            MapValue::IntVector(self.read_vector_int::<LE>()?)
          } else if parent_type == STORAGE_STATS_ROOM_TYPE {
            MapValue::VectorD(self.read_vector_double::<LE>()?)
          } else {
            MapValue::Properties(self.read_properties(parent_type)?)
          }
        },
        _ => return Err(ParseError::UnknownMapValueType(value_type)),
      };

      entries.push((key, value));
    }

    Ok(MapProperty { key_type, value_type, mode, mode_hex, mode_strings, entries })
  }

  fn read_struct_property(&mut self, size: i32, parent_type: &str) -> Result<StructProperty> {
    let struct_type = self.read_length_prefixed_string::<LE>()?;

    // Two 8-byte blocks of padding and one padding byte
    self.seek_relative(17)?;

    let start_byte = self.stream_position()?;
    let end_byte = start_byte + size.max(0) as u64;
    let value = self.read_typed_data(&struct_type, parent_type, end_byte)?;

    let current_position = self.stream_position()?;
    if current_position != end_byte {
      warn!(
        "Struct {struct_type} in {parent_type} should end at byte {end_byte} but ended at {current_position}"
      );
    }

    Ok(StructProperty { struct_type, value })
  }
}
