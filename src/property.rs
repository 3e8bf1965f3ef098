use serde::{Serialize, Deserialize};
use strum::{AsRefStr, EnumString};

use crate::math::Vector;
use crate::save::ObjectReference;
use crate::typed_data::TypedData;

/// Literal name that terminates every property list
pub const NONE: &str = "None";

/// Every property type name the stream may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, AsRefStr)]
pub enum PropertyType {
  #[strum(serialize = "BoolProperty")]
  Bool,
  #[strum(serialize = "ByteProperty")]
  Byte,
  #[strum(serialize = "EnumProperty")]
  Enum,
  #[strum(serialize = "FloatProperty")]
  Float,
  #[strum(serialize = "IntProperty")]
  Int,
  #[strum(serialize = "Int64Property")]
  Int64,
  #[strum(serialize = "UInt32Property")]
  UInt32,
  #[strum(serialize = "NameProperty")]
  Name,
  #[strum(serialize = "StrProperty")]
  Str,
  #[strum(serialize = "ObjectProperty")]
  Object,
  #[strum(serialize = "TextProperty")]
  Text,
  #[strum(serialize = "ArrayProperty")]
  Array,
  #[strum(serialize = "SetProperty")]
  Set,
  #[strum(serialize = "MapProperty")]
  Map,
  #[strum(serialize = "StructProperty")]
  Struct,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Property {
  pub name: String,
  pub index: i32,
  pub size: i32,
  pub value: PropertyValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum PropertyValue {
  Bool(bool),
  Byte(ByteValue),
  Enum(EnumValue),
  Float(f32),
  Int(i32),
  Int64(i64),
  UInt32(u32),
  Name(String),
  Str(String),
  Object(ObjectReference),
  Text(TextProperty),
  Array(ArrayProperty),
  Set(SetProperty),
  Map(MapProperty),
  Struct(StructProperty),
}

impl PropertyValue {
  pub fn property_type(&self) -> PropertyType {
    match self {
      PropertyValue::Bool(_) => PropertyType::Bool,
      PropertyValue::Byte(_) => PropertyType::Byte,
      PropertyValue::Enum(_) => PropertyType::Enum,
      PropertyValue::Float(_) => PropertyType::Float,
      PropertyValue::Int(_) => PropertyType::Int,
      PropertyValue::Int64(_) => PropertyType::Int64,
      PropertyValue::UInt32(_) => PropertyType::UInt32,
      PropertyValue::Name(_) => PropertyType::Name,
      PropertyValue::Str(_) => PropertyType::Str,
      PropertyValue::Object(_) => PropertyType::Object,
      PropertyValue::Text(_) => PropertyType::Text,
      PropertyValue::Array(_) => PropertyType::Array,
      PropertyValue::Set(_) => PropertyType::Set,
      PropertyValue::Map(_) => PropertyType::Map,
      PropertyValue::Struct(_) => PropertyType::Struct,
    }
  }
}

/// A byte property is either a raw byte or, when backed by an enum, the
/// enum value's name
#[derive(Debug, Serialize, Deserialize)]
pub struct ByteValue {
  pub enum_type: String,
  pub value: ByteValueKind,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum ByteValueKind {
  Byte(u8),
  Name(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnumValue {
  pub enum_type: String,
  pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextProperty {
  pub flags: i32,
  pub history: TextHistory,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum TextHistory {
  Base {
    namespace: String,
    key: String,
    value: String,
  },
  ArgumentFormat {
    source_format: Box<TextProperty>,
    arguments: Vec<TextArgument>,
  },
  Transform {
    source_text: Box<TextProperty>,
    transform_type: u8,
  },
  StringTableEntry {
    table_id: String,
    text_key: String,
  },
  None {
    culture_invariant_string: Option<String>,
  },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextArgument {
  pub name: String,
  pub value: TextArgumentValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum TextArgumentValue {
  Int(i64),
  UInt(u64),
  Float(f32),
  Double(f64),
  Text(TextProperty),
}

/// Tag preceding the elements of an array of structs
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArrayStructMeta {
  pub name: String,
  pub size_bytes: i32,
  pub struct_type: String,
  pub guid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArrayProperty {
  pub element_type: String,
  pub struct_meta: Option<ArrayStructMeta>,
  pub elements: ArrayValues,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum ArrayValues {
  Bool(Vec<bool>),
  Byte(Vec<u8>),
  Enum(Vec<String>),
  Str(Vec<String>),
  Float(Vec<f32>),
  Int(Vec<i32>),
  Int64(Vec<i64>),
  Object(Vec<ObjectReference>),
  Text(Vec<TextProperty>),
  Struct(Vec<TypedData>),
}

impl ArrayValues {
  pub fn len(&self) -> usize {
    match self {
      ArrayValues::Bool(v) => v.len(),
      ArrayValues::Byte(v) => v.len(),
      ArrayValues::Enum(v) | ArrayValues::Str(v) => v.len(),
      ArrayValues::Float(v) => v.len(),
      ArrayValues::Int(v) => v.len(),
      ArrayValues::Int64(v) => v.len(),
      ArrayValues::Object(v) => v.len(),
      ArrayValues::Text(v) => v.len(),
      ArrayValues::Struct(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetProperty {
  pub element_type: String,
  pub removed_count: i32,
  pub values: Vec<SetValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum SetValue {
  Int(i32),
  UInt32(u32),
  String(String),
  Object(ObjectReference),
  Vector(Vector<f32>),
  VectorD(Vector<f64>),
  Properties(Vec<Property>),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapProperty {
  pub key_type: String,
  pub value_type: String,
  pub mode: i32,
  /// Mode-dependent fields whose meaning is unknown; kept byte-exact
  pub mode_hex: Option<String>,
  pub mode_strings: Option<(String, String)>,
  pub entries: Vec<(MapKey, MapValue)>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum MapKey {
  Int(i32),
  Int64(i64),
  Byte(u8),
  String(String),
  Object(ObjectReference),
  Vector(Vector<f32>),
  VectorD(Vector<f64>),
  IntVector(Vector<i32>),
  Properties(Vec<Property>),
}

#[derive(Debug, Serialize, Deserialize)]
pub enum MapValue {
  Byte(u8),
  Bool(bool),
  Int(i32),
  Int64(i64),
  Float(f32),
  Double(f64),
  String(String),
  Object(ObjectReference),
  Text(TextProperty),
  IntVector(Vector<i32>),
  VectorD(Vector<f64>),
  Properties(Vec<Property>),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StructProperty {
  pub struct_type: String,
  pub value: TypedData,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn property_type_registry() {
    assert_eq!(PropertyType::from_str("IntProperty").unwrap(), PropertyType::Int);
    assert_eq!(PropertyType::from_str("StrProperty").unwrap(), PropertyType::Str);
    assert_eq!(PropertyType::Struct.as_ref(), "StructProperty");
    assert!(PropertyType::from_str("DoubleProperty").is_err());
    assert!(PropertyType::from_str("Int").is_err());
  }
}
