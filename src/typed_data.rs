use serde::{Serialize, Deserialize};
use strum::{AsRefStr, EnumString};

use crate::math::*;
use crate::property::Property;
use crate::save::{ObjectReference, SoftObjectReference};

/// Struct type names with a fixed binary shape. Any other name is read as a
/// bag of properties
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, AsRefStr)]
pub enum TypedDataType {
  Box,
  Color,
  LinearColor,
  #[strum(serialize = "Vector", serialize = "Vector_NetQuantize")]
  Vector,
  Vector2D,
  Vector4,
  Quat,
  Rotator,
  IntPoint,
  IntVector,
  IntVector4,
  Guid,
  DateTime,
  Timespan,
  TimerHandle,
  SlateBrush,
  FluidBox,
  RailroadTrackPosition,
  InventoryItem,
  InventoryStack,
  #[strum(serialize = "FICFrameRange")]
  FrameRange,
  ClientIdentityInfo,
  #[strum(serialize = "SoftObjectPath", serialize = "SoftClassPath")]
  SoftObjectPath,
  LBBalancerIndexing,
  FINNetworkTrace,
  FINGPUT1BufferPixel,
  FINLuaProcessorStateStorage,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum TypedData {
  Box(BoxBounds<f32>),
  BoxD(BoxBounds<f64>),
  Color(Color<u8>),
  LinearColor(Color<f32>),
  Vector(Vector<f32>),
  VectorD(Vector<f64>),
  Vector2D(Vector2D<f32>),
  Vector2DD(Vector2D<f64>),
  Vector4(Vector4<f32>),
  Vector4D(Vector4<f64>),
  Quat(Quaternion<f32>),
  QuatD(Quaternion<f64>),
  Rotator(Rotator<f32>),
  RotatorD(Rotator<f64>),
  IntPoint(Vector2D<i32>),
  IntVector(Vector<i32>),
  IntVector4(Vector4<i32>),
  Guid(String),
  DateTime(i64),
  Timespan(i64),
  TimerHandle(String),
  SlateBrush(String),
  FluidBox(f32),
  RailroadTrackPosition(RailroadTrackPosition),
  InventoryItem(InventoryItem),
  InventoryStack(InventoryStack),
  FrameRange(FrameRange),
  ClientIdentityInfo(ClientIdentityInfo),
  SoftObjectPath(SoftObjectReference),
  LBBalancerIndexing(BalancerIndexing),
  FINNetworkTrace(FINNetworkTrace),
  FINGPUT1BufferPixel(FINGPUT1BufferPixel),
  FINLuaProcessorStateStorage(FINLuaProcessorStateStorage),
  /// Fallback for struct types without a known shape
  ArrayProperties {
    type_name: String,
    properties: Vec<Property>,
  },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RailroadTrackPosition {
  pub track: ObjectReference,
  pub offset: f32,
  pub forward: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryItem {
  pub unk_int_1: i32,
  pub item_name: String,
  /// Item state reference, only stored by older saves
  pub state: Option<ObjectReference>,
  /// The plain string that replaced `state` in newer saves
  pub state_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum InventoryStack {
  V0 {
    unk_int_1: i32,
    item_name: String,
    unk_int_2: i32,
    unk_int_3: i32,
    unk_int_4: i32,
  },
  V1 {
    unk_str_1: String,
    unk_str_2: String,
    unk_int_1: i32,
    unk_int_2: i32,
    property: Option<Box<Property>>,
    properties: Vec<Property>,
    unk_str_3: String,
  },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FrameRange {
  pub begin: i64,
  pub end: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClientIdentityInfo {
  pub offline_id: String,
  pub account_ids: Vec<(u8, String)>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BalancerIndexing {
  pub normal_index: i32,
  pub overflow_index: i32,
  pub filter_index: i32,
}

/// A [FicsIt-Network Network trace](https://docs.ficsit.app/ficsit-networks/latest/NetworkTrace.html)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FINNetworkTrace {
  pub reference: ObjectReference,
  pub prev: Option<Box<FINNetworkTrace>>,
  pub step: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FINGPUT1BufferPixel {
  pub character: String,
  pub foreground_color: Color<f32>,
  pub background_color: Color<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FINGPUT1Buffer {
  pub x: i32,
  pub y: i32,
  pub size: i32,
  pub name: String,
  pub r#type: String,
  pub length: i32,
  pub buffer: Vec<FINGPUT1BufferPixel>,
  pub unk_str_1: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ItemAmount {
  pub unk_int_1: i32,
  pub item_name: String,
  pub amount: i32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FINLuaProcessorStateStorage {
  pub traces: Vec<FINNetworkTrace>,
  pub references: Vec<ObjectReference>,
  pub thread: String,
  pub globals: String,
  pub structs: Vec<FINLuaStorageStruct>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FINLuaStorageStruct {
  pub unk_int_1: i32,
  pub class_name: String,
  pub value: FINLuaStorageValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum FINLuaStorageValue {
  /// Struct classes the storage records by name only
  Skipped,
  Vector(Vector<f32>),
  LinearColor(Color<f32>),
  InventoryStack {
    unk_str_1: String,
    unk_str_2: String,
    unk_int_1: i32,
    unk_int_2: i32,
    item: Box<TypedData>,
    unk_str_3: String,
  },
  ItemAmount(ItemAmount),
  TrackGraph(FINNetworkTrace, i32),
  GPUT1Buffer(FINGPUT1Buffer),
}
