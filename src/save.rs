use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::extra_data::ExtraData;
use crate::math::{Quaternion, Vector};
use crate::property::Property;

/// Number of 100ns ticks between 0001-01-01 and the Unix epoch
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

#[derive(Debug, Serialize, Deserialize)]
pub struct Save {
  pub header: Header,
  pub body: Body,
}

impl Save {
  /// Iterates every object in the save regardless of the body shape
  pub fn objects(&self) -> impl Iterator<Item = &Object> {
    let (flat, levels) = match &self.body {
      Body::Legacy(body) => (body.objects.as_slice(), &[] as &[Level]),
      Body::Levels(body) => (&[] as &[Object], body.levels.as_slice()),
    };
    flat.iter().chain(levels.iter().flat_map(|level| level.objects.iter()))
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Header {
  pub header_version: i32,
  pub save_version: i32,
  pub build_version: i32,
  pub save_name: Option<String>,
  pub map_name: String,
  pub map_options: String,
  pub session_name: String,
  pub played_seconds: i32,
  pub save_date_time: i64,
  pub session_visibility: Option<u8>,
  pub editor_object_version: Option<i32>,
  pub mod_metadata: Option<String>,
  pub is_modded_save: Option<bool>,
  pub save_identifier: Option<String>,
  pub is_partitioned_world: Option<bool>,
  pub save_data_hash: Option<String>,
  pub is_creative_mode_enabled: Option<bool>,
}

impl Header {
  /// Converts the stored tick count (100ns since 0001-01-01, UTC) into a
  /// timestamp; `None` if it falls outside chrono's range
  pub fn saved_at(&self) -> Option<DateTime<Utc>> {
    let ticks = self.save_date_time - UNIX_EPOCH_TICKS;
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;
    DateTime::<Utc>::from_timestamp(seconds, nanos as u32)
  }

  pub fn is_partitioned(&self) -> bool {
    self.is_partitioned_world.unwrap_or(false)
  }
}

/// One of the three size/offset descriptors framing a compressed chunk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkInfo {
  pub compressed_size: i32,
  pub compressed_offset: i32,
  pub uncompressed_size: i32,
  pub uncompressed_offset: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Body {
  /// Saves older than the level split: one flat object list
  Legacy(LegacyBody),
  Levels(LevelsBody),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LegacyBody {
  pub objects: Vec<Object>,
  pub collectables: Vec<ObjectReference>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LevelsBody {
  pub grid: Option<Grid>,
  pub levels: Vec<Level>,
  pub references: Option<Vec<ObjectReference>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Level {
  pub name: String,
  /// Set when the file records a save version per level
  pub save_version: Option<i32>,
  pub objects: Vec<Object>,
  pub collectables: Vec<ObjectReference>,
  pub second_collectables: Vec<ObjectReference>,
}

/// World partition metadata preceding the levels of partitioned saves
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Grid {
  pub count: i32,
  pub unk_str_1: String,
  pub unk_num_1: i64,
  pub unk_num_2: i32,
  pub unk_str_2: String,
  pub unk_num_3: i32,
  pub partitions: Vec<Partition>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Partition {
  pub name: String,
  pub cell_size: i32,
  pub hash: u32,
  pub levels: Vec<PartitionLevel>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PartitionLevel {
  pub name: String,
  pub hash: u32,
}

pub enum ObjectType {
  Component,
  Actor,
}

impl ObjectType {
  pub fn from_i32(value: i32) -> Option<ObjectType> {
    match value {
      0 => Some(ObjectType::Component),
      1 => Some(ObjectType::Actor),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObjectHeader {
  Component(ComponentHeader),
  Actor(ActorHeader),
}

impl ObjectHeader {
  pub fn type_path(&self) -> &str {
    match self {
      ObjectHeader::Component(c) => &c.type_path,
      ObjectHeader::Actor(a) => &a.type_path,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentHeader {
  pub type_path: String,
  pub reference: ObjectReference,
  pub flags: Option<u32>,
  pub parent_actor_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorHeader {
  pub type_path: String,
  pub reference: ObjectReference,
  pub flags: Option<u32>,
  pub needs_transform: bool,
  pub rotation: Quaternion<f32>,
  pub position: Vector<f32>,
  pub scale: Vector<f32>,
  pub placed_in_level: bool,
}

/// Everything decoded from an object's second pass, common to both shapes
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ObjectBody {
  /// Only set when the object's own version disagrees with the file's
  pub entity_save_version: Option<i32>,
  pub size_bytes: i32,
  pub properties: Vec<Property>,
  pub extra: Option<ExtraData>,
  /// Unconsumed bytes left before the object's declared end
  pub missing: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentObject {
  pub header: ComponentHeader,
  pub body: ObjectBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActorObject {
  pub header: ActorHeader,
  pub parent: ObjectReference,
  pub components: Vec<ObjectReference>,
  pub body: ObjectBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Object {
  Component(ComponentObject),
  Actor(ActorObject),
}

impl Object {
  pub fn type_path(&self) -> &str {
    match self {
      Object::Component(c) => &c.header.type_path,
      Object::Actor(a) => &a.header.type_path,
    }
  }

  pub fn reference(&self) -> &ObjectReference {
    match self {
      Object::Component(c) => &c.header.reference,
      Object::Actor(a) => &a.header.reference,
    }
  }

  pub fn body(&self) -> &ObjectBody {
    match self {
      Object::Component(c) => &c.body,
      Object::Actor(a) => &a.body,
    }
  }

  pub fn properties(&self) -> &[Property] {
    &self.body().properties
  }
}

/// Identifies an object by level and path; never owns what it points at
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
  pub level_name: String,
  pub path_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoftObjectReference {
  pub reference: ObjectReference,
  pub sub_path: String,
}
