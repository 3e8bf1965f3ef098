use std::io::{Read, Seek};

use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::{trace, warn};

use super::SaveReader;
use crate::errors::ParseError;
use crate::save::*;
use crate::versions::*;
use crate::{ReadSaveFileBytes, Result};

impl<R: Read + Seek> SaveReader<'_, R> {
  /// Reads an object header by reading a 32-bit integer to determine the
  /// header type and then the fields of that shape. Flags are only present
  /// when a per-record save version is supplied and new enough
  pub fn read_object_header(&mut self, save_version: Option<i32>) -> Result<ObjectHeader> {
    let object_type = self.read_i32::<LE>()?;
    match ObjectType::from_i32(object_type) {
      Some(ObjectType::Component) => Ok(ObjectHeader::Component(self.read_component_header(save_version)?)),
      Some(ObjectType::Actor) => Ok(ObjectHeader::Actor(self.read_actor_header(save_version)?)),
      None => Err(ParseError::UnknownObjectType(object_type)),
    }
  }

  fn read_object_flags(&mut self, save_version: Option<i32>) -> Result<Option<u32>> {
    match save_version {
      Some(v) if v >= SAVE_VERSION_OBJECT_FLAGS => Ok(Some(self.read_u32::<LE>()?)),
      _ => Ok(None),
    }
  }

  fn read_component_header(&mut self, save_version: Option<i32>) -> Result<ComponentHeader> {
    Ok(ComponentHeader {
      type_path: self.read_length_prefixed_string::<LE>()?,
      reference: self.read_object_reference::<LE>()?,
      flags: self.read_object_flags(save_version)?,
      parent_actor_name: self.read_length_prefixed_string::<LE>()?,
    })
  }

  fn read_actor_header(&mut self, save_version: Option<i32>) -> Result<ActorHeader> {
    Ok(ActorHeader {
      type_path: self.read_length_prefixed_string::<LE>()?,
      reference: self.read_object_reference::<LE>()?,
      flags: self.read_object_flags(save_version)?,
      needs_transform: self.read_bool32::<LE>()?,
      rotation: self.read_quaternion::<LE>()?,
      position: self.read_vector::<LE>()?,
      scale: self.read_vector::<LE>()?,
      placed_in_level: self.read_bool32::<LE>()?,
    })
  }

  /// Reads the body belonging to a previously read header and returns the
  /// finished object. The declared size is checked against where the
  /// properties and extra data actually end
  pub fn read_object(&mut self, object_header: ObjectHeader) -> Result<Object> {
    let mut body = ObjectBody::default();

    if self.is_double_precision() {
      let object_save_version = self.read_i32::<LE>()?;
      if object_save_version != self.save_version() {
        body.entity_save_version = Some(object_save_version);
      }

      // Reserved
      self.seek_relative(4)?;
    }

    body.size_bytes = self.read_i32::<LE>()?;

    // Marks the start byte so that, after reading the object's components and
    // properties, the position can be checked against the declared size
    let start_byte = self.stream_position()?;
    let end_byte = (start_byte as i64 + body.size_bytes as i64).max(0) as u64;

    match object_header {
      ObjectHeader::Component(header) => {
        self.read_object_properties(&header.type_path, end_byte, &mut body)?;
        Ok(Object::Component(ComponentObject { header, body }))
      },
      ObjectHeader::Actor(header) => {
        let parent = self.read_object_reference::<LE>()?;

        let num_components = self.read_i32::<LE>()?;
        let mut components: Vec<ObjectReference> = vec![];
        for _ in 0..num_components {
          components.push(self.read_object_reference::<LE>()?);
        }

        self.read_object_properties(&header.type_path, end_byte, &mut body)?;
        Ok(Object::Actor(ActorObject { header, parent, components, body }))
      },
    }
  }

  fn read_object_properties(&mut self, type_path: &str, end_byte: u64, body: &mut ObjectBody) -> Result<()> {
    if self.stream_position()? == end_byte {
      trace!("{type_path} has no properties");
      return Ok(());
    }

    while let Some(property) = self.read_property(type_path)? {
      trace!("Adding object property: {}", property.name);
      body.properties.push(property);
    }
    self.check_object_end(type_path, end_byte)?;

    body.extra = self.read_extra_data(type_path, end_byte)?;

    let missing_bytes = self.check_object_end(type_path, end_byte)?;
    if missing_bytes > 4 {
      let missing = self.read_hex(missing_bytes as usize)?;
      warn!("Missing {missing_bytes} bytes at the end of {type_path}: {:?}", missing);
      body.missing = Some(missing);
    } else if missing_bytes > 0 {
      // Trailing marker
      self.seek_relative(missing_bytes as i64)?;
    }

    Ok(())
  }

  /// Returns how many bytes are left before the object's end, failing if the
  /// object has already been read past it
  fn check_object_end(&mut self, type_path: &str, end_byte: u64) -> Result<u64> {
    let current_position = self.stream_position()?;
    if current_position > end_byte {
      return Err(ParseError::ObjectLength {
        type_path: type_path.to_string(),
        expected: end_byte,
        actual: current_position,
      });
    }
    Ok(end_byte - current_position)
  }
}
