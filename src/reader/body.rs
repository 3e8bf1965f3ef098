use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian as LE, ReadBytesExt};
use log::{debug, info, trace};

use super::SaveReader;
use crate::errors::ParseError;
use crate::save::*;
use crate::versions::*;
use crate::{ReadSaveFileBytes, Result};

impl<R: Read + Seek> SaveReader<'_, R> {
  /// Reads the whole body. Saves from before the level split hold a single
  /// flat object list; newer saves hold one entry per level plus the
  /// persistent level
  pub fn read_body(&mut self) -> Result<Body> {
    if self.save_version() < SAVE_VERSION_LEVELS {
      Ok(Body::Legacy(self.read_legacy_body()?))
    } else {
      Ok(Body::Levels(self.read_levels_body()?))
    }
  }

  fn read_legacy_body(&mut self) -> Result<LegacyBody> {
    let num_headers = self.read_i32::<LE>()?;
    debug!("Reading {num_headers} object headers");
    let mut headers: Vec<ObjectHeader> = vec![];
    for _ in 0..num_headers {
      headers.push(self.read_object_header(None)?);
    }

    let level_name = self.header().map_name.clone();
    let objects = self.read_objects(&level_name, headers)?;
    let collectables = self.read_object_references()?;

    Ok(LegacyBody { objects, collectables })
  }

  fn read_levels_body(&mut self) -> Result<LevelsBody> {
    let grid = if self.is_double_precision() && self.header().is_partitioned() {
      Some(self.read_grid()?)
    } else {
      None
    };

    let num_levels = self.read_i32::<LE>()?;
    info!("Reading {} levels", num_levels + 1);

    let mut levels: Vec<Level> = vec![];
    for i in 0..=num_levels {
      trace!("Reading level {}/{} @ byte {}", i + 1, num_levels + 1, self.stream_position()?);
      levels.push(self.read_level(i == num_levels)?);
    }

    let references = if self.stream_position()? == self.stream_length()? {
      None
    } else {
      Some(self.read_object_references()?)
    };

    Ok(LevelsBody { grid, levels, references })
  }

  /// Reads the world partition metadata which starts the body of partitioned
  /// saves and comes before the level data
  fn read_grid(&mut self) -> Result<Grid> {
    let mut grid = Grid {
      count: self.read_i32::<LE>()?,
      unk_str_1: self.read_length_prefixed_string::<LE>()?,
      unk_num_1: self.read_i64::<LE>()?,
      unk_num_2: self.read_i32::<LE>()?,
      unk_str_2: self.read_length_prefixed_string::<LE>()?,
      unk_num_3: self.read_i32::<LE>()?,
      ..Default::default()
    };

    for _ in 1..grid.count {
      let mut partition = Partition {
        name: self.read_length_prefixed_string::<LE>()?,
        cell_size: self.read_i32::<LE>()?,
        hash: self.read_u32::<LE>()?,
        ..Default::default()
      };

      let num_levels = self.read_i32::<LE>()?;
      for _ in 0..num_levels {
        partition.levels.push(PartitionLevel {
          name: self.read_length_prefixed_string::<LE>()?,
          hash: self.read_u32::<LE>()?,
        });
      }

      grid.partitions.push(partition);
    }

    Ok(grid)
  }

  /// Reads a single level: its object headers, collectables, the objects
  /// themselves and the repeated collectables. The persistent level comes
  /// last and has no stored name
  fn read_level(&mut self, is_persistent: bool) -> Result<Level> {
    let name = if is_persistent {
      format!("Level {}", self.header().map_name)
    } else {
      self.read_length_prefixed_string::<LE>()?
    };
    debug!("Level '{name}'");

    let headers_size_bytes = self.read_level_length()?;
    let level_start_byte = self.stream_position()? as i64;

    let level_save_version = if self.save_version() >= SAVE_VERSION_OBJECT_FLAGS {
      if is_persistent {
        Some(self.save_version())
      } else {
        Some(self.peek_level_save_version(&name, headers_size_bytes)?)
      }
    } else {
      None
    };
    let record_version = level_save_version.unwrap_or(self.save_version());

    let num_headers = self.read_i32::<LE>()?;
    trace!("Reading {num_headers} object headers");
    let mut headers: Vec<ObjectHeader> = vec![];
    for _ in 0..num_headers {
      headers.push(self.read_object_header(Some(record_version))?);
    }

    let current_position = self.stream_position()? as i64;
    let stop_byte = level_start_byte
      .checked_add(headers_size_bytes)
      .and_then(|end| end.checked_sub(4))
      .ok_or_else(|| level_length_error(&name, headers_size_bytes))?;
    let collectables = if current_position < stop_byte {
      self.read_collectables(is_persistent)?
    } else {
      if current_position == stop_byte {
        // Empty collectables count
        self.seek_relative(4)?;
      }
      vec![]
    };

    let objects_size_bytes = self.read_level_length()?;
    let objects_start_byte = self.stream_position()?;
    let objects = self.read_objects(&name, headers)?;

    let objects_end_byte = (objects_start_byte as i64)
      .checked_add(objects_size_bytes)
      .and_then(|end| u64::try_from(end).ok())
      .ok_or_else(|| level_length_error(&name, objects_size_bytes))?;
    let current_position = self.stream_position()?;
    if current_position != objects_end_byte {
      return Err(ParseError::ObjectRegionMismatch {
        level: name,
        expected: objects_end_byte,
        actual: current_position,
      });
    }

    if self.save_version() >= SAVE_VERSION_OBJECT_FLAGS && !is_persistent {
      // Already known from the look-ahead
      self.read_i32::<LE>()?;
    }

    let second_collectables = self.read_collectables(is_persistent)?;

    Ok(Level {
      name,
      save_version: level_save_version,
      objects,
      collectables,
      second_collectables,
    })
  }

  fn read_level_length(&mut self) -> Result<i64> {
    if self.is_double_precision() {
      Ok(self.read_i64::<LE>()?)
    } else {
      Ok(self.read_i32::<LE>()? as i64)
    }
  }

  /// Non-persistent levels store their save version after their objects, so
  /// it is read ahead of time and the cursor is put back where it was
  fn peek_level_save_version(&mut self, level: &str, headers_size_bytes: i64) -> Result<i32> {
    self.seek(SeekFrom::Current(headers_size_bytes))?;
    let objects_size_bytes = self.read_i64::<LE>()?;
    self.seek(SeekFrom::Current(objects_size_bytes))?;
    let version = self.read_i32::<LE>()?;

    let rewind = objects_size_bytes
      .checked_add(headers_size_bytes)
      .and_then(|size| size.checked_add(4 + 8))
      .and_then(|size| size.checked_neg())
      .ok_or_else(|| level_length_error(level, objects_size_bytes))?;
    self.seek(SeekFrom::Current(rewind))?;
    Ok(version)
  }

  fn read_collectables(&mut self, is_persistent: bool) -> Result<Vec<ObjectReference>> {
    let mut num_collectables = self.read_i32::<LE>()?;
    if num_collectables == 0 && is_persistent && self.save_version() >= SAVE_VERSION_PERSISTENT_COLLECTABLES {
      let unknown = self.read_length_prefixed_string::<LE>()?;
      trace!("Skipping '{unknown}' before the persistent level's collectables");
      num_collectables = self.read_i32::<LE>()?;
    }

    let mut collectables: Vec<ObjectReference> = vec![];
    for _ in 0..num_collectables {
      collectables.push(self.read_object_reference::<LE>()?);
    }
    Ok(collectables)
  }

  fn read_object_references(&mut self) -> Result<Vec<ObjectReference>> {
    let num_references = self.read_i32::<LE>()?;
    let mut references: Vec<ObjectReference> = vec![];
    for _ in 0..num_references {
      references.push(self.read_object_reference::<LE>()?);
    }
    Ok(references)
  }

  /// Reads the object bodies of a level in the same order as its headers;
  /// both lists must be the same length
  fn read_objects(&mut self, level_name: &str, headers: Vec<ObjectHeader>) -> Result<Vec<Object>> {
    let num_objects = self.read_i32::<LE>()?;
    if num_objects < 0 || num_objects as usize != headers.len() {
      return Err(ParseError::ObjectCountMismatch {
        level: level_name.to_string(),
        headers: headers.len(),
        objects: num_objects,
      });
    }

    trace!("Reading {num_objects} objects");
    let mut objects: Vec<Object> = Vec::with_capacity(headers.len());
    for object_header in headers {
      objects.push(self.read_object(object_header)?);
    }
    Ok(objects)
  }
}

fn level_length_error(level: &str, length: i64) -> ParseError {
  ParseError::LevelLength { level: level.to_string(), length }
}
