use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::result;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use flate2::bufread::ZlibDecoder;
use log::{debug, info};

pub mod errors;
pub mod extra_data;
pub mod math;
pub mod property;
pub mod reader;
pub mod save;
pub mod typed_data;
pub mod versions;

#[cfg(test)]
mod test_utils;

use crate::errors::ParseError;
use crate::math::*;
use crate::reader::SaveReader;
use crate::save::*;
use crate::versions::*;

pub type Result<T> = result::Result<T, ParseError>;

/// Reads the save file at the given path. See [`read_save`]
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Save> {
  let file_bytes = fs::read(&path)?;
  read_bytes(&file_bytes)
}

/// Reads a save file already held in memory. See [`read_save`]
pub fn read_bytes(bytes: &[u8]) -> Result<Save> {
  read_save(bytes)
}

/// Reads a complete save: the header, then the body, which is either stored
/// directly after the header (old saves) or split into zlib chunks that are
/// inflated into one buffer before decoding
pub fn read_save<R: Read>(mut reader: R) -> Result<Save> {
  let mut file_bytes: Vec<u8> = vec![];
  reader.read_to_end(&mut file_bytes)?;
  let file_size_bytes = file_bytes.len() as u64;
  let mut cursor = io::Cursor::new(file_bytes);

  let header = cursor.read_header::<LittleEndian>()?;
  debug!("Header: {:?}", header);

  if header.save_version < SAVE_VERSION_COMPRESSED_BODY {
    info!("> Reading uncompressed body (save version {})", header.save_version);
    let body = SaveReader::new(cursor, &header).read_body()?;
    return Ok(Save { header, body });
  }

  info!("> Decompressing chunks");
  let chunks = cursor.read_chunks::<LittleEndian>(header.header_version, file_size_bytes)?;
  drop(cursor);

  let body_bytes: Vec<u8> = chunks.concat();
  let mut body_cursor = io::Cursor::new(body_bytes);
  body_cursor.read_body_length::<LittleEndian>(header.header_version)?;

  info!("> Reading body (save version {})", header.save_version);
  let body = SaveReader::new(body_cursor, &header).read_body()?;

  Ok(Save { header, body })
}

/// Extends `byteorder`'s `ReadBytesExt` (which itself extends `io::Read`)
/// and `io::Seek` to build a robust byte reader with many great
/// utility functions needed to support the custom save file format
pub trait ReadSaveFileBytes: ReadBytesExt + Seek {
  /// Reads exactly `len` bytes without trusting `len` for the allocation
  fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = vec![];
    (&mut *self).take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
      return Err(ParseError::Truncated);
    }
    Ok(bytes)
  }

  /// Reads a specified number of bytes, keeping each one as a single `char`.
  /// This is how opaque blobs (hashes, GUIDs, unknown trailers) are stored
  fn read_hex(&mut self, len: usize) -> Result<String> {
    Ok(self.read_bytes(len)?.into_iter().map(char::from).collect())
  }

  /// Reads a string whose length and encoding are specified by a prefixed
  /// 32-bit integer:
  ///
  /// - If the length is > 0, the following string is UTF-8 encoded
  /// - If the length is < 0, the following string is UTF-16 encoded and
  ///   holds `-length` code units
  /// - If it == 0, the string is empty
  ///
  /// Trailing null terminators are removed
  fn read_length_prefixed_string<E: ByteOrder>(&mut self) -> Result<String> {
    let len = self.read_i32::<E>()?;

    let string = if len > 0 {
      String::from_utf8(self.read_bytes(len as usize)?)?
    } else if len < 0 {
      let bytes = self.read_bytes(len.unsigned_abs() as usize * 2)?;
      let mut units: Vec<u16> = vec![0; bytes.len() / 2];
      E::read_u16_into(&bytes, &mut units);
      String::from_utf16(&units)?
    } else {
      String::new()
    };

    Ok(string.trim_end_matches('\0').to_string())
  }

  /// Reads a 32-bit integer flag
  fn read_bool32<E: ByteOrder>(&mut self) -> Result<bool> {
    Ok(self.read_i32::<E>()? != 0)
  }

  fn stream_length(&mut self) -> Result<u64> {
    let position = self.stream_position()?;
    let length = self.seek(SeekFrom::End(0))?;
    self.seek(SeekFrom::Start(position))?;
    Ok(length)
  }

  /// Signed distance from the current position to `end`
  fn remaining_until(&mut self, end: u64) -> Result<i64> {
    Ok(end as i64 - self.stream_position()? as i64)
  }

  /// Reads a level name followed by a path name
  fn read_object_reference<E: ByteOrder>(&mut self) -> Result<ObjectReference> {
    Ok(ObjectReference {
      level_name: self.read_length_prefixed_string::<E>()?,
      path_name: self.read_length_prefixed_string::<E>()?,
    })
  }

  /// Reads an object reference followed by a sub-path
  fn read_soft_object_reference<E: ByteOrder>(&mut self) -> Result<SoftObjectReference> {
    Ok(SoftObjectReference {
      reference: self.read_object_reference::<E>()?,
      sub_path: self.read_length_prefixed_string::<E>()?,
    })
  }

  /// Reads a quaternion with values as 32-bit floats
  fn read_quaternion<E: ByteOrder>(&mut self) -> Result<Quaternion<f32>> {
    Ok(Quaternion {
      x: self.read_f32::<E>()?,
      y: self.read_f32::<E>()?,
      z: self.read_f32::<E>()?,
      w: self.read_f32::<E>()?,
    })
  }

  /// Reads a quaternion with values as 64-bit floats
  fn read_quaternion_double<E: ByteOrder>(&mut self) -> Result<Quaternion<f64>> {
    Ok(Quaternion {
      x: self.read_f64::<E>()?,
      y: self.read_f64::<E>()?,
      z: self.read_f64::<E>()?,
      w: self.read_f64::<E>()?,
    })
  }

  fn read_vector2d<E: ByteOrder>(&mut self) -> Result<Vector2D<f32>> {
    Ok(Vector2D {
      x: self.read_f32::<E>()?,
      y: self.read_f32::<E>()?,
    })
  }

  fn read_vector2d_double<E: ByteOrder>(&mut self) -> Result<Vector2D<f64>> {
    Ok(Vector2D {
      x: self.read_f64::<E>()?,
      y: self.read_f64::<E>()?,
    })
  }

  fn read_vector2d_int<E: ByteOrder>(&mut self) -> Result<Vector2D<i32>> {
    Ok(Vector2D {
      x: self.read_i32::<E>()?,
      y: self.read_i32::<E>()?,
    })
  }

  /// Reads a 3D vector with values as 32-bit floats
  fn read_vector<E: ByteOrder>(&mut self) -> Result<Vector<f32>> {
    Ok(Vector {
      x: self.read_f32::<E>()?,
      y: self.read_f32::<E>()?,
      z: self.read_f32::<E>()?,
    })
  }

  /// Reads a 3D vector with values as 64-bit floats
  fn read_vector_double<E: ByteOrder>(&mut self) -> Result<Vector<f64>> {
    Ok(Vector {
      x: self.read_f64::<E>()?,
      y: self.read_f64::<E>()?,
      z: self.read_f64::<E>()?,
    })
  }

  /// Reads a 3D vector with values as 32-bit integers
  fn read_vector_int<E: ByteOrder>(&mut self) -> Result<Vector<i32>> {
    Ok(Vector {
      x: self.read_i32::<E>()?,
      y: self.read_i32::<E>()?,
      z: self.read_i32::<E>()?,
    })
  }

  fn read_vector4<E: ByteOrder>(&mut self) -> Result<Vector4<f32>> {
    Ok(Vector4 {
      x: self.read_f32::<E>()?,
      y: self.read_f32::<E>()?,
      z: self.read_f32::<E>()?,
      w: self.read_f32::<E>()?,
    })
  }

  fn read_vector4_double<E: ByteOrder>(&mut self) -> Result<Vector4<f64>> {
    Ok(Vector4 {
      x: self.read_f64::<E>()?,
      y: self.read_f64::<E>()?,
      z: self.read_f64::<E>()?,
      w: self.read_f64::<E>()?,
    })
  }

  fn read_vector4_int<E: ByteOrder>(&mut self) -> Result<Vector4<i32>> {
    Ok(Vector4 {
      x: self.read_i32::<E>()?,
      y: self.read_i32::<E>()?,
      z: self.read_i32::<E>()?,
      w: self.read_i32::<E>()?,
    })
  }

  fn read_rotator<E: ByteOrder>(&mut self) -> Result<Rotator<f32>> {
    Ok(Rotator {
      pitch: self.read_f32::<E>()?,
      yaw: self.read_f32::<E>()?,
      roll: self.read_f32::<E>()?,
    })
  }

  fn read_rotator_double<E: ByteOrder>(&mut self) -> Result<Rotator<f64>> {
    Ok(Rotator {
      pitch: self.read_f64::<E>()?,
      yaw: self.read_f64::<E>()?,
      roll: self.read_f64::<E>()?,
    })
  }

  /// Reads an RGB color with alpha channel with values as 32-bit floats
  fn read_linear_color<E: ByteOrder>(&mut self) -> Result<Color<f32>> {
    Ok(Color {
      red: self.read_f32::<E>()?,
      green: self.read_f32::<E>()?,
      blue: self.read_f32::<E>()?,
      alpha: self.read_f32::<E>()?,
    })
  }

  /// Reads a byte color, stored blue first
  fn read_color_byte(&mut self) -> Result<Color<u8>> {
    let blue = self.read_u8()?;
    let green = self.read_u8()?;
    let red = self.read_u8()?;
    let alpha = self.read_u8()?;
    Ok(Color { red, green, blue, alpha })
  }

  /// Reads the file header; every optional field is gated on the header
  /// version and they must be read in ascending threshold order
  fn read_header<E: ByteOrder>(&mut self) -> Result<Header> {
    let mut header = Header::default();

    header.header_version = self.read_i32::<E>()?;
    header.save_version = self.read_i32::<E>()?;
    header.build_version = self.read_i32::<E>()?;
    if header.header_version >= HEADER_VERSION_SAVE_NAME {
      header.save_name = Some(self.read_length_prefixed_string::<E>()?);
    }
    header.map_name = self.read_length_prefixed_string::<E>()?;
    header.map_options = self.read_length_prefixed_string::<E>()?;
    header.session_name = self.read_length_prefixed_string::<E>()?;
    header.played_seconds = self.read_i32::<E>()?;
    header.save_date_time = self.read_i64::<E>()?;

    if header.header_version >= HEADER_VERSION_SESSION_VISIBILITY {
      header.session_visibility = Some(self.read_u8()?);
    }
    if header.header_version >= HEADER_VERSION_EDITOR_OBJECT_VERSION {
      header.editor_object_version = Some(self.read_i32::<E>()?);
    }
    if header.header_version >= HEADER_VERSION_MOD_METADATA {
      header.mod_metadata = Some(self.read_length_prefixed_string::<E>()?);
      header.is_modded_save = Some(self.read_bool32::<E>()?);
    }
    if header.header_version >= HEADER_VERSION_SAVE_IDENTIFIER {
      header.save_identifier = Some(self.read_length_prefixed_string::<E>()?);
    }
    if header.header_version >= HEADER_VERSION_PARTITIONED_WORLD {
      header.is_partitioned_world = Some(self.read_bool32::<E>()?);
      header.save_data_hash = Some(self.read_hex(20)?);
      header.is_creative_mode_enabled = Some(self.read_bool32::<E>()?);
    }

    Ok(header)
  }

  fn read_chunk_info<E: ByteOrder>(&mut self) -> Result<ChunkInfo> {
    Ok(ChunkInfo {
      compressed_size: self.read_i32::<E>()?,
      compressed_offset: self.read_i32::<E>()?,
      uncompressed_size: self.read_i32::<E>()?,
      uncompressed_offset: self.read_i32::<E>()?,
    })
  }

  /// Reads a chunk's descriptors and its compressed body, validating the
  /// fixed, well-known values before inflating anything
  fn read_chunk<E: ByteOrder>(&mut self, header_version: i32) -> Result<Vec<u8>> {
    // Carries the Unreal Engine package signature and the max chunk size
    let outer = self.read_chunk_info::<E>()?;
    if outer.compressed_size != PACKAGE_FILE_TAG || outer.uncompressed_size != MAX_CHUNK_SIZE {
      return Err(ParseError::ChunkMagic {
        compressed_size: outer.compressed_size,
        uncompressed_size: outer.uncompressed_size,
      });
    }

    // Compression algorithm
    if header_version >= HEADER_VERSION_PARTITIONED_WORLD {
      self.seek_relative(1)?;
    }

    let summary = self.read_chunk_info::<E>()?;
    let sub = self.read_chunk_info::<E>()?;
    if sub.compressed_size != summary.compressed_size {
      return Err(ParseError::ChunkSizeMismatch {
        expected: summary.compressed_size as i64,
        actual: sub.compressed_size as i64,
      });
    }
    if sub.uncompressed_size != summary.uncompressed_size {
      return Err(ParseError::ChunkSizeMismatch {
        expected: summary.uncompressed_size as i64,
        actual: sub.uncompressed_size as i64,
      });
    }

    let compressed = self.read_bytes(summary.compressed_size.max(0) as usize)?;
    let mut chunk_bytes: Vec<u8> = vec![];
    ZlibDecoder::new(&compressed[..]).read_to_end(&mut chunk_bytes)?;
    if chunk_bytes.len() as i64 != summary.uncompressed_size as i64 {
      return Err(ParseError::ChunkSizeMismatch {
        expected: summary.uncompressed_size as i64,
        actual: chunk_bytes.len() as i64,
      });
    }

    Ok(chunk_bytes)
  }

  /// Reads a chunk at a time until reaching the specified stop byte (which is
  /// the end of the file)
  fn read_chunks<E: ByteOrder>(&mut self, header_version: i32, stop_byte: u64) -> Result<Vec<Vec<u8>>> {
    let mut chunks: Vec<Vec<u8>> = vec![];

    while self.stream_position()? < stop_byte {
      chunks.push(self.read_chunk::<E>(header_version)?);
    }
    debug!("Inflated {} chunks", chunks.len());

    Ok(chunks)
  }

  /// Reads the declared length at the start of an inflated body and checks it
  /// against what is actually left in the buffer
  fn read_body_length<E: ByteOrder>(&mut self, header_version: i32) -> Result<i64> {
    let declared = if header_version >= HEADER_VERSION_PARTITIONED_WORLD {
      self.read_i64::<E>()?
    } else {
      self.read_i32::<E>()? as i64
    };
    let position = self.stream_position()?;
    let actual = self.stream_length()? as i64 - position as i64;
    if declared != actual {
      return Err(ParseError::BodyLengthMismatch { declared, actual });
    }
    Ok(declared)
  }
}

/// Auto-implements the above trait for all types which also implement both
/// `io::Read` and `io::Seek`
impl<R: io::Read + io::Seek> ReadSaveFileBytes for R {}
