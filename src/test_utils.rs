use std::io::{Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::reader::SaveReader;
use crate::save::Header;
use crate::versions::*;

/// Little-endian byte builder for hand-assembled save fragments
#[derive(Clone, Default)]
pub(crate) struct Bytes(Vec<u8>);

impl Bytes {
  pub fn new() -> Self {
    Bytes(vec![])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn build(self) -> Vec<u8> {
    self.0
  }

  pub fn bytes(mut self, bytes: &[u8]) -> Self {
    self.0.extend_from_slice(bytes);
    self
  }

  pub fn u8(mut self, value: u8) -> Self {
    self.0.push(value);
    self
  }

  pub fn i32(mut self, value: i32) -> Self {
    self.0.write_i32::<LittleEndian>(value).unwrap();
    self
  }

  pub fn u32(mut self, value: u32) -> Self {
    self.0.write_u32::<LittleEndian>(value).unwrap();
    self
  }

  pub fn i64(mut self, value: i64) -> Self {
    self.0.write_i64::<LittleEndian>(value).unwrap();
    self
  }

  pub fn u64(mut self, value: u64) -> Self {
    self.0.write_u64::<LittleEndian>(value).unwrap();
    self
  }

  pub fn f32(mut self, value: f32) -> Self {
    self.0.write_f32::<LittleEndian>(value).unwrap();
    self
  }

  pub fn f64(mut self, value: f64) -> Self {
    self.0.write_f64::<LittleEndian>(value).unwrap();
    self
  }

  /// UTF-8 string with its null terminator, as the game writes them
  pub fn string(self, value: &str) -> Self {
    if value.is_empty() {
      return self.i32(0);
    }
    self.i32(value.len() as i32 + 1).bytes(value.as_bytes()).u8(0)
  }

  /// UTF-16 string with its null terminator
  pub fn utf16(mut self, value: &str) -> Self {
    let units: Vec<u16> = value.encode_utf16().chain([0]).collect();
    self = self.i32(-(units.len() as i32));
    for unit in units {
      self.0.write_u16::<LittleEndian>(unit).unwrap();
    }
    self
  }

  pub fn reference(self, level_name: &str, path_name: &str) -> Self {
    self.string(level_name).string(path_name)
  }

  /// Property list terminator
  pub fn none(self) -> Self {
    self.string("None")
  }

  /// Name, type, size and index of a property, followed by its payload
  pub fn property(self, name: &str, property_type: &str, size: i32, payload: Bytes) -> Self {
    self.string(name).string(property_type).i32(size).i32(0).bytes(&payload.0)
  }

  /// Compressed chunk with all three descriptors
  pub fn chunk(self, payload: &[u8], header_version: i32) -> Self {
    let mut encoder = ZlibEncoder::new(vec![], Compression::default());
    encoder.write_all(payload).unwrap();
    let compressed = encoder.finish().unwrap();
    let (compressed_size, uncompressed_size) = (compressed.len() as i32, payload.len() as i32);

    let mut bytes = self.i32(PACKAGE_FILE_TAG).i32(0x2222_2222).i32(MAX_CHUNK_SIZE).i32(0);
    if header_version >= HEADER_VERSION_PARTITIONED_WORLD {
      bytes = bytes.u8(3);
    }
    bytes
      .i32(compressed_size).i32(0).i32(uncompressed_size).i32(0)
      .i32(compressed_size).i32(0).i32(uncompressed_size).i32(0)
      .bytes(&compressed)
  }
}

pub(crate) fn header(save_version: i32) -> Header {
  Header {
    header_version: 13,
    save_version,
    map_name: "Persistent_Level".to_string(),
    ..Default::default()
  }
}

pub(crate) fn reader(bytes: Bytes, header: &Header) -> SaveReader<'_, Cursor<Vec<u8>>> {
  SaveReader::new(Cursor::new(bytes.build()), header)
}
