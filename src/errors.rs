use std::{io, string::{FromUtf16Error, FromUtf8Error}};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
  #[error("Read error: {0}")]
  Read(io::Error),

  #[error("Truncated data: read past the end of the buffer")]
  Truncated,

  #[error("UTF-8 encoding error: {0}")]
  UTF8(#[from] FromUtf8Error),

  #[error("UTF-16 encoding error: {0}")]
  UTF16(#[from] FromUtf16Error),

  #[error("Invalid chunk magic: compressed size {compressed_size:#X}, uncompressed size {uncompressed_size}")]
  ChunkMagic { compressed_size: i32, uncompressed_size: i32 },

  #[error("Chunk size mismatch: expected {expected} bytes, got {actual}")]
  ChunkSizeMismatch { expected: i64, actual: i64 },

  #[error("Body length mismatch: declared {declared} bytes, decompressed {actual}")]
  BodyLengthMismatch { declared: i64, actual: i64 },

  #[error("Unknown object type: {0}")]
  UnknownObjectType(i32),

  #[error("Object count mismatch in level '{level}': {headers} headers, {objects} objects")]
  ObjectCountMismatch { level: String, headers: usize, objects: i32 },

  #[error("Object region of level '{level}' should end at byte {expected} but ended at {actual}")]
  ObjectRegionMismatch { level: String, expected: u64, actual: u64 },

  #[error("Invalid length {length} in level '{level}'")]
  LevelLength { level: String, length: i64 },

  #[error("Object longer than specified: {type_path} should end at byte {expected} but reached {actual}")]
  ObjectLength { type_path: String, expected: u64, actual: u64 },

  #[error("Unknown property type: {0}")]
  UnknownPropertyType(String),

  #[error("Unknown array element type: {0}")]
  UnknownArrayElementType(String),

  #[error("Unsupported array element type: {0}")]
  UnsupportedArrayElementType(String),

  #[error("Unknown map key type: {0}")]
  UnknownMapKeyType(String),

  #[error("Unknown map value type: {0}")]
  UnknownMapValueType(String),

  #[error("Unknown set type: {0}")]
  UnknownSetType(String),

  #[error("Unknown text argument value type: {0}")]
  UnknownTextArgumentType(u8),

  #[error("Unknown text history type: {0}")]
  UnknownTextHistoryType(u8),

  #[error("Unknown Lua processor state storage struct type: {0}")]
  UnknownLuaStorageStructType(String),
}

impl From<io::Error> for ParseError {
  fn from(error: io::Error) -> Self {
    match error.kind() {
      io::ErrorKind::UnexpectedEof => ParseError::Truncated,
      _ => ParseError::Read(error),
    }
  }
}
