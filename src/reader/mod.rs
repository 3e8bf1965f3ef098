//! The recursive decoder for everything that follows the header: levels,
//! objects, properties, typed data and extra data. Each concern lives in its
//! own file as another `impl` block on [`SaveReader`]

use std::io::{self, Read, Seek, SeekFrom};

use crate::save::Header;
use crate::versions::SAVE_VERSION_DOUBLE_PRECISION;

mod body;
mod extra_data;
mod object;
mod property;
mod typed_data;

/// A cursor over the body bytes bound to the header that governs how they are
/// laid out. Since it is itself `Read + Seek`, every `ReadSaveFileBytes`
/// helper is available on it
pub struct SaveReader<'h, R> {
  reader: R,
  header: &'h Header,
}

impl<'h, R: Read + Seek> SaveReader<'h, R> {
  pub fn new(reader: R, header: &'h Header) -> Self {
    SaveReader { reader, header }
  }

  pub fn header(&self) -> &'h Header {
    self.header
  }

  fn save_version(&self) -> i32 {
    self.header.save_version
  }

  fn is_double_precision(&self) -> bool {
    self.header.save_version >= SAVE_VERSION_DOUBLE_PRECISION
  }
}

impl<R: Read> Read for SaveReader<'_, R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.reader.read(buf)
  }
}

impl<R: Seek> Seek for SaveReader<'_, R> {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.reader.seek(pos)
  }
}
