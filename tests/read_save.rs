use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use sf_save::errors::ParseError;
use sf_save::save::{Body, Object};
use sf_save::versions::{MAX_CHUNK_SIZE, PACKAGE_FILE_TAG};

fn write_string(bytes: &mut Vec<u8>, value: &str) {
  if value.is_empty() {
    bytes.write_i32::<LittleEndian>(0).unwrap();
    return;
  }
  bytes.write_i32::<LittleEndian>(value.len() as i32 + 1).unwrap();
  bytes.extend_from_slice(value.as_bytes());
  bytes.push(0);
}

fn header(header_version: i32, save_version: i32) -> Vec<u8> {
  let mut bytes = vec![];
  bytes.write_i32::<LittleEndian>(header_version).unwrap();
  bytes.write_i32::<LittleEndian>(save_version).unwrap();
  bytes.write_i32::<LittleEndian>(152_331).unwrap();
  write_string(&mut bytes, "Persistent_Level");
  write_string(&mut bytes, "?startloc=Grass Fields");
  write_string(&mut bytes, "Factory");
  bytes.write_i32::<LittleEndian>(3600).unwrap();
  bytes.write_i64::<LittleEndian>(638_574_000_000_000_000).unwrap();
  bytes.push(1);
  bytes.write_i32::<LittleEndian>(40).unwrap();
  write_string(&mut bytes, "");
  bytes.write_i32::<LittleEndian>(0).unwrap();
  write_string(&mut bytes, "SAVE-ID");
  bytes.write_i32::<LittleEndian>(0).unwrap();
  bytes.extend_from_slice(&[0xAB; 20]);
  bytes.write_i32::<LittleEndian>(0).unwrap();
  bytes
}

fn chunk(payload: &[u8]) -> Vec<u8> {
  let mut encoder = ZlibEncoder::new(vec![], Compression::default());
  encoder.write_all(payload).unwrap();
  let compressed = encoder.finish().unwrap();

  let mut bytes = vec![];
  for value in [PACKAGE_FILE_TAG, 0x2222_2222, MAX_CHUNK_SIZE, 0] {
    bytes.write_i32::<LittleEndian>(value).unwrap();
  }
  bytes.push(3);
  for _ in 0..2 {
    for value in [compressed.len() as i32, 0, payload.len() as i32, 0] {
      bytes.write_i32::<LittleEndian>(value).unwrap();
    }
  }
  bytes.extend_from_slice(&compressed);
  bytes
}

#[test]
fn reads_uncompressed_save() {
  let mut bytes = header(13, 20);

  // One component header with empty names
  bytes.write_i32::<LittleEndian>(1).unwrap();
  bytes.write_i32::<LittleEndian>(0).unwrap();
  for _ in 0..4 {
    write_string(&mut bytes, "");
  }

  // Its body: only the "None" terminator and the trailing marker
  bytes.write_i32::<LittleEndian>(1).unwrap();
  bytes.write_i32::<LittleEndian>(13).unwrap();
  write_string(&mut bytes, "None");
  bytes.write_i32::<LittleEndian>(0).unwrap();

  // Collectables
  bytes.write_i32::<LittleEndian>(0).unwrap();

  let save = sf_save::read_bytes(&bytes).unwrap();
  assert_eq!(save.header.session_name, "Factory");
  assert_eq!(save.header.save_identifier.as_deref(), Some("SAVE-ID"));
  assert_eq!(save.header.is_partitioned_world, Some(false));

  let Body::Legacy(body) = &save.body else { panic!("expected a legacy body") };
  assert_eq!(body.objects.len(), 1);
  assert!(body.collectables.is_empty());
  let Object::Component(component) = &body.objects[0] else { panic!("expected a component") };
  assert_eq!(component.header.type_path, "");
  assert!(component.body.properties.is_empty());
  assert!(component.body.extra.is_none());
  assert!(component.body.missing.is_none());
}

#[test]
fn reads_compressed_save_across_chunks() {
  let mut body = vec![];
  body.write_i32::<LittleEndian>(0).unwrap();
  body.write_i64::<LittleEndian>(8).unwrap();
  body.write_i32::<LittleEndian>(0).unwrap();
  body.write_i32::<LittleEndian>(0).unwrap();
  body.write_i64::<LittleEndian>(4).unwrap();
  body.write_i32::<LittleEndian>(0).unwrap();
  body.write_i32::<LittleEndian>(0).unwrap();
  write_string(&mut body, "");
  body.write_i32::<LittleEndian>(0).unwrap();

  let mut inflated = vec![];
  inflated.write_i64::<LittleEndian>(body.len() as i64).unwrap();
  inflated.extend_from_slice(&body);

  let mut bytes = header(13, 46);
  let (first, second) = inflated.split_at(inflated.len() / 2);
  bytes.extend_from_slice(&chunk(first));
  bytes.extend_from_slice(&chunk(second));

  let save = sf_save::read_save(&bytes[..]).unwrap();
  let Body::Levels(body) = &save.body else { panic!("expected levels") };
  assert!(body.grid.is_none());
  assert_eq!(body.levels.len(), 1);
  assert_eq!(body.levels[0].name, "Level Persistent_Level");
  assert!(body.references.is_none());
  assert_eq!(save.objects().count(), 0);
}

#[test]
fn rejects_bad_chunk_magic() {
  let mut bytes = header(13, 46);
  let mut bad_chunk = chunk(&[0; 16]);
  bad_chunk[0] ^= 0xFF;
  bytes.extend_from_slice(&bad_chunk);

  assert!(matches!(sf_save::read_bytes(&bytes), Err(ParseError::ChunkMagic { .. })));
}

#[test]
fn rejects_truncated_header() {
  let bytes = header(13, 46);
  assert!(matches!(sf_save::read_bytes(&bytes[..30]), Err(ParseError::Truncated)));
}

#[test]
fn reads_save_from_disk() {
  let mut bytes = header(13, 20);
  bytes.write_i32::<LittleEndian>(0).unwrap();
  bytes.write_i32::<LittleEndian>(0).unwrap();
  bytes.write_i32::<LittleEndian>(0).unwrap();

  let path = std::env::temp_dir().join(format!("sf-save-{}.sav", std::process::id()));
  std::fs::write(&path, &bytes).unwrap();
  let save = sf_save::read_file(&path);
  std::fs::remove_file(&path).unwrap();

  let save = save.unwrap();
  assert_eq!(save.objects().count(), 0);
  assert_eq!(save.header.played_seconds, 3600);
}
