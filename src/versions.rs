//! Format revision thresholds. Nearly every layout decision in the reader is
//! a comparison of the header's `header_version` or `save_version` against
//! one of these.

/// Header carries a session visibility byte
pub const HEADER_VERSION_SESSION_VISIBILITY: i32 = 5;
/// Header carries the editor object version
pub const HEADER_VERSION_EDITOR_OBJECT_VERSION: i32 = 7;
/// Header carries mod metadata and the modded-save flag
pub const HEADER_VERSION_MOD_METADATA: i32 = 8;
/// Header carries a save identifier
pub const HEADER_VERSION_SAVE_IDENTIFIER: i32 = 10;
/// Header carries the partitioned-world flag, data hash and creative flag.
/// Also adds a compression byte to every chunk and widens the body length
/// prefix to 64 bits
pub const HEADER_VERSION_PARTITIONED_WORLD: i32 = 13;
/// Header starts with a save name
pub const HEADER_VERSION_SAVE_NAME: i32 = 14;

/// Body is stored as zlib chunks instead of following the header directly
pub const SAVE_VERSION_COMPRESSED_BODY: i32 = 21;
/// Body is split into levels
pub const SAVE_VERSION_LEVELS: i32 = 29;
/// Power lines carry endpoint translations (until double precision)
pub const SAVE_VERSION_POWER_LINE_TRANSLATION: i32 = 33;
/// Unreal Engine 5: double precision math types, 64-bit level lengths,
/// per-object save versions and the partition grid
pub const SAVE_VERSION_DOUBLE_PRECISION: i32 = 41;
/// InventoryStack switches to its string-keyed layout
pub const SAVE_VERSION_INVENTORY_STACK_V1: i32 = 42;
/// InventoryItem's state reference becomes a plain string
pub const SAVE_VERSION_INVENTORY_ITEM_STATE: i32 = 44;
/// Persistent level collectables may be preceded by a name, and
/// InventoryStack gains a trailing property list
pub const SAVE_VERSION_PERSISTENT_COLLECTABLES: i32 = 46;
/// Object headers carry flags and every level records its own save version
pub const SAVE_VERSION_OBJECT_FLAGS: i32 = 51;

/// Unreal Engine package file tag, stored as the outer chunk's compressed size
pub const PACKAGE_FILE_TAG: i32 = 0x9E2A_83C1_u32 as i32;
/// Outer chunk's uncompressed size has always been this
pub const MAX_CHUNK_SIZE: i32 = 131_072;
