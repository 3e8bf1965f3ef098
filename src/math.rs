use serde::{Serialize, Deserialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D<T> {
  pub x: T,
  pub y: T,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector<T> {
  pub x: T,
  pub y: T,
  pub z: T,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector4<T> {
  pub x: T,
  pub y: T,
  pub z: T,
  pub w: T,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quaternion<T> {
  pub x: T,
  pub y: T,
  pub z: T,
  pub w: T,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator<T> {
  pub pitch: T,
  pub yaw: T,
  pub roll: T,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color<T> {
  pub red: T,
  pub green: T,
  pub blue: T,
  pub alpha: T,
}

/// Axis-aligned bounds as stored by `Box` structs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds<T> {
  pub min: Vector<T>,
  pub max: Vector<T>,
  pub is_valid: bool,
}
