//! NBT paths and stringified NBT payloads.

use std::fmt;

use crate::ident::{ResourceLocation, Tag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// The handful of entity paths the pack reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NbtPath {
    Pos(Axis),
    ArmorItem(u8),
}

impl NbtPath {
    pub const HEAD_SLOT: NbtPath = NbtPath::ArmorItem(3);
}

impl fmt::Display for NbtPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtPath::Pos(axis) => write!(f, "Pos[{}]", axis.index()),
            NbtPath::ArmorItem(slot) => write!(f, "ArmorItems[{slot}]"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl NumericType {
    pub fn keyword(self) -> &'static str {
        match self {
            NumericType::Byte => "byte",
            NumericType::Short => "short",
            NumericType::Int => "int",
            NumericType::Long => "long",
            NumericType::Float => "float",
            NumericType::Double => "double",
        }
    }
}

/// Stringified NBT. Strings are quoted and escaped when rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum Snbt {
    Byte(i8),
    Int(i32),
    Double(f64),
    String(String),
    List(Vec<Snbt>),
    Compound(Vec<(&'static str, Snbt)>),
}

impl Snbt {
    /// `{id:"...",Count:1b}`
    pub fn item_stack(id: &ResourceLocation, count: i8) -> Snbt {
        Snbt::Compound(vec![
            ("id", Snbt::String(id.to_string())),
            ("Count", Snbt::Byte(count)),
        ])
    }

    /// Invisible, gravity-less marker armor stand carrying `tags`.
    pub fn marker(tags: &[Tag]) -> Snbt {
        Snbt::Compound(vec![
            ("Invisible", Snbt::Byte(1)),
            ("Marker", Snbt::Byte(1)),
            ("NoGravity", Snbt::Byte(1)),
            ("Small", Snbt::Byte(1)),
            (
                "Tags",
                Snbt::List(tags.iter().map(|t| Snbt::String(t.to_string())).collect()),
            ),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&Snbt> {
        match self {
            Snbt::Compound(entries) => entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Snbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snbt::Byte(v) => write!(f, "{v}b"),
            Snbt::Int(v) => write!(f, "{v}"),
            Snbt::Double(v) => write!(f, "{v}d"),
            Snbt::String(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Snbt::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Snbt::Compound(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Absolute world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, v: f64) {
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
            Axis::Z => self.z = v,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
