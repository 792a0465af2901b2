//! Validated identifiers. Construction is the only place raw strings enter the
//! command model, so rendered commands never need escaping.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} {value:?} contains invalid character {ch:?}")]
    InvalidChar {
        kind: &'static str,
        value: String,
        ch: char,
    },
    #[error("resource location {0:?} must have the form namespace:path")]
    MissingNamespace(String),
}

fn validate(kind: &'static str, value: &str, ok: impl Fn(char) -> bool) -> Result<(), IdentError> {
    if value.is_empty() {
        return Err(IdentError::Empty { kind });
    }
    if let Some(ch) = value.chars().find(|c| !ok(*c)) {
        return Err(IdentError::InvalidChar {
            kind,
            value: value.to_string(),
            ch,
        });
    }
    Ok(())
}

#[inline]
fn namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

#[inline]
fn path_char(c: char) -> bool {
    namespace_char(c) || c == '/'
}

#[inline]
fn name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: &str) -> Result<Self, IdentError> {
        validate("namespace", name, namespace_char)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn id(&self, path: &str) -> Result<ResourceLocation, IdentError> {
        validate("path", path, path_char)?;
        Ok(ResourceLocation {
            namespace: self.clone(),
            path: path.to_string(),
        })
    }
}

/// `namespace:path`, used for functions, items, entities, and sounds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: Namespace,
    path: String,
}

pub type FunctionId = ResourceLocation;

impl ResourceLocation {
    pub fn parse(s: &str) -> Result<Self, IdentError> {
        let (ns, path) = s
            .split_once(':')
            .ok_or_else(|| IdentError::MissingNamespace(s.to_string()))?;
        Namespace::new(ns)?.id(path)
    }

    pub fn minecraft(path: &str) -> Result<Self, IdentError> {
        Namespace::new("minecraft")?.id(path)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.0, self.path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Objective(String);

impl Objective {
    pub fn new(name: &str) -> Result<Self, IdentError> {
        validate("objective", name, name_char)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Score holder name. Fake players (`#c300`, `$0`) never collide with real
/// player names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Holder(pub(crate) String);

impl Holder {
    pub fn new(name: &str) -> Result<Self, IdentError> {
        validate("score holder", name, |c| {
            name_char(c) || matches!(c, '#' | '$')
        })?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity scoreboard tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: &str) -> Result<Self, IdentError> {
        validate("tag", name, name_char)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
