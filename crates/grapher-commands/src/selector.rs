use std::fmt;

use crate::ident::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    AllEntities,
    Executor,
    NearestPlayer,
}

impl SelectorKind {
    fn symbol(self) -> &'static str {
        match self {
            SelectorKind::AllEntities => "@e",
            SelectorKind::Executor => "@s",
            SelectorKind::NearestPlayer => "@p",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selector {
    pub kind: SelectorKind,
    pub tags: Vec<Tag>,
}

impl Selector {
    pub fn all_entities() -> Self {
        Self {
            kind: SelectorKind::AllEntities,
            tags: Vec::new(),
        }
    }

    pub fn executor() -> Self {
        Self {
            kind: SelectorKind::Executor,
            tags: Vec::new(),
        }
    }

    pub fn nearest_player() -> Self {
        Self {
            kind: SelectorKind::NearestPlayer,
            tags: Vec::new(),
        }
    }

    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.symbol())?;
        if self.tags.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "tag={tag}")?;
        }
        f.write_str("]")
    }
}
