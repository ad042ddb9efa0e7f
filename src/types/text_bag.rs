use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// XMP bag value: an ordered sequence of text values with set-like add and
/// remove operations.
///
/// Storage order reflects whatever sequence the bag was last rebuilt from, so
/// equality is content-set-based — two bags holding the same values in a
/// different order compare equal. Duplicates are representable but compare as
/// one member.
#[derive(Debug, Clone, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextBag {
    items: Vec<String>,
}

impl TextBag {
    pub fn new() -> Self {
        TextBag { items: Vec::new() }
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Remove every occurrence equal to `item`, returning how many went.
    pub fn remove_all(&mut self, item: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        before - self.items.len()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn content_set(&self) -> BTreeSet<&str> {
        self.items.iter().map(String::as_str).collect()
    }
}

impl PartialEq for TextBag {
    fn eq(&self, other: &Self) -> bool {
        self.content_set() == other.content_set()
    }
}

impl From<Vec<String>> for TextBag {
    fn from(items: Vec<String>) -> Self {
        TextBag { items }
    }
}

impl FromIterator<String> for TextBag {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        TextBag {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TextBag {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for TextBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item:?}")?;
        }
        write!(f, "]")
    }
}
