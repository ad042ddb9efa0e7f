use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The language slot an unqualified value targets.
pub const DEFAULT_LANG: &str = "x-default";

/// XMP language-alternative value: an ordered mapping from language tag to
/// text with one distinguished default slot (`"x-default"`).
///
/// Assigning through a store is a full rebuild, never a merge — setting a
/// plain string on a LangAlt tag leaves only the default slot. That contract
/// lives in the XMP coder; this type is just the map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LangAltMap {
    inner: BTreeMap<String, String>,
}

impl LangAltMap {
    pub fn new() -> Self {
        LangAltMap {
            inner: BTreeMap::new(),
        }
    }

    /// A map holding only the default slot.
    pub fn of_default(text: impl Into<String>) -> Self {
        let mut map = LangAltMap::new();
        map.set_default(text);
        map
    }

    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.inner.insert(lang.into(), text.into());
    }

    pub fn set_default(&mut self, text: impl Into<String>) {
        self.set(DEFAULT_LANG, text);
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.inner.get(lang).map(String::as_str)
    }

    pub fn default_text(&self) -> Option<&str> {
        self.get(DEFAULT_LANG)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(String, String)> for LangAltMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        LangAltMap {
            inner: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for LangAltMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (lang, text)) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{lang:?}: {text:?}")?;
        }
        write!(f, "}}")
    }
}
