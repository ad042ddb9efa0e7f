//! The ordered, duplicate-tolerant metadata multimap.

use std::collections::BTreeMap;

use crate::coder::{EncodeError, RawRecord, TagCoder};
use crate::types::{Assign, Lookup, TagValue};

/// Ordered multimap of `(key, raw payload)` entries with typed accessors,
/// generic over the family coder chosen at construction.
///
/// Entry order is stable: it reflects either the original load order or the
/// caller's explicit `add`/`set` sequence, never the store's own initiative.
/// The same key may occur any number of times (repeated IPTC keywords are N
/// entries, not one bag).
///
/// `set` is a destructive full replace, not an upsert: every prior entry for
/// the key is discarded before the replacement entries go in at the position
/// of the first removed one. This is why assigning a plain string to an XMP
/// language-alternative tag wipes previously-set alternate languages rather
/// than merging into them.
///
/// The store is a plain mutable collection — single-threaded, no interior
/// locking; callers needing concurrent access guard the whole store
/// externally.
#[derive(Debug, Clone)]
pub struct MetadataStore<C: TagCoder> {
    coder: C,
    records: Vec<RawRecord>,
}

impl<C: TagCoder> MetadataStore<C> {
    pub fn new(coder: C) -> Self {
        MetadataStore {
            coder,
            records: Vec::new(),
        }
    }

    /// Wrap records handed over by an engine, preserving their order.
    pub fn from_records(coder: C, records: Vec<RawRecord>) -> Self {
        MetadataStore { coder, records }
    }

    pub fn coder(&self) -> &C {
        &self.coder
    }

    /// Append entries for `key` at the end of the order. Duplicate keys are
    /// fine; a scalar operand grows the key's entry count by exactly one.
    pub fn add(&mut self, key: &str, value: impl Into<Assign>) -> Result<(), EncodeError> {
        let payloads = self.coder.encode(key, &value.into())?;
        self.records
            .extend(payloads.into_iter().map(|p| RawRecord::new(key, p)));
        Ok(())
    }

    /// Occurrence-shaped read: zero matches is `Absent`, one is the decoded
    /// scalar, several is the decoded sequence in entry order.
    pub fn get(&self, key: &str) -> Lookup {
        let mut values: Vec<TagValue> = self
            .records
            .iter()
            .filter(|r| r.key == key)
            .map(|r| self.coder.decode(key, &r.value))
            .collect();
        match values.len() {
            0 => Lookup::Absent,
            1 => Lookup::Single(values.remove(0)),
            _ => Lookup::Multiple(values),
        }
    }

    /// Destructive full replace. Encoding happens first, so a failed encode
    /// leaves the store untouched; on success all prior entries for `key`
    /// are dropped and the replacements spliced in at the position of the
    /// first removed entry (appended if the key was absent). Other keys keep
    /// their relative order.
    pub fn set(&mut self, key: &str, value: impl Into<Assign>) -> Result<(), EncodeError> {
        let payloads = self.coder.encode(key, &value.into())?;
        let first = self.records.iter().position(|r| r.key == key);
        self.records.retain(|r| r.key != key);
        let at = first.unwrap_or(self.records.len());
        for (offset, payload) in payloads.into_iter().enumerate() {
            self.records.insert(at + offset, RawRecord::new(key, payload));
        }
        Ok(())
    }

    /// Remove exactly the first occurrence of `key` in entry order and
    /// return its decoded value. Later occurrences stay put.
    pub fn delete(&mut self, key: &str) -> Option<TagValue> {
        let idx = self.records.iter().position(|r| r.key == key)?;
        let record = self.records.remove(idx);
        Some(self.coder.decode(key, &record.value))
    }

    /// Remove every occurrence of `key`, returning how many went.
    pub fn delete_all(&mut self, key: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.key != key);
        before - self.records.len()
    }

    /// The `+=` operation: concatenate `values` onto the key's current item
    /// view, then full-replace. Defined for bag tags but behaves sanely on
    /// any repeatable tag.
    pub fn extend(&mut self, key: &str, values: impl Into<Assign>) -> Result<(), EncodeError> {
        let mut combined = self.item_view(key);
        combined.extend(splice(values.into()));
        self.set(key, Assign::Many(combined))
    }

    /// The `-=` operation: drop every current item equal to any of `values`,
    /// then full-replace. Shrinking to nothing leaves the key absent.
    pub fn subtract(&mut self, key: &str, values: impl Into<Assign>) -> Result<(), EncodeError> {
        let removals = splice(values.into());
        let remaining: Vec<TagValue> = self
            .item_view(key)
            .into_iter()
            .filter(|item| !removals.contains(item))
            .collect();
        self.set(key, Assign::Many(remaining))
    }

    /// The raw, unflattened, duplicate-preserving view: exactly the entries
    /// in storage order, decoded.
    pub fn entries(&self) -> Vec<(String, TagValue)> {
        self.records
            .iter()
            .map(|r| (r.key.clone(), self.coder.decode(&r.key, &r.value)))
            .collect()
    }

    /// Fold `entries()` left to right into a unique-key mapping: first
    /// occurrence sets the scalar, the second turns it into a two-element
    /// sequence, later ones append. Deterministic given entry order and
    /// consistent with `get` for every key.
    pub fn flatten(&self) -> BTreeMap<String, Lookup> {
        let mut grouped: BTreeMap<String, Vec<TagValue>> = BTreeMap::new();
        for (key, value) in self.entries() {
            grouped.entry(key).or_default().push(value);
        }
        grouped
            .into_iter()
            .map(|(key, mut values)| {
                let lookup = if values.len() == 1 {
                    Lookup::Single(values.remove(0))
                } else {
                    Lookup::Multiple(values)
                };
                (key, lookup)
            })
            .collect()
    }

    /// Canonical diagnostic rendering of `flatten()` with keys in
    /// lexicographic order. Display only — never fed back into persistence.
    pub fn describe(&self) -> String {
        let body = self
            .flatten()
            .iter()
            .map(|(key, lookup)| format!("{key:?}: {lookup}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {{{body}}}", self.coder.family())
    }

    /// Raw records in storage order, for the engine boundary.
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Swap in a freshly loaded record list, discarding current entries.
    pub fn replace_records(&mut self, records: Vec<RawRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current items for `key` with composite bags spliced into their
    /// members, which is the view `extend`/`subtract` operate on.
    fn item_view(&self, key: &str) -> Vec<TagValue> {
        let mut items = Vec::new();
        for record in self.records.iter().filter(|r| r.key == key) {
            match self.coder.decode(key, &record.value) {
                TagValue::Bag(bag) => items.extend(bag.into_iter().map(TagValue::Text)),
                value => items.push(value),
            }
        }
        items
    }
}

/// Flatten an operand the same way `item_view` flattens storage: bags
/// contribute their members.
fn splice(assign: Assign) -> Vec<TagValue> {
    let mut items = Vec::new();
    for value in match assign {
        Assign::One(v) => vec![v],
        Assign::Many(vs) => vs,
    } {
        match value {
            TagValue::Bag(bag) => items.extend(bag.into_iter().map(TagValue::Text)),
            v => items.push(v),
        }
    }
    items
}
