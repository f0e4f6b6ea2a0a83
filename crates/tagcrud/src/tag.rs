//! Tag resolution: from a record's declared fields to a column mapping.
//!
//! A tag has the form `column[,flag]*`. The only recognized flag is `unix`,
//! which stores a timestamp field as whole epoch seconds. Unknown flags are
//! ignored, and a field with an empty tag is not mapped at all.

use crate::record::Record;
use indexmap::IndexMap;

/// One declared field of a record: its Rust name and raw tag.
///
/// The position of a `FieldDef` inside [`Record::fields`] is the field's
/// identity for [`Record::get_field`] / [`Record::set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub tag: &'static str,
}

impl FieldDef {
    pub const fn new(name: &'static str, tag: &'static str) -> Self {
        Self { name, tag }
    }
}

/// A parsed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag<'a> {
    pub column: &'a str,
    pub unix: bool,
}

impl<'a> FieldTag<'a> {
    /// Parse `column[,flag]*`. Returns `None` when the column part is empty.
    pub fn parse(tag: &'a str) -> Option<Self> {
        let mut pieces = tag.split(',');
        let column = pieces.next()?.trim();
        if column.is_empty() {
            return None;
        }

        let unix = pieces.any(|flag| flag.trim() == "unix");
        Some(Self { column, unix })
    }
}

/// Resolved metadata for one mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Index into the record's field table.
    pub index: usize,
    /// Rust field name.
    pub name: &'static str,
    /// Stored as epoch seconds.
    pub unix: bool,
}

/// Ordered mapping from column name to field metadata.
///
/// Columns keep the order of their first declaration, so generated SQL is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: IndexMap<&'static str, FieldMeta>,
}

impl FieldMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&FieldMeta> {
        self.entries.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldMeta)> + '_ {
        self.entries.iter().map(|(column, meta)| (*column, meta))
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// Build the column mapping for a field table.
///
/// Two fields tagged with the same column: the later one wins.
pub fn resolve_fields(fields: &'static [FieldDef]) -> FieldMap {
    let mut entries = IndexMap::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let Some(tag) = FieldTag::parse(field.tag) else {
            continue;
        };

        entries.insert(
            tag.column,
            FieldMeta {
                index,
                name: field.name,
                unix: tag.unix,
            },
        );
    }

    FieldMap { entries }
}

/// Build the column mapping for a record. Rebuilt on every call.
pub fn resolve<R: Record + ?Sized>(record: &R) -> FieldMap {
    let map = resolve_fields(record.fields());
    tracing::trace!(columns = ?map.columns().collect::<Vec<_>>(), "resolved field map");
    map
}
