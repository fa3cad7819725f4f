//! Query value types: field values, filters, sort keys and pages.
//!
//! Payloads expose their queryable fields by name through [`Entity`]. A
//! [`Filter`] is a conjunction of optional constraints, a [`SortKey`] names a
//! field to order by, and a [`PageRequest`] selects one bounded slice of the
//! result. Requests are validated when they are built, never per query.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when a caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A typed field value.
///
/// The derived ordering is total: values of different kinds compare by
/// kind (`Null < Bool < Int < Text < List`), values of the same kind by
/// their natural order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A payload that can be filtered, sorted and grouped by field name.
pub trait Entity {
    /// Names accepted by [`Entity::field`] and by [`SortKey`] resolution.
    const FIELDS: &'static [&'static str];

    /// Look up a field by name. Returns `None` for names not in `FIELDS`.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// A single filter constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Field equals the value. A missing field compares as [`FieldValue::Null`].
    Equals { field: String, value: FieldValue },
    /// Text field contains the needle, ignoring case.
    Contains { field: String, needle: String },
    /// List field has the item as one of its elements.
    Includes { field: String, item: String },
}

impl Constraint {
    /// Check the constraint against a payload.
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        match self {
            Constraint::Equals { field, value } => {
                entity.field(field).unwrap_or(FieldValue::Null) == *value
            }
            Constraint::Contains { field, needle } => match entity.field(field) {
                Some(FieldValue::Text(text)) => text.to_lowercase().contains(needle.as_str()),
                _ => false,
            },
            Constraint::Includes { field, item } => match entity.field(field) {
                Some(FieldValue::List(items)) => items.iter().any(|i| i == item),
                _ => false,
            },
        }
    }
}

/// A conjunction of constraints. The empty filter matches everything.
///
/// The `*_opt` builders take an `Option`; `None` adds no constraint, so an
/// unset criterion always passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    constraints: Vec<Constraint>,
}

impl Filter {
    /// A filter with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.constraints.push(Constraint::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field == value` when a value is given.
    pub fn eq_opt<V: Into<FieldValue>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    /// Require the text field to contain `needle`, case-insensitively.
    pub fn contains(mut self, field: impl Into<String>, needle: impl AsRef<str>) -> Self {
        self.constraints.push(Constraint::Contains {
            field: field.into(),
            needle: needle.as_ref().to_lowercase(),
        });
        self
    }

    /// Require a case-insensitive substring match when a needle is given.
    pub fn contains_opt<S: AsRef<str>>(self, field: impl Into<String>, needle: Option<S>) -> Self {
        match needle {
            Some(needle) => self.contains(field, needle),
            None => self,
        }
    }

    /// Require the list field to include `item`.
    pub fn includes(mut self, field: impl Into<String>, item: impl Into<String>) -> Self {
        self.constraints.push(Constraint::Includes {
            field: field.into(),
            item: item.into(),
        });
        self
    }

    /// Require list membership when an item is given.
    pub fn includes_opt<S: Into<String>>(self, field: impl Into<String>, item: Option<S>) -> Self {
        match item {
            Some(item) => self.includes(field, item),
            None => self,
        }
    }

    /// Add a prebuilt constraint.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// True if every constraint matches.
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        self.constraints.iter().all(|c| c.matches(entity))
    }
}

/// Sort direction for a [`SortKey`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// What a sort key name resolved to for a given payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget<'a> {
    Identity,
    CreatedAt,
    Field(&'a str),
}

/// Sort by a named field.
///
/// `"id"` sorts by identity, `"createdAt"` (or `"created_at"`) by creation
/// time, and any name in [`Entity::FIELDS`] by that field. Unrecognized
/// names fall back to identity order. Ties are always broken by ascending
/// identity, including for descending keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    name: String,
    order: SortOrder,
}

impl SortKey {
    /// Ascending by `name`.
    pub fn by(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending by `name`.
    pub fn desc(name: impl Into<String>) -> Self {
        Self::by(name).with_order(SortOrder::Desc)
    }

    /// Ascending by identity.
    pub fn id() -> Self {
        Self::by("id")
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Resolve the key name against a payload type.
    pub fn resolve<T: Entity>(&self) -> SortTarget<'_> {
        match self.name.as_str() {
            "id" => SortTarget::Identity,
            "createdAt" | "created_at" => SortTarget::CreatedAt,
            name if T::FIELDS.contains(&name) => SortTarget::Field(name),
            _ => SortTarget::Identity,
        }
    }

    /// Apply the direction to a key comparison.
    pub(crate) fn direct(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::id()
    }
}

/// A validated page request: zero-based `index`, `size` in `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    index: usize,
    size: usize,
}

impl PageRequest {
    /// Build a page request, rejecting a negative index or an out-of-range size.
    pub fn new(index: i64, size: i64) -> Result<Self> {
        if index < 0 {
            return Err(Error::InvalidArgument(format!(
                "page index must not be negative, got {}",
                index
            )));
        }
        if size < 1 || size > MAX_PAGE_SIZE as i64 {
            return Err(Error::InvalidArgument(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
        Ok(Self {
            index: index as usize,
            size: size as usize,
        })
    }

    /// The first page of the given size.
    pub fn first(size: i64) -> Result<Self> {
        Self::new(0, size)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Position of the first item on this page.
    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a filtered and sorted result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<I> {
    /// Items on this page, at most `page_size` of them
    pub items: Vec<I>,
    /// Number of matches before slicing
    pub total_matching: usize,
    /// Zero-based index of this page
    pub page_index: usize,
    /// Requested page size
    pub page_size: usize,
    /// `ceil(total_matching / page_size)`
    pub total_pages: usize,
}

impl<I> Page<I> {
    /// Slice an already sorted sequence.
    ///
    /// An index past the end yields an empty page with correct totals.
    pub fn slice(sorted: Vec<I>, request: PageRequest) -> Self {
        let total_matching = sorted.len();
        let items = sorted
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();

        Self {
            items,
            total_matching,
            page_index: request.index(),
            page_size: request.size(),
            total_pages: total_matching.div_ceil(request.size()),
        }
    }

    /// Whether a later page holds items.
    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert every item, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(I) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_matching: self.total_matching,
            page_index: self.page_index,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
