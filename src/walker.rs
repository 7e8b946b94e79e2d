//! Field Walker
//!
//! Visits the exported fields of a record in declaration order. The field
//! table comes from `#[derive(Fields)]`, which only lists `pub` fields.

use crate::codec::{Decode, Encode};
use crate::error::MapperError;
use crate::tag::{effective_directive, normalize_name, parse_tag, TagOptions};
use std::marker::PhantomData;

/// Static description of one exported field, emitted by `#[derive(Fields)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Source field name
    pub name: &'static str,
    /// `#[edge("...")]` directive
    pub directive: Option<&'static str>,
    /// Directive derived from `#[serde(...)]` attributes
    pub serde_directive: Option<&'static str>,
}

/// A field resolved against its directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: &'static str,
    /// Edge name the field maps to, before any inline prefix
    pub edge: String,
    pub options: TagOptions,
}

impl FieldDescriptor {
    pub fn describe(info: &FieldInfo) -> Self {
        let directive = effective_directive(info.directive, info.serde_directive, info.name);
        let options = parse_tag(&directive);
        let edge = if options.name.is_empty() {
            normalize_name(info.name)
        } else {
            options.name.clone()
        };
        Self {
            field: info.name,
            edge,
            options,
        }
    }
}

/// Read access to one field
pub enum FieldValue<'a> {
    Scalar(&'a dyn Encode),
    /// Inline field whose own fields are walked
    Composite(&'a dyn Fields),
    /// Record-typed field without `inline`; it has no edge of its own
    Nested(&'a dyn Fields),
    /// Ignored field, not readable
    Skipped,
}

/// Write access to one field
pub enum FieldSlot<'a> {
    Scalar(&'a mut dyn Decode),
    Composite(&'a mut dyn Fields),
    Nested(&'a mut dyn Fields),
    Skipped,
}

/// Picks the accessor for a field that is not marked `inline`.
///
/// Generated code calls `(&&FieldKind::<T>::new()).value(..)`: the
/// `NestedAccess` impl applies when `T: Fields`, otherwise method lookup
/// falls through one auto-deref to `ScalarAccess`.
#[doc(hidden)]
pub struct FieldKind<T>(PhantomData<T>);

impl<T> FieldKind<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FieldKind<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[doc(hidden)]
pub trait NestedAccess<T> {
    fn value<'a>(&self, field: &'a T) -> FieldValue<'a>;
    fn slot<'a>(&self, field: &'a mut T) -> FieldSlot<'a>;
}

impl<T: Fields> NestedAccess<T> for &FieldKind<T> {
    fn value<'a>(&self, field: &'a T) -> FieldValue<'a> {
        FieldValue::Nested(field)
    }

    fn slot<'a>(&self, field: &'a mut T) -> FieldSlot<'a> {
        FieldSlot::Nested(field)
    }
}

#[doc(hidden)]
pub trait ScalarAccess<T> {
    fn value<'a>(&self, field: &'a T) -> FieldValue<'a>;
    fn slot<'a>(&self, field: &'a mut T) -> FieldSlot<'a>;
}

impl<T: Encode + Decode> ScalarAccess<T> for FieldKind<T> {
    fn value<'a>(&self, field: &'a T) -> FieldValue<'a> {
        FieldValue::Scalar(field)
    }

    fn slot<'a>(&self, field: &'a mut T) -> FieldSlot<'a> {
        FieldSlot::Scalar(field)
    }
}

/// Field enumeration for a record, normally derived.
///
/// Types without named fields return `None` from `field_infos`.
pub trait Fields {
    /// Static type name, the default type tag
    fn type_name(&self) -> &'static str;

    fn field_infos(&self) -> Option<&'static [FieldInfo]>;

    fn field_value(&self, index: usize) -> Option<FieldValue<'_>>;

    fn field_slot(&mut self, index: usize) -> Option<FieldSlot<'_>>;
}

/// Call `visit` once per exported field. The first visitor error stops the walk.
pub fn walk<F>(value: &dyn Fields, mut visit: F) -> Result<(), MapperError>
where
    F: FnMut(&FieldDescriptor, FieldValue<'_>) -> Result<(), MapperError>,
{
    let infos = value.field_infos().ok_or(MapperError::NotStruct)?;
    for (index, info) in infos.iter().enumerate() {
        let Some(field) = value.field_value(index) else {
            continue;
        };
        visit(&FieldDescriptor::describe(info), field)?;
    }
    Ok(())
}

pub fn walk_mut<F>(value: &mut dyn Fields, mut visit: F) -> Result<(), MapperError>
where
    F: FnMut(&FieldDescriptor, FieldSlot<'_>) -> Result<(), MapperError>,
{
    let infos = value.field_infos().ok_or(MapperError::NotStruct)?;
    for (index, info) in infos.iter().enumerate() {
        let Some(slot) = value.field_slot(index) else {
            continue;
        };
        visit(&FieldDescriptor::describe(info), slot)?;
    }
    Ok(())
}
