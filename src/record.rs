//! Record capabilities
//!
//! A record is anything with a stable identity. Two optional capabilities
//! change how it is written: a type tag, and a payload to introspect in
//! place of the record itself.

use crate::walker::Fields;

/// A value the mapper can write and look up
pub trait Identifiable {
    /// Stable identity string, stored under `_identity`
    fn identity(&self) -> String;

    /// Type tag override, if the record has one
    fn typed(&self) -> Option<&dyn Typed> {
        None
    }

    /// Payload to introspect instead of the record
    fn dataful(&self) -> Option<&dyn Dataful> {
        None
    }
}

pub trait Typed {
    fn type_tag(&self) -> String;
}

pub trait Dataful {
    fn data(&self) -> &dyn Fields;
}

/// Bare identity, for lookups that have no record at hand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }
}

impl Identifiable for Identity {
    fn identity(&self) -> String {
        self.0.clone()
    }
}

impl From<&str> for Identity {
    fn from(identity: &str) -> Self {
        Self::new(identity)
    }
}
