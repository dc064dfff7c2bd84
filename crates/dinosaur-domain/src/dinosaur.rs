//! Dinosaur module - the single record type served by the API

use std::fmt;

/// Identifier of a persisted dinosaur.
///
/// Ids are assigned by the store when a record is created and never
/// change afterwards. Clients can only name an existing id, never pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DinosaurId(i64);

impl DinosaurId {
    /// Wrap a raw id value
    ///
    /// This is primarily for storage layer deserialization and path decoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use dinosaur_domain::DinosaurId;
    ///
    /// let id = DinosaurId::from_value(42);
    /// assert_eq!(id.value(), 42);
    /// ```
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw integer value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DinosaurId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted dinosaur record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dinosaur {
    /// Store-assigned identifier
    pub id: DinosaurId,

    /// Name of the dinosaur
    pub name: String,

    /// Free-form description
    pub description: String,
}

/// The fields a client supplies to create a dinosaur
///
/// Carries no id; the store assigns one on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDinosaur {
    /// Name of the dinosaur
    pub name: String,

    /// Free-form description
    pub description: String,
}

impl NewDinosaur {
    /// Create a new unsaved record
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Attach a store-assigned id, producing the persisted record
    pub fn with_id(self, id: DinosaurId) -> Dinosaur {
        Dinosaur {
            id,
            name: self.name,
            description: self.description,
        }
    }
}
