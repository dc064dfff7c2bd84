//! Trait definitions for external interactions
//!
//! These traits define the boundary between the HTTP layer and the
//! storage engine. Implementations live in other crates.

use crate::{Dinosaur, DinosaurId, NewDinosaur};

/// Trait for storing and retrieving dinosaurs (the persistence port)
///
/// Implemented by the infrastructure layer (dinosaur-store). Absence is
/// reported as `Ok(None)`; any `Err` is a failure of the storage engine
/// itself.
pub trait DinosaurStore {
    /// Error type for store operations
    type Error;

    /// List every stored dinosaur, ordered by id. Empty stores yield an empty vec.
    fn list_dinosaurs(&self) -> Result<Vec<Dinosaur>, Self::Error>;

    /// Get a dinosaur by id
    fn get_dinosaur(&self, id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error>;

    /// Persist a new dinosaur and return it with its assigned id
    fn create_dinosaur(&mut self, dinosaur: NewDinosaur) -> Result<Dinosaur, Self::Error>;

    /// Remove a dinosaur permanently, returning the record that was removed
    fn delete_dinosaur(&mut self, id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error>;

    /// Number of stored dinosaurs
    fn count_dinosaurs(&self) -> Result<usize, Self::Error>;
}
