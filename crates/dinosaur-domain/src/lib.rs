//! Dinosaur Domain Layer
//!
//! This crate contains the record model for the Dinosaur API and the trait
//! through which the HTTP layer reaches persistence. It has no external
//! dependencies; storage engines and transports live in other crates.
//!
//! ## Key Concepts
//!
//! - **Dinosaur**: the only entity, a named record with a description
//! - **DinosaurId**: integer identity assigned by the store on creation
//! - **DinosaurStore**: the persistence port implemented by infrastructure
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Records are never mutated in place; they are created and deleted
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dinosaur;
pub mod traits;

// Re-exports for convenience
pub use dinosaur::{Dinosaur, DinosaurId, NewDinosaur};
pub use traits::DinosaurStore;
