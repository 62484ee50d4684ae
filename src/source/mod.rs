//! Inventory source definitions.
//!
//! A source pairs a provider kind with its free-form variables and typed
//! fields. Kinds are a closed enum so provider dispatch is checked at
//! compile time; string names only exist at the serde boundary.

mod definition;
mod kind;

pub use definition::SourceDefinition;
pub use kind::{FieldSupport, SourceKind};
