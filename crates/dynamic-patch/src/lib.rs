//! Diffing and patching of [`DynamicValue`] trees.
//!
//! [`Patch::diff`] computes a serializable [`Patch`] between two values;
//! [`Patch::apply`] replays it under a [`PatchMode`].
//!
//! # Example
//!
//! ```
//! use dynamic_patch::{Patch, PatchMode};
//! use dynamic_value::{DynamicOptic, DynamicValue, SchemaError};
//!
//! let bob = DynamicValue::record([("name", DynamicValue::string("Bob"))]);
//! let patch = Patch::set(DynamicOptic::root().field("age"), DynamicValue::int(30));
//!
//! assert!(matches!(
//!     patch.apply(&bob, PatchMode::Strict),
//!     Err(SchemaError::MissingField { .. })
//! ));
//! let aged = patch.apply(&bob, PatchMode::Clobber).unwrap();
//! assert_eq!(aged.field("age"), Some(&DynamicValue::int(30)));
//! assert_eq!(Patch::diff(&bob, &aged).apply(&bob, PatchMode::Strict), Ok(aged));
//! ```

pub mod diff;
pub mod patch;

pub use dynamic_value::{DynamicOptic, DynamicValue, SchemaError, SchemaResult};
pub use patch::{MapOp, Operation, Patch, PatchMode, PatchOp, PrimitiveOp, SeqOp, StringOp};
