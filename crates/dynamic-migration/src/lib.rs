//! Reversible schema migrations over [`DynamicValue`] trees.
//!
//! A [`Migration`] is a serializable list of [`MigrationAction`]s. Applying it
//! folds the actions over a value, stopping at the first error; reversing it
//! reverses the list and each action.
//!
//! # Example
//!
//! ```
//! use dynamic_migration::{Migration, MigrationAction};
//! use dynamic_value::{DynamicOptic, DynamicValue};
//!
//! let bob = DynamicValue::record([("name", DynamicValue::string("Bob"))]);
//! let migration = Migration::new(vec![MigrationAction::AddField {
//!     at: DynamicOptic::root(),
//!     name: "age".into(),
//!     default: DynamicValue::int(0),
//! }]);
//!
//! let migrated = migration.apply(&bob).unwrap();
//! assert_eq!(migrated.field("age"), Some(&DynamicValue::int(0)));
//! assert_eq!(migration.reverse().apply(&migrated), Ok(bob));
//! ```

pub mod action;
mod apply;
pub mod builder;
pub mod migration;

pub use action::MigrationAction;
pub use builder::{DeclaredFields, FieldSet, MigrationBuilder};
pub use migration::Migration;
