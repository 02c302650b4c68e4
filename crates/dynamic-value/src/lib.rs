//! Structurally typed dynamic values.
//!
//! A [`DynamicValue`] is an immutable tree of records, variants, sequences,
//! maps, primitives and null. A [`DynamicOptic`] addresses locations inside
//! such a tree, and the navigation methods on [`DynamicValue`] select and
//! rewrite the addressed values.
//!
//! # Example
//!
//! ```
//! use dynamic_value::{DynamicOptic, DynamicValue};
//!
//! let person = DynamicValue::record([
//!     ("name", DynamicValue::string("Bob")),
//!     ("tags", DynamicValue::sequence([DynamicValue::string("a")])),
//! ]);
//!
//! let name = person.get(&DynamicOptic::root().field("name"));
//! assert_eq!(name.one(), Some(&DynamicValue::string("Bob")));
//!
//! let renamed = person.set(&DynamicOptic::root().field("name"), DynamicValue::string("Al"));
//! assert_eq!(renamed.field("name"), Some(&DynamicValue::string("Al")));
//! ```

pub mod error;
pub mod merge;
pub mod optic;
pub mod primitive;
pub mod selection;
pub mod value;

mod navigate;

pub use error::{SchemaError, SchemaResult};
pub use merge::MergeStrategy;
pub use optic::{DynamicOptic, Node};
pub use primitive::PrimitiveValue;
pub use selection::Selection;
pub use value::{DynamicValue, NONE_CASE, SOME_CASE};
