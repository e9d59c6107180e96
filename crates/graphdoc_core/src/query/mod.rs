//! Filter language and query options.
//!
//! Field names are validated, filters are parsed into a closed tree, and
//! the tree is compiled into a parameterized where-clause fragment.

mod compile;
mod filter;
mod ident;
mod options;

pub use compile::{compile, Predicate};
pub use filter::{ComparisonOp, Filter, MembershipOp};
pub use ident::{parse_sort, validate_field};
pub use options::QueryOptions;

pub(crate) use filter::type_name;
pub(crate) use ident::validate_table_name;
