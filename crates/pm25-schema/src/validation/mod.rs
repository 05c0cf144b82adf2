//! Dataset validation against a column schema.
//!
//! The transformed-target invariant is checked first and short-circuits: a
//! table with both or neither of `pm25_boxcox`/`pm25_log` fails without any
//! per-column rule being evaluated. After that each schema column is checked
//! in declaration order.

mod checker;

pub use checker::SchemaChecker;
