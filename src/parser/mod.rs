//! Parser module: values tree, metadata comments, and their reconciliation.

pub mod comments;
pub mod merge;
pub mod values;
