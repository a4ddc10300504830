//! Support code for the `bsnmp-*` command-line tools.
//!
//! Only available with the `cli` feature.

pub mod args;
pub mod output;
