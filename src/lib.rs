//! oxmd - Module certification cost from code-quality violations
//!
//! Reads the rule violations of a code-quality run, keeps the worst value
//! of the coverage, C.R.A.P. index, NPath and cyclomatic complexity
//! metrics, and prices a module certification from them.

pub mod certification;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod reporters;
