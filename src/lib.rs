//! A SAT-backed dependency resolver for a minimal package index format: packages have
//! integer versions, and dependencies are expressed as inclusive version ranges.
#![warn(missing_docs)]

pub mod index;
pub mod package;
pub mod resolver;
pub mod version;

#[cfg(feature = "cli")]
/// CLI commands for the resolver binary.
pub mod cli;

pub use index::{load, CombineMode, Dependencies, Index, InvalidMode, LoadError, ParseError, ParseErrorReason};
pub use package::VersionedPackage;
pub use resolver::{reduce_setup, render_oneline, render_tree, ResolveError, Resolver, Setup};
pub use version::{Version, VersionRange, VersionSet};
