//! jsxlate registry crate.
//!
//! Holds the cross-assembly state that outlives a single translation:
//!
//! - [`DependencyGraph`]: resource/type/method/entry-point nodes with
//!   "depends-on" edges, stored in a `petgraph::DiGraph`
//! - [`AssemblyMetadata`]: read-only snapshot of what previously compiled
//!   assemblies produced, merged as a union before a new translation starts

mod dependency_graph;
mod metadata;

pub use dependency_graph::{DependencyGraph, DependencyNode};
pub use metadata::{AssemblyMetadata, TypeMetadata};
