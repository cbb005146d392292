//! Dependency graph construction during the translation walk.
//!
//! ```text
//! EntryPoint ──▶ Method ──▶ Type ──▶ Resource ──▶ Resource
//!                  │                    ▲
//!                  └────────────────────┘   (method-level Require)
//! ```

use jsxlate_core::TypeHash;
use jsxlate_registry::{DependencyGraph, DependencyNode};

/// Borrowing builder over the context's dependency graph.
pub struct DependencyBuilder<'a> {
    graph: &'a mut DependencyGraph,
}

impl<'a> DependencyBuilder<'a> {
    pub fn new(graph: &'a mut DependencyGraph) -> Self {
        Self { graph }
    }

    /// A translated type and the resources it requires.
    pub fn add_type(&mut self, hash: TypeHash, requires: &[TypeHash]) {
        let node = DependencyNode::Type(hash);
        self.graph.add_node(node);
        for resource in requires {
            self.graph.add_edge(node, DependencyNode::Resource(*resource));
        }
    }

    /// A resource type and the resources it requires in turn.
    pub fn add_resource(&mut self, hash: TypeHash, requires: &[TypeHash]) {
        let node = DependencyNode::Resource(hash);
        self.graph.add_node(node);
        for resource in requires {
            self.graph.add_edge(node, DependencyNode::Resource(*resource));
        }
    }

    /// A method with its own requirements. The method depends on its type.
    pub fn add_method(&mut self, owner: TypeHash, member: TypeHash, requires: &[TypeHash]) {
        let node = DependencyNode::Method { owner, member };
        self.graph.add_edge(node, DependencyNode::Type(owner));
        for resource in requires {
            self.graph.add_edge(node, DependencyNode::Resource(*resource));
        }
    }

    /// The entry point calls this method.
    pub fn add_entry_point(&mut self, owner: TypeHash, member: TypeHash) {
        let node = DependencyNode::Method { owner, member };
        self.graph.add_edge(DependencyNode::EntryPoint, node);
        self.graph.add_edge(node, DependencyNode::Type(owner));
    }
}
