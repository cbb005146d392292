//! Dependency graph - what each type, method and the entry point requires.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`DependencyNode`] (types, resources, methods, the entry point)
//! - Edges: "depends on", from the requiring node to the required node
//!
//! Cycles are allowed. Every traversal keeps a visited set, so a cycle
//! between two resources terminates like any other path.

use jsxlate_core::TypeHash;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

/// A node of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyNode {
    /// A translated type.
    Type(TypeHash),
    /// An externally loadable asset (script, style).
    Resource(TypeHash),
    /// A translated method, identified by its declaring type and member hash.
    Method { owner: TypeHash, member: TypeHash },
    /// The assembly's entry point.
    EntryPoint,
}

/// Directed "depends on" graph between dependency nodes.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyNode, ()>,
    index: FxHashMap<DependencyNode, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(node, idx);
        idx
    }

    /// Record that `from` depends on `to`, creating both nodes as needed.
    ///
    /// Adding the same edge twice keeps a single edge.
    pub fn add_edge(&mut self, from: DependencyNode, to: DependencyNode) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        self.graph.update_edge(a, b, ());
    }

    pub fn contains(&self, node: &DependencyNode) -> bool {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.graph.node_weights()
    }

    /// Direct dependencies of a node, in the order they were added.
    pub fn dependencies(&self, node: &DependencyNode) -> Vec<DependencyNode> {
        let Some(&idx) = self.index.get(node) else {
            return Vec::new();
        };
        self.direct(idx).into_iter().map(|i| self.graph[i]).collect()
    }

    /// Every node reachable from `node`, excluding `node` itself, in depth-first pre-order.
    pub fn transitive_dependencies(&self, node: &DependencyNode) -> Vec<DependencyNode> {
        let Some(&start) = self.index.get(node) else {
            return Vec::new();
        };

        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut order = Vec::new();
        let mut stack: Vec<NodeIndex> = self.direct(start).into_iter().rev().collect();

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            order.push(self.graph[idx]);
            stack.extend(self.direct(idx).into_iter().rev());
        }
        order
    }

    /// Resources reachable from `node`, in depth-first pre-order.
    pub fn transitive_resources(&self, node: &DependencyNode) -> Vec<TypeHash> {
        self.transitive_dependencies(node)
            .into_iter()
            .filter_map(|n| match n {
                DependencyNode::Resource(hash) => Some(hash),
                _ => None,
            })
            .collect()
    }

    /// Union another graph into this one.
    pub fn merge(&mut self, other: &DependencyGraph) {
        for node in other.nodes() {
            self.add_node(*node);
        }
        for edge in other.graph.raw_edges() {
            let from = other.graph[edge.source()];
            let to = other.graph[edge.target()];
            self.add_edge(from, to);
        }
    }

    /// Outgoing neighbours in insertion order.
    fn direct(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(name: &str) -> DependencyNode {
        DependencyNode::Resource(TypeHash::from_name(name))
    }

    fn ty(name: &str) -> DependencyNode {
        DependencyNode::Type(TypeHash::from_name(name))
    }

    #[test]
    fn nodes_are_deduplicated() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(ty("A"));
        let b = g.add_node(ty("A"));
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn edges_are_deduplicated() {
        let mut g = DependencyGraph::new();
        g.add_edge(ty("A"), res("jquery"));
        g.add_edge(ty("A"), res("jquery"));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.dependencies(&ty("A")), vec![res("jquery")]);
    }

    #[test]
    fn dependencies_keep_insertion_order() {
        let mut g = DependencyGraph::new();
        g.add_edge(ty("A"), res("one"));
        g.add_edge(ty("A"), res("two"));
        g.add_edge(ty("A"), res("three"));
        assert_eq!(
            g.dependencies(&ty("A")),
            vec![res("one"), res("two"), res("three")]
        );
    }

    #[test]
    fn transitive_resources_follow_chains() {
        let mut g = DependencyGraph::new();
        g.add_edge(DependencyNode::EntryPoint, ty("Main"));
        g.add_edge(ty("Main"), res("app.css"));
        g.add_edge(res("app.css"), res("base.css"));
        assert_eq!(
            g.transitive_resources(&DependencyNode::EntryPoint),
            vec![TypeHash::from_name("app.css"), TypeHash::from_name("base.css")]
        );
    }

    #[test]
    fn cycles_terminate() {
        let mut g = DependencyGraph::new();
        g.add_edge(res("a"), res("b"));
        g.add_edge(res("b"), res("a"));
        g.add_edge(res("b"), res("c"));
        let reached = g.transitive_dependencies(&res("a"));
        assert_eq!(reached, vec![res("b"), res("c")]);
    }

    #[test]
    fn diamond_visits_once() {
        let mut g = DependencyGraph::new();
        g.add_edge(ty("A"), ty("B"));
        g.add_edge(ty("A"), ty("C"));
        g.add_edge(ty("B"), res("r"));
        g.add_edge(ty("C"), res("r"));
        assert_eq!(g.transitive_resources(&ty("A")), vec![TypeHash::from_name("r")]);
    }

    #[test]
    fn unknown_node_has_no_dependencies() {
        let g = DependencyGraph::new();
        assert!(g.dependencies(&ty("X")).is_empty());
        assert!(g.transitive_dependencies(&ty("X")).is_empty());
    }

    #[test]
    fn merge_is_union() {
        let mut a = DependencyGraph::new();
        a.add_edge(ty("A"), res("r1"));
        let mut b = DependencyGraph::new();
        b.add_edge(ty("A"), res("r1"));
        b.add_edge(ty("B"), res("r2"));
        a.merge(&b);
        assert_eq!(a.node_count(), 4);
        assert_eq!(a.edge_count(), 2);
    }
}
