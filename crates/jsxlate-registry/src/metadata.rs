//! Read-only metadata of previously compiled assemblies.
//!
//! A translation consults the snapshot for proxy lookups and to keep output
//! names of earlier assemblies reserved; it never mutates it. Snapshots of
//! several assemblies are combined with [`AssemblyMetadata::merge`] before
//! the next translation starts.

use jsxlate_core::{RegistryError, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::DependencyGraph;

/// What a snapshot records about one type or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    /// Qualified source name.
    pub name: String,
    /// Output name assigned by the resolver.
    pub output_name: String,
    /// Assembly that defined the type.
    pub assembly: String,
}

impl TypeMetadata {
    pub fn new(
        name: impl Into<String>,
        output_name: impl Into<String>,
        assembly: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            output_name: output_name.into(),
            assembly: assembly.into(),
        }
    }
}

/// Union of what one or more compiled assemblies produced.
#[derive(Debug, Clone, Default)]
pub struct AssemblyMetadata {
    assemblies: Vec<String>,
    classes: FxHashMap<TypeHash, TypeMetadata>,
    interfaces: FxHashMap<TypeHash, TypeMetadata>,
    proxies: FxHashMap<TypeHash, TypeHash>,
    resources: FxHashSet<TypeHash>,
    dependencies: DependencyGraph,
}

impl AssemblyMetadata {
    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty snapshot for one assembly, filled by the builder methods.
    pub fn for_assembly(assembly: impl Into<String>) -> Self {
        Self {
            assemblies: vec![assembly.into()],
            ..Self::default()
        }
    }

    pub fn add_class(&mut self, hash: TypeHash, meta: TypeMetadata) {
        self.classes.insert(hash, meta);
    }

    pub fn add_interface(&mut self, hash: TypeHash, meta: TypeMetadata) {
        self.interfaces.insert(hash, meta);
    }

    pub fn add_proxy(&mut self, proxy: TypeHash, target: TypeHash) {
        self.proxies.insert(proxy, target);
    }

    pub fn add_resource(&mut self, hash: TypeHash) {
        self.resources.insert(hash);
    }

    pub fn set_dependencies(&mut self, graph: DependencyGraph) {
        self.dependencies = graph;
    }

    /// Assemblies included in this snapshot.
    pub fn assemblies(&self) -> &[String] {
        &self.assemblies
    }

    pub fn class(&self, hash: TypeHash) -> Option<&TypeMetadata> {
        self.classes.get(&hash)
    }

    pub fn interface(&self, hash: TypeHash) -> Option<&TypeMetadata> {
        self.interfaces.get(&hash)
    }

    /// Whether any type or interface with this identity is known.
    pub fn contains_type(&self, hash: TypeHash) -> bool {
        self.classes.contains_key(&hash) || self.interfaces.contains_key(&hash)
    }

    /// Target of a proxy type.
    pub fn proxy_target(&self, proxy: TypeHash) -> Option<TypeHash> {
        self.proxies.get(&proxy).copied()
    }

    pub fn is_resource(&self, hash: TypeHash) -> bool {
        self.resources.contains(&hash)
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    /// Output names already taken by types of this snapshot.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.classes
            .values()
            .chain(self.interfaces.values())
            .map(|m| m.output_name.as_str())
    }

    /// Merge snapshots into one read-only union.
    ///
    /// A type defined by two different assemblies is a conflict. The same
    /// assembly appearing twice (for example through two reference paths) is
    /// accepted once.
    pub fn merge<'a>(
        snapshots: impl IntoIterator<Item = &'a AssemblyMetadata>,
    ) -> Result<AssemblyMetadata, RegistryError> {
        let mut merged = AssemblyMetadata::default();
        for snapshot in snapshots {
            if snapshot
                .assemblies
                .iter()
                .all(|a| merged.assemblies.contains(a))
                && !snapshot.assemblies.is_empty()
            {
                continue;
            }
            merged.assemblies.extend(snapshot.assemblies.iter().cloned());
            merge_types(&mut merged.classes, &snapshot.classes)?;
            merge_types(&mut merged.interfaces, &snapshot.interfaces)?;
            merged.proxies.extend(snapshot.proxies.iter().map(|(k, v)| (*k, *v)));
            merged.resources.extend(snapshot.resources.iter().copied());
            merged.dependencies.merge(&snapshot.dependencies);
        }
        Ok(merged)
    }
}

fn merge_types(
    into: &mut FxHashMap<TypeHash, TypeMetadata>,
    from: &FxHashMap<TypeHash, TypeMetadata>,
) -> Result<(), RegistryError> {
    for (hash, meta) in from {
        if let Some(existing) = into.get(hash) {
            if existing.assembly != meta.assembly {
                return Err(RegistryError::ConflictingType {
                    name: meta.name.clone(),
                    first: existing.assembly.clone(),
                    second: meta.assembly.clone(),
                });
            }
            continue;
        }
        into.insert(*hash, meta.clone());
    }
    Ok(())
}
