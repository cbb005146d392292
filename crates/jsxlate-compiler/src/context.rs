//! CompilationContext - the mutable state of one assembly translation.
//!
//! Created once per assembly, populated during the single walk over the
//! declaration tree, resolved once, then handed to the backend. Earlier
//! assemblies are only visible through the read-only [`AssemblyMetadata`]
//! snapshot it borrows.

use jsxlate_core::{
    CompileError, CompileWarning, Diagnostics, MemberKey, MethodRef, NotResolvedClass,
    NotResolvedInterface, RemoteHandle, Span, Statement, TypeHash,
};
use jsxlate_registry::{AssemblyMetadata, DependencyGraph, TypeMetadata};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::CompilerOptions;
use crate::passes::resolve::{ResolvedNames, Resolver};

/// Everything produced while translating one assembly.
pub struct CompilationContext<'meta> {
    options: CompilerOptions,
    prior: &'meta AssemblyMetadata,
    classes: FxHashMap<TypeHash, NotResolvedClass>,
    /// Registration order of classes.
    class_order: Vec<TypeHash>,
    interfaces: FxHashMap<TypeHash, NotResolvedInterface>,
    interface_order: Vec<TypeHash>,
    /// Resource types with their source names, in registration order.
    resources: Vec<(TypeHash, String)>,
    proxies: FxHashMap<TypeHash, TypeHash>,
    diagnostics: Diagnostics,
    dependencies: DependencyGraph,
    entry_point: Option<Statement>,
    remotes: FxHashMap<MethodRef, RemoteHandle>,
    /// Source file currently walked, attached to diagnostics.
    current_file: Option<String>,
    names: Option<ResolvedNames>,
}

impl<'meta> CompilationContext<'meta> {
    pub fn new(prior: &'meta AssemblyMetadata, options: CompilerOptions) -> Self {
        Self {
            options,
            prior,
            classes: FxHashMap::default(),
            class_order: Vec::new(),
            interfaces: FxHashMap::default(),
            interface_order: Vec::new(),
            resources: Vec::new(),
            proxies: FxHashMap::default(),
            diagnostics: Diagnostics::new(),
            dependencies: DependencyGraph::new(),
            entry_point: None,
            remotes: FxHashMap::default(),
            current_file: None,
            names: None,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Metadata of previously compiled assemblies.
    pub fn prior(&self) -> &'meta AssemblyMetadata {
        self.prior
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Whether this assembly already declared a type with this identity.
    pub fn declares(&self, hash: TypeHash) -> bool {
        self.classes.contains_key(&hash)
            || self.interfaces.contains_key(&hash)
            || self.resources.iter().any(|(h, _)| *h == hash)
    }

    fn check_new_type(&self, hash: TypeHash, name: &str, span: Span) -> Result<(), CompileError> {
        if self.declares(hash) {
            return Err(CompileError::DuplicateTypeDefinition {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// Register a translated class.
    pub fn add_class(&mut self, class: NotResolvedClass) -> Result<(), CompileError> {
        self.check_new_type(class.type_hash, &class.name, class.span)?;
        trace!(class = %class.name, members = class.members.len(), "class registered");
        self.class_order.push(class.type_hash);
        self.classes.insert(class.type_hash, class);
        Ok(())
    }

    /// Register an interface and its method-name table.
    pub fn add_interface(&mut self, iface: NotResolvedInterface) -> Result<(), CompileError> {
        self.check_new_type(iface.type_hash, &iface.name, iface.span)?;
        trace!(interface = %iface.name, methods = iface.methods.len(), "interface registered");
        self.interface_order.push(iface.type_hash);
        self.interfaces.insert(iface.type_hash, iface);
        Ok(())
    }

    /// Register a resource type. Resources are not part of the class set.
    pub fn add_resource(
        &mut self,
        hash: TypeHash,
        name: &str,
        span: Span,
    ) -> Result<(), CompileError> {
        self.check_new_type(hash, name, span)?;
        trace!(resource = %name, "resource registered");
        self.resources.push((hash, name.to_string()));
        Ok(())
    }

    pub fn class(&self, hash: TypeHash) -> Option<&NotResolvedClass> {
        self.classes.get(&hash)
    }

    /// Look up a class by its qualified source name.
    pub fn class_named(&self, name: &str) -> Option<&NotResolvedClass> {
        self.classes.get(&TypeHash::from_name(name))
    }

    /// Classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &NotResolvedClass> {
        self.class_order.iter().filter_map(|h| self.classes.get(h))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn interface(&self, hash: TypeHash) -> Option<&NotResolvedInterface> {
        self.interfaces.get(&hash)
    }

    /// Interfaces in registration order.
    pub fn interfaces(&self) -> impl Iterator<Item = &NotResolvedInterface> {
        self.interface_order.iter().filter_map(|h| self.interfaces.get(h))
    }

    /// Resource types of this assembly in registration order.
    pub fn resources(&self) -> impl Iterator<Item = TypeHash> + '_ {
        self.resources.iter().map(|(h, _)| *h)
    }

    /// Whether a type is a resource of this or a prior assembly.
    pub fn is_resource(&self, hash: TypeHash) -> bool {
        self.resources.iter().any(|(h, _)| *h == hash) || self.prior.is_resource(hash)
    }

    // ==========================================================================
    // Proxies
    // ==========================================================================

    pub fn add_proxy(&mut self, proxy: TypeHash, target: TypeHash) {
        debug!(proxy = ?proxy, target = ?target, "proxy registered");
        self.proxies.insert(proxy, target);
    }

    /// Target of a proxy, from this assembly or a prior one.
    pub fn proxy_target(&self, proxy: TypeHash) -> Option<TypeHash> {
        self.proxies
            .get(&proxy)
            .copied()
            .or_else(|| self.prior.proxy_target(proxy))
    }

    /// Follow proxy redirections until a non-proxy type is reached.
    pub fn resolve_proxy(&self, hash: TypeHash) -> TypeHash {
        let mut current = hash;
        let mut seen = Vec::new();
        while let Some(target) = self.proxy_target(current) {
            if seen.contains(&target) {
                break;
            }
            seen.push(current);
            current = target;
        }
        current
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub fn set_current_file(&mut self, file: Option<String>) {
        self.current_file = file;
    }

    /// Record an error.
    pub fn error(&mut self, error: &CompileError) {
        debug!(kind = %error.kind(), file = ?self.current_file, "{error}");
        self.diagnostics.error(error, self.current_file.as_deref());
    }

    /// Record a warning.
    pub fn warning(&mut self, warning: &CompileWarning) {
        warn!(kind = %warning.kind(), file = ?self.current_file, "{warning}");
        self.diagnostics.warning(warning, self.current_file.as_deref());
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The compile failed if any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    // ==========================================================================
    // Dependencies, entry point, remotes
    // ==========================================================================

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut DependencyGraph {
        &mut self.dependencies
    }

    /// Set the entry statement. A later call replaces an earlier one.
    pub fn set_entry_point(&mut self, statement: Statement) {
        if self.entry_point.is_some() {
            debug!("entry point replaced by a later declaration");
        }
        self.entry_point = Some(statement);
    }

    pub fn entry_point(&self) -> Option<&Statement> {
        self.entry_point.as_ref()
    }

    /// Record the handle of a remote method.
    pub fn register_remote(&mut self, method: MethodRef, handle: RemoteHandle) {
        trace!(method = %method.signature, handle = %handle, "remote registered");
        self.remotes.insert(method, handle);
    }

    pub fn remote(&self, method: &MethodRef) -> Option<&RemoteHandle> {
        self.remotes.get(method)
    }

    pub fn remotes(&self) -> impl Iterator<Item = (&MethodRef, &RemoteHandle)> {
        self.remotes.iter()
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    /// Assign output names. Does nothing when already resolved.
    pub fn resolve(&mut self) {
        Resolver::new(self).run();
    }

    pub fn is_resolved(&self) -> bool {
        self.names.is_some()
    }

    pub(crate) fn set_names(&mut self, names: ResolvedNames) {
        self.names = Some(names);
    }

    /// Output name of a type or interface, once resolved.
    pub fn output_name(&self, hash: TypeHash) -> Option<&str> {
        self.names.as_ref()?.types.get(&hash).map(String::as_str)
    }

    /// Output name of a member, once resolved. Inline members have none.
    pub fn member_name(&self, owner: TypeHash, key: &MemberKey) -> Option<&str> {
        self.names
            .as_ref()?
            .members
            .get(&(owner, key.clone()))
            .map(String::as_str)
    }

    /// Snapshot of what this assembly defines, for later translations.
    pub fn to_metadata(&self) -> AssemblyMetadata {
        let assembly = &self.options.assembly_name;
        let mut meta = AssemblyMetadata::for_assembly(assembly.clone());
        let output = |hash: TypeHash, name: &str| {
            self.output_name(hash).unwrap_or(name).to_string()
        };
        for class in self.classes() {
            meta.add_class(
                class.type_hash,
                TypeMetadata::new(&class.name, output(class.type_hash, &class.name), assembly),
            );
        }
        for iface in self.interfaces() {
            meta.add_interface(
                iface.type_hash,
                TypeMetadata::new(&iface.name, output(iface.type_hash, &iface.name), assembly),
            );
        }
        for (proxy, target) in &self.proxies {
            meta.add_proxy(*proxy, *target);
        }
        for hash in self.resources() {
            meta.add_resource(hash);
        }
        meta.set_dependencies(self.dependencies.clone());
        meta
    }
}
