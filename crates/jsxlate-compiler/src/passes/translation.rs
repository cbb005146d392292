//! Translation Pass - single walk over the declaration tree.
//!
//! Visits every source file, type and member once, depth first, and
//! populates the [`CompilationContext`]. Nothing here fails the walk:
//! member-level errors become diagnostics plus a placeholder body, and a
//! duplicate type skips only its own subtree.
//!
//! ## Per type
//!
//! ```text
//! TypeDecl
//!   ├─ duplicate?          -> DuplicateTypeDefinition, skip subtree
//!   ├─ resource?           -> resource node only
//!   ├─ interface?          -> method-name table
//!   └─ class / module / union / record
//!        ├─ members        -> MemberTranslator
//!        ├─ union, record  -> AlgebraicAugmenter (JavaScript types only)
//!        ├─ bindings       -> StartupBuilder of the file
//!        └─ requires       -> DependencyBuilder
//! ```

use jsxlate_core::{
    Assembly, ClassKind, CompileError, CompileWarning, DefinitionSource, Expr, InterfaceMethod,
    MemberDecl, MemberDeclKind, MethodKind, MethodRef, NotResolvedClass, NotResolvedInterface,
    RemoteHandle, SourceFile, Statement, TypeDecl, TypeDeclKind, TypeHash, Visibility,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::CompilerOptions;
use crate::annotation::{Annotation, compose};
use crate::context::CompilationContext;
use crate::passes::algebraic::AlgebraicAugmenter;
use crate::passes::dependencies::DependencyBuilder;
use crate::passes::members::MemberTranslator;
use crate::passes::startup::StartupBuilder;

/// Counters reported by the translation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslationOutput {
    /// Classes and interfaces registered.
    pub types_translated: usize,
    /// Resource types registered.
    pub resources_registered: usize,
    /// Members that produced a record.
    pub members_translated: usize,
    /// Members replaced by an error placeholder.
    pub members_failed: usize,
    /// Synthesized startup types.
    pub startup_types: usize,
}

/// Walks one assembly into a compilation context.
pub struct TranslationPass<'a, 'meta> {
    ctx: &'a mut CompilationContext<'meta>,
    options: CompilerOptions,
    output: TranslationOutput,
}

impl<'a, 'meta> TranslationPass<'a, 'meta> {
    pub fn new(ctx: &'a mut CompilationContext<'meta>) -> Self {
        let options = ctx.options().clone();
        Self {
            ctx,
            options,
            output: TranslationOutput::default(),
        }
    }

    /// Translate every file of the assembly, in order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, assembly: &Assembly) -> TranslationOutput {
        debug!(assembly = %assembly.name, files = assembly.files.len(), "translating assembly");
        for file in &assembly.files {
            self.visit_file(file);
        }
        self.ctx.set_current_file(None);
        debug!(
            types = self.output.types_translated,
            members = self.output.members_translated,
            failed = self.output.members_failed,
            "translation finished"
        );
        self.output
    }

    fn visit_file(&mut self, file: &SourceFile) {
        trace!(file = %file.path, types = file.types.len(), "visiting file");
        self.ctx.set_current_file(Some(file.path.clone()));

        let mut startup = StartupBuilder::new(&self.options.assembly_name, &file.path);
        let root = Annotation::default();
        for ty in &file.types {
            self.visit_type(ty, &root, &mut startup);
        }

        if let Some(class) = startup.finish() {
            let hash = class.type_hash;
            match self.ctx.add_class(class) {
                Ok(()) => {
                    DependencyBuilder::new(self.ctx.dependencies_mut()).add_type(hash, &[]);
                    self.output.startup_types += 1;
                }
                Err(e) => self.ctx.error(&e),
            }
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    fn visit_type(&mut self, ty: &TypeDecl, parent: &Annotation, startup: &mut StartupBuilder) {
        let hash = TypeHash::from_name(&ty.name);
        if self.ctx.declares(hash) {
            self.ctx.error(&CompileError::DuplicateTypeDefinition {
                name: ty.name.clone(),
                span: ty.span,
            });
            return;
        }
        if ty.source == DefinitionSource::Reflected {
            self.ctx.warning(&CompileWarning::ReflectedDefinition {
                name: ty.name.clone(),
                span: ty.span,
            });
        }

        let ann = compose(parent, &ty.attributes);
        let requires: Vec<TypeHash> = ann.requires.iter().map(|r| r.type_hash()).collect();
        trace!(ty = %ty.name, kind = ?ann.kind, "visiting type");

        if ty.is_resource {
            match self.ctx.add_resource(hash, &ty.name, ty.span) {
                Ok(()) => {
                    DependencyBuilder::new(self.ctx.dependencies_mut()).add_resource(hash, &requires);
                    self.output.resources_registered += 1;
                }
                Err(e) => {
                    self.ctx.error(&e);
                    return;
                }
            }
        } else {
            let registered = match ty.kind {
                TypeDeclKind::Interface => self.visit_interface(ty, &ann, hash),
                _ => self.visit_class(ty, &ann, hash, &requires, startup),
            };
            if !registered {
                return;
            }
            DependencyBuilder::new(self.ctx.dependencies_mut()).add_type(hash, &requires);
            self.output.types_translated += 1;
        }

        for nested in &ty.nested {
            self.visit_type(nested, &ann, startup);
        }
    }

    fn visit_interface(&mut self, ty: &TypeDecl, ann: &Annotation, hash: TypeHash) -> bool {
        let methods = ty
            .members
            .iter()
            .map(|m| InterfaceMethod {
                signature: m.signature(),
                name: compose(ann, &m.attributes).name,
            })
            .collect();
        let iface = NotResolvedInterface {
            name: ty.name.clone(),
            type_hash: hash,
            span: ty.span,
            strong_name: ann.name.clone(),
            extends: ty.interfaces.iter().map(|i| i.type_hash()).collect(),
            methods,
        };
        match self.ctx.add_interface(iface) {
            Ok(()) => true,
            Err(e) => {
                self.ctx.error(&e);
                false
            }
        }
    }

    fn visit_class(
        &mut self,
        ty: &TypeDecl,
        ann: &Annotation,
        hash: TypeHash,
        requires: &[TypeHash],
        startup: &mut StartupBuilder,
    ) -> bool {
        let kind = match ty.kind {
            TypeDeclKind::Module => ClassKind::StaticModule,
            TypeDeclKind::Union(_) | TypeDeclKind::Record(_) => ClassKind::Algebraic,
            TypeDeclKind::Class | TypeDeclKind::Interface => ClassKind::Ordinary,
        };
        let mut class = NotResolvedClass::new(&ty.name, hash, kind)
            .with_span(ty.span)
            .with_base(ty.base.as_ref().map(|b| b.type_hash()))
            .with_strong_name(ann.name.clone())
            .with_requires(requires.to_vec());

        if let Some(target) = &ann.proxy_of {
            self.ctx.add_proxy(hash, target.type_hash());
            class = class.as_proxy();
            if ty.visibility == Visibility::Public {
                self.ctx.warning(&CompileWarning::PublicProxy {
                    name: ty.name.clone(),
                    span: ty.span,
                });
            }
        }

        self.translate_members(ty, ann, &mut class);

        for binding in &ty.bindings {
            let binding_ann = compose(ann, &binding.attributes);
            if let Err(e) = startup.add_binding(binding, &binding_ann) {
                self.ctx.error(&e);
                self.output.members_failed += 1;
            }
        }

        if ann.is_javascript() {
            let augmenter = AlgebraicAugmenter::new(&self.options, ty.type_ref(), ann);
            let augmented = match &ty.kind {
                TypeDeclKind::Union(cases) => Some(augmenter.union(cases)),
                TypeDeclKind::Record(fields) => Some(augmenter.record(fields)),
                _ => None,
            };
            if let Some(augmented) = augmented {
                for member in augmented.members {
                    if !class.contains(&member.key()) {
                        class.members.push(member);
                    }
                }
                class.shape = Some(augmented.shape);
            }
        }

        match self.ctx.add_class(class) {
            Ok(()) => true,
            Err(e) => {
                self.ctx.error(&e);
                false
            }
        }
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn translate_members(&mut self, ty: &TypeDecl, ann: &Annotation, class: &mut NotResolvedClass) {
        let external = ann.name.as_deref().unwrap_or(&ty.name);
        let translator = MemberTranslator::new(&self.options, class.type_hash, &ty.name, external);

        let getters: FxHashMap<&str, Annotation> = ty
            .members
            .iter()
            .filter_map(|m| match &m.kind {
                MemberDeclKind::Getter { property } => {
                    Some((property.as_str(), compose(ann, &m.attributes)))
                }
                _ => None,
            })
            .collect();

        for member in &ty.members {
            let mut member_ann = compose(ann, &member.attributes);
            if let MemberDeclKind::Setter { property } = &member.kind
                && let Some(getter) = getters.get(property.as_str())
            {
                member_ann = member_ann.with_getter(getter);
            }

            let record = match translator.translate(member, &member_ann) {
                Ok(Some(record)) => {
                    self.output.members_translated += 1;
                    record
                }
                Ok(None) => continue,
                Err(e) => {
                    self.ctx.error(&e);
                    self.output.members_failed += 1;
                    translator.placeholder(member, &e)
                }
            };

            let remote = match record.method().map(|m| &m.kind) {
                Some(MethodKind::Remote { handle, .. }) => Some(handle.clone()),
                _ => None,
            };
            match class.add_member(record, member.span) {
                Ok(()) => register_member(self.ctx, class.type_hash, member, &member_ann, remote),
                Err(e) => self.ctx.error(&e),
            }
        }
    }
}

/// Context-level side effects of one member that was added to its class:
/// remote handle, method requirements and the entry point.
fn register_member(
    ctx: &mut CompilationContext<'_>,
    owner: TypeHash,
    decl: &MemberDecl,
    ann: &Annotation,
    remote: Option<RemoteHandle>,
) {
    let signature = decl.signature();
    let member_hash = signature.member_hash(owner);

    if let Some(handle) = remote {
        ctx.register_remote(MethodRef::new(owner, signature.clone()), handle);
    }

    if !ann.requires.is_empty() {
        let requires: Vec<TypeHash> = ann.requires.iter().map(|r| r.type_hash()).collect();
        DependencyBuilder::new(ctx.dependencies_mut()).add_method(owner, member_hash, &requires);
    }

    if ann.is_entry_point {
        if decl.kind == MemberDeclKind::Method && decl.is_static() {
            ctx.set_entry_point(Statement::Expr(Expr::Call {
                receiver: None,
                method: MethodRef::new(owner, signature),
                args: Vec::new(),
            }));
            DependencyBuilder::new(ctx.dependencies_mut()).add_entry_point(owner, member_hash);
        } else {
            ctx.error(&CompileError::IllegalKindForSlot {
                kind: "EntryPoint".to_string(),
                member: decl.name.clone(),
                reason: "entry point must be a static method".to_string(),
                span: decl.span,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlate_core::{
        Attribute, BindingDecl, DiagnosticKind, MemberModifiers, MemberSignature, Param,
        RecordField, TypeRef, well_known,
    };
    use jsxlate_registry::{AssemblyMetadata, DependencyNode};

    fn int() -> TypeRef {
        TypeRef::named(well_known::INT32)
    }

    fn run(types: Vec<TypeDecl>) -> (CompilationContext<'static>, TranslationOutput) {
        static PRIOR: std::sync::OnceLock<AssemblyMetadata> = std::sync::OnceLock::new();
        let prior = PRIOR.get_or_init(AssemblyMetadata::empty);
        let mut file = SourceFile::new("src/Main.fs");
        file.types = types;
        let assembly = Assembly::new("Web").with_file(file);
        let mut ctx = CompilationContext::new(prior, CompilerOptions::new().with_assembly_name("Web"));
        let out = TranslationPass::new(&mut ctx).run(&assembly);
        (ctx, out)
    }

    fn js_class(name: &str) -> TypeDecl {
        TypeDecl::class(name).with_attribute(Attribute::JavaScript(true))
    }

    fn static_method(name: &str) -> MemberDecl {
        MemberDecl::method(name, vec![], TypeRef::void())
            .with_modifiers(MemberModifiers::STATIC)
            .with_body(Expr::Undefined)
    }

    #[test]
    fn class_with_members() {
        let ty = js_class("App.Calc").with_member(
            MemberDecl::method("Add", vec![Param::new("a", int()), Param::new("b", int())], int())
                .with_modifiers(MemberModifiers::STATIC)
                .with_body(Expr::var("a")),
        );
        let (ctx, out) = run(vec![ty]);
        assert_eq!(out.types_translated, 1);
        assert_eq!(out.members_translated, 1);
        let class = ctx.class_named("App.Calc").unwrap();
        assert_eq!(class.method_named("Add").unwrap().kind, MethodKind::Callable);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn duplicate_member_registers_nothing() {
        let ty = js_class("App.A")
            .with_member(static_method("Main"))
            .with_member(static_method("Main").with_attribute(Attribute::EntryPoint));
        let (ctx, _) = run(vec![ty]);

        assert_eq!(ctx.diagnostics().of_kind(DiagnosticKind::DuplicateMember).count(), 1);
        assert!(ctx.entry_point().is_none());
    }

    #[test]
    fn duplicate_type_skips_subtree() {
        let first = js_class("App.A").with_member(static_method("One"));
        let second = js_class("App.A")
            .with_member(static_method("Two"))
            .with_nested(js_class("App.A.Inner"));
        let (ctx, _) = run(vec![first, second]);

        let dups: Vec<_> = ctx
            .diagnostics()
            .of_kind(DiagnosticKind::DuplicateTypeDefinition)
            .collect();
        assert_eq!(dups.len(), 1);
        let class = ctx.class_named("App.A").unwrap();
        assert!(class.method_named("One").is_some());
        assert!(class.method_named("Two").is_none());
        assert!(ctx.class_named("App.A.Inner").is_none());
    }

    #[test]
    fn failed_member_keeps_siblings() {
        let ty = js_class("App.A")
            .with_member(
                MemberDecl::method("Bad", vec![], int())
                    .with_attribute(Attribute::Inline(Some("1 +".into()))),
            )
            .with_member(static_method("Good"));
        let (ctx, out) = run(vec![ty]);
        assert_eq!(out.members_failed, 1);
        let class = ctx.class_named("App.A").unwrap();
        assert!(class.method_named("Bad").unwrap().body.is_error());
        assert_eq!(class.method_named("Good").unwrap().kind, MethodKind::Callable);
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }

    #[test]
    fn setter_inherits_passthrough_getter() {
        let ty = js_class("App.P")
            .with_member(
                MemberDecl::setter("Age", TypeRef::option(int())),
            )
            .with_member(
                MemberDecl::getter("Age", TypeRef::option(int()))
                    .with_attribute(Attribute::OptionalField)
                    .with_attribute(Attribute::Name("age".into())),
            );
        let (ctx, _) = run(vec![ty]);
        let class = ctx.class_named("App.P").unwrap();
        let setter = class
            .method(&MemberSignature::setter("Age", TypeRef::option(int())))
            .unwrap();
        assert_eq!(setter.kind, MethodKind::Inline);
        assert_eq!(
            setter.body,
            Expr::apply(
                Expr::global("Runtime.SetOptional"),
                vec![Expr::Hole(0), Expr::string("age"), Expr::Hole(1)]
            )
        );
    }

    #[test]
    fn resources_are_not_classes() {
        let res = TypeDecl::class("Res.Chart")
            .as_resource()
            .with_attribute(Attribute::Require(TypeRef::named("Res.Base")));
        let user = js_class("App.View").with_attribute(Attribute::Require(TypeRef::named("Res.Chart")));
        let (ctx, out) = run(vec![res, user]);
        assert_eq!(out.resources_registered, 1);
        assert!(ctx.class_named("Res.Chart").is_none());
        assert!(ctx.is_resource(TypeHash::from_name("Res.Chart")));
        assert_eq!(
            ctx.dependencies()
                .transitive_resources(&DependencyNode::Type(TypeHash::from_name("App.View"))),
            vec![TypeHash::from_name("Res.Chart"), TypeHash::from_name("Res.Base")]
        );
    }

    #[test]
    fn entry_point_last_wins() {
        let a = js_class("App.A").with_member(static_method("Main").with_attribute(Attribute::EntryPoint));
        let b = js_class("App.B").with_member(static_method("Main").with_attribute(Attribute::EntryPoint));
        let (ctx, _) = run(vec![a, b]);
        let Some(Statement::Expr(Expr::Call { method, .. })) = ctx.entry_point() else {
            panic!("expected an entry call");
        };
        assert_eq!(method.owner, TypeHash::from_name("App.B"));
        assert!(!ctx.has_errors());
        assert_eq!(
            ctx.dependencies().dependencies(&DependencyNode::EntryPoint).len(),
            2
        );
    }

    #[test]
    fn instance_entry_point_is_illegal() {
        let a = js_class("App.A").with_member(
            MemberDecl::method("Run", vec![], TypeRef::void())
                .with_body(Expr::Undefined)
                .with_attribute(Attribute::EntryPoint),
        );
        let (ctx, _) = run(vec![a]);
        assert!(ctx.entry_point().is_none());
        assert_eq!(
            ctx.diagnostics().of_kind(DiagnosticKind::IllegalKindForSlot).count(),
            1
        );
    }

    #[test]
    fn remote_methods_are_registered() {
        let ty = js_class("App.Server").with_member(
            MemberDecl::method("Get", vec![], int())
                .with_modifiers(MemberModifiers::STATIC)
                .with_attribute(Attribute::Remote(None)),
        );
        let (ctx, _) = run(vec![ty]);
        assert_eq!(ctx.remotes().count(), 1);
        let (method, handle) = ctx.remotes().next().unwrap();
        assert_eq!(method.signature.name, "Get");
        assert_eq!(handle.assembly, "Web");
    }

    #[test]
    fn module_bindings_become_startup_code() {
        let module = TypeDecl::module("App.Main")
            .with_attribute(Attribute::JavaScript(true))
            .with_binding(BindingDecl::new("answer", int(), Expr::int(42)));
        let (ctx, out) = run(vec![module]);
        assert_eq!(out.startup_types, 1);
        let startup = ctx.class_named("StartupCode$Web$src_Main").unwrap();
        assert_eq!(startup.kind, ClassKind::StaticModule);
        assert!(startup.static_initializer().is_some());
    }

    #[test]
    fn record_is_augmented_only_when_translated() {
        let fields = vec![RecordField::new("X", int())];
        let js = TypeDecl::record("App.R", fields.clone()).with_attribute(Attribute::JavaScript(true));
        let plain = TypeDecl::record("App.S", fields);
        let (ctx, _) = run(vec![js, plain]);
        assert!(ctx.class_named("App.R").unwrap().shape.is_some());
        assert!(ctx.class_named("App.S").unwrap().members.is_empty());
    }

    #[test]
    fn proxy_and_reflected_warnings() {
        let proxy = TypeDecl::class("App.ListProxy")
            .with_attribute(Attribute::Proxy(TypeRef::named("System.Collections.List")));
        let reflected = js_class("App.Old").reflected();
        let (ctx, _) = run(vec![proxy, reflected]);
        assert_eq!(ctx.diagnostics().warning_count(), 2);
        assert!(!ctx.has_errors());
        assert!(ctx.class_named("App.ListProxy").unwrap().is_proxy);
        assert_eq!(
            ctx.resolve_proxy(TypeHash::from_name("App.ListProxy")),
            TypeHash::from_name("System.Collections.List")
        );
    }

    #[test]
    fn interfaces_record_method_names() {
        let iface = TypeDecl::interface("App.IShape")
            .with_member(
                MemberDecl::method("Area", vec![], int())
                    .with_modifiers(MemberModifiers::ABSTRACT)
                    .with_attribute(Attribute::Name("area".into())),
            )
            .with_interface(TypeRef::named("App.IBase"));
        let (ctx, _) = run(vec![iface]);
        let iface = ctx.interface(TypeHash::from_name("App.IShape")).unwrap();
        assert_eq!(iface.methods[0].name.as_deref(), Some("area"));
        assert_eq!(iface.extends, vec![TypeHash::from_name("App.IBase")]);
    }

    #[test]
    fn nested_types_inherit_javascript() {
        let outer = js_class("App.Outer").with_nested(
            TypeDecl::class("App.Outer+Inner").with_member(static_method("F")),
        );
        let (ctx, _) = run(vec![outer]);
        let inner = ctx.class_named("App.Outer+Inner").unwrap();
        assert_eq!(inner.method_named("F").unwrap().kind, MethodKind::Callable);
    }
}
