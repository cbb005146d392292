//! Resolver - final output names for types and members.
//!
//! Runs once per context, after the translation walk:
//!
//! 1. Names of prior assemblies are reserved.
//! 2. Explicit type names are claimed verbatim, in registration order.
//! 3. Every other type gets its mangled source name, suffixed `$1`, `$2`, ...
//!    on collision.
//! 4. Within each type the same two steps run for members. Inline members
//!    are substituted at call sites and get no name.
//!
//! Two explicit names colliding in one scope is a [`CompileError::NameCollision`];
//! the later one falls back to a derived name so resolution still completes.

use jsxlate_core::{CompileError, MemberKey, NotResolvedMember, Span, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::context::CompilationContext;

/// Output names assigned by the resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolvedNames {
    pub(crate) types: FxHashMap<TypeHash, String>,
    pub(crate) members: FxHashMap<(TypeHash, MemberKey), String>,
}

/// One nameable item of a scope.
struct Entry<K> {
    key: K,
    source: String,
    explicit: Option<String>,
    span: Span,
}

/// Names taken within one scope.
#[derive(Default)]
struct Scope {
    taken: FxHashSet<String>,
}

impl Scope {
    fn claim_exact(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// `base`, or `base$N` with the smallest free `N`.
    fn claim_derived(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}${n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Assign names to every entry: explicit names first, then derived ones.
    fn assign<K: Clone + Eq + std::hash::Hash>(
        &mut self,
        entries: &[Entry<K>],
        scope_name: &str,
        errors: &mut Vec<CompileError>,
    ) -> FxHashMap<K, String> {
        let mut out = FxHashMap::default();
        for entry in entries {
            let Some(explicit) = &entry.explicit else {
                continue;
            };
            if self.claim_exact(explicit) {
                out.insert(entry.key.clone(), explicit.clone());
            } else {
                errors.push(CompileError::NameCollision {
                    name: explicit.clone(),
                    scope: scope_name.to_string(),
                    span: entry.span,
                });
            }
        }
        for entry in entries {
            if !out.contains_key(&entry.key) {
                let name = self.claim_derived(&mangle(&entry.source));
                out.insert(entry.key.clone(), name);
            }
        }
        out
    }
}

/// Replace characters that cannot appear in an output identifier.
pub fn mangle(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '+' | '`' | '<' | '>' => '_',
            c => c,
        })
        .collect()
}

/// Assigns output names to everything registered in a context.
pub struct Resolver<'a, 'meta> {
    ctx: &'a mut CompilationContext<'meta>,
}

impl<'a, 'meta> Resolver<'a, 'meta> {
    pub fn new(ctx: &'a mut CompilationContext<'meta>) -> Self {
        Self { ctx }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) {
        if self.ctx.is_resolved() {
            trace!("context already resolved");
            return;
        }

        let mut errors = Vec::new();
        let mut names = ResolvedNames::default();

        let mut assembly = Scope::default();
        for name in self.ctx.prior().output_names() {
            assembly.taken.insert(name.to_string());
        }
        let types: Vec<Entry<TypeHash>> = self
            .ctx
            .classes()
            .map(|c| Entry {
                key: c.type_hash,
                source: c.name.clone(),
                explicit: c.strong_name.clone(),
                span: c.span,
            })
            .chain(self.ctx.interfaces().map(|i| Entry {
                key: i.type_hash,
                source: i.name.clone(),
                explicit: i.strong_name.clone(),
                span: i.span,
            }))
            .collect();
        names.types = assembly.assign(&types, "assembly", &mut errors);

        for class in self.ctx.classes() {
            let entries: Vec<Entry<MemberKey>> = class
                .members
                .iter()
                .filter_map(member_entry)
                .collect();
            let scope_name = format!("type '{}'", class.name);
            let assigned = Scope::default().assign(&entries, &scope_name, &mut errors);
            names
                .members
                .extend(assigned.into_iter().map(|(k, v)| ((class.type_hash, k), v)));
        }

        for iface in self.ctx.interfaces() {
            let entries: Vec<Entry<MemberKey>> = iface
                .methods
                .iter()
                .map(|m| Entry {
                    key: MemberKey::Method(m.signature.clone()),
                    source: m.signature.name.clone(),
                    explicit: m.name.clone(),
                    span: iface.span,
                })
                .collect();
            let scope_name = format!("type '{}'", iface.name);
            let assigned = Scope::default().assign(&entries, &scope_name, &mut errors);
            names
                .members
                .extend(assigned.into_iter().map(|(k, v)| ((iface.type_hash, k), v)));
        }

        debug!(
            types = names.types.len(),
            members = names.members.len(),
            collisions = errors.len(),
            "names resolved"
        );
        for error in &errors {
            self.ctx.error(error);
        }
        self.ctx.set_names(names);
    }
}

fn member_entry(member: &NotResolvedMember) -> Option<Entry<MemberKey>> {
    let (source, method) = match member {
        NotResolvedMember::Method { signature, method } => (signature.name.clone(), method),
        NotResolvedMember::Constructor { method, .. } => ("New".to_string(), method),
        NotResolvedMember::Field { name, .. } => {
            return Some(Entry {
                key: member.key(),
                source: name.clone(),
                explicit: None,
                span: Span::default(),
            });
        }
        NotResolvedMember::StaticInitializer(_) => return None,
    };
    if method.kind.is_inline() {
        return None;
    }
    Some(Entry {
        key: member.key(),
        source,
        explicit: method.name.clone(),
        span: method.span,
    })
}
