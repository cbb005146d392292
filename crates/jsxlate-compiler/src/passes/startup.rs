//! Startup code: top-level values of one source file.
//!
//! Every file gets at most one synthesized static type,
//! `StartupCode$<assembly>$<file>`. Each translated top-level value becomes
//!
//! - a static field holding the value,
//! - a `FieldInit` statement in the type's static initializer, in source order,
//! - an inline getter `get_<name>` that runs the initializer once and reads the field,
//! - an inline setter `set_<name>` when the value is mutable.
//!
//! Values marked `Constant` become an inline literal getter without a field.
//! The type is only produced if at least one value was added.

use jsxlate_core::{
    BindingDecl, ClassKind, CompileError, Expr, MemberSignature, MethodKind, NotResolvedClass,
    NotResolvedMember, NotResolvedMethod, Span, Statement, TypeHash,
};
use tracing::trace;

use crate::annotation::{Annotation, MemberKind};
use crate::passes::validate_body;

/// Collects the top-level values of one source file.
pub struct StartupBuilder {
    name: String,
    hash: TypeHash,
    class: Option<NotResolvedClass>,
    statements: Vec<Statement>,
}

impl StartupBuilder {
    pub fn new(assembly: &str, file: &str) -> Self {
        let name = startup_type_name(assembly, file);
        let hash = TypeHash::from_name(&name);
        Self {
            name,
            hash,
            class: None,
            statements: Vec::new(),
        }
    }

    /// Identity of the synthesized type.
    pub fn type_hash(&self) -> TypeHash {
        self.hash
    }

    /// Add one top-level value.
    ///
    /// Values without a translation kind are skipped. Kinds other than
    /// `JavaScript` and `Constant` cannot apply to a value.
    pub fn add_binding(&mut self, binding: &BindingDecl, ann: &Annotation) -> Result<(), CompileError> {
        match &ann.kind {
            None => Ok(()),
            Some(MemberKind::JavaScript) => self.add_field(binding, ann),
            Some(MemberKind::Constant(value)) => {
                let getter = self.getter(binding, ann, Expr::Literal(value.clone()));
                self.class_mut(binding.span).add_member(getter, binding.span)
            }
            Some(MemberKind::AttributeConflict(message)) => Err(CompileError::AttributeConflict {
                member: binding.name.clone(),
                message: message.clone(),
                span: binding.span,
            }),
            Some(other) => Err(CompileError::IllegalKindForSlot {
                kind: other.name().to_string(),
                member: binding.name.clone(),
                reason: "top-level values can only be translated or constant".to_string(),
                span: binding.span,
            }),
        }
    }

    fn add_field(&mut self, binding: &BindingDecl, ann: &Annotation) -> Result<(), CompileError> {
        validate_body(&binding.name, &binding.value, binding.span)?;
        let owner = self.hash;
        let field = binding.name.clone();

        let read = Expr::Sequence(vec![
            Expr::StaticInit(owner),
            Expr::StaticFieldGet {
                owner,
                field: field.clone(),
            },
        ]);
        let getter = self.getter(binding, ann, read);
        let setter = binding.mutable.then(|| {
            let write = Expr::Sequence(vec![
                Expr::StaticInit(owner),
                Expr::StaticFieldSet {
                    owner,
                    field: field.clone(),
                    value: Box::new(Expr::Hole(0)),
                },
            ]);
            NotResolvedMember::Method {
                signature: MemberSignature::setter(&binding.name, binding.ty.clone()),
                method: NotResolvedMethod::new(MethodKind::Inline, write)
                    .with_params(vec!["value".to_string()])
                    .with_static(true)
                    .with_span(binding.span),
            }
        });

        let class = self.class_mut(binding.span);
        class.add_member(
            NotResolvedMember::Field {
                name: field.clone(),
                is_static: true,
                is_optional: false,
                ty: binding.ty.clone(),
            },
            binding.span,
        )?;
        class.add_member(getter, binding.span)?;
        if let Some(setter) = setter {
            class.add_member(setter, binding.span)?;
        }

        trace!(startup = %self.name, field = %field, "top-level value added");
        self.statements.push(Statement::FieldInit {
            field,
            value: binding.value.clone(),
        });
        Ok(())
    }

    fn getter(&self, binding: &BindingDecl, ann: &Annotation, body: Expr) -> NotResolvedMember {
        NotResolvedMember::Method {
            signature: MemberSignature::getter(&binding.name, binding.ty.clone()),
            method: NotResolvedMethod::new(MethodKind::Inline, body)
                .with_static(true)
                .with_pure(ann.is_pure)
                .with_name(ann.name.clone())
                .with_span(binding.span),
        }
    }

    fn class_mut(&mut self, span: Span) -> &mut NotResolvedClass {
        let (name, hash) = (&self.name, self.hash);
        self.class.get_or_insert_with(|| {
            NotResolvedClass::new(name.clone(), hash, ClassKind::StaticModule).with_span(span)
        })
    }

    /// The synthesized type, if any value was added.
    pub fn finish(self) -> Option<NotResolvedClass> {
        let mut class = self.class?;
        if !self.statements.is_empty() {
            class
                .members
                .push(NotResolvedMember::StaticInitializer(self.statements));
        }
        Some(class)
    }
}

/// `StartupCode$<assembly>$<file>`, with the file's path separators and
/// extension folded into identifier characters.
pub fn startup_type_name(assembly: &str, file: &str) -> String {
    let stem = file
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.contains(['/', '\\']))
        .map_or(file, |(stem, _)| stem);
    format!("StartupCode${}${}", sanitize(assembly), sanitize(stem))
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlate_core::{Attribute, Literal, TypeRef, well_known};

    use crate::annotation::{Annotation, compose};

    fn js() -> Annotation {
        compose(
            &compose(&Annotation::default(), &[Attribute::JavaScript(true)]),
            &[],
        )
    }

    fn int_binding(name: &str, value: i64) -> BindingDecl {
        BindingDecl::new(name, TypeRef::named(well_known::INT32), Expr::int(value))
    }

    #[test]
    fn type_name_is_deterministic() {
        assert_eq!(startup_type_name("Web", "src/Main.fs"), "StartupCode$Web$src_Main");
        assert_eq!(startup_type_name("My.App", "Util"), "StartupCode$My_App$Util");
        assert_eq!(startup_type_name("A", "dir.x/File"), "StartupCode$A$dir_x_File");
    }

    #[test]
    fn no_bindings_no_type() {
        let builder = StartupBuilder::new("A", "Main.fs");
        assert!(builder.finish().is_none());
    }

    #[test]
    fn untranslated_bindings_are_skipped() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        builder
            .add_binding(&int_binding("x", 1), &Annotation::default())
            .unwrap();
        assert!(builder.finish().is_none());
    }

    #[test]
    fn field_getter_and_initializer() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        let hash = builder.type_hash();
        builder.add_binding(&int_binding("x", 1), &js()).unwrap();
        builder.add_binding(&int_binding("y", 2), &js()).unwrap();
        let class = builder.finish().unwrap();

        assert_eq!(class.kind, ClassKind::StaticModule);
        assert_eq!(class.fields().count(), 2);
        let getter = class
            .method(&MemberSignature::getter("x", TypeRef::named(well_known::INT32)))
            .unwrap();
        assert_eq!(getter.kind, MethodKind::Inline);
        assert!(getter.body.any(&|e| *e == Expr::StaticInit(hash)));

        let init = class.static_initializer().unwrap();
        let fields: Vec<_> = init
            .iter()
            .map(|s| match s {
                Statement::FieldInit { field, .. } => field.as_str(),
                Statement::Expr(_) => "",
            })
            .collect();
        assert_eq!(fields, vec!["x", "y"]);
    }

    #[test]
    fn mutable_values_get_a_setter() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        builder
            .add_binding(&int_binding("counter", 0).mutable(), &js())
            .unwrap();
        let class = builder.finish().unwrap();
        assert!(
            class
                .method(&MemberSignature::setter("counter", TypeRef::named(well_known::INT32)))
                .is_some()
        );
    }

    #[test]
    fn constant_binding_has_no_field() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        let ann = compose(&js(), &[Attribute::Constant(Literal::Int(3))]);
        builder.add_binding(&int_binding("three", 0), &ann).unwrap();
        let class = builder.finish().unwrap();
        assert_eq!(class.fields().count(), 0);
        assert!(class.static_initializer().is_none());
        let getter = class
            .method(&MemberSignature::getter("three", TypeRef::named(well_known::INT32)))
            .unwrap();
        assert_eq!(getter.body, Expr::int(3));
    }

    #[test]
    fn other_kinds_are_illegal() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        let ann = compose(&js(), &[Attribute::Stub]);
        let err = builder.add_binding(&int_binding("x", 0), &ann).unwrap_err();
        assert!(matches!(err, CompileError::IllegalKindForSlot { .. }));
    }

    #[test]
    fn duplicate_names_are_reported() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        builder.add_binding(&int_binding("x", 1), &js()).unwrap();
        let err = builder.add_binding(&int_binding("x", 2), &js()).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateMember { .. }));
    }

    #[test]
    fn invalid_value_is_a_translation_failure() {
        let mut builder = StartupBuilder::new("A", "Main.fs");
        let bad = BindingDecl::new("x", TypeRef::named(well_known::INT32), Expr::Hole(0));
        let err = builder.add_binding(&bad, &js()).unwrap_err();
        assert!(matches!(err, CompileError::TranslationFailure { .. }));
    }
}
