//! Member translation: one declared member to at most one member record.
//!
//! The dispatcher matches the member's [`MemberKind`] exhaustively. Each arm
//! produces the method kind and body:
//!
//! | Kind               | Method kind  | Body                                      |
//! |--------------------|--------------|-------------------------------------------|
//! | `NoFallback`       | `NoFallback` | empty                                     |
//! | `Inline(code)`     | `Inline`     | parsed template                           |
//! | `Direct(code)`     | `Direct`     | parsed template                           |
//! | `Constant(v)`      | `Inline`     | the literal                               |
//! | `JavaScript`       | `Callable`   | source body (`Abstract` for slots)        |
//! | `InlineJavaScript` | `Inline`     | source body, parameters turned into holes |
//! | `OptionalField`    | `Inline`     | optional-slot read or write               |
//! | `Stub`             | `Stub`       | forwarding call to an external name       |
//! | `Remote`           | `Remote`     | dispatch through the remoting primitive   |
//! | `Generated`        | `Generated`  | undefined placeholder                     |
//!
//! Failures are returned as errors; the caller records them and keeps a
//! [`placeholder`](MemberTranslator::placeholder) in place of the member.

use jsxlate_core::{
    CompileError, Expr, MemberDecl, MemberDeclKind, MemberModifiers, MethodKind,
    NotResolvedMember, NotResolvedMethod, RemoteHandle, RemoteKind, TypeHash,
};

use crate::CompilerOptions;
use crate::annotation::{Annotation, MemberKind};
use crate::passes::validate_body;
use crate::template::{TemplateParams, parse_member_template};

/// Translates the members of one type.
pub struct MemberTranslator<'a> {
    options: &'a CompilerOptions,
    owner: TypeHash,
    /// Qualified source name of the declaring type.
    owner_name: &'a str,
    /// Name stubs forward to: the type's `Name` override or its source name.
    external_name: &'a str,
}

impl<'a> MemberTranslator<'a> {
    pub fn new(
        options: &'a CompilerOptions,
        owner: TypeHash,
        owner_name: &'a str,
        external_name: &'a str,
    ) -> Self {
        Self {
            options,
            owner,
            owner_name,
            external_name,
        }
    }

    /// Translate one member. `Ok(None)` means the member emits nothing.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn translate(
        &self,
        decl: &MemberDecl,
        ann: &Annotation,
    ) -> Result<Option<NotResolvedMember>, CompileError> {
        let Some(kind) = ann.kind.as_ref() else {
            if !ann.opted_out && decl.modifiers.contains(MemberModifiers::ABSTRACT) {
                return Ok(Some(self.wrap(decl, ann, MethodKind::Abstract, Expr::Undefined)));
            }
            return Ok(None);
        };

        if kind.needs_concrete_slot() {
            self.check_slot(decl, kind)?;
        }

        let (method_kind, body) = match kind {
            MemberKind::AttributeConflict(message) => {
                return Err(CompileError::AttributeConflict {
                    member: decl.name.clone(),
                    message: message.clone(),
                    span: decl.span,
                });
            }
            MemberKind::NoFallback => (MethodKind::NoFallback, Expr::Sequence(Vec::new())),
            MemberKind::Inline(code) => (MethodKind::Inline, self.template(decl, code)?),
            MemberKind::Direct(code) => (MethodKind::Direct, self.template(decl, code)?),
            MemberKind::Constant(value) => (MethodKind::Inline, Expr::Literal(value.clone())),
            MemberKind::JavaScript => {
                if decl.modifiers.contains(MemberModifiers::ABSTRACT) {
                    (MethodKind::Abstract, Expr::Undefined)
                } else {
                    (MethodKind::Callable, source_body(decl)?)
                }
            }
            MemberKind::InlineJavaScript => {
                let body = source_body(decl)?;
                let names = param_names(decl);
                (
                    MethodKind::Inline,
                    params_to_holes(&body, &names, has_receiver(decl)),
                )
            }
            MemberKind::OptionalField => (MethodKind::Inline, self.optional_field(decl, ann)?),
            MemberKind::Stub => (MethodKind::Stub, self.stub(decl, ann)),
            MemberKind::Remote(policy) => self.remote(decl, policy.as_deref())?,
            MemberKind::Generated {
                generator,
                parameter,
            } => (
                MethodKind::Generated {
                    generator: generator.clone(),
                    parameter: parameter.clone(),
                },
                Expr::Undefined,
            ),
        };

        Ok(Some(self.wrap(decl, ann, method_kind, body)))
    }

    /// Inert stand-in for a member that failed to translate.
    pub fn placeholder(&self, decl: &MemberDecl, error: &CompileError) -> NotResolvedMember {
        let method = NotResolvedMethod::new(MethodKind::Callable, Expr::Error(error.to_string()))
            .with_params(param_names(decl))
            .with_static(decl.is_static())
            .with_span(decl.span);
        member_record(decl, method)
    }

    fn wrap(
        &self,
        decl: &MemberDecl,
        ann: &Annotation,
        kind: MethodKind,
        body: Expr,
    ) -> NotResolvedMember {
        let method = NotResolvedMethod::new(kind, body)
            .with_params(param_names(decl))
            .with_static(decl.is_static())
            .with_pure(ann.is_pure)
            .with_name(ann.name.clone())
            .with_macros(ann.macros.clone())
            .with_span(decl.span);
        member_record(decl, method)
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    /// Reject kinds that cannot fill a dispatch slot.
    fn check_slot(&self, decl: &MemberDecl, kind: &MemberKind) -> Result<(), CompileError> {
        let universal = self.options.universal_base_type.as_str();
        let reason = if decl.modifiers.contains(MemberModifiers::ABSTRACT) {
            Some("abstract members are called through their dispatch slot".to_string())
        } else if decl.modifiers.contains(MemberModifiers::INTERFACE_IMPL) {
            Some("interface implementations are called through the interface".to_string())
        } else if decl.modifiers.contains(MemberModifiers::OVERRIDE)
            && decl.overrides.as_ref().is_some_and(|b| b.name == universal)
            && self.owner_name != universal
        {
            Some(format!("overrides of '{universal}' members are called through the base slot"))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CompileError::IllegalKindForSlot {
                kind: kind.name().to_string(),
                member: decl.name.clone(),
                reason,
                span: decl.span,
            }),
            None => Ok(()),
        }
    }

    // ==========================================================================
    // Bodies
    // ==========================================================================

    fn template(&self, decl: &MemberDecl, code: &str) -> Result<Expr, CompileError> {
        let names = param_names(decl);
        let params = TemplateParams::new(!has_receiver(decl), &names);
        parse_member_template(code, &params, decl.span)
    }

    /// Read or write of an optional slot named after the property.
    fn optional_field(&self, decl: &MemberDecl, ann: &Annotation) -> Result<Expr, CompileError> {
        let property = match &decl.kind {
            MemberDeclKind::Getter { property } | MemberDeclKind::Setter { property }
                if !decl.is_static() =>
            {
                property
            }
            _ => {
                return Err(CompileError::InvalidOptionalFieldUsage {
                    member: decl.name.clone(),
                    span: decl.span,
                });
            }
        };
        let field = Expr::string(ann.name.as_deref().unwrap_or(property));

        Ok(match decl.kind {
            MemberDeclKind::Setter { .. } => Expr::apply(
                Expr::global(self.options.set_optional()),
                vec![Expr::Hole(0), field, Expr::Hole(1)],
            ),
            _ => Expr::apply(
                Expr::global(self.options.get_optional()),
                vec![Expr::Hole(0), field],
            ),
        })
    }

    /// Forwarding call to the externally named target.
    fn stub(&self, decl: &MemberDecl, ann: &Annotation) -> Expr {
        let receiver = has_receiver(decl);
        let args = holes(decl.params.len(), if receiver { 1 } else { 0 });
        let qualified = |name: &str| {
            ann.name
                .clone()
                .unwrap_or_else(|| format!("{}.{name}", self.external_name))
        };

        match &decl.kind {
            MemberDeclKind::Constructor => Expr::New {
                ctor: Box::new(Expr::global(
                    ann.name.as_deref().unwrap_or(self.external_name),
                )),
                args,
            },
            MemberDeclKind::Method if receiver => {
                let name = ann.name.as_deref().unwrap_or(&decl.name);
                Expr::apply(Expr::field(Expr::Hole(0), name), args)
            }
            MemberDeclKind::Method => Expr::apply(Expr::global(qualified(&decl.name)), args),
            MemberDeclKind::Getter { property } if receiver => {
                Expr::field(Expr::Hole(0), ann.name.as_deref().unwrap_or(property))
            }
            MemberDeclKind::Getter { property } => Expr::global(qualified(property)),
            MemberDeclKind::Setter { property } if receiver => Expr::FieldSet {
                obj: Box::new(Expr::Hole(0)),
                field: ann.name.clone().unwrap_or_else(|| property.clone()),
                value: Box::new(Expr::Hole(1)),
            },
            MemberDeclKind::Setter { property } => {
                let target = qualified(property);
                let (obj, field) = target
                    .rsplit_once('.')
                    .map_or(("globalThis", target.as_str()), |(o, f)| (o, f));
                Expr::FieldSet {
                    obj: Box::new(Expr::global(obj)),
                    field: field.to_string(),
                    value: Box::new(Expr::Hole(0)),
                }
            }
        }
    }

    /// Remote dispatch; the style depends only on the return type.
    fn remote(
        &self,
        decl: &MemberDecl,
        policy: Option<&str>,
    ) -> Result<(MethodKind, Expr), CompileError> {
        let illegal = |reason: &str| CompileError::IllegalKindForSlot {
            kind: "Remote".to_string(),
            member: decl.name.clone(),
            reason: reason.to_string(),
            span: decl.span,
        };
        if decl.kind != MemberDeclKind::Method {
            return Err(illegal("remote calls are only supported on methods"));
        }

        let kind = RemoteKind::from_return_type(&decl.return_type);
        let signature = decl.signature();
        let assembly = &self.options.assembly_name;
        let handle = RemoteHandle {
            assembly: assembly.clone(),
            id: TypeHash::from_remote(assembly, signature.member_hash(self.owner)),
        };

        let receiver = has_receiver(decl);
        let mut args = vec![
            Expr::string(handle.to_string()),
            Expr::Array(holes(decl.params.len(), usize::from(receiver))),
        ];
        match (policy, receiver) {
            (Some(policy), _) => args.push(Expr::string(policy)),
            (None, true) => args.push(Expr::Undefined),
            (None, false) => {}
        }
        // Instance remotes hand their receiver to the dispatcher last.
        if receiver {
            args.push(Expr::Hole(0));
        }
        let body = Expr::apply(
            Expr::global(self.options.remote_primitive(kind.primitive())),
            args,
        );
        Ok((MethodKind::Remote { kind, handle }, body))
    }
}

fn member_record(decl: &MemberDecl, method: NotResolvedMethod) -> NotResolvedMember {
    let signature = decl.signature();
    match decl.kind {
        MemberDeclKind::Constructor => NotResolvedMember::Constructor { signature, method },
        _ => NotResolvedMember::Method { signature, method },
    }
}

/// Whether `$0` is the receiver. Constructors have none.
fn has_receiver(decl: &MemberDecl) -> bool {
    !decl.is_static() && decl.kind != MemberDeclKind::Constructor
}

fn param_names(decl: &MemberDecl) -> Vec<String> {
    decl.params.iter().map(|p| p.name.clone()).collect()
}

fn holes(count: usize, offset: usize) -> Vec<Expr> {
    (offset..offset + count).map(Expr::Hole).collect()
}

/// The member's validated source body.
fn source_body(decl: &MemberDecl) -> Result<Expr, CompileError> {
    let Some(body) = &decl.body else {
        return Err(CompileError::TranslationFailure {
            member: decl.name.clone(),
            message: "the member has no body to translate".to_string(),
            span: decl.span,
        });
    };
    validate_body(&decl.name, body, decl.span)?;
    Ok(body.clone())
}

/// Replace parameter variables (and the receiver) with holes.
///
/// Variables rebound by an inner `let` or lambda keep their name.
pub fn params_to_holes(body: &Expr, params: &[String], receiver: bool) -> Expr {
    let offset = usize::from(receiver);
    let mut shadowed = Vec::new();
    substitute(body, params, offset, receiver, &mut shadowed)
}

fn substitute(
    expr: &Expr,
    params: &[String],
    offset: usize,
    receiver: bool,
    shadowed: &mut Vec<String>,
) -> Expr {
    let go = |e: &Expr, shadowed: &mut Vec<String>| {
        Box::new(substitute(e, params, offset, receiver, shadowed))
    };
    match expr {
        Expr::Var(name) if !shadowed.contains(name) => params
            .iter()
            .position(|p| p == name)
            .map_or_else(|| expr.clone(), |i| Expr::Hole(i + offset)),
        Expr::This if receiver => Expr::Hole(0),
        Expr::Undefined
        | Expr::This
        | Expr::Literal(_)
        | Expr::Var(_)
        | Expr::Hole(_)
        | Expr::Global(_)
        | Expr::StaticFieldGet { .. }
        | Expr::StaticInit(_)
        | Expr::Error(_) => expr.clone(),
        Expr::Let { name, value, body } => {
            let value = go(value, shadowed);
            shadowed.push(name.clone());
            let body = go(body, shadowed);
            shadowed.pop();
            Expr::Let {
                name: name.clone(),
                value,
                body,
            }
        }
        Expr::Lambda { params: bound, body } => {
            let depth = shadowed.len();
            shadowed.extend(bound.iter().cloned());
            let body = go(body, shadowed);
            shadowed.truncate(depth);
            Expr::Lambda {
                params: bound.clone(),
                body,
            }
        }
        Expr::Apply { func, args } => Expr::Apply {
            func: go(func, shadowed),
            args: args.iter().map(|a| *go(a, shadowed)).collect(),
        },
        Expr::Call {
            receiver: call_receiver,
            method,
            args,
        } => Expr::Call {
            receiver: call_receiver.as_deref().map(|r| go(r, shadowed)),
            method: method.clone(),
            args: args.iter().map(|a| *go(a, shadowed)).collect(),
        },
        Expr::New { ctor, args } => Expr::New {
            ctor: go(ctor, shadowed),
            args: args.iter().map(|a| *go(a, shadowed)).collect(),
        },
        Expr::FieldGet { obj, field } => Expr::FieldGet {
            obj: go(obj, shadowed),
            field: field.clone(),
        },
        Expr::FieldSet { obj, field, value } => Expr::FieldSet {
            obj: go(obj, shadowed),
            field: field.clone(),
            value: go(value, shadowed),
        },
        Expr::ItemGet { obj, key } => Expr::ItemGet {
            obj: go(obj, shadowed),
            key: go(key, shadowed),
        },
        Expr::StaticFieldSet {
            owner,
            field,
            value,
        } => Expr::StaticFieldSet {
            owner: *owner,
            field: field.clone(),
            value: go(value, shadowed),
        },
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => Expr::Conditional {
            cond: go(cond, shadowed),
            then: go(then, shadowed),
            otherwise: go(otherwise, shadowed),
        },
        Expr::Sequence(items) => Expr::Sequence(items.iter().map(|e| *go(e, shadowed)).collect()),
        Expr::Array(items) => Expr::Array(items.iter().map(|e| *go(e, shadowed)).collect()),
        Expr::Object(fields) => Expr::Object(
            fields
                .iter()
                .map(|(k, e)| (k.clone(), *go(e, shadowed)))
                .collect(),
        ),
        Expr::Binary { op, left, right } => Expr::Binary {
            op: *op,
            left: go(left, shadowed),
            right: go(right, shadowed),
        },
        Expr::Unary { op, operand } => Expr::Unary {
            op: *op,
            operand: go(operand, shadowed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlate_core::{Attribute, Literal, Param, TypeRef, well_known};

    use crate::annotation::compose;

    fn int() -> TypeRef {
        TypeRef::named(well_known::INT32)
    }

    fn opts() -> CompilerOptions {
        CompilerOptions::default()
    }

    fn translate(decl: &MemberDecl, attrs: &[Attribute]) -> Result<Option<NotResolvedMember>, CompileError> {
        let options = opts();
        let t = MemberTranslator::new(&options, TypeHash::from_name("App.T"), "App.T", "App.T");
        let parent = compose(&Default::default(), &[Attribute::JavaScript(true)]);
        t.translate(decl, &compose(&parent, attrs))
    }

    fn method_of(member: NotResolvedMember) -> NotResolvedMethod {
        match member {
            NotResolvedMember::Method { method, .. } | NotResolvedMember::Constructor { method, .. } => method,
            other => panic!("expected a method, got {other:?}"),
        }
    }

    fn add() -> MemberDecl {
        MemberDecl::method("Add", vec![Param::new("a", int()), Param::new("b", int())], int())
            .with_body(Expr::binary(
                jsxlate_core::BinaryOp::Add,
                Expr::var("a"),
                Expr::var("b"),
            ))
    }

    #[test]
    fn javascript_keeps_source_body() {
        let m = method_of(translate(&add(), &[]).unwrap().unwrap());
        assert_eq!(m.kind, MethodKind::Callable);
        assert_eq!(m.params, vec!["a", "b"]);
        assert!(m.body.any(&|e| *e == Expr::var("a")));
    }

    #[test]
    fn opted_out_member_emits_nothing() {
        assert!(translate(&add(), &[Attribute::JavaScript(false)]).unwrap().is_none());
    }

    #[test]
    fn inline_javascript_turns_params_into_holes() {
        let decl = add().with_modifiers(MemberModifiers::STATIC);
        let m = method_of(translate(&decl, &[Attribute::Inline(None)]).unwrap().unwrap());
        assert_eq!(m.kind, MethodKind::Inline);
        assert_eq!(
            m.body,
            Expr::binary(jsxlate_core::BinaryOp::Add, Expr::Hole(0), Expr::Hole(1))
        );
    }

    #[test]
    fn shadowed_params_stay_variables() {
        let body = Expr::let_in("a", Expr::int(1), Expr::var("a"));
        let out = params_to_holes(&body, &["a".to_string()], false);
        assert_eq!(out, body);
        let lambda = Expr::Lambda {
            params: vec!["a".into()],
            body: Box::new(Expr::var("a")),
        };
        assert_eq!(params_to_holes(&lambda, &["a".to_string()], false), lambda);
    }

    #[test]
    fn receiver_becomes_hole_zero() {
        let body = Expr::field(Expr::This, "x");
        assert_eq!(
            params_to_holes(&body, &[], true),
            Expr::field(Expr::Hole(0), "x")
        );
    }

    #[test]
    fn inline_template_instance_and_static() {
        let inst = MemberDecl::method("Push", vec![Param::new("x", int())], TypeRef::void());
        let m = method_of(
            translate(&inst, &[Attribute::Inline(Some("$this.push($x)".into()))])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(
            m.body,
            Expr::apply(Expr::field(Expr::Hole(0), "push"), vec![Expr::Hole(1)])
        );

        let stat = inst.clone().with_modifiers(MemberModifiers::STATIC);
        let m = method_of(
            translate(&stat, &[Attribute::Inline(Some("f($0)".into()))])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(m.body, Expr::apply(Expr::global("f"), vec![Expr::Hole(0)]));
    }

    #[test]
    fn direct_materializes() {
        let decl = MemberDecl::method("Now", vec![], int()).with_modifiers(MemberModifiers::STATIC);
        let m = method_of(
            translate(&decl, &[Attribute::Direct("Date.now()".into())])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(m.kind, MethodKind::Direct);
    }

    #[test]
    fn malformed_template_is_parse_failure() {
        let decl = MemberDecl::method("F", vec![], int());
        let err = translate(&decl, &[Attribute::Inline(Some("1 +".into()))]).unwrap_err();
        assert!(matches!(err, CompileError::ParseFailure { .. }));
    }

    #[test]
    fn constant_is_inline_literal() {
        let decl = MemberDecl::getter("Answer", int());
        let m = method_of(
            translate(&decl, &[Attribute::Constant(Literal::Int(42))])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(m.kind, MethodKind::Inline);
        assert_eq!(m.body, Expr::int(42));
    }

    #[test]
    fn inline_on_interface_impl_is_illegal() {
        let decl = MemberDecl::method("Run", vec![], TypeRef::void())
            .with_modifiers(MemberModifiers::INTERFACE_IMPL);
        let err = translate(&decl, &[Attribute::Inline(Some("1".into()))]).unwrap_err();
        assert!(matches!(err, CompileError::IllegalKindForSlot { .. }));
    }

    #[test]
    fn constant_on_abstract_is_illegal() {
        let decl = MemberDecl::method("Run", vec![], int())
            .with_modifiers(MemberModifiers::ABSTRACT);
        let err = translate(&decl, &[Attribute::Constant(Literal::Int(1))]).unwrap_err();
        assert!(matches!(err, CompileError::IllegalKindForSlot { .. }));
    }

    #[test]
    fn no_fallback_on_object_override_is_illegal() {
        let decl = MemberDecl::method("ToString", vec![], TypeRef::named(well_known::STRING))
            .overriding(TypeRef::named(well_known::OBJECT));
        let err = translate(&decl, &[Attribute::NoFallback]).unwrap_err();
        assert!(matches!(err, CompileError::IllegalKindForSlot { .. }));
    }

    #[test]
    fn override_of_other_base_is_allowed() {
        let decl = MemberDecl::method("Draw", vec![], TypeRef::void())
            .overriding(TypeRef::named("App.Shape"));
        let m = method_of(translate(&decl, &[Attribute::Inline(Some("0".into()))]).unwrap().unwrap());
        assert_eq!(m.kind, MethodKind::Inline);
    }

    #[test]
    fn object_itself_may_inline_its_members() {
        let options = opts();
        let t = MemberTranslator::new(
            &options,
            TypeHash::from_name(well_known::OBJECT),
            well_known::OBJECT,
            "Object",
        );
        let decl = MemberDecl::method("ToString", vec![], TypeRef::named(well_known::STRING))
            .overriding(TypeRef::named(well_known::OBJECT));
        let ann = compose(&Default::default(), &[Attribute::Inline(Some("'x'".into()))]);
        assert!(t.translate(&decl, &ann).is_ok());
    }

    #[test]
    fn abstract_slot_without_kind() {
        let decl = MemberDecl::method("Area", vec![], int()).with_modifiers(MemberModifiers::ABSTRACT);
        let options = opts();
        let t = MemberTranslator::new(&options, TypeHash::from_name("App.T"), "App.T", "App.T");
        let m = method_of(t.translate(&decl, &Annotation::default()).unwrap().unwrap());
        assert_eq!(m.kind, MethodKind::Abstract);
        assert_eq!(m.body, Expr::Undefined);

        let js = method_of(translate(&decl, &[]).unwrap().unwrap());
        assert_eq!(js.kind, MethodKind::Abstract);
    }

    #[test]
    fn member_without_kind_emits_nothing() {
        let options = opts();
        let t = MemberTranslator::new(&options, TypeHash::from_name("App.T"), "App.T", "App.T");
        assert!(t.translate(&add(), &Annotation::default()).unwrap().is_none());
    }

    #[test]
    fn optional_field_accessors() {
        let getter = MemberDecl::getter("Age", TypeRef::option(int()));
        let m = method_of(translate(&getter, &[Attribute::OptionalField]).unwrap().unwrap());
        assert_eq!(
            m.body,
            Expr::apply(
                Expr::global("Runtime.GetOptional"),
                vec![Expr::Hole(0), Expr::string("Age")]
            )
        );

        let setter = MemberDecl::setter("Age", TypeRef::option(int()));
        let m = method_of(
            translate(&setter, &[Attribute::OptionalField, Attribute::Name("age".into())])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(
            m.body,
            Expr::apply(
                Expr::global("Runtime.SetOptional"),
                vec![Expr::Hole(0), Expr::string("age"), Expr::Hole(1)]
            )
        );
    }

    #[test]
    fn optional_field_on_method_is_invalid() {
        let err = translate(&add(), &[Attribute::OptionalField]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidOptionalFieldUsage { .. }));
    }

    #[test]
    fn stub_forwards_to_override_name() {
        let decl = MemberDecl::method("Log", vec![Param::new("m", int())], TypeRef::void())
            .with_modifiers(MemberModifiers::STATIC);
        let m = method_of(
            translate(&decl, &[Attribute::Stub, Attribute::Name("console.log".into())])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(m.kind, MethodKind::Stub);
        assert_eq!(
            m.body,
            Expr::apply(Expr::global("console.log"), vec![Expr::Hole(0)])
        );
    }

    #[test]
    fn stub_without_override_uses_type_name() {
        let options = opts();
        let t = MemberTranslator::new(&options, TypeHash::from_name("App.T"), "App.T", "jQuery");
        let parent = compose(&Default::default(), &[Attribute::Stub]);
        let decl = MemberDecl::method("ajax", vec![], TypeRef::void())
            .with_modifiers(MemberModifiers::STATIC);
        let m = method_of(t.translate(&decl, &compose(&parent, &[])).unwrap().unwrap());
        assert_eq!(m.body, Expr::apply(Expr::global("jQuery.ajax"), vec![]));

        let ctor = MemberDecl::constructor(vec![Param::new("s", int())]);
        let m = method_of(t.translate(&ctor, &compose(&parent, &[])).unwrap().unwrap());
        assert_eq!(
            m.body,
            Expr::New {
                ctor: Box::new(Expr::global("jQuery")),
                args: vec![Expr::Hole(0)],
            }
        );
    }

    #[test]
    fn stub_instance_members() {
        let decl = MemberDecl::method("focus", vec![], TypeRef::void());
        let m = method_of(translate(&decl, &[Attribute::Stub]).unwrap().unwrap());
        assert_eq!(m.body, Expr::apply(Expr::field(Expr::Hole(0), "focus"), vec![]));

        let getter = MemberDecl::getter("Value", int());
        let m = method_of(
            translate(&getter, &[Attribute::Stub, Attribute::Name("value".into())])
                .unwrap()
                .unwrap(),
        );
        assert_eq!(m.body, Expr::field(Expr::Hole(0), "value"));
    }

    #[test]
    fn remote_dispatch_by_return_type() {
        let cases = [
            (TypeRef::void(), RemoteKind::Send, "Remoting.Send"),
            (
                TypeRef::generic(well_known::ASYNC, vec![int()]),
                RemoteKind::Async,
                "Remoting.Async",
            ),
            (
                TypeRef::generic(well_known::TASK_OF, vec![int()]),
                RemoteKind::Task,
                "Remoting.Task",
            ),
            (int(), RemoteKind::Sync, "Remoting.Call"),
        ];
        for (ret, expected, primitive) in cases {
            let decl = MemberDecl::method("Get", vec![Param::new("id", int())], ret)
                .with_modifiers(MemberModifiers::STATIC);
            let m = method_of(translate(&decl, &[Attribute::Remote(None)]).unwrap().unwrap());
            match &m.kind {
                MethodKind::Remote { kind, handle } => {
                    assert_eq!(*kind, expected);
                    assert_eq!(handle.assembly, "Assembly");
                }
                other => panic!("expected remote, got {other:?}"),
            }
            let Expr::Apply { func, args } = &m.body else {
                panic!("expected an application");
            };
            assert_eq!(**func, Expr::global(primitive));
            assert_eq!(args[1], Expr::Array(vec![Expr::Hole(0)]));
        }
    }

    #[test]
    fn remote_handles_differ_per_signature() {
        let get = |params: Vec<Param>| {
            let decl = MemberDecl::method("Get", params, int()).with_modifiers(MemberModifiers::STATIC);
            match method_of(translate(&decl, &[Attribute::Remote(None)]).unwrap().unwrap()).kind {
                MethodKind::Remote { handle, .. } => handle,
                other => panic!("expected remote, got {other:?}"),
            }
        };
        assert_ne!(get(vec![]), get(vec![Param::new("id", int())]));
        assert_eq!(get(vec![]), get(vec![]));
    }

    #[test]
    fn instance_remote_passes_receiver_as_handler() {
        let inst = MemberDecl::method("Get", vec![Param::new("id", int())], int());
        let m = method_of(translate(&inst, &[Attribute::Remote(None)]).unwrap().unwrap());
        let MethodKind::Remote { handle, .. } = &m.kind else {
            panic!("expected remote, got {:?}", m.kind);
        };
        assert_eq!(
            m.body,
            Expr::apply(
                Expr::global("Remoting.Call"),
                vec![
                    Expr::string(handle.to_string()),
                    Expr::Array(vec![Expr::Hole(1)]),
                    Expr::Undefined,
                    Expr::Hole(0),
                ],
            )
        );
    }

    #[test]
    fn remote_on_accessor_is_illegal() {
        let getter = MemberDecl::getter("X", int()).with_modifiers(MemberModifiers::STATIC);
        assert!(matches!(
            translate(&getter, &[Attribute::Remote(None)]).unwrap_err(),
            CompileError::IllegalKindForSlot { .. }
        ));
    }

    #[test]
    fn generated_defers_body() {
        let decl = MemberDecl::method("Render", vec![], TypeRef::void());
        let m = method_of(
            translate(
                &decl,
                &[Attribute::Generated {
                    generator: TypeRef::named("Gen.Template"),
                    parameter: Some(Literal::string("index.html")),
                }],
            )
            .unwrap()
            .unwrap(),
        );
        assert!(matches!(m.kind, MethodKind::Generated { .. }));
        assert_eq!(m.body, Expr::Undefined);
    }

    #[test]
    fn conflict_is_reported() {
        let err = translate(&add(), &[Attribute::Stub, Attribute::NoFallback]).unwrap_err();
        assert!(matches!(err, CompileError::AttributeConflict { .. }));
    }

    #[test]
    fn missing_or_invalid_body_is_translation_failure() {
        let no_body = MemberDecl::method("F", vec![], int());
        assert!(matches!(
            translate(&no_body, &[]).unwrap_err(),
            CompileError::TranslationFailure { .. }
        ));
        let bad = MemberDecl::method("F", vec![], int()).with_body(Expr::Error("x".into()));
        assert!(matches!(
            translate(&bad, &[]).unwrap_err(),
            CompileError::TranslationFailure { .. }
        ));
    }

    #[test]
    fn metadata_is_carried() {
        let decl = add().with_modifiers(MemberModifiers::STATIC);
        let m = method_of(
            translate(
                &decl,
                &[
                    Attribute::Pure,
                    Attribute::Name("plus".into()),
                    Attribute::Macro {
                        macro_type: TypeRef::named("M.Add"),
                        parameter: None,
                    },
                ],
            )
            .unwrap()
            .unwrap(),
        );
        assert!(m.is_pure && m.is_static);
        assert_eq!(m.name.as_deref(), Some("plus"));
        assert_eq!(m.macros.len(), 1);
    }

    #[test]
    fn placeholder_keeps_signature() {
        let options = opts();
        let t = MemberTranslator::new(&options, TypeHash::from_name("App.T"), "App.T", "App.T");
        let err = CompileError::TranslationFailure {
            member: "Add".into(),
            message: "boom".into(),
            span: Default::default(),
        };
        match t.placeholder(&add(), &err) {
            NotResolvedMember::Method { signature, method } => {
                assert_eq!(signature, add().signature());
                assert!(method.body.is_error());
            }
            other => panic!("expected a method, got {other:?}"),
        }
    }
}
