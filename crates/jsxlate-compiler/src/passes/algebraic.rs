//! Synthesized members of unions and records.
//!
//! # Unions
//!
//! ```text
//! type Shape =
//!     | Empty                 -> null            (first field-less case, few cases)
//!     | [<Constant 0>] Zero   -> 0
//!     | Circle of r: float    -> { $: 2, r: ... }
//! ```
//!
//! Each case gets a static factory `New<Case>`, each tagged field a getter,
//! and the type an instance `get_Tag` that maps a value back to its case.
//!
//! # Records
//!
//! One constructor taking the fields in declaration order. Fields marked
//! `OptionalField` whose type is an option are omitted from the object when
//! absent. Every field gets an inline getter; mutable fields a setter.

use jsxlate_core::{
    AlgebraicShape, BinaryOp, CaseFieldInfo, CaseRepresentation, Expr, Literal, MemberSignature,
    MethodKind, NotResolvedMember, NotResolvedMethod, RecordField, RecordFieldInfo, TypeRef,
    UnionCase, UnionCaseInfo, well_known,
};

use crate::CompilerOptions;
use crate::annotation::{Annotation, MemberKind, classify};

/// Field of a tagged union value holding the case tag.
pub const TAG_FIELD: &str = "$";

/// Members and shape produced for one algebraic type.
#[derive(Debug, Clone)]
pub struct Augmented {
    pub members: Vec<NotResolvedMember>,
    pub shape: AlgebraicShape,
}

impl Augmented {
    fn push(&mut self, member: NotResolvedMember) {
        let key = member.key();
        if !self.members.iter().any(|m| m.key() == key) {
            self.members.push(member);
        }
    }
}

/// Builds the synthesized members of one algebraic type.
pub struct AlgebraicAugmenter<'a> {
    options: &'a CompilerOptions,
    /// The type being augmented.
    ty: TypeRef,
    /// Annotation of the type, for date-time format hints.
    annotation: &'a Annotation,
}

impl<'a> AlgebraicAugmenter<'a> {
    pub fn new(options: &'a CompilerOptions, ty: TypeRef, annotation: &'a Annotation) -> Self {
        Self {
            options,
            ty,
            annotation,
        }
    }

    // ==========================================================================
    // Unions
    // ==========================================================================

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn union(&self, cases: &[UnionCase]) -> Augmented {
        let infos = self.case_representations(cases);
        let mut out = Augmented {
            members: Vec::new(),
            shape: AlgebraicShape::Union(Vec::new()),
        };

        out.push(inline(
            MemberSignature::getter("Tag", TypeRef::named(well_known::INT32)),
            tag_body(&infos),
            Vec::new(),
            false,
        ));

        for (case, info) in cases.iter().zip(&infos) {
            let params: Vec<String> = case.fields.iter().map(|f| f.name.clone()).collect();
            let signature = MemberSignature::new(
                format!("New{}", case.name),
                case.fields.iter().map(|f| f.ty.clone()).collect(),
                self.ty.clone(),
            );
            out.push(inline(signature, factory_body(info), params, true));

            if let CaseRepresentation::Tagged(fields) = &info.representation {
                for field in fields {
                    out.push(inline(
                        MemberSignature::getter(&field.name, field.ty.clone()),
                        Expr::field(Expr::Hole(0), &field.name),
                        Vec::new(),
                        false,
                    ));
                }
            }
        }

        out.shape = AlgebraicShape::Union(infos);
        out
    }

    /// Representation of every case, in declaration order.
    pub fn case_representations(&self, cases: &[UnionCase]) -> Vec<UnionCaseInfo> {
        let constants: Vec<_> = cases
            .iter()
            .map(|case| match classify(&case.attributes).kind {
                Some(MemberKind::Constant(value)) => Some(value),
                _ => None,
            })
            .collect();

        // A case declared `Constant(null)` already owns null.
        let explicit_null = constants.iter().any(|c| c == &Some(Literal::Null));
        let null_case = (!explicit_null
            && cases.len() < self.options.null_representation_case_limit)
            .then(|| {
                cases
                    .iter()
                    .zip(&constants)
                    .position(|(case, constant)| case.fields.is_empty() && constant.is_none())
            })
            .flatten();

        cases
            .iter()
            .zip(constants)
            .enumerate()
            .map(|(tag, (case, constant))| {
                let representation = match constant {
                    Some(value) => CaseRepresentation::Constant(value),
                    None if null_case == Some(tag) => CaseRepresentation::Null,
                    None => CaseRepresentation::Tagged(
                        case.fields
                            .iter()
                            .map(|f| CaseFieldInfo {
                                name: f.name.clone(),
                                ty: f.ty.clone(),
                                date_format: self.annotation.date_format(&f.name).map(str::to_string),
                            })
                            .collect(),
                    ),
                };
                UnionCaseInfo {
                    name: case.name.clone(),
                    tag,
                    representation,
                }
            })
            .collect()
    }

    // ==========================================================================
    // Records
    // ==========================================================================

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn record(&self, fields: &[RecordField]) -> Augmented {
        let infos: Vec<RecordFieldInfo> = fields.iter().map(|f| self.record_field(f)).collect();
        let mut out = Augmented {
            members: Vec::new(),
            shape: AlgebraicShape::Record(Vec::new()),
        };

        let constructor = NotResolvedMember::Constructor {
            signature: MemberSignature::constructor(fields.iter().map(|f| f.ty.clone()).collect()),
            method: NotResolvedMethod::new(MethodKind::Inline, self.record_body(&infos))
                .with_params(infos.iter().map(|f| f.name.clone()).collect())
                .with_static(true),
        };
        out.push(constructor);

        for field in &infos {
            let name = Expr::string(&field.name);
            let read = if field.is_optional {
                Expr::apply(
                    Expr::global(self.options.get_optional()),
                    vec![Expr::Hole(0), name.clone()],
                )
            } else {
                Expr::field(Expr::Hole(0), &field.name)
            };
            out.push(inline(
                MemberSignature::getter(&field.name, field.ty.clone()),
                read,
                Vec::new(),
                false,
            ));

            if field.is_mutable {
                let write = if field.is_optional {
                    Expr::apply(
                        Expr::global(self.options.set_optional()),
                        vec![Expr::Hole(0), name, Expr::Hole(1)],
                    )
                } else {
                    Expr::FieldSet {
                        obj: Box::new(Expr::Hole(0)),
                        field: field.name.clone(),
                        value: Box::new(Expr::Hole(1)),
                    }
                };
                out.push(inline(
                    MemberSignature::setter(&field.name, field.ty.clone()),
                    write,
                    vec!["value".to_string()],
                    false,
                ));
            }
        }

        out.shape = AlgebraicShape::Record(infos);
        out
    }

    fn record_field(&self, field: &RecordField) -> RecordFieldInfo {
        let own = classify(&field.attributes);
        let marked_optional = matches!(own.kind, Some(MemberKind::OptionalField));
        let date_format = own
            .date_format(&field.name)
            .or_else(|| self.annotation.date_format(&field.name))
            .map(str::to_string);
        RecordFieldInfo {
            name: field.name.clone(),
            ty: field.ty.clone(),
            is_optional: marked_optional && field.ty.is_option(),
            is_mutable: field.mutable,
            date_format,
        }
    }

    /// Object literal of the required fields, then one conditional set per
    /// optional field.
    fn record_body(&self, fields: &[RecordFieldInfo]) -> Expr {
        let object = Expr::Object(
            fields
                .iter()
                .enumerate()
                .filter(|(_, f)| !f.is_optional)
                .map(|(i, f)| (f.name.clone(), Expr::Hole(i)))
                .collect(),
        );
        if !fields.iter().any(|f| f.is_optional) {
            return object;
        }

        let mut steps: Vec<Expr> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_optional)
            .map(|(i, f)| {
                Expr::apply(
                    Expr::global(self.options.set_optional()),
                    vec![Expr::var("r"), Expr::string(&f.name), Expr::Hole(i)],
                )
            })
            .collect();
        steps.push(Expr::var("r"));
        Expr::let_in("r", object, Expr::Sequence(steps))
    }
}

fn inline(
    signature: MemberSignature,
    body: Expr,
    params: Vec<String>,
    is_static: bool,
) -> NotResolvedMember {
    let method = NotResolvedMethod::new(MethodKind::Inline, body)
        .with_params(params)
        .with_static(is_static)
        .with_pure(true);
    NotResolvedMember::Method { signature, method }
}

fn tag_body(cases: &[UnionCaseInfo]) -> Expr {
    let is = |value: Expr| Expr::binary(BinaryOp::StrictEq, Expr::Hole(0), value);
    let tag = |t: usize| Expr::int(t as i64);

    let mut body = Expr::field(Expr::Hole(0), TAG_FIELD);
    for case in cases.iter().rev() {
        if let CaseRepresentation::Constant(value) = &case.representation {
            body = Expr::conditional(is(Expr::Literal(value.clone())), tag(case.tag), body);
        }
    }
    if let Some(case) = cases
        .iter()
        .find(|c| c.representation == CaseRepresentation::Null)
    {
        body = Expr::conditional(is(Expr::null()), tag(case.tag), body);
    }
    body
}

fn factory_body(case: &UnionCaseInfo) -> Expr {
    match &case.representation {
        CaseRepresentation::Constant(value) => Expr::Literal(value.clone()),
        CaseRepresentation::Null => Expr::null(),
        CaseRepresentation::Tagged(fields) => {
            let mut object = vec![(TAG_FIELD.to_string(), Expr::int(case.tag as i64))];
            object.extend(
                fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (f.name.clone(), Expr::Hole(i))),
            );
            Expr::Object(object)
        }
    }
}
