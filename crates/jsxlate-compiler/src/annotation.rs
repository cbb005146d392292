//! Attribute classification.
//!
//! Turns the raw attribute list of a type or member into one normalized
//! [`Annotation`]. A member's annotation is always computed with
//! [`compose`], which combines its own attributes with the annotation of the
//! enclosing type:
//!
//! ```text
//! type  [JavaScript]          -> members default to JavaScript
//! type  [Stub]                -> members default to Stub
//! member [JavaScript(false)]  -> opted out, emits nothing
//! member [Inline "..."]       -> own kind, wins over the inherited default
//! member [Inline; Stub]       -> AttributeConflict, reported when translated
//! ```
//!
//! Classification never fails. Conflicts are carried inside the annotation
//! so the remaining members of the type are still classified.

use jsxlate_core::{Attribute, Literal, MacroAnnotation, TypeRef};

/// How a member is represented in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// Marker that must not be invoked at runtime.
    NoFallback,
    /// Code template substituted at each call site.
    Inline(String),
    /// Code template materialized as a callable.
    Direct(String),
    /// Inline member returning a literal.
    Constant(Literal),
    /// Translated from its source body.
    JavaScript,
    /// Translated from its source body and substituted at call sites.
    InlineJavaScript,
    /// Property accessor backed by an optional slot.
    OptionalField,
    /// Forwards to an externally named function or constructor.
    Stub,
    /// Dispatched to a server through a remote handle.
    Remote(Option<String>),
    /// Body produced later by a generator.
    Generated {
        generator: TypeRef,
        parameter: Option<Literal>,
    },
    /// Two recognized kinds were requested at once.
    AttributeConflict(String),
}

impl MemberKind {
    /// Attribute spelling, used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            MemberKind::NoFallback => "NoFallback",
            MemberKind::Inline(_) => "Inline",
            MemberKind::Direct(_) => "Direct",
            MemberKind::Constant(_) => "Constant",
            MemberKind::JavaScript => "JavaScript",
            MemberKind::InlineJavaScript => "Inline",
            MemberKind::OptionalField => "OptionalField",
            MemberKind::Stub => "Stub",
            MemberKind::Remote(_) => "Remote",
            MemberKind::Generated { .. } => "Generated",
            MemberKind::AttributeConflict(_) => "conflict",
        }
    }

    /// Kinds a setter takes over from its getter.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, MemberKind::InlineJavaScript | MemberKind::OptionalField)
    }

    /// Kinds that need a concrete, statically known target.
    ///
    /// These cannot fill an abstract or interface slot, because callers
    /// dispatch through the slot rather than the member.
    pub fn needs_concrete_slot(&self) -> bool {
        matches!(
            self,
            MemberKind::Inline(_)
                | MemberKind::Direct(_)
                | MemberKind::Constant(_)
                | MemberKind::NoFallback
                | MemberKind::InlineJavaScript
        )
    }
}

/// Normalized annotation of a type or member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Effective kind, own or inherited.
    pub kind: Option<MemberKind>,
    /// The kind came from the declaration's own attributes.
    pub has_own_kind: bool,
    /// `JavaScript(false)`: excluded from translation.
    pub opted_out: bool,
    /// `Name` override.
    pub name: Option<String>,
    /// Required resources.
    pub requires: Vec<TypeRef>,
    pub macros: Vec<MacroAnnotation>,
    pub is_pure: bool,
    pub is_entry_point: bool,
    /// Target of a proxy type.
    pub proxy_of: Option<TypeRef>,
    /// Date-time format hints by field name.
    pub date_formats: Vec<(String, String)>,
}

impl Annotation {
    /// Whether the declaration is translated from its source.
    pub fn is_javascript(&self) -> bool {
        matches!(
            self.kind,
            Some(MemberKind::JavaScript | MemberKind::InlineJavaScript)
        )
    }

    /// The kind members inherit from a type with this annotation.
    pub fn member_default(&self) -> Option<MemberKind> {
        match self.kind {
            Some(MemberKind::JavaScript | MemberKind::InlineJavaScript) => {
                Some(MemberKind::JavaScript)
            }
            Some(MemberKind::Stub) => Some(MemberKind::Stub),
            _ => None,
        }
    }

    /// Date-time format hint for a field.
    pub fn date_format(&self, field: &str) -> Option<&str> {
        self.date_formats
            .iter()
            .rev()
            .find(|(f, _)| f == field)
            .map(|(_, format)| format.as_str())
    }

    /// Take over kind and name from the paired getter of a setter.
    ///
    /// Applies only when the setter has no kind of its own and the getter
    /// was classified as a passthrough kind.
    pub fn with_getter(mut self, getter: &Annotation) -> Self {
        if self.has_own_kind || self.opted_out {
            return self;
        }
        if let Some(kind) = getter.kind.as_ref().filter(|k| k.is_passthrough()) {
            self.kind = Some(kind.clone());
            if self.name.is_none() {
                self.name = getter.name.clone();
            }
        }
        self
    }
}

/// Classify a declaration's own attributes, ignoring any enclosing scope.
pub fn classify(attributes: &[Attribute]) -> Annotation {
    let mut ann = Annotation::default();
    let mut javascript = false;
    let mut opted_out = false;
    let mut kinds: Vec<MemberKind> = Vec::new();

    let mut push = |kind: MemberKind| {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    };

    for attr in attributes {
        match attr {
            Attribute::JavaScript(true) => javascript = true,
            Attribute::JavaScript(false) => opted_out = true,
            Attribute::Inline(None) => push(MemberKind::InlineJavaScript),
            Attribute::Inline(Some(code)) => push(MemberKind::Inline(code.clone())),
            Attribute::Direct(code) => push(MemberKind::Direct(code.clone())),
            Attribute::Constant(value) => push(MemberKind::Constant(value.clone())),
            Attribute::Stub => push(MemberKind::Stub),
            Attribute::NoFallback => push(MemberKind::NoFallback),
            Attribute::OptionalField => push(MemberKind::OptionalField),
            Attribute::Remote(policy) => push(MemberKind::Remote(policy.clone())),
            Attribute::Generated {
                generator,
                parameter,
            } => push(MemberKind::Generated {
                generator: generator.clone(),
                parameter: parameter.clone(),
            }),
            Attribute::Name(name) => ann.name = Some(name.clone()),
            Attribute::Require(resource) => ann.requires.push(resource.clone()),
            Attribute::Macro {
                macro_type,
                parameter,
            } => ann.macros.push(MacroAnnotation {
                macro_type: macro_type.clone(),
                parameter: parameter.clone(),
            }),
            Attribute::Pure => ann.is_pure = true,
            Attribute::EntryPoint => ann.is_entry_point = true,
            Attribute::Proxy(target) => ann.proxy_of = Some(target.clone()),
            Attribute::DateTimeFormat { field, format } => {
                ann.date_formats.push((field.clone(), format.clone()))
            }
            Attribute::Other(_) => {}
        }
    }

    ann.kind = match kinds.as_slice() {
        [] => javascript.then_some(MemberKind::JavaScript),
        [kind] => Some(kind.clone()),
        [first, second, ..] => Some(MemberKind::AttributeConflict(format!(
            "'{}' cannot be combined with '{}'",
            first.name(),
            second.name()
        ))),
    };
    ann.has_own_kind = ann.kind.is_some();
    ann.opted_out = opted_out && ann.kind.is_none();
    ann
}

/// Compose a declaration's own attributes with its enclosing annotation.
///
/// Own recognized kinds win outright. Without one, the declaration takes the
/// enclosing type's member default unless it opted out.
pub fn compose(parent: &Annotation, attributes: &[Attribute]) -> Annotation {
    let mut ann = classify(attributes);
    if ann.kind.is_none() && !ann.opted_out {
        ann.kind = parent.member_default();
    }
    ann
}
