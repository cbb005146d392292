//! Compiler configuration.

use jsxlate_core::well_known;

/// Options for one assembly translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Identity of the assembly being translated. Used for remote handles
    /// and startup type names.
    pub assembly_name: String,
    /// A union claims the null representation only if it has fewer cases
    /// than this.
    pub null_representation_case_limit: usize,
    /// The type every class ultimately derives from. Its virtual members
    /// cannot be overridden with call-site substituted kinds.
    pub universal_base_type: String,
    /// Namespace of the optional-field primitives.
    pub runtime_namespace: String,
    /// Namespace of the remote dispatch primitives.
    pub remoting_namespace: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            assembly_name: "Assembly".to_string(),
            null_representation_case_limit: 4,
            universal_base_type: well_known::OBJECT.to_string(),
            runtime_namespace: "Runtime".to_string(),
            remoting_namespace: "Remoting".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.assembly_name = name.into();
        self
    }

    pub fn with_null_representation_case_limit(mut self, limit: usize) -> Self {
        self.null_representation_case_limit = limit;
        self
    }

    pub fn with_universal_base_type(mut self, name: impl Into<String>) -> Self {
        self.universal_base_type = name.into();
        self
    }

    pub fn with_runtime_namespace(mut self, ns: impl Into<String>) -> Self {
        self.runtime_namespace = ns.into();
        self
    }

    pub fn with_remoting_namespace(mut self, ns: impl Into<String>) -> Self {
        self.remoting_namespace = ns.into();
        self
    }

    /// Global name of the primitive that reads an optional slot.
    pub fn get_optional(&self) -> String {
        format!("{}.GetOptional", self.runtime_namespace)
    }

    /// Global name of the primitive that writes an optional slot.
    pub fn set_optional(&self) -> String {
        format!("{}.SetOptional", self.runtime_namespace)
    }

    /// Global name of a remote dispatch primitive.
    pub fn remote_primitive(&self, primitive: &str) -> String {
        format!("{}.{primitive}", self.remoting_namespace)
    }
}
