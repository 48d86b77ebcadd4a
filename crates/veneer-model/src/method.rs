use crate::doc::DocComment;
use smol_str::SmolStr;

/// One parameter of a method, in selector colon order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterModel {
    pub name: SmolStr,
    /// Canonical native type: nullability markers, qualifiers and pointer
    /// decoration removed.
    pub native_type: String,
    pub nullable: bool,
    pub doc: String,
}

impl ParameterModel {
    pub fn new(name: impl Into<SmolStr>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: false,
            doc: String::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// A method declaration.
///
/// The number of colons in `selector` is expected to equal `params.len()`;
/// see [`MethodModel::is_well_formed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodModel {
    /// Full colon-joined selector, e.g. `initWithFrame:`.
    pub selector: SmolStr,
    pub params: Vec<ParameterModel>,
    pub return_type: String,
    pub return_nullable: bool,
    pub is_static: bool,
    pub availability: Option<String>,
    pub doc: String,
    pub return_doc: String,
}

impl MethodModel {
    pub fn new(
        selector: impl Into<SmolStr>,
        return_type: impl Into<String>,
        is_static: bool,
    ) -> Self {
        Self {
            selector: selector.into(),
            params: Vec::new(),
            return_type: return_type.into(),
            return_nullable: false,
            is_static,
            availability: None,
            doc: String::new(),
            return_doc: String::new(),
        }
    }

    pub fn with_param(mut self, param: ParameterModel) -> Self {
        self.params.push(param);
        self
    }

    /// Selector text before the first colon.
    pub fn base_name(&self) -> &str {
        self.selector.split(':').next().unwrap_or_default()
    }

    pub fn colon_count(&self) -> usize {
        self.selector.matches(':').count()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_well_formed(&self) -> bool {
        !self.base_name().is_empty() && self.colon_count() == self.params.len()
    }

    /// `init`, `initWithFrame:`, ... but not `initialize` or `inits`.
    pub fn is_initializer(&self) -> bool {
        if self.is_static {
            return false;
        }
        match self.base_name().strip_prefix("init") {
            Some(rest) => rest.chars().next().map_or(true, |c| c.is_ascii_uppercase()),
            None => false,
        }
    }

    /// Attach documentation, resolving parameter docs by name.
    pub fn apply_doc(&mut self, doc: &DocComment) {
        self.doc = doc.description.clone();
        self.return_doc = doc.returns.clone();
        for param in &mut self.params {
            if let Some(text) = doc.param(&param.name) {
                param.doc = text.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(selector: &str, params: &[&str]) -> MethodModel {
        params.iter().fold(MethodModel::new(selector, "void", false), |m, p| {
            m.with_param(ParameterModel::new(*p, "id"))
        })
    }

    #[test]
    fn base_name_and_arity() {
        let m = method("initWithFrame:andFlags:", &["frame", "flags"]);
        assert_eq!(m.base_name(), "initWithFrame");
        assert_eq!(m.colon_count(), 2);
        assert!(m.is_well_formed());
    }

    #[test]
    fn colon_mismatch_is_not_well_formed() {
        let m = method("foo:bar:", &["a"]);
        assert!(!m.is_well_formed());
        assert!(method("shared", &[]).is_well_formed());
    }

    #[test]
    fn initializer_detection() {
        assert!(method("init", &[]).is_initializer());
        assert!(method("initWithFrame:", &["f"]).is_initializer());
        assert!(!method("initialize", &[]).is_initializer());
        let mut class_init = method("init", &[]);
        class_init.is_static = true;
        assert!(!class_init.is_initializer());
    }

    #[test]
    fn apply_doc_matches_params_by_name() {
        let mut m = method("add:to:", &["x", "y"]);
        let mut doc = DocComment {
            description: "Adds.".to_string(),
            returns: "the sum".to_string(),
            ..Default::default()
        };
        doc.params.insert("y".to_string(), "the y value".to_string());
        m.apply_doc(&doc);
        assert_eq!(m.doc, "Adds.");
        assert_eq!(m.return_doc, "the sum");
        assert_eq!(m.params[0].doc, "");
        assert_eq!(m.params[1].doc, "the y value");
    }
}
