use crate::doc::DocComment;
use crate::method::MethodModel;
use indexmap::IndexSet;
use smol_str::SmolStr;

/// Superclass names that mean "no generated parent".
const ROOT_CLASSES: &[&str] = &["NSObject", "NSProxy"];

/// An `@property` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyModel {
    pub name: SmolStr,
    pub native_type: String,
    pub readonly: bool,
    pub nullable: bool,
    /// Raw attribute list, e.g. `nonatomic`, `copy`, `getter=isHidden`.
    pub attributes: Vec<SmolStr>,
    pub is_class: bool,
    pub getter: Option<SmolStr>,
    pub setter: Option<SmolStr>,
    pub availability: Option<String>,
    pub doc: String,
}

impl PropertyModel {
    pub fn new(name: impl Into<SmolStr>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            readonly: false,
            nullable: false,
            attributes: Vec::new(),
            is_class: false,
            getter: None,
            setter: None,
            availability: None,
            doc: String::new(),
        }
    }

    /// Best-effort fallback used when a declaration cannot be parsed.
    pub fn placeholder() -> Self {
        Self::new("", "id")
    }

    pub fn getter_selector(&self) -> SmolStr {
        self.getter.clone().unwrap_or_else(|| self.name.clone())
    }

    /// `setter=` override, or `setName:` by convention.
    pub fn setter_selector(&self) -> SmolStr {
        if let Some(setter) = &self.setter {
            return setter.clone();
        }
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => format!("set{}{}:", first.to_ascii_uppercase(), chars.as_str()).into(),
            None => SmolStr::default(),
        }
    }

    pub fn apply_doc(&mut self, doc: &DocComment) {
        self.doc = doc.description.clone();
    }
}

/// An `@interface` with everything declared for it in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassModel {
    pub name: SmolStr,
    pub superclass: Option<SmolStr>,
    pub protocols: IndexSet<SmolStr>,
    pub properties: Vec<PropertyModel>,
    pub methods: Vec<MethodModel>,
    pub doc: String,
    pub availability: Option<String>,
}

impl ClassModel {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            protocols: IndexSet::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            doc: String::new(),
            availability: None,
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<SmolStr>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Superclass that should be generated as a parent, if any.
    pub fn parent(&self) -> Option<&str> {
        self.superclass
            .as_deref()
            .filter(|name| !ROOT_CLASSES.contains(name))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn member_count(&self) -> usize {
        self.properties.len() + self.methods.len()
    }

    /// Fold a later declaration of the same class (a category, or the same
    /// interface seen in another header) into this one.
    pub fn merge(&mut self, other: ClassModel) {
        if self.superclass.is_none() {
            self.superclass = other.superclass;
        }
        self.protocols.extend(other.protocols);
        if self.doc.is_empty() {
            self.doc = other.doc;
        }
        if self.availability.is_none() {
            self.availability = other.availability;
        }
        self.properties.extend(other.properties);
        self.methods.extend(other.methods);
    }
}
