use crate::class::ClassModel;
use indexmap::IndexMap;
use smol_str::SmolStr;
use veneer_common::Diagnostic;

/// Accumulator for one extraction run.
///
/// Owned by the caller and threaded through every extractor call. Class names
/// are unique: inserting a name that is already present merges the members
/// into the existing entry.
#[derive(Debug, Default)]
pub struct ClassSet {
    classes: IndexMap<SmolStr, ClassModel>,
    diagnostics: Vec<Diagnostic>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassModel) {
        match self.classes.get_mut(&class.name) {
            Some(existing) => {
                tracing::debug!(class = %class.name, "merging repeated interface");
                existing.merge(class);
            }
            None => {
                self.classes.insert(class.name.clone(), class);
            }
        }
    }

    /// Record a contained failure. The message is logged as well.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        match &diagnostic.help {
            Some(help) => tracing::warn!(%help, "{}", diagnostic),
            None => tracing::warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn get(&self, name: &str) -> Option<&ClassModel> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassModel> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len()
    }
}
