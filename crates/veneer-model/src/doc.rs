use indexmap::IndexMap;

/// A parsed documentation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: String,
    /// Parameter name to description, in the order the tags appeared.
    pub params: IndexMap<String, String>,
    pub returns: String,
}

impl DocComment {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}
