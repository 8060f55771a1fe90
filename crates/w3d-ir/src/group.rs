use serde::{Deserialize, Serialize};

/// A named collection of entities, optionally including other groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Member entity names, in declaration order.
    #[serde(default)]
    pub objects: Vec<String>,
    /// Nested group names. Their members follow `objects` when flattened.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Builder: add member entities.
    pub fn with_objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects.extend(objects.into_iter().map(Into::into));
        self
    }

    /// Builder: nest another group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// True if the group declares no members at all, directly or by nesting.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.groups.is_empty()
    }
}
