use std::collections::HashMap;

use spacefs_lib::Space;

/// maps raw root level names to the labels shown to the user. anything not
/// in the table is shown as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    table: HashMap<String, String>,
}

impl DisplayNames {
    /// an empty table, every name resolves to itself
    pub fn identity() -> Self {
        DisplayNames {
            table: HashMap::new(),
        }
    }

    pub fn with_label<K, L>(mut self, key: K, label: L) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        self.set(key, label);
        self
    }

    pub fn set<K, L>(&mut self, key: K, label: L)
    where
        K: Into<String>,
        L: Into<String>,
    {
        self.table.insert(key.into(), label.into());
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.table.get(name)
            .map(|v| v.as_str())
            .unwrap_or(name)
    }

    pub fn space_label(&self, space: Space) -> &str {
        self.resolve(space.key())
    }
}

impl Default for DisplayNames {
    fn default() -> Self {
        DisplayNames::identity()
            .with_label(Space::Public.key(), "Public Space")
            .with_label(Space::Group.key(), "Group Space")
            .with_label(Space::Users.key(), "My Space")
    }
}
