//! PxWeb table listing and table metadata responses.

use serde::{Deserialize, Serialize};

/// Kind of a node in the PxWeb table tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A folder (PxWeb "level").
    #[default]
    #[serde(rename = "l")]
    Folder,
    /// A data table.
    #[serde(rename = "t")]
    Table,
}

/// One entry of a table listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    /// Node identifier, e.g. `vaerak` or `statfin_vaerak_pxt_11ra.px`.
    #[serde(default)]
    pub id: String,
    /// Display text.
    #[serde(default)]
    pub text: String,
    /// Folder or table.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Last update timestamp, tables only.
    #[serde(default)]
    pub updated: Option<String>,
    /// Path segments from the root, this node included.
    #[serde(default)]
    pub path: Vec<String>,
}

impl TableNode {
    /// Records the listing path this node was found under.
    #[must_use]
    pub fn under(mut self, parent: &str) -> Self {
        self.path = parent
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !self.id.is_empty() {
            self.path.push(self.id.clone());
        }
        self
    }

    /// Path usable in a follow-up request.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.path.join("/")
    }

    /// Returns true for data tables.
    #[must_use]
    pub fn is_table(&self) -> bool {
        self.kind == NodeKind::Table
    }

    /// Returns true for folders.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// A selectable value of a table variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableValue {
    /// Value code.
    pub code: String,
    /// Display text. Falls back to the code.
    pub text: String,
}

/// A table variable (dimension) as described by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableVariable {
    /// Variable code, e.g. `Alue`.
    #[serde(default)]
    pub code: String,
    /// Display text.
    #[serde(default)]
    pub text: String,
    /// Value codes.
    #[serde(default)]
    pub values: Vec<String>,
    /// Value display texts, parallel to `values`.
    #[serde(default)]
    pub value_texts: Vec<String>,
    /// Whether the variable may be left out of a query.
    #[serde(default)]
    pub elimination: bool,
    /// Whether this is the time variable.
    #[serde(default)]
    pub time: bool,
}

impl TableVariable {
    /// Values paired with their texts.
    #[must_use]
    pub fn value_list(&self) -> Vec<VariableValue> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, code)| VariableValue {
                code: code.clone(),
                text: self.value_texts.get(i).unwrap_or(code).clone(),
            })
            .collect()
    }
}

/// Structure of a table: its variables and their values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table path this metadata was fetched for.
    #[serde(default)]
    pub table_id: String,
    /// Table title.
    #[serde(default)]
    pub title: String,
    /// Variables in query order.
    #[serde(default)]
    pub variables: Vec<TableVariable>,
    /// Data source.
    #[serde(default)]
    pub source: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: Option<String>,
}

impl TableMetadata {
    /// Finds a variable by code.
    #[must_use]
    pub fn variable(&self, code: &str) -> Option<&TableVariable> {
        self.variables.iter().find(|v| v.code == code)
    }

    /// The variable flagged as time, if any.
    #[must_use]
    pub fn time_variable(&self) -> Option<&TableVariable> {
        self.variables.iter().find(|v| v.time)
    }
}
