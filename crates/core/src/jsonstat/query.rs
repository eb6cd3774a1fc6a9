//! PxWeb data query bodies.

use serde::{Deserialize, Serialize};

use crate::dimension::closed_set;

/// Response format requested when none is given.
pub const DEFAULT_FORMAT: &str = "json-stat2";

closed_set! {
    /// How a selection picks values.
    SelectionFilter {
        /// Listed values only.
        Item => "item",
        /// Every value.
        All => "all",
    }
}

/// Values selected for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxSelection {
    /// Selection mode.
    pub filter: SelectionFilter,
    /// Value codes, `["*"]` for all.
    pub values: Vec<String>,
}

/// One variable's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxQueryItem {
    /// Variable code.
    pub code: String,
    /// Selected values.
    pub selection: PxSelection,
}

/// Requested response format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxResponseFormat {
    /// Format name, e.g. `json-stat2`.
    pub format: String,
}

impl Default for PxResponseFormat {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

/// Body of a PxWeb data request.
///
/// An empty `query` list selects every value of every variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxQuery {
    /// Per-variable selections.
    #[serde(default)]
    pub query: Vec<PxQueryItem>,
    /// Response format.
    #[serde(default)]
    pub response: PxResponseFormat,
}

impl PxQuery {
    /// A query for the whole table.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a query from `(variable, values)` selections. `["*"]` selects all.
    #[must_use]
    pub fn from_selections<I, K, V>(selections: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let query = selections
            .into_iter()
            .map(|(code, values)| {
                let values: Vec<String> = values.into_iter().map(Into::into).collect();
                let filter = if values.len() == 1 && values[0] == "*" {
                    SelectionFilter::All
                } else {
                    SelectionFilter::Item
                };
                PxQueryItem {
                    code: code.into(),
                    selection: PxSelection { filter, values },
                }
            })
            .collect();

        Self {
            query,
            response: PxResponseFormat::default(),
        }
    }

    /// Replaces the response format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.response.format = format.into();
        self
    }
}
