//! Parsed JSON-stat datasets.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::JsonStatError;

/// One value of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Position along the dimension axis.
    pub index: usize,
    /// Value code, e.g. `SSS` or `2023`.
    pub code: String,
    /// Human-readable label. Falls back to the code.
    pub label: String,
}

/// A dimension with its categories in axis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDimension {
    /// Dimension identifier, e.g. `Alue` or `Vuosi`.
    pub id: String,
    /// Human-readable label. Falls back to the identifier.
    pub label: String,
    /// Categories sorted by index.
    pub categories: Vec<Category>,
    axis: usize,
}

impl ParsedDimension {
    /// Finds a category by code.
    #[must_use]
    pub fn category_by_code(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Returns the category at an axis position.
    #[must_use]
    pub fn category_by_index(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }
}

/// A single cell with its coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    /// The value, `None` when missing.
    pub value: Option<Decimal>,
    /// Dimension id -> category code.
    pub coordinates: BTreeMap<String, String>,
    /// Dimension id -> category label.
    pub labels: BTreeMap<String, String>,
}

impl DataPoint {
    /// Returns true if the cell has no value.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// A flat record: dimension codes plus the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Dimension id -> category code.
    #[serde(flatten)]
    pub coordinates: BTreeMap<String, String>,
    /// The value.
    pub value: Option<Decimal>,
}

/// A decoded JSON-stat dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStatDataset {
    /// Dataset title.
    pub label: String,
    /// Data source.
    pub source: Option<String>,
    /// Last update timestamp as reported.
    pub updated: Option<String>,
    /// Dimensions present in the document, in `id` order.
    pub dimensions: Vec<ParsedDimension>,
    /// Cell values in row-major order.
    pub values: Vec<Option<Decimal>>,
    sizes: Vec<usize>,
}

impl JsonStatDataset {
    /// Number of decoded dimensions.
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Number of cells.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.values.len()
    }

    /// Axis sizes, one per `id` entry.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Finds a dimension by id.
    #[must_use]
    pub fn dimension(&self, id: &str) -> Option<&ParsedDimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    /// Converts a flat index to one position per axis.
    #[must_use]
    pub fn coordinates(&self, flat_index: usize) -> Vec<usize> {
        let mut coords = vec![0; self.sizes.len()];
        let mut remaining = flat_index;
        for (axis, size) in self.sizes.iter().enumerate().rev() {
            let size = (*size).max(1);
            coords[axis] = remaining % size;
            remaining /= size;
        }
        coords
    }

    /// Every cell with its coordinate codes and labels.
    #[must_use]
    pub fn data_points(&self) -> Vec<DataPoint> {
        self.values
            .iter()
            .enumerate()
            .map(|(flat, value)| {
                let coords = self.coordinates(flat);
                let mut coordinates = BTreeMap::new();
                let mut labels = BTreeMap::new();
                for dim in &self.dimensions {
                    let position = coords.get(dim.axis).copied().unwrap_or_default();
                    if let Some(cat) = dim.category_by_index(position) {
                        coordinates.insert(dim.id.clone(), cat.code.clone());
                        labels.insert(dim.id.clone(), cat.label.clone());
                    }
                }
                DataPoint {
                    value: *value,
                    coordinates,
                    labels,
                }
            })
            .collect()
    }

    /// Flat records suitable for tabular export.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.data_points()
            .into_iter()
            .map(|dp| Record {
                coordinates: dp.coordinates,
                value: dp.value,
            })
            .collect()
    }
}

/// Decodes a JSON-stat 2.0 dataset document.
///
/// `id`, `dimension` and `value` are required. Dimensions named in `id` but absent
/// from `dimension` are skipped. Category `index` may be an object or an array.
/// `value` may be a dense array or a sparse object keyed by flat index. A
/// declared `size` whose cell count overflows is rejected.
pub fn parse_jsonstat(doc: &Value) -> Result<JsonStatDataset, JsonStatError> {
    let ids = doc.get("id").ok_or(JsonStatError::MissingField("id"))?;
    let raw_dimensions = doc
        .get("dimension")
        .ok_or(JsonStatError::MissingField("dimension"))?;
    let raw_values = doc.get("value").ok_or(JsonStatError::MissingField("value"))?;

    let ids: Vec<&str> = ids
        .as_array()
        .ok_or(JsonStatError::InvalidField {
            field: "id",
            reason: "is not an array",
        })?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let raw_dimensions = raw_dimensions.as_object().ok_or(JsonStatError::InvalidField {
        field: "dimension",
        reason: "is not an object",
    })?;

    let mut dimensions = Vec::with_capacity(ids.len());
    for (axis, id) in ids.iter().enumerate() {
        let Some(raw) = raw_dimensions.get(*id) else {
            tracing::warn!(dimension = %id, "dimension not found in response");
            continue;
        };
        dimensions.push(parse_dimension(id, axis, raw));
    }

    let sizes = resolve_sizes(doc.get("size"), &ids, &dimensions);
    let cell_count = sizes
        .iter()
        .try_fold(1usize, |acc, size| acc.checked_mul(*size))
        .ok_or(JsonStatError::InvalidField {
            field: "size",
            reason: "describes more cells than can be addressed",
        })?;

    let values = match raw_values {
        Value::Array(items) => items.iter().map(to_decimal).collect(),
        Value::Object(sparse) => sparse_values(sparse, cell_count),
        _ => {
            return Err(JsonStatError::InvalidField {
                field: "value",
                reason: "is neither an array nor an object",
            });
        }
    };

    let text = |key: &str| doc.get(key).and_then(Value::as_str).map(String::from);
    let dataset = JsonStatDataset {
        label: text("label").unwrap_or_default(),
        source: text("source"),
        updated: text("updated"),
        dimensions,
        values,
        sizes,
    };

    tracing::debug!(
        label = %dataset.label,
        dimensions = dataset.dimension_count(),
        cells = dataset.total_cells(),
        "parsed JSON-stat dataset"
    );

    Ok(dataset)
}

fn parse_dimension(id: &str, axis: usize, raw: &Value) -> ParsedDimension {
    let label = raw
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();
    let category = raw.get("category");
    let labels = category.and_then(|c| c.get("label")).and_then(Value::as_object);
    let label_for = |code: &str| {
        labels
            .and_then(|l| l.get(code))
            .and_then(Value::as_str)
            .unwrap_or(code)
            .to_string()
    };

    let mut categories: Vec<Category> = match category.and_then(|c| c.get("index")) {
        Some(Value::Object(index)) => index
            .iter()
            .filter_map(|(code, pos)| {
                let index = usize::try_from(pos.as_u64()?).ok()?;
                Some(Category {
                    index,
                    code: code.clone(),
                    label: label_for(code),
                })
            })
            .collect(),
        Some(Value::Array(codes)) => codes
            .iter()
            .filter_map(Value::as_str)
            .enumerate()
            .map(|(index, code)| Category {
                index,
                code: code.to_string(),
                label: label_for(code),
            })
            .collect(),
        // A single-category dimension may carry labels only
        _ => labels
            .map(|l| {
                l.keys()
                    .enumerate()
                    .map(|(index, code)| Category {
                        index,
                        code: code.clone(),
                        label: label_for(code),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    };
    categories.sort_by_key(|c| c.index);

    ParsedDimension {
        id: id.to_string(),
        label,
        categories,
        axis,
    }
}

fn resolve_sizes(raw: Option<&Value>, ids: &[&str], dimensions: &[ParsedDimension]) -> Vec<usize> {
    let declared: Option<Vec<usize>> = raw.and_then(Value::as_array).and_then(|sizes| {
        sizes
            .iter()
            .map(|s| s.as_u64().and_then(|n| usize::try_from(n).ok()))
            .collect()
    });

    match declared {
        Some(sizes) if sizes.len() == ids.len() => sizes,
        _ => {
            let mut sizes = vec![1; ids.len()];
            for dim in dimensions {
                sizes[dim.axis] = dim.categories.len().max(1);
            }
            sizes
        }
    }
}

/// Sparse cells up to the highest present index. Trailing missing cells are
/// not materialized.
fn sparse_values(sparse: &Map<String, Value>, cell_count: usize) -> Vec<Option<Decimal>> {
    let mut present = Vec::with_capacity(sparse.len());
    for (key, raw) in sparse {
        match key.parse::<usize>() {
            Ok(i) if i < cell_count => present.push((i, to_decimal(raw))),
            _ => tracing::warn!(index = %key, "sparse value index out of range"),
        }
    }

    let len = present.iter().map(|(i, _)| i + 1).max().unwrap_or_default();
    let mut values = vec![None; len];
    for (i, value) in present {
        values[i] = value;
    }
    values
}

/// Numbers and numeric strings become decimals; anything else is missing.
fn to_decimal(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
