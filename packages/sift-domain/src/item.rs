use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

pub type Metadata = BTreeMap<String, MetadataValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
	Bool(bool),
	Number(Number),
	String(String),
}
impl From<&str> for MetadataValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}
impl From<String> for MetadataValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<bool> for MetadataValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for MetadataValue {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}
impl From<Number> for MetadataValue {
	fn from(value: Number) -> Self {
		Self::Number(value)
	}
}

/// One candidate as it flows through ranking, grouping and projection.
///
/// A ranking query fills either `score` (rank mode and fused results) or `distance`, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub document: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Metadata>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub distance: Option<f64>,
}
impl ResultItem {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), ..Default::default() }
	}

	pub fn metadata_value(&self, field: &str) -> Option<&MetadataValue> {
		self.metadata.as_ref()?.get(field)
	}
}
