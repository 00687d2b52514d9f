use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::item::{MetadataValue, ResultItem};

/// A reference to a result field: one of the reserved `#` markers or a metadata field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
	Id,
	Document,
	Embedding,
	Metadata,
	Score,
	Distance,
	Named(String),
}
impl FieldRef {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Id => "#id",
			Self::Document => "#document",
			Self::Embedding => "#embedding",
			Self::Metadata => "#metadata",
			Self::Score => "#score",
			Self::Distance => "#distance",
			Self::Named(name) => name.as_str(),
		}
	}

	/// Resolves the scalar value this reference points at on `item`.
	///
	/// `#document`, `#embedding` and `#metadata` are not scalar keys and never resolve.
	pub fn resolve<'a>(&self, item: &'a ResultItem) -> Option<FieldValue<'a>> {
		match self {
			Self::Id => Some(FieldValue::Str(item.id.as_str())),
			Self::Score => item.score.and_then(FieldValue::from_f64),
			Self::Distance => item.distance.and_then(FieldValue::from_f64),
			Self::Named(name) => item.metadata_value(name).map(FieldValue::from),
			Self::Document | Self::Embedding | Self::Metadata => None,
		}
	}
}
impl Display for FieldRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
impl From<&str> for FieldRef {
	fn from(value: &str) -> Self {
		match value {
			"#id" => Self::Id,
			"#document" => Self::Document,
			"#embedding" => Self::Embedding,
			"#metadata" => Self::Metadata,
			"#score" => Self::Score,
			"#distance" => Self::Distance,
			name => Self::Named(name.to_string()),
		}
	}
}
impl From<String> for FieldRef {
	fn from(value: String) -> Self {
		match Self::from(value.as_str()) {
			Self::Named(_) => Self::Named(value),
			marker => marker,
		}
	}
}
impl Serialize for FieldRef {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for FieldRef {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::from)
	}
}

/// A resolved key value, borrowed from the item where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
	Str(&'a str),
	Number(Number),
	Bool(bool),
}
impl FieldValue<'_> {
	fn from_f64(value: f64) -> Option<Self> {
		Number::from_f64(value).map(FieldValue::Number)
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(number) => number.as_f64(),
			_ => None,
		}
	}

	/// Writes integral floats as integers so `4` and `4.0` compare as the same key.
	pub fn canonical(self) -> Self {
		let Self::Number(number) = self else {
			return self;
		};

		match number.as_f64() {
			Some(value)
				if number.is_f64()
					&& value.fract() == 0.0
					&& value >= i64::MIN as f64
					&& value < i64::MAX as f64 =>
				Self::Number(Number::from(value as i64)),
			_ => Self::Number(number),
		}
	}

	pub fn to_metadata_value(&self) -> MetadataValue {
		match self {
			Self::Str(text) => MetadataValue::String((*text).to_string()),
			Self::Number(number) => MetadataValue::Number(number.clone()),
			Self::Bool(flag) => MetadataValue::Bool(*flag),
		}
	}

	pub fn to_json(&self) -> Value {
		match self {
			Self::Str(text) => Value::String((*text).to_string()),
			Self::Number(number) => Value::Number(number.clone()),
			Self::Bool(flag) => Value::Bool(*flag),
		}
	}
}
impl<'a> From<&'a MetadataValue> for FieldValue<'a> {
	fn from(value: &'a MetadataValue) -> Self {
		match value {
			MetadataValue::String(text) => Self::Str(text.as_str()),
			MetadataValue::Number(number) => Self::Number(number.clone()),
			MetadataValue::Bool(flag) => Self::Bool(*flag),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserved_markers_round_trip_through_strings() {
		for marker in ["#id", "#document", "#embedding", "#metadata", "#score", "#distance"] {
			let field = FieldRef::from(marker);

			assert!(!matches!(field, FieldRef::Named(_)), "{marker} must be reserved");
			assert_eq!(field.as_str(), marker);
		}

		assert_eq!(FieldRef::from("#title".to_string()), FieldRef::Named("#title".to_string()));
	}

	#[test]
	fn resolves_reserved_and_metadata_fields() {
		let mut item = ResultItem::new("doc1");

		item.score = Some(0.5);
		item.metadata = Some([("cat".to_string(), MetadataValue::from("A"))].into_iter().collect());

		assert_eq!(FieldRef::Id.resolve(&item), Some(FieldValue::Str("doc1")));
		assert_eq!(FieldRef::Score.resolve(&item).and_then(|value| value.as_f64()), Some(0.5));
		assert_eq!(FieldRef::Distance.resolve(&item), None);
		assert_eq!(FieldRef::from("cat").resolve(&item), Some(FieldValue::Str("A")));
		assert_eq!(FieldRef::from("missing").resolve(&item), None);
		assert_eq!(FieldRef::Document.resolve(&item), None);
	}

	#[test]
	fn canonical_numbers_drop_integral_fractions() {
		let whole = FieldValue::Number(Number::from_f64(4.0).expect("Finite float."));
		let fraction = FieldValue::Number(Number::from_f64(4.5).expect("Finite float."));

		assert_eq!(whole.canonical(), FieldValue::Number(Number::from(4)));
		assert_eq!(fraction.clone().canonical(), fraction);
		assert_eq!(FieldValue::Str("4").canonical(), FieldValue::Str("4"));
	}

	#[test]
	fn non_finite_scores_do_not_resolve() {
		let mut item = ResultItem::new("doc1");

		item.score = Some(f64::NAN);

		assert_eq!(FieldRef::Score.resolve(&item), None);
	}
}
