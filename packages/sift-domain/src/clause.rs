use serde::{Deserialize, Serialize};

use crate::field::FieldRef;

/// Query content for a nearest-neighbor search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryContent {
	Embedding(Vec<f32>),
	Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnnQuery {
	pub query: QueryContent,
	/// Vector field to search. Only `#embedding` is supported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<FieldRef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub return_rank: Option<bool>,
	/// Rank assumed for ids missing from this query's candidates during fusion.
	#[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
	pub default_rank: Option<f64>,
}
impl KnnQuery {
	pub fn new(query: QueryContent) -> Self {
		Self { query, key: None, limit: None, return_rank: None, default_rank: None }
	}

	pub fn returns_rank(&self) -> bool {
		self.return_rank.unwrap_or(false)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionClause {
	pub ranks: Vec<KnnQuery>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub k: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weights: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub normalize: Option<bool>,
}
impl FusionClause {
	pub fn new(ranks: Vec<KnnQuery>) -> Self {
		Self { ranks, k: None, weights: None, normalize: None }
	}
}

/// The ranking half of a request. An object carrying `ranks` is a fusion clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankSpec {
	Fusion(FusionClause),
	Knn(KnnQuery),
}
impl RankSpec {
	pub fn queries(&self) -> &[KnnQuery] {
		match self {
			Self::Fusion(clause) => clause.ranks.as_slice(),
			Self::Knn(query) => std::slice::from_ref(query),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
	pub field: FieldRef,
}
impl From<FieldRef> for KeyRef {
	fn from(field: FieldRef) -> Self {
		Self { field }
	}
}
impl From<&str> for KeyRef {
	fn from(field: &str) -> Self {
		Self { field: field.into() }
	}
}

/// One key reference or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyRefs {
	One(KeyRef),
	Many(Vec<KeyRef>),
}
impl KeyRefs {
	pub fn as_slice(&self) -> &[KeyRef] {
		match self {
			Self::One(key) => std::slice::from_ref(key),
			Self::Many(keys) => keys.as_slice(),
		}
	}
}
impl From<Vec<KeyRef>> for KeyRefs {
	fn from(keys: Vec<KeyRef>) -> Self {
		Self::Many(keys)
	}
}
impl From<KeyRef> for KeyRefs {
	fn from(key: KeyRef) -> Self {
		Self::One(key)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopK {
	pub keys: KeyRefs,
	pub k: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
	/// Keep the k items with the smallest sort values.
	#[serde(rename = "$min_k")]
	MinK(TopK),
	/// Keep the k items with the largest sort values.
	#[serde(rename = "$max_k")]
	MaxK(TopK),
}
impl Aggregate {
	pub fn top_k(&self) -> &TopK {
		match self {
			Self::MinK(top_k) | Self::MaxK(top_k) => top_k,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByClause {
	pub keys: KeyRefs,
	pub aggregate: Aggregate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectClause {
	pub keys: Vec<FieldRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitClause {
	Count(u32),
	Page {
		limit: u32,
		#[serde(default)]
		offset: u32,
	},
}
impl LimitClause {
	pub fn limit(self) -> u32 {
		match self {
			Self::Count(limit) | Self::Page { limit, .. } => limit,
		}
	}

	pub fn offset(self) -> u32 {
		match self {
			Self::Count(_) => 0,
			Self::Page { offset, .. } => offset,
		}
	}

	/// Applies offset then limit to `items`.
	pub fn paginate<T>(self, items: Vec<T>) -> Vec<T> {
		items.into_iter().skip(self.offset() as usize).take(self.limit() as usize).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn object_with_ranks_parses_as_fusion() {
		let rank: RankSpec = serde_json::from_value(serde_json::json!({
			"ranks": [{ "query": "alpha", "returnRank": true }, { "query": [0.1, 0.2] }],
			"k": 10,
			"weights": [0.7, 0.3],
		}))
		.expect("Fusion clause must parse.");
		let RankSpec::Fusion(clause) = rank else { panic!("Expected a fusion clause.") };

		assert_eq!(clause.k, Some(10));
		assert_eq!(clause.ranks.len(), 2);
		assert!(clause.ranks[0].returns_rank());
		assert_eq!(clause.ranks[1].query, QueryContent::Embedding(vec![0.1, 0.2]));
	}

	#[test]
	fn knn_query_parses_key_and_default_rank() {
		let rank: RankSpec = serde_json::from_value(serde_json::json!({
			"query": "alpha",
			"key": "#embedding",
			"limit": 5,
			"default": 1000,
		}))
		.expect("KNN query must parse.");
		let RankSpec::Knn(query) = rank else { panic!("Expected a KNN query.") };

		assert_eq!(query.key, Some(FieldRef::Embedding));
		assert_eq!(query.limit, Some(5));
		assert_eq!(query.default_rank, Some(1000.0));
		assert!(!query.returns_rank());
	}

	#[test]
	fn group_by_accepts_single_or_many_keys() {
		let single: GroupByClause = serde_json::from_value(serde_json::json!({
			"keys": { "field": "category" },
			"aggregate": { "$min_k": { "keys": { "field": "#score" }, "k": 3 } },
		}))
		.expect("Single-key group clause must parse.");
		let many: GroupByClause = serde_json::from_value(serde_json::json!({
			"keys": [{ "field": "category" }, { "field": "year" }],
			"aggregate": { "$max_k": { "keys": [{ "field": "rating" }], "k": 1 } },
		}))
		.expect("Composite group clause must parse.");

		assert_eq!(single.keys.as_slice().len(), 1);
		assert!(matches!(single.aggregate, Aggregate::MinK(TopK { k: 3, .. })));
		assert_eq!(many.keys.as_slice().len(), 2);
		assert!(matches!(many.aggregate, Aggregate::MaxK(_)));
		assert_eq!(many.aggregate.top_k().keys.as_slice()[0].field, FieldRef::from("rating"));
	}

	#[test]
	fn limit_clause_forms_paginate() {
		let bare: LimitClause = serde_json::from_value(serde_json::json!(2)).expect("Bare limit.");
		let page: LimitClause = serde_json::from_value(serde_json::json!({ "limit": 2, "offset": 1 }))
			.expect("Paged limit.");
		let no_offset: LimitClause =
			serde_json::from_value(serde_json::json!({ "limit": 3 })).expect("Limit only.");

		assert_eq!(bare.paginate(vec![1, 2, 3, 4]), vec![1, 2]);
		assert_eq!(page.paginate(vec![1, 2, 3, 4]), vec![2, 3]);
		assert_eq!(no_offset.offset(), 0);
		assert_eq!(page.paginate(vec![1]), Vec::<i32>::new());
	}
}
