use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	clause::{Aggregate, GroupByClause, KeyRef},
	collate::locale_compare,
	field::FieldValue,
	item::{MetadataValue, ResultItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
	Ascending,
	Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultGroup {
	/// Grouping field names joined with a comma.
	pub group_key: String,
	/// The resolved key value, or a JSON array encoding of the values for composite keys.
	pub group_value: MetadataValue,
	pub items: Vec<ResultItem>,
}

/// Partitions `results` by the clause keys and keeps the top-k items of each partition.
///
/// Items that do not resolve every key are left out. Groups keep discovery order.
pub fn group_results(results: Vec<ResultItem>, clause: &GroupByClause) -> Vec<ResultGroup> {
	let keys = clause.keys.as_slice();
	let group_key = keys.iter().map(|key| key.field.as_str()).collect::<Vec<_>>().join(",");
	let mut groups: Vec<ResultGroup> = Vec::new();
	let mut by_value: HashMap<String, usize> = HashMap::new();

	for item in results {
		let Some((identity, group_value)) = group_value(&item, keys) else {
			continue;
		};
		let slot = match by_value.get(&identity).copied() {
			Some(slot) => slot,
			None => {
				by_value.insert(identity, groups.len());
				groups.push(ResultGroup {
					group_key: group_key.clone(),
					group_value,
					items: Vec::new(),
				});

				groups.len() - 1
			},
		};

		groups[slot].items.push(item);
	}

	for group in &mut groups {
		apply_aggregate(&mut group.items, &clause.aggregate);
	}

	groups
}

/// Returns a hashable identity for the group plus the value reported to callers.
fn group_value(item: &ResultItem, keys: &[KeyRef]) -> Option<(String, MetadataValue)> {
	if let [key] = keys {
		let value = key.field.resolve(item)?.canonical();

		return Some((value.to_json().to_string(), value.to_metadata_value()));
	}

	let mut values = Vec::with_capacity(keys.len());

	for key in keys {
		values.push(key.field.resolve(item)?.canonical().to_json());
	}

	let encoded = Value::Array(values).to_string();

	Some((encoded.clone(), MetadataValue::String(encoded)))
}

fn apply_aggregate(items: &mut Vec<ResultItem>, aggregate: &Aggregate) {
	let (top_k, direction) = match aggregate {
		Aggregate::MinK(top_k) => (top_k, Direction::Ascending),
		Aggregate::MaxK(top_k) => (top_k, Direction::Descending),
	};
	let sort_keys = top_k.keys.as_slice();

	items.sort_by(|left, right| compare_items(left, right, sort_keys, direction));
	items.truncate(top_k.k as usize);
}

fn compare_items(
	left: &ResultItem,
	right: &ResultItem,
	sort_keys: &[KeyRef],
	direction: Direction,
) -> Ordering {
	for key in sort_keys {
		let ord = match (key.field.resolve(left), key.field.resolve(right)) {
			(None, None) => Ordering::Equal,
			// Missing values go last in either direction.
			(None, Some(_)) => Ordering::Greater,
			(Some(_), None) => Ordering::Less,
			(Some(lhs), Some(rhs)) => {
				let ord = compare_values(&lhs, &rhs);

				match direction {
					Direction::Ascending => ord,
					Direction::Descending => ord.reverse(),
				}
			},
		};

		if ord != Ordering::Equal {
			return ord;
		}
	}

	Ordering::Equal
}

/// Numbers compare numerically and strings by collation. Any other pairing is a tie.
fn compare_values(left: &FieldValue<'_>, right: &FieldValue<'_>) -> Ordering {
	match (left, right) {
		(FieldValue::Str(lhs), FieldValue::Str(rhs)) => locale_compare(lhs, rhs),
		(FieldValue::Number(_), FieldValue::Number(_)) => match (left.as_f64(), right.as_f64()) {
			(Some(lhs), Some(rhs)) => lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal),
			_ => Ordering::Equal,
		},
		_ => Ordering::Equal,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mixed_value_types_tie() {
		assert_eq!(
			compare_values(&FieldValue::Str("a"), &FieldValue::Number(1.into())),
			Ordering::Equal
		);
		assert_eq!(compare_values(&FieldValue::Bool(true), &FieldValue::Bool(false)), Ordering::Equal);
	}

	#[test]
	fn numbers_compare_across_integer_and_float() {
		let int = FieldValue::Number(2.into());
		let float = FieldValue::Number(serde_json::Number::from_f64(1.5).expect("Finite float."));

		assert_eq!(compare_values(&float, &int), Ordering::Less);
	}
}
