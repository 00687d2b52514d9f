//! Translation of `where` and `whereDocument` clauses into Qdrant payload filters.
//!
//! `where` matches scalar payload fields:
//! `{ "field": value }`, `{ "field": { "$op": value } }` with `$eq`, `$ne`, `$gt`, `$gte`, `$lt`,
//! `$lte`, `$in`, `$nin`, and the `$and` / `$or` combinators over lists of clauses.
//!
//! `whereDocument` runs full-text matches on the document payload field with `$contains`,
//! `$not_contains`, `$and` and `$or`.

use qdrant_client::qdrant::{Condition, Filter, Range};
use serde_json::{Map, Value};

use crate::{Error, Result};

const WHERE_PATH: &str = "$.where";
const WHERE_DOCUMENT_PATH: &str = "$.whereDocument";

/// Builds the combined payload filter for a query. Returns `None` when nothing constrains it.
pub fn build_filter(
	r#where: Option<&Value>,
	where_document: Option<&Value>,
	document_field: &str,
) -> Result<Option<Filter>> {
	let mut conditions = Vec::new();

	if let Some(raw) = r#where {
		conditions.extend(where_conditions(raw, WHERE_PATH)?);
	}
	if let Some(raw) = where_document {
		conditions.extend(document_conditions(raw, WHERE_DOCUMENT_PATH, document_field)?);
	}

	if conditions.is_empty() { Ok(None) } else { Ok(Some(Filter::all(conditions))) }
}

fn where_conditions(raw: &Value, path: &str) -> Result<Vec<Condition>> {
	let map = as_object(raw, path)?;
	let mut conditions = Vec::with_capacity(map.len());

	for (key, value) in map {
		let child_path = format!("{path}.{key}");
		let condition = match key.as_str() {
			"$and" => Condition::from(Filter::all(nested(value, &child_path, where_conditions)?)),
			"$or" => Condition::from(Filter::any(nested(value, &child_path, where_conditions)?)),
			op if op.starts_with('$') =>
				return Err(Error::filter(child_path, format!("unsupported operator '{op}'."))),
			field => field_condition(field, value, &child_path)?,
		};

		conditions.push(condition);
	}

	Ok(conditions)
}

fn document_conditions(raw: &Value, path: &str, document_field: &str) -> Result<Vec<Condition>> {
	let map = as_object(raw, path)?;
	let mut conditions = Vec::with_capacity(map.len());

	for (key, value) in map {
		let child_path = format!("{path}.{key}");
		let condition = match key.as_str() {
			"$contains" =>
				Condition::matches_text(document_field, as_text(value, &child_path)?),
			"$not_contains" => Condition::from(Filter::must_not([Condition::matches_text(
				document_field,
				as_text(value, &child_path)?,
			)])),
			"$and" => Condition::from(Filter::all(nested(value, &child_path, |raw, path| {
				document_conditions(raw, path, document_field)
			})?)),
			"$or" => Condition::from(Filter::any(nested(value, &child_path, |raw, path| {
				document_conditions(raw, path, document_field)
			})?)),
			other =>
				return Err(Error::filter(child_path, format!("unsupported operator '{other}'."))),
		};

		conditions.push(condition);
	}

	Ok(conditions)
}

/// Each clause of a combinator list becomes one conjunction.
fn nested<F>(raw: &Value, path: &str, translate: F) -> Result<Vec<Condition>>
where
	F: Fn(&Value, &str) -> Result<Vec<Condition>>,
{
	let items = raw
		.as_array()
		.filter(|items| !items.is_empty())
		.ok_or_else(|| Error::filter(path, "expected a non-empty list of clauses."))?;
	let mut conditions = Vec::with_capacity(items.len());

	for (index, item) in items.iter().enumerate() {
		let clause = translate(item, &format!("{path}[{index}]"))?;

		conditions.push(Condition::from(Filter::all(clause)));
	}

	Ok(conditions)
}

fn field_condition(field: &str, value: &Value, path: &str) -> Result<Condition> {
	let Value::Object(ops) = value else {
		return eq_condition(field, value, path);
	};

	if ops.is_empty() {
		return Err(Error::filter(path, "operator object must not be empty."));
	}

	let mut conditions = Vec::with_capacity(ops.len());

	for (op, operand) in ops {
		let op_path = format!("{path}.{op}");
		let condition = match op.as_str() {
			"$eq" => eq_condition(field, operand, &op_path)?,
			"$ne" => Condition::from(Filter::must_not([eq_condition(field, operand, &op_path)?])),
			"$gt" => range_condition(field, operand, &op_path, |range, v| range.gt = Some(v))?,
			"$gte" => range_condition(field, operand, &op_path, |range, v| range.gte = Some(v))?,
			"$lt" => range_condition(field, operand, &op_path, |range, v| range.lt = Some(v))?,
			"$lte" => range_condition(field, operand, &op_path, |range, v| range.lte = Some(v))?,
			"$in" => Condition::from(Filter::any(eq_list(field, operand, &op_path)?)),
			"$nin" => Condition::from(Filter::must_not(eq_list(field, operand, &op_path)?)),
			other =>
				return Err(Error::filter(op_path, format!("unsupported operator '{other}'."))),
		};

		conditions.push(condition);
	}

	if conditions.len() == 1 {
		Ok(conditions.remove(0))
	} else {
		Ok(Condition::from(Filter::all(conditions)))
	}
}

fn eq_condition(field: &str, value: &Value, path: &str) -> Result<Condition> {
	match value {
		Value::String(text) => Ok(Condition::matches(field, text.clone())),
		Value::Bool(flag) => Ok(Condition::matches(field, *flag)),
		Value::Number(number) =>
			if let Some(int) = number.as_i64() {
				Ok(Condition::matches(field, int))
			} else {
				let float = number
					.as_f64()
					.ok_or_else(|| Error::filter(path, "number is out of range."))?;

				// Keyword matching has no float form; an exact range is equivalent.
				Ok(Condition::range(
					field,
					Range { gte: Some(float), lte: Some(float), ..Default::default() },
				))
			},
		_ => Err(Error::filter(path, "expected a string, number, or boolean.")),
	}
}

fn eq_list(field: &str, value: &Value, path: &str) -> Result<Vec<Condition>> {
	let items = value
		.as_array()
		.filter(|items| !items.is_empty())
		.ok_or_else(|| Error::filter(path, "expected a non-empty list of values."))?;

	items
		.iter()
		.enumerate()
		.map(|(index, item)| eq_condition(field, item, &format!("{path}[{index}]")))
		.collect()
}

fn range_condition<F>(field: &str, value: &Value, path: &str, set: F) -> Result<Condition>
where
	F: FnOnce(&mut Range, f64),
{
	let bound = value.as_f64().ok_or_else(|| Error::filter(path, "expected a number."))?;
	let mut range = Range::default();

	set(&mut range, bound);

	Ok(Condition::range(field, range))
}

fn as_object<'a>(raw: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
	raw.as_object().ok_or_else(|| Error::filter(path, "expected an object."))
}

fn as_text(raw: &Value, path: &str) -> Result<String> {
	raw.as_str()
		.map(str::to_string)
		.ok_or_else(|| Error::filter(path, "expected a string."))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn where_filter(raw: &Value) -> Result<Filter> {
		Ok(Filter::all(where_conditions(raw, WHERE_PATH)?))
	}

	fn where_document_filter(raw: &Value, document_field: &str) -> Result<Filter> {
		Ok(Filter::all(document_conditions(raw, WHERE_DOCUMENT_PATH, document_field)?))
	}

	#[test]
	fn implicit_equality_matches_keywords_and_integers() {
		let translate = |raw: Value| where_filter(&raw).expect("Filter must translate.");

		assert_eq!(
			translate(json!({ "cat": "A" })),
			Filter::all([Condition::matches("cat", "A".to_string())])
		);
		assert_eq!(translate(json!({ "open": true })), Filter::all([Condition::matches("open", true)]));
		assert_eq!(
			translate(json!({ "year": 2020 })),
			Filter::all([Condition::matches("year", 2020_i64)])
		);
		assert_eq!(
			translate(json!({ "rating": { "$eq": 4.5 } })),
			Filter::all([Condition::range(
				"rating",
				Range { gte: Some(4.5), lte: Some(4.5), ..Default::default() }
			)])
		);
	}

	#[test]
	fn comparison_operators_become_ranges() {
		let filter = where_filter(&json!({ "year": { "$gte": 2020 } })).expect("Filter.");

		assert_eq!(
			filter,
			Filter::all([Condition::range("year", Range { gte: Some(2020.0), ..Default::default() })])
		);

		let filter = where_filter(&json!({ "year": { "$gte": 2020, "$lt": 2024 } })).expect("Filter.");

		assert_eq!(filter.must.len(), 1);
	}

	#[test]
	fn negations_use_must_not() {
		let filter = where_filter(&json!({ "cat": { "$nin": ["A", "B"] } })).expect("Filter.");

		assert_eq!(
			filter,
			Filter::all([Condition::from(Filter::must_not([
				Condition::matches("cat", "A".to_string()),
				Condition::matches("cat", "B".to_string()),
			]))])
		);
	}

	#[test]
	fn combinators_nest_clauses() {
		let filter = where_filter(&json!({ "$or": [{ "cat": "A" }, { "cat": "B" }] }))
			.expect("Filter must translate.");

		assert_eq!(
			filter,
			Filter::all([Condition::from(Filter::any([
				Condition::from(Filter::all([Condition::matches("cat", "A".to_string())])),
				Condition::from(Filter::all([Condition::matches("cat", "B".to_string())])),
			]))])
		);
	}

	#[test]
	fn document_clauses_match_text_on_the_document_field() {
		let filter = where_document_filter(&json!({ "$not_contains": "draft" }), "body")
			.expect("Filter must translate.");

		assert_eq!(
			filter,
			Filter::all([Condition::from(Filter::must_not([Condition::matches_text(
				"body", "draft"
			)]))])
		);
	}

	#[test]
	fn errors_carry_the_json_path() {
		let err = where_filter(&json!({ "year": { "$gt": "soon" } })).expect_err("Must fail.");

		assert!(matches!(
			err,
			Error::InvalidFilter { ref path, .. } if path == "$.where.year.$gt"
		));

		let err = where_document_filter(&json!({ "$regex": "a.*" }), "document")
			.expect_err("Must fail.");

		assert!(matches!(
			err,
			Error::InvalidFilter { ref path, .. } if path == "$.whereDocument.$regex"
		));
		assert!(where_filter(&json!({ "cat": { "$in": [] } })).is_err());
		assert!(where_filter(&json!(["cat"])).is_err());
		assert!(where_filter(&json!({ "$not": { "cat": "A" } })).is_err());
	}

	#[test]
	fn empty_clauses_build_no_filter() {
		assert_eq!(build_filter(None, None, "document").expect("No filter."), None);
		assert_eq!(build_filter(Some(&json!({})), None, "document").expect("No filter."), None);
		assert!(
			build_filter(Some(&json!({ "cat": "A" })), Some(&json!({ "$contains": "x" })), "d")
				.expect("Filter must translate.")
				.is_some()
		);
	}
}
