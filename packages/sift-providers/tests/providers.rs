use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

use sift_providers::{Error, embedding::parse_embedding_response};

#[test]
fn builds_bearer_auth_header() {
	let headers =
		sift_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn forwards_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-tenant".to_string(), Value::String("acme".to_string()));

	let headers =
		sift_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-tenant").expect("Missing default header."), "acme");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let result = sift_providers::auth_headers("secret", &defaults);

	assert!(matches!(result, Err(Error::InvalidConfig { .. })));
}

#[test]
fn missing_data_array_is_an_invalid_response() {
	let result = parse_embedding_response(serde_json::json!({ "object": "list" }));

	assert!(matches!(result, Err(Error::InvalidResponse { .. })));
}

#[test]
fn missing_index_falls_back_to_position() {
	let parsed = parse_embedding_response(serde_json::json!({
		"data": [{ "embedding": [1.0] }, { "embedding": [2.0] }]
	}))
	.expect("Response must parse.");

	assert_eq!(parsed, vec![vec![1.0], vec![2.0]]);
}
