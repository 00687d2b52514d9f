use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use sift_config::{Config, DistanceMetric, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(edit: impl FnOnce(&mut toml::Table)) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn table_mut<'a>(root: &'a mut toml::Table, path: &[&str]) -> &'a mut toml::Table {
	let mut current = root;

	for key in path {
		current = current
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	current
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("sift_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> sift_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = sift_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_and_normalizes_provider_url() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config must be valid.");

	assert_eq!(cfg.providers.embedding.api_base, "http://127.0.0.1:1");
	assert_eq!(cfg.providers.embedding.path, "/v1/embeddings");
	assert_eq!(cfg.storage.qdrant.distance, DistanceMetric::Cosine);
	assert_eq!(cfg.search.default_knn_limit, 100);
	assert!(!cfg.search.rrf.synthesize_default_rank);
}

#[test]
fn search_section_is_optional() {
	let payload = sample_toml_with(|root| {
		root.remove("search");
	});
	let cfg = load_payload(payload).expect("Config without [search] must be valid.");

	assert_eq!(cfg.search.default_knn_limit, 100);
	assert!(!cfg.search.rrf.synthesize_default_rank);
}

#[test]
fn blank_log_level_falls_back_to_info() {
	let payload = sample_toml_with(|root| {
		table_mut(root, &["service"]).insert("log_level".to_string(), Value::from("  "));
	});
	let cfg = load_payload(payload).expect("Blank log level must be normalized.");

	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn missing_config_file_reports_path() {
	let path = PathBuf::from("/nonexistent/sift/config.toml");
	let err = sift_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
	let err = load_payload("[service\nhttp_bind = 1".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn unknown_distance_metric_is_rejected() {
	let payload = sample_toml_with(|root| {
		table_mut(root, &["storage", "qdrant"])
			.insert("distance".to_string(), Value::from("hamming"));
	});
	let err = load_payload(payload).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut cfg = base_config();

	cfg.providers.embedding.dimensions = 8;

	let err = sift_config::validate(&cfg).expect_err("Expected dimension validation error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

#[test]
fn api_key_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.embedding.api_key = " ".to_string();

	let err = sift_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider embedding api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_knn_limit_must_be_positive() {
	let mut cfg = base_config();

	cfg.search.default_knn_limit = 0;

	let err = sift_config::validate(&cfg).expect_err("Expected knn limit validation error.");

	assert!(
		err.to_string().contains("search.default_knn_limit must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn vector_name_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.storage.qdrant.vector_name = String::new();

	let err = sift_config::validate(&cfg).expect_err("Expected vector_name validation error.");

	assert!(
		err.to_string().contains("storage.qdrant.vector_name must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_headers_must_be_strings() {
	let mut cfg = base_config();

	cfg.providers.embedding
		.default_headers
		.insert("x-retries".to_string(), serde_json::Value::from(3));

	let err = sift_config::validate(&cfg).expect_err("Expected header validation error.");

	assert!(
		err.to_string().contains("providers.embedding.default_headers.x-retries must be a string."),
		"Unexpected error: {err}"
	);
}

#[test]
fn distance_metrics_convert_scores() {
	assert_eq!(DistanceMetric::Cosine.to_distance(0.75), 0.25);
	assert_eq!(DistanceMetric::Dot.to_distance(2.0), -2.0);
	assert_eq!(DistanceMetric::Euclid.to_distance(1.5), 1.5);
	assert_eq!(DistanceMetric::Manhattan.to_distance(3.0), 3.0);
}
