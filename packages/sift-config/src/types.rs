use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	/// Named vector searched when a query targets `#embedding`.
	pub vector_name: String,
	pub vector_dim: u32,
	/// Payload key holding the document text. Every other scalar payload key is metadata.
	#[serde(default = "default_document_field")]
	pub document_field: String,
	/// Collection metric, used to turn Qdrant similarity scores into distances.
	#[serde(default)]
	pub distance: DistanceMetric,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
	#[default]
	Cosine,
	Dot,
	Euclid,
	Manhattan,
}
impl DistanceMetric {
	/// Converts a Qdrant point score into lower-is-better distance semantics.
	pub fn to_distance(self, score: f32) -> f64 {
		let score = f64::from(score);

		match self {
			Self::Cosine => 1.0 - score,
			Self::Dot => -score,
			Self::Euclid | Self::Manhattan => score,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Candidate count for a nearest-neighbor query that does not set its own limit.
	#[serde(default = "default_knn_limit")]
	pub default_knn_limit: u32,
	#[serde(default)]
	pub rrf: SearchRrf,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_knn_limit: default_knn_limit(), rrf: SearchRrf::default() }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRrf {
	/// Credit ids missing from a sub-query list with that sub-query's `default` rank.
	#[serde(default)]
	pub synthesize_default_rank: bool,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_document_field() -> String {
	"document".to_string()
}

fn default_knn_limit() -> u32 {
	100
}
