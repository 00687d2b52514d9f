use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Map;

use sift_config::{
	Config, DistanceMetric, EmbeddingProviderConfig, Providers as ProviderConfigs, Qdrant, Search,
	Service, Storage,
};
use sift_domain::{RawQueryResponse, ResultItem};
use sift_service::{
	BoxFuture, EmbeddingProvider, Error, NearestQuery, Providers, Result, SiftService, VectorStore,
};

pub const TEST_DIMENSIONS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
	Unavailable,
	MissingCollection,
}

/// In-memory store that answers each query vector with a canned response.
#[derive(Default)]
pub struct MemoryStore {
	responses: HashMap<Vec<u32>, RawQueryResponse>,
	failure: Option<StoreFailure>,
	unhealthy: bool,
	queries: Mutex<Vec<NearestQuery>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers queries for `vector` with `items`, in order.
	pub fn with_items(mut self, vector: &[f32], items: Vec<ResultItem>) -> Self {
		self.responses.insert(vector_key(vector), raw_response(items));

		self
	}

	pub fn with_raw(mut self, vector: &[f32], raw: RawQueryResponse) -> Self {
		self.responses.insert(vector_key(vector), raw);

		self
	}

	pub fn failing(mut self, failure: StoreFailure) -> Self {
		self.failure = Some(failure);

		self
	}

	pub fn unhealthy(mut self) -> Self {
		self.unhealthy = true;

		self
	}

	pub fn calls(&self) -> usize {
		self.lock_queries().len()
	}

	pub fn queries(&self) -> Vec<NearestQuery> {
		self.lock_queries().clone()
	}

	fn lock_queries(&self) -> std::sync::MutexGuard<'_, Vec<NearestQuery>> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl VectorStore for MemoryStore {
	fn query<'a>(&'a self, query: &'a NearestQuery) -> BoxFuture<'a, Result<RawQueryResponse>> {
		self.lock_queries().push(query.clone());

		let result = match self.failure {
			Some(StoreFailure::Unavailable) =>
				Err(Error::Store { message: "store unavailable".to_string() }),
			Some(StoreFailure::MissingCollection) =>
				Err(Error::NotFound { message: format!("collection {} not found", query.collection) }),
			None => Ok(self.responses.get(&vector_key(&query.vector)).cloned().unwrap_or_default()),
		};

		Box::pin(async move { result })
	}

	fn health<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		let result = if self.unhealthy {
			Err(Error::Store { message: "store unreachable".to_string() })
		} else {
			Ok(())
		};

		Box::pin(async move { result })
	}
}

/// Embedding double. Unknown texts embed to a zero vector of the configured size.
#[derive(Default)]
pub struct StaticEmbedding {
	vectors: HashMap<String, Vec<f32>>,
	calls: AtomicUsize,
}
impl StaticEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
		self.vectors.insert(text.to_string(), vector);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for StaticEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vectors = texts
			.iter()
			.map(|text| {
				self.vectors
					.get(text)
					.cloned()
					.unwrap_or_else(|| vec![0.0; cfg.dimensions as usize])
			})
			.collect();

		Box::pin(async move { Ok(vectors) })
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				vector_name: "dense".to_string(),
				vector_dim: TEST_DIMENSIONS,
				document_field: "document".to_string(),
				distance: DistanceMetric::Cosine,
			},
		},
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: Search::default(),
	}
}

pub fn test_service(
	cfg: Config,
	store: Arc<MemoryStore>,
	embedding: Arc<StaticEmbedding>,
) -> SiftService {
	SiftService::with_providers(cfg, store, Providers::new(embedding))
}

/// Lays `items` out as a single-batch raw response, as a store would return them.
pub fn raw_response(items: Vec<ResultItem>) -> RawQueryResponse {
	let mut raw = RawQueryResponse {
		ids: vec![Vec::new()],
		documents: Some(vec![Vec::new()]),
		embeddings: Some(vec![Vec::new()]),
		metadatas: Some(vec![Vec::new()]),
		distances: Some(vec![Vec::new()]),
	};

	for item in items {
		raw.ids[0].push(item.id);
		push_first(&mut raw.documents, item.document);
		push_first(&mut raw.embeddings, item.embedding);
		push_first(&mut raw.metadatas, item.metadata);
		push_first(&mut raw.distances, item.distance);
	}

	raw
}

fn push_first<T>(batches: &mut Option<Vec<Vec<Option<T>>>>, value: Option<T>) {
	if let Some(batch) = batches.as_mut().and_then(|batches| batches.first_mut()) {
		batch.push(value);
	}
}

fn vector_key(vector: &[f32]) -> Vec<u32> {
	vector.iter().map(|value| value.to_bits()).collect()
}
