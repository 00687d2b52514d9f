pub mod search;

mod error;

pub use error::{Error, Result};
pub use search::{
	BatchSearchRequest, BatchSearchResponse, GroupedResults, SearchRequest, SearchResponse,
	UngroupedResults,
};
pub use sift_storage::NearestQuery;

use std::{future::Future, pin::Pin, sync::Arc};

use sift_config::{Config, EmbeddingProviderConfig};
use sift_domain::RawQueryResponse;
use sift_providers::embedding;
use sift_storage::QdrantStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Nearest-neighbor backend queried once per ranking sub-query.
pub trait VectorStore
where
	Self: Send + Sync,
{
	fn query<'a>(&'a self, query: &'a NearestQuery) -> BoxFuture<'a, Result<RawQueryResponse>>;

	fn health<'a>(&'a self) -> BoxFuture<'a, Result<()>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

pub struct SiftService {
	pub cfg: Config,
	pub store: Arc<dyn VectorStore>,
	pub providers: Providers,
}
impl SiftService {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		Self { cfg, store: Arc::new(store), providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn VectorStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	pub async fn health(&self) -> Result<()> {
		self.store.health().await
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl VectorStore for QdrantStore {
	fn query<'a>(&'a self, query: &'a NearestQuery) -> BoxFuture<'a, Result<RawQueryResponse>> {
		Box::pin(async move { Ok(QdrantStore::query(self, query).await?) })
	}

	fn health<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(QdrantStore::health(self).await?) })
	}
}
