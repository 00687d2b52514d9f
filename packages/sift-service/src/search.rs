use std::time::Instant;

use futures::future;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::{Map, Value};

use crate::{Error, NearestQuery, Result, SiftService};
use sift_domain::{
	FieldRef, FusionOptions, GroupByClause, KnnQuery, LimitClause, QueryContent, RankSpec,
	ResultGroup, ResultItem, SelectClause, fuse, group_results, select_fields,
	transform_query_results,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rank: Option<RankSpec>,
	/// Metadata filter forwarded to the store.
	#[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
	pub r#where: Option<Value>,
	/// Document text filter forwarded to the store.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub where_document: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<LimitClause>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub select: Option<SelectClause>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group_by: Option<GroupByClause>,
}
impl SearchRequest {
	/// Checks the request shape and returns its ranking specification.
	pub fn validate(&self) -> Result<&RankSpec> {
		let rank = self.rank.as_ref().ok_or(Error::MissingRank)?;

		match rank {
			RankSpec::Knn(query) => validate_knn(query, "$.rank")?,
			RankSpec::Fusion(clause) => {
				if clause.ranks.is_empty() {
					return Err(Error::invalid("$.rank.ranks", "ranks must not be empty."));
				}
				if clause.k == Some(0) {
					return Err(Error::invalid("$.rank.k", "k must be a positive integer."));
				}
				if let Some(weights) = &clause.weights
					&& weights.iter().any(|weight| !weight.is_finite())
				{
					return Err(Error::invalid("$.rank.weights", "weights must be finite numbers."));
				}

				for (index, query) in clause.ranks.iter().enumerate() {
					validate_knn(query, &format!("$.rank.ranks[{index}]"))?;
				}
			},
		}

		if let Some(limit) = self.limit
			&& limit.limit() == 0
		{
			return Err(Error::invalid("$.limit", "limit must be a positive integer."));
		}
		if let Some(group_by) = &self.group_by {
			let top_k = group_by.aggregate.top_k();

			if group_by.keys.as_slice().is_empty() {
				return Err(Error::invalid("$.groupBy.keys", "group keys must not be empty."));
			}
			if top_k.keys.as_slice().is_empty() {
				return Err(Error::invalid(
					"$.groupBy.aggregate.keys",
					"aggregate keys must not be empty.",
				));
			}
			if top_k.k == 0 {
				return Err(Error::invalid("$.groupBy.aggregate.k", "k must be a positive integer."));
			}
		}

		for (field, value) in [("$.where", &self.r#where), ("$.whereDocument", &self.where_document)]
		{
			if value.as_ref().is_some_and(|value| !value.is_object()) {
				return Err(Error::invalid(field, "filter must be an object."));
			}
		}

		Ok(rank)
	}
}

fn validate_knn(query: &KnnQuery, path: &str) -> Result<()> {
	if let Some(key) = &query.key
		&& *key != FieldRef::Embedding
	{
		return Err(Error::UnsupportedTarget { key: key.to_string() });
	}
	if query.limit == Some(0) {
		return Err(Error::invalid(format!("{path}.limit"), "limit must be a positive integer."));
	}
	if let QueryContent::Embedding(vector) = &query.query
		&& vector.is_empty()
	{
		return Err(Error::invalid(format!("{path}.query"), "query vector must not be empty."));
	}

	Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UngroupedResults {
	pub results: Vec<ResultItem>,
	pub total: usize,
	/// Elapsed milliseconds.
	pub took: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedResults {
	pub groups: Vec<ResultGroup>,
	/// Group count before pagination.
	pub total_groups: usize,
	/// Item count across all groups before pagination.
	pub total_items: usize,
	/// Elapsed milliseconds.
	pub took: f64,
}

/// Search output, discriminated on the wire by the `grouped` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
	Ungrouped(UngroupedResults),
	Grouped(GroupedResults),
}
impl SearchResponse {
	pub fn took(&self) -> f64 {
		match self {
			Self::Ungrouped(body) => body.took,
			Self::Grouped(body) => body.took,
		}
	}
}
impl Serialize for SearchResponse {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		#[derive(Serialize)]
		struct Tagged<'a, T> {
			grouped: bool,
			#[serde(flatten)]
			body: &'a T,
		}

		match self {
			Self::Ungrouped(body) => Tagged { grouped: false, body }.serialize(serializer),
			Self::Grouped(body) => Tagged { grouped: true, body }.serialize(serializer),
		}
	}
}
impl<'de> Deserialize<'de> for SearchResponse {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		struct Tagged {
			grouped: bool,
			#[serde(flatten)]
			body: Map<String, Value>,
		}

		let Tagged { grouped, body } = Tagged::deserialize(deserializer)?;
		let body = Value::Object(body);

		if grouped {
			serde_json::from_value(body).map(Self::Grouped).map_err(D::Error::custom)
		} else {
			serde_json::from_value(body).map(Self::Ungrouped).map_err(D::Error::custom)
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSearchRequest {
	pub searches: Vec<SearchRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSearchResponse {
	pub results: Vec<SearchResponse>,
	/// Elapsed milliseconds for the whole batch.
	pub took: f64,
}

impl SiftService {
	/// Ranks, groups, paginates and projects one search against `collection`.
	pub async fn search(&self, collection: &str, req: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let rank = req.validate()?;
		let ranked = self.rank(collection, &req, rank).await?;
		let select = req.select.clone().unwrap_or_default();
		let response = match &req.group_by {
			Some(group_by) => {
				let groups = group_results(ranked, group_by);
				let total_groups = groups.len();
				let total_items: usize = groups.iter().map(|group| group.items.len()).sum();
				let groups = paginate(req.limit, groups)
					.into_iter()
					.map(|group| ResultGroup {
						items: select_fields(&group.items, &select),
						..group
					})
					.collect::<Vec<_>>();
				let took = elapsed_ms(started);

				tracing::info!(
					collection,
					grouped = true,
					groups = groups.len(),
					total_groups,
					total_items,
					took_ms = took,
					"Search completed."
				);

				SearchResponse::Grouped(GroupedResults { groups, total_groups, total_items, took })
			},
			None => {
				let results = select_fields(&paginate(req.limit, ranked), &select);
				let total = results.len();
				let took = elapsed_ms(started);

				tracing::info!(collection, grouped = false, total, took_ms = took, "Search completed.");

				SearchResponse::Ungrouped(UngroupedResults { results, total, took })
			},
		};

		Ok(response)
	}

	/// Runs every search in `batch` concurrently. Any failure fails the whole batch.
	pub async fn search_batch(
		&self,
		collection: &str,
		batch: BatchSearchRequest,
	) -> Result<BatchSearchResponse> {
		let started = Instant::now();

		if batch.searches.is_empty() {
			return Err(Error::invalid("$.searches", "searches must not be empty."));
		}

		let count = batch.searches.len();
		let results =
			future::try_join_all(batch.searches.into_iter().map(|req| self.search(collection, req)))
				.await?;
		let took = elapsed_ms(started);

		tracing::info!(collection, searches = count, took_ms = took, "Batch search completed.");

		Ok(BatchSearchResponse { results, took })
	}

	async fn rank(
		&self,
		collection: &str,
		req: &SearchRequest,
		rank: &RankSpec,
	) -> Result<Vec<ResultItem>> {
		match rank {
			RankSpec::Knn(query) => self.run_knn(collection, req, query).await,
			RankSpec::Fusion(clause) => {
				let lists = future::try_join_all(
					clause.ranks.iter().map(|query| self.run_knn(collection, req, query)),
				)
				.await?;
				let options = FusionOptions {
					synthesize_default_rank: self.cfg.search.rrf.synthesize_default_rank,
				};

				tracing::debug!(collection, sub_queries = lists.len(), "Fusing ranked lists.");

				Ok(fuse(lists, clause, options))
			},
		}
	}

	async fn run_knn(
		&self,
		collection: &str,
		req: &SearchRequest,
		query: &KnnQuery,
	) -> Result<Vec<ResultItem>> {
		let vector = match &query.query {
			QueryContent::Embedding(vector) => vector.clone(),
			QueryContent::Text(text) => self.embed_query(text).await?,
		};
		let nearest = NearestQuery {
			collection: collection.to_string(),
			vector,
			limit: query.limit.unwrap_or(self.cfg.search.default_knn_limit),
			r#where: req.r#where.clone(),
			where_document: req.where_document.clone(),
		};
		let raw = self.store.query(&nearest).await?;

		Ok(transform_query_results(raw, query.returns_rank()))
	}

	async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let texts = vec![text.to_string()];
		let embedded = match self.providers.embedding.embed(cfg, &texts).await {
			Ok(vectors) => check_query_vector(vectors, cfg.dimensions),
			Err(err) => Err(err),
		};

		embedded.map_err(|err| match err {
			Error::Provider { message } => {
				tracing::warn!(provider_id = %cfg.provider_id, %message, "Query embedding failed.");

				Error::Provider { message: format!("{}: {message}", cfg.provider_id) }
			},
			err => err,
		})
	}
}

fn check_query_vector(vectors: Vec<Vec<f32>>, dimensions: u32) -> Result<Vec<f32>> {
	let vector = vectors.into_iter().next().ok_or_else(|| Error::Provider {
		message: "Embedding provider returned no vectors.".to_string(),
	})?;

	if vector.len() != dimensions as usize {
		return Err(Error::Provider { message: "Embedding vector dimension mismatch.".to_string() });
	}

	Ok(vector)
}

fn paginate<T>(limit: Option<LimitClause>, items: Vec<T>) -> Vec<T> {
	match limit {
		Some(limit) => limit.paginate(items),
		None => items,
	}
}

fn elapsed_ms(started: Instant) -> f64 {
	started.elapsed().as_secs_f64() * 1_000.0
}
