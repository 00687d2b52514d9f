use qdrant_client::qdrant::{Query, QueryPointsBuilder};
use serde_json::Value;

use crate::{
	Result, filter,
	points::{self, PointLayout},
};
use sift_domain::RawQueryResponse;

/// One nearest-neighbor lookup against a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestQuery {
	pub collection: String,
	pub vector: Vec<f32>,
	pub limit: u32,
	pub r#where: Option<Value>,
	pub where_document: Option<Value>,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub layout: PointLayout,
}
impl QdrantStore {
	pub fn new(cfg: &sift_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;
		let layout = PointLayout {
			vector_name: cfg.vector_name.clone(),
			document_field: cfg.document_field.clone(),
			distance: cfg.distance,
		};

		Ok(Self { client, layout })
	}

	pub async fn query(&self, query: &NearestQuery) -> Result<RawQueryResponse> {
		let filter = filter::build_filter(
			query.r#where.as_ref(),
			query.where_document.as_ref(),
			&self.layout.document_field,
		)?;
		let mut search = QueryPointsBuilder::new(query.collection.clone())
			.query(Query::new_nearest(query.vector.clone()))
			.using(self.layout.vector_name.clone())
			.limit(u64::from(query.limit))
			.with_payload(true)
			.with_vectors(true);

		if let Some(filter) = filter {
			search = search.filter(filter);
		}

		let response = self.client.query(search).await?;

		tracing::debug!(
			collection = %query.collection,
			hits = response.result.len(),
			"Qdrant nearest query completed."
		);

		Ok(points::points_to_raw(response.result, &self.layout))
	}

	pub async fn health(&self) -> Result<()> {
		self.client.health_check().await?;

		Ok(())
	}
}
