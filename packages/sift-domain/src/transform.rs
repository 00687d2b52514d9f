use serde::{Deserialize, Serialize};

use crate::item::{Metadata, ResultItem};

/// Candidate output of one store query, as parallel arrays per query batch.
///
/// Any array other than `ids` may be missing entirely or shorter than `ids`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQueryResponse {
	pub ids: Vec<Vec<String>>,
	#[serde(default)]
	pub documents: Option<Vec<Vec<Option<String>>>>,
	#[serde(default)]
	pub embeddings: Option<Vec<Vec<Option<Vec<f32>>>>>,
	#[serde(default)]
	pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
	#[serde(default)]
	pub distances: Option<Vec<Vec<Option<f64>>>>,
}

/// Turns the first batch of `raw` into result items.
///
/// With `return_rank`, `score` holds the zero-based candidate position and `distance` is left
/// empty. Otherwise `distance` is copied from the store and `score` is left empty.
pub fn transform_query_results(raw: RawQueryResponse, return_rank: bool) -> Vec<ResultItem> {
	let RawQueryResponse { ids, documents, embeddings, metadatas, distances } = raw;
	let ids = ids.into_iter().next().unwrap_or_default();
	let mut documents = first_batch(documents);
	let mut embeddings = first_batch(embeddings);
	let mut metadatas = first_batch(metadatas);
	let mut distances = first_batch(distances);
	let mut out = Vec::with_capacity(ids.len());

	for (index, id) in ids.into_iter().enumerate() {
		let document = documents.next().flatten();
		let embedding = embeddings.next().flatten();
		let metadata = metadatas.next().flatten();
		let distance = distances.next().flatten();

		if id.is_empty() {
			tracing::debug!(index, "Skipping store candidate without an id.");

			continue;
		}

		let (score, distance) = if return_rank { (Some(index as f64), None) } else { (None, distance) };

		out.push(ResultItem { id, document, embedding, metadata, score, distance });
	}

	out
}

fn first_batch<T>(batches: Option<Vec<Vec<Option<T>>>>) -> std::vec::IntoIter<Option<T>> {
	batches.and_then(|batches| batches.into_iter().next()).unwrap_or_default().into_iter()
}
