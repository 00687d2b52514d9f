use std::collections::HashMap;

use qdrant_client::qdrant::{
	PointId, ScoredPoint, Value, VectorOutput, point_id::PointIdOptions, value::Kind,
	vector_output::Vector, vectors_output::VectorsOptions,
};
use serde_json::Number;

use sift_config::DistanceMetric;
use sift_domain::{Metadata, MetadataValue, RawQueryResponse};

/// How scored points map onto result fields.
#[derive(Debug, Clone)]
pub struct PointLayout {
	pub vector_name: String,
	pub document_field: String,
	pub distance: DistanceMetric,
}

/// Converts Qdrant hits into a single-batch raw response, keeping hit order.
pub fn points_to_raw(points: Vec<ScoredPoint>, layout: &PointLayout) -> RawQueryResponse {
	let mut ids = Vec::with_capacity(points.len());
	let mut documents = Vec::with_capacity(points.len());
	let mut embeddings = Vec::with_capacity(points.len());
	let mut metadatas = Vec::with_capacity(points.len());
	let mut distances = Vec::with_capacity(points.len());

	for point in points {
		ids.push(point.id.as_ref().map(point_id_string).unwrap_or_default());
		documents.push(payload_document(&point.payload, &layout.document_field));
		metadatas.push(payload_metadata(&point.payload, &layout.document_field));
		distances.push(Some(layout.distance.to_distance(point.score)));
		embeddings.push(point_vector(&point, &layout.vector_name));
	}

	RawQueryResponse {
		ids: vec![ids],
		documents: Some(vec![documents]),
		embeddings: Some(vec![embeddings]),
		metadatas: Some(vec![metadatas]),
		distances: Some(vec![distances]),
	}
}

fn point_id_string(id: &PointId) -> String {
	match &id.point_id_options {
		Some(PointIdOptions::Num(num)) => num.to_string(),
		Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
		None => String::new(),
	}
}

fn payload_document(payload: &HashMap<String, Value>, document_field: &str) -> Option<String> {
	match &payload.get(document_field)?.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

/// Scalar payload entries other than the document field. Nested values are skipped.
fn payload_metadata(payload: &HashMap<String, Value>, document_field: &str) -> Option<Metadata> {
	let metadata = payload
		.iter()
		.filter(|(key, _)| key.as_str() != document_field)
		.filter_map(|(key, value)| Some((key.clone(), scalar(value)?)))
		.collect::<Metadata>();

	if metadata.is_empty() { None } else { Some(metadata) }
}

fn scalar(value: &Value) -> Option<MetadataValue> {
	match value.kind.as_ref()? {
		Kind::StringValue(text) => Some(MetadataValue::String(text.clone())),
		Kind::IntegerValue(int) => Some(MetadataValue::Number(Number::from(*int))),
		Kind::DoubleValue(float) => Number::from_f64(*float).map(MetadataValue::Number),
		Kind::BoolValue(flag) => Some(MetadataValue::Bool(*flag)),
		_ => None,
	}
}

fn point_vector(point: &ScoredPoint, vector_name: &str) -> Option<Vec<f32>> {
	let output = match point.vectors.as_ref()?.vectors_options.as_ref()? {
		VectorsOptions::Vector(output) => output,
		VectorsOptions::Vectors(named) => named.vectors.get(vector_name)?,
	};

	dense_data(output)
}

#[allow(deprecated)]
fn dense_data(output: &VectorOutput) -> Option<Vec<f32>> {
	match &output.vector {
		Some(Vector::Dense(dense)) => Some(dense.data.clone()),
		Some(_) => None,
		None if !output.data.is_empty() => Some(output.data.clone()),
		None => None,
	}
}
