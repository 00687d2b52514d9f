use sift_config::{DistanceMetric, Qdrant};
use sift_storage::{Error, NearestQuery, QdrantStore};

fn qdrant_config() -> Qdrant {
	Qdrant {
		url: "http://127.0.0.1:6334".to_string(),
		vector_name: "dense".to_string(),
		vector_dim: 4,
		document_field: "body".to_string(),
		distance: DistanceMetric::Dot,
	}
}

#[tokio::test]
async fn store_layout_follows_config() {
	let store = QdrantStore::new(&qdrant_config()).expect("Failed to create Qdrant store.");

	assert_eq!(store.layout.vector_name, "dense");
	assert_eq!(store.layout.document_field, "body");
	assert_eq!(store.layout.distance, DistanceMetric::Dot);
}

#[tokio::test]
async fn invalid_filters_fail_before_any_request() {
	let store = QdrantStore::new(&qdrant_config()).expect("Failed to create Qdrant store.");
	let query = NearestQuery {
		collection: "docs".to_string(),
		vector: vec![0.0; 4],
		limit: 5,
		r#where: Some(serde_json::json!({ "year": { "$between": [1, 2] } })),
		where_document: None,
	};
	let err = store.query(&query).await.expect_err("Filter translation must fail.");

	assert!(matches!(err, Error::InvalidFilter { ref path, .. } if path == "$.where.year.$between"));
}
