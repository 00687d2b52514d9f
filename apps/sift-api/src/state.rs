use std::sync::Arc;

use sift_service::SiftService;
use sift_storage::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
}
impl AppState {
	pub fn new(config: sift_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = SiftService::new(config, qdrant);

		Ok(Self::with_service(service))
	}

	pub fn with_service(service: SiftService) -> Self {
		Self { service: Arc::new(service) }
	}
}
