#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("{path}: {message}")]
	InvalidFilter { path: String, message: String },
	#[error("Not found: {0}")]
	NotFound(String),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl Error {
	pub(crate) fn filter(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidFilter { path: path.into(), message: message.into() }
	}
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		let message = err.to_string();
		let lowered = message.to_lowercase();

		if lowered.contains("not found") || lowered.contains("doesn't exist") {
			return Self::NotFound(message);
		}

		Self::Qdrant(Box::new(err))
	}
}
