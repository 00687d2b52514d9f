pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search request is missing a ranking specification.")]
	MissingRank,
	#[error("Invalid request at {field}: {message}")]
	InvalidRequest { message: String, field: String },
	#[error("Unsupported search target {key}. Only #embedding can be searched.")]
	UnsupportedTarget { key: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Store error: {message}")]
	Store { message: String },
}
impl Error {
	pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: field.into() }
	}
}
impl From<sift_storage::Error> for Error {
	fn from(err: sift_storage::Error) -> Self {
		match err {
			sift_storage::Error::InvalidArgument(message) =>
				Self::InvalidRequest { message, field: "$".to_string() },
			sift_storage::Error::InvalidFilter { path, message } =>
				Self::InvalidRequest { message, field: path },
			sift_storage::Error::NotFound(message) => Self::NotFound { message },
			sift_storage::Error::Qdrant(inner) => Self::Store { message: inner.to_string() },
		}
	}
}
impl From<sift_providers::Error> for Error {
	fn from(err: sift_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
