mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DistanceMetric, EmbeddingProviderConfig, Providers, Qdrant, Search, SearchRrf, Service,
	Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("storage.qdrant.url", &cfg.storage.qdrant.url),
		("storage.qdrant.vector_name", &cfg.storage.qdrant.vector_name),
		("storage.qdrant.document_field", &cfg.storage.qdrant.document_field),
		("providers.embedding.api_base", &cfg.providers.embedding.api_base),
		("providers.embedding.model", &cfg.providers.embedding.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.providers.embedding.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("providers.embedding.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.search.default_knn_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_knn_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	let path = cfg.providers.embedding.path.trim();

	if !path.is_empty() && !path.starts_with('/') {
		cfg.providers.embedding.path = format!("/{path}");
	}

	let api_base = cfg.providers.embedding.api_base.trim_end_matches('/');

	if api_base.len() != cfg.providers.embedding.api_base.len() {
		cfg.providers.embedding.api_base = api_base.to_string();
	}
}
