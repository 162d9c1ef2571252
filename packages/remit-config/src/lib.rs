mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Lookup, Postgres, Service, Storage};

use std::{fs, path::Path};

pub const DOCUMENT_TYPES: [&str; 2] = ["PDF", "835"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if !DOCUMENT_TYPES.contains(&cfg.lookup.default_document_type.as_str()) {
		return Err(Error::Validation {
			message: "lookup.default_document_type must be one of PDF or 835.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.storage.postgres.dsn = cfg.storage.postgres.dsn.trim().to_string();
	cfg.lookup.default_document_type = cfg.lookup.default_document_type.trim().to_uppercase();
}
