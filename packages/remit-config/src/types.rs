use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub lookup: Lookup,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Lookup {
	/// Document format handed to the renderer when a download request names none.
	/// One of "PDF" or "835".
	#[serde(default = "default_document_type")]
	pub default_document_type: String,
}
impl Default for Lookup {
	fn default() -> Self {
		Self { default_document_type: default_document_type() }
	}
}

fn default_document_type() -> String {
	"PDF".to_string()
}
