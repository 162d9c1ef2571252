pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Data access error: {message}")]
	DataAccess { message: String },
	#[error("Query plan error: {message}")]
	QueryPlan { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::DataAccess { message: err.to_string() }
	}
}

impl From<remit_storage::Error> for Error {
	fn from(err: remit_storage::Error) -> Self {
		match err {
			remit_storage::Error::Sqlx(inner) => Self::DataAccess { message: inner.to_string() },
			remit_storage::Error::InvalidArgument(message) => Self::QueryPlan { message },
		}
	}
}
