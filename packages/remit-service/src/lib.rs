pub mod dedup;
pub mod document;
pub mod search;

mod error;

pub use dedup::{ClaimResultSet, NaturalKey, PaymentResultSet};
pub use document::{RemittanceDocumentRequest, RemittanceDocumentSource};
pub use error::{Error, Result};
pub use remit_storage::{
	criteria::{
		AmountRange, ClaimSearchRequest, DateRange, PatientSearchRequest, PaymentSearchRequest,
		RemittanceLookupRequest,
	},
	models::RemittanceAdviceType,
	projector::{ClaimRow, PaymentRow, RemittanceRow},
};

use remit_config::Config;
use remit_storage::db::Db;

/// Read-only lookups over stored claims, payments and remittances.
///
/// Every call is independent; the pool is the only shared state.
pub struct RemitService {
	pub cfg: Config,
	pub db: Db,
}
impl RemitService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db }
	}
}
