use tracing::{debug, warn};

use remit_storage::{
	criteria::{
		ClaimSearchRequest, Criteria, PatientSearchRequest, PaymentSearchRequest,
		RemittanceLookupRequest,
	},
	projector::{self, RemittanceRow},
};

use crate::{ClaimResultSet, PaymentResultSet, RemitService, Result, dedup};

impl RemitService {
	pub async fn search_by_claim(&self, req: &ClaimSearchRequest) -> Result<ClaimResultSet> {
		let criteria = req.criteria();
		let rows = observe(&criteria, projector::fetch_claim_rows(&self.db.pool, &criteria).await)?;
		let set = dedup::dedup_claim_rows(&rows);

		log_claim_set(&criteria, &set);

		Ok(set)
	}

	pub async fn search_by_patient(&self, req: &PatientSearchRequest) -> Result<ClaimResultSet> {
		let criteria = req.criteria();
		let rows = observe(&criteria, projector::fetch_claim_rows(&self.db.pool, &criteria).await)?;
		let set = dedup::dedup_claim_rows(&rows);

		log_claim_set(&criteria, &set);

		Ok(set)
	}

	pub async fn search_by_payment(&self, req: &PaymentSearchRequest) -> Result<PaymentResultSet> {
		let criteria = req.criteria();
		let rows =
			observe(&criteria, projector::fetch_payment_rows(&self.db.pool, &criteria).await)?;
		let set = dedup::dedup_payment_rows(&rows);

		debug!(
			variant = %criteria.variant(),
			claims = set.claims.len(),
			payers = set.payers.len(),
			payments = set.payments.len(),
			remittances = set.remittances.len(),
			"Deduplicated lookup rows."
		);

		Ok(set)
	}

	/// Every claim line that shares the remittance advice, deduplicated.
	pub async fn lookup_by_remittance_id(
		&self,
		req: &RemittanceLookupRequest,
	) -> Result<ClaimResultSet> {
		let rows = self.remittance_rows(req).await?;
		let set = dedup::dedup_remittance_rows(&rows);

		log_claim_set(&req.criteria(), &set);

		Ok(set)
	}

	/// Raw projected rows of the remittance lookup, in storage order.
	pub async fn remittance_rows(&self, req: &RemittanceLookupRequest) -> Result<Vec<RemittanceRow>> {
		let criteria = req.criteria();

		observe(&criteria, projector::fetch_remittance_rows(&self.db.pool, &criteria).await)
	}
}

fn observe<R>(criteria: &Criteria, result: remit_storage::Result<Vec<R>>) -> Result<Vec<R>> {
	match result {
		Ok(rows) => {
			debug!(
				variant = %criteria.variant(),
				predicates = criteria.active().count(),
				rows = rows.len(),
				"Projected lookup rows."
			);

			Ok(rows)
		},
		Err(err) => {
			warn!(error = %err, variant = %criteria.variant(), "Lookup projection failed.");

			Err(err.into())
		},
	}
}

fn log_claim_set(criteria: &Criteria, set: &ClaimResultSet) {
	debug!(
		variant = %criteria.variant(),
		claims = set.claims.len(),
		patients = set.patients.len(),
		payers = set.payers.len(),
		payments = set.payments.len(),
		remittances = set.remittances.len(),
		"Deduplicated lookup rows."
	);
}
