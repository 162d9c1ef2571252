use serde::{Deserialize, Serialize};

use remit_storage::{
	criteria::RemittanceLookupRequest,
	models::{ClaimQuery, Payer, Payment, RemittanceAdviceType},
	projector::RemittanceRow,
};

use crate::{Error, RemitService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemittanceDocumentRequest {
	pub remittance_advice_id: String,
	/// Falls back to `lookup.default_document_type` when absent.
	pub remittance_advice_type: Option<RemittanceAdviceType>,
}

/// Everything a renderer needs for one remittance advice document.
///
/// The header entities come from the first projected row; `rows` feeds the line items.
#[derive(Clone, Debug, Serialize)]
pub struct RemittanceDocumentSource {
	pub document_type: RemittanceAdviceType,
	pub claim: ClaimQuery,
	pub payer: Option<Payer>,
	pub payment: Option<Payment>,
	pub rows: Vec<RemittanceRow>,
}

impl RemitService {
	pub async fn remittance_document(
		&self,
		req: &RemittanceDocumentRequest,
	) -> Result<Option<RemittanceDocumentSource>> {
		let document_type = match req.remittance_advice_type {
			Some(document_type) => document_type,
			None => self.default_document_type()?,
		};
		let lookup = RemittanceLookupRequest::new(req.remittance_advice_id.as_str());
		let rows = self.remittance_rows(&lookup).await?;

		Ok(document_source(document_type, rows))
	}

	fn default_document_type(&self) -> Result<RemittanceAdviceType> {
		self.cfg.lookup.default_document_type.parse().map_err(|err: remit_storage::Error| {
			Error::InvalidRequest { message: err.to_string() }
		})
	}
}

fn document_source(
	document_type: RemittanceAdviceType,
	rows: Vec<RemittanceRow>,
) -> Option<RemittanceDocumentSource> {
	let first = rows.first()?;
	let claim = first.claim.clone();
	let payer = first.payer.clone();
	let payment = first.payment.clone();

	Some(RemittanceDocumentSource { document_type, claim, payer, payment, rows })
}

#[cfg(test)]
mod tests {
	use remit_storage::{
		models::{ClaimQuery, Payer, Payment, Remittance, RemittanceAdviceType},
		projector::RemittanceRow,
	};

	use crate::document::document_source;

	fn row(claim_id: i64, payment_number: &str) -> RemittanceRow {
		RemittanceRow {
			claim: ClaimQuery {
				id: claim_id,
				provider_tin: Some("123456789".to_string()),
				provider_claim_id: Some("provider_claimid_1".to_string()),
				payer_claim_id: Some(format!("payer_claim_id_{claim_id}")),
				provider_npi: None,
				subscriber_patient_id: None,
				claim_charge_amount: None,
				date_of_service: None,
				received_date: None,
				patient_id: None,
				payer_id: Some(1),
			},
			patient: None,
			payer: Some(Payer {
				id: 1,
				payer_name: Some("PAYER_NAME_1".to_string()),
				payer_identity: Some("Payer_ID_VAL_1".to_string()),
			}),
			payment: Some(Payment {
				id: claim_id,
				claim_id: Some(claim_id),
				payment_number: Some(payment_number.to_string()),
				amount: None,
				payment_issue_date: None,
				remittance_id: None,
			}),
			remittance: Remittance {
				id: claim_id,
				claim_id: Some(claim_id),
				remittance_advice_id: Some("rem_adviceid_1".to_string()),
				remittance_advice_type: Some("PDF".to_string()),
				remittance_advice_date: None,
				remittance_advice_file_size: Some(123),
			},
		}
	}

	#[test]
	fn header_comes_from_the_first_row() {
		let source = document_source(
			RemittanceAdviceType::Edi835,
			vec![row(7, "PAYMENT_NUMBER_1"), row(8, "PAYMENT_NUMBER_2")],
		)
		.expect("Expected a document source.");

		assert_eq!(source.document_type, RemittanceAdviceType::Edi835);
		assert_eq!(source.claim.id, 7);
		assert_eq!(
			source.payment.and_then(|payment| payment.payment_number).as_deref(),
			Some("PAYMENT_NUMBER_1")
		);
		assert_eq!(source.rows.len(), 2);
	}

	#[test]
	fn no_rows_means_no_document() {
		assert!(document_source(RemittanceAdviceType::Pdf, Vec::new()).is_none());
	}
}
