use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// One billed claim line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimQuery {
	pub id: i64,
	pub provider_tin: Option<String>,
	pub provider_claim_id: Option<String>,
	pub payer_claim_id: Option<String>,
	pub provider_npi: Option<String>,
	pub subscriber_patient_id: Option<String>,
	pub claim_charge_amount: Option<Decimal>,
	pub date_of_service: Option<Date>,
	pub received_date: Option<Date>,
	pub patient_id: Option<i64>,
	pub payer_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
	pub id: i64,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub date_of_birth: Option<Date>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payer {
	pub id: i64,
	pub payer_name: Option<String>,
	pub payer_identity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
	pub id: i64,
	pub claim_id: Option<i64>,
	pub payment_number: Option<String>,
	pub amount: Option<Decimal>,
	pub payment_issue_date: Option<Date>,
	pub remittance_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Remittance {
	pub id: i64,
	pub claim_id: Option<i64>,
	pub remittance_advice_id: Option<String>,
	/// Stored code, "PDF" or "835". See [`Remittance::advice_type`].
	pub remittance_advice_type: Option<String>,
	pub remittance_advice_date: Option<Date>,
	pub remittance_advice_file_size: Option<i32>,
}
impl Remittance {
	pub fn advice_type(&self) -> Option<RemittanceAdviceType> {
		self.remittance_advice_type.as_deref().and_then(|code| code.parse().ok())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemittanceAdviceType {
	#[serde(rename = "PDF")]
	Pdf,
	#[serde(rename = "835")]
	Edi835,
}
impl RemittanceAdviceType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pdf => "PDF",
			Self::Edi835 => "835",
		}
	}
}
impl fmt::Display for RemittanceAdviceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for RemittanceAdviceType {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let code = raw.trim();

		if code.eq_ignore_ascii_case("pdf") {
			Ok(Self::Pdf)
		} else if code == "835" {
			Ok(Self::Edi835)
		} else {
			Err(Error::InvalidArgument(format!("Unknown remittance advice type {code:?}.")))
		}
	}
}
