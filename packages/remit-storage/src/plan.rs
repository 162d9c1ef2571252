//! Join planning: which relations a search variant joins, with what join semantics, and the
//! fixed order in which their columns are projected.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchVariant {
	ByClaim,
	ByPatient,
	ByPayment,
	ByRemittanceId,
}
impl SearchVariant {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ByClaim => "by_claim",
			Self::ByPatient => "by_patient",
			Self::ByPayment => "by_payment",
			Self::ByRemittanceId => "by_remittance_id",
		}
	}
}
impl fmt::Display for SearchVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
	Claim,
	Patient,
	Payer,
	Payment,
	Remittance,
}
impl Relation {
	pub fn table(self) -> &'static str {
		match self {
			Self::Claim => "claim_query",
			Self::Patient => "patient",
			Self::Payer => "payer",
			Self::Payment => "payment",
			Self::Remittance => "remittance",
		}
	}

	/// Table alias, also the prefix of every projected column of this relation.
	pub fn alias(self) -> &'static str {
		match self {
			Self::Claim => "c",
			Self::Patient => "pt",
			Self::Payer => "py",
			Self::Payment => "pm",
			Self::Remittance => "r",
		}
	}

	pub fn columns(self) -> &'static [&'static str] {
		match self {
			Self::Claim => &[
				"id",
				"provider_tin",
				"provider_claim_id",
				"payer_claim_id",
				"provider_npi",
				"subscriber_patient_id",
				"claim_charge_amount",
				"date_of_service",
				"received_date",
				"patient_id",
				"payer_id",
			],
			Self::Patient => &["id", "first_name", "last_name", "date_of_birth"],
			Self::Payer => &["id", "payer_name", "payer_identity"],
			Self::Payment =>
				&["id", "claim_id", "payment_number", "amount", "payment_issue_date", "remittance_id"],
			Self::Remittance => &[
				"id",
				"claim_id",
				"remittance_advice_id",
				"remittance_advice_type",
				"remittance_advice_date",
				"remittance_advice_file_size",
			],
		}
	}

	/// Join condition against the root claim. `None` for the root itself.
	pub fn join_condition(self) -> Option<&'static str> {
		match self {
			Self::Claim => None,
			Self::Patient => Some("pt.id = c.patient_id"),
			Self::Payer => Some("py.id = c.payer_id"),
			Self::Payment => Some("pm.claim_id = c.id"),
			Self::Remittance => Some("r.claim_id = c.id"),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
	Inner,
	Left,
}
impl JoinKind {
	pub fn keyword(self) -> &'static str {
		match self {
			Self::Inner => "JOIN",
			Self::Left => "LEFT JOIN",
		}
	}
}

pub const CLAIM_LAYOUT: [Relation; 5] =
	[Relation::Claim, Relation::Patient, Relation::Payer, Relation::Payment, Relation::Remittance];
pub const PAYMENT_LAYOUT: [Relation; 4] =
	[Relation::Claim, Relation::Payer, Relation::Payment, Relation::Remittance];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinPlan {
	variant: SearchVariant,
	columns: &'static [Relation],
	remittance_join: JoinKind,
}
impl JoinPlan {
	pub fn for_variant(variant: SearchVariant) -> Self {
		match variant {
			SearchVariant::ByClaim | SearchVariant::ByPatient =>
				Self { variant, columns: &CLAIM_LAYOUT, remittance_join: JoinKind::Left },
			SearchVariant::ByPayment =>
				Self { variant, columns: &PAYMENT_LAYOUT, remittance_join: JoinKind::Left },
			// The filter sits on the remittance, so it must exist.
			SearchVariant::ByRemittanceId =>
				Self { variant, columns: &CLAIM_LAYOUT, remittance_join: JoinKind::Inner },
		}
	}

	pub fn variant(&self) -> SearchVariant {
		self.variant
	}

	/// Projected relations in column order. The root claim is always first.
	pub fn columns(&self) -> &'static [Relation] {
		self.columns
	}

	pub fn includes(&self, relation: Relation) -> bool {
		self.columns.contains(&relation)
	}

	pub fn join_kind(&self, relation: Relation) -> Option<JoinKind> {
		match relation {
			Relation::Claim => None,
			Relation::Remittance if self.includes(relation) => Some(self.remittance_join),
			_ if self.includes(relation) => Some(JoinKind::Left),
			_ => None,
		}
	}

	pub fn joins(&self) -> impl Iterator<Item = (Relation, JoinKind)> + '_ {
		self.columns
			.iter()
			.filter_map(|relation| self.join_kind(*relation).map(|kind| (*relation, kind)))
	}
}
