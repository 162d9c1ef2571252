//! Search parameter bundles and the predicate specifications they compose into.
//!
//! A bundle never decides whether a predicate is emitted; it records every field with its value,
//! requirement and match kind. [`PredicateSpec::is_active`] applies the presence rules and
//! [`crate::compose`] renders the active ones.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::plan::{Relation, SearchVariant};

const WILD_CARD: char = '%';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
	ProviderTin,
	ProviderClaimId,
	PayerClaimId,
	ProviderNpi,
	SubscriberPatientId,
	ClaimChargeAmount,
	DateOfService,
	PatientDateOfBirth,
	PatientFirstName,
	PatientLastName,
	PayerIdentity,
	PayerName,
	PaymentNumber,
	PaymentAmount,
	PaymentIssueDate,
	RemittanceAdviceId,
}
impl Field {
	pub fn relation(self) -> Relation {
		match self {
			Self::ProviderTin
			| Self::ProviderClaimId
			| Self::PayerClaimId
			| Self::ProviderNpi
			| Self::SubscriberPatientId
			| Self::ClaimChargeAmount
			| Self::DateOfService => Relation::Claim,
			Self::PatientDateOfBirth | Self::PatientFirstName | Self::PatientLastName =>
				Relation::Patient,
			Self::PayerIdentity | Self::PayerName => Relation::Payer,
			Self::PaymentNumber | Self::PaymentAmount | Self::PaymentIssueDate => Relation::Payment,
			Self::RemittanceAdviceId => Relation::Remittance,
		}
	}

	pub fn column(self) -> &'static str {
		match self {
			Self::ProviderTin => "provider_tin",
			Self::ProviderClaimId => "provider_claim_id",
			Self::PayerClaimId => "payer_claim_id",
			Self::ProviderNpi => "provider_npi",
			Self::SubscriberPatientId => "subscriber_patient_id",
			Self::ClaimChargeAmount => "claim_charge_amount",
			Self::DateOfService => "date_of_service",
			Self::PatientDateOfBirth => "date_of_birth",
			Self::PatientFirstName => "first_name",
			Self::PatientLastName => "last_name",
			Self::PayerIdentity => "payer_identity",
			Self::PayerName => "payer_name",
			Self::PaymentNumber => "payment_number",
			Self::PaymentAmount => "amount",
			Self::PaymentIssueDate => "payment_issue_date",
			Self::RemittanceAdviceId => "remittance_advice_id",
		}
	}

	/// Qualified column reference, e.g. `c.provider_tin`.
	pub fn qualified(self) -> String {
		format!("{}.{}", self.relation().alias(), self.column())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
	Equals,
	/// Case-insensitive, wildcarded on both sides.
	SubstringCi,
	/// Inclusive on both ends.
	Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
	Required,
	Optional,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
	Text(Option<String>),
	Date(Option<Date>),
	Amount(Option<Decimal>),
	DateRange { start: Option<Date>, end: Option<Date> },
	AmountRange { low: Option<Decimal>, high: Option<Decimal> },
}
impl Operand {
	/// Non-null and, for text, non-blank. Ranges need both bounds.
	pub fn is_present(&self) -> bool {
		match self {
			Self::Text(value) => value.as_deref().is_some_and(|value| !value.trim().is_empty()),
			Self::Date(value) => value.is_some(),
			Self::Amount(value) => value.is_some(),
			Self::DateRange { start, end } => start.is_some() && end.is_some(),
			Self::AmountRange { low, high } => low.is_some() && high.is_some(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredicateSpec {
	pub field: Field,
	pub operand: Operand,
	pub requirement: Requirement,
	pub kind: MatchKind,
}
impl PredicateSpec {
	pub fn is_required(&self) -> bool {
		self.requirement == Requirement::Required
	}

	/// Required predicates are always emitted, even with a null value, so a missing required value
	/// matches nothing instead of widening the search.
	pub fn is_active(&self) -> bool {
		self.is_required() || self.operand.is_present()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Criteria {
	variant: SearchVariant,
	predicates: Vec<PredicateSpec>,
}
impl Criteria {
	pub fn variant(&self) -> SearchVariant {
		self.variant
	}

	pub fn predicates(&self) -> &[PredicateSpec] {
		&self.predicates
	}

	pub fn active(&self) -> impl Iterator<Item = &PredicateSpec> {
		self.predicates.iter().filter(|predicate| predicate.is_active())
	}

	/// Relations referenced by active predicates, deduplicated and sorted.
	pub fn manifest(&self) -> Vec<Relation> {
		let mut relations =
			self.active().map(|predicate| predicate.field.relation()).collect::<Vec<_>>();

		relations.sort();
		relations.dedup();

		relations
	}
}

pub struct CriteriaBuilder {
	variant: SearchVariant,
	predicates: Vec<PredicateSpec>,
}
impl CriteriaBuilder {
	pub fn new(variant: SearchVariant) -> Self {
		Self { variant, predicates: Vec::new() }
	}

	pub fn text(mut self, field: Field, value: Option<&str>, requirement: Requirement) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::Text(value.map(str::to_string)),
			requirement,
			kind: MatchKind::Equals,
		});

		self
	}

	pub fn date(mut self, field: Field, value: Option<Date>, requirement: Requirement) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::Date(value),
			requirement,
			kind: MatchKind::Equals,
		});

		self
	}

	pub fn amount(mut self, field: Field, value: Option<Decimal>, requirement: Requirement) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::Amount(value),
			requirement,
			kind: MatchKind::Equals,
		});

		self
	}

	pub fn substring(mut self, field: Field, value: Option<&str>, requirement: Requirement) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::Text(value.map(str::to_string)),
			requirement,
			kind: MatchKind::SubstringCi,
		});

		self
	}

	pub fn date_range(mut self, field: Field, range: &DateRange, requirement: Requirement) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::DateRange { start: range.start, end: range.end },
			requirement,
			kind: MatchKind::Range,
		});

		self
	}

	pub fn amount_range(
		mut self,
		field: Field,
		range: &AmountRange,
		requirement: Requirement,
	) -> Self {
		self.predicates.push(PredicateSpec {
			field,
			operand: Operand::AmountRange { low: range.low, high: range.high },
			requirement,
			kind: MatchKind::Range,
		});

		self
	}

	/// Filters every search except the remittance lookup shares.
	fn common(
		self,
		tin: Option<&str>,
		date_of_service: &DateRange,
		payer_identity: Option<&str>,
		payer_name: Option<&str>,
	) -> Self {
		self.text(Field::ProviderTin, tin, Requirement::Required)
			.text(Field::PayerName, payer_name, Requirement::Optional)
			.text(Field::PayerIdentity, payer_identity, Requirement::Optional)
			.date_range(Field::DateOfService, date_of_service, Requirement::Optional)
	}

	pub fn build(self) -> Criteria {
		Criteria { variant: self.variant, predicates: self.predicates }
	}
}

/// Lower-cased, trimmed value wrapped in `%` on both sides.
pub fn substring_pattern(value: &str) -> String {
	format!("{WILD_CARD}{}{WILD_CARD}", value.trim().to_lowercase())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
	pub start: Option<Date>,
	pub end: Option<Date>,
}
impl DateRange {
	pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
		Self { start, end }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
	pub low: Option<Decimal>,
	pub high: Option<Decimal>,
}
impl AmountRange {
	pub fn new(low: Option<Decimal>, high: Option<Decimal>) -> Self {
		Self { low, high }
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClaimSearchRequest {
	pub tin: Option<String>,
	pub provider_claim_id: Option<String>,
	#[serde(default)]
	pub date_of_service: DateRange,
	pub subscriber_patient_id: Option<String>,
	pub provider_npi: Option<String>,
	pub payer_claim_id: Option<String>,
	pub claim_charge_amount: Option<Decimal>,
	pub payer_identity: Option<String>,
	pub payer_name: Option<String>,
}
impl ClaimSearchRequest {
	pub fn criteria(&self) -> Criteria {
		CriteriaBuilder::new(SearchVariant::ByClaim)
			.common(
				self.tin.as_deref(),
				&self.date_of_service,
				self.payer_identity.as_deref(),
				self.payer_name.as_deref(),
			)
			.text(Field::ProviderClaimId, self.provider_claim_id.as_deref(), Requirement::Required)
			.text(
				Field::SubscriberPatientId,
				self.subscriber_patient_id.as_deref(),
				Requirement::Optional,
			)
			.text(Field::ProviderNpi, self.provider_npi.as_deref(), Requirement::Optional)
			.text(Field::PayerClaimId, self.payer_claim_id.as_deref(), Requirement::Optional)
			.amount(Field::ClaimChargeAmount, self.claim_charge_amount, Requirement::Optional)
			.build()
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PatientSearchRequest {
	pub tin: Option<String>,
	pub subscriber_patient_id: Option<String>,
	pub date_of_birth: Option<Date>,
	#[serde(default)]
	pub date_of_service: DateRange,
	pub payer_identity: Option<String>,
	pub payer_name: Option<String>,
	pub patient_first_name: Option<String>,
	pub patient_last_name: Option<String>,
}
impl PatientSearchRequest {
	pub fn criteria(&self) -> Criteria {
		CriteriaBuilder::new(SearchVariant::ByPatient)
			.common(
				self.tin.as_deref(),
				&self.date_of_service,
				self.payer_identity.as_deref(),
				self.payer_name.as_deref(),
			)
			.text(
				Field::SubscriberPatientId,
				self.subscriber_patient_id.as_deref(),
				Requirement::Required,
			)
			.date(Field::PatientDateOfBirth, self.date_of_birth, Requirement::Required)
			.text(Field::PatientFirstName, self.patient_first_name.as_deref(), Requirement::Optional)
			.text(Field::PatientLastName, self.patient_last_name.as_deref(), Requirement::Optional)
			.build()
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentSearchRequest {
	pub tin: Option<String>,
	pub payment_number: Option<String>,
	#[serde(default)]
	pub payment_issue_date: DateRange,
	#[serde(default)]
	pub date_of_service: DateRange,
	pub payer_identity: Option<String>,
	pub payer_name: Option<String>,
	#[serde(default)]
	pub payment_amount: AmountRange,
}
impl PaymentSearchRequest {
	pub fn criteria(&self) -> Criteria {
		CriteriaBuilder::new(SearchVariant::ByPayment)
			.common(
				self.tin.as_deref(),
				&self.date_of_service,
				self.payer_identity.as_deref(),
				self.payer_name.as_deref(),
			)
			.date_range(Field::PaymentIssueDate, &self.payment_issue_date, Requirement::Required)
			.substring(Field::PaymentNumber, self.payment_number.as_deref(), Requirement::Required)
			.amount_range(Field::PaymentAmount, &self.payment_amount, Requirement::Optional)
			.build()
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemittanceLookupRequest {
	pub remittance_advice_id: Option<String>,
}
impl RemittanceLookupRequest {
	pub fn new(remittance_advice_id: impl Into<String>) -> Self {
		Self { remittance_advice_id: Some(remittance_advice_id.into()) }
	}

	pub fn criteria(&self) -> Criteria {
		CriteriaBuilder::new(SearchVariant::ByRemittanceId)
			.text(
				Field::RemittanceAdviceId,
				self.remittance_advice_id.as_deref(),
				Requirement::Required,
			)
			.build()
	}
}

#[cfg(test)]
mod tests {
	use rust_decimal::Decimal;
	use time::macros::date;

	use crate::{
		criteria::{
			AmountRange, ClaimSearchRequest, DateRange, Field, MatchKind, PatientSearchRequest,
			PaymentSearchRequest, RemittanceLookupRequest, substring_pattern,
		},
		plan::Relation,
	};

	fn active_fields(criteria: &crate::criteria::Criteria) -> Vec<Field> {
		criteria.active().map(|predicate| predicate.field).collect()
	}

	#[test]
	fn required_fields_stay_active_without_values() {
		let criteria = ClaimSearchRequest::default().criteria();

		assert_eq!(active_fields(&criteria), vec![Field::ProviderTin, Field::ProviderClaimId]);
	}

	#[test]
	fn blank_optional_text_is_dropped() {
		let req = ClaimSearchRequest {
			tin: Some("123456789".to_string()),
			provider_claim_id: Some("provider_claimid_1".to_string()),
			payer_name: Some("   ".to_string()),
			payer_identity: Some("Payer_ID_VAL_1".to_string()),
			..Default::default()
		};
		let fields = active_fields(&req.criteria());

		assert!(!fields.contains(&Field::PayerName));
		assert!(fields.contains(&Field::PayerIdentity));
	}

	#[test]
	fn one_sided_optional_range_is_dropped() {
		let start_only = ClaimSearchRequest {
			date_of_service: DateRange::new(Some(date!(2024 - 05 - 05)), None),
			..Default::default()
		};
		let end_only = ClaimSearchRequest {
			date_of_service: DateRange::new(None, Some(date!(2024 - 07 - 05))),
			..Default::default()
		};
		let both = ClaimSearchRequest {
			date_of_service: DateRange::new(Some(date!(2024 - 05 - 05)), Some(date!(2024 - 07 - 05))),
			..Default::default()
		};

		assert!(!active_fields(&start_only.criteria()).contains(&Field::DateOfService));
		assert!(!active_fields(&end_only.criteria()).contains(&Field::DateOfService));
		assert!(active_fields(&both.criteria()).contains(&Field::DateOfService));
	}

	#[test]
	fn payment_issue_date_is_required_even_when_open() {
		let criteria = PaymentSearchRequest {
			payment_amount: AmountRange::new(Some(Decimal::new(9_000, 2)), None),
			..Default::default()
		}
		.criteria();
		let fields = active_fields(&criteria);

		assert!(fields.contains(&Field::PaymentIssueDate));
		assert!(fields.contains(&Field::PaymentNumber));
		assert!(!fields.contains(&Field::PaymentAmount));
	}

	#[test]
	fn payment_number_is_substring_match() {
		let criteria = PaymentSearchRequest::default().criteria();
		let predicate = criteria
			.predicates()
			.iter()
			.find(|predicate| predicate.field == Field::PaymentNumber)
			.expect("payment number predicate");

		assert_eq!(predicate.kind, MatchKind::SubstringCi);
		assert_eq!(substring_pattern("  PAYMENT_N "), "%payment_n%");
	}

	#[test]
	fn patient_search_references_patient_relation() {
		let criteria = PatientSearchRequest {
			tin: Some("123456789".to_string()),
			subscriber_patient_id: Some("subscriber_patient_id_1".to_string()),
			date_of_birth: Some(date!(1980 - 05 - 05)),
			..Default::default()
		}
		.criteria();

		assert_eq!(criteria.manifest(), vec![Relation::Claim, Relation::Patient]);
	}

	#[test]
	fn payment_search_never_references_patient() {
		let criteria = PaymentSearchRequest {
			payer_name: Some("PAYER_NAME_1".to_string()),
			..Default::default()
		}
		.criteria();

		assert_eq!(criteria.manifest(), vec![Relation::Claim, Relation::Payer, Relation::Payment]);
	}

	#[test]
	fn remittance_lookup_has_a_single_required_predicate() {
		let criteria = RemittanceLookupRequest::new("rem_adviceid_1").criteria();

		assert_eq!(active_fields(&criteria), vec![Field::RemittanceAdviceId]);
		assert_eq!(criteria.manifest(), vec![Relation::Remittance]);
	}
}
