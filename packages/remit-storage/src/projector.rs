use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Executor, Postgres, Row, postgres::PgRow};
use time::Date;

use crate::{
	Error, Result, compose,
	criteria::Criteria,
	models::{ClaimQuery, Patient, Payer, Payment, Remittance},
	plan::{CLAIM_LAYOUT, JoinPlan, PAYMENT_LAYOUT, Relation, SearchVariant},
};

/// A row type that knows the column layout it decodes.
pub trait ProjectedRow
where
	Self: Sized,
{
	const LAYOUT: &'static [Relation];

	fn decode(row: &PgRow) -> Result<Self>;
}

/// Row of the by-claim and by-patient searches.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClaimRow {
	pub claim: ClaimQuery,
	pub patient: Option<Patient>,
	pub payer: Option<Payer>,
	pub payment: Option<Payment>,
	pub remittance: Option<Remittance>,
}
impl ProjectedRow for ClaimRow {
	const LAYOUT: &'static [Relation] = &CLAIM_LAYOUT;

	fn decode(row: &PgRow) -> Result<Self> {
		Ok(Self {
			claim: decode_claim(row)?,
			patient: decode_patient(row)?,
			payer: decode_payer(row)?,
			payment: decode_payment(row)?,
			remittance: decode_remittance(row)?,
		})
	}
}

/// Row of the by-payment search. Patients are never projected here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentRow {
	pub claim: ClaimQuery,
	pub payer: Option<Payer>,
	pub payment: Option<Payment>,
	pub remittance: Option<Remittance>,
}
impl ProjectedRow for PaymentRow {
	const LAYOUT: &'static [Relation] = &PAYMENT_LAYOUT;

	fn decode(row: &PgRow) -> Result<Self> {
		Ok(Self {
			claim: decode_claim(row)?,
			payer: decode_payer(row)?,
			payment: decode_payment(row)?,
			remittance: decode_remittance(row)?,
		})
	}
}

/// Row of the remittance lookup. The remittance is inner-joined, so it is always present.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemittanceRow {
	pub claim: ClaimQuery,
	pub patient: Option<Patient>,
	pub payer: Option<Payer>,
	pub payment: Option<Payment>,
	pub remittance: Remittance,
}
impl ProjectedRow for RemittanceRow {
	const LAYOUT: &'static [Relation] = &CLAIM_LAYOUT;

	fn decode(row: &PgRow) -> Result<Self> {
		let remittance = decode_remittance(row)?.ok_or_else(|| {
			Error::InvalidArgument("Inner-joined remittance column is null.".to_string())
		})?;

		Ok(Self {
			claim: decode_claim(row)?,
			patient: decode_patient(row)?,
			payer: decode_payer(row)?,
			payment: decode_payment(row)?,
			remittance,
		})
	}
}

pub async fn fetch_claim_rows<'e, E>(executor: E, criteria: &Criteria) -> Result<Vec<ClaimRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	expect_variant(criteria, &[SearchVariant::ByClaim, SearchVariant::ByPatient])?;

	project(executor, criteria).await
}

pub async fn fetch_payment_rows<'e, E>(executor: E, criteria: &Criteria) -> Result<Vec<PaymentRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	expect_variant(criteria, &[SearchVariant::ByPayment])?;

	project(executor, criteria).await
}

pub async fn fetch_remittance_rows<'e, E>(
	executor: E,
	criteria: &Criteria,
) -> Result<Vec<RemittanceRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	expect_variant(criteria, &[SearchVariant::ByRemittanceId])?;

	project(executor, criteria).await
}

/// Runs the composed statement once and decodes every row in storage order. Nothing is
/// deduplicated here: a claim with N remittances yields N rows.
pub async fn project<'e, E, R>(executor: E, criteria: &Criteria) -> Result<Vec<R>>
where
	E: Executor<'e, Database = Postgres>,
	R: ProjectedRow,
{
	let plan = JoinPlan::for_variant(criteria.variant());

	if plan.columns() != R::LAYOUT {
		return Err(Error::InvalidArgument(format!(
			"Row layout {:?} does not match the {} projection {:?}.",
			R::LAYOUT,
			plan.variant(),
			plan.columns()
		)));
	}

	let mut builder = compose::compose(&plan, criteria)?;
	let rows = builder.build().fetch_all(executor).await?;

	rows.iter().map(R::decode).collect()
}

fn expect_variant(criteria: &Criteria, allowed: &[SearchVariant]) -> Result<()> {
	if allowed.contains(&criteria.variant()) {
		Ok(())
	} else {
		Err(Error::InvalidArgument(format!(
			"Criteria for {} cannot be projected here.",
			criteria.variant()
		)))
	}
}

fn column(relation: Relation, name: &str) -> String {
	format!("{}_{name}", relation.alias())
}

fn get<'r, T>(row: &'r PgRow, relation: Relation, name: &str) -> Result<T>
where
	T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
	Ok(row.try_get(column(relation, name).as_str())?)
}

/// Left-joined relations come back with a null id when absent.
fn present(row: &PgRow, relation: Relation) -> Result<Option<i64>> {
	get::<Option<i64>>(row, relation, "id")
}

fn decode_claim(row: &PgRow) -> Result<ClaimQuery> {
	let relation = Relation::Claim;

	Ok(ClaimQuery {
		id: get::<i64>(row, relation, "id")?,
		provider_tin: get::<Option<String>>(row, relation, "provider_tin")?,
		provider_claim_id: get::<Option<String>>(row, relation, "provider_claim_id")?,
		payer_claim_id: get::<Option<String>>(row, relation, "payer_claim_id")?,
		provider_npi: get::<Option<String>>(row, relation, "provider_npi")?,
		subscriber_patient_id: get::<Option<String>>(row, relation, "subscriber_patient_id")?,
		claim_charge_amount: get::<Option<Decimal>>(row, relation, "claim_charge_amount")?,
		date_of_service: get::<Option<Date>>(row, relation, "date_of_service")?,
		received_date: get::<Option<Date>>(row, relation, "received_date")?,
		patient_id: get::<Option<i64>>(row, relation, "patient_id")?,
		payer_id: get::<Option<i64>>(row, relation, "payer_id")?,
	})
}

fn decode_patient(row: &PgRow) -> Result<Option<Patient>> {
	let relation = Relation::Patient;
	let Some(id) = present(row, relation)? else {
		return Ok(None);
	};

	Ok(Some(Patient {
		id,
		first_name: get::<Option<String>>(row, relation, "first_name")?,
		last_name: get::<Option<String>>(row, relation, "last_name")?,
		date_of_birth: get::<Option<Date>>(row, relation, "date_of_birth")?,
	}))
}

fn decode_payer(row: &PgRow) -> Result<Option<Payer>> {
	let relation = Relation::Payer;
	let Some(id) = present(row, relation)? else {
		return Ok(None);
	};

	Ok(Some(Payer {
		id,
		payer_name: get::<Option<String>>(row, relation, "payer_name")?,
		payer_identity: get::<Option<String>>(row, relation, "payer_identity")?,
	}))
}

fn decode_payment(row: &PgRow) -> Result<Option<Payment>> {
	let relation = Relation::Payment;
	let Some(id) = present(row, relation)? else {
		return Ok(None);
	};

	Ok(Some(Payment {
		id,
		claim_id: get::<Option<i64>>(row, relation, "claim_id")?,
		payment_number: get::<Option<String>>(row, relation, "payment_number")?,
		amount: get::<Option<Decimal>>(row, relation, "amount")?,
		payment_issue_date: get::<Option<Date>>(row, relation, "payment_issue_date")?,
		remittance_id: get::<Option<i64>>(row, relation, "remittance_id")?,
	}))
}

fn decode_remittance(row: &PgRow) -> Result<Option<Remittance>> {
	let relation = Relation::Remittance;
	let Some(id) = present(row, relation)? else {
		return Ok(None);
	};

	Ok(Some(Remittance {
		id,
		claim_id: get::<Option<i64>>(row, relation, "claim_id")?,
		remittance_advice_id: get::<Option<String>>(row, relation, "remittance_advice_id")?,
		remittance_advice_type: get::<Option<String>>(row, relation, "remittance_advice_type")?,
		remittance_advice_date: get::<Option<Date>>(row, relation, "remittance_advice_date")?,
		remittance_advice_file_size: get::<Option<i32>>(
			row,
			relation,
			"remittance_advice_file_size",
		)?,
	}))
}
