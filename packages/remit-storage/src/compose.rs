use sqlx::{Postgres, QueryBuilder};

use crate::{
	Error, Result,
	criteria::{Criteria, MatchKind, Operand, PredicateSpec, substring_pattern},
	plan::{JoinPlan, Relation},
};

/// Renders one SELECT for `plan` filtered by the active predicates of `criteria`.
///
/// Columns are aliased `<relation alias>_<column>` so decoders never depend on positional order.
pub fn compose(plan: &JoinPlan, criteria: &Criteria) -> Result<QueryBuilder<'static, Postgres>> {
	if plan.variant() != criteria.variant() {
		return Err(Error::InvalidArgument(format!(
			"Join plan for {} cannot run criteria for {}.",
			plan.variant(),
			criteria.variant()
		)));
	}

	for relation in criteria.manifest() {
		if !plan.includes(relation) {
			return Err(Error::InvalidArgument(format!(
				"Criteria for {} filter on {}, which the plan does not join.",
				criteria.variant(),
				relation.table()
			)));
		}
	}

	let mut builder = QueryBuilder::new("SELECT ");

	builder.push(select_list(plan.columns()));
	builder.push(" FROM ");
	builder.push(Relation::Claim.table());
	builder.push(" ");
	builder.push(Relation::Claim.alias());

	for (relation, kind) in plan.joins() {
		if let Some(condition) = relation.join_condition() {
			builder.push(format!(
				" {} {} {} ON {condition}",
				kind.keyword(),
				relation.table(),
				relation.alias()
			));
		}
	}

	let mut first = true;

	for predicate in criteria.active() {
		builder.push(if first { " WHERE " } else { " AND " });

		first = false;

		push_predicate(&mut builder, predicate)?;
	}

	Ok(builder)
}

fn select_list(relations: &[Relation]) -> String {
	relations
		.iter()
		.flat_map(|relation| {
			relation.columns().iter().map(move |column| {
				format!("{alias}.{column} AS {alias}_{column}", alias = relation.alias())
			})
		})
		.collect::<Vec<_>>()
		.join(", ")
}

fn push_predicate(
	builder: &mut QueryBuilder<'static, Postgres>,
	predicate: &PredicateSpec,
) -> Result<()> {
	let column = predicate.field.qualified();

	match (predicate.kind, &predicate.operand) {
		(MatchKind::Equals, Operand::Text(value)) => {
			builder.push(format!("{column} = "));
			builder.push_bind(value.clone());
		},
		(MatchKind::Equals, Operand::Date(value)) => {
			builder.push(format!("{column} = "));
			builder.push_bind(*value);
		},
		(MatchKind::Equals, Operand::Amount(value)) => {
			builder.push(format!("{column} = "));
			builder.push_bind(*value);
		},
		(MatchKind::SubstringCi, Operand::Text(value)) => {
			builder.push(format!("LOWER({column}) LIKE "));
			builder.push_bind(value.as_deref().map(substring_pattern));
		},
		(MatchKind::Range, Operand::DateRange { start, end }) => {
			builder.push(format!("{column} BETWEEN "));
			builder.push_bind(*start);
			builder.push(" AND ");
			builder.push_bind(*end);
		},
		(MatchKind::Range, Operand::AmountRange { low, high }) => {
			builder.push(format!("{column} BETWEEN "));
			builder.push_bind(*low);
			builder.push(" AND ");
			builder.push_bind(*high);
		},
		(kind, operand) =>
			return Err(Error::InvalidArgument(format!(
				"Match kind {kind:?} does not accept operand {operand:?} for {column}."
			))),
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use rust_decimal::Decimal;
	use time::macros::date;

	use crate::{
		compose::compose,
		criteria::{
			AmountRange, ClaimSearchRequest, CriteriaBuilder, DateRange, Field,
			PatientSearchRequest, PaymentSearchRequest, RemittanceLookupRequest, Requirement,
		},
		plan::{JoinPlan, SearchVariant},
	};

	fn sql_for(variant: SearchVariant, criteria: &crate::criteria::Criteria) -> String {
		compose(&JoinPlan::for_variant(variant), criteria)
			.expect("Failed to compose query.")
			.sql()
			.to_string()
	}

	fn where_clause(sql: &str) -> &str {
		sql.split_once(" WHERE ").map(|(_, tail)| tail).unwrap_or("")
	}

	#[test]
	fn claim_search_binds_required_fields_without_values() {
		let sql = sql_for(SearchVariant::ByClaim, &ClaimSearchRequest::default().criteria());

		assert_eq!(where_clause(&sql), "c.provider_tin = $1 AND c.provider_claim_id = $2");
	}

	#[test]
	fn claim_search_left_joins_every_relation() {
		let sql = sql_for(SearchVariant::ByClaim, &ClaimSearchRequest::default().criteria());

		assert!(sql.contains(" FROM claim_query c LEFT JOIN patient pt ON pt.id = c.patient_id"));
		assert!(sql.contains(" LEFT JOIN payer py ON py.id = c.payer_id"));
		assert!(sql.contains(" LEFT JOIN payment pm ON pm.claim_id = c.id"));
		assert!(sql.contains(" LEFT JOIN remittance r ON r.claim_id = c.id"));
	}

	#[test]
	fn claim_search_with_all_optionals() {
		let req = ClaimSearchRequest {
			tin: Some("123456789".to_string()),
			provider_claim_id: Some("provider_claimid_1".to_string()),
			date_of_service: DateRange::new(Some(date!(2024 - 05 - 05)), Some(date!(2024 - 07 - 05))),
			subscriber_patient_id: Some("subscriber_patient_id_1".to_string()),
			provider_npi: Some("provider_npi_1".to_string()),
			payer_claim_id: Some("payer_claim_id_1".to_string()),
			claim_charge_amount: Some(Decimal::new(10_000, 2)),
			payer_identity: Some("Payer_ID_VAL_1".to_string()),
			payer_name: Some("PAYER_NAME_1".to_string()),
		};
		let sql = sql_for(SearchVariant::ByClaim, &req.criteria());

		assert_eq!(
			where_clause(&sql),
			"c.provider_tin = $1 \
			 AND py.payer_name = $2 \
			 AND py.payer_identity = $3 \
			 AND c.date_of_service BETWEEN $4 AND $5 \
			 AND c.provider_claim_id = $6 \
			 AND c.subscriber_patient_id = $7 \
			 AND c.provider_npi = $8 \
			 AND c.payer_claim_id = $9 \
			 AND c.claim_charge_amount = $10"
		);
	}

	#[test]
	fn patient_search_filters_on_patient_join() {
		let req = PatientSearchRequest {
			tin: Some("123456789".to_string()),
			subscriber_patient_id: Some("subscriber_patient_id_1".to_string()),
			date_of_birth: Some(date!(1980 - 05 - 05)),
			patient_first_name: Some("PatientName1".to_string()),
			..Default::default()
		};
		let sql = sql_for(SearchVariant::ByPatient, &req.criteria());

		assert_eq!(
			where_clause(&sql),
			"c.provider_tin = $1 \
			 AND c.subscriber_patient_id = $2 \
			 AND pt.date_of_birth = $3 \
			 AND pt.first_name = $4"
		);
	}

	#[test]
	fn payment_search_projects_four_relations() {
		let sql = sql_for(SearchVariant::ByPayment, &PaymentSearchRequest::default().criteria());

		assert!(!sql.contains("patient pt"));
		assert!(!sql.contains("pt_id"));
		assert!(sql.starts_with("SELECT c.id AS c_id, "));
		assert!(sql.contains("py.id AS py_id"));
		assert!(sql.contains("pm.payment_number AS pm_payment_number"));
		assert!(sql.contains("r.remittance_advice_id AS r_remittance_advice_id"));
	}

	#[test]
	fn payment_search_uses_case_insensitive_substring_and_required_issue_range() {
		let req = PaymentSearchRequest {
			tin: Some("123456789".to_string()),
			payment_number: Some("PAYMENT_N".to_string()),
			payment_issue_date: DateRange::new(
				Some(date!(2024 - 05 - 10)),
				Some(date!(2024 - 05 - 11)),
			),
			payment_amount: AmountRange::new(
				Some(Decimal::new(9_000, 2)),
				Some(Decimal::new(11_000, 2)),
			),
			..Default::default()
		};
		let sql = sql_for(SearchVariant::ByPayment, &req.criteria());

		assert_eq!(
			where_clause(&sql),
			"c.provider_tin = $1 \
			 AND pm.payment_issue_date BETWEEN $2 AND $3 \
			 AND LOWER(pm.payment_number) LIKE $4 \
			 AND pm.amount BETWEEN $5 AND $6"
		);
	}

	#[test]
	fn payment_amount_with_one_bound_is_not_filtered() {
		let req = PaymentSearchRequest {
			payment_amount: AmountRange::new(None, Some(Decimal::new(11_000, 2))),
			..Default::default()
		};
		let sql = sql_for(SearchVariant::ByPayment, &req.criteria());

		assert!(!sql.contains("pm.amount BETWEEN"));
	}

	#[test]
	fn remittance_lookup_inner_joins_remittance() {
		let sql = sql_for(
			SearchVariant::ByRemittanceId,
			&RemittanceLookupRequest::new("rem_adviceid_1").criteria(),
		);

		assert!(sql.contains(" LEFT JOIN payment pm ON pm.claim_id = c.id JOIN remittance r ON r.claim_id = c.id"));
		assert_eq!(where_clause(&sql), "r.remittance_advice_id = $1");
	}

	#[test]
	fn mismatched_variant_is_rejected() {
		let criteria = ClaimSearchRequest::default().criteria();

		assert!(compose(&JoinPlan::for_variant(SearchVariant::ByPayment), &criteria).is_err());
	}

	#[test]
	fn predicate_on_unjoined_relation_is_rejected() {
		let criteria = CriteriaBuilder::new(SearchVariant::ByPayment)
			.text(Field::PatientFirstName, Some("PatientName1"), Requirement::Optional)
			.build();

		assert!(compose(&JoinPlan::for_variant(SearchVariant::ByPayment), &criteria).is_err());
	}
}
