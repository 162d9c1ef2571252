//! Collapses flattened join rows into one ordered list per entity type.
//!
//! Entities are compared by natural key, not by surrogate id, except patients, which have no
//! business key and are compared by id. A null key is a key like any other: every entity with a
//! null key collapses into the first one seen.

use std::{collections::HashSet, hash::Hash};

use serde::Serialize;

use remit_storage::{
	models::{ClaimQuery, Patient, Payer, Payment, Remittance},
	projector::{ClaimRow, PaymentRow, RemittanceRow},
};

pub trait NaturalKey {
	type Key: Eq + Hash;

	fn natural_key(&self) -> Self::Key;
}
impl NaturalKey for ClaimQuery {
	type Key = Option<String>;

	fn natural_key(&self) -> Self::Key {
		self.payer_claim_id.clone()
	}
}

impl NaturalKey for Patient {
	type Key = i64;

	fn natural_key(&self) -> Self::Key {
		self.id
	}
}

impl NaturalKey for Payer {
	type Key = Option<String>;

	fn natural_key(&self) -> Self::Key {
		self.payer_identity.clone()
	}
}

impl NaturalKey for Payment {
	type Key = Option<String>;

	fn natural_key(&self) -> Self::Key {
		self.payment_number.clone()
	}
}

impl NaturalKey for Remittance {
	type Key = Option<String>;

	fn natural_key(&self) -> Self::Key {
		self.remittance_advice_id.clone()
	}
}

/// Deduplicated entities of the by-claim, by-patient and by-remittance-id lookups.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClaimResultSet {
	pub claims: Vec<ClaimQuery>,
	pub patients: Vec<Patient>,
	pub payers: Vec<Payer>,
	pub payments: Vec<Payment>,
	pub remittances: Vec<Remittance>,
}
impl ClaimResultSet {
	pub fn is_empty(&self) -> bool {
		self.claims.is_empty()
			&& self.patients.is_empty()
			&& self.payers.is_empty()
			&& self.payments.is_empty()
			&& self.remittances.is_empty()
	}
}

/// Deduplicated entities of the by-payment lookup. Patients are never part of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PaymentResultSet {
	pub claims: Vec<ClaimQuery>,
	pub payers: Vec<Payer>,
	pub payments: Vec<Payment>,
	pub remittances: Vec<Remittance>,
}
impl PaymentResultSet {
	pub fn is_empty(&self) -> bool {
		self.claims.is_empty()
			&& self.payers.is_empty()
			&& self.payments.is_empty()
			&& self.remittances.is_empty()
	}
}

struct Seen<T>
where
	T: NaturalKey,
{
	keys: HashSet<T::Key>,
	items: Vec<T>,
}
impl<T> Seen<T>
where
	T: NaturalKey + Clone,
{
	fn new() -> Self {
		Self { keys: HashSet::new(), items: Vec::new() }
	}

	fn offer(&mut self, item: Option<&T>) {
		let Some(item) = item else {
			return;
		};

		if self.keys.insert(item.natural_key()) {
			self.items.push(item.clone());
		}
	}

	fn into_items(self) -> Vec<T> {
		self.items
	}
}

pub fn dedup_claim_rows(rows: &[ClaimRow]) -> ClaimResultSet {
	let mut claims = Seen::new();
	let mut patients = Seen::new();
	let mut payers = Seen::new();
	let mut payments = Seen::new();
	let mut remittances = Seen::new();

	for row in rows {
		claims.offer(Some(&row.claim));
		patients.offer(row.patient.as_ref());
		payers.offer(row.payer.as_ref());
		payments.offer(row.payment.as_ref());
		remittances.offer(row.remittance.as_ref());
	}

	ClaimResultSet {
		claims: claims.into_items(),
		patients: patients.into_items(),
		payers: payers.into_items(),
		payments: payments.into_items(),
		remittances: remittances.into_items(),
	}
}

pub fn dedup_payment_rows(rows: &[PaymentRow]) -> PaymentResultSet {
	let mut claims = Seen::new();
	let mut payers = Seen::new();
	let mut payments = Seen::new();
	let mut remittances = Seen::new();

	for row in rows {
		claims.offer(Some(&row.claim));
		payers.offer(row.payer.as_ref());
		payments.offer(row.payment.as_ref());
		remittances.offer(row.remittance.as_ref());
	}

	PaymentResultSet {
		claims: claims.into_items(),
		payers: payers.into_items(),
		payments: payments.into_items(),
		remittances: remittances.into_items(),
	}
}

pub fn dedup_remittance_rows(rows: &[RemittanceRow]) -> ClaimResultSet {
	let mut claims = Seen::new();
	let mut patients = Seen::new();
	let mut payers = Seen::new();
	let mut payments = Seen::new();
	let mut remittances = Seen::new();

	for row in rows {
		claims.offer(Some(&row.claim));
		patients.offer(row.patient.as_ref());
		payers.offer(row.payer.as_ref());
		payments.offer(row.payment.as_ref());
		remittances.offer(Some(&row.remittance));
	}

	ClaimResultSet {
		claims: claims.into_items(),
		patients: patients.into_items(),
		payers: payers.into_items(),
		payments: payments.into_items(),
		remittances: remittances.into_items(),
	}
}
