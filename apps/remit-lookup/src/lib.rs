use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use time::{Date, macros::format_description};
use tracing_subscriber::EnvFilter;

use remit_service::{
	AmountRange, ClaimSearchRequest, DateRange, PatientSearchRequest, PaymentSearchRequest,
	RemitService, RemittanceAdviceType, RemittanceDocumentRequest, RemittanceLookupRequest,
};
use remit_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = remit_cli::VERSION,
	rename_all = "kebab",
	styles = remit_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Create missing tables before running the lookup.
	#[arg(long)]
	pub ensure_schema: bool,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	ByClaim {
		#[arg(long)]
		tin: Option<String>,
		#[arg(long)]
		provider_claim_id: Option<String>,
		#[arg(long, value_parser = parse_date)]
		dos_start: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		dos_end: Option<Date>,
		#[arg(long)]
		subscriber_patient_id: Option<String>,
		#[arg(long)]
		provider_npi: Option<String>,
		#[arg(long)]
		payer_claim_id: Option<String>,
		#[arg(long)]
		claim_charge_amount: Option<Decimal>,
		#[arg(long)]
		payer_identity: Option<String>,
		#[arg(long)]
		payer_name: Option<String>,
	},
	ByPatient {
		#[arg(long)]
		tin: Option<String>,
		#[arg(long)]
		subscriber_patient_id: Option<String>,
		#[arg(long, value_parser = parse_date)]
		date_of_birth: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		dos_start: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		dos_end: Option<Date>,
		#[arg(long)]
		payer_identity: Option<String>,
		#[arg(long)]
		payer_name: Option<String>,
		#[arg(long)]
		first_name: Option<String>,
		#[arg(long)]
		last_name: Option<String>,
	},
	ByPayment {
		#[arg(long)]
		tin: Option<String>,
		#[arg(long)]
		payment_number: Option<String>,
		#[arg(long, value_parser = parse_date)]
		issued_start: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		issued_end: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		dos_start: Option<Date>,
		#[arg(long, value_parser = parse_date)]
		dos_end: Option<Date>,
		#[arg(long)]
		payer_identity: Option<String>,
		#[arg(long)]
		payer_name: Option<String>,
		#[arg(long)]
		amount_low: Option<Decimal>,
		#[arg(long)]
		amount_high: Option<Decimal>,
	},
	ByRemittance {
		#[arg(long)]
		remittance_advice_id: String,
		/// Print the document source for this format instead of the deduplicated set.
		#[arg(long, value_parser = parse_document_type)]
		document: Option<RemittanceAdviceType>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = remit_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let db = Db::connect(&config.storage.postgres).await?;

	if args.ensure_schema {
		db.ensure_schema().await?;
	}

	let service = RemitService::new(config, db);
	let output = execute(&service, args.command).await?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

async fn execute(service: &RemitService, command: Command) -> color_eyre::Result<Value> {
	let output = match command {
		Command::ByClaim {
			tin,
			provider_claim_id,
			dos_start,
			dos_end,
			subscriber_patient_id,
			provider_npi,
			payer_claim_id,
			claim_charge_amount,
			payer_identity,
			payer_name,
		} => {
			let req = ClaimSearchRequest {
				tin,
				provider_claim_id,
				date_of_service: DateRange::new(dos_start, dos_end),
				subscriber_patient_id,
				provider_npi,
				payer_claim_id,
				claim_charge_amount,
				payer_identity,
				payer_name,
			};

			serde_json::to_value(service.search_by_claim(&req).await?)?
		},
		Command::ByPatient {
			tin,
			subscriber_patient_id,
			date_of_birth,
			dos_start,
			dos_end,
			payer_identity,
			payer_name,
			first_name,
			last_name,
		} => {
			let req = PatientSearchRequest {
				tin,
				subscriber_patient_id,
				date_of_birth,
				date_of_service: DateRange::new(dos_start, dos_end),
				payer_identity,
				payer_name,
				patient_first_name: first_name,
				patient_last_name: last_name,
			};

			serde_json::to_value(service.search_by_patient(&req).await?)?
		},
		Command::ByPayment {
			tin,
			payment_number,
			issued_start,
			issued_end,
			dos_start,
			dos_end,
			payer_identity,
			payer_name,
			amount_low,
			amount_high,
		} => {
			let req = PaymentSearchRequest {
				tin,
				payment_number,
				payment_issue_date: DateRange::new(issued_start, issued_end),
				date_of_service: DateRange::new(dos_start, dos_end),
				payer_identity,
				payer_name,
				payment_amount: AmountRange::new(amount_low, amount_high),
			};

			serde_json::to_value(service.search_by_payment(&req).await?)?
		},
		Command::ByRemittance { remittance_advice_id, document: None } => {
			let req = RemittanceLookupRequest::new(remittance_advice_id);

			serde_json::to_value(service.lookup_by_remittance_id(&req).await?)?
		},
		Command::ByRemittance { remittance_advice_id, document: Some(document_type) } => {
			let req = RemittanceDocumentRequest {
				remittance_advice_id,
				remittance_advice_type: Some(document_type),
			};

			serde_json::to_value(service.remittance_document(&req).await?)?
		},
	};

	Ok(output)
}

fn parse_date(raw: &str) -> Result<Date, String> {
	Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
		.map_err(|err| format!("Expected YYYY-MM-DD: {err}."))
}

fn parse_document_type(raw: &str) -> Result<RemittanceAdviceType, String> {
	raw.parse::<RemittanceAdviceType>().map_err(|err| err.to_string())
}
