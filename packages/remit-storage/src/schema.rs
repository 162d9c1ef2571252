pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_patient.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_patient.sql")),
				"tables/002_payer.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_payer.sql")),
				"tables/003_claim_query.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_claim_query.sql")),
				"tables/004_remittance.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_remittance.sql")),
				"tables/005_payment.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_payment.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
