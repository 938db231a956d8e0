use crate::db::Tables;

pub fn render_schema(tables: &Tables) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<CATALOG>", &tables.catalog).replace("<SUGGESTIONS>", &tables.suggestions)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_catalog_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_catalog_documents.sql")),
				"tables/002_catalog_events.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_catalog_events.sql")),
				"tables/003_search_suggestions.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_search_suggestions.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
