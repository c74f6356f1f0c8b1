// src/schema/ddl.rs
//! SQL text for schema creation and the stage-then-merge load.
//!
//! Every statement is built from registry data; header column names reach
//! here only after they were matched against the table's declared columns.

use super::order;
use super::registry::ENUM_TYPES;
use super::types::{EnumType, TableSchema};
use anyhow::Result;

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Idempotent enum declaration: a repeat run swallows `duplicate_object`.
pub fn create_enum_sql(e: &EnumType) -> String {
    let labels = e
        .labels
        .iter()
        .map(|l| quote_literal(l))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "DO $$ BEGIN\n    CREATE TYPE {} AS ENUM ({});\nEXCEPTION\n    WHEN duplicate_object THEN null;\nEND $$;",
        quote_ident(e.name),
        labels
    )
}

/// `CREATE TABLE IF NOT EXISTS`; an existing table is never altered.
pub fn create_table_sql(schema: &TableSchema) -> String {
    let mut lines = Vec::with_capacity(schema.columns.len());
    for col in schema.columns {
        let mut line = format!("    {} {}", quote_ident(col.name), col.ty);
        if col.name == schema.primary_key {
            line.push_str(" PRIMARY KEY");
        }
        if let Some(fk) = schema
            .foreign_keys
            .iter()
            .find(|fk| fk.enforced && fk.column == col.name)
        {
            line.push_str(" REFERENCES ");
            line.push_str(&quote_ident(fk.parent.as_str()));
        }
        lines.push(line);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        quote_ident(schema.table_name()),
        lines.join(",\n")
    )
}

pub fn staging_table_name(schema: &TableSchema) -> String {
    format!("{}_staging", schema.table_name())
}

/// Transaction-scoped staging table with the permanent table's layout.
///
/// Indexes are not copied so that repeated identifiers inside one file are
/// resolved by the merge instead of failing the copy.
pub fn create_staging_sql(schema: &TableSchema) -> String {
    format!(
        "CREATE TEMPORARY TABLE {} (LIKE {} INCLUDING DEFAULTS) ON COMMIT DROP;",
        quote_ident(&staging_table_name(schema)),
        quote_ident(schema.table_name())
    )
}

pub fn copy_into_staging_sql(schema: &TableSchema, columns: &[&str]) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv, HEADER true)",
        quote_ident(&staging_table_name(schema)),
        column_list(columns)
    )
}

/// Conflict-skip upsert from staging into the permanent table.
pub fn merge_from_staging_sql(schema: &TableSchema, columns: &[&str]) -> String {
    let cols = column_list(columns);
    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {} ON CONFLICT ({}) DO NOTHING;",
        quote_ident(schema.table_name()),
        cols,
        cols,
        quote_ident(&staging_table_name(schema)),
        quote_ident(schema.primary_key)
    )
}

/// Every enum type followed by every table, in load order.
pub fn schema_script() -> Result<String> {
    let mut parts: Vec<String> = ENUM_TYPES.iter().map(create_enum_sql).collect();
    for dataset in order::load_order()? {
        parts.push(create_table_sql(dataset.schema()));
    }
    Ok(parts.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DatasetType;

    #[test]
    fn enum_declaration_tolerates_duplicates() {
        let sql = create_enum_sql(EnumType::find("vote_option").unwrap());
        assert!(sql.starts_with("DO $$ BEGIN"));
        assert!(sql.contains(
            "CREATE TYPE \"vote_option\" AS ENUM ('yes', 'no', 'not voting', 'absent', 'excused', 'other');"
        ));
        assert!(sql.contains("WHEN duplicate_object THEN null;"));
    }

    #[test]
    fn literals_and_identifiers_are_escaped() {
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn table_ddl_declares_keys_and_references() {
        let sql = create_table_sql(DatasetType::Votes.schema());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"votes\" ("));
        assert!(sql.contains("\"id\" UUID PRIMARY KEY,"));
        assert!(sql.contains("\"motion_classification\" bill_action_classification[],"));
        assert!(sql.contains("\"bill_id\" UUID REFERENCES \"bills\","));
        assert!(sql.contains("\"bill_action_id\" UUID REFERENCES \"bill_actions\","));
        assert!(sql.contains("\"session_identifier\" VARCHAR(16)\n);"));
    }

    #[test]
    fn soft_dependencies_emit_no_reference() {
        let sql = create_table_sql(DatasetType::BillSponsorships.schema());
        assert!(sql.contains("\"person_id\" UUID,"));
        assert!(sql.contains("\"bill_id\" UUID REFERENCES \"bills\","));
    }

    #[test]
    fn staging_statements_target_the_staging_table() {
        let schema = DatasetType::Bills.schema();
        let cols = ["id", "title", "classification"];
        assert_eq!(
            create_staging_sql(schema),
            "CREATE TEMPORARY TABLE \"bills_staging\" (LIKE \"bills\" INCLUDING DEFAULTS) ON COMMIT DROP;"
        );
        assert_eq!(
            copy_into_staging_sql(schema, &cols),
            "COPY \"bills_staging\" (\"id\", \"title\", \"classification\") FROM STDIN WITH (FORMAT csv, HEADER true)"
        );
        assert_eq!(
            merge_from_staging_sql(schema, &cols),
            "INSERT INTO \"bills\" (\"id\", \"title\", \"classification\") \
             SELECT \"id\", \"title\", \"classification\" FROM \"bills_staging\" \
             ON CONFLICT (\"id\") DO NOTHING;"
        );
    }

    #[test]
    fn full_script_declares_types_before_tables() -> Result<()> {
        let script = schema_script()?;
        let last_enum = script.rfind("CREATE TYPE").unwrap();
        let first_table = script.find("CREATE TABLE").unwrap();
        assert!(last_enum < first_table);
        assert_eq!(script.matches("CREATE TABLE IF NOT EXISTS").count(), 14);
        assert_eq!(script.matches("CREATE TYPE").count(), 7);
        Ok(())
    }
}
