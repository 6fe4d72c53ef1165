//! SQL statement builders
//!
//! Every identifier is double-quoted, so names with capitals, spaces or
//! reserved words reach the database unchanged.

use super::TableRef;

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

pub fn truncate_sql(table: &TableRef) -> String {
    format!("TRUNCATE TABLE {}", table.qualified())
}

/// Single-row prepared insert with positional placeholders
pub fn insert_sql(table: &TableRef, columns: &[String]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.qualified(),
        column_list(columns),
        placeholders
    )
}

/// `COPY ... FROM STDIN` in CSV format, with `\N` as the null marker
pub fn copy_sql(table: &TableRef, columns: &[String]) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv, NULL '\\N')",
        table.qualified(),
        column_list(columns)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("Order Lines"), "\"Order Lines\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_statements() {
        let table = TableRef::new("sales", "orders");

        assert_eq!(
            create_schema_sql("sales"),
            "CREATE SCHEMA IF NOT EXISTS \"sales\""
        );
        assert_eq!(truncate_sql(&table), "TRUNCATE TABLE \"sales\".\"orders\"");
        assert_eq!(
            insert_sql(&table, &cols(&["id", "user"])),
            "INSERT INTO \"sales\".\"orders\" (\"id\", \"user\") VALUES (?, ?)"
        );
        assert_eq!(
            copy_sql(&table, &cols(&["id", "amount"])),
            "COPY \"sales\".\"orders\" (\"id\", \"amount\") FROM STDIN WITH (FORMAT csv, NULL '\\N')"
        );
    }
}
