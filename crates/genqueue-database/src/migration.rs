//! Namespace schema provisioning.
//!
//! Each namespace is a PostgreSQL schema holding one `generated_texts`
//! table. Provisioning is idempotent and runs at startup for every
//! configured namespace.

use sqlx::PgPool;
use tracing::info;

use genqueue_core::error::{AppError, ErrorKind};
use genqueue_core::types::Namespace;

/// Name of the results table inside every namespace schema.
pub const RESULTS_TABLE: &str = "generated_texts";

/// Qualified `"<namespace>".generated_texts` identifier.
pub fn results_table(namespace: &Namespace) -> String {
    format!("{}.{RESULTS_TABLE}", namespace.quoted_ident())
}

/// DDL statements that create a namespace schema and its results table.
pub fn namespace_ddl(namespace: &Namespace) -> Vec<String> {
    let schema = namespace.quoted_ident();
    let table = results_table(namespace);
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        format!(
            "CREATE TABLE IF NOT EXISTS {table} ( \
             id UUID PRIMARY KEY, \
             job_id UUID NOT NULL, \
             text TEXT NOT NULL, \
             model TEXT, \
             succeeded BOOLEAN NOT NULL DEFAULT TRUE, \
             created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {RESULTS_TABLE}_job_id_idx ON {table} (job_id)"
        ),
    ]
}

/// Create the schema and results table of every namespace if missing.
pub async fn provision_namespaces(pool: &PgPool, namespaces: &[Namespace]) -> Result<(), AppError> {
    for namespace in namespaces {
        info!(namespace = %namespace, "Provisioning result namespace");
        for statement in namespace_ddl(namespace) {
            sqlx::query(&statement).execute(pool).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to provision namespace '{namespace}': {e}"),
                    e,
                )
            })?;
        }
    }

    info!(count = namespaces.len(), "Result namespaces ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_table_is_quoted() {
        assert_eq!(
            results_table(&Namespace::new("SSP-dev")),
            "\"SSP-dev\".generated_texts"
        );
    }

    #[test]
    fn test_ddl_is_idempotent() {
        let ddl = namespace_ddl(&Namespace::new("SSP-prod"));
        assert_eq!(ddl.len(), 3);
        assert!(ddl[0].starts_with("CREATE SCHEMA IF NOT EXISTS \"SSP-prod\""));
        assert!(ddl[1].contains("CREATE TABLE IF NOT EXISTS \"SSP-prod\".generated_texts"));
        assert!(ddl.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
