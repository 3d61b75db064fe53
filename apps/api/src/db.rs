use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the visit log table if it does not exist yet.
pub async fn ensure_visit_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reader_visits (
            id            UUID PRIMARY KEY,
            client_id     TEXT NOT NULL,
            post_id       BIGINT,
            category_ids  BIGINT[] NOT NULL DEFAULT '{}',
            payload       JSONB NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS reader_visits_client_idx ON reader_visits (client_id, created_at)",
    )
    .execute(pool)
    .await?;

    info!("reader_visits table ready");
    Ok(())
}
