//! Embedded schema migrations via [`refinery`].
//!
//! The job-board schema lives in `migrations/` and is compiled into the crate.
//!
//! ```ignore
//! let pool = jobly::create_pool(&url)?;
//! jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// The runner for the embedded job-board migrations.
pub fn runner() -> refinery::Runner {
    embedded::migrations::runner()
}

/// Apply pending migrations on a `tokio_postgres::Client`.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = runner().run_async(client).await?;
    tracing::info!(
        target: "jobly.migrate",
        applied = report.applied_migrations().len(),
        "migrations complete"
    );
    Ok(report)
}

/// Apply pending migrations using a connection from a deadpool pool.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
