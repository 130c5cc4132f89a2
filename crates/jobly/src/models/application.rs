use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::models::job::Job;
use crate::models::user::User;
use crate::repo::Repo;
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use serde::Serialize;
use tokio_postgres::Row;

/// A user's application to a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub username: String,
    pub job_id: i32,
}

impl FromRow for Application {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            job_id: row.try_get_column("job_id")?,
        })
    }
}

/// Record an application.
///
/// The job is checked first, then the user; either missing is `NotFound`.
/// Applying twice to the same job is `Duplicate`.
pub async fn apply_to_job(
    conn: &impl GenericClient,
    username: &str,
    job_id: i32,
) -> JoblyResult<Application> {
    if !Repo::<Job>::exists(conn, job_id).await? {
        return Err(JoblyError::not_found(format!("No job: {job_id}")));
    }
    if !Repo::<User>::exists(conn, username).await? {
        return Err(JoblyError::not_found(format!("No user: {username}")));
    }

    let mut probe = sql("SELECT 1 FROM applications WHERE username = ");
    probe.push_bind(username).push(" AND job_id = ").push_bind(job_id);
    if probe.fetch_opt(conn).await?.is_some() {
        return Err(JoblyError::duplicate(format!(
            "Duplicate application: {username} to job {job_id}"
        )));
    }

    let mut q = sql("INSERT INTO applications (username, job_id) VALUES (");
    q.push_bind(username).push(", ").push_bind(job_id);
    q.push(") RETURNING username, job_id");
    let application = q.fetch_one_as(conn).await?;

    tracing::debug!(table = "applications", job_id, "recorded application");
    Ok(application)
}

/// Ids of the jobs `username` applied to, ascending.
pub async fn job_ids_for_user(conn: &impl GenericClient, username: &str) -> JoblyResult<Vec<i32>> {
    let mut q = sql("SELECT job_id FROM applications WHERE username = ");
    q.push_bind(username).push(" ORDER BY job_id");

    let rows = q.fetch_all(conn).await?;
    rows.iter().map(|row| row.try_get_column("job_id")).collect()
}
