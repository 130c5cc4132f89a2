#![allow(dead_code)]

use jobly::{
    Companies, GenericClient, Job, JoblyError, JoblyResult, Jobs, NewCompany, NewJob, NewUser,
    Users,
};
use tokio_postgres::NoTls;

static MIGRATE_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Connect and migrate, or `None` when `DATABASE_URL` is not set.
pub async fn connect(test: &str) -> JoblyResult<Option<tokio_postgres::Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(|e| JoblyError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    {
        let _guard = MIGRATE_LOCK.lock().await;
        jobly::migrate::run(&mut client).await?;
    }
    Ok(Some(client))
}

pub fn new_company(n: i32) -> NewCompany {
    NewCompany {
        handle: format!("c{n}"),
        name: format!("C{n}"),
        num_employees: Some(n),
        description: format!("Desc{n}"),
        logo_url: Some(format!("http://c{n}.img")),
    }
}

pub fn new_user(n: i32) -> NewUser {
    NewUser {
        username: format!("u{n}"),
        password: format!("password{n}"),
        first_name: format!("U{n}F"),
        last_name: format!("U{n}L"),
        email: format!("user{n}@user.com"),
        is_admin: false,
    }
}

/// Companies c1..c3, users u1..u2 and four jobs at c1:
/// J1 (1, 0.1), J2 (2, 0.2), J3 (3, 0.0), J4 (no salary, no equity).
pub async fn seed(conn: &impl GenericClient) -> JoblyResult<Vec<Job>> {
    for n in 1..=3 {
        Companies::create(conn, &new_company(n)).await?;
    }
    for n in 1..=2 {
        Users::create(conn, &new_user(n)).await?;
    }

    let specs = [
        ("J1", Some(1), Some(0.1)),
        ("J2", Some(2), Some(0.2)),
        ("J3", Some(3), Some(0.0)),
        ("J4", None, None),
    ];
    let mut jobs = Vec::with_capacity(specs.len());
    for (title, salary, equity) in specs {
        let new = NewJob {
            title: title.to_string(),
            salary,
            equity,
            company_handle: "c1".to_string(),
        };
        jobs.push(Jobs::create(conn, &new).await?);
    }
    Ok(jobs)
}
