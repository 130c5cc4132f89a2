//! # jobly
//!
//! PostgreSQL data access for a job board: companies, jobs, users and the
//! applications that link users to jobs.
//!
//! ## Features
//!
//! - **Partial updates**: `sql_for_partial_update` turns a sparse payload into a
//!   parameterized `SET` clause, translating API field names to columns
//! - **Search filters**: `build_filter` validates query-string criteria and
//!   turns them into a parameterized `WHERE` clause
//! - **Generic record access**: `Repo<E>` runs create/get/find/update/remove
//!   for any `Entity`
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **SQL logging**: wrap any client in `TracingClient` to trace each statement
//!
//! ```ignore
//! use jobly::{Companies, FilterCriteria, UpdatePayload};
//!
//! let companies = Companies::find_all(&client, &FilterCriteria::new()
//!     .with("minEmployees", "10")
//!     .with("name", "net"))
//!     .await?;
//!
//! let company = Companies::update(&client, "c1", UpdatePayload::new()
//!     .set("numEmployees", 12)
//!     .set("logoUrl", None::<String>))
//!     .await?;
//! ```

pub mod clause;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod ident;
pub mod logging;
pub mod models;
pub mod repo;
pub mod row;
pub mod sql;
pub mod update;
pub mod value;

pub use clause::{Connective, ParameterizedClause};
pub use client::GenericClient;
pub use config::JoblyConfig;
pub use entity::{Entity, NewRecord};
pub use error::{JoblyError, JoblyResult};
pub use filter::{Criterion, CriterionKind, CriterionSpec, FilterCriteria, build_filter, escape_like};
pub use ident::Ident;
pub use logging::{SqlLogConfig, StatementKind, TracingClient};
pub use models::{
    Application, Companies, Company, CompanyWithJobs, Job, JobWithCompany, Jobs, NewCompany,
    NewJob, NewUser, User, UserWithApplications, Users,
};
pub use repo::Repo;
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};
pub use update::{FieldMap, UpdatePayload, sql_for_partial_update};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use client::PoolClient;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "migrate")]
pub mod migrate;
