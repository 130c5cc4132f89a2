//! Job-board records.

mod application;
mod company;
mod job;
mod user;

pub use application::{Application, apply_to_job, job_ids_for_user};
pub use company::{COMPANY_CRITERIA, COMPANY_FIELDS, Company, CompanyJob, CompanyWithJobs, NewCompany};
pub use job::{JOB_CRITERIA, JOB_FIELDS, Job, JobWithCompany, NewJob};
pub use user::{NewUser, USER_FIELDS, User, UserWithApplications};

use crate::repo::Repo;

pub type Companies = Repo<Company>;
pub type Jobs = Repo<Job>;
pub type Users = Repo<User>;
