use crate::client::GenericClient;
use crate::entity::{Entity, NewRecord};
use crate::error::JoblyResult;
use crate::filter::{Criterion, CriterionKind, CriterionSpec};
use crate::models::company::Company;
use crate::repo::Repo;
use crate::row::{FromRow, RowExt};
use crate::update::FieldMap;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const JOB_FIELDS: FieldMap = FieldMap::new(&[("companyHandle", "company_handle")]);

pub const JOB_CRITERIA: CriterionSpec = CriterionSpec::new(&[
    Criterion::new("title", "title", CriterionKind::Substring),
    Criterion::new("minSalary", "salary", CriterionKind::LowerBound),
    Criterion::new("hasEquity", "equity", CriterionKind::Flag),
]);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

impl Entity for Job {
    const TABLE: &'static str = "jobs";
    const LABEL: &'static str = "job";
    const KEY_COLUMN: &'static str = "id";
    const SELECT_LIST: &'static str = "id, title, salary, equity, company_handle";
    const ORDER_BY: &'static str = "title, id";
    const FIELD_MAP: FieldMap = JOB_FIELDS;
    const CRITERIA: CriterionSpec = JOB_CRITERIA;
    const COLUMNS: &'static [&'static str] = &["id", "title", "salary", "equity", "company_handle"];
    const READ_ONLY: &'static [&'static str] = &["id", "company_handle"];

    type Key = i32;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

// The id is a serial, so there is nothing to probe before inserting.
impl NewRecord<Job> for NewJob {
    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("title", self.title.as_str().into()),
            ("salary", self.salary.into()),
            ("equity", self.equity.into()),
            ("company_handle", self.company_handle.as_str().into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    pub company: Company,
}

impl Job {
    /// Fetch a job together with the company that posted it.
    pub async fn get_with_company(
        conn: &impl GenericClient,
        id: i32,
    ) -> JoblyResult<JobWithCompany> {
        let job = Repo::<Job>::get(conn, id).await?;
        let company = Repo::<Company>::get(conn, job.company_handle.as_str()).await?;
        Ok(JobWithCompany { job, company })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoblyError;
    use crate::filter::{FilterCriteria, build_filter};
    use crate::ident::Ident;

    #[test]
    fn columns_are_plain_identifiers() {
        for (_, column) in JOB_FIELDS.pairs() {
            Ident::parse(column).unwrap();
        }
        for criterion in JOB_CRITERIA.criteria() {
            Ident::parse(criterion.column).unwrap();
        }
        for column in Job::SELECT_LIST.split(", ") {
            Ident::parse(column).unwrap();
        }
    }

    #[test]
    fn title_then_salary_then_equity() {
        let criteria = FilterCriteria::new()
            .with("hasEquity", "true")
            .with("minSalary", "2")
            .with("title", "j");
        let clause = build_filter(&criteria, &JOB_CRITERIA).unwrap();
        assert_eq!(
            clause.to_sql(),
            "title ILIKE $1 AND salary >= $2 AND equity > $3"
        );
        assert_eq!(
            clause.values(),
            &[
                SqlValue::Text("%j%".into()),
                SqlValue::Int(2),
                SqlValue::Int(0)
            ]
        );
    }

    #[test]
    fn has_equity_false_adds_nothing() {
        let criteria = FilterCriteria::new().with("hasEquity", "false");
        let clause = build_filter(&criteria, &JOB_CRITERIA).unwrap();
        assert!(clause.is_empty());
    }

    #[test]
    fn company_filters_are_not_job_filters() {
        let criteria = FilterCriteria::new().with("minEmployees", "2");
        let err = build_filter(&criteria, &JOB_CRITERIA).unwrap_err();
        assert!(matches!(err, JoblyError::InvalidCriteria(_)));
    }

    #[test]
    fn new_job_has_no_probe() {
        let new = NewJob {
            title: "J1".into(),
            salary: Some(1),
            equity: Some(0.1),
            company_handle: "c1".into(),
        };
        assert!(new.duplicate_probe().is_none());
        assert_eq!(new.columns()[2], ("equity", SqlValue::Float(0.1)));
    }

    #[test]
    fn deserializes_camel_case() {
        let new: NewJob = serde_json::from_value(serde_json::json!({
            "title": "new",
            "salary": 10,
            "companyHandle": "c1"
        }))
        .unwrap();
        assert_eq!(new.company_handle, "c1");
        assert_eq!(new.equity, None);
    }
}
