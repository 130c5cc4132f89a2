use crate::client::GenericClient;
use crate::entity::{Entity, NewRecord};
use crate::error::JoblyResult;
use crate::filter::{Criterion, CriterionKind, CriterionSpec};
use crate::repo::Repo;
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use crate::update::FieldMap;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const COMPANY_FIELDS: FieldMap =
    FieldMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

pub const COMPANY_CRITERIA: CriterionSpec = CriterionSpec::new(&[
    Criterion::new("minEmployees", "num_employees", CriterionKind::LowerBound),
    Criterion::new("maxEmployees", "num_employees", CriterionKind::UpperBound),
    Criterion::new("name", "name", CriterionKind::Substring),
]);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            num_employees: row.try_get_column("num_employees")?,
            description: row.try_get_column("description")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl Entity for Company {
    const TABLE: &'static str = "companies";
    const LABEL: &'static str = "company";
    const KEY_COLUMN: &'static str = "handle";
    const SELECT_LIST: &'static str = "handle, name, num_employees, description, logo_url";
    const ORDER_BY: &'static str = "name";
    const FIELD_MAP: FieldMap = COMPANY_FIELDS;
    const CRITERIA: CriterionSpec = COMPANY_CRITERIA;
    const COLUMNS: &'static [&'static str] =
        &["handle", "name", "num_employees", "description", "logo_url"];
    const READ_ONLY: &'static [&'static str] = &["handle"];

    type Key = String;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    pub description: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewRecord<Company> for NewCompany {
    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("handle", self.handle.as_str().into()),
            ("name", self.name.as_str().into()),
            ("num_employees", self.num_employees.into()),
            ("description", self.description.as_str().into()),
            ("logo_url", self.logo_url.clone().into()),
        ]
    }

    fn duplicate_probe(&self) -> Option<(&'static str, SqlValue)> {
        Some(("handle", self.handle.as_str().into()))
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

impl Company {
    /// Fetch a company together with its jobs, ordered by id.
    pub async fn get_with_jobs(
        conn: &impl GenericClient,
        handle: &str,
    ) -> JoblyResult<CompanyWithJobs> {
        let company = Repo::<Company>::get(conn, handle).await?;

        let mut q = sql("SELECT id, title, salary, equity FROM jobs WHERE company_handle = ");
        q.push_bind(handle).push(" ORDER BY id");
        let jobs = q.fetch_all_as(conn).await?;

        Ok(CompanyWithJobs { company, jobs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCriteria, build_filter};
    use crate::ident::Ident;
    use crate::update::{UpdatePayload, sql_for_partial_update};

    #[test]
    fn columns_are_plain_identifiers() {
        for (_, column) in COMPANY_FIELDS.pairs() {
            Ident::parse(column).unwrap();
        }
        for criterion in COMPANY_CRITERIA.criteria() {
            Ident::parse(criterion.column).unwrap();
        }
        for column in Company::SELECT_LIST.split(", ") {
            Ident::parse(column).unwrap();
        }
    }

    #[test]
    fn employee_range_then_name() {
        let criteria = FilterCriteria::new()
            .with("name", "net")
            .with("maxEmployees", "300")
            .with("minEmployees", "10");
        let clause = build_filter(&criteria, &COMPANY_CRITERIA).unwrap();
        assert_eq!(
            clause.to_sql(),
            "num_employees >= $1 AND num_employees <= $2 AND name ILIKE $3"
        );
        assert_eq!(
            clause.values(),
            &[
                SqlValue::Int(10),
                SqlValue::Int(300),
                SqlValue::Text("%net%".into())
            ]
        );
    }

    #[test]
    fn min_above_max_is_rejected() {
        let criteria = FilterCriteria::new()
            .with("minEmployees", "10")
            .with("maxEmployees", "5");
        assert!(build_filter(&criteria, &COMPANY_CRITERIA).is_err());
    }

    #[test]
    fn update_maps_api_fields() {
        let payload = UpdatePayload::new()
            .set("numEmployees", 12)
            .set("logoUrl", SqlValue::Null);
        let clause = sql_for_partial_update(payload, &COMPANY_FIELDS).unwrap();
        assert_eq!(clause.to_sql(), r#""num_employees"=$1, "logo_url"=$2"#);
    }

    #[test]
    fn new_company_probes_handle() {
        let new = NewCompany {
            handle: "c1".into(),
            name: "C1".into(),
            num_employees: Some(1),
            description: "Desc1".into(),
            logo_url: None,
        };
        assert_eq!(new.duplicate_probe(), Some(("handle", SqlValue::from("c1"))));
        assert_eq!(new.columns()[4], ("logo_url", SqlValue::Null));
    }

    #[test]
    fn serializes_camel_case() {
        let company = Company {
            handle: "c1".into(),
            name: "C1".into(),
            num_employees: Some(1),
            description: "Desc1".into(),
            logo_url: Some("http://c1.img".into()),
        };
        let json = serde_json::to_value(CompanyWithJobs {
            company,
            jobs: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["numEmployees"], 1);
        assert_eq!(json["logoUrl"], "http://c1.img");
        assert!(json["jobs"].as_array().unwrap().is_empty());
    }
}
