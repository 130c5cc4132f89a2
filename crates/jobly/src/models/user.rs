use crate::client::GenericClient;
use crate::entity::{Entity, NewRecord};
use crate::error::JoblyResult;
use crate::filter::CriterionSpec;
use crate::models::application::{self, Application};
use crate::repo::Repo;
use crate::row::{FromRow, RowExt};
use crate::update::FieldMap;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const USER_FIELDS: FieldMap = FieldMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

/// A user as returned to callers. The password column is never selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "user";
    const KEY_COLUMN: &'static str = "username";
    const SELECT_LIST: &'static str = "username, first_name, last_name, email, is_admin";
    const ORDER_BY: &'static str = "username";
    const FIELD_MAP: FieldMap = USER_FIELDS;
    const CRITERIA: CriterionSpec = CriterionSpec::NONE;
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "password",
        "first_name",
        "last_name",
        "email",
        "is_admin",
    ];
    const READ_ONLY: &'static [&'static str] = &["username"];

    type Key = String;
}

/// Registration data. `password` is stored as given; hashing happens upstream.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

impl NewRecord<User> for NewUser {
    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("username", self.username.as_str().into()),
            ("password", self.password.as_str().into()),
            ("first_name", self.first_name.as_str().into()),
            ("last_name", self.last_name.as_str().into()),
            ("email", self.email.as_str().into()),
            ("is_admin", self.is_admin.into()),
        ]
    }

    fn duplicate_probe(&self) -> Option<(&'static str, SqlValue)> {
        Some(("username", self.username.as_str().into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithApplications {
    #[serde(flatten)]
    pub user: User,
    /// Ids of the jobs this user applied to.
    pub applications: Vec<i32>,
}

impl User {
    /// Fetch a user together with the ids of the jobs they applied to.
    pub async fn get_with_applications(
        conn: &impl GenericClient,
        username: &str,
    ) -> JoblyResult<UserWithApplications> {
        let user = Repo::<User>::get(conn, username).await?;
        let applications = application::job_ids_for_user(conn, username).await?;
        Ok(UserWithApplications { user, applications })
    }

    /// Record that `username` applied to job `job_id`.
    pub async fn apply_to_job(
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
    ) -> JoblyResult<Application> {
        application::apply_to_job(conn, username, job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoblyError;
    use crate::filter::{FilterCriteria, build_filter};
    use crate::ident::Ident;
    use crate::update::{UpdatePayload, sql_for_partial_update};

    fn new_user() -> NewUser {
        NewUser {
            username: "u1".into(),
            password: "hashed".into(),
            first_name: "U1F".into(),
            last_name: "U1L".into(),
            email: "user1@user.com".into(),
            is_admin: false,
        }
    }

    #[test]
    fn select_list_omits_password() {
        assert!(!User::SELECT_LIST.contains("password"));
        for column in User::SELECT_LIST.split(", ") {
            Ident::parse(column).unwrap();
        }
    }

    #[test]
    fn users_accept_no_criteria() {
        assert!(build_filter(&FilterCriteria::new(), &User::CRITERIA)
            .unwrap()
            .is_empty());
        let err = build_filter(&FilterCriteria::new().with("username", "u1"), &User::CRITERIA)
            .unwrap_err();
        assert!(matches!(err, JoblyError::InvalidCriteria(_)));
    }

    #[test]
    fn update_maps_name_fields() {
        let payload = UpdatePayload::new()
            .set("firstName", "Aliya")
            .set("age", 32);
        let clause = sql_for_partial_update(payload, &USER_FIELDS).unwrap();
        assert_eq!(clause.to_sql(), r#""first_name"=$1, "age"=$2"#);
        assert_eq!(
            clause.values(),
            &[SqlValue::Text("Aliya".into()), SqlValue::Int(32)]
        );
    }

    #[test]
    fn new_user_inserts_password_but_hides_it_in_debug() {
        let new = new_user();
        assert!(new.columns().iter().any(|(c, _)| *c == "password"));
        assert!(!format!("{new:?}").contains("hashed"));
        assert_eq!(new.duplicate_probe(), Some(("username", SqlValue::from("u1"))));
    }

    #[test]
    fn applications_serialize_next_to_user_fields() {
        let new = new_user();
        let json = serde_json::to_value(UserWithApplications {
            user: User {
                username: new.username,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                is_admin: new.is_admin,
            },
            applications: vec![7],
        })
        .unwrap();
        assert_eq!(json["firstName"], "U1F");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["applications"], serde_json::json!([7]));
        assert!(json.get("password").is_none());
    }
}
