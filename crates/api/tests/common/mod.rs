#![allow(dead_code)]

use std::sync::Arc;

use api::ai::AiClient;
use api::auth::{AuthConfig, AuthSession, UserRole};
use api::schema::{build_schema, AppSchema};
use chrono::{Duration, Utc};
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement, Value as DbValue,
};
use uuid::Uuid;

pub struct WellnessTestEnv {
    pub db: Arc<DatabaseConnection>,
    pub schema: async_graphql::Schema<
        api::schema::QueryRoot,
        api::schema::MutationRoot,
        async_graphql::EmptySubscription,
    >,
    pub tenant_id: Uuid,
}

pub async fn setup_env() -> WellnessTestEnv {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(conn);
    bootstrap_sqlite(db.as_ref()).await;
    let tenant_id = insert_tenant(db.as_ref(), "Acme Wellness").await;
    let auth = Arc::new(AuthConfig {
        jwt_secret: "test-secret".into(),
        session_ttl_minutes: 60,
    });
    let ai = Arc::new(AiClient::new(None));
    let AppSchema(schema) = build_schema(db.clone(), auth, ai);
    WellnessTestEnv {
        db,
        schema,
        tenant_id,
    }
}

pub fn session(user_id: Uuid, tenant_id: Uuid, role: UserRole) -> AuthSession {
    AuthSession {
        user_id,
        tenant_id,
        role,
    }
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE tenant (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            domain TEXT,
            settings TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE profile (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            team_id TEXT,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'EMPLOYEE',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(tenant_id) REFERENCES tenant(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE profile_secret (
            profile_id TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(profile_id) REFERENCES profile(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE team (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            name TEXT NOT NULL,
            manager_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(tenant_id) REFERENCES tenant(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE checkin (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            mood_score INTEGER NOT NULL,
            question TEXT,
            response TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES profile(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE alert (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            alert_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            resolved INTEGER NOT NULL DEFAULT 0,
            resolved_by TEXT,
            resolved_at TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES profile(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE UNIQUE INDEX idx_alert_open_per_type \
         ON alert (user_id, alert_type) WHERE resolved = 0;",
    ))
    .await
    .unwrap();
}

pub async fn insert_tenant(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO tenant (id, name, domain, settings, created_at) VALUES (?, ?, ?, ?, ?)",
        vec![
            id.into(),
            name.into(),
            DbValue::from(None::<String>),
            "{}".into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    id
}

pub async fn insert_profile(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    team_id: Option<Uuid>,
    email: &str,
    display_name: &str,
    role: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO profile (id, tenant_id, team_id, email, display_name, role, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            tenant_id.into(),
            DbValue::from(team_id),
            email.into(),
            display_name.into(),
            role.into(),
            true.into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    id
}

pub async fn insert_team(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    name: &str,
    manager_id: Option<Uuid>,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO team (id, tenant_id, name, manager_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            tenant_id.into(),
            name.into(),
            DbValue::from(manager_id),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    id
}

pub async fn insert_checkin(
    db: &DatabaseConnection,
    user_id: Uuid,
    mood_score: i16,
    days_back: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    let at = (Utc::now() - Duration::days(days_back)).to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO checkin (id, user_id, mood_score, question, response, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            user_id.into(),
            mood_score.into(),
            DbValue::from(None::<String>),
            DbValue::from(None::<String>),
            at.into(),
        ],
    ))
    .await
    .unwrap();
    id
}
