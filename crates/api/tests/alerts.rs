mod common;

use api::auth::UserRole;
use api::wellness::{BURNOUT_ALERT_MESSAGE, BURNOUT_RISK};
use async_graphql::{Request, Variables};
use common::{insert_checkin, insert_profile, session, setup_env};
use entity::alert;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

const CHECKIN_MUTATION: &str = r#"
    mutation Submit($input: NewCheckinInput!) {
        wellness {
            createCheckin(input: $input) {
                alertRaised
            }
        }
    }
"#;

const CREATE_ALERT_MUTATION: &str = r#"
    mutation Raise($input: NewAlertInput!) {
        wellness {
            createAlert(input: $input) {
                id
                alertType
                severity
                resolved
            }
        }
    }
"#;

const RESOLVE_ALERT_MUTATION: &str = r#"
    mutation Resolve($id: ID!) {
        wellness {
            resolveAlert(id: $id) {
                id
                resolved
                resolvedBy
            }
        }
    }
"#;

const ALERTS_QUERY: &str = r#"
    query Alerts($resolved: Boolean) {
        wellness {
            alerts(resolved: $resolved) {
                id
                alertType
                resolved
            }
        }
    }
"#;

async fn submit_mood(
    env: &common::WellnessTestEnv,
    user: uuid::Uuid,
    mood: i32,
) -> bool {
    let vars = Variables::from_json(json!({ "input": { "moodScore": mood } }));
    let resp = env
        .schema
        .execute(
            Request::new(CHECKIN_MUTATION)
                .variables(vars)
                .data(session(user, env.tenant_id, UserRole::Employee)),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    data["wellness"]["createCheckin"]["alertRaised"]
        .as_bool()
        .unwrap()
}

#[tokio::test]
async fn three_low_moods_raise_exactly_one_burnout_alert() {
    let env = setup_env().await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;
    insert_checkin(env.db.as_ref(), diego, 1, 2).await;
    insert_checkin(env.db.as_ref(), diego, 2, 1).await;

    assert!(submit_mood(&env, diego, 1).await, "expected an alert");

    let alerts = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .all(env.db.as_ref())
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, BURNOUT_RISK);
    assert_eq!(alerts[0].severity, alert::Severity::High);
    assert_eq!(alerts[0].message, BURNOUT_ALERT_MESSAGE);
    assert!(!alerts[0].resolved);

    // A further low check-in before resolution must not duplicate it.
    assert!(!submit_mood(&env, diego, 2).await);
    let count = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .count(env.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn two_low_of_three_do_not_raise() {
    let env = setup_env().await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;
    insert_checkin(env.db.as_ref(), diego, 1, 2).await;
    insert_checkin(env.db.as_ref(), diego, 2, 1).await;

    assert!(!submit_mood(&env, diego, 3).await);

    let count = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .count(env.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn fewer_than_three_checkins_never_raise() {
    let env = setup_env().await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;

    assert!(!submit_mood(&env, diego, 1).await);
    assert!(!submit_mood(&env, diego, 1).await);

    let count = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .count(env.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn resolution_allows_a_new_alert_to_be_raised() {
    let env = setup_env().await;
    let marta = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "marta@acme.test",
        "Marta",
        "MANAGER",
    )
    .await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;
    insert_checkin(env.db.as_ref(), diego, 1, 2).await;
    insert_checkin(env.db.as_ref(), diego, 1, 1).await;
    assert!(submit_mood(&env, diego, 1).await);

    let raised = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .one(env.db.as_ref())
        .await
        .unwrap()
        .unwrap();

    let vars = Variables::from_json(json!({ "id": raised.id }));
    let resp = env
        .schema
        .execute(
            Request::new(RESOLVE_ALERT_MUTATION)
                .variables(vars)
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    let resolved = &data["wellness"]["resolveAlert"];
    assert_eq!(resolved["resolved"], true);
    assert_eq!(resolved["resolvedBy"], json!(marta.to_string()));

    // Mood is still low, so the next submission raises a fresh alert.
    assert!(submit_mood(&env, diego, 2).await);
    let count = alert::Entity::find()
        .filter(alert::Column::UserId.eq(diego))
        .count(env.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn resolving_twice_is_a_noop() {
    let env = setup_env().await;
    let marta = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "marta@acme.test",
        "Marta",
        "MANAGER",
    )
    .await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;

    let vars = Variables::from_json(json!({
        "input": {
            "userId": diego,
            "alertType": "manual_review",
            "severity": "MEDIUM",
            "message": "Revisar carga de trabajo"
        }
    }));
    let resp = env
        .schema
        .execute(
            Request::new(CREATE_ALERT_MUTATION)
                .variables(vars)
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    let alert_id = data["wellness"]["createAlert"]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let vars = Variables::from_json(json!({ "id": alert_id }));
        let resp = env
            .schema
            .execute(
                Request::new(RESOLVE_ALERT_MUTATION)
                    .variables(vars)
                    .data(session(marta, env.tenant_id, UserRole::Manager)),
            )
            .await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
        let data = resp.data.into_json().unwrap();
        assert_eq!(data["wellness"]["resolveAlert"]["resolved"], true);
    }
}

#[tokio::test]
async fn duplicate_open_manual_alert_is_rejected() {
    let env = setup_env().await;
    let marta = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "marta@acme.test",
        "Marta",
        "MANAGER",
    )
    .await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;

    let vars = json!({
        "input": {
            "userId": diego,
            "alertType": "manual_review",
            "severity": "LOW",
            "message": "Seguimiento"
        }
    });
    let first = env
        .schema
        .execute(
            Request::new(CREATE_ALERT_MUTATION)
                .variables(Variables::from_json(vars.clone()))
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(first.errors.is_empty(), "unexpected errors: {:?}", first.errors);

    let second = env
        .schema
        .execute(
            Request::new(CREATE_ALERT_MUTATION)
                .variables(Variables::from_json(vars))
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(!second.errors.is_empty(), "expected duplicate rejection");
}

#[tokio::test]
async fn alerts_listing_is_gated_and_filterable() {
    let env = setup_env().await;
    let marta = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "marta@acme.test",
        "Marta",
        "MANAGER",
    )
    .await;
    let diego = insert_profile(
        env.db.as_ref(),
        env.tenant_id,
        None,
        "diego@acme.test",
        "Diego",
        "EMPLOYEE",
    )
    .await;

    let denied = env
        .schema
        .execute(
            Request::new(ALERTS_QUERY)
                .data(session(diego, env.tenant_id, UserRole::Employee)),
        )
        .await;
    assert!(!denied.errors.is_empty(), "expected a permission error");

    for (alert_type, severity) in [("manual_review", "LOW"), ("workload", "HIGH")] {
        let vars = Variables::from_json(json!({
            "input": {
                "userId": diego,
                "alertType": alert_type,
                "severity": severity,
                "message": "Seguimiento"
            }
        }));
        let resp = env
            .schema
            .execute(
                Request::new(CREATE_ALERT_MUTATION)
                    .variables(vars)
                    .data(session(marta, env.tenant_id, UserRole::Manager)),
            )
            .await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    }
    let open = alert::Entity::find()
        .filter(alert::Column::AlertType.eq("workload"))
        .one(env.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    let vars = Variables::from_json(json!({ "id": open.id }));
    let resp = env
        .schema
        .execute(
            Request::new(RESOLVE_ALERT_MUTATION)
                .variables(vars)
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);

    let vars = Variables::from_json(json!({ "resolved": false }));
    let resp = env
        .schema
        .execute(
            Request::new(ALERTS_QUERY)
                .variables(vars)
                .data(session(marta, env.tenant_id, UserRole::Manager)),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    let rows = data["wellness"]["alerts"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["alertType"], "manual_review");
    assert_eq!(rows[0]["resolved"], false);
}
