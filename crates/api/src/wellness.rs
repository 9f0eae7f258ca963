//! Check-in aggregation and burnout alert derivation.
//!
//! Aggregates are computed in memory from a single windowed read, so a
//! summary is always a consistent snapshot of one query result.

use chrono::{DateTime, Duration, Utc};
use entity::{alert, checkin};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

pub const BURNOUT_RISK: &str = "burnout_risk";
pub const BURNOUT_ALERT_MESSAGE: &str = "Riesgo de burnout detectado: los últimos 3 check-ins \
     registran un estado de ánimo muy bajo. Considera una conversación de seguimiento.";

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Consecutive recent check-ins inspected by the derivation.
const BURNOUT_SAMPLE: usize = 3;
/// Mood at or below this counts as low.
const BURNOUT_MOOD_CEILING: i16 = 2;

const TREND_THRESHOLD: f64 = 0.2;
const RECENT_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Clone, Debug)]
pub struct CheckinSummary {
    pub total: u64,
    pub average_mood: f64,
    pub trend: Trend,
    pub recent_checkins: Vec<checkin::Model>,
}

impl CheckinSummary {
    fn empty() -> Self {
        Self {
            total: 0,
            average_mood: 0.0,
            trend: Trend::Stable,
            recent_checkins: Vec::new(),
        }
    }
}

/// Summarize one user's check-ins over the window ending at `now`.
/// `rows` must already be windowed and sorted descending by timestamp.
pub fn summarize(now: DateTime<Utc>, rows: Vec<checkin::Model>) -> CheckinSummary {
    if rows.is_empty() {
        return CheckinSummary::empty();
    }
    let total = rows.len() as u64;
    let average_mood =
        rows.iter().map(|row| row.mood_score as f64).sum::<f64>() / rows.len() as f64;
    let trend = classify_trend(now, &rows);
    let recent_checkins = rows.into_iter().take(RECENT_LIMIT).collect();
    CheckinSummary {
        total,
        average_mood,
        trend,
        recent_checkins,
    }
}

/// Mean of the last 7 days against the mean of days 8-14 back. An empty
/// bucket contributes 0, so sparse weeks can swing the verdict; that is
/// the dashboard's historical behavior and is kept as-is.
fn classify_trend(now: DateTime<Utc>, rows: &[checkin::Model]) -> Trend {
    let week_ago = now - Duration::days(7);
    let fortnight_ago = now - Duration::days(14);
    let recent = bucket_mean(rows, |at| at >= week_ago);
    let prior = bucket_mean(rows, |at| at >= fortnight_ago && at < week_ago);
    let diff = recent - prior;
    if diff > TREND_THRESHOLD {
        Trend::Up
    } else if diff < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}

fn bucket_mean(rows: &[checkin::Model], in_bucket: impl Fn(DateTime<Utc>) -> bool) -> f64 {
    let scores: Vec<f64> = rows
        .iter()
        .filter(|row| in_bucket(row.created_at.with_timezone(&Utc)))
        .map(|row| row.mood_score as f64)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

pub async fn checkin_summary(
    db: &DatabaseConnection,
    user_id: Uuid,
    window_days: i64,
) -> Result<CheckinSummary, DbErr> {
    let now = Utc::now();
    let since: DateTimeWithTimeZone = (now - Duration::days(window_days)).into();
    let rows = checkin::Entity::find()
        .filter(checkin::Column::UserId.eq(user_id))
        .filter(checkin::Column::CreatedAt.gte(since))
        .order_by_desc(checkin::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(summarize(now, rows))
}

/// Point-in-time burnout check, invoked after each new check-in. Looks
/// at the 3 most recent check-ins; when all are low and no open
/// burnout_risk alert exists for the user, raises one with severity
/// HIGH. One read of alerts, one insert. Returns the created alert, or
/// None when nothing was raised.
///
/// The partial unique index on open alerts backs the existence check: a
/// concurrent invocation that wins the insert leaves this one resolving
/// to None instead of duplicating the alert.
pub async fn derive_burnout_alert(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<alert::Model>, DbErr> {
    let recent = checkin::Entity::find()
        .filter(checkin::Column::UserId.eq(user_id))
        .order_by_desc(checkin::Column::CreatedAt)
        .limit(BURNOUT_SAMPLE as u64)
        .all(db)
        .await?;
    if recent.len() < BURNOUT_SAMPLE {
        return Ok(None);
    }
    let low = recent
        .iter()
        .filter(|row| row.mood_score <= BURNOUT_MOOD_CEILING)
        .count();
    if low < BURNOUT_SAMPLE {
        return Ok(None);
    }

    let open = alert::Entity::find()
        .filter(alert::Column::UserId.eq(user_id))
        .filter(alert::Column::AlertType.eq(BURNOUT_RISK))
        .filter(alert::Column::Resolved.eq(false))
        .one(db)
        .await?;
    if open.is_some() {
        return Ok(None);
    }

    let model = alert::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        alert_type: Set(BURNOUT_RISK.to_string()),
        severity: Set(alert::Severity::High),
        message: Set(BURNOUT_ALERT_MESSAGE.to_string()),
        resolved: Set(false),
        resolved_by: Set(None),
        resolved_at: Set(None),
        created_at: Set(Utc::now().into()),
    };
    match model.insert(db).await {
        Ok(saved) => Ok(Some(saved)),
        // Lost the race: another request raised the alert first.
        Err(err) if is_unique_violation(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
