use crate::ai::{AiClient, AnalysisKind as AiAnalysisKind};
use crate::auth::{issue_token, AuthConfig, AuthSession, UserRole, SESSION_COOKIE};
use crate::nav;
use crate::wellness;
use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_graphql::{
    Context, EmptySubscription, Enum, Error, ErrorExtensions, InputObject, Json, Object, Schema,
    SimpleObject, ID,
};
use chrono::{DateTime, Utc};
use entity::{alert, checkin, profile, profile_secret, team, tenant};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::json;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthConfig>,
    ai: Arc<AiClient>,
) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .data(auth)
        .data(ai)
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;
pub struct MutationRoot;

const MAX_CHECKINS_PAGE: i32 = 200;

#[Object]
impl QueryRoot {
    async fn wellness(&self) -> WellnessQuery {
        WellnessQuery
    }
}

#[Object]
impl MutationRoot {
    async fn wellness(&self) -> WellnessMutation {
        WellnessMutation
    }
}

#[derive(Default)]
pub struct WellnessQuery;

#[derive(Default)]
pub struct WellnessMutation;

#[Object]
impl WellnessQuery {
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<MePayload> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        let model = load_own_profile(db.as_ref(), &session).await?;
        let tenant = load_tenant(db.as_ref(), session.tenant_id).await?;
        Ok(MePayload {
            profile: model.into(),
            tenant: tenant.into(),
        })
    }

    async fn tenant(&self, ctx: &Context<'_>) -> async_graphql::Result<TenantNode> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        Ok(load_tenant(db.as_ref(), session.tenant_id).await?.into())
    }

    /// Resolves a navigation attempt for the caller. Usable before
    /// authentication; an absent session reads as unauthenticated.
    async fn navigate(
        &self,
        ctx: &Context<'_>,
        page: Page,
    ) -> async_graphql::Result<NavOutcome> {
        let role = ctx.data::<AuthSession>().ok().map(|session| session.role);
        Ok(nav::resolve(page.into(), role).into())
    }

    #[graphql(name = "checkinSummary")]
    async fn checkin_summary(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "userId")] user_id: Option<ID>,
        #[graphql(name = "windowDays")] window_days: Option<i32>,
    ) -> async_graphql::Result<CheckinSummaryNode> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        let target = resolve_target_profile(db.as_ref(), &session, user_id).await?;
        let days = match window_days {
            Some(days) if days <= 0 => {
                return Err(validation_error("windowDays must be positive"))
            }
            Some(days) => days as i64,
            None => wellness::DEFAULT_WINDOW_DAYS,
        };
        let span = info_span!(
            "wellness.checkinSummary",
            window_days = days,
            self_view = target.id == session.user_id
        );
        let summary = wellness::checkin_summary(db.as_ref(), target.id, days)
            .instrument(span)
            .await
            .map_err(db_error)?;
        Ok(summary.into())
    }

    async fn checkins(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "userId")] user_id: Option<ID>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<CheckinNode>> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        let target = resolve_target_profile(db.as_ref(), &session, user_id).await?;
        let limit = first.unwrap_or(50).clamp(1, MAX_CHECKINS_PAGE) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let rows = checkin::Entity::find()
            .filter(checkin::Column::UserId.eq(target.id))
            .order_by_desc(checkin::Column::CreatedAt)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(CheckinNode::from).collect())
    }

    /// Teams of the caller's tenant, each with its manager's display
    /// identity and a member count. The count is a separate query per
    /// team; team lists are expected to be small.
    async fn teams(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TeamNode>> {
        let session = require_role(ctx, UserRole::Manager)?;
        let db = database(ctx)?;
        let rows = team::Entity::find()
            .filter(team::Column::TenantId.eq(session.tenant_id))
            .order_by_asc(team::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            nodes.push(build_team_node(db.as_ref(), row).await?);
        }
        Ok(nodes)
    }

    async fn alerts(
        &self,
        ctx: &Context<'_>,
        resolved: Option<bool>,
        #[graphql(name = "userId")] user_id: Option<ID>,
    ) -> async_graphql::Result<Vec<AlertNode>> {
        let session = require_role(ctx, UserRole::Manager)?;
        let db = database(ctx)?;
        let mut query = alert::Entity::find();
        match user_id {
            Some(id) => {
                let target =
                    load_profile_in_tenant(db.as_ref(), parse_uuid(&id)?, session.tenant_id)
                        .await?;
                query = query.filter(alert::Column::UserId.eq(target.id));
            }
            None => {
                let members = tenant_member_ids(db.as_ref(), session.tenant_id).await?;
                if members.is_empty() {
                    return Ok(vec![]);
                }
                query = query.filter(alert::Column::UserId.is_in(members));
            }
        }
        if let Some(resolved) = resolved {
            query = query.filter(alert::Column::Resolved.eq(resolved));
        }
        let span = info_span!("wellness.alerts", filtered = resolved.is_some());
        let rows = query
            .order_by_desc(alert::Column::CreatedAt)
            .all(db.as_ref())
            .instrument(span)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(AlertNode::from).collect())
    }
}

#[Object]
impl WellnessMutation {
    #[graphql(name = "signUp")]
    async fn sign_up(
        &self,
        ctx: &Context<'_>,
        input: SignUpInput,
    ) -> async_graphql::Result<AuthPayload> {
        let auth = auth_config(ctx)?;
        let db = database(ctx)?;
        let email = normalize_email(&input.email)?;
        let display_name = validate_display_name(&input.display_name)?;
        if input.password.chars().count() < 8 {
            return Err(validation_error("password must be at least 8 characters"));
        }
        let tenant_id = parse_uuid(&input.tenant_id)?;
        if tenant::Entity::find_by_id(tenant_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .is_none()
        {
            return Err(validation_error("Unknown tenant"));
        }
        let existing = profile::Entity::find()
            .filter(profile::Column::Email.eq(email.clone()))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        if existing.is_some() {
            return Ok(AuthPayload {
                ok: false,
                profile: None,
                error: Some("Email already registered".into()),
            });
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let profile_id = Uuid::new_v4();
        let txn = db.begin().await.map_err(db_error)?;
        let created = profile::ActiveModel {
            id: Set(profile_id),
            tenant_id: Set(tenant_id),
            team_id: Set(None),
            email: Set(email),
            display_name: Set(display_name),
            role: Set(profile::Role::Employee),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;
        profile_secret::ActiveModel {
            profile_id: Set(profile_id),
            password_hash: Set(hash_password(&input.password).map_err(db_error)?),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;

        let token = issue_token(profile_id, &auth)
            .map_err(|_| error_with_code("INTERNAL", "Failed to issue session token"))?;
        append_session_cookie(ctx, &token, auth.session_ttl_minutes);
        Ok(AuthPayload {
            ok: true,
            profile: Some(created.into()),
            error: None,
        })
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let auth = auth_config(ctx)?;
        let db = database(ctx)?;
        let normalized = normalize_email(&email)?;
        let found = profile::Entity::find()
            .filter(profile::Column::Email.eq(normalized))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        let Some(found) = found else {
            return Ok(AuthPayload::rejected("Invalid credentials"));
        };
        if !found.is_active {
            return Ok(AuthPayload::rejected("Account disabled"));
        }
        let secret = profile_secret::Entity::find_by_id(found.id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        let Some(secret) = secret else {
            return Ok(AuthPayload::rejected("Invalid credentials"));
        };
        let parsed_hash = PasswordHash::new(&secret.password_hash)
            .map_err(|_| error_with_code("INTERNAL", "Invalid password hash"))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Ok(AuthPayload::rejected("Invalid credentials"));
        }
        let token = issue_token(found.id, &auth)
            .map_err(|_| error_with_code("INTERNAL", "Failed to issue session token"))?;
        append_session_cookie(ctx, &token, auth.session_ttl_minutes);
        Ok(AuthPayload {
            ok: true,
            profile: Some(found.into()),
            error: None,
        })
    }

    async fn logout(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        append_session_cookie(ctx, "", -1);
        Ok(true)
    }

    #[graphql(name = "updateProfile")]
    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        input: UpdateProfileInput,
    ) -> async_graphql::Result<ProfileNode> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        let model = load_own_profile(db.as_ref(), &session).await?;
        let mut active: profile::ActiveModel = model.into();
        if let Some(display_name) = &input.display_name {
            active.display_name = Set(validate_display_name(display_name)?);
        }
        if let Some(team_id) = &input.team_id {
            let team =
                load_team_in_tenant(db.as_ref(), parse_uuid(team_id)?, session.tenant_id).await?;
            active.team_id = Set(Some(team.id));
        }
        if input.leave_team.unwrap_or(false) {
            active.team_id = Set(None);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }

    /// Appends a check-in for the caller, then runs the burnout check
    /// over the caller's three most recent check-ins.
    #[graphql(name = "createCheckin")]
    async fn create_checkin(
        &self,
        ctx: &Context<'_>,
        input: NewCheckinInput,
    ) -> async_graphql::Result<CheckinPayload> {
        let session = require_viewer(ctx)?;
        let db = database(ctx)?;
        if !(1..=5).contains(&input.mood_score) {
            return Err(validation_error("moodScore must be between 1 and 5"));
        }
        let question = input
            .question
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let response = input
            .response
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let saved = checkin::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(session.user_id),
            mood_score: Set(input.mood_score as i16),
            question: Set(question),
            response: Set(response),
            created_at: Set(Utc::now().into()),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        let alert = wellness::derive_burnout_alert(db.as_ref(), session.user_id)
            .await
            .map_err(db_error)?;
        Ok(CheckinPayload {
            checkin: saved.into(),
            alert_raised: alert.is_some(),
        })
    }

    #[graphql(name = "createTeam")]
    async fn create_team(
        &self,
        ctx: &Context<'_>,
        input: NewTeamInput,
    ) -> async_graphql::Result<TeamNode> {
        let session = require_role(ctx, UserRole::HrAdmin)?;
        let db = database(ctx)?;
        let name = validate_team_name(&input.name)?;
        let manager_id = match &input.manager_id {
            Some(id) => Some(
                load_profile_in_tenant(db.as_ref(), parse_uuid(id)?, session.tenant_id)
                    .await?
                    .id,
            ),
            None => None,
        };
        let now: DateTimeWithTimeZone = Utc::now().into();
        let created = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(session.tenant_id),
            name: Set(name),
            manager_id: Set(manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        build_team_node(db.as_ref(), created).await
    }

    #[graphql(name = "updateTeam")]
    async fn update_team(
        &self,
        ctx: &Context<'_>,
        input: UpdateTeamInput,
    ) -> async_graphql::Result<TeamNode> {
        let session = require_role(ctx, UserRole::HrAdmin)?;
        let db = database(ctx)?;
        let model =
            load_team_in_tenant(db.as_ref(), parse_uuid(&input.id)?, session.tenant_id).await?;
        let mut active: team::ActiveModel = model.into();
        if let Some(name) = &input.name {
            active.name = Set(validate_team_name(name)?);
        }
        if let Some(manager_id) = &input.manager_id {
            let manager =
                load_profile_in_tenant(db.as_ref(), parse_uuid(manager_id)?, session.tenant_id)
                    .await?;
            active.manager_id = Set(Some(manager.id));
        }
        if input.clear_manager.unwrap_or(false) {
            active.manager_id = Set(None);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        build_team_node(db.as_ref(), updated).await
    }

    /// Deletes a team after clearing the team reference on member
    /// profiles; members themselves are kept.
    #[graphql(name = "deleteTeam")]
    async fn delete_team(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let session = require_role(ctx, UserRole::HrAdmin)?;
        let db = database(ctx)?;
        let model = load_team_in_tenant(db.as_ref(), parse_uuid(&id)?, session.tenant_id).await?;
        profile::Entity::update_many()
            .col_expr(profile::Column::TeamId, Expr::value(sea_orm::Value::Uuid(None)))
            .col_expr(
                profile::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(profile::Column::TeamId.eq(model.id))
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        let res = team::Entity::delete_by_id(model.id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }

    #[graphql(name = "createAlert")]
    async fn create_alert(
        &self,
        ctx: &Context<'_>,
        input: NewAlertInput,
    ) -> async_graphql::Result<AlertNode> {
        let session = require_role(ctx, UserRole::Manager)?;
        let db = database(ctx)?;
        let target =
            load_profile_in_tenant(db.as_ref(), parse_uuid(&input.user_id)?, session.tenant_id)
                .await?;
        let alert_type = input.alert_type.trim().to_lowercase();
        if alert_type.is_empty() || alert_type.chars().count() > 64 {
            return Err(validation_error("alertType must be 1-64 characters"));
        }
        let message = input.message.trim().to_string();
        if message.is_empty() {
            return Err(validation_error("message is required"));
        }
        let model = alert::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(target.id),
            alert_type: Set(alert_type),
            severity: Set(input.severity.into()),
            message: Set(message),
            resolved: Set(false),
            resolved_by: Set(None),
            resolved_at: Set(None),
            created_at: Set(Utc::now().into()),
        };
        match model.insert(db.as_ref()).await {
            Ok(saved) => Ok(saved.into()),
            Err(err) if wellness::is_unique_violation(&err) => Err(validation_error(
                "An open alert of this type already exists for this user",
            )),
            Err(err) => Err(db_error(err)),
        }
    }

    /// Marks an alert resolved with the caller as resolver. Resolving an
    /// already-resolved alert is a no-op returning the current row.
    #[graphql(name = "resolveAlert")]
    async fn resolve_alert(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<AlertNode> {
        let session = require_role(ctx, UserRole::Manager)?;
        let db = database(ctx)?;
        let alert_id = parse_uuid(&id)?;
        let model = alert::Entity::find_by_id(alert_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Alert not found"))?;
        // Tenant check goes through the alerted profile.
        load_profile_in_tenant(db.as_ref(), model.user_id, session.tenant_id).await?;
        if model.resolved {
            return Ok(model.into());
        }
        let mut active: alert::ActiveModel = model.into();
        active.resolved = Set(true);
        active.resolved_by = Set(Some(session.user_id));
        active.resolved_at = Set(Some(Utc::now().into()));
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }

    #[graphql(name = "requestAnalysis")]
    async fn request_analysis(
        &self,
        ctx: &Context<'_>,
        kind: AnalysisKind,
        data: Json<serde_json::Value>,
    ) -> async_graphql::Result<AnalysisPayload> {
        let session = require_role(ctx, UserRole::Manager)?;
        let ai = ai_client(ctx)?;
        let outcome = ai
            .analyze(kind.into(), &data.0, session.tenant_id)
            .await;
        Ok(AnalysisPayload {
            success: outcome.success,
            analysis: outcome.analysis.map(Json),
            error: outcome.error,
        })
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Role {
    Employee,
    Manager,
    HrAdmin,
    SuperAdmin,
}

impl From<profile::Role> for Role {
    fn from(value: profile::Role) -> Self {
        match value {
            profile::Role::Employee => Role::Employee,
            profile::Role::Manager => Role::Manager,
            profile::Role::HrAdmin => Role::HrAdmin,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl From<wellness::Trend> for Trend {
    fn from(value: wellness::Trend) -> Self {
        match value {
            wellness::Trend::Up => Trend::Up,
            wellness::Trend::Down => Trend::Down,
            wellness::Trend::Stable => Trend::Stable,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl From<alert::Severity> for AlertSeverity {
    fn from(value: alert::Severity) -> Self {
        match value {
            alert::Severity::Low => AlertSeverity::Low,
            alert::Severity::Medium => AlertSeverity::Medium,
            alert::Severity::High => AlertSeverity::High,
        }
    }
}

impl From<AlertSeverity> for alert::Severity {
    fn from(value: AlertSeverity) -> Self {
        match value {
            AlertSeverity::Low => alert::Severity::Low,
            AlertSeverity::Medium => alert::Severity::Medium,
            AlertSeverity::High => alert::Severity::High,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Page {
    Login,
    Dashboard,
    Checkin,
    History,
    Team,
    Alerts,
    Analytics,
    Admin,
}

impl From<Page> for nav::Page {
    fn from(value: Page) -> Self {
        match value {
            Page::Login => nav::Page::Login,
            Page::Dashboard => nav::Page::Dashboard,
            Page::Checkin => nav::Page::Checkin,
            Page::History => nav::Page::History,
            Page::Team => nav::Page::Team,
            Page::Alerts => nav::Page::Alerts,
            Page::Analytics => nav::Page::Analytics,
            Page::Admin => nav::Page::Admin,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum NavOutcome {
    Granted,
    RedirectToLogin,
    RedirectToDashboard,
}

impl From<nav::NavOutcome> for NavOutcome {
    fn from(value: nav::NavOutcome) -> Self {
        match value {
            nav::NavOutcome::Granted => NavOutcome::Granted,
            nav::NavOutcome::RedirectToLogin => NavOutcome::RedirectToLogin,
            nav::NavOutcome::RedirectToDashboard => NavOutcome::RedirectToDashboard,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum AnalysisKind {
    WellnessAnalysis,
    BurnoutPrediction,
    TeamInsights,
    Recommendations,
}

impl From<AnalysisKind> for AiAnalysisKind {
    fn from(value: AnalysisKind) -> Self {
        match value {
            AnalysisKind::WellnessAnalysis => AiAnalysisKind::WellnessAnalysis,
            AnalysisKind::BurnoutPrediction => AiAnalysisKind::BurnoutPrediction,
            AnalysisKind::TeamInsights => AiAnalysisKind::TeamInsights,
            AnalysisKind::Recommendations => AiAnalysisKind::Recommendations,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    #[graphql(name = "displayName")]
    pub display_name: String,
    #[graphql(name = "tenantId")]
    pub tenant_id: ID,
}

#[derive(InputObject, Clone, Default)]
pub struct UpdateProfileInput {
    #[graphql(name = "displayName")]
    pub display_name: Option<String>,
    #[graphql(name = "teamId")]
    pub team_id: Option<ID>,
    #[graphql(name = "leaveTeam")]
    pub leave_team: Option<bool>,
}

#[derive(InputObject, Clone)]
pub struct NewCheckinInput {
    #[graphql(name = "moodScore")]
    pub mood_score: i32,
    pub question: Option<String>,
    pub response: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct NewTeamInput {
    pub name: String,
    #[graphql(name = "managerId")]
    pub manager_id: Option<ID>,
}

#[derive(InputObject, Clone)]
pub struct UpdateTeamInput {
    pub id: ID,
    pub name: Option<String>,
    #[graphql(name = "managerId")]
    pub manager_id: Option<ID>,
    #[graphql(name = "clearManager")]
    pub clear_manager: Option<bool>,
}

#[derive(InputObject, Clone)]
pub struct NewAlertInput {
    #[graphql(name = "userId")]
    pub user_id: ID,
    #[graphql(name = "alertType")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Tenant")]
pub struct TenantNode {
    pub id: ID,
    pub name: String,
    pub domain: Option<String>,
    pub settings: Json<serde_json::Value>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<tenant::Model> for TenantNode {
    fn from(model: tenant::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            name: model.name,
            domain: model.domain,
            settings: Json(model.settings),
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Profile")]
pub struct ProfileNode {
    pub id: ID,
    #[graphql(name = "tenantId")]
    pub tenant_id: ID,
    #[graphql(name = "teamId")]
    pub team_id: Option<ID>,
    pub email: String,
    #[graphql(name = "displayName")]
    pub display_name: String,
    pub role: Role,
    #[graphql(name = "isActive")]
    pub is_active: bool,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<profile::Model> for ProfileNode {
    fn from(model: profile::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            tenant_id: ID::from(model.tenant_id.to_string()),
            team_id: model.team_id.map(|id| ID::from(id.to_string())),
            email: model.email,
            display_name: model.display_name,
            role: model.role.into(),
            is_active: model.is_active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Team")]
pub struct TeamNode {
    pub id: ID,
    pub name: String,
    #[graphql(name = "managerId")]
    pub manager_id: Option<ID>,
    #[graphql(name = "managerName")]
    pub manager_name: Option<String>,
    #[graphql(name = "memberCount")]
    pub member_count: i32,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Checkin")]
pub struct CheckinNode {
    pub id: ID,
    #[graphql(name = "userId")]
    pub user_id: ID,
    #[graphql(name = "moodScore")]
    pub mood_score: i32,
    pub question: Option<String>,
    pub response: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<checkin::Model> for CheckinNode {
    fn from(model: checkin::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            user_id: ID::from(model.user_id.to_string()),
            mood_score: model.mood_score as i32,
            question: model.question,
            response: model.response,
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Alert")]
pub struct AlertNode {
    pub id: ID,
    #[graphql(name = "userId")]
    pub user_id: ID,
    #[graphql(name = "alertType")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub resolved: bool,
    #[graphql(name = "resolvedBy")]
    pub resolved_by: Option<ID>,
    #[graphql(name = "resolvedAt")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<alert::Model> for AlertNode {
    fn from(model: alert::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            user_id: ID::from(model.user_id.to_string()),
            alert_type: model.alert_type,
            severity: model.severity.into(),
            message: model.message,
            resolved: model.resolved,
            resolved_by: model.resolved_by.map(|id| ID::from(id.to_string())),
            resolved_at: model.resolved_at.map(|at| at.into()),
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "CheckinSummary")]
pub struct CheckinSummaryNode {
    pub total: i32,
    #[graphql(name = "averageMood")]
    pub average_mood: f64,
    pub trend: Trend,
    #[graphql(name = "recentCheckins")]
    pub recent_checkins: Vec<CheckinNode>,
}

impl From<wellness::CheckinSummary> for CheckinSummaryNode {
    fn from(summary: wellness::CheckinSummary) -> Self {
        Self {
            total: summary.total as i32,
            average_mood: summary.average_mood,
            trend: summary.trend.into(),
            recent_checkins: summary
                .recent_checkins
                .into_iter()
                .map(CheckinNode::from)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct MePayload {
    pub profile: ProfileNode,
    pub tenant: TenantNode,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AuthPayload {
    pub ok: bool,
    pub profile: Option<ProfileNode>,
    pub error: Option<String>,
}

impl AuthPayload {
    fn rejected(reason: &str) -> Self {
        Self {
            ok: false,
            profile: None,
            error: Some(reason.to_string()),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CheckinPayload {
    pub checkin: CheckinNode,
    #[graphql(name = "alertRaised")]
    pub alert_raised: bool,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AnalysisPayload {
    pub success: bool,
    pub analysis: Option<Json<serde_json::Value>>,
    pub error: Option<String>,
}

async fn build_team_node(
    db: &DatabaseConnection,
    model: team::Model,
) -> async_graphql::Result<TeamNode> {
    let member_count = profile::Entity::find()
        .filter(profile::Column::TeamId.eq(model.id))
        .count(db)
        .await
        .map_err(db_error)?;
    let manager = match model.manager_id {
        Some(id) => profile::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(db_error)?,
        None => None,
    };
    Ok(TeamNode {
        id: ID::from(model.id.to_string()),
        name: model.name,
        manager_id: model.manager_id.map(|id| ID::from(id.to_string())),
        manager_name: manager.map(|profile| profile.display_name),
        member_count: member_count as i32,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

async fn resolve_target_profile(
    db: &DatabaseConnection,
    session: &AuthSession,
    user_id: Option<ID>,
) -> async_graphql::Result<profile::Model> {
    let target_id = match user_id {
        Some(id) => parse_uuid(&id)?,
        None => session.user_id,
    };
    if target_id != session.user_id && !session.has_role(UserRole::Manager) {
        return Err(error_with_code("FORBIDDEN", "Insufficient permissions"));
    }
    load_profile_in_tenant(db, target_id, session.tenant_id).await
}

async fn load_own_profile(
    db: &DatabaseConnection,
    session: &AuthSession,
) -> async_graphql::Result<profile::Model> {
    profile::Entity::find_by_id(session.user_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_with_code("UNAUTHENTICATED", "Profile not found"))
}

async fn load_profile_in_tenant(
    db: &DatabaseConnection,
    id: Uuid,
    tenant_id: Uuid,
) -> async_graphql::Result<profile::Model> {
    profile::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .filter(|model| model.tenant_id == tenant_id)
        .ok_or_else(|| error_with_code("NOT_FOUND", "User not found"))
}

async fn load_team_in_tenant(
    db: &DatabaseConnection,
    id: Uuid,
    tenant_id: Uuid,
) -> async_graphql::Result<team::Model> {
    team::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .filter(|model| model.tenant_id == tenant_id)
        .ok_or_else(|| error_with_code("NOT_FOUND", "Team not found"))
}

async fn load_tenant(
    db: &DatabaseConnection,
    tenant_id: Uuid,
) -> async_graphql::Result<tenant::Model> {
    tenant::Entity::find_by_id(tenant_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_with_code("NOT_FOUND", "Tenant not found"))
}

async fn tenant_member_ids(
    db: &DatabaseConnection,
    tenant_id: Uuid,
) -> async_graphql::Result<Vec<Uuid>> {
    let rows = profile::Entity::find()
        .filter(profile::Column::TenantId.eq(tenant_id))
        .all(db)
        .await
        .map_err(db_error)?;
    Ok(rows.into_iter().map(|model| model.id).collect())
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing database connection"))
}

fn auth_config(ctx: &Context<'_>) -> async_graphql::Result<Arc<AuthConfig>> {
    ctx.data::<Arc<AuthConfig>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing auth configuration"))
}

fn ai_client(ctx: &Context<'_>) -> async_graphql::Result<Arc<AiClient>> {
    ctx.data::<Arc<AiClient>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing ai-analysis client"))
}

fn current_session(ctx: &Context<'_>) -> async_graphql::Result<AuthSession> {
    ctx.data::<AuthSession>()
        .cloned()
        .map_err(|_| error_with_code("UNAUTHENTICATED", "Login required"))
}

fn require_role(ctx: &Context<'_>, role: UserRole) -> async_graphql::Result<AuthSession> {
    let session = current_session(ctx)?;
    if session.has_role(role) {
        Ok(session)
    } else {
        Err(error_with_code("FORBIDDEN", "Insufficient permissions"))
    }
}

fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<AuthSession> {
    require_role(ctx, UserRole::Employee)
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| error_with_code("BAD_REQUEST", "Invalid ID"))
}

fn db_error(err: DbErr) -> Error {
    error_with_code("INTERNAL", format!("Database error: {}", err))
}

fn error_with_code(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

fn validation_error(message: impl Into<String>) -> Error {
    error_with_code("VALIDATION", message)
}

fn append_session_cookie(ctx: &Context<'_>, token: &str, ttl_minutes: i64) {
    let max_age = (ttl_minutes.max(0) * 60).to_string();
    let cookie = if ttl_minutes < 0 {
        format!(
            "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE
        )
    } else {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token, max_age
        )
    };
    ctx.append_http_header("Set-Cookie", cookie);
}

fn normalize_email(value: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(validation_error("Invalid email address"));
    }
    Ok(trimmed)
}

fn validate_display_name(value: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation_error("displayName is required"));
    }
    if trimmed.chars().count() > 100 {
        return Err(validation_error("displayName must be <= 100 characters"));
    }
    Ok(trimmed.to_string())
}

fn validate_team_name(value: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation_error("name is required"));
    }
    if trimmed.chars().count() > 128 {
        return Err(validation_error("name must be <= 128 characters"));
    }
    Ok(trimmed.to_string())
}

fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DbErr::Custom(format!("hash error: {}", err)))
}

#[derive(Debug, Clone)]
pub struct SeededWellnessRecords {
    pub tenant: tenant::Model,
    pub teams: Vec<team::Model>,
    pub profiles: Vec<profile::Model>,
}

impl SeededWellnessRecords {
    pub fn profile_email(&self, email: &str) -> Option<&profile::Model> {
        self.profiles.iter().find(|p| p.email == email)
    }

    pub fn team_named(&self, name: &str) -> Option<&team::Model> {
        self.teams.iter().find(|t| t.name == name)
    }
}

pub async fn seed_wellness_demo(
    db: &DatabaseConnection,
) -> Result<SeededWellnessRecords, DbErr> {
    let seeded_at: DateTimeWithTimeZone = Utc::now().into();
    let demo_tenant = tenant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Grupo Aurora".into()),
        domain: Set(Some("aurora.test".into())),
        settings: Set(json!({ "locale": "es-MX" })),
        created_at: Set(seeded_at),
    }
    .insert(db)
    .await?;

    let engineering = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(demo_tenant.id),
        name: Set("Ingeniería".into()),
        manager_id: Set(None),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;

    let support = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(demo_tenant.id),
        name: Set("Atención al Cliente".into()),
        manager_id: Set(None),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;

    let lucia = insert_seed_profile(
        db,
        demo_tenant.id,
        None,
        "lucia@aurora.test",
        "Lucía Ortega",
        profile::Role::HrAdmin,
        "luciapass",
    )
    .await?;
    let marta = insert_seed_profile(
        db,
        demo_tenant.id,
        Some(engineering.id),
        "marta@aurora.test",
        "Marta Ríos",
        profile::Role::Manager,
        "martapass",
    )
    .await?;
    let ana = insert_seed_profile(
        db,
        demo_tenant.id,
        Some(engineering.id),
        "ana@aurora.test",
        "Ana Solís",
        profile::Role::Employee,
        "anapass",
    )
    .await?;
    let diego = insert_seed_profile(
        db,
        demo_tenant.id,
        Some(support.id),
        "diego@aurora.test",
        "Diego Vera",
        profile::Role::Employee,
        "diegopass",
    )
    .await?;

    let mut engineering_active: team::ActiveModel = engineering.into();
    engineering_active.manager_id = Set(Some(marta.id));
    let engineering = engineering_active.update(db).await?;

    // Ana trends upward across two weeks; Diego's latest three are low
    // enough to raise the demo burnout alert below.
    let ana_moods: [(i64, i16); 7] = [(1, 4), (2, 5), (3, 4), (9, 4), (10, 3), (12, 4), (20, 3)];
    for (days_back, mood) in ana_moods {
        insert_seed_checkin(db, ana.id, days_back, mood).await?;
    }
    let diego_moods: [(i64, i16); 5] = [(0, 1), (1, 2), (2, 1), (8, 3), (15, 4)];
    for (days_back, mood) in diego_moods {
        insert_seed_checkin(db, diego.id, days_back, mood).await?;
    }
    wellness::derive_burnout_alert(db, diego.id).await?;

    Ok(SeededWellnessRecords {
        tenant: demo_tenant,
        teams: vec![engineering, support],
        profiles: vec![lucia, marta, ana, diego],
    })
}

async fn insert_seed_profile(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    team_id: Option<Uuid>,
    email: &str,
    display_name: &str,
    role: profile::Role,
    password: &str,
) -> Result<profile::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        team_id: Set(team_id),
        email: Set(email.to_string()),
        display_name: Set(display_name.to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    profile_secret::ActiveModel {
        profile_id: Set(model.id),
        password_hash: Set(hash_password(password)?),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

async fn insert_seed_checkin(
    db: &DatabaseConnection,
    user_id: Uuid,
    days_back: i64,
    mood: i16,
) -> Result<checkin::Model, DbErr> {
    let at: DateTimeWithTimeZone = (Utc::now() - chrono::Duration::days(days_back)).into();
    checkin::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        mood_score: Set(mood),
        question: Set(Some("¿Cómo te sientes hoy?".into())),
        response: Set(None),
        created_at: Set(at),
    }
    .insert(db)
    .await
}
