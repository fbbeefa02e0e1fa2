use chrono::Utc;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, routes, Route, State};
use serde::{Deserialize, Serialize};

use super::{AuthUser, CsvDownload, TOKEN_COOKIE};
use crate::comparison::{build_comparison, ComparisonView, CompetitorSelection};
use crate::error::{DashboardError, Result};
use crate::mentions::{MentionPage, MentionQuery};
use crate::mock_api::{InfluencerPayload, MockApi, OverviewPayload, SettingsPayload};
use crate::models::*;
use crate::store::{AuthStore, ProjectState, ProjectStore, Session};
use crate::wizard::Wizard;
use crate::workspace::{
    GeneratedKey, KeywordList, NewAlert, NewScheduledReport, NewTeamMember, NewWebhook,
    ReportRequest,
};

type ApiResult<T> = std::result::Result<Json<T>, DashboardError>;

/// Mutation response: a toast message plus the affected record
#[derive(Debug, Serialize)]
pub struct Ack<T> {
    pub message: String,
    pub data: T,
}

fn ack<T>(message: impl Into<String>, data: T) -> ApiResult<Ack<T>> {
    Ok(Json(Ack {
        message: message.into(),
        data,
    }))
}

// =====================
// Request bodies
// =====================

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: TopicStatus,
}

#[derive(Debug, Deserialize)]
pub struct KeywordChange {
    pub list: KeywordList,
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct PlatformChange {
    pub platform: Platform,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SentimentOverride {
    /// `null` restores the classifier label
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Deserialize)]
pub struct WizardDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: TeamRole,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: User,
    pub project: ProjectState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub step: u8,
    pub can_proceed: bool,
    pub wizard: Wizard,
}

impl From<Wizard> for WizardView {
    fn from(wizard: Wizard) -> Self {
        WizardView {
            step: wizard.current_step().number(),
            can_proceed: wizard.can_proceed(),
            wizard,
        }
    }
}

// =====================
// Auth and session
// =====================

#[post("/auth/login", data = "<credentials>")]
fn login(
    credentials: Json<Credentials>,
    auth: &State<AuthStore>,
    cookies: &CookieJar<'_>,
) -> ApiResult<Session> {
    let session = auth.login(&credentials.email, &credentials.password)?;
    cookies.add(
        Cookie::build((TOKEN_COOKIE, session.token.clone()))
            .path("/")
            .same_site(SameSite::Lax),
    );
    Ok(Json(session))
}

#[post("/auth/logout")]
fn logout(
    _user: AuthUser,
    auth: &State<AuthStore>,
    projects: &State<ProjectStore>,
    cookies: &CookieJar<'_>,
) -> ApiResult<Ack<()>> {
    auth.logout();
    projects.clear_topic();
    cookies.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    ack("Signed out", ())
}

#[get("/auth/me")]
fn me(user: AuthUser) -> Json<User> {
    Json(user.0)
}

#[get("/session")]
fn session(user: AuthUser, projects: &State<ProjectStore>) -> Json<SessionView> {
    Json(SessionView {
        user: user.0,
        project: projects.snapshot(),
    })
}

#[post("/session/sidebar")]
fn toggle_sidebar(_user: AuthUser, projects: &State<ProjectStore>) -> Json<ProjectState> {
    projects.toggle_sidebar();
    Json(projects.snapshot())
}

// =====================
// Topics
// =====================

#[get("/topics")]
async fn topics(_user: AuthUser, api: &State<MockApi>) -> Json<Vec<Topic>> {
    Json(api.topics().await)
}

#[get("/topics/<id>")]
async fn topic(id: &str, _user: AuthUser, api: &State<MockApi>, projects: &State<ProjectStore>) -> ApiResult<Topic> {
    let topic = api.topic(id).await?;
    projects.set_topic(&topic.id, &topic.name);
    Ok(Json(topic))
}

#[post("/topics/<id>/status", data = "<change>")]
fn set_topic_status(id: &str, change: Json<StatusChange>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Topic>> {
    let topic = api.workspace().set_topic_status(id, change.status)?;
    ack("Status updated", topic)
}

#[get("/topics/<id>/overview")]
async fn overview(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<OverviewPayload> {
    Ok(Json(api.overview(id).await?))
}

#[get("/topics/<id>/trends")]
async fn trends(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<TrendData> {
    Ok(Json(api.trends(id).await?))
}

#[get("/topics/<id>/sentiment")]
async fn sentiment(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<SentimentData> {
    Ok(Json(api.sentiment(id).await?))
}

#[get("/topics/<id>/geo")]
async fn geo(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<GeoData> {
    Ok(Json(api.geo(id).await?))
}

#[get("/topics/<id>/demographics")]
async fn demographics(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<DemographicsData> {
    Ok(Json(api.demographics(id).await?))
}

#[get("/topics/<id>/influencers")]
async fn influencers(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<InfluencerPayload> {
    Ok(Json(api.influencers(id).await?))
}

#[get("/topics/<id>/competitors")]
async fn competitors(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Vec<Competitor>> {
    Ok(Json(api.competitors(id).await?))
}

/// Comparison charts for every competitor except the comma-separated `hidden` ids
#[get("/topics/<id>/comparison?<hidden>")]
async fn comparison(
    id: &str,
    hidden: Option<&str>,
    _user: AuthUser,
    api: &State<MockApi>,
) -> ApiResult<ComparisonView> {
    let competitors = api.competitors(id).await?;
    let hidden: Vec<String> = hidden
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let selection = CompetitorSelection::without(&competitors, &hidden);
    Ok(Json(build_comparison(&competitors, &selection)))
}

// =====================
// Mentions
// =====================

#[get("/topics/<id>/mentions?<query..>")]
async fn mentions(id: &str, query: MentionQuery, _user: AuthUser, api: &State<MockApi>) -> ApiResult<MentionPage> {
    Ok(Json(api.mentions(id, &query).await?))
}

#[get("/topics/<id>/mentions/export?<query..>")]
async fn export_mentions(
    id: &str,
    query: MentionQuery,
    _user: AuthUser,
    api: &State<MockApi>,
) -> std::result::Result<CsvDownload, DashboardError> {
    let body = api.export_mentions(id, &query).await?;
    let filename = format!("mentions-{id}-{}.csv", Utc::now().format("%Y%m%d"));
    Ok(CsvDownload::new(filename, body))
}

#[put("/topics/<id>/mentions/<mention_id>/sentiment", data = "<change>")]
fn set_mention_sentiment(
    id: &str,
    mention_id: &str,
    change: Json<SentimentOverride>,
    _user: AuthUser,
    api: &State<MockApi>,
) -> ApiResult<Ack<Mention>> {
    let mention = api.update(id, |ws| ws.set_mention_sentiment(mention_id, change.sentiment))?;
    ack("Sentiment updated", mention)
}

#[post("/topics/<id>/mentions/<mention_id>/handled")]
fn toggle_handled(id: &str, mention_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Mention>> {
    let mention = api.update(id, |ws| ws.toggle_handled(mention_id))?;
    let message = if mention.handled { "Marked as handled" } else { "Reopened" };
    ack(message, mention)
}

#[post("/topics/<id>/mentions/<mention_id>/flagged")]
fn toggle_flagged(id: &str, mention_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Mention>> {
    let mention = api.update(id, |ws| ws.toggle_flagged(mention_id))?;
    let message = if mention.flagged { "Flagged for review" } else { "Flag removed" };
    ack(message, mention)
}

// =====================
// Brand analytics
// =====================

#[get("/topics/<id>/brand/overview")]
async fn brand_overview(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<BrandOverview> {
    Ok(Json(api.brand_overview(id).await?))
}

#[get("/topics/<id>/brand/content")]
async fn brand_content(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<ContentData> {
    Ok(Json(api.content(id).await?))
}

// =====================
// Reports
// =====================

#[get("/topics/<id>/reports")]
async fn report_history(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Vec<GeneratedReport>> {
    Ok(Json(api.settings(id).await?.history))
}

#[post("/topics/<id>/reports/generate", data = "<request>")]
async fn generate_report(
    id: &str,
    request: Json<ReportRequest>,
    _user: AuthUser,
    api: &State<MockApi>,
) -> ApiResult<Ack<GeneratedReport>> {
    let report = api.generate_report(id, request.into_inner()).await?;
    ack(format!("{} is ready", report.title), report)
}

// =====================
// Settings
// =====================

#[get("/topics/<id>/settings")]
async fn settings(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<SettingsPayload> {
    Ok(Json(SettingsPayload::from(api.settings(id).await?)))
}

fn draft_view(api: &MockApi, id: &str) -> Result<SettingsPayload> {
    api.update(id, |ws| Ok(SettingsPayload::from(ws.clone())))
}

#[put("/topics/<id>/settings/topic-config", data = "<draft>")]
fn set_config_draft(id: &str, draft: Json<TopicConfig>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<SettingsPayload>> {
    let limit = api.config().keyword_limit;
    api.update(id, |ws| ws.config.set_draft(draft.into_inner(), limit))?;
    ack("Draft updated", draft_view(api, id)?)
}

#[post("/topics/<id>/settings/topic-config/keywords", data = "<change>")]
fn add_config_keyword(id: &str, change: Json<KeywordChange>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<SettingsPayload>> {
    let limit = api.config().keyword_limit;
    api.update(id, |ws| ws.config.add_keyword(change.list, &change.keyword, limit))?;
    ack("Keyword added", draft_view(api, id)?)
}

#[delete("/topics/<id>/settings/topic-config/keywords", data = "<change>")]
fn remove_config_keyword(id: &str, change: Json<KeywordChange>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<SettingsPayload>> {
    let removed = api.update(id, |ws| Ok(ws.config.remove_keyword(change.list, &change.keyword)))?;
    if !removed {
        return Err(DashboardError::not_found("Keyword", change.keyword.clone()));
    }
    ack("Keyword removed", draft_view(api, id)?)
}

#[post("/topics/<id>/settings/topic-config/platforms", data = "<change>")]
fn set_config_platform(id: &str, change: Json<PlatformChange>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<SettingsPayload>> {
    api.update(id, |ws| {
        ws.config.set_platform(change.platform, change.enabled);
        Ok(())
    })?;
    ack("Platforms updated", draft_view(api, id)?)
}

#[post("/topics/<id>/settings/topic-config/save")]
async fn save_config(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<TopicConfig>> {
    let saved = api.save_topic_config(id).await?;
    ack("Settings saved", saved)
}

#[post("/topics/<id>/settings/topic-config/cancel")]
fn cancel_config(id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<SettingsPayload>> {
    api.update(id, |ws| {
        ws.config.cancel();
        Ok(())
    })?;
    ack("Changes discarded", draft_view(api, id)?)
}

// --- alerts ---

#[post("/topics/<id>/settings/alerts", data = "<input>")]
fn create_alert(id: &str, input: Json<NewAlert>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<AlertConfig>> {
    let alert = api.update(id, |ws| ws.create_alert(input.into_inner()))?;
    ack("Alert created", alert)
}

#[put("/topics/<id>/settings/alerts/<alert_id>", data = "<input>")]
fn update_alert(id: &str, alert_id: &str, input: Json<NewAlert>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<AlertConfig>> {
    let alert = api.update(id, |ws| ws.update_alert(alert_id, input.into_inner()))?;
    ack("Alert updated", alert)
}

#[post("/topics/<id>/settings/alerts/<alert_id>/toggle")]
fn toggle_alert(id: &str, alert_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<AlertConfig>> {
    let alert = api.update(id, |ws| ws.toggle_alert(alert_id))?;
    let message = if alert.enabled { "Alert enabled" } else { "Alert paused" };
    ack(message, alert)
}

#[delete("/topics/<id>/settings/alerts/<alert_id>")]
fn delete_alert(id: &str, alert_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<AlertConfig>> {
    let alert = api.update(id, |ws| ws.delete_alert(alert_id))?;
    ack("Alert deleted", alert)
}

// --- scheduled reports ---

#[post("/topics/<id>/settings/reports", data = "<input>")]
fn create_scheduled_report(
    id: &str,
    input: Json<NewScheduledReport>,
    _user: AuthUser,
    api: &State<MockApi>,
) -> ApiResult<Ack<ScheduledReport>> {
    let report = api.update(id, |ws| ws.create_scheduled_report(input.into_inner()))?;
    ack("Report scheduled", report)
}

#[post("/topics/<id>/settings/reports/<report_id>/toggle")]
fn toggle_scheduled_report(id: &str, report_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<ScheduledReport>> {
    let report = api.update(id, |ws| ws.toggle_scheduled_report(report_id))?;
    let message = if report.enabled { "Report enabled" } else { "Report paused" };
    ack(message, report)
}

#[delete("/topics/<id>/settings/reports/<report_id>")]
fn delete_scheduled_report(id: &str, report_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<ScheduledReport>> {
    let report = api.update(id, |ws| ws.delete_scheduled_report(report_id))?;
    ack("Report deleted", report)
}

// --- webhooks ---

#[post("/topics/<id>/settings/webhooks", data = "<input>")]
fn create_webhook(id: &str, input: Json<NewWebhook>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Webhook>> {
    let webhook = api.update(id, |ws| ws.create_webhook(input.into_inner()))?;
    ack("Webhook added", webhook)
}

#[post("/topics/<id>/settings/webhooks/<webhook_id>/toggle")]
fn toggle_webhook(id: &str, webhook_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Webhook>> {
    let webhook = api.update(id, |ws| ws.toggle_webhook(webhook_id))?;
    let message = if webhook.enabled { "Webhook enabled" } else { "Webhook paused" };
    ack(message, webhook)
}

#[delete("/topics/<id>/settings/webhooks/<webhook_id>")]
fn delete_webhook(id: &str, webhook_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Webhook>> {
    let webhook = api.update(id, |ws| ws.delete_webhook(webhook_id))?;
    ack("Webhook deleted", webhook)
}

// --- api keys ---

#[post("/topics/<id>/settings/api-keys", data = "<input>")]
fn create_api_key(id: &str, input: Json<KeyName>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<GeneratedKey>> {
    let generated = api.update(id, |ws| ws.generate_api_key(&input.name))?;
    ack("Copy this key now; it will not be shown again", generated)
}

#[post("/topics/<id>/settings/api-keys/<key_id>/toggle")]
fn toggle_api_key(id: &str, key_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<ApiKey>> {
    let key = api.update(id, |ws| ws.toggle_api_key(key_id))?;
    let message = match key.status {
        ApiKeyStatus::Active => "Key reactivated",
        ApiKeyStatus::Revoked => "Key revoked",
    };
    ack(message, key)
}

#[delete("/topics/<id>/settings/api-keys/<key_id>")]
fn delete_api_key(id: &str, key_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<ApiKey>> {
    let key = api.update(id, |ws| ws.delete_api_key(key_id))?;
    ack("Key deleted", key)
}

// --- team ---

#[post("/topics/<id>/settings/team", data = "<input>")]
fn invite_member(id: &str, input: Json<NewTeamMember>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<TeamMember>> {
    let member = api.update(id, |ws| ws.invite_member(input.into_inner()))?;
    ack(format!("Invitation sent to {}", member.email), member)
}

#[put("/topics/<id>/settings/team/<member_id>/role", data = "<change>")]
fn change_role(
    id: &str,
    member_id: &str,
    change: Json<RoleChange>,
    _user: AuthUser,
    api: &State<MockApi>,
) -> ApiResult<Ack<TeamMember>> {
    let member = api.update(id, |ws| ws.change_role(member_id, change.role))?;
    ack("Role updated", member)
}

#[delete("/topics/<id>/settings/team/<member_id>")]
fn remove_member(id: &str, member_id: &str, _user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<TeamMember>> {
    let member = api.update(id, |ws| ws.remove_member(member_id))?;
    ack("Member removed", member)
}

// =====================
// Creation wizard
// =====================

#[get("/wizard")]
fn wizard(_user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    Json(api.wizard().into())
}

#[post("/wizard/details", data = "<details>")]
fn wizard_details(details: Json<WizardDetails>, _user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    api.update_wizard(|w| {
        w.set_details(&details.name, &details.description);
        if let Some(language) = details.language.as_deref() {
            w.set_language(language);
        }
    });
    Json(api.wizard().into())
}

#[post("/wizard/keywords", data = "<change>")]
fn wizard_add_keyword(change: Json<KeywordChange>, _user: AuthUser, api: &State<MockApi>) -> ApiResult<WizardView> {
    api.update_wizard(|w| w.add_keyword(change.list, &change.keyword))?;
    Ok(Json(api.wizard().into()))
}

#[delete("/wizard/keywords", data = "<change>")]
fn wizard_remove_keyword(change: Json<KeywordChange>, _user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    api.update_wizard(|w| w.remove_keyword(change.list, &change.keyword));
    Json(api.wizard().into())
}

#[post("/wizard/platforms", data = "<change>")]
fn wizard_platform(change: Json<PlatformChange>, _user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    api.update_wizard(|w| w.set_platform(change.platform, change.enabled));
    Json(api.wizard().into())
}

#[post("/wizard/next")]
fn wizard_next(_user: AuthUser, api: &State<MockApi>) -> ApiResult<WizardView> {
    api.update_wizard(|w| w.advance())?;
    Ok(Json(api.wizard().into()))
}

#[post("/wizard/back")]
fn wizard_back(_user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    api.update_wizard(|w| w.back());
    Json(api.wizard().into())
}

#[post("/wizard/submit")]
async fn wizard_submit(_user: AuthUser, api: &State<MockApi>) -> ApiResult<Ack<Topic>> {
    let topic = api.submit_wizard().await?;
    ack(format!("Created {}", topic.name), topic)
}

#[post("/wizard/reset")]
fn wizard_reset(_user: AuthUser, api: &State<MockApi>) -> Json<WizardView> {
    api.reset_wizard();
    Json(api.wizard().into())
}

pub fn routes() -> Vec<Route> {
    routes![
        login,
        logout,
        me,
        session,
        toggle_sidebar,
        topics,
        topic,
        set_topic_status,
        overview,
        trends,
        sentiment,
        geo,
        demographics,
        influencers,
        competitors,
        comparison,
        mentions,
        export_mentions,
        set_mention_sentiment,
        toggle_handled,
        toggle_flagged,
        brand_overview,
        brand_content,
        report_history,
        generate_report,
        settings,
        set_config_draft,
        add_config_keyword,
        remove_config_keyword,
        set_config_platform,
        save_config,
        cancel_config,
        create_alert,
        update_alert,
        toggle_alert,
        delete_alert,
        create_scheduled_report,
        toggle_scheduled_report,
        delete_scheduled_report,
        create_webhook,
        toggle_webhook,
        delete_webhook,
        create_api_key,
        toggle_api_key,
        delete_api_key,
        invite_member,
        change_role,
        remove_member,
        wizard,
        wizard_details,
        wizard_add_keyword,
        wizard_remove_keyword,
        wizard_platform,
        wizard_next,
        wizard_back,
        wizard_submit,
        wizard_reset,
    ]
}
