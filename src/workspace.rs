//! In-memory dashboard state: the topic list plus, per topic, the mention
//! list and every editable settings collection. Seeded from fixtures on
//! first access and discarded on restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::fixtures::Fixtures;
use crate::models::*;
use crate::store::random_token;
use crate::widgets::{same_keyword, KeywordInput};

// =====================
// Client-side ids
// =====================

/// Timestamp id (`<prefix>_<unix-millis>`), bumped until it is unused
pub fn next_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("{prefix}_{millis}");
        if !taken.contains(&id.as_str()) {
            return id;
        }
        millis += 1;
    }
}

/// Records addressable by id
pub trait Record {
    const KIND: &'static str;
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(impl Record for $ty {
            const KIND: &'static str = $kind;
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_record! {
    Mention => "Mention",
    AlertConfig => "Alert",
    ScheduledReport => "Report",
    GeneratedReport => "Generated report",
    Webhook => "Webhook",
    ApiKey => "API key",
    TeamMember => "Team member",
}

fn find_mut<'a, T: Record>(items: &'a mut [T], id: &str) -> Result<&'a mut T> {
    items
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| DashboardError::not_found(T::KIND, id))
}

fn remove<T: Record>(items: &mut Vec<T>, id: &str) -> Result<T> {
    let pos = items
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| DashboardError::not_found(T::KIND, id))?;
    Ok(items.remove(pos))
}

fn ids<T: Record>(items: &[T]) -> impl Iterator<Item = &str> {
    items.iter().map(|r| r.id())
}

// =====================
// Topic configuration editor
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum KeywordList {
    Primary,
    Secondary,
    Excluded,
}

/// Loaded configuration plus the draft being edited
#[derive(Debug, Clone)]
pub struct TopicConfigEditor {
    loaded: TopicConfig,
    draft: TopicConfig,
}

impl TopicConfigEditor {
    pub fn new(config: TopicConfig) -> Self {
        TopicConfigEditor {
            draft: config.clone(),
            loaded: config,
        }
    }

    pub fn loaded(&self) -> &TopicConfig {
        &self.loaded
    }

    pub fn draft(&self) -> &TopicConfig {
        &self.draft
    }

    /// Unsaved changes exist iff the draft differs from what was loaded
    pub fn is_dirty(&self) -> bool {
        self.draft != self.loaded
    }

    /// Replace the draft wholesale; keyword lists must obey the keyword input rules
    pub fn set_draft(&mut self, mut draft: TopicConfig, max_items: usize) -> Result<()> {
        for list in [
            &mut draft.primary_keywords,
            &mut draft.secondary_keywords,
            &mut draft.excluded_keywords,
        ] {
            let mut input = KeywordInput::new(max_items);
            for keyword in list.iter() {
                input.add(keyword)?;
            }
            *list = input.into_items();
        }
        self.draft = draft;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft = self.loaded.clone();
    }

    pub fn add_keyword(&mut self, list: KeywordList, keyword: &str, max_items: usize) -> Result<()> {
        let target = self.keywords_mut(list);
        let mut input = KeywordInput::from_items(target.iter(), max_items);
        input.add(keyword)?;
        *target = input.into_items();
        Ok(())
    }

    pub fn remove_keyword(&mut self, list: KeywordList, keyword: &str) -> bool {
        let target = self.keywords_mut(list);
        let before = target.len();
        target.retain(|k| !same_keyword(k, keyword));
        target.len() != before
    }

    pub fn set_platform(&mut self, platform: Platform, enabled: bool) {
        match self.draft.platforms.iter_mut().find(|p| p.platform == platform) {
            Some(toggle) => toggle.enabled = enabled,
            None => self.draft.platforms.push(PlatformToggle { platform, enabled }),
        }
    }

    /// Check the draft without changing anything
    pub fn validate(&self) -> Result<()> {
        validate_config(&self.draft)
    }

    /// Make the draft the new loaded configuration
    pub fn commit(&mut self) -> Result<TopicConfig> {
        self.validate()?;
        self.loaded = self.draft.clone();
        Ok(self.loaded.clone())
    }

    fn keywords_mut(&mut self, list: KeywordList) -> &mut Vec<String> {
        match list {
            KeywordList::Primary => &mut self.draft.primary_keywords,
            KeywordList::Secondary => &mut self.draft.secondary_keywords,
            KeywordList::Excluded => &mut self.draft.excluded_keywords,
        }
    }
}

pub fn validate_config(config: &TopicConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(DashboardError::validation("Topic name is required"));
    }
    if config.primary_keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(DashboardError::validation(
            "Add at least one primary keyword",
        ));
    }
    if config.enabled_platforms().is_empty() {
        return Err(DashboardError::validation(
            "Enable at least one platform",
        ));
    }
    Ok(())
}

// =====================
// Settings inputs
// =====================

#[derive(Debug, Clone, Deserialize, FromForm)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub name: String,
    pub alert_type: AlertType,
    pub threshold: f64,
    #[serde(default)]
    pub channels: Vec<NotificationChannel>,
}

#[derive(Debug, Clone, Deserialize, FromForm)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduledReport {
    pub name: String,
    pub frequency: ReportFrequency,
    pub format: ReportFormat,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, Deserialize, FromForm)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub title: String,
    #[serde(default = "default_report_range")]
    #[field(default = default_report_range())]
    pub range: String,
    pub sections: Vec<ReportSection>,
    pub format: ReportFormat,
}

fn default_report_range() -> String {
    "30d".to_string()
}

#[derive(Debug, Clone, Deserialize, FromForm)]
pub struct NewWebhook {
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, FromForm)]
pub struct NewTeamMember {
    #[serde(default)]
    #[field(default = String::new())]
    pub name: String,
    pub email: String,
    pub role: TeamRole,
}

/// A freshly generated key; `secret` is never stored
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedKey {
    pub key: ApiKey,
    pub secret: String,
}

// =====================
// Per-topic state
// =====================

#[derive(Debug, Clone)]
pub struct TopicWorkspace {
    pub mentions: Vec<Mention>,
    pub config: TopicConfigEditor,
    pub alerts: Vec<AlertConfig>,
    pub reports: Vec<ScheduledReport>,
    pub history: Vec<GeneratedReport>,
    pub webhooks: Vec<Webhook>,
    pub api_keys: Vec<ApiKey>,
    pub team: Vec<TeamMember>,
}

impl TopicWorkspace {
    pub fn seed(topic: &Topic, fixtures: &Fixtures) -> Self {
        let settings = &fixtures.settings;
        let mut config = settings.topic_config.clone();
        config.name = topic.name.clone();
        config.description = topic.description.clone();

        TopicWorkspace {
            mentions: fixtures.mentions.clone(),
            config: TopicConfigEditor::new(config),
            alerts: settings.alerts.clone(),
            reports: settings.reports.clone(),
            history: settings.history.clone(),
            webhooks: settings.webhooks.clone(),
            api_keys: settings.api_keys.clone(),
            team: settings.team.clone(),
        }
    }

    // --- mentions ---

    /// Set or clear (`None`) the reviewer's sentiment override
    pub fn set_mention_sentiment(&mut self, id: &str, manual: Option<Sentiment>) -> Result<Mention> {
        let mention = find_mut(&mut self.mentions, id)?;
        mention.sentiment.manual = manual;
        Ok(mention.clone())
    }

    pub fn toggle_handled(&mut self, id: &str) -> Result<Mention> {
        let mention = find_mut(&mut self.mentions, id)?;
        mention.handled = !mention.handled;
        Ok(mention.clone())
    }

    pub fn toggle_flagged(&mut self, id: &str) -> Result<Mention> {
        let mention = find_mut(&mut self.mentions, id)?;
        mention.flagged = !mention.flagged;
        Ok(mention.clone())
    }

    // --- alerts ---

    pub fn create_alert(&mut self, input: NewAlert) -> Result<AlertConfig> {
        if input.name.trim().is_empty() {
            return Err(DashboardError::validation("Alert name is required"));
        }
        if input.threshold < 0.0 {
            return Err(DashboardError::validation("Threshold must not be negative"));
        }
        let channels = if input.channels.is_empty() {
            vec![NotificationChannel::InApp]
        } else {
            input.channels
        };

        let alert = AlertConfig {
            id: next_id("alert", ids(&self.alerts)),
            name: input.name.trim().to_string(),
            alert_type: input.alert_type,
            threshold: input.threshold,
            channels,
            enabled: true,
            created_at: Utc::now(),
        };
        self.alerts.push(alert.clone());
        Ok(alert)
    }

    pub fn update_alert(&mut self, id: &str, input: NewAlert) -> Result<AlertConfig> {
        if input.name.trim().is_empty() {
            return Err(DashboardError::validation("Alert name is required"));
        }
        let alert = find_mut(&mut self.alerts, id)?;
        alert.name = input.name.trim().to_string();
        alert.alert_type = input.alert_type;
        alert.threshold = input.threshold;
        if !input.channels.is_empty() {
            alert.channels = input.channels;
        }
        Ok(alert.clone())
    }

    pub fn toggle_alert(&mut self, id: &str) -> Result<AlertConfig> {
        let alert = find_mut(&mut self.alerts, id)?;
        alert.enabled = !alert.enabled;
        Ok(alert.clone())
    }

    pub fn delete_alert(&mut self, id: &str) -> Result<AlertConfig> {
        remove(&mut self.alerts, id)
    }

    // --- reports ---

    pub fn create_scheduled_report(&mut self, input: NewScheduledReport) -> Result<ScheduledReport> {
        if input.name.trim().is_empty() {
            return Err(DashboardError::validation("Report name is required"));
        }
        if input.sections.is_empty() {
            return Err(DashboardError::validation("Select at least one section"));
        }
        if let Some(bad) = input.recipients.iter().find(|r| !r.contains('@')) {
            return Err(DashboardError::validation(format!(
                "Invalid recipient: {bad}"
            )));
        }

        let step = match input.frequency {
            ReportFrequency::Daily => Duration::days(1),
            ReportFrequency::Weekly => Duration::weeks(1),
            ReportFrequency::Monthly => Duration::days(30),
        };
        let report = ScheduledReport {
            id: next_id("report", ids(&self.reports)),
            name: input.name.trim().to_string(),
            frequency: input.frequency,
            format: input.format,
            recipients: input.recipients,
            sections: input.sections,
            enabled: true,
            next_run_at: Utc::now() + step,
        };
        self.reports.push(report.clone());
        Ok(report)
    }

    pub fn toggle_scheduled_report(&mut self, id: &str) -> Result<ScheduledReport> {
        let report = find_mut(&mut self.reports, id)?;
        report.enabled = !report.enabled;
        Ok(report.clone())
    }

    pub fn delete_scheduled_report(&mut self, id: &str) -> Result<ScheduledReport> {
        remove(&mut self.reports, id)
    }

    /// Check a report request before the simulated generation delay
    pub fn validate_report(request: &ReportRequest) -> Result<()> {
        if request.title.trim().is_empty() {
            return Err(DashboardError::validation("Report title is required"));
        }
        if request.sections.is_empty() {
            return Err(DashboardError::validation("Select at least one section"));
        }
        Ok(())
    }

    pub fn record_report(&mut self, request: ReportRequest) -> Result<GeneratedReport> {
        Self::validate_report(&request)?;
        let report = GeneratedReport {
            id: next_id("gen", ids(&self.history)),
            title: request.title.trim().to_string(),
            format: request.format,
            range: request.range,
            sections: request.sections,
            status: ReportStatus::Ready,
            generated_at: Utc::now(),
        };
        // newest first
        self.history.insert(0, report.clone());
        Ok(report)
    }

    // --- webhooks ---

    pub fn create_webhook(&mut self, input: NewWebhook) -> Result<Webhook> {
        let url = input.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) || url.len() < 12 {
            return Err(DashboardError::validation("Webhook URL must be an http(s) URL"));
        }
        let events = if input.events.is_empty() {
            vec!["alert.triggered".to_string()]
        } else {
            input.events
        };

        let webhook = Webhook {
            id: next_id("wh", ids(&self.webhooks)),
            url: url.to_string(),
            events,
            enabled: true,
            created_at: Utc::now(),
            last_triggered_at: None,
        };
        self.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    pub fn toggle_webhook(&mut self, id: &str) -> Result<Webhook> {
        let webhook = find_mut(&mut self.webhooks, id)?;
        webhook.enabled = !webhook.enabled;
        Ok(webhook.clone())
    }

    pub fn delete_webhook(&mut self, id: &str) -> Result<Webhook> {
        remove(&mut self.webhooks, id)
    }

    // --- api keys ---

    pub fn generate_api_key(&mut self, name: &str) -> Result<GeneratedKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::validation("Key name is required"));
        }

        let secret = format!("sk_live_{}", random_token(32));
        let key = ApiKey {
            id: next_id("key", ids(&self.api_keys)),
            name: name.to_string(),
            prefix: secret.chars().take(12).collect(),
            status: ApiKeyStatus::Active,
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.api_keys.push(key.clone());
        Ok(GeneratedKey { key, secret })
    }

    /// Flip between active and revoked
    pub fn toggle_api_key(&mut self, id: &str) -> Result<ApiKey> {
        let key = find_mut(&mut self.api_keys, id)?;
        key.status = match key.status {
            ApiKeyStatus::Active => ApiKeyStatus::Revoked,
            ApiKeyStatus::Revoked => ApiKeyStatus::Active,
        };
        Ok(key.clone())
    }

    pub fn delete_api_key(&mut self, id: &str) -> Result<ApiKey> {
        remove(&mut self.api_keys, id)
    }

    // --- team ---

    pub fn invite_member(&mut self, input: NewTeamMember) -> Result<TeamMember> {
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(DashboardError::validation("Enter a valid email address"));
        }
        if self.team.iter().any(|m| m.email.to_lowercase() == email) {
            return Err(DashboardError::validation(format!(
                "{email} is already on the team"
            )));
        }
        if input.role == TeamRole::Owner {
            return Err(DashboardError::validation("A topic has exactly one owner"));
        }

        let member = TeamMember {
            id: next_id("member", ids(&self.team)),
            name: input.name.trim().to_string(),
            email,
            role: input.role,
            status: MemberStatus::Pending,
            invited_at: Utc::now(),
        };
        self.team.push(member.clone());
        Ok(member)
    }

    pub fn change_role(&mut self, id: &str, role: TeamRole) -> Result<TeamMember> {
        let member = find_mut(&mut self.team, id)?;
        if member.role == TeamRole::Owner || role == TeamRole::Owner {
            return Err(DashboardError::validation("Ownership cannot be changed here"));
        }
        member.role = role;
        Ok(member.clone())
    }

    pub fn remove_member(&mut self, id: &str) -> Result<TeamMember> {
        if find_mut(&mut self.team, id)?.role == TeamRole::Owner {
            return Err(DashboardError::validation("The owner cannot be removed"));
        }
        remove(&mut self.team, id)
    }
}

// =====================
// Workspace
// =====================

#[derive(Debug)]
struct WorkspaceData {
    topics: Vec<Topic>,
    states: HashMap<String, TopicWorkspace>,
}

#[derive(Debug)]
pub struct Workspace {
    fixtures: Arc<Fixtures>,
    data: RwLock<WorkspaceData>,
}

impl Workspace {
    pub fn new(fixtures: Arc<Fixtures>) -> Self {
        let topics = fixtures.topics.clone();
        Workspace {
            fixtures,
            data: RwLock::new(WorkspaceData {
                topics,
                states: HashMap::new(),
            }),
        }
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.data.read().topics.clone()
    }

    pub fn topic(&self, id: &str) -> Result<Topic> {
        self.data
            .read()
            .topics
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DashboardError::TopicNotFound(id.to_string()))
    }

    /// Append a new topic with a fresh id and return it
    pub fn add_topic(&self, config: &TopicConfig) -> Topic {
        let mut data = self.data.write();
        let now = Utc::now();
        let topic = Topic {
            id: next_id("topic", data.topics.iter().map(|t| t.id.as_str())),
            name: config.name.trim().to_string(),
            description: config.description.trim().to_string(),
            status: TopicStatus::Active,
            mention_count: 0,
            last_crawled_at: None,
            created_at: now,
            keywords: config.primary_keywords.clone(),
            platforms: config.enabled_platforms(),
        };
        data.topics.push(topic.clone());

        let mut state = TopicWorkspace::seed(&topic, &self.fixtures);
        state.config = TopicConfigEditor::new(config.clone());
        data.states.insert(topic.id.clone(), state);
        topic
    }

    pub fn set_topic_status(&self, id: &str, status: TopicStatus) -> Result<Topic> {
        let mut data = self.data.write();
        let topic = data
            .topics
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DashboardError::TopicNotFound(id.to_string()))?;
        topic.status = status;
        Ok(topic.clone())
    }

    /// Run `f` against a topic's state, seeding it on first access
    pub fn with_topic<R>(&self, id: &str, f: impl FnOnce(&mut TopicWorkspace) -> Result<R>) -> Result<R> {
        let mut data = self.data.write();
        let WorkspaceData { topics, states } = &mut *data;
        let topic = topics
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| DashboardError::TopicNotFound(id.to_string()))?;
        let state = states
            .entry(id.to_string())
            .or_insert_with(|| TopicWorkspace::seed(topic, &self.fixtures));
        f(state)
    }

    /// Commit the topic config draft and mirror it onto the topic record
    pub fn commit_config(&self, id: &str) -> Result<TopicConfig> {
        let saved = self.with_topic(id, |ws| ws.config.commit())?;
        let mut data = self.data.write();
        if let Some(topic) = data.topics.iter_mut().find(|t| t.id == id) {
            topic.name = saved.name.clone();
            topic.description = saved.description.clone();
            topic.keywords = saved.primary_keywords.clone();
            topic.platforms = saved.enabled_platforms();
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new(Arc::new(Fixtures::load().unwrap()))
    }

    fn topic_ws() -> TopicWorkspace {
        let fixtures = Fixtures::load().unwrap();
        TopicWorkspace::seed(&fixtures.topics[0], &fixtures)
    }

    #[test]
    fn test_next_id_skips_taken() {
        let first = next_id("key", []);
        let second = next_id("key", [first.as_str()]);
        assert_ne!(first, second);
        assert!(second.starts_with("key_"));
    }

    #[test]
    fn test_generate_api_key_appends_one_unique_record() {
        let mut ws = topic_ws();
        let before: Vec<String> = ws.api_keys.iter().map(|k| k.id.clone()).collect();

        let generated = ws.generate_api_key("Reporting").unwrap();
        assert_eq!(ws.api_keys.len(), before.len() + 1);
        assert!(!before.contains(&generated.key.id));
        assert!(generated.secret.starts_with("sk_live_"));
        assert_eq!(generated.secret.len(), 40);
        assert!(generated.secret.starts_with(&generated.key.prefix));

        let again = ws.generate_api_key("Reporting 2").unwrap();
        assert_ne!(again.key.id, generated.key.id);
        assert!(ws.generate_api_key("  ").is_err());
    }

    #[test]
    fn test_create_webhook_appends_one_unique_record() {
        let mut ws = topic_ws();
        let before = ws.webhooks.len();
        let a = ws
            .create_webhook(NewWebhook {
                url: "https://example.com/hook".into(),
                events: vec![],
            })
            .unwrap();
        let b = ws
            .create_webhook(NewWebhook {
                url: "https://example.com/hook-2".into(),
                events: vec!["mention.flagged".into()],
            })
            .unwrap();
        assert_eq!(ws.webhooks.len(), before + 2);
        assert_ne!(a.id, b.id);
        assert_eq!(a.events, vec!["alert.triggered"]);
        assert!(ws
            .create_webhook(NewWebhook {
                url: "ftp://nope".into(),
                events: vec![]
            })
            .is_err());
        assert_eq!(ws.webhooks.len(), before + 2);
    }

    #[test]
    fn test_toggle_and_delete_alert() {
        let mut ws = topic_ws();
        assert!(!ws.toggle_alert("alert_1").unwrap().enabled);
        assert!(ws.toggle_alert("alert_1").unwrap().enabled);
        ws.delete_alert("alert_1").unwrap();
        assert!(matches!(
            ws.toggle_alert("alert_1"),
            Err(DashboardError::NotFound { kind: "Alert", .. })
        ));
    }

    #[test]
    fn test_create_alert_defaults_channel() {
        let mut ws = topic_ws();
        let alert = ws
            .create_alert(NewAlert {
                name: "Keyword watch".into(),
                alert_type: AlertType::Keyword,
                threshold: 1.0,
                channels: vec![],
            })
            .unwrap();
        assert_eq!(alert.channels, vec![NotificationChannel::InApp]);
        assert!(alert.enabled);
    }

    #[test]
    fn test_api_key_toggle_revokes() {
        let mut ws = topic_ws();
        assert_eq!(ws.toggle_api_key("key_1").unwrap().status, ApiKeyStatus::Revoked);
        assert_eq!(ws.toggle_api_key("key_1").unwrap().status, ApiKeyStatus::Active);
    }

    #[test]
    fn test_team_rules() {
        let mut ws = topic_ws();
        assert!(ws.remove_member("member_1").is_err());
        assert!(ws.change_role("member_1", TeamRole::Viewer).is_err());
        assert!(ws
            .invite_member(NewTeamMember {
                name: String::new(),
                email: "SAM@aurora.example".into(),
                role: TeamRole::Viewer,
            })
            .is_err());

        let member = ws
            .invite_member(NewTeamMember {
                name: "New Analyst".into(),
                email: "analyst@aurora.example".into(),
                role: TeamRole::Editor,
            })
            .unwrap();
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(ws.change_role(&member.id, TeamRole::Admin).unwrap().role, TeamRole::Admin);
        ws.remove_member(&member.id).unwrap();
        assert!(ws.team.iter().all(|m| m.id != member.id));

        let invite = |email: &str| NewTeamMember {
            name: "Zoë".into(),
            email: email.into(),
            role: TeamRole::Viewer,
        };
        ws.invite_member(invite("zoë@aurora.example")).unwrap();
        assert!(ws.invite_member(invite("ZOË@aurora.example")).is_err());
    }

    #[test]
    fn test_dirty_flag_tracks_deep_changes() {
        let mut ws = topic_ws();
        assert!(!ws.config.is_dirty());

        ws.config.set_platform(Platform::Youtube, true);
        assert!(ws.config.is_dirty());
        ws.config.set_platform(Platform::Youtube, false);
        assert!(!ws.config.is_dirty());

        ws.config.add_keyword(KeywordList::Secondary, "cold brew", 20).unwrap();
        assert!(ws.config.is_dirty());
        ws.config.cancel();
        assert!(!ws.config.is_dirty());

        ws.config.add_keyword(KeywordList::Primary, "aurora latte", 20).unwrap();
        ws.config.commit().unwrap();
        assert!(!ws.config.is_dirty());
        assert!(ws.config.loaded().primary_keywords.contains(&"aurora latte".to_string()));
    }

    #[test]
    fn test_draft_keywords_follow_input_rules() {
        let mut ws = topic_ws();
        let loaded = ws.config.draft().clone();

        let mut draft = loaded.clone();
        draft.primary_keywords = vec!["aurora".into(), "AURORA".into()];
        assert!(ws.config.set_draft(draft, 20).is_err());

        let mut draft = loaded.clone();
        draft.secondary_keywords = vec!["latte".into(), "  ".into()];
        assert!(ws.config.set_draft(draft, 20).is_err());

        let mut draft = loaded.clone();
        draft.excluded_keywords = vec!["a".into(), "b".into(), "c".into()];
        assert!(ws.config.set_draft(draft, 2).is_err());
        assert!(!ws.config.is_dirty());

        let mut draft = loaded;
        draft.primary_keywords = vec!["  café  ".into(), "latte".into()];
        ws.config.set_draft(draft, 20).unwrap();
        assert_eq!(ws.config.draft().primary_keywords, vec!["café", "latte"]);
        assert!(ws.config.add_keyword(KeywordList::Primary, "CAFÉ", 20).is_err());
        assert!(ws.config.remove_keyword(KeywordList::Primary, "Café"));
    }

    #[test]
    fn test_config_validation_blocks_save() {
        let mut ws = topic_ws();
        let mut draft = ws.config.draft().clone();
        draft.primary_keywords.clear();
        ws.config.set_draft(draft, 20).unwrap();
        assert!(ws.config.commit().is_err());
        assert!(ws.config.is_dirty());

        ws.config.cancel();
        for platform in Platform::ALL {
            ws.config.set_platform(platform, false);
        }
        let err = ws.config.commit().unwrap_err();
        assert_eq!(err.to_string(), "Enable at least one platform");
    }

    #[test]
    fn test_keyword_rules_apply_to_config() {
        let mut ws = topic_ws();
        assert!(ws.config.add_keyword(KeywordList::Primary, "Aurora Coffee", 20).is_err());
        assert!(ws.config.add_keyword(KeywordList::Primary, " ", 20).is_err());
        assert!(ws.config.add_keyword(KeywordList::Primary, "third", 2).is_err());
        assert!(ws.config.remove_keyword(KeywordList::Excluded, "AURORA BOREALIS"));
        assert!(ws.config.draft().excluded_keywords.is_empty());
    }

    #[test]
    fn test_mention_review_actions() {
        let mut ws = topic_ws();
        let m = ws.set_mention_sentiment("m_002", Some(Sentiment::Neutral)).unwrap();
        assert_eq!(m.sentiment.effective(), Sentiment::Neutral);
        let m = ws.set_mention_sentiment("m_002", None).unwrap();
        assert_eq!(m.sentiment.effective(), Sentiment::Negative);
        assert!(ws.toggle_handled("m_002").unwrap().handled);
        assert!(ws.toggle_flagged("m_002").unwrap().flagged);
        assert!(ws.toggle_handled("m_999").is_err());
    }

    #[test]
    fn test_record_report_prepends_history() {
        let mut ws = topic_ws();
        let report = ws
            .record_report(ReportRequest {
                title: "June digest".into(),
                range: "7d".into(),
                sections: vec![ReportSection::Overview],
                format: ReportFormat::Pdf,
            })
            .unwrap();
        assert_eq!(ws.history[0].id, report.id);
        assert_eq!(report.status, ReportStatus::Ready);
        assert!(ws
            .record_report(ReportRequest {
                title: "Empty".into(),
                range: "7d".into(),
                sections: vec![],
                format: ReportFormat::Csv,
            })
            .is_err());
    }

    #[test]
    fn test_workspace_unknown_topic() {
        let workspace = workspace();
        assert!(matches!(
            workspace.with_topic("topic_404", |_| Ok(())),
            Err(DashboardError::TopicNotFound(_))
        ));
    }

    #[test]
    fn test_state_persists_between_calls() {
        let workspace = workspace();
        workspace
            .with_topic("topic_1", |ws| ws.toggle_flagged("m_001").map(|_| ()))
            .unwrap();
        let flagged = workspace
            .with_topic("topic_1", |ws| Ok(ws.mentions.iter().find(|m| m.id == "m_001").unwrap().flagged))
            .unwrap();
        assert!(flagged);

        // other topics are seeded independently
        let other = workspace
            .with_topic("topic_2", |ws| Ok(ws.mentions.iter().find(|m| m.id == "m_001").unwrap().flagged))
            .unwrap();
        assert!(!other);
    }

    #[test]
    fn test_commit_config_updates_topic() {
        let workspace = workspace();
        workspace
            .with_topic("topic_1", |ws| {
                let mut draft = ws.config.draft().clone();
                draft.name = "Aurora Coffee Co.".into();
                ws.config.set_draft(draft, 20)
            })
            .unwrap();
        workspace.commit_config("topic_1").unwrap();
        assert_eq!(workspace.topic("topic_1").unwrap().name, "Aurora Coffee Co.");
    }
}
