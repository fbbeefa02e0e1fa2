//! Placeholder backend: async fetchers that resolve the topic, wait for the
//! configured latency, then hand back fixture payloads or workspace state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::fixtures::Fixtures;
use crate::mentions::{export_csv, filter_mentions, query_mentions, MentionPage, MentionQuery};
use crate::models::*;
use crate::wizard::Wizard;
use crate::workspace::{ReportRequest, TopicWorkspace, Workspace};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPayload {
    #[serde(flatten)]
    pub data: OverviewData,
    pub recent_mentions: Vec<Mention>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerPayload {
    pub influencers: Vec<Influencer>,
    pub connections: Vec<InfluencerConnection>,
    pub bots: Vec<BotAccount>,
}

/// Serializable view of a topic's editable state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub config: TopicConfig,
    pub draft: TopicConfig,
    pub dirty: bool,
    pub alerts: Vec<AlertConfig>,
    pub reports: Vec<ScheduledReport>,
    pub history: Vec<GeneratedReport>,
    pub webhooks: Vec<Webhook>,
    pub api_keys: Vec<ApiKey>,
    pub team: Vec<TeamMember>,
}

impl From<TopicWorkspace> for SettingsPayload {
    fn from(ws: TopicWorkspace) -> Self {
        SettingsPayload {
            config: ws.config.loaded().clone(),
            draft: ws.config.draft().clone(),
            dirty: ws.config.is_dirty(),
            alerts: ws.alerts,
            reports: ws.reports,
            history: ws.history,
            webhooks: ws.webhooks,
            api_keys: ws.api_keys,
            team: ws.team,
        }
    }
}

pub struct MockApi {
    fixtures: Arc<Fixtures>,
    workspace: Workspace,
    wizard: RwLock<Wizard>,
    config: DashboardConfig,
}

impl MockApi {
    pub fn new(fixtures: Fixtures, config: DashboardConfig) -> Self {
        let fixtures = Arc::new(fixtures);
        MockApi {
            workspace: Workspace::new(fixtures.clone()),
            wizard: RwLock::new(Wizard::new(config.keyword_limit)),
            fixtures,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    async fn simulate_latency(&self) {
        let latency: Duration = self.config.mock_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// Resolve the topic, then wait; the guard every topic-scoped fetch runs first
    async fn guarded(&self, topic_id: &str, endpoint: &'static str) -> Result<Topic> {
        let topic = self.workspace.topic(topic_id)?;
        tracing::debug!(topic_id, endpoint, "mock fetch");
        self.simulate_latency().await;
        Ok(topic)
    }

    // =====================
    // Portal
    // =====================

    pub async fn topics(&self) -> Vec<Topic> {
        self.simulate_latency().await;
        self.workspace.topics()
    }

    pub async fn topic(&self, topic_id: &str) -> Result<Topic> {
        self.guarded(topic_id, "topic").await
    }

    // =====================
    // Issue monitoring
    // =====================

    pub async fn overview(&self, topic_id: &str) -> Result<OverviewPayload> {
        self.guarded(topic_id, "overview").await?;
        let recent_mentions = self.workspace.with_topic(topic_id, |ws| {
            let mut recent = ws.mentions.clone();
            recent.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            recent.truncate(5);
            Ok(recent)
        })?;
        Ok(OverviewPayload {
            data: self.fixtures.overview.clone(),
            recent_mentions,
        })
    }

    pub async fn trends(&self, topic_id: &str) -> Result<TrendData> {
        self.guarded(topic_id, "trends").await?;
        Ok(self.fixtures.trends.clone())
    }

    pub async fn sentiment(&self, topic_id: &str) -> Result<SentimentData> {
        self.guarded(topic_id, "sentiment").await?;
        Ok(self.fixtures.sentiment.clone())
    }

    pub async fn geo(&self, topic_id: &str) -> Result<GeoData> {
        self.guarded(topic_id, "geo").await?;
        Ok(self.fixtures.geo.clone())
    }

    pub async fn demographics(&self, topic_id: &str) -> Result<DemographicsData> {
        self.guarded(topic_id, "demographics").await?;
        Ok(self.fixtures.demographics.clone())
    }

    pub async fn influencers(&self, topic_id: &str) -> Result<InfluencerPayload> {
        self.guarded(topic_id, "influencers").await?;
        Ok(InfluencerPayload {
            influencers: self.fixtures.influencers.influencers.clone(),
            connections: self.fixtures.influencers.connections.clone(),
            bots: self.fixtures.bots.clone(),
        })
    }

    pub async fn mentions(&self, topic_id: &str, query: &MentionQuery) -> Result<MentionPage> {
        self.guarded(topic_id, "mentions").await?;
        let page_size = self.config.page_size;
        self.workspace
            .with_topic(topic_id, |ws| Ok(query_mentions(&ws.mentions, query, page_size)))
    }

    /// Every mention matching the table filters as CSV, ignoring pagination
    pub async fn export_mentions(&self, topic_id: &str, query: &MentionQuery) -> Result<String> {
        self.guarded(topic_id, "mentions_export").await?;
        self.workspace
            .with_topic(topic_id, |ws| export_csv(&filter_mentions(&ws.mentions, query)))
    }

    pub async fn competitors(&self, topic_id: &str) -> Result<Vec<Competitor>> {
        self.guarded(topic_id, "competitors").await?;
        Ok(self.fixtures.competitors.clone())
    }

    // =====================
    // Brand analytics
    // =====================

    pub async fn brand_overview(&self, topic_id: &str) -> Result<BrandOverview> {
        self.guarded(topic_id, "brand_overview").await?;
        Ok(self.fixtures.brand.overview.clone())
    }

    pub async fn content(&self, topic_id: &str) -> Result<ContentData> {
        self.guarded(topic_id, "content").await?;
        Ok(self.fixtures.brand.content.clone())
    }

    // =====================
    // Settings
    // =====================

    /// Snapshot of a topic's editable state
    pub async fn settings(&self, topic_id: &str) -> Result<TopicWorkspace> {
        self.guarded(topic_id, "settings").await?;
        self.workspace.with_topic(topic_id, |ws| Ok(ws.clone()))
    }

    /// Synchronous mutation of a topic's state; no latency, like local component state
    pub fn update<R>(&self, topic_id: &str, f: impl FnOnce(&mut TopicWorkspace) -> Result<R>) -> Result<R> {
        self.workspace.with_topic(topic_id, f)
    }

    /// Validate the draft, wait, then commit it
    pub async fn save_topic_config(&self, topic_id: &str) -> Result<TopicConfig> {
        self.workspace.with_topic(topic_id, |ws| ws.config.validate())?;
        self.simulate_latency().await;
        let saved = self.workspace.commit_config(topic_id)?;
        tracing::info!(topic_id, name = %saved.name, "topic configuration saved");
        Ok(saved)
    }

    pub async fn generate_report(&self, topic_id: &str, request: ReportRequest) -> Result<GeneratedReport> {
        self.workspace.topic(topic_id)?;
        TopicWorkspace::validate_report(&request)?;
        self.simulate_latency().await;
        let report = self.workspace.with_topic(topic_id, |ws| ws.record_report(request))?;
        tracing::info!(topic_id, report_id = %report.id, "report generated");
        Ok(report)
    }

    // =====================
    // Creation wizard
    // =====================

    pub fn wizard(&self) -> Wizard {
        self.wizard.read().clone()
    }

    pub fn update_wizard<R>(&self, f: impl FnOnce(&mut Wizard) -> R) -> R {
        f(&mut self.wizard.write())
    }

    pub fn reset_wizard(&self) {
        *self.wizard.write() = Wizard::new(self.config.keyword_limit);
    }

    /// Submit the wizard: wait, create the topic and reset the form
    pub async fn submit_wizard(&self) -> Result<Topic> {
        let config = self.wizard.read().ready()?;
        self.simulate_latency().await;
        let topic = self.workspace.add_topic(&config);
        self.reset_wizard();
        tracing::info!(topic_id = %topic.id, name = %topic.name, "topic created");
        Ok(topic)
    }
}
