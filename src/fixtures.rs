//! Mock fixtures standing in for backend responses.
//!
//! The JSON files under `fixtures/` are embedded at compile time and parsed
//! once at startup; every fetcher hands out clones.

use serde::Deserialize;

use crate::error::Result;
use crate::models::*;

const TOPICS: &str = include_str!("../fixtures/topics.json");
const MENTIONS: &str = include_str!("../fixtures/mentions.json");
const OVERVIEW: &str = include_str!("../fixtures/overview.json");
const TRENDS: &str = include_str!("../fixtures/trends.json");
const SENTIMENT: &str = include_str!("../fixtures/sentiment.json");
const GEO: &str = include_str!("../fixtures/geo.json");
const DEMOGRAPHICS: &str = include_str!("../fixtures/demographics.json");
const INFLUENCERS: &str = include_str!("../fixtures/influencers.json");
const BOTS: &str = include_str!("../fixtures/bots.json");
const COMPETITORS: &str = include_str!("../fixtures/competitors.json");
const BRAND: &str = include_str!("../fixtures/brand.json");
const SETTINGS: &str = include_str!("../fixtures/settings.json");

#[derive(Debug, Clone, Deserialize)]
pub struct BrandFixture {
    pub overview: BrandOverview,
    pub content: ContentData,
}

/// Settings collections seeded into every topic's workspace
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFixture {
    pub topic_config: TopicConfig,
    pub alerts: Vec<AlertConfig>,
    pub reports: Vec<ScheduledReport>,
    pub history: Vec<GeneratedReport>,
    pub webhooks: Vec<Webhook>,
    pub api_keys: Vec<ApiKey>,
    pub team: Vec<TeamMember>,
}

#[derive(Debug, Clone)]
pub struct Fixtures {
    pub topics: Vec<Topic>,
    pub mentions: Vec<Mention>,
    pub overview: OverviewData,
    pub trends: TrendData,
    pub sentiment: SentimentData,
    pub geo: GeoData,
    pub demographics: DemographicsData,
    pub influencers: InfluencerData,
    pub bots: Vec<BotAccount>,
    pub competitors: Vec<Competitor>,
    pub brand: BrandFixture,
    pub settings: SettingsFixture,
}

impl Fixtures {
    /// Parse every embedded fixture
    pub fn load() -> Result<Self> {
        let fixtures = Fixtures {
            topics: serde_json::from_str(TOPICS)?,
            mentions: serde_json::from_str(MENTIONS)?,
            overview: serde_json::from_str(OVERVIEW)?,
            trends: serde_json::from_str(TRENDS)?,
            sentiment: serde_json::from_str(SENTIMENT)?,
            geo: serde_json::from_str(GEO)?,
            demographics: serde_json::from_str(DEMOGRAPHICS)?,
            influencers: serde_json::from_str(INFLUENCERS)?,
            bots: serde_json::from_str(BOTS)?,
            competitors: serde_json::from_str(COMPETITORS)?,
            brand: serde_json::from_str(BRAND)?,
            settings: serde_json::from_str(SETTINGS)?,
        };

        tracing::debug!(
            topics = fixtures.topics.len(),
            mentions = fixtures.mentions.len(),
            competitors = fixtures.competitors.len(),
            "fixtures loaded"
        );

        Ok(fixtures)
    }
}
