use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rocket::FromFormField;
use serde::{Deserialize, Serialize};

// =====================
// Shared enums
// =====================

/// Social platform a mention was captured from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromFormField,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
    Tiktok,
    Youtube,
    News,
    Forum,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Twitter,
        Platform::Facebook,
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Youtube,
        Platform::News,
        Platform::Forum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::News => "news",
            Platform::Forum => "forum",
        }
    }

    pub fn parse(value: &str) -> Option<Platform> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Polarity of a mention
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromFormField,
)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Trust,
    Anticipation,
    Surprise,
    Anger,
    Fear,
    Sadness,
    Disgust,
}

// =====================
// Topics and mentions
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    Active,
    Paused,
}

/// A monitored brand/issue campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: TopicStatus,
    pub mention_count: u64,
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub keywords: Vec<String>,
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    pub display_name: String,
    pub followers: u64,
    pub verified: bool,
    pub bot_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    #[serde(default)]
    pub views: u64,
}

impl Engagement {
    /// Interactions only; views are reach, not engagement
    pub fn total(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// Classifier label with an optional reviewer override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentLabel {
    pub auto: Sentiment,
    #[serde(default)]
    pub manual: Option<Sentiment>,
}

impl SentimentLabel {
    pub fn effective(&self) -> Sentiment {
        self.manual.unwrap_or(self.auto)
    }

    pub fn is_overridden(&self) -> bool {
        self.manual.is_some()
    }
}

/// A single captured social post referencing the topic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub id: String,
    pub content: String,
    pub platform: Platform,
    pub url: String,
    pub author: Author,
    pub engagement: Engagement,
    pub sentiment: SentimentLabel,
    pub emotion: Emotion,
    pub location: Option<String>,
    pub published_at: DateTime<Utc>,
    pub crawled_at: DateTime<Utc>,
    #[serde(default)]
    pub handled: bool,
    #[serde(default)]
    pub flagged: bool,
}

// =====================
// Dashboard payloads
// =====================

/// Headline metric with its previous-period value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub label: String,
    pub value: f64,
    pub previous: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentBreakdown {
    pub fn get(&self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Label with the largest share; earlier labels win ties
    pub fn dominant(&self) -> Sentiment {
        let mut best = Sentiment::Positive;
        for sentiment in Sentiment::ALL {
            if self.get(sentiment) > self.get(best) {
                best = sentiment;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCount {
    pub platform: Platform,
    pub mentions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewData {
    pub stats: Vec<StatCard>,
    pub platform_distribution: Vec<PlatformCount>,
    pub sentiment: SentimentBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub mentions: u64,
    pub reach: u64,
    pub by_platform: BTreeMap<Platform, u64>,
}

/// Mentions in one weekday/hour bucket (day 0 = Monday)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub day: u8,
    pub hour: u8,
    pub mentions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendData {
    pub daily: Vec<DailyPoint>,
    pub hourly: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: NaiveDate,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: u64,
}

/// Sentiment split for one audience segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSegment {
    pub segment: String,
    pub mentions: u64,
    pub breakdown: SentimentBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentData {
    pub breakdown: SentimentBreakdown,
    pub daily: Vec<SentimentPoint>,
    pub emotions: Vec<EmotionCount>,
    pub segments: Vec<SentimentSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStat {
    pub code: String,
    pub name: String,
    pub mentions: u64,
    pub sentiment: SentimentBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoData {
    pub regions: Vec<RegionStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeGroup {
    pub bracket: String,
    pub mentions: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    pub label: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicsData {
    pub age_groups: Vec<AgeGroup>,
    pub gender: Vec<Share>,
    pub interests: Vec<Share>,
}

// =====================
// Influencers and bots
// =====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPost {
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub engagement: u64,
}

/// Account ranked by its impact on the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub platform: Platform,
    pub followers: u64,
    pub impact_score: f64,
    pub sentiment: Sentiment,
    pub mention_count: u64,
    pub verified: bool,
    pub topics: Vec<String>,
    pub recent_posts: Vec<RecentPost>,
}

/// Interaction edge between two influencers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencerConnection {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencerData {
    pub influencers: Vec<Influencer>,
    pub connections: Vec<InfluencerConnection>,
}

/// Account ranked by bot risk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotAccount {
    pub id: String,
    pub username: String,
    pub platform: Platform,
    pub followers: u64,
    pub bot_score: f64,
    pub signals: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub posts_per_day: f64,
    pub recent_posts: Vec<RecentPost>,
}

// =====================
// Competitors and brand analytics
// =====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorMetrics {
    pub mentions: u64,
    pub reach: u64,
    pub engagement_rate: f64,
    pub sentiment_score: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mentions: u64,
}

/// A brand being compared, including the user's own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_own: bool,
    pub metrics: CompetitorMetrics,
    pub platform_share: BTreeMap<Platform, f64>,
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandOverview {
    pub health_score: f64,
    pub stats: Vec<StatCard>,
    pub sentiment: SentimentBreakdown,
    pub weekly_mentions: Vec<TrendPoint>,
    pub top_keywords: Vec<KeywordCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPost {
    pub id: String,
    pub platform: Platform,
    pub content: String,
    pub content_type: String,
    pub published_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub reach: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeStat {
    pub content_type: String,
    pub posts: u64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub top_posts: Vec<ContentPost>,
    pub content_types: Vec<ContentTypeStat>,
}

// =====================
// Settings records
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    #[field(value = "mention_spike")]
    MentionSpike,
    #[field(value = "negative_sentiment")]
    NegativeSentiment,
    Keyword,
    Influencer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Slack,
    Webhook,
    #[field(value = "in_app")]
    InApp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub id: String,
    pub name: String,
    pub alert_type: AlertType,
    pub threshold: f64,
    pub channels: Vec<NotificationChannel>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
    Xlsx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ReportSection {
    Overview,
    Sentiment,
    Mentions,
    Influencers,
    Geo,
    Demographics,
    Competitors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledReport {
    pub id: String,
    pub name: String,
    pub frequency: ReportFrequency,
    pub format: ReportFormat,
    pub recipients: Vec<String>,
    pub sections: Vec<ReportSection>,
    pub enabled: bool,
    pub next_run_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Generating,
    Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub id: String,
    pub title: String,
    pub format: ReportFormat,
    pub range: String,
    pub sections: Vec<ReportSection>,
    pub status: ReportStatus,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub url: String,
    pub events: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    Active,
    Revoked,
}

/// Stored API key; the secret itself is only returned once at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub prefix: String,
    pub status: ApiKeyStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    pub status: MemberStatus,
    pub invited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformToggle {
    pub platform: Platform,
    pub enabled: bool,
}

/// Editable monitoring configuration of a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicConfig {
    pub name: String,
    pub description: String,
    pub primary_keywords: Vec<String>,
    pub secondary_keywords: Vec<String>,
    pub excluded_keywords: Vec<String>,
    pub platforms: Vec<PlatformToggle>,
    pub language: String,
    pub crawl_frequency: String,
}

impl TopicConfig {
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.platform)
            .collect()
    }
}

/// Signed-in dashboard user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: TeamRole,
}
