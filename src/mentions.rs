//! Mentions table: client-style filter, sort and pagination over the
//! in-memory mention list, plus CSV export of the filtered set.

use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::{Mention, Platform, Sentiment};

const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum MentionSort {
    #[default]
    Date,
    Engagement,
    Followers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    All,
    Open,
    Handled,
    Flagged,
}

/// Table controls as they arrive in the query string
#[derive(Debug, Clone, Default, Serialize, FromForm)]
#[serde(rename_all = "camelCase")]
pub struct MentionQuery {
    /// Repeated or comma-separated platform names; unknown names are ignored
    pub platforms: Vec<String>,
    pub sentiment: Option<Sentiment>,
    pub search: Option<String>,
    pub status: Option<ReviewStatus>,
    pub sort: Option<MentionSort>,
    pub direction: Option<SortDirection>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl MentionQuery {
    pub fn platform_filter(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .flat_map(|raw| raw.split(','))
            .filter_map(Platform::parse)
            .collect()
    }

    fn matches(&self, mention: &Mention, platforms: &[Platform], needle: Option<&str>) -> bool {
        if !platforms.is_empty() && !platforms.contains(&mention.platform) {
            return false;
        }
        if let Some(sentiment) = self.sentiment {
            if mention.sentiment.effective() != sentiment {
                return false;
            }
        }
        match self.status.unwrap_or_default() {
            ReviewStatus::All => {}
            ReviewStatus::Open if mention.handled => return false,
            ReviewStatus::Handled if !mention.handled => return false,
            ReviewStatus::Flagged if !mention.flagged => return false,
            _ => {}
        }
        if let Some(needle) = needle {
            let in_content = mention.content.to_lowercase().contains(needle);
            let in_author = mention.author.username.to_lowercase().contains(needle)
                || mention.author.display_name.to_lowercase().contains(needle);
            if !in_content && !in_author {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionPage {
    pub items: Vec<Mention>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Filtered and sorted mentions, before pagination
pub fn filter_mentions<'a>(mentions: &'a [Mention], query: &MentionQuery) -> Vec<&'a Mention> {
    let platforms = query.platform_filter();
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut rows: Vec<&Mention> = mentions
        .iter()
        .filter(|m| query.matches(m, &platforms, needle.as_deref()))
        .collect();

    let sort = query.sort.unwrap_or_default();
    rows.sort_by(|a, b| {
        let ord = match sort {
            MentionSort::Date => a.published_at.cmp(&b.published_at),
            MentionSort::Engagement => a.engagement.total().cmp(&b.engagement.total()),
            MentionSort::Followers => a.author.followers.cmp(&b.author.followers),
        };
        match query.direction.unwrap_or_default() {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    rows
}

pub fn query_mentions(mentions: &[Mention], query: &MentionQuery, default_page_size: usize) -> MentionPage {
    let rows = filter_mentions(mentions, query);
    let page_size = query
        .page_size
        .unwrap_or(default_page_size)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);
    let total = rows.len();
    let total_pages = total.div_ceil(page_size).max(1);

    // a page number too large to index is simply past the end
    let items = match (page - 1).checked_mul(page_size) {
        Some(offset) => rows.into_iter().skip(offset).take(page_size).cloned().collect(),
        None => Vec::new(),
    };

    MentionPage {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// Count of mentions per effective sentiment, in `Sentiment::ALL` order
pub fn sentiment_counts(mentions: &[Mention]) -> Vec<(Sentiment, usize)> {
    Sentiment::ALL
        .iter()
        .map(|s| {
            (
                *s,
                mentions.iter().filter(|m| m.sentiment.effective() == *s).count(),
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct MentionCsvRow<'a> {
    id: &'a str,
    published_at: String,
    platform: &'static str,
    author: &'a str,
    followers: u64,
    sentiment: &'static str,
    manual_override: bool,
    engagement: u64,
    location: &'a str,
    handled: bool,
    flagged: bool,
    content: &'a str,
    url: &'a str,
}

/// Export mentions as CSV, one row per mention
pub fn export_csv(mentions: &[&Mention]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for m in mentions {
        writer
            .serialize(MentionCsvRow {
                id: &m.id,
                published_at: m.published_at.to_rfc3339(),
                platform: m.platform.as_str(),
                author: &m.author.username,
                followers: m.author.followers,
                sentiment: m.sentiment.effective().as_str(),
                manual_override: m.sentiment.is_overridden(),
                engagement: m.engagement.total(),
                location: m.location.as_deref().unwrap_or(""),
                handled: m.handled,
                flagged: m.flagged,
                content: &m.content,
                url: &m.url,
            })
            .map_err(|e| DashboardError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Export(e.to_string()))
}
