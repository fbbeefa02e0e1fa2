//! Chart adapters: turn fixture payloads into the series shapes the page
//! charts render, with a fixed palette per category.
//!
//! Derived insights are single reductions over the chart input. When two
//! entries tie, the earlier one in input order wins.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::*;
use crate::widgets::{round1, DateRange, Insight};

// =====================
// Palette
// =====================

pub fn sentiment_color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "#22c55e",
        Sentiment::Neutral => "#94a3b8",
        Sentiment::Negative => "#ef4444",
    }
}

pub fn platform_color(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "#1d9bf0",
        Platform::Facebook => "#1877f2",
        Platform::Instagram => "#e1306c",
        Platform::Tiktok => "#111827",
        Platform::Youtube => "#ff0000",
        Platform::News => "#f59e0b",
        Platform::Forum => "#8b5cf6",
    }
}

const AGE_PALETTE: [&str; 6] = ["#c7d2fe", "#a5b4fc", "#818cf8", "#6366f1", "#4f46e5", "#3730a3"];

pub fn age_color(index: usize) -> &'static str {
    AGE_PALETTE[index % AGE_PALETTE.len()]
}

/// Choropleth shades, lightest to darkest
const INTENSITY_PALETTE: [&str; 5] = ["#eff6ff", "#bfdbfe", "#60a5fa", "#2563eb", "#1e3a8a"];

/// Return the first item with the largest key; ties keep the earlier item
pub fn first_max_by<T, K, F>(items: &[T], key: F) -> Option<&T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let k = key(item);
        let replace = match &best {
            Some((_, best_key)) => k > *best_key,
            None => true,
        };
        if replace {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}

// =====================
// Pie / bar slices
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

pub fn sentiment_slices(breakdown: &SentimentBreakdown) -> Vec<Slice> {
    Sentiment::ALL
        .iter()
        .map(|s| Slice {
            label: s.as_str().to_string(),
            value: breakdown.get(*s),
            color: sentiment_color(*s).to_string(),
        })
        .collect()
}

pub fn platform_slices(counts: &[PlatformCount]) -> Vec<Slice> {
    counts
        .iter()
        .map(|c| Slice {
            label: c.platform.as_str().to_string(),
            value: c.mentions as f64,
            color: platform_color(c.platform).to_string(),
        })
        .collect()
}

pub fn age_slices(groups: &[AgeGroup]) -> Vec<Slice> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| Slice {
            label: g.bracket.clone(),
            value: g.percentage,
            color: age_color(i).to_string(),
        })
        .collect()
}

pub fn share_slices(shares: &[Share]) -> Vec<Slice> {
    shares
        .iter()
        .enumerate()
        .map(|(i, s)| Slice {
            label: s.label.clone(),
            value: s.percentage,
            color: age_color(i + 2).to_string(),
        })
        .collect()
}

// =====================
// Line series and heatmap
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<SeriesPoint>,
}

/// Total mentions line followed by one line per platform, restricted to `range`
pub fn mention_trend_series(daily: &[DailyPoint], range: Option<&DateRange>) -> Vec<LineSeries> {
    let visible: Vec<&DailyPoint> = daily
        .iter()
        .filter(|p| range.map_or(true, |r| r.contains(p.date)))
        .collect();

    let mut series = vec![LineSeries {
        name: "total".to_string(),
        color: "#6366f1".to_string(),
        points: visible
            .iter()
            .map(|p| SeriesPoint {
                x: p.date.to_string(),
                y: p.mentions as f64,
            })
            .collect(),
    }];

    for platform in Platform::ALL {
        if !visible.iter().any(|p| p.by_platform.contains_key(&platform)) {
            continue;
        }
        series.push(LineSeries {
            name: platform.as_str().to_string(),
            color: platform_color(platform).to_string(),
            points: visible
                .iter()
                .map(|p| SeriesPoint {
                    x: p.date.to_string(),
                    y: p.by_platform.get(&platform).copied().unwrap_or(0) as f64,
                })
                .collect(),
        });
    }

    series
}

/// Stacked sentiment area series, one per label
pub fn sentiment_trend_series(daily: &[SentimentPoint]) -> Vec<LineSeries> {
    Sentiment::ALL
        .iter()
        .map(|s| LineSeries {
            name: s.as_str().to_string(),
            color: sentiment_color(*s).to_string(),
            points: daily
                .iter()
                .map(|p| SeriesPoint {
                    x: p.date.to_string(),
                    y: match s {
                        Sentiment::Positive => p.positive,
                        Sentiment::Neutral => p.neutral,
                        Sentiment::Negative => p.negative,
                    } as f64,
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCellView {
    pub day: u8,
    pub hour: u8,
    pub mentions: u64,
    /// Share of the busiest cell, 0.0..=1.0
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    pub cells: Vec<HeatmapCellView>,
    pub max: u64,
}

pub fn heatmap(cells: &[HeatmapCell]) -> Heatmap {
    let max = cells.iter().map(|c| c.mentions).max().unwrap_or(0);
    Heatmap {
        cells: cells
            .iter()
            .map(|c| HeatmapCellView {
                day: c.day,
                hour: c.hour,
                mentions: c.mentions,
                intensity: if max == 0 {
                    0.0
                } else {
                    c.mentions as f64 / max as f64
                },
            })
            .collect(),
        max,
    }
}

// =====================
// Force graph (influencer network)
// =====================

/// Graph node for visualization
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub size: f64,
    pub color: String,
}

/// Graph edge for visualization
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Complete graph data for visualization
#[derive(Debug, Clone, Serialize)]
pub struct ForceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// Build the influencer network. Edges touching an influencer outside the
/// given set are dropped; node size grows with connection count.
pub fn influencer_graph(influencers: &[Influencer], connections: &[InfluencerConnection]) -> ForceGraph {
    let mut degree: HashMap<&str, f64> = influencers.iter().map(|i| (i.id.as_str(), 0.0)).collect();

    let mut edges = Vec::new();
    for conn in connections {
        if !degree.contains_key(conn.source.as_str()) || !degree.contains_key(conn.target.as_str()) {
            continue;
        }
        if let Some(d) = degree.get_mut(conn.source.as_str()) {
            *d += 1.0;
        }
        if let Some(d) = degree.get_mut(conn.target.as_str()) {
            *d += 1.0;
        }
        edges.push(GraphEdge {
            source: conn.source.clone(),
            target: conn.target.clone(),
            weight: conn.weight,
        });
    }

    let nodes: Vec<GraphNode> = influencers
        .iter()
        .map(|i| GraphNode {
            id: i.id.clone(),
            label: i.username.clone(),
            size: degree.get(i.id.as_str()).copied().unwrap_or(0.0) + 10.0, // Base size + connections
            color: sentiment_color(i.sentiment).to_string(),
        })
        .collect();

    let total_nodes = nodes.len();
    let total_edges = edges.len();

    ForceGraph {
        nodes,
        edges,
        total_nodes,
        total_edges,
    }
}

// =====================
// Choropleth
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethRegion {
    pub code: String,
    pub name: String,
    pub mentions: u64,
    /// 0 (lightest) to 4 (darkest)
    pub intensity: u8,
    pub color: String,
    pub dominant: Sentiment,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choropleth {
    pub regions: Vec<ChoroplethRegion>,
    pub max_mentions: u64,
}

pub fn intensity_bucket(mentions: u64, max: u64) -> u8 {
    if max == 0 {
        return 0;
    }
    let ratio = mentions as f64 / max as f64;
    ((ratio * INTENSITY_PALETTE.len() as f64).floor() as usize).min(INTENSITY_PALETTE.len() - 1) as u8
}

pub fn choropleth(geo: &GeoData) -> Choropleth {
    let max_mentions = geo.regions.iter().map(|r| r.mentions).max().unwrap_or(0);
    Choropleth {
        regions: geo
            .regions
            .iter()
            .map(|r| {
                let intensity = intensity_bucket(r.mentions, max_mentions);
                ChoroplethRegion {
                    code: r.code.clone(),
                    name: r.name.clone(),
                    mentions: r.mentions,
                    intensity,
                    color: INTENSITY_PALETTE[intensity as usize].to_string(),
                    dominant: r.sentiment.dominant(),
                }
            })
            .collect(),
        max_mentions,
    }
}

// =====================
// Insights
// =====================

pub fn peak_age_group(groups: &[AgeGroup]) -> Option<&AgeGroup> {
    first_max_by(groups, |g| g.mentions)
}

/// Segment with the highest negative share
pub fn most_critical_segment(segments: &[SentimentSegment]) -> Option<&SentimentSegment> {
    first_max_by(segments, |s| s.breakdown.negative)
}

pub fn peak_day(daily: &[DailyPoint]) -> Option<&DailyPoint> {
    first_max_by(daily, |p| p.mentions)
}

pub fn top_platform(counts: &[PlatformCount]) -> Option<&PlatformCount> {
    first_max_by(counts, |c| c.mentions)
}

pub fn dominant_emotion(emotions: &[EmotionCount]) -> Option<&EmotionCount> {
    first_max_by(emotions, |e| e.count)
}

pub fn overview_insights(overview: &OverviewData) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(top) = top_platform(&overview.platform_distribution) {
        let total: u64 = overview.platform_distribution.iter().map(|c| c.mentions).sum();
        let share = if total == 0 {
            0.0
        } else {
            round1(top.mentions as f64 / total as f64 * 100.0)
        };
        insights.push(Insight::new(
            "Top platform",
            format!("{} drives {}% of mentions", top.platform.as_str(), share),
        ));
    }
    insights.push(Insight::new(
        "Overall tone",
        format!(
            "Mostly {} ({}% positive, {}% negative)",
            overview.sentiment.dominant().as_str(),
            overview.sentiment.positive,
            overview.sentiment.negative
        ),
    ));
    insights
}

pub fn trend_insights(daily: &[DailyPoint]) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(peak) = peak_day(daily) {
        insights.push(Insight::new(
            "Peak day",
            format!("{} with {} mentions", peak.date, peak.mentions),
        ));
    }
    if !daily.is_empty() {
        let total: u64 = daily.iter().map(|p| p.mentions).sum();
        insights.push(Insight::new(
            "Daily average",
            format!("{} mentions per day", round1(total as f64 / daily.len() as f64)),
        ));
    }
    insights
}

pub fn sentiment_insights(data: &SentimentData) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(segment) = most_critical_segment(&data.segments) {
        insights.push(Insight::new(
            "Most critical segment",
            format!("{} with {}% negative", segment.segment, segment.breakdown.negative),
        ));
    }
    if let Some(emotion) = dominant_emotion(&data.emotions) {
        insights.push(Insight::new(
            "Dominant emotion",
            format!("{:?} ({} mentions)", emotion.emotion, emotion.count).to_lowercase(),
        ));
    }
    insights
}

pub fn demographic_insights(data: &DemographicsData) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(group) = peak_age_group(&data.age_groups) {
        insights.push(Insight::new(
            "Peak age group",
            format!("{} ({}% of mentions)", group.bracket, group.percentage),
        ));
    }
    if let Some(gender) = first_max_by(&data.gender, |g| g.percentage) {
        insights.push(Insight::new(
            "Largest audience",
            format!("{} at {}%", gender.label, gender.percentage),
        ));
    }
    insights
}

pub fn geo_insights(geo: &GeoData) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(region) = first_max_by(&geo.regions, |r| r.mentions) {
        insights.push(Insight::new(
            "Most active region",
            format!("{} with {} mentions", region.name, region.mentions),
        ));
    }
    if let Some(region) = first_max_by(&geo.regions, |r| r.sentiment.negative) {
        insights.push(Insight::new(
            "Most negative region",
            format!("{} ({}% negative)", region.name, region.sentiment.negative),
        ));
    }
    insights
}
