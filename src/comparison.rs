//! Competitor comparison: which brands are selected and the chart series
//! built from that selection.

use serde::Serialize;

use crate::charts::{first_max_by, LineSeries, SeriesPoint, Slice};
use crate::models::{Competitor, Platform};
use crate::widgets::{round1, Insight};

/// Checkbox state of the competitor list. The own brand is always selected.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorSelection {
    own_id: Option<String>,
    selected: Vec<String>,
}

impl CompetitorSelection {
    /// Everything checked, as on first render
    pub fn all(competitors: &[Competitor]) -> Self {
        CompetitorSelection {
            own_id: competitors.iter().find(|c| c.is_own).map(|c| c.id.clone()),
            selected: competitors.iter().map(|c| c.id.clone()).collect(),
        }
    }

    /// Everything checked except `hidden`; the own brand cannot be hidden
    pub fn without(competitors: &[Competitor], hidden: &[String]) -> Self {
        let mut selection = CompetitorSelection::all(competitors);
        let own = selection.own_id.clone();
        selection
            .selected
            .retain(|id| Some(id) == own.as_ref() || !hidden.contains(id));
        selection
    }

    /// Flip a checkbox and return whether the competitor is now selected.
    /// Toggling the own brand is a no-op.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.own_id.as_deref() == Some(id) {
            return true;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id.to_string());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Ids currently unchecked, in competitor order
    pub fn hidden(&self, competitors: &[Competitor]) -> Vec<String> {
        competitors
            .iter()
            .filter(|c| !self.is_selected(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Selected competitors in their original order
    pub fn visible<'a>(&self, competitors: &'a [Competitor]) -> Vec<&'a Competitor> {
        competitors.iter().filter(|c| self.is_selected(&c.id)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_own: bool,
    pub selected: bool,
    pub mentions: u64,
    pub reach: u64,
    pub engagement_rate: f64,
    pub sentiment_score: f64,
    /// Share among the selected brands; `None` when unchecked
    pub share_of_voice: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorSentiment {
    pub name: String,
    pub color: String,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Every comparison chart, built from the selected competitors only
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub rows: Vec<CompetitorRow>,
    pub share_of_voice: Vec<Slice>,
    pub sentiment: Vec<CompetitorSentiment>,
    pub platform_share: Vec<LineSeries>,
    pub trend: Vec<LineSeries>,
    pub insights: Vec<Insight>,
}

/// Share of voice per competitor, over the given set only
pub fn share_of_voice(competitors: &[&Competitor]) -> Vec<Slice> {
    let total: u64 = competitors.iter().map(|c| c.metrics.mentions).sum();
    competitors
        .iter()
        .map(|c| Slice {
            label: c.name.clone(),
            value: if total == 0 {
                0.0
            } else {
                c.metrics.mentions as f64 / total as f64 * 100.0
            },
            color: c.color.clone(),
        })
        .collect()
}

/// Brand with the largest mention count among the given set
pub fn leading_competitor<'a>(competitors: &[&'a Competitor]) -> Option<&'a Competitor> {
    first_max_by(competitors, |c| c.metrics.mentions).copied()
}

pub fn build_comparison(competitors: &[Competitor], selection: &CompetitorSelection) -> ComparisonView {
    let visible = selection.visible(competitors);
    let sov = share_of_voice(&visible);

    let rows = competitors
        .iter()
        .map(|c| CompetitorRow {
            id: c.id.clone(),
            name: c.name.clone(),
            color: c.color.clone(),
            is_own: c.is_own,
            selected: selection.is_selected(&c.id),
            mentions: c.metrics.mentions,
            reach: c.metrics.reach,
            engagement_rate: c.metrics.engagement_rate,
            sentiment_score: c.metrics.sentiment_score,
            share_of_voice: sov.iter().find(|s| s.label == c.name).map(|s| round1(s.value)),
        })
        .collect();

    let sentiment = visible
        .iter()
        .map(|c| CompetitorSentiment {
            name: c.name.clone(),
            color: c.color.clone(),
            positive: c.metrics.positive,
            neutral: c.metrics.neutral,
            negative: c.metrics.negative,
        })
        .collect();

    let platform_share = visible
        .iter()
        .map(|c| LineSeries {
            name: c.name.clone(),
            color: c.color.clone(),
            points: Platform::ALL
                .iter()
                .filter_map(|p| {
                    c.platform_share.get(p).map(|v| SeriesPoint {
                        x: p.as_str().to_string(),
                        y: *v,
                    })
                })
                .collect(),
        })
        .collect();

    let trend = visible
        .iter()
        .map(|c| LineSeries {
            name: c.name.clone(),
            color: c.color.clone(),
            points: c
                .trend
                .iter()
                .map(|p| SeriesPoint {
                    x: p.date.to_string(),
                    y: p.mentions as f64,
                })
                .collect(),
        })
        .collect();

    let mut insights = Vec::new();
    if let Some(leader) = leading_competitor(&visible) {
        let share = sov
            .iter()
            .find(|s| s.label == leader.name)
            .map(|s| round1(s.value))
            .unwrap_or(0.0);
        insights.push(Insight::new(
            "Leading brand",
            format!("{} holds {}% share of voice", leader.name, share),
        ));
    }
    if let Some(best) = first_max_by(&visible, |c| c.metrics.sentiment_score) {
        insights.push(Insight::new(
            "Best sentiment",
            format!("{} scores {}", best.name, best.metrics.sentiment_score),
        ));
    }

    ComparisonView {
        rows,
        share_of_voice: sov,
        sentiment,
        platform_share,
        trend,
        insights,
    }
}
