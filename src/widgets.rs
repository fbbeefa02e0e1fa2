//! Shared dashboard primitives: date range picker, keyword input, stat cards
//! and insight panels.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::StatCard;

// =====================
// Date range picker
// =====================

/// Inclusive date window selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub const PRESETS: [&'static str; 3] = ["7d", "30d", "90d"];

    pub fn custom(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(DashboardError::validation("Start date must not be after end date"));
        }
        Ok(DateRange { from, to })
    }

    /// The last `days` days ending on `anchor`
    pub fn last_days(days: i64, anchor: NaiveDate) -> Self {
        DateRange {
            from: anchor - Duration::days(days.max(1) - 1),
            to: anchor,
        }
    }

    /// Parse a preset (`7d`, `30d`, `90d`) or a custom `YYYY-MM-DD..YYYY-MM-DD`.
    ///
    /// Presets are anchored on `anchor`, the newest date in the data being
    /// filtered, so fixture series stay visible regardless of today's date.
    pub fn parse(value: &str, anchor: NaiveDate) -> Result<Self> {
        let value = value.trim();
        if let Some((from, to)) = value.split_once("..") {
            let from = parse_date(from)?;
            let to = parse_date(to)?;
            return DateRange::custom(from, to);
        }

        match value {
            "7d" => Ok(DateRange::last_days(7, anchor)),
            "30d" => Ok(DateRange::last_days(30, anchor)),
            "90d" => Ok(DateRange::last_days(90, anchor)),
            other => Err(DashboardError::validation(format!("Unknown date range: {other}"))),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::validation(format!("Invalid date: {}", value.trim())))
}

// =====================
// Keyword input
// =====================

/// Case-insensitive match on trimmed text, Unicode-aware
pub fn same_keyword(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Tag-style keyword list: trimmed, unique (case-insensitive), bounded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordInput {
    items: Vec<String>,
    max_items: usize,
}

impl KeywordInput {
    pub fn new(max_items: usize) -> Self {
        KeywordInput {
            items: Vec::new(),
            max_items,
        }
    }

    /// Build from existing values, silently dropping entries `add` would reject
    pub fn from_items<I, S>(items: I, max_items: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = KeywordInput::new(max_items);
        for item in items {
            let _ = input.add(item.as_ref());
        }
        input
    }

    pub fn add(&mut self, raw: &str) -> Result<()> {
        let keyword = raw.trim();
        if keyword.is_empty() {
            return Err(DashboardError::validation("Keyword cannot be empty"));
        }
        if self.contains(keyword) {
            return Err(DashboardError::validation(format!(
                "Keyword \"{keyword}\" is already in the list"
            )));
        }
        if self.is_full() {
            return Err(DashboardError::validation(format!(
                "At most {} keywords are allowed",
                self.max_items
            )));
        }
        self.items.push(keyword.to_string());
        Ok(())
    }

    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|k| !same_keyword(k, keyword));
        self.items.len() != before
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.items.iter().any(|k| same_keyword(k, keyword))
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

// =====================
// Stat card and insights
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Stat card with its period-over-period change
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCardView {
    pub label: String,
    pub value: f64,
    pub unit: Option<String>,
    /// `None` when there is no previous value to compare against
    pub change_pct: Option<f64>,
    pub direction: TrendDirection,
}

impl From<&StatCard> for StatCardView {
    fn from(card: &StatCard) -> Self {
        let change_pct = if card.previous == 0.0 {
            None
        } else {
            Some(round1((card.value - card.previous) / card.previous * 100.0))
        };
        let direction = match change_pct {
            Some(c) if c > 0.0 => TrendDirection::Up,
            Some(c) if c < 0.0 => TrendDirection::Down,
            _ => TrendDirection::Flat,
        };

        StatCardView {
            label: card.label.clone(),
            value: card.value,
            unit: card.unit.clone(),
            change_pct,
            direction,
        }
    }
}

pub fn stat_cards(cards: &[StatCard]) -> Vec<StatCardView> {
    cards.iter().map(StatCardView::from).collect()
}

/// One line of an insight panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub detail: String,
}

impl Insight {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Insight {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
