//! Influencer ranking and bot-risk filtering.

use crate::models::{BotAccount, Influencer, Platform};

pub const DEFAULT_BOT_THRESHOLD: f64 = 70.0;

/// Influencers matching the filters, highest impact first
pub fn filter_influencers(
    influencers: &[Influencer],
    platform: Option<Platform>,
    min_followers: Option<u64>,
) -> Vec<Influencer> {
    let mut rows: Vec<Influencer> = influencers
        .iter()
        .filter(|i| platform.map_or(true, |p| i.platform == p))
        .filter(|i| i.followers >= min_followers.unwrap_or(0))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
    rows
}

/// Slider value clamped to 0..=100; missing or NaN means the default
pub fn bot_threshold_or_default(threshold: Option<f64>) -> f64 {
    match threshold {
        Some(t) if !t.is_nan() => t.clamp(0.0, 100.0),
        _ => DEFAULT_BOT_THRESHOLD,
    }
}

/// Accounts at or above the slider threshold (clamped to 0..=100), riskiest first
pub fn filter_bots(bots: &[BotAccount], threshold: f64) -> Vec<BotAccount> {
    let threshold = bot_threshold_or_default(Some(threshold));
    let mut rows: Vec<BotAccount> = bots
        .iter()
        .filter(|b| b.bot_score >= threshold)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.bot_score.total_cmp(&a.bot_score));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;

    #[test]
    fn test_influencers_sorted_by_impact() {
        let fixtures = Fixtures::load().unwrap();
        let rows = filter_influencers(&fixtures.influencers.influencers, None, None);
        assert_eq!(rows[0].username, "bean.critic");
        assert!(rows.windows(2).all(|w| w[0].impact_score >= w[1].impact_score));
    }

    #[test]
    fn test_influencer_filters() {
        let fixtures = Fixtures::load().unwrap();
        let rows = filter_influencers(&fixtures.influencers.influencers, None, Some(100_000));
        assert_eq!(rows.len(), 3);
        let rows = filter_influencers(
            &fixtures.influencers.influencers,
            Some(Platform::Instagram),
            None,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "inf_4");
    }

    #[test]
    fn test_bot_threshold() {
        let fixtures = Fixtures::load().unwrap();
        assert_eq!(filter_bots(&fixtures.bots, DEFAULT_BOT_THRESHOLD).len(), 3);
        assert_eq!(filter_bots(&fixtures.bots, 0.0).len(), fixtures.bots.len());
        assert_eq!(filter_bots(&fixtures.bots, 250.0).len(), 0);
        let rows = filter_bots(&fixtures.bots, 50.0);
        assert_eq!(rows[0].username, "promo_bot_4821");
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_threshold_normalised() {
        assert_eq!(bot_threshold_or_default(None), DEFAULT_BOT_THRESHOLD);
        assert_eq!(bot_threshold_or_default(Some(f64::NAN)), DEFAULT_BOT_THRESHOLD);
        assert_eq!(bot_threshold_or_default(Some(-5.0)), 0.0);
        assert_eq!(bot_threshold_or_default(Some(140.0)), 100.0);
        assert_eq!(bot_threshold_or_default(Some(55.5)), 55.5);
    }
}
