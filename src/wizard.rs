//! Three-step topic creation wizard: details, keywords, platforms.

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::{Platform, PlatformToggle, TopicConfig};
use crate::widgets::KeywordInput;
use crate::workspace::KeywordList;

pub const MIN_NAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WizardStep {
    Details = 1,
    Keywords = 2,
    Platforms = 3,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => Some(WizardStep::Keywords),
            WizardStep::Keywords => Some(WizardStep::Platforms),
            WizardStep::Platforms => None,
        }
    }

    fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => None,
            WizardStep::Keywords => Some(WizardStep::Details),
            WizardStep::Platforms => Some(WizardStep::Keywords),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardForm {
    pub name: String,
    pub description: String,
    pub primary_keywords: KeywordInput,
    pub secondary_keywords: KeywordInput,
    pub excluded_keywords: KeywordInput,
    pub platforms: Vec<PlatformToggle>,
    pub language: String,
}

/// Wizard state; `current_step` only ever moves one step at a time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    current_step: WizardStep,
    form: WizardForm,
}

impl Wizard {
    pub fn new(keyword_limit: usize) -> Self {
        Wizard {
            current_step: WizardStep::Details,
            form: WizardForm {
                name: String::new(),
                description: String::new(),
                primary_keywords: KeywordInput::new(keyword_limit),
                secondary_keywords: KeywordInput::new(keyword_limit),
                excluded_keywords: KeywordInput::new(keyword_limit),
                platforms: Platform::ALL
                    .iter()
                    .map(|p| PlatformToggle {
                        platform: *p,
                        enabled: false,
                    })
                    .collect(),
                language: "en".to_string(),
            },
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn form(&self) -> &WizardForm {
        &self.form
    }

    pub fn set_details(&mut self, name: &str, description: &str) {
        self.form.name = name.to_string();
        self.form.description = description.to_string();
    }

    pub fn set_language(&mut self, language: &str) {
        self.form.language = language.trim().to_string();
    }

    pub fn add_keyword(&mut self, list: KeywordList, keyword: &str) -> Result<()> {
        self.keywords_mut(list).add(keyword)
    }

    pub fn remove_keyword(&mut self, list: KeywordList, keyword: &str) -> bool {
        self.keywords_mut(list).remove(keyword)
    }

    pub fn set_platform(&mut self, platform: Platform, enabled: bool) {
        if let Some(toggle) = self.form.platforms.iter_mut().find(|p| p.platform == platform) {
            toggle.enabled = enabled;
        }
    }

    /// Guard for the current step
    pub fn can_proceed(&self) -> bool {
        self.check_step(self.current_step).is_ok()
    }

    /// Guard for `step`, with the message shown when it fails
    pub fn check_step(&self, step: WizardStep) -> Result<()> {
        match step {
            WizardStep::Details if self.form.name.trim().chars().count() < MIN_NAME_LEN => Err(
                DashboardError::validation(format!(
                    "Topic name must be at least {MIN_NAME_LEN} characters"
                )),
            ),
            WizardStep::Keywords if self.form.primary_keywords.items().is_empty() => Err(
                DashboardError::validation("Add at least one primary keyword"),
            ),
            WizardStep::Platforms if !self.form.platforms.iter().any(|p| p.enabled) => Err(
                DashboardError::validation("Enable at least one platform"),
            ),
            _ => Ok(()),
        }
    }

    /// Advance one step when the guard passes, or say which guard blocked it
    pub fn advance(&mut self) -> Result<WizardStep> {
        self.check_step(self.current_step)?;
        let step = self
            .current_step
            .next()
            .ok_or_else(|| DashboardError::validation("Already on the last step"))?;
        self.current_step = step;
        Ok(step)
    }

    /// Advance one step when the guard passes; returns whether it moved
    pub fn next(&mut self) -> bool {
        self.advance().is_ok()
    }

    /// Go back one step; returns whether it moved
    pub fn back(&mut self) -> bool {
        match self.current_step.prev() {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    /// Final check before submission: on the last step with every guard satisfied.
    /// Earlier steps are re-checked since their fields stay editable.
    pub fn ready(&self) -> Result<TopicConfig> {
        if self.current_step != WizardStep::Platforms {
            return Err(DashboardError::validation("Complete every step first"));
        }
        for step in [WizardStep::Details, WizardStep::Keywords, WizardStep::Platforms] {
            self.check_step(step)?;
        }
        Ok(self.to_config())
    }

    pub fn to_config(&self) -> TopicConfig {
        TopicConfig {
            name: self.form.name.trim().to_string(),
            description: self.form.description.trim().to_string(),
            primary_keywords: self.form.primary_keywords.items().to_vec(),
            secondary_keywords: self.form.secondary_keywords.items().to_vec(),
            excluded_keywords: self.form.excluded_keywords.items().to_vec(),
            platforms: self.form.platforms.clone(),
            language: self.form.language.clone(),
            crawl_frequency: "hourly".to_string(),
        }
    }

    fn keywords_mut(&mut self, list: KeywordList) -> &mut KeywordInput {
        match list {
            KeywordList::Primary => &mut self.form.primary_keywords,
            KeywordList::Secondary => &mut self.form.secondary_keywords,
            KeywordList::Excluded => &mut self.form.excluded_keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_guard_blocks_step_one() {
        let mut wizard = Wizard::new(20);
        wizard.set_details("  ab  ", "");
        assert!(!wizard.can_proceed());
        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::Details);

        wizard.set_details("abc", "");
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::Keywords);
    }

    #[test]
    fn test_keyword_guard_blocks_step_two() {
        let mut wizard = Wizard::new(20);
        wizard.set_details("Aurora", "");
        wizard.next();
        assert!(!wizard.next());

        wizard.add_keyword(KeywordList::Secondary, "latte").unwrap();
        assert!(!wizard.next());

        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::Platforms);
    }

    #[test]
    fn test_platform_guard_and_ready() {
        let mut wizard = Wizard::new(20);
        wizard.set_details("Aurora", "coffee");
        wizard.next();
        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        wizard.next();

        assert!(!wizard.can_proceed());
        assert!(wizard.ready().is_err());

        wizard.set_platform(Platform::Twitter, true);
        let config = wizard.ready().unwrap();
        assert_eq!(config.enabled_platforms(), vec![Platform::Twitter]);
        assert_eq!(config.primary_keywords, vec!["aurora"]);

        // already on the last step
        assert!(!wizard.next());
        assert_eq!(wizard.current_step().number(), 3);
    }

    #[test]
    fn test_back_never_skips() {
        let mut wizard = Wizard::new(20);
        assert!(!wizard.back());
        wizard.set_details("Aurora", "");
        wizard.next();
        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        wizard.next();

        assert!(wizard.back());
        assert_eq!(wizard.current_step(), WizardStep::Keywords);
        assert!(wizard.back());
        assert_eq!(wizard.current_step(), WizardStep::Details);
        assert!(!wizard.back());
    }

    #[test]
    fn test_ready_requires_last_step() {
        let mut wizard = Wizard::new(20);
        wizard.set_details("Aurora", "");
        wizard.set_platform(Platform::News, true);
        assert!(wizard.ready().is_err());
    }

    #[test]
    fn test_ready_rechecks_earlier_steps() {
        let mut wizard = Wizard::new(20);
        wizard.set_details("Aurora", "");
        wizard.next();
        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        wizard.next();
        wizard.set_platform(Platform::Twitter, true);
        assert!(wizard.ready().is_ok());

        wizard.set_details("", "");
        let err = wizard.ready().unwrap_err();
        assert_eq!(err.to_string(), "Topic name must be at least 3 characters");

        wizard.set_details("Aurora", "");
        assert!(wizard.remove_keyword(KeywordList::Primary, "aurora"));
        let err = wizard.ready().unwrap_err();
        assert_eq!(err.to_string(), "Add at least one primary keyword");
        assert_eq!(wizard.current_step(), WizardStep::Platforms);
    }

    #[test]
    fn test_advance_reports_current_guard() {
        let mut wizard = Wizard::new(20);
        let err = wizard.advance().unwrap_err();
        assert_eq!(err.to_string(), "Topic name must be at least 3 characters");

        wizard.set_details("Aurora", "");
        assert_eq!(wizard.advance().unwrap(), WizardStep::Keywords);
        let err = wizard.advance().unwrap_err();
        assert_eq!(err.to_string(), "Add at least one primary keyword");

        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        wizard.advance().unwrap();
        let err = wizard.advance().unwrap_err();
        assert_eq!(err.to_string(), "Enable at least one platform");
    }

    #[test]
    fn test_wizard_keywords_follow_input_rules() {
        let mut wizard = Wizard::new(1);
        wizard.add_keyword(KeywordList::Primary, "aurora").unwrap();
        assert!(wizard.add_keyword(KeywordList::Primary, "other").is_err());
        assert!(wizard.add_keyword(KeywordList::Excluded, "").is_err());
        assert!(wizard.remove_keyword(KeywordList::Primary, "Aurora"));
    }
}
