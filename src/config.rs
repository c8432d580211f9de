//! Dialogue configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides:
//!
//! ```
//! use parley::config::DialogueConfig;
//!
//! let config = DialogueConfig::from_json(r#"{ "confidence_threshold": 0.7 }"#).unwrap();
//! assert_eq!(config.confidence_threshold, 0.7);
//! assert_eq!(config.max_timeouts, 3);
//! ```

use crate::core::Template;
use crate::engine::RetryPolicy;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem with a configuration value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Configuration is not valid JSON: {0}")]
    Parse(String),

    #[error("confidence_threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("max_timeouts must be at least 1")]
    NoTimeoutsAllowed,

    #[error("journal_capacity must be at least 1")]
    EmptyJournal,

    #[error("{count} configuration problem(s): {}", joined(.problems))]
    Invalid {
        count: usize,
        problems: Vec<ConfigError>,
    },
}

fn joined(problems: &[ConfigError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Tunables for one dialogue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Confidence at or above which a match is accepted without confirmation
    pub confidence_threshold: f64,

    /// Consecutive timeouts that trigger a hard reset
    pub max_timeouts: u32,

    /// Transitions kept in the session journal
    pub journal_capacity: usize,

    pub prompts: Prompts,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            max_timeouts: 3,
            journal_capacity: 64,
            prompts: Prompts::default(),
        }
    }
}

impl DialogueConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DialogueConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = vec![
            check(
                (0.0..=1.0).contains(&self.confidence_threshold),
                ConfigError::ThresholdOutOfRange(self.confidence_threshold),
            ),
            check(self.max_timeouts > 0, ConfigError::NoTimeoutsAllowed),
            check(self.journal_capacity > 0, ConfigError::EmptyJournal),
        ];

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(problems) => {
                let problems: Vec<ConfigError> = problems.iter().cloned().collect();
                Err(ConfigError::Invalid {
                    count: problems.len(),
                    problems,
                })
            }
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_timeouts)
    }

    /// True if `confidence` is high enough to skip confirmation.
    pub fn is_confident(&self, confidence: f64) -> bool {
        confidence >= self.confidence_threshold
    }
}

fn check(ok: bool, problem: ConfigError) -> Validation<(), NonEmptyVec<ConfigError>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(problem)
    }
}

/// Everything the assistant says.
///
/// Templates may use `{utterance}` (raw), `{heard}` (normalized),
/// `{title}`, `{day}`, `{time}` and `{abstract}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub welcome: Template,
    pub nomatch: Template,
    pub confirm_heard: Template,
    pub timeout: Template,
    /// Said when silence escalates to a hard reset.
    pub reset: Template,

    pub welcome_help: Template,
    pub query_help: Template,
    pub meeting_help: Template,

    pub question: Template,
    pub answer: Template,
    pub meet_person: Template,
    pub no_results: Template,

    pub start_meeting: Template,
    pub what: Template,
    pub when: Template,
    pub whole_day: Template,
    pub time: Template,
    pub confirm_whole_day: Template,
    pub confirm_meeting: Template,
    pub finalized: Template,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            welcome: "Hi, tell me, what do you need today, schedule a meeting or make a query?"
                .into(),
            nomatch: "Sorry, I can't seem to recognize what is {utterance}, try a different word."
                .into(),
            confirm_heard: "Is \"{heard}\" what you meant?".into(),
            timeout: "Sorry, I couldn't hear you properly.".into(),
            reset: "Sorry, I couldn't hear you properly. Click when you want to start again."
                .into(),

            welcome_help: "I am here to help you either schedule an appointment or look up \
                           information about any character or personality. Say \"meeting\" \
                           for the former or \"query\" for the latter."
                .into(),
            query_help: "You have selected query, you may ask: who is or who was someone, \
                         after that just answer yes or no if you want to meet them."
                .into(),
            meeting_help: "You have chosen to schedule a meeting, choose a topic, a day, and \
                           tell me if it's either the whole day or the exact time of your meeting."
                .into(),

            question: "Tell me your question.".into(),
            answer: "{abstract}".into(),
            meet_person: "Would you like to meet them?".into(),
            no_results: "There seem to be no results for that.".into(),

            start_meeting: "Let's create a meeting, then!".into(),
            what: "What is it about?".into(),
            when: "On what day?".into(),
            whole_day: "Will it take the whole day?".into(),
            time: "What time is your meeting?".into(),
            confirm_whole_day: "Do you want me to create a meeting titled {title} on {day} \
                                for the whole day?"
                .into(),
            confirm_meeting: "Do you want me to create a meeting titled {title} on {day} at {time}?"
                .into(),
            finalized: "Your meeting has been created!".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DialogueConfig::default();

        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.max_timeouts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn threshold_is_inclusive() {
        let config = DialogueConfig::default();

        assert!(!config.is_confident(0.59));
        assert!(config.is_confident(0.6));
        assert!(config.is_confident(0.61));
    }

    #[test]
    fn json_overrides_prompts() {
        let config =
            DialogueConfig::from_json(r#"{ "prompts": { "what": "Title, please." } }"#).unwrap();

        assert_eq!(config.prompts.what.source(), "Title, please.");
        assert_eq!(config.prompts.when, Prompts::default().when);
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = DialogueConfig {
            confidence_threshold: 1.5,
            max_timeouts: 0,
            journal_capacity: 0,
            ..DialogueConfig::default()
        };

        let Err(ConfigError::Invalid { count, problems }) = config.validate() else {
            panic!("Expected Invalid");
        };
        assert_eq!(count, 3);
        assert_eq!(problems[0], ConfigError::ThresholdOutOfRange(1.5));
        assert!(problems.contains(&ConfigError::NoTimeoutsAllowed));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            DialogueConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DialogueConfig::from_json(r#"{ "max_timeouts": 0 }"#),
            Err(ConfigError::Invalid { count: 1, .. })
        ));
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let config = DialogueConfig {
            confidence_threshold: f64::NAN,
            ..DialogueConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
