//! Fixed-phrase grammar and the resolver built on it.

use super::SlotResolver;
use crate::core::{normalize, DialogueContext, Entity};
use std::collections::HashMap;

/// Build a [`Grammar`] from phrase rules.
///
/// Each rule maps a phrase to an intent and the entities it carries. Phrases
/// are normalized when the table is built, so `"At 10."` and `"at 10"` are
/// the same rule.
///
/// # Example
///
/// ```
/// use parley::grammar;
///
/// let grammar = grammar! {
///     "lunch" => meeting { title: "lunch" },
///     "at 10" => time { time: "10" },
/// };
///
/// assert_eq!(grammar.entity("Lunch.", "title"), Some("lunch"));
/// assert_eq!(grammar.intent("at 10"), Some("time"));
/// assert_eq!(grammar.entity("lunch", "time"), None);
/// ```
#[macro_export]
macro_rules! grammar {
    (
        $(
            $phrase:literal => $intent:ident {
                $( $category:ident : $value:literal ),* $(,)?
            }
        ),* $(,)?
    ) => {
        $crate::nlu::Grammar::new()
            $(
                .rule(
                    $phrase,
                    stringify!($intent),
                    [$( (stringify!($category), $value) ),*],
                )
            )*
    };
}

/// One phrase's interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarRule {
    pub intent: String,
    pub entities: Vec<Entity>,
}

/// Phrase table keyed by normalized utterance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: HashMap<String, GrammarRule>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<'a>(
        mut self,
        phrase: &str,
        intent: &str,
        entities: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let entities = entities
            .into_iter()
            .map(|(category, text)| Entity::new(category, text))
            .collect();
        self.rules.insert(
            normalize(phrase),
            GrammarRule {
                intent: intent.to_string(),
                entities,
            },
        );
        self
    }

    pub fn get(&self, utterance: &str) -> Option<&GrammarRule> {
        self.rules.get(&normalize(utterance))
    }

    pub fn intent(&self, utterance: &str) -> Option<&str> {
        self.get(utterance).map(|rule| rule.intent.as_str())
    }

    /// Value of `category` carried by the phrase, if the phrase is known and
    /// carries it.
    pub fn entity(&self, utterance: &str, category: &str) -> Option<&str> {
        self.get(utterance)?
            .entities
            .iter()
            .find(|entity| entity.category == category)
            .map(|entity| entity.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The appointment assistant's phrases.
pub fn default_grammar() -> Grammar {
    crate::grammar! {
        "lecture" => meeting { title: "lecture" },
        "lunch" => meeting { title: "lunch" },
        "friday" => friday { day: "friday" },
        "at 10" => time { time: "10" },
        "yes" => answer { accept: "yes" },
        "no" => no { decline: "no" },
        "meeting" => answer { meeting: "meeting" },
        "query" => yes { query: "query" },
        "help" => help { help: "help" },
        "confirmation" => confirmation { conf: "confirmation" },
    }
}

const QUESTION_PREFIXES: [&str; 2] = ["who is ", "who was "];

/// Resolves slots by exact phrase lookup.
#[derive(Clone, Debug)]
pub struct GrammarResolver {
    grammar: Grammar,
}

impl Default for GrammarResolver {
    fn default() -> Self {
        Self::new(default_grammar())
    }
}

impl GrammarResolver {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

impl SlotResolver for GrammarResolver {
    fn entity(&self, ctx: &DialogueContext, category: &str) -> Option<String> {
        self.grammar
            .entity(&ctx.last_utterance, category)
            .map(str::to_string)
    }

    /// Text after `who is ` or `who was `, normalized.
    fn question_subject(&self, ctx: &DialogueContext) -> Option<String> {
        let utterance = ctx.normalized_utterance();
        QUESTION_PREFIXES
            .iter()
            .find_map(|prefix| utterance.split_once(prefix).map(|(_, rest)| rest.trim()))
            .filter(|subject| !subject.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heard(utterance: &str) -> DialogueContext {
        DialogueContext {
            last_utterance: utterance.to_string(),
            confidence: 0.9,
            ..DialogueContext::default()
        }
    }

    #[test]
    fn default_grammar_has_all_phrases() {
        let grammar = default_grammar();

        assert_eq!(grammar.len(), 10);
        assert_eq!(grammar.entity("lecture", "title"), Some("lecture"));
        assert_eq!(grammar.entity("at 10", "time"), Some("10"));
        assert_eq!(grammar.entity("confirmation", "conf"), Some("confirmation"));
        assert_eq!(grammar.intent("query"), Some("yes"));
    }

    #[test]
    fn lookup_normalizes_utterance() {
        let resolver = GrammarResolver::default();

        assert_eq!(resolver.entity(&heard("Friday."), "day").as_deref(), Some("friday"));
        assert_eq!(resolver.entity(&heard("  YES "), "accept").as_deref(), Some("yes"));
        assert_eq!(resolver.entity(&heard("Help!"), "help").as_deref(), Some("help"));
    }

    #[test]
    fn unknown_phrase_or_category_is_none() {
        let resolver = GrammarResolver::default();

        assert_eq!(resolver.entity(&heard("dinner"), "title"), None);
        assert_eq!(resolver.entity(&heard("lunch"), "day"), None);
        assert_eq!(resolver.entity(&heard(""), "help"), None);
    }

    #[test]
    fn question_subject_strips_prefix() {
        let resolver = GrammarResolver::default();

        assert_eq!(
            resolver.question_subject(&heard("Who is Ada Lovelace?")).as_deref(),
            Some("ada lovelace")
        );
        assert_eq!(
            resolver.question_subject(&heard("who was Alan Turing")).as_deref(),
            Some("alan turing")
        );
        assert_eq!(resolver.question_subject(&heard("what is rust")), None);
        assert_eq!(resolver.question_subject(&heard("who is")), None);
    }

    #[test]
    fn macro_accepts_rules_without_entities() {
        let grammar = crate::grammar! {
            "hello" => greet {},
        };

        assert_eq!(grammar.intent("Hello!"), Some("greet"));
        assert!(grammar.get("hello").unwrap().entities.is_empty());
    }
}
