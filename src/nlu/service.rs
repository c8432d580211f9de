//! Resolver over an external NLU prediction.

use super::SlotResolver;
use crate::core::{normalize, DialogueContext};
use std::collections::HashMap;

const SUBJECT_INTENT: &str = "who is X";
const SUBJECT_CATEGORY: &str = "name";

/// Reads `entities` and `top_intent` written by the engine from a
/// recognition event.
///
/// A turn without entities never matches, whatever its intent. Otherwise a
/// category resolves to the first entity of that category (or of one of its
/// aliases), then to an intent that stands in for it.
#[derive(Clone, Debug)]
pub struct NluResolver {
    aliases: HashMap<String, Vec<String>>,
    intents: HashMap<String, String>,
}

impl Default for NluResolver {
    fn default() -> Self {
        Self::empty()
            .alias("title", "meeting")
            .intent("query", "query")
            .intent("create a meeting", "meeting")
            .intent("help", "help")
    }
}

impl NluResolver {
    /// Resolver with no aliases and no intent mappings.
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
            intents: HashMap::new(),
        }
    }

    /// Let the NLU category `served_by` fill the dialogue category `category`.
    pub fn alias(mut self, category: &str, served_by: &str) -> Self {
        self.aliases
            .entry(category.to_string())
            .or_default()
            .push(served_by.to_string());
        self
    }

    /// Let `intent` stand in for `category`. The intent name becomes the value.
    pub fn intent(mut self, intent: &str, category: &str) -> Self {
        self.intents
            .insert(intent.to_string(), category.to_string());
        self
    }

    fn accepts(&self, category: &str, candidate: &str) -> bool {
        candidate == category
            || self
                .aliases
                .get(category)
                .is_some_and(|aliases| aliases.iter().any(|alias| alias == candidate))
    }
}

impl SlotResolver for NluResolver {
    fn entity(&self, ctx: &DialogueContext, category: &str) -> Option<String> {
        if ctx.entities.is_empty() {
            return None;
        }
        if let Some(entity) = ctx
            .entities
            .iter()
            .find(|entity| self.accepts(category, &entity.category))
        {
            return Some(entity.text.clone());
        }
        let intent = ctx.top_intent.as_deref()?;
        (self.intents.get(intent).map(String::as_str) == Some(category)).then(|| intent.to_string())
    }

    fn question_subject(&self, ctx: &DialogueContext) -> Option<String> {
        if ctx.top_intent.as_deref() != Some(SUBJECT_INTENT) {
            return None;
        }
        ctx.entities
            .iter()
            .find(|entity| entity.category == SUBJECT_CATEGORY)
            .map(|entity| normalize(&entity.text))
            .filter(|subject| !subject.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Entity;

    fn predicted(intent: &str, entities: Vec<Entity>) -> DialogueContext {
        DialogueContext {
            last_utterance: "whatever was said".to_string(),
            confidence: 0.9,
            top_intent: Some(intent.to_string()),
            entities,
            ..DialogueContext::default()
        }
    }

    #[test]
    fn empty_entities_never_match() {
        let resolver = NluResolver::default();
        let ctx = predicted("query", Vec::new());

        assert_eq!(resolver.entity(&ctx, "query"), None);
        assert_eq!(resolver.entity(&ctx, "help"), None);
    }

    #[test]
    fn first_entity_of_category_wins() {
        let resolver = NluResolver::default();
        let ctx = predicted(
            "answer",
            vec![Entity::new("accept", "yes"), Entity::new("accept", "sure")],
        );

        assert_eq!(resolver.entity(&ctx, "accept").as_deref(), Some("yes"));
        assert_eq!(resolver.entity(&ctx, "decline"), None);
    }

    #[test]
    fn alias_serves_dialogue_category() {
        let resolver = NluResolver::default();
        let ctx = predicted("create a meeting", vec![Entity::new("meeting", "lunch")]);

        assert_eq!(resolver.entity(&ctx, "title").as_deref(), Some("lunch"));
    }

    #[test]
    fn intent_stands_in_for_category() {
        let resolver = NluResolver::default();
        let ctx = predicted("query", vec![Entity::new("topic", "people")]);

        assert_eq!(resolver.entity(&ctx, "query").as_deref(), Some("query"));
        assert_eq!(resolver.entity(&ctx, "meeting"), None);
    }

    #[test]
    fn question_subject_needs_intent_and_name() {
        let resolver = NluResolver::default();

        let ctx = predicted("who is X", vec![Entity::new("name", "Ada Lovelace")]);
        assert_eq!(resolver.question_subject(&ctx).as_deref(), Some("ada lovelace"));

        let wrong_intent = predicted("query", vec![Entity::new("name", "Ada Lovelace")]);
        assert_eq!(resolver.question_subject(&wrong_intent), None);

        let no_name = predicted("who is X", vec![Entity::new("place", "London")]);
        assert_eq!(resolver.question_subject(&no_name), None);
    }

    #[test]
    fn empty_resolver_has_no_aliases() {
        let resolver = NluResolver::empty();
        let ctx = predicted("create a meeting", vec![Entity::new("meeting", "lunch")]);

        assert_eq!(resolver.entity(&ctx, "title"), None);
        assert_eq!(resolver.entity(&ctx, "meeting").as_deref(), Some("lunch"));
    }
}
