//! Guards and assignments over the slot resolver.

use crate::chart::TransitionDef;
use crate::core::{Action, DialogueContext, Guard, Slot};
use crate::nlu::SlotResolver;
use std::fmt;
use std::sync::Arc;

/// Something a turn can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// An entity of the named category.
    Entity(&'static str),
    /// The subject of a "who is" question.
    Subject,
}

/// Builds guards and slot assignments that read the current turn through a
/// [`SlotResolver`], gated on a confidence threshold.
#[derive(Clone)]
pub struct Cues {
    resolver: Arc<dyn SlotResolver>,
    threshold: f64,
}

impl fmt::Debug for Cues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cues")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Cues {
    pub fn new(resolver: Arc<dyn SlotResolver>, threshold: f64) -> Self {
        Self {
            resolver,
            threshold,
        }
    }

    /// What the current turn carries for `cue`.
    pub fn read(&self, cue: Cue, ctx: &DialogueContext) -> Option<String> {
        read(self.resolver.as_ref(), cue, ctx)
    }

    /// The turn carries `cue`, whatever the confidence.
    pub fn present(&self, cue: Cue) -> Guard {
        let resolver = Arc::clone(&self.resolver);
        Guard::new(move |ctx: &DialogueContext| read(resolver.as_ref(), cue, ctx).is_some())
    }

    /// Recognition confidence is at or above the threshold.
    pub fn confident(&self) -> Guard {
        let threshold = self.threshold;
        Guard::new(move |ctx: &DialogueContext| ctx.confidence >= threshold)
    }

    /// Set `slot` to what the turn carries for `cue`.
    pub fn fill(&self, slot: Slot, cue: Cue) -> Action {
        let resolver = Arc::clone(&self.resolver);
        Action::assign_slot(slot, move |ctx| read(resolver.as_ref(), cue, ctx))
    }

    /// The confident and tentative transitions for one cue, in that order.
    ///
    /// Both assign the candidate to `slot`. A tentative match goes to a
    /// confirmation flow, which clears the slot again on decline.
    pub fn gated(
        &self,
        cue: Cue,
        slot: Slot,
        confident_target: &str,
        tentative_target: &str,
    ) -> [TransitionDef; 2] {
        [
            TransitionDef::to(confident_target)
                .guard(self.present(cue).and(self.confident()))
                .action(self.fill(slot, cue)),
            TransitionDef::to(tentative_target)
                .guard(self.present(cue).and(self.confident().negate()))
                .action(self.fill(slot, cue)),
        ]
    }
}

fn read(resolver: &dyn SlotResolver, cue: Cue, ctx: &DialogueContext) -> Option<String> {
    match cue {
        Cue::Entity(category) => resolver.entity(ctx, category),
        Cue::Subject => resolver.question_subject(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use crate::nlu::GrammarResolver;

    fn cues() -> Cues {
        Cues::new(Arc::new(GrammarResolver::default()), 0.6)
    }

    fn turn(utterance: &str, confidence: f64) -> DialogueContext {
        DialogueContext {
            last_utterance: utterance.to_string(),
            confidence,
            ..DialogueContext::default()
        }
    }

    #[test]
    fn present_ignores_confidence() {
        let guard = cues().present(Cue::Entity("title"));

        assert!(guard.check(&turn("lunch", 0.1), &Event::Click));
        assert!(!guard.check(&turn("dinner", 0.9), &Event::Click));
    }

    #[test]
    fn gated_splits_on_threshold() {
        let [confident, tentative] =
            cues().gated(Cue::Entity("title"), Slot::Title, ".when", ".confirm_what");

        let confident = confident.condition().unwrap();
        let tentative = tentative.condition().unwrap();

        for (confidence, expect_confident) in [(0.59, false), (0.6, true), (0.61, true)] {
            let ctx = turn("lecture", confidence);
            let event = Event::recognised("lecture", confidence);

            assert_eq!(confident.check(&ctx, &event), expect_confident);
            assert_eq!(tentative.check(&ctx, &event), !expect_confident);
        }
    }

    #[test]
    fn subject_cue_reads_question() {
        let cues = cues();
        assert_eq!(
            cues.read(Cue::Subject, &turn("who is Ada Lovelace", 0.9)).as_deref(),
            Some("ada lovelace")
        );
        assert_eq!(cues.read(Cue::Entity("day"), &turn("Friday", 0.9)).as_deref(), Some("friday"));
    }
}
