//! Prompt templates with `{field}` placeholders.

use super::context::DialogueContext;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// Spoken text, optionally interpolating context fields.
///
/// Placeholders are parsed once. Unknown or unset fields render as an empty
/// string; an unterminated `{` is kept as literal text.
///
/// # Example
///
/// ```rust
/// use parley::core::{DialogueContext, Template};
///
/// let template = Template::new("Meeting titled {title} on {day}");
/// let ctx = DialogueContext {
///     title: Some("lunch".to_string()),
///     day: Some("friday".to_string()),
///     ..DialogueContext::default()
/// };
///
/// assert_eq!(template.render(&ctx), "Meeting titled lunch on friday");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the template has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Text(_)))
    }

    /// Names of the fields this template reads.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    pub fn render(&self, ctx: &DialogueContext) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(name) => {
                    if let Some(value) = ctx.field(name) {
                        out.push_str(&value);
                    }
                }
            }
        }
        out
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Template::new(source)
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Template::new(source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

fn parse(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = after[..close].trim();
        if name.is_empty() || name.contains('{') {
            // Not a placeholder; keep the brace as text and move on.
            push_text(&mut segments, &rest[..open + 1]);
            rest = after;
            continue;
        }
        push_text(&mut segments, &rest[..open]);
        segments.push(Segment::Field(name.to_string()));
        rest = &after[close + 1..];
    }
    push_text(&mut segments, rest);
    segments
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}
