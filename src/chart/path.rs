//! Transition target paths.
//!
//! Three forms are accepted:
//! - `#root.meeting.when` or `#meeting.when`: absolute, from the chart root
//! - `.confirm_time`: a descendant of the state declaring the transition
//! - `meeting.when`: resolved from the declaring state's parent (siblings)

pub(crate) const ROOT_NAME: &str = "root";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TargetPath {
    Absolute(String),
    Descendant(String),
    Sibling(String),
}

impl TargetPath {
    /// Parse a raw target. Returns `None` for empty or malformed paths.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix('#') {
            if rest == ROOT_NAME {
                return Some(TargetPath::Absolute(String::new()));
            }
            let rest = rest.strip_prefix("root.").unwrap_or(rest);
            return well_formed(rest).then(|| TargetPath::Absolute(rest.to_string()));
        }
        if let Some(rest) = raw.strip_prefix('.') {
            return well_formed(rest).then(|| TargetPath::Descendant(rest.to_string()));
        }
        well_formed(raw).then(|| TargetPath::Sibling(raw.to_string()))
    }

    /// Full path of the target, given the declaring state's path and its
    /// parent's path (`None` when declared on the root).
    pub(crate) fn resolve(&self, declaring: &str, parent: Option<&str>) -> String {
        match self {
            TargetPath::Absolute(path) => path.clone(),
            TargetPath::Descendant(rest) => join(declaring, rest),
            TargetPath::Sibling(rest) => join(parent.unwrap_or(declaring), rest),
        }
    }
}

/// Normalize a user-supplied path for lookup: `#root.a.b`, `#a.b` and `a.b`
/// all name the same state.
pub(crate) fn canonical(raw: &str) -> &str {
    let raw = raw.trim();
    strip_root(raw.strip_prefix('#').unwrap_or(raw))
}

pub(crate) fn join(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else {
        format!("{base}.{rest}")
    }
}

/// Human-readable form used in errors and logs.
pub(crate) fn display(path: &str) -> String {
    if path.is_empty() {
        format!("#{ROOT_NAME}")
    } else {
        path.to_string()
    }
}

fn strip_root(path: &str) -> &str {
    if path == ROOT_NAME {
        ""
    } else {
        path.strip_prefix("root.").unwrap_or(path)
    }
}

fn well_formed(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(|segment| !segment.trim().is_empty())
}
