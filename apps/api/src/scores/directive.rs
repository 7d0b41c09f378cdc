//! Directive grammar — turns free-text lines such as
//! `Set Python's selection score from 60.0% to 70.0%` into typed directives.
//!
//! Each `DirectiveKind` owns one template: a trigger phrase, the verbs that may
//! introduce the target name, and whether the new value carries a `%` suffix.
//! Templates are tried in declaration order and the first trigger found in a
//! line decides its kind. Values are only read from the text after the
//! `<name>'s` slot, so digits inside a name never supply the value.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scores::models::ScoreField;

// ────────────────────────────────────────────────────────────────────────────
// Grammar
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    SelectionScore,
    RejectionScore,
    Rating,
    Importance,
}

struct Template {
    kind: DirectiveKind,
    trigger: &'static str,
    name: &'static Lazy<Regex>,
    value: &'static Lazy<Regex>,
}

static SET_OR_ADJUST_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Set|Adjust)\s+(.*?)'s").expect("valid name pattern"));
static UPDATE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Update\s+(.*?)'s").expect("valid name pattern"));
static CHANGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Change\s+(.*?)'s").expect("valid name pattern"));

static PERCENT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bto\s+(\d+(?:\.\d+)?)%").expect("valid value pattern"));
static PLAIN_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bto\s+(\d+(?:\.\d+)?)").expect("valid value pattern"));
static FROM_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfrom\s+(\d+(?:\.\d+)?)").expect("valid value pattern"));

static TEMPLATES: [Template; 4] = [
    Template {
        kind: DirectiveKind::SelectionScore,
        trigger: "selection score",
        name: &SET_OR_ADJUST_NAME,
        value: &PERCENT_VALUE,
    },
    Template {
        kind: DirectiveKind::RejectionScore,
        trigger: "rejection score",
        name: &SET_OR_ADJUST_NAME,
        value: &PERCENT_VALUE,
    },
    Template {
        kind: DirectiveKind::Rating,
        trigger: "rating",
        name: &UPDATE_NAME,
        value: &PLAIN_VALUE,
    },
    Template {
        kind: DirectiveKind::Importance,
        trigger: "importance",
        name: &CHANGE_NAME,
        value: &PERCENT_VALUE,
    },
];

impl DirectiveKind {
    /// The entry field this kind writes. Selection and rejection score
    /// directives adjust the item's importance weight.
    pub fn field(&self) -> ScoreField {
        match self {
            DirectiveKind::Rating => ScoreField::Rating,
            DirectiveKind::SelectionScore
            | DirectiveKind::RejectionScore
            | DirectiveKind::Importance => ScoreField::Importance,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            DirectiveKind::SelectionScore => "Set",
            DirectiveKind::RejectionScore => "Adjust",
            DirectiveKind::Rating => "Update",
            DirectiveKind::Importance => "Change",
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            DirectiveKind::SelectionScore => "selection score",
            DirectiveKind::RejectionScore => "rejection score",
            DirectiveKind::Rating => "rating",
            DirectiveKind::Importance => "importance",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            DirectiveKind::Rating => "",
            _ => "%",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Directives
// ────────────────────────────────────────────────────────────────────────────

/// A single instruction to set one numeric field of one named entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub target: String,
    pub value: f64,
    /// The "from" value quoted in the sentence, informational only.
    pub previous: Option<f64>,
    /// 1-based line number within the parsed block (0 when built directly).
    pub line: usize,
}

impl Directive {
    pub fn new(kind: DirectiveKind, target: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            target: target.into(),
            value,
            previous: None,
            line: 0,
        }
    }

    pub fn with_previous(mut self, previous: f64) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn field(&self) -> ScoreField {
        self.kind.field()
    }

}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.kind.unit();
        write!(f, "{} {}'s {}", self.kind.verb(), self.target, self.kind.phrase())?;
        if let Some(previous) = self.previous {
            write!(f, " from {previous:.1}{unit}")?;
        }
        write!(f, " to {:.1}{unit}", self.value)
    }
}

/// Whether an explicit value of exactly zero counts as a real value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroValuePolicy {
    /// Drop directives whose value is 0.
    #[default]
    Skip,
    /// Apply 0 like any other value.
    Apply,
}

impl ZeroValuePolicy {
    pub fn from_flag(zero_is_value: bool) -> Self {
        if zero_is_value {
            ZeroValuePolicy::Apply
        } else {
            ZeroValuePolicy::Skip
        }
    }
}

/// Why a line did not produce a directive, or why a directive was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unrecognized,
    MissingName,
    MissingValue,
    ZeroValue,
    RoleMissing,
    NotFound,
}

/// Outcome of scanning one non-blank line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineScan {
    Directive(Directive),
    Skipped {
        line: usize,
        text: String,
        reason: SkipReason,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveParser {
    pub zero_policy: ZeroValuePolicy,
}

impl DirectiveParser {
    pub fn new(zero_policy: ZeroValuePolicy) -> Self {
        Self { zero_policy }
    }

    /// Lazily yields the directives found in `text`, one candidate per line.
    /// Lines that do not form a complete directive are dropped.
    // The service goes through `scan` to report skips.
    #[allow(dead_code)]
    pub fn parse<'a>(&self, text: &'a str) -> impl Iterator<Item = Directive> + 'a {
        self.scan(text).filter_map(|scan| match scan {
            LineScan::Directive(d) => Some(d),
            LineScan::Skipped { .. } => None,
        })
    }

    /// Like [`parse`](Self::parse), but also reports every non-blank line that
    /// was dropped and why.
    pub fn scan<'a>(&self, text: &'a str) -> impl Iterator<Item = LineScan> + 'a {
        let policy = self.zero_policy;
        text.split('\n')
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(move |(idx, line)| scan_line(line, idx + 1, policy))
    }
}

/// Convenience wrapper using the default zero-value policy.
#[allow(dead_code)]
pub fn parse_directives(text: &str) -> impl Iterator<Item = Directive> + '_ {
    DirectiveParser::default().parse(text)
}

fn scan_line(line: &str, line_no: usize, policy: ZeroValuePolicy) -> LineScan {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let skipped = |reason| LineScan::Skipped {
        line: line_no,
        text: line.to_string(),
        reason,
    };

    let Some(template) = TEMPLATES.iter().find(|t| line.contains(t.trigger)) else {
        return skipped(SkipReason::Unrecognized);
    };

    let (target, rest) = match name_slot(template.name, line) {
        Some((name, rest)) if !name.is_empty() => (name, rest),
        _ => return skipped(SkipReason::MissingName),
    };

    let Some(value) = capture(template.value, rest).and_then(|v| v.parse::<f64>().ok()) else {
        return skipped(SkipReason::MissingValue);
    };

    if value == 0.0 && policy == ZeroValuePolicy::Skip {
        return skipped(SkipReason::ZeroValue);
    }

    let previous = capture(&FROM_VALUE, rest).and_then(|v| v.parse::<f64>().ok());

    LineScan::Directive(Directive {
        kind: template.kind,
        target: target.to_string(),
        value,
        previous,
        line: line_no,
    })
}

/// The captured name and the remainder of the line after `'s`.
fn name_slot<'a>(pattern: &Regex, line: &'a str) -> Option<(&'a str, &'a str)> {
    let caps = pattern.captures(line)?;
    let name = caps.get(1)?.as_str();
    let end = caps.get(0)?.end();
    Some((name, &line[end..]))
}

fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
