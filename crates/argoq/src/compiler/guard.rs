use super::CompileError;

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "create", "alter", "drop", "truncate", "grant", "revoke",
    "copy", "attach", "detach", "pragma", "vacuum", "merge", "call", "execute", "union", "into",
    "begin", "commit", "rollback",
];

const TAUTOLOGIES: &[&str] = &["1=1", "(1=1)", "true", "(true)"];

/// A caller-supplied spatial predicate that passed the read-only guardrail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationClause(String);

impl LocationClause {
    /// Returns `Ok(None)` for blank or tautological clauses, which constrain
    /// nothing.
    pub fn parse(raw: &str) -> Result<Option<Self>, CompileError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Ok(None);
        }

        let compact = candidate
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if TAUTOLOGIES.contains(&compact.as_str()) {
            return Ok(None);
        }

        if candidate.contains(';') {
            return Err(rejected("statement separators are not allowed"));
        }
        if candidate.contains("--") || candidate.contains("/*") || candidate.contains("*/") {
            return Err(rejected("SQL comments are not allowed"));
        }
        if candidate.matches('\'').count() % 2 != 0 {
            return Err(rejected("unbalanced single quotes"));
        }
        if !parentheses_balanced(candidate) {
            return Err(rejected("unbalanced parentheses"));
        }

        let normalized = candidate.to_ascii_lowercase();
        if let Some(keyword) = normalized
            .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
            .find(|token| FORBIDDEN_KEYWORDS.contains(token))
        {
            return Err(rejected(format!("keyword `{keyword}` is not allowed")));
        }

        Ok(Some(Self(candidate.to_string())))
    }

    #[must_use]
    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

fn parentheses_balanced(candidate: &str) -> bool {
    let mut depth = 0_i32;
    for ch in candidate.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn rejected(reason: impl Into<String>) -> CompileError {
    CompileError::InvalidLocationClause {
        reason: reason.into(),
    }
}
