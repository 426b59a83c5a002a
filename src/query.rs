use serde::{Deserialize, Serialize};
use std::fmt;

/// How a query row joins the terms before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    #[default]
    Initial,
    And,
    Or,
}

impl Operator {
    /// Parse an operator name. Unknown names fold into `And`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "initial" | "inital" => Operator::Initial,
            "or" => Operator::Or,
            _ => Operator::And,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Initial => "initial",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRow {
    #[serde(default)]
    pub op: Operator,
    #[serde(default)]
    pub text: String,
}

impl QueryRow {
    pub fn new(op: Operator, text: impl Into<String>) -> Self {
        QueryRow {
            op,
            text: text.into(),
        }
    }
}

/// Terms that must all be present for the group to match.
pub type QueryGroup = Vec<String>;

/// Fold query rows into OR-ed groups of AND-ed terms. Blank rows are skipped
/// and empty groups are dropped.
pub fn build_groups(rows: &[QueryRow], case_sensitive: bool) -> Vec<QueryGroup> {
    let mut groups: Vec<QueryGroup> = vec![Vec::new()];
    let mut first = true;

    for row in rows {
        let term = row.text.trim();
        if term.is_empty() {
            continue;
        }
        let term = if case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };

        let is_initial = first || row.op == Operator::Initial;
        first = false;

        if !is_initial && row.op == Operator::Or {
            groups.push(vec![term]);
        } else if let Some(last) = groups.last_mut() {
            last.push(term);
        }
    }

    groups.retain(|group| !group.is_empty());
    groups
}

/// Evaluate `rows` against a single line. AND binds tighter than OR, terms
/// match as substrings, and a query with no terms matches everything.
pub fn evaluate(line: &str, rows: &[QueryRow], case_sensitive: bool) -> bool {
    let groups = build_groups(rows, case_sensitive);
    if groups.is_empty() {
        return true;
    }

    let haystack = if case_sensitive {
        line.to_string()
    } else {
        line.to_lowercase()
    };

    groups
        .iter()
        .any(|group| group.iter().all(|term| haystack.contains(term.as_str())))
}

/// Build rows from an expression like "L1 or L2 and Automated".
///
/// The words `and` and `or` are operators; runs of other words form one term.
pub fn parse_expression(expr: &str) -> Vec<QueryRow> {
    let mut rows = Vec::new();
    let mut op = Operator::Initial;
    let mut words: Vec<&str> = Vec::new();

    for word in expr.split_whitespace() {
        let next = if word.eq_ignore_ascii_case("and") {
            Some(Operator::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Operator::Or)
        } else {
            None
        };

        match next {
            Some(next_op) => {
                if !words.is_empty() {
                    rows.push(QueryRow::new(op, words.join(" ")));
                    words.clear();
                }
                op = next_op;
            }
            None => words.push(word),
        }
    }

    if !words.is_empty() {
        rows.push(QueryRow::new(op, words.join(" ")));
    }

    rows
}

/// Render rows back into the "L1 or L2" form shown to users.
pub fn combined_preview(rows: &[QueryRow]) -> String {
    let mut parts = Vec::new();
    for row in rows {
        let text = row.text.trim();
        if text.is_empty() {
            continue;
        }
        let part = match row.op {
            _ if parts.is_empty() => text.to_string(),
            Operator::Initial => format!("and {}", text),
            op => format!("{} {}", op, text),
        };
        parts.push(part);
    }
    parts.join(" ")
}
