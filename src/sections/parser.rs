use regex::Regex;
use std::sync::LazyLock;

use super::{Grouping, Section};
use crate::query::{evaluate, QueryRow};

static NUMBERED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("valid numbered entry regex"));
static PAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\d+$").expect("valid page suffix regex"));

/// Scan state carried from one TOC line to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState {
    /// Number of the entry whose end page is being looked for ("" before the first entry)
    pub active_section: String,
    /// Section being assembled; unnamed until a matching leaf is seen
    pub current: Section,
    pub looking_for_start: bool,
    pub looking_for_end: bool,
    /// Sealed sections, in TOC order
    pub sections: Vec<Section>,
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState {
            active_section: String::new(),
            current: Section::default(),
            looking_for_start: true,
            looking_for_end: false,
            sections: Vec::new(),
        }
    }
}

/// Parse the text of the table of contents pages into named sections.
///
/// A numbered line matching `rows` names the section currently being tracked
/// (its ancestor, not the leaf itself). Start and end pages come from the
/// trailing numbers of dotted leader lines. Sections whose end page never
/// shows up span two pages.
pub fn parse_toc(toc_text: &str, grouping: Grouping, rows: &[QueryRow]) -> Vec<Section> {
    let mut state = ScanState::default();
    for line in toc_text.lines() {
        state = scan_line(state, line, grouping, rows);
    }
    finish(state)
}

/// Advance the scan by one line.
pub fn scan_line(
    mut state: ScanState,
    line: &str,
    grouping: Grouping,
    rows: &[QueryRow],
) -> ScanState {
    let line = line.trim();

    if let Some(number) = section_number(line) {
        if state.active_section.is_empty() || nests_under(number, &state.active_section) {
            if evaluate(line, rows, false) {
                state.current.name = state.active_section.clone();
            } else if grouping == Grouping::Innermost || !number.contains('.') {
                state.active_section = number.to_string();
                state.looking_for_start = true;
            }
        } else {
            // A sibling or later entry: its page closes the current section.
            state.looking_for_end = true;
            state.active_section = number.to_string();
        }
    }

    let page_bearing = has_page_suffix(line);

    if state.looking_for_start && page_bearing {
        state.current.start = trailing_page(line, ". ");
        state.looking_for_start = false;
    }

    if state.looking_for_end && page_bearing {
        let end = trailing_page(line, ".. ");
        if !state.current.name.is_empty() {
            let mut sealed = state.current.clone();
            sealed.end = end.clone();
            state.sections.push(sealed);
        }
        state.current = Section::starting_at(end);
        state.looking_for_end = false;
    }

    if line.to_lowercase().contains("appendix:")
        && !state.current.start.is_empty()
        && !state.current.name.is_empty()
        && state.current.end.is_empty()
    {
        state.current.end = trailing_page(line, ".. ");
    }

    state
}

/// Flush the last open section, default missing end pages, and drop unnamed sections.
pub fn finish(state: ScanState) -> Vec<Section> {
    let ScanState {
        current,
        mut sections,
        ..
    } = state;

    if !sections.contains(&current) {
        sections.push(current);
    }

    for section in &mut sections {
        if section.end.is_empty() {
            if let Ok(start) = section.start.parse::<u32>() {
                section.end = start.saturating_add(2).to_string();
            }
        }
    }

    sections.retain(|section| !section.name.is_empty());
    sections
}

/// Leading number token of a TOC line, e.g. "4.1.3" for "4.1.3 Personalization ... 37".
fn section_number(line: &str) -> Option<&str> {
    if NUMBERED_ENTRY.is_match(line) {
        line.split(' ').next()
    } else {
        None
    }
}

/// Whether `number` is nested under `parent`.
///
/// This is a plain string prefix test, so "4.10" also counts as nested under
/// "4.1" and "10" under "1".
fn nests_under(number: &str, parent: &str) -> bool {
    number.starts_with(parent)
}

fn has_page_suffix(line: &str) -> bool {
    PAGE_SUFFIX.is_match(line)
}

/// Text after the last `separator`, without stray dots.
fn trailing_page(line: &str, separator: &str) -> String {
    line.rsplit(separator)
        .next()
        .unwrap_or(line)
        .trim()
        .replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Operator;

    fn l1() -> Vec<QueryRow> {
        vec![QueryRow::new(Operator::Initial, "L1")]
    }

    fn section(name: &str, start: &str, end: &str) -> Section {
        Section {
            name: name.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            content: String::new(),
        }
    }

    const CIS_TOC: &str = "\
1 Above Lock ................................ ................................ 34
1.1 (L1) Ensure 'Allow Cortana Above Lock' is set to 'Block' (Automated) ....... 35
2 Account Management ................................ ................................ 37
3 Accounts ................................ ................................ 37
4 Administrative Templates ................................ ............................ 37
4.1 Control Panel ................................ ................................ .. 37
4.1.3 Personalization ................................ ................................ 37
4.1.3.1 (L1) Ensure 'Prevent enabling lock screen camera' is set to 'Enabled' (Automated) ... 38
4.1.3.2 (L1) Ensure 'Prevent enabling lock screen slide show' is set to 'Enabled' (Automated) .. 40
4.1.4 Printers ................................ ................................ 42
4.2 Desktop ................................ ................................ 42
4.4 MS Security Guide ................................ ................................ 42
4.4.1 (L1) Ensure 'Apply UAC restrictions to local accounts' is set to 'Enabled' (Automated) ..... 43
5 Control Panel ................................ ................................ 45
Appendix: Summary Table ................................ ................................ 50
";

    #[test]
    fn test_leaf_names_tracked_ancestor() {
        let toc = "1 Above Lock ... 34\n1.1 (L1) Ensure X 35\n2 Account Management ... 37";
        let sections = parse_toc(toc, Grouping::Innermost, &l1());
        assert_eq!(sections, vec![section("1", "34", "37")]);
    }

    #[test]
    fn test_outermost_and_innermost_diverge() {
        let toc = "\
4 Administrative Templates ........ 37
4.1 Control Panel ........ 37
4.1.3 Personalization ........ 37
4.1.3.1 (L1) Ensure 'Prevent enabling lock screen camera' ... 38
";
        let outer = parse_toc(toc, Grouping::Outermost, &l1());
        let inner = parse_toc(toc, Grouping::Innermost, &l1());
        assert_eq!(outer, vec![section("4", "37", "39")]);
        assert_eq!(inner, vec![section("4.1.3", "37", "39")]);
    }

    #[test]
    fn test_full_toc_innermost() {
        let sections = parse_toc(CIS_TOC, Grouping::Innermost, &l1());
        assert_eq!(
            sections,
            vec![
                section("1", "34", "37"),
                section("4.1.3", "37", "42"),
                section("4.4", "42", "45"),
            ]
        );
    }

    #[test]
    fn test_full_toc_outermost() {
        let sections = parse_toc(CIS_TOC, Grouping::Outermost, &l1());
        assert_eq!(
            sections,
            vec![section("1", "34", "37"), section("4", "37", "45")]
        );
    }

    #[test]
    fn test_appendix_closes_open_section() {
        let toc = "\
1 Above Lock ........ 34
1.1 (L1) Ensure X ........ 35
Appendix: Summary Table ........ 40
";
        let sections = parse_toc(toc, Grouping::Innermost, &l1());
        assert_eq!(sections, vec![section("1", "34", "40")]);
    }

    #[test]
    fn test_missing_end_defaults_to_two_pages() {
        let toc = "1 Above Lock ........ 34\n1.1 (L1) Ensure X ........ 35\n";
        let sections = parse_toc(toc, Grouping::Outermost, &l1());
        assert_eq!(sections, vec![section("1", "34", "36")]);
    }

    #[test]
    fn test_no_matching_leaves_yields_nothing() {
        let rows = vec![QueryRow::new(Operator::Initial, "L2")];
        assert!(parse_toc(CIS_TOC, Grouping::Innermost, &rows).is_empty());
        assert!(parse_toc("", Grouping::Innermost, &rows).is_empty());
    }

    #[test]
    fn test_unstructured_lines_are_skipped() {
        let toc = "Table of Contents\n\nPage 3\n1 Above Lock ........ 34\n\
                   some footer text\n1.1 (L1) Ensure X 35\r\n2 Next ........ 37\n";
        let sections = parse_toc(toc, Grouping::Innermost, &l1());
        assert_eq!(sections, vec![section("1", "34", "37")]);
    }

    #[test]
    fn test_or_query_selects_either_level() {
        let rows = vec![
            QueryRow::new(Operator::Initial, "L1"),
            QueryRow::new(Operator::Or, "L2"),
        ];
        let toc = "\
1 First ........ 10
1.1 (L2) Something ........ 11
2 Second ........ 12
2.1 (BL) Something else ........ 13
3 Third ........ 15
";
        let sections = parse_toc(toc, Grouping::Innermost, &rows);
        assert_eq!(sections, vec![section("1", "10", "12")]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_toc(CIS_TOC, Grouping::Innermost, &l1());
        let second = parse_toc(CIS_TOC, Grouping::Innermost, &l1());
        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_line_captures_start() {
        let state = scan_line(
            ScanState::default(),
            "  1 Above Lock ... 34  ",
            Grouping::Innermost,
            &l1(),
        );
        assert_eq!(state.active_section, "1");
        assert_eq!(state.current.start, "34");
        assert!(!state.looking_for_start);
        assert!(!state.looking_for_end);
        assert!(state.sections.is_empty());
    }

    #[test]
    fn test_scan_line_sibling_arms_end_until_page_seen() {
        let mut state = ScanState::default();
        state.active_section = "1".to_string();
        state.current = section("1", "34", "");
        state.looking_for_start = false;

        let state = scan_line(state, "2 Account Management", Grouping::Innermost, &l1());
        assert!(state.looking_for_end);
        assert_eq!(state.active_section, "2");

        let state = scan_line(
            state,
            "continued title ...... 37",
            Grouping::Innermost,
            &l1(),
        );
        assert!(!state.looking_for_end);
        assert_eq!(state.sections, vec![section("1", "34", "37")]);
        assert_eq!(state.current, Section::starting_at("37"));
    }

    #[test]
    fn test_scan_line_outermost_ignores_dotted_boundaries() {
        let mut state = ScanState::default();
        state.active_section = "4".to_string();
        state.looking_for_start = false;

        let state = scan_line(
            state,
            "4.1 Control Panel ..... 37",
            Grouping::Outermost,
            &l1(),
        );
        assert_eq!(state.active_section, "4");
        assert!(!state.looking_for_start);
        assert!(state.current.start.is_empty());
    }

    #[test]
    fn test_finish_keeps_sealed_copy_once() {
        let mut state = ScanState::default();
        state.current = section("7", "20", "25");
        state.sections = vec![section("7", "20", "25")];
        assert_eq!(finish(state), vec![section("7", "20", "25")]);
    }

    #[test]
    fn test_finish_leaves_non_numeric_start_alone() {
        let mut state = ScanState::default();
        state.current = section("7", "xx", "");
        assert_eq!(finish(state), vec![section("7", "xx", "")]);
    }

    #[test]
    fn test_nesting_is_lexical_prefix() {
        assert!(nests_under("4.1.3", "4.1"));
        assert!(nests_under("4.10", "4.1"));
        assert!(!nests_under("4.2", "4.1"));
        assert!(!nests_under("2", "1"));
    }

    #[test]
    fn test_trailing_page() {
        assert_eq!(trailing_page("1 Above Lock ... 34", ". "), "34");
        assert_eq!(trailing_page("2 Account ................ 37", ".. "), "37");
        assert_eq!(trailing_page("4.1 Control Panel ..... .. 37.", ".. "), "37");
    }
}
