use crate::error::{Result, SvExportError};
use crate::preprocess::cursor::LineCursor;
use regex::Regex;
use std::collections::HashSet;

/// The set of configuration options enabled for one export run.
///
/// Built once by [`ConfigExtractor::extract`] and read-only afterwards. The
/// insertion order is kept alongside the set for diagnostics and for the
/// generated-export notice file.
#[derive(Debug, Clone, Default)]
pub struct EnabledSet {
    names: HashSet<String>,
    ordered: Vec<String>,
}

impl EnabledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set directly from names; handy for tests and dry runs.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.into());
        }
        set
    }

    pub fn insert(&mut self, name: String) -> bool {
        if self.names.insert(name.clone()) {
            self.ordered.push(name);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Accepted option names in file order.
    pub fn names_in_order(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Suppression depth while scanning the configuration source. Counts the
/// enclosing disabled `ifdef`/`ifndef` blocks around the cursor; declarations
/// are only honored at depth zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SuppressState {
    depth: usize,
}

impl SuppressState {
    fn enter(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }

    // Unbalanced `endif`s clamp at zero rather than corrupting later content.
    fn leave(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
        }
    }

    fn active(self) -> bool {
        self.depth == 0
    }
}

/// Parses a configuration source and determines which options are enabled.
///
/// Recognizes the declaration triplet: a `// … CONFIG: <name>` comment, one
/// description line (discarded), and a definition line. The option is enabled
/// iff the definition line is exactly `` `define <name> ``. Declarations
/// inside a disabled `ifdef`/`ifndef` block are skipped; membership tests for
/// those directives use the set as built so far, so declarations are visible
/// to later directives in file order only.
///
/// Unlike [`DirectiveStripper`](crate::preprocess::DirectiveStripper), every
/// `ifdef`/`ifndef`/`endif` line moves the suppression depth here, not just
/// marker-introduced ones. The patterns also anchor at column zero; the
/// configuration file idiom does not indent directives.
pub struct ConfigExtractor {
    declaration: Regex,
    define: Regex,
    ifdef: Regex,
    ifndef: Regex,
    endif: Regex,
    source_label: String,
}

impl ConfigExtractor {
    pub fn new() -> Self {
        Self {
            declaration: Regex::new(r"^//.*CONFIG:\s(\w+)$").expect("valid declaration pattern"),
            define: Regex::new(r"^`define\s(\w+)$").expect("valid define pattern"),
            ifdef: Regex::new(r"^`ifdef\s(\w+)$").expect("valid ifdef pattern"),
            ifndef: Regex::new(r"^`ifndef\s(\w+)$").expect("valid ifndef pattern"),
            endif: Regex::new(r"^`endif.*$").expect("valid endif pattern"),
            source_label: "<config>".to_string(),
        }
    }

    /// Label used in diagnostics, typically the configuration file path.
    pub fn with_source_label<S: Into<String>>(mut self, label: S) -> Self {
        self.source_label = label.into();
        self
    }

    /// Scan the configuration lines and return the enabled-option set.
    ///
    /// A `CONFIG:` comment with fewer than two following lines is fatal for
    /// the whole extraction; no partial set is returned.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Result<EnabledSet> {
        let mut enabled = EnabledSet::new();
        let mut state = SuppressState::default();
        let mut cursor = LineCursor::new(lines);

        while let Some((line_no, line)) = cursor.advance() {
            if state.active() {
                // The name in the comment is informational; the option is
                // enabled only by the matching `define two lines down.
                if self.declaration.is_match(line) {
                    // Description line, discarded.
                    cursor
                        .advance()
                        .ok_or_else(|| self.truncated_at(line_no))?;
                    let (_, candidate) =
                        cursor.advance().ok_or_else(|| self.truncated_at(line_no))?;

                    if let Some(def) = self.define.captures(candidate) {
                        enabled.insert(def[1].to_string());
                    }
                    continue;
                }
            }

            if let Some(caps) = self.ifdef.captures(line) {
                if !enabled.contains(&caps[1]) {
                    state = state.enter();
                }
            }
            if let Some(caps) = self.ifndef.captures(line) {
                if enabled.contains(&caps[1]) {
                    state = state.enter();
                }
            }
            if self.endif.is_match(line) {
                state = state.leave();
            }
        }

        Ok(enabled)
    }

    fn truncated_at(&self, line: usize) -> SvExportError {
        SvExportError::MalformedDeclaration {
            file: self.source_label.clone(),
            line,
        }
    }
}

impl Default for ConfigExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(lines: &[&str]) -> EnabledSet {
        ConfigExtractor::new().extract(lines).unwrap()
    }

    #[test]
    fn test_enabled_declaration() {
        let set = extract(&["// X CONFIG: FOO", "// desc", "`define FOO"]);
        assert!(set.contains("FOO"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_disabled_declaration() {
        let set = extract(&["// X CONFIG: FOO", "// desc", "// not a define"]);
        assert!(!set.contains("FOO"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_commented_out_define_disables() {
        let set = extract(&["// CONFIG: RV32E", "// reduced register file", "//`define RV32E"]);
        assert!(!set.contains("RV32E"));
    }

    #[test]
    fn test_ordered_names_preserved() {
        let set = extract(&[
            "// CONFIG: AAA",
            "// desc",
            "`define AAA",
            "// CONFIG: BBB",
            "// desc",
            "`define BBB",
        ]);
        assert_eq!(set.names_in_order(), &["AAA", "BBB"]);
    }

    #[test]
    fn test_declaration_suppressed_inside_disabled_ifdef() {
        // DEP was never enabled, so the whole block is suppressed.
        let set = extract(&[
            "`ifdef DEP",
            "// CONFIG: HIDDEN",
            "// desc",
            "`define HIDDEN",
            "`endif",
        ]);
        assert!(!set.contains("HIDDEN"));
    }

    #[test]
    fn test_declaration_visible_inside_enabled_ifdef() {
        let set = extract(&[
            "// CONFIG: DEP",
            "// desc",
            "`define DEP",
            "`ifdef DEP",
            "// CONFIG: CHILD",
            "// desc",
            "`define CHILD",
            "`endif",
        ]);
        assert!(set.contains("DEP"));
        assert!(set.contains("CHILD"));
    }

    #[test]
    fn test_no_forward_references() {
        // The ifdef sees LATER before it is declared, so the block suppresses
        // even though LATER ends up enabled further down.
        let set = extract(&[
            "`ifdef LATER",
            "// CONFIG: INNER",
            "// desc",
            "`define INNER",
            "`endif",
            "// CONFIG: LATER",
            "// desc",
            "`define LATER",
        ]);
        assert!(!set.contains("INNER"));
        assert!(set.contains("LATER"));
    }

    #[test]
    fn test_ifndef_suppresses_when_enabled() {
        let set = extract(&[
            "// CONFIG: BASE",
            "// desc",
            "`define BASE",
            "`ifndef BASE",
            "// CONFIG: FALLBACK",
            "// desc",
            "`define FALLBACK",
            "`endif",
        ]);
        assert!(set.contains("BASE"));
        assert!(!set.contains("FALLBACK"));
    }

    #[test]
    fn test_nested_suppression() {
        let set = extract(&[
            "`ifdef A",
            "`ifdef B",
            "`endif",
            "// CONFIG: STILL_HIDDEN",
            "// desc",
            "`define STILL_HIDDEN",
            "`endif",
        ]);
        assert!(!set.contains("STILL_HIDDEN"));
    }

    #[test]
    fn test_extra_endif_clamps_to_zero() {
        let set = extract(&[
            "`endif",
            "`endif",
            "// CONFIG: FOO",
            "// desc",
            "`define FOO",
        ]);
        assert!(set.contains("FOO"));
    }

    #[test]
    fn test_truncated_declaration_is_fatal() {
        let extractor = ConfigExtractor::new().with_source_label("riscv_config.sv");
        let err = extractor
            .extract(&["// CONFIG: FOO", "// desc"])
            .unwrap_err();
        match err {
            SvExportError::MalformedDeclaration { file, line } => {
                assert_eq!(file, "riscv_config.sv");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_content_breaks_match() {
        // Exact-line contract: trailing tokens after the name break the match.
        let set = extract(&["// CONFIG: FOO extra", "// desc", "`define FOO"]);
        assert!(set.is_empty());

        let set = extract(&["// CONFIG: FOO", "// desc", "`define FOO // on"]);
        assert!(!set.contains("FOO"));
    }

    #[test]
    fn test_indented_directives_not_recognized() {
        // Config-file patterns anchor at column zero.
        let set = extract(&[
            "  `ifdef DEP",
            "// CONFIG: FOO",
            "// desc",
            "`define FOO",
        ]);
        assert!(set.contains("FOO"));
    }

    #[test]
    fn test_duplicate_declaration_kept_once() {
        let set = extract(&[
            "// CONFIG: FOO",
            "// desc",
            "`define FOO",
            "// CONFIG: FOO",
            "// desc",
            "`define FOO",
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.names_in_order(), &["FOO"]);
    }

    #[test]
    fn test_description_line_never_interpreted() {
        // The description is consumed unconditionally, even if it looks like
        // a directive.
        let set = extract(&["// CONFIG: FOO", "`ifdef BAR", "`define FOO"]);
        assert!(set.contains("FOO"));
    }
}
