use crate::error::{Result, SvExportError};
use crate::preprocess::config_extract::EnabledSet;
use crate::preprocess::cursor::LineCursor;
use regex::Regex;

/// Per-file stripping state: depth of enclosing suppressed regions plus
/// whether the current outermost region's primary branch was suppressed, in
/// which case a following `else` re-activates emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RegionState {
    depth: usize,
    else_takes_effect: bool,
}

impl RegionState {
    /// A tagged region opens; `condition_met` is the `ifdef`/`ifndef` test
    /// result against the enabled set.
    ///
    /// Inside an already-suppressed region the depth grows regardless of the
    /// inner condition, so the matching `endif` balances and content stays
    /// suppressed until the outer region closes.
    fn open(self, condition_met: bool) -> Self {
        if condition_met {
            if self.depth == 0 {
                Self {
                    depth: 0,
                    else_takes_effect: false,
                }
            } else {
                Self {
                    depth: self.depth + 1,
                    ..self
                }
            }
        } else if self.depth == 0 {
            Self {
                depth: 1,
                else_takes_effect: true,
            }
        } else {
            Self {
                depth: self.depth + 1,
                ..self
            }
        }
    }

    /// An `else` line flips which branch is active, but only at the region
    /// boundary: depth 1 with a suppressed primary branch drops back to 0,
    /// depth 0 with an active primary branch starts suppressing.
    fn branch_else(self) -> Self {
        let mut next = self;
        if next.depth == 1 && next.else_takes_effect {
            next.depth = 0;
        }
        if !next.else_takes_effect && next.depth == 0 {
            next.depth = 1;
        }
        next
    }

    fn close(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
            ..self
        }
    }

    fn active(self) -> bool {
        self.depth == 0
    }
}

/// Removes tagged conditional-compilation regions from one source file.
///
/// Only blocks introduced by a `// … CONFIG_REGION: <name>` marker comment
/// are interpreted: the marker and its paired `` `ifdef ``/`` `ifndef `` are
/// control lines, as is every `` `else `` and `` `endif `` line. Bare
/// `ifdef`/`ifndef` directives without a marker pass through as ordinary
/// content and move no state; mixing them with tagged regions in the same
/// nesting structure is unsupported.
///
/// This is a pure text-to-text transform; writing the result back to the file
/// is the caller's concern. Calls over distinct files are independent, the
/// enabled set is never mutated.
pub struct DirectiveStripper {
    marker: Regex,
    ifdef: Regex,
    ifndef: Regex,
    else_line: Regex,
    endif: Regex,
    source_label: String,
}

impl DirectiveStripper {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"^\s*//.*CONFIG_REGION:\s(\w+)$").expect("valid marker pattern"),
            ifdef: Regex::new(r"^\s*`ifdef\s(\w+)$").expect("valid ifdef pattern"),
            ifndef: Regex::new(r"^\s*`ifndef\s(\w+)$").expect("valid ifndef pattern"),
            else_line: Regex::new(r"^\s*`else.*$").expect("valid else pattern"),
            endif: Regex::new(r"^\s*`endif.*$").expect("valid endif pattern"),
            source_label: "<source>".to_string(),
        }
    }

    /// Label used in diagnostics, typically the source file path.
    pub fn with_source_label<S: Into<String>>(mut self, label: S) -> Self {
        self.source_label = label.into();
        self
    }

    /// Single forward pass over the file, returning the surviving lines in
    /// their original relative order.
    pub fn strip<S: AsRef<str>>(&self, lines: &[S], enabled: &EnabledSet) -> Result<Vec<String>> {
        let mut kept = Vec::with_capacity(lines.len());
        let mut state = RegionState::default();
        let mut cursor = LineCursor::new(lines);

        while let Some((line_no, line)) = cursor.advance() {
            if self.marker.is_match(line) {
                let (_, directive) = cursor
                    .advance()
                    .ok_or_else(|| self.malformed_at(line_no))?;

                if let Some(caps) = self.ifdef.captures(directive) {
                    state = state.open(enabled.contains(&caps[1]));
                } else if let Some(caps) = self.ifndef.captures(directive) {
                    state = state.open(!enabled.contains(&caps[1]));
                } else {
                    // Undefined nesting would follow; fail fast.
                    return Err(self.malformed_at(line_no));
                }
                continue;
            }

            if self.else_line.is_match(line) {
                state = state.branch_else();
                continue;
            }

            if self.endif.is_match(line) {
                state = state.close();
                continue;
            }

            if state.active() {
                kept.push(line.to_string());
            }
        }

        Ok(kept)
    }

    fn malformed_at(&self, line: usize) -> SvExportError {
        SvExportError::MalformedRegion {
            file: self.source_label.clone(),
            line,
        }
    }
}

impl Default for DirectiveStripper {
    fn default() -> Self {
        Self::new()
    }
}
