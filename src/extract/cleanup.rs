//! Removal of advertisement lines from extracted chapter text

/// Lines at the start of a chapter eligible for filtering
pub const HEAD_LINES: usize = 4;

/// Lines at the end of a chapter eligible for filtering
pub const TAIL_LINES: usize = 3;

/// Drops advertisement lines from the edges of a chapter
///
/// Only the first [`HEAD_LINES`] and last [`TAIL_LINES`] lines are checked
/// against `phrases`. Interior lines are always kept, even when they contain
/// a phrase, since narrative text may legitimately quote one.
pub fn strip_edge_noise<S: AsRef<str>>(text: &str, phrases: &[S]) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len();

    lines
        .iter()
        .enumerate()
        .filter(|(index, line)| {
            let at_edge = *index < HEAD_LINES || *index + TAIL_LINES >= total;
            !(at_edge && phrases.iter().any(|p| line.contains(p.as_ref())))
        })
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}
