use crate::styles;
use ratatui::style::Style;
use serpgrab_common::ResultSet;

/// Results rendered inline after a collection; `/list` shows all of them.
pub const PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub text: String,
    pub style: Style,
}

impl TranscriptLine {
    pub fn new(text: String, style: Style) -> Self {
        Self { text, style }
    }
}

/// Append-only scrollback shown in the transcript pane.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn push_styled<S: Into<String>>(&mut self, s: S, style: Style) {
        self.lines.push(TranscriptLine::new(s.into(), style));
    }

    pub fn push_blank(&mut self) {
        self.push_styled(String::new(), Style::default());
    }

    pub fn push_error<S: AsRef<str>>(&mut self, msg: S) {
        self.push_styled(format!("× {}", msg.as_ref()), styles::error());
        self.push_blank();
    }

    /// `[i] title` plus the dimmed link for up to `limit` items, 1-based.
    pub fn push_results(&mut self, results: &ResultSet, limit: usize) {
        for (i, item) in results.iter().take(limit).enumerate() {
            self.push_styled(format!("  [{}] {}", i + 1, item.title), styles::result_title());
            self.push_styled(format!("      {}", item.link), styles::dim());
        }
        if results.len() > limit {
            self.push_styled(
                format!("  … {} more (use /list)", results.len() - limit),
                styles::dim(),
            );
        }
        self.push_blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpgrab_common::ResultItem;

    fn set_of(n: usize) -> ResultSet {
        (0..n)
            .map(|i| ResultItem::new(format!("t{i}"), format!("https://n/{i}")))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn results_are_numbered_from_one_with_links() {
        let mut t = Transcript::default();
        t.push_results(&set_of(2), PREVIEW_LIMIT);

        let texts: Vec<&str> = t.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["  [1] t0", "      https://n/0", "  [2] t1", "      https://n/1", ""]
        );
        assert_eq!(t.lines()[1].style, styles::dim());
    }

    #[test]
    fn long_result_sets_are_truncated_with_tail() {
        let mut t = Transcript::default();
        t.push_results(&set_of(23), PREVIEW_LIMIT);

        let lines = t.lines();
        assert_eq!(lines.len(), PREVIEW_LIMIT * 2 + 2);
        assert_eq!(lines[PREVIEW_LIMIT * 2].text, "  … 3 more (use /list)");
    }
}
