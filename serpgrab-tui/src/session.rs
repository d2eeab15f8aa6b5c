use crate::command::{Command, parse_command};
use crate::styles;
use crate::transcript::{PREVIEW_LIMIT, Transcript};
use serpgrab_common::{ResultItem, ResultSet};
use serpgrab_web::SearchRequest;
use serpgrab_web::request::{outcome_message, validate_pages};
use std::path::PathBuf;

const BUSY_MESSAGE: &str = "Still working on the previous action; wait for it to finish.";
const NOTHING_HELD: &str = "No results yet. Search first.";

/// Work the shell must start on the session's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Collect(SearchRequest),
    SaveArticle(ResultItem),
    SaveSpreadsheet(ResultSet),
    Quit,
}

/// Per-user state: the held results, the page count, and what has been said.
///
/// At most one action runs at a time; commands that would start another are
/// rejected until the running one reports back.
#[derive(Debug)]
pub struct Session {
    pages: u32,
    results: ResultSet,
    busy: bool,
    transcript: Transcript,
}

impl Session {
    pub fn new(pages: u32) -> Self {
        let mut transcript = Transcript::default();
        transcript.push_styled(
            "Type a query to collect result titles. `/help` lists commands.",
            styles::system(),
        );
        Self {
            pages,
            results: ResultSet::default(),
            busy: false,
            transcript,
        }
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn submit(&mut self, line: &str) -> Option<Action> {
        if line.trim().is_empty() {
            return None;
        }
        match parse_command(line) {
            Command::Search(query) => {
                self.guard_idle()?;
                match SearchRequest::new(&query, self.pages) {
                    Ok(req) => {
                        self.transcript.push_styled("→ [Search]", styles::user_header());
                        self.transcript.push_styled(
                            format!("  {} ({} page(s))", req.query(), req.pages()),
                            styles::user_text(),
                        );
                        self.busy = true;
                        Some(Action::Collect(req))
                    }
                    Err(e) => {
                        self.transcript.push_error(e.to_string());
                        None
                    }
                }
            }
            Command::Pages(None) => {
                self.transcript
                    .push_styled(format!("Pages per search: {}", self.pages), styles::label());
                self.transcript.push_blank();
                None
            }
            Command::Pages(Some(n)) => {
                match validate_pages(n) {
                    Ok(n) => {
                        self.pages = n;
                        self.transcript
                            .push_styled(format!("✓ Pages per search set to {n}."), styles::system());
                        self.transcript.push_blank();
                    }
                    Err(e) => self.transcript.push_error(e.to_string()),
                }
                None
            }
            Command::List => {
                if self.results.is_empty() {
                    self.transcript.push_styled(NOTHING_HELD, styles::dim());
                    self.transcript.push_blank();
                } else {
                    self.transcript.push_styled(
                        format!("{} held result(s):", self.results.len()),
                        styles::label(),
                    );
                    self.transcript.push_results(&self.results, usize::MAX);
                }
                None
            }
            Command::Save(n) => {
                self.guard_idle()?;
                let Some(item) = self.results.get(n - 1).cloned() else {
                    if self.results.is_empty() {
                        self.transcript.push_error(NOTHING_HELD);
                    } else {
                        self.transcript.push_error(format!(
                            "No result [{n}]; choose 1..={}.",
                            self.results.len()
                        ));
                    }
                    return None;
                };
                self.transcript
                    .push_styled(format!("Fetching article [{n}] {}", item.title), styles::system());
                self.busy = true;
                Some(Action::SaveArticle(item))
            }
            Command::Xlsx => {
                self.guard_idle()?;
                if self.results.is_empty() {
                    self.transcript.push_error(NOTHING_HELD);
                    return None;
                }
                self.busy = true;
                Some(Action::SaveSpreadsheet(self.results.clone()))
            }
            Command::Help => {
                self.push_help();
                None
            }
            Command::Quit => Some(Action::Quit),
            Command::BadArgument(msg) => {
                self.transcript.push_error(msg);
                None
            }
            Command::Unknown(s) => {
                self.transcript.push_error(format!("Unknown command: {s}"));
                self.transcript.push_styled("Try `/help`.", styles::dim());
                None
            }
        }
    }

    /// A collection finished. Held results are replaced only on success.
    pub fn finish_collect(&mut self, outcome: Result<ResultSet, String>) {
        self.busy = false;
        match outcome {
            Ok(results) => {
                self.transcript
                    .push_styled(format!("← {}", outcome_message(&results)), styles::outcome());
                self.transcript.push_results(&results, PREVIEW_LIMIT);
                self.results = results;
            }
            Err(e) => self.transcript.push_error(format!("Search failed: {e}")),
        }
    }

    pub fn finish_save(&mut self, outcome: Result<PathBuf, String>) {
        self.busy = false;
        match outcome {
            Ok(path) => {
                self.transcript
                    .push_styled(format!("✓ Saved {}", path.display()), styles::system());
                self.transcript.push_blank();
            }
            Err(e) => self.transcript.push_error(format!("Save failed: {e}")),
        }
    }

    /// Unexpected failure outside a tracked action.
    pub fn report(&mut self, msg: &str) {
        self.transcript.push_error(msg);
    }

    fn guard_idle(&mut self) -> Option<()> {
        if self.busy {
            self.transcript.push_error(BUSY_MESSAGE);
            None
        } else {
            Some(())
        }
    }

    fn push_help(&mut self) {
        let t = &mut self.transcript;
        t.push_styled("Commands:", styles::label());
        for row in [
            "  <text>          search for <text>",
            "  /search <text>  same as above",
            "  /pages [n]      show or set pages per search (1-100)",
            "  /list           list every held result",
            "  /save <n>       save article n as a .txt file",
            "  /xlsx           save all held results as results.xlsx",
            "  /quit           exit (also Ctrl-C, Ctrl-Q)",
        ] {
            t.push_styled(row, styles::value());
        }
        t.push_blank();
    }
}
