use crate::{
    input::InputLine,
    session::{Action, Session},
    view::{self, ViewSnap},
};
use anyhow::Result;
use crossterm::{
    event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serpgrab_common::{ResultItem, ResultSet};
use serpgrab_web::{Collector, Download, SearchRequest};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    CollectDone(std::result::Result<ResultSet, String>),
    SaveDone(std::result::Result<PathBuf, String>),
    OpError(String),
}

/// Settings the shell needs beyond the collector itself.
#[derive(Debug, Clone)]
pub struct TuiSettings {
    pub pages: u32,
    pub output_dir: PathBuf,
}

pub struct Tui {
    collector: Collector,
    output_dir: PathBuf,
    tx: mpsc::Sender<TuiMsg>,
    cancel: CancellationToken,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,
    tick_rate: Duration,
    last_tick: Instant,
    restored: bool,

    // ui state
    input: InputLine,
    session: Session,
    scroll: usize, // from bottom
    dirty: bool,
    spin_idx: usize,
}

impl Tui {
    pub fn new(
        collector: Collector,
        settings: TuiSettings,
        tx: mpsc::Sender<TuiMsg>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        Ok(Self {
            collector,
            output_dir: settings.output_dir,
            tx,
            cancel,
            term,
            tick_rate: Duration::from_millis(80),
            last_tick: Instant::now(),
            restored: false,
            input: InputLine::default(),
            session: Session::new(settings.pages),
            scroll: 0,
            dirty: true,
            spin_idx: 0,
        })
    }

    /// Process messages until the user quits or every sender is gone.
    pub async fn run(mut self, rx: &mut mpsc::Receiver<TuiMsg>) -> Result<()> {
        let outcome = async {
            while let Some(msg) = rx.recv().await {
                if !self.handle(msg)? {
                    break;
                }
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;
        self.cancel.cancel();
        self.restore();
        outcome
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        disable_raw_mode().ok();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }

    fn spinner(&self) -> &'static str {
        if self.session.is_busy() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn step_spinner(&mut self) {
        if self.session.is_busy() {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    fn draw(&mut self) -> Result<()> {
        let snap = ViewSnap {
            input: self.input.text(),
            input_cursor: self.input.cursor(),
            lines: self.session.transcript().lines(),
            scroll: self.scroll,
            busy: self.session.is_busy(),
            spinner: self.spinner(),
            pages: self.session.pages(),
            held: self.session.results().len(),
        };
        view::draw(&mut self.term, &snap)
    }

    /// `Ok(false)` once the shell should exit.
    fn handle(&mut self, msg: TuiMsg) -> Result<bool> {
        match msg {
            TuiMsg::InputEvent(CtEvent::Key(k)) if k.kind != KeyEventKind::Release => {
                return Ok(self.handle_key(k));
            }
            TuiMsg::InputEvent(CtEvent::Resize(..)) => self.dirty = true,
            TuiMsg::InputEvent(_) => {}
            TuiMsg::CollectDone(outcome) => {
                self.scroll = 0;
                self.session.finish_collect(outcome);
                self.dirty = true;
            }
            TuiMsg::SaveDone(outcome) => {
                self.session.finish_save(outcome);
                self.dirty = true;
            }
            TuiMsg::OpError(e) => {
                tracing::warn!(error = %e, "tui.op_error");
                self.session.report(&e);
                self.dirty = true;
            }
            TuiMsg::Tick => {
                self.step_spinner();
                if self.dirty || self.last_tick.elapsed() >= self.tick_rate {
                    self.draw()?;
                    self.last_tick = Instant::now();
                    self.dirty = false;
                }
            }
        }
        Ok(true)
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.dirty = true;
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return false,
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Enter, _) => {
                let line = self.input.take();
                return self.submit(&line);
            }
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Esc, _) => self.input.clear(),
            (KeyCode::Char(ch), _) => self.input.insert(ch),
            _ => {}
        }
        true
    }

    fn submit(&mut self, line: &str) -> bool {
        self.scroll = 0;
        match self.session.submit(line) {
            None => true,
            Some(Action::Quit) => false,
            Some(Action::Collect(req)) => {
                self.spawn_collect(req);
                true
            }
            Some(Action::SaveArticle(item)) => {
                self.spawn_save_article(item);
                true
            }
            Some(Action::SaveSpreadsheet(results)) => {
                self.spawn_save_spreadsheet(results);
                true
            }
        }
    }

    fn spawn_collect(&self, req: SearchRequest) {
        let collector = self.collector.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                res = collector.run(&req) => res.map_err(|e| e.to_string()),
            };
            let _ = tx.send(TuiMsg::CollectDone(outcome)).await;
        });
    }

    fn spawn_save_article(&self, item: ResultItem) {
        let collector = self.collector.clone();
        let dir = self.output_dir.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let save = async {
                let text = collector.article_text(&item.link).await?;
                let path = Download::article(&item.title, &text).write_into(&dir)?;
                Ok::<_, anyhow::Error>(path)
            };
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                res = save => res.map_err(|e| format!("{e:#}")),
            };
            let _ = tx.send(TuiMsg::SaveDone(outcome)).await;
        });
    }

    fn spawn_save_spreadsheet(&self, results: ResultSet) {
        let dir = self.output_dir.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                Download::spreadsheet(&results).and_then(|d| d.write_into(&dir))
            })
            .await
            .map_err(|e| e.to_string())
            .and_then(|res| res.map_err(|e| e.to_string()));
            let _ = tx.send(TuiMsg::SaveDone(outcome)).await;
        });
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Run the full-screen shell until the user quits.
pub async fn run_tui(collector: Collector, settings: TuiSettings) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(256);
    let cancel = CancellationToken::new();
    let tui = Tui::new(collector, settings, tx.clone(), cancel.clone())?;
    crate::feeders::spawn_tui_feeders(tx, cancel);
    tui.run(&mut rx).await
}
