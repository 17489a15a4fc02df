// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use lexis_app::{
    Corpus, CorpusStatus, Generation, LookupCommand, LookupEvent, LookupOutcome, LookupState,
    Phase,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const INPUT_PROMPT: &str = "> ";
const CURSOR_MARK: &str = "▸ ";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const INPUT_POLL: Duration = Duration::from_millis(80);

/// Completions reported by background work, each stamped with its flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    CorpusLoaded(Arc<Corpus>),
    CorpusFailed(String),
    SingleResolved {
        generation: Generation,
        outcome: LookupOutcome,
    },
    BatchWord {
        generation: Generation,
        word: String,
        outcome: LookupOutcome,
    },
    BatchFinished {
        generation: Generation,
    },
}

impl WorkerEvent {
    fn into_command(self) -> LookupCommand {
        match self {
            Self::CorpusLoaded(corpus) => LookupCommand::CorpusLoaded(corpus),
            Self::CorpusFailed(reason) => LookupCommand::CorpusFailed(reason),
            Self::SingleResolved {
                generation,
                outcome,
            } => LookupCommand::SingleResolved {
                generation,
                outcome,
            },
            Self::BatchWord {
                generation,
                word,
                outcome,
            } => LookupCommand::BatchWordResolved {
                generation,
                word,
                outcome,
            },
            Self::BatchFinished { generation } => LookupCommand::BatchFinished { generation },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Worker(WorkerEvent),
}

/// The seam between the view loop and the network.
///
/// `load_corpus` and `lookup` are the blocking primitives. The `spawn_*`
/// defaults run them inline and report through `tx`; real runtimes override
/// them to work off the UI thread.
pub trait LookupRuntime {
    fn load_corpus(&mut self) -> Result<Corpus>;
    fn lookup(&mut self, word: &str) -> LookupOutcome;

    fn spawn_corpus_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.load_corpus() {
            Ok(corpus) => WorkerEvent::CorpusLoaded(Arc::new(corpus)),
            Err(error) => WorkerEvent::CorpusFailed(format!("{error:#}")),
        };
        send_worker_event(&tx, event)
    }

    fn spawn_single_lookup(
        &mut self,
        generation: Generation,
        word: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = self.lookup(word);
        send_worker_event(
            &tx,
            WorkerEvent::SingleResolved {
                generation,
                outcome,
            },
        )
    }

    fn spawn_batch_lookup(
        &mut self,
        generation: Generation,
        words: &[String],
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        for word in words {
            let outcome = self.lookup(word);
            send_worker_event(
                &tx,
                WorkerEvent::BatchWord {
                    generation,
                    word: word.clone(),
                    outcome,
                },
            )?;
        }
        send_worker_event(&tx, WorkerEvent::BatchFinished { generation })
    }

    fn cancel_lookups(&mut self, _stale: Generation) -> Result<()> {
        Ok(())
    }
}

pub fn send_worker_event(tx: &Sender<InternalEvent>, event: WorkerEvent) -> Result<()> {
    tx.send(InternalEvent::Worker(event))
        .map_err(|_| anyhow::anyhow!("lookup event channel closed"))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    dropdown_cursor: Option<usize>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: LookupRuntime>(state: &mut LookupState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match read_input(state, runtime, &mut view_data, &internal_tx, || {
            next_key(INPUT_POLL)
        }) {
            Ok(true) => break,
            Ok(false) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    let _ = runtime.cancel_lookups(state.generation);
    let raw_mode = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    result.and(raw_mode).and(screen)
}

fn next_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if !event::poll(timeout).context("poll event")? {
        return Ok(None);
    }
    match event::read().context("read event")? {
        Event::Key(key) => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Feeds one terminal read into the key handler. `Ok(true)` means quit; a
/// read error is handed back so the caller can restore the terminal first.
fn read_input<R, F>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    next: F,
) -> Result<bool>
where
    R: LookupRuntime,
    F: FnOnce() -> Result<Option<KeyEvent>>,
{
    match next()? {
        Some(key) => Ok(handle_key_event(state, runtime, view_data, internal_tx, key)),
        None => Ok(false),
    }
}

fn process_internal_events<R: LookupRuntime>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(LookupCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Worker(event) => {
                dispatch_and_apply(state, runtime, view_data, tx, event.into_command());
            }
        }
    }
}

/// Runs one command through the state record and carries out whatever the
/// resulting events ask of the runtime.
fn dispatch_and_apply<R: LookupRuntime>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: LookupCommand,
) -> Vec<LookupEvent> {
    let mut queue = VecDeque::from([command]);
    let mut applied = Vec::new();

    while let Some(command) = queue.pop_front() {
        for event in state.dispatch(command) {
            match &event {
                LookupEvent::CorpusRequested => {
                    if let Err(error) = runtime.spawn_corpus_load(tx.clone()) {
                        queue.push_back(LookupCommand::CorpusFailed(format!("{error:#}")));
                    }
                }
                LookupEvent::SingleLookupRequested { generation, word } => {
                    if let Err(error) = runtime.spawn_single_lookup(*generation, word, tx.clone())
                    {
                        queue.push_back(LookupCommand::SingleResolved {
                            generation: *generation,
                            outcome: LookupOutcome::Failed(format!("{error:#}")),
                        });
                    }
                }
                LookupEvent::BatchLookupRequested { generation, words } => {
                    if let Err(error) = runtime.spawn_batch_lookup(*generation, words, tx.clone())
                    {
                        warn!(%error, "batch lookup did not start");
                        queue.push_back(LookupCommand::Cancel);
                        queue.push_back(LookupCommand::SetStatus(format!(
                            "lookup failed to start: {error}"
                        )));
                    }
                }
                LookupEvent::Cancelled(stale) => {
                    if let Err(error) = runtime.cancel_lookups(*stale) {
                        debug!(%error, generation = stale.get(), "cancel request failed");
                    }
                }
                LookupEvent::CandidatesChanged(_) => {
                    view_data.dropdown_cursor = None;
                }
                LookupEvent::StatusUpdated(_) => {
                    schedule_status_clear_for_next_token(view_data, tx);
                }
                _ => {}
            }
            applied.push(event);
        }
    }
    applied
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn schedule_status_clear_for_next_token(view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(tx, view_data.status_token);
}

fn emit_status<R: LookupRuntime>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_and_apply(
        state,
        runtime,
        view_data,
        internal_tx,
        LookupCommand::SetStatus(message.into()),
    );
}

fn handle_key_event<R: LookupRuntime>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        let events = dispatch_and_apply(
            state,
            runtime,
            view_data,
            internal_tx,
            LookupCommand::Cancel,
        );
        if events.is_empty() {
            emit_status(
                state,
                runtime,
                view_data,
                internal_tx,
                "cancel requested; no lookup in flight",
            );
        }
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            view_data.help_visible = false;
        }
        return false;
    }

    match key.code {
        KeyCode::F(1) => {
            view_data.help_visible = true;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            set_input(state, runtime, view_data, internal_tx, String::new());
        }
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            let mut input = state.input.clone();
            input.push(ch);
            set_input(state, runtime, view_data, internal_tx, input);
        }
        KeyCode::Backspace => {
            let mut input = state.input.clone();
            if input.pop().is_some() {
                set_input(state, runtime, view_data, internal_tx, input);
            }
        }
        KeyCode::Down => move_dropdown_cursor(state, view_data, 1),
        KeyCode::Up => move_dropdown_cursor(state, view_data, -1),
        KeyCode::Esc => {
            view_data.dropdown_cursor = None;
        }
        KeyCode::Tab => {
            let Some(word) = highlighted_candidate(state, view_data) else {
                emit_status(state, runtime, view_data, internal_tx, "no suggestion to select");
                return false;
            };
            dispatch_and_apply(
                state,
                runtime,
                view_data,
                internal_tx,
                LookupCommand::SelectWord(word),
            );
        }
        KeyCode::Enter => {
            dispatch_and_apply(
                state,
                runtime,
                view_data,
                internal_tx,
                LookupCommand::Commit,
            );
        }
        _ => {}
    }
    false
}

fn set_input<R: LookupRuntime>(
    state: &mut LookupState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    input: String,
) {
    dispatch_and_apply(
        state,
        runtime,
        view_data,
        internal_tx,
        LookupCommand::SetInput(input),
    );
}

fn move_dropdown_cursor(state: &LookupState, view_data: &mut ViewData, delta: isize) {
    let len = state.candidates.len();
    if len == 0 {
        view_data.dropdown_cursor = None;
        return;
    }

    let next = match view_data.dropdown_cursor {
        None if delta < 0 => len - 1,
        None => 0,
        Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
    };
    view_data.dropdown_cursor = Some(next);
}

fn highlighted_candidate(state: &LookupState, view_data: &ViewData) -> Option<String> {
    let index = view_data.dropdown_cursor.unwrap_or(0);
    state.candidates.get(index).cloned()
}

fn render(frame: &mut ratatui::Frame<'_>, state: &LookupState, view_data: &ViewData) {
    let show_dropdown = !state.candidates.is_empty();
    let show_errors = state.errors_visible() && !state.errors.is_empty();
    let dropdown_height = if show_dropdown {
        state.candidates.len() as u16 + 2
    } else {
        0
    };
    let errors_height = if show_errors {
        (state.errors.len() as u16).saturating_add(2).min(9)
    } else {
        0
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(dropdown_height),
            Constraint::Min(1),
            Constraint::Length(errors_height),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let input = Paragraph::new(render_input_text(state)).block(
        Block::default()
            .title("lexis: what word piques your interest?")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, layout[0]);
    let cursor_x = layout[0].x
        + 1
        + INPUT_PROMPT.chars().count() as u16
        + state.input.chars().count().min(u16::MAX as usize) as u16;
    frame.set_cursor_position((
        cursor_x.min(layout[0].right().saturating_sub(2)),
        layout[0].y + 1,
    ));

    if show_dropdown {
        let dropdown = Paragraph::new(render_dropdown_text(state, view_data))
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().title("suggestions").borders(Borders::ALL));
        frame.render_widget(dropdown, layout[1]);
    }

    let definitions = Paragraph::new(render_definitions_text(state))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("definitions").borders(Borders::ALL));
    frame.render_widget(definitions, layout[2]);

    if show_errors {
        let errors = Paragraph::new(render_errors_text(state))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("errors").borders(Borders::ALL));
        frame.render_widget(errors, layout[3]);
    }

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[4]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text()).block(
            Block::default()
                .title("help")
                .borders(Borders::ALL)
                .style(Style::default().add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(help, area);
    }
}

fn render_input_text(state: &LookupState) -> String {
    if state.input.is_empty() {
        return format!("{INPUT_PROMPT}type to search...");
    }
    format!("{INPUT_PROMPT}{}", state.input)
}

fn render_dropdown_text(state: &LookupState, view_data: &ViewData) -> String {
    state
        .candidates
        .iter()
        .enumerate()
        .map(|(index, word)| {
            if view_data.dropdown_cursor == Some(index) {
                format!("{CURSOR_MARK}{word}")
            } else {
                format!("  {word}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_definitions_text(state: &LookupState) -> String {
    let mut lines = Vec::new();
    if let Some(selected) = &state.selected {
        lines.push(format!("Selected word: {selected}"));
        lines.push(String::new());
    }

    for record in &state.definitions {
        lines.push(record.headline());
        for summary in record.summary_lines() {
            lines.push(format!("  • {summary}"));
        }
        lines.push(String::new());
    }

    match &state.phase {
        Phase::SingleLookup { word } => lines.push(format!("looking up {word}...")),
        Phase::BatchResolving { words, tally } => {
            let done = tally.confirmed.len() + tally.errors.len();
            lines.push(format!("resolving {done}/{} suggestions...", words.len()));
        }
        Phase::Idle => {}
    }

    if state.selection_missing_definition()
        && let Some(selected) = &state.selected
    {
        lines.push(format!("No definitions found for {selected}"));
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

fn render_errors_text(state: &LookupState) -> String {
    if !state.errors_visible() {
        return String::new();
    }
    state.errors.join("\n")
}

fn corpus_label(corpus: &CorpusStatus) -> String {
    match corpus {
        CorpusStatus::Missing => "words: idle".to_owned(),
        CorpusStatus::Loading => "words: loading".to_owned(),
        CorpusStatus::Ready(corpus) => format!("words: {}", corpus.len()),
        CorpusStatus::Failed => "words: offline".to_owned(),
    }
}

fn status_text(state: &LookupState) -> String {
    let phase = state.phase.label().to_ascii_uppercase();
    let default = format!(
        "type to search | up/down tab select | enter define all | ctrl+c cancel | F1 help | ctrl+q | {}",
        corpus_label(&state.corpus)
    );
    match &state.status_line {
        Some(status) => format!("{phase} | {status} | {default}"),
        None => format!("{phase} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ctrl+c cancel lookup | F1 help\n\
input: type to search | backspace delete | ctrl+u clear\n\
suggestions: up/down move | tab select highlighted (first if none) | esc unhighlight\n\
define: enter looks up every suggestion, one at a time\n\
errors: shown while the input is not empty"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
