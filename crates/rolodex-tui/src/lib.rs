// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use rolodex_app::{
    AppCommand, AppEvent, AppMode, AppState, Column, Record, RecordField, RecordId, RecordTable,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;
use tracing::{debug, warn};

const HALF_PAGE_ROWS: isize = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const INPUT_CURSOR: &str = "▏";

pub trait AppRuntime {
    fn fetch_records(&mut self) -> Result<Vec<Record>>;

    /// Delivers the fetch outcome on `tx`. Runs inline unless overridden.
    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self
            .fetch_records()
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::RecordsFetched(outcome))
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    RecordsFetched(std::result::Result<Vec<Record>, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    selected_row: usize,
    field_cursor: usize,
    help_visible: bool,
    fetch_pending: bool,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextEdit {
    Insert(char),
    Backspace,
    Clear,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    start_fetch(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    debug!("quit requested");
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.fetch_pending = true;
    if let Err(error) = runtime.spawn_fetch(internal_tx.clone()) {
        warn!(error = %format!("{error:#}"), "could not start user fetch");
        view_data.fetch_pending = false;
        dispatch(
            state,
            view_data,
            internal_tx,
            AppCommand::LoadFailed(format!("{error:#}")),
        );
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::RecordsFetched(outcome) => {
                view_data.fetch_pending = false;
                let command = match outcome {
                    Ok(records) => AppCommand::LoadRecords(records),
                    Err(message) => AppCommand::LoadFailed(message),
                };
                dispatch(state, view_data, tx, command);
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn dispatch(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    clamp_cursor(&state.table, view_data);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    events
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, view_data, internal_tx, key),
        AppMode::Filter => handle_filter_key(state, view_data, internal_tx, key),
        AppMode::Edit(id, field) => handle_edit_key(state, view_data, internal_tx, id, field, key),
        AppMode::Form(field) => handle_form_key(state, view_data, internal_tx, field, key),
    }
    false
}

fn handle_nav_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row(&state.table, view_data, HALF_PAGE_ROWS);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row(&state.table, view_data, -HALF_PAGE_ROWS);
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row(&state.table, view_data, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row(&state.table, view_data, -1),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => view_data.selected_row = 0,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            view_data.selected_row = state.table.filtered().len().saturating_sub(1);
        }
        (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => {
            if let Some(id) = selected_record_id(&state.table, view_data) {
                dispatch(
                    state,
                    view_data,
                    internal_tx,
                    AppCommand::ToggleSelection(id),
                );
            }
        }
        (KeyCode::Char('A'), _) => {
            dispatch(state, view_data, internal_tx, AppCommand::ToggleSelectAll);
        }
        (KeyCode::Char('X'), _) => {
            dispatch(state, view_data, internal_tx, AppCommand::ClearSelection);
        }
        (KeyCode::Char('/'), _) => {
            dispatch(state, view_data, internal_tx, AppCommand::EnterFilter);
        }
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_field(view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_field(view_data, 1),
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            match selected_record_id(&state.table, view_data) {
                Some(id) => {
                    let events =
                        dispatch(state, view_data, internal_tx, AppCommand::BeginEdit(id));
                    if events
                        .iter()
                        .any(|event| matches!(event, AppEvent::EditStarted(_)))
                    {
                        dispatch(
                            state,
                            view_data,
                            internal_tx,
                            AppCommand::FocusEditField(cursor_field(view_data)),
                        );
                    }
                }
                None => emit_status(state, view_data, internal_tx, "no row to edit"),
            }
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let target = selected_record_id(&state.table, view_data)
                .filter(|id| state.table.record(*id).is_some_and(|record| record.editable));
            match target {
                Some(id) => {
                    dispatch(state, view_data, internal_tx, AppCommand::CommitEdit(id));
                }
                None => emit_status(state, view_data, internal_tx, "row is not being edited"),
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            match selected_record_id(&state.table, view_data) {
                Some(id) => {
                    dispatch(state, view_data, internal_tx, AppCommand::Delete(id));
                }
                None => emit_status(state, view_data, internal_tx, "no row to delete"),
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            dispatch(state, view_data, internal_tx, AppCommand::OpenForm);
        }
        (KeyCode::Char(digit), _) if column_for_digit(digit).is_some() => {
            if let Some(column) = column_for_digit(digit) {
                dispatch(
                    state,
                    view_data,
                    internal_tx,
                    AppCommand::ToggleColumn(column),
                );
            }
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        (KeyCode::Esc, _) => {
            if state.table.filter_text().is_empty() {
                dispatch(state, view_data, internal_tx, AppCommand::ClearStatus);
            } else {
                dispatch(
                    state,
                    view_data,
                    internal_tx,
                    AppCommand::SetFilterText(String::new()),
                );
                emit_status(state, view_data, internal_tx, "filter cleared");
            }
        }
        _ => {}
    }
    false
}

fn handle_filter_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
        dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
        return;
    }
    let Some(edit) = text_edit_for_key(key) else {
        return;
    };
    let next = apply_text_edit(state.table.filter_text(), edit);
    view_data.selected_row = 0;
    dispatch(
        state,
        view_data,
        internal_tx,
        AppCommand::SetFilterText(next),
    );
}

fn handle_edit_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: RecordId,
    field: RecordField,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.field_cursor = field_index(field);
            dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{id} still editable; s saves"),
            );
        }
        (KeyCode::Enter, _) => {
            dispatch(state, view_data, internal_tx, AppCommand::CommitEdit(id));
        }
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            dispatch(state, view_data, internal_tx, AppCommand::CommitEdit(id));
        }
        (KeyCode::Tab, _) => {
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::FocusEditField(field.rotate(1)),
            );
        }
        (KeyCode::BackTab, _) => {
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::FocusEditField(field.rotate(-1)),
            );
        }
        _ => {
            let Some(edit) = text_edit_for_key(key) else {
                return;
            };
            let Some(record) = state.table.record(id) else {
                dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
                return;
            };
            let value = apply_text_edit(field.get(record), edit);
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::ChangeField { id, field, value },
            );
        }
    }
}

fn handle_form_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: RecordField,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "add canceled");
        }
        (KeyCode::Enter, _) => submit_form(state, view_data, internal_tx),
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(state, view_data, internal_tx);
        }
        (KeyCode::Tab, _) | (KeyCode::Down, _) => {
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::FocusFormField(field.rotate(1)),
            );
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::FocusFormField(field.rotate(-1)),
            );
        }
        _ => {
            let Some(edit) = text_edit_for_key(key) else {
                return;
            };
            let value = apply_text_edit(state.table.form().get(field), edit);
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::SetFormField(field, value),
            );
        }
    }
}

fn submit_form(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = dispatch(state, view_data, internal_tx, AppCommand::SubmitForm);
    let added = events.iter().find_map(|event| match event {
        AppEvent::RecordAdded(id) => Some(*id),
        _ => None,
    });
    if let Some(id) = added {
        select_row_by_id(&state.table, view_data, id);
    }
}

fn text_edit_for_key(key: KeyEvent) -> Option<TextEdit> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TextEdit::Clear)
        }
        (KeyCode::Backspace, _) => Some(TextEdit::Backspace),
        (KeyCode::Char(value), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(TextEdit::Insert(value))
        }
        _ => None,
    }
}

fn apply_text_edit(current: &str, edit: TextEdit) -> String {
    let mut next = current.to_owned();
    match edit {
        TextEdit::Insert(value) => next.push(value),
        TextEdit::Backspace => {
            next.pop();
        }
        TextEdit::Clear => next.clear(),
    }
    next
}

fn cursor_field(view_data: &ViewData) -> RecordField {
    RecordField::ALL[view_data.field_cursor % RecordField::ALL.len()]
}

fn field_index(field: RecordField) -> usize {
    RecordField::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0)
}

fn move_field(view_data: &mut ViewData, delta: isize) {
    view_data.field_cursor = field_index(cursor_field(view_data).rotate(delta));
}

fn column_for_digit(digit: char) -> Option<Column> {
    let index = digit.to_digit(10)?.checked_sub(1)?;
    Column::ALL.get(index as usize).copied()
}

fn selected_record_id(table: &RecordTable, view_data: &ViewData) -> Option<RecordId> {
    table
        .filtered()
        .get(view_data.selected_row)
        .map(|record| record.id)
}

fn move_row(table: &RecordTable, view_data: &mut ViewData, delta: isize) {
    let count = table.filtered().len();
    if count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, count as isize - 1);
    view_data.selected_row = next as usize;
}

fn clamp_cursor(table: &RecordTable, view_data: &mut ViewData) {
    let count = table.filtered().len();
    view_data.selected_row = view_data.selected_row.min(count.saturating_sub(1));
}

fn select_row_by_id(table: &RecordTable, view_data: &mut ViewData, id: RecordId) {
    if let Some(index) = table.filtered().iter().position(|record| record.id == id) {
        view_data.selected_row = index;
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let filter_style = if state.mode == AppMode::Filter {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let filter = Paragraph::new(filter_bar_text(state))
        .style(filter_style)
        .block(Block::default().title("filter").borders(Borders::ALL));
    frame.render_widget(filter, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let columns = Paragraph::new(column_toggle_text(&state.table))
        .block(Block::default().title("columns").borders(Borders::ALL));
    frame.render_widget(columns, layout[2]);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let AppMode::Form(field) = state.mode {
        let area = centered_rect(60, 45, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(render_form_overlay_text(&state.table, field))
            .block(Block::default().title("add new user").borders(Borders::ALL));
        frame.render_widget(form, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let columns = state.table.visible_columns();
    let records = state.table.filtered();

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(columns.iter().map(|column| column_width(*column)));

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let mut header_cells = vec![Cell::from(header_checkbox(&state.table)).style(header_style)];
    header_cells.extend(
        columns
            .iter()
            .map(|column| Cell::from(column.as_str()).style(header_style)),
    );
    let header = Row::new(header_cells);

    let rows = records
        .iter()
        .enumerate()
        .map(|(row_index, record)| {
            let cursor = row_index == view_data.selected_row;
            let selected = state.table.is_selected(record.id);

            let mut row_style = Style::default();
            if record.editable {
                row_style = row_style.fg(Color::Yellow);
            }
            if selected {
                row_style = row_style.add_modifier(Modifier::BOLD);
            }
            if cursor {
                row_style = row_style.bg(Color::DarkGray);
            }

            let mut cells = vec![Cell::from(checkbox(selected)).style(row_style)];
            cells.extend(columns.iter().map(|column| {
                let style = if is_focused_cell(state.mode, record.id, *column) {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else if cursor
                    && state.mode == AppMode::Nav
                    && column.field() == Some(cursor_field(view_data))
                {
                    row_style.add_modifier(Modifier::UNDERLINED)
                } else {
                    row_style
                };
                Cell::from(cell_display(record, *column)).style(style)
            }));
            Row::new(cells)
        })
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state, view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn column_width(column: Column) -> Constraint {
    match column {
        Column::Id => Constraint::Length(4),
        Column::Actions => Constraint::Length(14),
        _ => Constraint::Min(8),
    }
}

fn is_focused_cell(mode: AppMode, id: RecordId, column: Column) -> bool {
    matches!(mode, AppMode::Edit(target, field) if target == id && field.column() == column)
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn header_checkbox(table: &RecordTable) -> &'static str {
    if table.all_selected() {
        "[x]"
    } else if table.selection().is_empty() {
        "[ ]"
    } else {
        "[-]"
    }
}

fn cell_display(record: &Record, column: Column) -> String {
    match column {
        Column::Actions => {
            if record.editable {
                "s save".to_owned()
            } else {
                "e edit  d del".to_owned()
            }
        }
        column => {
            let text = column.cell_text(record).unwrap_or_default();
            if record.editable && column.field().is_some() {
                format!("[{text}]")
            } else {
                text
            }
        }
    }
}

fn table_title(state: &AppState, view_data: &ViewData) -> String {
    let total = state.table.len();
    let shown = state.table.filtered().len();
    let mut title = format!("users {shown}/{total}");

    let selected = state.table.selection().len();
    if selected > 0 {
        title.push_str(&format!(" · {selected} selected"));
    }

    if view_data.fetch_pending {
        title.push_str(" · loading");
    } else if let Some(loaded) = state
        .last_loaded
        .and_then(|at| at.format(format_description!("[hour]:[minute]:[second]")).ok())
    {
        title.push_str(&format!(" · loaded {loaded} UTC"));
    }
    title
}

fn filter_bar_text(state: &AppState) -> String {
    let text = state.table.filter_text();
    if state.mode == AppMode::Filter {
        format!("{text}{INPUT_CURSOR}")
    } else if text.is_empty() {
        "press / to filter".to_owned()
    } else {
        text.to_owned()
    }
}

fn column_toggle_text(table: &RecordTable) -> String {
    Column::ALL
        .iter()
        .enumerate()
        .map(|(index, column)| {
            format!(
                "{} {} {}",
                index + 1,
                checkbox(table.columns().is_visible(*column)),
                column.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_form_overlay_text(table: &RecordTable, focused: RecordField) -> String {
    let mut lines = RecordField::ALL
        .iter()
        .map(|field| {
            let (marker, cursor) = if *field == focused {
                (">", INPUT_CURSOR)
            } else {
                (" ", "")
            };
            format!(
                "{marker} {:<13} {}{cursor}",
                field.form_label(),
                table.form().get(*field)
            )
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("tab/shift+tab field | enter add user | esc cancel".to_owned());
    lines.join("\n")
}

fn status_text(state: &AppState) -> String {
    let (mode, hint) = match state.mode {
        AppMode::Nav => (
            "NAV",
            "j/k move | h/l field | space select | A all | X none | / filter | e edit | s save | d del | a add | 1-8 cols | ? help | q quit".to_owned(),
        ),
        AppMode::Filter => ("FILTER", "type to filter | ctrl+u clear | enter/esc done".to_owned()),
        AppMode::Edit(id, field) => (
            "EDIT",
            format!(
                "{id} {} | tab/shift+tab field | enter save | esc pause",
                field.label()
            ),
        ),
        AppMode::Form(field) => (
            "ADD",
            format!(
                "{} | tab field | enter add | esc cancel",
                field.form_label()
            ),
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hint}"),
        None => format!("{mode} | {hint}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: j/k or up/down move | h/l field | ctrl+d/ctrl+u half page | g/G first/last\n\
nav: space/enter toggle row | A select all/none | X clear selection\n\
nav: / filter | esc clear filter | e edit row | s save row | d delete row | a add user\n\
nav: 1-8 toggle column (id name username email phone website company actions)\n\
filter: type to match any field | backspace | ctrl+u clear | enter/esc done\n\
edit: type to change field | tab/shift+tab field | enter or ctrl+s save | esc pause\n\
add: type | tab/shift+tab field | enter or ctrl+s add | esc cancel"
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

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, cell_display, column_for_digit, column_toggle_text,
        handle_key_event, header_checkbox, process_internal_events, render,
        render_form_overlay_text, start_fetch, status_text, table_title,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use rolodex_app::{AppMode, AppState, Column, Record, RecordField, RecordId};
    use rolodex_testkit::{leanne, sample_users};
    use std::sync::mpsc;

    #[derive(Debug, Default)]
    struct TestRuntime {
        records: Vec<Record>,
        fail_with: Option<String>,
        fetch_count: usize,
    }

    impl AppRuntime for TestRuntime {
        fn fetch_records(&mut self) -> Result<Vec<Record>> {
            self.fetch_count += 1;
            match &self.fail_with {
                Some(message) => Err(anyhow!("{message}")),
                None => Ok(self.records.clone()),
            }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(value: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(value), KeyModifiers::CONTROL)
    }

    fn shift(value: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(value), KeyModifiers::SHIFT)
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn press(state: &mut AppState, view_data: &mut ViewData, keys: &[KeyEvent]) -> bool {
        let tx = internal_tx();
        let mut quit = false;
        for key in keys {
            quit = handle_key_event(state, view_data, &tx, *key);
        }
        quit
    }

    fn type_text(state: &mut AppState, view_data: &mut ViewData, text: &str) {
        let keys: Vec<KeyEvent> = text.chars().map(|value| key(KeyCode::Char(value))).collect();
        press(state, view_data, &keys);
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            records: sample_users().expect("sample users decode"),
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();
        start_fetch(&mut state, &mut runtime, &mut view_data, &tx);
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        state
    }

    #[test]
    fn fetch_outcome_loads_records_through_channel() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            records: vec![leanne()],
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();

        start_fetch(&mut state, &mut runtime, &mut view_data, &tx);
        assert!(view_data.fetch_pending);
        assert!(state.table.is_empty());

        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(!view_data.fetch_pending);
        assert_eq!(runtime.fetch_count, 1);
        assert_eq!(state.table.records(), &[leanne()]);
        assert_eq!(state.status_line.as_deref(), Some("loaded 1 users"));
    }

    #[test]
    fn fetch_failure_is_reported_and_swallowed() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            fail_with: Some("cannot reach http://127.0.0.1:1/users".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();

        start_fetch(&mut state, &mut runtime, &mut view_data, &tx);
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert!(state.table.is_empty());
        assert!(!view_data.fetch_pending);
        assert_eq!(
            state.status_line.as_deref(),
            Some("load failed: cannot reach http://127.0.0.1:1/users")
        );
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut state = loaded_state();
        let mut view_data = ViewData {
            status_token: 3,
            ..ViewData::default()
        };
        let (tx, rx) = mpsc::channel();

        tx.send(InternalEvent::ClearStatus { token: 2 })
            .expect("send stale token");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus { token: 3 })
            .expect("send current token");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let mut state = AppState::default();
        let mut view_data = ViewData::default();
        let quit = press(&mut state, &mut view_data, &[key(KeyCode::Char('q'))]);
        assert!(quit);
        assert!(press(&mut state, &mut view_data, &[ctrl('q')]));
    }

    #[test]
    fn slash_filters_live_and_escape_clears() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(&mut state, &mut view_data, &[key(KeyCode::Char('/'))]);
        assert_eq!(state.mode, AppMode::Filter);
        type_text(&mut state, &mut view_data, "ROMAG");
        assert_eq!(state.table.filter_text(), "ROMAG");
        assert_eq!(state.table.filtered().len(), 2);

        press(&mut state, &mut view_data, &[key(KeyCode::Backspace)]);
        assert_eq!(state.table.filter_text(), "ROMA");

        press(&mut state, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.table.filter_text(), "ROMA");

        press(&mut state, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(state.table.filter_text().is_empty());
        assert_eq!(state.status_line.as_deref(), Some("filter cleared"));
    }

    #[test]
    fn filter_ctrl_u_clears_text() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();
        press(&mut state, &mut view_data, &[key(KeyCode::Char('/'))]);
        type_text(&mut state, &mut view_data, "zzz");
        assert!(state.table.filtered().is_empty());
        press(&mut state, &mut view_data, &[ctrl('u')]);
        assert!(state.table.filter_text().is_empty());
        assert_eq!(state.table.filtered().len(), 5);
    }

    #[test]
    fn movement_keys_clamp_to_filtered_rows() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(
            &mut state,
            &mut view_data,
            &[key(KeyCode::Char('j')), key(KeyCode::Down)],
        );
        assert_eq!(view_data.selected_row, 2);

        press(&mut state, &mut view_data, &[shift('G')]);
        assert_eq!(view_data.selected_row, 4);
        press(&mut state, &mut view_data, &[key(KeyCode::Char('j'))]);
        assert_eq!(view_data.selected_row, 4);

        press(&mut state, &mut view_data, &[ctrl('u')]);
        assert_eq!(view_data.selected_row, 0);
        press(&mut state, &mut view_data, &[key(KeyCode::Up)]);
        assert_eq!(view_data.selected_row, 0);
    }

    #[test]
    fn space_toggles_cursor_row_and_shift_a_toggles_all() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(
            &mut state,
            &mut view_data,
            &[key(KeyCode::Char('j')), key(KeyCode::Char(' '))],
        );
        assert!(state.table.is_selected(RecordId::new(2)));
        assert_eq!(header_checkbox(&state.table), "[-]");

        press(&mut state, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(!state.table.is_selected(RecordId::new(2)));

        press(&mut state, &mut view_data, &[shift('A')]);
        assert!(state.table.all_selected());
        assert_eq!(header_checkbox(&state.table), "[x]");

        press(&mut state, &mut view_data, &[shift('X')]);
        assert!(state.table.selection().is_empty());
        assert_eq!(header_checkbox(&state.table), "[ ]");
    }

    #[test]
    fn edit_keys_rename_leanne_and_save() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(&mut state, &mut view_data, &[key(KeyCode::Char('e'))]);
        assert_eq!(
            state.mode,
            AppMode::Edit(RecordId::new(1), RecordField::Name)
        );
        assert!(state.table.records()[0].editable);

        for _ in 0.."raham".len() {
            press(&mut state, &mut view_data, &[key(KeyCode::Backspace)]);
        }
        type_text(&mut state, &mut view_data, ".");
        assert_eq!(state.table.records()[0].name, "Leanne G.");

        press(&mut state, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert!(!state.table.records()[0].editable);

        state.table.set_filter_text("graham");
        assert!(state.table.filtered().is_empty());
        state.table.set_filter_text("leanne");
        assert_eq!(state.table.filtered().len(), 1);
    }

    #[test]
    fn tab_moves_edit_focus_and_escape_keeps_row_editable() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(
            &mut state,
            &mut view_data,
            &[
                key(KeyCode::Char('e')),
                key(KeyCode::Tab),
                key(KeyCode::Tab),
            ],
        );
        assert_eq!(
            state.mode,
            AppMode::Edit(RecordId::new(1), RecordField::Email)
        );
        press(&mut state, &mut view_data, &[ctrl('u')]);
        type_text(&mut state, &mut view_data, "lg@example.com");
        assert_eq!(state.table.records()[0].email, "lg@example.com");

        press(&mut state, &mut view_data, &[key(KeyCode::BackTab)]);
        assert_eq!(
            state.mode,
            AppMode::Edit(RecordId::new(1), RecordField::Username)
        );

        press(&mut state, &mut view_data, &[key(KeyCode::Esc)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert!(state.table.records()[0].editable);

        press(&mut state, &mut view_data, &[key(KeyCode::Char('s'))]);
        assert!(!state.table.records()[0].editable);
    }

    #[test]
    fn field_cursor_picks_the_field_edit_starts_on() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(
            &mut state,
            &mut view_data,
            &[
                key(KeyCode::Char('h')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
            ],
        );
        assert_eq!(view_data.field_cursor, 1);

        press(
            &mut state,
            &mut view_data,
            &[key(KeyCode::Right), key(KeyCode::Char('e'))],
        );
        assert_eq!(
            state.mode,
            AppMode::Edit(RecordId::new(1), RecordField::Email)
        );

        press(
            &mut state,
            &mut view_data,
            &[key(KeyCode::Tab), key(KeyCode::Esc)],
        );
        assert_eq!(view_data.field_cursor, 3);
    }

    #[test]
    fn save_on_display_row_reports_status() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();
        press(&mut state, &mut view_data, &[key(KeyCode::Char('s'))]);
        assert_eq!(
            state.status_line.as_deref(),
            Some("row is not being edited")
        );
    }

    #[test]
    fn delete_removes_cursor_row_and_clamps_cursor() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(
            &mut state,
            &mut view_data,
            &[shift('G'), key(KeyCode::Char(' ')), key(KeyCode::Char('d'))],
        );
        assert_eq!(state.table.len(), 4);
        assert!(state.table.record(RecordId::new(5)).is_none());
        assert!(state.table.selection().is_empty());
        assert_eq!(view_data.selected_row, 3);
    }

    #[test]
    fn add_form_appends_user_and_selects_it() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(&mut state, &mut view_data, &[key(KeyCode::Char('a'))]);
        assert_eq!(state.mode, AppMode::Form(RecordField::Name));

        for (value, next) in [
            ("Ann", true),
            ("ann1", true),
            ("a@b.com", true),
            ("555", true),
            ("ann.io", true),
            ("Acme", false),
        ] {
            type_text(&mut state, &mut view_data, value);
            if next {
                press(&mut state, &mut view_data, &[key(KeyCode::Tab)]);
            }
        }
        assert_eq!(state.mode, AppMode::Form(RecordField::CompanyName));

        press(&mut state, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.table.len(), 6);
        let added = &state.table.records()[5];
        assert_eq!(added.id, RecordId::new(6));
        assert_eq!(added.email, "a@b.com");
        assert_eq!(added.company.name, "Acme");
        assert!(state.table.form().is_blank());
        assert_eq!(view_data.selected_row, 5);
    }

    #[test]
    fn escape_cancels_add_form_but_keeps_draft() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();
        press(&mut state, &mut view_data, &[key(KeyCode::Char('a'))]);
        type_text(&mut state, &mut view_data, "Draft");
        press(&mut state, &mut view_data, &[key(KeyCode::Esc)]);

        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.table.len(), 5);
        assert_eq!(state.table.form().name, "Draft");
        assert_eq!(state.status_line.as_deref(), Some("add canceled"));
    }

    #[test]
    fn digit_keys_toggle_columns() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(&mut state, &mut view_data, &[key(KeyCode::Char('5'))]);
        assert!(state.table.columns().is_visible(Column::Phone));
        press(&mut state, &mut view_data, &[key(KeyCode::Char('1'))]);
        assert!(!state.table.columns().is_visible(Column::Id));
        assert_eq!(state.status_line.as_deref(), Some("column id hidden"));

        assert_eq!(column_for_digit('8'), Some(Column::Actions));
        assert_eq!(column_for_digit('9'), None);
        assert_eq!(column_for_digit('0'), None);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut state = loaded_state();
        let mut view_data = ViewData::default();

        press(&mut state, &mut view_data, &[key(KeyCode::Char('?'))]);
        assert!(view_data.help_visible);
        press(&mut state, &mut view_data, &[key(KeyCode::Char('d'))]);
        assert_eq!(state.table.len(), 5);

        press(&mut state, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(!view_data.help_visible);
    }

    #[test]
    fn cell_display_marks_editable_fields_and_actions() {
        let mut record = leanne();
        assert_eq!(cell_display(&record, Column::Name), "Leanne Graham");
        assert_eq!(cell_display(&record, Column::Actions), "e edit  d del");

        record.editable = true;
        assert_eq!(cell_display(&record, Column::Name), "[Leanne Graham]");
        assert_eq!(cell_display(&record, Column::Id), "1");
        assert_eq!(cell_display(&record, Column::Actions), "s save");
    }

    #[test]
    fn column_toggle_text_lists_every_column_with_state() {
        let state = loaded_state();
        let text = column_toggle_text(&state.table);
        assert!(text.starts_with("1 [x] id  2 [x] name  3 [ ] username"));
        assert!(text.ends_with("8 [x] actions"));
    }

    #[test]
    fn form_overlay_marks_focused_field() {
        let mut state = loaded_state();
        state
            .table
            .set_form_field(RecordField::Email, "a@b.com".to_owned());
        let text = render_form_overlay_text(&state.table, RecordField::Email);
        assert!(text.contains("> Email         a@b.com▏"));
        assert!(text.contains("  Name          \n"));
    }

    #[test]
    fn status_and_title_reflect_mode_and_counts() {
        let mut state = loaded_state();
        let view_data = ViewData::default();
        state.table.set_filter_text("romaguera");
        state.table.toggle_selection(RecordId::new(1));

        let title = table_title(&state, &view_data);
        assert!(title.starts_with("users 2/5 · 1 selected · loaded "));

        state.status_line = None;
        state.mode = AppMode::Edit(RecordId::new(1), RecordField::Website);
        assert!(status_text(&state).starts_with("EDIT | 1 website"));
    }

    #[test]
    fn render_draws_visible_columns_only() -> Result<()> {
        let state = loaded_state();
        let view_data = ViewData::default();
        let mut terminal = Terminal::new(TestBackend::new(140, 20))?;

        terminal.draw(|frame| render(frame, &state, &view_data))?;

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Leanne Graham"));
        assert!(rendered.contains("Romaguera-Crona"));
        assert!(rendered.contains("email"));
        assert!(!rendered.contains("hildegard.org"));
        assert!(rendered.contains("press / to filter"));
        Ok(())
    }
}
