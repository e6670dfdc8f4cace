// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use tracing::error;

use crate::{Column, Record, RecordField, RecordId, RecordTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Filter,
    Edit(RecordId, RecordField),
    Form(RecordField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub status_line: Option<String>,
    pub last_loaded: Option<OffsetDateTime>,
    pub table: RecordTable,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_table(RecordTable::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    LoadRecords(Vec<Record>),
    LoadFailed(String),
    EnterFilter,
    SetFilterText(String),
    ToggleSelection(RecordId),
    ToggleSelectAll,
    ClearSelection,
    BeginEdit(RecordId),
    FocusEditField(RecordField),
    ChangeField {
        id: RecordId,
        field: RecordField,
        value: String,
    },
    CommitEdit(RecordId),
    Delete(RecordId),
    OpenForm,
    FocusFormField(RecordField),
    SetFormField(RecordField, String),
    SubmitForm,
    ToggleColumn(Column),
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    RecordsLoaded(usize),
    FilterChanged,
    SelectionChanged(usize),
    EditStarted(RecordId),
    RecordUpdated(RecordId),
    EditCommitted(RecordId),
    RecordDeleted(RecordId),
    RecordAdded(RecordId),
    FormUpdated,
    ColumnToggled(Column, bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_table(table: RecordTable) -> Self {
        Self {
            mode: AppMode::Nav,
            status_line: None,
            last_loaded: None,
            table,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::LoadRecords(records) => {
                self.table.load(records);
                self.last_loaded = Some(OffsetDateTime::now_utc());
                let count = self.table.len();
                vec![
                    AppEvent::RecordsLoaded(count),
                    AppEvent::SelectionChanged(self.table.selection().len()),
                    self.set_status(&format!("loaded {count} users")),
                ]
            }
            AppCommand::LoadFailed(message) => {
                error!(error = %message, "error fetching users");
                vec![self.set_status(&format!("load failed: {message}"))]
            }
            AppCommand::EnterFilter => self.set_mode(AppMode::Filter),
            AppCommand::SetFilterText(text) => {
                self.table.set_filter_text(text);
                vec![AppEvent::FilterChanged]
            }
            AppCommand::ToggleSelection(id) => {
                if self.table.record(id).is_none() {
                    return Vec::new();
                }
                self.table.toggle_selection(id);
                vec![AppEvent::SelectionChanged(self.table.selection().len())]
            }
            AppCommand::ToggleSelectAll => {
                let selected = self.table.toggle_all();
                let label = if selected {
                    "all selected"
                } else {
                    "selection cleared"
                };
                vec![
                    AppEvent::SelectionChanged(self.table.selection().len()),
                    self.set_status(label),
                ]
            }
            AppCommand::ClearSelection => {
                self.table.clear_selection();
                vec![
                    AppEvent::SelectionChanged(0),
                    self.set_status("selection cleared"),
                ]
            }
            AppCommand::BeginEdit(id) => {
                if !self.table.begin_edit(id) {
                    return vec![self.set_status("edit unavailable")];
                }
                let field = match self.mode {
                    AppMode::Edit(current, field) if current == id => field,
                    _ => RecordField::Name,
                };
                let mut events = vec![AppEvent::EditStarted(id)];
                events.extend(self.set_mode(AppMode::Edit(id, field)));
                events
            }
            AppCommand::FocusEditField(field) => match self.mode {
                AppMode::Edit(id, _) => self.set_mode(AppMode::Edit(id, field)),
                _ => Vec::new(),
            },
            AppCommand::ChangeField { id, field, value } => {
                if self.table.change_field(id, field, value) {
                    vec![AppEvent::RecordUpdated(id)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::CommitEdit(id) => {
                if !self.table.commit_edit(id) {
                    return Vec::new();
                }
                let mut events = vec![AppEvent::EditCommitted(id)];
                if matches!(self.mode, AppMode::Edit(current, _) if current == id) {
                    events.extend(self.set_mode(AppMode::Nav));
                }
                events.push(self.set_status(&format!("saved {id}")));
                events
            }
            AppCommand::Delete(id) => {
                let selected_before = self.table.selection().len();
                if !self.table.delete(id) {
                    return Vec::new();
                }
                let mut events = vec![AppEvent::RecordDeleted(id)];
                if self.table.selection().len() != selected_before {
                    events.push(AppEvent::SelectionChanged(self.table.selection().len()));
                }
                if matches!(self.mode, AppMode::Edit(current, _) if current == id) {
                    events.extend(self.set_mode(AppMode::Nav));
                }
                events.push(self.set_status(&format!("deleted {id}")));
                events
            }
            AppCommand::OpenForm => self.set_mode(AppMode::Form(RecordField::Name)),
            AppCommand::FocusFormField(field) => match self.mode {
                AppMode::Form(_) => self.set_mode(AppMode::Form(field)),
                _ => Vec::new(),
            },
            AppCommand::SetFormField(field, value) => {
                self.table.set_form_field(field, value);
                vec![AppEvent::FormUpdated]
            }
            AppCommand::SubmitForm => {
                let id = self.table.add_record();
                let mut events = vec![AppEvent::RecordAdded(id), AppEvent::FormUpdated];
                events.extend(self.set_mode(AppMode::Nav));
                events.push(self.set_status(&format!("added {id}")));
                events
            }
            AppCommand::ToggleColumn(column) => {
                let visible = self.table.toggle_column(column);
                let label = if visible { "shown" } else { "hidden" };
                vec![
                    AppEvent::ColumnToggled(column, visible),
                    self.set_status(&format!("column {} {label}", column.as_str())),
                ]
            }
            AppCommand::ExitToNav => self.set_mode(AppMode::Nav),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        if self.mode == mode {
            return Vec::new();
        }
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
