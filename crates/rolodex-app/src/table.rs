// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::{
    Column, ColumnVisibility, FilterFields, IdAllocator, NewRecordForm, Record, RecordField,
    RecordId,
};

/// `needle` is the lowercased filter text.
fn record_matches(record: &Record, needle: &str, fields: FilterFields) -> bool {
    if needle.is_empty() {
        return true;
    }
    if fields.inspects_id() && record.id.to_string().contains(needle) {
        return true;
    }
    RecordField::ALL
        .into_iter()
        .any(|field| field.get(record).to_lowercase().contains(needle))
}

pub fn filter_records<'a>(
    records: &'a [Record],
    filter_text: &str,
    fields: FilterFields,
) -> Vec<&'a Record> {
    let needle = filter_text.to_lowercase();
    records
        .iter()
        .filter(|record| record_matches(record, &needle, fields))
        .collect()
}

/// All table state owned by one view: records, selection, filter, columns
/// and the pending add form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordTable {
    records: Vec<Record>,
    selection: BTreeSet<RecordId>,
    filter_text: String,
    filter_fields: FilterFields,
    columns: ColumnVisibility,
    form: NewRecordForm,
    ids: IdAllocator,
}

impl RecordTable {
    pub fn new(columns: ColumnVisibility, filter_fields: FilterFields) -> Self {
        Self {
            columns,
            filter_fields,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the collection with a fresh load; every row starts in display mode.
    pub fn load(&mut self, records: Vec<Record>) {
        let mut seen = BTreeSet::new();
        let mut loaded = Vec::with_capacity(records.len());
        for mut record in records {
            if !seen.insert(record.id) {
                warn!(id = %record.id, "dropping duplicate record id from load");
                continue;
            }
            record.editable = false;
            self.ids.observe(record.id);
            loaded.push(record);
        }
        self.records = loaded;
        self.prune_selection();
        info!(count = self.records.len(), "records loaded");
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }

    pub fn filtered(&self) -> Vec<&Record> {
        filter_records(&self.records, &self.filter_text, self.filter_fields)
    }

    pub fn selection(&self) -> &BTreeSet<RecordId> {
        &self.selection
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.contains(&id)
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_selection(&mut self, id: RecordId) -> bool {
        let selected = if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        };
        self.log_selection();
        selected
    }

    pub fn select_all(&mut self) {
        self.selection = self.records.iter().map(|record| record.id).collect();
        self.log_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.log_selection();
    }

    pub fn all_selected(&self) -> bool {
        !self.records.is_empty()
            && self
                .records
                .iter()
                .all(|record| self.selection.contains(&record.id))
    }

    /// Header checkbox behavior: clear when everything is selected, else select all.
    pub fn toggle_all(&mut self) -> bool {
        if self.all_selected() {
            self.clear_selection();
            false
        } else {
            self.select_all();
            true
        }
    }

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let Some(record) = self.record_mut(id) else {
            return false;
        };
        record.editable = true;
        debug!(%id, "edit started");
        true
    }

    pub fn change_field(&mut self, id: RecordId, field: RecordField, value: String) -> bool {
        let Some(record) = self.record_mut(id) else {
            return false;
        };
        field.set(record, value);
        true
    }

    pub fn commit_edit(&mut self, id: RecordId) -> bool {
        let Some(record) = self.record_mut(id) else {
            return false;
        };
        record.editable = false;
        debug!(%id, "edit saved");
        true
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        if self.records.len() == before {
            return false;
        }
        if self.selection.remove(&id) {
            self.log_selection();
        }
        info!(%id, remaining = self.records.len(), "record deleted");
        true
    }

    pub fn form(&self) -> &NewRecordForm {
        &self.form
    }

    pub fn set_form_field(&mut self, field: RecordField, value: String) {
        self.form.set(field, value);
    }

    /// Appends a record built from the add form, then clears the form.
    pub fn add_record(&mut self) -> RecordId {
        let id = self.ids.next_id();
        let record = self.form.take_record(id);
        self.records.push(record);
        info!(%id, count = self.records.len(), "record added");
        id
    }

    pub const fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        self.columns.visible_columns()
    }

    pub fn toggle_column(&mut self, column: Column) -> bool {
        let visible = self.columns.toggle(column);
        debug!(column = column.as_str(), visible, "column toggled");
        visible
    }

    fn prune_selection(&mut self) {
        let present: BTreeSet<RecordId> = self.records.iter().map(|record| record.id).collect();
        let before = self.selection.len();
        self.selection.retain(|id| present.contains(id));
        if self.selection.len() != before {
            self.log_selection();
        }
    }

    fn log_selection(&self) {
        let ids: Vec<i64> = self.selection.iter().map(|id| id.get()).collect();
        debug!(?ids, "selected rows");
    }
}
