// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Company, Record, RecordField, RecordId};

/// Transient input behind the "add user" form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecordForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company_name: String,
}

impl NewRecordForm {
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::Username => &self.username,
            RecordField::Email => &self.email,
            RecordField::Phone => &self.phone,
            RecordField::Website => &self.website,
            RecordField::CompanyName => &self.company_name,
        }
    }

    fn value_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::Name => &mut self.name,
            RecordField::Username => &mut self.username,
            RecordField::Email => &mut self.email,
            RecordField::Phone => &mut self.phone,
            RecordField::Website => &mut self.website,
            RecordField::CompanyName => &mut self.company_name,
        }
    }

    pub fn set(&mut self, field: RecordField, value: String) {
        *self.value_mut(field) = value;
    }

    pub fn is_blank(&self) -> bool {
        RecordField::ALL
            .into_iter()
            .all(|field| self.get(field).is_empty())
    }

    /// Builds a display-mode record and leaves the form empty.
    pub fn take_record(&mut self, id: RecordId) -> Record {
        let form = std::mem::take(self);
        Record {
            id,
            name: form.name,
            username: form.username,
            email: form.email,
            phone: form.phone,
            website: form.website,
            company: Company::named(form.company_name),
            editable: false,
        }
    }
}
