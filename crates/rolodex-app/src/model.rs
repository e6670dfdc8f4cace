// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default, rename = "catchPhrase")]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One user row. `editable` is UI state and never crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: Company,
    #[serde(skip)]
    pub editable: bool,
}

/// Typed accessor table for the string fields of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordField {
    Name,
    Username,
    Email,
    Phone,
    Website,
    CompanyName,
}

impl RecordField {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Username,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::CompanyName,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::CompanyName => "company",
        }
    }

    pub const fn form_label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Username => "Username",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Website => "Website",
            Self::CompanyName => "Company Name",
        }
    }

    pub fn get(self, record: &Record) -> &str {
        match self {
            Self::Name => &record.name,
            Self::Username => &record.username,
            Self::Email => &record.email,
            Self::Phone => &record.phone,
            Self::Website => &record.website,
            Self::CompanyName => &record.company.name,
        }
    }

    pub fn set(self, record: &mut Record, value: String) {
        *self.value_mut(record) = value;
    }

    fn value_mut(self, record: &mut Record) -> &mut String {
        match self {
            Self::Name => &mut record.name,
            Self::Username => &mut record.username,
            Self::Email => &mut record.email,
            Self::Phone => &mut record.phone,
            Self::Website => &mut record.website,
            Self::CompanyName => &mut record.company.name,
        }
    }

    pub const fn column(self) -> Column {
        match self {
            Self::Name => Column::Name,
            Self::Username => Column::Username,
            Self::Email => Column::Email,
            Self::Phone => Column::Phone,
            Self::Website => Column::Website,
            Self::CompanyName => Column::Company,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let fields = Self::ALL;
        let current = fields
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0) as isize;
        let len = fields.len() as isize;
        fields[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Id,
    Name,
    Username,
    Email,
    Phone,
    Website,
    Company,
    Actions,
}

impl Column {
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Name,
        Self::Username,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::Company,
        Self::Actions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::Company => "company",
            Self::Actions => "actions",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The editable field behind this column, if any.
    pub const fn field(self) -> Option<RecordField> {
        match self {
            Self::Id | Self::Actions => None,
            Self::Name => Some(RecordField::Name),
            Self::Username => Some(RecordField::Username),
            Self::Email => Some(RecordField::Email),
            Self::Phone => Some(RecordField::Phone),
            Self::Website => Some(RecordField::Website),
            Self::Company => Some(RecordField::CompanyName),
        }
    }

    /// Display text for a data column; `None` for the actions column.
    pub fn cell_text(self, record: &Record) -> Option<String> {
        match self {
            Self::Id => Some(record.id.to_string()),
            Self::Actions => None,
            column => column.field().map(|field| field.get(record).to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnVisibility {
    shown: [bool; Column::ALL.len()],
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        let mut visibility = Self {
            shown: [false; Column::ALL.len()],
        };
        for column in [
            Column::Id,
            Column::Name,
            Column::Email,
            Column::Company,
            Column::Actions,
        ] {
            visibility.set(column, true);
        }
        visibility
    }
}

impl ColumnVisibility {
    pub const fn is_visible(&self, column: Column) -> bool {
        self.shown[column.index()]
    }

    pub fn set(&mut self, column: Column, visible: bool) {
        self.shown[column.index()] = visible;
    }

    /// Flips one column and returns its new visibility.
    pub fn toggle(&mut self, column: Column) -> bool {
        let slot = &mut self.shown[column.index()];
        *slot = !*slot;
        *slot
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|column| self.is_visible(*column))
            .collect()
    }
}

/// Which fields the filter text is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterFields {
    #[default]
    Named,
    All,
}

impl FilterFields {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "named" => Some(Self::Named),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub const fn inspects_id(self) -> bool {
        matches!(self, Self::All)
    }
}
