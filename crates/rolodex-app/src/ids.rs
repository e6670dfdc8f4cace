// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(RecordId);

/// Hands out record ids for locally inserted rows.
///
/// Tracks the highest id ever observed, so an id freed by a delete is never
/// handed out again and ids from the data source never collide with local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdAllocator {
    high_water: i64,
}

impl IdAllocator {
    pub fn observe(&mut self, id: RecordId) {
        self.high_water = self.high_water.max(id.get());
    }

    pub fn next_id(&mut self) -> RecordId {
        self.high_water = self.high_water.saturating_add(1);
        RecordId::new(self.high_water)
    }
}
