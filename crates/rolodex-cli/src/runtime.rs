// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rolodex_app::Record;
use rolodex_source::Client;
use rolodex_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Serves the TUI from the remote users endpoint.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl rolodex_tui::AppRuntime for HttpRuntime {
    fn fetch_records(&mut self) -> Result<Vec<Record>> {
        self.client.fetch_records()
    }

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("rolodex-fetch".to_owned())
            .spawn(move || {
                let outcome = client
                    .fetch_records()
                    .map_err(|error| format!("{error:#}"));
                if tx.send(InternalEvent::RecordsFetched(outcome)).is_err() {
                    debug!("fetch finished after the UI exited");
                }
            })
            .context("spawn fetch thread")?;
        Ok(())
    }
}
