// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rolodex_app::{Company, Record, RecordId};

/// The public users payload, trimmed to the fields the table reads plus one
/// nested object the decoder has to skip.
pub const USERS_JSON: &str = r#"[
  {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz",
   "address": {"street": "Kulas Light", "city": "Gwenborough"},
   "phone": "1-770-736-8031 x56442", "website": "hildegard.org",
   "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered client-server neural-net", "bs": "harness real-time e-markets"}},
  {"id": 2, "name": "Ervin Howell", "username": "Antonette", "email": "Shanna@melissa.tv",
   "address": {"street": "Victor Plains", "city": "Wisokyburgh"},
   "phone": "010-692-6593 x09125", "website": "anastasia.net",
   "company": {"name": "Deckow-Crist", "catchPhrase": "Proactive didactic contingency", "bs": "synergize scalable supply-chains"}},
  {"id": 3, "name": "Clementine Bauch", "username": "Samantha", "email": "Nathan@yesenia.net",
   "address": {"street": "Douglas Extension", "city": "McKenziehaven"},
   "phone": "1-463-123-4447", "website": "ramiro.info",
   "company": {"name": "Romaguera-Jacobson", "catchPhrase": "Face to face bifurcated interface", "bs": "e-enable strategic applications"}},
  {"id": 4, "name": "Patricia Lebsack", "username": "Karianne", "email": "Julianne.OConner@kory.org",
   "address": {"street": "Hoeger Mall", "city": "South Elvis"},
   "phone": "493-170-9623 x156", "website": "kale.biz",
   "company": {"name": "Robel-Corkery", "catchPhrase": "Multi-tiered zero tolerance productivity", "bs": "transition cutting-edge web services"}},
  {"id": 5, "name": "Chelsey Dietrich", "username": "Kamren", "email": "Lucio_Hettinger@annie.ca",
   "address": {"street": "Skiles Walks", "city": "Roscoeview"},
   "phone": "(254)954-1289", "website": "demarco.info",
   "company": {"name": "Keebler LLC", "catchPhrase": "User-centric fault-tolerant solution", "bs": "revolutionize end-to-end systems"}}
]"#;

pub fn sample_users() -> Result<Vec<Record>> {
    serde_json::from_str(USERS_JSON).context("decode sample users payload")
}

pub fn user(id: i64, name: &str, company: &str) -> Record {
    let handle = name
        .split_whitespace()
        .next()
        .unwrap_or("user")
        .to_ascii_lowercase();
    Record {
        id: RecordId::new(id),
        name: name.to_owned(),
        username: format!("{handle}{id}"),
        email: format!("{handle}@example.com"),
        phone: format!("555-01{id:02}"),
        website: format!("{handle}.example.com"),
        company: Company::named(company),
        editable: false,
    }
}

pub fn leanne() -> Record {
    Record {
        id: RecordId::new(1),
        name: "Leanne Graham".to_owned(),
        username: "Bret".to_owned(),
        email: "Sincere@april.biz".to_owned(),
        phone: "1-770-736-8031 x56442".to_owned(),
        website: "hildegard.org".to_owned(),
        company: Company {
            name: "Romaguera-Crona".to_owned(),
            catch_phrase: "Multi-layered client-server neural-net".to_owned(),
            bs: "harness real-time e-markets".to_owned(),
        },
        editable: false,
    }
}
