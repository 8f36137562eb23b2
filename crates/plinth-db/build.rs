//! Build script for the database layer.
//!
//! `sqlx::migrate!` embeds the SQL files at compile time, so cargo has to
//! rebuild whenever a migration is added or edited.

fn main() {
    println!("cargo:rerun-if-changed=migrations/");
}
