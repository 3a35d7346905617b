// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations, embedded at compile time.
//!
//! The SQL files under `migrations/` ship inside the binary; refinery
//! applies whatever is still pending each time the database opens and
//! records progress in its own `refinery_schema_history` table.

use attune_core::AttuneError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply pending migrations on the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), AttuneError> {
    embedded::migrations::runner()
        .run(conn)
        .map(|_| ())
        .map_err(|e| AttuneError::Storage {
            source: Box::new(e),
        })
}
