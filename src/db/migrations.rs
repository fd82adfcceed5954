use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS farms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        location TEXT,
        area_acres REAL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS crops (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        farm_id INTEGER NOT NULL REFERENCES farms(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        crop_type TEXT NOT NULL,
        planted_on TEXT NOT NULL,
        area_acres REAL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS crop_controls (
        crop_id INTEGER PRIMARY KEY REFERENCES crops(id) ON DELETE CASCADE,
        irrigation_running INTEGER NOT NULL DEFAULT 0,
        fertilization_running INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS crop_history (
        id TEXT PRIMARY KEY,
        crop_id INTEGER NOT NULL REFERENCES crops(id) ON DELETE CASCADE,
        farm_id INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        moisture REAL NOT NULL,
        ph REAL NOT NULL,
        npk REAL NOT NULL,
        temperature_c REAL NOT NULL,
        humidity_percent REAL NOT NULL,
        captured_at TEXT NOT NULL,
        action_taken TEXT NOT NULL,
        ai_recommendation TEXT NOT NULL,
        outcome TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Health detections and indexes
    r#"
    CREATE TABLE IF NOT EXISTS health_detections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        crop_id INTEGER NOT NULL REFERENCES crops(id) ON DELETE CASCADE,
        image_name TEXT NOT NULL,
        image_bytes INTEGER NOT NULL,
        format TEXT NOT NULL,
        status TEXT NOT NULL,
        note TEXT,
        detected_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_crops_farm_id
        ON crops(farm_id);
    CREATE INDEX IF NOT EXISTS idx_crop_history_crop_id
        ON crop_history(crop_id, timestamp);
    CREATE INDEX IF NOT EXISTS idx_health_detections_crop_id
        ON health_detections(crop_id);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        // Ensure schema_migrations table exists
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                conn.execute_batch(migration)?;
                conn.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
            }
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        run(&db).unwrap();

        let version: i32 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i32);
    }
}
