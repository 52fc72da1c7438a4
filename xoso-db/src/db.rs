use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{validate_prediction, Prediction, StoredDraw, Xien3};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_date     TEXT PRIMARY KEY,
    raw_data      TEXT NOT NULL,
    imported_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS predictions (
    session       TEXT PRIMARY KEY,
    draw_date     TEXT NOT NULL,
    core_numbers  TEXT NOT NULL,
    xien3_sets    TEXT NOT NULL,
    created_at    TEXT NOT NULL DEFAULT (datetime('now'))
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("xoso.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Không thể tạo thư mục {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Không thể mở cơ sở dữ liệu {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Di chuyển lược đồ thất bại")?;
    Ok(())
}

/// Stores the raw table of a draw. Returns `true` when a table already existed
/// for that date and was replaced.
pub fn insert_draw(conn: &Connection, draw_date: &str, raw_data: &str) -> Result<bool> {
    let existed: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM draws WHERE draw_date = ?1)",
            [draw_date],
            |row| row.get(0),
        )
        .context("Không thể đọc bảng draws")?;
    conn.execute(
        "INSERT OR REPLACE INTO draws (draw_date, raw_data) VALUES (?1, ?2)",
        rusqlite::params![draw_date, raw_data],
    )
    .context("Lưu kỳ quay thất bại")?;
    log::debug!("draw {draw_date} stored (replaced: {existed})");
    Ok(existed)
}

fn row_to_draw(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDraw> {
    Ok(StoredDraw {
        draw_date: row.get(0)?,
        raw_data: row.get(1)?,
        imported_at: row.get(2)?,
    })
}

pub fn fetch_draw(conn: &Connection, draw_date: &str) -> Result<Option<StoredDraw>> {
    let draw = conn
        .query_row(
            "SELECT draw_date, raw_data, imported_at FROM draws WHERE draw_date = ?1",
            [draw_date],
            row_to_draw,
        )
        .optional()?;
    Ok(draw)
}

/// All stored draws, oldest first.
pub fn fetch_draws(conn: &Connection) -> Result<Vec<StoredDraw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_date, raw_data, imported_at FROM draws ORDER BY draw_date ASC",
    )?;
    let draws = stmt
        .query_map([], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<StoredDraw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_date, raw_data, imported_at FROM draws ORDER BY draw_date DESC LIMIT ?1",
    )?;
    let draws = stmt
        .query_map([limit], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn save_prediction(conn: &Connection, prediction: &Prediction) -> Result<()> {
    let core_json = serde_json::to_string(&prediction.core_numbers)?;
    let sets_json = serde_json::to_string(&prediction.xien3_sets)?;
    conn.execute(
        "INSERT OR REPLACE INTO predictions (session, draw_date, core_numbers, xien3_sets)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![prediction.session, prediction.draw_date, core_json, sets_json],
    )
    .context("Lưu dự đoán thất bại")?;
    log::debug!(
        "prediction saved for session '{}' ({} numbers, {} sets)",
        prediction.session,
        prediction.core_numbers.len(),
        prediction.xien3_sets.len()
    );
    Ok(())
}

pub fn load_prediction(conn: &Connection, session: &str) -> Result<Option<Prediction>> {
    let row = conn
        .query_row(
            "SELECT draw_date, core_numbers, xien3_sets FROM predictions WHERE session = ?1",
            [session],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((draw_date, core_json, sets_json)) = row else {
        return Ok(None);
    };

    let core_numbers: Vec<u8> = serde_json::from_str(&core_json)
        .with_context(|| format!("Dãy số nòng cốt hỏng cho phiên '{session}'"))?;
    let xien3_sets: Vec<Xien3> = serde_json::from_str(&sets_json)
        .with_context(|| format!("Bộ xiên 3 hỏng cho phiên '{session}'"))?;
    validate_prediction(&core_numbers, &xien3_sets)?;

    Ok(Some(Prediction {
        session: session.to_string(),
        draw_date,
        core_numbers,
        xien3_sets,
    }))
}
