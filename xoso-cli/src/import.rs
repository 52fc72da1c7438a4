use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use xoso_db::db::insert_draw;
use xoso_db::rusqlite::Connection;

use xoso_engine::analysis::analyze_draw;
use xoso_engine::parser::parse_table;

pub struct ImportResult {
    pub draw_date: String,
    pub heads: usize,
    pub numbers: usize,
    pub replaced: bool,
}

/// Accepts `DD/MM/YYYY` or `YYYY-MM-DD`, returns `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"));
    match date {
        Ok(d) => Ok(d.format("%Y-%m-%d").to_string()),
        Err(_) => bail!("Định dạng ngày không hợp lệ: '{}'", raw),
    }
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

pub fn resolve_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(today()),
    }
}

/// Reads a pasted table from a file, or from stdin when the path is `-`.
pub fn read_table(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Lỗi đọc dữ liệu từ stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("Không thể mở {:?}", path))
}

pub fn import_table(conn: &Connection, raw: &str, draw_date: &str) -> Result<ImportResult> {
    let parsed = parse_table(raw)?;
    let analysis = analyze_draw(&parsed, draw_date);
    let replaced = insert_draw(conn, draw_date, raw)?;

    Ok(ImportResult {
        draw_date: draw_date.to_string(),
        heads: parsed.values().filter(|tails| !tails.is_empty()).count(),
        numbers: analysis.all_numbers.len(),
        replaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xoso_db::db::{count_draws, fetch_draw, migrate};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("17/02/2026").unwrap(), "2026-02-17");
        assert_eq!(parse_date("2020-01-01").unwrap(), "2020-01-01");
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("hôm nay").is_err());
    }

    #[test]
    fn test_import_table() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let raw = "Đầu\tĐuôi\n0\t1,2\n1\t\n2\t3,3,9\n";
        let result = import_table(&conn, raw, "2024-01-01").unwrap();
        assert_eq!(result.heads, 2);
        assert_eq!(result.numbers, 4);
        assert!(!result.replaced);
        assert_eq!(fetch_draw(&conn, "2024-01-01").unwrap().unwrap().raw_data, raw);

        let again = import_table(&conn, raw, "2024-01-01").unwrap();
        assert!(again.replaced);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_rejects_bad_table() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert!(import_table(&conn, "0\t1\n", "2024-01-01").is_err());
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }
}
