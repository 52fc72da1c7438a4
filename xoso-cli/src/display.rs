use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use xoso_db::models::{CheckResult, DigitNote, DrawAnalysis, StoredDraw, Strategy, Xien3};
use xoso_engine::analysis::analyze_draw;
use xoso_engine::backtest::BacktestReport;
use xoso_engine::parser::parse_table;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn join_digits(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 1234567 → "1.234.567", the Vietnamese grouping.
pub fn format_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped} đ")
    } else {
        format!("{grouped} đ")
    }
}

fn note_cell(note: DigitNote) -> Cell {
    let color = match note {
        DigitNote::Cam => Color::Red,
        DigitNote::Yeu => Color::Yellow,
        DigitNote::KhaManh => Color::White,
        DigitNote::Manh => Color::Green,
    };
    Cell::new(note.to_string()).fg(color)
}

pub fn display_draws(draws: &[StoredDraw]) {
    if draws.is_empty() {
        println!("Không có kỳ quay nào để hiển thị.");
        return;
    }

    let mut table = new_table(vec!["Ngày", "Số đã về", "Lô", "Nhập lúc"]);
    for draw in draws {
        let (count, numbers) = match parse_table(&draw.raw_data) {
            Ok(parsed) => {
                let analysis = analyze_draw(&parsed, &draw.draw_date);
                (
                    analysis.all_numbers.len().to_string(),
                    join_numbers(&analysis.all_numbers),
                )
            }
            Err(e) => ("—".to_string(), e.to_string()),
        };
        table.add_row(vec![&draw.draw_date, &count, &numbers, &draw.imported_at]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Đã nhập kỳ {} :", result.draw_date);
    println!("  Đầu có số   : {}", result.heads);
    println!("  Số đã về    : {}", result.numbers);
    if result.replaced {
        println!("  (đã thay thế dữ liệu cũ của ngày này)");
    }
}

pub fn display_analysis(analysis: &DrawAnalysis) {
    println!("\n📊 Phân tích kỳ {}\n", analysis.draw_date);

    let mut table = new_table(vec!["Số", "Đầu", "Trạng thái đầu", "Đuôi", "Trạng thái đuôi"]);
    for digit in 0..10 {
        let head = &analysis.heads[digit];
        let tail = &analysis.tails[digit];
        table.add_row(vec![
            Cell::new(digit),
            Cell::new(head.count),
            note_cell(head.note),
            Cell::new(tail.count),
            note_cell(tail.note),
        ]);
    }
    println!("{table}");
    println!("Các số đã về : {}", join_numbers(&analysis.all_numbers));
}

pub fn display_strategy(strategy: &Strategy) {
    println!("\n🎯 Chiến lược\n");
    println!("  Đầu tiềm năng  : {}", join_digits(&strategy.potential_heads));
    println!("  Đuôi tiềm năng : {}", join_digits(&strategy.potential_tails));
}

pub fn display_core_numbers(core_numbers: &[u8]) {
    println!("\n🔢 {} số nòng cốt\n", core_numbers.len());
    if core_numbers.is_empty() {
        println!("  (không có số nào)");
        return;
    }
    println!("  {}", join_numbers(core_numbers));
}

pub fn display_xien3(sets: &[Xien3]) {
    println!("\n🎲 {} bộ xiên 3\n", sets.len());
    if sets.is_empty() {
        return;
    }

    let mut table = new_table(vec!["#", "Bộ", "#", "Bộ", "#", "Bộ", "#", "Bộ"]);
    for (row, chunk) in sets.chunks(4).enumerate() {
        let mut cells = Vec::with_capacity(8);
        for (i, set) in chunk.iter().enumerate() {
            cells.push(format!("{}", row * 4 + i + 1));
            cells.push(join_numbers(set));
        }
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn display_check(result: &CheckResult, predicted_sets: usize) {
    println!("\n✅ Đối chiếu kết quả\n");
    println!(
        "  Số nòng cốt trúng : {} ({})",
        result.hit_core_numbers.len(),
        join_numbers(&result.hit_core_numbers)
    );
    println!(
        "  Xiên 3 trúng      : {}/{}",
        result.hit_xien3_sets.len(),
        predicted_sets
    );

    if !result.hit_xien3_sets.is_empty() {
        let mut table = new_table(vec!["#", "Bộ trúng"]);
        for (i, set) in result.hit_xien3_sets.iter().enumerate() {
            table.add_row(vec![format!("{}", i + 1), join_numbers(set)]);
        }
        println!("{table}");
    }

    let color = if result.profit >= 0 { Color::Green } else { Color::Red };
    let mut table = new_table(vec!["Lãi / lỗ"]);
    table.add_row(vec![Cell::new(format_money(result.profit)).fg(color)]);
    println!("{table}");
}

pub fn display_backtest(report: &BacktestReport) {
    if report.days.is_empty() {
        println!("Cần ít nhất 2 kỳ quay để kiểm tra lại.");
        return;
    }

    let mut table = new_table(vec![
        "Phân tích", "Đối chiếu", "Nòng cốt", "Trúng", "Xiên 3", "Trúng", "Lãi / lỗ",
    ]);
    for day in &report.days {
        let color = if day.profit >= 0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(&day.analyzed_date),
            Cell::new(&day.checked_date),
            Cell::new(day.core_numbers),
            Cell::new(day.core_hits),
            Cell::new(day.xien3_sets),
            Cell::new(day.xien3_hits),
            Cell::new(format_money(day.profit)).fg(color),
        ]);
    }
    println!("{table}");
    println!(
        "\nTổng : {} trên {} kỳ, {} kỳ có lãi",
        format_money(report.total_profit),
        report.days.len(),
        report.winning_days
    );
}
