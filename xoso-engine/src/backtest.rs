use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::analyze;
use crate::check::check_raw;
use crate::config::EngineConfig;

/// A stored draw table.
#[derive(Debug, Clone)]
pub struct DrawInput {
    pub draw_date: String,
    pub raw_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestDay {
    pub analyzed_date: String,
    pub checked_date: String,
    pub core_numbers: usize,
    pub core_hits: usize,
    pub xien3_sets: usize,
    pub xien3_hits: usize,
    pub profit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestReport {
    pub days: Vec<BacktestDay>,
    pub total_profit: i64,
    pub winning_days: usize,
}

fn replay(config: &EngineConfig, day: &DrawInput, next: &DrawInput) -> Result<BacktestDay> {
    let prediction = analyze(config, &day.raw_data, &day.draw_date)
        .with_context(|| format!("Kỳ {} không đọc được", day.draw_date))?;
    let result = check_raw(
        config,
        &next.raw_data,
        &prediction.core_numbers,
        &prediction.xien3_sets,
    )
    .with_context(|| format!("Kỳ {} không đọc được", next.draw_date))?;

    Ok(BacktestDay {
        analyzed_date: day.draw_date.clone(),
        checked_date: next.draw_date.clone(),
        core_numbers: prediction.core_numbers.len(),
        core_hits: result.hit_core_numbers.len(),
        xien3_sets: prediction.xien3_sets.len(),
        xien3_hits: result.hit_xien3_sets.len(),
        profit: result.profit,
    })
}

/// Replays the strategy over consecutive draws (oldest first): each draw's
/// prediction is checked against the next one. `on_step` is called once per
/// replayed pair, from worker threads.
pub fn run_backtest<F>(config: &EngineConfig, draws: &[DrawInput], on_step: F) -> Result<BacktestReport>
where
    F: Fn() + Sync,
{
    let days: Vec<BacktestDay> = draws
        .par_windows(2)
        .map(|pair| {
            let day = replay(config, &pair[0], &pair[1]);
            on_step();
            day
        })
        .collect::<Result<_>>()?;

    let total_profit = days.iter().map(|d| d.profit).sum();
    let winning_days = days.iter().filter(|d| d.profit > 0).count();

    Ok(BacktestReport {
        days,
        total_profit,
        winning_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn draw(date: &str, raw: &str) -> DrawInput {
        DrawInput {
            draw_date: date.to_string(),
            raw_data: raw.to_string(),
        }
    }

    #[test]
    fn test_needs_two_draws() {
        let report = run_backtest(
            &EngineConfig::default(),
            &[draw("2024-01-01", "Đầu\tĐuôi\n0\t1\n")],
            || {},
        )
        .unwrap();
        assert!(report.days.is_empty());
        assert_eq!(report.total_profit, 0);
    }

    #[test]
    fn test_replays_consecutive_pairs_in_order() {
        let draws = vec![
            draw("2024-01-01", "Đầu\tĐuôi\n0\t1,2\n1\t\n2\t3,3,9\n"),
            // hits 10, 11 and 14 from the first day's core numbers
            draw("2024-01-02", "Đầu\tĐuôi\n1\t0,1,4\n"),
            draw("2024-01-03", "Đầu\tĐuôi\n9\t9\n"),
        ];
        let steps = AtomicUsize::new(0);
        let report = run_backtest(&EngineConfig::default(), &draws, || {
            steps.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(steps.load(Ordering::Relaxed), 2);
        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].analyzed_date, "2024-01-01");
        assert_eq!(report.days[0].checked_date, "2024-01-02");
        assert_eq!(report.days[1].analyzed_date, "2024-01-02");

        let first = &report.days[0];
        assert_eq!(first.core_numbers, 20);
        assert_eq!(first.core_hits, 3);
        // [10, 11, 14] is the first combination generated
        assert_eq!(first.xien3_hits, 1);
        assert_eq!(first.profit, -350_000);

        assert_eq!(
            report.total_profit,
            report.days.iter().map(|d| d.profit).sum::<i64>()
        );
        assert_eq!(report.winning_days, 0);
    }

    #[test]
    fn test_bad_stored_draw_fails_whole_backtest() {
        let draws = vec![
            draw("2024-01-01", "Đầu\tĐuôi\n0\t1\n"),
            draw("2024-01-02", "garbage"),
        ];
        let err = run_backtest(&EngineConfig::default(), &draws, || {}).unwrap_err();
        assert!(err.to_string().contains("2024-01-02"));
    }
}
