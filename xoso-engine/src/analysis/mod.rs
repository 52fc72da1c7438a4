pub mod core_numbers;
pub mod strategy;
pub mod xien;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use xoso_db::models::{DigitNote, DigitStat, DrawAnalysis, Strategy, Xien3};

use crate::config::EngineConfig;
use crate::error::FormatError;
use crate::parser::{parse_table, ParsedTable};

use self::core_numbers::generate_core_numbers;
use self::strategy::plan_strategy;
use self::xien::xien3_combinations;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: DrawAnalysis,
    pub strategy: Strategy,
    pub core_numbers: Vec<u8>,
    pub xien3_sets: Vec<Xien3>,
}

/// Counts heads and tails of a parsed draw.
///
/// A head's count is the length of its tail list, duplicates included, while
/// `all_numbers` is a set. Tails outside 0-9 still count toward their head but
/// are otherwise ignored.
pub fn analyze_draw(parsed: &ParsedTable, draw_date: &str) -> DrawAnalysis {
    let mut heads = [DigitStat::default(); 10];
    let mut tails = [DigitStat::default(); 10];
    let mut seen = BTreeSet::new();

    for (&head, list) in parsed.iter().filter(|&(&h, _)| h <= 9) {
        heads[head as usize].count = list.len() as u32;
        for &tail in list {
            if (0..=9).contains(&tail) {
                tails[tail as usize].count += 1;
                seen.insert(head * 10 + tail as u8);
            }
        }
    }

    for stat in heads.iter_mut().chain(tails.iter_mut()) {
        stat.note = DigitNote::from_count(stat.count);
    }

    DrawAnalysis {
        draw_date: draw_date.to_string(),
        heads,
        tails,
        all_numbers: seen.into_iter().collect(),
    }
}

/// Full pipeline: table text to analysis, strategy, core numbers and xiên 3 sets.
pub fn analyze(
    config: &EngineConfig,
    raw_data: &str,
    draw_date: &str,
) -> Result<AnalyzeResponse, FormatError> {
    let parsed = parse_table(raw_data)?;
    let analysis = analyze_draw(&parsed, draw_date);
    let strategy = plan_strategy(&analysis, config);
    let core_numbers = generate_core_numbers(&analysis, &strategy, config);
    let xien3_sets = xien3_combinations(&core_numbers, config.max_xien3);

    Ok(AnalyzeResponse {
        analysis,
        strategy,
        core_numbers,
        xien3_sets,
    })
}

#[cfg(test)]
pub(crate) fn analysis_from(raw: &str) -> DrawAnalysis {
    analyze_draw(&parse_table(raw).unwrap(), "2024-01-01")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_table(rng: &mut StdRng) -> String {
        let mut raw = String::from("Đầu\tĐuôi\n");
        for head in 0..10 {
            if rng.random_bool(0.2) {
                continue;
            }
            let n = rng.random_range(0..6);
            let tails: Vec<String> = (0..n).map(|_| rng.random_range(0..10).to_string()).collect();
            raw.push_str(&format!("{head}\t{}\n", tails.join(",")));
        }
        raw
    }

    #[test]
    fn test_example_draw() {
        let analysis = analysis_from("Đầu\tĐuôi\n0\t1,2\n1\t\n2\t3,3,9\n");

        assert_eq!(analysis.heads[0].count, 2);
        assert_eq!(analysis.heads[0].note, DigitNote::Yeu);
        assert_eq!(analysis.heads[1].count, 0);
        assert_eq!(analysis.heads[1].note, DigitNote::Cam);
        // duplicates count toward frequencies
        assert_eq!(analysis.heads[2].count, 3);
        assert_eq!(analysis.heads[2].note, DigitNote::KhaManh);
        assert_eq!(analysis.tails[3].count, 2);
        assert_eq!(analysis.tails[3].note, DigitNote::Yeu);
        // heads never mentioned are câm
        assert_eq!(analysis.heads[7].count, 0);
        assert_eq!(analysis.heads[7].note, DigitNote::Cam);

        assert_eq!(analysis.all_numbers, vec![1, 2, 23, 29]);
        assert_eq!(analysis.draw_date, "2024-01-01");
    }

    #[test]
    fn test_strong_digits() {
        let analysis = analysis_from("Đầu\tĐuôi\n4\t0,1,2,3\n5\t0,0,0\n6\t0\n");
        assert_eq!(analysis.heads[4].note, DigitNote::Manh);
        assert_eq!(analysis.heads[5].note, DigitNote::KhaManh);
        assert_eq!(analysis.tails[0].count, 5);
        assert_eq!(analysis.tails[0].note, DigitNote::Manh);
        assert_eq!(analysis.all_numbers, vec![40, 41, 42, 43, 50, 60]);
    }

    #[test]
    fn test_out_of_range_tails_ignored_for_tails() {
        let analysis = analysis_from("Đầu\tĐuôi\n3\t12,-1,4\n");
        assert_eq!(analysis.heads[3].count, 3);
        assert_eq!(analysis.tails.iter().map(|t| t.count).sum::<u32>(), 1);
        assert_eq!(analysis.all_numbers, vec![34]);
    }

    #[test]
    fn test_counts_balance_on_random_draws() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let parsed = parse_table(&random_table(&mut rng)).unwrap();
            let analysis = analyze_draw(&parsed, "d");

            let entries: u32 = parsed.values().map(|t| t.len() as u32).sum();
            let head_sum: u32 = analysis.heads.iter().map(|s| s.count).sum();
            let tail_sum: u32 = analysis.tails.iter().map(|s| s.count).sum();
            assert_eq!(head_sum, entries);
            assert_eq!(tail_sum, entries);

            assert!(analysis.all_numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(analysis.all_numbers.iter().all(|&n| n <= 99));
            for stat in analysis.heads.iter().chain(analysis.tails.iter()) {
                assert_eq!(stat.note, DigitNote::from_count(stat.count));
            }
        }
    }

    /// Distinct digits 0-9, only câm or yếu, every câm before every yếu.
    fn assert_potential_digits(digits: &[u8], stats: &[DigitStat; 10]) {
        let mut seen = [false; 10];
        for &d in digits {
            assert!(d <= 9);
            assert!(!seen[d as usize], "digit {d} repeated");
            seen[d as usize] = true;
        }
        let notes: Vec<DigitNote> = digits.iter().map(|&d| stats[d as usize].note).collect();
        assert!(notes.iter().all(|n| matches!(n, DigitNote::Cam | DigitNote::Yeu)));
        if let Some(first_yeu) = notes.iter().position(|n| *n == DigitNote::Yeu) {
            assert!(notes[first_yeu..].iter().all(|n| *n == DigitNote::Yeu));
        }
    }

    #[test]
    fn test_pipeline_respects_caps_on_random_draws() {
        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let response = analyze(&config, &random_table(&mut rng), "d").unwrap();

            let strategy = &response.strategy;
            assert!(strategy.potential_heads.len() <= 5);
            assert!(strategy.potential_tails.len() <= 7);
            assert_potential_digits(&strategy.potential_heads, &response.analysis.heads);
            assert_potential_digits(&strategy.potential_tails, &response.analysis.tails);

            assert!(response.core_numbers.len() <= 20);
            assert!(response.core_numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(response.core_numbers.iter().all(|&n| n <= 99));

            assert!(response.xien3_sets.len() <= 100);
            for set in &response.xien3_sets {
                assert!(set[0] < set[1] && set[1] < set[2]);
                assert!(set.iter().all(|n| response.core_numbers.contains(n)));
            }
        }
    }

    #[test]
    fn test_analyze_rejects_missing_header() {
        let err = analyze(&EngineConfig::default(), "0\t1,2\n", "d").unwrap_err();
        assert!(matches!(err, FormatError::MissingHeader { .. }));
    }

    #[test]
    fn test_response_json_shape() {
        let response = analyze(&EngineConfig::default(), "Đầu\tĐuôi\n0\t1\n", "d").unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("coreNumbers").is_some());
        assert!(json.get("xien3Sets").is_some());
        assert!(json["strategy"].get("potentialHeads").is_some());
    }
}
