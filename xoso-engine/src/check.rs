use std::collections::HashSet;

use xoso_db::models::{CheckResult, Xien3};

use crate::config::EngineConfig;
use crate::error::FormatError;
use crate::parser::parse_actual;

/// Compares a later draw with a previous prediction.
///
/// Core hits follow the ascending order of `actual`, xiên 3 hits the
/// generation order of `xien3_sets`. Profit is `hits * payout_per_hit - stake`.
pub fn check_prediction(
    actual: &[u8],
    core_numbers: &[u8],
    xien3_sets: &[Xien3],
    config: &EngineConfig,
) -> CheckResult {
    let core: HashSet<u8> = core_numbers.iter().copied().collect();
    let drawn: HashSet<u8> = actual.iter().copied().collect();

    let hit_core_numbers: Vec<u8> = actual.iter().copied().filter(|n| core.contains(n)).collect();
    let hit_xien3_sets: Vec<Xien3> = xien3_sets
        .iter()
        .filter(|set| set.iter().all(|n| drawn.contains(n)))
        .copied()
        .collect();

    let profit = hit_xien3_sets.len() as i64 * config.payout_per_hit - config.stake;

    CheckResult {
        hit_core_numbers,
        hit_xien3_sets,
        profit,
    }
}

pub fn check_raw(
    config: &EngineConfig,
    actual_raw_data: &str,
    core_numbers: &[u8],
    xien3_sets: &[Xien3],
) -> Result<CheckResult, FormatError> {
    let actual = parse_actual(actual_raw_data)?;
    Ok(check_prediction(&actual, core_numbers, xien3_sets, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_hit() {
        let result = check_prediction(
            &[5, 17, 42, 99],
            &[5, 17, 42, 50],
            &[[5, 17, 42], [5, 17, 50]],
            &EngineConfig::default(),
        );
        assert_eq!(result.hit_core_numbers, vec![5, 17, 42]);
        assert_eq!(result.hit_xien3_sets, vec![[5, 17, 42]]);
        assert_eq!(result.profit, -350_000);
    }

    #[test]
    fn test_no_hit_loses_stake() {
        let result = check_prediction(&[1, 2, 3], &[5, 17], &[[5, 17, 42]], &EngineConfig::default());
        assert!(result.hit_core_numbers.is_empty());
        assert!(result.hit_xien3_sets.is_empty());
        assert_eq!(result.profit, -1_000_000);
    }

    #[test]
    fn test_core_hits_follow_actual_order() {
        let result = check_prediction(&[3, 40, 71], &[71, 3, 12], &[], &EngineConfig::default());
        assert_eq!(result.hit_core_numbers, vec![3, 71]);
    }

    #[test]
    fn test_check_raw_accepts_any_prediction() {
        let result = check_raw(
            &EngineConfig::default(),
            "Đầu\tĐuôi\n0\t5\n",
            &[5, 5, 150],
            &[[5, 5, 5]],
        )
        .unwrap();
        assert_eq!(result.hit_core_numbers, vec![5]);
        assert_eq!(result.hit_xien3_sets, vec![[5, 5, 5]]);
    }

    #[test]
    fn test_profit_formula() {
        let actual: Vec<u8> = (0..10).collect();
        let sets: Vec<Xien3> = vec![[0, 1, 2], [3, 4, 5], [6, 7, 8], [7, 8, 50], [1, 2, 9]];
        let config = EngineConfig::default();
        let result = check_prediction(&actual, &actual, &sets, &config);
        assert_eq!(result.hit_xien3_sets.len(), 4);
        assert_eq!(
            result.profit,
            result.hit_xien3_sets.len() as i64 * 650_000 - 1_000_000
        );
        assert_eq!(result.profit, 1_600_000);
        // generation order kept
        assert_eq!(result.hit_xien3_sets[3], [1, 2, 9]);
    }

    #[test]
    fn test_check_raw_parses_actual_table() {
        let result = check_raw(
            &EngineConfig::default(),
            "Đầu\tĐuôi\n0\t5\n1\t7\n4\t2\n9\t9\n",
            &[5, 17, 42, 50],
            &[[5, 17, 42], [5, 17, 50]],
        )
        .unwrap();
        assert_eq!(result.hit_core_numbers, vec![5, 17, 42]);
        assert_eq!(result.profit, -350_000);
    }

    #[test]
    fn test_check_raw_rejects_missing_header() {
        assert!(check_raw(&EngineConfig::default(), "0\t5\n", &[5], &[]).is_err());
    }
}
