use std::collections::BTreeSet;

use xoso_db::models::{DigitNote, DigitStat, DrawAnalysis, Strategy};

use crate::config::EngineConfig;

fn digits(list: &[u8]) -> impl Iterator<Item = u8> + '_ {
    list.iter().copied().filter(|&d| d <= 9)
}

fn is_weak(stat: &DigitStat) -> bool {
    stat.note == DigitNote::Yeu || stat.count < 3
}

/// Builds the "nòng cốt" numbers in three passes.
///
/// 1. every potential head × potential tail that did not come out, plus
///    double-câm pairs regardless;
/// 2. potential heads × weak tails (yếu or seen fewer than 3 times);
/// 3. weak heads × potential tails.
///
/// Passes 2 and 3 only run while the set is short and stop at
/// `config.core_size`. The result is ascending and truncated to that size.
pub fn generate_core_numbers(
    analysis: &DrawAnalysis,
    strategy: &Strategy,
    config: &EngineConfig,
) -> Vec<u8> {
    let target = config.core_size;
    let mut core = BTreeSet::new();

    for h in digits(&strategy.potential_heads) {
        for t in digits(&strategy.potential_tails) {
            let number = h * 10 + t;
            let double_cam = analysis.heads[h as usize].note == DigitNote::Cam
                && analysis.tails[t as usize].note == DigitNote::Cam;
            if !analysis.has_number(number) || double_cam {
                core.insert(number);
            }
        }
    }

    if core.len() < target {
        'heads: for h in digits(&strategy.potential_heads) {
            for t in 0..10u8 {
                let number = h * 10 + t;
                if !core.contains(&number)
                    && !analysis.has_number(number)
                    && is_weak(&analysis.tails[t as usize])
                {
                    core.insert(number);
                    if core.len() >= target {
                        break 'heads;
                    }
                }
            }
        }
    }

    if core.len() < target {
        'tails: for t in digits(&strategy.potential_tails) {
            for h in 0..10u8 {
                let number = h * 10 + t;
                if !core.contains(&number)
                    && !analysis.has_number(number)
                    && is_weak(&analysis.heads[h as usize])
                {
                    core.insert(number);
                    if core.len() >= target {
                        break 'tails;
                    }
                }
            }
        }
    }

    core.into_iter().take(target).collect()
}
