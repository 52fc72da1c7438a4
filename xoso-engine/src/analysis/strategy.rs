use xoso_db::models::{DigitNote, DigitStat, DrawAnalysis, Strategy};

use crate::config::EngineConfig;

/// Picks potential heads and tails from a single draw: every câm digit, then
/// yếu digits until the target is reached.
pub fn plan_strategy(analysis: &DrawAnalysis, config: &EngineConfig) -> Strategy {
    Strategy {
        potential_heads: pick_digits(&analysis.heads, config.head_target),
        potential_tails: pick_digits(&analysis.tails, config.tail_target),
    }
}

fn pick_digits(stats: &[DigitStat; 10], target: usize) -> Vec<u8> {
    let note = |d: u8| stats[d as usize].note;

    let mut picked: Vec<u8> = (0..10).filter(|&d| note(d) == DigitNote::Cam).collect();
    for d in 0..10 {
        if picked.len() >= target {
            break;
        }
        if note(d) == DigitNote::Yeu {
            picked.push(d);
        }
    }

    picked.sort_by_key(|&d| (note(d).priority(), d));
    picked.truncate(target);
    picked
}
