use xoso_db::models::Xien3;

/// 3-element combinations of `core` in lexicographic index order, stopping
/// after `max_sets`.
pub fn xien3_combinations(core: &[u8], max_sets: usize) -> Vec<Xien3> {
    let n = core.len();
    let mut sets = Vec::new();
    if n < 3 {
        return sets;
    }

    'outer: for i in 0..n - 2 {
        for j in (i + 1)..n - 1 {
            for k in (j + 1)..n {
                if sets.len() >= max_sets {
                    break 'outer;
                }
                sets.push([core[i], core[j], core[k]]);
            }
        }
    }
    sets
}
