//! Deterministic reassembly of unordered chunk results.

use crate::pipeline::types::ChunkResult;

/// Order results by chunk offset, drop empty contributions, and join the
/// rest with single spaces.
///
/// Output depends only on the offsets in the result set, never on the
/// order results arrived in: offsets are unique per run, so the sort is
/// a total order.
pub fn assemble(mut results: Vec<ChunkResult>) -> String {
    results.sort_by_key(|r| r.offset_ms);
    let texts: Vec<&str> = results
        .iter()
        .filter(|r| !r.text.is_empty())
        .map(|r| r.text.as_str())
        .collect();
    texts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_offset_not_arrival() {
        let results = vec![
            ChunkResult::new(59_000, "world"),
            ChunkResult::new(0, "hello"),
        ];
        assert_eq!(assemble(results), "hello world");
    }

    #[test]
    fn any_permutation_gives_identical_output() {
        let base = [
            ChunkResult::new(0, "one"),
            ChunkResult::new(29_500, "two"),
            ChunkResult::new(59_000, "three"),
        ];
        let permutations: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in permutations {
            let shuffled: Vec<ChunkResult> = order.iter().map(|&i| base[i].clone()).collect();
            assert_eq!(assemble(shuffled), "one two three");
        }
    }

    #[test]
    fn empty_entries_contribute_nothing() {
        let results = vec![
            ChunkResult::new(0, "hello"),
            ChunkResult::empty(29_500),
            ChunkResult::new(59_000, "world"),
        ];
        assert_eq!(assemble(results), "hello world");
    }

    #[test]
    fn all_empty_entries_give_the_empty_string() {
        let results = vec![
            ChunkResult::empty(0),
            ChunkResult::empty(29_500),
            ChunkResult::empty(59_000),
        ];
        assert_eq!(assemble(results), "");
    }

    #[test]
    fn missing_offsets_are_simply_absent() {
        // The chunk at 29500 failed past recovery and never reported
        let results = vec![
            ChunkResult::new(0, "hello"),
            ChunkResult::new(59_000, "world"),
        ];
        assert_eq!(assemble(results), "hello world");
    }

    #[test]
    fn no_results_give_the_empty_string() {
        assert_eq!(assemble(Vec::new()), "");
    }

    #[test]
    fn single_result_is_passed_through() {
        assert_eq!(assemble(vec![ChunkResult::new(0, "only")]), "only");
    }
}
