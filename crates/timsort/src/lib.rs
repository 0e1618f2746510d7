//! Stable, adaptive merge sort over slices.
//!
//! Natural runs are detected and extended to a minimum length with binary
//! insertion sort, kept on a stack whose lengths grow at least like the
//! Fibonacci numbers, and merged pairwise with galloping once one side keeps
//! winning. Sorted and strictly descending inputs take `O(n)` comparisons,
//! everything else `O(n log n)`, with a merge buffer of at most `n / 2`
//! elements.

mod compare;
mod driver;
mod error;
mod gallop;
mod merge;
mod runs;
mod stack;

use log::debug;

pub use compare::Comparator;
pub use error::SortError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TunedParams {
    /// Inputs shorter than this are insertion sorted; longer inputs use runs
    /// of `min_merge / 2 ..= min_merge` elements.
    pub min_merge: usize,
    /// Initial galloping threshold of every sort call.
    pub min_gallop: usize,
}

pub const TUNED_PARAMS: TunedParams = TunedParams {
    min_merge: 32,
    min_gallop: 7,
};

impl Default for TunedParams {
    fn default() -> Self {
        TUNED_PARAMS
    }
}

impl TunedParams {
    pub fn validate(&self) -> Result<(), SortError> {
        if self.min_merge < 2 {
            debug!("rejecting min_merge={}", self.min_merge);
            return Err(SortError::InvalidParams("min_merge must be at least 2"));
        }
        if self.min_gallop == 0 {
            debug!("rejecting min_gallop=0");
            return Err(SortError::InvalidParams("min_gallop must be at least 1"));
        }
        Ok(())
    }
}

/// What one sort call did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SortStats {
    /// Runs pushed on the run stack, after extension to the minimum length.
    pub runs: usize,
    pub merges: usize,
    /// Number of times a merge switched into galloping mode.
    pub gallop_phases: usize,
    /// Galloping threshold at the end of the call.
    pub min_gallop: usize,
}

/// Sorts `v` in ascending order, keeping equal elements in their original
/// order.
pub fn sort<T: Ord>(v: &mut [T]) {
    sort_by(v, |a, b| a < b);
}

/// Sorts `v` with `is_less`, a strict weak ordering meaning "`a` goes before
/// `b`". Equal elements keep their original order.
///
/// If `is_less` is not a strict weak ordering the resulting order is
/// unspecified, but `v` still holds every element exactly once.
///
/// # Panics
///
/// Panics if the merge buffer cannot be allocated. See [`try_sort_by`] for a
/// fallible version.
pub fn sort_by<T, F>(v: &mut [T], is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    sort_with(v, is_less);
}

/// Sorts `v` by the key `f` extracts, keeping equal keys in their original
/// order. The key is recomputed for every comparison.
pub fn sort_by_key<T, K, F>(v: &mut [T], mut f: F)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    sort_by(v, |a, b| f(a) < f(b));
}

/// Sorts `v` with any [`Comparator`].
///
/// # Panics
///
/// Panics if the merge buffer cannot be allocated.
pub fn sort_with<T, C>(v: &mut [T], mut cmp: C)
where
    C: Comparator<T>,
{
    if let Err(err) = driver::sort(v, &mut cmp, &TUNED_PARAMS) {
        panic!("timsort: {}", err);
    }
}

/// Sorts `v` with `is_less` and custom tuning, reporting allocation failure
/// instead of panicking.
///
/// On error `v` holds every element exactly once but may be partially sorted.
pub fn try_sort_by<T, F>(
    v: &mut [T],
    mut is_less: F,
    params: &TunedParams,
) -> Result<SortStats, SortError>
where
    F: FnMut(&T, &T) -> bool,
{
    driver::sort(v, &mut is_less, params)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    use bench::{ALL_PATTERNS, Pattern, default_rng, generate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn assert_sorts_like_std(data: &[u64]) {
        let mut actual = data.to_vec();
        sort(&mut actual);

        let mut expected = data.to_vec();
        expected.sort();

        assert_eq!(actual, expected, "input_len={}", data.len());
    }

    /// Sorts `(key, position)` pairs by key alone and checks the result
    /// against `std`'s stable sort, which pins down the order of equal keys.
    fn assert_stable(keys: &[u64], params: &TunedParams) -> SortStats {
        let mut actual: Vec<(u64, usize)> = keys.iter().copied().zip(0..).collect();
        let mut expected = actual.clone();
        expected.sort_by_key(|e| e.0);

        let stats = try_sort_by(&mut actual, |a, b| a.0 < b.0, params).expect("sort");
        assert_eq!(actual, expected, "input_len={} params={:?}", keys.len(), params);
        stats
    }

    #[test]
    fn edge_cases() {
        let cases = [
            vec![],
            vec![42],
            vec![1, 2, 3, 4, 5, 6],
            vec![6, 5, 4, 3, 2, 1],
            vec![7; 128],
            vec![u64::MIN, 1, u64::MAX, 0, u64::MAX - 1, 2],
            vec![5, 5, 3, 3, 1, 1, 4, 4, 2, 2, 0, 0],
        ];

        for case in &cases {
            assert_sorts_like_std(case);
        }
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut calls = 0_usize;
        let mut empty: Vec<u8> = Vec::new();
        let stats = try_sort_by(
            &mut empty,
            |a, b| {
                calls += 1;
                a < b
            },
            &TUNED_PARAMS,
        )
        .expect("sort");
        assert_eq!(stats.merges, 0);

        let mut single = vec![9_u8];
        try_sort_by(
            &mut single,
            |a, b| {
                calls += 1;
                a < b
            },
            &TUNED_PARAMS,
        )
        .expect("sort");
        assert_eq!(single, vec![9]);
        assert_eq!(calls, 0);
    }

    #[test]
    fn small_unsorted_input() {
        let mut v = vec![5, 3, 4, 1, 2];
        sort(&mut v);
        assert_eq!(v, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sorted_input_is_one_run() {
        let mut v = vec![1, 2, 3, 4, 5];
        let stats = try_sort_by(&mut v, |a, b| a < b, &TUNED_PARAMS).expect("sort");
        assert_eq!(v, vec![1, 2, 3, 4, 5]);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.merges, 0);
    }

    #[test]
    fn descending_input_is_reversed() {
        let mut v = vec![5, 4, 3, 2, 1];
        let stats = try_sort_by(&mut v, |a, b| a < b, &TUNED_PARAMS).expect("sort");
        assert_eq!(v, vec![1, 2, 3, 4, 5]);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.merges, 0);
    }

    #[test]
    fn long_monotone_inputs_take_linear_comparisons() {
        let n = 100_000_usize;
        for descending in [false, true] {
            let mut v: Vec<usize> = (0..n).collect();
            if descending {
                v.reverse();
            }
            let mut calls = 0_usize;
            let stats = try_sort_by(
                &mut v,
                |a, b| {
                    calls += 1;
                    a < b
                },
                &TUNED_PARAMS,
            )
            .expect("sort");
            assert!(v.iter().copied().eq(0..n));
            assert_eq!(stats.runs, 1);
            assert_eq!(stats.merges, 0);
            assert_eq!(calls, n - 1);
        }
    }

    #[test]
    fn ten_thousand_random_integers() {
        let mut rng = default_rng();
        let data: Vec<u64> = (0..10_000).map(|_| rng.random::<u64>()).collect();
        assert_sorts_like_std(&data);
    }

    #[test]
    fn floats_by_integer_part_are_stable() {
        let mut v = vec![1.2_f64, 1.1, 0.4, 0.1];
        sort_by(&mut v, |a, b| a.floor() < b.floor());
        assert_eq!(v, vec![0.4, 0.1, 1.2, 1.1]);
    }

    #[test]
    fn sorted_blocks_then_reversed_blocks() {
        for len in [64_usize, 500, 4096, 50_000] {
            let data = generate(Pattern::BlocksThenReversedBlocks, len, len as u64);
            assert_sorts_like_std(&data);
            let keys: Vec<u64> = data.iter().map(|x| x % 64).collect();
            assert_stable(&keys, &TUNED_PARAMS);
        }
    }

    #[test]
    fn every_pattern_is_sorted_and_stable() {
        for &pattern in &ALL_PATTERNS {
            for len in [2_usize, 17, 100, 1000, 20_000] {
                let data = generate(pattern, len, 0xC0FF_EE00);
                assert_sorts_like_std(&data);
                let keys: Vec<u64> = data.iter().map(|x| x % 97).collect();
                assert_stable(&keys, &TUNED_PARAMS);
            }
        }
    }

    #[test]
    fn min_run_boundary() {
        let mut rng = StdRng::seed_from_u64(0x0031_0033);
        for len in [31_usize, 32, 33, 63, 64, 65] {
            let keys: Vec<u64> = (0..len).map(|_| rng.random_range(0..8)).collect();
            let stats = assert_stable(&keys, &TUNED_PARAMS);
            if len < 32 {
                assert_eq!(stats.merges, 0, "len={len}");
            } else {
                assert!(stats.runs >= 2, "len={len} runs={}", stats.runs);
                assert_eq!(stats.merges, stats.runs - 1, "len={len}");
            }
        }
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        let mut v = generate(Pattern::RandomUniform, 5000, 11);
        sort(&mut v);
        let once = v.clone();
        let stats = try_sort_by(&mut v, |a, b| a < b, &TUNED_PARAMS).expect("sort");
        assert_eq!(v, once);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.merges, 0);
    }

    #[test]
    fn fixed_seed_random_cases() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        for &size in &[2_usize, 3, 8, 31, 32, 63, 64, 127, 128, 511, 2048, 65_537] {
            let data: Vec<u64> = (0..size).map(|_| rng.random::<u64>()).collect();
            assert_sorts_like_std(&data);
        }
    }

    #[test]
    fn fixed_seed_many_duplicates_are_stable() {
        let mut rng = StdRng::seed_from_u64(0xD0D1_2026);
        for &size in &[64_usize, 1024, 4096, 30_000] {
            let keys: Vec<u64> = (0..size).map(|_| rng.random_range(0..16)).collect();
            assert_stable(&keys, &TUNED_PARAMS);
        }
    }

    #[test]
    fn skewed_merges_gallop() {
        // Runs of 1000 from disjoint, descending key bands: every merge sees
        // one side win outright.
        let mut data = Vec::new();
        for band in (0..8_u64).rev() {
            data.extend((0..1000).map(|i| band * 10_000 + i));
        }
        let mut v = data.clone();
        let stats = try_sort_by(&mut v, |a, b| a < b, &TUNED_PARAMS).expect("sort");
        data.sort();
        assert_eq!(v, data);
        assert_eq!(stats.runs, 8);
        assert_eq!(stats.merges, 7);
        assert!(stats.gallop_phases > 0);
    }

    #[test]
    fn custom_params() {
        let keys = generate(Pattern::FewUnique, 3000, 5);
        for params in [
            TunedParams {
                min_merge: 2,
                min_gallop: 1,
            },
            TunedParams {
                min_merge: 4,
                min_gallop: 3,
            },
            TunedParams {
                min_merge: 64,
                min_gallop: 7,
            },
            TunedParams {
                min_merge: 10_000,
                min_gallop: 100,
            },
        ] {
            let stats = assert_stable(&keys, &params);
            if params.min_merge > keys.len() {
                assert_eq!(stats.merges, 0);
            }
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut v = vec![3, 1, 2];
        let err = try_sort_by(
            &mut v,
            |a, b| a < b,
            &TunedParams {
                min_merge: 1,
                min_gallop: 7,
            },
        )
        .unwrap_err();
        assert_eq!(err, SortError::InvalidParams("min_merge must be at least 2"));

        let err = try_sort_by(
            &mut v,
            |a, b| a < b,
            &TunedParams {
                min_merge: 32,
                min_gallop: 0,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("min_gallop"));
        assert_eq!(v, vec![3, 1, 2]);
        assert_eq!(TunedParams::default(), TUNED_PARAMS);
    }

    #[test]
    fn allocation_error_reports_length() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = SortError::BufferAllocation { len: 12, source };
        assert!(err.to_string().starts_with("failed to allocate merge buffer for 12 elements"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn sort_by_key_and_descending_order() {
        let mut words = vec!["pear", "fig", "banana", "kiwi", "apple", "plum"];
        sort_by_key(&mut words, |w| w.len());
        assert_eq!(words, vec!["fig", "pear", "kiwi", "plum", "apple", "banana"]);

        let mut v = generate(Pattern::RandomUniform, 3000, 9);
        sort_by(&mut v, |a, b| a > b);
        assert!(v.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn custom_comparator_type() {
        struct ByLength;
        impl Comparator<String> for ByLength {
            fn lt(&mut self, a: &String, b: &String) -> bool {
                a.len() < b.len()
            }
        }

        let mut v: Vec<String> = ["ccc", "a", "bb", "dd", "e", "fff"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_with(&mut v, ByLength);
        assert_eq!(v, vec!["a", "e", "bb", "dd", "ccc", "fff"]);
    }

    #[test]
    fn heap_owning_elements_survive() {
        let mut v: Vec<String> = generate(Pattern::Sawtooth, 2000, 1)
            .into_iter()
            .map(|x| format!("{x:05}"))
            .collect();
        let mut expected = v.clone();
        expected.sort();
        sort(&mut v);
        assert_eq!(v, expected);
    }

    #[test]
    fn inconsistent_comparator_keeps_every_element() {
        let marker = Rc::new(());
        let mut rng = StdRng::seed_from_u64(0xBAD_C0DE);
        let mut v: Vec<(u64, Rc<()>)> = generate(Pattern::RandomUniform, 5000, 2)
            .into_iter()
            .map(|x| (x, Rc::clone(&marker)))
            .collect();
        let mut before: Vec<u64> = v.iter().map(|e| e.0).collect();

        sort_by(&mut v, |_, _| rng.random::<bool>());

        assert_eq!(Rc::strong_count(&marker), 5001);
        let mut after: Vec<u64> = v.iter().map(|e| e.0).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn panicking_comparator_keeps_every_element() {
        let marker = Rc::new(());
        for panic_after in [1_usize, 100, 5_000, 15_000] {
            let calls = Cell::new(0_usize);
            let mut v: Vec<(u64, Rc<()>)> = generate(Pattern::BlocksThenReversedBlocks, 8000, 3)
                .into_iter()
                .map(|x| (x, Rc::clone(&marker)))
                .collect();
            let mut before: Vec<u64> = v.iter().map(|e| e.0).collect();

            let result = catch_unwind(AssertUnwindSafe(|| {
                sort_by(&mut v, |a, b| {
                    calls.set(calls.get() + 1);
                    if calls.get() == panic_after {
                        panic!("comparator gave up");
                    }
                    a.0 < b.0
                });
            }));
            assert!(result.is_err(), "panic_after={panic_after} calls={}", calls.get());

            assert_eq!(Rc::strong_count(&marker), 8001);
            let mut after: Vec<u64> = v.iter().map(|e| e.0).collect();
            before.sort();
            after.sort();
            assert_eq!(before, after);
        }
    }
}
