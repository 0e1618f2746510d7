use log::trace;

use crate::compare::Comparator;
use crate::merge::MergeState;
use crate::runs::{binary_insertion_sort, count_run_and_make_ascending, min_run_length};
use crate::stack::{Run, RunStack};
use crate::{SortError, SortStats, TunedParams};

pub(crate) fn sort<T, C>(
    v: &mut [T],
    cmp: &mut C,
    params: &TunedParams,
) -> Result<SortStats, SortError>
where
    C: Comparator<T>,
{
    params.validate()?;

    let n = v.len();
    let mut stats = SortStats {
        runs: 0,
        merges: 0,
        gallop_phases: 0,
        min_gallop: params.min_gallop,
    };
    if n < 2 {
        stats.runs = n;
        return Ok(stats);
    }

    // Too short to be worth merging: one run plus insertion sort.
    if n < params.min_merge {
        let run_len = count_run_and_make_ascending(v, cmp);
        binary_insertion_sort(v, run_len, cmp);
        stats.runs = 1;
        trace!("timsort: len={} insertion only, leading run={}", n, run_len);
        return Ok(stats);
    }

    let min_run = min_run_length(n, params.min_merge);
    let mut stack = RunStack::with_capacity(64);
    let mut merger = MergeState::new(params.min_gallop);

    let mut start = 0_usize;
    while start < n {
        let tail = &mut v[start..];
        let mut run_len = count_run_and_make_ascending(tail, cmp);
        if run_len < min_run {
            let force = min_run.min(tail.len());
            binary_insertion_sort(&mut tail[..force], run_len, cmp);
            run_len = force;
        }

        stack.push(Run {
            start,
            len: run_len,
        });
        stats.runs += 1;
        start += run_len;

        while let Some(i) = stack.collapse_index() {
            merge_at(v, &mut stack, i, &mut merger, cmp)?;
            stats.merges += 1;
        }
    }

    while let Some(i) = stack.force_collapse_index() {
        merge_at(v, &mut stack, i, &mut merger, cmp)?;
        stats.merges += 1;
    }
    assert_eq!(stack.peek(0), Some(Run { start: 0, len: n }));
    assert_eq!(stack.len(), 1);

    stats.gallop_phases = merger.gallop_phases;
    stats.min_gallop = merger.min_gallop;
    trace!(
        "timsort: len={} min_run={} runs={} merges={} gallop_phases={} min_gallop={}",
        n,
        min_run,
        stats.runs,
        stats.merges,
        stats.gallop_phases,
        stats.min_gallop
    );
    Ok(stats)
}

fn merge_at<T, C>(
    v: &mut [T],
    stack: &mut RunStack,
    i: usize,
    merger: &mut MergeState,
    cmp: &mut C,
) -> Result<(), SortError>
where
    C: Comparator<T>,
{
    let (lhs, rhs) = stack.merge_at(i);
    merger.merge(&mut v[lhs.start..rhs.end()], lhs.len, cmp)
}
