use crate::compare::Comparator;

/// Leftmost insertion point of `key` in the sorted `run`: every element
/// before the result is less than `key`, every element from it on is not.
///
/// The search starts at `hint` and costs `O(log d)` comparisons, where `d` is
/// the distance between `hint` and the result.
pub(crate) fn gallop_left<T, C>(key: &T, run: &[T], hint: usize, cmp: &mut C) -> usize
where
    C: Comparator<T>,
{
    gallop(run, hint, |x| cmp.gt(key, x))
}

/// Rightmost insertion point of `key` in the sorted `run`: every element
/// before the result is less than or equivalent to `key`, every element from
/// it on is greater.
pub(crate) fn gallop_right<T, C>(key: &T, run: &[T], hint: usize, cmp: &mut C) -> usize
where
    C: Comparator<T>,
{
    gallop(run, hint, |x| cmp.ge(key, x))
}

/// Partition point of `run` for a predicate that holds on a prefix of it.
///
/// Offsets from `hint` grow as 1, 3, 7, ... until the boundary is bracketed
/// by `hint ± last_ofs` and `hint ± ofs`; the bracket is then binary searched.
fn gallop<T, P>(run: &[T], hint: usize, mut before: P) -> usize
where
    P: FnMut(&T) -> bool,
{
    let len = run.len();
    assert!(hint < len, "gallop hint {} outside run of {}", hint, len);

    let mut last_ofs = 0_usize;
    let mut ofs = 1_usize;
    let (mut lo, mut hi) = if before(&run[hint]) {
        // before(run[hint + last_ofs]) && !before(run[hint + ofs])
        let max_ofs = len - hint;
        while ofs < max_ofs && before(&run[hint + ofs]) {
            last_ofs = ofs;
            ofs = next_offset(ofs, max_ofs);
        }
        (hint + last_ofs + 1, hint + ofs)
    } else {
        // before(run[hint - ofs]) && !before(run[hint - last_ofs])
        let max_ofs = hint + 1;
        while ofs < max_ofs && !before(&run[hint - ofs]) {
            last_ofs = ofs;
            ofs = next_offset(ofs, max_ofs);
        }
        (hint + 1 - ofs, hint - last_ofs)
    };
    debug_assert!(lo <= hi && hi <= len);

    while lo < hi {
        let mid = lo + ((hi - lo) >> 1);
        if before(&run[mid]) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    hi
}

#[inline]
fn next_offset(ofs: usize, max_ofs: usize) -> usize {
    match ofs.checked_mul(2) {
        Some(doubled) => (doubled + 1).min(max_ofs),
        None => max_ofs,
    }
}
