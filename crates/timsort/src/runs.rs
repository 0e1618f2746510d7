use crate::compare::Comparator;

/// Minimum run length for a sequence of `n` elements.
///
/// `n` is halved until it drops below `min_merge`, and any bit shifted out
/// along the way rounds the result up by one. For `n >= min_merge` the result
/// lies in `[min_merge / 2, min_merge]` and `n / min_run` is close to, but not
/// above, a power of two, which keeps the final merges balanced.
pub(crate) fn min_run_length(mut n: usize, min_merge: usize) -> usize {
    debug_assert!(min_merge >= 2);
    let mut r = 0_usize;
    while n >= min_merge {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Length of the run starting at `v[0]`.
///
/// A strictly descending run is reversed in place before returning, so the
/// caller always sees a non-decreasing prefix. Equal neighbours end a
/// descending run, which is what keeps the reversal stable.
pub(crate) fn count_run_and_make_ascending<T, C>(v: &mut [T], cmp: &mut C) -> usize
where
    C: Comparator<T>,
{
    let n = v.len();
    if n < 2 {
        return n;
    }

    let mut end = 2_usize;
    if cmp.lt(&v[1], &v[0]) {
        while end < n && cmp.lt(&v[end], &v[end - 1]) {
            end += 1;
        }
        v[..end].reverse();
    } else {
        while end < n && cmp.ge(&v[end], &v[end - 1]) {
            end += 1;
        }
    }

    end
}

/// Sorts `v` assuming `v[..sorted]` is already non-decreasing.
///
/// Each further element is placed with an upper-bound binary search over the
/// sorted prefix, so it lands after every element it compares equal to, and
/// is moved there with one block rotation.
pub(crate) fn binary_insertion_sort<T, C>(v: &mut [T], sorted: usize, cmp: &mut C)
where
    C: Comparator<T>,
{
    let n = v.len();
    debug_assert!(sorted <= n);

    for i in sorted.max(1)..n {
        let mut left = 0_usize;
        let mut right = i;
        while left < right {
            let mid = left + ((right - left) >> 1);
            if cmp.lt(&v[i], &v[mid]) {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        if left < i {
            v[left..=i].rotate_right(1);
        }
    }
}
