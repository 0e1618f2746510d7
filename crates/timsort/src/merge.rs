use std::ptr;
use std::slice;

use crate::SortError;
use crate::compare::Comparator;
use crate::gallop::{gallop_left, gallop_right};

/// Merge bookkeeping that lives for one sort call.
#[derive(Debug)]
pub(crate) struct MergeState {
    /// Consecutive wins needed before a merge switches to galloping.
    pub min_gallop: usize,
    /// Block size a gallop must reach for galloping mode to continue.
    gallop_threshold: usize,
    pub gallop_phases: usize,
}

impl MergeState {
    pub fn new(min_gallop: usize) -> Self {
        Self {
            min_gallop,
            gallop_threshold: min_gallop,
            gallop_phases: 0,
        }
    }

    /// Merges the non-decreasing runs `v[..mid]` and `v[mid..]` in place.
    ///
    /// Elements at the front of the left run and at the back of the right run
    /// that are already in their final position are located by galloping and
    /// left untouched. The rest is merged through a buffer the size of the
    /// shorter remaining run.
    pub fn merge<T, C>(&mut self, v: &mut [T], mid: usize, cmp: &mut C) -> Result<(), SortError>
    where
        C: Comparator<T>,
    {
        let len = v.len();
        assert!(
            mid > 0 && mid < len,
            "merge split {} outside a slice of {}",
            mid,
            len
        );

        let skip = gallop_right(&v[mid], &v[..mid], 0, cmp);
        if skip == mid {
            return Ok(());
        }
        let keep = gallop_left(&v[mid - 1], &v[mid..], len - mid - 1, cmp);
        if keep == 0 {
            return Ok(());
        }

        let v = &mut v[skip..mid + keep];
        let mid = mid - skip;
        if mid <= keep {
            self.merge_lo(v, mid, cmp)
        } else {
            self.merge_hi(v, mid, cmp)
        }
    }

    /// Left-to-right merge with the left run moved into the buffer.
    ///
    /// Requires `v[mid] < v[0]` and `v[mid - 1] > v[len - 1]`, which the
    /// trimming in [`MergeState::merge`] establishes.
    fn merge_lo<T, C>(&mut self, v: &mut [T], mid: usize, cmp: &mut C) -> Result<(), SortError>
    where
        C: Comparator<T>,
    {
        let len = v.len();
        debug_assert!(mid > 0 && mid <= len - mid);

        let mut buf = allocate::<T>(mid)?;
        let base = v.as_mut_ptr();
        // SAFETY: `buf` has room for `mid` elements and does not overlap `v`.
        // After the copy `v[..mid]` is the hole, tracked by `hole` until it is
        // dropped, which happens before `buf` is freed.
        let mut hole = unsafe {
            ptr::copy_nonoverlapping(base, buf.as_mut_ptr(), mid);
            MergeLoHole {
                left: buf.as_mut_ptr(),
                left_len: mid,
                right: base.add(mid),
                right_len: len - mid,
                dest: base,
            }
        };

        // The head of the right run is the smallest element of both.
        unsafe { hole.take_right(1) };
        if hole.right_len == 0 || hole.left_len == 1 {
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        loop {
            if self.merge_lo_limited(&mut hole, min_gallop, cmp) {
                break;
            }
            self.gallop_phases += 1;
            if self.merge_lo_galloping(&mut hole, &mut min_gallop, cmp) {
                break;
            }
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);
        Ok(())
    }

    /// One element at a time until a side wins `min_gallop` times in a row.
    /// Returns `true` once the merge is finished.
    fn merge_lo_limited<T, C>(
        &self,
        hole: &mut MergeLoHole<T>,
        min_gallop: usize,
        cmp: &mut C,
    ) -> bool
    where
        C: Comparator<T>,
    {
        let mut left_wins = 0_usize;
        let mut right_wins = 0_usize;
        loop {
            debug_assert!(hole.left_len > 1 && hole.right_len > 0);
            // SAFETY: both runs are non-empty, see the assertion above.
            unsafe {
                if cmp.lt(hole.right_head(), hole.left_head()) {
                    hole.take_right(1);
                    right_wins += 1;
                    left_wins = 0;
                    if hole.right_len == 0 {
                        return true;
                    }
                } else {
                    hole.take_left(1);
                    left_wins += 1;
                    right_wins = 0;
                    if hole.left_len == 1 {
                        return true;
                    }
                }
            }
            if (left_wins | right_wins) >= min_gallop {
                return false;
            }
        }
    }

    /// Block copies located by galloping, until neither side produces a
    /// block of `gallop_threshold` elements. Returns `true` once the merge is
    /// finished.
    fn merge_lo_galloping<T, C>(
        &self,
        hole: &mut MergeLoHole<T>,
        min_gallop: &mut usize,
        cmp: &mut C,
    ) -> bool
    where
        C: Comparator<T>,
    {
        loop {
            debug_assert!(hole.left_len > 1 && hole.right_len > 0);
            // SAFETY: every take is bounded by the length it was galloped
            // over, and each side is checked for exhaustion before its head
            // is read again.
            unsafe {
                let left_count = gallop_right(hole.right_head(), hole.left_run(), 0, cmp);
                if left_count != 0 {
                    hole.take_left(left_count);
                    if hole.left_len <= 1 {
                        return true;
                    }
                }
                hole.take_right(1);
                if hole.right_len == 0 {
                    return true;
                }

                let right_count = gallop_left(hole.left_head(), hole.right_run(), 0, cmp);
                if right_count != 0 {
                    hole.take_right(right_count);
                    if hole.right_len == 0 {
                        return true;
                    }
                }
                hole.take_left(1);
                if hole.left_len == 1 {
                    return true;
                }

                *min_gallop = min_gallop.saturating_sub(1);
                if left_count < self.gallop_threshold && right_count < self.gallop_threshold {
                    return false;
                }
            }
        }
    }

    /// Right-to-left merge with the right run moved into the buffer.
    ///
    /// Same preconditions as [`MergeState::merge_lo`].
    fn merge_hi<T, C>(&mut self, v: &mut [T], mid: usize, cmp: &mut C) -> Result<(), SortError>
    where
        C: Comparator<T>,
    {
        let len = v.len();
        debug_assert!(mid < len && len - mid < mid);

        let right_len = len - mid;
        let mut buf = allocate::<T>(right_len)?;
        let base = v.as_mut_ptr();
        // SAFETY: as in `merge_lo`, with `v[mid..]` as the initial hole.
        let mut hole = unsafe {
            ptr::copy_nonoverlapping(base.add(mid), buf.as_mut_ptr(), right_len);
            MergeHiHole {
                left: base,
                left_len: mid,
                right: buf.as_mut_ptr(),
                right_len,
            }
        };

        // The tail of the left run is the largest element of both.
        unsafe { hole.take_left(1) };
        if hole.left_len == 0 || hole.right_len == 1 {
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        loop {
            if self.merge_hi_limited(&mut hole, min_gallop, cmp) {
                break;
            }
            self.gallop_phases += 1;
            if self.merge_hi_galloping(&mut hole, &mut min_gallop, cmp) {
                break;
            }
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);
        Ok(())
    }

    fn merge_hi_limited<T, C>(
        &self,
        hole: &mut MergeHiHole<T>,
        min_gallop: usize,
        cmp: &mut C,
    ) -> bool
    where
        C: Comparator<T>,
    {
        let mut left_wins = 0_usize;
        let mut right_wins = 0_usize;
        loop {
            debug_assert!(hole.left_len > 0 && hole.right_len > 1);
            // SAFETY: both runs are non-empty.
            unsafe {
                if cmp.lt(hole.right_tail(), hole.left_tail()) {
                    hole.take_left(1);
                    left_wins += 1;
                    right_wins = 0;
                    if hole.left_len == 0 {
                        return true;
                    }
                } else {
                    hole.take_right(1);
                    right_wins += 1;
                    left_wins = 0;
                    if hole.right_len == 1 {
                        return true;
                    }
                }
            }
            if (left_wins | right_wins) >= min_gallop {
                return false;
            }
        }
    }

    fn merge_hi_galloping<T, C>(
        &self,
        hole: &mut MergeHiHole<T>,
        min_gallop: &mut usize,
        cmp: &mut C,
    ) -> bool
    where
        C: Comparator<T>,
    {
        loop {
            debug_assert!(hole.left_len > 0 && hole.right_len > 1);
            // SAFETY: same reasoning as `merge_lo_galloping`, from the back.
            unsafe {
                let left_count = hole.left_len
                    - gallop_right(hole.right_tail(), hole.left_run(), hole.left_len - 1, cmp);
                if left_count != 0 {
                    hole.take_left(left_count);
                    if hole.left_len == 0 {
                        return true;
                    }
                }
                hole.take_right(1);
                if hole.right_len == 1 {
                    return true;
                }

                let right_count = hole.right_len
                    - gallop_left(hole.left_tail(), hole.right_run(), hole.right_len - 1, cmp);
                if right_count != 0 {
                    hole.take_right(right_count);
                    if hole.right_len <= 1 {
                        return true;
                    }
                }
                hole.take_left(1);
                if hole.left_len == 0 {
                    return true;
                }

                *min_gallop = min_gallop.saturating_sub(1);
                if left_count < self.gallop_threshold && right_count < self.gallop_threshold {
                    return false;
                }
            }
        }
    }
}

fn allocate<T>(len: usize) -> Result<Vec<T>, SortError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| SortError::BufferAllocation { len, source })?;
    Ok(buf)
}

/// State of a left-to-right merge.
///
/// The unmerged left run sits in the buffer at `left`, the unmerged right run
/// in the slice at `right`, and the `left_len` slots starting at `dest` are
/// free, so `dest + left_len == right` at all times.
///
/// Dropping it moves the rest of the right run to `dest` and the rest of the
/// buffer after it. That is the final step of the merge when the left run is
/// down to its maximum (or the right run is empty), and keeps every element
/// in the slice exactly once if the comparator panics.
struct MergeLoHole<T> {
    left: *mut T,
    left_len: usize,
    right: *mut T,
    right_len: usize,
    dest: *mut T,
}

impl<T> MergeLoHole<T> {
    unsafe fn left_head<'a>(&self) -> &'a T {
        unsafe { &*self.left }
    }

    unsafe fn right_head<'a>(&self) -> &'a T {
        unsafe { &*self.right }
    }

    unsafe fn left_run<'a>(&self) -> &'a [T] {
        unsafe { slice::from_raw_parts(self.left, self.left_len) }
    }

    unsafe fn right_run<'a>(&self) -> &'a [T] {
        unsafe { slice::from_raw_parts(self.right, self.right_len) }
    }

    unsafe fn take_left(&mut self, count: usize) {
        debug_assert!(count <= self.left_len);
        unsafe {
            ptr::copy_nonoverlapping(self.left, self.dest, count);
            self.left = self.left.add(count);
            self.dest = self.dest.add(count);
        }
        self.left_len -= count;
    }

    unsafe fn take_right(&mut self, count: usize) {
        debug_assert!(count <= self.right_len);
        unsafe {
            ptr::copy(self.right, self.dest, count);
            self.right = self.right.add(count);
            self.dest = self.dest.add(count);
        }
        self.right_len -= count;
    }
}

impl<T> Drop for MergeLoHole<T> {
    fn drop(&mut self) {
        // SAFETY: the right run ends where the merged range ends, and the hole
        // in front of it is exactly `left_len` long.
        unsafe {
            ptr::copy(self.right, self.dest, self.right_len);
            ptr::copy_nonoverlapping(self.left, self.dest.add(self.right_len), self.left_len);
        }
    }
}

/// State of a right-to-left merge.
///
/// The unmerged left run is `left[..left_len]` in the slice, the unmerged
/// right run is `right[..right_len]` in the buffer, and the hole is the
/// `right_len` slots that follow the left run.
///
/// Dropping it shifts the left run to the end of the range and moves the
/// buffer in front of it, which finishes the merge when the buffer is down to
/// its minimum (or the left run is empty).
struct MergeHiHole<T> {
    left: *mut T,
    left_len: usize,
    right: *mut T,
    right_len: usize,
}

impl<T> MergeHiHole<T> {
    unsafe fn left_tail<'a>(&self) -> &'a T {
        unsafe { &*self.left.add(self.left_len - 1) }
    }

    unsafe fn right_tail<'a>(&self) -> &'a T {
        unsafe { &*self.right.add(self.right_len - 1) }
    }

    unsafe fn left_run<'a>(&self) -> &'a [T] {
        unsafe { slice::from_raw_parts(self.left, self.left_len) }
    }

    unsafe fn right_run<'a>(&self) -> &'a [T] {
        unsafe { slice::from_raw_parts(self.right, self.right_len) }
    }

    unsafe fn take_left(&mut self, count: usize) {
        debug_assert!(count <= self.left_len);
        unsafe {
            let src = self.left.add(self.left_len - count);
            ptr::copy(src, src.add(self.right_len), count);
        }
        self.left_len -= count;
    }

    unsafe fn take_right(&mut self, count: usize) {
        debug_assert!(count <= self.right_len);
        let remaining = self.right_len - count;
        unsafe {
            ptr::copy_nonoverlapping(
                self.right.add(remaining),
                self.left.add(self.left_len + remaining),
                count,
            );
        }
        self.right_len = remaining;
    }
}

impl<T> Drop for MergeHiHole<T> {
    fn drop(&mut self) {
        // SAFETY: `left[..left_len + right_len]` is the unmerged part of the
        // range, the buffer holds the `right_len` elements missing from it.
        unsafe {
            ptr::copy(self.left, self.left.add(self.right_len), self.left_len);
            ptr::copy_nonoverlapping(self.right, self.left, self.right_len);
        }
    }
}
