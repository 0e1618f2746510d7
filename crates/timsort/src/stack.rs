/// A pending run: `len` non-decreasing elements starting at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub start: usize,
    pub len: usize,
}

impl Run {
    #[inline]
    pub fn end(self) -> usize {
        self.start + self.len
    }
}

/// Runs that are sorted but not merged yet, leftmost at the bottom.
///
/// Consecutive entries are always adjacent in the slice. Once
/// [`RunStack::collapse_index`] returns `None`, every entry satisfies
/// `len[i] > len[i + 1] + len[i + 2]` and `len[i + 1] > len[i + 2]`, so the
/// lengths grow at least as fast as the Fibonacci numbers and the height
/// stays logarithmic in the slice length.
#[derive(Debug, Default)]
pub(crate) struct RunStack {
    runs: Vec<Run>,
}

impl RunStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// The run `depth` entries below the top, `0` being the top.
    #[inline]
    pub fn peek(&self, depth: usize) -> Option<Run> {
        let n = self.runs.len();
        if depth < n {
            Some(self.runs[n - 1 - depth])
        } else {
            None
        }
    }

    pub fn push(&mut self, run: Run) {
        assert!(run.len > 0, "empty run pushed at {}", run.start);
        if let Some(top) = self.runs.last() {
            assert_eq!(
                top.end(),
                run.start,
                "run {:?} is not adjacent to the stack top {:?}",
                run,
                top
            );
        }
        self.runs.push(run);
    }

    /// Index `i` such that `runs[i]` and `runs[i + 1]` must be merged before
    /// the next run is pushed, or `None` if the length invariant holds.
    ///
    /// The top four entries are inspected: checking only three lets the
    /// invariant break deeper in the stack.
    pub fn collapse_index(&self) -> Option<usize> {
        let n = self.runs.len();
        if n < 2 {
            return None;
        }
        let len = |i: usize| self.runs[i].len;

        let cond_a = n >= 3 && len(n - 3) <= len(n - 2) + len(n - 1);
        let cond_b = n >= 4 && len(n - 4) <= len(n - 3) + len(n - 2);
        if cond_a || cond_b {
            return Some(self.pick_pair());
        }
        if len(n - 2) <= len(n - 1) {
            return Some(n - 2);
        }
        None
    }

    /// Next pair to merge once the input is exhausted.
    pub fn force_collapse_index(&self) -> Option<usize> {
        if self.runs.len() < 2 {
            None
        } else {
            Some(self.pick_pair())
        }
    }

    fn pick_pair(&self) -> usize {
        let n = self.runs.len();
        if n >= 3 && self.runs[n - 3].len < self.runs[n - 1].len {
            n - 3
        } else {
            n - 2
        }
    }

    /// Replaces `runs[i]` and `runs[i + 1]` by their union and returns the
    /// two runs as they were.
    pub fn merge_at(&mut self, i: usize) -> (Run, Run) {
        let n = self.runs.len();
        assert!(n >= 2, "merge requested on a stack of {} runs", n);
        assert!(
            i + 2 == n || i + 3 == n,
            "merge index {} is not one of the top pairs of {} runs",
            i,
            n
        );

        let lhs = self.runs[i];
        let rhs = self.runs[i + 1];
        assert!(lhs.len > 0 && rhs.len > 0);
        assert_eq!(lhs.end(), rhs.start, "runs {:?} and {:?} are not adjacent", lhs, rhs);

        self.runs[i].len = lhs.len + rhs.len;
        self.runs.remove(i + 1);
        (lhs, rhs)
    }
}
