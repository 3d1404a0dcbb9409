//! This module contains the interval arithmetic the whole engine is built on.
//! Transitions never enumerate single code points; they carry sets of
//! half-open integer ranges, so the alphabet partitioning scales
//! independently of the size of the code point space.

/// The lower bound of the finite universe all sets live in.
pub const UNIVERSE_START: u32 = u32::MIN;
/// The exclusive upper bound of the finite universe. Wide enough to contain
/// every Unicode scalar value with plenty of headroom.
pub const UNIVERSE_END: u32 = u32::MAX;

/// A half-open range `[start, end)` over code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: u32,
    end: u32,
}

impl Interval {
    /// Create a new interval. An interval with `end < start` is a programming
    /// error, not an input error, and fails loudly.
    pub fn new(start: u32, end: u32) -> Self {
        assert!(end >= start, "malformed interval [{}, {})", start, end);
        Interval { start, end }
    }

    /// The inclusive lower bound.
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// The exclusive upper bound.
    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// The number of code points covered by the interval.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the interval covers no code point at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the given code point lies inside the interval.
    #[inline]
    pub fn contains(&self, code: u32) -> bool {
        self.start <= code && code < self.end
    }
}

/// The result of decomposing two sets into the parts only in the left set,
/// the parts in both, and the parts only in the right set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSplit {
    /// `A \ B`
    pub left_difference: IntervalSet,
    /// `A ∩ B`
    pub intersection: IntervalSet,
    /// `B \ A`
    pub right_difference: IntervalSet,
}

/// An ascending, pairwise-disjoint, non-adjacent sequence of intervals.
/// Two ranges never overlap and never touch a boundary; abutting insertions
/// are merged into one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set covering the whole universe.
    pub fn universe() -> Self {
        IntervalSet {
            intervals: vec![Interval::new(UNIVERSE_START, UNIVERSE_END)],
        }
    }

    /// Returns true if the set contains no code point.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The stored intervals, ascending and disjoint.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Returns true if the given code point is a member of the set.
    pub fn contains(&self, code: u32) -> bool {
        self.intervals
            .binary_search_by(|iv| {
                if iv.end <= code {
                    std::cmp::Ordering::Less
                } else if iv.start > code {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// The total number of code points in the set.
    pub fn cardinality(&self) -> u64 {
        self.intervals.iter().map(|iv| iv.len() as u64).sum()
    }

    /// Insert a single code point.
    pub fn add_code(&mut self, code: u32) {
        self.add(Interval::new(code, code + 1));
    }

    /// Insert an interval, merging it with every interval it overlaps or
    /// abuts. The insertion boundaries are located by binary search and the
    /// covered range is spliced out and replaced by one merged interval.
    pub fn add(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        // First interval whose end reaches the insertion start (abutting
        // neighbors count as covered and get merged).
        let lo = self.intervals.partition_point(|iv| iv.end < interval.start);
        // One past the last interval whose start still touches the insertion
        // end.
        let hi = self.intervals.partition_point(|iv| iv.start <= interval.end);
        if lo == hi {
            self.intervals.insert(lo, interval);
            return;
        }
        let start = interval.start.min(self.intervals[lo].start);
        let end = interval.end.max(self.intervals[hi - 1].end);
        self.intervals
            .splice(lo..hi, std::iter::once(Interval::new(start, end)));
    }

    /// The union of two sets. Commutative: the result folds one set's
    /// intervals into a copy of the other via repeated [IntervalSet::add].
    pub fn calculate_union(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = self.clone();
        for iv in &other.intervals {
            result.add(*iv);
        }
        result
    }

    /// The complement of the set within the finite universe. Walks the
    /// intervals left to right and emits the gaps between them and the two
    /// universe boundaries; the whole universe negates to the empty set.
    pub fn calculate_negation(&self) -> IntervalSet {
        let mut result = IntervalSet::new();
        let mut cursor = UNIVERSE_START;
        for iv in &self.intervals {
            if iv.start > cursor {
                result.add(Interval::new(cursor, iv.start));
            }
            cursor = iv.end;
        }
        if cursor < UNIVERSE_END {
            result.add(Interval::new(cursor, UNIVERSE_END));
        }
        result
    }

    /// Decompose two sets into left-difference, intersection and
    /// right-difference in one linear merge-walk over both interval lists.
    /// Two cursors advance simultaneously; at each step the nearer boundary
    /// decides whether an exclusive fragment or an intersection fragment is
    /// emitted. When one side is exhausted the remainder of the other side is
    /// flushed as pure difference.
    pub fn calculate_differences_and_intersection(&self, other: &IntervalSet) -> SetSplit {
        let mut split = SetSplit::default();
        let mut left_iter = self.intervals.iter().copied();
        let mut right_iter = other.intervals.iter().copied();
        let mut left_cur = left_iter.next();
        let mut right_cur = right_iter.next();

        while let (Some(l), Some(r)) = (left_cur, right_cur) {
            if l.end <= r.start {
                // No overlap, the left interval lies entirely before.
                split.left_difference.add(l);
                left_cur = left_iter.next();
            } else if r.end <= l.start {
                split.right_difference.add(r);
                right_cur = right_iter.next();
            } else {
                // Overlap. Emit the exclusive heads, then the shared part.
                if l.start < r.start {
                    split.left_difference.add(Interval::new(l.start, r.start));
                } else if r.start < l.start {
                    split.right_difference.add(Interval::new(r.start, l.start));
                }
                let shared_end = l.end.min(r.end);
                split
                    .intersection
                    .add(Interval::new(l.start.max(r.start), shared_end));
                left_cur = if l.end > shared_end {
                    Some(Interval::new(shared_end, l.end))
                } else {
                    left_iter.next()
                };
                right_cur = if r.end > shared_end {
                    Some(Interval::new(shared_end, r.end))
                } else {
                    right_iter.next()
                };
            }
        }
        while let Some(l) = left_cur {
            split.left_difference.add(l);
            left_cur = left_iter.next();
        }
        while let Some(r) = right_cur {
            split.right_difference.add(r);
            right_cur = right_iter.next();
        }
        split
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        let mut set = IntervalSet::new();
        for iv in iter {
            set.add(iv);
        }
        set
    }
}

impl std::fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}, {})", iv.start, iv.end)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[(u32, u32)]) -> IntervalSet {
        ranges
            .iter()
            .map(|&(s, e)| Interval::new(s, e))
            .collect()
    }

    fn assert_invariants(s: &IntervalSet) {
        for w in s.intervals().windows(2) {
            assert!(w[0].start < w[0].end, "empty interval stored: {:?}", w[0]);
            assert!(
                w[0].end < w[1].start,
                "intervals overlap or touch: {:?} {:?}",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn add_keeps_sorted_disjoint_non_adjacent() {
        let mut s = IntervalSet::new();
        for &(lo, hi) in &[(10, 20), (30, 40), (0, 5), (19, 31), (50, 50), (41, 45)] {
            s.add(Interval::new(lo, hi));
            assert_invariants(&s);
        }
        // (19,31) bridges the first two ranges; [41,45) stays separate since
        // code point 40 lies between it and [10,40).
        assert_eq!(s, set(&[(0, 5), (10, 40), (41, 45)]));
    }

    #[test]
    fn add_point_merges_with_abutting_neighbors() {
        let mut s = set(&[(0, 5), (6, 10)]);
        s.add_code(5);
        assert_invariants(&s);
        assert_eq!(s.intervals(), [Interval::new(0, 10)]);
    }

    #[test]
    fn contains_uses_half_open_bounds() {
        let s = set(&[(10, 20), (30, 40)]);
        assert!(s.contains(10));
        assert!(s.contains(19));
        assert!(!s.contains(20));
        assert!(!s.contains(25));
        assert!(s.contains(30));
        assert!(!s.contains(40));
    }

    #[test]
    fn union_is_commutative() {
        let cases = [
            (set(&[(0, 10)]), set(&[(5, 15)])),
            (set(&[(0, 1), (2, 3)]), set(&[(1, 2)])),
            (IntervalSet::new(), set(&[(7, 9)])),
            (set(&[(0, 100)]), IntervalSet::new()),
        ];
        for (a, b) in &cases {
            let ab = a.calculate_union(b);
            let ba = b.calculate_union(a);
            assert_eq!(ab, ba);
            assert_invariants(&ab);
        }
    }

    #[test]
    fn negation_roundtrips_for_inner_sets() {
        let cases = [
            set(&[(10, 20), (30, 40)]),
            set(&[(1, 2)]),
            set(&[(100, 1000), (2000, 3000), (4000, 4001)]),
        ];
        for a in &cases {
            let n = a.calculate_negation();
            assert_invariants(&n);
            assert_eq!(&n.calculate_negation(), a);
        }
    }

    #[test]
    fn negation_of_universe_is_empty() {
        assert!(IntervalSet::universe().calculate_negation().is_empty());
        assert_eq!(IntervalSet::new().calculate_negation(), IntervalSet::universe());
    }

    #[test]
    fn differences_and_intersection_partition_both_sides() {
        let cases = [
            (set(&[(0, 10), (20, 30)]), set(&[(5, 25)])),
            (set(&[(0, 10)]), set(&[(10, 20)])),
            (set(&[(0, 100)]), set(&[(10, 20), (30, 40)])),
            (set(&[(1, 2), (3, 4)]), set(&[(1, 2), (3, 4)])),
            (set(&[(0, 5)]), IntervalSet::new()),
        ];
        for (a, b) in &cases {
            let split = a.calculate_differences_and_intersection(b);
            assert_invariants(&split.left_difference);
            assert_invariants(&split.intersection);
            assert_invariants(&split.right_difference);
            // left ∪ shared == A, right ∪ shared == B
            assert_eq!(&split.left_difference.calculate_union(&split.intersection), a);
            assert_eq!(&split.right_difference.calculate_union(&split.intersection), b);
            // and the three parts are pairwise disjoint
            let ls = split
                .left_difference
                .calculate_differences_and_intersection(&split.intersection);
            assert!(ls.intersection.is_empty());
            let lr = split
                .left_difference
                .calculate_differences_and_intersection(&split.right_difference);
            assert!(lr.intersection.is_empty());
            let rs = split
                .right_difference
                .calculate_differences_and_intersection(&split.intersection);
            assert!(rs.intersection.is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "malformed interval")]
    fn malformed_interval_fails_loudly() {
        let _ = Interval::new(5, 4);
    }
}
