//! Approximate anchor search by Hamming distance over every window of a read.

/// Best window found for an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Offset of the window in the haystack
    pub pos: usize,
    /// Substitutions between the window and the anchor
    pub mismatches: usize,
}

impl AnchorMatch {
    /// First haystack position after the matched window
    pub fn end(&self, anchor_len: usize) -> usize {
        self.pos + anchor_len
    }
}

/// `None` when no window is within the mismatch budget
pub type MatchResult = Option<AnchorMatch>;

/// Returns the leftmost window with the fewest mismatches against `anchor`, provided that
/// count is at most `max_mismatches`.
///
/// Comparison is case-insensitive and an `N` in either sequence always counts as a mismatch.
pub fn find(haystack: &[u8], anchor: &[u8], max_mismatches: usize) -> MatchResult {
    if anchor.is_empty() || haystack.len() < anchor.len() {
        return None;
    }

    let mut best: MatchResult = None;
    for pos in 0..=(haystack.len() - anchor.len()) {
        let limit = match best {
            Some(m) => m.mismatches - 1,
            None => max_mismatches,
        };
        if let Some(mismatches) = bounded_mismatches(&haystack[pos..], anchor, limit) {
            best = Some(AnchorMatch { pos, mismatches });
            if mismatches == 0 {
                break;
            }
        }
    }
    best
}

/// Checks `anchor` against the window starting exactly at `pos`, without searching elsewhere
pub fn match_at(haystack: &[u8], pos: usize, anchor: &[u8], max_mismatches: usize) -> MatchResult {
    let end = pos.checked_add(anchor.len())?;
    if anchor.is_empty() || end > haystack.len() {
        return None;
    }
    bounded_mismatches(&haystack[pos..end], anchor, max_mismatches)
        .map(|mismatches| AnchorMatch { pos, mismatches })
}

/// Counts mismatches between `anchor` and the start of `window`, giving up as soon as the count
/// exceeds `limit`.
fn bounded_mismatches(window: &[u8], anchor: &[u8], limit: usize) -> Option<usize> {
    let mut mismatches = 0;
    for (read_nuc, anchor_nuc) in window.iter().zip(anchor.iter()) {
        if !same_base(*read_nuc, *anchor_nuc) {
            mismatches += 1;
            if mismatches > limit {
                return None;
            }
        }
    }
    Some(mismatches)
}

#[inline]
fn same_base(a: u8, b: u8) -> bool {
    let a = a.to_ascii_uppercase();
    a != b'N' && a == b.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_leftmost() {
        let m = find(b"TTACGTACGT", b"ACGT", 0).unwrap();
        assert_eq!(m, AnchorMatch { pos: 2, mismatches: 0 });
        assert_eq!(m.end(4), 6);
    }

    #[test]
    fn zero_budget_agrees_with_substring_search() {
        let haystacks: [&[u8]; 4] = [b"GGGCGTACAAA", b"CGTAC", b"CGTA", b"AACGTTCGTACCGTAC"];
        let anchor = b"CGTAC";
        for haystack in haystacks.iter() {
            let literal = haystack
                .windows(anchor.len())
                .position(|window| window == anchor);
            assert_eq!(find(haystack, anchor, 0).map(|m| m.pos), literal);
        }
    }

    #[test]
    fn fewest_mismatches_wins_over_leftmost() {
        // offset 0 has one mismatch, offset 6 is exact
        let m = find(b"CGTTCACGTACA", b"CGTAC", 2).unwrap();
        assert_eq!(m, AnchorMatch { pos: 6, mismatches: 0 });
    }

    #[test]
    fn ties_go_to_the_leftmost_window() {
        let m = find(b"AGGTCTTGGTC", b"CGGTC", 1).unwrap();
        assert_eq!(m, AnchorMatch { pos: 0, mismatches: 1 });
    }

    #[test]
    fn budget_is_respected() {
        assert_eq!(find(b"NNNNNNNN", b"CGTAC", 4), None);
        let m = find(b"NNNNNNNN", b"CGTAC", 5).unwrap();
        assert_eq!(m, AnchorMatch { pos: 0, mismatches: 5 });
    }

    #[test]
    fn reported_count_is_minimal() {
        let haystack = b"TTGACCTAGGCATTGACCAAGT";
        let anchor = b"GACCA";
        let m = find(haystack, anchor, 3).unwrap();
        let brute = haystack
            .windows(anchor.len())
            .map(|w| w.iter().zip(anchor.iter()).filter(|(a, b)| a != b).count())
            .min()
            .unwrap();
        assert_eq!(m.mismatches, brute);
        assert!(m.mismatches <= 3);
    }

    #[test]
    fn n_is_always_a_mismatch() {
        assert_eq!(find(b"CGNAC", b"CGTAC", 0), None);
        assert_eq!(
            find(b"CGNAC", b"CGTAC", 1),
            Some(AnchorMatch { pos: 0, mismatches: 1 })
        );
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(
            find(b"ttcgtac", b"CGTAC", 0),
            Some(AnchorMatch { pos: 2, mismatches: 0 })
        );
    }

    #[test]
    fn short_haystack_has_no_match() {
        assert_eq!(find(b"CGTA", b"CGTAC", 5), None);
        assert_eq!(find(b"", b"A", 1), None);
        assert_eq!(find(b"ACGT", b"", 0), None);
    }

    #[test]
    fn match_at_only_checks_one_window() {
        let read = b"AAAATTCGAGG";
        assert_eq!(
            match_at(read, 4, b"TTCGA", 0),
            Some(AnchorMatch { pos: 4, mismatches: 0 })
        );
        assert_eq!(match_at(read, 3, b"TTCGA", 3), None);
        assert_eq!(
            match_at(read, 3, b"TTCGA", 4),
            Some(AnchorMatch { pos: 3, mismatches: 4 })
        );
        assert_eq!(match_at(read, 8, b"TTCGA", 5), None);
    }
}
