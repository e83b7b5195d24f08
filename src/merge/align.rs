//! Smith-Waterman local alignment with full traceback.
//!
//! The matrices are allocated flat and row-major, `(rows) * (cols)` with
//! `rows = alpha.len() + 1`, so a whole alignment costs two allocations.
//! Tie-breaking between equal-scoring predecessors is fixed (diagonal, then
//! the move consuming `beta`, then the move consuming `alpha`) so the traced
//! alignment is byte-for-byte reproducible for a given scoring scheme.

/// Scoring parameters for local alignment.
///
/// `gap_opening` is carried for interface compatibility with affine-gap
/// scoring schemes but the recurrence here is linear-gap; only `gap` enters
/// the matrix fill. `min_score` is the floor below which the best cell is
/// reported as "no alignment".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap: i32,
    pub gap_opening: i32,
    pub min_score: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            match_score: 10,
            mismatch: -8,
            gap: -10,
            gap_opening: -10,
            min_score: 80,
        }
    }
}

/// Outcome of one local alignment.
///
/// `length` counts only diagonal (match/mismatch) traceback steps; gap steps
/// contribute to the `percent_identity` denominator but not to `length`.
/// Coordinates are 0-based, half-open: the aligned region covers
/// `alpha[query_start..query_end]` and `beta[target_start..target_end]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentResult {
    pub score: i32,
    pub length: usize,
    pub percent_identity: f64,
    pub query_start: usize,
    pub query_end: usize,
    pub target_start: usize,
    pub target_end: usize,
    /// Aligned `alpha` with `-` at gap positions.
    pub top_track: Vec<u8>,
    /// `|` under matches, space under mismatches and gaps.
    pub middle_track: Vec<u8>,
    /// Aligned `beta` with `-` at gap positions.
    pub bottom_track: Vec<u8>,
}

impl AlignmentResult {
    /// True when the best cell stayed below the scoring floor and no
    /// traceback was performed.
    pub fn is_empty(&self) -> bool {
        self.length == 0 && self.top_track.is_empty()
    }
}

// Traceback directions.
const NONE: u8 = 0;
const DIAG: u8 = 1;
/// Predecessor `(i, j-1)`: consumes beta only.
const LEFT: u8 = 2;
/// Predecessor `(i-1, j)`: consumes alpha only.
const UP: u8 = 3;

/// Aligns `alpha` (rows) against `beta` (columns) locally.
///
/// Symbols are compared case-insensitively (both sides uppercased). If the
/// best cell scores below `weights.min_score` the returned record has that
/// score, zero length and empty tracks.
pub fn smith_waterman(alpha: &[u8], beta: &[u8], weights: &ScoringWeights) -> AlignmentResult {
    let rows = alpha.len() + 1;
    let cols = beta.len() + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut score = vec![0i32; rows * cols];
    let mut trace = vec![NONE; rows * cols];

    let mut score_max = 0i32;
    let mut i_max = 0usize;
    let mut j_max = 0usize;

    for i in 1..rows {
        let a = alpha[i - 1].to_ascii_uppercase();
        for j in 1..cols {
            let b = beta[j - 1].to_ascii_uppercase();
            let diag = score[idx(i - 1, j - 1)]
                + if a == b {
                    weights.match_score
                } else {
                    weights.mismatch
                };
            let left = score[idx(i, j - 1)] + weights.gap;
            let up = score[idx(i - 1, j)] + weights.gap;

            // Fixed preference on ties: diagonal, then left, then up.
            let (best, dir) = if diag >= left {
                if diag >= up {
                    (diag, DIAG)
                } else {
                    (up, UP)
                }
            } else if left >= up {
                (left, LEFT)
            } else {
                (up, UP)
            };

            if best < 0 {
                // Local-alignment floor: all candidates negative.
                continue;
            }
            score[idx(i, j)] = best;
            trace[idx(i, j)] = dir;

            if best > score_max {
                score_max = best;
                i_max = i;
                j_max = j;
            }
        }
    }

    if score_max < weights.min_score {
        return AlignmentResult {
            score: score_max,
            ..AlignmentResult::default()
        };
    }

    // Traceback from the best cell until a cell with no predecessor.
    let mut top = Vec::new();
    let mut middle = Vec::new();
    let mut bottom = Vec::new();
    let mut matched = 0usize;
    let mut length = 0usize;
    let mut total = 0usize;

    let mut i = i_max;
    let mut j = j_max;
    loop {
        match trace[idx(i, j)] {
            DIAG => {
                let a = alpha[i - 1].to_ascii_uppercase();
                let b = beta[j - 1].to_ascii_uppercase();
                top.push(a);
                bottom.push(b);
                if a == b {
                    middle.push(b'|');
                    matched += 1;
                } else {
                    middle.push(b' ');
                }
                length += 1;
                total += 1;
                i -= 1;
                j -= 1;
            }
            LEFT => {
                top.push(b'-');
                middle.push(b' ');
                bottom.push(beta[j - 1].to_ascii_uppercase());
                total += 1;
                j -= 1;
            }
            UP => {
                top.push(alpha[i - 1].to_ascii_uppercase());
                middle.push(b' ');
                bottom.push(b'-');
                total += 1;
                i -= 1;
            }
            _ => break,
        }
    }

    top.reverse();
    middle.reverse();
    bottom.reverse();

    let percent_identity = if total > 0 {
        100.0 * matched as f64 / total as f64
    } else {
        0.0
    };

    AlignmentResult {
        score: score_max,
        length,
        percent_identity,
        query_start: i,
        query_end: i_max,
        target_start: j,
        target_end: j_max,
        top_track: top,
        middle_track: middle,
        bottom_track: bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(min_score: i32) -> ScoringWeights {
        ScoringWeights {
            min_score,
            ..ScoringWeights::default()
        }
    }

    #[test]
    fn self_alignment_is_full_length_and_perfect() {
        let seq = b"ACGTACGTACGT";
        let aln = smith_waterman(seq, seq, &weights(1));
        assert_eq!(aln.length, seq.len());
        assert_eq!(aln.percent_identity, 100.0);
        assert_eq!(aln.score, seq.len() as i32 * 10);
        assert_eq!((aln.query_start, aln.query_end), (0, seq.len()));
        assert_eq!((aln.target_start, aln.target_end), (0, seq.len()));
        assert_eq!(aln.middle_track, vec![b'|'; seq.len()]);
    }

    #[test]
    fn single_internal_mismatch_identity() {
        let alpha = b"ACGTACGTACGT";
        let beta = b"ACGTAGGTACGT";
        let aln = smith_waterman(alpha, beta, &weights(1));
        assert_eq!(aln.length, 12);
        assert!(aln.percent_identity > 90.0 && aln.percent_identity < 100.0);
        assert!((aln.percent_identity - 100.0 * 11.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn below_min_score_reports_no_alignment() {
        let aln = smith_waterman(b"AAAA", b"CCCC", &weights(80));
        assert_eq!(aln.score, 0);
        assert!(aln.is_empty());
        assert_eq!(aln.percent_identity, 0.0);
    }

    #[test]
    fn internal_deletion_produces_gap_tracks() {
        // beta lacks one base from the middle of alpha
        let alpha = b"ACGTACGTTACGTACG";
        let beta = b"ACGTACGTACGTACG";
        let aln = smith_waterman(alpha, beta, &weights(1));
        assert!(aln.bottom_track.contains(&b'-') || aln.top_track.contains(&b'-'));
        assert!(aln.percent_identity < 100.0);
        // gaps widen the denominator but not the match count
        assert!(aln.length < aln.top_track.len() || aln.top_track.contains(&b'-'));
        assert_eq!(aln.top_track.len(), aln.bottom_track.len());
        assert_eq!(aln.top_track.len(), aln.middle_track.len());
    }

    #[test]
    fn alignment_is_case_insensitive() {
        let aln = smith_waterman(b"acgtacgt", b"ACGTACGT", &weights(1));
        assert_eq!(aln.length, 8);
        assert_eq!(aln.percent_identity, 100.0);
    }

    #[test]
    fn local_alignment_finds_embedded_overlap() {
        let alpha = b"TTTTTTACGTACGTACGT";
        let beta = b"ACGTACGTACGTGGGGG";
        let aln = smith_waterman(alpha, beta, &weights(1));
        assert_eq!(aln.query_start, 6);
        assert_eq!(aln.target_start, 0);
        assert_eq!(aln.length, 12);
        assert_eq!(aln.percent_identity, 100.0);
    }

    #[test]
    fn empty_inputs_yield_empty_result() {
        let aln = smith_waterman(b"", b"ACGT", &weights(1));
        assert!(aln.is_empty());
        assert_eq!(aln.score, 0);
    }
}
