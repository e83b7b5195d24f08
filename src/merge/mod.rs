//! Paired-read reconciliation: quality trimming, orientation search,
//! local alignment, and quality-weighted consensus construction.
//!
//! The entry point is [`merge_reads`]. A forward and a reverse basecalled
//! read are optionally end-trimmed, aligned under the three possible
//! physical orientations, and, when the best alignment passes the
//! acceptance thresholds, fused into one consensus sequence whose
//! conflicting positions are resolved by base quality.

pub mod align;
pub mod sequtils;
pub mod trim;

pub use align::{smith_waterman, AlignmentResult, ScoringWeights};
pub use trim::{trim_ends, TrimmedRead};

use anyhow::{bail, Result};
use sequtils::{reverse, reverse_complement};

/// Relative strand arrangement tested when aligning the two reads.
///
/// Names which input was reverse-complemented before alignment: `Innie`
/// flips the reverse read, `Outie` flips neither, `SameStrand` flips both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Innie,
    Outie,
    SameStrand,
}

/// Tunable parameters for one merge invocation.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Minimum number of aligned (non-gap) positions for an acceptable overlap.
    pub min_overlap_length: usize,
    /// Minimum percent identity over the traced alignment, in [0, 100].
    pub min_percent_identity: f64,
    /// When > 0 and no acceptable overlap exists, join the reads with this
    /// many `N` placeholder bases instead of failing.
    pub join_gap_length: usize,
    pub weights: ScoringWeights,
    /// Window size for end trimming, in bases.
    pub trim_window: usize,
    /// Minimum mean window quality kept by the trimmer.
    pub trim_threshold: u8,
    pub trim_enabled: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_overlap_length: 20,
            min_percent_identity: 85.0,
            join_gap_length: 0,
            weights: ScoringWeights::default(),
            trim_window: 4,
            trim_threshold: 22,
            trim_enabled: true,
        }
    }
}

impl MergeConfig {
    /// Rejects invalid parameter combinations before any alignment work.
    pub fn validate(&self) -> Result<()> {
        if self.trim_window < 1 {
            bail!("trim window must be at least 1 base");
        }
        if !(0.0..=100.0).contains(&self.min_percent_identity) {
            bail!(
                "minimum percent identity must be within [0, 100], got {}",
                self.min_percent_identity
            );
        }
        if self.weights.match_score <= 0 {
            bail!(
                "match score must be positive for a meaningful alignment, got {}",
                self.weights.match_score
            );
        }
        Ok(())
    }
}

/// A consensus sequence with its per-base qualities. The vectors are always
/// the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedResult {
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl MergedResult {
    pub fn empty() -> Self {
        Self {
            seq: Vec::new(),
            qual: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// What a merge invocation produced. `NoOverlap` is a normal outcome, not
/// an error: the reads simply do not reconcile under the given thresholds
/// and no join gap was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergedResult),
    NoOverlap,
}

impl MergeOutcome {
    /// Collapses the outcome into a result pair, empty on `NoOverlap`.
    pub fn into_result(self) -> MergedResult {
        match self {
            MergeOutcome::Merged(r) => r,
            MergeOutcome::NoOverlap => MergedResult::empty(),
        }
    }
}

/// One read's working (orientation-adjusted) sequence and quality. A
/// reverse-complemented sequence always pairs with an index-reversed
/// quality array so position `i` of `qual` still scores position `i` of
/// `seq`.
#[derive(Debug, Clone)]
struct WorkingRead {
    seq: Vec<u8>,
    qual: Vec<u8>,
}

impl WorkingRead {
    fn forward(seq: &[u8], qual: &[u8]) -> Self {
        Self {
            seq: seq.to_vec(),
            qual: qual.to_vec(),
        }
    }

    fn flipped(seq: &[u8], qual: &[u8]) -> Self {
        Self {
            seq: reverse_complement(seq),
            qual: reverse(qual),
        }
    }
}

/// Merges a forward and a reverse read into one consensus.
///
/// Both reads must carry exactly one quality value per base; a length
/// mismatch is a caller error and fails immediately, as does an invalid
/// `config`. An unmergeable pair is reported through
/// [`MergeOutcome::NoOverlap`] (or joined with placeholder bases when
/// `config.join_gap_length > 0`), never through `Err`.
pub fn merge_reads(
    forward_seq: &[u8],
    forward_qual: &[u8],
    reverse_seq: &[u8],
    reverse_qual: &[u8],
    config: &MergeConfig,
) -> Result<MergeOutcome> {
    config.validate()?;
    if forward_seq.len() != forward_qual.len() {
        bail!(
            "forward read is malformed: {} bases but {} quality values",
            forward_seq.len(),
            forward_qual.len()
        );
    }
    if reverse_seq.len() != reverse_qual.len() {
        bail!(
            "reverse read is malformed: {} bases but {} quality values",
            reverse_seq.len(),
            reverse_qual.len()
        );
    }

    let (fwd, rev) = if config.trim_enabled {
        (
            trim_ends(forward_seq, forward_qual, config.trim_window, config.trim_threshold),
            trim_ends(reverse_seq, reverse_qual, config.trim_window, config.trim_threshold),
        )
    } else {
        (
            TrimmedRead {
                seq: forward_seq.to_vec(),
                qual: forward_qual.to_vec(),
            },
            TrimmedRead {
                seq: reverse_seq.to_vec(),
                qual: reverse_qual.to_vec(),
            },
        )
    };

    let (orientation, alignment) = select_orientation(&fwd, &rev, &config.weights);
    let (working_fwd, working_rev) = working_reads(orientation, &fwd, &rev);

    let accepted = alignment.score >= config.weights.min_score
        && alignment.percent_identity >= config.min_percent_identity
        && alignment.length >= config.min_overlap_length;

    if accepted {
        return Ok(MergeOutcome::Merged(build_consensus(
            &working_fwd,
            &working_rev,
            &alignment,
        )));
    }

    if config.join_gap_length > 0 {
        return Ok(MergeOutcome::Merged(join_with_gap(
            &working_fwd,
            &working_rev,
            config.join_gap_length,
        )));
    }

    Ok(MergeOutcome::NoOverlap)
}

/// Runs the aligner under each orientation and keeps the strictly best
/// score. Evaluation order (Innie, Outie, SameStrand) decides exact ties.
fn select_orientation(
    fwd: &TrimmedRead,
    rev: &TrimmedRead,
    weights: &ScoringWeights,
) -> (Orientation, AlignmentResult) {
    let rev_rc = reverse_complement(&rev.seq);
    let fwd_rc = reverse_complement(&fwd.seq);

    let mut best = (
        Orientation::Innie,
        smith_waterman(&fwd.seq, &rev_rc, weights),
    );
    let later_trials = [
        (Orientation::Outie, &fwd.seq, &rev.seq),
        (Orientation::SameStrand, &fwd_rc, &rev_rc),
    ];
    for (orientation, alpha, beta) in later_trials {
        let aln = smith_waterman(alpha, beta, weights);
        if aln.score > best.1.score {
            best = (orientation, aln);
        }
    }
    best
}

/// Produces the working reads matching the alignment inputs of `orientation`.
fn working_reads(
    orientation: Orientation,
    fwd: &TrimmedRead,
    rev: &TrimmedRead,
) -> (WorkingRead, WorkingRead) {
    match orientation {
        Orientation::Innie => (
            WorkingRead::forward(&fwd.seq, &fwd.qual),
            WorkingRead::flipped(&rev.seq, &rev.qual),
        ),
        Orientation::Outie => (
            WorkingRead::forward(&fwd.seq, &fwd.qual),
            WorkingRead::forward(&rev.seq, &rev.qual),
        ),
        Orientation::SameStrand => (
            WorkingRead::flipped(&fwd.seq, &fwd.qual),
            WorkingRead::flipped(&rev.seq, &rev.qual),
        ),
    }
}

fn qual_at(read: &WorkingRead, pos: usize) -> u8 {
    read.qual.get(pos).copied().unwrap_or(0)
}

/// Builds the consensus from an accepted alignment. Each append adds
/// equal-length base and quality spans, so the length invariant holds by
/// construction; any out-of-range quality position pads with 0.
fn build_consensus(
    fwd: &WorkingRead,
    rev: &WorkingRead,
    aln: &AlignmentResult,
) -> MergedResult {
    let mut seq = Vec::with_capacity(fwd.seq.len() + rev.seq.len());
    let mut qual = Vec::with_capacity(fwd.seq.len() + rev.seq.len());

    // Unaligned reverse-read prefix.
    if aln.target_start > 0 {
        seq.extend_from_slice(&rev.seq[..aln.target_start]);
        for i in 0..aln.target_start {
            qual.push(qual_at(rev, i));
        }
    }

    // Unaligned forward-read prefix.
    if aln.query_start > 0 {
        seq.extend_from_slice(&fwd.seq[..aln.query_start]);
        for i in 0..aln.query_start {
            qual.push(qual_at(fwd, i));
        }
    }

    // Overlap: agree -> max quality; conflict -> higher-quality base,
    // ties favoring the forward read.
    for i in 0..aln.length {
        let f_pos = aln.query_start + i;
        let r_pos = aln.target_start + i;
        match (fwd.seq.get(f_pos).copied(), rev.seq.get(r_pos).copied()) {
            (Some(f), Some(r)) if f.eq_ignore_ascii_case(&r) => {
                seq.push(f);
                qual.push(qual_at(fwd, f_pos).max(qual_at(rev, r_pos)));
            }
            (Some(f), Some(r)) => {
                let fq = qual_at(fwd, f_pos);
                let rq = qual_at(rev, r_pos);
                if fq >= rq {
                    seq.push(f);
                    qual.push(fq);
                } else {
                    seq.push(r);
                    qual.push(rq);
                }
            }
            (Some(f), None) => {
                seq.push(f);
                qual.push(qual_at(fwd, f_pos));
            }
            (None, Some(r)) => {
                seq.push(r);
                qual.push(qual_at(rev, r_pos));
            }
            (None, None) => {
                seq.push(b'N');
                qual.push(0);
            }
        }
    }

    // Unaligned reverse-read suffix.
    if aln.target_end < rev.seq.len() {
        seq.extend_from_slice(&rev.seq[aln.target_end..]);
        for i in aln.target_end..rev.seq.len() {
            qual.push(qual_at(rev, i));
        }
    }

    // Unaligned forward-read suffix.
    if aln.query_end < fwd.seq.len() {
        seq.extend_from_slice(&fwd.seq[aln.query_end..]);
        for i in aln.query_end..fwd.seq.len() {
            qual.push(qual_at(fwd, i));
        }
    }

    MergedResult { seq, qual }
}

/// Concatenates the working reads around a run of `N` placeholders with
/// zero quality. Used when no acceptable overlap exists but the caller
/// asked for a joined product anyway.
fn join_with_gap(fwd: &WorkingRead, rev: &WorkingRead, gap: usize) -> MergedResult {
    let mut seq = Vec::with_capacity(fwd.seq.len() + gap + rev.seq.len());
    let mut qual = Vec::with_capacity(seq.capacity());

    seq.extend_from_slice(&fwd.seq);
    qual.extend_from_slice(&fwd.qual);
    seq.extend(std::iter::repeat(b'N').take(gap));
    qual.extend(std::iter::repeat(0u8).take(gap));
    seq.extend_from_slice(&rev.seq);
    qual.extend_from_slice(&rev.qual);

    MergedResult { seq, qual }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissive_config() -> MergeConfig {
        MergeConfig {
            min_overlap_length: 5,
            min_percent_identity: 80.0,
            join_gap_length: 0,
            weights: ScoringWeights {
                min_score: 10,
                ..ScoringWeights::default()
            },
            trim_enabled: false,
            ..MergeConfig::default()
        }
    }

    #[test]
    fn innie_pair_merges_into_consensus() {
        // reverse read sequences the tail of the fragment on the other strand
        let fragment = b"ACGGTTACCGGATCCGTTAACGGTACCATGG";
        let forward = &fragment[..24];
        let reverse = reverse_complement(&fragment[10..]);
        let fq = vec![40u8; forward.len()];
        let rq = vec![40u8; reverse.len()];

        let out = merge_reads(forward, &fq, &reverse, &rq, &permissive_config()).unwrap();
        match out {
            MergeOutcome::Merged(m) => {
                assert_eq!(m.seq, fragment.to_vec());
                assert_eq!(m.qual.len(), m.seq.len());
            }
            MergeOutcome::NoOverlap => panic!("expected a merge"),
        }
    }

    #[test]
    fn conflicting_base_resolved_by_quality() {
        let fragment = b"ACGGTTACCGGATCCGTTAACGGT";
        let forward = fragment.to_vec();
        // reverse covers the same span but miscalls one base with low quality
        let mut template = fragment.to_vec();
        template[12] = b'G'; // was T
        let reverse = reverse_complement(&template);
        let fq = vec![40u8; forward.len()];
        let mut rq = vec![40u8; reverse.len()];
        // working index of the miscall after reverse-complementing back
        rq[reverse.len() - 1 - 12] = 5;

        let out = merge_reads(&forward, &fq, &reverse, &rq, &permissive_config())
            .unwrap()
            .into_result();
        assert_eq!(out.seq, fragment.to_vec());
        assert_eq!(out.qual[12], 40);
    }

    #[test]
    fn agreement_takes_maximum_quality() {
        let fragment = b"ACGGTTACCGGATCCGTTAACGGT";
        let forward = fragment.to_vec();
        let reverse = reverse_complement(fragment);
        let fq = vec![20u8; forward.len()];
        let rq = vec![35u8; reverse.len()];

        let out = merge_reads(&forward, &fq, &reverse, &rq, &permissive_config())
            .unwrap()
            .into_result();
        assert_eq!(out.seq, fragment.to_vec());
        assert!(out.qual.iter().all(|&q| q == 35));
    }

    #[test]
    fn minus_strand_pair_still_merges() {
        // Both reads were recorded on the complementary strand; the direct
        // (Outie) trial lines them up without any flipping.
        let fragment = b"ACGGTTACCGGATCCGTTAACGGTACCATGG";
        let forward = reverse_complement(&fragment[6..]);
        let reverse = reverse_complement(&fragment[..25]);
        let fq = vec![30u8; forward.len()];
        let rq = vec![30u8; reverse.len()];

        let out = merge_reads(&forward, &fq, &reverse, &rq, &permissive_config())
            .unwrap()
            .into_result();
        assert!(!out.is_empty());
        assert_eq!(out.seq.len(), out.qual.len());
    }

    #[test]
    fn failing_pair_without_join_gap_is_no_overlap() {
        let cfg = MergeConfig {
            trim_enabled: false,
            ..MergeConfig::default()
        };
        let out = merge_reads(b"AAAAAAAAAA", &[30; 10], b"CCCCCCCCCC", &[30; 10], &cfg).unwrap();
        assert_eq!(out, MergeOutcome::NoOverlap);
        assert!(out.into_result().is_empty());
    }

    #[test]
    fn failing_pair_with_join_gap_concatenates() {
        let cfg = MergeConfig {
            join_gap_length: 10,
            trim_enabled: false,
            ..MergeConfig::default()
        };
        let out = merge_reads(b"AAAAAAAAAA", &[30; 10], b"CCCCCCCCCC", &[25; 10], &cfg)
            .unwrap()
            .into_result();
        // All trials tie at score 0, so Innie wins and the working reverse
        // read is the reverse complement of the input.
        assert_eq!(out.seq, b"AAAAAAAAAANNNNNNNNNNGGGGGGGGGG".to_vec());
        let expected_qual: Vec<u8> = [vec![30u8; 10], vec![0u8; 10], vec![25u8; 10]].concat();
        assert_eq!(out.qual, expected_qual);
    }

    #[test]
    fn short_overlap_merges_under_relaxed_thresholds() {
        let cfg = MergeConfig {
            min_overlap_length: 5,
            min_percent_identity: 80.0,
            join_gap_length: 5,
            weights: ScoringWeights {
                min_score: 10,
                ..ScoringWeights::default()
            },
            trim_enabled: false,
            ..MergeConfig::default()
        };
        let forward = b"ACGTACGTACGTACGTACGT";
        let reverse = b"TACGTACGTACGTACGTACG";
        let out = merge_reads(forward, &[40; 20], reverse, &[40; 20], &cfg)
            .unwrap()
            .into_result();
        assert!(!out.is_empty());
        assert_eq!(out.seq.len(), out.qual.len());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = merge_reads(b"ACGT", &[30; 3], b"ACGT", &[30; 4], &MergeConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn invalid_config_is_rejected_before_alignment() {
        let cfg = MergeConfig {
            min_percent_identity: 140.0,
            ..MergeConfig::default()
        };
        assert!(merge_reads(b"ACGT", &[30; 4], b"ACGT", &[30; 4], &cfg).is_err());
        let cfg = MergeConfig {
            trim_window: 0,
            ..MergeConfig::default()
        };
        assert!(merge_reads(b"ACGT", &[30; 4], b"ACGT", &[30; 4], &cfg).is_err());
    }

    #[test]
    fn fully_low_quality_reads_fall_through_to_no_overlap() {
        let cfg = MergeConfig::default();
        let out = merge_reads(
            b"ACGTACGTACGT",
            &[3; 12],
            b"ACGTACGTACGT",
            &[3; 12],
            &cfg,
        )
        .unwrap();
        assert_eq!(out, MergeOutcome::NoOverlap);
    }
}
