//! Sliding-window quality trimming of read ends.

/// A trimmed (sequence, quality) pair. The two vectors are always the same
/// length; both empty means the whole read fell below the quality threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedRead {
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl TrimmedRead {
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

fn window_mean(qual: &[u8], start: usize, window: usize) -> f64 {
    let sum: u32 = qual[start..start + window].iter().map(|&q| q as u32).sum();
    sum as f64 / window as f64
}

/// Trims both ends of a read, keeping the widest span whose leading and
/// trailing windows have a mean quality of at least `threshold`.
///
/// Reads shorter than the window are returned unchanged (too short to
/// evaluate). If no window anywhere reaches the threshold, or the passing
/// spans from each end do not overlap, the result is empty.
pub fn trim_ends(seq: &[u8], qual: &[u8], window: usize, threshold: u8) -> TrimmedRead {
    debug_assert_eq!(seq.len(), qual.len());

    if seq.len() < window {
        return TrimmedRead {
            seq: seq.to_vec(),
            qual: qual.to_vec(),
        };
    }

    let threshold = threshold as f64;
    let last_start = seq.len() - window;

    let mut start_pos = None;
    for i in 0..=last_start {
        if window_mean(qual, i, window) >= threshold {
            start_pos = Some(i);
            break;
        }
    }

    let mut end_pos = None;
    for i in (0..=last_start).rev() {
        if window_mean(qual, i, window) >= threshold {
            end_pos = Some(i + window);
            break;
        }
    }

    match (start_pos, end_pos) {
        (Some(start), Some(end)) if start < end => TrimmedRead {
            seq: seq[start..end].to_vec(),
            qual: qual[start..end].to_vec(),
        },
        // No qualifying window, or the spans collapsed: entirely low quality.
        _ => TrimmedRead {
            seq: Vec::new(),
            qual: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_than_window_is_untouched() {
        let out = trim_ends(b"ACG", &[1, 1, 1], 4, 22);
        assert_eq!(out.seq, b"ACG".to_vec());
        assert_eq!(out.qual, vec![1, 1, 1]);
    }

    #[test]
    fn all_low_quality_yields_empty() {
        let out = trim_ends(b"ACGTACGT", &[5; 8], 4, 22);
        assert!(out.is_empty());
        assert!(out.qual.is_empty());
    }

    #[test]
    fn trims_low_quality_ends() {
        // Junk of quality 2 against good calls of 25: any window touching a
        // junk value averages below 22, so only the clean interior survives.
        let seq = b"TTTACGTACGTTTT";
        let qual = [2, 2, 2, 25, 25, 25, 25, 25, 25, 25, 25, 2, 2, 2];
        let out = trim_ends(seq, &qual, 4, 22);
        assert_eq!(out.seq, b"ACGTACGT".to_vec());
        assert_eq!(out.qual, vec![25; 8]);
        assert_eq!(out.seq.len(), out.qual.len());
    }

    #[test]
    fn window_straddling_junk_can_keep_it() {
        // With high-quality neighbors a window spanning one junk call still
        // clears the threshold, so the kept span starts inside the junk.
        let seq = b"TTACGTACGTTT";
        let qual = [2, 2, 40, 40, 40, 40, 40, 40, 40, 40, 3, 3];
        let out = trim_ends(seq, &qual, 4, 22);
        // left: mean of [2,40,40,40] = 30.5 passes at i=1
        // right: mean of [40,40,40,3] = 30.75 passes ending at 11
        assert_eq!(out.seq, b"TACGTACGTT".to_vec());
        assert_eq!(out.qual, vec![2, 40, 40, 40, 40, 40, 40, 40, 40, 3]);
    }

    #[test]
    fn clean_read_is_kept_whole() {
        let out = trim_ends(b"ACGTACGT", &[30; 8], 4, 22);
        assert_eq!(out.seq, b"ACGTACGT".to_vec());
    }

    #[test]
    fn window_mean_compares_as_float() {
        // Mean 21.75 must fail a threshold of 22 even though it truncates to 21.
        let out = trim_ends(b"ACGT", &[22, 22, 22, 21], 4, 22);
        assert!(out.is_empty());
        // Mean 22.0 exactly passes.
        let out = trim_ends(b"ACGT", &[22, 22, 22, 22], 4, 22);
        assert_eq!(out.seq, b"ACGT".to_vec());
    }
}
