//! Basic nucleotide sequence transformations shared by the merge engine.

/// Returns the symbols of `seq` in opposite order.
pub fn reverse(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().copied().collect()
}

/// Watson-Crick complement of a single symbol, covering the four canonical
/// bases and the IUPAC ambiguity codes. Input is case-folded to uppercase;
/// anything outside the table (gap markers, '*', etc.) passes through
/// unchanged.
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'Y' => b'R',
        b'R' => b'Y',
        b'S' => b'S',
        b'W' => b'W',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'N' => b'N',
        other => other,
    }
}

/// Reverse complement of `seq`. Applying it twice over symbols in the
/// complement table's domain returns the uppercased original.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
