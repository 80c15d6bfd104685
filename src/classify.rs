//! Binary-versus-text classification of file samples.
//!
//! Only the first [`SAMPLE_LEN`] bytes of a file are inspected. Checks run
//! in order and the first positive one wins: magic signature, null byte,
//! Shannon entropy, printable-character ratio.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes sampled from each file.
pub const SAMPLE_LEN: usize = 512;

/// Entropy (bits per byte) above which a sample is treated as compressed or encrypted.
pub const ENTROPY_THRESHOLD: f64 = 7.0;

/// Minimum share of text bytes for a sample to count as text.
pub const TEXT_RATIO_THRESHOLD: f64 = 0.7;

/// Leading bytes of common binary formats.
const BINARY_SIGNATURES: &[&[u8]] = &[
    &[0x7F, 0x45, 0x4C, 0x46], // ELF
    &[0x4D, 0x5A],             // DOS MZ / PE
    &[0x50, 0x4B, 0x03, 0x04], // ZIP
    &[0x1F, 0x8B],             // GZIP
    &[0x89, 0x50, 0x4E, 0x47], // PNG
    &[0xFF, 0xD8, 0xFF],       // JPEG
    &[0x47, 0x49, 0x46, 0x38], // GIF
    &[0x42, 0x4D],             // BMP
    &[0x25, 0x50, 0x44, 0x46], // PDF
];

/// Returns `true` if the sample looks like binary content.
#[must_use]
pub fn is_binary(sample: &[u8]) -> bool {
    if BINARY_SIGNATURES.iter().any(|sig| sample.starts_with(sig)) {
        return true;
    }

    if sample.contains(&0) {
        return true;
    }

    if shannon_entropy(sample) > ENTROPY_THRESHOLD {
        return true;
    }

    text_ratio(sample) < TEXT_RATIO_THRESHOLD
}

/// Shannon entropy of the byte distribution, in bits per byte.
///
/// Returns `0.0` for an empty sample.
#[must_use]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0usize; 256];
    for &b in data {
        freq[usize::from(b)] += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Share of printable ASCII and whitespace control bytes (tab through CR).
///
/// An empty sample counts as all text.
fn text_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 1.0;
    }
    let text = data.iter().filter(|&&b| (0x20..=0x7E).contains(&b) || (0x09..=0x0D).contains(&b)).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = text as f64 / data.len() as f64;
    ratio
}

/// Reads up to [`SAMPLE_LEN`] bytes from `path` and classifies them.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn is_binary_file(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_LEN);
    file.take(SAMPLE_LEN as u64).read_to_end(&mut sample)?;
    Ok(is_binary(&sample))
}
