//! Byte-level determinism checks.

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the first output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first output.
    pub hash: String,
    /// First differing byte offset and run, if any.
    pub first_difference: Option<(usize, usize)>,
}

impl fmt::Display for DeterminismResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_difference {
            None => write!(f, "{} runs identical ({} bytes, {})", self.runs, self.output_size, self.hash),
            Some((offset, run)) => write!(f, "run {} differs at byte {}", run, offset),
        }
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        assert!(self.is_deterministic, "Non-deterministic output: {}", self);
    }
}

/// Run `generate_fn` `runs` times and compare every output to the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = blake3::hash(reference).to_hex().to_string();

    for run in 1..runs {
        let output = generate_fn();
        let output = output.as_ref();
        let mismatch = reference
            .iter()
            .zip(output)
            .position(|(a, b)| a != b)
            .or_else(|| (reference.len() != output.len()).then(|| reference.len().min(output.len())));
        if let Some(offset) = mismatch {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                first_difference: Some((offset, run)),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        first_difference: None,
    }
}
