//! Character-level string similarity.
//!
//! The score is the indel ratio: `2 * LCS(a, b) / (|a| + |b|)`, scaled to
//! an integer 0–100. Symmetric; identical strings score 100.

use rapidfuzz::fuzz;

/// Similarity score of two strings, 0–100.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    (fuzz::ratio(a.chars(), b.chars()) * 100.0).round() as u8
}

/// Pairwise score between two addresses (by index into the address list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityEdge {
    pub a: usize,
    pub b: usize,
    pub score: u8,
}

/// Full pairwise similarity over a list of addresses. Self-pairs are not
/// stored; the matrix is symmetric.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<u8>,
}

impl SimilarityMatrix {
    pub fn build<S: AsRef<str>>(addresses: &[S]) -> Self {
        let n = addresses.len();
        let mut scores = vec![100u8; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let s = ratio(addresses[i].as_ref(), addresses[j].as_ref());
                scores[i * n + j] = s;
                scores[j * n + i] = s;
            }
        }
        Self { size: n, scores }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Score between two addresses, or None if either index is out of range.
    pub fn score(&self, a: usize, b: usize) -> Option<u8> {
        if a >= self.size || b >= self.size {
            return None;
        }
        Some(self.at(a, b))
    }

    fn at(&self, a: usize, b: usize) -> u8 {
        self.scores[a * self.size + b]
    }

    /// Every unordered pair `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = SimilarityEdge> + '_ {
        (0..self.size).flat_map(move |a| {
            ((a + 1)..self.size).map(move |b| SimilarityEdge {
                a,
                b,
                score: self.at(a, b),
            })
        })
    }

    /// Indices whose score against `index` is strictly above `threshold`,
    /// excluding `index` itself.
    pub fn neighbors_above(&self, index: usize, threshold: u8) -> Vec<usize> {
        if index >= self.size {
            return Vec::new();
        }
        (0..self.size)
            .filter(|&j| j != index && self.at(index, j) > threshold)
            .collect()
    }
}
