pub use log::{info, warn};

pub use glm_network::{
    GibbsSbm, NetworkData, Population, SbmInit, SbmOptions, SbmSample, StochasticBlockModel,
};

pub use crate::io::*;

/// Output file `{prefix}.{suffix}`
pub fn out_file(prefix: &str, suffix: &str) -> String {
    format!("{}.{}", prefix, suffix)
}

/// Node `i` of `n` goes to block `floor(i * k / n)`, so block sizes
/// differ by at most one.
pub fn balanced_blocks(n: usize, k: usize) -> Vec<usize> {
    (0..n).map(|i| i * k / n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_blocks() {
        assert_eq!(balanced_blocks(6, 2), vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(balanced_blocks(5, 3), vec![0, 0, 1, 1, 2]);
        assert_eq!(balanced_blocks(3, 1), vec![0, 0, 0]);
    }
}
