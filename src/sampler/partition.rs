/// Split `total` trials over `workers`: everyone gets `total / workers`,
/// and worker 0 also takes the remainder so the shares sum to `total`.
pub fn partition_trials(total: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let per_worker = total / workers as u64;
    let remainder = total % workers as u64;

    let mut shares = vec![per_worker; workers];
    shares[0] += remainder;
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(partition_trials(400_000, 4), vec![100_000; 4]);
    }

    #[test]
    fn test_remainder_goes_to_first() {
        assert_eq!(partition_trials(10, 4), vec![4, 2, 2, 2]);
    }

    #[test]
    fn test_fewer_trials_than_workers() {
        assert_eq!(partition_trials(2, 5), vec![2, 0, 0, 0, 0]);
        assert_eq!(partition_trials(0, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_no_workers() {
        assert!(partition_trials(10, 0).is_empty());
    }
}
