//! Running median smoothing and exact median utilities
//!

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Total-ordered f64 for use as an ordered set key
#[derive(Clone, Copy, Debug)]
struct OrdF64(f64);

impl PartialEq for OrdF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

type WindowKey = (OrdF64, usize);

/// Multiset of the values in a sliding window, split into lower and upper halves so that the
/// median of an odd-sized window is the largest value of the lower half
///
#[derive(Default)]
struct SlidingMedian {
    lower: BTreeSet<WindowKey>,
    upper: BTreeSet<WindowKey>,
}

impl SlidingMedian {
    fn insert(&mut self, key: WindowKey) {
        match self.lower.last() {
            Some(x) if key > *x => {
                self.upper.insert(key);
            }
            _ => {
                self.lower.insert(key);
            }
        }
        self.rebalance();
    }

    fn remove(&mut self, key: &WindowKey) {
        if !self.lower.remove(key) {
            self.upper.remove(key);
        }
        self.rebalance();
    }

    fn rebalance(&mut self) {
        while self.lower.len() > self.upper.len() + 1 {
            if let Some(x) = self.lower.pop_last() {
                self.upper.insert(x);
            }
        }
        while self.upper.len() > self.lower.len() {
            if let Some(x) = self.upper.pop_first() {
                self.lower.insert(x);
            }
        }
    }

    fn median(&self) -> Option<f64> {
        self.lower.last().map(|x| x.0.0)
    }
}

/// Running median window size for a series of length `n`
///
/// The window is `1 + 2 * min((n - 1) / 2, ceil(0.1 * n))`, following Turlach's choice in R's
/// `runmed`. It is always odd and no larger than `n`, except for an empty series where it is 0.
///
pub fn get_turlach_window_size(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 + 2 * std::cmp::min((n - 1) / 2, n.div_ceil(10))
}

/// Apply a running median filter to `input`, writing the result to `output`
///
/// The window size is given by [get_turlach_window_size]. Toward each end of the series the
/// window shrinks symmetrically, so that the window centered on index `i` has half-width
/// `min(k / 2, i, n - 1 - i)`. The first and last values are therefore unchanged.
///
pub fn run_median_into(input: &[f64], output: &mut Vec<f64>) {
    output.clear();

    let n = input.len();
    if n == 0 {
        return;
    }
    let half_width = get_turlach_window_size(n) / 2;

    let mut window = SlidingMedian::default();

    // Half-open range of input indices currently held in the window
    let mut begin = 0;
    let mut end = 0;
    for i in 0..n {
        let h = half_width.min(i).min(n - 1 - i);
        let (new_begin, new_end) = (i - h, i + h + 1);
        while end < new_end {
            window.insert((OrdF64(input[end]), end));
            end += 1;
        }
        while begin < new_begin {
            window.remove(&(OrdF64(input[begin]), begin));
            begin += 1;
        }
        output.push(window.median().unwrap_or(input[i]));
    }
}

pub fn run_median(input: &[f64]) -> Vec<f64> {
    let mut output = Vec::with_capacity(input.len());
    run_median_into(input, &mut output);
    output
}

/// Exact median of `values`, or None if `values` is empty
///
/// The median of an even-sized set is the mean of the two middle values. The order of `values`
/// is changed.
///
pub fn get_median(values: &mut [f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let (lower_half, mid, _) = values.select_nth_unstable_by(n / 2, f64::total_cmp);
    let mid = *mid;
    if n % 2 == 1 {
        Some(mid)
    } else {
        let lower_mid = lower_half.iter().copied().max_by(f64::total_cmp)?;
        Some((lower_mid + mid) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    /// Direct median of each shrinking-edge window, for comparison
    fn naive_run_median(input: &[f64]) -> Vec<f64> {
        let n = input.len();
        let half_width = get_turlach_window_size(n) / 2;
        (0..n)
            .map(|i| {
                let h = half_width.min(i).min(n - 1 - i);
                let mut window = input[(i - h)..(i + h + 1)].to_vec();
                get_median(&mut window).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_get_turlach_window_size() {
        assert_eq!(get_turlach_window_size(0), 0);
        assert_eq!(get_turlach_window_size(1), 1);
        assert_eq!(get_turlach_window_size(2), 1);
        assert_eq!(get_turlach_window_size(3), 3);
        assert_eq!(get_turlach_window_size(10), 3);
        assert_eq!(get_turlach_window_size(11), 5);
        assert_eq!(get_turlach_window_size(100), 21);
        assert_eq!(get_turlach_window_size(3002), 601);

        for n in 1..500 {
            let k = get_turlach_window_size(n);
            assert_eq!(k % 2, 1);
            assert!(k <= n);
        }
    }

    #[test]
    fn test_get_median() {
        assert_eq!(get_median(&mut []), None);
        assert_eq!(get_median(&mut [3.0]), Some(3.0));
        assert_eq!(get_median(&mut [5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(get_median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(get_median(&mut [0.0, 0.0, 7.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_run_median_empty() {
        assert!(run_median(&[]).is_empty());
    }

    #[test]
    fn test_run_median_spike() {
        let input = [1.0, 1.0, 1.0, 9.0, 1.0, 1.0, 1.0];
        assert_eq!(run_median(&input), [1.0; 7]);
    }

    #[test]
    fn test_run_median_step() {
        let mut input = vec![0.0; 50];
        input.extend([1.0; 50]);
        assert_eq!(run_median(&input), input);
    }

    #[test]
    fn test_run_median_edges() {
        let input = [4.0, 0.0, 8.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 9.0, 5.0];
        let output = run_median(&input);
        assert_eq!(output.len(), input.len());
        assert_eq!(output[0], 4.0);
        assert_eq!(output[1], 4.0);
        assert_eq!(output[10], 5.0);
        assert_eq!(output[11], 5.0);
    }

    #[test]
    fn test_run_median_matches_direct() {
        // Small linear congruential generator to get a reproducible irregular series
        let mut state = 12345u64;
        let mut next_value = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 40) as f64
        };
        for n in [1, 2, 5, 37, 200, 1001] {
            let input = (0..n).map(|_| next_value()).collect::<Vec<_>>();
            let output = run_median(&input);
            let expected = naive_run_median(&input);
            assert_eq!(output.len(), n);
            for (x, y) in output.iter().zip(expected.iter()) {
                assert_ulps_eq!(*x, *y);
            }
        }
    }
}
