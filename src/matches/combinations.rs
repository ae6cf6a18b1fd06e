//! k-subsets of a slice
//!
//! Recursive include/exclude generation. At every index the branch that
//! skips the element runs before the branch that takes it, so subsets come
//! out in descending order of their leading index: for `[1, 2, 3, 4]` and
//! `k = 2` the order is `[3,4] [2,4] [2,3] [1,4] [1,3] [1,2]`. Pairing code
//! and its tests rely on this order staying fixed.

/// Every subset of `input` with exactly `k` elements, each once
///
/// Elements keep their relative order inside a subset. `k = 0` yields one
/// empty subset; `k > input.len()` yields none.
pub fn combinations<T: Clone>(input: &[T], k: usize) -> Vec<Vec<T>> {
    let mut results = Vec::with_capacity(binomial(input.len(), k));
    let mut accumulator = Vec::with_capacity(k);
    collect(input, k, 0, &mut accumulator, &mut results);
    results
}

fn collect<T: Clone>(input: &[T], k: usize, index: usize, accumulator: &mut Vec<T>, results: &mut Vec<Vec<T>>) {
    if accumulator.len() == k {
        results.push(accumulator.clone());
        return;
    }
    let needed = k - accumulator.len();
    if needed > input.len() - index {
        return;
    }
    collect(input, k, index + 1, accumulator, results);
    accumulator.push(input[index].clone());
    collect(input, k, index + 1, accumulator, results);
    accumulator.pop();
}

/// n choose k, saturating on overflow
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1usize, |acc, i| acc.saturating_mul(n - i) / (i + 1))
}
