//! Longest common subsequence over arbitrary comparable elements.
//!
//! Classic O(m·n) dynamic programming. The table is walked backwards from
//! `(m, n)`:
//!
//! 1. equal elements: take the diagonal (`Keep`);
//! 2. otherwise, if `lcs(i, j-1) >= lcs(i-1, j)`: step left (`Insert`);
//! 3. otherwise step up (`Delete`).
//!
//! Ties therefore prefer `Insert`, which during the backward walk places
//! insertions after deletions in the forward script. Steps are reversed into
//! forward order before being returned.

/// One step of a forward edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consume one element of both inputs.
    Keep,
    /// Consume one element of the new input.
    Insert,
    /// Consume one element of the old input.
    Delete,
}

/// A maximal run of same-kind steps together with the elements it covers.
#[derive(Debug, Clone, PartialEq)]
pub enum Run<T> {
    Keep(Vec<T>),
    Insert(Vec<T>),
    Delete(Vec<T>),
}

fn table<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Vec<usize>> {
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }
    dp
}

/// The forward edit script turning `a` into `b`.
pub fn edit_steps<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Step> {
    let dp = table(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut steps = Vec::with_capacity(i + j);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            steps.push(Step::Keep);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            steps.push(Step::Insert);
            j -= 1;
        } else {
            steps.push(Step::Delete);
            i -= 1;
        }
    }
    steps.reverse();
    steps
}

/// Group the edit script into maximal `Keep` / `Insert` / `Delete` runs.
pub fn align<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<Run<T>> {
    let mut runs: Vec<Run<T>> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for step in edit_steps(a, b) {
        let item = match step {
            Step::Keep => {
                i += 1;
                j += 1;
                a[i - 1].clone()
            }
            Step::Insert => {
                j += 1;
                b[j - 1].clone()
            }
            Step::Delete => {
                i += 1;
                a[i - 1].clone()
            }
        };
        match (runs.last_mut(), step) {
            (Some(Run::Keep(items)), Step::Keep)
            | (Some(Run::Insert(items)), Step::Insert)
            | (Some(Run::Delete(items)), Step::Delete) => items.push(item),
            (_, Step::Keep) => runs.push(Run::Keep(vec![item])),
            (_, Step::Insert) => runs.push(Run::Insert(vec![item])),
            (_, Step::Delete) => runs.push(Run::Delete(vec![item])),
        }
    }
    runs
}

/// The longest common subsequence of `a` and `b`.
pub fn longest_common_subsequence<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    align(a, b)
        .into_iter()
        .filter_map(|run| match run {
            Run::Keep(items) => Some(items),
            _ => None,
        })
        .flatten()
        .collect()
}
