//! Longest-common-subsequence edit script over token slices.

/// One step of an edit script, indexing into the old and/or new slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Compute a minimal edit script from `old` to `new`.
///
/// Common prefix and suffix are matched directly so the quadratic table only
/// covers the changed middle. Deletions are emitted before insertions when
/// both are possible at the same point.
pub(crate) fn edit_script<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Step> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];
    let (n, m) = (a.len(), b.len());

    let mut steps = Vec::with_capacity(old.len().max(new.len()) + n.min(m));
    steps.extend((0..prefix).map(|i| Step::Equal(i, i)));

    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(Step::Equal(prefix + i, prefix + j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            steps.push(Step::Delete(prefix + i));
            i += 1;
        } else {
            steps.push(Step::Insert(prefix + j));
            j += 1;
        }
    }
    steps.extend((i..n).map(|k| Step::Delete(prefix + k)));
    steps.extend((j..m).map(|k| Step::Insert(prefix + k)));

    let old_tail = old.len() - suffix;
    let new_tail = new.len() - suffix;
    steps.extend((0..suffix).map(|k| Step::Equal(old_tail + k, new_tail + k)));
    steps
}
