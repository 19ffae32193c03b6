//! Brute-force neighbour search shared by the two resamplers.

/// Squared Euclidean distance between two feature rows.
pub(crate) fn distance_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum()
}

/// Indices (into `rows`) of the `k` nearest rows to `query`, excluding
/// `skip`. Selection keeps a small sorted buffer rather than sorting the
/// full distance list.
pub(crate) fn k_nearest(
    rows: &[f64],
    width: usize,
    n_rows: usize,
    query: &[f64],
    skip: Option<usize>,
    k: usize,
) -> Vec<usize> {
    let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
    for j in 0..n_rows {
        if Some(j) == skip {
            continue;
        }
        let d = distance_sq(query, &rows[j * width..(j + 1) * width]);
        if best.len() < k || d < best[best.len() - 1].0 {
            let pos = best.partition_point(|&(bd, _)| bd <= d);
            best.insert(pos, (d, j));
            if best.len() > k {
                best.pop();
            }
        }
    }
    best.into_iter().map(|(_, j)| j).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_nearest_orders_by_distance() {
        // Four points on a line at 0, 1, 5, 6; query from index 0.
        let rows = [0.0, 1.0, 5.0, 6.0];
        let near = k_nearest(&rows, 1, 4, &[0.0], Some(0), 2);
        assert_eq!(near, vec![1, 2]);
    }

    #[test]
    fn test_skip_excludes_self() {
        let rows = [0.0, 0.0, 9.0];
        let near = k_nearest(&rows, 1, 3, &[0.0], Some(0), 1);
        assert_eq!(near, vec![1]);
    }
}
