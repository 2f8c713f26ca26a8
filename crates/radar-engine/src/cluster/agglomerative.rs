//! Average-linkage agglomerative grouping on cosine distance.

use super::tfidf::{dot, SparseVector};

pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.65;

#[derive(Debug, Clone, Copy)]
pub struct AverageLinkage {
    threshold: f64,
}

impl Default for AverageLinkage {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_THRESHOLD)
    }
}

impl AverageLinkage {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Assign a group label to every row. Pairs keep merging while the
    /// closest average distance is below the threshold. Labels are numbered
    /// in order of each group's first row.
    #[must_use]
    pub fn labels(&self, rows: &[SparseVector]) -> Vec<usize> {
        let n = rows.len();
        let mut distance = vec![vec![0.0_f64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = cosine_distance(&rows[i], &rows[j]);
                distance[i][j] = d;
                distance[j][i] = d;
            }
        }

        // `members[i]` is empty once group i has been merged away.
        let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        loop {
            let mut closest: Option<(usize, usize, f64)> = None;
            for i in 0..n {
                if members[i].is_empty() {
                    continue;
                }
                for j in (i + 1)..n {
                    if members[j].is_empty() {
                        continue;
                    }
                    if closest.is_none_or(|(_, _, best)| distance[i][j] < best) {
                        closest = Some((i, j, distance[i][j]));
                    }
                }
            }

            let Some((a, b, d)) = closest else { break };
            if d >= self.threshold {
                break;
            }

            #[allow(clippy::cast_precision_loss)]
            let (size_a, size_b) = (members[a].len() as f64, members[b].len() as f64);
            for k in 0..n {
                if k == a || k == b || members[k].is_empty() {
                    continue;
                }
                let merged =
                    (size_a * distance[a][k] + size_b * distance[b][k]) / (size_a + size_b);
                distance[a][k] = merged;
                distance[k][a] = merged;
            }
            let absorbed = std::mem::take(&mut members[b]);
            members[a].extend(absorbed);
        }

        let mut group_of = vec![0; n];
        for (group, rows_in_group) in members.iter().enumerate() {
            for &row in rows_in_group {
                group_of[row] = group;
            }
        }

        let mut relabel: Vec<Option<usize>> = vec![None; n];
        let mut next = 0;
        group_of
            .into_iter()
            .map(|group| {
                *relabel[group].get_or_insert_with(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect()
    }
}

fn cosine_distance(a: &SparseVector, b: &SparseVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }
    (1.0 - dot(a, b)).clamp(0.0, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(usize, f64)]) -> SparseVector {
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        entries.iter().map(|&(i, w)| (i, w / norm)).collect()
    }

    #[test]
    fn similar_rows_merge_and_outlier_stays_alone() {
        let rows = vec![
            row(&[(0, 1.0), (1, 1.0)]),
            row(&[(5, 1.0)]),
            row(&[(0, 1.0), (1, 0.9)]),
        ];
        assert_eq!(AverageLinkage::default().labels(&rows), vec![0, 1, 0]);
    }

    #[test]
    fn empty_rows_never_merge() {
        let rows = vec![Vec::new(), Vec::new()];
        assert_eq!(AverageLinkage::default().labels(&rows), vec![0, 1]);
    }

    #[test]
    fn threshold_is_exclusive() {
        // cosine similarity 0.5 => distance 0.5
        let rows = vec![row(&[(0, 1.0)]), row(&[(0, 1.0), (1, 3.0_f64.sqrt())])];
        assert_eq!(AverageLinkage::new(0.5).labels(&rows), vec![0, 1]);
        assert_eq!(AverageLinkage::new(0.51).labels(&rows), vec![0, 0]);
    }

    #[test]
    fn average_linkage_blocks_chaining() {
        // 0-1 and 1-2 are close, 0-2 are orthogonal: the average distance from
        // {0,1} to 2 exceeds the threshold.
        let rows = vec![
            row(&[(0, 1.0)]),
            row(&[(0, 1.0), (1, 1.0)]),
            row(&[(1, 1.0)]),
        ];
        let labels = AverageLinkage::new(0.4).labels(&rows);
        assert_eq!(labels.iter().max(), Some(&1));
    }

    #[test]
    fn no_rows_no_labels() {
        assert!(AverageLinkage::default().labels(&[]).is_empty());
    }
}
