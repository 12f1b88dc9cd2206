//! District maturity labelling. Primary path is seeded k-means over
//! log-scaled activity features; a quantile-binning fallback covers
//! degenerate partitions where one cluster swallows nearly everything.

use enrolytics_config::ClusteringConfig;
use enrolytics_core::MaturityLabel;

use crate::error::ClusterError;
use crate::kmeans;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterMethod {
    KMeans,
    Quantile,
}

impl ClusterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMethod::KMeans => "kmeans",
            ClusterMethod::Quantile => "quantile",
        }
    }
}

#[derive(Debug)]
pub struct Classification {
    /// Semantic label per input row, same order as the features.
    pub labels: Vec<MaturityLabel>,
    pub method: ClusterMethod,
}

/// Feature rows are `[total_enrolment, total_biometric, total_demographic]`.
pub struct MaturityClassifier<'a> {
    config: &'a ClusteringConfig,
}

impl<'a> MaturityClassifier<'a> {
    pub fn new(config: &'a ClusteringConfig) -> Self {
        MaturityClassifier { config }
    }

    pub fn classify(&self, features: &[[f64; 3]]) -> Result<Classification, ClusterError> {
        let k = self.config.clusters;
        if features.len() < k {
            return Err(ClusterError::TooFewSamples {
                needed: k,
                got: features.len(),
            });
        }

        let log_features: Vec<[f64; 3]> = features.iter().map(log_transform).collect();
        let scaled = standardize(&log_features);
        let fit = kmeans::fit(
            &scaled,
            k,
            self.config.n_init,
            self.config.max_iter,
            self.config.seed,
        );

        if balanced(&fit.labels, k, self.config.balance_floor) {
            let mapping = label_clusters(&fit.centroids);
            let labels = fit.labels.iter().map(|&c| mapping[c]).collect();
            Ok(Classification {
                labels,
                method: ClusterMethod::KMeans,
            })
        } else {
            Ok(Classification {
                labels: quantile_binning(&log_features),
                method: ClusterMethod::Quantile,
            })
        }
    }
}

fn log_transform(features: &[f64; 3]) -> [f64; 3] {
    [
        features[0].max(0.0).ln_1p(),
        features[1].max(0.0).ln_1p(),
        features[2].max(0.0).ln_1p(),
    ]
}

/// Column-wise zero mean, unit population variance. A constant column keeps
/// scale 1.0 instead of dividing by zero.
fn standardize(data: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let n = data.len() as f64;
    let mut means = [0.0f64; 3];
    for row in data {
        for d in 0..3 {
            means[d] += row[d];
        }
    }
    for mean in &mut means {
        *mean /= n;
    }

    let mut scales = [0.0f64; 3];
    for row in data {
        for d in 0..3 {
            let diff = row[d] - means[d];
            scales[d] += diff * diff;
        }
    }
    for scale in &mut scales {
        *scale = (*scale / n).sqrt();
        if *scale == 0.0 {
            *scale = 1.0;
        }
    }

    data.iter()
        .map(|row| {
            [
                (row[0] - means[0]) / scales[0],
                (row[1] - means[1]) / scales[1],
                (row[2] - means[2]) / scales[2],
            ]
        })
        .collect()
}

fn balanced(labels: &[usize], k: usize, floor: f64) -> bool {
    let total = labels.len();
    if total == 0 {
        return false;
    }
    let mut counts = vec![0usize; k];
    for &label in labels {
        counts[label] += 1;
    }
    counts.iter().all(|&c| c as f64 / total as f64 >= floor)
}

/// Centroid index to semantic label. The cluster whose centroid sits highest
/// on the enrolment axis is Emerging, highest on the demographic axis is
/// HighChurn, the rest Mature. When one cluster tops both axes, the larger
/// winning score keeps its dimension and the other goes to its runner-up.
pub fn label_clusters(centroids: &[[f64; 3]]) -> Vec<MaturityLabel> {
    let enrol: Vec<f64> = centroids.iter().map(|c| c[0]).collect();
    let demo: Vec<f64> = centroids.iter().map(|c| c[2]).collect();

    let mut emerging = argmax(&enrol);
    let mut high_churn = argmax(&demo);

    if emerging == high_churn {
        if enrol[emerging] >= demo[high_churn] {
            high_churn = runner_up(&demo, high_churn);
        } else {
            emerging = runner_up(&enrol, emerging);
        }
    }

    let mut labels = vec![MaturityLabel::Mature; centroids.len()];
    labels[emerging] = MaturityLabel::Emerging;
    labels[high_churn] = MaturityLabel::HighChurn;
    labels
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

fn runner_up(scores: &[f64], winner: usize) -> usize {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
        .into_iter()
        .find(|&i| i != winner)
        .unwrap_or((winner + 1) % scores.len())
}

/// Fallback binning over log-space features: rows whose enrolment share of
/// total activity reaches the 67th percentile are Emerging, demographic share
/// HighChurn, both decided by the larger share, neither Mature.
fn quantile_binning(log_features: &[[f64; 3]]) -> Vec<MaturityLabel> {
    let mut enrol_ratio = Vec::with_capacity(log_features.len());
    let mut demo_ratio = Vec::with_capacity(log_features.len());
    for f in log_features {
        let total = f[0] + f[1] + f[2] + 1.0;
        enrol_ratio.push(f[0] / total);
        demo_ratio.push(f[2] / total);
    }

    let enrol_p67 = percentile(&enrol_ratio, 67.0);
    let demo_p67 = percentile(&demo_ratio, 67.0);

    (0..log_features.len())
        .map(|i| {
            let high_enrol = enrol_ratio[i] >= enrol_p67;
            let high_demo = demo_ratio[i] >= demo_p67;
            match (high_enrol, high_demo) {
                (true, false) => MaturityLabel::Emerging,
                (false, true) => MaturityLabel::HighChurn,
                (true, true) => {
                    if enrol_ratio[i] >= demo_ratio[i] {
                        MaturityLabel::Emerging
                    } else {
                        MaturityLabel::HighChurn
                    }
                }
                (false, false) => MaturityLabel::Mature,
            }
        })
        .collect()
}

/// Linear-interpolation percentile over an unsorted slice. `values` must be
/// non-empty.
fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
