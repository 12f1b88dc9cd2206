//! Seeded k-means over 3-dimensional feature rows. k-means++ initialization,
//! Lloyd iterations, best-of-n restarts by inertia. One `StdRng` drives all
//! restarts, so a fixed seed gives a fully reproducible fit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct KMeansFit {
    pub centroids: Vec<[f64; 3]>,
    /// Cluster index per input row.
    pub labels: Vec<usize>,
    /// Sum of squared distances to assigned centroids.
    pub inertia: f64,
}

/// Callers must guarantee `data.len() >= k` and `k >= 1`.
pub fn fit(data: &[[f64; 3]], k: usize, n_init: u32, max_iter: u32, seed: u64) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best = run_once(data, k, max_iter, &mut rng);
    for _ in 1..n_init {
        let run = run_once(data, k, max_iter, &mut rng);
        if run.inertia < best.inertia {
            best = run;
        }
    }
    best
}

fn run_once(data: &[[f64; 3]], k: usize, max_iter: u32, rng: &mut StdRng) -> KMeansFit {
    let mut centroids = init_plus_plus(data, k, rng);
    let mut labels = vec![0usize; data.len()];

    for _ in 0..max_iter {
        let mut changed = false;
        for (i, point) in data.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (i, point) in data.iter().enumerate() {
            for d in 0..3 {
                sums[labels[i]][d] += point[d];
            }
            counts[labels[i]] += 1;
        }

        let mut reseeded = false;
        for c in 0..k {
            if counts[c] == 0 {
                // Empty cluster: restart it at the point farthest from its
                // current centroid. Membership settles on the next pass.
                if let Some((far, _)) = data
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i, squared_distance(p, &centroids[labels[i]])))
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                {
                    centroids[c] = data[far];
                    reseeded = true;
                }
            } else {
                for d in 0..3 {
                    centroids[c][d] = sums[c][d] / counts[c] as f64;
                }
            }
        }

        if !changed && !reseeded {
            break;
        }
    }

    let mut inertia = 0.0;
    for (i, point) in data.iter().enumerate() {
        let nearest = nearest_centroid(point, &centroids);
        labels[i] = nearest;
        inertia += squared_distance(point, &centroids[nearest]);
    }

    KMeansFit {
        centroids,
        labels,
        inertia,
    }
}

/// k-means++: first seed uniform, each further seed drawn with probability
/// proportional to squared distance from the nearest already-chosen seed.
fn init_plus_plus(data: &[[f64; 3]], k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let mut centroids = Vec::with_capacity(k);
    let first = rng.gen_range(0..data.len());
    centroids.push(data[first]);

    let mut dist_sq: Vec<f64> = data
        .iter()
        .map(|p| squared_distance(p, &data[first]))
        .collect();

    while centroids.len() < k {
        let total: f64 = dist_sq.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = data.len() - 1;
            for (i, &d) in dist_sq.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // All remaining points coincide with a chosen seed.
            rng.gen_range(0..data.len())
        };
        centroids.push(data[chosen]);
        for (i, point) in data.iter().enumerate() {
            let d = squared_distance(point, &data[chosen]);
            if d < dist_sq[i] {
                dist_sq[i] = d;
            }
        }
    }

    centroids
}

fn nearest_centroid(point: &[f64; 3], centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_d = squared_distance(point, &centroids[0]);
    for (c, centroid) in centroids.iter().enumerate().skip(1) {
        let d = squared_distance(point, centroid);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let mut sum = 0.0;
    for d in 0..3 {
        let diff = a[d] - b[d];
        sum += diff * diff;
    }
    sum
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
