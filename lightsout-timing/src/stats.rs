use std::time::Duration;

/// Summary of a batch of timing samples, in nanoseconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimingStats {
    pub samples: usize,
    pub mean_ns: f64,
    pub jitter_ns: f64,
    pub min_ns: f64,
    pub max_ns: f64,
}

impl TimingStats {
    pub fn from_samples(samples: &[Duration]) -> Self {
        let times: Vec<f64> = samples.iter().map(|d| d.as_nanos() as f64).collect();
        if times.is_empty() {
            return Self {
                samples: 0,
                mean_ns: 0.0,
                jitter_ns: 0.0,
                min_ns: 0.0,
                max_ns: 0.0,
            };
        }
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            samples: times.len(),
            mean_ns: mean,
            jitter_ns: var.sqrt(),
            min_ns: min,
            max_ns: max,
        }
    }

    pub fn mean_ms(&self) -> f64 {
        self.mean_ns / 1_000_000.0
    }

    pub fn jitter_ms(&self) -> f64 {
        self.jitter_ns / 1_000_000.0
    }
}
