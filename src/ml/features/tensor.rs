use serde::{Deserialize, Serialize};

/// Dense `[sample, feature, time-step]` array stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTensor {
    data: Vec<f64>,
    n_samples: usize,
    window_size: usize,
    feature_names: Vec<String>,
}

impl FeatureTensor {
    pub fn zeros(n_samples: usize, feature_names: Vec<String>, window_size: usize) -> Self {
        Self {
            data: vec![0.0; n_samples * feature_names.len() * window_size],
            n_samples,
            window_size,
            feature_names,
        }
    }

    /// `[n_samples, n_features, window_size]`
    pub fn shape(&self) -> [usize; 3] {
        [self.n_samples, self.feature_names.len(), self.window_size]
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    fn sample_len(&self) -> usize {
        self.n_features() * self.window_size
    }

    fn offset(&self, sample: usize, feature: usize, step: usize) -> usize {
        assert!(
            sample < self.n_samples && feature < self.n_features() && step < self.window_size,
            "index [{}, {}, {}] out of bounds for shape {:?}",
            sample,
            feature,
            step,
            self.shape()
        );
        sample * self.sample_len() + feature * self.window_size + step
    }

    pub fn get(&self, sample: usize, feature: usize, step: usize) -> f64 {
        self.data[self.offset(sample, feature, step)]
    }

    pub fn set(&mut self, sample: usize, feature: usize, step: usize, value: f64) {
        let offset = self.offset(sample, feature, step);
        self.data[offset] = value;
    }

    /// One sample as a flat `feature * window_size` slice
    pub fn sample(&self, sample: usize) -> &[f64] {
        let len = self.sample_len();
        &self.data[sample * len..(sample + 1) * len]
    }

    /// Values of one feature across the window of one sample
    pub fn series(&self, sample: usize, feature: usize) -> &[f64] {
        let start = self.offset(sample, feature, 0);
        &self.data[start..start + self.window_size]
    }

    /// New tensor holding the given samples in the given order
    pub fn select(&self, samples: &[usize]) -> Self {
        let len = self.sample_len();
        let mut data = Vec::with_capacity(samples.len() * len);
        for &s in samples {
            data.extend_from_slice(self.sample(s));
        }
        Self {
            data,
            n_samples: samples.len(),
            window_size: self.window_size,
            feature_names: self.feature_names.clone(),
        }
    }

    /// Flatten each sample into one row, for classifiers that take a 2-D matrix
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_samples).map(|s| self.sample(s).to_vec()).collect()
    }
}
