//! Support Vector Machine classifier
//!
//! Binary soft-margin SVM trained with SMO (Sequential Minimal Optimization),
//! with optional Platt-scaled probability estimates.

use crate::calibration::{Calibrator, PlattScaling};
use crate::error::{PersonaError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Alphas below this are not support vectors
const ALPHA_EPS: f64 = 1e-8;

/// Kernel coefficient policy for the RBF kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gamma {
    /// `1 / (n_features * X.var())`
    Scale,
    /// `1 / n_features`
    Auto,
    /// Fixed value
    Value(f64),
}

impl Gamma {
    pub fn validate(&self) -> Result<()> {
        match self {
            Gamma::Value(g) if *g <= 0.0 || !g.is_finite() => Err(PersonaError::ConfigError(
                format!("gamma must be positive and finite, got {}", g),
            )),
            _ => Ok(()),
        }
    }

    /// Resolve against the (already scaled) training matrix
    pub fn resolve(&self, x: &Array2<f64>) -> f64 {
        let n_features = x.ncols().max(1) as f64;
        match self {
            Gamma::Scale => {
                let var = x.var(0.0);
                if var > 0.0 {
                    1.0 / (n_features * var)
                } else {
                    1.0
                }
            }
            Gamma::Auto => 1.0 / n_features,
            Gamma::Value(g) => *g,
        }
    }
}

/// Kernel function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²)
    Rbf { gamma: Gamma },
}

impl KernelType {
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Rbf { .. } => "rbf",
        }
    }
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Rbf { gamma: Gamma::Scale }
    }
}

/// Kernel with its coefficient fixed at fit time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum FittedKernel {
    Linear,
    Rbf { gamma: f64 },
}

impl FittedKernel {
    fn from_config(kernel: &KernelType, x: &Array2<f64>) -> Self {
        match kernel {
            KernelType::Linear => FittedKernel::Linear,
            KernelType::Rbf { gamma } => FittedKernel::Rbf { gamma: gamma.resolve(x) },
        }
    }

    #[inline]
    fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            FittedKernel::Linear => a.dot(&b),
            FittedKernel::Rbf { gamma } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum();
                (-gamma * norm_sq).exp()
            }
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Tolerance for the KKT stopping criterion
    pub tol: f64,
    /// Maximum number of SMO sweeps over the training set
    pub max_iter: usize,
    /// Fit a Platt calibrator for probability estimates
    pub probability: bool,
    /// Folds used to collect out-of-sample scores for calibration
    pub calibration_folds: usize,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::default(),
            tol: 1e-3,
            max_iter: 1000,
            probability: true,
            calibration_folds: 5,
            random_state: Some(42),
        }
    }
}

/// Support Vector Classifier for labels 0 and 1.
///
/// Decision values are positive on the class-1 side of the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    config: SVMConfig,
    kernel: Option<FittedKernel>,
    /// Support vectors, class-0 vectors first
    support_vectors: Option<Array2<f64>>,
    /// alpha_i * y_i for each support vector
    dual_coef: Option<Array1<f64>>,
    /// Bias term
    bias: f64,
    /// Support vector count per class `[class 0, class 1]`
    n_support: [usize; 2],
    calibrator: Option<PlattScaling>,
    is_fitted: bool,
}

impl SVMClassifier {
    /// Create a new SVM classifier
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            kernel: None,
            support_vectors: None,
            dual_coef: None,
            bias: 0.0,
            n_support: [0, 0],
            calibrator: None,
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Fit on features `x` and labels `y` (each 0.0 or 1.0)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        Self::validate_labels(x, y)?;

        let kernel = FittedKernel::from_config(&self.config.kernel, x);
        if let FittedKernel::Rbf { gamma } = kernel {
            debug!(gamma, "Resolved RBF kernel coefficient");
        }

        self.fit_with_kernel(x, y, kernel)?;

        if self.config.probability {
            let scores = self.out_of_fold_scores(x, y, kernel)?;
            let mut calibrator = PlattScaling::new();
            calibrator.fit(&scores, y)?;
            self.calibrator = Some(calibrator);
        }

        Ok(())
    }

    fn validate_labels(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PersonaError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        for (i, &v) in y.iter().enumerate() {
            if v != 0.0 && v != 1.0 {
                return Err(PersonaError::TrainingError(format!(
                    "SVM classifier requires labels 0 or 1, but sample {} has label {}",
                    i, v
                )));
            }
        }

        let n_pos = y.iter().filter(|&&v| v == 1.0).count();
        if n_pos == 0 || n_pos == y.len() {
            return Err(PersonaError::TrainingError(
                "SVM requires both classes in the training data".to_string(),
            ));
        }

        Ok(())
    }

    /// Solve the dual and keep the support vectors
    fn fit_with_kernel(&mut self, x: &Array2<f64>, y: &Array1<f64>, kernel: FittedKernel) -> Result<()> {
        let y_signed: Array1<f64> = y.mapv(|v| if v == 1.0 { 1.0 } else { -1.0 });
        let (alphas, bias) = self.smo_train(x, &y_signed, kernel)?;

        // Class 0 support vectors first, then class 1
        let mut support_indices: Vec<usize> = (0..x.nrows())
            .filter(|&i| alphas[i] > ALPHA_EPS && y_signed[i] < 0.0)
            .collect();
        let n_neg = support_indices.len();
        support_indices.extend((0..x.nrows()).filter(|&i| alphas[i] > ALPHA_EPS && y_signed[i] > 0.0));
        let n_pos = support_indices.len() - n_neg;

        let support_vectors = x.select(Axis(0), &support_indices);
        let dual_coef: Array1<f64> = support_indices
            .iter()
            .map(|&i| alphas[i] * y_signed[i])
            .collect();

        self.kernel = Some(kernel);
        self.support_vectors = Some(support_vectors);
        self.dual_coef = Some(dual_coef);
        self.bias = bias;
        self.n_support = [n_neg, n_pos];
        self.is_fitted = true;
        Ok(())
    }

    /// SMO training algorithm. Returns per-sample alphas and the bias.
    fn smo_train(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        kernel: FittedKernel,
    ) -> Result<(Array1<f64>, f64)> {
        let n = x.nrows();
        let c = self.config.c;
        let tol = self.config.tol;

        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(PersonaError::TrainingError(format!(
                "Dataset has {} samples, exceeding the maximum {} for SVM kernel matrix.",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let k = Self::compute_kernel_matrix(x, kernel);

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        // f_cache[i] = sum_j alpha_j * y_j * K(j, i), kept in sync with alphas
        let mut f_cache: Array1<f64> = Array1::zeros(n);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let max_passes = 5;
        let mut passes = 0;
        let mut sweeps = 0;

        while passes < max_passes && sweeps < self.config.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = f_cache[i] + bias - y[i];

                // Check KKT conditions
                if !((y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = f_cache[j] + bias - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let alpha_j_new = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(l, h);
                if (alpha_j_new - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i_new = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j_new);

                let d_i = y[i] * (alpha_i_new - alpha_i_old);
                let d_j = y[j] * (alpha_j_new - alpha_j_old);

                let b1 = bias - e_i - d_i * k[[i, i]] - d_j * k[[i, j]];
                let b2 = bias - e_j - d_i * k[[i, j]] - d_j * k[[j, j]];
                bias = if alpha_i_new > 0.0 && alpha_i_new < c {
                    b1
                } else if alpha_j_new > 0.0 && alpha_j_new < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                alphas[i] = alpha_i_new;
                alphas[j] = alpha_j_new;
                let (row_i, row_j) = (k.row(i), k.row(j));
                f_cache.zip_mut_with(&row_i, |f, &kv| *f += d_i * kv);
                f_cache.zip_mut_with(&row_j, |f, &kv| *f += d_j * kv);

                num_changed += 1;
            }

            sweeps += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        if passes < max_passes {
            warn!(sweeps, "SMO stopped at max_iter before converging");
        } else {
            debug!(sweeps, "SMO converged");
        }

        Ok((alphas, bias))
    }

    /// Compute kernel matrix (parallelized for large datasets)
    fn compute_kernel_matrix(x: &Array2<f64>, kernel: FittedKernel) -> Array2<f64> {
        let n = x.nrows();

        // For small matrices, sequential is faster due to overhead
        if n < 100 {
            let mut k = Array2::zeros((n, n));
            for i in 0..n {
                for j in i..n {
                    let val = kernel.eval(x.row(i), x.row(j));
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| kernel.eval(x.row(i), x.row(j))).collect())
            .collect();

        let mut k = Array2::zeros((n, n));
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    /// Decision values for held-out folds, used to fit the calibrator.
    ///
    /// Folds are stratified and seeded. If some fold would train on a single
    /// class, falls back to in-sample decision values.
    fn out_of_fold_scores(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        kernel: FittedKernel,
    ) -> Result<Array1<f64>> {
        let folds = self.stratified_folds(y);
        let mut scores: Array1<f64> = Array1::zeros(y.len());

        for (fold_idx, test_indices) in folds.iter().enumerate() {
            let train_indices: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();

            let y_train = y.select(Axis(0), &train_indices);
            let n_pos = y_train.iter().filter(|&&v| v == 1.0).count();
            if test_indices.is_empty() || n_pos == 0 || n_pos == y_train.len() {
                warn!(fold = fold_idx, "Calibration fold is single-class; using in-sample scores");
                return self.decision_function(x);
            }

            let mut fold_model = SVMClassifier::new(SVMConfig {
                probability: false,
                ..self.config.clone()
            });
            fold_model.fit_with_kernel(&x.select(Axis(0), &train_indices), &y_train, kernel)?;

            let fold_scores = fold_model.decision_function(&x.select(Axis(0), test_indices))?;
            for (&idx, &s) in test_indices.iter().zip(fold_scores.iter()) {
                scores[idx] = s;
            }
        }

        Ok(scores)
    }

    /// Class-stratified fold assignment
    fn stratified_folds(&self, y: &Array1<f64>) -> Vec<Vec<usize>> {
        let n_splits = self.config.calibration_folds.max(2);

        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val as i64).or_default().push(idx);
        }

        let mut rng = match self.config.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
        }

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut next = 0;
        for indices in class_indices.values() {
            for &idx in indices {
                folds[next % n_splits].push(idx);
                next += 1;
            }
        }
        folds
    }

    fn fitted_parts(&self) -> Result<(FittedKernel, &Array2<f64>, &Array1<f64>)> {
        match (&self.kernel, &self.support_vectors, &self.dual_coef) {
            (Some(k), Some(sv), Some(coef)) if self.is_fitted => Ok((*k, sv, coef)),
            _ => Err(PersonaError::ModelNotFitted),
        }
    }

    /// Signed distance-like score for one sample
    pub fn decision_value(&self, sample: ArrayView1<f64>) -> Result<f64> {
        let (kernel, sv, coef) = self.fitted_parts()?;
        if sample.len() != sv.ncols() {
            return Err(PersonaError::ShapeError {
                expected: format!("{} features", sv.ncols()),
                actual: format!("{} features", sample.len()),
            });
        }

        let mut sum = self.bias;
        for (row, &a) in sv.rows().into_iter().zip(coef.iter()) {
            sum += a * kernel.eval(sample, row);
        }
        Ok(sum)
    }

    /// Decision values for every row
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        x.rows()
            .into_iter()
            .map(|row| self.decision_value(row))
            .collect()
    }

    /// Predict class labels (0.0 or 1.0). A score of exactly zero maps to 1.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|s| if s >= 0.0 { 1.0 } else { 0.0 }))
    }

    /// Class-membership probabilities, one row `[P(0), P(1)]` per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let calibrator = self.calibrator.as_ref().ok_or_else(|| {
            PersonaError::InferenceError("probability estimates were not enabled".to_string())
        })?;

        let p1 = calibrator.calibrate(&self.decision_function(x)?)?;
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, &p) in p1.iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    /// Support vector count per class `[class 0, class 1]`
    pub fn n_support(&self) -> [usize; 2] {
        self.n_support
    }

    /// Get number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.n_support[0] + self.n_support[1]
    }

    /// RBF coefficient actually used, if any
    pub fn gamma(&self) -> Option<f64> {
        match self.kernel {
            Some(FittedKernel::Rbf { gamma }) => Some(gamma),
            _ => None,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
