//! Candle-backed classifier evaluation.
//!
//! The trained network is exported next to the scaler as `model_spec.json`
//! (the layer layout) plus `dense/params.json` (flat row-major `f32` weights
//! keyed `mlp.layers.{i}.weight` with shape `[out, in]` and
//! `mlp.layers.{i}.bias` with shape `[out]`). Serving rebuilds the network with
//! Candle and evaluates one example per call.

use crate::error::{ScreeningError, ScreeningResult};
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model specification stored next to an exported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Simple feed-forward network.
    Mlp(MlpSpec),
}

impl ModelSpec {
    /// Width of the input layer.
    pub fn input_dim(&self) -> usize {
        match self {
            ModelSpec::Mlp(s) => s.input_dim,
        }
    }

    /// Width of the distribution the model emits.
    pub fn class_count(&self) -> usize {
        match self {
            ModelSpec::Mlp(s) => s.class_count(),
        }
    }
}

/// Layer layout of a feed-forward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpSpec {
    /// Number of scaled features fed to the first layer
    pub input_dim: usize,
    /// Widths of the hidden layers, in order
    pub hidden_dims: Vec<usize>,
    /// Width of the final layer
    pub output_dim: usize,
    /// Activation after each hidden layer
    #[serde(default)]
    pub activation: Activation,
    /// Activation turning the final layer into probabilities
    #[serde(default)]
    pub output_activation: OutputActivation,
}

impl MlpSpec {
    /// Width of the distribution; a sigmoid output is expanded to two classes.
    pub fn class_count(&self) -> usize {
        match self.output_activation {
            OutputActivation::Sigmoid => 2,
            OutputActivation::Softmax | OutputActivation::None => self.output_dim,
        }
    }
}

/// Activation between hidden layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `max(0, x)`
    #[default]
    Relu,
    /// Hyperbolic tangent
    Tanh,
    /// Logistic function
    Sigmoid,
    /// Identity
    None,
}

impl Activation {
    fn apply(&self, t: Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Relu => t.relu(),
            Activation::Tanh => t.tanh(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(&t),
            Activation::None => Ok(t),
        }
    }
}

/// How the final layer's outputs become class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// Softmax over `output_dim >= 2` logits.
    #[default]
    Softmax,
    /// Single logit; expanded to `[1 - p, p]`.
    Sigmoid,
    /// The final layer already emits probabilities.
    None,
}

/// Probability distribution over the model's classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDistribution(Vec<f64>);

impl ClassDistribution {
    /// Tolerance on the sum of the probabilities; outputs are `f32`.
    pub const SUM_TOLERANCE: f64 = 1e-3;

    /// Build a distribution.
    ///
    /// It must be non-empty, every value must lie in `[0, 1]` and the values
    /// must sum to 1 within [`Self::SUM_TOLERANCE`].
    pub fn new(probs: Vec<f64>) -> ScreeningResult<Self> {
        if probs.is_empty() {
            return Err(ScreeningError::inference("model produced no outputs"));
        }
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ScreeningError::inference(format!(
                "model produced non-finite outputs: {probs:?}"
            )));
        }
        if probs.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(ScreeningError::inference(format!(
                "model produced values outside [0, 1]: {probs:?}"
            )));
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(ScreeningError::inference(format!(
                "model outputs sum to {sum}, not 1: {probs:?}"
            )));
        }
        Ok(Self(probs))
    }

    /// Per-class probabilities.
    pub fn probs(&self) -> &[f64] {
        &self.0
    }

    /// Index of the most probable class; ties go to the lowest index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.0.iter().enumerate() {
            if *p > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Highest class probability.
    pub fn max(&self) -> f64 {
        self.0[self.argmax()]
    }
}

/// Opaque classifier over scaled feature vectors.
pub trait Classifier: Send + Sync {
    /// Expected length of a scaled input.
    fn input_dim(&self) -> usize;

    /// Evaluate one scaled example.
    fn predict(&self, scaled: &[f64]) -> ScreeningResult<ClassDistribution>;
}

/// Select the device Candle evaluates on.
pub fn best_device() -> Device {
    #[cfg(feature = "metal")]
    {
        Device::new_metal(0).unwrap_or(Device::Cpu)
    }
    #[cfg(all(feature = "cuda", not(feature = "metal")))]
    {
        Device::new_cuda(0).unwrap_or(Device::Cpu)
    }
    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        Device::Cpu
    }
}

/// Build a classifier from a spec + dense params (flat f32 arrays).
pub fn build_classifier(
    spec: &ModelSpec,
    params: &HashMap<String, Vec<f32>>,
    device: &Device,
) -> ScreeningResult<Box<dyn Classifier>> {
    match spec {
        ModelSpec::Mlp(s) => Ok(Box::new(MlpClassifier::from_params(s, params, device)?)),
    }
}

fn tensor_from_vec(
    params: &HashMap<String, Vec<f32>>,
    name: &str,
    shape: &[usize],
    device: &Device,
) -> ScreeningResult<Tensor> {
    let data = params
        .get(name)
        .ok_or_else(|| ScreeningError::artifact(format!("Missing dense param {:?}", name)))?;
    let numel: usize = shape.iter().product();
    if data.len() != numel {
        return Err(ScreeningError::artifact(format!(
            "Param {:?} has len {}, expected {} for shape {:?}",
            name,
            data.len(),
            numel,
            shape
        )));
    }
    Tensor::from_slice(data.as_slice(), shape, device)
        .map_err(|e| ScreeningError::artifact(format!("Candle tensor init failed: {e}")))
}

fn linear(x: &Tensor, w: &Tensor, b: &Tensor) -> ScreeningResult<Tensor> {
    // x: [B, in], w: [out, in]
    let wt = w
        .t()
        .map_err(|e| ScreeningError::inference(format!("transpose failed: {e}")))?;
    let y = x
        .matmul(&wt)
        .map_err(|e| ScreeningError::inference(format!("matmul failed: {e}")))?;
    y.broadcast_add(b)
        .map_err(|e| ScreeningError::inference(format!("bias add failed: {e}")))
}

/// Feed-forward network evaluated with Candle.
#[derive(Debug)]
pub struct MlpClassifier {
    spec: MlpSpec,
    // layers: (w, b)
    weights: Vec<(Tensor, Tensor)>,
    device: Device,
}

impl MlpClassifier {
    /// Build the network from flat parameters, checking every shape.
    pub fn from_params(
        spec: &MlpSpec,
        params: &HashMap<String, Vec<f32>>,
        device: &Device,
    ) -> ScreeningResult<Self> {
        match spec.output_activation {
            OutputActivation::Sigmoid if spec.output_dim != 1 => {
                return Err(ScreeningError::artifact(format!(
                    "sigmoid output requires output_dim 1, got {}",
                    spec.output_dim
                )));
            }
            OutputActivation::Softmax | OutputActivation::None if spec.output_dim < 2 => {
                return Err(ScreeningError::artifact(format!(
                    "output_dim must be at least 2, got {}",
                    spec.output_dim
                )));
            }
            _ => {}
        }

        let mut weights: Vec<(Tensor, Tensor)> = Vec::new();
        let mut in_dim = spec.input_dim;

        let mut all_layers: Vec<usize> = spec.hidden_dims.clone();
        all_layers.push(spec.output_dim);

        for (i, &out_dim) in all_layers.iter().enumerate() {
            let w = tensor_from_vec(params, &format!("mlp.layers.{i}.weight"), &[out_dim, in_dim], device)?;
            let b = tensor_from_vec(params, &format!("mlp.layers.{i}.bias"), &[out_dim], device)?;
            weights.push((w, b));
            in_dim = out_dim;
        }

        Ok(Self {
            spec: spec.clone(),
            weights,
            device: device.clone(),
        })
    }

    fn forward(&self, input: &Tensor) -> ScreeningResult<Tensor> {
        let mut x = input.clone();
        for (i, (w, b)) in self.weights.iter().enumerate() {
            x = linear(&x, w, b)?;
            let is_last = i + 1 == self.weights.len();
            if !is_last {
                x = self
                    .spec
                    .activation
                    .apply(x)
                    .map_err(|e| ScreeningError::inference(format!("activation failed: {e}")))?;
            }
        }
        let y = match self.spec.output_activation {
            OutputActivation::Softmax => candle_nn::ops::softmax(&x, 1),
            OutputActivation::Sigmoid => candle_nn::ops::sigmoid(&x),
            OutputActivation::None => Ok(x),
        };
        y.map_err(|e| ScreeningError::inference(format!("output activation failed: {e}")))
    }
}

impl Classifier for MlpClassifier {
    fn input_dim(&self) -> usize {
        self.spec.input_dim
    }

    fn predict(&self, scaled: &[f64]) -> ScreeningResult<ClassDistribution> {
        if scaled.len() != self.spec.input_dim {
            return Err(ScreeningError::inference(format!(
                "model expects {} inputs, got {}",
                self.spec.input_dim,
                scaled.len()
            )));
        }
        let data: Vec<f32> = scaled.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(data.as_slice(), (1, data.len()), &self.device)?;
        let output = self.forward(&input)?;
        let row = output.squeeze(0)?.to_vec1::<f32>()?;
        let probs: Vec<f64> = match self.spec.output_activation {
            OutputActivation::Sigmoid => {
                let p = f64::from(row[0]);
                vec![1.0 - p, p]
            }
            _ => row.into_iter().map(f64::from).collect(),
        };
        ClassDistribution::new(probs)
    }
}
