// Feed-forward network used to score a candidate cell
//
// Forward inference only. Each layer appends a constant bias input of 1,
// multiplies by its weight matrix (rows = outputs, cols = inputs + 1) and
// applies the network-wide activation.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::matrix::Matrix;

const BIAS_INPUT: f64 = 1.0;

/// Nonlinearity applied after every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Matrix,
}

impl Layer {
    fn new(inputs: usize, outputs: usize) -> Self {
        Layer {
            weights: Matrix::zeros(outputs, inputs + 1),
        }
    }

    pub fn input_width(&self) -> usize {
        self.weights.cols() - 1
    }

    pub fn output_width(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_width: usize,
    activation: Activation,
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a network with no layers yet; weights start at zero
    pub fn new(input_width: usize, activation: Activation) -> Self {
        Network {
            input_width,
            activation,
            layers: Vec::new(),
        }
    }

    /// Creates a network and declares all layer widths at once
    pub fn with_layers(input_width: usize, widths: &[usize], activation: Activation) -> Self {
        let mut network = Network::new(input_width, activation);
        for &width in widths {
            network.add_layer(width);
        }
        network
    }

    /// Appends a layer fed by the previous layer's output
    pub fn add_layer(&mut self, width: usize) {
        let inputs = self.output_width();
        self.layers.push(Layer::new(inputs, width));
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Width of the last layer, or the input width if there are no layers
    pub fn output_width(&self) -> usize {
        self.layers.last().map_or(self.input_width, Layer::output_width)
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of flat values `load_parameters` expects
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len()).sum()
    }

    /// Replaces all weights from one flat sequence
    ///
    /// Layers are filled in declaration order, each row-major: one row per
    /// output unit, its input weights followed by its bias weight. The count
    /// must match exactly and every value must be finite; otherwise no layer
    /// is touched.
    pub fn load_parameters(&mut self, values: &[f64]) -> Result<(), EngineError> {
        let expected = self.parameter_count();
        if values.len() != expected {
            return Err(EngineError::ParameterCount {
                expected,
                found: values.len(),
            });
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::NonFiniteParameter { index, value });
        }

        let mut offset = 0;
        for layer in &mut self.layers {
            let len = layer.weights.len();
            layer.weights.copy_from_slice(&values[offset..offset + len])?;
            offset += len;
        }

        debug!("Loaded {} parameters into {} layers", expected, self.layers.len());
        Ok(())
    }

    /// Flattens all weights in the order `load_parameters` reads them
    pub fn parameters(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            values.extend_from_slice(layer.weights.as_slice());
        }
        values
    }

    /// Runs the input through every layer
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>, EngineError> {
        let mut current = input.to_vec();

        for (i, layer) in self.layers.iter().enumerate() {
            if current.len() != layer.input_width() {
                return Err(EngineError::ShapeMismatch {
                    context: format!("layer {} input", i),
                    expected: layer.input_width(),
                    found: current.len(),
                });
            }

            current.push(BIAS_INPUT);
            current = layer.weights.mul_vec(&current)?;
            for value in current.iter_mut() {
                *value = self.activation.apply(*value);
            }
        }

        Ok(current)
    }
}
