//! Output decoding

use crate::config::OutputSpec;

/// Maps raw model outputs back to the configured unit scale
#[derive(Debug, Clone, Copy)]
pub struct OutputDecoder<'a> {
    spec: &'a OutputSpec,
}

impl<'a> OutputDecoder<'a> {
    pub fn new(spec: &'a OutputSpec) -> Self {
        Self { spec }
    }

    /// Undo the output scaling, if any
    pub fn decode(&self, raw: f64) -> f64 {
        match self.spec.scaling {
            Some(scaling) => scaling.unscale(raw),
            None => raw,
        }
    }

    pub fn unit(&self) -> &str {
        &self.spec.unit
    }
}
