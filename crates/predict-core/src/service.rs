//! Prediction service
//!
//! Runs one request through the pipeline: validate, encode, invoke the model,
//! decode. The configuration and model are shared read-only, so a single
//! service value can be cloned into any number of concurrent handlers.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::FeatureCodec;
use crate::config::ModelConfig;
use crate::decoder::OutputDecoder;
use crate::error::{ConfigError, ModelError, PredictError, Result};
use crate::model::{load_model, Regressor};

/// Successful prediction, ready to be returned to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub success: bool,
    pub prediction: f64,
    pub unit: String,
    /// The request exactly as received
    pub input: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    config: Arc<ModelConfig>,
    model: Arc<dyn Regressor>,
}

impl PredictionService {
    /// Bind a configuration to a model
    ///
    /// Fails if the model's input width differs from the number of
    /// configured features.
    pub fn new(config: ModelConfig, model: Arc<dyn Regressor>) -> std::result::Result<Self, ConfigError> {
        if model.n_features() != config.features.len() {
            return Err(ConfigError::FeatureCountMismatch {
                model: model.n_features(),
                configured: config.features.len(),
            });
        }
        Ok(Self {
            config: Arc::new(config),
            model,
        })
    }

    /// Load the configuration file and the model it references
    pub fn load(config_path: &Path) -> std::result::Result<Self, ConfigError> {
        let config = ModelConfig::load(config_path)?;
        let model = load_model(&config.metadata.model_file)?;
        Self::new(config, model)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Predict from a decoded request body
    ///
    /// An absent body, `null`, or an empty value is rejected as carrying no
    /// data. Any other non-object body is an invalid request.
    pub fn predict_json(&self, body: Option<Value>) -> Result<PredictionResult> {
        match body {
            None | Some(Value::Null) => Err(PredictError::NoData),
            Some(Value::Object(input)) => self.predict(input),
            Some(other) if is_empty(&other) => Err(PredictError::NoData),
            Some(_) => Err(PredictError::InvalidRequest(
                "expected a JSON object of feature values".to_string(),
            )),
        }
    }

    /// Predict from a map of feature name to raw value
    pub fn predict(&self, input: Map<String, Value>) -> Result<PredictionResult> {
        if input.is_empty() {
            return Err(PredictError::NoData);
        }

        let vector = FeatureCodec::new(&self.config.features).encode(&input)?;
        let raw = self.model.predict_one(&vector)?;

        let decoder = OutputDecoder::new(&self.config.output);
        let prediction = decoder.decode(raw);
        if !prediction.is_finite() {
            return Err(ModelError::NonFinite(prediction).into());
        }

        tracing::debug!(
            "Predicted {} {} (raw {}) from {:?}",
            prediction,
            decoder.unit(),
            raw,
            vector
        );

        Ok(PredictionResult {
            success: true,
            prediction,
            unit: decoder.unit().to_string(),
            input,
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureSpec;
    use crate::error::EncodingError;
    use crate::model::LinearRegressor;
    use crate::scaling::MinMax;
    use serde_json::json;

    const CONFIG: &str = r#"{
        "model": { "name": "Salary Predictor", "version": "1.0", "model_file": "model.json" },
        "features": [
            {
                "name": "Age",
                "type": "numeric",
                "scaling": { "type": "minmax", "min_value": 18, "max_value": 70 }
            },
            {
                "name": "Level",
                "type": "categorical",
                "encoding": { "0": "Junior", "1": "Senior" }
            }
        ],
        "output": {
            "scaling": { "type": "minmax", "min_value": 30000, "max_value": 150000 },
            "unit": "USD"
        }
    }"#;

    fn service() -> PredictionService {
        let config = ModelConfig::from_json(CONFIG).unwrap();
        // 0.4 * age_scaled + 0.2 * level
        let model = Arc::new(LinearRegressor::new(vec![0.4, 0.2], 0.0).unwrap());
        PredictionService::new(config, model).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_predict_end_to_end() {
        let input = object(json!({"Age": 44, "Level": "Senior"}));
        let result = service().predict(input.clone()).unwrap();

        // 0.4 * 0.5 + 0.2 * 1 = 0.4 → 78000
        assert!(result.success);
        assert!((result.prediction - 78000.0).abs() < 1e-6);
        assert_eq!(result.unit, "USD");
        assert_eq!(result.input, input);
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert!(matches!(
            service().predict(Map::new()),
            Err(PredictError::NoData)
        ));
    }

    #[test]
    fn test_predict_json_bodies() {
        let svc = service();
        assert!(matches!(svc.predict_json(None), Err(PredictError::NoData)));
        assert!(matches!(svc.predict_json(Some(json!(null))), Err(PredictError::NoData)));
        assert!(matches!(svc.predict_json(Some(json!({}))), Err(PredictError::NoData)));
        assert!(matches!(svc.predict_json(Some(json!([]))), Err(PredictError::NoData)));
        assert!(matches!(
            svc.predict_json(Some(json!([1, 2]))),
            Err(PredictError::InvalidRequest(_))
        ));
        assert!(svc
            .predict_json(Some(json!({"Age": 30, "Level": "Junior"})))
            .is_ok());
    }

    #[test]
    fn test_encoding_error_propagates() {
        let err = service()
            .predict(object(json!({"Age": 30, "Level": "Lead"})))
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(
            err,
            PredictError::Encoding(EncodingError::InvalidCategoricalValue(..))
        ));
    }

    #[derive(Debug)]
    struct FailingModel;

    impl Regressor for FailingModel {
        fn n_features(&self) -> usize {
            2
        }

        fn predict(&self, _rows: &[Vec<f64>]) -> std::result::Result<Vec<f64>, ModelError> {
            Err(ModelError::Internal("model exploded".to_string()))
        }
    }

    #[test]
    fn test_model_failure_is_server_error() {
        let config = ModelConfig::from_json(CONFIG).unwrap();
        let svc = PredictionService::new(config, Arc::new(FailingModel)).unwrap();
        let err = svc
            .predict(object(json!({"Age": 30, "Level": "Junior"})))
            .unwrap_err();
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Prediction failed: model exploded");
    }

    #[test]
    fn test_non_finite_prediction_is_server_error() {
        // Degenerate Age range: every input scales to ±inf or NaN
        let mut config = ModelConfig::from_json(CONFIG).unwrap();
        config.features[0] = FeatureSpec::numeric("Age", Some(MinMax::new(40.0, 40.0)));
        let model = Arc::new(LinearRegressor::new(vec![0.4, 0.2], 0.0).unwrap());
        let svc = PredictionService::new(config, model).unwrap();

        for age in [json!(40), json!(55)] {
            let err = svc
                .predict(object(json!({"Age": age, "Level": "Junior"})))
                .unwrap_err();
            assert!(!err.is_client_error());
            assert!(matches!(err, PredictError::Model(ModelError::NonFinite(_))));
            assert!(err.to_string().starts_with("Prediction failed: prediction is not a finite number"));
        }
    }

    #[test]
    fn test_feature_count_mismatch_fails_fast() {
        let config = ModelConfig::from_json(CONFIG).unwrap();
        let model = Arc::new(LinearRegressor::new(vec![1.0, 1.0, 1.0], 0.0).unwrap());
        let err = PredictionService::new(config, model).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::FeatureCountMismatch {
                model: 3,
                configured: 2
            }
        ));
    }

    #[test]
    fn test_unscaled_output_passthrough() {
        let mut config = ModelConfig::from_json(CONFIG).unwrap();
        config.output.scaling = None;
        config.features = vec![
            FeatureSpec::numeric("Age", None),
            FeatureSpec::categorical("Level", [(0, "Junior"), (1, "Senior")]),
        ];
        let model = Arc::new(LinearRegressor::new(vec![1.0, 10.0], 0.5).unwrap());
        let svc = PredictionService::new(config, model).unwrap();

        let result = svc
            .predict(object(json!({"Age": 44, "Level": "Senior"})))
            .unwrap();
        assert_eq!(result.prediction, 54.5);
    }

    #[test]
    fn test_result_serialization() {
        let result = service()
            .predict(object(json!({"Level": "Junior", "Age": 18})))
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["unit"], "USD");
        assert_eq!(json["input"], json!({"Level": "Junior", "Age": 18}));
        let keys: Vec<_> = json["input"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["Level", "Age"]);
    }
}
