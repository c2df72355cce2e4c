//! Role prediction. Both the vectorizer and the classifier are optional; when
//! either is missing the prediction is the fixed [`MODEL_UNAVAILABLE`] label.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::extraction::role_model::{
    LinearRoleModel, ModelError, RoleModel, TfidfVectorizer, Vectorizer,
};
use crate::extraction::text::DocumentText;

pub const MODEL_UNAVAILABLE: &str = "Unknown Role (model not loaded)";

#[derive(Clone)]
pub struct RoleClassifier {
    vectorizer: Option<Arc<dyn Vectorizer>>,
    model: Option<Arc<dyn RoleModel>>,
    timeout: Duration,
}

impl RoleClassifier {
    pub fn new(
        vectorizer: Option<Arc<dyn Vectorizer>>,
        model: Option<Arc<dyn RoleModel>>,
        timeout: Duration,
    ) -> Self {
        Self {
            vectorizer,
            model,
            timeout,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(None, None, Duration::from_secs(5))
    }

    /// Loads the JSON model files. Any load failure, including a vectorizer
    /// whose feature count differs from the model's, is logged and recorded as
    /// an absent capability; it never fails startup.
    pub fn load(
        vectorizer_path: Option<&Path>,
        model_path: Option<&Path>,
        timeout: Duration,
    ) -> Self {
        let vectorizer = vectorizer_path.and_then(|path| match TfidfVectorizer::load(path) {
            Ok(v) => {
                info!("Loaded role vectorizer from {} ({} features)", path.display(), v.dim());
                Some(v)
            }
            Err(e) => {
                warn!("Role vectorizer unavailable ({}): {e}", path.display());
                None
            }
        });

        let model = model_path.and_then(|path| match LinearRoleModel::load(path) {
            Ok(m) => {
                info!("Loaded role model from {} ({} classes)", path.display(), m.classes().len());
                Some(m)
            }
            Err(e) => {
                warn!("Role model unavailable ({}): {e}", path.display());
                None
            }
        });

        let (vectorizer, model) = match (vectorizer, model) {
            (Some(v), Some(m)) if v.dim() != m.n_features() => {
                warn!(
                    "Role model expects {} features but vectorizer produces {}; role classifier disabled",
                    m.n_features(),
                    v.dim()
                );
                (None, None)
            }
            pair => pair,
        };

        Self::new(
            vectorizer.map(|v| Arc::new(v) as Arc<dyn Vectorizer>),
            model.map(|m| Arc::new(m) as Arc<dyn RoleModel>),
            timeout,
        )
    }

    pub fn is_available(&self) -> bool {
        self.vectorizer.is_some() && self.model.is_some()
    }

    /// Predicted role label, or [`MODEL_UNAVAILABLE`]. Never fails.
    ///
    /// Inference runs on the blocking pool under the configured timeout. One
    /// failed attempt is retried before falling back to the sentinel; a
    /// timeout is not retried.
    pub async fn predict_role(&self, text: &DocumentText) -> String {
        let (Some(vectorizer), Some(model)) = (&self.vectorizer, &self.model) else {
            return MODEL_UNAVAILABLE.to_string();
        };

        for attempt in 1..=2 {
            match self.infer(vectorizer.clone(), model.clone(), text.clone()).await {
                Ok(label) => return label,
                Err(e @ ModelError::Timeout(_)) => {
                    warn!("Role inference attempt {attempt} failed: {e}");
                    return MODEL_UNAVAILABLE.to_string();
                }
                Err(e) => debug!("Role inference attempt {attempt} failed: {e}"),
            }
        }

        warn!("Role inference failed twice, reporting model as unavailable");
        MODEL_UNAVAILABLE.to_string()
    }

    async fn infer(
        &self,
        vectorizer: Arc<dyn Vectorizer>,
        model: Arc<dyn RoleModel>,
        text: DocumentText,
    ) -> Result<String, ModelError> {
        let task = tokio::task::spawn_blocking(move || {
            let features = vectorizer.transform(text.as_str())?;
            model.predict(&features)
        });

        // A timed-out blocking task cannot be cancelled and runs to completion.
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ModelError::Inference(join_error.to_string())),
            Err(_) => Err(ModelError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::role_model::FeatureVector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LengthVectorizer;

    impl Vectorizer for LengthVectorizer {
        fn transform(&self, text: &str) -> Result<FeatureVector, ModelError> {
            Ok(FeatureVector {
                dim: 1,
                entries: vec![(0, text.len() as f32)],
            })
        }
    }

    struct ThresholdModel;

    impl RoleModel for ThresholdModel {
        fn predict(&self, features: &FeatureVector) -> Result<String, ModelError> {
            let length = features.entries.first().map(|e| e.1).unwrap_or(0.0);
            Ok(if length > 20.0 { "Senior" } else { "Junior" }.to_string())
        }
    }

    struct FailingModel {
        calls: AtomicUsize,
    }

    impl RoleModel for FailingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ModelError::Inference("corrupt weights".to_string()))
        }
    }

    struct SlowModel {
        calls: AtomicUsize,
    }

    impl RoleModel for SlowModel {
        fn predict(&self, _features: &FeatureVector) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            Ok("Too Late".to_string())
        }
    }

    fn doc(s: &str) -> DocumentText {
        DocumentText::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_no_models_returns_sentinel() {
        let classifier = RoleClassifier::unavailable();
        assert!(!classifier.is_available());
        assert_eq!(classifier.predict_role(&doc("anything")).await, MODEL_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_missing_vectorizer_returns_sentinel() {
        let classifier =
            RoleClassifier::new(None, Some(Arc::new(ThresholdModel)), Duration::from_secs(1));
        assert_eq!(classifier.predict_role(&doc("anything")).await, MODEL_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_missing_model_returns_sentinel() {
        let classifier =
            RoleClassifier::new(Some(Arc::new(LengthVectorizer)), None, Duration::from_secs(1));
        assert_eq!(classifier.predict_role(&doc("anything")).await, MODEL_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_predicts_with_both_capabilities() {
        let classifier = RoleClassifier::new(
            Some(Arc::new(LengthVectorizer)),
            Some(Arc::new(ThresholdModel)),
            Duration::from_secs(1),
        );
        assert!(classifier.is_available());
        assert_eq!(classifier.predict_role(&doc("short cv")).await, "Junior");
        assert_eq!(
            classifier
                .predict_role(&doc("a considerably longer resume body"))
                .await,
            "Senior"
        );
    }

    #[tokio::test]
    async fn test_inference_failure_retries_once_then_sentinel() {
        let model = Arc::new(FailingModel {
            calls: AtomicUsize::new(0),
        });
        let shared: Arc<dyn RoleModel> = model.clone();
        let classifier = RoleClassifier::new(
            Some(Arc::new(LengthVectorizer)),
            Some(shared),
            Duration::from_secs(1),
        );
        assert_eq!(classifier.predict_role(&doc("text")).await, MODEL_UNAVAILABLE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let model = Arc::new(SlowModel {
            calls: AtomicUsize::new(0),
        });
        let shared: Arc<dyn RoleModel> = model.clone();
        let classifier = RoleClassifier::new(
            Some(Arc::new(LengthVectorizer)),
            Some(shared),
            Duration::from_millis(20),
        );
        assert_eq!(classifier.predict_role(&doc("text")).await, MODEL_UNAVAILABLE);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dimension_mismatch_disables_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let vectorizer_path = dir.path().join("vectorizer.json");
        let model_path = dir.path().join("model.json");
        std::fs::write(
            &vectorizer_path,
            r#"{"vocabulary": {"django": 0, "excel": 1, "sql": 2}, "idf": [1.0, 1.0, 1.0]}"#,
        )
        .unwrap();
        std::fs::write(
            &model_path,
            r#"{"classes": ["Analyst", "Web Developer"], "coef": [[1.0, -1.0]], "intercept": [0.0]}"#,
        )
        .unwrap();

        let classifier = RoleClassifier::load(
            Some(&vectorizer_path),
            Some(&model_path),
            Duration::from_secs(1),
        );
        assert!(!classifier.is_available());
    }

    #[test]
    fn test_load_failures_are_not_fatal() {
        let classifier = RoleClassifier::load(
            Some(Path::new("/nonexistent/vectorizer.json")),
            Some(Path::new("/nonexistent/model.json")),
            Duration::from_secs(1),
        );
        assert!(!classifier.is_available());
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let vectorizer_path = dir.path().join("vectorizer.json");
        let model_path = dir.path().join("model.json");
        std::fs::write(
            &vectorizer_path,
            r#"{"vocabulary": {"django": 0, "excel": 1}, "idf": [1.0, 1.0]}"#,
        )
        .unwrap();
        std::fs::write(
            &model_path,
            r#"{"classes": ["Analyst", "Web Developer"], "coef": [[1.0, -1.0]], "intercept": [0.0]}"#,
        )
        .unwrap();

        let classifier = RoleClassifier::load(
            Some(&vectorizer_path),
            Some(&model_path),
            Duration::from_secs(1),
        );
        assert!(classifier.is_available());
        assert_eq!(
            classifier.predict_role(&doc("Django developer")).await,
            "Web Developer"
        );
        assert_eq!(classifier.predict_role(&doc("Excel reports")).await, "Analyst");
    }
}
