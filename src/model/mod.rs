pub mod store;

use std::sync::Arc;

use anyhow::Result;

use crate::dataset::frame::FeatureMatrix;

/// A scoring capability: given a feature matrix, produce one numeric
/// prediction per row. The drift analysis is agnostic to how the model was
/// trained or stored.
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

/// Named collection of loaded models, iterated in registration order.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: Vec<Arc<dyn Regressor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Arc<dyn Regressor>) {
        self.models.push(model);
    }

    pub fn models(&self) -> &[Arc<dyn Regressor>] {
        &self.models
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Regressor>> {
        self.models.iter().find(|m| m.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantModel(&'static str);

    impl Regressor for ConstantModel {
        fn name(&self) -> &str {
            self.0
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(vec![0.0; features.len()])
        }
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = ModelRegistry::new();
        registry.register(Arc::new(ConstantModel("xgboost")));
        registry.register(Arc::new(ConstantModel("random_forest")));
        let names: Vec<&str> = registry.models().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["xgboost", "random_forest"]);
        assert!(registry.by_name("random_forest").is_some());
        assert!(registry.by_name("missing").is_none());
    }
}
