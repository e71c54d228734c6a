use crate::backend_trait::SpeechBackend;
use speechprobe_core::SpeechError;
use std::collections::HashMap;

pub struct BackendRegistry {
    factories: HashMap<String, fn() -> Box<dyn SpeechBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("grpc", || Box::new(crate::grpc_backend::GrpcBackend::new()));
        registry.register("null", || Box::new(crate::null_backend::NullBackend::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn SpeechBackend>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SpeechBackend>, SpeechError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SpeechError::BackendNotFound(name.to_string()))
    }

    pub fn list_backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
