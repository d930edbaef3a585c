use serde::{Deserialize, Serialize};

/// Optional annotations attached to a saved network.
/// All fields are Option<> so models saved without them deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Column names of the input features, in order.
    pub feature_names: Option<Vec<String>>,
    /// Human-readable names for the output classes (e.g. ["negative", "positive"]).
    pub class_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Display name for class `idx`, falling back to the index itself.
    pub fn class_label(&self, idx: usize) -> String {
        self.class_labels
            .as_ref()
            .and_then(|labels| labels.get(idx).cloned())
            .unwrap_or_else(|| idx.to_string())
    }
}
