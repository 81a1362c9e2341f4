//! The fixed catalog of answer-generation models the backend exposes.
//!
//! The set is closed: unknown ids are rejected before they can reach the
//! session or the wire.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_MODEL_ID: &str = "chatgpt5";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    pub speed: &'static str,
    pub accuracy: &'static str,
}

pub const CATALOG: &[ModelInfo] = &[
    ModelInfo {
        id: "chatgpt5",
        name: "ChatGPT-5",
        description: "OpenAI's most advanced language model with superior reasoning and multimodal capabilities",
        capabilities: &[
            "Advanced reasoning",
            "Code generation",
            "Complex analysis",
            "Creative writing",
        ],
        speed: "Fast",
        accuracy: "Highest",
    },
    ModelInfo {
        id: "claude",
        name: "Claude",
        description: "Anthropic's constitutional AI with excellent safety and helpfulness",
        capabilities: &[
            "Safety-focused",
            "Long context",
            "Detailed analysis",
            "Ethical reasoning",
        ],
        speed: "Medium",
        accuracy: "Very High",
    },
    ModelInfo {
        id: "gemini",
        name: "Gemini",
        description: "Google's multimodal AI with strong integration and search capabilities",
        capabilities: &[
            "Multimodal",
            "Search integration",
            "Real-time data",
            "Visual analysis",
        ],
        speed: "Fast",
        accuracy: "High",
    },
    ModelInfo {
        id: "perplexity",
        name: "Perplexity",
        description: "Research-focused AI with real-time web access and citation capabilities",
        capabilities: &["Web search", "Real-time info", "Citations", "Research focus"],
        speed: "Medium",
        accuracy: "High",
    },
];

static BY_ID: Lazy<HashMap<&'static str, &'static ModelInfo>> =
    Lazy::new(|| CATALOG.iter().map(|model| (model.id, model)).collect());

pub fn find(id: &str) -> Option<&'static ModelInfo> {
    BY_ID.get(id).copied()
}

pub fn default_model() -> &'static ModelInfo {
    find(DEFAULT_MODEL_ID).expect("default model missing from catalog")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_models() {
        for model in CATALOG {
            assert_eq!(find(model.id).map(|m| m.name), Some(model.name));
        }
    }

    #[test]
    fn rejects_unknown_ids() {
        assert!(find("gpt-7").is_none());
        assert!(find("").is_none());
        assert!(find("ChatGPT-5").is_none()); // display names are not ids
    }

    #[test]
    fn default_is_in_catalog() {
        assert_eq!(default_model().id, DEFAULT_MODEL_ID);
    }
}
