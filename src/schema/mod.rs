use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The artifact a generation request produces. Handed to the provider as a
/// JSON-Schema constraint; the route itself never inspects the fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Fragment {
    /// Describe what you're about to do and the steps you want to take for generating the fragment in great detail.
    pub commentary: String,
    /// Name of the template used to generate the fragment.
    pub template: String,
    /// Short title of the fragment. Max 3 words.
    pub title: String,
    /// Short description of the fragment. Max 1 sentence.
    pub description: String,
    /// Additional dependencies required by the fragment. Do not include dependencies that are already included in the template.
    pub additional_dependencies: Vec<String>,
    /// Detect if additional dependencies that are not included in the template are required by the fragment.
    pub has_additional_dependencies: bool,
    /// Command to install additional dependencies required by the fragment.
    pub install_dependencies_command: String,
    /// Port number used by the resulted fragment. Null when no ports are exposed.
    pub port: Option<u16>,
    /// Relative path to the file, including the file name.
    pub file_path: String,
    /// Code generated by the fragment. Only runnable code is allowed.
    pub code: String,
}

/// Reply shape for the general chat route.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneralReply {
    /// Only directly answer to the users question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

pub fn fragment_schema() -> Value {
    schema_for!(Fragment).as_value().clone()
}

pub fn general_schema() -> Value {
    schema_for!(GeneralReply).as_value().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_schema_lists_the_artifact_fields() {
        let schema = fragment_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in [
            "commentary",
            "template",
            "title",
            "description",
            "additional_dependencies",
            "has_additional_dependencies",
            "install_dependencies_command",
            "port",
            "file_path",
            "code",
        ] {
            assert!(properties.contains_key(field), "missing property: {field}");
        }
    }

    #[test]
    fn general_schema_carries_commentary_only() {
        let schema = general_schema();
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 1);
        assert!(properties.contains_key("commentary"));
    }

    #[test]
    fn field_descriptions_survive_derivation() {
        let schema = general_schema();
        assert_eq!(
            schema["properties"]["commentary"]["description"],
            "Only directly answer to the users question"
        );
    }
}
