use std::collections::HashMap;

use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT_NAME: &str = "system_prompt";

const SYSTEM_PROMPT_RAW: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/system.j2"));

const CATALOG_RAW: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/templates.json"));

/// Supported UI templates a request may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateId {
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "code-interpreter-v1")]
    CodeInterpreterV1,
    #[serde(rename = "nextjs-developer")]
    NextjsDeveloper,
    #[serde(rename = "vue-developer")]
    VueDeveloper,
    #[serde(rename = "streamlit-developer")]
    StreamlitDeveloper,
    #[serde(rename = "gradio-developer")]
    GradioDeveloper,
}

impl TemplateId {
    pub const ALL: &'static [TemplateId] = &[
        TemplateId::Code,
        TemplateId::CodeInterpreterV1,
        TemplateId::NextjsDeveloper,
        TemplateId::VueDeveloper,
        TemplateId::StreamlitDeveloper,
        TemplateId::GradioDeveloper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Code => "code",
            TemplateId::CodeInterpreterV1 => "code-interpreter-v1",
            TemplateId::NextjsDeveloper => "nextjs-developer",
            TemplateId::VueDeveloper => "vue-developer",
            TemplateId::StreamlitDeveloper => "streamlit-developer",
            TemplateId::GradioDeveloper => "gradio-developer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub lib: Vec<String>,
    pub file: Option<String>,
    pub instructions: String,
    pub port: Option<u16>,
}

static CATALOG: Lazy<HashMap<TemplateId, TemplateSpec>> =
    Lazy::new(|| serde_json::from_str(CATALOG_RAW).expect("invalid template catalog"));

static PROMPT_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(SYSTEM_PROMPT_NAME, SYSTEM_PROMPT_RAW)
        .expect("invalid system prompt template");
    env
});

/// Renders the system prompt for the selected template.
pub fn to_prompt(id: TemplateId) -> String {
    let spec = CATALOG
        .get(&id)
        .unwrap_or_else(|| panic!("template {} missing from catalog", id.as_str()));

    PROMPT_ENV
        .get_template(SYSTEM_PROMPT_NAME)
        .and_then(|template| template.render(context! { id => id.as_str(), spec => spec }))
        .unwrap_or_else(|err| panic!("system prompt rendering failed: {err}"))
}
