/// The fixed set of models offered in the picker.
///
/// Each entry pairs the name shown to the user with the identifier sent as
/// the `model` field of a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Gpt4o,
    Claude35Sonnet,
    Gemini15Pro,
    MistralLarge,
}

impl Model {
    pub fn provider_id(&self) -> &'static str {
        match self {
            Model::Gpt4o => "openai/gpt-4o",
            Model::Claude35Sonnet => "anthropic/claude-3.5-sonnet",
            Model::Gemini15Pro => "google/gemini-1.5-pro",
            Model::MistralLarge => "mistralai/mistral-large",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Gpt4o => "GPT-4o (OpenAI)",
            Model::Claude35Sonnet => "Claude 3.5 Sonnet (Anthropic)",
            Model::Gemini15Pro => "Gemini 1.5 Pro (Google)",
            Model::MistralLarge => "Mistral Large (Mistral)",
        }
    }

    pub fn all() -> Vec<Model> {
        vec![
            Model::Gpt4o,
            Model::Claude35Sonnet,
            Model::Gemini15Pro,
            Model::MistralLarge,
        ]
    }
}
