use qa_assist_common::config::ContextConfig;

/// Token window sizing for one model invocation.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindow {
    /// Total tokens the model accepts per invocation.
    pub context_limit: usize,
    /// Tokens reserved for the model's response.
    pub response_limit: usize,
}

impl ContextWindow {
    pub fn new(context_limit: usize, response_limit: usize) -> Self {
        Self {
            context_limit,
            response_limit,
        }
    }

    /// Tokens left for retrieved context once the prompt and the reserved
    /// response window are accounted for. Saturates at zero.
    pub fn available_for_context(&self, prompt_tokens: usize) -> usize {
        self.context_limit
            .saturating_sub(self.response_limit)
            .saturating_sub(prompt_tokens)
    }
}

impl From<&ContextConfig> for ContextWindow {
    fn from(config: &ContextConfig) -> Self {
        Self {
            context_limit: config.context_window_limit,
            response_limit: config.response_window_limit,
        }
    }
}
