use tiktoken_rs::CoreBPE;

use qa_assist_common::error::{ContextError, ContextResult};
use qa_assist_common::types::{ContextFragment, RetrievedPassage};

/// A fragment must fund at least this many tokens; once the remaining
/// budget drops below it, the packing pass ends.
const MINIMUM_CONTEXT_LIMIT: usize = 1;

/// Converts text to and from token sequences and packs retrieved passages
/// into a token budget.
///
/// Holds one encoder for a fixed, named encoding; build it once and reuse
/// it. All operations are deterministic.
pub struct TokenHandler {
    encoder: CoreBPE,
}

impl TokenHandler {
    /// Build a handler for the named encoding, e.g. "cl100k_base".
    pub fn new(encoding: &str) -> ContextResult<Self> {
        let encoder = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(ContextError::Tokenization(format!(
                    "Unknown tokenizer encoding: {}",
                    other
                )))
            }
        }
        .map_err(|e| ContextError::Tokenization(e.to_string()))?;

        Ok(Self { encoder })
    }

    /// Convert text to a token sequence.
    pub fn text_to_tokens(&self, text: &str) -> Vec<usize> {
        self.encoder.encode_with_special_tokens(text)
    }

    /// Convert a token sequence back to text.
    ///
    /// Lossless for sequences produced by [`text_to_tokens`]; arbitrary
    /// sequences may cut a multi-byte character and fail, in which case the
    /// error propagates and no partial text is produced.
    ///
    /// [`text_to_tokens`]: TokenHandler::text_to_tokens
    pub fn tokens_to_text(&self, tokens: &[usize]) -> ContextResult<String> {
        self.encoder
            .decode(tokens.to_vec())
            .map_err(|e| ContextError::Tokenization(e.to_string()))
    }

    /// Pack retrieved passages into `max_tokens`, truncating as needed.
    ///
    /// Passages are consumed in input order (the retriever ranks them by
    /// descending relevance), each contributing a prefix of its token
    /// sequence. The pass ends as soon as the remaining budget cannot fund
    /// a minimal fragment; later passages are never revisited, so the
    /// returned fragments' total token count never exceeds `max_tokens`.
    pub fn truncate_rag_context(
        &self,
        passages: &[RetrievedPassage],
        max_tokens: usize,
    ) -> ContextResult<Vec<ContextFragment>> {
        let mut remaining = max_tokens;
        let mut context = Vec::new();

        for passage in passages {
            let tokens = self.text_to_tokens(&passage.text);
            tracing::debug!("Tokens count: {}", tokens.len());

            let available = tokens.len().min(remaining);
            if available < MINIMUM_CONTEXT_LIMIT {
                tracing::warn!("{} tokens are less than threshold", available);
                break;
            }

            let text = self.tokens_to_text(&tokens[..available])?;
            context.push(ContextFragment {
                text,
                file_name: passage.file_name(),
                doc_link: passage.doc_link(),
            });
            remaining -= available;
        }

        Ok(context)
    }
}
