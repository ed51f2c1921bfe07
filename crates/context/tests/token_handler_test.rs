use qa_assist_common::error::ContextError;
use qa_assist_common::types::RetrievedPassage;
use qa_assist_context::TokenHandler;

fn handler() -> TokenHandler {
    TokenHandler::new("cl100k_base").unwrap()
}

// Repeated common words map to one token each under cl100k_base, giving
// passages with predictable token counts.
fn words(n: usize) -> String {
    vec!["hello"; n].join(" ")
}

#[test]
fn test_unknown_encoding_is_rejected() {
    let result = TokenHandler::new("made_up_base");
    assert!(matches!(result, Err(ContextError::Tokenization(_))));
}

#[test]
fn test_round_trip_is_lossless() {
    let handler = handler();
    for text in [
        "This is my doc",
        "multi\nline\ncontent",
        "unicode: café ☕ 你好",
        "",
    ] {
        let tokens = handler.text_to_tokens(text);
        assert_eq!(handler.tokens_to_text(&tokens).unwrap(), text);
    }
}

#[test]
fn test_fits_entirely_within_budget() {
    let handler = handler();
    let passages = [RetrievedPassage::new(words(5), 0.9)];

    let context = handler.truncate_rag_context(&passages, 100).unwrap();

    assert_eq!(context.len(), 1);
    assert_eq!(context[0].text, words(5));
}

#[test]
fn test_budget_law_holds() {
    let handler = handler();
    let passages = [
        RetrievedPassage::new(words(9), 0.9),
        RetrievedPassage::new(words(4), 0.7),
        RetrievedPassage::new(words(12), 0.5),
    ];

    for max_tokens in [0, 1, 3, 7, 10, 25, 100] {
        let context = handler.truncate_rag_context(&passages, max_tokens).unwrap();
        let total: usize = context
            .iter()
            .map(|fragment| handler.text_to_tokens(&fragment.text).len())
            .sum();
        assert!(
            total <= max_tokens,
            "{} tokens emitted for budget {}",
            total,
            max_tokens
        );
    }
}

#[test]
fn test_prefix_law_holds() {
    let handler = handler();
    let passages = [
        RetrievedPassage::new(words(6), 0.9),
        RetrievedPassage::new(words(8), 0.8),
    ];

    let context = handler.truncate_rag_context(&passages, 9).unwrap();

    assert_eq!(context.len(), 2);
    for (fragment, passage) in context.iter().zip(passages.iter()) {
        let fragment_tokens = handler.text_to_tokens(&fragment.text);
        let passage_tokens = handler.text_to_tokens(&passage.text);
        assert_eq!(fragment_tokens, passage_tokens[..fragment_tokens.len()]);
    }
}

#[test]
fn test_split_across_two_passages() {
    let handler = handler();
    let first = RetrievedPassage::new(words(5), 0.9).with_metadata("file_name", "a.pdf");
    let second = RetrievedPassage::new(words(5), 0.8);
    assert_eq!(handler.text_to_tokens(&first.text).len(), 5);

    let context = handler
        .truncate_rag_context(&[first.clone(), second.clone()], 7)
        .unwrap();

    // First passage fits whole; the second contributes exactly the two
    // remaining tokens of budget.
    assert_eq!(context.len(), 2);
    assert_eq!(context[0].text, first.text);
    assert_eq!(context[0].file_name, Some("a.pdf".to_string()));
    assert_eq!(context[0].doc_link, None);

    let second_tokens = handler.text_to_tokens(&second.text);
    let expected_tail = handler.tokens_to_text(&second_tokens[..2]).unwrap();
    assert_eq!(context[1].text, expected_tail);
    assert_eq!(context[1].file_name, None);

    let total: usize = context
        .iter()
        .map(|fragment| handler.text_to_tokens(&fragment.text).len())
        .sum();
    assert_eq!(total, 7);
}

#[test]
fn test_zero_budget_yields_empty_context() {
    let handler = handler();
    let passages = [RetrievedPassage::new(words(3), 0.9)];

    let context = handler.truncate_rag_context(&passages, 0).unwrap();
    assert!(context.is_empty());
}

#[test]
fn test_exhausted_budget_ends_the_pass() {
    let handler = handler();
    let passages = [
        RetrievedPassage::new(words(5), 0.9),
        RetrievedPassage::new(words(5), 0.8),
        RetrievedPassage::new(words(5), 0.7),
    ];

    let context = handler.truncate_rag_context(&passages, 5).unwrap();

    // The first passage consumes the whole budget; nothing later appears,
    // regardless of how small it is.
    assert_eq!(context.len(), 1);
    assert_eq!(context[0].text, words(5));
}

#[test]
fn test_empty_passage_ends_the_pass() {
    let handler = handler();
    let passages = [
        RetrievedPassage::new("", 0.9),
        RetrievedPassage::new(words(5), 0.8),
    ];

    // A passage that cannot fund a minimal fragment stops processing
    // entirely; later passages are not considered.
    let context = handler.truncate_rag_context(&passages, 10).unwrap();
    assert!(context.is_empty());
}

#[test]
fn test_fragments_preserve_input_order() {
    let handler = handler();
    let passages = [
        RetrievedPassage::new("alpha alpha alpha", 0.9),
        RetrievedPassage::new("beta beta beta", 0.8),
        RetrievedPassage::new("gamma gamma gamma", 0.7),
    ];

    let context = handler.truncate_rag_context(&passages, 100).unwrap();

    assert_eq!(context.len(), 3);
    assert!(context[0].text.starts_with("alpha"));
    assert!(context[1].text.starts_with("beta"));
    assert!(context[2].text.starts_with("gamma"));
}

#[test]
fn test_metadata_travels_with_truncated_fragment() {
    let handler = handler();
    let passage = RetrievedPassage::new(words(20), 0.9)
        .with_metadata("file_name", "scaling.md")
        .with_metadata("doc_link", "https://docs.example.com/scaling");

    let context = handler.truncate_rag_context(&[passage], 4).unwrap();

    assert_eq!(context.len(), 1);
    assert!(handler.text_to_tokens(&context[0].text).len() <= 4);
    assert_eq!(context[0].file_name, Some("scaling.md".to_string()));
    assert_eq!(
        context[0].doc_link,
        Some("https://docs.example.com/scaling".to_string())
    );
}
