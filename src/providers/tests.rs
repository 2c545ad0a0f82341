use super::*;

#[test]
fn openrouter_only_builds_generation_clients() {
    let provider = Provider::OpenRouter {
        api_key: "or-key".to_string(),
    };
    let config = ProviderConfig::default();

    let embedding = build_embedding_client(&provider, &config);
    assert!(matches!(embedding, Err(RagError::Config(_))));

    let generation = build_generation_client(&provider, &config).expect("generation client");
    assert_eq!(generation.describe(), "OpenRouter (openai/gpt-3.5-turbo)");
}

#[test]
fn openai_builds_both_clients() {
    let provider = Provider::OpenAi {
        api_key: "sk-test".to_string(),
    };
    let config = ProviderConfig::default();

    assert!(build_embedding_client(&provider, &config).is_ok());
    assert!(build_generation_client(&provider, &config).is_ok());
}
