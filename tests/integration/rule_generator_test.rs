// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use eventcrawl::config::settings::RuleGeneratorSettings;
use eventcrawl::domain::services::rule_generator::{
    LlmRuleGenerator, RuleGenerationError, RuleGenerator,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn settings_for(server: &MockServer) -> RuleGeneratorSettings {
    RuleGeneratorSettings {
        api_key: Some("test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        api_base_url: format!("{}/", server.uri()),
        sample_limit: 5000,
    }
}

pub fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn test_generate_parses_fenced_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"event_card_selector\": \"li.listing\", \"title_selector\": \"h2\", \"date_selector\": \"time\", \"location_selector\": null, \"link_selector\": \"a.more\"}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let generator = LlmRuleGenerator::new(&settings_for(&server)).unwrap();
    let rules = generator
        .generate("events.example.org", "<ul><li class=\"listing\"></li></ul>")
        .await
        .unwrap();

    assert_eq!(rules.event_card_selector.as_deref(), Some("li.listing"));
    assert_eq!(rules.title_selector.as_deref(), Some("h2"));
    assert_eq!(rules.date_selector.as_deref(), Some("time"));
    assert_eq!(rules.location_selector, None);
    assert_eq!(rules.link_selector.as_deref(), Some("a.more"));
}

#[tokio::test]
async fn test_generate_reports_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let generator = LlmRuleGenerator::new(&settings_for(&server)).unwrap();
    let result = generator.generate("events.example.org", "<html></html>").await;

    match result {
        Err(RuleGenerationError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream overloaded");
        }
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_rejects_reply_without_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let generator = LlmRuleGenerator::new(&settings_for(&server)).unwrap();
    let result = generator.generate("events.example.org", "<html></html>").await;

    assert!(matches!(result, Err(RuleGenerationError::InvalidResponse(_))));
}
