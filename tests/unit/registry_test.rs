// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use eventcrawl::config::settings::Settings;
use eventcrawl::domain::models::rule::RuleSet;
use eventcrawl::domain::repositories::rule_repository::RuleRepository;
use eventcrawl::domain::repositories::RepositoryError;
use eventcrawl::domain::services::rule_engine::AdaptiveRuleEngine;
use eventcrawl::domain::services::rule_generator::LlmRuleGenerator;
use eventcrawl::infrastructure::storage::InMemoryStorage;
use eventcrawl::strategies::discovery::DiscoveryStrategy;
use eventcrawl::strategies::generic::GenericStrategy;
use eventcrawl::strategies::registry::{
    DispatchError, StrategyRegistry, GENERIC_ADAPTIVE, LUMA_SEARCH_V2,
};
use std::sync::Arc;

struct NoRules;

#[async_trait]
impl RuleRepository for NoRules {
    async fn find_by_domain(&self, _domain: &str) -> Result<Option<RuleSet>, RepositoryError> {
        Ok(None)
    }

    async fn save(&self, _rules: &RuleSet) -> Result<(), RepositoryError> {
        Ok(())
    }
}

fn registry() -> StrategyRegistry {
    let settings = Settings::defaults().unwrap();
    let generator = Arc::new(LlmRuleGenerator::new(&settings.rule_generator).unwrap());
    let engine = Arc::new(AdaptiveRuleEngine::new(Arc::new(NoRules), generator));

    let mut registry = StrategyRegistry::new();
    registry.register(
        LUMA_SEARCH_V2,
        Arc::new(DiscoveryStrategy::new(
            settings.discovery,
            Arc::new(InMemoryStorage::new()),
        )),
    );
    registry.register(GENERIC_ADAPTIVE, Arc::new(GenericStrategy::new(engine)));
    registry
}

#[test]
fn test_registered_strategies_resolve_by_key() {
    let registry = registry();

    assert_eq!(registry.keys(), vec![GENERIC_ADAPTIVE, LUMA_SEARCH_V2]);

    let discovery = registry.resolve(LUMA_SEARCH_V2).unwrap();
    assert_eq!(discovery.name(), LUMA_SEARCH_V2);
    assert!(discovery.can_handle("https://lu.ma/search?q=chiang+mai"));

    let generic = registry.resolve(GENERIC_ADAPTIVE).unwrap();
    assert_eq!(generic.name(), GENERIC_ADAPTIVE);
    assert!(generic.can_handle("https://events.example.org/calendar"));
    assert!(!generic.can_handle("ftp://files.example.org/events.csv"));
}

#[test]
fn test_unknown_key_is_a_dispatch_error() {
    let registry = registry();

    let result = registry.resolve("EVENTBRITE_V1");
    assert_eq!(
        result.err(),
        Some(DispatchError::UnknownStrategy("EVENTBRITE_V1".to_string()))
    );
}
