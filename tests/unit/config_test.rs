// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 验证环境变量能够覆盖内置默认值
#[cfg(test)]
mod tests {
    use eventcrawl::config::settings::Settings;
    use std::time::Duration;

    #[test]
    fn test_environment_overrides_defaults() {
        std::env::set_var("EVENTCRAWL__SCHEDULER__POLL_INTERVAL_SECS", "3");
        std::env::set_var("EVENTCRAWL__DISCOVERY__TARGET_HOST", "events.example.org");
        std::env::set_var("EVENTCRAWL__RULE_GENERATOR__API_KEY", "sk-test");

        let settings = Settings::new().expect("settings should load");

        std::env::remove_var("EVENTCRAWL__SCHEDULER__POLL_INTERVAL_SECS");
        std::env::remove_var("EVENTCRAWL__DISCOVERY__TARGET_HOST");
        std::env::remove_var("EVENTCRAWL__RULE_GENERATOR__API_KEY");

        assert_eq!(settings.scheduler.poll_interval(), Duration::from_secs(3));
        assert_eq!(settings.discovery.target_host, "events.example.org");
        assert_eq!(settings.rule_generator.api_key.as_deref(), Some("sk-test"));
        // Untouched values keep their defaults
        assert_eq!(settings.discovery.max_links, 10);
        assert_eq!(settings.scheduler.seed_frequency_hours, 4);
    }
}
