// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::RuleGeneratorSettings;
use crate::domain::models::rule::GeneratedRules;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?").expect("code fence pattern is valid"));

/// 规则生成错误类型
#[derive(Error, Debug)]
pub enum RuleGenerationError {
    /// 未配置 API 密钥
    #[error("Rule generator API key not configured")]
    NotConfigured,
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务返回非成功状态
    #[error("Rule generator returned {status}: {body}")]
    Api { status: u16, body: String },
    /// 响应结构不符合预期
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// 选择器 JSON 解析失败
    #[error("Failed to parse selectors: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 规则生成服务特质
///
/// 外部协作者：根据域名与 HTML 样本生成五个选择器，任一字段都可能缺失
#[async_trait]
pub trait RuleGenerator: Send + Sync {
    async fn generate(
        &self,
        domain: &str,
        html_sample: &str,
    ) -> Result<GeneratedRules, RuleGenerationError>;
}

/// 基于 LLM 的规则生成服务
///
/// # 功能
///
/// 调用 OpenAI 兼容的 chat completions 接口，让模型为给定的 HTML 片段
/// 返回事件卡片及其字段的 CSS 选择器
///
/// # 配置
///
/// 通过 [`RuleGeneratorSettings`] 进行配置：
/// - `api_key` - LLM API密钥（缺失时每次调用都返回 `NotConfigured`）
/// - `model` - 使用的模型名称
/// - `api_base_url` - LLM API基础URL
pub struct LlmRuleGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

impl LlmRuleGenerator {
    pub fn new(settings: &RuleGeneratorSettings) -> Result<Self, RuleGenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_prompt(domain: &str, html_sample: &str) -> String {
        format!(
            "You are an expert web scraper. I need CSS selectors to extract event information \
            from the following HTML code snippet from {domain}.\n\n\
            HTML Snippet:\n```html\n{html_sample}\n```\n\n\
            Please return a JSON object with the following keys:\n\
            - event_card_selector: The selector for the container element of each individual event.\n\
            - title_selector: The selector for the event title (relative to the card).\n\
            - date_selector: The selector for the event date/time (relative to the card).\n\
            - location_selector: The selector for the event location (relative to the card).\n\
            - link_selector: The selector for the main link to the event details (relative to the card).\n\n\
            If a specific field is not found, use \"null\".\n\
            Return ONLY the raw JSON string, no markdown code blocks."
        )
    }

    /// 从模型回复中解析选择器
    ///
    /// 模型有时仍会返回 markdown 代码块，这里先去掉代码块标记再解析
    pub fn parse_reply(content: &str) -> Result<GeneratedRules, RuleGenerationError> {
        let cleaned = CODE_FENCE.replace_all(content, "");
        Ok(serde_json::from_str::<GeneratedRules>(cleaned.trim())?)
    }
}

#[async_trait]
impl RuleGenerator for LlmRuleGenerator {
    async fn generate(
        &self,
        domain: &str,
        html_sample: &str,
    ) -> Result<GeneratedRules, RuleGenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RuleGenerationError::NotConfigured)?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful scraping assistant. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": Self::build_prompt(domain, html_sample)
                }
            ],
            "temperature": 0.0
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RuleGenerationError::Api { status, body });
        }

        let body: Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                RuleGenerationError::InvalidResponse("missing choices[0].message.content".into())
            })?;

        Self::parse_reply(content)
    }
}
