// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::engines::traits::{
    BrowserDriver, DriverError, ObservedResponse, PageSession, ResourceKind, ResponseObserver,
    WaitCondition,
};

/// 预置的页面内容
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    html: String,
    evaluation: Value,
    responses: Vec<(ObservedResponse, String)>,
    fail_navigation: bool,
}

impl FakeDocument {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }

    /// 导航到该页面时直接失败
    pub fn failing() -> Self {
        Self {
            fail_navigation: true,
            ..Default::default()
        }
    }

    /// 页面上任意脚本的执行结果
    pub fn with_evaluation(mut self, value: Value) -> Self {
        self.evaluation = value;
        self
    }

    /// 导航期间产生的网络响应
    pub fn with_response(
        mut self,
        url: impl Into<String>,
        resource_kind: ResourceKind,
        content_type: &str,
        body: impl Into<String>,
    ) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        self.responses.push((
            ObservedResponse {
                url: url.into(),
                resource_kind,
                headers,
            },
            body.into(),
        ));
        self
    }
}

#[derive(Default)]
struct FakeState {
    visits: Mutex<Vec<String>>,
    bodies_fetched: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
}

/// 内存浏览器驱动
///
/// 按URL返回预置的 HTML、脚本结果和网络响应，不启动任何浏览器进程。
/// 查找时先精确匹配，再取最长的已注册前缀。
#[derive(Clone, Default)]
pub struct FakeBrowser {
    documents: Arc<HashMap<String, FakeDocument>>,
    state: Arc<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, document: FakeDocument) -> Self {
        Arc::make_mut(&mut self.documents).insert(url.into(), document);
        self
    }

    /// 所有页面按顺序导航过的URL
    pub async fn visits(&self) -> Vec<String> {
        self.state.visits.lock().await.clone()
    }

    /// 实际读取过响应体的次数
    pub fn bodies_fetched(&self) -> usize {
        self.state.bodies_fetched.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.state.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.state.pages_closed.load(Ordering::SeqCst)
    }

    fn lookup(&self, url: &str) -> Option<&FakeDocument> {
        self.documents.get(url).or_else(|| {
            self.documents
                .iter()
                .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
                .max_by_key(|(prefix, _)| prefix.len())
                .map(|(_, document)| document)
        })
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    async fn open_page(&self) -> Result<Box<dyn PageSession>, DriverError> {
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            browser: self.clone(),
            current: Mutex::new(None),
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// [`FakeBrowser`] 打开的页面
pub struct FakePage {
    browser: FakeBrowser,
    current: Mutex<Option<FakeDocument>>,
}

impl FakePage {
    async fn document(&self) -> Result<FakeDocument, DriverError> {
        self.current
            .lock()
            .await
            .clone()
            .ok_or_else(|| DriverError::Protocol("no page loaded".to_string()))
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(
        &self,
        url: &str,
        _wait: WaitCondition,
        observer: Option<&mut (dyn ResponseObserver + '_)>,
    ) -> Result<(), DriverError> {
        self.browser.state.visits.lock().await.push(url.to_string());

        let document = match self.browser.lookup(url) {
            Some(document) if !document.fail_navigation => document.clone(),
            _ => {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
                })
            }
        };

        if let Some(observer) = observer {
            for (response, body) in &document.responses {
                if observer.wants_body(response) {
                    self.browser
                        .state
                        .bodies_fetched
                        .fetch_add(1, Ordering::SeqCst);
                    observer.observe(response, body);
                }
            }
        }

        *self.current.lock().await = Some(document);
        Ok(())
    }

    async fn content(&self) -> Result<String, DriverError> {
        Ok(self.document().await?.html)
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, DriverError> {
        Ok(self.document().await?.evaluation)
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, DriverError> {
        let html = self.document().await?.html;
        let selector = Selector::parse(selector)
            .map_err(|e| DriverError::Protocol(format!("invalid selector: {}", e)))?;
        let found = Html::parse_document(&html).select(&selector).next().is_some();
        Ok(found)
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.browser
            .state
            .pages_closed
            .fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
