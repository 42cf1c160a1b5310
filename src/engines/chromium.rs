// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{
    BrowserDriver, DriverError, ObservedResponse, PageSession, ResourceKind, ResponseObserver,
    WaitCondition,
};

const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// chromiumoxide 默认启动参数去掉 `--enable-automation`，再加上反自动化检测参数
const LAUNCH_ARGS: [&str; 26] = [
    "--disable-background-networking",
    "--enable-features=NetworkService,NetworkServiceInProcess",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-component-extensions-with-background-pages",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--force-color-profile=srgb",
    "--metrics-recording-only",
    "--no-first-run",
    "--password-store=basic",
    "--use-mock-keychain",
    "--lang=en_US",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
    "--hide-scrollbars",
];

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

fn protocol_error(e: impl std::fmt::Display) -> DriverError {
    DriverError::Protocol(e.to_string())
}

/// Chromium 浏览器驱动
///
/// 基于 chromiumoxide 实现。首次打开页面时启动本地 Chrome，
/// 或在配置了 `remote_debugging_url` 时连接到远程实例；同时打开的页面数受信号量限制。
pub struct ChromiumDriver {
    settings: BrowserSettings,
    browser: OnceCell<Browser>,
    pages: Arc<Semaphore>,
}

impl ChromiumDriver {
    pub fn new(settings: BrowserSettings) -> Self {
        let permits = settings.max_concurrent_pages.max(1);
        Self {
            settings,
            browser: OnceCell::new(),
            pages: Arc::new(Semaphore::new(permits)),
        }
    }

    async fn browser(&self) -> Result<&Browser, DriverError> {
        self.browser
            .get_or_try_init(|| async {
                let (browser, mut handler) = if let Some(url) = &self.settings.remote_debugging_url
                {
                    info!("Connecting to remote Chrome instance at: {}", url);
                    Browser::connect(url).await.map_err(|e| {
                        DriverError::Launch(format!("Failed to connect to remote Chrome: {}", e))
                    })?
                } else {
                    let config = BrowserConfig::builder()
                        .disable_default_args()
                        .args(LAUNCH_ARGS)
                        .no_sandbox()
                        .request_timeout(self.settings.request_timeout())
                        .build()
                        .map_err(DriverError::Launch)?;

                    Browser::launch(config)
                        .await
                        .map_err(|e| DriverError::Launch(e.to_string()))?
                };

                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open_page(&self) -> Result<Box<dyn PageSession>, DriverError> {
        let permit = self
            .pages
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(protocol_error)?;

        page.set_user_agent(self.settings.user_agent.as_str())
            .await
            .map_err(protocol_error)?;
        page.evaluate_on_new_document(HIDE_WEBDRIVER_SCRIPT)
            .await
            .map_err(protocol_error)?;

        Ok(Box::new(ChromiumPage {
            page,
            request_timeout: self.settings.request_timeout(),
            response_drain: Duration::from_millis(self.settings.response_drain_ms),
            _permit: permit,
        }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// 单个 Chromium 页面
///
/// 持有并发名额，关闭或丢弃时归还
pub struct ChromiumPage {
    page: Page,
    request_timeout: Duration,
    response_drain: Duration,
    _permit: OwnedSemaphorePermit,
}

impl ChromiumPage {
    async fn load(&self, url: &str, wait: WaitCondition) -> Result<(), DriverError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| DriverError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        match wait {
            WaitCondition::Load => {
                self.page.goto(url).await.map_err(navigation_error)?;
            }
            WaitCondition::DomContentLoaded => {
                let mut dom_ready = self
                    .page
                    .event_listener::<EventDomContentEventFired>()
                    .await
                    .map_err(protocol_error)?;
                let reply = self
                    .page
                    .execute(NavigateParams::new(url))
                    .await
                    .map_err(navigation_error)?;
                // Chrome answers failed navigations with its own error page
                navigation_result(url, reply.result.error_text.as_deref())?;
                dom_ready.next().await;
            }
        }
        Ok(())
    }

    async fn deliver(
        &self,
        event: &EventResponseReceived,
        observer: &mut (dyn ResponseObserver + '_),
    ) {
        let response = observed_response(event);
        debug!(
            "[{}] {}",
            response.resource_kind.as_str(),
            url_tail(&response.url, 80)
        );

        if !observer.wants_body(&response) {
            return;
        }

        let body = match self
            .page
            .execute(GetResponseBodyParams::new(event.request_id.clone()))
            .await
        {
            Ok(reply) => reply.result,
            Err(e) => {
                debug!("Response body unavailable for {}: {}", response.url, e);
                return;
            }
        };

        let text = if body.base64_encoded {
            match BASE64.decode(body.body.as_bytes()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    debug!("Failed to decode body of {}: {}", response.url, e);
                    return;
                }
            }
        } else {
            body.body
        };

        observer.observe(&response, &text);
    }
}

async fn next_response(
    stream: &mut Option<EventStream<EventResponseReceived>>,
) -> Option<Arc<EventResponseReceived>> {
    match stream {
        Some(stream) => stream.next().await,
        None => futures::future::pending().await,
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn navigate(
        &self,
        url: &str,
        wait: WaitCondition,
        observer: Option<&mut (dyn ResponseObserver + '_)>,
    ) -> Result<(), DriverError> {
        let mut responses = if observer.is_some() {
            Some(
                self.page
                    .event_listener::<EventResponseReceived>()
                    .await
                    .map_err(protocol_error)?,
            )
        } else {
            None
        };

        let mut received = Vec::new();
        let navigation = tokio::time::timeout(self.request_timeout, self.load(url, wait));
        tokio::pin!(navigation);

        let outcome = loop {
            tokio::select! {
                result = &mut navigation => break result,
                Some(event) = next_response(&mut responses) => received.push(event),
            }
        };

        match outcome {
            Ok(result) => result?,
            Err(_) => return Err(DriverError::Timeout(self.request_timeout)),
        }

        // Late XHR responses keep arriving after the navigation settles
        if let Some(stream) = responses.as_mut() {
            let _ = tokio::time::timeout(self.response_drain, async {
                while let Some(event) = stream.next().await {
                    received.push(event);
                }
            })
            .await;
        }

        if let Some(observer) = observer {
            for event in &received {
                self.deliver(event, observer).await;
            }
        }

        Ok(())
    }

    async fn content(&self) -> Result<String, DriverError> {
        self.page.content().await.map_err(protocol_error)
    }

    async fn evaluate(&self, script: &str) -> Result<Value, DriverError> {
        let result = self.page.evaluate(script).await.map_err(protocol_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        let ChromiumPage { page, _permit, .. } = *self;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        Ok(())
    }
}

fn navigation_result(url: &str, error_text: Option<&str>) -> Result<(), DriverError> {
    match error_text {
        Some(reason) if !reason.is_empty() => Err(DriverError::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }),
        _ => Ok(()),
    }
}

fn observed_response(event: &EventResponseReceived) -> ObservedResponse {
    let mut headers: HashMap<String, String> = event
        .response
        .headers
        .inner()
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.to_ascii_lowercase(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    if !headers.contains_key("content-type") && !event.response.mime_type.is_empty() {
        headers.insert("content-type".to_string(), event.response.mime_type.clone());
    }

    ObservedResponse {
        url: event.response.url.clone(),
        resource_kind: resource_kind(&event.r#type),
        headers,
    }
}

fn resource_kind(kind: &ResourceType) -> ResourceKind {
    match kind {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

fn url_tail(url: &str, max_chars: usize) -> &str {
    let count = url.chars().count();
    if count <= max_chars {
        return url;
    }
    match url.char_indices().nth(count - max_chars) {
        Some((index, _)) => &url[index..],
        None => url,
    }
}
