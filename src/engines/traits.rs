// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 浏览器驱动错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 浏览器启动或连接失败
    #[error("Browser launch failed: {0}")]
    Launch(String),
    /// 导航失败
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    /// 超时
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    /// 协议或脚本执行错误
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// 导航完成的判定条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitCondition {
    /// 等待 load 事件
    #[default]
    Load,
    /// 等待 DOMContentLoaded 事件
    DomContentLoaded,
}

/// 网络响应的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    Other,
}

impl ResourceKind {
    /// 非结构化的静态资源（图片、样式、字体、媒体）
    pub fn is_asset(&self) -> bool {
        matches!(
            self,
            ResourceKind::Image | ResourceKind::Stylesheet | ResourceKind::Font | ResourceKind::Media
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Document => "document",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Image => "image",
            ResourceKind::Media => "media",
            ResourceKind::Font => "font",
            ResourceKind::Script => "script",
            ResourceKind::Xhr => "xhr",
            ResourceKind::Fetch => "fetch",
            ResourceKind::Other => "other",
        }
    }
}

/// 导航期间观察到的一次网络响应（不含响应体）
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedResponse {
    /// 响应URL
    pub url: String,
    /// 资源类型
    pub resource_kind: ResourceKind,
    /// 响应头（键为小写）
    pub headers: HashMap<String, String>,
}

impl ObservedResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// 网络响应观察者
///
/// 作为显式参数传入导航调用。驱动先用 [`ResponseObserver::wants_body`] 询问是否需要响应体，
/// 只有需要时才读取响应体并交给 [`ResponseObserver::observe`]，响应体因此是惰性获取的。
pub trait ResponseObserver: Send {
    /// 是否需要这个响应的响应体
    fn wants_body(&self, response: &ObservedResponse) -> bool;

    /// 处理响应体文本
    fn observe(&mut self, response: &ObservedResponse, body: &str);
}

/// 页面会话
///
/// 抓取策略对浏览器的全部要求：导航、读取渲染后的 HTML、执行脚本、等待元素。
#[async_trait]
pub trait PageSession: Send + Sync {
    /// 导航到指定URL
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `wait` - 导航完成的判定条件
    /// * `observer` - 可选的网络响应观察者，导航期间完成的每个响应都会交给它
    async fn navigate(
        &self,
        url: &str,
        wait: WaitCondition,
        observer: Option<&mut (dyn ResponseObserver + '_)>,
    ) -> Result<(), DriverError>;

    /// 当前页面渲染后的 HTML
    async fn content(&self) -> Result<String, DriverError>;

    /// 在页面中执行脚本并返回 JSON 值（脚本无返回值时为 `Value::Null`）
    async fn evaluate(&self, script: &str) -> Result<Value, DriverError>;

    /// 等待选择器出现，超时返回 `Ok(false)`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<bool, DriverError>;

    /// 关闭页面并释放并发名额
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// 浏览器驱动特质
///
/// 负责在并发上限内打开新页面
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn PageSession>, DriverError>;

    /// 驱动名称
    fn name(&self) -> &'static str;
}
