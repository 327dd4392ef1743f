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

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorLimiter};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::settings::RateLimitingSettings;
use crate::presentation::errors::HttpError;

/// 速率限制错误类型
#[derive(Error, Debug)]
pub enum RateLimitError {
    /// 请求过多错误
    #[error("Too many requests")]
    TooManyRequests,

    /// 配置无效
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}

/// 速率限制器
///
/// 按客户端 IP 计数，窗口内最多 `max_requests` 次请求
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    trust_proxy: bool,
}

impl RateLimiter {
    /// 创建新的速率限制器实例
    ///
    /// # 参数
    ///
    /// * `max_requests` - 窗口内允许的请求数
    /// * `window` - 窗口长度
    ///
    /// # 返回值
    ///
    /// 请求数或窗口为零时返回错误
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(max_requests)
            .ok_or_else(|| RateLimitError::InvalidConfig("max_requests must be positive".to_string()))?;
        let period = window / max_requests;
        let quota = Quota::with_period(period)
            .ok_or_else(|| RateLimitError::InvalidConfig("window must be positive".to_string()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(GovernorLimiter::keyed(quota)),
            trust_proxy: false,
        })
    }

    pub fn from_settings(settings: &RateLimitingSettings) -> Result<Self, RateLimitError> {
        Ok(Self::new(settings.max_requests, Duration::from_secs(settings.window_secs))?
            .trusting_proxy(settings.trust_proxy))
    }

    /// 是否信任代理写入的 `X-Forwarded-For`
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// 检查客户端的请求速率是否超出限制
    pub fn check(&self, client: &str) -> Result<(), RateLimitError> {
        self.limiter
            .check_key(&client.to_string())
            .map_err(|_| RateLimitError::TooManyRequests)
    }

    /// 移除已恢复满额的客户端，返回剩余数量
    pub fn prune(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }

    /// 后台定期清理，限制器释放后任务退出
    pub fn spawn_pruning(&self, every: Duration) {
        let weak = Arc::downgrade(&self.limiter);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = weak.upgrade() else {
                    break;
                };
                limiter.retain_recent();
                limiter.shrink_to_fit();
                debug!("Rate limiter tracking {} clients", limiter.len());
            }
        });
    }

    /// 客户端标识：连接地址；仅在信任代理时使用 `X-Forwarded-For` 的第一项
    fn client_key(&self, req: &Request) -> String {
        let forwarded = self
            .trust_proxy
            .then(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .flatten();

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// 速率限制中间件，超限返回 429
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let client = limiter.client_key(&req);
    if let Err(e) = limiter.check(&client) {
        warn!("Rate limit exceeded for {}", client);
        return Err(HttpError::new(StatusCode::TOO_MANY_REQUESTS, e.to_string()));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    fn app(limiter: RateLimiter) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn_with_state(limiter, rate_limit_middleware))
    }

    async fn status_from(app: Router, peer: &str, forwarded_for: &str) -> StatusCode {
        let mut req = Request::builder()
            .uri("/")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = format!("{}:40000", peer).parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        app.oneshot(req).await.unwrap().status()
    }

    #[test]
    fn test_limiter_blocks_after_burst() {
        let limiter = RateLimiter::new(2, Duration::from_secs(900)).unwrap();
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(matches!(limiter.check("10.0.0.1"), Err(RateLimitError::TooManyRequests)));
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_zero_requests_is_rejected() {
        assert!(RateLimiter::new(0, Duration::from_secs(60)).is_err());
    }

    #[tokio::test]
    async fn test_forwarded_header_cannot_bypass_peer_limit() {
        let app = app(RateLimiter::new(2, Duration::from_secs(900)).unwrap());

        let mut accepted = 0;
        for i in 0..10 {
            let status = status_from(app.clone(), "10.0.0.1", &format!("203.0.113.{}", i)).await;
            if status == StatusCode::OK {
                accepted += 1;
            } else {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
            }
        }
        assert_eq!(accepted, 2);
        assert_eq!(status_from(app, "10.0.0.2", "203.0.113.1").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forwarded_header_is_used_behind_trusted_proxy() {
        let limiter = RateLimiter::new(1, Duration::from_secs(900))
            .unwrap()
            .trusting_proxy(true);
        let app = app(limiter);

        assert_eq!(status_from(app.clone(), "10.0.0.1", "203.0.113.7").await, StatusCode::OK);
        assert_eq!(status_from(app.clone(), "10.0.0.1", "203.0.113.8, 10.0.0.1").await, StatusCode::OK);
        assert_eq!(
            status_from(app, "10.0.0.1", "203.0.113.7").await,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_prune_drops_replenished_clients() {
        let limiter = RateLimiter::new(2, Duration::from_millis(20)).unwrap();
        for i in 0..50 {
            limiter.check(&format!("198.51.100.{}", i)).unwrap();
        }
        assert_eq!(limiter.prune(), 50);

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(limiter.prune(), 0);
    }
}
