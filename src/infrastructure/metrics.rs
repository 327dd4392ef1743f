// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

pub const ORDERS_CREATED: &str = "orders_created_total";
pub const MESSAGES_PUBLISHED: &str = "messages_published_total";
pub const MESSAGES_PUBLISH_FAILED: &str = "messages_publish_failed_total";
pub const PRICE_UPDATES: &str = "price_updates_total";

/// 启动 Prometheus 导出器
///
/// 未配置监听地址时不安装记录器，计数调用成为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    let Some(listen_addr) = settings.listen_addr.as_deref() else {
        return;
    };

    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen_addr, e);
            return;
        }
    };

    // 端口被占用时只记录警告
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}
