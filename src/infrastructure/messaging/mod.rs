// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 消息队列模块
///
/// - 发布者（MessagePublisher）：向出站队列发送 `{pattern, data}` 消息
/// - RabbitMQ 实现（rabbitmq）：基于 AMQP 的发布者与 `generate-presupuesto` 消费者
pub mod rabbitmq;

/// 发送邮件消息的模式名
pub const SEND_EMAIL_PATTERN: &str = "send-email";
/// 生成报价单消息的模式名
pub const GENERATE_PRESUPUESTO_PATTERN: &str = "generate-presupuesto";

/// 消息错误类型
#[derive(Error, Debug)]
pub enum MessagingError {
    /// 消息功能未启用
    #[error("Messaging is disabled")]
    Disabled,
    /// AMQP 错误
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 队列消息信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub pattern: String,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MessageEnvelope {
    pub fn new(pattern: &str, data: serde_json::Value) -> Self {
        Self {
            pattern: pattern.to_string(),
            data,
            id: None,
        }
    }
}

/// 消息发布者特质
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// 发布一条消息到出站队列
    async fn publish(&self, pattern: &str, data: serde_json::Value) -> Result<(), MessagingError>;
}

/// 入站消息处理特质
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// 处理一条消息，返回值会回复给请求方（如请求要求回复）
    async fn handle(&self, envelope: MessageEnvelope) -> Option<serde_json::Value>;
}

/// 未启用消息功能时使用的发布者，始终返回 `Disabled`
pub struct DisabledPublisher;

#[async_trait]
impl MessagePublisher for DisabledPublisher {
    async fn publish(&self, pattern: &str, _data: serde_json::Value) -> Result<(), MessagingError> {
        tracing::debug!("Messaging disabled, dropping {} message", pattern);
        Err(MessagingError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_missing_id() {
        let envelope = MessageEnvelope::new(SEND_EMAIL_PATTERN, json!({"subject": "x"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"pattern": "send-email", "data": {"subject": "x"}}));
    }

    #[tokio::test]
    async fn test_disabled_publisher_reports_disabled() {
        let result = DisabledPublisher.publish(SEND_EMAIL_PATTERN, json!({})).await;
        assert!(matches!(result, Err(MessagingError::Disabled)));
    }
}
