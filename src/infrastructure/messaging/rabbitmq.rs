// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions,
};
use lapin::types::{FieldTable, ShortString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{MessageEnvelope, MessageHandler, MessagePublisher, MessagingError};
use crate::config::settings::MessagingSettings;

const CONSUMER_TAG: &str = "kansaco-backend";

/// 带指数退避的 AMQP 连接，最长重试 30 秒
async fn connect_with_retry(url: &str) -> Result<Connection, MessagingError> {
    let policy = ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    };

    let connection = backoff::future::retry(policy, || async move {
        Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| {
                warn!("AMQP connection failed, retrying: {}", e);
                backoff::Error::transient(e)
            })
    })
    .await?;

    Ok(connection)
}

async fn open_channel(url: &str, queue: &str) -> Result<(Connection, Channel), MessagingError> {
    let connection = connect_with_retry(url).await?;
    let channel = connection.create_channel().await?;
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok((connection, channel))
}

fn json_properties() -> BasicProperties {
    BasicProperties::default()
        .with_content_type(ShortString::from("application/json"))
        .with_delivery_mode(2)
}

/// 回复消息体，与请求方的 `{id, response, isDisposed}` 约定一致
fn reply_body(id: Option<String>, response: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "response": response,
        "isDisposed": true,
    })
}

/// RabbitMQ 发布者
pub struct RabbitMqPublisher {
    _connection: Connection,
    channel: Channel,
    queue: String,
}

impl RabbitMqPublisher {
    /// 连接服务器并声明出站队列
    pub async fn connect(settings: &MessagingSettings) -> Result<Self, MessagingError> {
        let (connection, channel) =
            open_channel(&settings.amqp_url, &settings.outbound_queue).await?;
        info!("AMQP publisher connected, queue {}", settings.outbound_queue);

        Ok(Self {
            _connection: connection,
            channel,
            queue: settings.outbound_queue.clone(),
        })
    }
}

#[async_trait]
impl MessagePublisher for RabbitMqPublisher {
    async fn publish(&self, pattern: &str, data: serde_json::Value) -> Result<(), MessagingError> {
        let payload = serde_json::to_vec(&MessageEnvelope::new(pattern, data))?;

        self.channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                json_properties(),
            )
            .await?
            .await?;

        debug!("Published {} message to {}", pattern, self.queue);
        Ok(())
    }
}

/// RabbitMQ 消费者
///
/// 监听入站队列，处理结果在请求携带 `reply_to` 时回复；
/// 无论处理成功与否消息都会被确认
pub struct RabbitMqConsumer {
    _connection: Connection,
    channel: Channel,
    queue: String,
}

impl RabbitMqConsumer {
    pub async fn connect(settings: &MessagingSettings) -> Result<Self, MessagingError> {
        let (connection, channel) =
            open_channel(&settings.amqp_url, &settings.inbound_queue).await?;

        Ok(Self {
            _connection: connection,
            channel,
            queue: settings.inbound_queue.clone(),
        })
    }

    /// 持续消费直到连接关闭
    pub async fn run(self, handler: Arc<dyn MessageHandler>) -> Result<(), MessagingError> {
        let mut consumer = self
            .channel
            .basic_consume(
                &self.queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        info!("AMQP consumer listening on {}", self.queue);

        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(e) => {
                    error!("Failed to receive AMQP delivery: {}", e);
                    continue;
                }
            };

            match serde_json::from_slice::<MessageEnvelope>(&delivery.data) {
                Ok(envelope) => {
                    let request_id = envelope.id.clone();
                    let response = handler.handle(envelope).await;

                    if let (Some(response), Some(reply_to)) =
                        (response, delivery.properties.reply_to().as_ref())
                    {
                        let mut properties = json_properties();
                        if let Some(correlation_id) = delivery.properties.correlation_id() {
                            properties = properties.with_correlation_id(correlation_id.clone());
                        }
                        if let Err(e) = self
                            .reply(reply_to.as_str(), reply_body(request_id, response), properties)
                            .await
                        {
                            error!("Failed to send reply to {}: {}", reply_to.as_str(), e);
                        }
                    }
                }
                Err(e) => warn!("Discarding malformed message: {}", e),
            }

            if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                error!("Failed to acknowledge delivery: {}", e);
            }
        }

        warn!("AMQP consumer stream ended");
        Ok(())
    }

    async fn reply(
        &self,
        reply_to: &str,
        body: serde_json::Value,
        properties: BasicProperties,
    ) -> Result<(), MessagingError> {
        let payload = serde_json::to_vec(&body)?;
        self.channel
            .basic_publish("", reply_to, BasicPublishOptions::default(), &payload, properties)
            .await?
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_body_shape() {
        let body = reply_body(Some("abc".to_string()), json!({"success": true}));
        assert_eq!(
            body,
            json!({"id": "abc", "response": {"success": true}, "isDisposed": true})
        );
    }
}
