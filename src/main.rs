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

use kansaco::config::settings::Settings;
use kansaco::infrastructure::database::connection;
use kansaco::infrastructure::messaging::rabbitmq::{RabbitMqConsumer, RabbitMqPublisher};
use kansaco::infrastructure::messaging::{DisabledPublisher, MessageHandler, MessagePublisher};
use kansaco::infrastructure::storage::create_storage_repository;
use kansaco::presentation::routes::{self, AppServices};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use kansaco::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.log.format);
    info!("Starting kansaco...");
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    kansaco::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    connection::run_migrations(db.as_ref()).await?;
    info!("Database migrations applied");

    // 4. Initialize Storage
    let storage = create_storage_repository(&settings.storage)?;
    info!("Storage initialized ({})", settings.storage.storage_type);

    // 5. Initialize Messaging
    let publisher: Arc<dyn MessagePublisher> = if settings.messaging.enabled {
        match RabbitMqPublisher::connect(&settings.messaging).await {
            Ok(publisher) => {
                info!("AMQP publisher connected to {}", settings.messaging.outbound_queue);
                Arc::new(publisher)
            }
            Err(e) => {
                warn!("AMQP unavailable, outbound messages will be dropped: {}", e);
                Arc::new(DisabledPublisher)
            }
        }
    } else {
        info!("Messaging disabled");
        Arc::new(DisabledPublisher)
    };

    // 6. Initialize Services
    let services = AppServices::new(db.clone(), &settings, storage, publisher);

    if settings.messaging.enabled {
        let handler: Arc<dyn MessageHandler> = services.presupuestos.clone();
        let messaging = settings.messaging.clone();
        tokio::spawn(async move {
            match RabbitMqConsumer::connect(&messaging).await {
                Ok(consumer) => {
                    if let Err(e) = consumer.run(handler).await {
                        error!("AMQP consumer stopped: {}", e);
                    }
                }
                Err(e) => error!("Failed to start AMQP consumer: {}", e),
            }
        });
    }

    // 7. Build router
    let app = routes::routes(&services, &settings)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
