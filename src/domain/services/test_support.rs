// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use super::auth_service::{hash_password, AuthService};
use super::cart_service::CartService;
use super::category_service::CategoryService;
use super::email_service::EmailService;
use super::image_service::ImageService;
use super::order_service::OrderService;
use super::presupuesto_service::PresupuestoService;
use super::product_service::ProductService;
use super::user_service::UserService;
use crate::config::settings::AuthSettings;
use crate::domain::models::product::{NewProduct, Product};
use crate::domain::models::user::{NewUser, User, UserRole};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::infrastructure::database::connection::{connect_in_memory, run_migrations};
use crate::infrastructure::messaging::{MessagePublisher, MessagingError};
use crate::infrastructure::repositories::cart_repo_impl::CartRepositoryImpl;
use crate::infrastructure::repositories::category_repo_impl::CategoryRepositoryImpl;
use crate::infrastructure::repositories::order_repo_impl::OrderRepositoryImpl;
use crate::infrastructure::repositories::product_image_repo_impl::ProductImageRepositoryImpl;
use crate::infrastructure::repositories::product_repo_impl::ProductRepositoryImpl;
use crate::infrastructure::repositories::user_repo_impl::UserRepositoryImpl;
use crate::infrastructure::storage::InMemoryStorage;
use crate::utils::slug::slugify;

/// 记录已发布消息的发布者
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<(String, Value)>>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<(String, Value)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, pattern: &str, data: Value) -> Result<(), MessagingError> {
        self.messages.lock().unwrap().push((pattern.to_string(), data));
        Ok(())
    }
}

/// 基于内存 SQLite 的服务装配
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub user_repo: Arc<UserRepositoryImpl>,
    pub product_repo: Arc<ProductRepositoryImpl>,
    pub storage: Arc<InMemoryStorage>,
    pub publisher: Arc<RecordingPublisher>,
    pub auth: Arc<AuthService>,
    pub users: UserService,
    pub categories: Arc<CategoryService>,
    pub products: ProductService,
    pub images: ImageService,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub email: EmailService,
    pub presupuestos: PresupuestoService,
    pub email_to: String,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::from_db(Arc::new(connect_in_memory().await.unwrap()))
    }

    /// 基于临时目录中的 SQLite 文件，连接池允许多个并发连接
    pub async fn file_backed(dir: &Path) -> Self {
        let url = format!("sqlite://{}?mode=rwc", dir.join("kansaco.db").display());
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(8).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt).await.unwrap();
        run_migrations(&db).await.unwrap();
        Self::from_db(Arc::new(db))
    }

    fn from_db(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = Arc::new(UserRepositoryImpl::new(db.clone()));
        let product_repo = Arc::new(ProductRepositoryImpl::new(db.clone()));
        let category_repo = Arc::new(CategoryRepositoryImpl::new(db.clone()));
        let image_repo = Arc::new(ProductImageRepositoryImpl::new(db.clone()));
        let cart_repo = Arc::new(CartRepositoryImpl::new(db.clone()));
        let order_repo = Arc::new(OrderRepositoryImpl::new(db.clone()));
        let storage = Arc::new(InMemoryStorage::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let email_to = "ventas@example.com".to_string();

        let auth = Arc::new(AuthService::new(&AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
        }));
        let users = UserService::new(user_repo.clone(), cart_repo.clone(), auth.clone());
        let categories = Arc::new(CategoryService::new(category_repo));
        let products = ProductService::new(product_repo.clone(), categories.clone());
        let images = ImageService::new(
            product_repo.clone(),
            image_repo.clone(),
            storage.clone(),
            "http://cdn.test".to_string(),
        );
        let carts = Arc::new(CartService::new(cart_repo, product_repo.clone(), user_repo.clone()));
        let orders = Arc::new(OrderService::new(order_repo));
        let email = EmailService::new(carts.clone(), orders.clone(), publisher.clone(), email_to.clone());
        let presupuestos = PresupuestoService::new(image_repo, publisher.clone(), email_to.clone());

        Self {
            db,
            user_repo,
            product_repo,
            storage,
            publisher,
            auth,
            users,
            categories,
            products,
            images,
            carts,
            orders,
            email,
            presupuestos,
            email_to,
        }
    }

    /// 直接写入一个零售客户，不创建购物车
    pub async fn user(&self, email: &str) -> User {
        self.user_repo
            .create(NewUser {
                email: email.to_string(),
                password_hash: hash_password("secreto123").unwrap(),
                nombre: "Test".to_string(),
                apellido: "User".to_string(),
                direccion: None,
                telefono: String::new(),
                rol: UserRole::ClienteMinorista,
            })
            .await
            .unwrap()
    }

    /// 写入一个可见产品，价格 100
    pub async fn product(&self, name: &str, presentation: &str) -> Product {
        self.product_repo
            .create(
                NewProduct {
                    name: name.to_string(),
                    slug: slugify(name),
                    sku: String::new(),
                    description: format!("{} description", name),
                    presentation: presentation.to_string(),
                    aplication: "General".to_string(),
                    image_url: None,
                    whole_saler: None,
                    stock: 10,
                    is_visible: true,
                    is_featured: false,
                    price: Decimal::from(100),
                },
                &[],
            )
            .await
            .unwrap()
    }
}
