// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    response::Response,
    Extension, Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::settings::{Settings, StorageSettings};
use crate::domain::models::user::UserRole;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::cart_service::CartService;
use crate::domain::services::category_service::CategoryService;
use crate::domain::services::email_service::EmailService;
use crate::domain::services::image_service::ImageService;
use crate::domain::services::order_service::OrderService;
use crate::domain::services::presupuesto_service::PresupuestoService;
use crate::domain::services::product_service::ProductService;
use crate::domain::services::user_service::UserService;
use crate::infrastructure::messaging::MessagePublisher;
use crate::infrastructure::repositories::cart_repo_impl::CartRepositoryImpl;
use crate::infrastructure::repositories::category_repo_impl::CategoryRepositoryImpl;
use crate::infrastructure::repositories::order_repo_impl::OrderRepositoryImpl;
use crate::infrastructure::repositories::product_image_repo_impl::ProductImageRepositoryImpl;
use crate::infrastructure::repositories::product_repo_impl::ProductRepositoryImpl;
use crate::infrastructure::repositories::user_repo_impl::UserRepositoryImpl;
use crate::presentation::errors::error_response;
use crate::presentation::handlers::{
    cart_handler, category_handler, email_handler, image_handler, order_handler, product_handler,
    user_handler,
};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use crate::presentation::middleware::rate_limit_middleware::{
    rate_limit_middleware, RateLimitError, RateLimiter,
};
use crate::presentation::middleware::roles_middleware::{
    roles_middleware, RolesState, ADMIN_ONLY, STAFF,
};
use crate::presentation::openapi::ApiDoc;

/// 上传图片与价格表的请求体上限
const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// 应用服务集合，由入口程序与集成测试共同装配
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub user_repo: Arc<dyn UserRepository>,
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub images: Arc<ImageService>,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub email: Arc<EmailService>,
    pub presupuestos: Arc<PresupuestoService>,
}

impl AppServices {
    /// 基于数据库连接装配全部仓库与服务
    ///
    /// # 参数
    ///
    /// * `db` - 已迁移的数据库连接
    /// * `settings` - 应用配置
    /// * `storage` - 图片存储
    /// * `publisher` - 出站消息发布者
    pub fn new(
        db: Arc<DatabaseConnection>,
        settings: &Settings,
        storage: Arc<dyn StorageRepository>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(UserRepositoryImpl::new(db.clone()));
        let product_repo = Arc::new(ProductRepositoryImpl::new(db.clone()));
        let category_repo = Arc::new(CategoryRepositoryImpl::new(db.clone()));
        let image_repo = Arc::new(ProductImageRepositoryImpl::new(db.clone()));
        let cart_repo = Arc::new(CartRepositoryImpl::new(db.clone()));
        let order_repo = Arc::new(OrderRepositoryImpl::new(db));

        let auth = Arc::new(AuthService::new(&settings.auth));
        let users = Arc::new(UserService::new(user_repo.clone(), cart_repo.clone(), auth.clone()));
        let categories = Arc::new(CategoryService::new(category_repo));
        let products = Arc::new(ProductService::new(product_repo.clone(), categories.clone()));
        let images = Arc::new(ImageService::new(
            product_repo.clone(),
            image_repo.clone(),
            storage,
            settings.storage.public_base_url.clone(),
        ));
        let carts = Arc::new(CartService::new(cart_repo, product_repo, user_repo.clone()));
        let orders = Arc::new(OrderService::new(order_repo));
        let email = Arc::new(EmailService::new(
            carts.clone(),
            orders.clone(),
            publisher.clone(),
            settings.email.to.clone(),
        ));
        let presupuestos = Arc::new(PresupuestoService::new(
            image_repo,
            publisher,
            settings.email.to.clone(),
        ));

        Self {
            auth,
            user_repo,
            users,
            categories,
            products,
            images,
            carts,
            orders,
            email,
            presupuestos,
        }
    }
}

/// 为子路由加上认证与（可选的）角色守卫
///
/// 认证中间件在外层，先于角色守卫执行
fn guarded(router: Router, services: &AppServices, roles: Option<&'static [UserRole]>) -> Router {
    let router = match roles {
        Some(roles) => router.route_layer(from_fn_with_state(
            RolesState::new(services.user_repo.clone(), roles),
            roles_middleware,
        )),
        None => router,
    };
    router.route_layer(from_fn_with_state(
        AuthState {
            auth: services.auth.clone(),
        },
        auth_middleware,
    ))
}

fn user_routes(services: &AppServices) -> Router {
    let public = Router::new()
        .route("/register", post(user_handler::register))
        .route("/login", post(user_handler::login));

    let authenticated = Router::new()
        .route("/", get(user_handler::list_users))
        .route(
            "/profile",
            get(user_handler::get_profile).put(user_handler::update_profile),
        )
        .route(
            "/{id}",
            get(user_handler::get_user)
                .put(user_handler::update_user)
                .delete(user_handler::delete_user),
        );

    public.merge(guarded(authenticated, services, None))
}

fn product_routes(services: &AppServices) -> Router {
    let public = Router::new()
        .route("/", get(product_handler::list_products))
        .route("/filter", get(product_handler::filter_products))
        .route("/{id}/images", get(image_handler::list_images));

    let authenticated = Router::new().route("/{id}", get(product_handler::get_product));

    let staff = Router::new()
        .route("/create", post(product_handler::create_product))
        .route("/{id}/edit", put(product_handler::edit_product))
        .route("/{id}/image", post(image_handler::upload_image))
        .route("/{id}/image/associate", post(image_handler::associate_image))
        .route("/{id}/image/{imageId}", delete(image_handler::delete_image))
        .route(
            "/{id}/image/{imageId}/primary",
            patch(image_handler::set_primary_image),
        )
        .route("/{id}/images/reorder", patch(image_handler::reorder_images));

    let admin = Router::new()
        .route("/{id}", delete(product_handler::delete_product))
        .route("/file/listUpdatePrices", get(product_handler::export_prices))
        .route("/file/updatePrices", patch(product_handler::update_prices));

    public
        .merge(guarded(authenticated, services, None))
        .merge(guarded(staff, services, Some(STAFF)))
        .merge(guarded(admin, services, Some(ADMIN_ONLY)))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

fn category_routes(services: &AppServices) -> Router {
    let public = Router::new()
        .route("/", get(category_handler::list_categories))
        .route("/{id}", get(category_handler::get_category));

    let staff = Router::new()
        .route("/", post(category_handler::create_category))
        .route(
            "/{id}",
            put(category_handler::update_category).delete(category_handler::delete_category),
        );

    public.merge(guarded(staff, services, Some(STAFF)))
}

fn cart_routes(services: &AppServices) -> Router {
    let authenticated = Router::new()
        .route("/user/{userId}", get(cart_handler::get_cart_by_user))
        .route("/create", post(cart_handler::create_cart))
        .route("/{id}", get(cart_handler::get_cart))
        .route(
            "/{id}/add/product/{productId}",
            put(cart_handler::add_item),
        )
        .route(
            "/{id}/delete/product/{productId}",
            patch(cart_handler::delete_item),
        )
        .route("/{id}/empty", patch(cart_handler::empty_cart));

    guarded(authenticated, services, None)
}

fn order_routes(services: &AppServices) -> Router {
    let authenticated = Router::new()
        .route("/my-orders", get(order_handler::my_orders))
        .route(
            "/my-orders/paginated",
            get(order_handler::my_orders_paginated),
        )
        .route("/{id}", get(order_handler::get_order));

    let staff = Router::new()
        .route("/", get(order_handler::list_orders))
        .route("/all/paginated", get(order_handler::all_orders_paginated))
        .route("/{id}/pdf", get(order_handler::order_pdf))
        .route("/{id}/status", patch(order_handler::update_order_status));

    let admin = Router::new().route("/{id}", delete(order_handler::delete_order));

    guarded(authenticated, services, None)
        .merge(guarded(staff, services, Some(STAFF)))
        .merge(guarded(admin, services, Some(ADMIN_ONLY)))
}

fn email_routes(services: &AppServices) -> Router {
    guarded(
        Router::new().route("/send-order", post(email_handler::send_order)),
        services,
        None,
    )
}

/// 创建应用路由
///
/// # 参数
///
/// * `services` - 已装配的服务
/// * `settings` - 应用配置（速率限制）
///
/// # 返回值
///
/// 返回配置好的路由；速率限制配置无效时返回错误
pub fn routes(services: &AppServices, settings: &Settings) -> Result<Router, RateLimitError> {
    let mut api = Router::new()
        .nest("/user", user_routes(services))
        .nest("/product", product_routes(services))
        .nest("/category", category_routes(services))
        .nest("/cart", cart_routes(services))
        .nest("/order", order_routes(services))
        .nest("/email", email_routes(services));

    if settings.rate_limiting.enabled {
        let limiter = RateLimiter::from_settings(&settings.rate_limiting)?;
        limiter.spawn_pruning(Duration::from_secs(settings.rate_limiting.window_secs.max(1)));
        api = api.layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/docs/openapi.json", get(openapi_json))
        .nest("/api", api);

    if let Some((mount, dir)) = local_storage_mount(&settings.storage) {
        tracing::info!("Serving local storage {} at {}", dir, mount);
        app = app.nest_service(&mount, ServeDir::new(dir));
    }

    Ok(security_headers(app.fallback(not_found))
        .layer(Extension(services.users.clone()))
        .layer(Extension(services.categories.clone()))
        .layer(Extension(services.products.clone()))
        .layer(Extension(services.images.clone()))
        .layer(Extension(services.carts.clone()))
        .layer(Extension(services.orders.clone()))
        .layer(Extension(services.email.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// 本地存储时按 `public_base_url` 的路径挂载上传目录
fn local_storage_mount(storage: &StorageSettings) -> Option<(String, String)> {
    if storage.storage_type != "local" {
        return None;
    }
    let dir = storage.local_path.clone().unwrap_or_else(|| "./storage".to_string());
    let mount = url::Url::parse(&storage.public_base_url)
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_default();
    let mount = if mount.is_empty() { "/storage".to_string() } else { mount };
    Some((mount, dir))
}

/// 通用安全响应头，处理器已设置的值保留
fn security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}
