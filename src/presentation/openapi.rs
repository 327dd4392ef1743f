// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::models::cart::{Cart, CartItem, CreateCartDto};
use crate::domain::models::category::{Category, CreateCategoryDto, UpdateCategoryDto};
use crate::domain::models::order::{
    BusinessInfo, ContactInfo, CustomerType, Order, OrderItem, OrderStatus, SendOrderDto,
    SubmittedOrderItem, UpdateOrderStatusDto,
};
use crate::domain::models::product::{CreateProductDto, Product, ProductImage, UpdateProductDto};
use crate::domain::models::user::{
    CreateUserDto, Discount, LoginDto, LoginResponse, UpdateUserDto, User, UserRole,
};
use crate::domain::services::email_service::SendOrderResponse;
use crate::presentation::handlers::image_handler::AssociateImageDto;
use crate::presentation::handlers::{
    cart_handler, category_handler, email_handler, image_handler, order_handler, product_handler,
    user_handler,
};

/// OpenAPI 文档，提供于 `/docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(title = "Kansaco API", description = "Catálogo, carritos y pedidos web"),
    paths(
        user_handler::register,
        user_handler::login,
        user_handler::list_users,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        product_handler::list_products,
        product_handler::filter_products,
        product_handler::get_product,
        product_handler::edit_product,
        product_handler::create_product,
        product_handler::delete_product,
        product_handler::export_prices,
        product_handler::update_prices,
        image_handler::upload_image,
        image_handler::list_images,
        image_handler::associate_image,
        image_handler::delete_image,
        image_handler::set_primary_image,
        image_handler::reorder_images,
        category_handler::list_categories,
        category_handler::get_category,
        category_handler::create_category,
        category_handler::update_category,
        category_handler::delete_category,
        cart_handler::get_cart_by_user,
        cart_handler::get_cart,
        cart_handler::create_cart,
        cart_handler::add_item,
        cart_handler::delete_item,
        cart_handler::empty_cart,
        order_handler::list_orders,
        order_handler::my_orders,
        order_handler::my_orders_paginated,
        order_handler::all_orders_paginated,
        order_handler::order_pdf,
        order_handler::get_order,
        order_handler::update_order_status,
        order_handler::delete_order,
        email_handler::send_order,
    ),
    components(schemas(
        User,
        UserRole,
        Discount,
        CreateUserDto,
        UpdateUserDto,
        LoginDto,
        LoginResponse,
        Product,
        ProductImage,
        CreateProductDto,
        UpdateProductDto,
        AssociateImageDto,
        Category,
        CreateCategoryDto,
        UpdateCategoryDto,
        Cart,
        CartItem,
        CreateCartDto,
        Order,
        OrderItem,
        OrderStatus,
        CustomerType,
        ContactInfo,
        BusinessInfo,
        SubmittedOrderItem,
        SendOrderDto,
        UpdateOrderStatusDto,
        SendOrderResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "user"),
        (name = "product"),
        (name = "category"),
        (name = "cart"),
        (name = "order"),
        (name = "email"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
