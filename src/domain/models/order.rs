// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Datelike, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// 客户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    ClienteMinorista,
    ClienteMayorista,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::ClienteMinorista => "CLIENTE_MINORISTA",
            CustomerType::ClienteMayorista => "CLIENTE_MAYORISTA",
        }
    }

    /// 显示名称：`Mayorista` 或 `Minorista`
    pub fn label(&self) -> &'static str {
        match self {
            CustomerType::ClienteMinorista => "Minorista",
            CustomerType::ClienteMayorista => "Mayorista",
        }
    }

    pub fn is_mayorista(&self) -> bool {
        matches!(self, CustomerType::ClienteMayorista)
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENTE_MINORISTA" => Ok(CustomerType::ClienteMinorista),
            "CLIENTE_MAYORISTA" => Ok(CustomerType::ClienteMayorista),
            other => Err(format!("Unknown customer type: {}", other)),
        }
    }
}

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pendiente,
    Procesando,
    Enviado,
    Completado,
    Cancelado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "PENDIENTE",
            OrderStatus::Procesando => "PROCESANDO",
            OrderStatus::Enviado => "ENVIADO",
            OrderStatus::Completado => "COMPLETADO",
            OrderStatus::Cancelado => "CANCELADO",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(OrderStatus::Pendiente),
            "PROCESANDO" => Ok(OrderStatus::Procesando),
            "ENVIADO" => Ok(OrderStatus::Enviado),
            "COMPLETADO" => Ok(OrderStatus::Completado),
            "CANCELADO" => Ok(OrderStatus::Cancelado),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// 联系信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    #[validate(email(message = "contactInfo.email must be an email"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// 税务信息（批发客户）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    #[validate(length(min = 1, message = "cuit is required"))]
    pub cuit: String,
    pub razon_social: Option<String>,
    #[serde(default)]
    pub situacion_afip: String,
    pub codigo_postal: Option<String>,
}

/// 订单明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = Option<f64>)]
    pub unit_price: Option<Decimal>,
    pub presentation: Option<String>,
}

/// 订单
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_type: CustomerType,
    pub status: OrderStatus,
    pub contact_info: ContactInfo,
    pub business_info: Option<BusinessInfo>,
    pub items: Vec<OrderItem>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Order {
    /// 报价单编号：`<年份>-<UUID 最后一段前三位，大写>`
    pub fn presupuesto_number(&self) -> String {
        let id = self.id.to_string();
        let suffix: String = id
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .chars()
            .take(3)
            .collect();
        format!("{}-{}", self.created_at.year(), suffix.to_uppercase())
    }
}

/// 待保存的订单
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub customer_type: CustomerType,
    pub contact_info: ContactInfo,
    pub business_info: Option<BusinessInfo>,
    pub items: Vec<OrderItem>,
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// 前端提交的明细，字段均可缺省
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedOrderItem {
    pub product_id: i32,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub unit_price: Option<Decimal>,
    pub presentation: Option<String>,
}

/// 网页下单请求
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderDto {
    pub customer_type: CustomerType,
    #[validate(nested)]
    pub contact_info: ContactInfo,
    #[validate(nested)]
    pub business_info: Option<BusinessInfo>,
    pub items: Option<Vec<SubmittedOrderItem>>,
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// 更新订单状态请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,
}
