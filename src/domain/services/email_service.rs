// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Timelike;
use html_escape::encode_text;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use super::cart_service::CartService;
use super::order_service::{presupuesto_file_name, OrderService};
use super::presupuesto_service::presupuesto_for_order;
use super::ServiceError;
use crate::domain::models::cart::Cart;
use crate::domain::models::email::{EmailAttachment, EmailRecipient, SendEmailPayload};
use crate::domain::models::order::{NewOrder, Order, OrderItem, SendOrderDto};
use crate::infrastructure::messaging::{MessagePublisher, SEND_EMAIL_PATTERN};
use crate::infrastructure::metrics::{MESSAGES_PUBLISHED, MESSAGES_PUBLISH_FAILED};
use crate::infrastructure::pdf::render_presupuesto;
use crate::utils::date::{now_argentina, spanish_long_date};

/// 销售助理收件人名称
pub const SALES_RECIPIENT_NAME: &str = "Asistente de Ventas Kansaco";

/// 网页下单结果
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderResponse {
    pub message: String,
    pub order_id: Uuid,
    pub presupuesto_number: String,
    pub pdf_base64: String,
}

/// 由购物车生成订单明细
///
/// 前端提交的同一产品明细优先提供名称、数量与单价，包装规格始终取自购物车
pub fn build_order_items(cart: &Cart, dto: &SendOrderDto) -> Vec<OrderItem> {
    cart.items
        .iter()
        .map(|cart_item| {
            let submitted = dto
                .items
                .as_ref()
                .and_then(|items| items.iter().find(|i| i.product_id == cart_item.product_id));
            let product = cart_item.product.as_ref();

            OrderItem {
                product_id: cart_item.product_id,
                product_name: submitted
                    .and_then(|i| i.product_name.clone())
                    .filter(|n| !n.is_empty())
                    .or_else(|| product.map(|p| p.name.clone()))
                    .unwrap_or_else(|| "Producto sin nombre".to_string()),
                quantity: submitted
                    .and_then(|i| i.quantity)
                    .filter(|q| *q > 0)
                    .unwrap_or(cart_item.quantity),
                unit_price: submitted
                    .and_then(|i| i.unit_price)
                    .filter(|p| !p.is_zero())
                    .or_else(|| product.map(|p| p.price)),
                presentation: cart_item.presentation.clone(),
            }
        })
        .collect()
}

fn fecha_con_hora() -> String {
    let now = now_argentina();
    format!("{}, {:02}:{:02}", spanish_long_date(&now), now.hour(), now.minute())
}

/// 构建订单通知邮件的 HTML 正文
pub fn build_order_html(order: &Order) -> String {
    let mayorista = order.customer_type.is_mayorista();

    let mut rows = String::new();
    for (index, item) in order.items.iter().enumerate() {
        let background = if index % 2 == 0 { "#ffffff" } else { "#f8f9fa" };
        let _ = write!(
            rows,
            r#"<tr style="background-color: {};"><td style="padding: 12px 15px; border-bottom: 1px solid #e0e0e0;">{}</td><td style="padding: 12px 15px; border-bottom: 1px solid #e0e0e0; text-align: center;">{}</td><td style="padding: 12px 15px; border-bottom: 1px solid #e0e0e0; text-align: center; font-weight: 600;">{}</td><td style="padding: 12px 15px; border-bottom: 1px solid #e0e0e0; text-align: right;">-</td></tr>"#,
            background,
            encode_text(&item.product_name),
            encode_text(item.presentation.as_deref().unwrap_or("-")),
            item.quantity
        );
    }

    let mut business = String::new();
    if let (true, Some(b)) = (mayorista, order.business_info.as_ref()) {
        business.push_str(
            r#"<div style="margin-bottom: 20px; padding: 15px; background-color: #f0f9ff; border-radius: 8px;"><h3 style="color: #16a245;">Datos Fiscales</h3>"#,
        );
        let _ = write!(business, "<p><strong>CUIT:</strong> {}</p>", encode_text(&b.cuit));
        if let Some(razon) = &b.razon_social {
            let _ = write!(business, "<p><strong>Razón Social:</strong> {}</p>", encode_text(razon));
        }
        let _ = write!(business, "<p><strong>Situación AFIP:</strong> {}</p>", encode_text(&b.situacion_afip));
        if let Some(cp) = &b.codigo_postal {
            let _ = write!(business, "<p><strong>Código Postal:</strong> {}</p>", encode_text(cp));
        }
        business.push_str("</div>");
    }

    let notes = order
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| {
            format!(
                r#"<div style="margin-bottom: 20px; padding: 15px; background-color: #fff9c4; border-radius: 8px;"><h3 style="color: #f59e0b;">Notas del Cliente</h3><p>{}</p></div>"#,
                encode_text(n)
            )
        })
        .unwrap_or_default();

    let contact = &order.contact_info;
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Nuevo Pedido - Kansaco</title></head>
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
<div style="background-color: #16a245; padding: 20px; text-align: center;"><h1 style="color: white; margin: 0;">NUEVO PEDIDO WEB</h1></div>
<div style="background-color: #f9f9f9; padding: 20px; border: 1px solid #ddd;">
<div style="background-color: {tipo_color}; padding: 10px 15px; margin-bottom: 20px;"><strong>Tipo de Cliente:</strong> {tipo}</div>
<div style="margin-bottom: 20px; padding: 15px; background-color: #fff; border: 1px solid #eee;">
<h3 style="color: #16a245;">Datos de Contacto</h3>
<p><strong>Nombre:</strong> {full_name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Teléfono:</strong> {phone}</p>
<p><strong>Dirección:</strong> {address}</p>
</div>
{business}
<h3 style="color: #16a245;">Productos</h3>
<table style="width: 100%; border-collapse: collapse; background-color: #fff;">
<thead><tr style="background-color: #16a245; color: white;"><th>Producto</th><th>Presentación</th><th>Cantidad</th><th>Precio</th></tr></thead>
<tbody>{rows}</tbody>
</table>
{notes}
<div style="text-align: center; padding: 15px; background-color: #16a245;"><p style="color: white; margin: 0; font-weight: bold;">Fecha: {fecha}</p></div>
</div>
</body>
</html>"#,
        tipo_color = if mayorista { "#fef3c7" } else { "#dbeafe" },
        tipo = if mayorista { "MAYORISTA" } else { "MINORISTA" },
        full_name = encode_text(&contact.full_name),
        email = encode_text(&contact.email),
        phone = encode_text(&contact.phone),
        address = encode_text(&contact.address),
        business = business,
        rows = rows,
        notes = notes,
        fecha = fecha_con_hora(),
    )
}

/// 构建订单通知邮件的纯文本正文
pub fn build_order_text(order: &Order) -> String {
    let mayorista = order.customer_type.is_mayorista();
    let contact = &order.contact_info;

    let mut text = String::from("NUEVO PEDIDO WEB\n\n");
    let _ = writeln!(
        text,
        "Tipo de Cliente: {}\n",
        if mayorista { "MAYORISTA" } else { "MINORISTA" }
    );
    let _ = writeln!(text, "DATOS DE CONTACTO:");
    let _ = writeln!(text, "  Nombre: {}", contact.full_name);
    let _ = writeln!(text, "  Email: {}", contact.email);
    let _ = writeln!(text, "  Teléfono: {}", contact.phone);
    let _ = writeln!(text, "  Dirección: {}\n", contact.address);

    if let (true, Some(b)) = (mayorista, order.business_info.as_ref()) {
        let _ = writeln!(text, "DATOS FISCALES:");
        let _ = writeln!(text, "  CUIT: {}", b.cuit);
        if let Some(razon) = &b.razon_social {
            let _ = writeln!(text, "  Razón Social: {}", razon);
        }
        let _ = writeln!(text, "  Situación AFIP: {}", b.situacion_afip);
        if let Some(cp) = &b.codigo_postal {
            let _ = writeln!(text, "  Código Postal: {}", cp);
        }
        text.push('\n');
    }

    let _ = writeln!(text, "PRODUCTOS:");
    for item in &order.items {
        match item.presentation.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => {
                let _ = writeln!(text, "  - {} (Cantidad: {}, Presentación: {})", item.product_name, item.quantity, p);
            }
            None => {
                let _ = writeln!(text, "  - {} (Cantidad: {})", item.product_name, item.quantity);
            }
        }
    }
    text.push('\n');

    if let Some(notes) = order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(text, "NOTAS DEL CLIENTE:\n  {}\n", notes);
    }
    let _ = write!(text, "Fecha: {}", fecha_con_hora());
    text
}

/// 网页下单服务
///
/// 购物车 → 订单 → 报价单 PDF → `send-email` 消息
pub struct EmailService {
    carts: Arc<CartService>,
    orders: Arc<OrderService>,
    publisher: Arc<dyn MessagePublisher>,
    email_to: String,
}

impl EmailService {
    pub fn new(
        carts: Arc<CartService>,
        orders: Arc<OrderService>,
        publisher: Arc<dyn MessagePublisher>,
        email_to: String,
    ) -> Self {
        Self {
            carts,
            orders,
            publisher,
            email_to,
        }
    }

    /// 处理网页下单
    ///
    /// # 参数
    ///
    /// * `user_id` - 当前用户
    /// * `user_email` - 当前用户邮箱，同时作为收件人
    /// * `dto` - 下单请求
    ///
    /// # 返回值
    ///
    /// 订单 ID、报价单编号与 base64 编码的 PDF；消息发布失败不影响结果
    pub async fn send_order(
        &self,
        user_id: Uuid,
        user_email: &str,
        dto: SendOrderDto,
    ) -> Result<SendOrderResponse, ServiceError> {
        let cart = self.carts.get_by_user(user_id).await?;
        let items = build_order_items(&cart, &dto);

        let order = self
            .orders
            .create(NewOrder {
                user_id,
                customer_type: dto.customer_type,
                contact_info: dto.contact_info,
                business_info: dto.business_info,
                items,
                total_amount: dto.total_amount,
                notes: dto.notes,
            })
            .await?;

        let data = presupuesto_for_order(&order);
        let numero = data.presupuesto.numero.clone();
        let pdf_base64 = STANDARD.encode(render_presupuesto(&data)?);

        let payload = SendEmailPayload {
            to: vec![
                EmailRecipient {
                    email: self.email_to.clone(),
                    name: SALES_RECIPIENT_NAME.to_string(),
                },
                EmailRecipient {
                    email: user_email.to_string(),
                    name: order.contact_info.full_name.clone(),
                },
            ],
            subject: format!(
                "Nuevo Pedido Web - {} ({})",
                order.contact_info.full_name,
                order.customer_type.label()
            ),
            html_content: build_order_html(&order),
            text_content: build_order_text(&order),
            attachments: vec![EmailAttachment {
                name: presupuesto_file_name(&numero, &order.contact_info.full_name),
                content: pdf_base64.clone(),
                content_type: "application/pdf".to_string(),
            }],
        };
        self.publish(&order, &payload).await;

        Ok(SendOrderResponse {
            message: "Pedido enviado correctamente".to_string(),
            order_id: order.id,
            presupuesto_number: numero,
            pdf_base64,
        })
    }

    async fn publish(&self, order: &Order, payload: &SendEmailPayload) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to serialize email for order {}: {}", order.id, e);
                return;
            }
        };

        match self.publisher.publish(SEND_EMAIL_PATTERN, data).await {
            Ok(()) => {
                metrics::counter!(MESSAGES_PUBLISHED, "pattern" => SEND_EMAIL_PATTERN).increment(1);
                info!("Published send-email for order {}", order.id);
            }
            Err(e) => {
                metrics::counter!(MESSAGES_PUBLISH_FAILED, "pattern" => SEND_EMAIL_PATTERN).increment(1);
                error!("Failed to publish send-email for order {}: {}", order.id, e);
            }
        }
    }
}
