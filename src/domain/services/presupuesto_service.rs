// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Datelike, Timelike};
use html_escape::{encode_double_quoted_attribute, encode_text};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ServiceError;
use crate::domain::models::email::{EmailAttachment, EmailRecipient, SendEmailPayload};
use crate::domain::models::order::Order;
use crate::domain::models::presupuesto::{GeneratePresupuestoDto, PresupuestoData, PresupuestoResult};
use crate::domain::repositories::product_image_repository::ProductImageRepository;
use crate::infrastructure::messaging::{
    MessageEnvelope, MessageHandler, MessagePublisher, GENERATE_PRESUPUESTO_PATTERN, SEND_EMAIL_PATTERN,
};
use crate::infrastructure::pdf::render_presupuesto;
use crate::utils::date::{now_argentina, short_date, spanish_long_date};

/// 每个产品在报价邮件中最多展示的图片数
const MAX_IMAGES_PER_PRODUCT: usize = 3;

/// 由订单组装报价单数据，编号与日期取自订单
pub fn presupuesto_for_order(order: &Order) -> PresupuestoData {
    PresupuestoData::build(
        order.presupuesto_number(),
        short_date(&order.created_at),
        &order.contact_info,
        order.business_info.as_ref(),
        &order.items,
        order.notes.clone(),
    )
}

/// 生成随机报价单编号：`<年份>-<001..999>`
pub fn generate_presupuesto_number() -> String {
    let suffix: u32 = rand::rng().random_range(1..=999);
    format!("{}-{:03}", now_argentina().year(), suffix)
}

fn money(value: Decimal) -> String {
    format!("$ {:.2}", value.round_dp(2))
}

/// 构建报价邮件正文
///
/// # 参数
///
/// * `dto` - 报价请求
/// * `data` - 已计算好的报价单数据
/// * `images` - 产品 ID 到图片地址的映射，主图在前
pub fn build_presupuesto_html(
    dto: &GeneratePresupuestoDto,
    data: &PresupuestoData,
    images: &HashMap<i32, Vec<String>>,
) -> String {
    let mut rows = String::new();
    for item in &dto.items {
        let name = encode_text(&item.product_name);
        let presentation = item
            .presentation
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("Sin presentación especificada");
        let urls = images.get(&item.product_id).map(Vec::as_slice).unwrap_or_default();
        let mut image_cells = String::new();
        for url in urls.iter().take(MAX_IMAGES_PER_PRODUCT) {
            let _ = write!(
                image_cells,
                r#"<td style="padding: 5px; text-align: center;"><img src="{}" alt="{}" style="max-width: 80px; max-height: 80px;" /></td>"#,
                encode_double_quoted_attribute(url),
                encode_double_quoted_attribute(&item.product_name)
            );
        }
        let shown = urls.len().min(MAX_IMAGES_PER_PRODUCT);
        if shown == 0 {
            image_cells.push_str(r#"<td style="padding: 5px; text-align: center;"><span style="color: #999;">Sin imagen</span></td>"#);
        }
        for _ in shown.max(1)..MAX_IMAGES_PER_PRODUCT {
            image_cells.push_str(r#"<td style="padding: 5px;"></td>"#);
        }
        let (unit, subtotal) = match item.unit_price {
            Some(price) => (money(price), money(price * Decimal::from(item.quantity))),
            None => ("Consultar".to_string(), "Consultar".to_string()),
        };

        let _ = write!(
            rows,
            r#"<tr><td style="padding: 10px; text-align: center;">{}</td><td style="padding: 10px;"><strong>{}</strong><br/><span style="color: #666;">{}</span></td>{}<td style="padding: 10px; text-align: right;">{}</td><td style="padding: 10px; text-align: right; font-weight: bold;">{}</td></tr>"#,
            item.quantity,
            name,
            encode_text(presentation),
            image_cells,
            unit,
            subtotal
        );
    }

    let business = dto
        .business_info
        .as_ref()
        .map(|b| {
            let mut html = String::from(
                r#"<div style="margin: 20px 0; padding: 15px; background-color: #f0f9ff; border-left: 4px solid #16a245;"><h3 style="color: #16a245;">Datos Fiscales</h3>"#,
            );
            let _ = write!(html, "<p><strong>CUIT:</strong> {}</p>", encode_text(&b.cuit));
            if let Some(razon) = &b.razon_social {
                let _ = write!(html, "<p><strong>Razón Social:</strong> {}</p>", encode_text(razon));
            }
            let _ = write!(html, "<p><strong>Situación AFIP:</strong> {}</p>", encode_text(&b.situacion_afip));
            if let Some(cp) = &b.codigo_postal {
                let _ = write!(html, "<p><strong>Código Postal:</strong> {}</p>", encode_text(cp));
            }
            html.push_str("</div>");
            html
        })
        .unwrap_or_default();

    let notes = dto
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| {
            format!(
                r#"<div style="margin: 25px 0; padding: 15px; background-color: #fff9c4; border-left: 4px solid #f59e0b;"><h3 style="color: #f59e0b;">NOTAS</h3><p>{}</p></div>"#,
                encode_text(n)
            )
        })
        .unwrap_or_default();

    let now = now_argentina();
    let contact = &dto.contact_info;
    let tipo = if dto.customer_type.is_mayorista() { "MAYORISTA" } else { "MINORISTA" };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Presupuesto #{numero} - Kansaco</title></head>
<body style="font-family: Arial, sans-serif; color: #333; background-color: #f5f5f5;">
<div style="max-width: 900px; margin: 0 auto; background-color: #ffffff;">
<div style="background: #16a245; padding: 30px; text-align: center;">
<h1 style="color: #ffffff;">NUEVO PRESUPUESTO</h1>
<p style="color: #ffffff;">Presupuesto #{numero}</p>
</div>
<div style="padding: 30px;">
<div style="padding: 20px; background-color: #f9f9f9; border-left: 4px solid #16a245;">
<h2 style="color: #16a245;">DATOS DEL CLIENTE</h2>
<p><strong>Razón Social:</strong> {full_name}</p>
<p><strong>Teléfono:</strong> {phone}</p>
<p><strong>Dirección:</strong> {address}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Tipo de Cliente:</strong> {tipo}</p>
</div>
{business}
<h2 style="color: #16a245;">DETALLE DE PRODUCTOS</h2>
<table style="width: 100%; border-collapse: collapse; border: 1px solid #ddd;">
<thead><tr style="background-color: #16a245; color: #ffffff;"><th>Cant.</th><th>Producto</th><th colspan="3">Imágenes</th><th>P. Unit.</th><th>Subtotal</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<table style="width: 100%; margin: 25px 0;">
<tr><td style="text-align: right; font-weight: bold;">Subtotal:</td><td style="text-align: right; width: 150px;">{subtotal}</td></tr>
<tr><td style="text-align: right;">IVA ({iva_pct}%):</td><td style="text-align: right;">{iva}</td></tr>
<tr><td style="text-align: right; font-weight: bold; color: #16a245;">TOTAL:</td><td style="text-align: right; font-weight: bold; color: #16a245;">{total}</td></tr>
</table>
{notes}
<div style="margin-top: 30px; text-align: center; color: #666; font-size: 12px;">
<p>El PDF del presupuesto se encuentra adjunto a este email.</p>
<p>Fecha de generación: {fecha}, {hora:02}:{minuto:02}</p>
</div>
</div>
</div>
</body>
</html>"#,
        numero = encode_text(&data.presupuesto.numero),
        full_name = encode_text(&contact.full_name),
        phone = encode_text(&contact.phone),
        address = encode_text(&contact.address),
        email = encode_text(&contact.email),
        tipo = tipo,
        business = business,
        rows = rows,
        subtotal = money(data.totales.subtotal),
        iva_pct = data.totales.iva_porcentaje,
        iva = money(data.totales.iva_monto),
        total = money(data.totales.total),
        notes = notes,
        fecha = spanish_long_date(&now),
        hora = now.hour(),
        minuto = now.minute(),
    )
}

/// 报价单服务
///
/// 处理 `generate-presupuesto` 消息：渲染 PDF，构建邮件并通过 `send-email` 转交投递
pub struct PresupuestoService {
    images: Arc<dyn ProductImageRepository>,
    publisher: Arc<dyn MessagePublisher>,
    default_recipient: String,
}

impl PresupuestoService {
    pub fn new(
        images: Arc<dyn ProductImageRepository>,
        publisher: Arc<dyn MessagePublisher>,
        default_recipient: String,
    ) -> Self {
        Self {
            images,
            publisher,
            default_recipient,
        }
    }

    async fn product_images(&self, dto: &GeneratePresupuestoDto) -> HashMap<i32, Vec<String>> {
        let mut images = HashMap::new();
        for item in &dto.items {
            if images.contains_key(&item.product_id) {
                continue;
            }
            match self.images.find_by_product(item.product_id).await {
                Ok(found) => {
                    let urls: Vec<String> = found
                        .into_iter()
                        .take(MAX_IMAGES_PER_PRODUCT)
                        .map(|image| image.image_url)
                        .collect();
                    images.insert(item.product_id, urls);
                }
                Err(e) => warn!("Could not load images for product {}: {}", item.product_id, e),
            }
        }
        images
    }

    /// 生成报价单并发布邮件消息
    pub async fn generate(&self, dto: GeneratePresupuestoDto) -> Result<PresupuestoResult, ServiceError> {
        let numero = dto
            .presupuesto_number
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(generate_presupuesto_number);

        let data = PresupuestoData::build(
            numero.clone(),
            short_date(&now_argentina()),
            &dto.contact_info,
            dto.business_info.as_ref(),
            &dto.items,
            dto.notes.clone(),
        );
        let pdf = render_presupuesto(&data)?;
        let images = self.product_images(&dto).await;
        let html = build_presupuesto_html(&dto, &data, &images);

        let recipient = dto
            .recipient_email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.default_recipient.clone());
        let payload = SendEmailPayload {
            to: vec![EmailRecipient {
                email: recipient.clone(),
                name: dto.contact_info.full_name.clone(),
            }],
            subject: format!("Nuevo Presupuesto #{} - {}", numero, dto.contact_info.full_name),
            html_content: html,
            text_content: format!(
                "Presupuesto #{} para {}. Total: {}",
                numero,
                dto.contact_info.full_name,
                money(data.totales.total)
            ),
            attachments: vec![EmailAttachment {
                name: format!("presupuesto-{}.pdf", numero),
                content: STANDARD.encode(&pdf),
                content_type: "application/pdf".to_string(),
            }],
        };

        let data = serde_json::to_value(&payload).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.publisher
            .publish(SEND_EMAIL_PATTERN, data)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!("Presupuesto {} sent to {}", numero, recipient);
        Ok(PresupuestoResult {
            success: true,
            presupuesto_number: numero,
            message: "Presupuesto generado y enviado correctamente".to_string(),
        })
    }
}

#[async_trait]
impl MessageHandler for PresupuestoService {
    async fn handle(&self, envelope: MessageEnvelope) -> Option<serde_json::Value> {
        if envelope.pattern != GENERATE_PRESUPUESTO_PATTERN {
            warn!("Ignoring message with unknown pattern {}", envelope.pattern);
            return None;
        }

        let result = match serde_json::from_value::<GeneratePresupuestoDto>(envelope.data) {
            Ok(dto) => {
                let numero = dto.presupuesto_number.clone().unwrap_or_default();
                match self.generate(dto).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Failed to generate presupuesto: {}", e);
                        PresupuestoResult {
                            success: false,
                            presupuesto_number: numero,
                            message: format!("Error generando presupuesto: {}", e),
                        }
                    }
                }
            }
            Err(e) => {
                error!("Invalid generate-presupuesto payload: {}", e);
                PresupuestoResult {
                    success: false,
                    presupuesto_number: String::new(),
                    message: format!("Error generando presupuesto: {}", e),
                }
            }
        };

        serde_json::to_value(result).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::{BusinessInfo, ContactInfo, CustomerType, OrderItem};
    use crate::domain::services::test_support::TestContext;
    use crate::infrastructure::messaging::{MessagingError, MockMessagePublisher};
    use crate::infrastructure::repositories::product_image_repo_impl::ProductImageRepositoryImpl;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn dto() -> GeneratePresupuestoDto {
        GeneratePresupuestoDto {
            customer_type: CustomerType::ClienteMayorista,
            contact_info: ContactInfo {
                full_name: "Taller <Norte>".to_string(),
                email: "norte@example.com".to_string(),
                phone: "11-4000-0000".to_string(),
                address: "Ruta 2 km 30".to_string(),
            },
            business_info: Some(BusinessInfo {
                cuit: "20-12345678-9".to_string(),
                razon_social: Some("Norte SRL".to_string()),
                situacion_afip: "Responsable Inscripto".to_string(),
                codigo_postal: None,
            }),
            items: vec![OrderItem {
                product_id: 1,
                product_name: "Aceite 15W40".to_string(),
                quantity: 2,
                unit_price: Some(dec!(100)),
                presentation: None,
            }],
            total_amount: None,
            notes: Some("Entregar por la mañana".to_string()),
            presupuesto_number: None,
            recipient_email: None,
            order_id: None,
        }
    }

    #[test]
    fn test_generated_number_has_year_and_three_digits() {
        let numero = generate_presupuesto_number();
        let (year, suffix) = numero.split_once('-').unwrap();
        assert_eq!(year, now_argentina().year().to_string());
        assert_eq!(suffix.len(), 3);
        let n: u32 = suffix.parse().unwrap();
        assert!((1..=999).contains(&n));
    }

    #[test]
    fn test_html_escapes_and_totals() {
        let dto = dto();
        let data = PresupuestoData::build(
            "2026-007".to_string(),
            "19/10/2026".to_string(),
            &dto.contact_info,
            dto.business_info.as_ref(),
            &dto.items,
            dto.notes.clone(),
        );
        let html = build_presupuesto_html(&dto, &data, &HashMap::new());

        assert!(html.contains("Presupuesto #2026-007"));
        assert!(html.contains("Taller &lt;Norte&gt;"));
        assert!(html.contains("Sin presentación especificada"));
        assert!(html.contains("Sin imagen"));
        assert!(html.contains("MAYORISTA"));
        assert!(html.contains("Datos Fiscales"));
        assert!(html.contains("$ 200.00"));
        assert!(html.contains("$ 242.00"));
    }

    #[test]
    fn test_html_shows_up_to_three_images_per_product() {
        let dto = dto();
        let data = PresupuestoData::build(
            "2026-008".to_string(),
            "19/10/2026".to_string(),
            &dto.contact_info,
            dto.business_info.as_ref(),
            &dto.items,
            dto.notes.clone(),
        );
        let urls: Vec<String> = (1..=4)
            .map(|i| format!("https://cdn.test/products/aceite-{}.webp", i))
            .collect();

        let html = build_presupuesto_html(&dto, &data, &HashMap::from([(1, urls[..3].to_vec())]));
        assert_eq!(html.matches("<img").count(), 3);
        assert!(html.contains("aceite-3.webp"));
        assert!(!html.contains("Sin imagen"));

        let html = build_presupuesto_html(&dto, &data, &HashMap::from([(1, urls[..1].to_vec())]));
        assert_eq!(html.matches("<img").count(), 1);
        assert_eq!(html.matches(r#"<td style="padding: 5px;"></td>"#).count(), 2);

        let html = build_presupuesto_html(&dto, &data, &HashMap::from([(1, urls)]));
        assert_eq!(html.matches("<img").count(), 3);
        assert!(!html.contains("aceite-4.webp"));
    }

    #[tokio::test]
    async fn test_handle_publishes_email_and_replies() {
        let ctx = TestContext::new().await;
        let mut request = dto();
        request.presupuesto_number = Some("2026-042".to_string());

        let envelope = MessageEnvelope::new(
            GENERATE_PRESUPUESTO_PATTERN,
            serde_json::to_value(&request).unwrap(),
        );
        let reply = ctx.presupuestos.handle(envelope).await.unwrap();

        assert_eq!(reply["success"], json!(true));
        assert_eq!(reply["presupuestoNumber"], json!("2026-042"));

        let sent = ctx.publisher.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, SEND_EMAIL_PATTERN);
        let payload: SendEmailPayload = serde_json::from_value(sent[0].1.clone()).unwrap();
        assert_eq!(payload.subject, "Nuevo Presupuesto #2026-042 - Taller <Norte>");
        assert_eq!(payload.to[0].email, ctx.email_to);
        assert_eq!(payload.attachments[0].name, "presupuesto-2026-042.pdf");
    }

    #[tokio::test]
    async fn test_handle_reports_failure() {
        let ctx = TestContext::new().await;
        let mut publisher = MockMessagePublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(MessagingError::Disabled));
        let presupuestos = PresupuestoService::new(
            Arc::new(ProductImageRepositoryImpl::new(ctx.db.clone())),
            Arc::new(publisher),
            ctx.email_to.clone(),
        );

        let envelope = MessageEnvelope::new(GENERATE_PRESUPUESTO_PATTERN, serde_json::to_value(dto()).unwrap());
        let reply = presupuestos.handle(envelope).await.unwrap();
        assert_eq!(reply["success"], json!(false));
        assert!(reply["message"].as_str().unwrap().starts_with("Error generando presupuesto"));

        let ignored = MessageEnvelope::new("something-else", json!({}));
        assert!(presupuestos.handle(ignored).await.is_none());
    }
}
