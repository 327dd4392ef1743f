// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::presupuesto_service::presupuesto_for_order;
use super::ServiceError;
use crate::domain::models::order::{NewOrder, Order, OrderStatus};
use crate::domain::models::pagination::PaginatedResponse;
use crate::domain::models::user::UserRole;
use crate::domain::repositories::order_repository::OrderRepository;
use crate::infrastructure::metrics::ORDERS_CREATED;
use crate::infrastructure::pdf::render_presupuesto;

/// 渲染好的订单报价单
#[derive(Debug, Clone)]
pub struct OrderPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 报价单附件文件名：`Presupuesto_<编号>_<姓名，空白替换为 _>.pdf`
pub fn presupuesto_file_name(numero: &str, full_name: &str) -> String {
    let name: String = full_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Presupuesto_{}_{}.pdf", numero, name)
}

/// 订单服务
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// 保存新订单，状态为 `PENDIENTE`
    pub async fn create(&self, order: NewOrder) -> Result<Order, ServiceError> {
        let order = self.orders.create(order).await?;
        metrics::counter!(ORDERS_CREATED).increment(1);
        info!("Created order {} for user {}", order.id, order.user_id);
        Ok(order)
    }

    pub async fn find_all(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.find_all().await?)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Order, ServiceError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", id)))
    }

    /// 查询订单，仅订单所有者或员工可见
    pub async fn find_visible(&self, id: Uuid, user_id: Uuid, rol: UserRole) -> Result<Order, ServiceError> {
        let order = self.find_one(id).await?;
        if order.user_id != user_id && !rol.is_staff() {
            return Err(ServiceError::Forbidden(
                "No tienes permiso para ver esta orden".to_string(),
            ));
        }
        Ok(order)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    /// 当前用户的订单分页，`limit` 限制在 1..=100
    pub async fn find_by_user_paginated(
        &self,
        user_id: Uuid,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PaginatedResponse<Order>, ServiceError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(10).clamp(1, 100);
        let (orders, total) = self.orders.find_paginated(Some(user_id), page, limit).await?;
        Ok(PaginatedResponse::new(orders, total, page, limit))
    }

    /// 全部订单分页，`limit` 限制在 20..=100
    pub async fn find_all_paginated(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PaginatedResponse<Order>, ServiceError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(20).clamp(20, 100);
        let (orders, total) = self.orders.find_paginated(None, page, limit).await?;
        Ok(PaginatedResponse::new(orders, total, page, limit))
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ServiceError> {
        self.find_one(id).await?;
        let order = self.orders.update_status(id, status).await?;
        info!("Order {} moved to {}", id, status);
        Ok(order)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ServiceError> {
        self.find_one(id).await?;
        self.orders.delete(id).await?;
        info!("Deleted order {}", id);
        Ok(())
    }

    /// 渲染订单的报价单 PDF
    pub async fn render_pdf(&self, id: Uuid) -> Result<OrderPdf, ServiceError> {
        let order = self.find_one(id).await?;
        let data = presupuesto_for_order(&order);
        let bytes = render_presupuesto(&data)?;

        Ok(OrderPdf {
            file_name: presupuesto_file_name(&data.presupuesto.numero, &order.contact_info.full_name),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::{ContactInfo, CustomerType};
    use crate::domain::services::test_support::TestContext;

    fn new_order(user_id: Uuid) -> NewOrder {
        NewOrder {
            user_id,
            customer_type: CustomerType::ClienteMinorista,
            contact_info: ContactInfo {
                full_name: "Ana  Gómez".to_string(),
                email: "ana@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
            },
            business_info: None,
            items: vec![],
            total_amount: None,
            notes: None,
        }
    }

    #[test]
    fn test_presupuesto_file_name_replaces_whitespace() {
        assert_eq!(
            presupuesto_file_name("2026-ABC", "Ana  Gómez"),
            "Presupuesto_2026-ABC_Ana__Gómez.pdf"
        );
    }

    #[tokio::test]
    async fn test_visibility_and_status() {
        let ctx = TestContext::new().await;
        let owner = Uuid::new_v4();
        let order = ctx.orders.create(new_order(owner)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pendiente);

        let stranger = Uuid::new_v4();
        let err = ctx
            .orders
            .find_visible(order.id, stranger, UserRole::ClienteMinorista)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No tienes permiso para ver esta orden");
        assert!(ctx.orders.find_visible(order.id, stranger, UserRole::Asistente).await.is_ok());
        assert!(ctx.orders.find_visible(order.id, owner, UserRole::ClienteMinorista).await.is_ok());

        let updated = ctx.orders.update_status(order.id, OrderStatus::Enviado).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Enviado);

        ctx.orders.remove(order.id).await.unwrap();
        let err = ctx.orders.find_one(order.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Order with ID {} not found", order.id));
    }

    #[tokio::test]
    async fn test_paginated_limits_are_clamped() {
        let ctx = TestContext::new().await;
        let owner = Uuid::new_v4();
        for _ in 0..3 {
            ctx.orders.create(new_order(owner)).await.unwrap();
        }

        let mine = ctx
            .orders
            .find_by_user_paginated(owner, Some(0), Some(2))
            .await
            .unwrap();
        assert_eq!(mine.page, 1);
        assert_eq!(mine.limit, 2);
        assert_eq!(mine.total, 3);
        assert_eq!(mine.data.len(), 2);
        assert!(mine.has_next);

        let all = ctx.orders.find_all_paginated(None, Some(5)).await.unwrap();
        assert_eq!(all.limit, 20);
        assert_eq!(all.data.len(), 3);
    }

    #[tokio::test]
    async fn test_render_pdf_names_attachment() {
        let ctx = TestContext::new().await;
        let order = ctx.orders.create(new_order(Uuid::new_v4())).await.unwrap();

        let pdf = ctx.orders.render_pdf(order.id).await.unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(
            pdf.file_name,
            format!("Presupuesto_{}_Ana__Gómez.pdf", order.presupuesto_number())
        );
    }
}
