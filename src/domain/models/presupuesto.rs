// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{BusinessInfo, ContactInfo, CustomerType, OrderItem};

/// IVA aplicado a los presupuestos (21 %)
pub const IVA_PORCENTAJE: i64 = 21;
/// Localidad por defecto cuando el cliente no informa código postal
pub const LOCALIDAD_POR_DEFECTO: &str = "CABA, Buenos Aires";

/// 开票公司信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empresa {
    pub nombre: String,
    pub cuit: String,
    pub localidad: String,
    pub telefono: String,
    pub email: String,
}

impl Default for Empresa {
    fn default() -> Self {
        Self {
            nombre: "Kansaco Petroquimica S.A".to_string(),
            cuit: "30-58610901-0".to_string(),
            localidad: "Magallanes 2031 Florencio Varela".to_string(),
            telefono: "4237-2636".to_string(),
            email: "info@kansaco.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresupuestoInfo {
    pub numero: String,
    pub fecha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub razon_social: String,
    pub telefono: String,
    pub direccion: String,
    pub email: String,
    pub localidad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresupuestoProducto {
    pub cantidad: i32,
    pub nombre: String,
    pub presentacion: String,
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condiciones {
    pub forma_pago: String,
    pub validez_dias: u32,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totales {
    pub subtotal: Decimal,
    pub iva_porcentaje: Decimal,
    pub iva_monto: Decimal,
    pub total: Decimal,
}

/// 报价单文档数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresupuestoData {
    pub empresa: Empresa,
    pub presupuesto: PresupuestoInfo,
    pub cliente: Cliente,
    pub productos: Vec<PresupuestoProducto>,
    pub condiciones: Condiciones,
    pub totales: Totales,
}

impl PresupuestoData {
    /// 由订单内容组装报价单数据
    ///
    /// # 参数
    ///
    /// * `numero` - 报价单编号
    /// * `fecha` - 已格式化的日期（`d/m/yyyy`）
    /// * `contact` - 联系信息
    /// * `business` - 税务信息，提供邮编时用作地区
    /// * `items` - 订单明细
    /// * `notas` - 客户备注
    pub fn build(
        numero: String,
        fecha: String,
        contact: &ContactInfo,
        business: Option<&BusinessInfo>,
        items: &[OrderItem],
        notas: Option<String>,
    ) -> Self {
        let productos: Vec<PresupuestoProducto> = items
            .iter()
            .map(|item| {
                let precio_unitario = item.unit_price.unwrap_or(Decimal::ZERO);
                PresupuestoProducto {
                    cantidad: item.quantity,
                    nombre: item.product_name.clone(),
                    presentacion: item
                        .presentation
                        .clone()
                        .filter(|p| !p.trim().is_empty())
                        .unwrap_or_else(|| "-".to_string()),
                    precio_unitario,
                    subtotal: precio_unitario * Decimal::from(item.quantity),
                }
            })
            .collect();

        let subtotal: Decimal = productos.iter().map(|p| p.subtotal).sum();
        let iva_porcentaje = Decimal::from(IVA_PORCENTAJE);
        let iva_monto = (subtotal * iva_porcentaje / Decimal::ONE_HUNDRED).round_dp(2);

        let localidad = business
            .and_then(|b| b.codigo_postal.clone())
            .filter(|cp| !cp.trim().is_empty())
            .unwrap_or_else(|| LOCALIDAD_POR_DEFECTO.to_string());

        Self {
            empresa: Empresa::default(),
            presupuesto: PresupuestoInfo { numero, fecha },
            cliente: Cliente {
                razon_social: contact.full_name.clone(),
                telefono: contact.phone.clone(),
                direccion: contact.address.clone(),
                email: contact.email.clone(),
                localidad,
            },
            productos,
            condiciones: Condiciones {
                forma_pago: "Transferencia Bancaria".to_string(),
                validez_dias: 15,
                notas,
            },
            totales: Totales {
                subtotal,
                iva_porcentaje,
                iva_monto,
                total: subtotal + iva_monto,
            },
        }
    }
}

/// 消息 `generate-presupuesto` 的负载
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePresupuestoDto {
    pub customer_type: CustomerType,
    pub contact_info: ContactInfo,
    pub business_info: Option<BusinessInfo>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub presupuesto_number: Option<String>,
    pub recipient_email: Option<String>,
    pub order_id: Option<Uuid>,
}

/// 报价单生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresupuestoResult {
    pub success: bool,
    pub presupuesto_number: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_computes_totals_with_iva() {
        let contact = ContactInfo {
            full_name: "Ana Gómez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "11-5555-0000".to_string(),
            address: "Calle 123".to_string(),
        };
        let items = vec![
            OrderItem {
                product_id: 1,
                product_name: "Aceite".to_string(),
                quantity: 2,
                unit_price: Some(dec!(100.00)),
                presentation: Some("Balde 20 Litros".to_string()),
            },
            OrderItem {
                product_id: 2,
                product_name: "Grasa".to_string(),
                quantity: 1,
                unit_price: None,
                presentation: None,
            },
        ];

        let data = PresupuestoData::build(
            "2026-ABC".to_string(),
            "19/10/2026".to_string(),
            &contact,
            None,
            &items,
            None,
        );

        assert_eq!(data.totales.subtotal, dec!(200));
        assert_eq!(data.totales.iva_monto, dec!(42));
        assert_eq!(data.totales.total, dec!(242));
        assert_eq!(data.productos[1].presentacion, "-");
        assert_eq!(data.cliente.localidad, LOCALIDAD_POR_DEFECTO);
        assert_eq!(data.empresa.cuit, "30-58610901-0");
    }
}
