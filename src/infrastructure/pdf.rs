// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::models::presupuesto::PresupuestoData;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;
const LAYER_NAME: &str = "Contenido";

/// 表格列的横坐标（毫米）
const COL_CANTIDAD: f32 = MARGIN_LEFT;
const COL_PRODUCTO: f32 = 35.0;
const COL_PRESENTACION: f32 = 105.0;
const COL_PRECIO: f32 = 150.0;
const COL_SUBTOTAL: f32 = 178.0;

/// PDF 生成错误
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// 逐行写入的页面游标，空间不足时自动换页
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, PdfError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN_TOP,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        self.ensure_space(LINE_HEIGHT);
        self.text(text, size, MARGIN_LEFT, bold);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN_BOTTOM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN_TOP;
        }
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| PdfError::Render(e.to_string()))
    }
}

fn money(value: Decimal) -> String {
    format!("$ {:.2}", value.round_dp(2))
}

/// 超长文本截断，避免与下一列重叠
fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// 将报价单数据渲染为 A4 PDF
///
/// 依次输出公司抬头、客户信息、产品表、合计与条件，表格超出页面时自动分页
pub fn render_presupuesto(data: &PresupuestoData) -> Result<Vec<u8>, PdfError> {
    let title = format!("Presupuesto {}", data.presupuesto.numero);
    let mut writer = PageWriter::new(&title)?;

    writer.line(&data.empresa.nombre, 16.0, true);
    writer.line(&format!("CUIT: {}", data.empresa.cuit), 9.0, false);
    writer.line(&data.empresa.localidad, 9.0, false);
    writer.line(
        &format!("Tel: {}  |  {}", data.empresa.telefono, data.empresa.email),
        9.0,
        false,
    );
    writer.gap(4.0);

    writer.line(&format!("PRESUPUESTO N° {}", data.presupuesto.numero), 13.0, true);
    writer.line(&format!("Fecha: {}", data.presupuesto.fecha), 10.0, false);
    writer.gap(4.0);

    writer.line("CLIENTE", 11.0, true);
    writer.line(&format!("Razón social: {}", data.cliente.razon_social), 10.0, false);
    writer.line(&format!("Teléfono: {}", data.cliente.telefono), 10.0, false);
    writer.line(&format!("Dirección: {}", data.cliente.direccion), 10.0, false);
    writer.line(&format!("Email: {}", data.cliente.email), 10.0, false);
    writer.line(&format!("Localidad: {}", data.cliente.localidad), 10.0, false);
    writer.gap(4.0);

    writer.ensure_space(LINE_HEIGHT * 2.0);
    writer.text("Cant.", 10.0, COL_CANTIDAD, true);
    writer.text("Producto", 10.0, COL_PRODUCTO, true);
    writer.text("Presentación", 10.0, COL_PRESENTACION, true);
    writer.text("P. Unit.", 10.0, COL_PRECIO, true);
    writer.text("Subtotal", 10.0, COL_SUBTOTAL, true);
    writer.gap(LINE_HEIGHT);

    for producto in &data.productos {
        writer.ensure_space(LINE_HEIGHT);
        writer.text(&producto.cantidad.to_string(), 9.0, COL_CANTIDAD, false);
        writer.text(&fit(&producto.nombre, 38), 9.0, COL_PRODUCTO, false);
        writer.text(&fit(&producto.presentacion, 24), 9.0, COL_PRESENTACION, false);
        writer.text(&money(producto.precio_unitario), 9.0, COL_PRECIO, false);
        writer.text(&money(producto.subtotal), 9.0, COL_SUBTOTAL, false);
        writer.gap(LINE_HEIGHT);
    }
    writer.gap(4.0);

    let totales = &data.totales;
    writer.line(&format!("Subtotal: {}", money(totales.subtotal)), 10.0, false);
    writer.line(
        &format!("IVA ({}%): {}", totales.iva_porcentaje, money(totales.iva_monto)),
        10.0,
        false,
    );
    writer.line(&format!("TOTAL: {}", money(totales.total)), 12.0, true);
    writer.gap(4.0);

    let condiciones = &data.condiciones;
    writer.line("CONDICIONES", 11.0, true);
    writer.line(&format!("Forma de pago: {}", condiciones.forma_pago), 10.0, false);
    writer.line(
        &format!("Validez: {} días", condiciones.validez_dias),
        10.0,
        false,
    );
    if let Some(notas) = condiciones.notas.as_deref().filter(|n| !n.trim().is_empty()) {
        writer.line("Notas:", 10.0, true);
        for linea in notas.lines() {
            writer.line(&fit(linea, 95), 9.0, false);
        }
    }

    writer.finish()
}
