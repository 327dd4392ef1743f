// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 价格表导出与导入
//!
//! 支持 CSV、XML 与 XLSX 三种格式；导入时表头按 `id` / `price` 不区分大小写匹配。

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;

/// 价格表错误类型
#[derive(Error, Debug)]
pub enum PriceListError {
    /// 不支持的导出格式
    #[error("Format Unnacepted")]
    UnsupportedExportFormat,
    /// 不支持的导入文件扩展名
    #[error("Unsupported file format")]
    UnsupportedFileFormat,
    /// Excel 缺少 id 或 price 列
    #[error("Excel is missing id or price column")]
    MissingColumns,
    /// 文件没有数据行
    #[error("File contains no rows")]
    NoRows,
    /// 没有任何有效的 id/price 行
    #[error("No valid id/price rows found")]
    NoValidRows,
    /// CSV 解析错误
    #[error("Invalid CSV file: {0}")]
    Csv(#[from] csv::Error),
    /// XML 读写错误
    #[error("Invalid XML file: {0}")]
    Xml(String),
    /// Excel 读取错误
    #[error("Invalid Excel file: {0}")]
    Excel(String),
    /// Excel 写入错误
    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] XlsxError),
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PriceListError {
    /// 是否由上传文件内容导致（对应客户端错误）
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PriceListError::Xlsx(_) | PriceListError::Io(_))
    }
}

/// 价格表文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFormat {
    Csv,
    Xml,
    Xlsx,
}

impl PriceFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            PriceFormat::Csv => "csv",
            PriceFormat::Xml => "xml",
            PriceFormat::Xlsx => "xlsx",
        }
    }

    /// MIME 类型
    pub fn content_type(&self) -> &'static str {
        match self {
            PriceFormat::Csv => "text/csv; charset=utf-8",
            PriceFormat::Xml => "application/xml; charset=utf-8",
            PriceFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// 根据文件名扩展名判断格式
    pub fn from_file_name(file_name: &str) -> Result<Self, PriceListError> {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| PriceListError::UnsupportedFileFormat)
    }
}

impl FromStr for PriceFormat {
    type Err = PriceListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(PriceFormat::Csv),
            "xml" => Ok(PriceFormat::Xml),
            "xlsx" => Ok(PriceFormat::Xlsx),
            _ => Err(PriceListError::UnsupportedExportFormat),
        }
    }
}

/// 导出行
#[derive(Debug, Clone)]
pub struct PriceRow {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
}

/// 导入得到的价格更新
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub id: i32,
    pub price: Decimal,
}

/// 导出的文件
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 导出价格表
///
/// # 参数
///
/// * `format` - 目标格式
/// * `rows` - 产品 id、名称与价格
/// * `date_label` - 西班牙语长日期，用于文件名与工作表名
pub fn export(
    format: PriceFormat,
    rows: &[PriceRow],
    date_label: &str,
) -> Result<ExportedFile, PriceListError> {
    let bytes = match format {
        PriceFormat::Csv => export_csv(rows)?,
        PriceFormat::Xml => export_xml(rows)?,
        PriceFormat::Xlsx => export_xlsx(rows, date_label)?,
    };

    Ok(ExportedFile {
        file_name: format!("productos-al-{}.{}", date_label, format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

fn export_csv(rows: &[PriceRow]) -> Result<Vec<u8>, PriceListError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Id", "Name", "Price"])?;
    for row in rows {
        writer.write_record([row.id.to_string(), row.name.clone(), row.price.to_string()])?;
    }
    writer.into_inner().map_err(|e| PriceListError::Io(e.into_error()))
}

fn xml_err<E: std::fmt::Display>(e: E) -> PriceListError {
    PriceListError::Xml(e.to_string())
}

fn export_xml(rows: &[PriceRow]) -> Result<Vec<u8>, PriceListError> {
    let mut writer = quick_xml::Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("products")))
        .map_err(xml_err)?;

    for row in rows {
        writer
            .write_event(Event::Start(BytesStart::new("product")))
            .map_err(xml_err)?;
        for (tag, value) in [
            ("id", row.id.to_string()),
            ("name", row.name.clone()),
            ("price", row.price.to_string()),
        ] {
            writer
                .write_event(Event::Start(BytesStart::new(tag)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&value)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("product")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("products")))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

fn export_xlsx(rows: &[PriceRow], date_label: &str) -> Result<Vec<u8>, PriceListError> {
    // Excel limits sheet names to 31 characters
    let sheet_name: String = format!("Productos al {}", date_label)
        .chars()
        .take(31)
        .collect();
    let header = Format::new().set_bold();
    let red = Format::new().set_font_color(Color::Red);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name.trim_end())?;
    worksheet.write_string_with_format(0, 0, "Id", &header)?;
    worksheet.write_string_with_format(0, 1, "Name", &header)?;
    worksheet.write_string_with_format(0, 2, "Price", &header)?;
    worksheet.set_column_width(1, 60)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number(r, 0, f64::from(row.id))?;
        worksheet.write_string(r, 1, &row.name)?;
        worksheet.write_number_with_format(r, 2, row.price.to_f64().unwrap_or_default(), &red)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// 未解析的行：id 与 price 的原始文本
#[derive(Debug, Default)]
struct RawRow {
    id: Option<String>,
    price: Option<String>,
}

impl RawRow {
    fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            id: map.get("id").cloned(),
            price: map.get("price").cloned(),
        }
    }
}

/// 解析上传的价格表
///
/// 扩展名决定解析器；返回所有 id 为整数且 price 为数字的行
pub fn parse(file_name: &str, bytes: &[u8]) -> Result<Vec<PriceUpdate>, PriceListError> {
    let raw = match PriceFormat::from_file_name(file_name)? {
        PriceFormat::Csv => parse_csv(bytes)?,
        PriceFormat::Xml => parse_xml(bytes)?,
        PriceFormat::Xlsx => parse_xlsx(bytes)?,
    };

    if raw.is_empty() {
        return Err(PriceListError::NoRows);
    }

    let updates: Vec<PriceUpdate> = raw
        .iter()
        .filter_map(|row| {
            let id = row.id.as_deref()?.trim().parse::<i32>().ok()?;
            let price = parse_price(row.price.as_deref()?)?;
            Some(PriceUpdate { id, price })
        })
        .collect();

    if updates.is_empty() {
        return Err(PriceListError::NoValidRows);
    }
    Ok(updates)
}

/// 解析价格文本，允许 `$` 前缀与逗号小数点
fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = text.trim().trim_start_matches('$').trim();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_str(&cleaned.replace(',', ".")))
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, PriceListError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let map: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(RawRow::from_map(&map));
    }
    Ok(rows)
}

fn parse_xml(bytes: &[u8]) -> Result<Vec<RawRow>, PriceListError> {
    let mut reader = quick_xml::Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if name == "product" {
                    current = Some(HashMap::new());
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Event::Text(text) => {
                if let (Some(row), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let value = text.unescape().map_err(xml_err)?;
                    row.insert(name.clone(), value.into_owned());
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if name == "product" {
                    if let Some(row) = current.take() {
                        rows.push(RawRow::from_map(&row));
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Decimal::from_f64(*f).map(|d| d.normalize().to_string()),
        _ => None,
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<RawRow>, PriceListError> {
    let mut workbook: Xlsx<Cursor<Vec<u8>>> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e: calamine::XlsxError| PriceListError::Excel(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PriceListError::NoRows)?
        .map_err(|e| PriceListError::Excel(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(PriceListError::NoRows)?;
    let position = |wanted: &str| {
        header.iter().position(|cell| {
            cell_text(cell)
                .map(|text| text.trim().eq_ignore_ascii_case(wanted))
                .unwrap_or(false)
        })
    };
    let (id_idx, price_idx) = match (position("id"), position("price")) {
        (Some(id), Some(price)) => (id, price),
        _ => return Err(PriceListError::MissingColumns),
    };

    Ok(rows
        .map(|row| RawRow {
            id: row.get(id_idx).and_then(cell_text),
            price: row.get(price_idx).and_then(cell_text),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rows() -> Vec<PriceRow> {
        vec![
            PriceRow {
                id: 1,
                name: "Aceite <Premium> & Co".to_string(),
                price: dec!(1500.50),
            },
            PriceRow {
                id: 2,
                name: "Grasa, multiuso".to_string(),
                price: dec!(320),
            },
        ]
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        let err = "pdf".parse::<PriceFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Format Unnacepted");
    }

    #[test]
    fn test_export_csv_has_header_and_file_name() {
        let file = export(PriceFormat::Csv, &rows(), "19 de octubre de 2026").unwrap();
        let text = String::from_utf8(file.bytes).unwrap();

        assert_eq!(file.file_name, "productos-al-19 de octubre de 2026.csv");
        assert!(text.starts_with("Id,Name,Price\n"));
        assert!(text.contains("2,\"Grasa, multiuso\",320"));
    }

    #[test]
    fn test_export_xml_escapes_names() {
        let file = export(PriceFormat::Xml, &rows(), "1 de enero de 2026").unwrap();
        let text = String::from_utf8(file.bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<product><id>1</id><name>Aceite &lt;Premium&gt; &amp; Co</name><price>1500.50</price></product>"));
    }

    #[test]
    fn test_parse_csv_matches_headers_case_insensitively() {
        let csv = b"ID,Name,PRICE\n1,Aceite,1600.25\n2,Grasa,abc\nx,Otro,10\n";
        let updates = parse("precios.csv", csv).unwrap();

        assert_eq!(
            updates,
            vec![PriceUpdate {
                id: 1,
                price: dec!(1600.25)
            }]
        );
    }

    #[test]
    fn test_parse_xml_products() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <products>
                <product><id>7</id><name>Fluido</name><price>99.9</price></product>
                <product><id>8</id><name>Sin precio</name></product>
            </products>"#;
        let updates = parse("lista.XML", xml).unwrap();

        assert_eq!(
            updates,
            vec![PriceUpdate {
                id: 7,
                price: dec!(99.9)
            }]
        );
    }

    #[test]
    fn test_parse_reports_empty_and_invalid_files() {
        let err = parse("vacio.csv", b"id,price\n").unwrap_err();
        assert!(matches!(err, PriceListError::NoRows));

        let err = parse("malo.csv", b"id,price\nuno,dos\n").unwrap_err();
        assert!(matches!(err, PriceListError::NoValidRows));

        let err = parse("lista.json", b"{}").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format");
    }

    #[test]
    fn test_parse_xlsx_roundtrips_exported_workbook() {
        let file = export(PriceFormat::Xlsx, &rows(), "19 de octubre de 2026").unwrap();
        let updates = parse("lista.xlsx", &file.bytes).unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].id, 1);
        assert_eq!(updates[0].price, dec!(1500.5));
    }

    #[test]
    fn test_parse_xlsx_without_price_column() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Id").unwrap();
        sheet.write_string(0, 1, "Name").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = parse("lista.xlsx", &bytes).unwrap_err();
        assert!(matches!(err, PriceListError::MissingColumns));
    }
}
