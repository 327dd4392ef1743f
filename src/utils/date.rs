// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

/// 阿根廷时区偏移（GMT-3，无夏令时）
const ARGENTINA_OFFSET_SECS: i32 = 3 * 3600;

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// 阿根廷固定时区
pub fn argentina_offset() -> FixedOffset {
    FixedOffset::west_opt(ARGENTINA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// 当前阿根廷时间
pub fn now_argentina() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&argentina_offset())
}

/// 西班牙语长日期，例如 `19 de octubre de 2026`
pub fn spanish_long_date<D: Datelike>(date: &D) -> String {
    let mes = MESES[date.month0() as usize];
    format!("{} de {} de {}", date.day(), mes, date.year())
}

/// 短日期 `d/m/yyyy`，日与月不补零
pub fn short_date<D: Datelike>(date: &D) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}
