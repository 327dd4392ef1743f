// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt::Write as _;

/// 构建下载用的 `Content-Disposition` 头
///
/// `filename` 为 ASCII 回退名（非 ASCII 与控制字符替换为 `_`，`"` 与 `\` 转义），
/// `filename*` 按 RFC 5987 携带 UTF-8 原名。结果只含可见 ASCII
pub fn attachment_disposition(file_name: &str) -> String {
    let mut fallback = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                fallback.push('\\');
                fallback.push(c);
            }
            c if c.is_ascii_graphic() || c == ' ' => fallback.push(c),
            _ => fallback.push('_'),
        }
    }

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~' => {
                encoded.push(byte as char)
            }
            _ => {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_plain_name_is_kept() {
        assert_eq!(
            attachment_disposition("productos-al-19-de-octubre.csv"),
            "attachment; filename=\"productos-al-19-de-octubre.csv\"; filename*=UTF-8''productos-al-19-de-octubre.csv"
        );
    }

    #[test]
    fn test_quotes_and_non_ascii_are_escaped() {
        let value = attachment_disposition("Presupuesto_2026-abc_Juan_\"El\"_Pérez.pdf");

        assert!(value.contains("filename=\"Presupuesto_2026-abc_Juan_\\\"El\\\"_P_rez.pdf\""));
        assert!(value.ends_with("filename*=UTF-8''Presupuesto_2026-abc_Juan_%22El%22_P%C3%A9rez.pdf"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn test_control_characters_cannot_split_the_header() {
        let value = attachment_disposition("a\r\nSet-Cookie: x.pdf");

        assert!(!value.contains('\r') && !value.contains('\n'));
        assert!(value.contains("%0D%0A"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
