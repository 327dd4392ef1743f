// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// 由产品名称生成 URL slug
///
/// 去除变音符号，将空格、`/`、`•`、`'` 与 `,` 替换为 `-`，合并连续的 `-`，
/// 转为小写并去掉首尾的 `-`
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' | '/' | '•' | '\'' | ',' => out.push('-'),
            c if c.is_ascii() => out.push(c),
            c => match deunicode::deunicode_char(c) {
                Some(ascii) => out.push_str(ascii),
                None => out.push(c),
            },
        }
    }

    DASH_RUNS
        .replace_all(&out, "-")
        .to_lowercase()
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_removes_diacritics() {
        assert_eq!(slugify("Aceite Hidráulico"), "aceite-hidraulico");
        assert_eq!(slugify("Grasa Ñandú"), "grasa-nandu");
    }

    #[test]
    fn test_slug_replaces_separators() {
        assert_eq!(slugify("10W/40 • Sintético"), "10w-40-sintetico");
        assert_eq!(slugify("Kansaco's  Fluid"), "kansaco-s-fluid");
        assert_eq!(slugify("Aceite 15W40, Balde"), "aceite-15w40-balde");
    }

    #[test]
    fn test_slug_trims_dashes() {
        assert_eq!(slugify("  Refrigerante  "), "refrigerante");
        assert_eq!(slugify("/Lubricante/"), "lubricante");
    }
}
