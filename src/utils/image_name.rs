// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static DOUBLE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|bmp|tiff|tif)\.webp$").unwrap());
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]").unwrap());
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// 图片在存储桶中的目录
pub const PRODUCT_IMAGE_PREFIX: &str = "products/";

/// 清理图片名称中的重复扩展名
///
/// 只处理路径最后一段：`foo.jpg.webp` → `foo.webp`（不区分大小写）
pub fn clean_image_name(name: &str) -> String {
    let (dir, file) = match name.rfind('/') {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    };
    format!("{}{}", dir, DOUBLE_EXTENSION.replace(file, ".webp"))
}

/// 由上传文件名生成存储键 `products/<stem>.<ext>`
///
/// 主干中非 `[a-zA-Z0-9._-]` 的字符替换为 `_`，连续的 `_` 合并，整体转为小写
pub fn product_image_key(original_name: &str) -> String {
    let (stem, ext) = match original_name.rfind('.') {
        Some(idx) if idx > 0 => (&original_name[..idx], &original_name[idx + 1..]),
        _ => (original_name, ""),
    };

    let stem = UNSAFE_CHARS.replace_all(stem, "_");
    let stem = UNDERSCORE_RUNS.replace_all(&stem, "_").to_lowercase();

    if ext.is_empty() {
        format!("{}{}", PRODUCT_IMAGE_PREFIX, stem)
    } else {
        format!("{}{}.{}", PRODUCT_IMAGE_PREFIX, stem, ext.to_lowercase())
    }
}

/// 关联已有图片时尝试的候选键
///
/// 去掉首尾空白与开头的 `/`，返回原键及其带/不带 `products/` 前缀的孪生键
pub fn candidate_keys(image_key: &str) -> Vec<String> {
    let key = image_key.trim().trim_start_matches('/').to_string();
    let twin = match key.strip_prefix(PRODUCT_IMAGE_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => format!("{}{}", PRODUCT_IMAGE_PREFIX, key),
    };

    if twin.is_empty() || twin == key {
        vec![key]
    } else {
        vec![key, twin]
    }
}

/// 拼接公共访问 URL
pub fn public_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
