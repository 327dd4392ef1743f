// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括日期格式化、slug 生成、图片命名、价格表读写与遥测初始化
pub mod date;
pub mod image_name;
pub mod price_list;
pub mod slug;
pub mod telemetry;
