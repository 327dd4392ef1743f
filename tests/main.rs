// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 测试主模块
///
/// 基于内存 SQLite 与 axum-test 的端到端 API 测试
mod integration;
