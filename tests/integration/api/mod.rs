// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod cart_order_api_test;
pub mod catalog_api_test;
pub mod user_api_test;
