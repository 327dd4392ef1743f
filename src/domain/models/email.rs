// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 收件人
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecipient {
    pub email: String,
    pub name: String,
}

/// 附件，`content` 为 base64 编码
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub name: String,
    pub content: String,
    pub content_type: String,
}

/// 消息 `send-email` 的负载，由内网后端负责投递
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailPayload {
    pub to: Vec<EmailRecipient>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}
