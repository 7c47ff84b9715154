// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/remote/message.rs - 远程消息格式
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use serde::{Deserialize, Serialize};

use crate::arbiter::RoundResult;

/// 客户端事件：`{"event": "game", "data": "data:image/jpeg;base64,..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ClientEvent {
  Game(String),
}

/// 服务端事件：`{"event": "result", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ServerEvent {
  Result(ResultMessage),
}

/// 一次判定的结果，字段取值均为展示用的标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
  pub outcome: String,
  pub computer_move: String,
  pub player_move: String,
}

impl From<&RoundResult> for ResultMessage {
  fn from(result: &RoundResult) -> Self {
    Self {
      outcome: result.outcome.label().to_string(),
      computer_move: result.computer_label().to_string(),
      player_move: result.player_label().to_string(),
    }
  }
}
