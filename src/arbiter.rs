// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/arbiter.rs - 回合裁决
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

use std::fmt;

use crate::{
  gesture::{Gesture, classify},
  landmark::HandLandmarks,
};

/// 占位标签，用于没有手势可报告的情况
pub const NOT_AVAILABLE: &str = "N/A";

/// 一个回合的裁决结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundOutcome {
  PlayerWin,
  ComputerWin,
  Tie,
  InvalidMove,
  NoHand,
}

impl RoundOutcome {
  pub fn label(&self) -> &'static str {
    match self {
      RoundOutcome::PlayerWin => "Player Wins",
      RoundOutcome::ComputerWin => "Computer Wins",
      RoundOutcome::Tie => "Tie",
      RoundOutcome::InvalidMove => "Invalid Move",
      RoundOutcome::NoHand => "No Hand Detected",
    }
  }

  /// 是否计入比分
  pub fn is_scored(&self) -> bool {
    matches!(
      self,
      RoundOutcome::PlayerWin | RoundOutcome::ComputerWin | RoundOutcome::Tie
    )
  }
}

impl fmt::Display for RoundOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// 比较玩家与电脑的手势。
///
/// 玩家手势无效时结果恒为 [`RoundOutcome::InvalidMove`]；电脑手势无效视为弃权。
pub fn arbitrate(player: Gesture, computer: Gesture) -> RoundOutcome {
  if !player.is_valid() {
    return RoundOutcome::InvalidMove;
  }
  if player == computer {
    RoundOutcome::Tie
  } else if player.beats(computer) || !computer.is_valid() {
    RoundOutcome::PlayerWin
  } else {
    RoundOutcome::ComputerWin
  }
}

/// 一个完整回合：玩家手势、电脑手势与结果。
///
/// 没有检测到手时两个手势都为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
  pub outcome: RoundOutcome,
  pub player: Option<Gesture>,
  pub computer: Option<Gesture>,
}

impl RoundResult {
  pub fn no_hand() -> Self {
    Self {
      outcome: RoundOutcome::NoHand,
      player: None,
      computer: None,
    }
  }

  pub fn player_label(&self) -> &'static str {
    self.player.as_ref().map_or(NOT_AVAILABLE, Gesture::label)
  }

  pub fn computer_label(&self) -> &'static str {
    self.computer.as_ref().map_or(NOT_AVAILABLE, Gesture::label)
  }
}

/// 对一帧的关键点与预先抽取的电脑手势进行裁决
pub fn judge(hand: &HandLandmarks, computer: Gesture) -> RoundResult {
  if hand.is_empty() {
    return RoundResult::no_hand();
  }

  let player = classify(hand);
  RoundResult {
    outcome: arbitrate(player, computer),
    player: Some(player),
    computer: Some(computer),
  }
}
