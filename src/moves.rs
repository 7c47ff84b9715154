// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/moves.rs - 电脑出拳来源
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

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::gesture::Gesture;

/// 每回合为电脑抽取一个手势。
///
/// 抽取发生在识别玩家手势之前，实现不得读取玩家手势。
pub trait MoveSource {
  fn draw_move(&mut self) -> Gesture;
}

/// 在石头、布、剪刀中均匀随机抽取
#[derive(Debug, Clone)]
pub struct RandomMoves<R = SmallRng> {
  rng: R,
}

impl RandomMoves<SmallRng> {
  pub fn from_entropy() -> Self {
    Self {
      rng: SmallRng::from_os_rng(),
    }
  }

  pub fn seeded(seed: u64) -> Self {
    Self {
      rng: SmallRng::seed_from_u64(seed),
    }
  }

  /// 有种子时使用固定序列，否则使用系统熵
  pub fn with_seed(seed: Option<u64>) -> Self {
    seed.map_or_else(Self::from_entropy, Self::seeded)
  }
}

impl<R: Rng> MoveSource for RandomMoves<R> {
  fn draw_move(&mut self) -> Gesture {
    Gesture::MOVES[self.rng.random_range(0..Gesture::MOVES.len())]
  }
}

/// 按固定顺序循环出拳，序列至少包含 `first` 一项
#[derive(Debug, Clone)]
pub struct ScriptedMoves {
  moves: Vec<Gesture>,
  cursor: usize,
}

impl ScriptedMoves {
  pub fn new(first: Gesture, then: impl IntoIterator<Item = Gesture>) -> Self {
    let moves = std::iter::once(first).chain(then).collect();
    Self { moves, cursor: 0 }
  }

  pub fn always(gesture: Gesture) -> Self {
    Self::new(gesture, [])
  }
}

impl MoveSource for ScriptedMoves {
  fn draw_move(&mut self) -> Gesture {
    let gesture = self.moves[self.cursor % self.moves.len()];
    self.cursor = (self.cursor + 1) % self.moves.len();
    gesture
  }
}

impl<M: MoveSource + ?Sized> MoveSource for Box<M> {
  fn draw_move(&mut self) -> Gesture {
    (**self).draw_move()
  }
}
