// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/gesture.rs - 手势分类
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

use crate::landmark::{
  HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
  RING_TIP, THUMB_MCP, THUMB_TIP,
};

/// 出拳手势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
  Rock,
  Paper,
  Scissors,
  Invalid,
}

impl Gesture {
  /// 电脑可以出的三种手势
  pub const MOVES: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

  pub fn label(&self) -> &'static str {
    match self {
      Gesture::Rock => "rock",
      Gesture::Paper => "paper",
      Gesture::Scissors => "scissor",
      Gesture::Invalid => "Invalid Move",
    }
  }

  pub fn is_valid(&self) -> bool {
    *self != Gesture::Invalid
  }

  /// 石头胜剪刀，剪刀胜布，布胜石头
  pub fn beats(&self, other: Gesture) -> bool {
    matches!(
      (self, other),
      (Gesture::Rock, Gesture::Scissors)
        | (Gesture::Scissors, Gesture::Paper)
        | (Gesture::Paper, Gesture::Rock)
    )
  }
}

impl fmt::Display for Gesture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// (指尖, 关节) 关键点对，依次为拇指、食指、中指、无名指、小指。
///
/// 拇指与其余四指的关节取法相同（指尖 id - 2）。
const FINGER_PAIRS: [(u8, u8); 5] = [
  (THUMB_TIP, THUMB_MCP),
  (INDEX_TIP, INDEX_PIP),
  (MIDDLE_TIP, MIDDLE_PIP),
  (RING_TIP, RING_PIP),
  (PINKY_TIP, PINKY_PIP),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finger {
  Extended,
  Curled,
  // 指尖与关节等高
  Level,
}

fn finger(hand: &HandLandmarks, (tip, joint): (u8, u8)) -> Option<Finger> {
  let (tip, joint) = (hand.point(tip)?, hand.point(joint)?);
  // 图像坐标 y 轴向下，y 越小越靠上
  Some(match tip.y.cmp(&joint.y) {
    std::cmp::Ordering::Less => Finger::Extended,
    std::cmp::Ordering::Greater => Finger::Curled,
    std::cmp::Ordering::Equal => Finger::Level,
  })
}

/// 根据单帧关键点判定手势，按 布 → 石头 → 剪刀 的优先级匹配。
///
/// 关键点不足 21 个或不匹配任何规则时返回 [`Gesture::Invalid`]。
pub fn classify(hand: &HandLandmarks) -> Gesture {
  if !hand.is_complete() {
    return Gesture::Invalid;
  }

  let mut fingers = [Finger::Level; 5];
  for (slot, pair) in fingers.iter_mut().zip(FINGER_PAIRS) {
    match finger(hand, pair) {
      Some(state) => *slot = state,
      None => return Gesture::Invalid,
    }
  }

  if fingers.iter().all(|f| *f == Finger::Extended) {
    Gesture::Paper
  } else if fingers.iter().all(|f| *f == Finger::Curled) {
    Gesture::Rock
  } else if fingers[1] == Finger::Extended && fingers[2] == Finger::Extended {
    Gesture::Scissors
  } else {
    Gesture::Invalid
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::landmark::LANDMARK_COUNT;

  /// 所有关键点放在 y = 100，再按 (指尖偏移) 调整五个指尖
  fn hand_with_tips(offsets: [i32; 5]) -> HandLandmarks {
    let mut pixels = vec![(50, 100); LANDMARK_COUNT];
    for ((tip, _), dy) in FINGER_PAIRS.iter().zip(offsets) {
      pixels[*tip as usize].1 += dy;
    }
    HandLandmarks::from_pixels(pixels)
  }

  const UP: i32 = -20;
  const DOWN: i32 = 20;

  #[test]
  fn all_fingers_extended_is_paper() {
    assert_eq!(classify(&hand_with_tips([UP; 5])), Gesture::Paper);
  }

  #[test]
  fn all_fingers_curled_is_rock() {
    assert_eq!(classify(&hand_with_tips([DOWN; 5])), Gesture::Rock);
  }

  #[test]
  fn index_and_middle_extended_is_scissors() {
    assert_eq!(
      classify(&hand_with_tips([DOWN, UP, UP, DOWN, DOWN])),
      Gesture::Scissors
    );
    // 其余三指状态不影响剪刀判定
    assert_eq!(
      classify(&hand_with_tips([UP, UP, UP, DOWN, UP])),
      Gesture::Scissors
    );
    assert_eq!(
      classify(&hand_with_tips([0, UP, UP, 0, 0])),
      Gesture::Scissors
    );
  }

  #[test]
  fn other_shapes_are_invalid() {
    assert_eq!(
      classify(&hand_with_tips([DOWN, UP, DOWN, DOWN, DOWN])),
      Gesture::Invalid
    );
    assert_eq!(
      classify(&hand_with_tips([UP, DOWN, UP, UP, UP])),
      Gesture::Invalid
    );
  }

  #[test]
  fn level_finger_breaks_paper_and_rock() {
    // 拇指等高：既不是布也不是石头，但食指中指伸直仍为剪刀
    assert_eq!(classify(&hand_with_tips([0, UP, UP, UP, UP])), Gesture::Scissors);
    assert_eq!(
      classify(&hand_with_tips([0, DOWN, DOWN, DOWN, DOWN])),
      Gesture::Invalid
    );
  }

  #[test]
  fn empty_or_partial_hand_is_invalid() {
    assert_eq!(classify(&HandLandmarks::empty()), Gesture::Invalid);
    let partial = HandLandmarks::from_pixels(vec![(0, 0); 20]);
    assert_eq!(classify(&partial), Gesture::Invalid);
  }

  #[test]
  fn beats_is_cyclic() {
    assert!(Gesture::Rock.beats(Gesture::Scissors));
    assert!(Gesture::Scissors.beats(Gesture::Paper));
    assert!(Gesture::Paper.beats(Gesture::Rock));
    assert!(!Gesture::Rock.beats(Gesture::Paper));
    assert!(!Gesture::Rock.beats(Gesture::Rock));
    assert!(!Gesture::Invalid.beats(Gesture::Rock));
  }

  #[test]
  fn labels_match_wire_names() {
    let labels: Vec<_> = Gesture::MOVES.iter().map(Gesture::label).collect();
    assert_eq!(labels, ["rock", "paper", "scissor"]);
    assert_eq!(Gesture::Invalid.to_string(), "Invalid Move");
  }
}
