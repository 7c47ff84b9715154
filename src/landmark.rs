// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/landmark.rs - 手部关键点定义与适配
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

/// 每只手的关键点数量
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: u8 = 0;
pub const THUMB_CMC: u8 = 1;
pub const THUMB_MCP: u8 = 2;
pub const THUMB_IP: u8 = 3;
pub const THUMB_TIP: u8 = 4;
pub const INDEX_MCP: u8 = 5;
pub const INDEX_PIP: u8 = 6;
pub const INDEX_DIP: u8 = 7;
pub const INDEX_TIP: u8 = 8;
pub const MIDDLE_MCP: u8 = 9;
pub const MIDDLE_PIP: u8 = 10;
pub const MIDDLE_DIP: u8 = 11;
pub const MIDDLE_TIP: u8 = 12;
pub const RING_MCP: u8 = 13;
pub const RING_PIP: u8 = 14;
pub const RING_DIP: u8 = 15;
pub const RING_TIP: u8 = 16;
pub const PINKY_MCP: u8 = 17;
pub const PINKY_PIP: u8 = 18;
pub const PINKY_DIP: u8 = 19;
pub const PINKY_TIP: u8 = 20;

/// 检测器输出的单个关键点，坐标归一化到 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
  pub x: f32,
  pub y: f32,
}

/// 检测器输出的一只手
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawHand {
  pub landmarks: Vec<RawLandmark>,
}

impl From<Vec<RawLandmark>> for RawHand {
  fn from(landmarks: Vec<RawLandmark>) -> Self {
    Self { landmarks }
  }
}

/// 像素坐标下的关键点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkPoint {
  pub id: u8,
  pub x: i32,
  pub y: i32,
}

/// 一帧图像中第一只手的关键点，按 id 顺序排列。
///
/// 空列表表示没有检测到手。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandLandmarks {
  points: Vec<LandmarkPoint>,
}

impl HandLandmarks {
  pub fn empty() -> Self {
    Self::default()
  }

  /// 由像素坐标构造，按顺序重新编号，超出 21 个的点被丢弃
  pub fn from_pixels<I: IntoIterator<Item = (i32, i32)>>(pixels: I) -> Self {
    let points = pixels
      .into_iter()
      .take(LANDMARK_COUNT)
      .enumerate()
      .map(|(id, (x, y))| LandmarkPoint { id: id as u8, x, y })
      .collect();
    Self { points }
  }

  /// 将检测器输出转换为像素坐标，只使用第一只手
  pub fn from_detection(hands: &[RawHand], width: u32, height: u32) -> Self {
    let Some(hand) = hands.first() else {
      return Self::empty();
    };

    let (w, h) = (width as f32, height as f32);
    Self::from_pixels(
      hand
        .landmarks
        .iter()
        .map(|lm| ((lm.x * w).round() as i32, (lm.y * h).round() as i32)),
    )
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  /// 是否包含完整的 21 个关键点
  pub fn is_complete(&self) -> bool {
    self.points.len() == LANDMARK_COUNT
  }

  pub fn point(&self, id: u8) -> Option<&LandmarkPoint> {
    self.points.get(id as usize).filter(|p| p.id == id)
  }

  pub fn points(&self) -> &[LandmarkPoint] {
    &self.points
  }

  /// 外接矩形 [x_min, y_min, x_max, y_max]
  pub fn bounding_box(&self) -> Option<[i32; 4]> {
    let first = self.points.first()?;
    let init = [first.x, first.y, first.x, first.y];
    Some(self.points.iter().fold(init, |b, p| {
      [b[0].min(p.x), b[1].min(p.y), b[2].max(p.x), b[3].max(p.y)]
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw_hand(n: usize) -> RawHand {
    (0..n)
      .map(|i| RawLandmark {
        x: i as f32 / 40.0,
        y: 0.5,
      })
      .collect::<Vec<_>>()
      .into()
  }

  #[test]
  fn no_hands_gives_empty_list() {
    let hand = HandLandmarks::from_detection(&[], 640, 480);
    assert!(hand.is_empty());
    assert_eq!(hand.bounding_box(), None);
  }

  #[test]
  fn only_first_hand_is_used() {
    let mut second = raw_hand(21);
    second.landmarks[0] = RawLandmark { x: 0.9, y: 0.9 };
    let hand = HandLandmarks::from_detection(&[raw_hand(21), second], 640, 480);
    assert_eq!(hand.point(WRIST), Some(&LandmarkPoint { id: 0, x: 0, y: 240 }));
  }

  #[test]
  fn normalized_coordinates_are_rounded_to_pixels() {
    let hand = RawHand::from(vec![RawLandmark { x: 0.5009, y: 0.2501 }]);
    let hand = HandLandmarks::from_detection(&[hand], 640, 480);
    // 0.5009 * 640 = 320.576, 0.2501 * 480 = 120.048
    assert_eq!(hand.points(), &[LandmarkPoint { id: 0, x: 321, y: 120 }]);
  }

  #[test]
  fn ids_follow_detector_order() {
    let hand = HandLandmarks::from_detection(&[raw_hand(21)], 400, 400);
    assert!(hand.is_complete());
    for (i, p) in hand.points().iter().enumerate() {
      assert_eq!(p.id as usize, i);
    }
    assert_eq!(hand.point(PINKY_TIP).map(|p| p.x), Some(200));
  }

  #[test]
  fn extra_points_are_dropped() {
    let hand = HandLandmarks::from_detection(&[raw_hand(30)], 100, 100);
    assert_eq!(hand.len(), LANDMARK_COUNT);
    assert_eq!(hand.point(21), None);
  }

  #[test]
  fn bounding_box_spans_all_points() {
    let hand = HandLandmarks::from_pixels([(10, 50), (30, 20), (5, 70)]);
    assert_eq!(hand.bounding_box(), Some([5, 20, 30, 70]));
  }
}
