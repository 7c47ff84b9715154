// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/output/draw.rs - 游戏画面叠加层
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

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};
use thiserror::Error;
use tracing::info;

use crate::{
  arbiter::{RoundOutcome, RoundResult},
  landmark::HandLandmarks,
  round::Score,
};

// 颜色（RGB）
const GREEN: [u8; 3] = [0, 255, 0];
const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const YELLOW: [u8; 3] = [255, 255, 0];
const CYAN: [u8; 3] = [0, 255, 255];
const MAGENTA: [u8; 3] = [255, 0, 255];

const LANDMARK_RADIUS: i32 = 5;
const BBOX_PADDING: i32 = 20;
const PROMPT_FONT_SIZE: f32 = 20.0;
const DIGIT_FONT_SIZE: f32 = 120.0;
const RESULT_FONT_SIZE: f32 = 28.0;
const SCORE_FONT_SIZE: f32 = 18.0;
const SCORE_LINE_BOTTOM_MARGIN: i32 = 50;

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/font.ttf");

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("无法读取字体文件: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 当前阶段的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
  /// 倒计时剩余秒数
  Countdown(u64),
  Rest,
}

/// 一帧需要叠加的全部内容
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
  pub prompt: Prompt,
  pub round: Option<RoundResult>,
  pub score: Score,
  /// 抓拍帧上的手部关键点
  pub landmarks: Option<HandLandmarks>,
  pub fps: Option<f32>,
  /// 本帧是否完成了一次抓拍
  pub captured: bool,
}

/// 一行文字及其位置（左上角）
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
  pub text: String,
  pub x: i32,
  pub y: i32,
  pub size: f32,
  pub color: [u8; 3],
}

impl TextItem {
  fn new(text: impl Into<String>, (x, y): (i32, i32), size: f32, color: [u8; 3]) -> Self {
    Self {
      text: text.into(),
      x,
      y,
      size,
      color,
    }
  }
}

fn outcome_text(outcome: RoundOutcome) -> (&'static str, [u8; 3]) {
  match outcome {
    RoundOutcome::PlayerWin => ("You Win!", GREEN),
    RoundOutcome::ComputerWin => ("Computer Wins!", RED),
    RoundOutcome::Tie => ("It's a Draw!", CYAN),
    RoundOutcome::InvalidMove => ("Invalid Move!", RED),
    RoundOutcome::NoHand => ("No Hand Detected", RED),
  }
}

impl Overlay {
  /// 按图像尺寸排布所有文字
  pub fn text_items(&self, height: u32) -> Vec<TextItem> {
    let mut items = Vec::new();

    if let Some(fps) = self.fps {
      items.push(TextItem::new(
        format!("{:.0}", fps),
        (10, 10),
        PROMPT_FONT_SIZE,
        MAGENTA,
      ));
    }

    match self.prompt {
      Prompt::Countdown(remaining) => {
        items.push(TextItem::new(
          "Show your move!",
          (150, 235),
          PROMPT_FONT_SIZE,
          GREEN,
        ));
        if remaining > 0 {
          items.push(TextItem::new(
            remaining.to_string(),
            (300, 150),
            DIGIT_FONT_SIZE,
            RED,
          ));
        }
      }
      Prompt::Rest => {
        items.push(TextItem::new("Next move!", (150, 235), PROMPT_FONT_SIZE, GREEN));
      }
    }

    if let Some(round) = &self.round {
      if let Some(computer) = round.computer {
        items.push(TextItem::new(
          format!("Computer: {}", computer),
          (10, 50),
          RESULT_FONT_SIZE,
          BLUE,
        ));
      }
      if let Some(player) = round.player {
        items.push(TextItem::new(
          format!("You: {}", player),
          (10, 90),
          RESULT_FONT_SIZE,
          GREEN,
        ));
      }
      let (text, color) = outcome_text(round.outcome);
      items.push(TextItem::new(text, (10, 130), RESULT_FONT_SIZE, color));
    }

    let score_y = (height as i32 - SCORE_LINE_BOTTOM_MARGIN).max(0);
    items.push(TextItem::new(
      self.score.to_string(),
      (10, score_y),
      SCORE_FONT_SIZE,
      YELLOW,
    ));

    items
  }
}

/// 把叠加层画到图像上
pub struct Draw {
  font: FontArc,
}

impl Draw {
  /// 使用内置字体（DejaVu Sans）
  pub fn embedded() -> Result<Self, DrawError> {
    let font = FontArc::try_from_slice(EMBEDDED_FONT)?;
    Ok(Self { font })
  }

  pub fn with_font_file(path: &Path) -> Result<Self, DrawError> {
    let data = std::fs::read(path)?;
    let font = FontArc::try_from_vec(data)?;
    info!("载入字体: {}", path.display());
    Ok(Self { font })
  }

  /// `?font=` 给出时载入该字体，否则用内置字体
  pub fn from_font_query(font: Option<String>) -> Result<Self, DrawError> {
    match font {
      Some(font) => Self::with_font_file(Path::new(&font)),
      None => Self::embedded(),
    }
  }

  pub fn draw_overlay(&self, image: &mut RgbImage, overlay: &Overlay) {
    if let Some(hand) = &overlay.landmarks {
      draw_landmarks(image, hand);
    }

    for item in overlay.text_items(image.height()) {
      draw_text_mut(
        image,
        Rgb(item.color),
        item.x,
        item.y,
        PxScale::from(item.size),
        &self.font,
        &item.text,
      );
    }
  }
}

fn draw_landmarks(image: &mut RgbImage, hand: &HandLandmarks) {
  for point in hand.points() {
    draw_filled_circle_mut(image, (point.x, point.y), LANDMARK_RADIUS, Rgb(MAGENTA));
  }

  let Some([x_min, y_min, x_max, y_max]) = hand.bounding_box() else {
    return;
  };
  let width = (x_max - x_min + 2 * BBOX_PADDING).max(1) as u32;
  let height = (y_max - y_min + 2 * BBOX_PADDING).max(1) as u32;
  // 边框加粗为 2 像素
  for t in 0..2 {
    let rect = Rect::at(x_min - BBOX_PADDING + t, y_min - BBOX_PADDING + t).of_size(
      width.saturating_sub(2 * t as u32).max(1),
      height.saturating_sub(2 * t as u32).max(1),
    );
    draw_hollow_rect_mut(image, rect, Rgb(GREEN));
  }
}
