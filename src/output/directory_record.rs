// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Frame,
  output::{
    Render,
    draw::{Draw, DrawError, Overlay},
  },
  query_flag, query_value,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体错误: {0}")]
  DrawError(#[from] DrawError),
}

/// 按日期分目录保存图像：`<root>/YYYY/MM/DD/HH-MM-SS-XXXX.png`
pub struct FrameRecorder {
  directory: PathBuf,
  counter: AtomicU16,
}

impl FrameRecorder {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      counter: AtomicU16::new(0),
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  fn frame_id(&self) -> u16 {
    self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  /// 保存一张图像，返回保存路径
  pub fn save(&self, image: &RgbImage) -> Result<PathBuf, DirectoryRecordError> {
    let path = self.frame_path()?;
    image.save(&path)?;
    Ok(path)
  }
}

/// 保存抓拍帧（`?always` 时保存每一帧）的叠加画面
pub struct DirectoryRecordOutput {
  recorder: FrameRecorder,
  draw: Draw,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordError::SchemeMismatch);
    }

    let draw = Draw::from_font_query(query_value(uri, "font"))?;
    let always = query_flag(uri, "always");
    info!(
      "记录目录: {} ({})",
      uri.path(),
      if always { "每一帧" } else { "仅抓拍帧" }
    );

    Ok(DirectoryRecordOutput {
      recorder: FrameRecorder::new(uri.path()),
      draw,
      always,
    })
  }
}

impl Render<Frame, Overlay> for DirectoryRecordOutput {
  type Error = DirectoryRecordError;

  fn render_result(&self, frame: &Frame, overlay: &Overlay) -> Result<(), Self::Error> {
    if self.always || overlay.captured {
      let mut image = frame.image.clone();
      self.draw.draw_overlay(&mut image, overlay);
      self.recorder.save(&image)?;
    }
    Ok(())
  }
}
