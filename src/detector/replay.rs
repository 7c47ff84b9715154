// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/detector/replay.rs - 回放录制的关键点
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

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detector::HandDetector,
  landmark::RawHand,
  query_flag,
};

#[derive(Error, Debug)]
pub enum ReplayDetectorError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("关键点文件格式错误: {0}")]
  FormatError(#[from] serde_json::Error),
}

/// 按顺序回放录制好的检测结果，每次 `process` 前进一帧。
///
/// 文件内容为帧数组，每帧是手的数组，每只手是 `{"x": .., "y": ..}` 数组。
/// 回放结束后报告没有手；带 `?loop` 时从头循环。
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
  frames: Vec<Vec<RawHand>>,
  cursor: usize,
  looping: bool,
  current: Vec<RawHand>,
}

impl FromUrlWithScheme for ReplayDetector {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayDetector {
  type Error = ReplayDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayDetectorError::SchemeMismatch(url.scheme().to_string()));
    }

    let data = std::fs::read_to_string(url.path())?;
    let frames: Vec<Vec<RawHand>> = serde_json::from_str(&data)?;
    info!("载入关键点回放文件: {}, 共 {} 帧", url.path(), frames.len());

    Ok(Self::new(frames).looping(query_flag(url, "loop")))
  }
}

impl ReplayDetector {
  pub fn new(frames: Vec<Vec<RawHand>>) -> Self {
    Self {
      frames,
      ..Default::default()
    }
  }

  pub fn looping(mut self, looping: bool) -> Self {
    self.looping = looping;
    self
  }
}

impl HandDetector for ReplayDetector {
  type Error = ReplayDetectorError;

  fn process(&mut self, _image: &RgbImage) -> Result<(), Self::Error> {
    if self.looping && !self.frames.is_empty() {
      self.cursor %= self.frames.len();
    }
    self.current = self.frames.get(self.cursor).cloned().unwrap_or_default();
    self.cursor += 1;
    Ok(())
  }

  fn hands(&self) -> &[RawHand] {
    &self.current
  }
}
