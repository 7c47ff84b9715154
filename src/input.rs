// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/input.rs - 视频/图像输入
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

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::Frame, query_value};

mod data_uri;
pub use self::data_uri::{PayloadError, decode_data_uri};

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

mod read_folder;
pub use self::read_folder::{FolderInput, FolderInputError};

#[cfg(feature = "v4l2_input")]
mod v4l2_source;
#[cfg(feature = "v4l2_input")]
pub use self::v4l2_source::{V4l2Input, V4l2InputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("目录输入错误: {0}")]
  FolderInputError(#[from] FolderInputError),
  #[cfg(feature = "v4l2_input")]
  #[error("V4L2 输入错误: {0}")]
  V4l2InputError(#[from] V4l2InputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 输入错误分两类：丢弃当前帧即可继续，或者来源已不可用
pub trait FrameError: std::error::Error + Send + Sync + 'static {
  /// 只是这一帧坏了，后续帧仍可读取
  fn is_dropped_frame(&self) -> bool;
}

impl FrameError for InputError {
  fn is_dropped_frame(&self) -> bool {
    match self {
      InputError::ImageFileInputError(e) => e.is_dropped_frame(),
      InputError::FolderInputError(e) => e.is_dropped_frame(),
      #[cfg(feature = "v4l2_input")]
      InputError::V4l2InputError(e) => e.is_dropped_frame(),
      InputError::SchemeMismatch(_) => false,
    }
  }
}

/// 按 URL 方案选择的帧来源
pub enum InputWrapper {
  ImageFile(ImageFileInput),
  Folder(FolderInput),
  #[cfg(feature = "v4l2_input")]
  V4l2(V4l2Input),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ImageFile(ImageFileInput::from_url(url)?)),
      FolderInput::SCHEME => Ok(InputWrapper::Folder(FolderInput::from_url(url)?)),
      #[cfg(feature = "v4l2_input")]
      V4l2Input::SCHEME => Ok(InputWrapper::V4l2(V4l2Input::from_url(url)?)),
      other => Err(InputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<Frame, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ImageFile(input) => input.next().map(|r| r.map_err(InputError::from)),
      InputWrapper::Folder(input) => input.next().map(|r| r.map_err(InputError::from)),
      #[cfg(feature = "v4l2_input")]
      InputWrapper::V4l2(input) => input.next().map(|r| r.map_err(InputError::from)),
    }
  }
}

/// 把输出节奏限制在给定帧率以内，模拟摄像头的出帧间隔
#[derive(Debug, Clone, Default)]
pub(crate) struct Pacer {
  interval: Option<Duration>,
  last: Option<Instant>,
}

impl Pacer {
  /// 从 URL 的 `fps` 查询参数读取帧率
  pub(crate) fn from_url(url: &Url) -> Self {
    let interval = query_value(url, "fps").and_then(|v| match v.parse::<f64>() {
      Ok(fps) if fps > 0.0 => Some(Duration::from_secs_f64(1.0 / fps)),
      _ => {
        warn!("忽略无效的帧率参数: {}", v);
        None
      }
    });
    Self {
      interval,
      last: None,
    }
  }

  pub(crate) fn wait(&mut self) {
    if let (Some(interval), Some(last)) = (self.interval, self.last) {
      let elapsed = last.elapsed();
      if elapsed < interval {
        std::thread::sleep(interval - elapsed);
      }
    }
    self.last = Some(Instant::now());
  }
}
