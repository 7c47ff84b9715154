// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::time::Instant;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Frame,
  input::{FrameError, Pacer},
  query_value,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("Invalid repeat count: {0}")]
  InvalidRepeat(String),
}

// 图片在构造时已经解码，逐帧不会再出错
impl FrameError for ImageFileInputError {
  fn is_dropped_frame(&self) -> bool {
    false
  }
}

/// 单张图片输入。
///
/// `image:///path.png?repeat=N` 重复输出 N 次，`repeat=0` 表示无限重复；
/// `fps=F` 限制出帧速率。
pub struct ImageFileInput {
  image: RgbImage,
  remaining: Option<u64>,
  index: u64,
  start: Instant,
  pacer: Pacer,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let repeat = match query_value(url, "repeat") {
      Some(v) => v
        .parse::<u64>()
        .map_err(|_| ImageFileInputError::InvalidRepeat(v))?,
      None => 1,
    };

    let path = url.path();
    let image = ImageReader::open(path)?.decode()?.to_rgb8();
    info!(
      "载入图片: {} ({}x{}), 重复 {}",
      path,
      image.width(),
      image.height(),
      if repeat == 0 {
        "无限次".to_string()
      } else {
        format!("{} 次", repeat)
      }
    );

    Ok(Self::new(image, (repeat > 0).then_some(repeat)).with_pacer(Pacer::from_url(url)))
  }
}

impl ImageFileInput {
  /// `repeat` 为 `None` 时无限重复
  pub fn new(image: RgbImage, repeat: Option<u64>) -> Self {
    Self {
      image,
      remaining: repeat,
      index: 0,
      start: Instant::now(),
      pacer: Pacer::default(),
    }
  }

  pub(crate) fn with_pacer(mut self, pacer: Pacer) -> Self {
    self.pacer = pacer;
    self
  }
}

impl Iterator for ImageFileInput {
  type Item = Result<Frame, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(remaining) = self.remaining.as_mut() {
      if *remaining == 0 {
        return None;
      }
      *remaining -= 1;
    }

    self.pacer.wait();
    let frame = Frame::new(
      self.image.clone(),
      self.index,
      self.start.elapsed().as_millis() as u64,
    );
    self.index += 1;
    Some(Ok(frame))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn repeats_the_same_image() {
    let input = ImageFileInput::new(RgbImage::new(3, 2), Some(3));
    let frames: Vec<_> = input.map(Result::unwrap).collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(
      frames.iter().map(|f| f.index).collect::<Vec<_>>(),
      [0, 1, 2]
    );
    assert!(frames.iter().all(|f| f.width() == 3 && f.height() == 2));
  }

  #[test]
  fn unbounded_repeat_keeps_going() {
    let input = ImageFileInput::new(RgbImage::new(1, 1), None);
    assert_eq!(input.take(50).count(), 50);
  }

  #[test]
  fn loads_image_from_url() {
    let path = std::env::temp_dir().join(format!("caiquan-input-{}.png", std::process::id()));
    RgbImage::new(5, 4).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}?repeat=2", path.display())).unwrap();
    let input = ImageFileInput::from_url(&url).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(input.count(), 2);
  }

  #[test]
  fn rejects_bad_repeat() {
    let url = Url::parse("image:///nowhere.png?repeat=many").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::InvalidRepeat(_))
    ));
  }
}
