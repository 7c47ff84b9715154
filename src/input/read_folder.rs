// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/input/read_folder.rs - 图像目录输入
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

use std::{
  path::{Path, PathBuf},
  time::Instant,
};

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Frame,
  input::{FrameError, Pacer},
};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

#[derive(Error, Debug)]
pub enum FolderInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误 {0}: {1}")]
  ImageError(PathBuf, image::ImageError),
}

impl FrameError for FolderInputError {
  fn is_dropped_frame(&self) -> bool {
    matches!(self, FolderInputError::ImageError(..))
  }
}

/// 按文件名顺序读取目录中的图片，每张一帧
pub struct FolderInput {
  files: std::vec::IntoIter<PathBuf>,
  index: u64,
  start: Instant,
  pacer: Pacer,
}

impl FromUrlWithScheme for FolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for FolderInput {
  type Error = FolderInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(FolderInputError::SchemeMismatch);
    }

    let mut input = Self::open(Path::new(url.path()))?;
    input.pacer = Pacer::from_url(url);
    Ok(input)
  }
}

impl FolderInput {
  pub fn open(directory: &Path) -> Result<Self, FolderInputError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
      let path = entry?.path();
      let is_image = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
      if is_image {
        files.push(path);
      }
    }
    files.sort();

    if files.is_empty() {
      warn!("目录中没有图片: {}", directory.display());
    } else {
      info!("目录 {} 中共有 {} 张图片", directory.display(), files.len());
    }

    Ok(Self {
      files: files.into_iter(),
      index: 0,
      start: Instant::now(),
      pacer: Pacer::default(),
    })
  }
}

impl Iterator for FolderInput {
  type Item = Result<Frame, FolderInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.files.next()?;
    self.pacer.wait();

    let image = ImageReader::open(&path)
      .map_err(FolderInputError::from)
      .and_then(|reader| {
        reader
          .decode()
          .map_err(|e| FolderInputError::ImageError(path.clone(), e))
      });

    let frame = image.map(|image| {
      Frame::new(
        image.to_rgb8(),
        self.index,
        self.start.elapsed().as_millis() as u64,
      )
    });
    self.index += 1;
    Some(frame)
  }
}
