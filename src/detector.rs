// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/detector.rs - 手部关键点检测器接口
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

use std::sync::Mutex;

use image::RgbImage;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  landmark::{HandLandmarks, RawHand},
};

mod replay;
pub use self::replay::{ReplayDetector, ReplayDetectorError};

/// 外部手部关键点检测器。
///
/// 检测结果保存在检测器内部，`hands` 读取的是最近一次 `process` 的结果，
/// 因此两次调用之间不能插入其他调用方的检测，见 [`SharedDetector`]。
pub trait HandDetector {
  type Error: std::error::Error + Send + Sync + 'static;

  fn process(&mut self, image: &RgbImage) -> Result<(), Self::Error>;

  fn hands(&self) -> &[RawHand];
}

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("检测器锁已失效")]
  Poisoned,
  #[error("检测失败: {0}")]
  Detection(Box<dyn std::error::Error + Send + Sync>),
  #[error("不支持的检测器: {0}")]
  SchemeMismatch(String),
  #[error("回放检测器错误: {0}")]
  Replay(#[from] ReplayDetectorError),
}

/// 持有检测器并把“检测 → 读取”作为一次加锁操作完成
pub struct SharedDetector<D> {
  inner: Mutex<D>,
}

impl<D: HandDetector> SharedDetector<D> {
  pub fn new(detector: D) -> Self {
    Self {
      inner: Mutex::new(detector),
    }
  }

  /// 检测图像并返回第一只手的像素坐标关键点
  pub fn detect(&self, image: &RgbImage) -> Result<HandLandmarks, DetectorError> {
    let mut detector = self.inner.lock().map_err(|_| DetectorError::Poisoned)?;
    detector
      .process(image)
      .map_err(|e| DetectorError::Detection(Box::new(e)))?;
    let hand = HandLandmarks::from_detection(detector.hands(), image.width(), image.height());
    drop(detector);

    if let Some(bbox) = hand.bounding_box() {
      debug!("手部关键点外接框: {:?}", bbox);
    }
    Ok(hand)
  }

  pub fn into_inner(self) -> Result<D, DetectorError> {
    self.inner.into_inner().map_err(|_| DetectorError::Poisoned)
  }
}

/// 始终报告没有手
#[derive(Debug, Default, Clone)]
pub struct NoHandDetector;

impl HandDetector for NoHandDetector {
  type Error = std::convert::Infallible;

  fn process(&mut self, _image: &RgbImage) -> Result<(), Self::Error> {
    Ok(())
  }

  fn hands(&self) -> &[RawHand] {
    &[]
  }
}

impl FromUrlWithScheme for NoHandDetector {
  const SCHEME: &'static str = "none";
}

impl FromUrl for NoHandDetector {
  type Error = DetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DetectorError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(NoHandDetector)
  }
}

/// 按 URL 方案选择检测器
pub enum DetectorWrapper {
  Replay(ReplayDetector),
  NoHand(NoHandDetector),
}

impl FromUrl for DetectorWrapper {
  type Error = DetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ReplayDetector::SCHEME => Ok(DetectorWrapper::Replay(ReplayDetector::from_url(url)?)),
      NoHandDetector::SCHEME => Ok(DetectorWrapper::NoHand(NoHandDetector::from_url(url)?)),
      other => Err(DetectorError::SchemeMismatch(other.to_string())),
    }
  }
}

impl HandDetector for DetectorWrapper {
  type Error = ReplayDetectorError;

  fn process(&mut self, image: &RgbImage) -> Result<(), Self::Error> {
    match self {
      DetectorWrapper::Replay(detector) => detector.process(image),
      DetectorWrapper::NoHand(_) => Ok(()),
    }
  }

  fn hands(&self) -> &[RawHand] {
    match self {
      DetectorWrapper::Replay(detector) => detector.hands(),
      DetectorWrapper::NoHand(detector) => detector.hands(),
    }
  }
}
