// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/input/v4l2_source.rs - V4L2 摄像头输入
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

use std::pin::Pin;
use std::time::Instant;

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

use crate::{FromUrl, FromUrlWithScheme, frame::Frame, input::FrameError, query_value};

const DEFAULT_DEVICE: &str = "/dev/video0";
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const CAPTURE_BUFFERS: u32 = 4;

#[derive(Error, Debug)]
pub enum V4l2InputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("无法打开设备 {0}: {1}")]
  OpenDevice(String, std::io::Error),
  #[error("V4L2 错误: {0}")]
  V4l2(#[from] std::io::Error),
  #[error("无效的分辨率参数: {0}")]
  InvalidSize(String),
  #[error("摄像头不支持 YUYV 格式，实际格式 {0}")]
  UnsupportedPixelFormat(String),
  #[error("无法创建 RGB 图像")]
  BufferSizeMismatch,
}

impl FrameError for V4l2InputError {
  fn is_dropped_frame(&self) -> bool {
    matches!(self, V4l2InputError::BufferSizeMismatch)
  }
}

/// V4L2 摄像头输入，`v4l2:///dev/video0?width=640&height=480`。
///
/// v4l 的 Stream 需要引用 Device，Device 用 Pin<Box> 固定在堆上，
/// 以便在同一个结构体中保存引用它的 Stream。
pub struct V4l2Input {
  device: Pin<Box<Device>>,
  stream: Option<Stream<'static>>,
  frame_index: u64,
  width: u32,
  height: u32,
  start_time: Instant,
}

impl FromUrlWithScheme for V4l2Input {
  const SCHEME: &'static str = "v4l2";
}

impl FromUrl for V4l2Input {
  type Error = V4l2InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(V4l2InputError::SchemeMismatch);
    }

    let device_path = if url.path().is_empty() || url.path() == "/" {
      DEFAULT_DEVICE
    } else {
      url.path()
    };
    let width = size_param(url, "width", DEFAULT_WIDTH)?;
    let height = size_param(url, "height", DEFAULT_HEIGHT)?;

    Self::open(device_path, width, height)
  }
}

fn size_param(url: &Url, key: &str, default: u32) -> Result<u32, V4l2InputError> {
  match query_value(url, key) {
    Some(v) => v.parse().map_err(|_| V4l2InputError::InvalidSize(v)),
    None => Ok(default),
  }
}

impl V4l2Input {
  pub fn open(device_path: &str, width: u32, height: u32) -> Result<Self, V4l2InputError> {
    let device = Box::pin(
      Device::with_path(device_path)
        .map_err(|e| V4l2InputError::OpenDevice(device_path.to_string(), e))?,
    );

    let mut format = device.format()?;
    format.width = width;
    format.height = height;
    format.fourcc = FourCC::new(b"YUYV");
    let format = device.set_format(&format)?;
    if format.fourcc != FourCC::new(b"YUYV") {
      return Err(V4l2InputError::UnsupportedPixelFormat(
        format.fourcc.to_string(),
      ));
    }
    info!(
      "摄像头已打开: {} {}x{}",
      device_path, format.width, format.height
    );

    let mut source = Self {
      device,
      stream: None,
      frame_index: 0,
      width: format.width,
      height: format.height,
      start_time: Instant::now(),
    };

    let device_ref: &Device = &source.device;
    // SAFETY: device 固定在堆上不会移动；stream 与 device 同属一个结构体，
    // Drop 中先释放 stream 再释放 device。
    let stream = unsafe {
      let device_static: &'static Device = std::mem::transmute(device_ref);
      Stream::with_buffers(device_static, Type::VideoCapture, CAPTURE_BUFFERS)?
    };

    source.stream = Some(stream);
    Ok(source)
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }
}

/// YUYV 4:2:2 转 RGB24
fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Vec<u8> {
  let mut rgb = Vec::with_capacity((width * height * 3) as usize);

  for chunk in yuyv.chunks_exact(4) {
    let u = chunk[1] as f32 - 128.0;
    let v = chunk[3] as f32 - 128.0;
    for y in [chunk[0] as f32, chunk[2] as f32] {
      let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
      let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
      let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
      rgb.extend_from_slice(&[r, g, b]);
    }
  }

  rgb
}

impl Drop for V4l2Input {
  fn drop(&mut self) {
    self.stream.take();
  }
}

impl Iterator for V4l2Input {
  type Item = Result<Frame, V4l2InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let stream = self.stream.as_mut()?;

    let (buffer, _meta) = match stream.next() {
      Ok(captured) => captured,
      Err(e) => return Some(Err(V4l2InputError::V4l2(e))),
    };

    let rgb = yuyv_to_rgb(buffer, self.width, self.height);
    let Some(image) = RgbImage::from_raw(self.width, self.height, rgb) else {
      return Some(Err(V4l2InputError::BufferSizeMismatch));
    };

    let frame = Frame::new(
      image,
      self.frame_index,
      self.start_time.elapsed().as_millis() as u64,
    );
    self.frame_index += 1;
    Some(Ok(frame))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yuyv_grey_maps_to_grey() {
    // Y=128, U=V=128 → 中性灰
    let rgb = yuyv_to_rgb(&[128, 128, 128, 128], 2, 1);
    assert_eq!(rgb, [128, 128, 128, 128, 128, 128]);
  }

  #[test]
  fn yuyv_produces_two_pixels_per_macropixel() {
    let rgb = yuyv_to_rgb(&[0, 128, 255, 128, 16, 128, 235, 128], 4, 1);
    assert_eq!(rgb.len(), 4 * 3);
    assert_eq!(&rgb[3..6], &[255, 255, 255]);
  }

  #[test]
  fn size_params_are_parsed() {
    let url = Url::parse("v4l2:///dev/video2?width=320").unwrap();
    assert_eq!(size_param(&url, "width", 640).unwrap(), 320);
    assert_eq!(size_param(&url, "height", 480).unwrap(), 480);
  }
}
