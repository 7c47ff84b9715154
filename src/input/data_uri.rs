// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/input/data_uri.rs - 远程图像负载解码
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

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::RgbImage;
use thiserror::Error;

/// 远程帧无法解码，该帧被丢弃
#[derive(Error, Debug)]
pub enum PayloadError {
  #[error("负载缺少 ',' 分隔符")]
  MissingSeparator,
  #[error("base64 解码失败: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("图像解码失败: {0}")]
  Image(#[from] image::ImageError),
}

/// 解码 `"<mime 前缀>,<base64 图像>"` 形式的负载。
///
/// 只去掉第一个逗号之前的部分，编码格式由图像内容本身判断。
pub fn decode_data_uri(payload: &str) -> Result<RgbImage, PayloadError> {
  let (_, encoded) = payload
    .split_once(',')
    .ok_or(PayloadError::MissingSeparator)?;
  let bytes = STANDARD.decode(encoded.trim())?;
  Ok(image::load_from_memory(&bytes)?.to_rgb8())
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageFormat, Rgb};
  use std::io::Cursor;

  fn png_payload(image: &RgbImage) -> String {
    let mut bytes = Vec::new();
    image
      .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
      .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
  }

  #[test]
  fn decodes_png_payload() {
    let mut image = RgbImage::new(4, 3);
    image.put_pixel(1, 2, Rgb([10, 20, 30]));
    let decoded = decode_data_uri(&png_payload(&image)).unwrap();
    assert_eq!(decoded.dimensions(), (4, 3));
    assert_eq!(decoded.get_pixel(1, 2), &Rgb([10, 20, 30]));
  }

  #[test]
  fn mime_prefix_is_not_trusted() {
    // 前缀声明为 jpeg，实际内容是 png
    let payload = png_payload(&RgbImage::new(2, 2)).replacen("image/png", "image/jpeg", 1);
    assert!(decode_data_uri(&payload).is_ok());
  }

  #[test]
  fn missing_separator_is_malformed() {
    assert!(matches!(
      decode_data_uri("iVBORw0KGgo"),
      Err(PayloadError::MissingSeparator)
    ));
  }

  #[test]
  fn bad_base64_is_malformed() {
    assert!(matches!(
      decode_data_uri("data:image/jpeg;base64,@@not-base64@@"),
      Err(PayloadError::Base64(_))
    ));
  }

  #[test]
  fn non_image_bytes_are_malformed() {
    let payload = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"hello world"));
    assert!(matches!(
      decode_data_uri(&payload),
      Err(PayloadError::Image(_))
    ));
  }
}
