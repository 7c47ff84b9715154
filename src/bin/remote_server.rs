// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/bin/remote_server.rs - 远程猜拳判定服务
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use url::Url;

use caiquan::{
  FromUrl,
  detector::{DetectorWrapper, SharedDetector},
  moves::RandomMoves,
  output::FrameRecorder,
  remote::{RemoteJudge, serve},
};
use tracing::info;

/// Caiquan 远程判定服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 监听地址
  #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
  pub bind: String,
  /// 手部关键点检测器，如 replay:///tmp/hands.json?loop
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Url,
  /// 保存入站帧的目录
  #[arg(long, value_name = "DIR")]
  pub record: Option<PathBuf>,
  /// 电脑出拳的随机种子
  #[arg(long, value_name = "SEED")]
  pub seed: Option<u64>,

  #[arg(long, value_name = "WORKERS", default_value_t = 4)]
  pub workers: usize,
}

#[actix_web::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("检测器: {}", args.detector);

  let detector = SharedDetector::new(DetectorWrapper::from_url(&args.detector)?);
  let mut judge = RemoteJudge::new(detector, RandomMoves::with_seed(args.seed));
  if let Some(record) = args.record {
    judge = judge.with_recorder(FrameRecorder::new(record));
  }

  serve(judge, &args.bind, args.workers).await?;
  Ok(())
}
