// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/bin/local_game.rs - 本地摄像头猜拳游戏
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
  io::BufRead,
  sync::mpsc::{self, Sender},
  thread,
  time::Duration,
};

use anyhow::Result;
use clap::Parser;
use url::Url;

use caiquan::{
  FromUrl,
  detector::{DetectorWrapper, SharedDetector},
  input::InputWrapper,
  moves::RandomMoves,
  output::OutputWrapper,
  round::RoundTiming,
  task::{LocalGameTask, Task},
};
use tracing::{info, warn};

/// Caiquan 本地游戏参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，如 v4l2:///dev/video0、image:///tmp/hand.png?repeat=0&fps=30
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，如 image:///tmp/caiquan.png（可用 ?font= 替换内置字体）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 手部关键点检测器，如 replay:///tmp/hands.json?loop
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Url,

  #[arg(long, value_name = "SECONDS", default_value_t = 3)]
  pub countdown_seconds: u64,

  #[arg(long, value_name = "SECONDS", default_value_t = 2)]
  pub rest_seconds: u64,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

  /// 电脑出拳的随机种子
  #[arg(long, value_name = "SEED")]
  pub seed: Option<u64>,
}

/// Ctrl-C 与标准输入的 `q` 都会发送退出信号
fn install_quit_signal(tx: Sender<()>) -> Result<()> {
  let ctrlc_tx = tx.clone();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    let _ = ctrlc_tx.send(());
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })?;

  thread::spawn(move || {
    for line in std::io::stdin().lock().lines() {
      match line {
        Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
          info!("收到退出指令");
          let _ = tx.send(());
          break;
        }
        Ok(_) => continue,
        Err(_) => break,
      }
    }
  });

  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("检测器: {}", args.detector);

  let input = InputWrapper::from_url(&args.input)?;
  let detector = SharedDetector::new(DetectorWrapper::from_url(&args.detector)?);
  let output = OutputWrapper::from_url(&args.output)?;

  let (tx, rx) = mpsc::channel();
  install_quit_signal(tx)?;

  let timing = RoundTiming::from_secs(args.countdown_seconds, args.rest_seconds);
  let score = LocalGameTask::new(timing, RandomMoves::with_seed(args.seed))
    .with_frame_number(args.frame_number)
    .with_quit_signal(rx)
    .run_task(input, &detector, output)?;

  info!("最终比分: {}", score);
  Ok(())
}
