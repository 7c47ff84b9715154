// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/task.rs - 本地游戏任务
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

use std::sync::mpsc::Receiver;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
  arbiter::judge,
  detector::{HandDetector, SharedDetector},
  frame::Frame,
  input::FrameError,
  landmark::HandLandmarks,
  moves::MoveSource,
  output::{Overlay, Prompt, Render},
  round::{GameSession, RoundTiming, Score, Tick},
};

pub trait Task<I, D, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, detector: D, output: O) -> Result<Self::Output, Self::Error>;
}

/// 本地摄像头游戏：逐帧推进回合状态机，倒计时结束时抓拍当前帧并裁决
pub struct LocalGameTask<S> {
  timing: RoundTiming,
  moves: S,
  frame_number: Option<usize>,
  quit: Option<Receiver<()>>,
}

impl<S: MoveSource> LocalGameTask<S> {
  pub fn new(timing: RoundTiming, moves: S) -> Self {
    Self {
      timing,
      moves,
      frame_number: None,
      quit: None,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 收到信号后在当前帧处理完毕时退出
  pub fn with_quit_signal(mut self, quit: Receiver<()>) -> Self {
    self.quit = Some(quit);
    self
  }
}

/// 相邻两帧间隔换算的帧率
#[derive(Debug, Default)]
struct FpsMeter {
  last: Option<Instant>,
}

impl FpsMeter {
  fn tick(&mut self, now: Instant) -> Option<f32> {
    let fps = self.last.and_then(|last| {
      let secs = now.saturating_duration_since(last).as_secs_f32();
      (secs > 0.0).then(|| 1.0 / secs)
    });
    self.last = Some(now);
    fps
  }
}

impl<
  'a,
  S: MoveSource,
  IE: FrameError,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<Frame, IE>>,
  D: HandDetector,
  O: Render<Frame, Overlay, Error = RE>,
> Task<I, &'a SharedDetector<D>, O> for LocalGameTask<S>
{
  type Output = Score;
  type Error = anyhow::Error;

  fn run_task(
    mut self,
    input: I,
    detector: &'a SharedDetector<D>,
    output: O,
  ) -> anyhow::Result<Score> {
    info!("开始游戏...");
    let mut session = GameSession::new(self.timing, Instant::now());
    let mut fps = FpsMeter::default();
    let mut frame_count = 0usize;

    for frame in input {
      let frame = match frame {
        Ok(frame) => frame,
        Err(e) if e.is_dropped_frame() => {
          warn!("丢弃无法读取的帧: {}", e);
          continue;
        }
        Err(e) => return Err(e.into()),
      };
      frame_count += 1;

      let now = Instant::now();
      let moves = &mut self.moves;
      let mut captured_hand = None;
      let tick = session.tick(now, || {
        // 先抽取电脑手势，再识别玩家手势
        let computer = moves.draw_move();
        let hand = detector.detect(&frame.image).unwrap_or_else(|e| {
          warn!("第 {} 帧检测失败: {}", frame.index, e);
          HandLandmarks::empty()
        });
        let result = judge(&hand, computer);
        captured_hand = Some(hand);
        result
      });

      let prompt = match tick {
        Tick::Countdown { remaining } => Prompt::Countdown(remaining),
        Tick::Captured(_) | Tick::Rest => Prompt::Rest,
      };
      let overlay = Overlay {
        prompt,
        round: match prompt {
          Prompt::Rest => session.last_round().copied(),
          Prompt::Countdown(_) => None,
        },
        score: session.score(),
        captured: captured_hand.is_some(),
        landmarks: captured_hand,
        fps: fps.tick(now),
      };
      output.render_result(&frame, &overlay)?;
      debug!("第 {} 帧: {:?}", frame.index, tick);

      if self.frame_number.is_some_and(|n| frame_count >= n) {
        info!("达到指定帧数 {}, 退出游戏循环", frame_count);
        break;
      }
      if self.quit.as_ref().is_some_and(|rx| rx.try_recv().is_ok()) {
        warn!("收到退出信号，退出游戏循环");
        break;
      }
    }

    let score = session.score();
    info!("游戏结束，共 {} 回合; {}", session.rounds(), score);
    Ok(score)
  }
}
