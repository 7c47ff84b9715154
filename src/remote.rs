// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/remote.rs - 远程判定
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

use tracing::{debug, info, warn};

use crate::{
  arbiter::judge,
  detector::{HandDetector, SharedDetector},
  input::decode_data_uri,
  landmark::HandLandmarks,
  moves::MoveSource,
  output::FrameRecorder,
};

mod message;
pub use self::message::{ClientEvent, ResultMessage, ServerEvent};

mod server;
pub use self::server::serve;

/// 远程判定：每个入站帧独立成一个回合，不维护倒计时与比分
pub struct RemoteJudge<D, S> {
  detector: SharedDetector<D>,
  moves: Mutex<S>,
  recorder: Option<FrameRecorder>,
}

impl<D: HandDetector, S: MoveSource> RemoteJudge<D, S> {
  pub fn new(detector: SharedDetector<D>, moves: S) -> Self {
    Self {
      detector,
      moves: Mutex::new(moves),
      recorder: None,
    }
  }

  /// 把解码后的入站帧保存到目录
  pub fn with_recorder(mut self, recorder: FrameRecorder) -> Self {
    info!("入站帧保存到: {}", recorder.directory().display());
    self.recorder = Some(recorder);
    self
  }

  /// 判定一个 data URI 负载。负载无法解码时丢弃该帧，返回 `None`。
  pub fn judge_payload(&self, payload: &str) -> Option<ResultMessage> {
    let image = match decode_data_uri(payload) {
      Ok(image) => image,
      Err(e) => {
        warn!("丢弃远程帧: {}", e);
        return None;
      }
    };

    if let Some(recorder) = &self.recorder {
      match recorder.save(&image) {
        Ok(path) => debug!("入站帧已保存: {}", path.display()),
        Err(e) => warn!("入站帧保存失败: {}", e),
      }
    }

    let computer = match self.moves.lock() {
      Ok(mut moves) => moves.draw_move(),
      Err(_) => {
        warn!("出拳源锁已失效，丢弃远程帧");
        return None;
      }
    };
    let hand = self.detector.detect(&image).unwrap_or_else(|e| {
      warn!("远程帧检测失败: {}", e);
      HandLandmarks::empty()
    });
    let result = judge(&hand, computer);
    info!(
      "远程回合: 玩家 {}, 电脑 {}, 结果 {}",
      result.player_label(),
      result.computer_label(),
      result.outcome
    );

    Some(ResultMessage::from(&result))
  }

  /// 处理一条文本消息，返回需要回复的文本
  pub fn handle_text(&self, text: &str) -> Option<String> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
      Ok(event) => event,
      Err(e) => {
        debug!("忽略无法识别的消息: {}", e);
        return None;
      }
    };

    match event {
      ClientEvent::Game(payload) => {
        let message = self.judge_payload(&payload)?;
        serde_json::to_string(&ServerEvent::Result(message))
          .inspect_err(|e| warn!("结果序列化失败: {}", e))
          .ok()
      }
    }
  }
}
