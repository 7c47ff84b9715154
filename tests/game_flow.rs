// 该文件是 Caiquan （猜拳） 项目的一部分。
// tests/game_flow.rs - 端到端回合测试
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

use caiquan::{
  arbiter::{RoundOutcome, judge},
  detector::{HandDetector, SharedDetector},
  gesture::Gesture,
  landmark::{HandLandmarks, LANDMARK_COUNT, RawHand, RawLandmark},
  moves::{MoveSource, ScriptedMoves},
  round::{GameSession, RoundTiming, Tick},
};
use image::RgbImage;

const TIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// 指尖 y 与其余关键点 y（归一化坐标）
fn hand(tip_y: f32, rest_y: f32) -> RawHand {
  (0..LANDMARK_COUNT)
    .map(|id| RawLandmark {
      x: 0.5,
      y: if TIPS.contains(&id) { tip_y } else { rest_y },
    })
    .collect::<Vec<_>>()
    .into()
}

struct Camera {
  hands: Vec<RawHand>,
}

impl HandDetector for Camera {
  type Error = std::io::Error;

  fn process(&mut self, _image: &RgbImage) -> Result<(), Self::Error> {
    Ok(())
  }

  fn hands(&self) -> &[RawHand] {
    &self.hands
  }
}

/// 按时间推进一整个倒计时，返回抓拍结果
fn play_round(
  session: &mut GameSession,
  detector: &SharedDetector<Camera>,
  moves: &mut impl MoveSource,
  start: Instant,
) -> Tick {
  let frame = RgbImage::new(640, 480);
  let mut tick = Tick::Rest;
  for ms in (0..=3000).step_by(500) {
    tick = session.tick(start + Duration::from_millis(ms), || {
      let computer = moves.draw_move();
      let landmarks = detector.detect(&frame).unwrap_or_else(|_| HandLandmarks::empty());
      judge(&landmarks, computer)
    });
  }
  tick
}

#[test]
fn open_palm_against_rock_scores_for_player() {
  let t0 = Instant::now();
  let mut session = GameSession::new(RoundTiming::default(), t0);
  let detector = SharedDetector::new(Camera {
    hands: vec![hand(0.2, 0.6)],
  });
  let mut moves = ScriptedMoves::always(Gesture::Rock);

  let Tick::Captured(result) = play_round(&mut session, &detector, &mut moves, t0) else {
    panic!("倒计时结束时应当抓拍");
  };
  assert_eq!(result.outcome, RoundOutcome::PlayerWin);
  assert_eq!(result.player, Some(Gesture::Paper));
  assert_eq!(session.score().player_wins, 1);
  assert_eq!(session.score().total(), 1);
}

#[test]
fn empty_frame_is_no_hand_and_score_is_untouched() {
  let t0 = Instant::now();
  let mut session = GameSession::new(RoundTiming::default(), t0);
  let detector = SharedDetector::new(Camera { hands: vec![] });
  let mut moves = ScriptedMoves::always(Gesture::Paper);

  let Tick::Captured(result) = play_round(&mut session, &detector, &mut moves, t0) else {
    panic!("倒计时结束时应当抓拍");
  };
  assert_eq!(result.outcome, RoundOutcome::NoHand);
  assert_eq!(result.player_label(), "N/A");
  assert_eq!(session.score().total(), 0);
}

#[test]
fn partial_hand_is_an_invalid_move() {
  let mut partial = hand(0.2, 0.6);
  partial.landmarks.truncate(12);
  let detector = SharedDetector::new(Camera {
    hands: vec![partial],
  });
  let landmarks = detector.detect(&RgbImage::new(100, 100)).unwrap();
  let result = judge(&landmarks, Gesture::Scissors);
  assert_eq!(result.outcome, RoundOutcome::InvalidMove);
  assert_eq!(result.player_label(), "Invalid Move");
}

#[test]
fn consecutive_rounds_accumulate_score() {
  let t0 = Instant::now();
  let mut session = GameSession::new(RoundTiming::default(), t0);
  let detector = SharedDetector::new(Camera {
    hands: vec![hand(0.8, 0.4)],
  });
  // 石头对剪刀、石头、布
  let mut moves = ScriptedMoves::new(Gesture::Scissors, [Gesture::Rock, Gesture::Paper]);

  let mut start = t0;
  for _ in 0..3 {
    assert!(matches!(
      play_round(&mut session, &detector, &mut moves, start),
      Tick::Captured(_)
    ));
    // 跳过休息阶段
    start += Duration::from_millis(3000 + 2000);
    assert!(matches!(
      session.tick(start, || unreachable!()),
      Tick::Countdown { remaining: 3 }
    ));
  }

  let score = session.score();
  assert_eq!(
    (score.player_wins, score.computer_wins, score.draws),
    (1, 1, 1)
  );
  assert_eq!(score.to_string(), "Score - You: 1 Computer: 1 Draws: 1");
}

#[cfg(feature = "remote")]
mod remote {
  use super::*;
  use base64::{Engine as _, engine::general_purpose::STANDARD};
  use caiquan::remote::RemoteJudge;
  use image::ImageFormat;
  use std::io::Cursor;

  fn jpeg_payload() -> String {
    let mut bytes = Vec::new();
    RgbImage::new(32, 32)
      .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
      .unwrap();
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
  }

  #[test]
  fn malformed_base64_emits_nothing() {
    let judge = RemoteJudge::new(
      SharedDetector::new(Camera {
        hands: vec![hand(0.2, 0.6)],
      }),
      ScriptedMoves::always(Gesture::Rock),
    );
    let text = r#"{"event":"game","data":"data:image/jpeg;base64,!!!"}"#;
    assert!(judge.handle_text(text).is_none());
  }

  #[test]
  fn valid_frame_gets_result_event() {
    let judge = RemoteJudge::new(
      SharedDetector::new(Camera {
        hands: vec![hand(0.2, 0.6)],
      }),
      ScriptedMoves::always(Gesture::Scissors),
    );
    let text = serde_json::json!({ "event": "game", "data": jpeg_payload() }).to_string();
    let reply: serde_json::Value =
      serde_json::from_str(&judge.handle_text(&text).unwrap()).unwrap();
    assert_eq!(
      reply,
      serde_json::json!({
        "event": "result",
        "data": {
          "outcome": "Computer Wins",
          "computer_move": "scissor",
          "player_move": "paper"
        }
      })
    );
  }
}
