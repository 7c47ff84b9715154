// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/round.rs - 回合状态机与计分
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
  fmt,
  time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::arbiter::{RoundOutcome, RoundResult};

const DEFAULT_COUNTDOWN_SECONDS: u64 = 3;
const DEFAULT_REST_SECONDS: u64 = 2;

/// 累计比分，只增不减
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
  pub player_wins: u32,
  pub computer_wins: u32,
  pub draws: u32,
}

impl Score {
  pub fn record(&mut self, outcome: RoundOutcome) {
    match outcome {
      RoundOutcome::PlayerWin => self.player_wins += 1,
      RoundOutcome::ComputerWin => self.computer_wins += 1,
      RoundOutcome::Tie => self.draws += 1,
      RoundOutcome::InvalidMove | RoundOutcome::NoHand => {}
    }
  }

  /// 计分回合总数
  pub fn total(&self) -> u32 {
    self.player_wins + self.computer_wins + self.draws
  }
}

impl fmt::Display for Score {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Score - You: {} Computer: {} Draws: {}",
      self.player_wins, self.computer_wins, self.draws
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
  Countdown,
  Rest,
}

/// 倒计时与休息时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
  pub countdown: Duration,
  pub rest: Duration,
}

impl Default for RoundTiming {
  fn default() -> Self {
    Self {
      countdown: Duration::from_secs(DEFAULT_COUNTDOWN_SECONDS),
      rest: Duration::from_secs(DEFAULT_REST_SECONDS),
    }
  }
}

impl RoundTiming {
  pub fn from_secs(countdown: u64, rest: u64) -> Self {
    Self {
      countdown: Duration::from_secs(countdown),
      rest: Duration::from_secs(rest),
    }
  }
}

/// 单次推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
  /// 倒计时中，剩余整秒数（向上取整）
  Countdown { remaining: u64 },
  /// 本次推进完成了一个回合，随后进入休息
  Captured(RoundResult),
  Rest,
}

/// 一局游戏：倒计时 → 抓拍 → 休息 → 倒计时 … 没有终止状态
#[derive(Debug, Clone)]
pub struct GameSession {
  score: Score,
  phase: RoundPhase,
  phase_start: Instant,
  timing: RoundTiming,
  last_round: Option<RoundResult>,
  rounds: u64,
}

impl GameSession {
  pub fn new(timing: RoundTiming, now: Instant) -> Self {
    Self {
      score: Score::default(),
      phase: RoundPhase::Countdown,
      phase_start: now,
      timing,
      last_round: None,
      rounds: 0,
    }
  }

  pub fn score(&self) -> Score {
    self.score
  }

  pub fn phase(&self) -> RoundPhase {
    self.phase
  }

  /// 最近一次抓拍的结果
  pub fn last_round(&self) -> Option<&RoundResult> {
    self.last_round.as_ref()
  }

  /// 已完成的回合数（含无效与无手回合）
  pub fn rounds(&self) -> u64 {
    self.rounds
  }

  /// 当前阶段已经过的时间
  pub fn elapsed(&self, now: Instant) -> Duration {
    now.saturating_duration_since(self.phase_start)
  }

  /// 按当前时刻推进状态机。
  ///
  /// `capture` 只在倒计时结束的那一次推进中被调用，且最多调用一次。
  pub fn tick<F>(&mut self, now: Instant, capture: F) -> Tick
  where
    F: FnOnce() -> RoundResult,
  {
    let elapsed = self.elapsed(now);
    match self.phase {
      RoundPhase::Countdown if elapsed < self.timing.countdown => Tick::Countdown {
        remaining: ceil_secs(self.timing.countdown - elapsed),
      },
      RoundPhase::Countdown => {
        let result = capture();
        self.score.record(result.outcome);
        self.last_round = Some(result);
        self.rounds += 1;
        info!(
          "第 {} 回合: 玩家 {}, 电脑 {}, 结果 {}; {}",
          self.rounds,
          result.player_label(),
          result.computer_label(),
          result.outcome,
          self.score
        );
        self.enter(RoundPhase::Rest, now);
        Tick::Captured(result)
      }
      RoundPhase::Rest if elapsed < self.timing.rest => Tick::Rest,
      RoundPhase::Rest => {
        self.enter(RoundPhase::Countdown, now);
        Tick::Countdown {
          remaining: ceil_secs(self.timing.countdown),
        }
      }
    }
  }

  fn enter(&mut self, phase: RoundPhase, now: Instant) {
    debug!("阶段切换: {:?} -> {:?}", self.phase, phase);
    self.phase = phase;
    self.phase_start = now;
  }
}

fn ceil_secs(d: Duration) -> u64 {
  d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gesture::Gesture;
  use std::cell::Cell;

  fn win() -> RoundResult {
    RoundResult {
      outcome: RoundOutcome::PlayerWin,
      player: Some(Gesture::Paper),
      computer: Some(Gesture::Rock),
    }
  }

  fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
  }

  #[test]
  fn starts_in_countdown_with_empty_score() {
    let session = GameSession::new(RoundTiming::default(), Instant::now());
    assert_eq!(session.phase(), RoundPhase::Countdown);
    assert_eq!(session.score(), Score::default());
    assert!(session.last_round().is_none());
  }

  #[test]
  fn countdown_reports_remaining_seconds_without_capture() {
    let t0 = Instant::now();
    let mut session = GameSession::new(RoundTiming::default(), t0);
    let calls = Cell::new(0);
    let capture = || {
      calls.set(calls.get() + 1);
      win()
    };

    assert_eq!(session.tick(t0, capture), Tick::Countdown { remaining: 3 });
    assert_eq!(
      session.tick(t0 + secs(0.4), capture),
      Tick::Countdown { remaining: 3 }
    );
    assert_eq!(
      session.tick(t0 + secs(1.0), capture),
      Tick::Countdown { remaining: 2 }
    );
    assert_eq!(
      session.tick(t0 + secs(2.9), capture),
      Tick::Countdown { remaining: 1 }
    );
    assert_eq!(calls.get(), 0);
  }

  #[test]
  fn countdown_expiry_captures_exactly_once_then_rests() {
    let t0 = Instant::now();
    let mut session = GameSession::new(RoundTiming::default(), t0);
    let calls = Cell::new(0);
    let capture = || {
      calls.set(calls.get() + 1);
      win()
    };

    assert_eq!(session.tick(t0 + secs(3.0), capture), Tick::Captured(win()));
    assert_eq!(session.phase(), RoundPhase::Rest);
    // 之后的推进都在休息阶段，不会再次抓拍
    assert_eq!(session.tick(t0 + secs(3.1), capture), Tick::Rest);
    assert_eq!(session.tick(t0 + secs(4.9), capture), Tick::Rest);
    assert_eq!(calls.get(), 1);
    assert_eq!(session.score().player_wins, 1);
    assert_eq!(session.rounds(), 1);
  }

  #[test]
  fn rest_expiry_returns_to_countdown_with_fresh_timer() {
    let t0 = Instant::now();
    let mut session = GameSession::new(RoundTiming::default(), t0);
    session.tick(t0 + secs(3.5), win);
    // 休息从 3.5s 开始，5.5s 结束
    assert_eq!(session.tick(t0 + secs(5.4), win), Tick::Rest);
    assert_eq!(
      session.tick(t0 + secs(5.5), win),
      Tick::Countdown { remaining: 3 }
    );
    assert_eq!(session.phase(), RoundPhase::Countdown);
    assert_eq!(session.elapsed(t0 + secs(5.5)), Duration::ZERO);
    assert_eq!(
      session.tick(t0 + secs(8.4), win),
      Tick::Countdown { remaining: 1 }
    );
    assert!(matches!(session.tick(t0 + secs(8.5), win), Tick::Captured(_)));
    assert_eq!(session.score().player_wins, 2);
  }

  #[test]
  fn late_tick_still_captures_only_once() {
    let t0 = Instant::now();
    let mut session = GameSession::new(RoundTiming::default(), t0);
    // 一次推进跨越了整个倒计时与休息时长
    assert!(matches!(session.tick(t0 + secs(60.0), win), Tick::Captured(_)));
    assert_eq!(session.rounds(), 1);
  }

  #[test]
  fn score_counts_only_decisive_rounds() {
    let mut score = Score::default();
    let outcomes = [
      RoundOutcome::PlayerWin,
      RoundOutcome::NoHand,
      RoundOutcome::ComputerWin,
      RoundOutcome::InvalidMove,
      RoundOutcome::Tie,
      RoundOutcome::Tie,
    ];
    let mut previous = score;
    for outcome in outcomes {
      score.record(outcome);
      assert!(score.player_wins >= previous.player_wins);
      assert!(score.computer_wins >= previous.computer_wins);
      assert!(score.draws >= previous.draws);
      previous = score;
    }
    let decisive = outcomes.iter().filter(|o| o.is_scored()).count() as u32;
    assert_eq!(score.total(), decisive);
    assert_eq!(
      score,
      Score {
        player_wins: 1,
        computer_wins: 1,
        draws: 2
      }
    );
  }

  #[test]
  fn score_line_format() {
    let score = Score {
      player_wins: 4,
      computer_wins: 2,
      draws: 1,
    };
    assert_eq!(score.to_string(), "Score - You: 4 Computer: 2 Draws: 1");
  }

  #[test]
  fn zero_timing_alternates_capture_and_countdown() {
    let t0 = Instant::now();
    let mut session = GameSession::new(RoundTiming::from_secs(0, 0), t0);
    assert!(matches!(session.tick(t0, win), Tick::Captured(_)));
    assert_eq!(session.tick(t0, win), Tick::Countdown { remaining: 0 });
    assert!(matches!(session.tick(t0, win), Tick::Captured(_)));
  }
}
