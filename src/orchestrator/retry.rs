//! 重试协调 - 编排层
//!
//! 有上限的重试循环：第 1 次立即执行，第 k 次（k ≥ 2）前等待
//! `base × multiplier^(k-2)`。一次成功立即结束；最后一次仍失败时
//! 发送汇总通知，然后正常返回，不再向上抛错。
//! 收到退出信号后不再开始新的尝试，退避等待也会被立即打断。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::config::RetryPolicy;
use crate::error::AppError;
use crate::models::PostCandidate;
use crate::orchestrator::attempt::Attempt;
use crate::orchestrator::shutdown::Shutdown;
use crate::services::{subjects, Notifier};
use crate::utils::logging::{log_attempt_start, print_run_summary};

/// 一轮重试的状态，只在一次 `RetryCoordinator::run` 内存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pub attempt_number: u32,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt_number: 0,
            max_attempts: policy.max_attempts,
            base_delay: policy.base_delay,
            multiplier: policy.multiplier,
        }
    }

    /// 进入下一次尝试，返回尝试前需要等待的时长；没有剩余次数时返回 `None`
    pub fn advance(&mut self) -> Option<Duration> {
        if self.attempt_number >= self.max_attempts {
            return None;
        }
        self.attempt_number += 1;
        Some(self.delay_before(self.attempt_number))
    }

    /// 第 `attempt` 次尝试前的等待时长
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = self
            .multiplier
            .checked_pow(attempt - 2)
            .unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }

    pub fn is_last_attempt(&self) -> bool {
        self.attempt_number >= self.max_attempts
    }
}

/// 一轮重试的最终结果
#[derive(Debug)]
pub enum RetryOutcome {
    Published {
        attempt: u32,
        candidate: PostCandidate,
    },
    Exhausted {
        attempts: u32,
        last_error: AppError,
    },
    /// 收到退出信号，剩余尝试被放弃
    Cancelled { attempts: u32 },
}

impl RetryOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RetryOutcome::Published { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Published { attempt, .. } => *attempt,
            RetryOutcome::Exhausted { attempts, .. } => *attempts,
            RetryOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// 重试协调器
pub struct RetryCoordinator<A> {
    attempt: A,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
    shutdown: Shutdown,
}

impl<A: Attempt> RetryCoordinator<A> {
    pub fn new(attempt: A, policy: RetryPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            attempt,
            policy,
            notifier,
            shutdown: Shutdown::never(),
        }
    }

    /// 退避等待期间响应退出信号
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn attempt(&self) -> &A {
        &self.attempt
    }

    /// 执行一轮带重试的发帖
    pub async fn run(&self) -> RetryOutcome {
        let mut state = RetryState::new(&self.policy);
        let mut last_error = None;

        while let Some(delay) = state.advance() {
            let finished = state.attempt_number - 1;
            if self.shutdown.is_triggered() {
                return cancelled(finished);
            }
            if !delay.is_zero() {
                info!(
                    "⏳ {}s 后进行第 {}/{} 次尝试",
                    delay.as_secs(),
                    state.attempt_number,
                    state.max_attempts
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = self.shutdown.triggered() => return cancelled(finished),
                }
            }

            log_attempt_start(state.attempt_number, state.max_attempts);

            match self.attempt.run_one_attempt().await {
                Ok(candidate) => {
                    print_run_summary(true, state.attempt_number);
                    return RetryOutcome::Published {
                        attempt: state.attempt_number,
                        candidate,
                    };
                }
                Err(e) => {
                    error!(
                        "[尝试 {}/{}] ❌ {}",
                        state.attempt_number, state.max_attempts, e
                    );
                    if !state.is_last_attempt() {
                        info!("将在退避等待后重试");
                    }
                    last_error = Some(e);
                }
            }
        }

        let attempts = state.attempt_number;
        let last_error =
            last_error.unwrap_or_else(|| AppError::Config("最大尝试次数为 0".to_string()));

        print_run_summary(false, attempts);
        self.notifier
            .notify(
                subjects::RETRIES_EXHAUSTED,
                &format!(
                    "共尝试 {} 次均失败，本轮不再重试。\n最后错误: {}",
                    attempts, last_error
                ),
            )
            .await;

        RetryOutcome::Exhausted {
            attempts,
            last_error,
        }
    }
}

fn cancelled(attempts: u32) -> RetryOutcome {
    info!("🛑 收到退出信号，放弃剩余尝试 (已尝试 {} 次)", attempts);
    RetryOutcome::Cancelled { attempts }
}
