//! 单次登录 / 发帖的结果

use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// 会话建立结果，每次尝试只产生一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 保存的会话仍然有效
    AlreadyAuthenticated,
    /// 通过用户名密码重新登录成功
    FreshLoginSucceeded,
    /// 遇到安全验证，需要人工处理
    ChallengeBlocked(String),
    /// 登录失败
    LoginFailed(String),
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionOutcome::AlreadyAuthenticated | SessionOutcome::FreshLoginSucceeded
        )
    }

    /// 终止性失败转换为错误，供编排层直接 `?`
    pub fn into_result(self) -> AppResult<SessionOutcome> {
        match self {
            SessionOutcome::ChallengeBlocked(reason) => Err(AppError::ChallengeBlocked(reason)),
            SessionOutcome::LoginFailed(reason) => Err(AppError::LoginFailed(reason)),
            authenticated => Ok(authenticated),
        }
    }
}

impl Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionOutcome::AlreadyAuthenticated => write!(f, "已登录（复用会话）"),
            SessionOutcome::FreshLoginSucceeded => write!(f, "重新登录成功"),
            SessionOutcome::ChallengeBlocked(reason) => write!(f, "安全验证拦截: {}", reason),
            SessionOutcome::LoginFailed(reason) => write!(f, "登录失败: {}", reason),
        }
    }
}

/// 发帖结果
///
/// `Confirmed` 只在看到明确的成功提示后产生，不能由"没有报错"推断。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Confirmed,
    Unconfirmed(String),
}

impl PublishOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PublishOutcome::Confirmed)
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            PublishOutcome::Confirmed => Ok(()),
            PublishOutcome::Unconfirmed(reason) => Err(AppError::PublishUnconfirmed(reason)),
        }
    }
}
