use std::time::Duration;

use crate::browser::PageDriver;
use crate::error::BrowserError;

/// 两路等待中先出现的一方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appeared {
    First,
    Second,
}

/// 在同一时限内同时等待两个元素，先出现者胜出
///
/// 某一路超时或出错只会让该路退出竞争；两路都退出或总时限到达时返回超时。
pub async fn first_to_appear<P: PageDriver + ?Sized>(
    page: &P,
    first: &str,
    second: &str,
    window: Duration,
) -> Result<Appeared, BrowserError> {
    let raced = tokio::time::timeout(window, async {
        tokio::select! {
            Ok(()) = page.wait_for(first, window) => Some(Appeared::First),
            Ok(()) = page.wait_for(second, window) => Some(Appeared::Second),
            else => None,
        }
    })
    .await;

    match raced {
        Ok(Some(winner)) => Ok(winner),
        _ => Err(BrowserError::Timeout {
            selector: format!("{} | {}", first, second),
            timeout: window,
        }),
    }
}
