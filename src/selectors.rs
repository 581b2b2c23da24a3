//! 页面选择器与安全验证地址规则
//!
//! 所有 CSS 选择器集中在这里，流程层只引用字段名，不写死字符串。

use regex::Regex;

/// 登录与发帖流程用到的页面选择器
#[derive(Clone, Debug)]
pub struct Selectors {
    /// 仅在已登录时出现的元素（首页动态的"开始发帖"入口）
    pub authenticated: String,
    /// 安全验证页面的特征元素
    pub challenge: String,
    /// 用户名输入框
    pub username_input: String,
    /// 密码输入框
    pub password_input: String,
    /// 登录提交按钮
    pub login_submit: String,
    /// "开始发帖"按钮
    pub start_post: String,
    /// 帖子正文编辑器
    pub post_editor: String,
    /// 发布按钮
    pub post_submit: String,
    /// 发布成功提示（只匹配成功类型，错误提示同样是 toast）
    pub post_success: String,
    /// 安全验证页面的 URL 规则
    pub challenge_url_patterns: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            authenticated: "button.share-box-feed-entry__trigger".to_string(),
            challenge: "#captcha-internal, iframe[src*='challenge'], input[name='pin']"
                .to_string(),
            username_input: "#username".to_string(),
            password_input: "#password".to_string(),
            login_submit: "button[type='submit']".to_string(),
            start_post: "button.share-box-feed-entry__trigger".to_string(),
            post_editor: "div.ql-editor[contenteditable='true']".to_string(),
            post_submit: "button.share-actions__primary-action".to_string(),
            post_success: "[data-test-artdeco-toast-item-type='success']".to_string(),
            challenge_url_patterns: vec![
                r"/checkpoint/challenge".to_string(),
                r"/checkpoint/lg/".to_string(),
                r"captcha".to_string(),
                r"/authwall".to_string(),
            ],
        }
    }
}

/// 编译后的安全验证地址匹配器
#[derive(Debug)]
pub struct ChallengeUrlMatcher {
    patterns: Vec<Regex>,
}

impl ChallengeUrlMatcher {
    /// 编译规则；无法编译的规则会被跳过并记录警告
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("忽略无效的验证地址规则 `{}`: {}", p, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// 当前 URL 是否为安全验证页面
    pub fn is_challenge(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_match_checkpoint_urls() {
        let matcher = ChallengeUrlMatcher::new(&Selectors::default().challenge_url_patterns);
        assert!(matcher.is_challenge(
            "https://www.linkedin.com/checkpoint/challenge/AgG1x?ut=abc"
        ));
        assert!(matcher.is_challenge("https://www.linkedin.com/checkpoint/lg/login-submit"));
        assert!(!matcher.is_challenge("https://www.linkedin.com/feed/"));
    }

    #[test]
    fn success_selector_only_matches_success_toasts() {
        let selectors = Selectors::default();
        assert!(selectors.post_success.contains("success"));
        assert!(!selectors.post_success.contains("artdeco-toast-item--visible"));
        assert!(!selectors.post_success.contains(','));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let matcher = ChallengeUrlMatcher::new(&["(".to_string(), "verify".to_string()]);
        assert!(matcher.is_challenge("https://example.com/verify"));
        assert!(!matcher.is_challenge("https://example.com/home"));
    }
}
