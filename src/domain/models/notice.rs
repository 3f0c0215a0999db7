#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NoticeKind {
    Info,
    Warning,
    RateLimited,
    Error,
}

/// A single user-visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Seconds the server asked us to wait, only set for rate limits.
    pub retry_after: Option<u64>,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: &str) -> Notice {
        return Notice {
            kind,
            text: text.trim().to_string(),
            retry_after: None,
        };
    }

    pub fn info(text: &str) -> Notice {
        return Notice::new(NoticeKind::Info, text);
    }

    pub fn warning(text: &str) -> Notice {
        return Notice::new(NoticeKind::Warning, text);
    }

    pub fn error(text: &str) -> Notice {
        return Notice::new(NoticeKind::Error, text);
    }

    pub fn rate_limited(text: &str, retry_after: Option<u64>) -> Notice {
        let mut notice = Notice::new(NoticeKind::RateLimited, text);
        if notice.text.is_empty() {
            notice.text = match retry_after {
                Some(secs) => format!("Rate limited. Retry after {secs} seconds."),
                None => "Rate limited. Please slow down.".to_string(),
            };
        }
        notice.retry_after = retry_after;

        return notice;
    }

    pub fn is_failure(&self) -> bool {
        return self.kind != NoticeKind::Info;
    }
}
