//! 请求日志
//!
//! 固定容量的环形缓冲区，超出容量时淘汰最早的条目。条目在请求开始时
//! 以 `pending` 状态写入，请求结束时只更新最终状态。

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// 日志容量
pub const LOG_CAPACITY: usize = 100;

/// 文本预览的最大长度（UTF-16 码元）
pub const PREVIEW_UNITS: usize = 50;

/// 请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
}

/// 单条请求记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    #[serde(skip)]
    pub id: u64,
    pub timestamp: String,
    pub text: String,
    pub target_lang: String,
    pub status: RequestStatus,
}

struct LogInner {
    entries: VecDeque<RequestLogEntry>,
    next_id: u64,
}

/// 请求日志
pub struct RequestLog {
    inner: Mutex<LogInner>,
    capacity: usize,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(LogInner {
                entries: VecDeque::with_capacity(capacity),
                next_id: 0,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 记录新请求，返回用于更新状态的编号
    pub fn push(&self, text: &str, target_lang: &str) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        if inner.entries.len() >= self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(RequestLogEntry {
            id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            text: preview(text),
            target_lang: target_lang.to_string(),
            status: RequestStatus::Pending,
        });

        id
    }

    /// 更新请求的最终状态，条目已被淘汰时返回 false
    pub fn finish(&self, id: u64, status: RequestStatus) -> bool {
        let mut inner = self.lock();
        match inner.entries.iter_mut().rev().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    /// 最近的 `count` 条记录，按时间先后排列
    pub fn recent(&self, count: usize) -> Vec<RequestLogEntry> {
        let inner = self.lock();
        let skip = inner.entries.len().saturating_sub(count);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    /// 当前保留的条目数
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// 截取不超过 `PREVIEW_UNITS` 个 UTF-16 码元的前缀，不拆分字符
fn preview(text: &str) -> String {
    let mut units = 0;
    text.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= PREVIEW_UNITS
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_finish() {
        let log = RequestLog::new();
        let id = log.push("Hello", "ja");

        assert_eq!(log.recent(10)[0].status, RequestStatus::Pending);
        assert!(log.finish(id, RequestStatus::Success));

        let entries = log.recent(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, RequestStatus::Success);
        assert_eq!(entries[0].target_lang, "ja");
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let log = RequestLog::with_capacity(3);
        let first = log.push("one", "fr");
        for text in ["two", "three", "four"] {
            log.push(text, "fr");
        }

        assert_eq!(log.len(), 3);
        assert!(!log.finish(first, RequestStatus::Error));

        let texts: Vec<_> = log.recent(10).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["two", "three", "four"]);
    }

    #[test]
    fn test_recent_returns_newest_in_order() {
        let log = RequestLog::new();
        for i in 0..15 {
            log.push(&format!("text {}", i), "de");
        }

        let recent = log.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().unwrap().text, "text 5");
        assert_eq!(recent.last().unwrap().text, "text 14");
    }

    #[test]
    fn test_default_capacity() {
        let log = RequestLog::default();
        for _ in 0..(LOG_CAPACITY + 20) {
            log.push("x", "en");
        }
        assert_eq!(log.len(), LOG_CAPACITY);
    }

    #[test]
    fn test_preview_truncation() {
        let long = "a".repeat(80);
        assert_eq!(preview(&long).len(), PREVIEW_UNITS);

        // 每个表情占两个 UTF-16 码元
        let emoji = "😀".repeat(30);
        assert_eq!(preview(&emoji).chars().count(), 25);

        assert_eq!(preview("短文本"), "短文本");
    }
}
