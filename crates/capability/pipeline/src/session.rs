//! 会话连续性跟踪
//!
//! 每个 (thing, session_id) 维护一个单调递增的序号游标，
//! 存在 TTL 缓存里（5 分钟滑动过期）。游标丢失等价于新会话。

use blue_cache::{keys, ttl, TtlCache};
use domain::{LossEvent, TrackOutcome};
use std::sync::Arc;
use tracing::warn;

/// 会话跟踪器。
pub struct SessionTracker {
    cache: Arc<dyn TtlCache>,
}

impl SessionTracker {
    pub fn new(cache: Arc<dyn TtlCache>) -> Self {
        Self { cache }
    }

    /// 按序号推进游标：
    /// - 无游标（或游标损坏）：重置为当前序号，接受；
    /// - `seq <= 游标`：重放或乱序，只刷新 TTL，丢弃；
    /// - `seq == 游标 + 1`：正常推进，接受；
    /// - `seq > 游标 + 1`：产生一个丢包事件并推进，接受。
    ///
    /// 缓存故障按"无游标"降级，不阻塞接入。
    pub async fn track(&self, thing: &str, session_id: &str, seq: i64) -> TrackOutcome {
        let key = keys::session_key(thing, session_id);
        let stored = match self.cache.get(&key).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(target: "blue.pipeline", key = %key, "session cursor read failed: {}", err);
                None
            }
        };

        let cursor = match stored {
            None => {
                self.store_cursor(&key, seq).await;
                return TrackOutcome::Accepted { loss: None };
            }
            Some(raw) => match raw.parse::<i64>() {
                Ok(cursor) => cursor,
                Err(_) => {
                    warn!(
                        target: "blue.pipeline",
                        key = %key,
                        cursor = %raw,
                        "unparsable session cursor, resetting"
                    );
                    self.store_cursor(&key, seq).await;
                    return TrackOutcome::Accepted { loss: None };
                }
            },
        };

        if seq <= cursor {
            if let Err(err) = self.cache.touch(&key, ttl::SESSION).await {
                warn!(target: "blue.pipeline", key = %key, "session cursor touch failed: {}", err);
            }
            return TrackOutcome::Stale;
        }

        let loss = if seq > cursor + 1 {
            Some(LossEvent {
                thing: thing.to_string(),
                session_id: session_id.to_string(),
                start_seq: cursor + 1,
                end_seq: seq - 1,
            })
        } else {
            None
        };
        self.store_cursor(&key, seq).await;
        TrackOutcome::Accepted { loss }
    }

    async fn store_cursor(&self, key: &str, seq: i64) {
        if let Err(err) = self
            .cache
            .set(key, &seq.to_string(), ttl::SESSION)
            .await
        {
            warn!(target: "blue.pipeline", key = %key, "session cursor write failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blue_cache::InMemoryTtlCache;

    fn tracker() -> SessionTracker {
        SessionTracker::new(Arc::new(InMemoryTtlCache::new()))
    }

    #[tokio::test]
    async fn gap_emits_single_loss_event() {
        let tracker = tracker();
        for seq in [1, 2, 3] {
            let outcome = tracker.track("t1", "s1", seq).await;
            assert_eq!(outcome, TrackOutcome::Accepted { loss: None });
        }
        let outcome = tracker.track("t1", "s1", 7).await;
        assert_eq!(
            outcome,
            TrackOutcome::Accepted {
                loss: Some(LossEvent {
                    thing: "t1".to_string(),
                    session_id: "s1".to_string(),
                    start_seq: 4,
                    end_seq: 6,
                })
            }
        );
        // 缺口上报一次之后游标已推进，不重复上报
        let outcome = tracker.track("t1", "s1", 8).await;
        assert_eq!(outcome, TrackOutcome::Accepted { loss: None });
    }

    #[tokio::test]
    async fn duplicate_and_out_of_order_are_stale() {
        let tracker = tracker();
        tracker.track("t1", "s1", 5).await;
        assert_eq!(tracker.track("t1", "s1", 5).await, TrackOutcome::Stale);
        assert_eq!(tracker.track("t1", "s1", 3).await, TrackOutcome::Stale);
        // 游标未被回退
        assert_eq!(
            tracker.track("t1", "s1", 6).await,
            TrackOutcome::Accepted { loss: None }
        );
    }

    #[tokio::test]
    async fn corrupt_cursor_resets_without_loss() {
        let cache = Arc::new(InMemoryTtlCache::new());
        cache
            .set(&keys::session_key("t1", "s1"), "garbage", ttl::SESSION)
            .await
            .expect("set");
        let tracker = SessionTracker::new(cache);
        assert_eq!(
            tracker.track("t1", "s1", 10).await,
            TrackOutcome::Accepted { loss: None }
        );
        assert_eq!(tracker.track("t1", "s1", 10).await, TrackOutcome::Stale);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let tracker = tracker();
        tracker.track("t1", "s1", 9).await;
        assert_eq!(
            tracker.track("t1", "s2", 1).await,
            TrackOutcome::Accepted { loss: None }
        );
        assert_eq!(
            tracker.track("t2", "s1", 1).await,
            TrackOutcome::Accepted { loss: None }
        );
    }

    #[tokio::test]
    async fn large_jump_is_bounded() {
        let tracker = tracker();
        tracker.track("t1", "s1", 1).await;
        let outcome = tracker.track("t1", "s1", i64::MAX).await;
        assert_eq!(
            outcome,
            TrackOutcome::Accepted {
                loss: Some(LossEvent {
                    thing: "t1".to_string(),
                    session_id: "s1".to_string(),
                    start_seq: 2,
                    end_seq: i64::MAX - 1,
                })
            }
        );
    }
}
