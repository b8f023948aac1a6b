use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window rate limiter: at most `max_requests` calls may be in
/// flight within any `window` of wall-clock time. When the window is
/// full, `acquire` awaits until the earliest request ages out before
/// letting the caller proceed.
///
/// This is a hand-rolled token bucket rather than a crate dependency —
/// the policy is small enough that pulling in a limiter crate
/// would add a dependency for a dozen lines of logic.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Block until a slot in the window is available, then reserve it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut ts = self.timestamps.lock().await;
                let now = Instant::now();
                while let Some(&front) = ts.front() {
                    if now.duration_since(front) >= self.window {
                        ts.pop_front();
                    } else {
                        break;
                    }
                }

                if ts.len() < self.max_requests {
                    ts.push_back(now);
                    None
                } else {
                    let front = *ts.front().expect("bucket full implies non-empty");
                    Some(self.window - now.duration_since(front))
                }
            };

            match wait {
                None => return,
                Some(delay) => tokio::time::sleep(delay).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn allows_bursts_up_to_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_millis(1000));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(Instant::now().duration_since(start) < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn delays_once_window_is_full() {
        let limiter = RateLimiter::new(1, Duration::from_millis(1000));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        let elapsed = Instant::now().duration_since(start);
        assert!(elapsed >= Duration::from_millis(1000));
    }
}
