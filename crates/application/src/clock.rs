use domain::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;

    /// 测试用手动时钟，可向前拨动模拟时间。
    pub struct ManualClock {
        now: Mutex<Timestamp>,
    }

    impl ManualClock {
        pub fn new(start: Timestamp) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.now.lock().unwrap()
        }
    }
}
