/// 可取消的延迟任务：只在静默期结束后交付最后一次输入，新的输入会重新计时
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due_at: f64,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: None,
        }
    }

    /// 安排新值并重新计时，返回到期时间
    pub fn schedule(&mut self, value: T, now_ms: f64) -> f64 {
        let due_at = now_ms + self.delay_ms;
        self.pending = Some(Pending { value, due_at });
        due_at
    }

    /// 到期则取出待交付的值
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due_at <= now_ms => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// 立即取出待交付的值
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// 取消待交付的值
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.due_at)
    }
}
