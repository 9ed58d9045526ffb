//! Toast queue. Flows push one toast per outcome; the UI drains and shows
//! them. The queue itself never deduplicates or drops.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Notifier {
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast {
            kind: ToastKind::Success,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast {
            kind: ToastKind::Error,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast {
            kind: ToastKind::Info,
            message: message.into(),
        });
    }

    /// Hands all queued toasts to the caller and empties the queue.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
