use serde::Serialize;
use tokio::sync::mpsc;

/// Transient user-facing message, the toast analog. Never a persisted
/// error state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

/// Sender half kept by the session. A closed receiver means nobody is
/// watching toasts anymore; delivery failures are ignored.
#[derive(Debug, Clone)]
pub struct NoticeSender(mpsc::UnboundedSender<Notice>);

impl NoticeSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub fn send(&self, notice: Notice) {
        let _ = self.0.send(notice);
    }
}
