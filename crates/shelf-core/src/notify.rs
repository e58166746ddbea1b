//! User-facing notifications
//!
//! The store emits notification events; how and for how long they are
//! shown is up to the sink.

use std::time::Duration;

use serde::Serialize;

/// Visual weight of a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    /// Something went wrong or was rejected
    Destructive,
}

/// An ephemeral message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    /// Display duration; `None` leaves it to the sink's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
            duration: None,
        }
    }

    /// Same as `new` but marked destructive
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Destructive,
            ..Self::new(title, description)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

/// Receiver of notifications
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &mut T {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Sink that keeps every notification in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Most recent notification, if any
    pub fn last(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Titles in emission order
    pub fn titles(&self) -> Vec<&str> {
        self.notifications.iter().map(|n| n.title.as_str()).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_builders() {
        let n = Notification::new("Book Added", "added");
        assert_eq!(n.variant, Variant::Default);
        assert!(n.duration.is_none());

        let n = Notification::destructive("Error", "bad").with_duration(Duration::from_secs(10));
        assert!(n.is_destructive());
        assert_eq!(n.duration, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.notify(Notification::new("one", ""));
        sink.notify(Notification::new("two", ""));
        assert_eq!(sink.titles(), vec!["one", "two"]);
        assert_eq!(sink.last().unwrap().title, "two");
        assert_eq!(sink.notifications().len(), 2);
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn emit<N: NotificationSink>(mut sink: N) {
            sink.notify(Notification::new("via ref", ""));
        }

        let mut sink = RecordingSink::new();
        emit(&mut sink);
        assert_eq!(sink.titles(), vec!["via ref"]);
    }

    #[test]
    fn test_serialize_skips_missing_duration() {
        let json = serde_json::to_value(Notification::new("t", "d")).unwrap();
        assert_eq!(json["variant"], "default");
        assert!(json.get("duration").is_none());
    }
}
