use crate::constants::DEFAULT_EVENT_KEYWORDS;
use crate::models::{Notification, NotificationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_event: bool,
}

/// Decides whether a notification represents an event that needs RSVP actions.
///
/// Rules, first match wins:
/// 1. `type == event`
/// 2. metadata carries `event_date`, `event_location` or `event_type`
/// 3. a keyword appears (case-insensitively) in title + message
///
/// The keyword rule is locale-biased and will flag unrelated text containing a
/// keyword as a substring ("recital" matches "cita"). That is accepted behaviour.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    keywords: Vec<String>,
}

impl EventClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, notification: &Notification) -> Classification {
        Classification {
            is_event: self.is_event(notification),
        }
    }

    pub fn is_event(&self, notification: &Notification) -> bool {
        if notification.kind == NotificationType::Event {
            return true;
        }
        if notification
            .metadata
            .as_ref()
            .is_some_and(|m| m.has_event_keys())
        {
            return true;
        }
        let text = format!("{} {}", notification.title, notification.message).to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_KEYWORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationMetadata, Timestamp};

    fn notification(kind: NotificationType, title: &str, message: &str) -> Notification {
        Notification {
            id: "n1".to_string(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            priority: None,
            read: false,
            created_at: Timestamp::default(),
            metadata: None,
        }
    }

    #[test]
    fn test_event_type_wins_without_keywords() {
        let n = notification(NotificationType::Event, "Aviso", "Sin palabras clave");
        assert!(EventClassifier::default().classify(&n).is_event);
    }

    #[test]
    fn test_metadata_keys_mark_event() {
        let mut n = notification(NotificationType::Info, "Aviso", "Texto");
        n.metadata = Some(NotificationMetadata {
            event_location: Some("Aula Magna".to_string()),
            ..Default::default()
        });
        assert!(EventClassifier::default().is_event(&n));

        n.metadata = Some(NotificationMetadata {
            event_description: Some("solo descripción".to_string()),
            ..Default::default()
        });
        assert!(!EventClassifier::default().is_event(&n));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let n = notification(NotificationType::Info, "REUNIÓN de tutores", "");
        assert!(EventClassifier::default().is_event(&n));

        let n = notification(NotificationType::Warning, "Aviso", "Team Meeting at 5");
        assert!(EventClassifier::default().is_event(&n));
    }

    #[test]
    fn test_plain_notification_is_not_event() {
        let n = notification(NotificationType::Success, "Proyecto aprobado", "Buen trabajo");
        assert!(!EventClassifier::default().is_event(&n));
    }

    #[test]
    fn test_keyword_inside_a_longer_word_still_matches() {
        // Substring matching: "Felicitaciones" contains "cita".
        let n = notification(NotificationType::Success, "Proyecto aprobado", "Felicitaciones");
        assert!(EventClassifier::default().is_event(&n));
    }

    #[test]
    fn test_keyword_spanning_title_and_message_does_not_match() {
        // "cita" must appear within one field; the separator breaks "ci" + "ta".
        let n = notification(NotificationType::Info, "Felici", "tamos");
        assert!(!EventClassifier::default().is_event(&n));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = EventClassifier::default();
        let n = notification(NotificationType::Other("promo".into()), "Invitación", "x");
        assert_eq!(classifier.classify(&n), classifier.classify(&n));
    }

    #[test]
    fn test_custom_keywords_are_normalized() {
        let classifier = EventClassifier::new(["  Taller ", ""]);
        assert_eq!(classifier.keywords(), ["taller".to_string()]);
        let n = notification(NotificationType::Info, "Nuevo TALLER", "");
        assert!(classifier.is_event(&n));
    }
}
