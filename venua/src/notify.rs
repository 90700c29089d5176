//! Notification hooks for booking confirmations.
//!
//! The engine fires a [`ConfirmationNotice`] whenever a booking transitions
//! into `confirmed`. Delivery is a collaborator concern (email, push, ...);
//! the engine treats it as fire-and-forget and logs failures instead of
//! propagating them.

use chrono::NaiveDate;

use crate::booking::BookingId;

/// The payload handed to the notification collaborator on confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationNotice {
    /// The confirmed booking.
    pub booking_id: BookingId,
    /// Display name of the booking owner.
    pub user_name: String,
    /// Email address of the booking owner.
    pub user_email: String,
    /// The day of the event.
    pub event_day: NaiveDate,
}

/// Delivery seam for confirmation notices.
pub trait Notifier: Send + Sync {
    /// Delivers a confirmation notice.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the engine logs the error and carries on.
    fn booking_confirmed(&self, notice: &ConfirmationNotice) -> Result<(), String>;
}

/// Default notifier: writes the notice to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn booking_confirmed(&self, notice: &ConfirmationNotice) -> Result<(), String> {
        log::info!(
            "booking {} confirmed for {} <{}> on {}",
            notice.booking_id,
            notice.user_name,
            notice.user_email,
            notice.event_day
        );
        Ok(())
    }
}

/// Notifier that does nothing. Useful in tests.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn booking_confirmed(&self, _notice: &ConfirmationNotice) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Notifier that records every notice it receives.
    struct RecordingNotifier {
        notices: Mutex<Vec<ConfirmationNotice>>,
    }

    impl Notifier for RecordingNotifier {
        fn booking_confirmed(&self, notice: &ConfirmationNotice) -> Result<(), String> {
            self.notices.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    #[test]
    fn test_log_notifier_succeeds() {
        let notice = ConfirmationNotice {
            booking_id: 1,
            user_name: "Ana".into(),
            user_email: "ana@example.com".into(),
            event_day: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
        };
        assert!(LogNotifier.booking_confirmed(&notice).is_ok());
        assert!(NoopNotifier.booking_confirmed(&notice).is_ok());
    }

    #[test]
    fn test_recording_notifier_captures_payload() {
        let notifier = RecordingNotifier {
            notices: Mutex::new(Vec::new()),
        };
        let notice = ConfirmationNotice {
            booking_id: 4,
            user_name: "Bruno".into(),
            user_email: "bruno@example.com".into(),
            event_day: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        };

        notifier.booking_confirmed(&notice).unwrap();
        let seen = notifier.notices.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], notice);
    }
}
