//! Reservation engine: booking lifecycle orchestration.
//!
//! All conflict decisions run here. A booking is created by checking and
//! transitioning its calendar date while holding the per-date lock, and the
//! two rows are committed as one transaction, so at most one active booking
//! can ever reference a date. Updates serialize on the per-booking lock and
//! additionally take the per-date lock whenever they transition the date
//! (always in that order, so the two locks cannot deadlock).

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::booking::{Booking, BookingId, BookingPatch, BookingState, UserId};
use crate::cache::EngineCache;
use crate::calendar::{DateId, DateState};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::identity::{ContactDirectory, NoContacts};
use crate::lock::{LockManager, LockResource};
use crate::notify::{ConfirmationNotice, LogNotifier, Notifier};

/// Options for creating a booking.
///
/// # Examples
///
/// ```
/// use venua::engine::CreateBookingOptions;
/// use venua::BookingState;
///
/// let options = CreateBookingOptions::new(7, 1)
///     .with_state(BookingState::Confirmed)
///     .with_rental_price(Some(1500.0))
///     .with_acceptance_ip(Some("203.0.113.9".to_string()));
/// assert_eq!(options.requested_state, BookingState::Confirmed);
/// ```
#[derive(Debug, Clone)]
pub struct CreateBookingOptions {
    /// The requesting user.
    pub user_id: UserId,
    /// The calendar date to book.
    pub date_id: DateId,
    /// Initial state, `pending` unless an admin creates it confirmed.
    pub requested_state: BookingState,
    /// Rental price. Defaults to the date's estimated price.
    pub rental_price: Option<f64>,
    /// Deadline after which a pending booking lapses.
    pub expires_at: Option<DateTime<Utc>>,
    /// IP address the contract was accepted from.
    pub acceptance_ip: Option<String>,
    /// When the contract was accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Contract version; the builder default applies when unset.
    pub contract_version: Option<String>,
}

impl CreateBookingOptions {
    /// Creates options with defaults: pending state, price from the date,
    /// no expiry, no acceptance metadata.
    #[must_use]
    pub const fn new(user_id: UserId, date_id: DateId) -> Self {
        Self {
            user_id,
            date_id,
            requested_state: BookingState::Pending,
            rental_price: None,
            expires_at: None,
            acceptance_ip: None,
            accepted_at: None,
            contract_version: None,
        }
    }

    /// Sets the initial state.
    #[must_use]
    pub const fn with_state(mut self, state: BookingState) -> Self {
        self.requested_state = state;
        self
    }

    /// Sets the rental price override.
    #[must_use]
    pub const fn with_rental_price(mut self, price: Option<f64>) -> Self {
        self.rental_price = price;
        self
    }

    /// Sets the expiry deadline.
    #[must_use]
    pub fn with_expires_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = at;
        self
    }

    /// Sets the acceptance IP.
    #[must_use]
    pub fn with_acceptance_ip(mut self, ip: Option<String>) -> Self {
        self.acceptance_ip = ip;
        self
    }

    /// Sets the acceptance timestamp.
    #[must_use]
    pub fn with_accepted_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.accepted_at = at;
        self
    }

    /// Sets the contract version.
    #[must_use]
    pub fn with_contract_version(mut self, version: Option<String>) -> Self {
        self.contract_version = version;
        self
    }
}

/// The reservation engine.
///
/// Holds the long-lived dependencies (lock manager, caches, notifier,
/// contact directory) and operates on a [`Database`] passed to each call.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use venua::database::{Database, DatabaseConfig};
/// use venua::engine::{CreateBookingOptions, ReservationEngine};
/// use venua::{EngineCache, LockManager};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/venua.db")).unwrap();
/// let engine = ReservationEngine::new(
///     Arc::new(LockManager::new()),
///     Arc::new(EngineCache::new()),
/// );
///
/// let date = db.get_or_create_date("2025-12-25".parse().unwrap()).unwrap();
/// let booking = engine
///     .create(&mut db, CreateBookingOptions::new(7, date.id))
///     .unwrap();
/// let confirmed = engine.approve(&mut db, booking.id).unwrap();
/// ```
pub struct ReservationEngine {
    locks: Arc<LockManager>,
    cache: Arc<EngineCache>,
    notifier: Arc<dyn Notifier>,
    contacts: Arc<dyn ContactDirectory>,
}

impl ReservationEngine {
    /// Creates an engine with the default notifier (log) and an empty
    /// contact directory.
    #[must_use]
    pub fn new(locks: Arc<LockManager>, cache: Arc<EngineCache>) -> Self {
        Self {
            locks,
            cache,
            notifier: Arc::new(LogNotifier),
            contacts: Arc::new(NoContacts),
        }
    }

    /// Replaces the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the contact directory.
    #[must_use]
    pub fn with_contacts(mut self, contacts: Arc<dyn ContactDirectory>) -> Self {
        self.contacts = contacts;
        self
    }

    /// Creates a booking against an available date.
    ///
    /// The date is checked and transitioned while the per-date lock is
    /// held: it moves to `reserved` when the booking starts confirmed,
    /// `pending` otherwise, and the booking insert and date transition
    /// commit as one transaction. This is what guarantees at most one
    /// active booking per date.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceBusy`] if the date lock is contended (retryable)
    /// - [`Error::NotFound`] if the date does not exist
    /// - [`Error::DateUnavailable`] unless the date is `available`
    /// - [`Error::Validation`] for invalid booking fields
    pub fn create(&self, db: &mut Database, options: CreateBookingOptions) -> Result<Booking> {
        let _date_lock = self.locks.acquire(LockResource::Date(options.date_id))?;

        let date = db.get_date(options.date_id)?.ok_or_else(|| Error::NotFound {
            resource: format!("calendar date {}", options.date_id),
        })?;
        if !date.state.is_bookable() {
            return Err(Error::DateUnavailable {
                day: date.day,
                state: date.state,
            });
        }

        // The rental price is the balance baseline; fall back to the
        // estimate recorded on the date.
        let rental_price = options.rental_price.unwrap_or(date.price);

        let booking = Booking::builder(options.user_id, options.date_id)
            .state(options.requested_state)
            .rental_price(rental_price)
            .expires_at(options.expires_at)
            .acceptance_ip(options.acceptance_ip)
            .accepted_at(options.accepted_at);
        let booking = match options.contract_version {
            Some(version) => booking.contract_version(version),
            None => booking,
        };
        let booking = booking.build()?;

        let date_state = if booking.state == BookingState::Confirmed {
            DateState::Reserved
        } else {
            DateState::Pending
        };

        let created = db.create_booking_with_date(&booking, date_state)?;

        self.cache.invalidate_date(date.id);
        self.cache.invalidate_booking(created.id);

        if created.state == BookingState::Confirmed {
            self.notify_confirmed(db, &created);
        }

        Ok(created)
    }

    /// Applies a typed patch to a booking.
    ///
    /// Transitioning into `confirmed` flips the date to `reserved`;
    /// transitioning into `cancelled` releases it; archiving an active
    /// booking releases it too. Date transitions take the per-date lock and
    /// are committed atomically with the booking row.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceBusy`] on lock contention (retryable)
    /// - [`Error::NotFound`] if the booking does not exist
    /// - [`Error::Validation`] for illegal transitions or invalid fields
    pub fn update(&self, db: &mut Database, id: BookingId, patch: &BookingPatch) -> Result<Booking> {
        let _booking_lock = self.locks.acquire(LockResource::Booking(id))?;

        let mut booking = db.get_booking(id)?.ok_or_else(|| Error::NotFound {
            resource: format!("booking {id}"),
        })?;
        let previous_state = booking.state;
        patch.apply(&mut booking)?;

        let date_transition = if booking.state == previous_state {
            None
        } else {
            match booking.state {
                BookingState::Confirmed => Some(DateState::Reserved),
                BookingState::Cancelled => Some(DateState::Available),
                BookingState::Archived if previous_state.is_active() => {
                    Some(DateState::Available)
                }
                _ => None,
            }
        };

        // Lock order is booking, then date; create() takes only the date
        // lock, so the pair can never deadlock.
        let _date_lock = match date_transition {
            Some(_) => Some(self.locks.acquire(LockResource::Date(booking.date_id))?),
            None => None,
        };

        db.update_booking_and_date(
            &booking,
            date_transition.map(|state| (booking.date_id, state)),
        )?;

        self.cache.invalidate_booking(booking.id);
        self.cache.invalidate_date(booking.date_id);

        if booking.state == BookingState::Confirmed && previous_state != BookingState::Confirmed {
            self.notify_confirmed(db, &booking);
        }

        Ok(booking)
    }

    /// Confirms a booking and reserves its date.
    ///
    /// Convenience transition with an audit line; the confirmation notice
    /// is fire-and-forget.
    ///
    /// # Errors
    ///
    /// Same as [`ReservationEngine::update`].
    pub fn approve(&self, db: &mut Database, id: BookingId) -> Result<Booking> {
        let booking = self.update(db, id, &BookingPatch::new().state(BookingState::Confirmed))?;
        log::info!("audit: booking {id} approved");
        Ok(booking)
    }

    /// Cancels a booking and releases its date.
    ///
    /// # Errors
    ///
    /// Same as [`ReservationEngine::update`].
    pub fn cancel(&self, db: &mut Database, id: BookingId) -> Result<Booking> {
        self.update(db, id, &BookingPatch::new().state(BookingState::Cancelled))
    }

    /// Archives a booking, the terminal history-preserving state.
    ///
    /// Replaces hard deletion: payments stay in place, and the date is
    /// released only when the booking was still active. Archiving a stale
    /// cancelled booking must not touch a date that may have been re-booked
    /// since.
    ///
    /// # Errors
    ///
    /// Same as [`ReservationEngine::update`].
    pub fn archive(&self, db: &mut Database, id: BookingId) -> Result<Booking> {
        let booking = self.update(db, id, &BookingPatch::new().state(BookingState::Archived))?;
        log::info!("audit: booking {id} archived");
        Ok(booking)
    }

    /// Looks up a booking by id, read-through cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find(&self, db: &Database, id: BookingId) -> Result<Option<Booking>> {
        if let Some(booking) = self.cache.bookings.get(&id) {
            return Ok(Some(booking));
        }
        let booking = db.get_booking(id)?;
        if let Some(ref booking) = booking {
            self.cache.bookings.insert(id, booking.clone());
        }
        Ok(booking)
    }

    /// Lists all bookings, read-through cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self, db: &Database) -> Result<Vec<Booking>> {
        if let Some(bookings) = self.cache.booking_list.get(&()) {
            return Ok(bookings);
        }
        let bookings = db.list_bookings()?;
        if !bookings.is_empty() {
            self.cache.booking_list.insert((), bookings.clone());
        }
        Ok(bookings)
    }

    /// Lists the bookings owned by a user. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_for_user(&self, db: &Database, user_id: UserId) -> Result<Vec<Booking>> {
        db.list_bookings_for_user(user_id)
    }

    /// Fires the confirmation notice. Failures are logged, never
    /// propagated.
    fn notify_confirmed(&self, db: &Database, booking: &Booking) {
        let day = match db.get_date(booking.date_id) {
            Ok(Some(date)) => date.day,
            _ => {
                log::warn!(
                    "confirmation notice for booking {} skipped: date {} unreadable",
                    booking.id,
                    booking.date_id
                );
                return;
            }
        };

        let Some(contact) = self.contacts.contact_for(booking.user_id) else {
            log::debug!(
                "no contact on file for user {}, skipping confirmation notice",
                booking.user_id
            );
            return;
        };

        let notice = ConfirmationNotice {
            booking_id: booking.id,
            user_name: contact.name,
            user_email: contact.email,
            event_day: day,
        };
        if let Err(e) = self.notifier.booking_confirmed(&notice) {
            log::warn!("confirmation notice for booking {} failed: {e}", booking.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::create_test_database;
    use crate::identity::Contact;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn engine() -> ReservationEngine {
        ReservationEngine::new(Arc::new(LockManager::new()), Arc::new(EngineCache::new()))
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_create_pending_moves_date_to_pending() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();

        assert!(booking.id > 0);
        assert_eq!(booking.state, BookingState::Pending);
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Pending
        );
    }

    #[test]
    fn test_create_confirmed_moves_date_to_reserved() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = engine
            .create(
                &mut db,
                CreateBookingOptions::new(7, date.id).with_state(BookingState::Confirmed),
            )
            .unwrap();

        assert_eq!(booking.state, BookingState::Confirmed);
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Reserved
        );
    }

    #[test]
    fn test_create_rejects_unavailable_date() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();

        let err = engine
            .create(&mut db, CreateBookingOptions::new(8, date.id))
            .unwrap_err();
        assert!(matches!(err, Error::DateUnavailable { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_create_missing_date() {
        let mut db = create_test_database();
        let engine = engine();

        let err = engine
            .create(&mut db, CreateBookingOptions::new(7, 999))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_defaults_price_from_date() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        db.set_date_price(date.id, 1500.0).unwrap();

        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        assert_eq!(booking.rental_price, 1500.0);

        // An explicit price wins over the estimate.
        engine.archive(&mut db, booking.id).unwrap();
        let booking = engine
            .create(
                &mut db,
                CreateBookingOptions::new(7, date.id).with_rental_price(Some(900.0)),
            )
            .unwrap();
        assert_eq!(booking.rental_price, 900.0);
    }

    #[test]
    fn test_confirm_then_cancel_releases_date() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        engine.approve(&mut db, booking.id).unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Reserved
        );

        engine.cancel(&mut db, booking.id).unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Available
        );
    }

    #[test]
    fn test_cancel_pending_releases_date() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        engine.cancel(&mut db, booking.id).unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Available
        );
    }

    #[test]
    fn test_archive_releases_active_date_only() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        // Cancelled booking: date already released.
        let stale = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        engine.cancel(&mut db, stale.id).unwrap();

        // The date gets re-booked by someone else.
        let fresh = engine
            .create(
                &mut db,
                CreateBookingOptions::new(8, date.id).with_state(BookingState::Confirmed),
            )
            .unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Reserved
        );

        // Archiving the stale cancelled booking must not free the date.
        engine.archive(&mut db, stale.id).unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Reserved
        );

        // Archiving the active booking does.
        engine.archive(&mut db, fresh.id).unwrap();
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Available
        );
    }

    #[test]
    fn test_update_rejects_illegal_transition() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        engine.archive(&mut db, booking.id).unwrap();

        let err = engine.approve(&mut db, booking.id).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_update_missing_booking() {
        let mut db = create_test_database();
        let engine = engine();
        let err = engine
            .update(&mut db, 999, &BookingPatch::new().rental_price(10.0))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_and_list_read_through() {
        let mut db = create_test_database();
        let engine = engine();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();

        let found = engine.find(&db, booking.id).unwrap().unwrap();
        assert_eq!(found.id, booking.id);

        // Cached copy serves the second read.
        assert!(engine.cache.bookings.get(&booking.id).is_some());

        let listed = engine.list(&db).unwrap();
        assert_eq!(listed.len(), 1);

        assert_eq!(engine.list_for_user(&db, 7).unwrap().len(), 1);
        assert!(engine.list_for_user(&db, 8).unwrap().is_empty());
    }

    struct RecordingNotifier {
        notices: Mutex<Vec<ConfirmationNotice>>,
    }

    impl Notifier for RecordingNotifier {
        fn booking_confirmed(&self, notice: &ConfirmationNotice) -> std::result::Result<(), String> {
            self.notices.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    struct OneContact;

    impl ContactDirectory for OneContact {
        fn contact_for(&self, user_id: crate::booking::UserId) -> Option<Contact> {
            (user_id == 7).then(|| Contact {
                name: "Ana".into(),
                email: "ana@example.com".into(),
            })
        }
    }

    #[test]
    fn test_confirmation_notice_fired_on_approve() {
        let mut db = create_test_database();
        let notifier = Arc::new(RecordingNotifier {
            notices: Mutex::new(Vec::new()),
        });
        let engine = ReservationEngine::new(
            Arc::new(LockManager::new()),
            Arc::new(EngineCache::new()),
        )
        .with_notifier(Arc::clone(&notifier) as Arc<dyn Notifier>)
        .with_contacts(Arc::new(OneContact));

        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();
        engine.approve(&mut db, booking.id).unwrap();

        let notices = notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].booking_id, booking.id);
        assert_eq!(notices[0].user_email, "ana@example.com");
        assert_eq!(notices[0].event_day, day("2025-12-25"));
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn booking_confirmed(&self, _notice: &ConfirmationNotice) -> std::result::Result<(), String> {
            Err("smtp down".into())
        }
    }

    #[test]
    fn test_notifier_failure_does_not_propagate() {
        let mut db = create_test_database();
        let engine = ReservationEngine::new(
            Arc::new(LockManager::new()),
            Arc::new(EngineCache::new()),
        )
        .with_notifier(Arc::new(FailingNotifier))
        .with_contacts(Arc::new(OneContact));

        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap();

        // The transition succeeds even though delivery failed.
        let confirmed = engine.approve(&mut db, booking.id).unwrap();
        assert_eq!(confirmed.state, BookingState::Confirmed);
    }

    #[test]
    fn test_create_locked_date_is_busy() {
        let mut db = create_test_database();
        let locks = Arc::new(LockManager::new());
        let engine = ReservationEngine::new(Arc::clone(&locks), Arc::new(EngineCache::new()));
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let _held = locks.acquire(LockResource::Date(date.id)).unwrap();

        let err = engine
            .create(&mut db, CreateBookingOptions::new(7, date.id))
            .unwrap_err();
        assert!(matches!(err, Error::ResourceBusy { .. }));
    }
}
