//! Conflict detection and slot availability over a day's bookings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::appointments::Appointment;
use crate::interval::{ClockTime, TimeInterval};

/// Bookable window of the salon day.
///
/// `close` is the end of the last bookable interval: a booking may end
/// exactly at closing but never after it.
#[derive(Clone, Copy, Debug)]
pub struct WorkingHours {
    pub open: ClockTime,
    pub close: ClockTime,
    pub grid_step_minutes: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            // Salon opens at 09:00; the last booking must end by 20:30.
            open: ClockTime::at(9, 0),
            close: ClockTime::at(20, 30),
            grid_step_minutes: 30,
        }
    }
}

impl WorkingHours {
    /// Candidate start times, `grid_step_minutes` apart, from opening up to
    /// (excluding) closing.
    pub fn grid(&self) -> Vec<ClockTime> {
        let mut slots = Vec::new();
        let mut current = self.open;
        while current < self.close {
            slots.push(current);
            current = match current.advanced_by(self.grid_step_minutes) {
                Some(next) => next,
                None => break,
            };
        }
        slots
    }
}

/// How a grid start time classifies for a candidate booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Free, and the full duration fits before closing and before the next
    /// booking.
    Available,
    /// The start time sits inside one of the queried provider's bookings.
    BusySelf,
    /// The start time sits inside another provider's booking.
    BusyOther,
    /// Free start, but the duration does not fit: it would run past closing
    /// or into the next booking.
    NotEnoughTime,
}

/// One classified entry of the availability grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub time: ClockTime,
    pub status: SlotStatus,
}

fn active_on_day<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
) -> impl Iterator<Item = &'a Appointment> {
    appointments
        .iter()
        .filter(move |a| a.date == date && a.is_active())
}

/// Returns the first active booking of `provider_id` on `date` whose interval
/// overlaps `candidate`, if any.
///
/// Cancelled bookings are skipped, so a freed slot is immediately reusable.
pub fn find_conflict<'a>(
    appointments: &'a [Appointment],
    provider_id: &str,
    date: NaiveDate,
    candidate: TimeInterval,
) -> Option<&'a Appointment> {
    active_on_day(appointments, date)
        .filter(|a| a.provider_id == provider_id)
        .find(|a| a.interval().overlaps(candidate))
}

/// Classifies every grid start time for booking `duration_minutes` with
/// `provider_id` on `date`.
///
/// Busy wins over everything: a start sitting inside an existing booking is
/// reported busy even when the duration would also run past closing. Other
/// providers' bookings only ever surface as [`SlotStatus::BusyOther`]; they
/// never shrink the queried provider's free gaps.
pub fn classify_slots(
    appointments: &[Appointment],
    hours: &WorkingHours,
    provider_id: &str,
    date: NaiveDate,
    duration_minutes: u32,
) -> Vec<Slot> {
    let day: Vec<&Appointment> = active_on_day(appointments, date).collect();

    hours
        .grid()
        .into_iter()
        .map(|time| Slot {
            time,
            status: classify_one(&day, hours, provider_id, time, duration_minutes),
        })
        .collect()
}

fn classify_one(
    day: &[&Appointment],
    hours: &WorkingHours,
    provider_id: &str,
    time: ClockTime,
    duration_minutes: u32,
) -> SlotStatus {
    let start_minute = u32::from(time.minutes());

    let occupied_by_self = day
        .iter()
        .any(|a| a.provider_id == provider_id && a.interval().contains_minute(start_minute));
    if occupied_by_self {
        return SlotStatus::BusySelf;
    }
    let occupied_by_other = day
        .iter()
        .any(|a| a.provider_id != provider_id && a.interval().contains_minute(start_minute));
    if occupied_by_other {
        return SlotStatus::BusyOther;
    }

    let candidate = time.interval(duration_minutes);
    if candidate.end() > u32::from(hours.close.minutes()) {
        return SlotStatus::NotEnoughTime;
    }

    // The start is free; the duration still has to fit in the gap before the
    // provider's next booking.
    let runs_into_next = day
        .iter()
        .filter(|a| a.provider_id == provider_id)
        .any(|a| a.interval().overlaps(candidate));
    if runs_into_next {
        return SlotStatus::NotEnoughTime;
    }

    SlotStatus::Available
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::appointments::AppointmentStatus;
    use crate::money::Money;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn booking(provider: &str, time: &str, duration: u32, status: AppointmentStatus) -> Appointment {
        let stamp = Utc.timestamp_opt(0, 0).unwrap();
        Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id: provider.to_string(),
            provider_name: String::new(),
            date: date(),
            time: time.parse().unwrap(),
            duration_minutes: duration,
            service_id: None,
            service_name: "Маникюр".to_string(),
            price: Money::new(100_000),
            client_name: "Ирина".to_string(),
            status,
            finance_recorded: false,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn status_at(slots: &[Slot], time: &str) -> SlotStatus {
        let time: ClockTime = time.parse().unwrap();
        slots
            .iter()
            .find(|s| s.time == time)
            .unwrap_or_else(|| panic!("no slot {time}"))
            .status
    }

    #[test]
    fn grid_covers_opening_to_last_half_hour() {
        let hours = WorkingHours::default();
        let grid = hours.grid();
        assert_eq!(grid.first().unwrap().to_string(), "09:00");
        assert_eq!(grid.last().unwrap().to_string(), "20:00");
        assert_eq!(grid.len(), 23);
    }

    #[test]
    fn conflict_finds_overlapping_booking() {
        let day = vec![booking("anna", "10:00", 60, AppointmentStatus::Scheduled)];

        let overlapping: ClockTime = "10:30".parse().unwrap();
        assert!(find_conflict(&day, "anna", date(), overlapping.interval(60)).is_some());

        // Same time, different provider: no conflict.
        assert!(find_conflict(&day, "maria", date(), overlapping.interval(60)).is_none());

        // Touching intervals are free.
        let adjacent: ClockTime = "11:00".parse().unwrap();
        assert!(find_conflict(&day, "anna", date(), adjacent.interval(60)).is_none());
    }

    #[test]
    fn cancelled_bookings_release_their_slot() {
        let day = vec![booking("anna", "10:00", 60, AppointmentStatus::Cancelled)];
        let candidate: ClockTime = "10:00".parse().unwrap();
        assert!(find_conflict(&day, "anna", date(), candidate.interval(60)).is_none());
    }

    #[test]
    fn classification_around_one_booking() {
        let day = vec![booking("anna", "10:00", 60, AppointmentStatus::Scheduled)];
        let slots = classify_slots(&day, &WorkingHours::default(), "anna", date(), 30);

        assert_eq!(status_at(&slots, "09:30"), SlotStatus::Available);
        assert_eq!(status_at(&slots, "10:00"), SlotStatus::BusySelf);
        assert_eq!(status_at(&slots, "10:30"), SlotStatus::BusySelf);
        assert_eq!(status_at(&slots, "11:00"), SlotStatus::Available);

        let for_maria = classify_slots(&day, &WorkingHours::default(), "maria", date(), 30);
        assert_eq!(status_at(&for_maria, "10:00"), SlotStatus::BusyOther);
        assert_eq!(status_at(&for_maria, "09:30"), SlotStatus::Available);
    }

    #[test]
    fn duration_must_fit_before_closing() {
        let slots = classify_slots(&[], &WorkingHours::default(), "anna", date(), 60);
        assert_eq!(status_at(&slots, "19:30"), SlotStatus::Available);
        assert_eq!(status_at(&slots, "20:00"), SlotStatus::NotEnoughTime);

        let short = classify_slots(&[], &WorkingHours::default(), "anna", date(), 30);
        assert_eq!(status_at(&short, "20:00"), SlotStatus::Available);
    }

    #[test]
    fn duration_must_fit_before_next_booking() {
        let day = vec![booking("anna", "10:30", 60, AppointmentStatus::Scheduled)];
        let slots = classify_slots(&day, &WorkingHours::default(), "anna", date(), 60);

        // 10:00 is a free start but only thirty minutes remain until 10:30.
        assert_eq!(status_at(&slots, "10:00"), SlotStatus::NotEnoughTime);
        assert_eq!(status_at(&slots, "09:30"), SlotStatus::Available);

        // Another provider's booking does not eat the gap.
        let other_day = vec![booking("maria", "10:30", 60, AppointmentStatus::Scheduled)];
        let slots = classify_slots(&other_day, &WorkingHours::default(), "anna", date(), 60);
        assert_eq!(status_at(&slots, "10:00"), SlotStatus::Available);
    }

    #[test]
    fn busy_wins_over_closing_boundary() {
        let day = vec![booking("anna", "19:45", 60, AppointmentStatus::Scheduled)];
        let slots = classify_slots(&day, &WorkingHours::default(), "anna", date(), 60);
        assert_eq!(status_at(&slots, "20:00"), SlotStatus::BusySelf);
    }
}
