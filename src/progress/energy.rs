//! Wall-clock energy accounting.
//!
//! Energy refills one point per refill period of real time, whether or not the
//! game is running. Nothing ticks per frame: the account stores the instant up
//! to which accrual has been credited and catches up whenever it is read,
//! consumed or saved.

use bevy::prelude::*;
use chrono::{DateTime, TimeDelta, Utc};

use super::record::EnergyRecord;

// === Constants ===

pub const DEFAULT_MAX_ENERGY: u32 = 20;

/// Seconds of real time per regenerated point.
pub const DEFAULT_REFILL_PERIOD_SECS: i64 = 300;

/// Energy spent to enter a stage.
pub const STAGE_ENERGY_COST: u32 = 5;

/// How often the live account is reconciled while the app runs (seconds).
pub const ENERGY_REFRESH_INTERVAL_SECS: f32 = 1.0;

// === Settings ===

/// Tunables for energy accounting. Hosts may insert their own before the
/// progress plugin loads save data.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergySettings {
    pub max_energy: u32,
    pub refill_period: TimeDelta,
    pub stage_cost: u32,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            max_energy: DEFAULT_MAX_ENERGY,
            refill_period: TimeDelta::seconds(DEFAULT_REFILL_PERIOD_SECS),
            stage_cost: STAGE_ENERGY_COST,
        }
    }
}

// === Account ===

/// Energy counter lazily caught up from `last_update`.
///
/// `current` never exceeds `max`. Below max, `last_update` only ever advances by
/// whole refill periods, so partial progress toward the next point survives
/// reconciliation.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct EnergyAccount {
    current: u32,
    max: u32,
    last_update: DateTime<Utc>,
    refill_period: TimeDelta,
}

impl EnergyAccount {
    /// A full account as of `now`.
    #[must_use]
    pub fn full(settings: &EnergySettings, now: DateTime<Utc>) -> Self {
        Self::with_state(
            settings.max_energy,
            settings.max_energy,
            now,
            settings.refill_period,
        )
    }

    /// Builds an account from stored values. `current` is clamped to `max`;
    /// `max` and `refill_period` are raised to usable minimums.
    #[must_use]
    pub fn with_state(
        current: u32,
        max: u32,
        last_update: DateTime<Utc>,
        refill_period: TimeDelta,
    ) -> Self {
        let max = max.max(1);
        Self {
            current: current.min(max),
            max,
            last_update,
            refill_period: refill_period.max(TimeDelta::seconds(1)),
        }
    }

    /// Restores an account from its saved form. An unparseable timestamp is
    /// replaced by `now`.
    #[must_use]
    pub fn from_record(
        record: &EnergyRecord,
        settings: &EnergySettings,
        now: DateTime<Utc>,
    ) -> Self {
        let last_update = DateTime::parse_from_rfc3339(&record.last_update)
            .map(|stamp| stamp.with_timezone(&Utc))
            .unwrap_or_else(|err| {
                warn!(
                    "Unreadable energy timestamp {:?} ({err}); starting from now",
                    record.last_update
                );
                now
            });
        Self::with_state(
            record.current,
            record.max,
            last_update,
            settings.refill_period,
        )
    }

    #[must_use]
    pub fn to_record(&self) -> EnergyRecord {
        EnergyRecord {
            current: self.current,
            max: self.max,
            last_update: self.last_update.to_rfc3339(),
        }
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub const fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Credits every whole refill period elapsed since `last_update`.
    ///
    /// At max the timestamp follows `now`. A clock that moved backwards
    /// changes nothing. Idempotent for a fixed `now`.
    pub fn reconcile(&mut self, now: DateTime<Utc>) {
        if self.is_full() {
            self.current = self.max;
            self.last_update = now;
            return;
        }

        let elapsed = now - self.last_update;
        if elapsed <= TimeDelta::zero() {
            return;
        }
        let points = elapsed.num_milliseconds() / self.refill_period.num_milliseconds();
        if points <= 0 {
            return;
        }

        let missing = i64::from(self.max - self.current);
        match (u32::try_from(points), i32::try_from(points)) {
            (Ok(gained), Ok(periods)) if points < missing => {
                self.current += gained;
                self.last_update += self.refill_period * periods;
            }
            _ => {
                self.current = self.max;
                self.last_update = now;
            }
        }
    }

    /// Spends `amount` if available after reconciling. Spending from a full
    /// account starts the refill clock at `now`. Zero always succeeds and
    /// touches nothing.
    pub fn consume(&mut self, amount: u32, now: DateTime<Utc>) -> bool {
        if amount == 0 {
            return true;
        }
        self.reconcile(now);
        if self.current < amount {
            return false;
        }
        if self.is_full() {
            self.last_update = now;
        }
        self.current -= amount;
        true
    }

    /// Time left until the next point, zero when full.
    #[must_use]
    pub fn time_until_next(&self, now: DateTime<Utc>) -> TimeDelta {
        if self.is_full() {
            return TimeDelta::zero();
        }
        (self.refill_period - (now - self.last_update)).max(TimeDelta::zero())
    }
}

// === Systems ===

/// Cadence of live reconciliation.
#[derive(Resource, Debug, Clone)]
pub(super) struct EnergyRefreshTimer(pub Timer);

impl Default for EnergyRefreshTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            ENERGY_REFRESH_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

/// Keeps the live account current once per second of real time.
pub(super) fn refresh_energy(
    time: Res<Time<Real>>,
    mut timer: ResMut<EnergyRefreshTimer>,
    account: Option<ResMut<EnergyAccount>>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    if let Some(mut account) = account {
        account.reconcile(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn period() -> TimeDelta {
        TimeDelta::seconds(DEFAULT_REFILL_PERIOD_SECS)
    }

    fn account(current: u32, at: DateTime<Utc>) -> EnergyAccount {
        EnergyAccount::with_state(current, DEFAULT_MAX_ENERGY, at, period())
    }

    #[test]
    fn reconcile_credits_whole_periods_and_keeps_remainder() {
        let mut energy = account(10, t0());
        energy.reconcile(t0() + TimeDelta::seconds(650));

        assert_eq!(energy.current(), 12);
        assert_eq!(energy.last_update(), t0() + TimeDelta::seconds(600));
    }

    #[test]
    fn reconcile_is_idempotent_at_fixed_now() {
        let now = t0() + TimeDelta::seconds(1234);
        let mut energy = account(3, t0());
        energy.reconcile(now);
        let once = energy.clone();
        energy.reconcile(now);

        assert_eq!(energy, once);
    }

    #[test]
    fn reconcile_before_a_full_period_changes_nothing() {
        let mut energy = account(10, t0());
        energy.reconcile(t0() + TimeDelta::seconds(299));

        assert_eq!(energy, account(10, t0()));
    }

    #[test]
    fn reconcile_saturates_at_max() {
        let now = t0() + TimeDelta::hours(10);
        let mut energy = account(1, t0());
        energy.reconcile(now);

        assert_eq!(energy.current(), DEFAULT_MAX_ENERGY);
        assert_eq!(energy.last_update(), now);
    }

    #[test]
    fn reconcile_exactly_to_max_sets_timestamp_to_now() {
        let now = t0() + TimeDelta::seconds(650);
        let mut energy = account(18, t0());
        energy.reconcile(now);

        assert_eq!(energy.current(), 20);
        assert_eq!(energy.last_update(), now);
    }

    #[test]
    fn reconcile_at_max_tracks_now() {
        let now = t0() + TimeDelta::seconds(42);
        let mut energy = account(20, t0());
        energy.reconcile(now);

        assert_eq!(energy.current(), 20);
        assert_eq!(energy.last_update(), now);
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut energy = account(5, t0());
        energy.reconcile(t0() - TimeDelta::hours(3));

        assert_eq!(energy, account(5, t0()));
    }

    #[test]
    fn consume_from_full_restarts_clock() {
        let mut energy = account(20, t0() - TimeDelta::hours(5));

        assert!(energy.consume(5, t0()));
        assert_eq!(energy.current(), 15);
        assert_eq!(energy.last_update(), t0());
    }

    #[test]
    fn consume_below_max_keeps_partial_progress() {
        let mut energy = account(10, t0());

        assert!(energy.consume(5, t0() + TimeDelta::seconds(100)));
        assert_eq!(energy.current(), 5);
        assert_eq!(energy.last_update(), t0());
    }

    #[test]
    fn consume_counts_regenerated_points() {
        let mut energy = account(3, t0());

        assert!(energy.consume(5, t0() + TimeDelta::seconds(600)));
        assert_eq!(energy.current(), 0);
    }

    #[test]
    fn consume_rejects_overdraft_without_spending() {
        let mut energy = account(4, t0());

        assert!(!energy.consume(5, t0()));
        assert_eq!(energy, account(4, t0()));
    }

    #[test]
    fn consume_zero_never_mutates() {
        let stale = t0() - TimeDelta::days(2);
        let mut energy = account(0, stale);

        assert!(energy.consume(0, t0()));
        assert_eq!(energy, account(0, stale));
    }

    #[test]
    fn time_until_next_point() {
        let energy = account(10, t0());
        assert_eq!(
            energy.time_until_next(t0() + TimeDelta::seconds(120)),
            TimeDelta::seconds(180)
        );
        assert_eq!(
            energy.time_until_next(t0() + TimeDelta::seconds(900)),
            TimeDelta::zero()
        );
        assert_eq!(account(20, t0()).time_until_next(t0()), TimeDelta::zero());
    }

    #[test]
    fn with_state_clamps_to_max() {
        let energy = EnergyAccount::with_state(50, 20, t0(), period());
        assert_eq!(energy.current(), 20);
    }

    #[test]
    fn record_keeps_timestamp() {
        let energy = account(7, t0());
        let restored =
            EnergyAccount::from_record(&energy.to_record(), &EnergySettings::default(), t0());

        assert_eq!(restored, energy);
    }

    #[test]
    fn unreadable_timestamp_starts_from_now() {
        let record = EnergyRecord {
            current: 7,
            max: 20,
            last_update: "yesterday-ish".to_string(),
        };
        let now = t0() + TimeDelta::seconds(5);
        let restored = EnergyAccount::from_record(&record, &EnergySettings::default(), now);

        assert_eq!(restored.current(), 7);
        assert_eq!(restored.last_update(), now);
    }
}
