use chrono::NaiveDate;

use shared::{Expense, Tracker, TrackerStats};

/// Round to two decimal places, half away from zero. Applied at output only,
/// never to intermediate sums.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Budget-pacing metrics for a tracker, as a pure function of the tracker,
/// its expenses, and the reference date.
///
/// `remaining_days` clamps the days-until-end at zero and then adds one, so
/// a tracker whose end date has passed still reports one remaining day.
/// That matches the long-observed behavior of this endpoint; clients treat
/// it as "the current day is always spendable".
pub fn compute_stats(tracker: &Tracker, expenses: &[Expense], today: NaiveDate) -> TrackerStats {
    let remaining_days = (tracker.end_date - today).num_days().max(0) + 1;

    let elapsed_end = today.min(tracker.end_date);
    let elapsed_days = if elapsed_end < tracker.start_date {
        0
    } else {
        (elapsed_end - tracker.start_date).num_days() + 1
    };

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let todays: f64 = expenses
        .iter()
        .filter(|e| e.date == today)
        .map(|e| e.amount)
        .sum();

    let total_expenditure = round2(total);
    let todays_expenditure = round2(todays);

    let average_expenditure_per_day = if elapsed_days > 0 {
        round2(total_expenditure / elapsed_days as f64)
    } else {
        0.0
    };

    let target_expenditure_per_day = if remaining_days > 0 {
        round2((tracker.budget - total_expenditure) / remaining_days as f64)
    } else {
        0.0
    };

    TrackerStats {
        start_date: tracker.start_date,
        end_date: tracker.end_date,
        budget: round2(tracker.budget),
        remaining_days,
        target_expenditure_per_day,
        average_expenditure_per_day,
        total_expenditure,
        todays_expenditure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn tracker(start: NaiveDate, end: NaiveDate, budget: f64) -> Tracker {
        Tracker {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            budget,
            name: "Test".to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn expense(tracker: &Tracker, amount: f64, date: NaiveDate) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            tracker_id: tracker.id,
            description: "Item".to_string(),
            amount,
            date,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(8.004), 8.0);
        assert_eq!(round2(8.006), 8.01);
        assert_eq!(round2(-8.006), -8.01);
        // 8.005 sits on a midpoint whose nearest f64 is just above it.
        assert_eq!(round2(8.005), 8.01);
        assert_eq!(round2(8.015000000001), 8.02);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(60.0 / 6.0), 10.0);
    }

    #[test]
    fn test_stats_mid_period() {
        let t = tracker(date(2025, 1, 1), date(2025, 1, 10), 100.0);
        let today = date(2025, 1, 5);
        let expenses = vec![
            expense(&t, 12.5, date(2025, 1, 1)),
            expense(&t, 17.5, date(2025, 1, 3)),
            expense(&t, 10.0, date(2025, 1, 5)),
        ];

        let stats = compute_stats(&t, &expenses, today);

        // average 40 / 5 elapsed days = 8.00, so elapsed_days = 5
        assert_eq!(stats.remaining_days, 6);
        assert_eq!(stats.total_expenditure, 40.0);
        assert_eq!(stats.todays_expenditure, 10.0);
        assert_eq!(stats.average_expenditure_per_day, 8.0);
        assert_eq!(stats.target_expenditure_per_day, 10.0);
        assert_eq!(stats.budget, 100.0);
    }

    #[test]
    fn test_stats_before_period_starts() {
        let t = tracker(date(2025, 2, 1), date(2025, 2, 28), 500.0);
        let today = date(2025, 1, 15);

        let stats = compute_stats(&t, &[], today);

        // No elapsed days yet, so no average.
        assert_eq!(stats.average_expenditure_per_day, 0.0);
        assert_eq!(stats.remaining_days, 45);
        assert_eq!(stats.total_expenditure, 0.0);
    }

    #[test]
    fn test_stats_after_period_ended() {
        let t = tracker(date(2025, 1, 1), date(2025, 1, 10), 100.0);
        let today = date(2025, 1, 20);
        let expenses = vec![expense(&t, 80.0, date(2025, 1, 5))];

        let stats = compute_stats(&t, &expenses, today);

        // Clamp-then-add-one keeps one remaining day after the end date.
        assert_eq!(stats.remaining_days, 1);
        assert_eq!(stats.target_expenditure_per_day, 20.0);
        // Elapsed days stop accruing at the end date.
        assert_eq!(stats.average_expenditure_per_day, 8.0);
        assert_eq!(stats.todays_expenditure, 0.0);
    }

    #[test]
    fn test_stats_single_day_tracker() {
        let t = tracker(date(2025, 1, 5), date(2025, 1, 5), 50.0);
        let today = date(2025, 1, 5);
        let expenses = vec![expense(&t, 20.0, today)];

        let stats = compute_stats(&t, &expenses, today);

        assert_eq!(stats.remaining_days, 1);
        assert_eq!(stats.average_expenditure_per_day, 20.0);
        assert_eq!(stats.target_expenditure_per_day, 30.0);
        assert_eq!(stats.todays_expenditure, 20.0);
    }

    #[test]
    fn test_stats_rounding_at_output_only() {
        let t = tracker(date(2025, 1, 1), date(2025, 1, 3), 10.0);
        let today = date(2025, 1, 3);
        // Three amounts that individually round but must be summed first.
        let expenses = vec![
            expense(&t, 1.111, date(2025, 1, 1)),
            expense(&t, 1.111, date(2025, 1, 2)),
            expense(&t, 1.111, date(2025, 1, 3)),
        ];

        let stats = compute_stats(&t, &expenses, today);

        assert_eq!(stats.total_expenditure, 3.33);
        assert_eq!(stats.average_expenditure_per_day, 1.11);
    }
}
