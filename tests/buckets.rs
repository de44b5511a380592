#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use raidtally::libs::buckets::select_best_per_date;
    use raidtally::libs::report::Report;

    fn report(code: &str, day: u32, start_hour: u32, minutes: i64) -> Report {
        let start = Utc.with_ymd_and_hms(2025, 7, day, start_hour, 0, 0).unwrap();
        Report {
            code: code.to_string(),
            title: format!("Raid {}", code),
            start_time: start,
            end_time: start + chrono::Duration::minutes(minutes),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(select_best_per_date(&[]).is_empty());
    }

    #[test]
    fn test_longest_report_wins_per_date() {
        let reports = vec![report("A", 2, 19, 20), report("B", 2, 20, 40), report("C", 3, 19, 90)];
        let selected = select_best_per_date(&reports);

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].0, date(2));
        assert_eq!(selected[0].1.code, "B");
        assert_eq!(selected[1].0, date(3));
        assert_eq!(selected[1].1.code, "C");
    }

    #[test]
    fn test_one_entry_per_distinct_date_in_ascending_order() {
        let reports = vec![
            report("X", 9, 19, 60),
            report("Y", 2, 19, 60),
            report("Z", 5, 19, 60),
            report("W", 5, 21, 30),
            report("V", 2, 22, 10),
        ];
        let selected = select_best_per_date(&reports);

        let dates: Vec<NaiveDate> = selected.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, vec![date(2), date(5), date(9)]);
        for (d, r) in &selected {
            let best = reports.iter().filter(|x| x.date() == *d).map(|x| x.duration()).max().unwrap();
            assert_eq!(r.duration(), best);
        }
    }

    #[test]
    fn test_equal_durations_pick_smallest_code_regardless_of_order() {
        let forward = vec![report("bbb", 4, 19, 45), report("aaa", 4, 21, 45)];
        let backward: Vec<Report> = forward.iter().rev().cloned().collect();

        assert_eq!(select_best_per_date(&forward)[0].1.code, "aaa");
        assert_eq!(select_best_per_date(&backward)[0].1.code, "aaa");
    }

    #[test]
    fn test_negative_duration_counts_as_zero() {
        let mut broken = report("broken", 6, 19, 0);
        broken.end_time = broken.start_time - chrono::Duration::minutes(30);
        let short = report("short", 6, 20, 1);

        let selected = select_best_per_date(&[broken, short]);
        assert_eq!(selected[0].1.code, "short");
    }

    #[test]
    fn test_date_is_taken_from_utc_start() {
        // starts 23:00 UTC and runs past midnight
        let late = report("late", 7, 23, 120);
        let selected = select_best_per_date(&[late]);
        assert_eq!(selected[0].0, date(7));
    }
}
