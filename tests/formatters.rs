#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use raidtally::commands::run::resolve_window;
    use raidtally::libs::formatter::*;
    use raidtally::libs::target::{Metric, Target};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pull_labels() {
        assert_eq!(format_pull_label(date(2025, 7, 2), 14), "02/07 (14 pulls)");
        assert_eq!(format_pull_label(date(2025, 12, 31), 0), "31/12 (0 pulls)");
        assert_eq!(format_total_label(25), "Total (25 pulls)");
    }

    #[test]
    fn test_damage_values_are_grouped() {
        assert_eq!(format_value(Metric::DamageTaken, 0), "0");
        assert_eq!(format_value(Metric::DamageTaken, 999), "999");
        assert_eq!(format_value(Metric::DamageTaken, 1000), "1 000");
        assert_eq!(format_value(Metric::DamageTaken, 1_234_567), "1 234 567");
        assert_eq!(format_value(Metric::DamageTaken, -45_000), "-45 000");
        assert_eq!(format_value(Metric::Deaths, 1234), "1234");
    }

    #[test]
    fn test_ability_captions() {
        assert_eq!(ability_caption(None, Some("ignored")), ALL_ABILITIES);
        assert_eq!(ability_caption(Some(1227472), Some("Besiege")), "1227472 (Besiege)");
        assert_eq!(ability_caption(Some(1227472), None), "1227472");

        let target = Target::new("Soulhunters", 3122, Some(1227117));
        assert_eq!(target_label(&target, Some("Fel Devastation")), "Soulhunters — 1227117 (Fel Devastation)");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Nexus-King Salhadaar"), "nexus_king_salhadaar");
        assert_eq!(slugify("Loom'ithar"), "loom_ithar");
        assert_eq!(slugify("  Dimensius, the All-Devouring  "), "dimensius_the_all_devouring");
        assert_eq!(slugify("!!!"), "boss");
    }

    #[test]
    fn test_export_stems() {
        let target = Target::all_abilities("Forgeweaver Araz", 3132);
        assert_eq!(TableScope::of(&target), TableScope::AllAbilities);
        assert_eq!(
            export_stem(Metric::Deaths, "Forgeweaver Araz", TableScope::of(&target)),
            "warcraftlogs_deaths_forgeweaver_araz_all"
        );
        assert_eq!(
            export_stem(Metric::DamageTaken, "Fractillus", TableScope::Ability(1230163)),
            "warcraftlogs_damage_taken_fractillus_1230163"
        );
        assert_eq!(
            export_stem(Metric::Deaths, "Fractillus", TableScope::Summary),
            "warcraftlogs_deaths_fractillus_summary"
        );
    }

    #[test]
    fn test_window_defaults_to_last_seven_days() {
        let (start, end) = resolve_window(None, None, date(2025, 7, 9)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 7, 3, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 7, 9, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_window_from_explicit_dates() {
        let (start, end) = resolve_window(Some("2025-07-01"), Some("2025-07-02"), date(2025, 8, 1)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 7, 2, 23, 59, 59).unwrap());

        let (start, end) = resolve_window(Some("2025-07-05"), Some("2025-07-05"), date(2025, 8, 1)).unwrap();
        assert!(start < end);
    }

    #[test]
    fn test_window_rejects_bad_input() {
        assert!(resolve_window(Some("07/01/2025"), None, date(2025, 7, 9)).is_err());
        assert!(resolve_window(Some("2025-07-09"), Some("2025-07-01"), date(2025, 7, 9)).is_err());
    }
}
