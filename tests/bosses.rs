#[cfg(test)]
mod tests {
    use raidtally::libs::bosses::{BossCatalog, BOSSES_FILE_NAME};
    use raidtally::libs::data_storage::DataStorage;
    use raidtally::libs::target::Target;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    static HOME_LOCK: Mutex<()> = Mutex::new(());

    struct BossesTestContext {
        _guard: MutexGuard<'static, ()>,
        _temp_dir: TempDir,
        catalog: BossCatalog,
    }

    impl TestContext for BossesTestContext {
        fn setup() -> Self {
            let guard = HOME_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            BossesTestContext {
                _guard: guard,
                _temp_dir: temp_dir,
                catalog: BossCatalog::builtin(),
            }
        }
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_missing_file_reads_builtin(ctx: &mut BossesTestContext) {
        let catalog = BossCatalog::read().unwrap();
        assert_eq!(catalog, ctx.catalog);
        assert!(!DataStorage::new().get_path(BOSSES_FILE_NAME).unwrap().exists());
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_add_ability_persists(ctx: &mut BossesTestContext) {
        ctx.catalog.add_ability("Soulbinder Naazindhri", 3129, 1225616, "Soulfire Convergence");
        ctx.catalog.add_ability("Soulbinder Naazindhri", 3129, 1225616, "Soulfire Convergence (orbs)");
        ctx.catalog.save().unwrap();

        let loaded = BossCatalog::read().unwrap();
        let (_, entry) = loaded.find("soulbinder naazindhri").unwrap();
        assert_eq!(entry.abilities, vec![1225616]);
        assert_eq!(loaded.ability_name(1225616), Some("Soulfire Convergence (orbs)"));
        assert_eq!(loaded.ability_name(1227472), Some("Besiege"));
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_find_by_name_or_id(ctx: &mut BossesTestContext) {
        assert_eq!(ctx.catalog.find("FRACTILLUS").unwrap().1.id, 3135);
        assert_eq!(ctx.catalog.find("3134").unwrap().0, "Nexus-King Salhadaar");
        assert!(ctx.catalog.find("Ragnaros").is_none());
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_parse_targets(ctx: &mut BossesTestContext) {
        let catalog = &ctx.catalog;

        assert_eq!(catalog.parse_targets("Fractillus").unwrap(), vec![Target::all_abilities("Fractillus", 3135)]);
        assert_eq!(
            catalog.parse_targets("3134:1227472, all").unwrap(),
            vec![
                Target::new("Nexus-King Salhadaar", 3134, Some(1227472)),
                Target::all_abilities("Nexus-King Salhadaar", 3134),
            ]
        );

        let tracked = catalog.parse_targets("Loom'ithar:tracked").unwrap();
        assert_eq!(tracked.len(), 3);
        assert!(tracked.iter().all(|t| t.boss_id == 3123 && t.ability_id.is_some()));
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_repeated_targets_are_kept_once(ctx: &mut BossesTestContext) {
        let inputs = vec![
            "Fractillus:1230163".to_string(),
            "fractillus:1230163,1247424".to_string(),
            "3135:1230163".to_string(),
        ];
        let targets = ctx.catalog.parse_target_list(&inputs).unwrap();

        assert_eq!(
            targets,
            vec![Target::new("Fractillus", 3135, Some(1230163)), Target::new("Fractillus", 3135, Some(1247424))]
        );
        assert!(ctx.catalog.parse_target_list(&["Ragnaros".to_string()]).is_err());
    }

    #[test_context(BossesTestContext)]
    #[test]
    fn test_parse_targets_rejects_bad_input(ctx: &mut BossesTestContext) {
        assert!(ctx.catalog.parse_targets("Ragnaros").is_err());
        assert!(ctx.catalog.parse_targets("Fractillus:fracture").is_err());
        assert!(ctx.catalog.parse_targets("Fractillus:").is_err());
        // no tracked abilities yet
        assert!(ctx.catalog.parse_targets("Dimensius, the All-Devouring:tracked").is_err());
    }
}
