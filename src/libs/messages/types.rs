#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleCredentials,
    ConfigModuleDefaults,

    // === CREDENTIAL MESSAGES ===
    CredentialsValidated,
    CredentialsSaved(String),    // path
    CredentialsInvalid(String),  // error
    CredentialsMissing,

    // === PROMPTS ===
    PromptClientId,
    PromptClientSecret,
    PromptGuildUrl,
    PromptDifficulty,
    PromptWorkers,
    PromptRequestTimeout,

    // === RUN INPUT MESSAGES ===
    GuildUrlMissing,
    InvalidDate(String),
    InvalidDateRange(String, String), // from, to
    NoTargetsGiven,

    // === RUN PROGRESS MESSAGES ===
    FetchingReports(u64, String, String), // guild id, from, to
    JobsProgress(usize, usize),           // completed, total
    RunSummary {
        rows: usize,
        players: usize,
        reports: usize,
    },
    NoDataInRange,
    NoDataForTarget(String),

    // === RESULT MESSAGES ===
    TableHeading(String, String),   // metric, target label
    SummaryHeading(String, String), // metric, boss
    LogLinksHeading,
    NoPlayersMatch(String),

    // === EXPORT MESSAGES ===
    ExportCompleted(String),

    // === BOSS CATALOG MESSAGES ===
    AbilityAdded {
        ability_id: u64,
        label: String,
        boss: String,
    },
    AbilityNameLookupFailed(u64),
    BossCatalogEmpty,
}
