//! User-facing text of every [`Message`].
//!
//! All wording lives in this one `match`, so commands only pick a variant
//! and pass its parameters.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration and stored credentials removed".to_string(),
            Message::ConfigModuleCredentials => {
                "Warcraft Logs API client (create one at https://www.warcraftlogs.com/api/clients/)".to_string()
            }
            Message::ConfigModuleDefaults => "Defaults for `raidtally run`".to_string(),

            // === CREDENTIAL MESSAGES ===
            Message::CredentialsValidated => "Credentials accepted by Warcraft Logs".to_string(),
            Message::CredentialsSaved(path) => format!("Credentials saved to {}", path),
            Message::CredentialsInvalid(error) => format!("Warcraft Logs rejected the credentials: {}", error),
            Message::CredentialsMissing => "WCL_CLIENT_ID and WCL_CLIENT_SECRET are not set. Run `raidtally init` or export them".to_string(),

            // === PROMPTS ===
            Message::PromptClientId => "Enter your Warcraft Logs client ID".to_string(),
            Message::PromptClientSecret => "Enter your Warcraft Logs client secret".to_string(),
            Message::PromptGuildUrl => "Enter the default guild URL (optional)".to_string(),
            Message::PromptDifficulty => "Enter the difficulty id (5 = Mythic)".to_string(),
            Message::PromptWorkers => "Enter the number of parallel workers".to_string(),
            Message::PromptRequestTimeout => "Enter the per-request timeout (seconds)".to_string(),

            // === RUN INPUT MESSAGES ===
            Message::GuildUrlMissing => "No guild given. Pass --guild or set a default with `raidtally init`".to_string(),
            Message::InvalidDate(input) => format!("Invalid date '{}', expected YYYY-MM-DD", input),
            Message::InvalidDateRange(from, to) => format!("Start date {} is after end date {}", from, to),
            Message::NoTargetsGiven => "No targets given. Pass at least one --target".to_string(),

            // === RUN PROGRESS MESSAGES ===
            Message::FetchingReports(guild_id, from, to) => format!("Fetching reports for guild {} from {} to {}", guild_id, from, to),
            Message::JobsProgress(completed, total) => format!("Processing jobs: {}/{}", completed, total),
            Message::RunSummary { rows, players, reports } => {
                format!("Found {} report-day entries across {} players from {} reports.", rows, players, reports)
            }
            Message::NoDataInRange => "No pulls found for the selected targets in this date range".to_string(),
            Message::NoDataForTarget(target) => format!("No data for {}", target),

            // === RESULT MESSAGES ===
            Message::TableHeading(metric, target) => format!("{}: {}", metric, target),
            Message::SummaryHeading(metric, boss) => format!("{}: {} (boss summary, all abilities)", metric, boss),
            Message::LogLinksHeading => "Logs used:".to_string(),
            Message::NoPlayersMatch(search) => format!("No players match '{}'", search),

            // === EXPORT MESSAGES ===
            Message::ExportCompleted(path) => format!("Data exported successfully to: {}", path),

            // === BOSS CATALOG MESSAGES ===
            Message::AbilityAdded { ability_id, label, boss } => format!("Ability {} ({}) added to {}", ability_id, label, boss),
            Message::AbilityNameLookupFailed(id) => format!("Could not look up the name of ability {}, storing the id only", id),
            Message::BossCatalogEmpty => "The boss catalog is empty".to_string(),
        };

        write!(f, "{}", text)
    }
}
