use crate::{
    api::{WarcraftLogs, WclCredentials},
    libs::{bosses::BossCatalog, config::Config, messages::Message, view::View},
    msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct BossesArgs {
    #[command(subcommand)]
    command: BossesCommand,
}

#[derive(Debug, Subcommand)]
enum BossesCommand {
    #[command(about = "Show known bosses and tracked abilities")]
    List,
    #[command(about = "Track an ability of a boss")]
    Add(AddArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Boss name as it should appear in tables
    #[arg(short, long)]
    boss: String,

    /// Warcraft Logs encounter id
    #[arg(long)]
    boss_id: u32,

    /// Ability (spell) id
    #[arg(short, long)]
    ability: u64,

    /// Ability label; looked up through the API when omitted
    #[arg(short, long)]
    label: Option<String>,
}

pub async fn cmd(args: BossesArgs) -> Result<()> {
    match args.command {
        BossesCommand::List => {
            let catalog = BossCatalog::read()?;
            if catalog.bosses.is_empty() {
                msg_info!(Message::BossCatalogEmpty);
                return Ok(());
            }
            View::bosses(&catalog)
        }
        BossesCommand::Add(add) => {
            let label = match add.label {
                Some(label) => label,
                None => lookup_label(add.ability).await,
            };

            let mut catalog = BossCatalog::read()?;
            catalog.add_ability(&add.boss, add.boss_id, add.ability, &label);
            catalog.save()?;

            msg_success!(Message::AbilityAdded {
                ability_id: add.ability,
                label,
                boss: add.boss,
            });
            Ok(())
        }
    }
}

/// Ability name from the API, or the bare id when the lookup fails.
async fn lookup_label(ability_id: u64) -> String {
    let name = async {
        let client = WarcraftLogs::new(&Config::read()?, WclCredentials::from_env()?)?;
        anyhow::Ok(client.lookup_ability_name(ability_id).await?)
    }
    .await;

    match name {
        Ok(Some(name)) => name,
        Ok(None) | Err(_) => {
            msg_warning!(Message::AbilityNameLookupFailed(ability_id));
            ability_id.to_string()
        }
    }
}
