//! Interactive first-time setup.
//!
//! Asks for the Warcraft Logs client credentials, checks them by requesting
//! a token, stores them in the `.env` of the application data directory and
//! then collects the defaults used by `raidtally run`.

use crate::{
    api::{
        wcl::{CLIENT_ID_VAR, CLIENT_SECRET_VAR, ENV_FILE_NAME},
        WarcraftLogs, WclCredentials,
    },
    libs::{
        bosses::BOSSES_FILE_NAME,
        config::{Config, CONFIG_FILE_NAME},
        data_storage::DataStorage,
        messages::Message,
    },
    msg_bail_anyhow, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove the stored configuration, boss catalog and credentials
    #[arg(short, long)]
    delete: bool,

    /// Keep the stored credentials and only edit the run defaults
    #[arg(long)]
    skip_credentials: bool,
}

pub async fn cmd(init_args: InitArgs) -> Result<()> {
    let storage = DataStorage::new();

    if init_args.delete {
        for name in [CONFIG_FILE_NAME, BOSSES_FILE_NAME, ENV_FILE_NAME] {
            let path = storage.get_path(name)?;
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        msg_success!(Message::ConfigDeleted);
        return Ok(());
    }

    let config = Config::read().unwrap_or_default();

    if !init_args.skip_credentials {
        msg_print!(Message::ConfigModuleCredentials);
        let current = WclCredentials::from_env().ok();
        let client_id: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptClientId.to_string())
            .default(current.map(|c| c.client_id).unwrap_or_default())
            .interact_text()?;
        let client_secret = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptClientSecret.to_string())
            .interact()?;
        let credentials = WclCredentials::new(client_id.trim(), client_secret.trim());

        let client = WarcraftLogs::new(&config, credentials.clone())?;
        if let Err(e) = client.token().await {
            msg_bail_anyhow!(Message::CredentialsInvalid(e.to_string()));
        }
        msg_success!(Message::CredentialsValidated);

        let env_path = storage.get_path(ENV_FILE_NAME)?;
        write_env_file(&env_path, &credentials)?;
        msg_success!(Message::CredentialsSaved(env_path.display().to_string()));
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}

/// Writes the credentials as `KEY=value` lines readable by `dotenv`.
pub fn write_env_file(path: &Path, credentials: &WclCredentials) -> Result<()> {
    let content = format!(
        "{}={}\n{}={}\n",
        CLIENT_ID_VAR, credentials.client_id, CLIENT_SECRET_VAR, credentials.client_secret
    );
    fs::write(path, content)?;
    Ok(())
}
