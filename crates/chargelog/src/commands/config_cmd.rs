//! Config subcommand handlers.

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, RunOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts, run: &RunOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let (mut cfg, path) = config::load(global)?;
            config::apply_overrides(&mut cfg, run);

            eprintln!("Config file: {}", path.display());
            let table = output::render_table(&output::settings_rows(&cfg, false));
            output::print_output(&table, false);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = config::discover_config_path(global.config.as_deref());
            output::print_output(&path.display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::discover_config_path(global.config.as_deref());
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            config::apply_overrides(&mut cfg, run);
            config::save_config(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Wrote {}", path.display());
                if cfg.connect.username.is_some() {
                    eprintln!("Store your password with: chargelog config set-password");
                } else {
                    eprintln!("Set connect.username in the file, or pass --username.");
                }
            }
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let (mut cfg, _) = config::load(global)?;
            config::apply_overrides(&mut cfg, run);
            let username = cfg
                .connect
                .username
                .filter(|u| !u.is_empty())
                .ok_or(CliError::NoUsername)?;

            let password = match run.password {
                Some(ref pw) => SecretString::from(pw.clone()),
                None => config::prompt_password(&username)?,
            };
            chargelog_config::store_password(&username, &password)?;

            if !global.quiet {
                eprintln!("Password for {username} stored in the system keyring");
            }
            Ok(())
        }
    }
}
