//! Init command implementation

use jsmarker_core::{NatureToggle, ProjectConfig, is_enabled};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::Cli;

use super::open_workspace;

pub fn run_init(cli: &Cli, force: bool) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.project.join(ProjectConfig::CONFIG_FILES[0]));

    let mut config = ProjectConfig::seeded();
    config.exclude = vec!["node_modules/**".to_string()];
    let default_config = with_engine_placeholder(&config.to_json_pretty().into_diagnostic()?);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(default_config.as_bytes())
                    .into_diagnostic()?;
                info!("Created {}", config_path.display());
                info!(
                    "Set \"engine\" in {} before running `jsmarker build`",
                    config_path.display()
                );
                break;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }

                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }

    let workspace = open_workspace(cli)?;
    if !is_enabled(workspace.project()).into_diagnostic()? {
        NatureToggle::new()
            .toggle(workspace.project())
            .into_diagnostic()?;
    }
    Ok(())
}

/// Commented-out engine section placed at the top of the written config.
const ENGINE_PLACEHOLDER: &str = r#"  // "engine": { "command": "jslint-json", "args": [] },"#;

fn with_engine_placeholder(json: &str) -> String {
    match json.strip_prefix("{\n") {
        Some(rest) => format!("{{\n{}\n{}", ENGINE_PLACEHOLDER, rest),
        None => json.to_string(),
    }
}
