use std::sync::Arc;

use anyhow::{Context, Result, bail};
use devradar_config::validation::apply_guard_rails;
use devradar_config::{ClientConfig, ConfigSource, ConfigWarning};
use devradar_model::{Coordinates, Dev, GeoRegion};
use devradar_session::session::{build_session, location_provider};
use devradar_session::{
    EventOutcome, LocationError, SessionController, SessionError, StaticLocation,
};

use crate::cli::{Cli, SearchArgs};
use crate::render;

/// Resolve the client config: `--config` beats the env lookup chain and
/// `--server` beats whatever base URL that produced.
pub fn load_config(cli: &Cli) -> Result<(ClientConfig, ConfigSource)> {
    let (mut config, source) = match &cli.config {
        Some(path) => {
            let config = ClientConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            (config, ConfigSource::File(path.clone()))
        }
        None => {
            let load = ClientConfig::load_from_env()?;
            (load.config, load.source)
        }
    };

    let server = server_override(cli.server.as_deref(), &config.server.base_url);
    if let Some(server) = server {
        config.server.base_url = server.to_string();
    }

    // The env chain already validated what it loaded.
    if cli.config.is_some() || server.is_some() {
        let warnings = apply_guard_rails(&config)?;
        for warning in &warnings.items {
            log::warn!("{}", warning_line(warning));
        }
    }

    Ok((config, source))
}

/// `--server` normalised the way the loader normalises base URLs. `None`
/// when it is blank or names the URL already loaded.
fn server_override<'a>(flag: Option<&'a str>, loaded: &str) -> Option<&'a str> {
    flag.map(|server| server.trim().trim_end_matches('/'))
        .filter(|server| !server.is_empty() && *server != loaded)
}

fn warning_line(warning: &ConfigWarning) -> String {
    match &warning.hint {
        Some(hint) => format!("{} ({})", warning.message, hint),
        None => warning.message.clone(),
    }
}

pub async fn search(config: &ClientConfig, args: &SearchArgs) -> Result<()> {
    let Some(mut session) = start_session(config, args).await? else {
        return Ok(());
    };
    session.search().await?;
    print_discovered(&session, args.json)?;
    session.close();
    Ok(())
}

pub async fn watch(config: &ClientConfig, args: &SearchArgs) -> Result<()> {
    let Some(mut session) = start_session(config, args).await? else {
        return Ok(());
    };
    session.search().await?;
    print_discovered(&session, args.json)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let outcome = tokio::select! {
            outcome = session.next_event() => outcome,
            _ = &mut shutdown => {
                log::info!("Interrupted, closing subscription");
                break;
            }
        };

        let view = session.region().copied();
        match outcome {
            EventOutcome::Opened(id) => log::info!("Watching for new devs on {}", id),
            EventOutcome::Appended(_) => {
                if let Some(dev) = session.discovered().as_slice().last() {
                    print_dev(dev, view.as_ref(), args.json)?;
                }
            }
            EventOutcome::Merged(id) => {
                if let Some(dev) = session.discovered().get(&id) {
                    print_dev(dev, view.as_ref(), args.json)?;
                }
            }
            EventOutcome::Stale(_) => {}
            EventOutcome::Ended { reason, .. } => {
                bail!("subscription ended: {reason}");
            }
        }
    }

    session.close();
    Ok(())
}

pub fn show_config(config: &ClientConfig, source: &ConfigSource) -> Result<()> {
    log::info!("Configuration source: {:?}", source);
    let rendered = toml::to_string_pretty(config).context("rendering configuration")?;
    print!("{rendered}");
    Ok(())
}

/// Build the session and take the initial fix. `None` when no position was
/// given, which the terminal treats the same as a denied location prompt.
async fn start_session(
    config: &ClientConfig,
    args: &SearchArgs,
) -> Result<Option<SessionController>> {
    let position = match (args.lat, args.lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)?),
        _ => None,
    };

    let provider = location_provider(Arc::new(StaticLocation::new(position)), config);
    let mut session = build_session(config)?;

    match session.activate(&provider).await {
        Ok(_) => {}
        Err(SessionError::Location(LocationError::PermissionDenied)) => {
            log::info!("No position given (--lat/--lon); nothing to search");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    }

    session.on_filter_changed(args.techs.as_str());
    Ok(Some(session))
}

fn print_discovered(session: &SessionController, json: bool) -> Result<()> {
    if json {
        println!("{}", render::devs_json(session.discovered().as_slice())?);
    } else {
        for dev in session.discovered() {
            println!("{}", render::dev_line(dev, session.region()));
        }
    }
    Ok(())
}

fn print_dev(dev: &Dev, view: Option<&GeoRegion>, json: bool) -> Result<()> {
    if json {
        println!("{}", render::dev_json(dev)?);
    } else {
        println!("{}", render::dev_line(dev, view));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_flag_matching_the_loaded_url_is_not_an_override() {
        let loaded = "http://localhost:3333";
        assert_eq!(server_override(Some("http://localhost:3333/"), loaded), None);
        assert_eq!(server_override(Some("  "), loaded), None);
        assert_eq!(server_override(None, loaded), None);
        assert_eq!(
            server_override(Some(" https://radar.example.com/ "), loaded),
            Some("https://radar.example.com")
        );
    }

    #[test]
    fn warnings_carry_their_hint() {
        let plain = ConfigWarning {
            message: "stream retries disabled".into(),
            hint: None,
        };
        assert_eq!(warning_line(&plain), "stream retries disabled");

        let hinted = ConfigWarning {
            message: "base_url uses plain http".into(),
            hint: Some("use https outside local development".into()),
        };
        assert_eq!(
            warning_line(&hinted),
            "base_url uses plain http (use https outside local development)"
        );
    }
}
