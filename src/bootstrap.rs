use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use std::env;

use jainam_rs::auth::{login_url, parse_redirect_url};
use jainam_rs::{Credentials, JainamClient, Session, SessionManager};

use crate::config::Config;

pub fn session_manager(cfg: &Config) -> SessionManager {
    match &cfg.session_file {
        Some(path) => SessionManager::with_path(path.clone()),
        None => SessionManager::new(),
    }
}

/// Reuse the cached session when it is young enough, otherwise run the SSO login.
pub async fn bootstrap_session(cfg: &Config, manager: &SessionManager) -> Result<Session> {
    if let Some(session) = manager.load_valid_session(cfg.session_max_age()) {
        info!(user_id = %session.user_id, login_time = %session.login_time, "using cached session");
        return Ok(session);
    }

    let credentials = Credentials::from_env().context("no valid cached session; credentials needed")?;
    let auth_code = auth_code(&credentials).await?;

    let session = manager
        .login(&JainamClient::new(), &credentials, &auth_code)
        .await
        .context("SSO login failed")?;
    info!(user_id = %session.user_id, path = %manager.path().display(), "logged in, session cached");
    Ok(session)
}

/// Auth code from JAINAM_AUTH_CODE, JAINAM_REDIRECT_URL, or the terminal.
async fn auth_code(credentials: &Credentials) -> Result<String> {
    if let Some(code) = env::var("JAINAM_AUTH_CODE").ok().filter(|c| !c.trim().is_empty()) {
        return Ok(code.trim().to_string());
    }
    if let Some(url) = env::var("JAINAM_REDIRECT_URL").ok().filter(|u| !u.trim().is_empty()) {
        return code_from_redirect(credentials, &url);
    }

    println!("Log in at: {}", login_url(credentials.app_code()));
    println!("Paste the redirect URL (or just the authCode):");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await?
        .context("stdin closed before an auth code was entered")?;
    let line = line.trim();
    if line.starts_with("http") {
        code_from_redirect(credentials, line)
    } else if line.is_empty() {
        anyhow::bail!("empty auth code")
    } else {
        Ok(line.to_string())
    }
}

fn code_from_redirect(credentials: &Credentials, url: &str) -> Result<String> {
    let params = parse_redirect_url(url)?;
    if params.user_id != credentials.user_id() {
        warn!(
            redirect_user = %params.user_id,
            configured_user = %credentials.user_id(),
            "redirect user differs from JAINAM_USER_ID"
        );
    }
    Ok(params.auth_code)
}

/// Log who we are and what we can spend. A rejected token clears the cache.
pub async fn print_account(manager: &SessionManager, client: &JainamClient) -> Result<()> {
    match client.profile().await {
        Ok(profiles) => {
            for p in profiles {
                info!(user_id = ?p.user_id, name = ?p.user_name, email = ?p.email_id, "profile");
            }
        }
        Err(e) if e.is_authentication() => {
            manager.clear_session()?;
            anyhow::bail!("cached session was rejected ({e}); run again to log in");
        }
        Err(e) => warn!("profile request failed: {e}"),
    }

    match client.limits().await {
        Ok(limits) => {
            for l in limits {
                info!(
                    trading_limit = ?l.trading_limit,
                    opening_cash = ?l.opening_cash_limit,
                    collateral = ?l.collateral_margin,
                    "limits"
                );
            }
        }
        Err(e) => warn!("limits request failed: {e}"),
    }
    Ok(())
}
