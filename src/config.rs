use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::client::ClientConfig;

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    community: Option<String>,
    verify: Option<bool>,
}

/// Values passed explicitly to [`crate::Client::new`]; they win over everything else.
#[derive(Debug, Default)]
pub(crate) struct Explicit {
    pub(crate) url: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) community_id: Option<String>,
}

pub(crate) fn load_config(explicit: Explicit) -> Result<ClientConfig> {
    load_config_with(explicit, |name| std::env::var(name).ok(), &rc_candidates())
}

fn load_config_with(
    explicit: Explicit,
    env: impl Fn(&str) -> Option<String>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    let mut url = explicit.url.or_else(|| env("DSPACE_URL"));
    let mut email = explicit.email.or_else(|| env("DSPACE_EMAIL"));
    let mut password = explicit.password.or_else(|| env("DSPACE_PASSWORD"));
    let mut community_id = explicit.community_id.or_else(|| env("DSPACE_COMMUNITY_ID"));
    let mut verify: Option<bool> = None;

    for rc_path in rc_candidates {
        if rc_path.exists() {
            let cfg = match read_rc(rc_path) {
                Ok(cfg) => cfg,
                // Nothing required is missing, so a broken file only costs `verify`/`community`.
                Err(e) if url.is_some() && email.is_some() && password.is_some() => {
                    warn!(path = %rc_path.display(), error = %e, "ignoring unreadable configuration file");
                    break;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "failed to read configuration file {}",
                        rc_path.display()
                    )));
                }
            };

            url = url.or(cfg.url);
            email = email.or(cfg.email);
            password = password.or(cfg.password);
            community_id = community_id.or(cfg.community);
            verify = cfg.verify;
            break;
        }
    }

    let url = require(url, "url", "DSPACE_URL", rc_candidates)?;
    let email = require(email, "email", "DSPACE_EMAIL", rc_candidates)?;
    let password = require(password, "password", "DSPACE_PASSWORD", rc_candidates)?;

    Ok(ClientConfig {
        url,
        email,
        password,
        community_id,
        verify: verify.unwrap_or(true),
    })
}

fn require(
    value: Option<String>,
    key: &str,
    env_name: &str,
    rc_candidates: &[PathBuf],
) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if rc_candidates.is_empty() => {
            bail!("Missing configuration: {key} (set {env_name} or create .dspacerc)")
        }
        None => bail!(
            "Missing configuration: {key} (set {env_name} or put `{key}:` in one of: {})",
            rc_candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `password:` may be on one line with the value on the next.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            let starts_new_key = line
                .split_once(':')
                .is_some_and(|(k, _)| KEYS.contains(&k.trim()));
            if !starts_new_key {
                set_value(&mut cfg, pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                set_value(&mut cfg, k, v);
            }
        }
    }

    cfg
}

const KEYS: [&str; 5] = ["url", "email", "password", "community", "verify"];

fn set_value(cfg: &mut RcConfig, key: &str, value: &str) {
    match key {
        "url" => cfg.url = Some(value.to_string()),
        "email" => cfg.email = Some(value.to_string()),
        "password" => cfg.password = Some(value.to_string()),
        "community" => cfg.community = Some(value.to_string()),
        "verify" => cfg.verify = Some(value != "0"),
        _ => {}
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) DSPACE_RC (explicit)
    // 2) ./.dspacerc
    // 3) ~/.dspacerc
    if let Ok(p) = std::env::var("DSPACE_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".dspacerc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".dspacerc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parse_rc_reads_all_keys() {
        let cfg = parse_rc(
            "# DSpace account\n\
             url: https://repo.example.org\n\
             email: \"curator@example.org\"\n\
             password:\n\
             's3cr:et'\n\
             community: 12\n\
             verify: 0\n",
        );
        assert_eq!(
            cfg,
            RcConfig {
                url: Some("https://repo.example.org".into()),
                email: Some("curator@example.org".into()),
                password: Some("s3cr:et".into()),
                community: Some("12".into()),
                verify: Some(false),
            }
        );
    }

    #[test]
    fn url_on_next_line() {
        let cfg = parse_rc("url:\nhttps://repo.example.org\n");
        assert_eq!(cfg.url.as_deref(), Some("https://repo.example.org"));
    }

    #[test]
    fn explicit_wins_over_env_and_env_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".dspacerc");
        std::fs::write(
            &rc,
            "url: https://file.example.org\nemail: file@example.org\npassword: filepw\ncommunity: 3\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = [("DSPACE_EMAIL", "env@example.org")].into();
        let cfg = load_config_with(
            Explicit {
                url: Some("https://explicit.example.org".into()),
                ..Default::default()
            },
            |k| env.get(k).map(|v| v.to_string()),
            &[rc],
        )
        .unwrap();

        assert_eq!(cfg.url, "https://explicit.example.org");
        assert_eq!(cfg.email, "env@example.org");
        assert_eq!(cfg.password, "filepw");
        assert_eq!(cfg.community_id.as_deref(), Some("3"));
        assert!(cfg.verify);
    }

    #[test]
    fn first_existing_rc_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let present = dir.path().join("present");
        std::fs::write(&present, "url: u\nemail: e\npassword: p\nverify: 0\n").unwrap();

        let cfg = load_config_with(Explicit::default(), no_env, &[missing, present]).unwrap();
        assert_eq!(cfg.url, "u");
        assert!(!cfg.verify);
        assert!(cfg.community_id.is_none());
    }

    #[test]
    fn unreadable_rc_is_skipped_when_everything_is_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".dspacerc");
        std::fs::write(&rc, [0xff, 0xfe, 0x00]).unwrap();

        let cfg = load_config_with(
            Explicit {
                url: Some("https://repo.example.org".into()),
                email: Some("e".into()),
                password: Some("p".into()),
                community_id: None,
            },
            no_env,
            &[rc],
        )
        .unwrap();
        assert_eq!(cfg.url, "https://repo.example.org");
        assert!(cfg.verify);
    }

    #[test]
    fn unreadable_rc_is_an_error_when_values_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".dspacerc");
        std::fs::write(&rc, [0xff, 0xfe, 0x00]).unwrap();

        let err = load_config_with(
            Explicit {
                url: Some("u".into()),
                ..Default::default()
            },
            no_env,
            &[rc.clone()],
        )
        .unwrap_err();
        assert!(
            err.to_string().contains(&rc.display().to_string()),
            "{err}"
        );
    }

    #[test]
    fn missing_password_names_sources() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".dspacerc");
        let err = load_config_with(
            Explicit {
                url: Some("u".into()),
                email: Some("e".into()),
                ..Default::default()
            },
            no_env,
            &[rc.clone()],
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("password"), "{msg}");
        assert!(msg.contains("DSPACE_PASSWORD"), "{msg}");
        assert!(msg.contains(&rc.display().to_string()), "{msg}");
    }
}
