use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{normalize_handle, ChatId},
    errors::Error,
    Result,
};

/// A required channel declared in configuration, seeded into the store at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSeed {
    pub id: ChatId,
    pub handle: String,
}

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    pub admin_ids: Vec<i64>,

    // Channels
    pub archive_channel_id: ChatId,
    pub codes_channel: String,
    pub required_channels: Vec<ChannelSeed>,

    // Storage
    pub database_path: PathBuf,

    // Delivery
    pub protect_content: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin_ids = parse_csv_i64(env_str("ADMIN_IDS"));
        if admin_ids.is_empty() {
            return Err(Error::Config(
                "ADMIN_IDS environment variable is required".to_string(),
            ));
        }

        let archive_channel_id = env_str("ARCHIVE_CHANNEL_ID")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(ChatId)
            .ok_or_else(|| {
                Error::Config("ARCHIVE_CHANNEL_ID must be a numeric chat id".to_string())
            })?;

        let codes_channel = env_str("CODES_CHANNEL")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let required_channels =
            parse_channel_seeds(&env_str("REQUIRED_CHANNELS").unwrap_or_default())?;

        let database_path = env_str("DATABASE_PATH")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("movies.db"));

        let protect_content = env_bool("PROTECT_CONTENT").unwrap_or(true);

        Ok(Self {
            bot_token,
            admin_ids,
            archive_channel_id,
            codes_channel,
            required_channels,
            database_path,
            protect_content,
        })
    }
}

/// Parse `id:handle` pairs separated by commas, e.g. `-1001:@films,-1002:news`.
pub fn parse_channel_seeds(raw: &str) -> Result<Vec<ChannelSeed>> {
    let mut out = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((id, handle)) = item.split_once(':') else {
            return Err(Error::Config(format!(
                "REQUIRED_CHANNELS entry `{item}` must look like `id:handle`"
            )));
        };
        let id = id.trim().parse::<i64>().map_err(|_| {
            Error::Config(format!("REQUIRED_CHANNELS entry `{item}` has a non-numeric id"))
        })?;
        if handle.trim().trim_start_matches('@').is_empty() {
            return Err(Error::Config(format!(
                "REQUIRED_CHANNELS entry `{item}` has an empty handle"
            )));
        }
        out.push(ChannelSeed {
            id: ChatId(id),
            handle: normalize_handle(handle),
        });
    }
    Ok(out)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
