//! Light/dark theme preference, stored as a boolean record.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidArgument(format!(
                "invalid theme '{other}' (expected light|dark)"
            ))),
        }
    }
}

/// Stored preference; absent or malformed records read as light.
pub fn load<S: Store>(store: &S, key: &str) -> Theme {
    Theme::from_dark(store.get(key, false))
}

pub fn set<S: Store>(store: &mut S, key: &str, theme: Theme) -> Result<()> {
    store.set(key, &theme.is_dark())?;
    debug!(key, theme = %theme, "theme saved");
    Ok(())
}

/// Flip the stored preference and return the new value.
pub fn toggle<S: Store>(store: &mut S, key: &str) -> Result<Theme> {
    let next = load(store, key).toggled();
    set(store, key, next)?;
    Ok(next)
}
