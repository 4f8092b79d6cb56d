use std::env;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Book settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BookConfig {
    /// Minimum price increment; every order price must be a multiple of it.
    pub tick_size: Decimal,
    /// Whether a modify request may move an order to the other side.
    pub allow_side_change: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            tick_size: dec!(0.01),
            allow_side_change: false,
        }
    }
}

impl BookConfig {
    pub const TICK_SIZE_VAR: &'static str = "MATCHBOOK_TICK_SIZE";
    pub const ALLOW_SIDE_CHANGE_VAR: &'static str = "MATCHBOOK_ALLOW_SIDE_CHANGE";

    pub fn with_tick_size(tick_size: Decimal) -> Self {
        Self {
            tick_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.tick_size <= Decimal::ZERO {
            return Err(eyre::eyre!("Tick size must be positive"));
        }
        Ok(())
    }

    /// Defaults overridden by `MATCHBOOK_TICK_SIZE` and
    /// `MATCHBOOK_ALLOW_SIDE_CHANGE` when set.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::TICK_SIZE_VAR) {
            config.tick_size = raw
                .trim()
                .parse::<Decimal>()
                .map_err(|e| eyre::eyre!("Invalid {}={:?}: {}", Self::TICK_SIZE_VAR, raw, e))?;
        }

        if let Some(raw) = lookup(Self::ALLOW_SIDE_CHANGE_VAR) {
            config.allow_side_change = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(eyre::eyre!(
                        "Invalid {}={:?}: expected true or false",
                        Self::ALLOW_SIDE_CHANGE_VAR,
                        raw
                    ))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}
