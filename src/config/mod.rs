pub mod cli;

use std::env;
use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::domain::model::Credentials;
use crate::utils::error::{PayError, Result};
use crate::utils::validation::{
    validate_non_empty, validate_portal_url, validate_positive_amount, Validate,
};

/// Everything a run needs, resolved once at startup. Nothing else in the
/// crate reads the environment; the struct is passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub portal_url: String,
    /// Desired charge per card; the fee gets netted out of this, so each
    /// card's face value is consumed exactly.
    pub amount_per_card: Decimal,
    /// Attached to every card; the portal form wants a billing zip but gift
    /// cards share the account holder's.
    pub zip_code: String,
    pub username: String,
    pub password: String,
    pub cards_csv: Option<PathBuf>,
    /// `false` keeps the portal session open for inspection at run end.
    pub headless: bool,
    /// Cumulative payment ceiling; activates the pre-payment stop rule.
    pub target_payment: Option<Decimal>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Environment access goes through a lookup closure so tests can feed a
    /// plain map instead of mutating process globals.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(PayError::MissingEnvVar { key })
        };

        let portal_url = require("PORTAL_URL")?;
        let amount_per_card = parse_decimal("AMOUNT_PER_CARD", &require("AMOUNT_PER_CARD")?)?;
        let zip_code = require("ZIP_CODE")?;
        let username = require("USERNAME")?;
        let password = require("PASSWORD")?;

        let cards_csv = lookup("CARDS_CSV")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        // Anything other than the literal "true" keeps the session visible,
        // matching how a loosely-set HEADLESS flag has always behaved here.
        let headless = lookup("HEADLESS").map(|value| value == "true").unwrap_or(true);

        let target_payment = match lookup("TARGET_PAYMENT").filter(|value| !value.is_empty()) {
            Some(raw) => Some(parse_decimal("TARGET_PAYMENT", &raw)?),
            None => None,
        };

        Ok(Self {
            portal_url,
            amount_per_card,
            zip_code,
            username,
            password,
            cards_csv,
            headless,
            target_payment,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn parse_decimal(key: &str, raw: &str) -> Result<Decimal> {
    raw.parse().map_err(|e: rust_decimal::Error| PayError::InvalidConfigValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_portal_url("PORTAL_URL", &self.portal_url)?;
        validate_positive_amount("AMOUNT_PER_CARD", self.amount_per_card)?;
        validate_non_empty("ZIP_CODE", &self.zip_code)?;
        if let Some(target) = self.target_payment {
            validate_positive_amount("TARGET_PAYMENT", target)?;
        }
        Ok(())
    }
}
