//! User-facing configuration consumed when a session opens.
//!
//! Values arrive as the raw strings of the Sound Blaster configuration
//! section (`sbbase`, `sbtype`, `cms_filter`); parsing and port validation
//! happen here so the session itself only ever sees validated settings.

use core::fmt;
use core::str::FromStr;
use std::collections::{BTreeMap, HashMap};

use crate::{error::ConfigError, ports};

pub const KEY_BASE_PORT: &str = "sbbase";
pub const KEY_CARD_TYPE: &str = "sbtype";
pub const KEY_FILTER: &str = "cms_filter";

/// Which card carries the SAA-1099 pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardVariant {
    /// Creative's standalone Game Blaster, including its detection chip.
    #[default]
    GameBlaster,
    /// C/MS chips fitted to a Sound Blaster (1.0 on-board, 2.0 socketed).
    SoundBlasterCms,
}

impl CardVariant {
    pub fn is_standalone(self) -> bool {
        matches!(self, CardVariant::GameBlaster)
    }

    pub fn valid_ports(self) -> &'static [u16] {
        ports::valid_base_ports(self.is_standalone())
    }
}

impl FromStr for CardVariant {
    type Err = ConfigError;

    /// Parses the `sbtype` setting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gb" => Ok(CardVariant::GameBlaster),
            "sb1" | "sb2" | "sbpro1" | "sbpro2" | "sb16" => Ok(CardVariant::SoundBlasterCms),
            _ => Err(ConfigError::UnsupportedCard(s.to_owned())),
        }
    }
}

impl fmt::Display for CardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardVariant::GameBlaster => "Game Blaster",
            CardVariant::SoundBlasterCms => "Sound Blaster C/MS",
        };
        f.write_str(s)
    }
}

/// Output low-pass filter selection (`cms_filter`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterSetting {
    /// Fixed filter tuned against recordings of real hardware.
    #[default]
    On,
    Off,
    /// Filter description handed to the mixer channel verbatim.
    Custom(String),
}

impl FilterSetting {
    pub fn parse(s: &str) -> Self {
        match parse_bool_setting(s) {
            Some(true) => FilterSetting::On,
            Some(false) => FilterSetting::Off,
            None => FilterSetting::Custom(s.trim().to_owned()),
        }
    }
}

impl fmt::Display for FilterSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSetting::On => f.write_str("on"),
            FilterSetting::Off => f.write_str("off"),
            FilterSetting::Custom(spec) => f.write_str(spec),
        }
    }
}

/// Interprets the boolean spellings accepted across configuration settings.
pub fn parse_bool_setting(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" | "enabled" => Some(true),
        "off" | "false" | "no" | "0" | "disabled" | "none" => Some(false),
        _ => None,
    }
}

/// Parses a hexadecimal port (`220`, `0x220`, `220h`).
pub fn parse_hex_port(s: &str) -> Result<u16, ConfigError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_suffix('h'))
        .or_else(|| trimmed.strip_suffix('H'))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidPort(s.to_owned()))
}

/// Read-only view of a configuration section.
pub trait ConfigSection {
    fn get_string(&self, key: &str) -> Option<&str>;
}

impl ConfigSection for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl ConfigSection for BTreeMap<String, String> {
    fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Settings for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsConfig {
    pub base_port: u16,
    pub card: CardVariant,
    pub filter: FilterSetting,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_port: 0x220,
            card: CardVariant::GameBlaster,
            filter: FilterSetting::On,
        }
    }
}

impl CmsConfig {
    /// Builds and validates a configuration from a Sound Blaster section.
    pub fn from_section(section: &impl ConfigSection) -> Result<Self, ConfigError> {
        let base_port = section
            .get_string(KEY_BASE_PORT)
            .ok_or(ConfigError::MissingKey(KEY_BASE_PORT))
            .and_then(parse_hex_port)?;
        let card = section
            .get_string(KEY_CARD_TYPE)
            .ok_or(ConfigError::MissingKey(KEY_CARD_TYPE))?
            .parse()?;
        let filter = section
            .get_string(KEY_FILTER)
            .map(FilterSetting::parse)
            .unwrap_or_default();

        let config = Self {
            base_port,
            card,
            filter,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the base port against the ports the card can be jumpered to.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card.valid_ports().contains(&self.base_port) {
            Ok(())
        } else {
            Err(ConfigError::PortNotPermitted {
                port: self.base_port,
                card: self.card,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parses_a_complete_section() {
        let s = section(&[("sbbase", "220"), ("sbtype", "gb"), ("cms_filter", "off")]);
        let config = CmsConfig::from_section(&s).expect("valid section");
        assert_eq!(
            config,
            CmsConfig {
                base_port: 0x220,
                card: CardVariant::GameBlaster,
                filter: FilterSetting::Off,
            }
        );
    }

    #[test]
    fn missing_filter_defaults_to_on() {
        let s = section(&[("sbbase", "0x300"), ("sbtype", "sb2")]);
        let config = CmsConfig::from_section(&s).expect("valid section");
        assert_eq!(config.card, CardVariant::SoundBlasterCms);
        assert_eq!(config.filter, FilterSetting::On);
    }

    #[test]
    fn port_outside_variant_table_is_rejected() {
        // 0x210 only exists on the standalone card.
        let s = section(&[("sbbase", "210"), ("sbtype", "sb1")]);
        assert_eq!(
            CmsConfig::from_section(&s),
            Err(ConfigError::PortNotPermitted {
                port: 0x210,
                card: CardVariant::SoundBlasterCms,
            })
        );
    }

    #[test]
    fn missing_keys_and_bad_values_are_reported() {
        assert_eq!(
            CmsConfig::from_section(&section(&[("sbtype", "gb")])),
            Err(ConfigError::MissingKey(KEY_BASE_PORT))
        );
        assert_eq!(
            CmsConfig::from_section(&section(&[("sbbase", "zz"), ("sbtype", "gb")])),
            Err(ConfigError::InvalidPort("zz".to_owned()))
        );
        assert_eq!(
            "none".parse::<CardVariant>(),
            Err(ConfigError::UnsupportedCard("none".to_owned()))
        );
    }

    #[test]
    fn filter_setting_keeps_custom_specs() {
        assert_eq!(FilterSetting::parse("ON"), FilterSetting::On);
        assert_eq!(FilterSetting::parse("disabled"), FilterSetting::Off);
        assert_eq!(
            FilterSetting::parse(" lpf 2 12000 "),
            FilterSetting::Custom("lpf 2 12000".to_owned())
        );
    }

    #[test]
    fn hex_ports_accept_common_spellings() {
        assert_eq!(parse_hex_port("2a0"), Ok(0x2a0));
        assert_eq!(parse_hex_port("0x2A0"), Ok(0x2a0));
        assert_eq!(parse_hex_port("2a0h"), Ok(0x2a0));
    }
}
