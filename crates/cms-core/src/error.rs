use thiserror::Error;

use crate::config::CardVariant;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration key '{0}'")]
    MissingKey(&'static str),

    #[error("invalid port value '{0}'")]
    InvalidPort(String),

    #[error("port {port:#x} is not available for the {card} card")]
    PortNotPermitted { port: u16, card: CardVariant },

    #[error("card type '{0}' does not provide C/MS chips")]
    UnsupportedCard(String),
}
