//! Connection URL derivation.

use crate::schema::DatasetConfig;
use std::fmt;

/// Port used by every dataset endpoint.
pub const CONNECTION_PORT: u16 = 8080;

/// Transport scheme for the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionScheme {
    /// Plain TCP.
    Tcp,
    /// TLS, selected by `ssl = "true"`.
    Ssl,
}

impl ConnectionScheme {
    /// Scheme selected by the record's `ssl` option.
    #[must_use]
    pub fn for_config(config: &DatasetConfig) -> Self {
        if config.ssl_enabled() {
            Self::Ssl
        } else {
            Self::Tcp
        }
    }

    /// Scheme as it appears in the URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Ssl => "ssl",
        }
    }
}

impl fmt::Display for ConnectionScheme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Build `<scheme>://<name>.<namespace>:8080` for a record.
///
/// Pure and total: the record is not validated and name or namespace are
/// inserted verbatim, so an empty namespace yields `name.:8080`.
#[must_use]
pub fn build_connection_url(config: &DatasetConfig) -> String {
    let scheme = ConnectionScheme::for_config(config);
    format!(
        "{scheme}://{}.{}:{CONNECTION_PORT}",
        config.name, config.namespace
    )
}

impl DatasetConfig {
    /// See [`build_connection_url`].
    #[must_use]
    pub fn connection_url(&self) -> String {
        build_connection_url(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OPTION_SSL, SSL_ENABLED};
    use proptest::prelude::*;

    #[test]
    fn plain_tcp_by_default() {
        let config = DatasetConfig::new("db", "prod");
        assert_eq!(build_connection_url(&config), "tcp://db.prod:8080");
    }

    #[test]
    fn ssl_when_enabled() {
        let config = DatasetConfig::new("ginkgo-test", "").with_option(OPTION_SSL, "true");
        assert_eq!(build_connection_url(&config), "ssl://ginkgo-test.:8080");
    }

    #[test]
    fn non_exact_ssl_value_falls_back_to_tcp() {
        let config = DatasetConfig::new("db", "prod").with_option(OPTION_SSL, "TRUE");
        assert_eq!(config.connection_url(), "tcp://db.prod:8080");
    }

    #[test]
    fn unvalidated_fields_are_used_verbatim() {
        let config = DatasetConfig::new("", "").with_replicas(-3);
        assert_eq!(build_connection_url(&config), "tcp://.:8080");
    }

    #[test]
    fn scheme_display_matches_url_prefix() {
        assert_eq!(ConnectionScheme::Tcp.to_string(), "tcp");
        assert_eq!(ConnectionScheme::Ssl.as_str(), "ssl");
    }

    proptest! {
        #[test]
        fn only_exact_true_selects_ssl(
            name in "[a-z-]{0,12}",
            namespace in "[a-z-]{0,12}",
            ssl in prop::option::of("[a-zA-Z01 ]{0,6}"),
        ) {
            let mut config = DatasetConfig::new(name.clone(), namespace.clone());
            if let Some(ssl) = &ssl {
                config = config.with_option(OPTION_SSL, ssl.clone());
            }
            let scheme = if ssl.as_deref() == Some(SSL_ENABLED) { "ssl" } else { "tcp" };

            prop_assert_eq!(
                build_connection_url(&config),
                format!("{scheme}://{name}.{namespace}:8080")
            );
        }
    }
}
