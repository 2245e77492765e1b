use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Where the debug adapter listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEndpoint {
    /// Unix domain socket endpoint.
    Unix {
        /// Socket path.
        path: Utf8PathBuf,
    },
    /// TCP socket endpoint.
    Tcp {
        /// Host name or address.
        host: String,
        /// Port number.
        port: u16,
    },
}

impl AdapterEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Returns the Unix socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }
}

impl fmt::Display for AdapterEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for AdapterEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(EndpointParseError::MissingUnixPath(input.to_owned()));
                }
                Ok(Self::unix(path))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
                Ok(Self::tcp(host, port))
            }
            other => Err(EndpointParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

/// Table spelling accepted in configuration files.
#[derive(Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
enum EndpointTable {
    Unix { path: Utf8PathBuf },
    Tcp { host: String, port: u16 },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRepr {
    Url(String),
    Table(EndpointTable),
}

impl<'de> Deserialize<'de> for AdapterEndpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match EndpointRepr::deserialize(deserializer)? {
            EndpointRepr::Url(text) => text.parse().map_err(serde::de::Error::custom),
            EndpointRepr::Table(EndpointTable::Unix { path }) => Ok(Self::unix(path)),
            EndpointRepr::Table(EndpointTable::Tcp { host, port }) => Ok(Self::tcp(host, port)),
        }
    }
}

impl Serialize for AdapterEndpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Errors encountered while parsing an [`AdapterEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised.
    #[error("unsupported adapter scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn display_unix_socket() {
        let endpoint = AdapterEndpoint::unix(Utf8PathBuf::from("/tmp/debugpy.sock"));
        assert_eq!(endpoint.to_string(), "unix:///tmp/debugpy.sock");
    }

    #[rstest]
    fn parse_tcp_socket() {
        let endpoint: AdapterEndpoint = "tcp://127.0.0.1:5679".parse().expect("parse");
        assert_eq!(endpoint, AdapterEndpoint::tcp("127.0.0.1", 5679));
    }

    #[rstest]
    #[case("http://localhost:80")]
    #[case("tcp://localhost")]
    fn rejects_unusable_urls(#[case] input: &str) {
        assert!(input.parse::<AdapterEndpoint>().is_err());
    }

    #[rstest]
    #[case(r#""tcp://localhost:4711""#, AdapterEndpoint::tcp("localhost", 4711))]
    #[case(
        r#"{"transport":"unix","path":"/run/dap.sock"}"#,
        AdapterEndpoint::unix("/run/dap.sock")
    )]
    #[case(
        r#"{"transport":"tcp","host":"::1","port":9}"#,
        AdapterEndpoint::tcp("::1", 9)
    )]
    fn deserialises_url_or_table(#[case] json: &str, #[case] expected: AdapterEndpoint) {
        let parsed: AdapterEndpoint = serde_json::from_str(json).expect("deserialise");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn serialises_as_url() {
        let text = serde_json::to_string(&AdapterEndpoint::tcp("localhost", 5678)).expect("serialise");
        assert_eq!(text, r#""tcp://localhost:5678""#);
    }
}
