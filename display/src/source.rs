use reqwest::blocking::Client;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Shown when no source is given on the command line.
pub const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/600/448";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

impl ImageSource {
    /// `None` falls back to `default_url`; `http://` and `https://` arguments
    /// are URLs, anything else is a path.
    pub fn parse(arg: Option<&str>, default_url: &str) -> Self {
        match arg {
            None => ImageSource::Url(default_url.to_string()),
            Some(a) if has_http_scheme(a) => ImageSource::Url(a.to_string()),
            Some(a) => ImageSource::File(PathBuf::from(a)),
        }
    }

    pub fn load(&self, fetcher: &Fetcher) -> Result<Vec<u8>, InputError> {
        match self {
            ImageSource::File(path) => {
                if !path.exists() {
                    return Err(InputError::NotFound(path.clone()));
                }
                let bytes = fs::read(path).map_err(|source| InputError::Read {
                    path: path.clone(),
                    source,
                })?;
                info!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            ImageSource::Url(url) => fetcher.get(url),
        }
    }
}

/// Schemes are case-insensitive, so `HTTPS://` counts too.
fn has_http_scheme(arg: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        arg.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

impl Display for ImageSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::File(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => f.write_str(url),
        }
    }
}

/// Blocking HTTP client with a whole-request timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Ignores `HTTP_PROXY` and friends, for talking to hosts on the local network.
    pub fn without_proxy(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> Result<Vec<u8>, InputError> {
        let fetch_error = |source| InputError::Fetch {
            url: url.to_string(),
            source,
        };
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        let bytes = response.bytes().map_err(fetch_error)?;
        info!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
