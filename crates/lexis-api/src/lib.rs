// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lexis_app::{Corpus, DefinitionRecord, DefinitionSource, LookupOutcome};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CORPUS_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/master/words_alpha.txt";
pub const DEFAULT_DEFINITIONS_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no definitions for {word:?}")]
    NotFound { word: String },
    #[error("definition API returned {status} for {word:?}{detail}")]
    Status {
        word: String,
        status: u16,
        detail: String,
    },
    #[error("cannot reach {base_url} ({reason})")]
    Transport { base_url: String, reason: String },
    #[error("decode definitions for {word:?}: {reason}")]
    Decode { word: String, reason: String },
}

impl From<LookupError> for LookupOutcome {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NotFound { .. } => Self::NotFound,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Blocking client for the word list and the definition API.
#[derive(Debug, Clone)]
pub struct Client {
    corpus_url: Url,
    definitions_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(corpus_url: &str, definitions_url: &str, timeout: Duration) -> Result<Self> {
        let corpus_url = parse_http_url("sources.corpus_url", corpus_url)?;
        let definitions_url = parse_http_url("sources.definitions_url", definitions_url)?;
        if timeout.is_zero() {
            bail!("network.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("lexis/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            corpus_url,
            definitions_url,
            timeout,
            http,
        })
    }

    pub fn corpus_url(&self) -> &str {
        self.corpus_url.as_str()
    }

    pub fn definitions_url(&self) -> &str {
        self.definitions_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_corpus(&self) -> Result<Corpus> {
        info!(url = %self.corpus_url, "fetching word list");
        let response = self
            .http
            .get(self.corpus_url.clone())
            .send()
            .map_err(|error| connection_error(self.corpus_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "word list request failed: {}",
                describe_status(status, &body)
            ));
        }

        let text = response.text().context("read word list body")?;
        let corpus = Corpus::parse(&text);
        if corpus.is_empty() {
            bail!("word list at {} is empty", self.corpus_url);
        }
        Ok(corpus)
    }

    /// Where the entries for `word` live: the word becomes one escaped path segment.
    pub fn definition_url(&self, word: &str) -> Url {
        let mut url = self.definitions_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(word);
        }
        url
    }

    pub fn fetch_definitions(&self, word: &str) -> Result<Vec<DefinitionRecord>, LookupError> {
        let url = self.definition_url(word);
        debug!(%url, "fetching definitions");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                word: word.to_owned(),
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LookupError::Status {
                word: word.to_owned(),
                status: status.as_u16(),
                detail: status_detail(&body)
                    .map(|detail| format!(": {detail}"))
                    .unwrap_or_default(),
            });
        }

        let body = response
            .text()
            .map_err(|error| self.transport_error(error))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|error| LookupError::Decode {
            word: word.to_owned(),
            reason: error.to_string(),
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> LookupError {
        LookupError::Transport {
            base_url: self.definitions_url.to_string(),
            reason: error.to_string(),
        }
    }
}

impl DefinitionSource for Client {
    fn lookup(&self, word: &str) -> LookupOutcome {
        match self.fetch_definitions(word) {
            Ok(entries) => LookupOutcome::from_entries(entries),
            Err(error) => {
                debug!(%word, %error, "definition lookup failed");
                error.into()
            }
        }
    }
}

/// Parses `raw` as an absolute http(s) URL, naming `key` in any error.
pub fn parse_http_url(key: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("{key} must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("{key} {trimmed:?} is not a URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        bail!("{key} {trimmed:?} must be an http:// or https:// URL");
    }
    Ok(url)
}

fn connection_error(url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach {url} -- check network access or [sources] in config ({error})")
}

fn describe_status(status: StatusCode, body: &str) -> String {
    match status_detail(body) {
        Some(detail) => format!("server error ({}): {detail}", status.as_u16()),
        None => format!("server returned {}", status.as_u16()),
    }
}

fn status_detail(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        let detail = match (parsed.title, parsed.message) {
            (Some(title), Some(message)) if !message.is_empty() => format!("{title}: {message}"),
            (Some(title), _) if !title.is_empty() => title,
            (_, Some(message)) if !message.is_empty() => message,
            _ => return None,
        };
        return Some(detail);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return Some(trimmed.to_owned());
    }
    None
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    title: Option<String>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Client, LookupError, status_detail};
    use anyhow::Result;
    use lexis_app::LookupOutcome;
    use std::time::Duration;

    fn client() -> Result<Client> {
        Client::new(
            "http://127.0.0.1:1/words.txt",
            "http://127.0.0.1:1/api/v2/entries/en/",
            Duration::from_secs(1),
        )
    }

    #[test]
    fn definition_url_escapes_word_as_single_segment() -> Result<()> {
        let client = client()?;
        assert_eq!(
            client.definition_url("cat").as_str(),
            "http://127.0.0.1:1/api/v2/entries/en/cat"
        );
        assert_eq!(
            client.definition_url("a/b c").as_str(),
            "http://127.0.0.1:1/api/v2/entries/en/a%2Fb%20c"
        );
        Ok(())
    }

    #[test]
    fn rejects_non_http_urls() {
        let error = Client::new(
            "file:///usr/share/dict/words",
            "https://example.test/entries",
            Duration::from_secs(1),
        )
        .expect_err("file URL should fail");
        assert!(error.to_string().contains("http:// or https://"));

        let error = Client::new("", "https://example.test", Duration::from_secs(1))
            .expect_err("empty URL should fail");
        assert!(error.to_string().contains("must not be empty"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let error = Client::new(
            "https://example.test/words.txt",
            "https://example.test/entries",
            Duration::ZERO,
        )
        .expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
    }

    #[test]
    fn lookup_errors_map_to_outcomes() {
        let not_found: LookupOutcome = LookupError::NotFound {
            word: "zzz".to_owned(),
        }
        .into();
        assert_eq!(not_found, LookupOutcome::NotFound);

        let failed: LookupOutcome = LookupError::Status {
            word: "cat".to_owned(),
            status: 500,
            detail: String::new(),
        }
        .into();
        assert!(matches!(failed, LookupOutcome::Failed(reason) if reason.contains("500")));
    }

    #[test]
    fn status_detail_reads_api_envelope() {
        assert_eq!(
            status_detail(r#"{"title":"No Definitions Found","message":"Sorry pal"}"#),
            Some("No Definitions Found: Sorry pal".to_owned())
        );
        assert_eq!(
            status_detail("upstream overloaded"),
            Some("upstream overloaded".to_owned())
        );
        assert_eq!(status_detail(""), None);
    }
}
