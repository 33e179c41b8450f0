//! Opening the external search page for a query.

use std::process::Command;
use thiserror::Error;

/// Host used when none is configured
pub const DEFAULT_SEARCH_HOST: &str = "pubmed.ncbi.nlm.nih.gov";

/// URL launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Exit { program: String, status: String },
}

/// Something that can show a URL to the user
pub trait UrlOpener {
    /// Open `url`
    fn open(&mut self, url: &str) -> Result<(), LaunchError>;
}

/// Build `https://<host>/?term=<percent-encoded query>`
pub fn search_url(host: &str, query: &str) -> String {
    format!(
        "https://{}/?term={}",
        host.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Opens URLs in the desktop browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUrlOpener;

impl SystemUrlOpener {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        }
        #[cfg(not(any(target_os = "macos", windows)))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl UrlOpener for SystemUrlOpener {
    fn open(&mut self, url: &str) -> Result<(), LaunchError> {
        let mut cmd = Self::command(url);
        let program = cmd.get_program().to_string_lossy().to_string();

        let status = cmd.status().map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;

        if status.success() {
            tracing::debug!("Opened {} with {}", url, program);
            Ok(())
        } else {
            Err(LaunchError::Exit {
                program,
                status: status.to_string(),
            })
        }
    }
}

/// Records URLs instead of opening them
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Vec<String>,
}

impl RecordingOpener {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far, oldest first
    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&mut self, url: &str) -> Result<(), LaunchError> {
        self.opened.push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url(DEFAULT_SEARCH_HOST, "\"a b\"[Title] AND (1[PMID])");
        assert_eq!(
            url,
            "https://pubmed.ncbi.nlm.nih.gov/?term=%22a%20b%22%5BTitle%5D%20AND%20%281%5BPMID%5D%29"
        );
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        assert_eq!(
            search_url("example.org/", "x"),
            "https://example.org/?term=x"
        );
    }

    #[test]
    fn test_recording_opener() {
        let mut opener = RecordingOpener::new();
        opener.open("https://example.org").unwrap();
        assert_eq!(opener.opened(), ["https://example.org".to_string()]);
    }
}
