use serde::{Deserialize, Serialize};
use std::fmt;

/// Host platform, detected once at startup to seed browser defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Macos,
    Linux,
    #[default]
    Unknown,
}

impl Platform {
    /// Detect the platform this process was compiled for.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "linux" => Self::Linux,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }

    pub fn default_user_agent(self) -> &'static str {
        match self {
            Self::Windows => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            }
            Self::Macos => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            }
            Self::Linux => {
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            }
            Self::Unknown => "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        }
    }

    pub fn default_browser_path(self) -> Option<&'static str> {
        match self {
            Self::Windows => Some(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            Self::Macos => Some("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            Self::Linux => Some("/usr/bin/google-chrome"),
            Self::Unknown => None,
        }
    }

    pub fn supports_proxy(self) -> bool {
        self != Self::Unknown
    }

    pub fn supports_extensions(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Windows => "Windows",
            Self::Macos => "macOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("macos"), Platform::Macos);
        assert_eq!(Platform::from_os("freebsd"), Platform::Unknown);
    }

    #[test]
    fn test_unknown_platform_capabilities() {
        assert!(!Platform::Unknown.supports_proxy());
        assert!(!Platform::Unknown.supports_extensions());
        assert!(Platform::Unknown.default_browser_path().is_none());
        assert!(Platform::Linux.supports_proxy());
    }
}
