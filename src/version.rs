//! Build metadata reported by `stablemcp version`
//!
//! The version comes from the package manifest. Build date, commit and branch
//! are read from `STABLEMCP_BUILD_DATE`, `STABLEMCP_GIT_COMMIT` and
//! `STABLEMCP_GIT_BRANCH` at compile time and read `unknown` when unset.

use std::fmt;

use serde::Serialize;

use crate::logging::render;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_DATE: &str = or_unknown(option_env!("STABLEMCP_BUILD_DATE"));
pub const GIT_COMMIT: &str = or_unknown(option_env!("STABLEMCP_GIT_COMMIT"));
pub const GIT_BRANCH: &str = or_unknown(option_env!("STABLEMCP_GIT_BRANCH"));

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(value) => value,
        None => "unknown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_date: &'static str,
    pub git_commit: &'static str,
    pub git_branch: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: VERSION,
            build_date: BUILD_DATE,
            git_commit: GIT_COMMIT,
            git_branch: GIT_BRANCH,
        }
    }

    /// Indented JSON with sorted keys.
    pub fn to_json(&self) -> String {
        render(self)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StableMCP Version: {}", self.version)?;
        writeln!(f, "Build Date: {}", self.build_date)?;
        writeln!(f, "Git Commit: {}", self.git_commit)?;
        write!(f, "Git Branch: {}", self.git_branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildInfo {
        BuildInfo {
            version: "1.2.3",
            build_date: "2025-04-01T12:00:00Z",
            git_commit: "abcdef123456",
            git_branch: "main",
        }
    }

    #[test]
    fn current_reports_package_version() {
        let info = BuildInfo::current();

        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.build_date.is_empty());
        assert!(!info.git_commit.is_empty());
        assert!(!info.git_branch.is_empty());
    }

    #[test]
    fn json_uses_sorted_camel_case_keys() {
        assert_eq!(
            sample().to_json(),
            concat!(
                "{\n",
                "  \"buildDate\": \"2025-04-01T12:00:00Z\",\n",
                "  \"gitBranch\": \"main\",\n",
                "  \"gitCommit\": \"abcdef123456\",\n",
                "  \"version\": \"1.2.3\"\n",
                "}"
            )
        );
    }

    #[test]
    fn text_lists_one_field_per_line() {
        assert_eq!(
            sample().to_string(),
            "StableMCP Version: 1.2.3\nBuild Date: 2025-04-01T12:00:00Z\nGit Commit: abcdef123456\nGit Branch: main"
        );
    }

    #[test]
    fn unset_build_variables_read_unknown() {
        assert_eq!(or_unknown(None), "unknown");
        assert_eq!(or_unknown(Some("feature/x")), "feature/x");
    }
}
