//! Build tool arguments.

use std::fmt;

use crate::core::scheme::TestIdentifier;

/// A single argument passed to the downstream build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildArgument {
    /// `-configuration <name>`
    Configuration(String),

    /// `KEY=value` build setting override
    XcArg(String, String),
}

impl BuildArgument {
    pub fn xcarg(key: impl Into<String>, value: impl Into<String>) -> Self {
        BuildArgument::XcArg(key.into(), value.into())
    }

    /// Render the argument as command-line words.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            BuildArgument::Configuration(name) => vec!["-configuration".to_string(), name.clone()],
            BuildArgument::XcArg(key, value) if value.is_empty() => vec![format!("{}=\"\"", key)],
            BuildArgument::XcArg(key, value) => vec![format!("{}={}", key, value)],
        }
    }
}

impl fmt::Display for BuildArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arguments().join(" "))
    }
}

/// Overrides that disable code signing, in the order they are passed.
pub fn skip_signing_arguments() -> [BuildArgument; 4] {
    [
        BuildArgument::xcarg("CODE_SIGN_IDENTITY", ""),
        BuildArgument::xcarg("CODE_SIGNING_REQUIRED", "NO"),
        BuildArgument::xcarg("CODE_SIGN_ENTITLEMENTS", ""),
        BuildArgument::xcarg("CODE_SIGNING_ALLOWED", "NO"),
    ]
}

/// Flatten build arguments into command-line words.
pub fn render(arguments: &[BuildArgument]) -> Vec<String> {
    arguments.iter().flat_map(BuildArgument::arguments).collect()
}

/// `-only-testing:` and `-skip-testing:` arguments, in input order.
pub fn test_selection_arguments(
    test_targets: &[TestIdentifier],
    skip_test_targets: &[TestIdentifier],
) -> Vec<String> {
    test_targets
        .iter()
        .map(|id| format!("-only-testing:{}", id))
        .chain(skip_test_targets.iter().map(|id| format!("-skip-testing:{}", id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_arguments() {
        let arguments = vec![
            BuildArgument::Configuration("Release".into()),
            BuildArgument::xcarg("CODE_SIGNING_ALLOWED", "NO"),
            BuildArgument::xcarg("CODE_SIGN_IDENTITY", ""),
        ];
        assert_eq!(
            render(&arguments),
            vec![
                "-configuration",
                "Release",
                "CODE_SIGNING_ALLOWED=NO",
                "CODE_SIGN_IDENTITY=\"\""
            ]
        );
        assert_eq!(arguments[0].to_string(), "-configuration Release");
    }

    #[test]
    fn test_selection_arguments_keep_input_order() {
        let only: Vec<TestIdentifier> = vec!["B/Case".parse().unwrap(), "A".parse().unwrap()];
        let skip: Vec<TestIdentifier> = vec!["A/Slow/testBig".parse().unwrap()];

        assert_eq!(
            test_selection_arguments(&only, &skip),
            vec![
                "-only-testing:B/Case",
                "-only-testing:A",
                "-skip-testing:A/Slow/testBig"
            ]
        );
        assert!(test_selection_arguments(&[], &[]).is_empty());
    }
}
