use memory_core::models::{PolicyName, WritePolicyReport, WritePolicyViolation};
use memory_core::traits::{IWritePolicy, WritePolicyInput};

fn policy_name(raw: &str) -> PolicyName {
    match raw {
        "content" => PolicyName::Content,
        "confidence" => PolicyName::Confidence,
        "attribution" => PolicyName::Attribution,
        "duplicate" => PolicyName::Duplicate,
        other => panic!("unregistered write policy name: {other}"),
    }
}

/// Runs every synchronous policy in order against one input. A failing
/// policy does not stop later policies from also running — every
/// violation is collected before the verdict is decided.
pub fn run_policies(policies: &[&dyn IWritePolicy], input: &WritePolicyInput) -> WritePolicyReport {
    let mut violations = Vec::new();
    for policy in policies {
        if let Err(reason) = policy.validate(input) {
            violations.push(WritePolicyViolation { policy: policy_name(policy.name()), reason });
        }
    }
    WritePolicyReport { passed: violations.is_empty(), violations, warnings: Vec::new() }
}

/// Folds a duplicate-check warning (if any) into an already-run report.
/// Warnings never flip `passed` to false.
pub fn with_duplicate_warning(mut report: WritePolicyReport, warning: Option<String>) -> WritePolicyReport {
    if let Some(warning) = warning {
        tracing::warn!(%warning, "write-policy duplicate warning");
        report.warnings.push(warning);
    }
    report
}
