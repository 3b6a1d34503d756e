use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::storage::bucket::user_digest;
use crate::storage::{project_active_set, read_log_file};
use crate::types::{Direction, UserId};
use serde::Serialize;

use crate::admin::util::{file_name, scan_store, StoreLayout};
use crate::admin::Result;

const MAX_FINDINGS: usize = 32;

/// Specifies the depth of verification checks to perform.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Directory layout only: owner markers and bucket placement.
    Fast,
    /// Layout plus every log: malformed records and one-sided edges.
    Full,
}

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// What was scanned; always the first finding.
    Info,
    /// Tolerated damage: reads still work but data is incomplete.
    Warning,
    /// A user directory that the store can no longer reach.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

/// Statistics collected during the verification process.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// User directories with a readable owner marker.
    pub users_found: u64,
    /// Records decoded across all logs.
    pub records_read: u64,
    /// Lines that failed to decode.
    pub malformed_records: u64,
    /// Active edges in `following` logs.
    pub active_edges: u64,
    /// Edges present in one log but missing from its mirror.
    pub one_sided_edges: u64,
}

/// Complete report of a verification operation.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The verification level that was performed.
    pub level: VerifyLevel,
    /// Whether verification found no error-level issues.
    pub success: bool,
    /// Issues discovered, capped at a fixed number.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the data examined.
    pub counts: VerifyCounts,
}

/// Verifies a store root without modifying it.
///
/// One-sided edges and malformed lines are reported as warnings: the store
/// tolerates both and never repairs them. Directories that cannot be mapped
/// back to their user are errors.
///
/// # Errors
///
/// Returns an error if the root is not a store or if I/O operations fail.
pub fn verify(root: impl AsRef<Path>, level: VerifyLevel) -> Result<VerifyReport> {
    let layout = scan_store(root.as_ref())?;
    let mut findings = Vec::new();
    let mut counts = VerifyCounts {
        users_found: layout.users.len() as u64,
        ..VerifyCounts::default()
    };

    push(
        &mut findings,
        VerifySeverity::Info,
        format!(
            "{level:?} verification of {} users in {} buckets",
            layout.users.len(),
            layout.buckets
        ),
    );
    check_layout(&layout, &mut findings);
    if matches!(level, VerifyLevel::Full) {
        check_logs(&layout, &mut findings, &mut counts)?;
    }

    Ok(VerifyReport {
        level,
        success: !findings
            .iter()
            .any(|finding| finding.severity == VerifySeverity::Error),
        findings,
        counts,
    })
}

fn check_layout(layout: &StoreLayout, findings: &mut Vec<VerifyFinding>) {
    for orphan in &layout.orphans {
        push(
            findings,
            VerifySeverity::Error,
            format!("user directory {} has no owner marker", orphan.display()),
        );
    }
    for user in &layout.users {
        let digest = user_digest(&user.id);
        if file_name(&user.dir) != digest || !digest.starts_with(&user.bucket) {
            push(
                findings,
                VerifySeverity::Error,
                format!(
                    "user '{}' is stored at {} which does not match its digest",
                    user.id,
                    user.dir.display()
                ),
            );
        }
    }
}

fn check_logs(
    layout: &StoreLayout,
    findings: &mut Vec<VerifyFinding>,
    counts: &mut VerifyCounts,
) -> Result<()> {
    let separator = layout.config.separator.as_str();
    let mut following: HashMap<&UserId, HashSet<UserId>> = HashMap::new();
    let mut followers: HashMap<&UserId, HashSet<UserId>> = HashMap::new();

    for user in &layout.users {
        for direction in Direction::ALL {
            let history = read_log_file(&user.dir.join(direction.file_name()), separator)?;
            counts.records_read += history.records.len() as u64;
            counts.malformed_records += history.skipped.len() as u64;
            for skipped in &history.skipped {
                push(
                    findings,
                    VerifySeverity::Warning,
                    format!("{} log of '{}': {skipped}", direction, user.id),
                );
            }
            let active: HashSet<UserId> = project_active_set(&history.records)
                .into_iter()
                .collect();
            match direction {
                Direction::Following => following.insert(&user.id, active),
                Direction::Followers => followers.insert(&user.id, active),
            };
        }
    }

    let empty = HashSet::new();
    for (user, targets) in &following {
        counts.active_edges += targets.len() as u64;
        for target in targets {
            let mirror = followers.get(target).unwrap_or(&empty);
            if !mirror.contains(*user) {
                counts.one_sided_edges += 1;
                push(
                    findings,
                    VerifySeverity::Warning,
                    format!("'{user}' follows '{target}' but is missing from its followers log"),
                );
            }
        }
    }
    for (user, sources) in &followers {
        for source in sources {
            let mirror = following.get(source).unwrap_or(&empty);
            if !mirror.contains(*user) {
                counts.one_sided_edges += 1;
                push(
                    findings,
                    VerifySeverity::Warning,
                    format!("'{user}' lists follower '{source}' which does not follow it"),
                );
            }
        }
    }
    Ok(())
}

fn push(findings: &mut Vec<VerifyFinding>, severity: VerifySeverity, message: impl Into<String>) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding {
            severity,
            message: message.into(),
        });
    }
}
