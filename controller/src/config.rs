use crate::error::{self, Result};
use clap::Parser;
use kube::api::GroupVersionKind;
use log::LevelFilter;
use reqsync_model::constants::DEFAULT_FIELD_MANAGER;
use reqsync_model::FieldPath;
use reqsync_propagator::LateInitFields;
use snafu::{ensure, OptionExt};
use std::path::PathBuf;
use std::time::Duration;

const UNITS: [(char, u64); 3] = [('d', 86400), ('h', 3600), ('m', 60)];

/// Keeps requirements in a local cluster in sync with their counterparts in a remote cluster.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub(crate) struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    pub(crate) log_level: LevelFilter,

    /// Path to the kubeconfig of the local cluster. In-cluster configuration or `KUBECONFIG` is
    /// used when absent.
    #[clap(long = "local-kubeconfig", env = "REQSYNC_LOCAL_KUBECONFIG")]
    pub(crate) local_kubeconfig: Option<PathBuf>,

    /// Path to the kubeconfig of the remote cluster.
    #[clap(long = "remote-kubeconfig", env = "REQSYNC_REMOTE_KUBECONFIG")]
    pub(crate) remote_kubeconfig: PathBuf,

    /// The API group of the requirement kind, e.g. `database.example.org`.
    #[clap(long = "group", env = "REQSYNC_GROUP")]
    pub(crate) group: String,

    /// The API version of the requirement kind, e.g. `v1alpha1`.
    #[clap(long = "api-version", env = "REQSYNC_API_VERSION")]
    pub(crate) api_version: String,

    /// The requirement kind, e.g. `PostgreSQLInstanceRequirement`.
    #[clap(long = "kind", env = "REQSYNC_KIND")]
    pub(crate) kind: String,

    /// Only watch requirements in this local namespace.
    #[clap(long = "local-namespace", env = "REQSYNC_LOCAL_NAMESPACE")]
    pub(crate) local_namespace: Option<String>,

    /// The remote namespace requirements are synced into.
    #[clap(long = "remote-namespace", env = "REQSYNC_REMOTE_NAMESPACE")]
    pub(crate) remote_namespace: String,

    /// The field manager used for server-side apply on both clusters.
    #[clap(
        long = "field-manager",
        env = "REQSYNC_FIELD_MANAGER",
        default_value = DEFAULT_FIELD_MANAGER
    )]
    pub(crate) field_manager: String,

    /// How long to wait between sync passes of a requirement, e.g. `30s` or `1h5m`.
    #[clap(
        long = "requeue-interval",
        env = "REQSYNC_REQUEUE_INTERVAL",
        default_value = "30s",
        parse(try_from_str = parse_duration)
    )]
    pub(crate) requeue_interval: Duration,

    /// A dotted `spec` path that may be late-initialized from the remote requirement. Can be
    /// repeated. Every top-level field is eligible when none is given.
    #[clap(long = "late-init-field")]
    pub(crate) late_init_fields: Vec<String>,
}

impl Args {
    pub(crate) fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.api_version, &self.kind)
    }

    pub(crate) fn late_init_fields(&self) -> LateInitFields {
        if self.late_init_fields.is_empty() {
            LateInitFields::All
        } else {
            LateInitFields::Only(
                self.late_init_fields
                    .iter()
                    .map(|path| FieldPath::from(path.as_str()))
                    .collect(),
            )
        }
    }
}

/// Parse a duration such as `1d2h3m4s`. Units must appear in that order and a bare number is a
/// number of seconds.
pub(crate) fn parse_duration(input: &str) -> Result<Duration> {
    ensure!(
        !input.is_empty(),
        error::DurationSnafu {
            input,
            reason: "empty duration",
        }
    );
    let mut secs: u64 = 0;
    let mut rest = input;
    for (unit, multiplier) in UNITS {
        if let Some((value, tail)) = rest.split_once(unit) {
            secs = add_secs(input, secs, parse_count(input, value)?.checked_mul(multiplier))?;
            rest = tail;
        }
    }
    if let Some(value) = rest.strip_suffix('s') {
        secs = add_secs(input, secs, Some(parse_count(input, value)?))?;
    } else if !rest.is_empty() {
        ensure!(
            rest.len() == input.len(),
            error::DurationSnafu {
                input,
                reason: format!("trailing '{}' has no unit", rest),
            }
        );
        secs = add_secs(input, secs, Some(parse_count(input, rest)?))?;
    }
    Ok(Duration::from_secs(secs))
}

/// Add `more` seconds to `secs`. `None` means the number of seconds already overflowed.
fn add_secs(input: &str, secs: u64, more: Option<u64>) -> Result<u64> {
    more.and_then(|more| secs.checked_add(more))
        .context(error::DurationSnafu {
            input,
            reason: "duration is too long",
        })
}

fn parse_count(input: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().ok().context(error::DurationSnafu {
        input,
        reason: format!("'{}' is not a number", value),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_units() {
        assert_eq!(
            parse_duration("1d2h3m4s").unwrap(),
            Duration::from_secs(93784)
        );
    }

    #[test]
    fn some_units() {
        assert_eq!(
            parse_duration("1d3m4s").unwrap(),
            Duration::from_secs(86584)
        );
        assert_eq!(parse_duration("1h5m").unwrap(), Duration::from_secs(3900));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("500s").unwrap(), Duration::from_secs(500));
    }

    #[test]
    fn no_units() {
        assert_eq!(parse_duration("5123").unwrap(), Duration::from_secs(5123));
    }

    #[test]
    fn invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10d5m3h2s").is_err());
        assert!(parse_duration("5y40s").is_err());
        assert!(parse_duration("5hm4s").is_err());
        assert!(parse_duration("1h30").is_err());
    }

    #[test]
    fn overflow() {
        assert!(parse_duration("99999999999999999d").is_err());
        assert!(parse_duration("18446744073709551615m").is_err());
        assert!(parse_duration("18446744073709551615s").is_ok());
        assert!(parse_duration("1m18446744073709551615s").is_err());
    }

    #[test]
    fn args() {
        let args = Args::try_parse_from([
            "reqsync-controller",
            "--remote-kubeconfig",
            "/etc/reqsync/remote.yaml",
            "--group",
            "database.example.org",
            "--api-version",
            "v1alpha1",
            "--kind",
            "PostgreSQLInstanceRequirement",
            "--remote-namespace",
            "fulfillment",
            "--late-init-field",
            "storage.size",
            "--late-init-field",
            "version",
        ])
        .unwrap();
        assert_eq!(args.field_manager, DEFAULT_FIELD_MANAGER);
        assert_eq!(args.requeue_interval, Duration::from_secs(30));
        assert_eq!(args.gvk().kind, "PostgreSQLInstanceRequirement");
        assert_eq!(
            args.late_init_fields(),
            LateInitFields::Only(vec!["storage.size".into(), "version".into()])
        );
    }
}
