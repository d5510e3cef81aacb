//! Which launcher the integrator settings select.

use secrecy::ExposeSecret;

use crate::errors::{Result, SettingsError};
use crate::types::{ApiKey, IntegratorSettings, LoadTestSettings, TriggerSettings};

/// A fully-specified launch destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LauncherTarget {
    /// An integrator service reachable over HTTP.
    Http {
        /// Base URL; sessions are started at `{base_url}/start-session`.
        base_url: String,
        /// Repetition for load testing.
        load_test: LoadTestSettings,
    },
    /// An integrator function invoked asynchronously.
    Lambda {
        /// Function name or ARN.
        function_name: String,
    },
    /// An integrator task run on ECS Fargate.
    Fargate(FargateTarget),
}

/// Everything needed to run one integrator task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FargateTarget {
    /// ECS cluster.
    pub cluster: String,
    /// Task definition family or ARN.
    pub task_definition: String,
    /// Security group for the task's network interface.
    pub security_group: String,
    /// Subnets for the task's network interface.
    pub subnets: Vec<String>,
    /// Container receiving the environment overrides.
    pub container_name: String,
    /// Passed through to the container as `DEEPGRAM_API_KEY`.
    pub deepgram_api_key: ApiKey,
    /// Passed through to the container as `APP_REGION`.
    pub aws_region: String,
}

impl LauncherTarget {
    /// Pick a launcher: a URL wins, then a function name, then Fargate.
    ///
    /// Fargate needs every one of its fields; the first missing one is
    /// reported by env var name.
    pub fn resolve(integrator: &IntegratorSettings, load_test: LoadTestSettings) -> Result<Self> {
        if let Some(url) = non_empty(integrator.url.as_ref()) {
            return Ok(Self::Http {
                base_url: url.trim_end_matches('/').to_string(),
                load_test,
            });
        }
        if let Some(function_name) = non_empty(integrator.lambda.as_ref()) {
            return Ok(Self::Lambda {
                function_name: function_name.to_string(),
            });
        }

        let cluster = require(integrator.cluster.as_ref(), "KVS_DG_INTEGRATOR_CLUSTER")?;
        let task_definition = require(
            integrator.task_definition.as_ref(),
            "KVS_DG_INTEGRATOR_TASK_DEFINITION",
        )?;
        let security_group = require(
            integrator.security_group.as_ref(),
            "KVS_DG_INTEGRATOR_SECURITY_GROUP",
        )?;
        if integrator.subnets.is_empty() {
            return Err(SettingsError::Missing("KVS_DG_INTEGRATOR_SUBNETS"));
        }
        let deepgram_api_key = integrator
            .deepgram_api_key
            .clone()
            .filter(|k| !k.expose_secret().is_empty())
            .ok_or(SettingsError::Missing("DEEPGRAM_API_KEY"))?;
        let aws_region = require(integrator.aws_region.as_ref(), "AWS_REGION")?;

        Ok(Self::Fargate(FargateTarget {
            cluster,
            task_definition,
            security_group,
            subnets: integrator.subnets.clone(),
            container_name: integrator.container_name.clone(),
            deepgram_api_key,
            aws_region,
        }))
    }

    /// Short name for logs and health output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Lambda { .. } => "lambda",
            Self::Fargate(_) => "fargate",
        }
    }
}

impl TriggerSettings {
    /// Resolve the launcher these settings select.
    pub fn launcher_target(&self) -> Result<LauncherTarget> {
        LauncherTarget::resolve(&self.integrator, self.load_test)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn require(value: Option<&String>, var: &'static str) -> Result<String> {
    non_empty(value)
        .map(str::to_string)
        .ok_or(SettingsError::Missing(var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fargate_settings() -> IntegratorSettings {
        IntegratorSettings {
            cluster: Some("dg-cluster".into()),
            task_definition: Some("dg-task".into()),
            security_group: Some("sg-1".into()),
            subnets: vec!["subnet-a".into(), "subnet-b".into()],
            deepgram_api_key: Some(ApiKey::new("key")),
            aws_region: Some("us-east-1".into()),
            ..IntegratorSettings::default()
        }
    }

    #[test]
    fn url_wins() {
        let integrator = IntegratorSettings {
            url: Some("http://integrator:8080/".into()),
            lambda: Some("fn".into()),
            ..fargate_settings()
        };
        let target = LauncherTarget::resolve(&integrator, LoadTestSettings::default()).unwrap();
        assert_matches!(
            &target,
            LauncherTarget::Http { base_url, .. } if base_url == "http://integrator:8080"
        );
        assert_eq!(target.kind(), "http");
    }

    #[test]
    fn lambda_before_fargate() {
        let integrator = IntegratorSettings {
            lambda: Some("dg-integrator".into()),
            ..fargate_settings()
        };
        let target = LauncherTarget::resolve(&integrator, LoadTestSettings::default()).unwrap();
        assert_eq!(
            target,
            LauncherTarget::Lambda {
                function_name: "dg-integrator".into()
            }
        );
    }

    #[test]
    fn fargate_with_everything() {
        let target =
            LauncherTarget::resolve(&fargate_settings(), LoadTestSettings::default()).unwrap();
        let LauncherTarget::Fargate(fargate) = target else {
            panic!("expected fargate target");
        };
        assert_eq!(fargate.cluster, "dg-cluster");
        assert_eq!(fargate.subnets, vec!["subnet-a", "subnet-b"]);
        assert_eq!(fargate.container_name, "kvs-dg-integrator-container");
        assert_eq!(fargate.aws_region, "us-east-1");
    }

    #[test]
    fn fargate_reports_first_missing_variable() {
        let cases: [(fn(&mut IntegratorSettings), &str); 6] = [
            (|s| s.cluster = None, "KVS_DG_INTEGRATOR_CLUSTER"),
            (|s| s.task_definition = None, "KVS_DG_INTEGRATOR_TASK_DEFINITION"),
            (|s| s.security_group = None, "KVS_DG_INTEGRATOR_SECURITY_GROUP"),
            (|s| s.subnets.clear(), "KVS_DG_INTEGRATOR_SUBNETS"),
            (|s| s.deepgram_api_key = None, "DEEPGRAM_API_KEY"),
            (|s| s.aws_region = None, "AWS_REGION"),
        ];
        for (strip, expected) in cases {
            let mut integrator = fargate_settings();
            strip(&mut integrator);
            let err =
                LauncherTarget::resolve(&integrator, LoadTestSettings::default()).unwrap_err();
            assert_matches!(err, SettingsError::Missing(var) if var == expected);
        }
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let integrator = IntegratorSettings {
            url: Some(String::new()),
            cluster: Some(String::new()),
            ..fargate_settings()
        };
        let err = LauncherTarget::resolve(&integrator, LoadTestSettings::default()).unwrap_err();
        assert_matches!(err, SettingsError::Missing("KVS_DG_INTEGRATOR_CLUSTER"));
    }

    #[test]
    fn defaults_have_no_target() {
        let err = TriggerSettings::default().launcher_target().unwrap_err();
        assert_eq!(
            err.to_string(),
            "please provide the KVS_DG_INTEGRATOR_CLUSTER env variable"
        );
    }

    #[test]
    fn http_target_carries_load_test() {
        let mut settings = TriggerSettings::default();
        settings.integrator.url = Some("http://localhost:8080".into());
        settings.load_test.session_count = 4;
        assert_matches!(
            settings.launcher_target().unwrap(),
            LauncherTarget::Http { load_test, .. } if load_test.session_count == 4
        );
    }
}
