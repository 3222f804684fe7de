use leadwise_agent::load_segment_stats;
use leadwise_core::config::{AppConfig, LlmProvider, LoadOptions};
use leadwise_db::connect;
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Pass => "ok",
            Self::Fail => "fail",
            Self::Skipped => "skip",
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: String) -> Self {
        Self { name, status: CheckStatus::Pass, details }
    }

    fn fail(name: &'static str, details: String) -> Self {
        Self { name, status: CheckStatus::Fail, details }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: "skipped because configuration did not load".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: &[&str] = &["llm_readiness", "segment_stats", "database_connectivity"];

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        })
    } else {
        render_human(&report)
    }
}

fn build_report() -> DoctorReport {
    let checks = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let mut checks = vec![DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated".to_string(),
            )];
            checks.push(check_llm_readiness(&config));
            checks.push(check_segment_stats(&config));
            checks.push(check_database_connectivity(&config));
            checks
        }
        Err(error) => {
            let mut checks = vec![DoctorCheck::fail("config_validation", error.to_string())];
            checks.extend(DEPENDENT_CHECKS.iter().copied().map(DoctorCheck::skipped));
            checks
        }
    };

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    DoctorReport {
        overall_status: if all_pass { CheckStatus::Pass } else { CheckStatus::Fail },
        summary: if all_pass {
            "doctor: all readiness checks passed".to_string()
        } else {
            "doctor: one or more readiness checks failed".to_string()
        },
        checks,
    }
}

fn check_llm_readiness(config: &AppConfig) -> DoctorCheck {
    // Credentials themselves are enforced by config validation; this
    // reports what the runtime will actually talk to.
    let details = match config.llm.provider {
        LlmProvider::Ollama => format!(
            "ollama model `{}` via `{}`",
            config.llm.model,
            config.llm.base_url.as_deref().unwrap_or("<unset>")
        ),
        provider => format!("{provider:?} model `{}` with api key configured", config.llm.model),
    };
    DoctorCheck::pass("llm_readiness", details)
}

fn check_segment_stats(config: &AppConfig) -> DoctorCheck {
    let stats = load_segment_stats(config.data.segment_stats_path.as_deref());
    let source = match &config.data.segment_stats_path {
        Some(path) => format!("file `{}` (built-in fallback on error)", path.display()),
        None => "built-in figures".to_string(),
    };
    DoctorCheck::pass("segment_stats", format!("{} segments from {source}", stats.len()))
}

fn check_database_connectivity(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::fail(
                "database_connectivity",
                format!("failed to initialize async runtime: {error}"),
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        pool.close().await;
        Ok::<(), String>(())
    });

    match result {
        Ok(()) => DoctorCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        ),
        Err(error) => DoctorCheck::fail("database_connectivity", error),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        lines.push(format!("- [{}] {}: {}", check.status.marker(), check.name, check.details));
    }
    lines.join("\n")
}
