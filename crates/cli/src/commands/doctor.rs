use dropcart_core::config::{AppConfig, LoadOptions};
use dropcart_core::{Cart, PackPricingEngine, PricingEngine};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_pricing(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_ingestion",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "pricing_self_check",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    match config.load_catalog() {
        Ok(catalog) if catalog.is_empty() => DoctorCheck {
            name: "catalog_ingestion",
            status: CheckStatus::Fail,
            details: "catalog loaded but lists no products".to_string(),
        },
        Ok(catalog) => DoctorCheck {
            name: "catalog_ingestion",
            status: CheckStatus::Pass,
            details: format!("{} products validated", catalog.len()),
        },
        Err(error) => {
            DoctorCheck { name: "catalog_ingestion", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_pricing(config: &AppConfig) -> DoctorCheck {
    let policy = match config.pricing_policy() {
        Ok(policy) => policy,
        Err(error) => {
            return DoctorCheck {
                name: "pricing_self_check",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let breakdown = PackPricingEngine::new(policy).price(&Cart::new());
    if breakdown.grand_total == Decimal::ZERO && breakdown.rounded_selling_total == Decimal::ZERO {
        DoctorCheck {
            name: "pricing_self_check",
            status: CheckStatus::Pass,
            details: "empty cart prices to zero".to_string(),
        }
    } else {
        DoctorCheck {
            name: "pricing_self_check",
            status: CheckStatus::Fail,
            details: format!("empty cart priced at {}", breakdown.grand_total),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
