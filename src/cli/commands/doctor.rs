//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Pensum Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check API keys
    println!("{}", style("API Configuration").bold());
    let api_check = check_openai_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    // Check directories
    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Pensum.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Pensum is ready to use.");
    }

    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            CheckResult::ok("OPENAI_API_KEY", "configured")
        }
        _ => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set it with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check data, content, and database directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &data_dir.display().to_string(),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} does not exist", data_dir.display()),
            "Run 'pensum init' to create it",
        ));
    }

    let content_dir = settings.content_dir();
    if content_dir.is_dir() {
        let artifacts = std::fs::read_dir(&content_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        e.path().extension().and_then(|x| x.to_str()) == Some("txt")
                    })
                    .count()
            })
            .unwrap_or(0);

        if artifacts > 0 {
            results.push(CheckResult::ok(
                "Content directory",
                &format!("{} ({} lecture files)", content_dir.display(), artifacts),
            ));
        } else {
            results.push(CheckResult::warning(
                "Content directory",
                &format!("{} contains no .txt files", content_dir.display()),
                "Add extracted lecture text files before indexing",
            ));
        }
    } else {
        results.push(CheckResult::error(
            "Content directory",
            &format!("{} does not exist", content_dir.display()),
            "Create it or set content.dir in the config",
        ));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        results.push(CheckResult::ok(
            "Index database",
            &db_path.display().to_string(),
        ));
    } else {
        results.push(CheckResult::warning(
            "Index database",
            "not built yet",
            "Run 'pensum index' to build it",
        ));
    }

    results
}

/// Check whether a config file is present.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "not found, using defaults",
            "Run 'pensum init' or 'pensum config edit' to create one",
        )
    }
}
