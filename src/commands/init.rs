use std::io::{self, Write};
use std::path::Path;

use crate::config::{Config, LOCAL_CONFIG_FILE};
use crate::error::{Result, SonarError};

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub async fn run(workspace: &Path) -> Result<()> {
    let config_path = workspace.join(LOCAL_CONFIG_FILE);

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Sonar Sync Configuration");
    println!("========================\n");

    let host = prompt("SonarQube server URL (e.g., https://sonar.example.com/): ")?;
    if host.is_empty() {
        return Err(SonarError::MissingSetting("host"));
    }

    let project_key = prompt("Project key: ")?;
    if project_key.is_empty() {
        return Err(SonarError::MissingSetting("projectKey"));
    }

    let token = prompt("User token (leave empty to use SONAR_TOKEN): ")?;
    let cookie = prompt("Cookie header [optional]: ")?;

    let config = Config {
        host,
        token,
        project_key,
        cookie: Some(cookie).filter(|c| !c.is_empty()),
        ..Config::default()
    };

    let contents = serde_json::to_string_pretty(&config)?;
    std::fs::write(&config_path, format!("{contents}\n")).map_err(|e| {
        SonarError::ConfigWrite {
            path: config_path.clone(),
            source: e,
        }
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run 'sonar-sync sync' to fetch issues.");

    Ok(())
}
