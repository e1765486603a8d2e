use tabled::Tabled;

use crate::client::SonarClient;
use crate::commands::Context;
use crate::config::ConfigSource;
use crate::error::Result;
use crate::output;

#[derive(Tabled)]
struct BranchRow {
    #[tabled(rename = "Branch")]
    name: String,
}

pub async fn list(ctx: &Context) -> Result<()> {
    let config = ctx.config.load()?;
    let client = SonarClient::new(&config)?;
    let branches = client.fetch_branches().await?;

    if branches.is_empty() {
        output::print_message(&format!("No branches found for {}", config.project_key));
        return Ok(());
    }

    output::print_table(&branches, |name| BranchRow { name: name.clone() });
    Ok(())
}
