use crate::agent::AgentResponse;
use crate::cli::Cli;
use crate::error::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let coordinator = super::connect(cli).await?;
    let viewport = coordinator.viewport().await?;

    let response = AgentResponse::Viewport {
        width: viewport.width,
        height: viewport.height,
    };
    super::print_response(cli, &response, "", "")
}
