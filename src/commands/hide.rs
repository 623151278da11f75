use crate::cli::Cli;
use crate::error::{HiderError, Result};

pub async fn run(
    cli: &Cli,
    x: Option<f64>,
    y: Option<f64>,
    selector: Option<&str>,
    url: Option<&str>,
) -> Result<()> {
    if selector.is_none() && (x.is_none() || y.is_none()) {
        return Err(HiderError::Other(
            "provide x and y coordinates, or --selector".to_string(),
        ));
    }

    let mut coordinator = super::connect(cli).await?;

    let response = match selector {
        Some(selector) => coordinator.hide_by_selector(selector, url).await?,
        None => {
            coordinator
                .hide_at_point(x.unwrap_or(f64::NAN), y.unwrap_or(f64::NAN))
                .await?
        }
    };

    super::print_response(cli, &response, "Element hidden", "Element already hidden")
}
