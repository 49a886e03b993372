//! Site command handler.
//!
//! The site list is public: no credentials are resolved for it.

use serde_json::Value;

use iotlab_api::{HttpTransport, SiteDirectory, request::parse_base_url};
use iotlab_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    directory: &SiteDirectory,
    config: &Config,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let transport = HttpTransport::new(&config.transport_config())?;
    let base_url = parse_base_url(config.api_url())?;

    let names = directory.site_names(&transport, &base_url).await?;

    let value = Value::from(names);
    output::print_output(&output::render_value(format, &value)?, global.quiet);
    Ok(())
}
