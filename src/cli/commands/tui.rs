use anyhow::{Context, Result};
use clap::Args;
use reqwest::Url;
use std::sync::Arc;

use crate::api::constants::SURVEY_ID_PARAM;
use crate::api::{DashboardApi, PraxisClient};
use crate::config::Config;
use crate::dashboard::{HttpTemplateSource, TemplateSource};
use crate::tui::apps::dashboard::{DashboardApp, InitParams};

#[derive(Args, Default)]
pub struct TuiCommands {
    /// Dashboard URL to start from; a `survey_id` query parameter opens that survey
    #[arg(long, conflicts_with = "survey_id")]
    pub entry_url: Option<String>,

    /// Open a survey directly
    #[arg(long)]
    pub survey_id: Option<String>,
}

pub async fn tui_command(args: TuiCommands, config: &Config) -> Result<()> {
    let entry_survey_id = match (&args.survey_id, &args.entry_url) {
        (Some(id), _) => Some(id.clone()),
        (None, Some(url)) => survey_id_from_url(url)?,
        (None, None) => None,
    };

    let api: Arc<dyn DashboardApi> = Arc::new(PraxisClient::new(
        config.api_base_url.clone(),
        config.request_timeout(),
        config.retry.to_retry_config(),
    )?);
    let templates: Arc<dyn TemplateSource> = Arc::new(HttpTemplateSource::new(
        config.template_base_url.clone(),
        config.request_timeout(),
    )?);

    log::info!(
        "Launching dashboard against {} (templates from {})",
        config.api_base_url,
        config.template_base_url
    );

    crate::tui::launch::<DashboardApp>(InitParams {
        api,
        templates,
        sample_course_id: config.sample_course_id.clone(),
        survey_base_url: config.survey_base_url.clone(),
        tick_interval: config.tick_interval(),
        entry_survey_id,
    })
    .await
}

/// The survey a dashboard URL points at, if any
pub fn survey_id_from_url(url: &str) -> Result<Option<String>> {
    let url = Url::parse(url).with_context(|| format!("Invalid entry URL: {}", url))?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == SURVEY_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty()))
}
