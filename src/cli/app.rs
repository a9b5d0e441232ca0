use super::commands::config::ConfigCommands;
use super::commands::tui::TuiCommands;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "praxis")]
#[command(about = "Instructor dashboard for Praxis lecture analytics")]
pub struct Cli {
    /// Override the REST base path from the config file
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Override where screen and modal templates are fetched from
    #[arg(long, global = true)]
    pub template_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard (default)
    Tui(TuiCommands),
    /// List courses
    Courses,
    /// Show or reset the configuration
    Config(ConfigCommands),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["praxis"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_entry_url_and_survey_id_conflict() {
        let result = Cli::try_parse_from(["praxis", "tui", "--entry-url", "http://x/?survey_id=1", "--survey-id", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_override_after_subcommand() {
        let cli = Cli::try_parse_from(["praxis", "courses", "--api-base-url", "http://api.test"]).unwrap();
        assert_eq!(cli.api_base_url.as_deref(), Some("http://api.test"));
        assert!(matches!(cli.command, Some(Commands::Courses)));
    }
}
