mod app;
mod ekg;
mod util;

use std::time::Duration;

use clap::Parser;

use crate::ekg::Backend;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the knowledge-graph API.
    #[arg(long, env = "EKG_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Events fetched per timeline page.
    #[arg(long, env = "EKG_PAGE_SIZE", default_value_t = 100)]
    page_size: usize,

    /// Hard ceiling on graph nodes per snapshot query.
    #[arg(long, env = "EKG_MAX_NODES", default_value_t = 1000)]
    max_nodes: usize,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "EKG_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Serve the built-in dataset instead of calling the API.
    #[arg(long, env = "EKG_MOCK")]
    mock: bool,

    /// Event id to preselect on startup.
    #[arg(long, env = "EKG_EVENT")]
    event: Option<String>,

    /// Date (YYYY-MM-DD) whose year is preselected as the date filter.
    #[arg(long, env = "EKG_DATE")]
    date: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let backend = if args.mock {
        Backend::mock()
    } else {
        match Backend::http(&args.api_url, Duration::from_secs(args.timeout_secs)) {
            Ok(backend) => backend,
            Err(error) => {
                log::error!("failed to construct HTTP client: {error:#}");
                std::process::exit(1);
            }
        }
    };

    let config = app::AppConfig {
        page_size: args.page_size,
        max_nodes: args.max_nodes,
        preselect_event: args.event,
        preselect_date: args.date,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FE-EKG Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(app::ExplorerApp::new(cc, backend, config)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn every_flag_has_an_environment_fallback() {
        let command = Args::command();
        let expected = [
            ("api_url", "EKG_API_URL"),
            ("page_size", "EKG_PAGE_SIZE"),
            ("max_nodes", "EKG_MAX_NODES"),
            ("timeout_secs", "EKG_TIMEOUT_SECS"),
            ("mock", "EKG_MOCK"),
            ("event", "EKG_EVENT"),
            ("date", "EKG_DATE"),
        ];

        for (id, env) in expected {
            let arg = command
                .get_arguments()
                .find(|arg| arg.get_id().as_str() == id)
                .unwrap_or_else(|| panic!("missing flag {id}"));
            assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(env)), "{id}");
        }
    }
}
