use clap::Parser;
use small_lint::config::discovery::ConfigDiscovery;
use small_lint::config::{load_configuration, options::generate_rcfile};
use small_lint::utils::error::LintError;
use small_lint::utils::logger;
use small_lint::{reporter_for, CliConfig, LintEngine, LocalSourceLoader};

/// Exit status for configuration and usage errors, outside the message bits.
const USAGE_ERROR: i32 = 32;

fn fail(e: &LintError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(USAGE_ERROR);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let discovery = ConfigDiscovery::from_env()?;
    let loaded = match load_configuration(cli.rcfile.as_deref(), &discovery, cli.to_layer()) {
        Ok(loaded) => loaded,
        Err(e) => fail(&e),
    };

    if cli.generate_rcfile {
        print!("{}", generate_rcfile(&loaded.options));
        return Ok(());
    }

    let reporter = reporter_for(&loaded.options);
    let engine = match LintEngine::new(loaded.options, LocalSourceLoader::new()) {
        Ok(engine) => engine,
        Err(e) => fail(&e),
    };

    if cli.list_msgs {
        for def in engine.store().definitions() {
            println!(":{} ({}): *{}*", def.symbol, def.msgid, def.template);
            println!("  {}", def.description);
        }
        return Ok(());
    }

    if cli.paths.is_empty() {
        fail(&LintError::config("no files or modules given to lint"));
    }

    let report = match engine.run(&cli.paths).await {
        Ok(report) => report,
        Err(e) => fail(&e),
    };
    print!("{}", reporter.render(&report)?);

    std::process::exit(report.exit_code());
}
