use super::options::{ConfigLayer, OptionOrigin};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "small-lint")]
#[command(about = "A small Python linter")]
pub struct CliConfig {
    /// Files, packages or directories to lint
    pub paths: Vec<PathBuf>,

    /// Use this configuration file instead of searching for one
    #[arg(long, value_name = "FILE")]
    pub rcfile: Option<PathBuf>,

    #[arg(short = 'd', long, value_name = "MSG_IDS")]
    pub disable: Vec<String>,

    #[arg(short = 'e', long, value_name = "MSG_IDS")]
    pub enable: Vec<String>,

    /// text, parseable, colorized or json
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// e.g. "{path}:{line}: [{msg_id}({symbol}), {obj}] {msg}"
    #[arg(long, value_name = "TEMPLATE")]
    pub msg_template: Option<String>,

    /// Concurrent lint tasks, 0 for one per CPU
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<String>,

    #[arg(long, value_name = "FILES")]
    pub ignore: Option<String>,

    #[arg(long, value_name = "PATTERNS")]
    pub ignore_patterns: Option<String>,

    #[arg(long, value_name = "Y_OR_N")]
    pub recursive: Option<String>,

    #[arg(long, value_name = "MODULES")]
    pub load_plugins: Option<String>,

    #[arg(long, value_name = "Y_OR_N")]
    pub score: Option<String>,

    #[arg(long, value_name = "Y_OR_N")]
    pub accept_no_param_doc: Option<String>,

    #[arg(long, value_name = "Y_OR_N")]
    pub accept_no_raise_doc: Option<String>,

    /// Print a configuration file for the current options and exit
    #[arg(long)]
    pub generate_rcfile: bool,

    /// List every available message and exit
    #[arg(long)]
    pub list_msgs: bool,

    #[arg(long, help = "Log in JSON instead of human readable text")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Command line options in the same raw form as configuration file values.
    pub fn to_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::new(OptionOrigin::CommandLine, "command line");
        let single = [
            ("ignore", &self.ignore),
            ("ignore-patterns", &self.ignore_patterns),
            ("load-plugins", &self.load_plugins),
            ("jobs", &self.jobs),
            ("recursive", &self.recursive),
            ("output-format", &self.output_format),
            ("msg-template", &self.msg_template),
            ("score", &self.score),
            ("accept-no-param-doc", &self.accept_no_param_doc),
            ("accept-no-raise-doc", &self.accept_no_raise_doc),
        ];
        for (name, value) in single {
            if let Some(value) = value {
                layer.push(name, value.clone());
            }
        }
        for value in &self.disable {
            layer.push("disable", value.clone());
        }
        for value in &self.enable {
            layer.push("enable", value.clone());
        }
        layer
    }
}
