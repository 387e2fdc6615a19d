//! # CLI Argument Definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trip_kernel::domain::fields::Field;

#[derive(Debug, Parser)]
#[command(name = "tripgate")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Registration gatekeeper for a capped group trip")]
pub struct Cli {
    /// Config file (TOML, JSON or YAML). Without it an optional `tripgate.*` in the working
    /// directory is used
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the registration counter and email list (overrides `storage.data_dir`)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Form endpoint receiving submissions (overrides `submission.endpoint`)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log level or filter directives, e.g. `debug` or `trip_registration=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show seats taken, seats left and whether registration is open
    Status {
        /// Print a JSON object instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate one field value the way the form does on submit
    Check {
        /// name, email, phone or captcha
        field: Field,
        value: String,
    },
    /// Register one participant through every gate
    Register(RegisterArgs),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    /// The verification word shown on the form
    #[arg(long)]
    pub captcha: String,
}
