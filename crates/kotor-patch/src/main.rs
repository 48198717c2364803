use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    install_mod, plan_mod, uninstall_mod, InstallModArgs, OverridePolicyArg, PlanModArgs,
    UninstallModArgs,
};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a mod into a game directory
    Install {
        /// The mod directory (the one containing tslpatchdata/)
        #[arg(short, long)]
        mod_dir: Utf8PathBuf,

        /// The game directory
        #[arg(short, long)]
        game_dir: Utf8PathBuf,

        /// What to do with Override files that shadow patched capsule resources
        #[arg(long, value_enum)]
        override_policy: Option<OverridePolicyArg>,

        /// Keep processed script sources after the install
        #[arg(long, default_value_t = false)]
        keep_scripts: bool,

        /// Path to an nwnnsscomp-compatible script compiler
        #[arg(long)]
        compiler: Option<Utf8PathBuf>,
    },
    /// Undo the most recent install of a mod
    Uninstall {
        /// The mod directory (the one containing backup/)
        #[arg(short, long)]
        mod_dir: Utf8PathBuf,

        /// The game directory
        #[arg(short, long)]
        game_dir: Utf8PathBuf,
    },
    /// Show the operations an install would run, in order
    Plan {
        /// The mod directory (the one containing tslpatchdata/)
        #[arg(short, long)]
        mod_dir: Utf8PathBuf,
    },
}

fn parse_args() -> Args {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kotor_patch=info,ktk_patcher=info,ktk_capsule=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = parse_args();

    match args.command {
        Commands::Install {
            mod_dir,
            game_dir,
            override_policy,
            keep_scripts,
            compiler,
        } => install_mod(InstallModArgs {
            mod_dir,
            game_dir,
            override_policy,
            keep_scripts,
            compiler,
        }),
        Commands::Uninstall { mod_dir, game_dir } => {
            uninstall_mod(UninstallModArgs { mod_dir, game_dir })
        }
        Commands::Plan { mod_dir } => plan_mod(PlanModArgs { mod_dir }),
    }
}
