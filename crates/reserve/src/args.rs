use clap::{ArgAction, ArgGroup, Parser};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
#[command(group(
    ArgGroup::new("repo_mode")
        .args(["repo", "no_repo"])
))]
/// Top-level CLI options for reserve.
pub struct Cli {
    /// Package name to reserve (prompted for if omitted)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Package description (prompted for if omitted)
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Directory the package is created in (defaults to $BASE_URL)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<String>,

    /// Create a public GitHub repository after uploading
    #[arg(long)]
    pub repo: bool,

    /// Do not create a GitHub repository
    #[arg(long = "no-repo")]
    pub no_repo: bool,

    /// Upload to this repository URL instead of PyPI
    #[arg(long, value_name = "URL")]
    pub repository_url: Option<String>,

    /// Python interpreter used to build and install twine
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Enable colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Suppress all output
    #[arg(long)]
    pub quiet: bool,

    /// Never prompt; missing answers fall back to defaults or fail
    #[arg(long)]
    pub no_prompt: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Repository choice given on the command line, if any.
    pub fn repo_choice(&self) -> Option<bool> {
        match (self.repo, self.no_repo) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
