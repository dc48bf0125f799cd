use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run an extraction sync against the configured account
    Sync {
        /// Path to the JSON job configuration file
        #[arg(short, long)]
        config: String,

        /// Path to the bookmark state file (created if absent)
        #[arg(short, long)]
        state: String,

        /// Write batches to this file as JSON lines instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the persisted bookmark for a state file
    Bookmark {
        /// Path to the bookmark state file
        #[arg(short, long)]
        state: String,

        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },
}
