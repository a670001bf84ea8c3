use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Overrides applied on top of the environment and the `.env` file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Read settings from this .env file")]
    pub env_file: Option<PathBuf>,

    #[arg(long, global = true, help = "List endpoint URL")]
    pub endpoint: Option<String>,

    #[arg(long, global = true, help = "Fetch mode: full or incremental")]
    pub mode: Option<String>,

    #[arg(long, global = true, help = "Rows requested per remote page")]
    pub page_size: Option<usize>,

    #[arg(long, global = true, help = "Rows shown per displayed page")]
    pub view_page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the table and print one page
    View {
        #[arg(long, help = "Keep rows with a value containing this text")]
        filter: Option<String>,

        #[arg(long, help = "Column to sort by")]
        sort: Option<String>,

        #[arg(long, requires = "sort", help = "Sort descending")]
        desc: bool,

        #[arg(long, default_value_t = 1, help = "Page to print, 1-based")]
        page: usize,

        #[arg(long, help = "Print the page as JSON instead of a table")]
        json: bool,
    },
    /// Load the table and print its columns
    Columns,
    /// Follow every page and dump the raw rows as JSON
    Fetch {
        #[arg(
            long,
            help = "If specified, writes the rows to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    /// Interactive browsing over stdin
    Browse,
}
