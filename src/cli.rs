use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityArg {
    ChatGroups,
    Chats,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the chat API
    Serve {
        /// Directory holding config.yaml (created when missing)
        #[clap(short, long, default_value = ".")]
        config_dir: String,
    },

    /// Filter, sort and page a JSON seed file and print the result
    Query {
        /// Seed file with `chatGroups` and `chats` arrays
        #[clap(short, long)]
        data: String,

        #[clap(value_enum)]
        entity: EntityArg,

        /// Filter, e.g. `isRead=false;createdAt=2024-01-01~`
        #[clap(short, long)]
        query: Option<String>,

        #[clap(long, default_value = "50")]
        page_size: u32,

        /// Zero-based page index
        #[clap(long, default_value = "0")]
        page_offset: u32,

        /// Comma-separated field names
        #[clap(short, long)]
        order_by: Option<String>,

        #[clap(long, default_value = "false")]
        descending: bool,

        /// Print total count and pages as well
        #[clap(long, default_value = "false")]
        include_total: bool,
    },
}
