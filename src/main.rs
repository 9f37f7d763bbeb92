use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pagepatch::{
    chats::{ChatRepository, ChatStore},
    config::Config,
    paging::{self, Pagination, PagingResult},
    web,
};

mod cli;
use cli::{Command, EntityArg};

fn print_page<T: Serialize>(page: &PagingResult<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(page)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    match args.command {
        Command::Serve { config_dir } => {
            let config = Config::load_with(&config_dir)?;
            web::start_daemon(config)
        }

        Command::Query {
            data,
            entity,
            query,
            page_size,
            page_offset,
            order_by,
            descending,
            include_total,
        } => {
            let store = ChatStore::load(&data)?;

            let mut pagination = Pagination::new(page_size, page_offset);
            pagination.order_by = order_by
                .as_deref()
                .map(paging::split_order_by)
                .unwrap_or_default();
            pagination.descending = descending;
            pagination.include_total = include_total;
            pagination.query = query;

            match entity {
                EntityArg::ChatGroups => {
                    print_page(&paging::paginate(store.chat_groups(), &pagination)?)
                }
                EntityArg::Chats => {
                    let chats = store.chat_groups().iter().try_fold(
                        Vec::new(),
                        |mut chats, group| -> anyhow::Result<_> {
                            chats.extend(store.chats(group.id)?);
                            Ok(chats)
                        },
                    )?;
                    print_page(&paging::paginate(chats, &pagination)?)
                }
            }
        }
    }
}
