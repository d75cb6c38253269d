use anyhow::Result;

use super::ServeCommand;
use crate::config::Config;
use crate::server;

pub async fn handle_serve_command(args: ServeCommand, mut config: Config) -> Result<()> {
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    server::serve(&config).await
}
