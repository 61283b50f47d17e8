use clap::Parser;
use stablemcp::{
    cli::{render_version, Arguments, Command},
    config::Config,
    version::{BuildInfo, VERSION},
    StdioServer,
};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Arguments::parse();

    if args.command_or_default() == Command::Version {
        println!("{}", render_version(&BuildInfo::current(), args.output));
        return Ok(());
    }

    let mut config = Config::from_env()?;
    args.apply(&mut config);

    let mut server = StdioServer::new(config.server_name.clone(), VERSION)
        .with_debug(config.debug)
        .with_log_level(config.log_level.clone())
        .with_reply_policy(config.reply_policy());
    server.initialize(config.log_output);

    info!(
        name = %config.server_name,
        version = VERSION,
        log_output = %config.log_output,
        "server starting"
    );
    server.run().await?;

    Ok(())
}
