use relay::{conf, startup::Application, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let conf = conf::Conf::current()?;

    let subscriber = telemetry::TracingSubscriber::new("info")
        .pretty(conf.env_conf.log.pretty)
        .build(std::io::stdout);
    telemetry::init_global_default(subscriber)?;

    tracing::info!("Env: {}", conf.env);
    tracing::debug!("{:?}", conf.env_conf);

    let application = Application::build(&conf).await?;

    application.server().await?;

    Ok(())
}
