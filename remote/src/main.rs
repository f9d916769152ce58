use gesture::{Classifier, JointMode};
use protocol::Command;
use std::path::PathBuf;
use structopt::StructOpt;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{error, info};

mod annotate;
mod decoder;
mod error;
mod link;
mod pipeline;
mod source;
mod throttle;

use annotate::LogAnnotator;
use error::Error;
use link::Link;
use pipeline::Pipeline;
use source::Source;
use throttle::Throttle;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(StructOpt, Debug)]
#[structopt(name = "remote", about = "Drives a servo hand from tracked hand landmarks")]
struct Opts {
    /// Landmark source: `-` for stdin, `tcp:HOST:PORT` or a recorded file
    #[structopt(short = "s", long, default_value = "-")]
    source: Source,

    /// BLE serial device of the hand controller
    #[structopt(
        short = "d",
        long,
        parse(from_os_str),
        default_value = "/dev/rfcomm0"
    )]
    device: PathBuf,

    /// Only log commands, do not open the device
    #[structopt(short = "o", long)]
    offline: bool,

    /// Minimum time between two hands' commands
    #[structopt(long, default_value = "100")]
    throttle_ms: u64,

    /// Servo move time sent with each command
    #[structopt(long, default_value = "2000")]
    move_time: u16,

    /// Joint x coordinate source, `legacy` or `measured`
    #[structopt(long, default_value = "legacy")]
    joint_x: JointMode,

    /// Capacity of the command queue
    #[structopt(long, default_value = "32")]
    queue: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let opts = Opts::from_args();
    info!("Opts: {opts:?}");

    let reader = opts.source.open().await?;
    info!("Reading landmarks from {}", opts.source);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(opts.queue.max(1));
    let device = (!opts.offline).then(|| opts.device.clone());
    let mut link = Link::open(device, cmd_rx).await?;
    let link_task = tokio::spawn(async move { link.run().await });

    let mut pipeline = Pipeline::new(
        Classifier::new(opts.joint_x, opts.move_time),
        LogAnnotator::default(),
        Throttle::new(Duration::from_millis(opts.throttle_ms)),
        cmd_tx,
    );

    let result = tokio::select! {
        res = pipeline.run(source::frames(reader)) => res.map(|_| ()),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    // dropping the pipeline closes the queue, the link drains what is left
    drop(pipeline);
    match link_task.await {
        Ok(sent) => info!("Sent {sent} commands"),
        Err(e) => error!("Link task failed: {e}"),
    }

    if let Err(e) = &result {
        error!("{e}");
    }
    result
}
