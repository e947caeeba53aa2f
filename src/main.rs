use anyhow::{Context, Result};
use form_check::{
    config::Config,
    frames::FrameReader,
    registry::Registry,
    rules::{Evaluate, Evaluation},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use structopt::StructOpt;
use tracing::{info, trace};
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Newline-delimited JSON frames of pose landmarks. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Exercise to check, e.g. "Bicep Curl" or lateral-raise.
    #[structopt(short, long, default_value = "Bicep Curl")]
    exercise: String,

    /// YAML file listing the exercises to offer.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Landmark coordinates are normalized to [0, 1] and must be scaled to the frame size.
    #[structopt(short, long)]
    normalized: bool,

    /// The width of the frame the rule thresholds are calibrated for.
    #[structopt(long, default_value = "640")]
    frame_width: u16,

    /// The height of the frame the rule thresholds are calibrated for.
    #[structopt(long, default_value = "480")]
    frame_height: u16,

    /// Landmarks with a lower visibility score are treated as missing.
    #[structopt(short = "v", long, default_value = "0.0")]
    min_visibility: f32,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    /// Print the available exercises and exit.
    #[structopt(long)]
    list: bool,
}

#[derive(serde::Serialize)]
struct Record<'a> {
    frame_index: usize,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(opt.log_level),
    )?;

    let registry = match &opt.config {
        Some(path) => Registry::from_config(
            &Config::load(path).context("failed loading exercise config")?,
        )
        .context("failed building exercise registry")?,
        None => Registry::default(),
    };

    if opt.list {
        for label in registry.labels() {
            println!("{}", label);
        }
        return Ok(());
    }

    let mut rule_set = registry
        .build(&opt.exercise)
        .with_context(|| format!("failed constructing rule set for {:?}", opt.exercise))?;

    let input: Box<dyn BufRead> = match &opt.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed opening {:?}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    // a second Ctrl-C exits even while blocked on input
    ctrlc::set_handler(move || {
        if !running_ctrl_c.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .context("failed setting Ctrl-C handler")?;

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    info!(
        message = "checking form",
        exercise = rule_set.name(),
        rules = rule_set.rules().len(),
        aggregation = ?rule_set.aggregation()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut nframes = 0_usize;
    let mut npassed = 0_usize;

    for frame in FrameReader::new(input) {
        if !running.load(Ordering::SeqCst) {
            info!(message = "interrupted, stopping");
            break;
        }

        let frame = frame.context("failed reading frame")?;
        let frame_index = frame.frame_index.unwrap_or(nframes);

        let mut snapshot = frame.landmarks;
        if opt.normalized {
            snapshot = snapshot.scaled(opt.frame_width, opt.frame_height);
        }
        if opt.min_visibility > 0.0 {
            snapshot = snapshot.with_min_visibility(opt.min_visibility);
        }

        let evaluation = rule_set.evaluate(&snapshot);
        nframes += 1;
        npassed += usize::from(evaluation.overall_passed);

        trace!(
            frame_index,
            landmarks = snapshot.len(),
            overall_passed = evaluation.overall_passed,
            rep_count = evaluation.rep_count
        );

        serde_json::to_writer(
            &mut out,
            &Record {
                frame_index,
                evaluation: &evaluation,
            },
        )
        .context("failed writing evaluation")?;
        writeln!(out).context("failed writing evaluation")?;

        if let Some(pb) = pb.as_ref() {
            pb.set_message(format!(
                "reps: {}, good form: {}/{} frames",
                evaluation.rep_count, npassed, nframes
            ));
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(
        message = "session finished",
        exercise = rule_set.name(),
        frames = nframes,
        good_form_frames = npassed,
        reps = rule_set.rep_count()
    );

    Ok(())
}
