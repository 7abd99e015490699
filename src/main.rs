use clap::Parser;
use prokopakop_spsa::utils::Cli;
use prokopakop_spsa::{OptimizeConfig, SessionReport, TunerError};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &OptimizeConfig) -> Result<(), TunerError> {
    let mut optimizer = config.build_optimizer()?;

    log::info!("Engine: {}", config.engine.display());
    log::info!("Estimator: {}", config.estimator);
    watch_stdin(optimizer.stop_flag());

    let final_params = optimizer.run(config.iterations);

    optimizer.log().save(&config.output)?;
    log::info!("Results saved to {}", config.output.display());

    let report = optimizer.log().report();
    print_report(&report, &final_params);

    Ok(())
}

/// `stop` or `quit` on stdin ends the session after the running iteration.
fn watch_stdin(stop_flag: Arc<AtomicBool>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if matches!(line.trim(), "stop" | "quit") {
                log::warn!("Stop requested, finishing the current iteration");
                stop_flag.store(true, Ordering::Relaxed);
                break;
            }
        }
    });
}

fn print_report(report: &SessionReport, final_params: &prokopakop_spsa::Snapshot) {
    let rule = "=".repeat(60);

    println!("\n{}", rule);
    println!("FINAL TUNED VALUES (after all iterations):");
    println!("{}", rule);
    for (name, value) in final_params {
        println!("{}: {}", name, *value as i64);
    }

    println!("\n{}", rule);
    println!(
        "BEST VALUES (from iteration {}, score: {:.4}):",
        report.summary.best_iteration, report.summary.best_score
    );
    println!("{}", rule);
    for (name, value) in &report.best_params {
        println!("{}: {}", name, value);
    }

    println!("\n{}", report.constants_snippet());
}
