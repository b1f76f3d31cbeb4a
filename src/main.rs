use screen_auto_run::args::{self, Args};
use screen_auto_run::capture::XcapScreen;
use screen_auto_run::input::{ClickDispatcher, DryRunPointer, EnigoPointer, Pointer};
use screen_auto_run::routine::{
    Locator, Routine, RoutineReport, RoutineStep, ThreadSleeper, default_steps,
};
use screen_auto_run::AutomationResult;
use std::process::ExitCode;

// Virtual screen for --dry-run; only used for the corner check
const DRY_RUN_SCREEN: (i32, i32) = (1920, 1080);

fn main() -> ExitCode {
    let args = match Args::parse_from(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("❌ {}", msg);
            args::print_help();
            return ExitCode::from(2);
        }
    };

    let level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!(
        "🚀 Screen Auto Run v{} (pictures from {}, threshold {:.2}{})",
        env!("APP_VERSION_DISPLAY"),
        args.pic_dir.display(),
        args.threshold,
        if args.dry_run { ", dry run" } else { "" }
    );

    let steps = default_steps();
    let result = if args.dry_run {
        run(DryRunPointer::new(DRY_RUN_SCREEN.0, DRY_RUN_SCREEN.1), &args, &steps)
    } else {
        EnigoPointer::new().and_then(|pointer| run(pointer, &args, &steps))
    };

    match result {
        Ok(report) if report.is_complete() => {
            println!("✅ All {} steps done", report.completed.len());
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!(
                "⚠️ Stopped at '{}' after {} step(s)",
                report.failed.unwrap_or_default(),
                report.completed.len()
            );
            ExitCode::from(1)
        }
        Err(e) => {
            log::error!("Routine aborted: {}", e);
            eprintln!("❌ Routine aborted: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run<P: Pointer>(pointer: P, args: &Args, steps: &[RoutineStep]) -> AutomationResult<RoutineReport> {
    let locator = Locator::new(XcapScreen::new(), ThreadSleeper, args.match_config());
    let clicker = ClickDispatcher::new(pointer, args.click_config());
    let mut routine = Routine::new(locator, clicker, args.routine_config());
    routine.run(steps)
}
