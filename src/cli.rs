use std::io::Write;

use log::LevelFilter;

use crate::Result;

/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Prints a fatal error as one line on stderr and exits with status 1.
pub fn exit_on_error(result: Result<()>) {
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
