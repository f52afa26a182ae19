mod cli;

use quality_engine::error::AppError;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("quality-engine: {err}");
        if let AppError::InvalidTemplate(errors) = &err {
            for error in errors {
                eprintln!("  - {error}");
            }
        }
        std::process::exit(err.exit_code());
    }
}
