use dataserve::{convert, logger};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let jobs = convert::default_jobs(Path::new("."));
    convert::convert_all(&jobs)?;
    logger::log_conversion_complete();
    Ok(())
}
