use miette::Result;

use packsmith_util::errors::PacksmithError;

pub fn exec() -> Result<()> {
    let cwd = std::env::current_dir().map_err(PacksmithError::Io)?;
    packsmith_ops::ops_init::init(&cwd)?;
    println!("Initialized Packsmith workspace in {}", cwd.display());
    Ok(())
}
