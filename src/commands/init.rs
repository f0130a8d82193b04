use std::io::{self, Write};

use crate::config::{data_dir, env_file_path, save_api_key};
use crate::error::{Error, Result};

pub fn run(api_key: Option<String>, force: bool) -> Result<()> {
    let env_file = env_file_path();

    if env_file.exists() && !force {
        println!("Config already exists at {}", env_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    let api_key = if let Some(key) = api_key {
        key
    } else {
        print!("Enter your YouTube Data API key: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        input.trim().to_string()
    };

    if api_key.trim().is_empty() {
        return Err(Error::ApiKeyMissing);
    }

    save_api_key(&env_file, &api_key)?;

    println!("Config saved to {}", env_file.display());
    println!("Data directory: {}", data_dir().display());

    Ok(())
}
