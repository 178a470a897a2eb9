//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and dataset path before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::{ServerConfig, StartupError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Each prompt defaults to the value already loaded in `config`, so
/// pressing enter keeps the file/environment setting.
///
/// # Errors
///
/// Returns [`StartupError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: ServerConfig) -> Result<(), StartupError> {
    println!("Locofinder Server");
    println!();

    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.bind_addr.clone());

    config.port = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .unwrap_or(config.port);

    let data_path: String = Input::new()
        .with_prompt("Dataset path")
        .default(config.data_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.data_path.display().to_string());
    config.data_path = PathBuf::from(data_path);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{} serving {}?",
            config.bind_addr,
            config.port,
            config.data_path.display()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
