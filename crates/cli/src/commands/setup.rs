//! Configuration bootstrap and AI connectivity check

use anyhow::{bail, Context, Result};
use posture_lib::{ai::ChatRequest, ChatClient, OpenAiClient};
use std::path::Path;
use tracing::{error, info};

use super::analyze::load_config;
use crate::config::AppConfig;
use crate::output::{print_error, print_info, print_success};

const CONNECTIVITY_PROMPT: &str =
    "Hello, this is a test. Please respond with 'API connection successful'.";
const CONNECTIVITY_MAX_TOKENS: u32 = 20;

/// Write the example settings file
pub fn init_config(path: &Path) -> Result<()> {
    AppConfig::save_example(path)?;

    print_success(&format!("Example config written to {}", path.display()));
    println!("\nEdit the file and set your API credentials:");
    println!("1. Open {}", path.display());
    println!("2. Set openai.api_key to your API key");
    println!("3. Adjust base_url and model as needed");
    println!("\nThen check the configuration with:");
    println!("kposture test-api --config {}", path.display());

    Ok(())
}

/// Send one short request to the configured model
pub async fn test_api(config_path: &Path) -> Result<()> {
    print_info("Testing AI API connection...");

    let config = load_config(config_path)?;
    info!(base_url = %config.base_url_display(), model = %config.openai.model, "Checking AI API");
    let client =
        OpenAiClient::new(config.client_config()).context("Failed to build AI client")?;
    let request = ChatRequest::single_user(client.model(), CONNECTIVITY_PROMPT, CONNECTIVITY_MAX_TOKENS);

    let completion = match client.complete(&request).await {
        Ok(completion) => completion,
        Err(e) => {
            error!(error = %e, "AI API request failed");
            print_error(&format!("API connection failed: {}", e));
            println!("\nPossible fixes:");
            println!("1. Check that api_key in the config file is correct");
            println!("2. Check that base_url in the config file is correct");
            println!("3. Confirm the network connection works");
            println!("4. Verify the API service is available");
            bail!("AI API connectivity check failed");
        }
    };

    let reply = match completion.first_content() {
        Ok(reply) => reply,
        Err(e) => {
            print_error(&e.to_string());
            bail!("AI API returned an empty response");
        }
    };

    print_success("API connection successful!");
    println!("Response: {}", reply);
    println!(
        "Model used: {}",
        completion.model.as_deref().unwrap_or("(not reported)")
    );
    if let Some(usage) = &completion.usage {
        println!(
            "Token usage: prompt={} completion={} total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    println!("Configured base URL: {}", config.base_url_display());
    println!("Configured model: {}", config.openai.model);

    Ok(())
}
