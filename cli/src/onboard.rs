use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use guidely_core::config::{Config, get_config_path};
use guidely_core::providers::provider_names;

const BANNER: &str = r"
    ----------------------------------------

     __ _ _   _(_) __| | ___| |_   _
    / _` | | | | |/ _` |/ _ \ | | | |
   | (_| | |_| | | (_| |  __/ | |_| |
    \__, |\__,_|_|\__,_|\___|_|\__, |
    |___/                      |___/

    ----------------------------------------
";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn models_for(provider: &str) -> &'static [&'static str] {
    match provider {
        "groq" => &[
            "llama-3.3-70b-versatile",
            "llama-3.1-8b-instant",
            "openai/gpt-oss-120b",
        ],
        "openai" => &["gpt-4o", "gpt-4o-mini", "gpt-4.1"],
        "openrouter" => &[
            "meta-llama/llama-3.3-70b-instruct",
            "openai/gpt-4o-mini",
            "anthropic/claude-3.5-sonnet",
        ],
        _ => &["llama3.1", "qwen2.5"],
    }
}

fn setup_provider() -> Result<String> {
    let providers = provider_names();

    let selection = Select::new()
        .with_prompt("Select your reasoning provider")
        .items(&providers)
        .default(0)
        .interact()
        .context("Failed to select provider")?;

    Ok(providers[selection].to_string())
}

fn setup_model(provider: &str) -> Result<String> {
    let models = models_for(provider);

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn setup_api_key(provider: &str) -> Result<Option<String>> {
    if provider == "ollama" {
        println!("  {} Ollama runs locally, no key needed", style("→").green());
        return Ok(None);
    }

    let api_key: String = Input::new()
        .with_prompt(format!("Enter your {} API key", provider))
        .interact_text()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok(Some(api_key))
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to guidely!").white().bold());
    println!(
        "  {}",
        style("This wizard configures your travel planner in a few steps.").dim()
    );
    println!();

    print_step(1, 3, "Provider");
    let provider = setup_provider()?;

    print_step(2, 3, "Model Selection");
    let model = setup_model(&provider)?;

    print_step(3, 3, "API Key Setup");
    let api_key = setup_api_key(&provider)?;

    let config = Config {
        provider,
        model,
        api_key,
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(get_config_path().display()).cyan()
    );
    println!(
        "  {} Tools also need {} and {} in the environment",
        style("!").yellow(),
        style("OPENWEATHERMAP_API_KEY").cyan(),
        style("TAVILY_API_KEY").cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("guidely chat").cyan().bold()
    );
    println!();

    Ok(config)
}
