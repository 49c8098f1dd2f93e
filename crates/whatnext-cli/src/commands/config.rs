use anyhow::Result;
use whatnext_core::config::AppConfig;
use whatnext_infrastructure::ConfigService;

pub fn run(service: &ConfigService, config: &AppConfig, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", service.config_path()?.display());
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
